//! End-to-end pipeline tests against an in-memory object store.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use object_store::{memory::InMemory, path::Path, ObjectStore};
use tempfile::tempdir;

use snapshot::config::ProviderConfig;
use snapshot::pipeline::{run_provider, RunOptions};
use storage::BucketClient;
use test_utils::Grib2MessageBuilder;

fn provider() -> ProviderConfig {
    ProviderConfig {
        id: "test".to_string(),
        bucket: "test-bucket".to_string(),
        region: "us-east-1".to_string(),
        prefix_template: "run.{date}/{cycle}/".to_string(),
        markers: vec!["f006".to_string(), "f012".to_string()],
        extension: ".grib2".to_string(),
        cycles: vec![0, 6, 12, 18],
    }
}

/// A multi-message forecast file with 2 m temperature and both 10 m wind
/// components.
fn forecast_file() -> Vec<u8> {
    let mut file = Grib2MessageBuilder::temperature_2m()
        .with_gradient(260.0, 300.0)
        .build();
    file.extend(
        Grib2MessageBuilder::wind_u_10m()
            .with_constant_value(3.0)
            .build(),
    );
    file.extend(
        Grib2MessageBuilder::wind_v_10m()
            .with_constant_value(4.0)
            .build(),
    );
    file
}

async fn seed(keys_and_bodies: &[(&str, Vec<u8>)]) -> BucketClient {
    let store = InMemory::new();
    for (key, body) in keys_and_bodies {
        store
            .put(&Path::from(*key), Bytes::from(body.clone()).into())
            .await
            .unwrap();
    }
    BucketClient::from_store(Arc::new(store), "test-bucket")
}

#[tokio::test]
async fn test_full_pipeline_renders_both_images() {
    let client = seed(&[
        ("run.20240205/00/model.f006.grib2", forecast_file()),
        ("run.20240205/00/model.f006.grib2.idx", vec![0u8; 16]),
    ])
    .await;

    let output = tempdir().unwrap();
    let work = tempdir().unwrap();
    let opts = RunOptions {
        output_dir: output.path().to_path_buf(),
        work_dir: work.path().to_path_buf(),
    };

    // 03:00 on the run date: only the 00z cycle has happened, so the first
    // probed prefix is the one seeded above.
    let now = Utc.with_ymd_and_hms(2024, 2, 5, 3, 0, 0).unwrap();
    let written = run_provider(&client, &provider(), 5, now, &opts)
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
    let temp = output.path().join("test_temp.png");
    let wind = output.path().join("test_wind.png");
    assert!(temp.exists());
    assert!(wind.exists());

    // Both outputs are real PNGs.
    for path in [temp, wind] {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

#[tokio::test]
async fn test_pipeline_finds_previous_day_run() {
    // Nothing today; the newest seeded run is yesterday's 18z.
    let client = seed(&[
        ("run.20240204/18/model.f006.grib2", forecast_file()),
        ("run.20240203/12/model.f006.grib2", forecast_file()),
    ])
    .await;

    let output = tempdir().unwrap();
    let work = tempdir().unwrap();
    let opts = RunOptions {
        output_dir: output.path().to_path_buf(),
        work_dir: work.path().to_path_buf(),
    };

    let now = Utc.with_ymd_and_hms(2024, 2, 5, 3, 0, 0).unwrap();
    let written = run_provider(&client, &provider(), 5, now, &opts)
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
}

#[tokio::test]
async fn test_pipeline_prefers_configured_marker() {
    let client = seed(&[
        ("run.20240205/00/model.f012.grib2", forecast_file()),
        ("run.20240205/00/model.f006.grib2", forecast_file()),
    ])
    .await;

    let output = tempdir().unwrap();
    let work = tempdir().unwrap();
    let opts = RunOptions {
        output_dir: output.path().to_path_buf(),
        work_dir: work.path().to_path_buf(),
    };

    let now = Utc.with_ymd_and_hms(2024, 2, 5, 3, 0, 0).unwrap();
    run_provider(&client, &provider(), 5, now, &opts)
        .await
        .unwrap();

    // The f006 file was downloaded, not f012.
    let downloaded = work.path().join("test.grib2");
    assert!(downloaded.exists());
}

#[tokio::test]
async fn test_pipeline_empty_bucket_fails_cleanly() {
    let client = seed(&[]).await;

    let output = tempdir().unwrap();
    let work = tempdir().unwrap();
    let opts = RunOptions {
        output_dir: output.path().to_path_buf(),
        work_dir: work.path().to_path_buf(),
    };

    let now = Utc.with_ymd_and_hms(2024, 2, 5, 3, 0, 0).unwrap();
    let result = run_provider(&client, &provider(), 5, now, &opts).await;

    assert!(result.is_err());
    // No images may appear on failure.
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    // And nothing was fetched: an exhausted lookback window never downloads.
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pipeline_temperature_only_file() {
    let body = Grib2MessageBuilder::temperature_2m()
        .with_gradient(250.0, 310.0)
        .build();
    let client = seed(&[("run.20240205/00/model.f006.grib2", body)]).await;

    let output = tempdir().unwrap();
    let work = tempdir().unwrap();
    let opts = RunOptions {
        output_dir: output.path().to_path_buf(),
        work_dir: work.path().to_path_buf(),
    };

    let now = Utc.with_ymd_and_hms(2024, 2, 5, 3, 0, 0).unwrap();
    let written = run_provider(&client, &provider(), 5, now, &opts)
        .await
        .unwrap();

    assert_eq!(written.len(), 1);
    assert!(output.path().join("test_temp.png").exists());
    assert!(!output.path().join("test_wind.png").exists());
}
