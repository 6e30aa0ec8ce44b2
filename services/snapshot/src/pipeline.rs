//! Per-provider snapshot pipeline.
//!
//! Resolve a run prefix, select and download one forecast file, decode its
//! near-surface fields and render them. Providers are processed one at a
//! time; a failure in any stage fails that provider only.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use grib2_parser::{extract_surface_fields, SurfaceField};
use renderer::{encode_field_png, Colormap};
use storage::BucketClient;

use crate::config::{ProviderConfig, SnapshotConfig};
use crate::normalize::{find_role, FieldRole};
use crate::resolve::{resolve_prefix, select_file};

/// Temperature render range in °C.
const TEMP_RANGE_C: (f32, f32) = (-30.0, 40.0);
/// Wind-speed render range in m/s.
const WIND_RANGE_MS: (f32, f32) = (0.0, 30.0);

const KELVIN_OFFSET: f32 = 273.15;

/// Where the pipeline writes.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory for rendered images.
    pub output_dir: PathBuf,
    /// Scratch directory for downloaded files, overwritten each run.
    pub work_dir: PathBuf,
}

/// Run every provider sequentially; returns how many produced output.
pub async fn run_all(config: &SnapshotConfig, opts: &RunOptions) -> usize {
    let mut successes = 0;

    for provider in &config.providers {
        let client = match BucketClient::anonymous(&provider.bucket, &provider.region) {
            Ok(client) => client,
            Err(e) => {
                warn!(provider = %provider.id, error = %e, "Could not create bucket client");
                continue;
            }
        };

        match run_provider(&client, provider, config.lookback_days, Utc::now(), opts).await {
            Ok(images) if !images.is_empty() => {
                info!(provider = %provider.id, images = images.len(), "Provider completed");
                successes += 1;
            }
            Ok(_) => {
                warn!(provider = %provider.id, "No renderable fields, provider produced no output");
            }
            Err(e) => {
                warn!(provider = %provider.id, error = %e, "Provider failed");
            }
        }
    }

    successes
}

/// Run the full pipeline for one provider. Returns the images written.
#[instrument(skip(client, provider, opts), fields(provider = %provider.id))]
pub async fn run_provider(
    client: &BucketClient,
    provider: &ProviderConfig,
    lookback_days: u32,
    now: DateTime<Utc>,
    opts: &RunOptions,
) -> Result<Vec<PathBuf>> {
    let (prefix, cycle) = resolve_prefix(client, provider, now, lookback_days).await?;

    let keys = client.list(&prefix).await?;
    let key = select_file(&keys, &provider.markers, &provider.extension, &prefix)?;

    let local_path = opts.work_dir.join(format!("{}.grib2", provider.id));
    let size = client.download_to(key, &local_path).await?;
    info!(key = %key, size, date = %cycle.date, cycle = cycle.hour, "Downloaded forecast file");

    let data = Bytes::from(tokio::fs::read(&local_path).await?);
    let fields = extract_surface_fields(data)?;
    info!(fields = fields.len(), "Decoded near-surface fields");

    render_images(&provider.id, &fields, &opts.output_dir)
}

/// Render the temperature and wind-speed images for whatever roles resolved.
///
/// A missing role skips its image with a warning; this is not an error.
pub fn render_images(
    provider_id: &str,
    fields: &[SurfaceField],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    let mut written = Vec::new();

    match find_role(fields, FieldRole::Temperature) {
        Some(temp) => {
            let celsius: Vec<f32> = temp.values.iter().map(|&k| k - KELVIN_OFFSET).collect();
            let png = encode_field_png(
                &celsius,
                temp.width,
                temp.height,
                TEMP_RANGE_C.0,
                TEMP_RANGE_C.1,
                Colormap::Jet,
            )?;

            let path = output_dir.join(format!("{}_temp.png", provider_id));
            std::fs::write(&path, png)?;
            info!(path = %path.display(), field = %temp.name, "Wrote temperature image");
            written.push(path);
        }
        None => warn!(provider = %provider_id, "No temperature field found, skipping image"),
    }

    match (
        find_role(fields, FieldRole::WindU),
        find_role(fields, FieldRole::WindV),
    ) {
        (Some(u), Some(v)) if u.width == v.width && u.height == v.height => {
            let speed: Vec<f32> = u
                .values
                .iter()
                .zip(&v.values)
                .map(|(&u, &v)| (u * u + v * v).sqrt())
                .collect();
            let png = encode_field_png(
                &speed,
                u.width,
                u.height,
                WIND_RANGE_MS.0,
                WIND_RANGE_MS.1,
                Colormap::Viridis,
            )?;

            let path = output_dir.join(format!("{}_wind.png", provider_id));
            std::fs::write(&path, png)?;
            info!(path = %path.display(), "Wrote wind-speed image");
            written.push(path);
        }
        (Some(u), Some(v)) => {
            warn!(
                provider = %provider_id,
                u_dims = ?(u.width, u.height),
                v_dims = ?(v.width, v.height),
                "Wind component grids disagree, skipping image"
            );
        }
        _ => warn!(provider = %provider_id, "Missing wind component, skipping image"),
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, values: Vec<f32>) -> SurfaceField {
        SurfaceField {
            name: name.to_string(),
            level: "surface".to_string(),
            width: 2,
            height: 2,
            values,
        }
    }

    #[test]
    fn test_render_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let fields = vec![
            field("TMP", vec![288.15; 4]),
            field("UGRD", vec![3.0; 4]),
            field("VGRD", vec![4.0; 4]),
        ];

        let written = render_images("demo", &fields, dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("demo_temp.png").exists());
        assert!(dir.path().join("demo_wind.png").exists());
    }

    #[test]
    fn test_missing_temperature_skips_image_only() {
        let dir = tempfile::tempdir().unwrap();
        let fields = vec![field("UGRD", vec![1.0; 4]), field("VGRD", vec![1.0; 4])];

        let written = render_images("demo", &fields, dir.path()).unwrap();

        assert_eq!(written.len(), 1);
        assert!(!dir.path().join("demo_temp.png").exists());
        assert!(dir.path().join("demo_wind.png").exists());
    }

    #[test]
    fn test_single_wind_component_skips_wind() {
        let dir = tempfile::tempdir().unwrap();
        let fields = vec![field("TMP", vec![290.0; 4]), field("UGRD", vec![1.0; 4])];

        let written = render_images("demo", &fields, dir.path()).unwrap();

        assert_eq!(written.len(), 1);
        assert!(dir.path().join("demo_temp.png").exists());
        assert!(!dir.path().join("demo_wind.png").exists());
    }

    #[test]
    fn test_no_fields_is_ok_but_empty() {
        let dir = tempfile::tempdir().unwrap();
        let written = render_images("demo", &[], dir.path()).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_mismatched_wind_grids_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = field("VGRD", vec![1.0; 9]);
        v.width = 3;
        v.height = 3;
        let fields = vec![field("UGRD", vec![1.0; 4]), v];

        let written = render_images("demo", &fields, dir.path()).unwrap();
        assert!(written.is_empty());
    }
}
