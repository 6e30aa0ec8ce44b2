//! Run-prefix resolution and file selection.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use snap_common::{lookback_cycles, ForecastCycle, SnapError, SnapResult};
use storage::BucketClient;

use crate::config::ProviderConfig;

/// Find the most recent run prefix that actually contains objects.
///
/// Probes candidate prefixes newest-first across the lookback window and
/// returns the first non-empty one together with its cycle. Exhausting the
/// window is `PrefixNotFound`; no file is fetched in that case.
#[instrument(skip(client, provider), fields(provider = %provider.id))]
pub async fn resolve_prefix(
    client: &BucketClient,
    provider: &ProviderConfig,
    now: DateTime<Utc>,
    lookback_days: u32,
) -> SnapResult<(String, ForecastCycle)> {
    for cycle in lookback_cycles(now, &provider.cycles, lookback_days) {
        let prefix = provider.prefix_for(&cycle);
        debug!(prefix = %prefix, "Probing prefix");

        if client.prefix_has_objects(&prefix).await? {
            info!(prefix = %prefix, date = %cycle.date, cycle = cycle.hour, "Resolved run prefix");
            return Ok((prefix, cycle));
        }
    }

    Err(SnapError::PrefixNotFound {
        provider: provider.id.clone(),
    })
}

/// Pick one file from a listing.
///
/// Markers are tried in preference order; the winner is the first key that
/// contains the marker and ends with the required extension. An empty marker
/// list accepts the first key with the extension. The returned key always
/// carries the extension.
pub fn select_file<'a>(
    keys: &'a [String],
    markers: &[String],
    extension: &str,
    prefix: &str,
) -> SnapResult<&'a str> {
    let candidates = || keys.iter().filter(|k| k.ends_with(extension));

    let selected = if markers.is_empty() {
        candidates().next()
    } else {
        markers
            .iter()
            .find_map(|marker| candidates().find(|k| k.contains(marker.as_str())))
    };

    selected.map(|k| k.as_str()).ok_or_else(|| {
        SnapError::NoMatchingFile {
            prefix: prefix.to_string(),
            markers: markers.to_vec(),
            extension: extension.to_string(),
        }
    })
}
