//! Provider configuration.
//!
//! Each provider descriptor is static and hand-maintained: which bucket to
//! probe, how its run prefixes are laid out, and which file under a prefix
//! to take. Defaults cover the three public AI-model buckets; a YAML file
//! can replace them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use snap_common::ForecastCycle;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Providers to process, in order.
    pub providers: Vec<ProviderConfig>,

    /// How many days to walk backward when probing for data.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// One forecast data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Short identifier, used in output filenames.
    pub id: String,

    /// Public bucket name.
    pub bucket: String,

    /// Bucket region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Prefix template with `{date}` (YYYYMMDD) and `{cycle}` (zero-padded
    /// hour) placeholders.
    pub prefix_template: String,

    /// Forecast-hour markers in preference order. Empty means any file with
    /// the right extension.
    #[serde(default)]
    pub markers: Vec<String>,

    /// Required filename extension.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Model run cycles (UTC hours).
    #[serde(default = "default_cycles")]
    pub cycles: Vec<u32>,
}

fn default_lookback_days() -> u32 {
    5
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_extension() -> String {
    ".grib2".to_string()
}

fn default_cycles() -> Vec<u32> {
    vec![0, 6, 12, 18]
}

impl ProviderConfig {
    /// Expand the prefix template for a specific run.
    pub fn prefix_for(&self, cycle: &ForecastCycle) -> String {
        self.prefix_template
            .replace("{date}", &cycle.date)
            .replace("{cycle}", &format!("{:02}", cycle.hour))
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfig {
                    id: "aifs".to_string(),
                    bucket: "ecmwf-forecasts".to_string(),
                    region: "eu-central-1".to_string(),
                    prefix_template: "{date}/{cycle}z/aifs-single/0p25/oper/".to_string(),
                    markers: vec![],
                    extension: ".grib2".to_string(),
                    cycles: default_cycles(),
                },
                ProviderConfig {
                    id: "graphcast".to_string(),
                    bucket: "noaa-nws-graphcastgfs-pds".to_string(),
                    region: default_region(),
                    prefix_template: "graphcastgfs.{date}/{cycle}/forecasts_13_levels/"
                        .to_string(),
                    markers: vec!["f006".to_string(), "f012".to_string(), "f000".to_string()],
                    extension: ".grib2".to_string(),
                    cycles: default_cycles(),
                },
                ProviderConfig {
                    id: "fourcastnet".to_string(),
                    bucket: "noaa-nws-fourcastnetgfs-pds".to_string(),
                    region: default_region(),
                    prefix_template: "fcngfs.{date}/{cycle}/".to_string(),
                    markers: vec!["f006".to_string(), "f012".to_string(), "f000".to_string()],
                    extension: ".grib2".to_string(),
                    cycles: default_cycles(),
                },
            ],
            lookback_days: default_lookback_days(),
        }
    }
}

impl SnapshotConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Keep only the named provider.
    pub fn select_provider(&mut self, id: &str) -> Result<()> {
        self.providers.retain(|p| p.id == id);
        if self.providers.is_empty() {
            anyhow::bail!("Unknown provider: {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_expansion() {
        let provider = &SnapshotConfig::default().providers[1];
        let cycle = ForecastCycle::new("20240205", 6);

        assert_eq!(
            provider.prefix_for(&cycle),
            "graphcastgfs.20240205/06/forecasts_13_levels/"
        );
    }

    #[test]
    fn test_ecmwf_cycle_padding() {
        let provider = &SnapshotConfig::default().providers[0];
        let cycle = ForecastCycle::new("20240205", 0);

        assert_eq!(
            provider.prefix_for(&cycle),
            "20240205/00z/aifs-single/0p25/oper/"
        );
    }

    #[test]
    fn test_yaml_round_trip_with_defaults() {
        let yaml = r#"
providers:
  - id: test
    bucket: some-bucket
    prefix_template: "run.{date}/{cycle}/"
"#;
        let config: SnapshotConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.lookback_days, 5);
        let p = &config.providers[0];
        assert_eq!(p.region, "us-east-1");
        assert_eq!(p.extension, ".grib2");
        assert_eq!(p.cycles, vec![0, 6, 12, 18]);
        assert!(p.markers.is_empty());
    }

    #[test]
    fn test_select_provider() {
        let mut config = SnapshotConfig::default();
        config.select_provider("graphcast").unwrap();
        assert_eq!(config.providers.len(), 1);

        let mut config = SnapshotConfig::default();
        assert!(config.select_provider("nope").is_err());
    }
}
