use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Gaia configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaiaConfig {
    /// Study period in whole years. When omitted, each variable's period is
    /// derived from its earliest and latest observed month.
    #[serde(default)]
    pub study: Option<StudyToml>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,

    /// Per-variable policy overrides, keyed by canonical variable name
    /// (e.g. `[variables.NDVI]`).
    #[serde(default)]
    pub variables: BTreeMap<String, VariableToml>,

    /// Baseline settings.
    #[serde(default)]
    pub baseline: BaselineToml,

    /// Anomaly thresholding settings.
    #[serde(default)]
    pub anomaly: AnomalyToml,
}

impl GaiaConfig {
    /// Loads and parses the TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyToml {
    pub start_year: i32,
    pub end_year: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    pub input: Option<PathBuf>,
    #[serde(default = "default_clean_dir")]
    pub clean_dir: PathBuf,
    #[serde(default = "default_anomaly_dir")]
    pub anomaly_dir: PathBuf,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: None,
            clean_dir: default_clean_dir(),
            anomaly_dir: default_anomaly_dir(),
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_clean_dir() -> PathBuf {
    PathBuf::from("clean")
}
fn default_anomaly_dir() -> PathBuf {
    PathBuf::from("anomaly")
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

/// Per-variable policy overrides. Unset fields keep the built-in defaults
/// for that variable (see `convert::default_policy`).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct VariableToml {
    /// Lower physical bound; values below become missing.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper physical bound; values above become missing.
    #[serde(default)]
    pub max: Option<f64>,
    /// Missing runs shorter than this are interpolated; longer runs take
    /// the seasonal climatology.
    #[serde(default)]
    pub gap_threshold: Option<usize>,
    /// Whether the imputation cascade runs for this variable at all.
    #[serde(default)]
    pub fill: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineToml {
    #[serde(default = "default_trim_ratio")]
    pub trim_ratio: f64,
}

impl Default for BaselineToml {
    fn default() -> Self {
        Self {
            trim_ratio: default_trim_ratio(),
        }
    }
}

fn default_trim_ratio() -> f64 {
    0.1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyToml {
    /// Threshold model: "mean-std", "iqr", or "percentile".
    #[serde(default = "default_model")]
    pub model: String,
    /// Sigma multiplier for the mean-std model.
    #[serde(default = "default_k")]
    pub k: f64,
    /// Quantile probability for the percentile model.
    #[serde(default = "default_percentile")]
    pub percentile: f64,
    /// Statistics pool: "local" (per unit) or "global" (per variable).
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for AnomalyToml {
    fn default() -> Self {
        Self {
            model: default_model(),
            k: default_k(),
            percentile: default_percentile(),
            scope: default_scope(),
        }
    }
}

fn default_model() -> String {
    "mean-std".to_string()
}
fn default_k() -> f64 {
    2.0
}
fn default_percentile() -> f64 {
    0.95
}
fn default_scope() -> String {
    "local".to_string()
}
