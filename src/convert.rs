//! Bridges TOML configuration into typed crate configs.

use anyhow::{Context, Result, bail};

use gaia_calendar::StudyPeriod;
use gaia_dtw::{DtwConfig, ThresholdModel, ThresholdScope};
use gaia_filter::ValueRange;
use gaia_io::{Compression, Variable, WriterConfig};

use crate::config::{AnomalyToml, GaiaConfig, IoConfig, VariableToml};

/// Resolved cleaning policy for one variable: the physical range, the gap
/// classification threshold, and whether the imputation cascade runs at all.
#[derive(Debug, Clone, Copy)]
pub struct VariablePolicy {
    pub range: ValueRange,
    pub gap_threshold: usize,
    pub fill: bool,
}

/// Built-in per-variable defaults.
///
/// Ranges mirror the upstream cleaning rules: NDVI is a normalized index,
/// LST a surface temperature in degrees Celsius, soil moisture a fraction,
/// and rainfall/fire count are non-negative accumulations. All five
/// variables run the full cascade by default; the `fill` switch exists so
/// a deployment can opt counts out.
fn default_policy(variable: Variable) -> VariablePolicy {
    let range = match variable {
        Variable::Ndvi => ValueRange::bounded(-0.2, 1.0),
        Variable::Lst => ValueRange::bounded(5.0, 55.0),
        Variable::SoilMoisture => ValueRange::bounded(0.0, 1.0),
        Variable::Rainfall => ValueRange::at_least(0.0),
        Variable::FireCount => ValueRange::at_least(0.0),
    }
    .expect("built-in ranges are valid");

    VariablePolicy {
        range,
        gap_threshold: 2,
        fill: true,
    }
}

/// Builds the per-variable policy table, applying TOML overrides on top of
/// the built-in defaults.
pub fn build_policies(config: &GaiaConfig) -> Result<Vec<(Variable, VariablePolicy)>> {
    // Reject overrides for variable names outside the fixed set.
    for name in config.variables.keys() {
        name.parse::<Variable>()
            .with_context(|| format!("unknown variable '{name}' in [variables]"))?;
    }

    Variable::ALL
        .iter()
        .map(|&v| {
            let mut policy = default_policy(v);
            if let Some(over) = config.variables.get(v.as_str()) {
                policy = apply_override(v, policy, over)?;
            }
            Ok((v, policy))
        })
        .collect()
}

fn apply_override(
    variable: Variable,
    policy: VariablePolicy,
    over: &VariableToml,
) -> Result<VariablePolicy> {
    let min = over.min.or(policy.range.min());
    let max = over.max.or(policy.range.max());
    let range = ValueRange::new(min, max)
        .with_context(|| format!("invalid range override for {variable}"))?;

    let gap_threshold = over.gap_threshold.unwrap_or(policy.gap_threshold);
    if gap_threshold == 0 {
        bail!("gap_threshold for {variable} must be >= 1");
    }

    Ok(VariablePolicy {
        range,
        gap_threshold,
        fill: over.fill.unwrap_or(policy.fill),
    })
}

/// Builds the configured study period, if one is set.
pub fn build_study_period(config: &GaiaConfig) -> Result<Option<StudyPeriod>> {
    config
        .study
        .as_ref()
        .map(|s| {
            StudyPeriod::from_years(s.start_year, s.end_year)
                .context("invalid [study] period")
        })
        .transpose()
}

/// Builds the Parquet writer configuration from `[io]`.
pub fn build_writer_config(io: &IoConfig) -> Result<WriterConfig> {
    let compression = match io.compression.as_str() {
        "none" => Compression::None,
        "snappy" => Compression::Snappy,
        "zstd" => Compression::Zstd,
        other => bail!("unknown compression '{other}' (expected none, snappy, or zstd)"),
    };
    Ok(WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(io.row_group_size))
}

/// Builds the anomaly-scoring configuration from `[anomaly]`.
pub fn build_dtw_config(anomaly: &AnomalyToml) -> Result<DtwConfig> {
    let model = match anomaly.model.as_str() {
        "mean-std" => ThresholdModel::MeanStd { k: anomaly.k },
        "iqr" => ThresholdModel::Iqr,
        "percentile" => ThresholdModel::Percentile {
            p: anomaly.percentile,
        },
        other => bail!("unknown threshold model '{other}' (expected mean-std, iqr, or percentile)"),
    };
    let scope = match anomaly.scope.as_str() {
        "local" => ThresholdScope::Local,
        "global" => ThresholdScope::Global,
        other => bail!("unknown threshold scope '{other}' (expected local or global)"),
    };

    let config = DtwConfig::default().with_model(model).with_scope(scope);
    config.validate().context("invalid [anomaly] settings")?;
    Ok(config)
}

/// Validates the baseline trim ratio from `[baseline]`.
pub fn build_trim_ratio(config: &GaiaConfig) -> Result<f64> {
    let ratio = config.baseline.trim_ratio;
    if !(0.0..0.5).contains(&ratio) {
        bail!("baseline trim_ratio must be in [0, 0.5), got {ratio}");
    }
    Ok(ratio)
}
