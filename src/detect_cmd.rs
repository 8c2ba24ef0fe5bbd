use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use gaia_baseline::{Baseline, is_complete, seasonal_baseline};
use gaia_dtw::{ThresholdScope, dtw_distance, flag_distances};
use gaia_io::{
    AnomalyRow, BaselineRow, Observation, ScoreCells, UnitKey, Variable, read_cleaned,
    write_anomalies, write_baselines,
};

use crate::cli::DetectArgs;
use crate::config::GaiaConfig;
use crate::convert;

/// Run anomaly detection: baselines, DTW distances, thresholds, flags.
pub fn run(args: DetectArgs) -> Result<()> {
    let config = GaiaConfig::load(&args.config)?;

    let clean_dir = args.input.unwrap_or_else(|| config.io.clean_dir.clone());
    let anomaly_dir = args.output.unwrap_or_else(|| config.io.anomaly_dir.clone());
    std::fs::create_dir_all(&anomaly_dir)
        .with_context(|| format!("failed to create output dir: {}", anomaly_dir.display()))?;

    let trim_ratio = convert::build_trim_ratio(&config)?;
    let dtw_cfg = convert::build_dtw_config(&config.anomaly)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    // Merge the per-variable cleaned tables on the spatial key.
    let mut merged: BTreeMap<UnitKey, BTreeMap<Variable, Vec<Observation>>> = BTreeMap::new();
    let mut n_tables = 0usize;
    for variable in Variable::ALL {
        let path = clean_dir.join(format!("{}.parquet", variable.as_lower()));
        if !path.exists() {
            warn!(variable = %variable, path = %path.display(), "cleaned table missing; skipped");
            continue;
        }
        let rows = read_cleaned(&path, variable)
            .with_context(|| format!("failed to read cleaned table: {}", path.display()))?;
        info!(variable = %variable, n_rows = rows.len(), "cleaned table loaded");
        n_tables += 1;
        for row in rows {
            merged
                .entry(row.unit.clone())
                .or_default()
                .entry(variable)
                .or_default()
                .push(row);
        }
    }
    if n_tables == 0 {
        bail!(
            "no cleaned tables found in {} (run `gaia clean` first)",
            clean_dir.display()
        );
    }
    info!(n_units = merged.len(), "cleaned dataset merged");

    // Score every (unit, variable) independently.
    let tasks: Vec<(&UnitKey, Variable, &Vec<Observation>)> = merged
        .iter()
        .flat_map(|(unit, vars)| vars.iter().map(move |(v, rows)| (unit, *v, rows)))
        .collect();

    let scores = tasks
        .par_iter()
        .map(|(unit, variable, rows)| score_unit_variable(unit, *variable, rows, trim_ratio))
        .collect::<Result<Vec<_>>>()?;

    // Threshold pools: the unit's own history, or the variable-wide
    // population when the global scope is configured.
    let global_pools: BTreeMap<Variable, Vec<f64>> = match dtw_cfg.scope() {
        ThresholdScope::Local => BTreeMap::new(),
        ThresholdScope::Global => {
            let mut pools: BTreeMap<Variable, Vec<f64>> = BTreeMap::new();
            for s in &scores {
                pools
                    .entry(s.variable)
                    .or_default()
                    .extend(s.distances.iter().filter_map(|d| *d));
            }
            pools
        }
    };

    let mut anomaly_rows: BTreeMap<(UnitKey, i32), AnomalyRow> = BTreeMap::new();
    let mut baseline_rows: Vec<BaselineRow> = Vec::new();
    let mut n_flagged = 0usize;

    for score in &scores {
        let local_pool: Vec<f64> = score.distances.iter().filter_map(|d| *d).collect();
        let pool = match dtw_cfg.scope() {
            ThresholdScope::Local => &local_pool,
            ThresholdScope::Global => &global_pools[&score.variable],
        };
        let flags = flag_distances(&score.distances, pool, dtw_cfg.model());

        for ((year, distance), year_flags) in
            score.years.iter().zip(score.distances.iter()).zip(flags)
        {
            let row = anomaly_rows
                .entry((score.unit.clone(), *year))
                .or_insert_with(|| AnomalyRow {
                    unit: score.unit.clone(),
                    year: *year,
                    scores: BTreeMap::new(),
                });
            row.scores.insert(
                score.variable,
                ScoreCells {
                    distance: *distance,
                    threshold: year_flags.threshold,
                    flag: year_flags.flag,
                    z: year_flags.z,
                    z_flag: year_flags.z_flag,
                },
            );
            if year_flags.flag == Some(true) {
                n_flagged += 1;
            }
        }

        for (i, value) in score.baseline.iter().enumerate() {
            baseline_rows.push(BaselineRow {
                unit: score.unit.clone(),
                variable: score.variable,
                month: i as u8 + 1,
                value: *value,
            });
        }
    }

    let anomaly_rows: Vec<AnomalyRow> = anomaly_rows.into_values().collect();
    info!(
        n_rows = anomaly_rows.len(),
        n_flagged, "anomaly records assembled"
    );

    let anomalies_path = anomaly_dir.join("anomalies.parquet");
    write_anomalies(&anomalies_path, &anomaly_rows, &writer_cfg)
        .with_context(|| format!("failed to write anomalies: {}", anomalies_path.display()))?;
    info!(path = %anomalies_path.display(), "anomaly table written");

    let baselines_path = anomaly_dir.join("baselines.parquet");
    write_baselines(&baselines_path, &baseline_rows, &writer_cfg)
        .with_context(|| format!("failed to write baselines: {}", baselines_path.display()))?;
    info!(path = %baselines_path.display(), "baseline table written");

    Ok(())
}

/// Baseline and per-year DTW distances for one (unit, variable).
struct UnitVariableScore {
    unit: UnitKey,
    variable: Variable,
    baseline: Baseline,
    years: Vec<i32>,
    distances: Vec<Option<f64>>,
}

/// Computes the seasonal baseline and one DTW distance per year.
///
/// A year's distance is defined only when its curve has all 12 months
/// present and the baseline is fully defined; otherwise it stays `None` and
/// is excluded from threshold statistics downstream.
fn score_unit_variable(
    unit: &UnitKey,
    variable: Variable,
    rows: &[Observation],
    trim_ratio: f64,
) -> Result<UnitVariableScore> {
    let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
    let months: Vec<u8> = rows.iter().map(|r| r.month).collect();

    let baseline = seasonal_baseline(&values, &months, trim_ratio)
        .with_context(|| format!("baseline failed for {unit} {variable}"))?;
    let baseline_complete = is_complete(&baseline);
    let baseline_curve: Vec<f64> = baseline.iter().filter_map(|b| *b).collect();

    // Assemble per-year curves (January..December).
    let mut curves: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for row in rows {
        curves.entry(row.year).or_insert([None; 12])[(row.month - 1) as usize] = row.value;
    }

    let mut years = Vec::with_capacity(curves.len());
    let mut distances = Vec::with_capacity(curves.len());
    for (year, curve) in curves {
        years.push(year);
        let full: Option<Vec<f64>> = curve.iter().copied().collect();
        let distance = match (full, baseline_complete) {
            (Some(x), true) => {
                let d = dtw_distance(&x, &baseline_curve)
                    .with_context(|| format!("DTW failed for {unit} {variable} {year}"))?;
                Some(d)
            }
            _ => {
                debug!(
                    unit = %unit,
                    variable = %variable,
                    year,
                    "incomplete curve or baseline; distance undefined"
                );
                None
            }
        };
        distances.push(distance);
    }

    Ok(UnitVariableScore {
        unit: unit.clone(),
        variable,
        baseline,
        years,
        distances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_for(unit: &UnitKey, years: &[i32], seasonal: &[f64; 12]) -> Vec<Observation> {
        let mut rows = Vec::new();
        for &year in years {
            for m in 0..12usize {
                rows.push(Observation {
                    unit: unit.clone(),
                    variable: Variable::Ndvi,
                    year,
                    month: m as u8 + 1,
                    value: Some(seasonal[m]),
                });
            }
        }
        rows
    }

    #[test]
    fn identical_years_have_zero_distance() {
        let unit = UnitKey::new("P", "D", "S");
        let seasonal = [
            0.40, 0.42, 0.46, 0.50, 0.56, 0.62, 0.66, 0.64, 0.58, 0.50, 0.44, 0.40,
        ];
        let rows = rows_for(&unit, &[2019, 2020, 2021], &seasonal);
        let score = score_unit_variable(&unit, Variable::Ndvi, &rows, 0.1).unwrap();

        assert_eq!(score.years, vec![2019, 2020, 2021]);
        for d in &score.distances {
            assert!(d.unwrap().abs() < 1e-12);
        }
        assert!(is_complete(&score.baseline));
    }

    #[test]
    fn incomplete_year_has_undefined_distance() {
        let unit = UnitKey::new("P", "D", "S");
        let seasonal = [0.5; 12];
        let mut rows = rows_for(&unit, &[2019, 2020], &seasonal);
        // Knock out one month of 2020.
        let idx = rows
            .iter()
            .position(|r| r.year == 2020 && r.month == 6)
            .unwrap();
        rows[idx].value = None;

        let score = score_unit_variable(&unit, Variable::Ndvi, &rows, 0.1).unwrap();
        assert_eq!(score.distances[0], Some(0.0));
        assert_eq!(score.distances[1], None);
    }

    #[test]
    fn partial_year_coverage_has_undefined_distance() {
        let unit = UnitKey::new("P", "D", "S");
        let seasonal = [0.5; 12];
        let mut rows = rows_for(&unit, &[2019, 2020], &seasonal);
        // 2021 appears with only three months (an edge year of the period).
        for m in 1..=3u8 {
            rows.push(Observation {
                unit: unit.clone(),
                variable: Variable::Ndvi,
                year: 2021,
                month: m,
                value: Some(0.5),
            });
        }

        let score = score_unit_variable(&unit, Variable::Ndvi, &rows, 0.1).unwrap();
        assert_eq!(score.years, vec![2019, 2020, 2021]);
        assert_eq!(score.distances[2], None);
    }
}
