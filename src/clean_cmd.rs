use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use gaia_calendar::{MonthKey, StudyPeriod, expand_to_period, observed_span};
use gaia_filter::{FilterSummary, apply_filters};
use gaia_impute::{FallbackMeans, impute_series};
use gaia_io::{Observation, UnitKey, Variable, read_observations, write_cleaned};

use crate::cli::CleanArgs;
use crate::config::GaiaConfig;
use crate::convert::{self, VariablePolicy};

/// Run the cleaning pipeline: filter, grid-complete, impute, write.
pub fn run(args: CleanArgs) -> Result<()> {
    let config = GaiaConfig::load(&args.config)?;

    let input = args
        .input
        .or_else(|| config.io.input.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no input path: set [io].input in config or use --input")
        })?;
    let clean_dir = args.output.unwrap_or_else(|| config.io.clean_dir.clone());
    std::fs::create_dir_all(&clean_dir)
        .with_context(|| format!("failed to create output dir: {}", clean_dir.display()))?;

    let policies = convert::build_policies(&config)?;
    let study = convert::build_study_period(&config)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    info!(path = %input.display(), "reading raw observations");
    let observations = read_observations(&input)
        .with_context(|| format!("failed to read observations: {}", input.display()))?;
    info!(n_rows = observations.len(), "raw observations loaded");

    // Partition by variable; each variable is cleaned independently.
    let mut by_variable: BTreeMap<Variable, Vec<Observation>> = BTreeMap::new();
    for obs in observations {
        by_variable.entry(obs.variable).or_default().push(obs);
    }

    for (variable, policy) in policies {
        let rows = by_variable.remove(&variable).unwrap_or_default();
        let cleaned = clean_variable(variable, &policy, rows, study)
            .with_context(|| format!("cleaning failed for {variable}"))?;

        let path = clean_dir.join(format!("{}.parquet", variable.as_lower()));
        write_cleaned(&path, &cleaned, &writer_cfg)
            .with_context(|| format!("failed to write cleaned table: {}", path.display()))?;
        info!(
            variable = %variable,
            n_rows = cleaned.len(),
            path = %path.display(),
            "cleaned table written"
        );
    }

    Ok(())
}

/// Filters, grid-completes, and imputes one variable across all units.
fn clean_variable(
    variable: Variable,
    policy: &VariablePolicy,
    rows: Vec<Observation>,
    study: Option<StudyPeriod>,
) -> Result<Vec<Observation>> {
    if rows.is_empty() {
        warn!(variable = %variable, "no observations for variable");
        return Ok(Vec::new());
    }

    // The month span comes from every row (a null measurement still marks
    // its month as part of the axis); only present values occupy grid slots.
    let all_months: Vec<MonthKey> = rows
        .iter()
        .map(|r| MonthKey::new(r.year, r.month).context("invalid month in observations"))
        .collect::<Result<_>>()?;
    let period = match study {
        Some(p) => p,
        None => {
            let (min, max) = observed_span(&all_months).expect("rows are non-empty");
            StudyPeriod::new(min, max).expect("span is ordered")
        }
    };
    let axis: Vec<MonthKey> = period.months().collect();
    let months = period.calendar_months();

    // Group present values per unit, dropping out-of-period strays.
    let mut per_unit: BTreeMap<UnitKey, Vec<(MonthKey, f64)>> = BTreeMap::new();
    let mut dropped = 0usize;
    for (row, key) in rows.iter().zip(all_months.iter()) {
        let entry = per_unit.entry(row.unit.clone()).or_default();
        if period.index_of(key).is_none() {
            dropped += 1;
            continue;
        }
        if let Some(v) = row.value {
            entry.push((*key, v));
        }
    }
    if dropped > 0 {
        warn!(
            variable = %variable,
            n_dropped = dropped,
            "observations outside the study period were dropped"
        );
    }

    // Grid completion + filtering, per unit.
    let mut units: Vec<UnitKey> = Vec::with_capacity(per_unit.len());
    let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(per_unit.len());
    let mut filter_totals = FilterSummary::default();
    for (unit, obs) in per_unit {
        let mut dense = expand_to_period(&obs, &period)
            .with_context(|| format!("grid completion failed for {unit}"))?;
        let summary = apply_filters(&mut dense, &policy.range);
        filter_totals.range_removed += summary.range_removed;
        filter_totals.iqr_removed += summary.iqr_removed;
        units.push(unit);
        series.push(dense);
    }
    info!(
        variable = %variable,
        n_units = units.len(),
        n_months = period.n_months(),
        range_removed = filter_totals.range_removed,
        iqr_removed = filter_totals.iqr_removed,
        "filtered and grid-completed"
    );

    if policy.fill {
        // Fallback means come from the filtered, pre-imputation values so no
        // unit's estimate feeds on another unit's fill.
        let fallbacks = build_fallbacks(&units, &series, &months);

        let summaries = series
            .par_iter_mut()
            .zip(fallbacks.par_iter())
            .map(|(s, fb)| impute_series(s, &months, policy.gap_threshold, fb))
            .collect::<Result<Vec<_>, _>>()
            .context("imputation failed")?;

        let mut unresolved = 0usize;
        for (unit, summary) in units.iter().zip(summaries.iter()) {
            if summary.resolved {
                debug!(
                    variable = %variable,
                    unit = %unit,
                    filled = summary.total_filled(),
                    "series imputed"
                );
            } else {
                unresolved += 1;
                warn!(
                    variable = %variable,
                    unit = %unit,
                    "no observations to impute from; series left missing"
                );
            }
        }
        if unresolved > 0 {
            warn!(
                variable = %variable,
                n_unresolved = unresolved,
                "unresolved series remain missing in the output"
            );
        }
    } else {
        debug!(variable = %variable, "imputation disabled by policy");
    }

    // One output row per unit per month of the period.
    let mut out = Vec::with_capacity(units.len() * axis.len());
    for (unit, dense) in units.iter().zip(series.iter()) {
        for (key, value) in axis.iter().zip(dense.iter()) {
            out.push(Observation {
                unit: unit.clone(),
                variable,
                year: key.year(),
                month: key.month(),
                value: *value,
            });
        }
    }
    Ok(out)
}

/// Aggregates district, province, and global per-calendar-month means from
/// the filtered series.
fn build_fallbacks(
    units: &[UnitKey],
    series: &[Vec<Option<f64>>],
    months: &[u8],
) -> Vec<FallbackMeans> {
    type Acc = ([f64; 12], [usize; 12]);

    let mut district_acc: BTreeMap<(String, String), Acc> = BTreeMap::new();
    let mut province_acc: BTreeMap<String, Acc> = BTreeMap::new();
    let mut global_sum = 0.0;
    let mut global_n = 0usize;

    for (unit, dense) in units.iter().zip(series.iter()) {
        let d = district_acc.entry(unit.district_key()).or_default();
        let p = province_acc.entry(unit.province.clone()).or_default();
        for (v, &m) in dense.iter().zip(months.iter()) {
            if let Some(x) = v {
                let i = (m - 1) as usize;
                d.0[i] += x;
                d.1[i] += 1;
                p.0[i] += x;
                p.1[i] += 1;
                global_sum += x;
                global_n += 1;
            }
        }
    }

    let finish = |acc: &Acc| -> [Option<f64>; 12] {
        let mut means = [None; 12];
        for i in 0..12 {
            if acc.1[i] > 0 {
                means[i] = Some(acc.0[i] / acc.1[i] as f64);
            }
        }
        means
    };

    let global = (global_n > 0).then(|| global_sum / global_n as f64);

    units
        .iter()
        .map(|unit| FallbackMeans {
            district: finish(&district_acc[&unit.district_key()]),
            province: finish(&province_acc[&unit.province]),
            global,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(unit: &UnitKey, year: i32, month: u8, value: Option<f64>) -> Observation {
        Observation {
            unit: unit.clone(),
            variable: Variable::Ndvi,
            year,
            month,
            value,
        }
    }

    fn default_ndvi_policy() -> VariablePolicy {
        let config: GaiaConfig = toml::from_str("").unwrap();
        convert::build_policies(&config)
            .unwrap()
            .into_iter()
            .find(|(v, _)| *v == Variable::Ndvi)
            .unwrap()
            .1
    }

    #[test]
    fn clean_variable_produces_dense_complete_output() {
        let a = UnitKey::new("P", "D", "A");
        let b = UnitKey::new("P", "D", "B");
        let mut rows = Vec::new();
        // Unit A: two full years minus a hole in 2020-03.
        for year in [2020, 2021] {
            for month in 1..=12u8 {
                let v = if year == 2020 && month == 3 {
                    None
                } else {
                    Some(0.4 + month as f64 * 0.01)
                };
                rows.push(obs(&a, year, month, v));
            }
        }
        // Unit B: sparse, every third month.
        for year in [2020, 2021] {
            for month in [1u8, 4, 7, 10] {
                rows.push(obs(&b, year, month, Some(0.5)));
            }
        }

        let out = clean_variable(Variable::Ndvi, &default_ndvi_policy(), rows, None).unwrap();

        // 2 units x 24 months, all values present.
        assert_eq!(out.len(), 48);
        assert!(out.iter().all(|r| r.value.is_some()));
    }

    #[test]
    fn clean_variable_respects_configured_period() {
        let a = UnitKey::new("P", "D", "A");
        let rows = vec![
            obs(&a, 2019, 12, Some(0.4)), // outside, dropped
            obs(&a, 2020, 1, Some(0.5)),
        ];
        let study = StudyPeriod::from_years(2020, 2020).unwrap();
        let out =
            clean_variable(Variable::Ndvi, &default_ndvi_policy(), rows, Some(study)).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|r| r.year == 2020));
    }

    #[test]
    fn degenerate_unit_keeps_missing_values() {
        // Unit B has no valid NDVI at all (all out of range); with no other
        // data anywhere the series must come back missing, not zero-filled.
        let b = UnitKey::new("P", "D", "B");
        let rows = vec![
            obs(&b, 2020, 1, Some(7.0)),
            obs(&b, 2020, 2, Some(8.0)),
            obs(&b, 2020, 3, None),
        ];
        let out = clean_variable(Variable::Ndvi, &default_ndvi_policy(), rows, None).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.value.is_none()));
    }

    #[test]
    fn fill_disabled_leaves_gaps() {
        let a = UnitKey::new("P", "D", "A");
        let rows = vec![
            obs(&a, 2020, 1, Some(0.4)),
            obs(&a, 2020, 3, Some(0.5)),
        ];
        let mut policy = default_ndvi_policy();
        policy.fill = false;
        let out = clean_variable(Variable::Ndvi, &policy, rows, None).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].value, None);
    }

    #[test]
    fn sibling_units_provide_district_fallback() {
        let a = UnitKey::new("P", "D", "A");
        let b = UnitKey::new("P", "D", "B");
        let mut rows = Vec::new();
        // Unit A: fully observed single year.
        for month in 1..=12u8 {
            rows.push(obs(&a, 2020, month, Some(0.30 + month as f64 * 0.01)));
        }
        // Unit B: only January observed; everything else resolves through
        // the district means.
        rows.push(obs(&b, 2020, 1, Some(0.42)));

        let out = clean_variable(Variable::Ndvi, &default_ndvi_policy(), rows, None).unwrap();
        let b_rows: Vec<&Observation> = out.iter().filter(|r| r.unit == b).collect();
        assert_eq!(b_rows.len(), 12);
        assert!(b_rows.iter().all(|r| r.value.is_some()));
        // February takes the district (= unit A) February mean.
        assert!((b_rows[1].value.unwrap() - 0.32).abs() < 1e-12);
    }
}
