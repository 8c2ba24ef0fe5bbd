//! Dense month-grid expansion.
//!
//! Takes a sparse set of monthly observations and lays it out on the full
//! study-period axis, leaving `None` where no observation exists. Purely
//! structural: present values are carried through untouched.

use crate::error::CalendarError;
use crate::month::MonthKey;
use crate::period::StudyPeriod;

/// Expands sparse `(month, value)` pairs into a dense series over `period`.
///
/// The output has exactly `period.n_months()` entries; position `i` holds the
/// value observed at `period.month_at(i)`, or `None` when that month has no
/// observation.
///
/// # Errors
///
/// Returns [`CalendarError::OutOfPeriod`] if an observation falls outside the
/// period (callers are expected to pre-filter strays), and
/// [`CalendarError::DuplicateMonth`] if two observations share a month.
pub fn expand_to_period(
    observed: &[(MonthKey, f64)],
    period: &StudyPeriod,
) -> Result<Vec<Option<f64>>, CalendarError> {
    let mut dense = vec![None; period.n_months()];

    for (key, value) in observed {
        let idx = period.index_of(key).ok_or(CalendarError::OutOfPeriod {
            year: key.year(),
            month: key.month(),
        })?;
        if dense[idx].is_some() {
            return Err(CalendarError::DuplicateMonth {
                year: key.year(),
                month: key.month(),
            });
        }
        dense[idx] = Some(*value);
    }

    Ok(dense)
}

/// Returns the earliest and latest observed months, or `None` for an empty
/// set. Used to derive the study period when none is configured.
pub fn observed_span(observed: &[MonthKey]) -> Option<(MonthKey, MonthKey)> {
    let min = observed.iter().min()?;
    let max = observed.iter().max()?;
    Some((*min, *max))
}
