//! Row-level record types shared between readers and writers.

use std::collections::BTreeMap;
use std::fmt;

use crate::variable::Variable;

/// Identity of one spatial unit: a subdistrict within its district and
/// province. The triple of names is the unit's key; ordering is
/// lexicographic so grouped iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitKey {
    /// Province name.
    pub province: String,
    /// District name.
    pub district: String,
    /// Subdistrict name.
    pub subdistrict: String,
}

impl UnitKey {
    /// Creates a key from the three name components.
    pub fn new(
        province: impl Into<String>,
        district: impl Into<String>,
        subdistrict: impl Into<String>,
    ) -> Self {
        Self {
            province: province.into(),
            district: district.into(),
            subdistrict: subdistrict.into(),
        }
    }

    /// The (province, district) prefix identifying the unit's district.
    pub fn district_key(&self) -> (String, String) {
        (self.province.clone(), self.district.clone())
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.province, self.district, self.subdistrict
        )
    }
}

/// One monthly observation of one variable for one spatial unit.
///
/// `value` is `None` when the measurement is missing; key fields are always
/// present (a record with a null key never survives ingestion).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The spatial unit the observation belongs to.
    pub unit: UnitKey,
    /// The observed variable.
    pub variable: Variable,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u8,
    /// The measurement, or `None` when missing.
    pub value: Option<f64>,
}

/// Per-variable anomaly cells for one unit-year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreCells {
    /// DTW distance of the year curve to the baseline.
    pub distance: Option<f64>,
    /// Cutoff the distance was compared against.
    pub threshold: Option<f64>,
    /// `distance > threshold`.
    pub flag: Option<bool>,
    /// Z-score against the unit's own distance history.
    pub z: Option<f64>,
    /// `z > 2`.
    pub z_flag: Option<bool>,
}

/// One output row of the anomaly table: a unit-year with per-variable cells.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRow {
    /// The spatial unit.
    pub unit: UnitKey,
    /// The scored year.
    pub year: i32,
    /// Cells per variable; variables with no data are simply absent and
    /// serialize as nulls.
    pub scores: BTreeMap<Variable, ScoreCells>,
}

/// One output row of the baseline table: a unit's seasonal value for one
/// calendar month of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRow {
    /// The spatial unit.
    pub unit: UnitKey,
    /// The variable the baseline belongs to.
    pub variable: Variable,
    /// Calendar month, 1..=12.
    pub month: u8,
    /// Trimmed-mean seasonal value, or `None` when the month had no sample.
    pub value: Option<f64>,
}
