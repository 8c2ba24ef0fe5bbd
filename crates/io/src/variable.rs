//! The fixed set of environmental indicator variables.

use std::fmt;
use std::str::FromStr;

use crate::error::IoError;

/// One of the five monthly environmental indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// Normalized difference vegetation index.
    Ndvi,
    /// Land-surface temperature (degrees Celsius).
    Lst,
    /// Accumulated rainfall.
    Rainfall,
    /// Fractional soil-moisture content.
    SoilMoisture,
    /// Active-fire detection count.
    FireCount,
}

impl Variable {
    /// All variables in canonical order (the order of output columns).
    pub const ALL: [Variable; 5] = [
        Variable::Ndvi,
        Variable::Lst,
        Variable::Rainfall,
        Variable::SoilMoisture,
        Variable::FireCount,
    ];

    /// Canonical uppercase name, as used in the `variable` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Ndvi => "NDVI",
            Variable::Lst => "LST",
            Variable::Rainfall => "RAINFALL",
            Variable::SoilMoisture => "SOILMOISTURE",
            Variable::FireCount => "FIRECOUNT",
        }
    }

    /// Lowercase name, used for file names and column prefixes
    /// (`ndvi.parquet`, `dtw_ndvi_flag`).
    pub fn as_lower(&self) -> &'static str {
        match self {
            Variable::Ndvi => "ndvi",
            Variable::Lst => "lst",
            Variable::Rainfall => "rainfall",
            Variable::SoilMoisture => "soilmoisture",
            Variable::FireCount => "firecount",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = IoError;

    /// Parses the canonical uppercase name. Matching is case-insensitive so
    /// upstream exports that emit `SoilMoisture` or `ndvi` still load.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NDVI" => Ok(Variable::Ndvi),
            "LST" => Ok(Variable::Lst),
            "RAINFALL" => Ok(Variable::Rainfall),
            "SOILMOISTURE" => Ok(Variable::SoilMoisture),
            "FIRECOUNT" => Ok(Variable::FireCount),
            _ => Err(IoError::UnknownVariable {
                name: s.to_string(),
                row: 0,
            }),
        }
    }
}
