// Glucose units and sample domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// mg/dL per mmol/L, the fixed factor between the two glucose scales.
const MG_DL_PER_MMOL_L: f64 = 18.0182;

/// The unit glucose records are persisted in, whatever the caller configured.
pub const STORE_UNIT: GlucoseUnit = GlucoseUnit::MgDl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mmol/L")]
    MmolL,
    #[serde(rename = "mg/dL")]
    MgDl,
}

impl GlucoseUnit {
    /// Convert a value expressed in `self` into `to`.
    /// Identity when the units match; pure and total over finite values.
    pub fn convert(self, value: f64, to: GlucoseUnit) -> f64 {
        match (self, to) {
            (GlucoseUnit::MmolL, GlucoseUnit::MgDl) => value * MG_DL_PER_MMOL_L,
            (GlucoseUnit::MgDl, GlucoseUnit::MmolL) => value / MG_DL_PER_MMOL_L,
            _ => value,
        }
    }

    /// Admissible glucose range for this unit.
    pub fn legal_range(self) -> RangeInclusive<f64> {
        match self {
            GlucoseUnit::MmolL => 3.0..=10.0,
            GlucoseUnit::MgDl => 54.0..=180.0,
        }
    }

    /// Clamp a value into this unit's admissible range.
    pub fn clamp(self, value: f64) -> f64 {
        let range = self.legal_range();
        value.clamp(*range.start(), *range.end())
    }
}

impl fmt::Display for GlucoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlucoseUnit::MmolL => write!(f, "mmol/L"),
            GlucoseUnit::MgDl => write!(f, "mg/dL"),
        }
    }
}

/// One glucose measurement, immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlucoseSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub unit: GlucoseUnit,
}

impl GlucoseSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, unit: GlucoseUnit) -> Self {
        Self {
            timestamp,
            value,
            unit,
        }
    }

    /// The sample's value expressed in the store's native unit.
    pub fn store_value(&self) -> f64 {
        self.unit.convert(self.value, STORE_UNIT)
    }
}
