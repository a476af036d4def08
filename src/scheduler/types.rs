use crate::model::{DutySlot, SlotKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Options de recherche (budget d'essais, graine, parallélisme)
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub iterations: usize,
    pub batch_size: usize,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub time_budget: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            iterations: 2_000,
            batch_size: 256,
            seed: None,
            parallel: true,
            time_budget: None,
        }
    }
}

impl SearchOptions {
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DoubleBooking,
    AbsentAssigned,
    RestrictedAssigned,
    Ineligible,
    PostCallOnCall,
    PostCallElot,
    WeekendSplit,
    OffCadence,
    Unfilled,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::DoubleBooking => "double_booking",
            ViolationKind::AbsentAssigned => "absent",
            ViolationKind::RestrictedAssigned => "restricted",
            ViolationKind::Ineligible => "ineligible",
            ViolationKind::PostCallOnCall => "post_call_on_call",
            ViolationKind::PostCallElot => "post_call_elot",
            ViolationKind::WeekendSplit => "weekend_split",
            ViolationKind::OffCadence => "off_cadence",
            ViolationKind::Unfilled => "unfilled",
        }
    }
}

/// Problème détecté sur un tableau (généré ou modifié à la main).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    pub date: NaiveDate,
    pub slot: Option<DutySlot>,
    pub staff: Option<String>,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.kind.as_str())?;
        if let Some(slot) = self.slot {
            write!(f, " [{slot}]")?;
        }
        if let Some(staff) = &self.staff {
            write!(f, " {staff}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid calendar input: year {year}, month {month}")]
    InvalidCalendarInput { year: i32, month: u32 },
    #[error("no staff eligible for {0}")]
    EmptyStaffPool(SlotKind),
    #[error("duplicate staff name: {0}")]
    DuplicateStaff(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid search: {0}")]
    InvalidSearch(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
