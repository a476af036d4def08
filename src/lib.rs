#![forbid(unsafe_code)]
//! Garde — génération des tableaux de garde mensuels d'un service médical.
//!
//! - Astreintes de 1er/2e/3e appel, passive, ELOT, petit bloc, consultation plaies.
//! - Recherche Monte-Carlo best-of-N (parallèle) notée sur l'équité.
//! - Contrôle a posteriori de tout tableau, y compris modifié à la main.
//! - Entrées/sorties fichiers (CSV/JSON) en dehors du moteur.

pub mod calendar;
pub mod config;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use calendar::{month_days, Day};
pub use config::{load_config_from_file, MonthConfig, PassivePolicy, Penalties, Rules, Weights};
pub use model::{DutySlot, LeaveBook, LeaveRecord, Roster, RosterDay, SlotKind, Staff};
pub use scheduler::{
    Outcome, Progress, SchedError, Scheduler, SearchOptions, StaffAudit, Violation, ViolationKind,
};
pub use storage::{JsonStorage, Storage};
