use crate::model::SlotKind;
use crate::scheduler::SchedError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Configuration d'un mois : jours fériés et jours d'activité des postes
/// programmés (numéros de jour 1..=31).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthConfig {
    #[serde(default)]
    pub public_holidays: BTreeSet<u32>,
    #[serde(default)]
    pub elot_days: BTreeSet<u32>,
    #[serde(default)]
    pub minor_ot_days: BTreeSet<u32>,
    #[serde(default)]
    pub wound_days: BTreeSet<u32>,
    #[serde(default)]
    pub rules: Rules,
}

impl MonthConfig {
    pub fn validate(&self) -> Result<(), SchedError> {
        let sets = [
            ("public_holidays", &self.public_holidays),
            ("elot_days", &self.elot_days),
            ("minor_ot_days", &self.minor_ot_days),
            ("wound_days", &self.wound_days),
        ];
        for (field, days) in sets {
            if let Some(bad) = days.iter().find(|d| !(1..=31).contains(*d)) {
                return Err(SchedError::InvalidConfig(format!(
                    "{field}: day {bad} is outside 1..=31"
                )));
            }
        }
        self.rules.validate()
    }

    pub fn is_public_holiday(&self, day_of_month: u32) -> bool {
        self.public_holidays.contains(&day_of_month)
    }

    /// Jours configurés pour un type de poste programmé (`None` pour les
    /// postes qui ne dépendent pas d'une liste de jours).
    pub fn configured_days(&self, kind: SlotKind) -> Option<&BTreeSet<u32>> {
        match kind {
            SlotKind::Elot => Some(&self.elot_days),
            SlotKind::MinorOt => Some(&self.minor_ot_days),
            SlotKind::Wound => Some(&self.wound_days),
            _ => None,
        }
    }
}

/// Rotation de la passive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassivePolicy {
    /// Uniquement les jours ordinaires (ni week-end ni férié).
    #[default]
    WeekdaysOnly,
    EveryDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Poids de l'écart-type des astreintes totales.
    #[serde(default = "default_total_weight")]
    pub total: f64,
    /// Poids de l'écart-type des astreintes en jour spécial.
    #[serde(default = "default_special_weight")]
    pub special: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            total: default_total_weight(),
            special: default_special_weight(),
        }
    }
}

fn default_total_weight() -> f64 {
    10.0
}

fn default_special_weight() -> f64 {
    5.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    /// Poste laissé vide.
    #[serde(default = "default_unfilled")]
    pub unfilled: u32,
    /// Équipe du samedi incomplète le dimanche.
    #[serde(default = "default_weekend_broken")]
    pub weekend_broken: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            unfilled: default_unfilled(),
            weekend_broken: default_weekend_broken(),
        }
    }
}

fn default_unfilled() -> u32 {
    1000
}

fn default_weekend_broken() -> u32 {
    2000
}

/// Règles de politique et réglages du score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub passive_policy: PassivePolicy,
    /// ELOT / petit bloc / consultation plaies actifs aussi chaque jour spécial.
    #[serde(default)]
    pub procedures_on_special_days: bool,
    /// Personnel restreint autorisé en ELOT (non par défaut).
    #[serde(default)]
    pub restricted_may_elot: bool,
    /// Personnel restreint autorisé au petit bloc et en consultation plaies
    /// (oui par défaut).
    #[serde(default = "default_true")]
    pub restricted_may_minor_ot: bool,
    /// Repos après astreinte (pas d'astreinte ni d'ELOT le lendemain).
    #[serde(default = "default_true")]
    pub post_call_rest: bool,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub penalties: Penalties,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            passive_policy: PassivePolicy::default(),
            procedures_on_special_days: false,
            restricted_may_elot: false,
            restricted_may_minor_ot: true,
            post_call_rest: true,
            weights: Weights::default(),
            penalties: Penalties::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Rules {
    pub fn validate(&self) -> Result<(), SchedError> {
        for (field, w) in [("total", self.weights.total), ("special", self.weights.special)] {
            if !w.is_finite() || w < 0.0 {
                return Err(SchedError::InvalidConfig(format!(
                    "weights.{field} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }

    /// Le personnel restreint est-il écarté de ce type de poste ?
    pub fn excludes_restricted(&self, kind: SlotKind) -> bool {
        match kind {
            SlotKind::Tier1 | SlotKind::Tier2 | SlotKind::Tier3 | SlotKind::Passive => true,
            SlotKind::Elot => !self.restricted_may_elot,
            SlotKind::MinorOt | SlotKind::Wound => !self.restricted_may_minor_ot,
        }
    }
}

pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<MonthConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: MonthConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn export_config_json<P: AsRef<Path>>(path: P, config: &MonthConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
