use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Type d'éligibilité (une colonne du tableau du personnel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Tier1,
    Tier2,
    Tier3,
    Passive,
    Elot,
    MinorOt,
    Wound,
}

impl SlotKind {
    pub const ALL: [SlotKind; 7] = [
        SlotKind::Tier1,
        SlotKind::Tier2,
        SlotKind::Tier3,
        SlotKind::Passive,
        SlotKind::Elot,
        SlotKind::MinorOt,
        SlotKind::Wound,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotKind::Tier1 => "Tier-1 on-call",
            SlotKind::Tier2 => "Tier-2 on-call",
            SlotKind::Tier3 => "Tier-3 on-call",
            SlotKind::Passive => "Passive",
            SlotKind::Elot => "ELOT",
            SlotKind::MinorOt => "Minor-OT",
            SlotKind::Wound => "Wound-Clinic",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Poste de garde nommé (une colonne du tableau produit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DutySlot {
    Tier1,
    Tier2,
    Tier3,
    Passive,
    Elot1,
    Elot2,
    MinorOt1,
    MinorOt2,
    WoundClinic,
}

impl DutySlot {
    /// Ordre des colonnes, qui est aussi l'ordre de précédence d'une journée.
    pub const ALL: [DutySlot; 9] = [
        DutySlot::Tier1,
        DutySlot::Tier2,
        DutySlot::Tier3,
        DutySlot::Passive,
        DutySlot::Elot1,
        DutySlot::Elot2,
        DutySlot::MinorOt1,
        DutySlot::MinorOt2,
        DutySlot::WoundClinic,
    ];

    pub const ON_CALL: [DutySlot; 3] = [DutySlot::Tier1, DutySlot::Tier2, DutySlot::Tier3];

    pub fn kind(self) -> SlotKind {
        match self {
            DutySlot::Tier1 => SlotKind::Tier1,
            DutySlot::Tier2 => SlotKind::Tier2,
            DutySlot::Tier3 => SlotKind::Tier3,
            DutySlot::Passive => SlotKind::Passive,
            DutySlot::Elot1 | DutySlot::Elot2 => SlotKind::Elot,
            DutySlot::MinorOt1 | DutySlot::MinorOt2 => SlotKind::MinorOt,
            DutySlot::WoundClinic => SlotKind::Wound,
        }
    }

    pub fn is_on_call(self) -> bool {
        matches!(self, DutySlot::Tier1 | DutySlot::Tier2 | DutySlot::Tier3)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column(self) -> &'static str {
        match self {
            DutySlot::Tier1 => "Tier1",
            DutySlot::Tier2 => "Tier2",
            DutySlot::Tier3 => "Tier3",
            DutySlot::Passive => "Passive",
            DutySlot::Elot1 => "Elot1",
            DutySlot::Elot2 => "Elot2",
            DutySlot::MinorOt1 => "MinorOt1",
            DutySlot::MinorOt2 => "MinorOt2",
            DutySlot::WoundClinic => "WoundClinic",
        }
    }
}

impl fmt::Display for DutySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Membre du personnel. Le nom sert d'identifiant (unique).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub name: String,
    #[serde(default)]
    pub eligible: BTreeSet<SlotKind>,
}

impl Staff {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            eligible: BTreeSet::new(),
        }
    }

    /// Éligible à tous les postes.
    pub fn all_round<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            eligible: SlotKind::ALL.into_iter().collect(),
        }
    }

    pub fn with(mut self, kind: SlotKind) -> Self {
        self.eligible.insert(kind);
        self
    }

    pub fn is_eligible(&self, kind: SlotKind) -> bool {
        self.eligible.contains(&kind)
    }
}

/// Absences et restrictions d'une journée.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    #[serde(default)]
    pub absent: BTreeSet<String>,
    /// « Pas d'astreinte / pas de bloc ».
    #[serde(default)]
    pub restricted: BTreeSet<String>,
}

impl LeaveRecord {
    pub fn is_absent(&self, name: &str) -> bool {
        self.absent.contains(name)
    }

    /// L'absence l'emporte : un absent n'est jamais compté comme restreint.
    pub fn is_restricted(&self, name: &str) -> bool {
        !self.is_absent(name) && self.restricted.contains(name)
    }
}

/// Congés indexés par date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBook {
    pub days: BTreeMap<NaiveDate, LeaveRecord>,
}

impl LeaveBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_absent<S: Into<String>>(&mut self, date: NaiveDate, name: S) {
        let name = name.into();
        let record = self.days.entry(date).or_default();
        record.restricted.remove(&name);
        record.absent.insert(name);
    }

    pub fn mark_restricted<S: Into<String>>(&mut self, date: NaiveDate, name: S) {
        let name = name.into();
        let record = self.days.entry(date).or_default();
        if !record.absent.contains(&name) {
            record.restricted.insert(name);
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&LeaveRecord> {
        self.days.get(&date)
    }
}

/// Une ligne du tableau de garde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterDay {
    pub date: NaiveDate,
    pub day_name: String,
    pub is_special: bool,
    #[serde(default)]
    pub assignments: BTreeMap<DutySlot, String>,
}

impl RosterDay {
    pub fn get(&self, slot: DutySlot) -> Option<&str> {
        self.assignments
            .get(&slot)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn set<S: Into<String>>(&mut self, slot: DutySlot, name: S) {
        let name = name.into();
        if name.is_empty() {
            self.assignments.remove(&slot);
        } else {
            self.assignments.insert(slot, name);
        }
    }

    pub fn clear(&mut self, slot: DutySlot) {
        self.assignments.remove(&slot);
    }

    /// Personnel d'astreinte du jour (postes vides ignorés).
    pub fn on_call(&self) -> BTreeSet<&str> {
        DutySlot::ON_CALL
            .iter()
            .filter_map(|slot| self.get(*slot))
            .collect()
    }
}

/// Tableau complet d'un mois.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub days: Vec<RosterDay>,
    #[serde(default)]
    pub penalty_count: u32,
    #[serde(default)]
    pub score: f64,
}

impl Roster {
    pub fn find_day(&self, date: NaiveDate) -> Option<&RosterDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn find_day_mut(&mut self, date: NaiveDate) -> Option<&mut RosterDay> {
        self.days.iter_mut().find(|d| d.date == date)
    }
}
