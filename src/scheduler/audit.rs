use crate::model::{DutySlot, Roster, Staff};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compteurs de gardes d'une personne sur le tableau.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAudit {
    pub name: String,
    pub tier1: u32,
    pub tier2: u32,
    pub tier3: u32,
    pub on_call_total: u32,
    pub special_on_call: u32,
    pub passive: u32,
    pub elot: u32,
    pub minor_ot: u32,
    pub wound: u32,
}

impl StaffAudit {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, slot: DutySlot, special: bool) {
        match slot {
            DutySlot::Tier1 => self.tier1 += 1,
            DutySlot::Tier2 => self.tier2 += 1,
            DutySlot::Tier3 => self.tier3 += 1,
            DutySlot::Passive => self.passive += 1,
            DutySlot::Elot1 | DutySlot::Elot2 => self.elot += 1,
            DutySlot::MinorOt1 | DutySlot::MinorOt2 => self.minor_ot += 1,
            DutySlot::WoundClinic => self.wound += 1,
        }
        if slot.is_on_call() {
            self.on_call_total += 1;
            if special {
                self.special_on_call += 1;
            }
        }
    }
}

/// Une ligne par membre du personnel (dans l'ordre fourni, zéros inclus),
/// puis les noms inconnus rencontrés dans le tableau, triés.
pub(super) fn audit(roster: &Roster, staff: &[Staff]) -> Vec<StaffAudit> {
    let mut rows: Vec<StaffAudit> = staff.iter().map(|p| StaffAudit::new(&p.name)).collect();
    let known: BTreeMap<&str, usize> = staff
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.name.as_str(), idx))
        .collect();
    let mut unknown: BTreeMap<&str, StaffAudit> = BTreeMap::new();

    for day in &roster.days {
        for slot in DutySlot::ALL {
            let Some(name) = day.get(slot) else {
                continue;
            };
            let row = match known.get(name) {
                Some(idx) => &mut rows[*idx],
                None => unknown.entry(name).or_insert_with(|| StaffAudit::new(name)),
            };
            row.record(slot, day.is_special);
        }
    }

    rows.extend(unknown.into_values());
    rows
}
