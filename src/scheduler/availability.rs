use super::Scheduler;
use crate::model::DutySlot;

/// État d'un essai pour la journée en cours.
#[derive(Debug, Clone)]
pub(super) struct TrialState {
    /// Déjà affecté à un poste aujourd'hui.
    pub occupied: Vec<bool>,
    /// D'astreinte la veille.
    pub shield: Vec<bool>,
}

impl TrialState {
    pub fn new(staff_len: usize) -> Self {
        Self {
            occupied: vec![false; staff_len],
            shield: vec![false; staff_len],
        }
    }

    pub fn start_day(&mut self) {
        self.occupied.iter_mut().for_each(|o| *o = false);
    }

    pub fn end_day(&mut self, on_call: impl IntoIterator<Item = usize>) {
        self.shield.iter_mut().for_each(|s| *s = false);
        for idx in on_call {
            self.shield[idx] = true;
        }
    }
}

impl Scheduler {
    /// Candidats pour `slot` le jour d'indice `day`, dans l'ordre du pool.
    pub(super) fn available_for(&self, slot: DutySlot, day: usize, state: &TrialState) -> Vec<usize> {
        self.pool(slot.kind())
            .iter()
            .copied()
            .filter(|idx| self.admits(slot, day, *idx, state))
            .collect()
    }

    /// Contrôles de disponibilité hors éligibilité statique.
    pub(super) fn admits(&self, slot: DutySlot, day: usize, idx: usize, state: &TrialState) -> bool {
        if self.absent[day].contains(&idx) {
            return false;
        }
        if self.rules.excludes_restricted(slot.kind()) && self.restricted[day].contains(&idx) {
            return false;
        }
        if state.occupied[idx] {
            return false;
        }
        if self.rules.post_call_rest && state.shield[idx] {
            let elot = matches!(slot, DutySlot::Elot1 | DutySlot::Elot2);
            if slot.is_on_call() || (elot && !self.days[day].is_saturday()) {
                return false;
            }
        }
        true
    }

    /// Reprise du dimanche : seules l'absence, la restriction et
    /// l'occupation comptent, pas la garde de la veille.
    pub(super) fn admits_continuation(&self, day: usize, idx: usize, state: &TrialState) -> bool {
        !self.absent[day].contains(&idx)
            && !self.restricted[day].contains(&idx)
            && !state.occupied[idx]
    }
}
