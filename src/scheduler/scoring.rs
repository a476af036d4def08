use super::assignment::Trial;
use super::{util, Scheduler};
use crate::config::Weights;
use crate::model::{DutySlot, Roster};

/// Score (plus bas = meilleur) : pénalités + dispersion des astreintes
/// totales + dispersion des astreintes en jour spécial. Les comptes couvrent
/// tout le personnel, zéros compris.
pub(super) fn fairness(penalty: u32, total: &[u32], special: &[u32], weights: &Weights) -> f64 {
    f64::from(penalty) + weights.total * util::std_dev(total) + weights.special * util::std_dev(special)
}

pub(super) fn score_trial(scheduler: &Scheduler, trial: &Trial) -> f64 {
    let n = scheduler.staff.len();
    let mut total = vec![0u32; n];
    let mut special = vec![0u32; n];
    for (day, row) in scheduler.days.iter().zip(&trial.grid) {
        for slot in DutySlot::ON_CALL {
            if let Some(idx) = row[slot.index()] {
                total[idx] += 1;
                if day.is_special() {
                    special[idx] += 1;
                }
            }
        }
    }
    fairness(trial.penalty, &total, &special, &scheduler.rules.weights)
}

pub(super) fn score_roster(scheduler: &Scheduler, roster: &Roster) -> f64 {
    let audit = scheduler.audit(roster);
    // noms inconnus exclus : la dispersion porte sur le personnel déclaré
    let staff_rows = &audit[..scheduler.staff.len()];
    let total: Vec<u32> = staff_rows.iter().map(|a| a.on_call_total).collect();
    let special: Vec<u32> = staff_rows.iter().map(|a| a.special_on_call).collect();
    fairness(roster.penalty_count, &total, &special, &scheduler.rules.weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_dominates_dispersion() {
        let w = Weights::default();
        let balanced = fairness(0, &[5, 5, 6], &[2, 2, 2], &w);
        let penalised = fairness(1000, &[5, 5, 5], &[2, 2, 2], &w);
        assert!(balanced < penalised);
    }

    #[test]
    fn excluded_staff_raises_score() {
        let w = Weights::default();
        let shared = fairness(0, &[4, 4, 4], &[0, 0, 0], &w);
        let excluded = fairness(0, &[6, 6, 0], &[0, 0, 0], &w);
        assert!(shared < excluded);
    }
}
