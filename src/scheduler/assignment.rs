use super::availability::TrialState;
use super::Scheduler;
use crate::model::DutySlot;
use rand::seq::SliceRandom;
use rand::Rng;

/// Tableau candidat d'un essai : une ligne par jour, une case par poste.
#[derive(Debug, Clone)]
pub(super) struct Trial {
    pub grid: Vec<[Option<usize>; 9]>,
    pub penalty: u32,
}

const ELOT: [DutySlot; 2] = [DutySlot::Elot1, DutySlot::Elot2];
const MINOR_OT: [DutySlot; 2] = [DutySlot::MinorOt1, DutySlot::MinorOt2];
const WOUND: [DutySlot; 1] = [DutySlot::WoundClinic];

/// Équipe du samedi, reconduite le dimanche.
#[derive(Debug, Default)]
struct WeekendTeam {
    members: Vec<usize>,
    saturday_tier1: Option<usize>,
}

impl WeekendTeam {
    fn is_complete(&self) -> bool {
        self.members.len() == DutySlot::ON_CALL.len()
    }

    fn reset(&mut self) {
        self.members.clear();
        self.saturday_tier1 = None;
    }
}

pub(super) fn run_trial<R: Rng + ?Sized>(scheduler: &Scheduler, rng: &mut R) -> Trial {
    let mut trial = Trial {
        grid: Vec::with_capacity(scheduler.days.len()),
        penalty: 0,
    };
    let mut state = TrialState::new(scheduler.staff.len());
    let mut team = WeekendTeam::default();
    let passive_len = scheduler.pool(DutySlot::Passive.kind()).len();
    let mut passive_index = if passive_len == 0 {
        0
    } else {
        rng.gen_range(0..passive_len)
    };

    for day in 0..scheduler.days.len() {
        let mut row = [None; 9];
        state.start_day();

        let is_saturday = scheduler.days[day].is_saturday();
        if is_saturday {
            team.reset();
        }

        if scheduler.days[day].is_sunday() && team.is_complete() {
            scheduler.continue_weekend(day, &team, &mut row, &mut state, &mut trial.penalty, rng);
        } else {
            scheduler.fresh_on_call(day, &mut row, &mut state, &mut trial.penalty, rng);
            if is_saturday {
                team.members = DutySlot::ON_CALL
                    .iter()
                    .filter_map(|slot| row[slot.index()])
                    .collect();
                team.saturday_tier1 = row[DutySlot::Tier1.index()];
            }
        }
        if scheduler.days[day].is_sunday() {
            team.reset();
        }

        if scheduler.active[day][DutySlot::Passive.index()] {
            match scheduler.rotate_passive(day, passive_index, &state) {
                Some(idx) => {
                    place(&mut row, &mut state, DutySlot::Passive, idx);
                    passive_index += 1;
                }
                None => add_penalty(&mut trial.penalty, scheduler.rules.penalties.unfilled),
            }
        }

        for group in [&ELOT[..], &MINOR_OT[..], &WOUND[..]] {
            scheduler.fill_group(day, group, &mut row, &mut state, &mut trial.penalty, rng);
        }

        state.end_day(DutySlot::ON_CALL.iter().filter_map(|slot| row[slot.index()]));
        trial.grid.push(row);
    }

    trial
}

/// Les pénalités viennent de la configuration : le total sature au lieu de
/// déborder.
fn add_penalty(total: &mut u32, amount: u32) {
    *total = total.saturating_add(amount);
}

fn place(row: &mut [Option<usize>; 9], state: &mut TrialState, slot: DutySlot, idx: usize) {
    row[slot.index()] = Some(idx);
    state.occupied[idx] = true;
}

impl Scheduler {
    /// Tirage indépendant des astreintes 1, 2 puis 3 (3 seulement en jour spécial).
    fn fresh_on_call<R: Rng + ?Sized>(
        &self,
        day: usize,
        row: &mut [Option<usize>; 9],
        state: &mut TrialState,
        penalty: &mut u32,
        rng: &mut R,
    ) {
        for slot in DutySlot::ON_CALL {
            if !self.active[day][slot.index()] || row[slot.index()].is_some() {
                continue;
            }
            let candidates = self.available_for(slot, day, state);
            match candidates.choose(rng) {
                Some(&idx) => place(row, state, slot, idx),
                None => {
                    tracing::trace!(date = %self.days[day].date, %slot, "slot unfillable");
                    add_penalty(penalty, self.rules.penalties.unfilled);
                }
            }
        }
    }

    /// Dimanche : même trio que samedi, rôles permutés si possible.
    fn continue_weekend<R: Rng + ?Sized>(
        &self,
        day: usize,
        team: &WeekendTeam,
        row: &mut [Option<usize>; 9],
        state: &mut TrialState,
        penalty: &mut u32,
        rng: &mut R,
    ) {
        let mut members: Vec<usize> = team
            .members
            .iter()
            .copied()
            .filter(|idx| self.admits_continuation(day, *idx, state))
            .collect();
        members.shuffle(rng);

        if members.len() < team.members.len() {
            add_penalty(penalty, self.rules.penalties.weekend_broken);
            // les présents gardent une place, le reste est tiré à nouveau
            for slot in DutySlot::ON_CALL {
                if let Some(pos) = members
                    .iter()
                    .position(|idx| self.staff[*idx].is_eligible(slot.kind()))
                {
                    let idx = members.remove(pos);
                    place(row, state, slot, idx);
                }
            }
            self.fresh_on_call(day, row, state, penalty, rng);
            return;
        }

        if members.first() == team.saturday_tier1.as_ref() {
            members.swap(0, 1);
        }
        let order = match self.eligible_order(&members, team.saturday_tier1, rng) {
            Some(order) => order,
            None => {
                add_penalty(penalty, self.rules.penalties.weekend_broken);
                members
            }
        };
        for (slot, idx) in DutySlot::ON_CALL.into_iter().zip(order) {
            place(row, state, slot, idx);
        }
    }

    /// Ordre des rôles qui respecte l'éligibilité de chaque palier, en
    /// préférant un changement de titulaire de l'astreinte 1. Le premier
    /// ordre essayé est celui proposé.
    fn eligible_order<R: Rng + ?Sized>(
        &self,
        proposed: &[usize],
        saturday_tier1: Option<usize>,
        rng: &mut R,
    ) -> Option<Vec<usize>> {
        let fits = |order: &[usize]| {
            DutySlot::ON_CALL
                .iter()
                .zip(order)
                .all(|(slot, idx)| self.staff[*idx].is_eligible(slot.kind()))
        };
        let rotated = |order: &[usize]| order.first().copied() != saturday_tier1;

        let mut orders = permutations(proposed);
        orders[1..].shuffle(rng);
        orders
            .iter()
            .find(|o| fits(o.as_slice()) && rotated(o.as_slice()))
            .or_else(|| orders.iter().find(|o| fits(o.as_slice())))
            .cloned()
    }

    /// Passive : premier disponible en partant de l'indice tournant.
    fn rotate_passive(&self, day: usize, passive_index: usize, state: &TrialState) -> Option<usize> {
        let pool = self.pool(DutySlot::Passive.kind());
        let len = pool.len();
        (0..len)
            .map(|offset| pool[(passive_index + offset) % len])
            .find(|idx| self.admits(DutySlot::Passive, day, *idx, state))
    }

    /// Sièges d'un même type (ELOT, petit bloc, plaies) tirés sans remise.
    fn fill_group<R: Rng + ?Sized>(
        &self,
        day: usize,
        group: &[DutySlot],
        row: &mut [Option<usize>; 9],
        state: &mut TrialState,
        penalty: &mut u32,
        rng: &mut R,
    ) {
        let seats: Vec<DutySlot> = group
            .iter()
            .copied()
            .filter(|slot| self.active[day][slot.index()])
            .collect();
        let Some(first) = seats.first() else {
            return;
        };
        let candidates = self.available_for(*first, day, state);
        let picks: Vec<usize> = candidates
            .choose_multiple(rng, seats.len())
            .copied()
            .collect();
        let missing = seats.len() - picks.len();
        for (slot, idx) in seats.into_iter().zip(picks) {
            place(row, state, slot, idx);
        }
        add_penalty(
            penalty,
            self.rules.penalties.unfilled.saturating_mul(missing as u32),
        );
    }
}

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (i, head) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, *head);
            out.push(tail);
        }
    }
    out
}
