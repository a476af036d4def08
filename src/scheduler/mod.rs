mod assignment;
mod audit;
mod availability;
mod conflicts;
mod scoring;
mod search;
mod types;
mod util;

pub use audit::StaffAudit;
pub use search::Progress;
pub use types::{SchedError, SearchOptions, Violation, ViolationKind};

use crate::calendar::{self, Day};
use crate::config::{MonthConfig, PassivePolicy, Rules};
use crate::model::{DutySlot, LeaveBook, Roster, RosterDay, SlotKind, Staff};
use std::collections::{BTreeSet, HashMap};
use std::ops::ControlFlow;

/// Résultat d'une génération : meilleur tableau trouvé et son bilan.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub roster: Roster,
    pub audit: Vec<StaffAudit>,
    pub violations: Vec<Violation>,
    pub trials_run: usize,
}

/// Scheduler : entrées figées d'une génération (calendrier, personnel,
/// congés, cadence des postes), partagées en lecture seule par les essais.
#[derive(Debug, Clone)]
pub struct Scheduler {
    days: Vec<Day>,
    staff: Vec<Staff>,
    index: HashMap<String, usize>,
    pools: [Vec<usize>; 7],
    absent: Vec<BTreeSet<usize>>,
    restricted: Vec<BTreeSet<usize>>,
    active: Vec<[bool; 9]>,
    rules: Rules,
}

impl Scheduler {
    /// Prépare un mois complet.
    pub fn for_month(
        staff: Vec<Staff>,
        leave: &LeaveBook,
        config: &MonthConfig,
        year: i32,
        month: u32,
    ) -> Result<Self, SchedError> {
        let days = calendar::month_days(year, month, config)?;
        Self::new(staff, leave, config, days)
    }

    /// Prépare une suite de jours quelconque (triée par date).
    ///
    /// Échoue immédiatement si un poste actif au moins un jour n'a aucun
    /// personnel éligible.
    pub fn new(
        staff: Vec<Staff>,
        leave: &LeaveBook,
        config: &MonthConfig,
        mut days: Vec<Day>,
    ) -> Result<Self, SchedError> {
        config.validate()?;
        days.sort();

        let mut index = HashMap::with_capacity(staff.len());
        for (idx, person) in staff.iter().enumerate() {
            if index.insert(person.name.clone(), idx).is_some() {
                return Err(SchedError::DuplicateStaff(person.name.clone()));
            }
        }

        let pools = SlotKind::ALL.map(|kind| {
            staff
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_eligible(kind))
                .map(|(idx, _)| idx)
                .collect::<Vec<_>>()
        });

        let rules = config.rules;
        let active: Vec<[bool; 9]> = days
            .iter()
            .map(|day| DutySlot::ALL.map(|slot| slot_is_active(slot, day, config, &rules)))
            .collect();

        for kind in SlotKind::ALL {
            let needed = active
                .iter()
                .any(|row| DutySlot::ALL.iter().any(|s| s.kind() == kind && row[s.index()]));
            if needed && pools[kind.index()].is_empty() {
                return Err(SchedError::EmptyStaffPool(kind));
            }
        }

        let mut absent = Vec::with_capacity(days.len());
        let mut restricted = Vec::with_capacity(days.len());
        for day in &days {
            let mut out = BTreeSet::new();
            let mut limited = BTreeSet::new();
            if let Some(record) = leave.get(day.date) {
                for name in &record.absent {
                    match index.get(name) {
                        Some(idx) => {
                            out.insert(*idx);
                        }
                        None => tracing::warn!(%name, date = %day.date, "leave for unknown staff ignored"),
                    }
                }
                for name in &record.restricted {
                    match index.get(name) {
                        Some(idx) if !out.contains(idx) => {
                            limited.insert(*idx);
                        }
                        Some(_) => {}
                        None => tracing::warn!(%name, date = %day.date, "restriction for unknown staff ignored"),
                    }
                }
            }
            absent.push(out);
            restricted.push(limited);
        }

        Ok(Self {
            days,
            staff,
            index,
            pools,
            absent,
            restricted,
            active,
            rules,
        })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Le poste est-il ouvert ce jour-là ?
    pub fn is_active(&self, slot: DutySlot, date: chrono::NaiveDate) -> bool {
        self.day_index(date)
            .map(|d| self.active[d][slot.index()])
            .unwrap_or(false)
    }

    /// Personnel affectable à `slot` le jour `date`, compte tenu du
    /// personnel déjà occupé ce jour-là et des astreintes de la veille.
    pub fn available(
        &self,
        slot: DutySlot,
        date: chrono::NaiveDate,
        occupied: &[&str],
        post_call: &[&str],
    ) -> Vec<String> {
        let Some(day) = self.day_index(date) else {
            return Vec::new();
        };
        let mut state = availability::TrialState::new(self.staff.len());
        for name in occupied {
            if let Some(idx) = self.index.get(*name) {
                state.occupied[*idx] = true;
            }
        }
        for name in post_call {
            if let Some(idx) = self.index.get(*name) {
                state.shield[*idx] = true;
            }
        }
        self.available_for(slot, day, &state)
            .into_iter()
            .map(|idx| self.staff[idx].name.clone())
            .collect()
    }

    /// Un seul essai, reproductible à partir de `seed`.
    pub fn run_trial(&self, seed: u64) -> Roster {
        let trial = search::seeded_trial(self, seed);
        let score = scoring::score_trial(self, &trial);
        self.to_roster(&trial, score)
    }

    /// Recherche best-of-N.
    pub fn generate(&self, opts: SearchOptions) -> Result<Outcome, SchedError> {
        self.generate_with_progress(opts, |_| ControlFlow::Continue(()))
    }

    /// Recherche best-of-N ; `on_batch` est appelé après chaque lot et peut
    /// interrompre la recherche en renvoyant `ControlFlow::Break`.
    pub fn generate_with_progress<F>(
        &self,
        opts: SearchOptions,
        on_batch: F,
    ) -> Result<Outcome, SchedError>
    where
        F: FnMut(&Progress) -> ControlFlow<()>,
    {
        let best = search::search(self, opts, on_batch)?;
        let roster = self.to_roster(&best.trial, best.score);
        let audit = self.audit(&roster);
        let violations = self.detect_violations(&roster);
        Ok(Outcome {
            roster,
            audit,
            violations,
            trials_run: best.trials_run,
        })
    }

    /// Contrôle a posteriori d'un tableau quelconque (y compris modifié à la main).
    pub fn detect_violations(&self, roster: &Roster) -> Vec<Violation> {
        conflicts::detect_violations(self, roster)
    }

    pub fn audit(&self, roster: &Roster) -> Vec<StaffAudit> {
        audit::audit(roster, &self.staff)
    }

    /// Score d'équité d'un tableau existant (pénalités enregistrées incluses).
    pub fn score_roster(&self, roster: &Roster) -> f64 {
        scoring::score_roster(self, roster)
    }

    pub(crate) fn day_index(&self, date: chrono::NaiveDate) -> Option<usize> {
        self.days.binary_search_by_key(&date, |d| d.date).ok()
    }

    pub(crate) fn pool(&self, kind: SlotKind) -> &[usize] {
        &self.pools[kind.index()]
    }

    pub(crate) fn staff_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn to_roster(&self, trial: &assignment::Trial, score: f64) -> Roster {
        let days = self
            .days
            .iter()
            .zip(&trial.grid)
            .map(|(day, row)| {
                let mut out = RosterDay {
                    date: day.date,
                    day_name: day.day_name().to_string(),
                    is_special: day.is_special(),
                    assignments: Default::default(),
                };
                for slot in DutySlot::ALL {
                    if let Some(idx) = row[slot.index()] {
                        out.set(slot, self.staff[idx].name.clone());
                    }
                }
                out
            })
            .collect();
        Roster {
            days,
            penalty_count: trial.penalty,
            score,
        }
    }
}

fn slot_is_active(slot: DutySlot, day: &Day, config: &MonthConfig, rules: &Rules) -> bool {
    let procedure_day = |kind: SlotKind| {
        let configured = config
            .configured_days(kind)
            .map_or(false, |days| days.contains(&day.day_of_month()));
        configured || (rules.procedures_on_special_days && day.is_special())
    };
    match slot {
        DutySlot::Tier1 | DutySlot::Tier2 => true,
        DutySlot::Tier3 => day.is_special(),
        DutySlot::Passive => match rules.passive_policy {
            PassivePolicy::WeekdaysOnly => !day.is_special(),
            PassivePolicy::EveryDay => true,
        },
        DutySlot::Elot1 => procedure_day(SlotKind::Elot),
        // un seul siège ELOT le samedi
        DutySlot::Elot2 => procedure_day(SlotKind::Elot) && !day.is_saturday(),
        DutySlot::MinorOt1 | DutySlot::MinorOt2 => procedure_day(SlotKind::MinorOt),
        DutySlot::WoundClinic => procedure_day(SlotKind::Wound),
    }
}
