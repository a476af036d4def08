use super::{Scheduler, Violation, ViolationKind};
use crate::model::{DutySlot, Roster, RosterDay};
use chrono::Duration;
use std::collections::BTreeSet;

pub(super) fn detect_violations(scheduler: &Scheduler, roster: &Roster) -> Vec<Violation> {
    let mut out = Vec::new();

    for day in &roster.days {
        let Some(d) = scheduler.day_index(day.date) else {
            tracing::warn!(date = %day.date, "roster day outside the scheduled period skipped");
            continue;
        };
        let push = |out: &mut Vec<Violation>, slot: Option<DutySlot>, staff: Option<&str>, kind| {
            out.push(Violation {
                date: day.date,
                slot,
                staff: staff.map(str::to_string),
                kind,
            })
        };

        let mut seen = BTreeSet::new();
        for slot in DutySlot::ALL {
            let active = scheduler.active[d][slot.index()];
            let Some(name) = day.get(slot) else {
                if active {
                    push(&mut out, Some(slot), None, ViolationKind::Unfilled);
                }
                continue;
            };
            if !active {
                push(&mut out, Some(slot), Some(name), ViolationKind::OffCadence);
            }
            if !seen.insert(name) {
                push(&mut out, Some(slot), Some(name), ViolationKind::DoubleBooking);
            }
            let Some(idx) = scheduler.staff_index(name) else {
                push(&mut out, Some(slot), Some(name), ViolationKind::Ineligible);
                continue;
            };
            if !scheduler.staff[idx].is_eligible(slot.kind()) {
                push(&mut out, Some(slot), Some(name), ViolationKind::Ineligible);
            }
            if scheduler.absent[d].contains(&idx) {
                push(&mut out, Some(slot), Some(name), ViolationKind::AbsentAssigned);
            } else if scheduler.restricted[d].contains(&idx)
                && scheduler.rules.excludes_restricted(slot.kind())
            {
                push(&mut out, Some(slot), Some(name), ViolationKind::RestrictedAssigned);
            }
        }

        let Some(prev) = previous_day(roster, day) else {
            continue;
        };
        // la veille d'un dimanche est le samedi de la même équipe
        let weekend_pair = scheduler.days[d].is_sunday();

        if scheduler.rules.post_call_rest {
            let yesterday = prev.on_call();
            for slot in DutySlot::ALL {
                let Some(name) = day.get(slot) else {
                    continue;
                };
                if !yesterday.contains(name) {
                    continue;
                }
                if slot.is_on_call() && !weekend_pair {
                    push(&mut out, Some(slot), Some(name), ViolationKind::PostCallOnCall);
                }
                let elot = matches!(slot, DutySlot::Elot1 | DutySlot::Elot2);
                if elot && !scheduler.days[d].is_saturday() {
                    push(&mut out, Some(slot), Some(name), ViolationKind::PostCallElot);
                }
            }
        }

        if weekend_pair && weekend_split(scheduler, d, prev, day) {
            push(&mut out, None, None, ViolationKind::WeekendSplit);
        }
    }

    out.sort();
    out
}

fn previous_day<'a>(roster: &'a Roster, day: &RosterDay) -> Option<&'a RosterDay> {
    let date = day.date.checked_sub_signed(Duration::days(1))?;
    roster.find_day(date)
}

/// Trio du samedi complet et entièrement disponible le dimanche, mais pas
/// reconduit.
fn weekend_split(
    scheduler: &Scheduler,
    sunday: usize,
    saturday: &RosterDay,
    today: &RosterDay,
) -> bool {
    let team = saturday.on_call();
    if team.len() < DutySlot::ON_CALL.len() {
        return false;
    }
    let all_available = team.iter().all(|name| match scheduler.staff_index(name) {
        Some(idx) => {
            !scheduler.absent[sunday].contains(&idx) && !scheduler.restricted[sunday].contains(&idx)
        }
        None => false,
    });
    all_available && today.on_call() != team
}
