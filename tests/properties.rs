#![forbid(unsafe_code)]
use garde::{
    DutySlot, LeaveBook, MonthConfig, PassivePolicy, Roster, Scheduler, SearchOptions, Staff,
    ViolationKind,
};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn staff() -> Vec<Staff> {
    (1..=10).map(|i| Staff::all_round(format!("S{i}"))).collect()
}

fn march_config() -> MonthConfig {
    let mut config = MonthConfig::default();
    config.public_holidays.insert(2);
    config.elot_days.extend([3, 7, 10]);
    config.minor_ot_days.extend([4, 7]);
    config.wound_days.insert(5);
    config
}

fn march_leave() -> LeaveBook {
    let mut leave = LeaveBook::new();
    for d in 10..=12 {
        leave.mark_absent(date(d), "S1");
    }
    for d in [4, 7, 8] {
        leave.mark_restricted(date(d), "S2");
    }
    leave
}

fn generate(config: &MonthConfig, leave: &LeaveBook, seed: u64) -> (Scheduler, Roster) {
    let scheduler = Scheduler::for_month(staff(), leave, config, 2026, 3).unwrap();
    let outcome = scheduler
        .generate(SearchOptions::with_iterations(300).seeded(seed))
        .unwrap();
    assert!(outcome.violations.is_empty(), "{:?}", outcome.violations);
    (scheduler, outcome.roster)
}

#[test]
fn hard_constraints_hold_on_a_full_month() {
    let leave = march_leave();
    let (_, roster) = generate(&march_config(), &leave, 17);
    assert_eq!(roster.days.len(), 31);
    assert_eq!(roster.penalty_count, 0);

    for day in &roster.days {
        let names: Vec<&str> = DutySlot::ALL.iter().filter_map(|s| day.get(*s)).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len(), "double booking on {}", day.date);

        let Some(record) = leave.get(day.date) else {
            continue;
        };
        for name in &names {
            assert!(!record.is_absent(name), "{name} absent on {}", day.date);
        }
        for slot in [
            DutySlot::Tier1,
            DutySlot::Tier2,
            DutySlot::Tier3,
            DutySlot::Passive,
            DutySlot::Elot1,
            DutySlot::Elot2,
        ] {
            if let Some(name) = day.get(slot) {
                assert!(!record.is_restricted(name), "{name} restricted on {}", day.date);
            }
        }
    }
}

#[test]
fn weekend_team_and_post_call_rest() {
    let leave = march_leave();
    let (_, roster) = generate(&march_config(), &leave, 23);

    for pair in roster.days.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let weekend = prev.date.weekday() == Weekday::Sat && next.date.weekday() == Weekday::Sun;
        if weekend {
            let team = prev.on_call();
            let all_back = team.iter().all(|name| {
                leave
                    .get(next.date)
                    .map_or(true, |r| !r.is_absent(name) && !r.is_restricted(name))
            });
            if team.len() == 3 && all_back {
                assert_eq!(next.on_call(), team, "weekend split on {}", next.date);
            }
        } else {
            assert!(
                prev.on_call().is_disjoint(&next.on_call()),
                "consecutive on-call on {} / {}",
                prev.date,
                next.date
            );
        }
    }
}

#[test]
fn sunday_rotates_tier1_when_possible() {
    let (_, roster) = generate(&MonthConfig::default(), &LeaveBook::new(), 5);
    for pair in roster.days.windows(2) {
        if pair[0].date.weekday() == Weekday::Sat {
            assert_ne!(pair[0].get(DutySlot::Tier1), pair[1].get(DutySlot::Tier1));
        }
    }
}

#[test]
fn procedure_slots_follow_configured_days() {
    let config = march_config();
    let (_, roster) = generate(&config, &march_leave(), 31);

    for day in &roster.days {
        let n = day.date.day();
        let saturday = day.date.weekday() == Weekday::Sat;
        assert_eq!(day.get(DutySlot::Elot1).is_some(), config.elot_days.contains(&n));
        assert_eq!(
            day.get(DutySlot::Elot2).is_some(),
            config.elot_days.contains(&n) && !saturday
        );
        assert_eq!(day.get(DutySlot::MinorOt1).is_some(), config.minor_ot_days.contains(&n));
        assert_eq!(day.get(DutySlot::MinorOt2).is_some(), config.minor_ot_days.contains(&n));
        assert_eq!(day.get(DutySlot::WoundClinic).is_some(), config.wound_days.contains(&n));
        assert_eq!(day.get(DutySlot::Tier3).is_some(), day.is_special);
        assert_eq!(day.get(DutySlot::Passive).is_some(), !day.is_special);
    }
    // le 2 mars est férié
    assert!(roster.find_day(date(2)).unwrap().is_special);
}

#[test]
fn policy_switches_change_cadence() {
    let mut config = MonthConfig::default();
    config.rules.passive_policy = PassivePolicy::EveryDay;
    config.rules.procedures_on_special_days = true;
    let (_, roster) = generate(&config, &LeaveBook::new(), 8);

    for day in &roster.days {
        assert!(day.get(DutySlot::Passive).is_some());
        assert_eq!(day.get(DutySlot::MinorOt1).is_some(), day.is_special);
        assert_eq!(day.get(DutySlot::WoundClinic).is_some(), day.is_special);
    }
}

#[test]
fn restricted_staff_may_take_minor_ot() {
    // seul S2 est éligible au petit bloc, et il est restreint le 4
    let mut people = staff();
    for p in people.iter_mut().skip(2) {
        p.eligible.remove(&garde::SlotKind::MinorOt);
    }
    people[0].eligible.remove(&garde::SlotKind::MinorOt);
    let mut config = MonthConfig::default();
    config.minor_ot_days.insert(4);
    let mut leave = LeaveBook::new();
    leave.mark_restricted(date(4), "S2");

    let scheduler = Scheduler::for_month(people.clone(), &leave, &config, 2026, 3).unwrap();
    let roster = scheduler
        .generate(SearchOptions::with_iterations(50).seeded(2))
        .unwrap()
        .roster;
    let day = roster.find_day(date(4)).unwrap();
    assert_eq!(day.get(DutySlot::MinorOt1).or(day.get(DutySlot::MinorOt2)), Some("S2"));

    config.rules.restricted_may_minor_ot = false;
    let scheduler = Scheduler::for_month(people, &leave, &config, 2026, 3).unwrap();
    let roster = scheduler.run_trial(2);
    let day = roster.find_day(date(4)).unwrap();
    assert_eq!(day.get(DutySlot::MinorOt1), None);
    assert_eq!(day.get(DutySlot::MinorOt2), None);
    assert!(roster.penalty_count > 0);
}

#[test]
fn absent_sunday_member_breaks_the_weekend_team() {
    let config = MonthConfig::default();
    let seed = 13;
    // samedi 7 mars : équipe tirée sans aucun congé
    let free = Scheduler::for_month(staff(), &LeaveBook::new(), &config, 2026, 3).unwrap();
    let saturday = free.run_trial(seed).find_day(date(7)).unwrap().clone();
    let gone = saturday.get(DutySlot::Tier2).unwrap().to_string();

    // absent le dimanche seulement : les tirages jusqu'au samedi sont inchangés
    let mut leave = LeaveBook::new();
    leave.mark_absent(date(8), &gone);
    let scheduler = Scheduler::for_month(staff(), &leave, &config, 2026, 3).unwrap();
    let roster = scheduler.run_trial(seed);
    assert_eq!(roster.find_day(date(7)).unwrap(), &saturday);

    assert!(roster.penalty_count >= config.rules.penalties.weekend_broken);
    let sunday = roster.find_day(date(8)).unwrap();
    for slot in DutySlot::ON_CALL {
        assert!(sunday.get(slot).is_some(), "{slot} empty on Sunday");
    }
    let team = sunday.on_call();
    assert!(!team.contains(gone.as_str()));
    for name in saturday.on_call() {
        if name != gone {
            assert!(team.contains(name), "{name} dropped from the weekend team");
        }
    }
    assert!(scheduler
        .detect_violations(&roster)
        .iter()
        .all(|v| v.kind != ViolationKind::WeekendSplit));
}

#[test]
fn restricted_staff_may_take_elot_when_allowed() {
    let mut config = MonthConfig::default();
    config.elot_days.insert(3);
    let mut leave = LeaveBook::new();
    leave.mark_restricted(date(3), "S2");

    let scheduler = Scheduler::for_month(staff(), &leave, &config, 2026, 3).unwrap();
    let elot = scheduler.available(DutySlot::Elot1, date(3), &[], &[]);
    assert!(!elot.iter().any(|n| n == "S2"));
    assert_eq!(elot.len(), 9);

    config.rules.restricted_may_elot = true;
    let scheduler = Scheduler::for_month(staff(), &leave, &config, 2026, 3).unwrap();
    let elot = scheduler.available(DutySlot::Elot1, date(3), &[], &[]);
    assert!(elot.iter().any(|n| n == "S2"));
    assert_eq!(elot.len(), 10);
    // l'astreinte reste fermée au personnel restreint
    let tier1 = scheduler.available(DutySlot::Tier1, date(3), &[], &[]);
    assert!(!tier1.iter().any(|n| n == "S2"));
}
