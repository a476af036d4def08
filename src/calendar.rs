use crate::config::MonthConfig;
use crate::scheduler::SchedError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Jour calendaire classé (semaine / samedi / dimanche / férié).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    pub is_public_holiday: bool,
}

impl Day {
    pub fn new(date: NaiveDate, is_public_holiday: bool) -> Self {
        Self {
            date,
            is_public_holiday,
        }
    }

    pub fn day_of_month(&self) -> u32 {
        self.date.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn day_name(&self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn is_saturday(&self) -> bool {
        self.weekday() == Weekday::Sat
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday() == Weekday::Sun
    }

    /// Week-end ou jour férié.
    pub fn is_special(&self) -> bool {
        self.is_saturday() || self.is_sunday() || self.is_public_holiday
    }
}

/// Tous les jours du mois `month` (1..=12), dans l'ordre.
pub fn month_days(year: i32, month: u32, config: &MonthConfig) -> Result<Vec<Day>, SchedError> {
    let invalid = || SchedError::InvalidCalendarInput { year, month };
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let len = days_in_month(year, month).ok_or_else(invalid)?;
    span(first, len, config)
}

/// `len` jours consécutifs à partir de `start` (plage partielle d'un mois).
///
/// Les jours fériés sont repérés par leur numéro dans le mois, comme dans
/// la configuration mensuelle.
pub fn span(start: NaiveDate, len: u32, config: &MonthConfig) -> Result<Vec<Day>, SchedError> {
    let invalid = || SchedError::InvalidCalendarInput {
        year: start.year(),
        month: start.month(),
    };
    (0..i64::from(len))
        .map(|offset| {
            let date = start
                .checked_add_signed(Duration::days(offset))
                .ok_or_else(invalid)?;
            Ok(Day::new(date, config.is_public_holiday(date.day())))
        })
        .collect()
}

/// Nombre de jours du mois (calendrier grégorien proleptique).
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_february() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2026, 12), Some(31));
    }

    #[test]
    fn rejects_bad_month() {
        let cfg = MonthConfig::default();
        assert!(matches!(
            month_days(2026, 13, &cfg),
            Err(SchedError::InvalidCalendarInput { month: 13, .. })
        ));
        assert!(month_days(2026, 0, &cfg).is_err());
    }

    #[test]
    fn classifies_special_days() {
        let mut cfg = MonthConfig::default();
        cfg.public_holidays.insert(2);
        // mars 2026 : le 1er est un dimanche
        let days = month_days(2026, 3, &cfg).unwrap();
        assert_eq!(days.len(), 31);
        assert!(days[0].is_sunday());
        assert!(days[0].is_special());
        assert!(days[1].is_public_holiday);
        assert!(days[1].is_special());
        assert!(!days[2].is_special());
        assert!(days[6].is_saturday());
        assert_eq!(days[6].day_name(), "Saturday");
    }
}
