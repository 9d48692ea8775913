//! Working-day calendar arithmetic.
//!
//! Offsets count working days only: offset 0 is the plan start date when it
//! is a working day, otherwise the next working day after it.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Longest run of consecutive non-working days tolerated before giving up.
pub const MAX_NON_WORKING_RUN: u32 = 3660;

/// Errors from calendar conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{0} is not a working day")]
    NotAWorkingDay(NaiveDate),
    #[error("{date} is before the plan start {start}")]
    BeforeStart { date: NaiveDate, start: NaiveDate },
    #[error("no working day within {searched_days} days of {from}")]
    NoWorkingDay { from: NaiveDate, searched_days: u32 },
    #[error("date arithmetic out of range")]
    OutOfRange,
}

/// Predicate deciding whether a calendar date is a working day.
pub trait WorkdayFilter {
    fn is_workday(&self, date: NaiveDate) -> bool;
}

impl<F> WorkdayFilter for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_workday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Monday through Friday.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Weekdays;

impl WorkdayFilter for Weekdays {
    fn is_workday(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Weekdays minus an explicit set of holidays.
#[derive(Clone, Debug, Default)]
pub struct Holidays {
    dates: FxHashSet<NaiveDate>,
}

impl Holidays {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

impl WorkdayFilter for Holidays {
    fn is_workday(&self, date: NaiveDate) -> bool {
        Weekdays.is_workday(date) && !self.dates.contains(&date)
    }
}

/// Converts between working-day offsets and calendar dates.
#[derive(Clone, Copy)]
pub struct Calendar<'a> {
    start: NaiveDate,
    filter: &'a dyn WorkdayFilter,
}

impl std::fmt::Debug for Calendar<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar")
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}

impl<'a> Calendar<'a> {
    pub fn new(start: NaiveDate, filter: &'a dyn WorkdayFilter) -> Self {
        Self { start, filter }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        self.filter.is_workday(date)
    }

    /// First working day on or after `from`.
    fn next_workday_from(&self, from: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut candidate = from;
        for _ in 0..=MAX_NON_WORKING_RUN {
            if self.filter.is_workday(candidate) {
                return Ok(candidate);
            }
            candidate = candidate
                .checked_add_days(Days::new(1))
                .ok_or(CalendarError::OutOfRange)?;
        }
        Err(CalendarError::NoWorkingDay {
            from,
            searched_days: MAX_NON_WORKING_RUN,
        })
    }

    /// Date of working-day offset 0.
    pub fn first_workday(&self) -> Result<NaiveDate, CalendarError> {
        self.next_workday_from(self.start)
    }

    /// Calendar date of a working-day offset.
    pub fn offset_to_date(&self, offset: u32) -> Result<NaiveDate, CalendarError> {
        let mut date = self.first_workday()?;
        for _ in 0..offset {
            let next = date
                .checked_add_days(Days::new(1))
                .ok_or(CalendarError::OutOfRange)?;
            date = self.next_workday_from(next)?;
        }
        Ok(date)
    }

    /// Working-day offset of a date. Fails for non-working dates.
    pub fn date_to_offset(&self, date: NaiveDate) -> Result<u32, CalendarError> {
        if date < self.start {
            return Err(CalendarError::BeforeStart {
                date,
                start: self.start,
            });
        }
        if !self.filter.is_workday(date) {
            return Err(CalendarError::NotAWorkingDay(date));
        }
        let mut offset = 0u32;
        let mut current = self.start;
        while current < date {
            if self.filter.is_workday(current) {
                offset += 1;
            }
            current = current
                .checked_add_days(Days::new(1))
                .ok_or(CalendarError::OutOfRange)?;
        }
        Ok(offset)
    }

    /// The first `count` working dates, in offset order.
    pub fn dates(&self, count: u32) -> Result<Vec<NaiveDate>, CalendarError> {
        let mut dates = Vec::with_capacity(count as usize);
        if count == 0 {
            return Ok(dates);
        }
        let mut date = self.first_workday()?;
        dates.push(date);
        while dates.len() < count as usize {
            let next = date
                .checked_add_days(Days::new(1))
                .ok_or(CalendarError::OutOfRange)?;
            date = self.next_workday_from(next)?;
            dates.push(date);
        }
        Ok(dates)
    }
}
