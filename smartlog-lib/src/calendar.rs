//! Calendar layout math for the history views.
//!
//! Everything here is pure date arithmetic over `chrono::NaiveDate` (a plain
//! calendar date, no timezone). Month indices are 0-based (0 = January) to
//! match the grid APIs; years are restricted to 1-9999.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::history::SessionIndex;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    #[error("year out of range 1-9999: {0}")]
    InvalidYear(i32),
    #[error("month index out of range 0-11: {0}")]
    InvalidMonth(u32),
}

fn check_year(year: i32) -> Result<(), CalendarError> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::InvalidYear(year))
    }
}

/// Gregorian leap year rule: divisible by 4, except centuries unless
/// divisible by 400.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the given month (0-based index).
pub fn days_in_month(year: i32, month_index: u32) -> Result<u32, CalendarError> {
    check_year(year)?;
    match month_index {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => Ok(31),
        3 | 5 | 8 | 10 => Ok(30),
        1 => Ok(if is_leap_year(year) { 29 } else { 28 }),
        other => Err(CalendarError::InvalidMonth(other)),
    }
}

/// Weekday column (0 = Sunday) of a date.
#[must_use]
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// The Sunday on or before the given date.
#[must_use]
pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(weekday_index(date)))
}

/// Cells of a month view: leading `None` padding (one per weekday slot before
/// day 1, Sunday-first), then `Some(1..=len)`. No trailing padding; the
/// renderer chunks the result into rows of 7.
pub fn month_cells(year: i32, month_index: u32) -> Result<Vec<Option<u32>>, CalendarError> {
    let len = days_in_month(year, month_index)?;
    let first = NaiveDate::from_ymd_opt(year, month_index + 1, 1)
        .ok_or(CalendarError::InvalidYear(year))?;

    let leading = weekday_index(first) as usize;
    let mut cells = Vec::with_capacity(leading + len as usize);
    cells.extend(std::iter::repeat(None).take(leading));
    cells.extend((1..=len).map(Some));
    Ok(cells)
}

/// One cell of the year contribution grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    pub count: usize,
}

/// Week-major contribution grid covering a full calendar year: `weeks`
/// columns of 7 rows (Sun..Sat), starting at the Sunday on or before Jan 1.
#[derive(Debug, Clone)]
pub struct YearGrid {
    pub year: i32,
    pub start: NaiveDate,
    pub weeks: usize,
    cells: Vec<GridCell>,
}

impl YearGrid {
    /// Cell at (column, row). Panics if out of bounds, like slice indexing.
    #[must_use]
    pub fn cell(&self, col: usize, row: usize) -> &GridCell {
        &self.cells[col * 7 + row]
    }

    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Column index of each month's label: the week containing the Sunday on
    /// or before the month's first day, keyed by column, valued by the short
    /// month name. Out-of-range columns are dropped.
    #[must_use]
    pub fn month_label_columns(&self) -> BTreeMap<usize, &'static str> {
        let mut columns = BTreeMap::new();
        for (m, name) in MONTH_NAMES.iter().enumerate() {
            let Some(first) = NaiveDate::from_ymd_opt(self.year, m as u32 + 1, 1) else {
                continue;
            };
            let sunday = sunday_on_or_before(first);
            let offset = (sunday - self.start).num_days();
            if offset >= 0 {
                let col = (offset / 7) as usize;
                if col < self.weeks {
                    columns.insert(col, *name);
                }
            }
        }
        columns
    }

    /// Heat bucket for rendering: 0, 1, 2, or 3+ sessions on a day.
    #[must_use]
    pub fn heat_level(count: usize) -> u8 {
        match count {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 3,
        }
    }
}

/// Builds the full-year contribution grid, joining each cell to the session
/// count for its date.
///
/// The column count starts from the grid-start..grid-end span, then is
/// verified by construction: if the last cell would still precede December 31
/// (possible when December 31 falls early in its week), columns are appended
/// until the whole year is covered.
pub fn year_grid(year: i32, index: &SessionIndex) -> Result<YearGrid, CalendarError> {
    check_year(year)?;
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CalendarError::InvalidYear(year))?;
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(CalendarError::InvalidYear(year))?;

    let start = sunday_on_or_before(jan1);
    let end = dec31 + Duration::days(i64::from(6 - weekday_index(dec31)));

    // Both endpoints are week-aligned, so the span divides evenly.
    let mut weeks = (((end - start).num_days() + 1) / 7) as usize;
    while start + Duration::days(weeks as i64 * 7 - 1) < dec31 {
        weeks += 1;
    }

    let mut cells = Vec::with_capacity(weeks * 7);
    for col in 0..weeks {
        for row in 0..7 {
            let date = start + Duration::days((col * 7 + row) as i64);
            cells.push(GridCell {
                date,
                count: index.count_by_date(date),
            });
        }
    }

    Ok(YearGrid {
        year,
        start,
        weeks,
        cells,
    })
}

/// Serde codec for calendar-day wire strings.
///
/// Decoding slices the first ten characters (`YYYY-MM-DD`) so timestamps like
/// `2024-02-29T18:00:00Z` map to the right day without any timezone parsing.
pub mod iso_day {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Parses the date portion of a wire string, ignoring any time suffix.
    #[must_use]
    pub fn parse_day(raw: &str) -> Option<NaiveDate> {
        let day_part = raw.get(..10)?;
        NaiveDate::parse_from_str(day_part, FORMAT).ok()
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_day(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {raw}")))
    }
}
