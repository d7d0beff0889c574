//! Month grid for the calendar view. Weeks start on Sunday and the grid is
//! padded with days of the neighbouring months to whole weeks.

use crate::libs::task::Task;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    /// Tasks due on this day.
    pub due: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub first: NaiveDate,
    pub weeks: Vec<[CalendarDay; 7]>,
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(text: &str) -> Option<NaiveDate> {
    let (year, month) = text.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

impl MonthGrid {
    /// Grid for the month containing `month`, with due counts taken from `tasks`.
    pub fn build(month: NaiveDate, tasks: &[Task], today: NaiveDate) -> Option<MonthGrid> {
        let first = month.with_day(1)?;
        let next_month = first.checked_add_months(chrono::Months::new(1))?;
        let last = next_month.pred_opt()?;

        let grid_start = first.checked_sub_days(Days::new(first.weekday().num_days_from_sunday() as u64))?;
        let grid_end = last.checked_add_days(Days::new(6 - last.weekday().num_days_from_sunday() as u64))?;

        let mut by_date: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
        for task in tasks {
            if let Some(due) = task.due_date {
                let entry = by_date.entry(due).or_default();
                entry.0 += 1;
                if task.completed {
                    entry.1 += 1;
                }
            }
        }

        let days: Vec<CalendarDay> = grid_start
            .iter_days()
            .take_while(|d| *d <= grid_end)
            .map(|date| {
                let (due, completed) = by_date.get(&date).copied().unwrap_or_default();
                CalendarDay {
                    date,
                    in_month: date.month() == first.month(),
                    is_today: date == today,
                    due,
                    completed,
                }
            })
            .collect();

        let weeks = days
            .chunks(7)
            .filter_map(|week| <[CalendarDay; 7]>::try_from(week).ok())
            .collect();

        Some(MonthGrid { first, weeks })
    }
}
