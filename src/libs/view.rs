//! Terminal rendering with prettytable.

use crate::assistant::{ActionResult, ChatOutcome};
use crate::libs::calendar::MonthGrid;
use crate::libs::messages::Message;
use crate::libs::task::{Category, Priority, Task, TaskStats};
use crate::libs::ui_state::UiState;
use crate::msg_print;
use prettytable::format::{self, TableFormat};
use prettytable::{row, Cell, Row, Table};

/// Leading characters of an id shown in lists; `show`/`edit` accept any unique id.
const SHORT_ID_LEN: usize = 8;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub struct View {
    format: TableFormat,
}

impl View {
    /// Box-drawing borders in dark mode, plain ASCII in light mode.
    pub fn new(dark: bool) -> Self {
        let format = if dark {
            *format::consts::FORMAT_BOX_CHARS
        } else {
            *format::consts::FORMAT_DEFAULT
        };
        View { format }
    }

    pub fn for_state(state: &UiState) -> Self {
        Self::new(state.is_dark_mode)
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(self.format);
        table
    }

    pub fn short_id(id: &str) -> &str {
        id.get(..SHORT_ID_LEN).unwrap_or(id)
    }

    fn status(task: &Task) -> &'static str {
        if task.completed {
            "✅"
        } else {
            "⬜"
        }
    }

    pub fn tasks_table(&self, tasks: &[Task]) -> Table {
        let mut table = self.table();
        table.set_titles(row!["", "ID", "TITLE", "CATEGORY", "PRIORITY", "DUE"]);
        for task in tasks {
            table.add_row(row![
                Self::status(task),
                Self::short_id(&task.id),
                task.title,
                format!("{} {}", task.category.emoji(), task.category),
                format!("{} {}", task.priority.emoji(), task.priority),
                task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            ]);
        }
        table
    }

    pub fn tasks(&self, tasks: &[Task]) {
        self.tasks_table(tasks).printstd();
    }

    pub fn task_card(&self, task: &Task) {
        let mut table = self.table();
        table.add_row(row!["Title", format!("{} {}", Self::status(task), task.title)]);
        if let Some(description) = &task.description {
            table.add_row(row!["Description", description]);
        }
        table.add_row(row!["Category", format!("{} {}", task.category.emoji(), task.category)]);
        table.add_row(row!["Priority", format!("{} {}", task.priority.emoji(), task.priority)]);
        if let Some(due) = task.due_date {
            table.add_row(row!["Due", due]);
        }
        table.add_row(row!["Order", task.order_index]);
        table.add_row(row!["Created", task.created_at.format("%Y-%m-%d %H:%M")]);
        table.add_row(row!["Updated", task.updated_at.format("%Y-%m-%d %H:%M")]);
        table.add_row(row!["ID", task.id]);
        table.printstd();
    }

    pub fn stats(&self, stats: &TaskStats) {
        let mut totals = self.table();
        totals.set_titles(row!["TOTAL", "DONE", "OPEN", "🔥 HIGH OPEN"]);
        totals.add_row(row![stats.total, stats.completed, stats.pending, stats.high_priority]);
        totals.printstd();

        let mut breakdown = self.table();
        breakdown.set_titles(row!["CATEGORY", "COUNT"]);
        for category in Category::ALL {
            let count = stats.by_category.get(&category).copied().unwrap_or(0);
            breakdown.add_row(row![format!("{} {}", category.emoji(), category), count]);
        }
        breakdown.printstd();

        let mut priorities = self.table();
        priorities.set_titles(row!["PRIORITY", "COUNT"]);
        for priority in Priority::ALL {
            let count = stats.by_priority.get(&priority).copied().unwrap_or(0);
            priorities.add_row(row![format!("{} {}", priority.emoji(), priority), count]);
        }
        priorities.printstd();
    }

    /// Each cell shows the day number and, when tasks are due, `done/due`.
    /// Today is marked with `*`, days outside the month are dimmed with parentheses.
    pub fn calendar_table(&self, grid: &MonthGrid) -> Table {
        let mut table = self.table();
        table.set_titles(Row::new(WEEKDAYS.iter().map(|d| Cell::new(d)).collect()));
        for week in &grid.weeks {
            let cells = week
                .iter()
                .map(|day| {
                    let number = chrono::Datelike::day(&day.date);
                    let mut text = if day.in_month {
                        number.to_string()
                    } else {
                        format!("({})", number)
                    };
                    if day.is_today {
                        text.push('*');
                    }
                    if day.due > 0 {
                        text.push_str(&format!("\n{}/{}", day.completed, day.due));
                    }
                    Cell::new(&text)
                })
                .collect();
            table.add_row(Row::new(cells));
        }
        table
    }

    pub fn calendar(&self, grid: &MonthGrid) {
        msg_print!(grid.first.format("%B %Y"), true);
        self.calendar_table(grid).printstd();
    }

    pub fn chat_reply(&self, outcome: &ChatOutcome) {
        let reply = &outcome.reply;
        msg_print!(Message::ChatActionLabel(reply.action.to_string()));
        if !reply.message.is_empty() {
            msg_print!(reply.message);
        }

        match &reply.result {
            Some(ActionResult::Created { message, created }) => {
                msg_print!(message);
                self.tasks(created);
            }
            Some(ActionResult::Updated { message, updated }) => {
                msg_print!(message);
                self.tasks(updated);
            }
            Some(ActionResult::Deleted { message, deleted }) => {
                msg_print!(message);
                self.tasks(deleted);
            }
            Some(ActionResult::Read { message, .. }) if *message != reply.message => msg_print!(message),
            Some(ActionResult::Nothing { message }) => msg_print!(message),
            Some(ActionResult::Read { .. }) | None => {}
        }

        if let Some(error) = &reply.error {
            crate::msg_error!(error);
        }
    }

    pub fn ui_state(&self, state: &UiState) {
        let none = || "-".to_string();
        let mut table = self.table();
        table.add_row(row!["Theme", if state.is_dark_mode { "dark" } else { "light" }]);
        table.add_row(row!["Status filter", state.filter]);
        table.add_row(row![
            "Search",
            Some(state.search_term.clone()).filter(|s| !s.is_empty()).unwrap_or_else(none)
        ]);
        table.add_row(row!["Category", state.selected_category.map(|c| c.to_string()).unwrap_or_else(none)]);
        table.add_row(row!["Priority", state.selected_priority.map(|p| p.to_string()).unwrap_or_else(none)]);
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn task() -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        Task {
            id: "0123456789abcdef".to_string(),
            title: "Work out".to_string(),
            description: None,
            completed: false,
            priority: Priority::High,
            category: Category::Health,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            order_index: 1,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(View::short_id("0123456789abcdef"), "01234567");
        assert_eq!(View::short_id("abc"), "abc");
    }

    #[test]
    fn test_tasks_table_row() {
        let table = View::new(false).tasks_table(&[task()]);
        let text = table.to_string();
        assert!(text.contains("01234567"));
        assert!(text.contains("🏃 health"));
        assert!(text.contains("🔥 high"));
        assert!(text.contains("2024-05-10"));
    }

    #[test]
    fn test_calendar_marks_today_and_counts() {
        let tenth = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let grid = MonthGrid::build(tenth, &[task()], tenth).unwrap();
        let text = View::new(false).calendar_table(&grid).to_string();
        assert!(text.contains("10*"));
        assert!(text.contains("0/1"));
        assert!(text.contains("(28)"));
    }
}
