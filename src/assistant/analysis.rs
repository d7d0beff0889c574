//! Second stage of the READ path.
//!
//! The model is asked for a detailed answer; when that call fails or comes
//! back empty a deterministic template is rendered from the context summary
//! instead.

use super::context::{ContextSummary, TaskBrief};
use super::prompt::{analysis_messages, ANALYSIS_PARAMS};
use crate::api::llm::ChatCompletion;
use crate::libs::task::Category;
use std::cmp::Reverse;

const CATEGORY_KEYWORDS: [&str; 2] = ["category", "카테고리"];
const TODAY_KEYWORDS: [&str; 2] = ["today", "오늘"];

/// Where a READ answer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Model(String),
    Template(String),
}

impl Analysis {
    pub fn into_text(self) -> String {
        match self {
            Analysis::Model(text) | Analysis::Template(text) => text,
        }
    }
}

pub async fn analyze(llm: &dyn ChatCompletion, question: &str, summary: &ContextSummary, context_json: &str) -> Analysis {
    let messages = analysis_messages(question, context_json, summary.today);
    match llm.complete(&messages, &ANALYSIS_PARAMS).await {
        Ok(text) if !text.trim().is_empty() => Analysis::Model(text),
        Ok(_) => {
            tracing::warn!(model = llm.model(), "analysis reply was empty, using template");
            Analysis::Template(render_template(question, summary))
        }
        Err(e) => {
            tracing::warn!(model = llm.model(), error = %e, "analysis call failed, using template");
            Analysis::Template(render_template(question, summary))
        }
    }
}

fn percent(part: usize, whole: usize) -> usize {
    ((part as f64 / whole.max(1) as f64) * 100.0).round() as usize
}

fn bullet_list(items: impl Iterator<Item = String>) -> String {
    let lines: Vec<String> = items.collect();
    if lines.is_empty() {
        "- none".to_string()
    } else {
        lines.join("\n")
    }
}

fn mark(task: &TaskBrief) -> &'static str {
    if task.completed {
        "✅"
    } else {
        "⏰"
    }
}

fn due(task: &TaskBrief) -> String {
    task.due_date.map(|d| d.to_string()).unwrap_or_default()
}

/// Deterministic answer. Precedence: today keywords, then category keywords,
/// then the general overview.
pub fn render_template(question: &str, summary: &ContextSummary) -> String {
    let q = question.to_lowercase();
    if TODAY_KEYWORDS.iter().any(|k| q.contains(k)) {
        today_template(summary)
    } else if CATEGORY_KEYWORDS.iter().any(|k| q.contains(k)) {
        category_template(summary)
    } else {
        overview_template(summary)
    }
}

fn today_template(summary: &ContextSummary) -> String {
    let done = summary.counts.today_completed;
    let open = summary.counts.today - done;

    format!(
        "## 📋 Today's tasks ({today})\n\n### ✅ Done ({done})\n{done_list}\n\n### ⏰ Still to do ({open})\n{open_list}\n\n### 📊 Progress\n**{pct}%** complete",
        today = summary.today,
        done_list = bullet_list(
            summary.today_tasks.iter().filter(|t| t.completed).map(|t| format!("- **{}** ({})", t.title, t.category))
        ),
        open_list = bullet_list(
            summary
                .today_tasks
                .iter()
                .filter(|t| !t.completed)
                .map(|t| format!("- **{}** ({}, {})", t.title, t.category, t.priority))
        ),
        pct = percent(done, summary.counts.today),
    )
}

fn category_template(summary: &ContextSummary) -> String {
    let mut ranked: Vec<(&Category, &usize)> = summary.categories.iter().collect();
    ranked.sort_by_key(|(category, count)| (Reverse(**count), **category));

    let top = ranked
        .first()
        .map(|(category, count)| format!("**{}** ({})", category, count))
        .unwrap_or_else(|| "**none** (0)".to_string());

    format!(
        "## 📊 Tasks by category\n\n{}\n\n### 🏆 Largest category\n{}",
        bullet_list(ranked.iter().map(|(category, count)| format!("- **{}**: {}", category, count))),
        top
    )
}

fn overview_template(summary: &ContextSummary) -> String {
    let mut sections = vec![format!(
        "## 📋 All tasks\n\n### 📊 Totals\n- **Total**: {}\n- **Done**: {} ({}%)\n- **Open**: {}",
        summary.total,
        summary.completed,
        percent(summary.completed, summary.total),
        summary.total - summary.completed
    )];

    if summary.counts.today > 0 {
        sections.push(format!(
            "### 📝 Today ({})\n{}",
            summary.counts.today,
            bullet_list(summary.today_tasks.iter().map(|t| format!("- {} **{}** ({})", mark(t), t.title, t.category)))
        ));
    } else {
        sections.push("### 📝 Today\nNothing due today.".to_string());
    }

    if summary.counts.upcoming > 0 {
        sections.push(format!(
            "### 🔮 Upcoming ({})\n{}",
            summary.counts.upcoming,
            bullet_list(
                summary
                    .upcoming_tasks
                    .iter()
                    .take(3)
                    .map(|t| format!("- **{}** ({}, {})", t.title, due(t), t.category))
            )
        ));
    }

    if summary.counts.past > 0 {
        sections.push(format!(
            "### ⚠️ Past due ({})\n{}",
            summary.counts.past,
            bullet_list(summary.past_tasks.iter().take(3).map(|t| {
                let status = if t.completed { "✅" } else { "❌" };
                format!("- **{}** ({}, {}) {}", t.title, due(t), t.category, status)
            }))
        ));
    }

    if summary.counts.no_date > 0 {
        sections.push(format!(
            "### 📌 No due date ({})\n{}",
            summary.counts.no_date,
            bullet_list(
                summary
                    .no_date_tasks
                    .iter()
                    .take(3)
                    .map(|t| format!("- {} **{}** ({})", mark(t), t.title, t.category))
            )
        ));
    }

    sections.join("\n\n")
}
