use crate::api::llm::{ChatMessage, CompletionParams};
use chrono::NaiveDate;

/// Sampling for the intent classification call.
pub const CLASSIFY_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 1000,
};

/// Sampling for the READ analysis call; lower temperature for exact numbers.
pub const ANALYSIS_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.3,
    max_tokens: 1500,
};

const SYSTEM_PROMPT: &str = r#"You are a task management assistant. Reply in the language the user writes in.

Classify the user's message as exactly one action:
- CREATE: add new tasks (e.g. "I'll eat, work out and go shopping", "I have a meeting", "밥먹고 운동하고 쇼핑갈거야")
- READ: look up or analyse tasks (e.g. "what do I have today?", "show completed tasks", "group them by category")
- UPDATE: change tasks (e.g. "finished my workout", "운동 완료했어", "raise the priority")
- DELETE: remove tasks (e.g. "cancel shopping", "delete that")

Categories and priorities MUST use these English values:
- category: work, personal, health, shopping, learning
- priority: high, medium, low

Due dates are "YYYY-MM-DD", "today" or "tomorrow".

Conditions may only use these keys: due_date ("today" only), title (substring), category, completed (true/false).
Updates may only use: title, description, completed, priority, category, due_date, time.

Always answer with JSON only:
{
  "action": "CREATE|READ|UPDATE|DELETE",
  "data": { ... },
  "message": "short message for the user"
}

CREATE example:
{
  "action": "CREATE",
  "data": {
    "tasks": [
      {"title": "Eat lunch", "category": "personal", "priority": "medium", "due_date": "today"},
      {"title": "Work out", "category": "health", "priority": "high", "due_date": "today"},
      {"title": "Go shopping", "category": "shopping", "priority": "low"}
    ]
  },
  "message": "Added 3 new tasks!"
}

UPDATE example (mark as done):
{
  "action": "UPDATE",
  "data": {
    "conditions": {"title": "Work out", "completed": false},
    "updates": {"completed": true}
  },
  "message": "Workout marked as done!"
}

DELETE example:
{
  "action": "DELETE",
  "data": { "conditions": {"title": "shopping"} },
  "message": "Shopping removed."
}

READ example:
{
  "action": "READ",
  "data": { "query": "category statistics" },
  "message": "Here is your breakdown by category."
}"#;

const ANALYSIS_SYSTEM: &str =
    "You analyse task data. Answer the user's question about their current tasks concretely and in detail, using only the data given.";

/// Messages for the classification call: instructions plus the task digest, then the user's text.
pub fn classify_messages(user_message: &str, context_json: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!("{}\n\nCurrent task data:\n{}", SYSTEM_PROMPT, context_json)),
        ChatMessage::user(user_message),
    ]
}

/// Messages for the READ analysis call.
pub fn analysis_messages(question: &str, context_json: &str, today: NaiveDate) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"Analyse the current task data and answer the user's question.

Question: "{question}"

{context_json}

Dates:
- Today is {today}.
- "Today's tasks" means todayTasks only.
- "Tomorrow" or "upcoming" means upcomingTasks.
- "Missed" or "overdue" means pastTasks.
- "No deadline" means noDateTasks.
- Lists hold at most 5 samples; use `counts` for totals.

Answer rules:
1. Use the real data and exact numbers.
2. Keep today, upcoming and past tasks apart.
3. Write Markdown: ## or ### headings, "-" lists, **bold** for key facts.
4. Emoji are welcome.

Example:
## 📋 Task overview

### ✅ Done
- **Work out** (health, high)

### ⏰ Open
- **Study** (learning, high) 🔥

### 📊 By category
- **personal**: 3"#
    );

    vec![ChatMessage::system(ANALYSIS_SYSTEM), ChatMessage::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_messages_embed_context() {
        let messages = classify_messages("운동 완료했어", "{\"total\": 1}");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.ends_with("{\"total\": 1}"));
        assert_eq!(messages[1].content, "운동 완료했어");
    }

    #[test]
    fn test_analysis_prompt_names_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let messages = analysis_messages("what's due today?", "{}", today);
        assert!(messages[1].content.contains("Today is 2024-05-10."));
        assert!(messages[1].content.contains("\"what's due today?\""));
    }
}
