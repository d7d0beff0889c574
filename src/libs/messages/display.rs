//! Text for every [`Message`] variant.
//!
//! Wording shown to API clients (the `error`/`message` fields of the JSON
//! envelope) is part of the HTTP contract, so those strings change only
//! together with the clients that read them.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === SERVER MESSAGES ===
            Message::ServerStarting(addr) => format!("taskpad is listening on http://{}", addr),
            Message::ServerStopped => "Server stopped".to_string(),
            Message::ServerBindFailed(addr, error) => format!("Failed to bind {}: {}", addr, error),

            // === API ENVELOPE MESSAGES ===
            Message::InvalidInputData => "Invalid input data".to_string(),
            Message::TaskNotFound => "Task not found".to_string(),
            Message::TaskDeletedSuccessfully => "Task deleted successfully".to_string(),
            Message::FailedToFetchTasks => "Failed to fetch tasks".to_string(),
            Message::FailedToFetchTask => "Failed to fetch task".to_string(),
            Message::FailedToCreateTask => "Failed to create task".to_string(),
            Message::FailedToUpdateTask => "Failed to update task".to_string(),
            Message::FailedToDeleteTask => "Failed to delete task".to_string(),
            Message::FailedToFetchStats => "Failed to fetch statistics".to_string(),
            Message::InternalServerError => "Internal server error".to_string(),
            Message::StoreTaskFailed(error) => format!("Store task did not complete: {}", error),

            // === TASK MESSAGES ===
            Message::TaskCreated(title) => format!("Task '{}' created", title),
            Message::TaskUpdated(title) => format!("Task '{}' updated", title),
            Message::TaskDeleted(id) => format!("Task {} deleted", id),
            Message::TaskMarkedDone(title) => format!("'{}' marked as done", title),
            Message::TaskMarkedPending(title) => format!("'{}' moved back to pending", title),
            Message::TasksHeader(count) => format!("Tasks ({})", count),
            Message::TasksEmpty => "No tasks match the current filters".to_string(),
            Message::NothingToUpdate => "Nothing to update".to_string(),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::DeleteCancelled => "Deletion cancelled".to_string(),
            Message::InvalidDueDate(value) => format!("Invalid due date '{}', expected YYYY-MM-DD", value),
            Message::InvalidMonth(value) => format!("Invalid month '{}', expected YYYY-MM", value),
            Message::AmbiguousTaskId(prefix, count) => format!("'{}' matches {} tasks, give more of the id", prefix, count),

            // === ASSISTANT MESSAGES ===
            Message::AssistantMessageRequired => "Message is required".to_string(),
            Message::AssistantContextFailed => "Failed to load tasks".to_string(),
            Message::AssistantApology => "Sorry, something went wrong while handling your request. Please try again.".to_string(),
            Message::AssistantStoreFailed => "The request was understood but the task store reported an error".to_string(),
            Message::AssistantUnsupportedKey(key) => format!("'{}' is not something I can match or change on a task", key),
            Message::AssistantInvalidValue(key, value) => format!("'{}' is not a valid value for '{}'", value, key),
            Message::AssistantNoConditions => "Please tell me which tasks you mean before I change anything".to_string(),
            Message::AssistantNoUpdates => "Please tell me what should change".to_string(),
            Message::AssistantNoMatches => "No tasks matched your request".to_string(),
            Message::AssistantNothingValid => "None of the requested tasks were valid, nothing was added".to_string(),
            Message::AssistantCreated(count) => format!("{} task(s) added", count),
            Message::AssistantUpdated(count) => format!("{} task(s) updated", count),
            Message::AssistantDeleted(count) => format!("{} task(s) deleted", count),
            Message::AssistantSkippedItem(reason) => format!("Skipping invalid task: {}", reason),
            Message::AssistantModelFailed(error) => format!("Chat completion failed: {}", error),
            Message::AssistantReplyUnparsed => "Model reply carried no usable JSON, answering as READ".to_string(),

            // === CHAT MESSAGES ===
            Message::ChatWelcome => "Talk to your tasks. An empty line or 'exit' ends the session.".to_string(),
            Message::ChatPrompt => "You".to_string(),
            Message::ChatGoodbye => "Bye!".to_string(),
            Message::ChatThinking => "Thinking...".to_string(),
            Message::ChatActionLabel(action) => format!("[{}]", action),

            // === CLIENT MESSAGES ===
            Message::ServiceUnreachable(url) => format!("Could not reach the task service at {}. Is `taskpad serve` running?", url),
            Message::ServiceError(error) => format!("Task service error: {}", error),
            Message::CacheHit(key) => format!("Cache hit: {}", key),

            // === UI STATE MESSAGES ===
            Message::UiStateSaved => "UI state saved".to_string(),
            Message::UiStateLoadFailed(error) => format!("Could not read UI state, using defaults: {}", error),
            Message::ThemeSwitched(dark) => format!("Theme: {}", if *dark { "dark" } else { "light" }),
            Message::FiltersCleared => "Filters cleared".to_string(),
            Message::UiStateHeader => "UI state".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration file deleted".to_string(),
            Message::ConfigMissing => "There is no configuration file to delete".to_string(),
            Message::ConfigParseError => "Failed to parse configuration".to_string(),
            Message::ConfigSaveError => "Failed to save configuration".to_string(),
            Message::ConfigModuleServer => "Server settings".to_string(),
            Message::ConfigModuleLlm => "Assistant model settings".to_string(),
            Message::ConfigModuleClient => "Client settings".to_string(),
            Message::PromptSelectModules => "Select sections to configure".to_string(),
            Message::PromptServerHost => "Enter the address to listen on".to_string(),
            Message::PromptServerPort => "Enter the port to listen on".to_string(),
            Message::PromptServerCors => "Allow cross-origin requests?".to_string(),
            Message::PromptServerDatabase => "Enter the database file path".to_string(),
            Message::PromptLlmBaseUrl => "Enter the chat-completion API base URL".to_string(),
            Message::PromptLlmModel => "Enter the model name".to_string(),
            Message::PromptLlmApiKey => "Enter the API key (leave empty to use GROQ_API_KEY)".to_string(),
            Message::PromptLlmTimeout => "Enter the request timeout in seconds (0 for none)".to_string(),
            Message::PromptClientApiUrl => "Enter the task service URL".to_string(),
            Message::PromptClientStaleSecs => "Enter how long cached reads stay fresh (seconds)".to_string(),
            Message::PromptTaskTitle => "Title".to_string(),
            Message::PromptTaskDescription => "Description".to_string(),
            Message::PromptTaskPriority => "Priority".to_string(),
            Message::PromptTaskCategory => "Category".to_string(),
            Message::PromptTaskDueDate => "Due date (YYYY-MM-DD, empty to clear)".to_string(),
            Message::PromptTaskCompleted => "Completed?".to_string(),

            // === LLM MESSAGES ===
            Message::LlmNotConfigured => "Assistant model is not configured, chat replies will use fallbacks".to_string(),
            Message::LlmRequestStarted(model) => format!("Calling model {}", model),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
        };

        write!(f, "{}", text)
    }
}
