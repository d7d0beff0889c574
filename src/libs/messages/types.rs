/// Every user-facing string in taskpad, grouped by the area that emits it.
///
/// Text lives in `display.rs`; callers only pick a variant and its parameters.
#[derive(Debug, Clone)]
pub enum Message {
    // === SERVER MESSAGES ===
    ServerStarting(String),
    ServerStopped,
    ServerBindFailed(String, String),

    // === API ENVELOPE MESSAGES ===
    InvalidInputData,
    TaskNotFound,
    TaskDeletedSuccessfully,
    FailedToFetchTasks,
    FailedToFetchTask,
    FailedToCreateTask,
    FailedToUpdateTask,
    FailedToDeleteTask,
    FailedToFetchStats,
    InternalServerError,
    StoreTaskFailed(String),

    // === TASK MESSAGES ===
    TaskCreated(String),
    TaskUpdated(String),
    TaskDeleted(String),
    TaskMarkedDone(String),
    TaskMarkedPending(String),
    TasksHeader(usize),
    TasksEmpty,
    NothingToUpdate,
    ConfirmDeleteTask(String),
    DeleteCancelled,
    InvalidDueDate(String),
    InvalidMonth(String),
    AmbiguousTaskId(String, usize),

    // === ASSISTANT MESSAGES ===
    AssistantMessageRequired,
    AssistantContextFailed,
    AssistantApology,
    AssistantStoreFailed,
    AssistantUnsupportedKey(String),
    AssistantInvalidValue(String, String),
    AssistantNoConditions,
    AssistantNoUpdates,
    AssistantNoMatches,
    AssistantNothingValid,
    AssistantCreated(usize),
    AssistantUpdated(usize),
    AssistantDeleted(usize),
    AssistantSkippedItem(String),
    AssistantModelFailed(String),
    AssistantReplyUnparsed,

    // === CHAT MESSAGES ===
    ChatWelcome,
    ChatPrompt,
    ChatGoodbye,
    ChatThinking,
    ChatActionLabel(String),

    // === CLIENT MESSAGES ===
    ServiceUnreachable(String),
    ServiceError(String),
    CacheHit(String),

    // === UI STATE MESSAGES ===
    UiStateSaved,
    UiStateLoadFailed(String),
    ThemeSwitched(bool),
    FiltersCleared,
    UiStateHeader,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigMissing,
    ConfigParseError,
    ConfigSaveError,
    ConfigModuleServer,
    ConfigModuleLlm,
    ConfigModuleClient,
    PromptSelectModules,
    PromptServerHost,
    PromptServerPort,
    PromptServerCors,
    PromptServerDatabase,
    PromptLlmBaseUrl,
    PromptLlmModel,
    PromptLlmApiKey,
    PromptLlmTimeout,
    PromptClientApiUrl,
    PromptClientStaleSecs,
    PromptTaskTitle,
    PromptTaskDescription,
    PromptTaskPriority,
    PromptTaskCategory,
    PromptTaskDueDate,
    PromptTaskCompleted,

    // === LLM MESSAGES ===
    LlmNotConfigured,
    LlmRequestStarted(String),

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
}
