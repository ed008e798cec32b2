#[derive(Debug, Clone)]
pub enum Message {
    // === SCHEMA MESSAGES ===
    SchemaStateDetected(String),
    SchemaCreated,
    SchemaUpToDate,
    SchemaVersion(String),
    LegacySchemaDetected,
    LegacyMigrated(usize, usize, usize), // categories, todos kept, todos dropped
    DefaultCategoriesSeeded(usize),
    StoreInitialized(String), // path
    StatusSummary(usize, usize), // categories, open todos

    // === CATEGORY MESSAGES ===
    CategoryCreated(String),
    CategoryNameBlank,
    CategoryNotFound(i64),
    CategoryKindChanged(i64, String),
    CategoryDeleted(i64, usize), // id, cascaded todos
    CategoriesReordered,
    CategoriesHeader,
    ConfirmDeleteCategory(String),

    // === TODO MESSAGES ===
    TodoCreated(i64),
    TodoToggled(i64),
    TodoDiscarded(i64),
    TodoRestored(i64),
    TodoErased(i64),
    TodosHeader(String), // category name
    CompletedHeader(String),
    NoTodos,
    SuggestionsHeader(String),
    NoSuggestions,

    // === CALENDAR MESSAGES ===
    CalendarHeader(String, String), // first, last
    CalendarEmpty,

    // === BACKUP MESSAGES ===
    ExportCompleted(String),
    ImportCompleted,
    ImportFailed(String),
    BackupRestored,
    RestoreFailed(String),
    ConfirmImport(String),
    ImportFileNotFound(String),
    ImportUnknownExtension(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigPath(String),

    // === GENERIC MESSAGES ===
    OperationCancelled,
}
