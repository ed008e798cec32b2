//! Text for every [`Message`].
//!
//! All user-facing wording lives in this one `match`, so the macros and
//! commands only ever pass structured values around.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === SCHEMA MESSAGES ===
            Message::SchemaStateDetected(state) => format!("Database layout detected: {}", state),
            Message::SchemaCreated => "Created a new database".to_string(),
            Message::SchemaUpToDate => "Database schema is up to date".to_string(),
            Message::SchemaVersion(version) => format!("Current schema version: {}", version),
            Message::LegacySchemaDetected => "Older database layout found, migrating...".to_string(),
            Message::LegacyMigrated(categories, kept, dropped) => {
                format!("Migrated {} categories and {} todos ({} unreadable todos dropped)", categories, kept, dropped)
            }
            Message::DefaultCategoriesSeeded(count) => format!("Created {} default categories", count),
            Message::StoreInitialized(path) => format!("Using database {}", path),
            Message::StatusSummary(categories, open) => format!("{} categories, {} open todos", categories, open),

            // === CATEGORY MESSAGES ===
            Message::CategoryCreated(name) => format!("Category '{}' created", name),
            Message::CategoryNameBlank => "Category name is empty, nothing created".to_string(),
            Message::CategoryNotFound(id) => format!("Category {} not found", id),
            Message::CategoryKindChanged(id, kind) => format!("Category {} is now {}", id, kind),
            Message::CategoryDeleted(id, todos) => format!("Category {} deleted along with {} todo(s)", id, todos),
            Message::CategoriesReordered => "Categories reordered".to_string(),
            Message::CategoriesHeader => "Categories:".to_string(),
            Message::ConfirmDeleteCategory(name) => format!("Delete category '{}' and all of its todos?", name),

            // === TODO MESSAGES ===
            Message::TodoCreated(id) => format!("Todo {} created", id),
            Message::TodoToggled(id) => format!("Todo {} completion toggled", id),
            Message::TodoDiscarded(id) => format!("Todo {} discarded", id),
            Message::TodoRestored(id) => format!("Todo {} restored", id),
            Message::TodoErased(id) => format!("Todo {} erased", id),
            Message::TodosHeader(category) => format!("Todos in '{}':", category),
            Message::CompletedHeader(category) => format!("Completed in '{}':", category),
            Message::NoTodos => "No todos found".to_string(),
            Message::SuggestionsHeader(prefix) => format!("Titles starting with '{}':", prefix),
            Message::NoSuggestions => "No matching titles".to_string(),

            // === CALENDAR MESSAGES ===
            Message::CalendarHeader(first, last) => format!("Calendar {} .. {}", first, last),
            Message::CalendarEmpty => "Nothing scheduled".to_string(),

            // === BACKUP MESSAGES ===
            Message::ExportCompleted(path) => format!("Database exported to {}", path),
            Message::ImportCompleted => "Database imported".to_string(),
            Message::ImportFailed(error) => format!("Import failed: {}", error),
            Message::BackupRestored => "Previous database restored".to_string(),
            Message::RestoreFailed(error) => format!("Previous database could not be restored: {}", error),
            Message::ConfirmImport(path) => format!("Replace the current database with {}?", path),
            Message::ImportFileNotFound(path) => format!("File not found: {}", path),
            Message::ImportUnknownExtension(path) => format!("{} does not look like a database file (.sqlite, .sqlite3, .db)", path),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigPath(path) => format!("Configuration file: {}", path),

            // === GENERIC MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
        };

        write!(f, "{}", text)
    }
}
