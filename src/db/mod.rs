pub mod raw_content;
pub mod schema;
pub mod sqlite;

use crate::error::{AppError, AppResult};

pub use raw_content::RawContentStore;
pub use schema::ensure_schema;
pub use sqlite::{create_memory_pool, create_pool};

/// Checks that a table name can be interpolated into SQL as-is.
///
/// SQLite cannot bind identifiers, so configurable table names are restricted
/// to ASCII letters, digits and underscores, not starting with a digit.
pub fn validate_identifier(name: &str) -> AppResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "'{}' is not a valid table name",
            name
        )))
    }
}
