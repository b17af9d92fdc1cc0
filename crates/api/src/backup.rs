// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQL backup and restore.
//!
//! A backup is plain SQL: a fixed header line, `DELETE FROM` for every data
//! table, then one `INSERT` per row. Restoring replays the statements in a
//! single transaction after [`validate_backup`] has checked that nothing
//! but those two statement kinds, against those four tables, is present.
//!
//! Sessions are never part of a backup. Restoring deletes every user, so
//! every session ends with it.

use pcinv_persistence::{
    BackupSnapshot, CategoryRecord, HardwareRecord, HistoryRecord, SqlDialect, UserRecord,
};
use thiserror::Error;

/// The first line of every backup.
pub const BACKUP_HEADER: &str = "-- PCINV-BACKUP v1";

/// Tables a backup may touch, in insert order.
pub const DATA_TABLES: [&str; 4] = ["categories", "users", "hardware", "inventory_history"];

/// Keywords that may not appear anywhere outside a string literal.
pub const FORBIDDEN_KEYWORDS: [&str; 21] = [
    "DROP", "TRUNCATE", "ALTER", "CREATE", "GRANT", "REVOKE", "ATTACH", "DETACH", "PRAGMA",
    "LOAD_FILE", "OUTFILE", "DUMPFILE", "SHUTDOWN", "LOAD", "REPLACE", "UPDATE", "EXEC", "CALL",
    "HANDLER", "RENAME", "SET",
];

const PREVIEW_LEN: usize = 60;

/// Reasons a backup fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackupValidationError {
    /// The file has no content.
    #[error("Backup file is empty")]
    Empty,

    /// The first non-empty line is not the backup header.
    #[error("Missing '{header}' header on the first line", header = BACKUP_HEADER)]
    MissingHeader,

    /// A quoted literal or identifier is never closed.
    #[error("Unterminated quoted string in statement {index}")]
    UnterminatedLiteral { index: usize },

    /// A block comment is never closed.
    #[error("Unterminated block comment in statement {index}")]
    UnterminatedComment { index: usize },

    /// `MySQL` runs the body of `/*! ... */` comments, so they are refused.
    #[error("Executable comment in statement {index} is not allowed")]
    ExecutableComment { index: usize },

    /// A statement uses a keyword from the denylist.
    #[error("Statement {index} contains forbidden keyword {keyword}")]
    ForbiddenKeyword { index: usize, keyword: String },

    /// A statement is not `INSERT INTO`/`DELETE FROM` on a data table.
    #[error(
        "Statement {index} is not an INSERT INTO or DELETE FROM on an inventory table: {preview}"
    )]
    DisallowedStatement { index: usize, preview: String },

    /// Nothing but the header and comments.
    #[error("Backup contains no statements")]
    NoStatements,
}

// ============================================================================
// Writing
// ============================================================================

/// Renders a string literal for the given dialect.
///
/// Quotes are doubled on both backends. `MySQL` also treats backslash as an
/// escape character, so backslashes are doubled there too.
#[must_use]
pub fn quote_literal(value: &str, dialect: SqlDialect) -> String {
    let escaped: String = match dialect {
        SqlDialect::Sqlite => value.replace('\'', "''"),
        SqlDialect::Mysql => value.replace('\\', "\\\\").replace('\'', "''"),
    };
    format!("'{escaped}'")
}

fn quote_optional(value: Option<&str>, dialect: SqlDialect) -> String {
    value.map_or_else(|| String::from("NULL"), |v| quote_literal(v, dialect))
}

fn insert(table: &str, columns: &[&str], values: &[String]) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        columns.join(", "),
        values.join(", ")
    )
}

fn category_insert(row: &CategoryRecord, dialect: SqlDialect) -> String {
    insert(
        "categories",
        &["category_id", "name", "created_at"],
        &[
            row.category_id.to_string(),
            quote_literal(&row.name, dialect),
            quote_literal(&row.created_at, dialect),
        ],
    )
}

/// Presence is not carried over: restored users start offline.
fn user_insert(row: &UserRecord, dialect: SqlDialect) -> String {
    insert(
        "users",
        &[
            "user_id",
            "username",
            "password_hash",
            "full_name",
            "role",
            "created_at",
            "last_login_at",
            "last_activity_at",
            "is_active",
            "session_started_at",
        ],
        &[
            row.user_id.to_string(),
            quote_literal(&row.username, dialect),
            quote_literal(&row.password_hash, dialect),
            quote_literal(&row.full_name, dialect),
            quote_literal(&row.role, dialect),
            quote_literal(&row.created_at, dialect),
            quote_optional(row.last_login_at.as_deref(), dialect),
            quote_optional(row.last_activity_at.as_deref(), dialect),
            String::from("0"),
            String::from("NULL"),
        ],
    )
}

fn hardware_insert(row: &HardwareRecord, dialect: SqlDialect) -> String {
    insert(
        "hardware",
        &[
            "hardware_id",
            "name",
            "category_id",
            "hardware_type",
            "brand",
            "model",
            "serial_number",
            "unused",
            "in_use",
            "damaged",
            "repair",
            "total_quantity",
            "location",
            "created_at",
            "updated_at",
            "deleted_at",
        ],
        &[
            row.hardware_id.to_string(),
            quote_literal(&row.name, dialect),
            row.category_id.to_string(),
            quote_literal(&row.hardware_type, dialect),
            quote_literal(&row.brand, dialect),
            quote_literal(&row.model, dialect),
            quote_literal(&row.serial_number, dialect),
            row.unused.to_string(),
            row.in_use.to_string(),
            row.damaged.to_string(),
            row.repair.to_string(),
            row.total_quantity.to_string(),
            quote_literal(&row.location, dialect),
            quote_literal(&row.created_at, dialect),
            quote_literal(&row.updated_at, dialect),
            quote_optional(row.deleted_at.as_deref(), dialect),
        ],
    )
}

fn history_insert(row: &HistoryRecord, dialect: SqlDialect) -> String {
    let id_or_null = |id: Option<i64>| id.map_or_else(|| String::from("NULL"), |v| v.to_string());
    insert(
        "inventory_history",
        &[
            "history_id",
            "hardware_id",
            "hardware_name",
            "category_name",
            "serial_number",
            "user_id",
            "user_name",
            "action",
            "quantity_change",
            "unused_before",
            "in_use_before",
            "damaged_before",
            "repair_before",
            "unused_after",
            "in_use_after",
            "damaged_after",
            "repair_after",
            "details",
            "created_at",
        ],
        &[
            row.history_id.to_string(),
            id_or_null(row.hardware_id),
            quote_literal(&row.hardware_name, dialect),
            quote_literal(&row.category_name, dialect),
            quote_literal(&row.serial_number, dialect),
            id_or_null(row.user_id),
            quote_literal(&row.user_name, dialect),
            quote_literal(&row.action, dialect),
            row.quantity_change.to_string(),
            row.unused_before.to_string(),
            row.in_use_before.to_string(),
            row.damaged_before.to_string(),
            row.repair_before.to_string(),
            row.unused_after.to_string(),
            row.in_use_after.to_string(),
            row.damaged_after.to_string(),
            row.repair_after.to_string(),
            quote_optional(row.details.as_deref(), dialect),
            quote_literal(&row.created_at, dialect),
        ],
    )
}

/// Renders a full SQL backup of a snapshot.
///
/// # Arguments
///
/// * `snapshot` - Every row of the four data tables
/// * `dialect` - The dialect the backup will be restored into
/// * `generated_at` - Timestamp written into the generation comment
#[must_use]
pub fn create_backup(snapshot: &BackupSnapshot, dialect: SqlDialect, generated_at: &str) -> String {
    let mut lines: Vec<String> = vec![
        String::from(BACKUP_HEADER),
        format!("-- Generated at {generated_at} UTC"),
        String::new(),
    ];

    // Reverse dependency order
    lines.extend(
        DATA_TABLES
            .iter()
            .rev()
            .map(|table| format!("DELETE FROM {table};")),
    );
    lines.push(String::new());

    lines.extend(
        snapshot
            .categories
            .iter()
            .map(|row| category_insert(row, dialect)),
    );
    lines.extend(snapshot.users.iter().map(|row| user_insert(row, dialect)));
    lines.extend(
        snapshot
            .hardware
            .iter()
            .map(|row| hardware_insert(row, dialect)),
    );
    lines.extend(
        snapshot
            .history
            .iter()
            .map(|row| history_insert(row, dialect)),
    );

    let mut output: String = lines.join("\n");
    output.push('\n');
    output
}

// ============================================================================
// Validation
// ============================================================================

/// One statement split out of a backup.
#[derive(Debug, Default)]
struct ScannedStatement {
    /// The executable text with comments removed.
    text: String,
    /// The same text with every quoted span blanked, used for keyword checks.
    code: String,
}

/// Splits a backup into statements on `;` outside quotes and comments.
fn scan_statements(
    content: &str,
    dialect: SqlDialect,
) -> Result<Vec<ScannedStatement>, BackupValidationError> {
    let mut statements: Vec<ScannedStatement> = Vec::new();
    let mut current: ScannedStatement = ScannedStatement::default();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        let index: usize = statements.len() + 1;
        match c {
            '\'' | '"' | '`' => {
                current.text.push(c);
                current.code.push_str("''");
                let mut closed: bool = false;
                while let Some(inner) = chars.next() {
                    current.text.push(inner);
                    if inner == '\\' && c != '`' && dialect == SqlDialect::Mysql {
                        if let Some(escaped) = chars.next() {
                            current.text.push(escaped);
                        }
                    } else if inner == c {
                        if chars.peek() == Some(&c) {
                            current.text.push(c);
                            chars.next();
                        } else {
                            closed = true;
                            break;
                        }
                    }
                }
                if !closed {
                    return Err(BackupValidationError::UnterminatedLiteral { index });
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                skip_line(&mut chars);
                current.text.push('\n');
                current.code.push(' ');
            }
            '#' if dialect == SqlDialect::Mysql => {
                skip_line(&mut chars);
                current.text.push('\n');
                current.code.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'!') {
                    return Err(BackupValidationError::ExecutableComment { index });
                }
                let mut previous: char = ' ';
                let mut closed: bool = false;
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        closed = true;
                        break;
                    }
                    previous = inner;
                }
                if !closed {
                    return Err(BackupValidationError::UnterminatedComment { index });
                }
                current.text.push(' ');
                current.code.push(' ');
            }
            ';' => {
                let finished: ScannedStatement = std::mem::take(&mut current);
                if !finished.code.trim().is_empty() {
                    statements.push(finished);
                }
            }
            _ => {
                current.text.push(c);
                current.code.push(c);
            }
        }
    }

    if !current.code.trim().is_empty() {
        statements.push(current);
    }
    Ok(statements)
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn check_statement(index: usize, code: &str) -> Result<(), BackupValidationError> {
    let forbidden: Option<&str> = code
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase)
        .find_map(|word| {
            FORBIDDEN_KEYWORDS
                .iter()
                .copied()
                .find(|keyword| *keyword == word)
        });
    if let Some(keyword) = forbidden {
        return Err(BackupValidationError::ForbiddenKeyword {
            index,
            keyword: keyword.to_string(),
        });
    }

    let words: Vec<String> = code
        .split(|c: char| c.is_whitespace() || c == '(')
        .filter(|word| !word.is_empty())
        .take(3)
        .map(str::to_ascii_lowercase)
        .collect();
    let allowed: bool = match words.as_slice() {
        [verb, preposition, table] => {
            matches!(
                (verb.as_str(), preposition.as_str()),
                ("insert", "into") | ("delete", "from")
            ) && DATA_TABLES.contains(&table.as_str())
        }
        _ => false,
    };
    if !allowed {
        let preview: String = code.split_whitespace().collect::<Vec<&str>>().join(" ");
        return Err(BackupValidationError::DisallowedStatement {
            index,
            preview: preview.chars().take(PREVIEW_LEN).collect(),
        });
    }

    Ok(())
}

/// Validates an uploaded backup and splits it into statements.
///
/// # Arguments
///
/// * `content` - The uploaded SQL text
/// * `dialect` - The dialect of the database it will run against
///
/// # Returns
///
/// The statements in file order, comments removed, without trailing `;`.
///
/// # Errors
///
/// Returns an error if the header is missing, a quote or comment is left
/// open, a statement contains a forbidden keyword outside a literal, or a
/// statement is anything other than `INSERT INTO`/`DELETE FROM` on one of
/// the data tables.
pub fn validate_backup(
    content: &str,
    dialect: SqlDialect,
) -> Result<Vec<String>, BackupValidationError> {
    let content: &str = content.trim_start_matches('\u{feff}');
    let first_line: &str = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(BackupValidationError::Empty)?;
    if first_line != BACKUP_HEADER {
        return Err(BackupValidationError::MissingHeader);
    }

    let statements: Vec<ScannedStatement> = scan_statements(content, dialect)?;
    if statements.is_empty() {
        return Err(BackupValidationError::NoStatements);
    }

    statements
        .into_iter()
        .enumerate()
        .map(|(idx, statement)| {
            check_statement(idx + 1, &statement.code)?;
            Ok(statement.text.trim().to_string())
        })
        .collect()
}
