//! Error classification helpers for callers that need to react to specific
//! constraint failures instead of treating every DB error as opaque.

use sea_orm::{DbErr, SqlErr};

/// True if the code denotes a unique constraint violation
/// (SQLite extended code 2067 or 1555 for primary keys; Postgres 23505 and
/// MySQL 1062 are accepted for completeness).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(code, "2067" | "1555" | "23505" | "1062")
}

pub fn is_sqlx_unique_violation(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code()
        .map(|c| is_unique_violation_code(c.as_ref()))
        .unwrap_or(false)
}

/// Detect a unique constraint violation in a SeaORM error.
pub fn is_seaorm_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    err.to_string().to_ascii_lowercase().contains("unique constraint failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_codes() {
        assert!(is_unique_violation_code("2067"));
        assert!(is_unique_violation_code("1555"));
        assert!(!is_unique_violation_code("787"));
    }

    #[test]
    fn test_seaorm_message_fallback() {
        let err = DbErr::Custom("UNIQUE constraint failed: recipes.name".into());
        assert!(is_seaorm_unique_violation(&err));
        let other = DbErr::Custom("FOREIGN KEY constraint failed".into());
        assert!(!is_seaorm_unique_violation(&other));
    }
}
