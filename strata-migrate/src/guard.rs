//! Idempotency classification of statement failures.
//!
//! DDL written with `IF NOT EXISTS` guards never errors on rerun, but some
//! statements have no such form (`ADD CONSTRAINT`, older `ADD COLUMN`). The
//! guard implements the perform-and-catch policy for those: run the statement,
//! and if it fails because the desired end-state already holds, treat the
//! failure as benign and move on.

use crate::client::StatementError;

/// How a statement failure should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The statement's intended effect already holds; continue.
    Benign,
    /// A real error; the containing migration must stop.
    Genuine,
}

/// SQLSTATE codes for PostgreSQL `duplicate_*` conditions.
const BENIGN_SQLSTATES: &[&str] = &[
    "42701", // duplicate_column
    "42P07", // duplicate_table
    "42710", // duplicate_object (constraints, roles, ...)
    "42P06", // duplicate_schema
    "42723", // duplicate_function
];

/// Lowercase message fragments that signal an already-applied change, for
/// drivers that cannot surface a condition code.
const BENIGN_PATTERNS: &[&str] = &["already exists", "duplicate column"];

/// Classifies statement failures as benign (already applied) or genuine.
///
/// Classification is by error signature only; the guard never inspects the
/// statement text. For a fixed signature the answer is always the same.
#[derive(Debug, Clone)]
pub struct IdempotencyGuard {
    sqlstates: Vec<String>,
    patterns: Vec<String>,
}

impl Default for IdempotencyGuard {
    fn default() -> Self {
        Self {
            sqlstates: BENIGN_SQLSTATES.iter().map(|s| s.to_string()).collect(),
            patterns: BENIGN_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IdempotencyGuard {
    /// Create a guard with the default signature table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a guard that classifies everything as genuine.
    pub fn strict() -> Self {
        Self {
            sqlstates: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Add a SQLSTATE code to treat as benign.
    pub fn allow_sqlstate(mut self, code: impl Into<String>) -> Self {
        self.sqlstates.push(code.into());
        self
    }

    /// Add a message fragment (matched case-insensitively) to treat as benign.
    pub fn allow_message(mut self, fragment: impl Into<String>) -> Self {
        self.patterns.push(fragment.into().to_lowercase());
        self
    }

    /// Classify a statement failure.
    ///
    /// A lost connection is always genuine regardless of signature.
    pub fn classify(&self, err: &StatementError) -> Classification {
        if err.is_connection_lost() {
            return Classification::Genuine;
        }

        if let Some(code) = err.sqlstate() {
            if self.sqlstates.iter().any(|c| c == code) {
                return Classification::Benign;
            }
        }

        let message = err.message().to_lowercase();
        if self.patterns.iter().any(|p| message.contains(p.as_str())) {
            return Classification::Benign;
        }

        Classification::Genuine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_sqlstate_is_benign() {
        let guard = IdempotencyGuard::new();
        let err = StatementError::execution("column \"age\" of relation \"users\" already exists")
            .with_sqlstate("42701");
        assert_eq!(guard.classify(&err), Classification::Benign);
    }

    #[test]
    fn test_duplicate_object_sqlstate_is_benign() {
        let guard = IdempotencyGuard::new();
        let err = StatementError::execution(
            "constraint \"fk_orders_user\" for relation \"orders\" already exists",
        )
        .with_sqlstate("42710");
        assert_eq!(guard.classify(&err), Classification::Benign);
    }

    #[test]
    fn test_message_fallback_without_sqlstate() {
        let guard = IdempotencyGuard::new();
        let err = StatementError::execution("index \"idx_users_email\" ALREADY EXISTS");
        assert_eq!(guard.classify(&err), Classification::Benign);
    }

    #[test]
    fn test_syntax_error_is_genuine() {
        let guard = IdempotencyGuard::new();
        let err = StatementError::execution("syntax error at or near \"CREAT\"")
            .with_sqlstate("42601");
        assert_eq!(guard.classify(&err), Classification::Genuine);
    }

    #[test]
    fn test_connection_lost_is_always_genuine() {
        // Even if the message happens to match a benign pattern.
        let guard = IdempotencyGuard::new();
        let err = StatementError::connection_lost("connection already exists no more");
        assert_eq!(guard.classify(&err), Classification::Genuine);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let guard = IdempotencyGuard::new();
        let benign = StatementError::execution("x").with_sqlstate("42P07");
        let genuine = StatementError::execution("syntax error");
        for _ in 0..3 {
            assert_eq!(guard.classify(&benign), Classification::Benign);
            assert_eq!(guard.classify(&genuine), Classification::Genuine);
        }
    }

    #[test]
    fn test_strict_guard() {
        let guard = IdempotencyGuard::strict();
        let err = StatementError::execution("already exists").with_sqlstate("42701");
        assert_eq!(guard.classify(&err), Classification::Genuine);
    }

    #[test]
    fn test_custom_signature() {
        let guard = IdempotencyGuard::strict().allow_message("Duplicate key name");
        let err = StatementError::execution("Duplicate key name 'idx_email'");
        assert_eq!(guard.classify(&err), Classification::Benign);
    }
}
