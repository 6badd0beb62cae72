//! The caller's identity, threaded explicitly through every operation.

use serde::{Deserialize, Serialize};

/// Who is performing an operation.
///
/// Passed by value into read and write paths; there is no ambient or global
/// actor. Absence (`Option<ActorContext>::None`) is a valid state — reads
/// then skip row-security injection and writes stamp audit columns with 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// The actor's identifier, stamped into `created_by` / `updated_by` and
    /// substituted into row-security fragments.
    pub id: i64,
    /// The actor's role, used to select a row-security rule.
    pub role: i64,
}

impl ActorContext {
    pub fn new(id: i64, role: i64) -> Self {
        Self { id, role }
    }
}
