//! Execution backend identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution backends a model can be run on.
///
/// The declaration order is the order in which backends are dispatched and
/// reported: results are always positioned by `BackendId`, never by arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
    /// Software backend built on the CPU execution provider. Available everywhere.
    Portable,
    /// Graphics backend built on a GPU execution provider. Availability depends
    /// on the host and on the enabled cargo features.
    Accelerated,
}

impl BackendId {
    /// Every backend, in dispatch order.
    pub const ALL: [BackendId; 2] = [BackendId::Portable, BackendId::Accelerated];

    /// Short lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Portable => "portable",
            BackendId::Accelerated => "accelerated",
        }
    }

    /// Human readable backend type for report tables.
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendId::Portable => "Portable (CPU)",
            BackendId::Accelerated => "Accelerated (GPU)",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
