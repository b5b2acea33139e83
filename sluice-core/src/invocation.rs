//! Invocation context: stage and role resolved from reserved argv tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved token selecting the probe stage.
pub const GETINFO_TOKEN: &str = "__GETINFO__";

/// Reserved token selecting the execute stage.
pub const EXECUTE_TOKEN: &str = "__EXECUTE__";

/// Reserved token selecting the map role of a reporting command.
pub const MAP_TOKEN: &str = "__map__";

/// Invocation phase. Probe invocations report configuration and exit without
/// touching the data stream; execute invocations perform the full exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Probe,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe => write!(f, "probe"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Behavior branch within one invocation. Plain is the single branch of a
/// streaming command; Map and Reduce are the two halves of a reporting
/// command split across the distributed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Plain,
    Map,
    Reduce,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Map => write!(f, "map"),
            Self::Reduce => write!(f, "reduce"),
        }
    }
}

/// What a command declares itself to be. Streaming commands have the single
/// Plain behavior; reporting commands declare both a map and a reduce
/// behavior and the host selects between them with the role token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Streaming,
    Reporting,
}

/// Stage and role for one process invocation, computed exactly once from the
/// reserved argv tokens and passed by value to whichever branch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationContext {
    pub stage: Stage,
    pub role: Role,
}

impl InvocationContext {
    pub fn new(stage: Stage, role: Role) -> Self {
        Self { stage, role }
    }
}

impl fmt::Display for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage, self.role)
    }
}

// =============================================================================
// TESTS
// =============================================================================
