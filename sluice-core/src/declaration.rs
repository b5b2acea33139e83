//! Static protocol declaration reported during the probe stage

use serde::{Deserialize, Serialize};

/// The protocol flags a command reports when the host probes it.
///
/// The host requires the five standard flags to be enabled for every command
/// registered with this engine: dynamic probing, raw argument passing, the
/// input header, the output messages header, and multi-value support. A
/// deviation is a configuration error the host rejects before the command is
/// invoked. `generating` and `retainsevents` further describe how the host
/// should schedule the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDeclaration {
    pub supports_getinfo: bool,
    pub supports_rawargs: bool,
    pub enableheader: bool,
    pub outputheader: bool,
    pub supports_multivalue: bool,
    pub generating: bool,
    pub retainsevents: bool,
}

impl StaticDeclaration {
    /// The required flag set for commands speaking this protocol.
    pub fn standard() -> Self {
        Self {
            supports_getinfo: true,
            supports_rawargs: true,
            enableheader: true,
            outputheader: true,
            supports_multivalue: true,
            generating: false,
            retainsevents: false,
        }
    }

    /// Mark the command as generating (it produces rows without input).
    pub fn with_generating(mut self) -> Self {
        self.generating = true;
        self
    }

    /// Mark the command as retaining events rather than transforming them.
    pub fn with_retainsevents(mut self) -> Self {
        self.retainsevents = true;
        self
    }

    /// Whether the five required protocol flags are all enabled.
    pub fn is_standard_protocol(&self) -> bool {
        self.supports_getinfo
            && self.supports_rawargs
            && self.enableheader
            && self.outputheader
            && self.supports_multivalue
    }

    /// The declaration as ordered `(flag, "0"/"1")` pairs, the shape the
    /// probe reply row carries.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        fn flag(value: bool) -> String {
            if value { "1" } else { "0" }.to_string()
        }

        vec![
            ("supports_getinfo".to_string(), flag(self.supports_getinfo)),
            ("supports_rawargs".to_string(), flag(self.supports_rawargs)),
            ("enableheader".to_string(), flag(self.enableheader)),
            ("outputheader".to_string(), flag(self.outputheader)),
            (
                "supports_multivalue".to_string(),
                flag(self.supports_multivalue),
            ),
            ("generating".to_string(), flag(self.generating)),
            ("retainsevents".to_string(), flag(self.retainsevents)),
        ]
    }
}

impl Default for StaticDeclaration {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// TESTS
// =============================================================================
