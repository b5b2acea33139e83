//! Parsed command line representation

use serde::{Deserialize, Serialize};

/// A single `name=value` pair from the command line.
/// The value is the unescaped content; quotes and escape sequences are
/// already resolved by the grammar parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    pub value: String,
}

/// A parsed command line: command name, ordered options, ordered field tokens.
///
/// Created once per process invocation by the grammar parser and immutable
/// thereafter. Option names are unique within one command line. Option and
/// field order is preserved for diagnostics; option lookup is by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    name: String,
    options: Vec<CommandOption>,
    fields: Vec<String>,
}

impl CommandLine {
    /// Assemble a command line. Callers (the grammar parser, the dispatcher)
    /// are responsible for the unique-option-name invariant.
    pub fn new(name: impl Into<String>, options: Vec<CommandOption>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            options,
            fields,
        }
    }

    /// The command name (always the first token of the raw line).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an option value by name.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|opt| opt.name == name)
            .map(|opt| opt.value.as_str())
    }

    /// All options in command-line order.
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    /// All bare field tokens in command-line order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandLine {
        CommandLine::new(
            "sum",
            vec![CommandOption {
                name: "total".to_string(),
                value: "total_date_hour".to_string(),
            }],
            vec!["date_hour".to_string()],
        )
    }

    #[test]
    fn test_option_lookup_by_name() {
        let line = sample();
        assert_eq!(line.option("total"), Some("total_date_hour"));
        assert_eq!(line.option("missing"), None);
    }

    #[test]
    fn test_field_order_preserved() {
        let line = CommandLine::new(
            "top",
            vec![],
            vec!["b".to_string(), "a".to_string(), "c".to_string()],
        );
        assert_eq!(line.fields(), ["b", "a", "c"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let line = sample();
        let json = serde_json::to_string(&line).unwrap();
        let back: CommandLine = serde_json::from_str(&json).unwrap();
        assert_eq!(line, back);
    }
}
