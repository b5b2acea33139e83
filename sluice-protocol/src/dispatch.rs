//! Stage/role dispatcher
//!
//! The host injects reserved tokens immediately after the command name: a
//! stage token (`__GETINFO__` or `__EXECUTE__`) and, for the map half of a
//! reporting command, the `__map__` role token. These lex as ordinary field
//! tokens; this module interprets and strips them, exactly once per process
//! invocation.

use sluice_core::{
    CommandKind, CommandLine, DispatchError, InvocationContext, Role, Stage, EXECUTE_TOKEN,
    GETINFO_TOKEN, MAP_TOKEN,
};

/// Whether a token sits in the host's reserved `__...__` namespace.
fn is_reserved(token: &str) -> bool {
    token.len() > 4 && token.starts_with("__") && token.ends_with("__")
}

/// Resolve the invocation context from the reserved tokens and return it
/// together with the command line with those tokens stripped.
///
/// # Arguments
/// * `command_line` - The parsed command line, reserved tokens still in its
///   leading field positions
/// * `kind` - What the command declares itself to be; a streaming command
///   has only the plain behavior, while a reporting command runs as map when
///   the role token is present and as reduce when it is absent
///
/// # Returns
/// The context and the command line with the reserved tokens removed, or a
/// `DispatchError` when the token shapes match none of the known stage/role
/// combinations.
pub fn resolve(
    command_line: &CommandLine,
    kind: CommandKind,
) -> Result<(InvocationContext, CommandLine), DispatchError> {
    let fields = command_line.fields();

    let stage = match fields.first().map(String::as_str) {
        Some(GETINFO_TOKEN) => Stage::Probe,
        Some(EXECUTE_TOKEN) => Stage::Execute,
        Some(token) if is_reserved(token) => {
            return Err(DispatchError::UnrecognizedStageToken {
                token: token.to_string(),
            });
        }
        _ => {
            return Err(DispatchError::MissingStageToken {
                command: command_line.name().to_string(),
            });
        }
    };

    let mut consumed = 1;
    let role = match fields.get(1).map(String::as_str) {
        Some(MAP_TOKEN) => {
            consumed = 2;
            match kind {
                CommandKind::Reporting => Role::Map,
                CommandKind::Streaming => {
                    return Err(DispatchError::InvalidRoleToken {
                        token: MAP_TOKEN.to_string(),
                        command: command_line.name().to_string(),
                    });
                }
            }
        }
        Some(token) if is_reserved(token) => {
            return Err(DispatchError::InvalidRoleToken {
                token: token.to_string(),
                command: command_line.name().to_string(),
            });
        }
        _ => match kind {
            CommandKind::Streaming => Role::Plain,
            CommandKind::Reporting => Role::Reduce,
        },
    };

    let stripped = CommandLine::new(
        command_line.name(),
        command_line.options().to_vec(),
        fields[consumed..].to_vec(),
    );

    Ok((InvocationContext::new(stage, role), stripped))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_grammar::parse;

    #[test]
    fn test_streaming_probe_plain() {
        let line = parse("sum __GETINFO__ total=x y").unwrap();
        let (ctx, stripped) = resolve(&line, CommandKind::Streaming).unwrap();
        assert_eq!(ctx, InvocationContext::new(Stage::Probe, Role::Plain));
        assert_eq!(stripped.fields(), ["y"]);
        assert_eq!(stripped.option("total"), Some("x"));
    }

    #[test]
    fn test_reporting_execute_map() {
        let line = parse("sum __EXECUTE__ __map__ total=x y").unwrap();
        let (ctx, stripped) = resolve(&line, CommandKind::Reporting).unwrap();
        assert_eq!(ctx, InvocationContext::new(Stage::Execute, Role::Map));
        assert_eq!(stripped.fields(), ["y"]);
    }

    #[test]
    fn test_reporting_execute_reduce_without_map_token() {
        let line = parse("sum __EXECUTE__ total=x y").unwrap();
        let (ctx, _) = resolve(&line, CommandKind::Reporting).unwrap();
        assert_eq!(ctx, InvocationContext::new(Stage::Execute, Role::Reduce));
    }

    #[test]
    fn test_reporting_probe_map() {
        let line = parse("sum __GETINFO__ __map__ total=x y").unwrap();
        let (ctx, _) = resolve(&line, CommandKind::Reporting).unwrap();
        assert_eq!(ctx, InvocationContext::new(Stage::Probe, Role::Map));
    }

    #[test]
    fn test_missing_stage_token() {
        let line = parse("sum total=x y").unwrap();
        assert_eq!(
            resolve(&line, CommandKind::Streaming),
            Err(DispatchError::MissingStageToken {
                command: "sum".to_string(),
            })
        );
    }

    #[test]
    fn test_unrecognized_stage_token() {
        let line = parse("sum __FROBNICATE__ y").unwrap();
        assert_eq!(
            resolve(&line, CommandKind::Streaming),
            Err(DispatchError::UnrecognizedStageToken {
                token: "__FROBNICATE__".to_string(),
            })
        );
    }

    #[test]
    fn test_map_token_invalid_for_streaming() {
        let line = parse("grep __EXECUTE__ __map__ y").unwrap();
        assert_eq!(
            resolve(&line, CommandKind::Streaming),
            Err(DispatchError::InvalidRoleToken {
                token: "__map__".to_string(),
                command: "grep".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_role_token() {
        let line = parse("sum __EXECUTE__ __reduce__ y").unwrap();
        assert_eq!(
            resolve(&line, CommandKind::Reporting),
            Err(DispatchError::InvalidRoleToken {
                token: "__reduce__".to_string(),
                command: "sum".to_string(),
            })
        );
    }

    #[test]
    fn test_plain_fields_never_mistaken_for_tokens() {
        let line = parse("sum __EXECUTE__ date_hour date_minute").unwrap();
        let (_, stripped) = resolve(&line, CommandKind::Streaming).unwrap();
        assert_eq!(stripped.fields(), ["date_hour", "date_minute"]);
    }
}
