//! Sluice Grammar - Command Line Parser
//!
//! Parses the raw command line a search host hands to a spawned command
//! process. The grammar is fixed and small:
//!
//! ```text
//! command-line = command [ws option]* [ws field]*
//! command      = \w+
//! option       = \w+ "=" value
//! value        = ([^\s"]+ | quoted string, `""` and `\"` escape a quote)
//! field        = [.-\w]+ (optionally double-quoted)
//! ```
//!
//! Tokenization is whitespace-delimited outside quotes; quoted whitespace is
//! preserved. A token containing `=` before any quote is an option; the first
//! token is always the command name regardless of `=`. Reserved stage/role
//! tokens lex as ordinary fields here and are interpreted by the dispatcher.

pub mod lexer;
pub mod parser;

pub use lexer::*;
pub use parser::*;
