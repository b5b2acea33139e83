//! Parser implementation

use crate::lexer::*;
use once_cell::sync::Lazy;
use regex::Regex;
use sluice_core::{CommandLine, CommandOption, GrammarError};

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("valid name pattern"));
static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[.\-\w]+$").expect("valid field pattern"));

/// Parse a raw command line into a [`CommandLine`].
///
/// # Arguments
/// * `raw` - The raw argument line, exactly as the host passed it
///
/// # Returns
/// The parsed command line, or the `GrammarError` naming the first offending
/// token and its column.
pub fn parse(raw: &str) -> Result<CommandLine, GrammarError> {
    let tokens = Lexer::new(raw).tokenize();
    Parser::new(tokens).parse()
}

// ============================================================================
// PARSER
// ============================================================================

/// Parser over the lexer's token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a vector of tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the tokens into a CommandLine.
    pub fn parse(&mut self) -> Result<CommandLine, GrammarError> {
        if let Some(token) = self
            .tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Error(_)))
        {
            // The scanner's only error is a missing closing quote
            return Err(GrammarError::UnterminatedQuote {
                column: token.span.column(),
            });
        }

        let name = self.parse_command_name()?;

        let mut options: Vec<CommandOption> = Vec::new();
        let mut fields: Vec<String> = Vec::new();

        while !self.is_at_end() {
            let token = self.advance();
            let column = token.span.column();
            match &token.kind {
                TokenKind::Option { name, value } => {
                    if !NAME_RE.is_match(name) {
                        return Err(GrammarError::InvalidOptionName {
                            name: name.clone(),
                            column,
                        });
                    }
                    if options.iter().any(|opt| opt.name == *name) {
                        return Err(GrammarError::DuplicateOption {
                            name: name.clone(),
                            column,
                        });
                    }
                    options.push(CommandOption {
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
                TokenKind::Word(text) => {
                    if !FIELD_RE.is_match(text) {
                        return Err(GrammarError::InvalidField {
                            token: text.clone(),
                            column,
                        });
                    }
                    fields.push(text.clone());
                }
                TokenKind::Eof | TokenKind::Error(_) => break,
            }
        }

        Ok(CommandLine::new(name, options, fields))
    }

    /// The first token is always the command name, even when it contains `=`.
    fn parse_command_name(&mut self) -> Result<String, GrammarError> {
        let token = self.advance();
        let column = token.span.column();
        let name = match &token.kind {
            TokenKind::Word(text) => text.clone(),
            TokenKind::Option { name, value } => format!("{}={}", name, value),
            TokenKind::Eof => return Err(GrammarError::EmptyCommandLine),
            TokenKind::Error(_) => unreachable!("scanner errors surfaced before parsing"),
        };

        if !NAME_RE.is_match(&name) {
            return Err(GrammarError::InvalidCommandName { name, column });
        }

        Ok(name)
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }
}

// =============================================================================
// TESTS
// =============================================================================
