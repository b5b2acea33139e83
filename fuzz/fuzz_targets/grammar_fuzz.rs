//! Fuzz test for the command-line lexer and parser
//!
//! Feeds arbitrary byte sequences through the full parse pipeline to find:
//! - Panics or crashes
//! - Infinite loops
//! - Spans pointing outside the source
//!
//! Run with: cargo +nightly fuzz run grammar_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sluice_grammar::{parse, Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    // The grammar only speaks valid UTF-8; the host never sends anything else
    if let Ok(input) = std::str::from_utf8(data) {
        // The full pipeline should return Ok or Err, never panic
        let _ = parse(input);

        let tokens = Lexer::new(input).tokenize();

        // 1. Tokenization always produces at least Eof, and Eof is last
        assert!(!tokens.is_empty(), "tokenization should produce at least Eof");
        assert_eq!(
            tokens.last().unwrap().kind,
            TokenKind::Eof,
            "last token should always be Eof"
        );

        // 2. Spans stay inside the source and are well-formed
        for token in &tokens {
            assert!(token.span.start <= token.span.end, "span start should be <= end");
            assert!(token.span.end <= input.len(), "span should stay inside the source");
        }
    }
});
