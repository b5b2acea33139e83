//! Multi-value field codec
//!
//! A multi-value field travels over the scalar column format as one encoded
//! string: each item has its literal `$` doubled, is wrapped in `$`, and the
//! wrapped items are joined with `;`. The empty list is the empty string and
//! a single item travels verbatim - the scalar fast path. Both functions are
//! pure and stateless.

use sluice_core::CodecError;

/// Encode a list of items into one scalar string.
pub fn encode<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [single] => single.as_ref().to_string(),
        _ => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push('$');
                out.push_str(&item.as_ref().replace('$', "$$"));
                out.push('$');
            }
            out
        }
    }
}

/// Decode an encoded multi-value string back into its items.
///
/// A text is committed to the wrapped form only when it starts with `$` and
/// splits into two or more `$...$` spans covering the whole text; a lone
/// wrapped span or an unstructured text is the scalar fast path and decodes
/// as a single-item list.
///
/// # Arguments
/// * `text` - The scalar column text, exactly as it appeared on the wire
///
/// # Returns
/// The decoded items: empty for the empty string, a singleton for
/// unstructured text, the un-doubled span contents for a wrapped sequence.
/// `CodecError` when the text starts a span sequence containing the
/// top-level `$;$` separator but does not scan cleanly.
///
/// The scalar fast path makes one collision unavoidable: a singleton whose
/// text is itself a well-formed two-span encoding decodes as that list. The
/// record adapter resolves this structurally via the `__mv_` companion
/// column, never by content sniffing.
pub fn decode(text: &str) -> Result<Vec<String>, CodecError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if text.starts_with('$') {
        match scan_spans(text) {
            Ok(items) if items.len() >= 2 => return Ok(items),
            Ok(_) => {}
            Err(offset) => {
                if text.contains("$;$") {
                    return Err(CodecError::UnbalancedWrapping { offset });
                }
            }
        }
    }

    Ok(vec![text.to_string()])
}

/// Walk a `$`-wrapped span sequence, un-doubling `$$` within spans. Returns
/// the items, or the byte offset where the structure breaks.
fn scan_spans(text: &str) -> Result<Vec<String>, usize> {
    let mut chars = text.char_indices().peekable();
    let mut items = Vec::new();

    loop {
        match chars.next() {
            Some((_, '$')) => {}
            Some((i, _)) => return Err(i),
            None => return Err(text.len()),
        }

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(text.len()),
                Some((_, '$')) => {
                    if matches!(chars.peek(), Some((_, '$'))) {
                        chars.next();
                        item.push('$');
                    } else {
                        break;
                    }
                }
                Some((_, c)) => item.push(c),
            }
        }
        items.push(item);

        match chars.next() {
            None => return Ok(items),
            Some((_, ';')) => {}
            Some((i, _)) => return Err(i),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
