//! Record adapter: wire rows to list-valued records and back
//!
//! On the wire every logical field is a scalar column plus an optional
//! `__mv_<field>` companion carrying the encoded item list. The adapter hides
//! the companions entirely: downstream logic sees genuinely list-valued
//! records. On output every field always gets both columns, even singletons,
//! so the next processor in the pipeline can rely on the paired shape without
//! a schema pass.
//!
//! The data region is one tab-separated column-name line followed by
//! tab-separated rows. Tabs, newlines, and backslashes inside a cell travel
//! as `\t`, `\n`, `\r`, and `\\`.

use crate::codec;
use crate::command::RecordSink;
use crate::header::{self, trim_line_end};
use sluice_core::{
    CodecError, MessagesHeader, MultiValue, ProtocolError, ProtocolFramingError, ProtocolResult,
    Record, Severity,
};
use std::io::{BufRead, Write};
use tracing::warn;

/// Prefix of the companion column backing a multi-value field.
pub const MV_PREFIX: &str = "__mv_";

/// The wire-level pair carrying one logical field: the scalar column text and
/// the optional `__mv_` companion. A present, non-empty companion is the
/// authoritative source of the field's items; an empty companion counts as
/// absent and the scalar derives the value instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedColumn {
    pub scalar: String,
    pub mv: Option<String>,
}

impl EncodedColumn {
    /// Resolve the pair into the field's logical value.
    ///
    /// # Returns
    /// The multi-value the pair carries: the decoded companion items when
    /// the companion is present and non-empty (the scalar text is kept as
    /// the display override), otherwise a value derived from the scalar
    /// column alone - the empty list for empty text, a singleton for
    /// anything else.
    pub fn decode(self) -> Result<MultiValue, CodecError> {
        match self.mv {
            Some(encoded) if !encoded.is_empty() => {
                Ok(MultiValue::new(codec::decode(&encoded)?).with_display(self.scalar))
            }
            _ if self.scalar.is_empty() => Ok(MultiValue::empty()),
            _ => Ok(MultiValue::single(self.scalar)),
        }
    }

    /// The pair a value travels as. The companion is always emitted, even
    /// for singletons, so downstream processors can rely on the paired shape.
    pub fn encode(value: &MultiValue) -> Self {
        Self {
            scalar: value.scalar_text().to_string(),
            mv: Some(codec::encode(value.items())),
        }
    }

    /// Companion text for the wire, empty when absent.
    pub fn mv_text(&self) -> &str {
        self.mv.as_deref().unwrap_or("")
    }
}

// ============================================================================
// CELL ESCAPING
// ============================================================================

fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_cell(cell: &str) -> Result<String, ProtocolFramingError> {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                return Err(ProtocolFramingError::InvalidCellEscape { escape: other });
            }
            None => return Err(ProtocolFramingError::TruncatedEscape),
        }
    }
    Ok(out)
}

// ============================================================================
// READER
// ============================================================================

/// Streams records off the wire, one per data row.
///
/// A malformed row yields one `Err` and the reader stays usable for the rows
/// after it; the caller decides how many such faults to tolerate.
pub struct RecordReader<R> {
    reader: R,
    columns: Vec<String>,
    line: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Read the column-name line. Immediate end of stream is an empty input.
    pub fn new(mut reader: R) -> ProtocolResult<Self> {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        let columns = if n == 0 {
            Vec::new()
        } else {
            trim_line_end(&line)
                .split('\t')
                .map(|cell| unescape_cell(cell).map_err(ProtocolError::from))
                .collect::<ProtocolResult<Vec<String>>>()?
        };

        Ok(Self {
            reader,
            columns,
            line: String::new(),
        })
    }

    /// Wire column names, companions included.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The next record off the wire.
    ///
    /// # Returns
    /// `Some(Ok)` for each well-formed row and `Some(Err)` for a malformed
    /// one - the reader stays positioned on the following row either way -
    /// then `None` once the data region ends.
    pub fn next_record(&mut self) -> Option<ProtocolResult<Record>> {
        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => None,
            Ok(_) if trim_line_end(&self.line).is_empty() => None,
            Ok(_) => Some(self.parse_row()),
            Err(err) => Some(Err(err.into())),
        }
    }

    fn parse_row(&self) -> ProtocolResult<Record> {
        let cells: Vec<&str> = trim_line_end(&self.line).split('\t').collect();
        if cells.len() != self.columns.len() {
            return Err(ProtocolFramingError::CellCountMismatch {
                expected: self.columns.len(),
                got: cells.len(),
            }
            .into());
        }

        let mut record = Record::new();
        for (column, cell) in self.columns.iter().zip(&cells) {
            if column.starts_with(MV_PREFIX) {
                continue;
            }
            let pair = EncodedColumn {
                scalar: unescape_cell(cell)?,
                mv: self.companion_cell(column, &cells)?,
            };
            record.set(column.clone(), pair.decode()?);
        }

        Ok(record)
    }

    fn companion_cell(&self, field: &str, cells: &[&str]) -> ProtocolResult<Option<String>> {
        let name = format!("{}{}", MV_PREFIX, field);
        match self.columns.iter().position(|column| *column == name) {
            Some(idx) => Ok(Some(unescape_cell(cells[idx])?)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// WRITER
// ============================================================================

/// Writes records in the paired-column shape and owns the messages header.
///
/// The header is buffered and flushed as one unit immediately before the
/// first output row, or at [`RecordWriter::finish`] when no rows are
/// produced. Each row is serialized completely and written as one unit, so a
/// kill between rows never leaves a partial row on the stream.
pub struct RecordWriter<W: Write> {
    writer: W,
    schema: Option<Vec<String>>,
    messages: MessagesHeader,
    messages_flushed: bool,
    fatal_seen: bool,
    rows_written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            schema: None,
            messages: MessagesHeader::new(),
            messages_flushed: false,
            fatal_seen: false,
            rows_written: 0,
        }
    }

    /// Record a diagnostic. After the single header flush a message can no
    /// longer reach the host; it is surfaced on the log instead, but fatal
    /// severity still drives the exit status.
    pub fn message(&mut self, severity: Severity, text: &str) {
        if severity == Severity::Fatal {
            self.fatal_seen = true;
        }
        if self.messages_flushed {
            warn!(severity = %severity, text, "message arrived after the header flush");
        } else {
            self.messages.push(severity, text);
        }
    }

    /// Whether a fatal message was recorded at any point.
    pub fn fatal_seen(&self) -> bool {
        self.fatal_seen
    }

    /// Complete rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush the messages header. The first call wins; later calls are no-ops.
    pub fn flush_messages(&mut self) -> ProtocolResult<()> {
        if self.messages_flushed {
            return Ok(());
        }
        self.messages_flushed = true;
        header::write_messages_header(&mut self.writer, &self.messages)
    }

    /// Write one record as one atomic row. A field-less record arriving
    /// before any schema exists has nothing to seed the column line with; it
    /// is dropped and reported at warn severity rather than written.
    pub fn write(&mut self, record: &Record) -> ProtocolResult<()> {
        if self.schema.is_none() && record.is_empty() {
            self.message(
                Severity::Warn,
                "Dropped a field-less record: no output schema to project it onto",
            );
            return Ok(());
        }

        self.flush_messages()?;

        if self.schema.is_none() {
            let fields: Vec<String> = record.field_names().map(str::to_string).collect();
            self.write_column_line(&fields)?;
            self.schema = Some(fields);
        }

        let mut line = String::new();
        if let Some(schema) = self.schema.as_deref() {
            for name in record.field_names() {
                if !schema.iter().any(|field| field == name) {
                    return Err(ProtocolFramingError::UnknownOutputField {
                        field: name.to_string(),
                    }
                    .into());
                }
            }
            for (i, field) in schema.iter().enumerate() {
                if i > 0 {
                    line.push('\t');
                }
                match record.get(field) {
                    Some(value) => {
                        let pair = EncodedColumn::encode(value);
                        line.push_str(&escape_cell(&pair.scalar));
                        line.push('\t');
                        line.push_str(&escape_cell(pair.mv_text()));
                    }
                    None => line.push('\t'),
                }
            }
        }
        line.push('\n');

        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn write_column_line(&mut self, fields: &[String]) -> ProtocolResult<()> {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            line.push_str(&escape_cell(field));
            line.push('\t');
            line.push_str(MV_PREFIX);
            line.push_str(&escape_cell(field));
        }
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Flush the messages header if it never went out, then the stream.
    pub fn finish(&mut self) -> ProtocolResult<()> {
        self.flush_messages()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for RecordWriter<W> {
    fn write_record(&mut self, record: Record) -> ProtocolResult<()> {
        self.write(&record)
    }

    fn message(&mut self, severity: Severity, text: &str) {
        RecordWriter::message(self, severity, text);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn reader_for(data: &str) -> RecordReader<BufReader<&[u8]>> {
        RecordReader::new(BufReader::new(data.as_bytes())).unwrap()
    }

    #[test]
    fn test_encoded_column_companion_is_authoritative() {
        let pair = EncodedColumn {
            scalar: "NYC".to_string(),
            mv: Some("$NYC$;$Boston$".to_string()),
        };
        let value = pair.decode().unwrap();
        assert_eq!(value.items(), ["NYC", "Boston"]);
        assert_eq!(value.display(), Some("NYC"));
    }

    #[test]
    fn test_encoded_column_empty_companion_counts_as_absent() {
        let pair = EncodedColumn {
            scalar: "NYC".to_string(),
            mv: Some(String::new()),
        };
        assert_eq!(pair.decode().unwrap().items(), ["NYC"]);

        let absent = EncodedColumn {
            scalar: String::new(),
            mv: None,
        };
        assert!(absent.decode().unwrap().is_empty());
    }

    #[test]
    fn test_encoded_column_encode_always_carries_companion() {
        let pair = EncodedColumn::encode(&MultiValue::single("a"));
        assert_eq!(pair.scalar, "a");
        assert_eq!(pair.mv_text(), "a");

        let pair = EncodedColumn::encode(&MultiValue::new(vec!["a".into(), "b".into()]));
        assert_eq!(pair.scalar, "a");
        assert_eq!(pair.mv_text(), "$a$;$b$");
    }

    #[test]
    fn test_read_scalar_only_field() {
        let mut reader = reader_for("city\nNYC\n");
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.get("city").unwrap().items(), ["NYC"]);
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_read_companion_overrides_scalar() {
        let mut reader = reader_for("city\t__mv_city\nNYC\t$NYC$;$Boston$\n");
        let record = reader.next_record().unwrap().unwrap();
        let city = record.get("city").unwrap();
        assert_eq!(city.items(), ["NYC", "Boston"]);
        assert_eq!(city.display(), Some("NYC"));
        // The companion never surfaces as a field
        assert!(record.get("__mv_city").is_none());
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_read_empty_companion_falls_back_to_scalar() {
        let mut reader = reader_for("city\t__mv_city\nNYC\t\n");
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.get("city").unwrap().items(), ["NYC"]);
    }

    #[test]
    fn test_read_empty_scalar_is_empty_list() {
        let mut reader = reader_for("city\tcount\n\t3\n");
        let record = reader.next_record().unwrap().unwrap();
        assert!(record.get("city").unwrap().is_empty());
        assert_eq!(record.get("count").unwrap().items(), ["3"]);
    }

    #[test]
    fn test_read_escaped_cells() {
        let mut reader = reader_for("text\na\\tb\\nc\\\\d\n");
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.get("text").unwrap().items(), ["a\tb\nc\\d"]);
    }

    #[test]
    fn test_read_cell_count_mismatch_is_row_fault() {
        let mut reader = reader_for("a\tb\n1\n1\t2\n");
        assert!(reader.next_record().unwrap().is_err());
        // The reader recovers on the next row
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.get("b").unwrap().items(), ["2"]);
    }

    #[test]
    fn test_read_bad_companion_encoding_is_row_fault() {
        let mut reader = reader_for("c\t__mv_c\nx\t$a$;$b\ny\t$a$;$b$\n");
        let first = reader.next_record().unwrap();
        assert!(matches!(first, Err(ProtocolError::Codec(_))));
        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.get("c").unwrap().items(), ["a", "b"]);
    }

    #[test]
    fn test_read_empty_stream() {
        let mut reader = reader_for("");
        assert!(reader.columns().is_empty());
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_write_emits_paired_columns() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut record = Record::new();
        record.set("city", MultiValue::new(vec!["NYC".into(), "Boston".into()]));
        record.set("count", MultiValue::single("2"));
        writer.write(&record).unwrap();
        writer.finish().unwrap();

        let out = String::from_utf8(writer.writer).unwrap();
        assert_eq!(
            out,
            "\ncity\t__mv_city\tcount\t__mv_count\nNYC\t$NYC$;$Boston$\t2\t2\n"
        );
    }

    #[test]
    fn test_write_display_override_drives_scalar_column() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut record = Record::new();
        record.set(
            "city",
            MultiValue::new(vec!["NYC".into(), "Boston".into()]).with_display("NYC Boston"),
        );
        writer.write(&record).unwrap();
        let out = String::from_utf8(writer.writer).unwrap();
        assert!(out.ends_with("NYC Boston\t$NYC$;$Boston$\n"));
    }

    #[test]
    fn test_write_missing_schema_field_emits_empty_pair() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut first = Record::new();
        first.set("a", MultiValue::single("1"));
        first.set("b", MultiValue::single("2"));
        writer.write(&first).unwrap();

        let mut second = Record::new();
        second.set("b", MultiValue::single("3"));
        writer.write(&second).unwrap();

        let out = String::from_utf8(writer.writer).unwrap();
        assert!(out.ends_with("\t\t3\t3\n"));
    }

    #[test]
    fn test_write_unknown_field_is_rejected_without_partial_row() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut first = Record::new();
        first.set("a", MultiValue::single("1"));
        writer.write(&first).unwrap();

        let mut second = Record::new();
        second.set("zzz", MultiValue::single("9"));
        let err = writer.write(&second).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Framing(ProtocolFramingError::UnknownOutputField { .. })
        ));
        assert_eq!(writer.rows_written(), 1);

        let out = String::from_utf8(writer.writer).unwrap();
        // Only complete rows on the stream
        assert_eq!(out.matches('\n').count(), 3);
        assert!(out.ends_with("1\t1\n"));
    }

    #[test]
    fn test_write_field_less_record_before_schema_warns_and_drops() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write(&Record::new()).unwrap();
        assert_eq!(writer.rows_written(), 0);

        let mut record = Record::new();
        record.set("a", MultiValue::single("1"));
        writer.write(&record).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.rows_written(), 1);

        // The warning made the header because the drop happened pre-flush
        let out = String::from_utf8(writer.writer).unwrap();
        assert_eq!(
            out,
            "warn: Dropped a field-less record: no output schema to project it onto\n\na\t__mv_a\n1\t1\n"
        );
    }

    #[test]
    fn test_messages_flush_before_first_row_only_once() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.message(Severity::Warn, "heads up");
        let mut record = Record::new();
        record.set("a", MultiValue::single("1"));
        writer.write(&record).unwrap();
        // Arrives after the flush: kept off the stream
        writer.message(Severity::Error, "too late");
        writer.finish().unwrap();

        let out = String::from_utf8(writer.writer).unwrap();
        assert!(out.starts_with("warn: heads up\n\n"));
        assert!(!out.contains("too late"));
    }

    #[test]
    fn test_fatal_after_flush_still_tracked() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut record = Record::new();
        record.set("a", MultiValue::single("1"));
        writer.write(&record).unwrap();
        writer.message(Severity::Fatal, "mid-stream disaster");
        assert!(writer.fatal_seen());
    }

    #[test]
    fn test_finish_without_rows_flushes_header_only() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.message(Severity::Fatal, "cannot start");
        writer.finish().unwrap();
        let out = String::from_utf8(writer.writer).unwrap();
        assert_eq!(out, "fatal: cannot start\n\n");
    }

    #[test]
    fn test_wire_round_trip_through_reader() {
        let mut writer = RecordWriter::new(Vec::new());
        let mut record = Record::new();
        record.set(
            "mv",
            MultiValue::new(vec!["a$b".into(), "c;d".into(), "".into()]),
        );
        record.set("plain", MultiValue::single("tab\there"));
        writer.write(&record).unwrap();
        writer.finish().unwrap();

        let bytes = writer.writer;
        // Skip the blank messages header line before the data region
        let data = &bytes[1..];
        let mut reader = RecordReader::new(BufReader::new(data)).unwrap();
        let back = reader.next_record().unwrap().unwrap();
        assert_eq!(back, record);
    }
}
