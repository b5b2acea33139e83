//! Sluice Test Utilities
//!
//! Centralized test infrastructure for the sluice workspace:
//! - Proptest generators for multi-value items and records
//! - A collecting sink for driving commands without a stream
//! - Wire fixture builders for end-to-end pipeline tests
//! - Mock streaming/reporting commands

// Re-export core types for convenience
pub use sluice_core::{
    CommandLine, InvocationContext, Message, MultiValue, ProtocolConfig, ProtocolError,
    ProtocolResult, Record, Role, Severity, Stage, StaticDeclaration,
};

use proptest::prelude::*;
use sluice_protocol::{RecordSink, ReportingCommand, SearchCommand, StreamingCommand};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// An arbitrary multi-value item, weighted toward the codec's hostile
/// characters: dollars, semicolons, backslashes, tabs.
pub fn arb_item() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,8}",
        "[$;]{0,6}",
        "[a-zA-Z0-9$; \\t\\\\.-]{0,10}",
    ]
}

/// An arbitrary item list, empty and singleton cases included.
pub fn arb_items() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_item(), 0..6)
}

/// An item list with two or more entries, where the codec must wrap.
pub fn arb_multi_items() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_item(), 2..6)
}

/// A wire-safe field name.
pub fn arb_field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// An arbitrary record with unique field names.
pub fn arb_record() -> impl Strategy<Value = Record> {
    prop::collection::btree_map(arb_field_name(), arb_items(), 1..5).prop_map(|fields| {
        let mut record = Record::new();
        for (name, items) in fields {
            record.set(name, MultiValue::new(items));
        }
        record
    })
}

// ============================================================================
// SINKS AND WIRE FIXTURES
// ============================================================================

/// A sink that keeps everything in memory for assertions.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub records: Vec<Record>,
    pub messages: Vec<Message>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for CollectSink {
    fn write_record(&mut self, record: Record) -> ProtocolResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn message(&mut self, severity: Severity, text: &str) {
        self.messages.push(Message {
            severity,
            text: text.to_string(),
        });
    }
}

/// Build a complete input stream: header block, column line, data rows.
/// Cells are raw wire text - already escaped and encoded.
pub fn wire_input(header: &[(&str, &str)], columns: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut out = String::new();
    for (key, value) in header {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    if !columns.is_empty() {
        out.push_str(&columns.join("\t"));
        out.push('\n');
        for row in rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
    }
    out.into_bytes()
}

// ============================================================================
// MOCK COMMANDS
// ============================================================================

/// Streaming command that uppercases the items of its configured fields.
#[derive(Debug, Default)]
pub struct UppercaseCommand {
    fields: Vec<String>,
}

impl UppercaseCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchCommand for UppercaseCommand {
    fn name(&self) -> &str {
        "upper"
    }

    fn configure(&mut self, command_line: &CommandLine) -> ProtocolResult<()> {
        self.fields = command_line.fields().to_vec();
        Ok(())
    }
}

impl StreamingCommand for UppercaseCommand {
    fn stream(&mut self, mut record: Record, sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        for field in &self.fields {
            if let Some(value) = record.get(field) {
                let upper: Vec<String> =
                    value.items().iter().map(|item| item.to_uppercase()).collect();
                record.set(field.clone(), MultiValue::new(upper));
            }
        }
        sink.write_record(record)
    }
}

/// Reporting command that sums numeric fields: the map half emits one
/// partial sum, the reduce half adds the partials into the final total.
#[derive(Debug)]
pub struct SumCommand {
    total_field: String,
    fields: Vec<String>,
    partial: f64,
}

impl SumCommand {
    pub fn new() -> Self {
        Self {
            total_field: "total".to_string(),
            fields: Vec::new(),
            partial: 0.0,
        }
    }
}

impl Default for SumCommand {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_fields(record: &Record, fields: &[String]) -> f64 {
    fields
        .iter()
        .filter_map(|field| record.get(field))
        .flat_map(|value| value.items())
        .filter_map(|item| item.parse::<f64>().ok())
        .sum()
}

impl SearchCommand for SumCommand {
    fn name(&self) -> &str {
        "sum"
    }

    fn configure(&mut self, command_line: &CommandLine) -> ProtocolResult<()> {
        if let Some(total) = command_line.option("total") {
            self.total_field = total.to_string();
        }
        self.fields = command_line.fields().to_vec();
        Ok(())
    }
}

impl ReportingCommand for SumCommand {
    fn map(&mut self, record: Record, _sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        self.partial += sum_fields(&record, &self.fields);
        Ok(())
    }

    fn map_finish(&mut self, sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        let mut record = Record::new();
        record.set(
            self.total_field.clone(),
            MultiValue::single(self.partial.to_string()),
        );
        sink.write_record(record)
    }

    fn accumulate(&mut self, record: Record) -> ProtocolResult<()> {
        self.partial += sum_fields(&record, std::slice::from_ref(&self.total_field));
        Ok(())
    }

    fn reduce(&mut self, sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        let mut record = Record::new();
        record.set(
            self.total_field.clone(),
            MultiValue::single(self.partial.to_string()),
        );
        sink.write_record(record)
    }
}

/// Streaming command that passes records through, then fails with a command
/// error once the budget is spent. Used to exercise mid-stream fatal paths.
#[derive(Debug)]
pub struct FailAfterCommand {
    budget: usize,
    seen: usize,
}

impl FailAfterCommand {
    pub fn new(budget: usize) -> Self {
        Self { budget, seen: 0 }
    }
}

impl SearchCommand for FailAfterCommand {
    fn name(&self) -> &str {
        "failafter"
    }
}

impl StreamingCommand for FailAfterCommand {
    fn stream(&mut self, record: Record, sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        if self.seen == self.budget {
            return Err(ProtocolError::command("induced mid-stream failure"));
        }
        self.seen += 1;
        sink.write_record(record)
    }
}
