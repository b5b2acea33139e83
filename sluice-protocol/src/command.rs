//! Command seams
//!
//! A concrete search command lives outside this engine and plugs in through
//! these traits. The probe stage is answered by the pure
//! [`SearchCommand::declaration`] entry point; the execute stage drives the
//! role-specific entry points. The dispatcher alone decides which runs.

use sluice_core::{CommandLine, InputHeader, ProtocolResult, Record, Severity, StaticDeclaration};

/// Where a command's output goes during execution: complete records onto the
/// stream, diagnostics into the messages header (or the log once the header
/// has been flushed).
pub trait RecordSink {
    fn write_record(&mut self, record: Record) -> ProtocolResult<()>;
    fn message(&mut self, severity: Severity, text: &str);
}

/// Contract shared by every search command.
pub trait SearchCommand {
    /// The registered command name.
    fn name(&self) -> &str;

    /// The fixed protocol declaration reported during the probe stage.
    fn declaration(&self) -> StaticDeclaration {
        StaticDeclaration::standard()
    }

    /// Receive the parsed options and fields before any row is exchanged.
    /// Rejecting them here surfaces as a fatal message and a non-zero exit.
    fn configure(&mut self, _command_line: &CommandLine) -> ProtocolResult<()> {
        Ok(())
    }

    /// Receive the host's input header before the data region. Most commands
    /// ignore it; it carries host metadata such as the enclosing search.
    fn consume_input_header(&mut self, _header: &InputHeader) -> ProtocolResult<()> {
        Ok(())
    }
}

/// A command with the single plain behavior: records stream through it one
/// at a time, in order.
pub trait StreamingCommand: SearchCommand {
    fn stream(&mut self, record: Record, sink: &mut dyn RecordSink) -> ProtocolResult<()>;

    /// Called once after the last input record.
    fn finish(&mut self, _sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        Ok(())
    }
}

/// A reporting command: the map half runs near the data, the reduce half
/// aggregates the partial results into the final answer.
pub trait ReportingCommand: SearchCommand {
    /// The streaming preop. The default passes records through untouched.
    fn map(&mut self, record: Record, sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        sink.write_record(record)
    }

    /// Called once after the last mapped record, for commands whose map half
    /// emits partial aggregates rather than passing rows through.
    fn map_finish(&mut self, _sink: &mut dyn RecordSink) -> ProtocolResult<()> {
        Ok(())
    }

    /// Take one record into the aggregation state during the reduce pass.
    fn accumulate(&mut self, record: Record) -> ProtocolResult<()>;

    /// Emit the aggregated results after the last input record.
    fn reduce(&mut self, sink: &mut dyn RecordSink) -> ProtocolResult<()>;
}
