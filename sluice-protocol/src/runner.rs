//! Per-invocation protocol runner
//!
//! One process invocation is one pass through this module: parse the raw
//! command line, dispatch on the reserved tokens, then either answer the
//! probe or stream rows through the command's role entry point. Every
//! protocol-level fault is translated into the messages header; the host is
//! never handed an unstructured crash.

use crate::adapter::{RecordReader, RecordWriter};
use crate::command::{ReportingCommand, StreamingCommand};
use crate::dispatch;
use crate::header;
use sluice_core::{
    CommandKind, CommandLine, InputHeader, MultiValue, ProtocolConfig, ProtocolError,
    ProtocolResult, Record, Role, Severity, Stage, StaticDeclaration,
};
use std::io::{BufReader, Read, Write};
use tracing::{debug, error, warn};

/// Exit status for a clean completion, warnings included.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status when a fatal message was emitted or parse/dispatch failed.
pub const EXIT_FAILURE: i32 = 2;

/// Run a streaming command for one process invocation.
///
/// # Arguments
/// * `command` - The command implementation to drive
/// * `args` - The raw argument vector starting at the command name, with the
///   reserved stage/role tokens following it, exactly as the host spawned
///   the process
/// * `input` - The host-provided input stream
/// * `output` - The host-provided output stream
/// * `config` - Engine knobs such as the malformed-row tolerance
///
/// # Returns
/// The process exit status: [`EXIT_SUCCESS`] on clean completion, warnings
/// included; [`EXIT_FAILURE`] when a fatal message was emitted or
/// parse/dispatch failed.
pub fn run_streaming<C, R, W>(
    command: &mut C,
    args: &[String],
    input: R,
    output: W,
    config: &ProtocolConfig,
) -> i32
where
    C: StreamingCommand,
    R: Read,
    W: Write,
{
    run(Behavior::Streaming(command), args, input, output, config)
}

/// Run a reporting command for one process invocation. Arguments and exit
/// status as [`run_streaming`].
pub fn run_reporting<C, R, W>(
    command: &mut C,
    args: &[String],
    input: R,
    output: W,
    config: &ProtocolConfig,
) -> i32
where
    C: ReportingCommand,
    R: Read,
    W: Write,
{
    run(Behavior::Reporting(command), args, input, output, config)
}

/// [`run_streaming`] over stdin/stdout with the default configuration. The
/// host passes the command line starting at `argv[1]`.
pub fn run_streaming_stdio<C: StreamingCommand>(command: &mut C) -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_streaming(
        command,
        &args,
        stdin.lock(),
        stdout.lock(),
        &ProtocolConfig::new(),
    )
}

/// [`run_reporting`] over stdin/stdout with the default configuration.
pub fn run_reporting_stdio<C: ReportingCommand>(command: &mut C) -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_reporting(
        command,
        &args,
        stdin.lock(),
        stdout.lock(),
        &ProtocolConfig::new(),
    )
}

// ============================================================================
// RUNNER INTERNALS
// ============================================================================

enum Behavior<'a> {
    Streaming(&'a mut dyn StreamingCommand),
    Reporting(&'a mut dyn ReportingCommand),
}

impl Behavior<'_> {
    fn kind(&self) -> CommandKind {
        match self {
            Self::Streaming(_) => CommandKind::Streaming,
            Self::Reporting(_) => CommandKind::Reporting,
        }
    }

    fn declaration(&self) -> StaticDeclaration {
        match self {
            Self::Streaming(command) => command.declaration(),
            Self::Reporting(command) => command.declaration(),
        }
    }

    fn configure(&mut self, command_line: &CommandLine) -> ProtocolResult<()> {
        match self {
            Self::Streaming(command) => command.configure(command_line),
            Self::Reporting(command) => command.configure(command_line),
        }
    }

    fn consume_input_header(&mut self, input_header: &InputHeader) -> ProtocolResult<()> {
        match self {
            Self::Streaming(command) => command.consume_input_header(input_header),
            Self::Reporting(command) => command.consume_input_header(input_header),
        }
    }
}

fn run<R: Read, W: Write>(
    behavior: Behavior<'_>,
    args: &[String],
    input: R,
    output: W,
    config: &ProtocolConfig,
) -> i32 {
    let mut writer = RecordWriter::new(output);

    match run_invocation(behavior, args, input, &mut writer, config) {
        Ok(()) => {
            if let Err(err) = writer.finish() {
                error!(error = %err, "failed to close output stream");
                return EXIT_FAILURE;
            }
            if writer.fatal_seen() {
                EXIT_FAILURE
            } else {
                EXIT_SUCCESS
            }
        }
        Err(err) => {
            error!(error = %err, "invocation failed");
            writer.message(Severity::Fatal, &err.to_string());
            if let Err(flush_err) = writer.finish() {
                error!(error = %flush_err, "failed to close output stream after fault");
            }
            EXIT_FAILURE
        }
    }
}

fn run_invocation<R: Read, W: Write>(
    mut behavior: Behavior<'_>,
    args: &[String],
    input: R,
    writer: &mut RecordWriter<W>,
    config: &ProtocolConfig,
) -> ProtocolResult<()> {
    let raw = args.join(" ");
    let parsed = sluice_grammar::parse(&raw)?;
    let (context, command_line) = dispatch::resolve(&parsed, behavior.kind())?;
    debug!(command = command_line.name(), context = %context, "dispatched invocation");

    if context.stage == Stage::Probe {
        return answer_probe(&behavior, writer);
    }

    behavior.configure(&command_line)?;

    let mut input = BufReader::new(input);
    let input_header = header::read_input_header(&mut input)?;
    debug!(entries = input_header.len(), "input header consumed");
    behavior.consume_input_header(&input_header)?;

    let mut reader = RecordReader::new(input)?;
    let mut row_errors = 0usize;

    while let Some(next) = reader.next_record() {
        match next {
            Ok(record) => feed(&mut behavior, context.role, record, writer)?,
            Err(err @ (ProtocolError::Framing(_) | ProtocolError::Codec(_))) => {
                row_errors += 1;
                warn!(error = %err, row_errors, "dropped malformed row");
                if row_errors > config.row_error_tolerance {
                    error!(row_errors, "malformed-row tolerance exhausted, closing stream early");
                    writer.message(
                        Severity::Fatal,
                        &format!(
                            "Dropped {} malformed rows, closing stream early: {}",
                            row_errors, err
                        ),
                    );
                    return Ok(());
                }
                writer.message(Severity::Error, &format!("Dropped malformed row: {}", err));
            }
            Err(err) => return Err(err),
        }
    }

    match &mut behavior {
        Behavior::Streaming(command) => command.finish(writer)?,
        Behavior::Reporting(command) => match context.role {
            Role::Map => command.map_finish(writer)?,
            _ => command.reduce(writer)?,
        },
    }

    Ok(())
}

/// The probe reply: the messages header, then the declaration as one row.
fn answer_probe<W: Write>(
    behavior: &Behavior<'_>,
    writer: &mut RecordWriter<W>,
) -> ProtocolResult<()> {
    let declaration = behavior.declaration();
    let mut record = Record::new();
    for (flag, value) in declaration.to_fields() {
        record.set(flag, MultiValue::single(value));
    }
    writer.write(&record)
}

fn feed<W: Write>(
    behavior: &mut Behavior<'_>,
    role: Role,
    record: Record,
    writer: &mut RecordWriter<W>,
) -> ProtocolResult<()> {
    match behavior {
        Behavior::Streaming(command) => command.stream(record, writer),
        Behavior::Reporting(command) => match role {
            Role::Map => command.map(record, writer),
            _ => command.accumulate(record),
        },
    }
}
