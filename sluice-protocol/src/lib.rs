//! Sluice Protocol - Engine for Out-of-Process Search Commands
//!
//! The host launches a command process once per pipeline stage, hands it a
//! raw command line, probes it for configuration, and streams tabular
//! records through it. This crate is the protocol engine for that exchange:
//!
//! ```text
//! raw argv
//!     |
//! sluice-grammar (command line)
//!     |
//! dispatch (stage x role, reserved tokens stripped)
//!     |
//! header (input header in, messages header out)
//!     |
//! adapter (wire rows <-> records, codec for multi-value fields)
//!     |
//! command traits (the concrete command's logic)
//! ```
//!
//! The runner ties the pieces into the single synchronous pass one process
//! invocation performs.

pub mod adapter;
pub mod codec;
pub mod command;
pub mod dispatch;
pub mod header;
pub mod logging;
pub mod runner;

pub use adapter::{EncodedColumn, RecordReader, RecordWriter, MV_PREFIX};
pub use command::{RecordSink, ReportingCommand, SearchCommand, StreamingCommand};
pub use logging::init_logging;
pub use runner::{
    run_reporting, run_reporting_stdio, run_streaming, run_streaming_stdio, EXIT_FAILURE,
    EXIT_SUCCESS,
};
