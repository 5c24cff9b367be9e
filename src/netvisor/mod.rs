//! The Netvisor cli collaborator boundary.
//!
//! Everything the modules know about a switch comes from invoking the
//! `/usr/bin/cli` binary and decoding its plain-text output. This module
//! keeps that boundary in three layers: [`session`] builds and runs
//! commands, [`show`] decodes tabular show output into values, and
//! [`topology`] walks the fabric state the show commands expose.

pub mod session;
pub mod show;
pub mod topology;

pub use session::{CliReply, CliSession, CliTransport, RawOutput, Subprocess};
pub use show::ShowOutput;
pub use topology::Topology;
