//! Diagnostics sink
//!
//! Where capture artifacts end up. The recorder only asks a sink for a
//! writable location; it never decides the layout itself.
//!
//! Components:
//! - `sink`: the `DiagnosticsSink` trait.
//! - `file_diagnostics`: one directory per unit of work under a base path.

pub mod file_diagnostics;
pub mod sink;

pub use file_diagnostics::FileDiagnostics;
pub use sink::DiagnosticsSink;
