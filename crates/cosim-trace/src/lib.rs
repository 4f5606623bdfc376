//! Trace entry normalization and comparison for RTL/ISS co-simulation.
//!
//! Both simulators of the core print one text block per cycle. This crate turns
//! each block into a canonical [`TraceEntry`] (a header plus a sorted,
//! duplicate-free set of write lines) so that entries from the two sides can be
//! compared regardless of the order in which writes were emitted.
//!
//! # Example
//!
//! ```
//! use cosim_trace::{IssTraceEntry, TraceEntry};
//!
//! let rtl = TraceEntry::from_rtl_trace("E PC: 0x00000010, insn: 0x00107db8\n>x2=2\n>x1=1");
//! let iss = IssTraceEntry::from_iss_trace(&[
//!     "E PC: 0x00000010, insn: 0x00107db8",
//!     "# @0x00000010: addi",
//!     ">x1=1",
//!     "!ext_reg=3",
//!     ">x2=2",
//! ])?;
//!
//! assert_eq!(iss, rtl);
//! # Ok::<(), cosim_trace::IssParseError>(())
//! ```

mod entry;
mod error;
mod iss;
mod rtl;

pub use entry::*;
pub use error::*;
pub use iss::*;
