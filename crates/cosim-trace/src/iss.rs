//! Parser for the ISS (reference simulator) trace blocks.
//!
//! The ISS prints the same header and write lines as the RTL simulator, plus
//! one extra "special" line after each executed step's header:
//!
//! ```text
//! E PC: 0x00000010, insn: 0x00107db8
//! # @0x00000010: addi
//! >x1=1
//! ```
//!
//! The special line carries the instruction address and mnemonic for
//! functional coverage. It has no RTL counterpart, so it is kept out of the
//! canonical [`TraceEntry`].

use std::ops::Deref;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{error, trace};

use crate::entry::{INJECTION_PREFIX, StepKind, TraceEntry};
use crate::error::{IssParseError, Result};

/// Coverage data from the ISS special line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssData {
    /// Address of the executed instruction.
    pub insn_addr: u32,
    /// Decoded mnemonic.
    pub mnemonic: String,
}

/// Trace entry parsed from the ISS, with its coverage data.
///
/// Derefs to the canonical [`TraceEntry`]; comparisons against RTL entries
/// only look at that part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IssTraceEntry {
    entry: TraceEntry,
    data: Option<IssData>,
}

/// Read state while walking the lines of one ISS block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Header,
    Special,
    Writes,
}

impl IssTraceEntry {
    /// Parse one ISS step from its lines.
    ///
    /// The first line is the header. If it is an exec header, the next line
    /// must be the special line `# @0x<8 hex digits>: <mnemonic>`. All further
    /// lines are writes, except `!` lines, which report external register
    /// changes the RTL doesn't trace and are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`IssParseError::BadSpecialLine`] if the line after an exec
    /// header isn't a special line and [`IssParseError::NoSpecialLine`] if the
    /// block ends before it. The error is also logged.
    pub fn from_iss_trace<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut state = ReadState::Header;

        for line in lines {
            state = parsed.step(state, line.as_ref())?;
        }

        // Still waiting for the special line: an E line with no follow-up.
        if state == ReadState::Special {
            let err = IssParseError::NoSpecialLine {
                header: parsed.entry.header,
            };
            error!(header = %err.header(), "{err}");
            return Err(err);
        }

        parsed.entry.normalize();
        trace!(
            header = %parsed.entry.header,
            writes = parsed.entry.writes.len(),
            "parsed ISS trace entry"
        );
        Ok(parsed)
    }

    /// Split `block` on newlines and parse it with [`Self::from_iss_trace`].
    ///
    /// Lines are split on `\n` only, the same way as
    /// [`TraceEntry::from_rtl_trace`], so a `\r` stays part of its line on
    /// both sides. A single trailing newline doesn't produce an extra line.
    ///
    /// # Errors
    ///
    /// See [`Self::from_iss_trace`].
    pub fn from_iss_block(block: &str) -> Result<Self> {
        let lines: Vec<&str> = block.strip_suffix('\n').unwrap_or(block).split('\n').collect();
        Self::from_iss_trace(&lines)
    }

    fn step(&mut self, state: ReadState, line: &str) -> Result<ReadState> {
        match state {
            ReadState::Header => Ok(self.read_header(line)),
            ReadState::Special => self.read_special(line),
            ReadState::Writes => {
                self.read_write(line);
                Ok(ReadState::Writes)
            }
        }
    }

    fn read_header(&mut self, line: &str) -> ReadState {
        self.entry.header = line.to_string();
        if self.entry.kind() == Some(StepKind::Exec) {
            ReadState::Special
        } else {
            ReadState::Writes
        }
    }

    fn read_special(&mut self, line: &str) -> Result<ReadState> {
        let Some(data) = parse_special(line) else {
            let err = IssParseError::BadSpecialLine {
                header: self.entry.header.clone(),
                line: line.to_string(),
            };
            error!(header = %self.entry.header, line, "{err}");
            return Err(err);
        };
        self.data = Some(data);
        Ok(ReadState::Writes)
    }

    fn read_write(&mut self, line: &str) {
        if !line.starts_with(INJECTION_PREFIX) {
            self.entry.writes.push(line.to_string());
        }
    }

    /// The canonical part of the entry.
    #[must_use]
    pub const fn entry(&self) -> &TraceEntry {
        &self.entry
    }

    /// Coverage data; present for exec steps only.
    #[must_use]
    pub const fn data(&self) -> Option<&IssData> {
        self.data.as_ref()
    }

    /// Drop the coverage data, keeping the canonical entry.
    #[must_use]
    pub fn into_entry(self) -> TraceEntry {
        self.entry
    }
}

fn parse_special(line: &str) -> Option<IssData> {
    let pattern = SPECIAL_PATTERN
        .get_or_init(|| Regex::new(r"^# @0x([0-9a-f]{8}): (.*)$").unwrap());
    let caps = pattern.captures(line)?;

    let insn_addr = u32::from_str_radix(caps.get(1)?.as_str(), 16).ok()?;
    let mnemonic = caps.get(2)?.as_str().to_string();
    Some(IssData {
        insn_addr,
        mnemonic,
    })
}

static SPECIAL_PATTERN: OnceLock<Regex> = OnceLock::new();

impl Deref for IssTraceEntry {
    type Target = TraceEntry;

    fn deref(&self) -> &TraceEntry {
        &self.entry
    }
}

impl From<IssTraceEntry> for TraceEntry {
    fn from(iss: IssTraceEntry) -> Self {
        iss.entry
    }
}

impl PartialEq<TraceEntry> for IssTraceEntry {
    fn eq(&self, other: &TraceEntry) -> bool {
        self.entry == *other
    }
}

impl PartialEq<IssTraceEntry> for TraceEntry {
    fn eq(&self, other: &IssTraceEntry) -> bool {
        *self == other.entry
    }
}
