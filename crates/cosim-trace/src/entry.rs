//! Canonical trace entry shared by the RTL and ISS parsers.

use std::fmt;
use std::io::{self, Write};

use tracing::trace;

/// Header tag of a step that stalled.
pub const STALL_TAG: char = 'S';
/// Header tag of a step that executed an instruction.
pub const EXEC_TAG: char = 'E';
/// Prefix of a write line in an RTL block.
pub const WRITE_PREFIX: char = '>';
/// Prefix of an external register injection in an ISS block.
pub const INJECTION_PREFIX: char = '!';
/// Character used in place of instruction bits after an IMEM fetch error.
pub const FETCH_ERROR_MARKER: char = '?';

/// Kind of step, taken from the first character of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Instruction stalled for this cycle.
    Stall,
    /// Instruction executed.
    Exec,
    /// Header with an unrecognised tag.
    Other,
}

impl StepKind {
    /// Classify a header tag.
    #[must_use]
    pub const fn from_tag(tag: char) -> Self {
        match tag {
            STALL_TAG => Self::Stall,
            EXEC_TAG => Self::Exec,
            _ => Self::Other,
        }
    }
}

/// One simulator step: a header line plus the writes it caused.
///
/// Writes are always kept sorted and free of duplicates, so two entries that
/// saw the same effects in a different order compare equal. An entry with an
/// empty header is the "empty" entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TraceEntry {
    pub(crate) header: String,
    pub(crate) writes: Vec<String>,
}

impl TraceEntry {
    /// Create an entry from a header and writes in any order.
    pub fn new<I, S>(header: impl Into<String>, writes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entry = Self {
            header: header.into(),
            writes: writes.into_iter().map(Into::into).collect(),
        };
        entry.normalize();
        entry
    }

    /// The header line.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The writes, sorted and deduplicated.
    #[must_use]
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// True for the empty (header-less) entry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Step kind, or `None` for the empty entry.
    #[must_use]
    pub fn kind(&self) -> Option<StepKind> {
        self.header.chars().next().map(StepKind::from_tag)
    }

    /// True if the header carries the stall tag.
    #[must_use]
    pub fn is_stall(&self) -> bool {
        self.kind() == Some(StepKind::Stall)
    }

    /// True if the header carries the exec tag.
    #[must_use]
    pub fn is_exec(&self) -> bool {
        self.kind() == Some(StepKind::Exec)
    }

    /// Check whether `self` might be a later cycle of the same instruction as
    /// `prev`.
    ///
    /// A stalled instruction shows up as
    ///
    /// ```text
    /// S PC: 0x00000010, insn: 0x00107db8
    /// E PC: 0x00000010, insn: 0x00107db8
    /// ```
    ///
    /// so the tag is skipped and the rest of the headers must match. After an
    /// IMEM fetch error the later header reads `insn: ??`, in which case only
    /// the text before the first `?` has to match.
    ///
    /// This wrongly accepts some malformed pairs. It is only a quick check that
    /// the merging logic isn't dropping entries; the final verdict comes from
    /// `==` after merging.
    #[must_use]
    pub fn is_compatible(&self, prev: &Self) -> bool {
        let first_qm = self
            .header
            .char_indices()
            .skip(1)
            .find_map(|(idx, c)| (c == FETCH_ERROR_MARKER).then_some(idx));

        let this = self.header.as_bytes();
        let prev = prev.header.as_bytes();

        if after_tag(this, this.len()) == after_tag(prev, prev.len()) {
            return true;
        }

        let Some(first_qm) = first_qm else {
            return false;
        };

        after_tag(this, first_qm) == after_tag(prev, first_qm)
    }

    /// Fold the writes of `other` into this entry, keeping the header.
    ///
    /// Used to merge a stall step into the exec step that completes the same
    /// instruction.
    pub fn take_writes(&mut self, other: &Self) {
        if other.writes.is_empty() {
            return;
        }
        self.writes.extend(other.writes.iter().cloned());
        self.normalize();
        trace!(
            header = %self.header,
            taken = other.writes.len(),
            writes = self.writes.len(),
            "merged trace writes"
        );
    }

    /// Print the header and each write on its own line, prefixed by `indent`.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn print<W: Write>(&self, indent: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "{indent}{}", self.header)?;
        for write in &self.writes {
            writeln!(out, "{indent}{write}")?;
        }
        Ok(())
    }

    pub(crate) fn normalize(&mut self) {
        self.writes.sort_unstable();
        self.writes.dedup();
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for write in &self.writes {
            writeln!(f, "{write}")?;
        }
        Ok(())
    }
}

/// Header bytes in `[1, end)`, clamped to the header length.
fn after_tag(header: &[u8], end: usize) -> &[u8] {
    header.get(1..end.min(header.len())).unwrap_or_default()
}
