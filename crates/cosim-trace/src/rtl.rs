//! Parser for the RTL simulator's trace blocks.

use tracing::trace;

use crate::entry::{TraceEntry, WRITE_PREFIX};

impl TraceEntry {
    /// Parse one RTL trace block.
    ///
    /// The first line is the header and is taken verbatim. Each following line
    /// that starts with `>` is a write. Anything else (blank separators and the
    /// like) is dropped, so this never fails: a malformed block just gives an
    /// odd-looking entry.
    ///
    /// Lines are split on `\n` only; a `\r` before it stays in the line.
    #[must_use]
    pub fn from_rtl_trace(trace: &str) -> Self {
        let mut lines = trace.split('\n');
        let header = lines.next().unwrap_or_default();

        let mut entry = Self {
            header: header.to_string(),
            writes: lines
                .filter(|line| line.starts_with(WRITE_PREFIX))
                .map(str::to_string)
                .collect(),
        };
        entry.normalize();

        trace!(header = %entry.header, writes = entry.writes.len(), "parsed RTL trace entry");
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rtl_dedups_and_sorts() {
        let block = "E PC: 0x00000010, insn: 0x00107db8\n>x1=1\n>x1=1\n>x2=2";
        let entry = TraceEntry::from_rtl_trace(block);

        assert_eq!(entry.header(), "E PC: 0x00000010, insn: 0x00107db8");
        assert_eq!(entry.writes(), [">x1=1", ">x2=2"]);
        assert!(entry.is_exec());
    }

    #[test]
    fn test_parse_rtl_order_independent() {
        let a = TraceEntry::from_rtl_trace("E PC: 0x00000014, insn: 0x0\n>w3=0\n>x1=1\n>dmem[4]=7");
        let b = TraceEntry::from_rtl_trace("E PC: 0x00000014, insn: 0x0\n>dmem[4]=7\n>w3=0\n>x1=1");
        assert_eq!(a, b);
        assert_eq!(a.writes(), [">dmem[4]=7", ">w3=0", ">x1=1"]);
    }

    #[test]
    fn test_parse_rtl_ignores_other_lines() {
        let block = "S PC: 0x00000010, insn: 0x00107db8\n\n# comment\n x1=1\n>x3=3\n";
        let entry = TraceEntry::from_rtl_trace(block);

        assert!(entry.is_stall());
        assert_eq!(entry.writes(), [">x3=3"]);
    }

    #[test]
    fn test_parse_rtl_header_only() {
        let entry = TraceEntry::from_rtl_trace("S PC: 0x00000000, insn: 0x00000000");
        assert!(entry.is_stall());
        assert!(entry.writes().is_empty());
    }

    #[test]
    fn test_parse_rtl_empty_block() {
        let entry = TraceEntry::from_rtl_trace("");
        assert!(entry.is_empty());
        assert!(entry.writes().is_empty());
    }

    #[test]
    fn test_parse_rtl_degenerate_header() {
        // No header validation: a write line in first position becomes the header.
        let entry = TraceEntry::from_rtl_trace(">x1=1\n>x2=2");
        assert_eq!(entry.header(), ">x1=1");
        assert_eq!(entry.writes(), [">x2=2"]);
        assert_eq!(entry.kind(), Some(crate::StepKind::Other));
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let entry = TraceEntry::from_rtl_trace("E PC: 0x8, insn: 0x1\n>b=2\n>a=1\n>b=2");
        let reparsed = TraceEntry::from_rtl_trace(&entry.to_string());
        assert_eq!(entry, reparsed);
    }
}
