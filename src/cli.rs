/*
Copyright 2026 The mipsdisasm Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Command-line surface: argument parsing and the pure string-building
//! helpers for the assembler preamble/postamble boilerplate that
//! `original_source/mipsdisasm.c`'s `MIPSDISASM_STANDALONE` section writes
//! around the core's output. None of this talks to the decoder directly.

use crate::label::LabelTable;
use crate::model::Dialect;
use crate::range::Range;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SyntaxArg {
    Gas,
    Armips,
}

impl From<SyntaxArg> for Dialect {
    fn from(value: SyntaxArg) -> Self {
        match value {
            SyntaxArg::Gas => Dialect::Gas,
            SyntaxArg::Armips => Dialect::Armips,
        }
    }
}

/// MIPS III disassembler: turns a raw ROM image into GAS or ARMIPS
/// assembler text.
#[derive(Parser, Debug)]
#[clap(version, author)]
pub struct Opts {
    /// Input ROM file.
    pub input: PathBuf,

    /// Optional ranges to disassemble, format `<VAddr>:[<Start>-<End>]` or
    /// `<VAddr>:[<Start>+<Length>]`. Defaults to the whole file at vaddr 0.
    pub ranges: Vec<String>,

    /// Output file; defaults to stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Merge LUI/ADDIU/ORI/MTC1 pairs into pseudo-instructions.
    #[clap(short = 'p', long = "merge-pseudo")]
    pub merge_pseudo: bool,

    /// Output assembler dialect.
    #[clap(short, long, value_enum, default_value_t = SyntaxArg::Gas)]
    pub syntax: SyntaxArg,

    /// Verbose logging.
    #[clap(short, long)]
    pub verbose: bool,
}

/// The basename used for ARMIPS's `.create "<name>.bin", 0x0` line: the
/// output file's stem, or `"test"` when writing to stdout.
pub fn output_stem(output: Option<&Path>) -> String {
    output
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "test".to_string())
}

pub fn preamble(dialect: Dialect, stem: &str) -> String {
    match dialect {
        Dialect::Gas => {
            "\
.set noat      # allow manual use of $at
.set noreorder # don't insert nops after branches

"
            .to_string()
        }
        Dialect::Armips => format!(".n64\n.create \"{stem}.bin\", 0x0\n\n"),
    }
}

pub fn postamble(dialect: Dialect) -> String {
    match dialect {
        Dialect::Armips => "\n.close\n".to_string(),
        Dialect::Gas => String::new(),
    }
}

pub fn headersize_line(vaddr: u32) -> String {
    format!(".headersize 0x{vaddr:08X}\n\n")
}

/// Lines defining, for ARMIPS only, every label accumulated so far that
/// falls outside `range`'s `[vaddr, vaddr + length)` window. Must be
/// called after the range's own `pass_one` (so its own labels are
/// excluded) and before its `pass_two`.
pub fn definelabel_lines(dialect: Dialect, labels: &LabelTable, range: &Range) -> String {
    if dialect != Dialect::Armips {
        return String::new();
    }
    let range_end = range.vaddr as u64 + range.length;
    let mut out = String::new();
    for label in labels.iter() {
        let vaddr = label.vaddr as u64;
        if vaddr < range.vaddr as u64 || vaddr > range_end {
            out.push_str(&format!(".definelabel {}, 0x{:08X}\n", label.name, label.vaddr));
        }
    }
    out
}

/// Resolve the CLI's range list against the input file length, matching
/// the original's "no ranges, or a single bare vaddr, means the whole
/// file" fallback.
pub fn resolve_ranges(mut ranges: Vec<Range>, file_len: u64) -> Vec<Range> {
    if ranges.is_empty() {
        ranges.push(Range { vaddr: 0, start: 0, length: file_len });
    } else if ranges.len() == 1 && ranges[0].length == 0 {
        ranges[0].start = 0;
        ranges[0].length = file_len;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelTable;

    #[test]
    fn output_stem_defaults_to_test_for_stdout() {
        assert_eq!(output_stem(None), "test");
    }

    #[test]
    fn output_stem_uses_file_stem() {
        assert_eq!(output_stem(Some(Path::new("/tmp/out.s"))), "out");
    }

    #[test]
    fn gas_preamble_contains_set_directives() {
        let text = preamble(Dialect::Gas, "test");
        assert!(text.contains(".set noat"));
        assert!(text.contains(".set noreorder"));
    }

    #[test]
    fn armips_preamble_contains_create_directive() {
        let text = preamble(Dialect::Armips, "rom");
        assert!(text.contains(".n64"));
        assert!(text.contains(".create \"rom.bin\", 0x0"));
    }

    #[test]
    fn gas_has_no_postamble() {
        assert_eq!(postamble(Dialect::Gas), "");
    }

    #[test]
    fn armips_postamble_closes() {
        assert_eq!(postamble(Dialect::Armips), "\n.close\n");
    }

    #[test]
    fn resolve_ranges_defaults_to_whole_file() {
        let resolved = resolve_ranges(vec![], 0x1000);
        assert_eq!(resolved, vec![Range { vaddr: 0, start: 0, length: 0x1000 }]);
    }

    #[test]
    fn resolve_ranges_expands_a_bare_vaddr() {
        let resolved = resolve_ranges(vec![Range { vaddr: 0x8000_0000, start: 0, length: 0 }], 0x2000);
        assert_eq!(resolved, vec![Range { vaddr: 0x8000_0000, start: 0, length: 0x2000 }]);
    }

    #[test]
    fn definelabel_skips_labels_inside_the_range() {
        let mut labels = LabelTable::new();
        labels.add("func_80001000", 0x8000_1000, true);
        labels.add("D_80FF0000", 0x80FF_0000, true);
        let range = Range { vaddr: 0x8000_0000, start: 0, length: 0x10000 };
        let text = definelabel_lines(Dialect::Armips, &labels, &range);
        assert!(!text.contains("func_80001000"));
        assert!(text.contains(".definelabel D_80FF0000, 0x80FF0000"));
    }

    #[test]
    fn definelabel_is_empty_for_gas() {
        let mut labels = LabelTable::new();
        labels.add("D_80FF0000", 0x80FF_0000, true);
        let range = Range { vaddr: 0x8000_0000, start: 0, length: 0x10000 };
        assert_eq!(definelabel_lines(Dialect::Gas, &labels, &range), "");
    }
}
