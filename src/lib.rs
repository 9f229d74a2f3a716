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

pub mod cli;
pub mod decoder;
pub mod errors;
pub mod label;
pub mod model;
pub mod pass1;
pub mod pass2;
pub mod range;
pub mod state;

use decoder::CapstoneDecoder;
use errors::DisasmError;
use model::Dialect;
use range::Range;
use state::DisassemblyState;

/// Disassemble every range in `ranges` against `rom`, writing the full
/// assembler text (preamble, per-range `.headersize`/`.definelabel`
/// boilerplate, instruction text, postamble) into a single `String`.
///
/// Labels accumulate in one shared `DisassemblyState` across all ranges,
/// so a range later in the list can reference a label a prior range
/// defined; see `DisassemblyState::pass_two`'s doc comment for the
/// accumulate-then-emit discipline this function follows.
pub fn disassemble(rom: &[u8], ranges: &[Range], dialect: Dialect, merge_pseudo: bool, output_stem: &str) -> Result<String, DisasmError> {
    let decoder = CapstoneDecoder::new()?;
    let mut state = DisassemblyState::new(decoder, dialect);
    let mut text = cli::preamble(dialect, output_stem);

    for range in ranges {
        log::debug!(
            "disassembling range 0x{:X}-0x{:X} at 0x{:08X}",
            range.start,
            range.start + range.length,
            range.vaddr
        );
        text.push_str(&cli::headersize_line(range.vaddr));

        let start = range.start as usize;
        let end = start + range.length as usize;
        state.pass_one(&rom[start..end], range.vaddr, merge_pseudo)?;
        state.sort_labels();

        text.push_str(&cli::definelabel_lines(dialect, state.labels(), range));
        text.push('\n');

        let mut buf = Vec::new();
        state.pass_two(&mut buf)?;
        text.push_str(&String::from_utf8_lossy(&buf));
    }

    text.push_str(&cli::postamble(dialect));
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_a_single_nop_range_in_gas_syntax() {
        let rom = [0u8; 4];
        let ranges = vec![Range { vaddr: 0x8000_0000, start: 0, length: 4 }];
        let text = disassemble(&rom, &ranges, Dialect::Gas, true, "test").unwrap();
        assert!(text.contains(".set noat"));
        assert!(text.contains(".headersize 0x80000000"));
        assert!(text.contains("/* 80000000 00000000 */  nop   "));
    }

    #[test]
    fn multiple_ranges_accumulate_labels_on_one_state() {
        // Two single-nop ranges; nothing fancy here beyond proving the
        // second range's headersize/text follows the first's in one
        // document.
        let rom = [0u8; 8];
        let ranges = vec![
            Range { vaddr: 0x8000_0000, start: 0, length: 4 },
            Range { vaddr: 0x8000_1000, start: 4, length: 4 },
        ];
        let text = disassemble(&rom, &ranges, Dialect::Gas, true, "test").unwrap();
        assert!(text.contains("0x80000000"));
        assert!(text.contains("0x80001000"));
    }
}
