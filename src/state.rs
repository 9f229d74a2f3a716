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

//! Ties the decoder adapter, pass one, and pass two together around a
//! single owned label table that can accumulate across multiple ranges.

use crate::decoder::InstructionDecoder;
use crate::errors::DisasmError;
use crate::label::LabelTable;
use crate::model::{Dialect, ExtraAnnotation, InstructionRecord};
use crate::{pass1, pass2};
use std::io::Write;

/// Owns the label table, the most recently decoded instruction stream, its
/// parallel extras vector, and the decoder used to produce it.
///
/// A single state is meant to be reused across multiple `pass_one` calls so
/// that labels accumulate in one table across ranges (see spec §5). Only
/// the stream from the *latest* `pass_one` call is valid input to
/// `pass_two`: call `pass_two` immediately after the `pass_one` call for
/// the same range, before running `pass_one` again for the next one. The
/// CLI driver (`cli.rs`) follows exactly this discipline.
pub struct DisassemblyState<D: InstructionDecoder> {
    decoder: D,
    dialect: Dialect,
    labels: LabelTable,
    instructions: Vec<InstructionRecord>,
    extras: Vec<ExtraAnnotation>,
    base_vaddr: u32,
}

impl<D: InstructionDecoder> DisassemblyState<D> {
    pub fn new(decoder: D, dialect: Dialect) -> Self {
        Self {
            decoder,
            dialect,
            labels: LabelTable::new(),
            instructions: Vec::new(),
            extras: Vec::new(),
            base_vaddr: 0,
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Decode `bytes` at `base_vaddr` and run the label-discovery /
    /// pseudo-pairing analysis over it, accumulating new labels into this
    /// state's shared table. Replaces the previously decoded stream.
    pub fn pass_one(&mut self, bytes: &[u8], base_vaddr: u32, merge_pseudo: bool) -> Result<(), DisasmError> {
        log::debug!("pass_one: decoding {} byte(s) at 0x{base_vaddr:08X}", bytes.len());
        let mut instructions = self.decoder.decode(bytes, base_vaddr)?;
        log::debug!("pass_one: decoded {} instruction(s)", instructions.len());
        let mut extras = vec![ExtraAnnotation::default(); instructions.len()];

        pass1::analyze(&mut instructions, &mut extras, &mut self.labels, self.dialect, merge_pseudo);

        self.instructions = instructions;
        self.extras = extras;
        self.base_vaddr = base_vaddr;
        Ok(())
    }

    /// Sort the label table if labels were added since the last sort.
    /// `pass_two` calls this automatically; exposed for callers that want
    /// to inspect the sorted table (e.g. to emit cross-range
    /// `.definelabel` boilerplate) before writing instruction text.
    pub fn sort_labels(&mut self) {
        if !self.labels.is_sorted() {
            self.labels.sort();
        }
    }

    /// Write the text for the stream produced by the most recent
    /// `pass_one` call. Must be called before another `pass_one` call
    /// replaces that stream.
    pub fn pass_two<W: Write>(&mut self, out: &mut W) -> Result<(), DisasmError> {
        self.sort_labels();
        pass2::emit(out, &self.instructions, &self.extras, &self.labels, self.base_vaddr, self.dialect)
    }
}
