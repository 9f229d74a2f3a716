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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisasmError {
    #[error("failed to disassemble {byte_len} byte(s) of code at 0x{vaddr:08X}: decoder produced no instructions")]
    DecodeFailure { vaddr: u32, byte_len: usize },

    #[error("failed to initialize instruction decoder: {reason}")]
    DecoderInit { reason: String },

    #[error(
        "missing label at instruction {index} (vaddr 0x{vaddr:08X}) expecting target 0x{target:08X}; this is a pass-one bug"
    )]
    MissingLabel { index: usize, vaddr: u32, target: u32 },

    #[error("label table capacity exhausted")]
    CapacityExhausted,

    #[error("I/O error while emitting disassembly")]
    Io(#[from] std::io::Error),
}
