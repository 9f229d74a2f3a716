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

//! The decoder adapter: the only part of this crate that talks to the
//! actual byte-decoding collaborator. Everything above `InstructionDecoder`
//! works against [`InstructionRecord`](crate::model::InstructionRecord)s
//! and never touches a decoder library directly.

use crate::errors::DisasmError;
use crate::model::{InsnGroup, InsnKind, InstructionRecord, Operand, Register};
use std::collections::HashSet;

/// Produces a stream of decoded instructions from a byte slice and a base
/// virtual address. Implementations must place instruction `i` at
/// `base_vaddr + 4*i`, matching bytes `[4*i, 4*i + 4)`.
pub trait InstructionDecoder {
    fn decode(&self, bytes: &[u8], base_vaddr: u32) -> Result<Vec<InstructionRecord>, DisasmError>;
}

/// Production decoder: wraps `capstone` configured for MIPS III, 64-bit
/// mode, big-endian, with full operand detail and skip-data so unknown
/// bytes surface as opaque records instead of aborting the stream.
pub struct CapstoneDecoder {
    cs: capstone::Capstone,
}

impl CapstoneDecoder {
    pub fn new() -> Result<Self, DisasmError> {
        use capstone::prelude::*;

        let mut cs = Capstone::new()
            .mips()
            .mode(capstone::arch::mips::ArchMode::Mips64)
            .endian(capstone::Endian::Big)
            .detail(true)
            .build()
            .map_err(|e| DisasmError::DecoderInit { reason: e.to_string() })?;

        // Unknown bytes become opaque records instead of aborting the stream.
        cs.set_skipdata(true).map_err(|e| DisasmError::DecoderInit { reason: e.to_string() })?;

        Ok(Self { cs })
    }
}

impl InstructionDecoder for CapstoneDecoder {
    fn decode(&self, bytes: &[u8], base_vaddr: u32) -> Result<Vec<InstructionRecord>, DisasmError> {
        use capstone::arch::mips::MipsOperand;
        use capstone::arch::ArchOperand;

        let insns = self
            .cs
            .disasm_all(bytes, base_vaddr as u64)
            .map_err(|_| DisasmError::DecodeFailure { vaddr: base_vaddr, byte_len: bytes.len() })?;

        if insns.is_empty() && !bytes.is_empty() {
            return Err(DisasmError::DecodeFailure { vaddr: base_vaddr, byte_len: bytes.len() });
        }

        let mut out = Vec::with_capacity(insns.len());
        for insn in insns.iter() {
            let detail = self
                .cs
                .insn_detail(insn)
                .map_err(|e| DisasmError::DecoderInit { reason: e.to_string() })?;

            let mut groups = HashSet::new();
            for group in self.cs.insn_group_ids(insn).into_iter().flatten() {
                if self.cs.group_name(group).as_deref() == Some("jump") {
                    groups.insert(InsnGroup::Jump);
                }
            }

            let mut operands = Vec::new();
            for arch_op in detail.arch_detail().operands() {
                let ArchOperand::MipsOperand(op) = arch_op else { continue };
                let operand = match op {
                    MipsOperand::Reg(reg_id) => {
                        let name = self.cs.reg_name(reg_id).unwrap_or_default();
                        Operand::Register(Register::from_decoder_name(&name))
                    }
                    MipsOperand::Imm(imm) => Operand::Immediate(imm),
                    MipsOperand::Mem(mem) => {
                        let base_name = self.cs.reg_name(mem.base()).unwrap_or_default();
                        Operand::Memory {
                            base: Register::from_decoder_name(&base_name),
                            disp: mem.disp() as i32,
                        }
                    }
                    _ => continue,
                };
                operands.push(operand);
            }

            let mnemonic = insn.mnemonic().unwrap_or("").to_string();
            let mut bytes4 = [0u8; 4];
            let raw = insn.bytes();
            bytes4[..raw.len().min(4)].copy_from_slice(&raw[..raw.len().min(4)]);

            out.push(InstructionRecord {
                kind: InsnKind::from_mnemonic(&mnemonic),
                op_str: insn.op_str().unwrap_or("").to_string(),
                mnemonic,
                bytes: bytes4,
                operands,
                groups,
            });
        }

        Ok(out)
    }
}

pub mod testing {
    //! A hand-built decoder used by pass-one/pass-two unit tests and the
    //! crate's integration tests, in place of a real `capstone` handle —
    //! the same collaborator-substitution the library uses a trait for in
    //! the first place.
    use super::*;

    #[derive(Default)]
    pub struct FixedDecoder {
        pub records: Vec<InstructionRecord>,
    }

    impl InstructionDecoder for FixedDecoder {
        fn decode(&self, bytes: &[u8], _base_vaddr: u32) -> Result<Vec<InstructionRecord>, DisasmError> {
            if self.records.is_empty() && !bytes.is_empty() {
                return Err(DisasmError::DecodeFailure { vaddr: 0, byte_len: bytes.len() });
            }
            Ok(self.records.clone())
        }
    }
}
