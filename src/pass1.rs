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

//! Pass one: a single forward walk over the decoded instruction stream
//! that discovers branch/call/data labels and, when requested, rewrites
//! LUI/ADDIU/ORI pairs into pseudo-instructions.

use crate::label::LabelTable;
use crate::model::{data_label, func_label, Dialect, ExtraAnnotation, InsnKind, InstructionRecord, LinkedPayload, Operand, Register};

/// How far back `link_with_lui` and the MTC1 float-literal search look for
/// a matching LUI before giving up. A tunable, not a magic number.
pub const MAX_LOOKBACK: usize = 128;

/// Run pass one over `instructions`, writing labels into `labels` and
/// per-instruction annotations into `extras`. `instructions` and `extras`
/// must be the same length; `instructions` is mutated in place to rewrite
/// LUI/ADDIU/ORI into `li` when `merge_pseudo` pairs them.
pub fn analyze(
    instructions: &mut [InstructionRecord],
    extras: &mut [ExtraAnnotation],
    labels: &mut LabelTable,
    dialect: Dialect,
    merge_pseudo: bool,
) {
    debug_assert_eq!(instructions.len(), extras.len());
    for i in 0..instructions.len() {
        label_control_transfer(i, &instructions[..], extras, labels, dialect);
        if merge_pseudo {
            pseudo_pair(i, instructions, extras, labels);
        }
    }
}

fn reg_operand(insn: &InstructionRecord, idx: usize) -> Option<Register> {
    match insn.operands.get(idx) {
        Some(Operand::Register(r)) => Some(*r),
        _ => None,
    }
}

fn imm_operand(insn: &InstructionRecord, idx: usize) -> Option<i64> {
    match insn.operands.get(idx) {
        Some(Operand::Immediate(i)) => Some(*i),
        _ => None,
    }
}

fn mem_operand(insn: &InstructionRecord, idx: usize) -> Option<(Register, i32)> {
    match insn.operands.get(idx) {
        Some(Operand::Memory { base, disp }) => Some((*base, *disp)),
        _ => None,
    }
}

/// Section 4.3(a): branch/jump target labeling, the `jr`/`jalr $ra`
/// function-boundary newline heuristic, and `jal`/`bal` call-target
/// labeling.
fn label_control_transfer(
    i: usize,
    instructions: &[InstructionRecord],
    extras: &mut [ExtraAnnotation],
    labels: &mut LabelTable,
    dialect: Dialect,
) {
    let insn = &instructions[i];
    if insn.is_jump_group() {
        if matches!(insn.kind, InsnKind::Jr | InsnKind::Jalr) && reg_operand(insn, 0) == Some(Register::Ra) {
            if i + 2 < instructions.len() {
                extras[i + 2].newline_before = true;
            }
            return;
        }
        for op in &insn.operands {
            if let Operand::Immediate(imm) = op {
                let target = *imm as u32;
                if labels.find(target).is_none() {
                    labels.add(dialect.local_label(target), target, false);
                }
            }
        }
    } else if matches!(insn.kind, InsnKind::Jal | InsnKind::Bal) {
        if let Some(target_imm) = imm_operand(insn, 0) {
            let target = target_imm as u32;
            if labels.find(target).is_none() {
                labels.add(func_label(target), target, true);
            }
        }
    }
}

/// Section 4.3(b): the three pseudo-instruction pairing rules.
fn pseudo_pair(i: usize, instructions: &mut [InstructionRecord], extras: &mut [ExtraAnnotation], labels: &mut LabelTable) {
    let kind = instructions[i].kind;
    match kind {
        InsnKind::Mtc1 => {
            if let Some(rt) = reg_operand(&instructions[i], 0) {
                pair_float_literal(i, rt, instructions, extras);
            }
        }
        k if k.is_memory_access() => {
            if let Some((base, disp)) = mem_operand(&instructions[i], 1) {
                if disp != 0 {
                    link_with_lui(i, base, disp, instructions, extras, labels);
                }
            }
        }
        InsnKind::Addiu | InsnKind::Ori => {
            let rd = reg_operand(&instructions[i], 0);
            let rs = reg_operand(&instructions[i], 1);
            let imm = imm_operand(&instructions[i], 2);
            if let (Some(rd), Some(rs), Some(imm)) = (rd, rs, imm) {
                if rs == Register::Zero {
                    instructions[i].kind = InsnKind::Li;
                    instructions[i].mnemonic = "li".to_string();
                    instructions[i].op_str = format!("${}, {}", rd.name(), imm);
                } else if rd == rs {
                    link_with_lui(i, rs, imm as i32, instructions, extras, labels);
                }
            }
        }
        _ => {}
    }
}

/// MTC1 ← LUI: reconstruct a single-precision float literal. Rewrites the
/// LUI in place into `li` on success.
fn pair_float_literal(i: usize, rt: Register, instructions: &mut [InstructionRecord], extras: &mut [ExtraAnnotation]) {
    let end_search = i.saturating_sub(MAX_LOOKBACK);
    let mut search = i;
    while search > end_search {
        search -= 1;
        let kind = instructions[search].kind;
        if kind == InsnKind::Lui {
            if reg_operand(&instructions[search], 0) == Some(rt) {
                if let Some(imm) = imm_operand(&instructions[search], 1) {
                    let bits = (imm as u32).wrapping_shl(16);
                    extras[search].linked_insn = Some(i);
                    extras[search].linked_payload = Some(LinkedPayload::FloatBits(bits));
                    instructions[search].kind = InsnKind::Li;
                    instructions[search].mnemonic = "li".to_string();
                }
                return;
            }
        } else if kind.is_mtc1_clobber() {
            if reg_operand(&instructions[search], 0) == Some(rt) {
                return;
            }
        } else if kind == InsnKind::Jr && reg_operand(&instructions[search], 0) == Some(Register::Ra) {
            return;
        }
    }
}

/// Section 4.3.1: the pairing core shared by the memory-op and
/// ADDIU/ORI-with-matching-source triggers.
fn link_with_lui(
    offset: usize,
    reg: Register,
    mem_imm: i32,
    instructions: &mut [InstructionRecord],
    extras: &mut [ExtraAnnotation],
    labels: &mut LabelTable,
) {
    // Zero offsets are never paired; they usually denote a struct base
    // rather than a standalone address.
    if mem_imm == 0 {
        return;
    }
    let mem_imm_bits = mem_imm as u32;
    let triggering_is_ori = instructions[offset].kind == InsnKind::Ori;
    let end_search = offset.saturating_sub(MAX_LOOKBACK);
    let mut search = offset;
    while search > end_search {
        search -= 1;
        let kind = instructions[search].kind;
        if kind == InsnKind::Lui {
            if reg_operand(&instructions[search], 0) == Some(reg) {
                if let Some(imm) = imm_operand(&instructions[search], 1) {
                    let addr = (imm as u32).wrapping_shl(16).wrapping_add(mem_imm_bits);
                    extras[search].linked_insn = Some(offset);
                    extras[search].linked_payload = Some(LinkedPayload::Address(addr));
                    extras[offset].linked_insn = Some(search);
                    extras[offset].linked_payload = Some(LinkedPayload::Address(addr));
                    if !triggering_is_ori && labels.find(addr).is_none() {
                        labels.add(data_label(addr), addr, true);
                    }
                }
                return;
            }
        } else if kind.is_lui_clobber() {
            // reg is a pointer, the offset is probably a struct member.
            if reg_operand(&instructions[search], 0) == Some(reg) {
                return;
            }
        } else if kind == InsnKind::Jr && reg_operand(&instructions[search], 0) == Some(Register::Ra) {
            // Don't cross a previous function return.
            return;
        }
    }
}
