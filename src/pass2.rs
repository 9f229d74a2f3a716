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

//! Pass two: walks the instruction stream a second time, interleaving
//! sorted labels and rewriting pseudo-instruction pairs into their final
//! dialect-specific text.

use crate::errors::DisasmError;
use crate::label::LabelTable;
use crate::model::{Dialect, ExtraAnnotation, InsnKind, InstructionRecord, LinkedPayload, Operand, Register};
use std::io::Write;

fn pad_mnemonic(mnemonic: &str) -> String {
    format!("{mnemonic:<5}")
}

fn reg_operand(insn: &InstructionRecord, idx: usize) -> Option<Register> {
    match insn.operands.get(idx) {
        Some(Operand::Register(r)) => Some(*r),
        _ => None,
    }
}

fn mem_operand(insn: &InstructionRecord, idx: usize) -> Option<(Register, i32)> {
    match insn.operands.get(idx) {
        Some(Operand::Memory { base, disp }) => Some((*base, *disp)),
        _ => None,
    }
}

fn find_label<'a>(labels: &'a LabelTable, target: u32, index: usize, vaddr: u32) -> Result<&'a str, DisasmError> {
    labels
        .find(target)
        .map(|idx| labels.get(idx).name.as_str())
        .ok_or_else(|| DisasmError::MissingLabel { index, vaddr, target })
}

fn format_jump_group(
    insn: &InstructionRecord,
    index: usize,
    vaddr: u32,
    labels: &LabelTable,
) -> Result<String, DisasmError> {
    let mut parts = Vec::with_capacity(insn.operands.len());
    for op in &insn.operands {
        let part = match op {
            Operand::Register(r) => format!("${}", r.name()),
            Operand::Immediate(imm) => find_label(labels, *imm as u32, index, vaddr)?.to_string(),
            Operand::Memory { base, disp } => format!("{disp}(${})", base.name()),
        };
        parts.push(part);
    }
    Ok(format!("{} {}", pad_mnemonic(&insn.mnemonic), parts.join(", ")))
}

fn format_call(insn: &InstructionRecord, index: usize, vaddr: u32, labels: &LabelTable) -> Result<String, DisasmError> {
    let target = match insn.operands.first() {
        Some(Operand::Immediate(imm)) => *imm as u32,
        _ => return Ok(format!("{} {}", pad_mnemonic(&insn.mnemonic), insn.op_str)),
    };
    let label = find_label(labels, target, index, vaddr)?;
    Ok(format!("{} {}", pad_mnemonic(&insn.mnemonic), label))
}

fn format_cop0(insn: &InstructionRecord, bytes: &[u8; 4]) -> String {
    let rd = (bytes[2] & 0xF8) >> 3;
    let reg0 = reg_operand(insn, 0).map(|r| r.name()).unwrap_or_default();
    format!("{} ${reg0}, ${rd}", pad_mnemonic(&insn.mnemonic))
}

fn format_float_literal(insn: &InstructionRecord, bits: u32, dialect: Dialect) -> String {
    let reg = reg_operand(insn, 0).map(|r| r.name()).unwrap_or_default();
    let imm16 = match insn.operands.get(1) {
        Some(Operand::Immediate(i)) => (*i as u32) & 0xFFFF,
        _ => 0,
    };
    let value = f32::from_bits(bits);
    match dialect {
        Dialect::Gas => format!("{} ${reg}, 0x{imm16:04X}0000 # {value:.6}", pad_mnemonic("li")),
        Dialect::Armips => format!("{} ${reg}, 0x{imm16:04X}0000 // {value:.6}", pad_mnemonic("li")),
    }
}

fn format_lui_linked(
    insn: &InstructionRecord,
    linked: &InstructionRecord,
    addr: u32,
    dialect: Dialect,
    labels: &LabelTable,
    index: usize,
    vaddr: u32,
) -> Result<String, DisasmError> {
    let reg = reg_operand(insn, 0).map(|r| r.name()).unwrap_or_default();
    let label = find_label(labels, addr, index, vaddr)?;
    Ok(match dialect {
        Dialect::Gas => format!("{} ${reg}, %hi({label})", pad_mnemonic("lui")),
        Dialect::Armips => match linked.kind {
            InsnKind::Addiu => format!("{} ${reg}, {label} // lui {}", pad_mnemonic("la.u"), insn.op_str),
            InsnKind::Ori => format!("{} ${reg}, 0x{addr:08X} // lui {}", pad_mnemonic("li.u"), insn.op_str),
            _ => format!("{} ${reg}, hi({label})", pad_mnemonic("lui")),
        },
    })
}

fn format_lo_linked(
    insn: &InstructionRecord,
    addr: u32,
    dialect: Dialect,
    labels: &LabelTable,
    index: usize,
    vaddr: u32,
) -> Result<String, DisasmError> {
    let label = find_label(labels, addr, index, vaddr)?;
    match insn.kind {
        InsnKind::Addiu | InsnKind::Ori => {
            let reg = reg_operand(insn, 0).map(|r| r.name()).unwrap_or_default();
            Ok(match (dialect, insn.kind) {
                (Dialect::Gas, _) => format!("{} ${reg}, %lo({label})", pad_mnemonic(&insn.mnemonic)),
                (Dialect::Armips, InsnKind::Addiu) => {
                    format!("{} ${reg}, {label} // {}", pad_mnemonic("la.l"), insn.op_str)
                }
                (Dialect::Armips, InsnKind::Ori) => {
                    format!("{} ${reg}, 0x{addr:08X} // {}", pad_mnemonic("li.l"), insn.op_str)
                }
                _ => unreachable!(),
            })
        }
        _ => {
            let dst = reg_operand(insn, 0).map(|r| r.name()).unwrap_or_default();
            let (base, _disp) = mem_operand(insn, 1).unwrap_or((Register::Zero, 0));
            let lo_prefix = match dialect {
                Dialect::Gas => "%",
                Dialect::Armips => "",
            };
            Ok(format!(
                "{} ${dst}, {lo_prefix}lo({label})(${})",
                pad_mnemonic(&insn.mnemonic),
                base.name()
            ))
        }
    }
}

/// Write the full dialect-specific text for `instructions` (with `extras`
/// and the sorted `labels` produced by pass one) to `out`. `labels` must
/// already be sorted; `base_vaddr` is the first instruction's address.
pub fn emit<W: Write>(
    out: &mut W,
    instructions: &[InstructionRecord],
    extras: &[ExtraAnnotation],
    labels: &LabelTable,
    base_vaddr: u32,
    dialect: Dialect,
) -> Result<(), DisasmError> {
    debug_assert_eq!(instructions.len(), extras.len());

    let all_labels: Vec<_> = labels.iter().collect();
    let mut label_idx = all_labels.partition_point(|l| l.vaddr < base_vaddr);

    let mut vaddr = base_vaddr;
    for (i, insn) in instructions.iter().enumerate() {
        if extras[i].newline_before {
            writeln!(out)?;
        }
        while label_idx < all_labels.len() && all_labels[label_idx].vaddr == vaddr {
            writeln!(out, "{}:", all_labels[label_idx].name)?;
            label_idx += 1;
        }

        let prefix = format!(
            "/* {vaddr:08X} {:02X}{:02X}{:02X}{:02X} */  ",
            insn.bytes[0], insn.bytes[1], insn.bytes[2], insn.bytes[3]
        );

        let body = if insn.is_jump_group() {
            format_jump_group(insn, i, vaddr, labels)?
        } else if matches!(insn.kind, InsnKind::Jal | InsnKind::Bal) {
            format_call(insn, i, vaddr, labels)?
        } else if matches!(insn.kind, InsnKind::Mtc0 | InsnKind::Mfc0) {
            format_cop0(insn, &insn.bytes)
        } else if let Some(linked_idx) = extras[i].linked_insn {
            match extras[i].linked_payload {
                Some(LinkedPayload::FloatBits(bits)) => format_float_literal(insn, bits, dialect),
                Some(LinkedPayload::Address(addr)) => {
                    if insn.kind == InsnKind::Lui {
                        format_lui_linked(insn, &instructions[linked_idx], addr, dialect, labels, i, vaddr)?
                    } else {
                        format_lo_linked(insn, addr, dialect, labels, i, vaddr)?
                    }
                }
                None => format!("{} {}", pad_mnemonic(&insn.mnemonic), insn.op_str),
            }
        } else {
            format!("{} {}", pad_mnemonic(&insn.mnemonic), insn.op_str)
        };

        writeln!(out, "{prefix}{body}")?;
        vaddr = vaddr.wrapping_add(4);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InsnGroup;
    use crate::pass1;
    use std::collections::HashSet;

    fn insn(kind: InsnKind, mnemonic: &str, op_str: &str, bytes: [u8; 4], operands: Vec<Operand>) -> InstructionRecord {
        InstructionRecord {
            kind,
            mnemonic: mnemonic.to_string(),
            op_str: op_str.to_string(),
            bytes,
            operands,
            groups: HashSet::new(),
        }
    }

    fn jump(kind: InsnKind, mnemonic: &str, op_str: &str, bytes: [u8; 4], operands: Vec<Operand>) -> InstructionRecord {
        let mut i = insn(kind, mnemonic, op_str, bytes, operands);
        i.groups.insert(InsnGroup::Jump);
        i
    }

    fn run(mut instructions: Vec<InstructionRecord>, dialect: Dialect) -> String {
        let mut extras = vec![ExtraAnnotation::default(); instructions.len()];
        let mut labels = LabelTable::new();
        pass1::analyze(&mut instructions, &mut extras, &mut labels, dialect, true);
        labels.sort();
        let mut out = Vec::new();
        emit(&mut out, &instructions, &extras, &labels, 0x8000_0000, dialect).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn single_nop() {
        let instructions = vec![insn(InsnKind::Other, "nop", "", [0, 0, 0, 0], vec![])];
        let text = run(instructions, Dialect::Gas);
        assert_eq!(text, "/* 80000000 00000000 */  nop   \n");
    }

    #[test]
    fn lui_addiu_pair() {
        let instructions = vec![
            insn(
                InsnKind::Lui,
                "lui",
                "$at, 0x8024",
                [0x3C, 0x01, 0x80, 0x24],
                vec![Operand::Register(Register::At), Operand::Immediate(0x8024)],
            ),
            insn(
                InsnKind::Addiu,
                "addiu",
                "$at, $at, 0x1000",
                [0x24, 0x21, 0x10, 0x00],
                vec![
                    Operand::Register(Register::At),
                    Operand::Register(Register::At),
                    Operand::Immediate(0x1000),
                ],
            ),
        ];
        let text = run(instructions, Dialect::Gas);
        assert_eq!(
            text,
            "/* 80000000 3C018024 */  lui   $at, %hi(D_80241000)\n\
             /* 80000004 24211000 */  addiu $at, %lo(D_80241000)\n"
        );
    }

    #[test]
    fn lui_lw_zero_offset_emits_literally() {
        let instructions = vec![
            insn(
                InsnKind::Lui,
                "lui",
                "$at, 0x8024",
                [0x3C, 0x01, 0x80, 0x24],
                vec![Operand::Register(Register::At), Operand::Immediate(0x8024)],
            ),
            insn(
                InsnKind::Lw,
                "lw",
                "$at, 0($at)",
                [0x8C, 0x21, 0x00, 0x00],
                vec![Operand::Register(Register::At), Operand::Memory { base: Register::At, disp: 0 }],
            ),
        ];
        let text = run(instructions, Dialect::Gas);
        assert_eq!(
            text,
            "/* 80000000 3C018024 */  lui   $at, 0x8024\n\
             /* 80000004 8C210000 */  lw    $at, 0($at)\n"
        );
    }

    #[test]
    fn mtc1_float_literal() {
        let instructions = vec![
            insn(
                InsnKind::Lui,
                "lui",
                "$at, 0x3F80",
                [0x3C, 0x01, 0x3F, 0x80],
                vec![Operand::Register(Register::At), Operand::Immediate(0x3F80)],
            ),
            insn(
                InsnKind::Mtc1,
                "mtc1",
                "$at, $f0",
                [0x44, 0x81, 0x00, 0x00],
                vec![Operand::Register(Register::At), Operand::Register(Register::F(0))],
            ),
        ];
        let text = run(instructions, Dialect::Gas);
        let first_line = text.lines().next().unwrap();
        assert_eq!(first_line, "/* 80000000 3C013F80 */  li    $at, 0x3F800000 # 1.000000");
    }

    #[test]
    fn branch_to_self_gets_label_before_instruction() {
        let instructions = vec![jump(
            InsnKind::Other,
            "beq",
            "$zero, $zero, -4",
            [0x10, 0x00, 0xFF, 0xFF],
            vec![
                Operand::Register(Register::Zero),
                Operand::Register(Register::Zero),
                Operand::Immediate(0x8000_0000),
            ],
        )];
        let text = run(instructions, Dialect::Gas);
        assert_eq!(text, ".L80000000:\n/* 80000000 1000FFFF */  beq   $zero, $zero, .L80000000\n");
    }

    #[test]
    fn function_boundary_inserts_blank_line() {
        let instructions = vec![
            jump(InsnKind::Jr, "jr", "$ra", [0x03, 0xE0, 0x00, 0x08], vec![Operand::Register(Register::Ra)]),
            insn(InsnKind::Other, "nop", "", [0, 0, 0, 0], vec![]),
            insn(InsnKind::Other, "nop", "", [0, 0, 0, 0], vec![]),
        ];
        let text = run(instructions, Dialect::Gas);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "");
    }

    #[test]
    fn armips_dialect_uses_la_u_la_l_for_addiu_pairing() {
        let instructions = vec![
            insn(
                InsnKind::Lui,
                "lui",
                "$at, 0x8024",
                [0x3C, 0x01, 0x80, 0x24],
                vec![Operand::Register(Register::At), Operand::Immediate(0x8024)],
            ),
            insn(
                InsnKind::Addiu,
                "addiu",
                "$at, $at, 0x1000",
                [0x24, 0x21, 0x10, 0x00],
                vec![
                    Operand::Register(Register::At),
                    Operand::Register(Register::At),
                    Operand::Immediate(0x1000),
                ],
            ),
        ];
        let text = run(instructions, Dialect::Armips);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("la.u  $at, D_80241000 // lui $at, 0x8024"));
        assert!(lines[1].contains("la.l  $at, D_80241000 // $at, $at, 0x1000"));
    }

    #[test]
    fn armips_dialect_uses_li_u_li_l_for_ori_pairing() {
        let instructions = vec![
            insn(
                InsnKind::Lui,
                "lui",
                "$at, 0x1234",
                [0x3C, 0x01, 0x12, 0x34],
                vec![Operand::Register(Register::At), Operand::Immediate(0x1234)],
            ),
            insn(
                InsnKind::Ori,
                "ori",
                "$at, $at, 0x5678",
                [0x34, 0x21, 0x56, 0x78],
                vec![
                    Operand::Register(Register::At),
                    Operand::Register(Register::At),
                    Operand::Immediate(0x5678),
                ],
            ),
        ];
        let text = run(instructions, Dialect::Armips);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("li.u  $at, 0x12345678"));
        assert!(lines[1].contains("li.l  $at, 0x12345678"));
    }
}
