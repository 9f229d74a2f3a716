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

//! The decoded-instruction data model shared by the label table, pass one,
//! and pass two. Everything here is produced (or mutated in place) by the
//! decoder adapter and pass-one analyzer; nothing in this module talks to
//! the underlying decoder library directly.

use std::collections::HashSet;

/// Output assembler dialect. Controls local-label naming and most of pass
/// two's formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gas,
    Armips,
}

impl Dialect {
    pub fn local_label(&self, vaddr: u32) -> String {
        match self {
            Dialect::Gas => format!(".L{vaddr:08X}"),
            Dialect::Armips => format!("@L{vaddr:08X}"),
        }
    }
}

/// A global call target, e.g. the destination of a `jal`/`bal`.
pub fn func_label(vaddr: u32) -> String {
    format!("func_{vaddr:08X}")
}

/// A synthesized data label for a reconstructed LUI/low-half address.
pub fn data_label(vaddr: u32) -> String {
    format!("D_{vaddr:08X}")
}

/// Canonical MIPS ABI register names, resolved once by the decoder adapter
/// so the analyzer and emitter never see a decoder-specific register id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Zero,
    At,
    V0,
    V1,
    A0,
    A1,
    A2,
    A3,
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    T8,
    T9,
    K0,
    K1,
    Gp,
    Sp,
    Fp,
    Ra,
    F(u8),
    /// Anything the decoder reports that doesn't map onto the table above
    /// (e.g. COP0/COP2 control registers). Kept verbatim so formatting
    /// never silently drops a register name.
    Other(String),
}

impl Register {
    /// Resolve a register name as reported by the decoder's own
    /// register-name lookup (e.g. capstone's `reg_name`) into the
    /// canonical form pass one and pass two match against.
    pub fn from_decoder_name(name: &str) -> Register {
        match name {
            "zero" => Register::Zero,
            "at" => Register::At,
            "v0" => Register::V0,
            "v1" => Register::V1,
            "a0" => Register::A0,
            "a1" => Register::A1,
            "a2" => Register::A2,
            "a3" => Register::A3,
            "t0" => Register::T0,
            "t1" => Register::T1,
            "t2" => Register::T2,
            "t3" => Register::T3,
            "t4" => Register::T4,
            "t5" => Register::T5,
            "t6" => Register::T6,
            "t7" => Register::T7,
            "s0" => Register::S0,
            "s1" => Register::S1,
            "s2" => Register::S2,
            "s3" => Register::S3,
            "s4" => Register::S4,
            "s5" => Register::S5,
            "s6" => Register::S6,
            "s7" => Register::S7,
            "t8" => Register::T8,
            "t9" => Register::T9,
            "k0" => Register::K0,
            "k1" => Register::K1,
            "gp" => Register::Gp,
            "sp" => Register::Sp,
            // capstone reports the frame pointer as "fp" or the raw "s8"
            // alias depending on context; normalize both.
            "fp" | "s8" => Register::Fp,
            "ra" => Register::Ra,
            other if other.starts_with('f') && other[1..].parse::<u8>().is_ok() => {
                Register::F(other[1..].parse().unwrap())
            }
            other => Register::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Register::Zero => "zero".to_string(),
            Register::At => "at".to_string(),
            Register::V0 => "v0".to_string(),
            Register::V1 => "v1".to_string(),
            Register::A0 => "a0".to_string(),
            Register::A1 => "a1".to_string(),
            Register::A2 => "a2".to_string(),
            Register::A3 => "a3".to_string(),
            Register::T0 => "t0".to_string(),
            Register::T1 => "t1".to_string(),
            Register::T2 => "t2".to_string(),
            Register::T3 => "t3".to_string(),
            Register::T4 => "t4".to_string(),
            Register::T5 => "t5".to_string(),
            Register::T6 => "t6".to_string(),
            Register::T7 => "t7".to_string(),
            Register::S0 => "s0".to_string(),
            Register::S1 => "s1".to_string(),
            Register::S2 => "s2".to_string(),
            Register::S3 => "s3".to_string(),
            Register::S4 => "s4".to_string(),
            Register::S5 => "s5".to_string(),
            Register::S6 => "s6".to_string(),
            Register::S7 => "s7".to_string(),
            Register::T8 => "t8".to_string(),
            Register::T9 => "t9".to_string(),
            Register::K0 => "k0".to_string(),
            Register::K1 => "k1".to_string(),
            Register::Gp => "gp".to_string(),
            Register::Sp => "sp".to_string(),
            Register::Fp => "fp".to_string(),
            Register::Ra => "ra".to_string(),
            Register::F(n) => format!("f{n}"),
            Register::Other(s) => s.clone(),
        }
    }
}

/// Closed set of mnemonics the analyzer/emitter need to branch on. Every
/// other mnemonic decodes to `Other`, carrying its text through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsnKind {
    Lui,
    Li,
    Mtc1,
    Mtc0,
    Mfc0,
    Jr,
    Jalr,
    Jal,
    Bal,
    Addiu,
    Ori,
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Lwu,
    Ld,
    Ldl,
    Ldr,
    Sb,
    Sh,
    Sw,
    Sd,
    Add,
    Sub,
    Subu,
    Other,
}

impl InsnKind {
    pub fn from_mnemonic(mnemonic: &str) -> InsnKind {
        match mnemonic {
            "lui" => InsnKind::Lui,
            "li" => InsnKind::Li,
            "mtc1" => InsnKind::Mtc1,
            "mtc0" => InsnKind::Mtc0,
            "mfc0" => InsnKind::Mfc0,
            "jr" => InsnKind::Jr,
            "jalr" => InsnKind::Jalr,
            "jal" => InsnKind::Jal,
            "bal" => InsnKind::Bal,
            "addiu" => InsnKind::Addiu,
            "ori" => InsnKind::Ori,
            "lb" => InsnKind::Lb,
            "lbu" => InsnKind::Lbu,
            "lh" => InsnKind::Lh,
            "lhu" => InsnKind::Lhu,
            "lw" => InsnKind::Lw,
            "lwu" => InsnKind::Lwu,
            "ld" => InsnKind::Ld,
            "ldl" => InsnKind::Ldl,
            "ldr" => InsnKind::Ldr,
            "sb" => InsnKind::Sb,
            "sh" => InsnKind::Sh,
            "sw" => InsnKind::Sw,
            "sd" => InsnKind::Sd,
            "add" => InsnKind::Add,
            "sub" => InsnKind::Sub,
            "subu" => InsnKind::Subu,
            _ => InsnKind::Other,
        }
    }

    /// The memory-op/load-store mnemonics the ADDIU/ORI-clobber and
    /// `link_with_lui` liveness checks scan for.
    pub fn is_lui_clobber(&self) -> bool {
        matches!(
            self,
            InsnKind::Lw | InsnKind::Ld | InsnKind::Addiu | InsnKind::Add | InsnKind::Sub | InsnKind::Subu
        )
    }

    /// The wider clobber set the MTC1 float-literal search uses (adds the
    /// narrower load widths, since a half/byte load also redefines the
    /// register before it could plausibly hold a LUI'd float bit pattern).
    pub fn is_mtc1_clobber(&self) -> bool {
        matches!(
            self,
            InsnKind::Lw
                | InsnKind::Ld
                | InsnKind::Lh
                | InsnKind::Lhu
                | InsnKind::Lb
                | InsnKind::Lbu
                | InsnKind::Addiu
                | InsnKind::Add
                | InsnKind::Sub
                | InsnKind::Subu
        )
    }

    /// The memory-access mnemonics pass one pairs with a preceding LUI via
    /// `link_with_lui` when their displacement is non-zero.
    pub fn is_memory_access(&self) -> bool {
        matches!(
            self,
            InsnKind::Lb
                | InsnKind::Lbu
                | InsnKind::Lh
                | InsnKind::Lhu
                | InsnKind::Lw
                | InsnKind::Lwu
                | InsnKind::Ld
                | InsnKind::Ldl
                | InsnKind::Ldr
                | InsnKind::Sb
                | InsnKind::Sh
                | InsnKind::Sw
                | InsnKind::Sd
        )
    }
}

/// Instruction groups the decoder tags an instruction with. Only `Jump`
/// matters to this crate today; kept as a set so a decoder adapter can
/// report others without the model needing to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsnGroup {
    Jump,
}

/// One decoded instruction. `kind`, `mnemonic`, and `op_str` are mutated in
/// place by pass one when a LUI or zero-source ADDIU/ORI is rewritten into
/// a pseudo `li`.
#[derive(Debug, Clone)]
pub struct InstructionRecord {
    pub kind: InsnKind,
    pub mnemonic: String,
    pub op_str: String,
    pub bytes: [u8; 4],
    pub operands: Vec<Operand>,
    pub groups: HashSet<InsnGroup>,
}

impl InstructionRecord {
    pub fn is_jump_group(&self) -> bool {
        self.groups.contains(&InsnGroup::Jump)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Register(Register),
    Immediate(i64),
    Memory { base: Register, disp: i32 },
}

/// What a linked LUI/low-half pair resolved to, carried on both sides of
/// the link so pass two can format either instruction without re-deriving
/// the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkedPayload {
    Address(u32),
    FloatBits(u32),
}

/// Per-instruction annotations produced by pass one, read by pass two.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraAnnotation {
    pub linked_insn: Option<usize>,
    pub linked_payload: Option<LinkedPayload>,
    pub newline_before: bool,
}
