// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Branch, jump and upper-immediate expansion rules
//!
//! The two program counters advance at different rates, so every
//! PC-relative value the guest observes is synthesized from a `gtpc`
//! capture plus a statically known delta. Branch targets go through the
//! pending-branch table: the emitted immediates initially carry the RV32EM
//! byte offset and the fixup pass rewrites them once the target's Bitty
//! index is known.
//!
//! JAL also jumps through the fixup machinery (a `cmp r0,r0; bie` pair is
//! an unconditional branch that leaves no register dirty). JALR's target
//! is dynamic: the RV32EM index it computes is translated to a Bitty
//! entry point by loading through the PC map the translator publishes in
//! data memory, and the `stpc` transfers control to that entry's landing
//! thunk, which re-clears the scratch register before guest code resumes.

use crate::core::bitty::{AluOp, Cond};
use crate::core::error::{Result, SimError};
use crate::core::riscv::decode;

use super::asm::{Asm, SCRATCH, STACK};

/// Capture the Bitty PC into rd and correct it to the RV32EM link value
/// `pc_r + 1`
///
/// `gtpc` latches its own index plus one; the remaining distance to the
/// RV32EM return address is a translation-time constant accumulated
/// through r0.
fn emit_link(asm: &mut Asm, rd: u8, pc_r: usize, pc_b: usize) {
    let gtpc_index = pc_b + asm.len();
    asm.emit(crate::core::bitty::BittyInstr::GetPc { rx: rd });
    let delta = pc_r as i64 - gtpc_index as i64;
    if delta != 0 {
        asm.load_const(SCRATCH, delta);
        asm.alu(AluOp::Add, rd, SCRATCH);
        asm.clear(SCRATCH);
    }
}

/// Expand a B-type branch (opcode 1100011): compare first, then one or
/// two pending branches covering the taken conditions
pub(super) fn expand_branch(asm: &mut Asm, word: u32, pc_r: usize) -> Result<()> {
    let rs1 = decode::rs1(word);
    let rs2 = decode::rs2(word);
    let imm = decode::imm_b(word);
    let target = pc_r as i64 + (imm / 4) as i64;

    let funct3 = decode::funct3(word);
    let cmp = match funct3 {
        0x0 | 0x1 | 0x4 | 0x5 => AluOp::Cmps,
        0x6 | 0x7 => AluOp::Cmp,
        _ => return Err(SimError::UnsupportedTranslation { word }),
    };
    asm.alu(cmp, rs1, rs2);

    match funct3 {
        // BEQ
        0x0 => asm.branch_rv(Cond::Equal, target, imm),
        // BNE: either inequality direction takes the branch
        0x1 => {
            asm.branch_rv(Cond::Less, target, imm);
            asm.branch_rv(Cond::Greater, target, imm);
        }
        // BLT / BLTU
        0x4 | 0x6 => asm.branch_rv(Cond::Less, target, imm),
        // BGE / BGEU
        0x5 | 0x7 => {
            asm.branch_rv(Cond::Greater, target, imm);
            asm.branch_rv(Cond::Equal, target, imm);
        }
        _ => unreachable!(),
    }
    Ok(())
}

/// Expand LUI or AUIPC (opcodes 0110111 / 0010111)
///
/// LUI builds the 20-bit immediate by additive accumulation and a final
/// `shl 12`. AUIPC additionally captures the Bitty PC and corrects it to
/// the RV32EM index with a static delta.
pub(super) fn expand_upper(asm: &mut Asm, word: u32, pc_r: usize, pc_b: usize) -> Result<()> {
    let rd = decode::rd(word);
    if rd == 0 {
        return Ok(());
    }

    let imm20 = decode::imm_u(word) >> 12;
    asm.clear(rd);
    asm.load_upper20(rd, imm20);
    asm.alui(AluOp::Shl, rd, 12);

    if decode::opcode(word) == decode::OPCODE_AUIPC {
        let gtpc_index = pc_b + asm.len();
        asm.emit(crate::core::bitty::BittyInstr::GetPc { rx: SCRATCH });
        asm.alu(AluOp::Add, rd, SCRATCH);
        asm.clear(SCRATCH);
        // rd now holds imm + gtpc_index + 1; close the gap to pc_r
        let delta = pc_r as i64 - (gtpc_index as i64 + 1);
        if delta != 0 {
            asm.load_const(SCRATCH, delta);
            asm.alu(AluOp::Add, rd, SCRATCH);
            asm.clear(SCRATCH);
        }
    }
    Ok(())
}

/// Expand JAL (opcode 1101111)
///
/// The link value is synthesized with `gtpc` plus its static delta; the
/// jump itself is an always-taken branch resolved by the fixup pass, so
/// no register carries the target across the transfer.
pub(super) fn expand_jal(asm: &mut Asm, word: u32, pc_r: usize, pc_b: usize) -> Result<()> {
    let rd = decode::rd(word);
    let imm = decode::imm_j(word);
    let target = pc_r as i64 + (imm / 4) as i64;

    if rd != 0 {
        emit_link(asm, rd, pc_r, pc_b);
    }
    asm.alu(AluOp::Cmp, SCRATCH, SCRATCH);
    asm.branch_rv(Cond::Equal, target, imm);
    Ok(())
}

/// Expand JALR (opcode 1100111, funct3 0)
///
/// The dynamic target `(rs1 + imm) & ~1` is an RV32EM index; the
/// expansion adds the table base into the same accumulation (the base is
/// even, so it commutes with the low-bit mask), loads the published Bitty
/// entry point through data memory, parks it on the stack while the link
/// value is synthesized, and transfers control with `stpc`.
pub(super) fn expand_jalr(
    asm: &mut Asm,
    word: u32,
    pc_r: usize,
    pc_b: usize,
    map_base: u32,
) -> Result<()> {
    if decode::funct3(word) != 0 {
        return Err(SimError::UnsupportedTranslation { word });
    }
    let rd = decode::rd(word);
    let rs1 = decode::rs1(word);
    let imm = decode::imm_i(word);

    // A link into x2 would corrupt the stack pointer between the park
    // and the reload
    if rd == STACK {
        return Err(SimError::UnsupportedTranslation { word });
    }

    // Target first: rs1 may alias rd. r0 accumulates
    // base + rs1 + imm, masks the low bit, then becomes the mapped
    // Bitty index by loading the table cell it points at.
    asm.load_const(SCRATCH, map_base as i64 + imm as i64);
    if rs1 != 0 {
        asm.alu(AluOp::Add, SCRATCH, rs1);
    }
    asm.alui(AluOp::And, SCRATCH, -2);
    asm.emit(crate::core::bitty::BittyInstr::Load { rx: SCRATCH, ry: SCRATCH });

    if rd != 0 {
        asm.push(SCRATCH);
        asm.clear(SCRATCH);
        emit_link(asm, rd, pc_r, pc_b);
        asm.pop(SCRATCH);
    }

    asm.emit(crate::core::bitty::BittyInstr::SetPc { rx: SCRATCH });
    // Not reached; the landing thunk clears r0 on the far side
    asm.clear(SCRATCH);
    Ok(())
}
