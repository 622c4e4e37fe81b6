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

//! ALU expansion rules
//!
//! Bitty ALU operations are two-address (`rx ← rx op ry`), so an RV32EM
//! three-address operation needs a case analysis over `(rd == rs1,
//! rd == rs2)`:
//! - `rd == rs1`: the operation is emitted directly.
//! - all distinct: `sub rd,rd; add rd,rs1; op rd,rs2`.
//! - `rd == rs2` only: r0 is the scratch destination and a three-
//!   instruction epilogue moves the result into rd and re-clears r0.
//!
//! Set-less-than expands to a compare followed by the branch-and-set
//! idiom that writes 1 on the "less" outcome and 0 otherwise.

use crate::core::bitty::{AluOp, Cond};
use crate::core::error::{Result, SimError};
use crate::core::riscv::decode;

use super::asm::{Asm, SCRATCH};

/// Emit `rd ← rs1 op rs2` with the two-address case analysis
fn emit_three_address(asm: &mut Asm, op: AluOp, rd: u8, rs1: u8, rs2: u8) {
    if rd == rs1 {
        asm.alu(op, rd, rs2);
    } else if rd != rs2 {
        asm.clear(rd);
        asm.alu(AluOp::Add, rd, rs1);
        asm.alu(op, rd, rs2);
    } else {
        // rd aliases rs2: compute in r0, then move into rd
        asm.alu(AluOp::Add, SCRATCH, rs1);
        asm.alu(op, SCRATCH, rs2);
        asm.clear(rs2);
        asm.alu(AluOp::Add, rs2, SCRATCH);
        asm.clear(SCRATCH);
    }
}

/// Emit the branch-and-set idiom: after a compare has latched `d_out`,
/// write 1 into rd when the outcome was "less", 0 otherwise
///
/// Resolves to the fixed shape `bie +12; big +10; sub; addi 1; cmpi 1;
/// bie +4; sub`.
fn emit_set_if_less(asm: &mut Asm, rd: u8) {
    let zero = asm.label();
    let done = asm.label();
    asm.branch(Cond::Equal, zero);
    asm.branch(Cond::Greater, zero);
    asm.clear(rd);
    asm.alui(AluOp::Add, rd, 1);
    asm.alui(AluOp::Cmp, rd, 1);
    asm.branch(Cond::Equal, done);
    asm.bind(zero);
    asm.clear(rd);
    asm.bind(done);
}

/// Expand an R-type base operation (opcode 0110011, funct7 ≠ 0000001)
pub(super) fn expand_op(asm: &mut Asm, word: u32) -> Result<()> {
    let rd = decode::rd(word);
    let rs1 = decode::rs1(word);
    let rs2 = decode::rs2(word);

    // Writes to x0 are discarded; nothing to emit
    if rd == 0 {
        return Ok(());
    }

    let op = match (decode::funct7(word), decode::funct3(word)) {
        (0x00, 0x0) => AluOp::Add,
        (0x20, 0x0) => AluOp::Sub,
        (0x00, 0x1) => AluOp::Shl,
        (0x00, 0x4) => AluOp::Xor,
        (0x00, 0x5) => AluOp::Shr,
        (0x20, 0x5) => AluOp::Shrs,
        (0x00, 0x6) => AluOp::Or,
        (0x00, 0x7) => AluOp::And,
        (0x00, 0x2) | (0x00, 0x3) => {
            // SLT / SLTU: compares do not write rx, so no operand staging
            // is needed before the idiom overwrites rd
            let cmp = if decode::funct3(word) == 0x2 {
                AluOp::Cmps
            } else {
                AluOp::Cmp
            };
            asm.alu(cmp, rs1, rs2);
            emit_set_if_less(asm, rd);
            return Ok(());
        }
        _ => return Err(SimError::UnsupportedTranslation { word }),
    };

    emit_three_address(asm, op, rd, rs1, rs2);
    Ok(())
}

/// Expand an I-type immediate operation (opcode 0010011)
pub(super) fn expand_op_imm(asm: &mut Asm, word: u32) -> Result<()> {
    let rd = decode::rd(word);
    let rs1 = decode::rs1(word);
    let imm = decode::imm_i(word);

    if rd == 0 {
        return Ok(());
    }

    match decode::funct3(word) {
        // Shift immediates use the 5-bit shamt directly
        0x1 | 0x5 => {
            let op = match (decode::funct7(word), decode::funct3(word)) {
                (0x00, 0x1) => AluOp::Shl,
                (0x00, 0x5) => AluOp::Shr,
                (0x20, 0x5) => AluOp::Shrs,
                _ => return Err(SimError::UnsupportedTranslation { word }),
            };
            let shamt = decode::shamt(word) as i32;
            if rd != rs1 {
                asm.clear(rd);
                asm.alu(AluOp::Add, rd, rs1);
            }
            asm.alui(op, rd, shamt);
        }

        // SLTI / SLTIU: build the immediate, compare, branch-and-set
        0x2 | 0x3 => {
            let cmp = if decode::funct3(word) == 0x2 {
                AluOp::Cmps
            } else {
                AluOp::Cmp
            };
            if rd != rs1 {
                asm.clear(rd);
                asm.load_const12(rd, imm);
                asm.alu(cmp, rs1, rd);
                emit_set_if_less(asm, rd);
            } else {
                // rd aliases rs1: stage the immediate in r0 so the
                // compare still sees the original rs1
                asm.load_const12(SCRATCH, imm);
                asm.alu(cmp, rs1, SCRATCH);
                emit_set_if_less(asm, rd);
                asm.clear(SCRATCH);
            }
        }

        // ADDI / XORI / ORI / ANDI accumulate the immediate and apply the
        // register form (all four commute)
        f3 @ (0x0 | 0x4 | 0x6 | 0x7) => {
            let op = match f3 {
                0x0 => AluOp::Add,
                0x4 => AluOp::Xor,
                0x6 => AluOp::Or,
                _ => AluOp::And,
            };
            if rd != rs1 {
                asm.clear(rd);
                asm.load_const12(rd, imm);
                asm.alu(op, rd, rs1);
            } else {
                asm.load_const12(SCRATCH, imm);
                asm.alu(op, SCRATCH, rs1);
                asm.clear(rs1);
                asm.alu(AluOp::Add, rs1, SCRATCH);
                asm.clear(SCRATCH);
            }
        }

        _ => return Err(SimError::UnsupportedTranslation { word }),
    }

    Ok(())
}
