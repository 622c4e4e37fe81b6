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

//! Multiply/divide expansion rules
//!
//! Bitty has no multiply or divide, so these expand into in-line loops:
//! a shift-add loop for MUL and a repeated-subtraction loop for the
//! divide family, with the RV32EM divisor-zero and signed-overflow
//! special cases handled up front and signed operands normalized to
//! magnitudes around the unsigned core.
//!
//! Operands are saved on and restored from the r2-addressed software
//! stack, so on completion rd holds the result and rs1/rs2 are intact.
//! x2 itself cannot participate in these expansions; MULH/MULHSU/MULHU
//! have no loop rendition and yield the unsupported sentinel.
//!
//! The subtraction loop runs once per quotient unit, so a huge dividend
//! against a small divisor is bounded only by the driver's step cap.

use crate::core::bitty::{AluOp, BittyInstr, Cond};
use crate::core::error::{Result, SimError};
use crate::core::riscv::decode;

use super::asm::{Asm, SCRATCH, STACK};

#[derive(Clone, Copy, PartialEq, Eq)]
enum DivKind {
    Div,
    Divu,
    Rem,
    Remu,
}

impl DivKind {
    fn signed(self) -> bool {
        matches!(self, DivKind::Div | DivKind::Rem)
    }

    fn wants_quotient(self) -> bool {
        matches!(self, DivKind::Div | DivKind::Divu)
    }
}

/// Expand an M-extension instruction (opcode 0110011, funct7 0000001)
pub(super) fn expand_muldiv(asm: &mut Asm, word: u32) -> Result<()> {
    let rd = decode::rd(word);
    let rs1 = decode::rs1(word);
    let rs2 = decode::rs2(word);

    if rd == 0 {
        return Ok(());
    }
    // The loops spill through the x2 stack; x2 operands would alias it
    if rd == STACK || rs1 == STACK || rs2 == STACK {
        return Err(SimError::UnsupportedTranslation { word });
    }

    match decode::funct3(word) {
        0x0 => {
            expand_mul(asm, rd, rs1, rs2);
            Ok(())
        }
        0x4 => {
            expand_div(asm, DivKind::Div, rd, rs1, rs2);
            Ok(())
        }
        0x5 => {
            expand_div(asm, DivKind::Divu, rd, rs1, rs2);
            Ok(())
        }
        0x6 => {
            expand_div(asm, DivKind::Rem, rd, rs1, rs2);
            Ok(())
        }
        0x7 => {
            expand_div(asm, DivKind::Remu, rd, rs1, rs2);
            Ok(())
        }
        // MULH / MULHSU / MULHU
        _ => Err(SimError::UnsupportedTranslation { word }),
    }
}

/// Negate `reg` in place when it reads negative (requires r0 = 0)
fn emit_abs(asm: &mut Asm, reg: u8) {
    let neg = asm.label();
    let done = asm.label();
    asm.alui(AluOp::Cmps, reg, 0);
    asm.branch(Cond::Less, neg);
    asm.jump(done);
    asm.bind(neg);
    asm.alu(AluOp::Sub, SCRATCH, reg); // r0 = -reg
    asm.clear(reg);
    asm.alu(AluOp::Add, reg, SCRATCH);
    asm.clear(SCRATCH);
    asm.bind(done);
}

/// Negate the value in `reg` through r0 (leaves r0 dirty for the caller
/// to clear)
fn emit_negate(asm: &mut Asm, reg: u8) {
    asm.clear(SCRATCH);
    asm.alu(AluOp::Sub, SCRATCH, reg);
    asm.clear(reg);
    asm.alu(AluOp::Add, reg, SCRATCH);
}

// === MUL ===

/// `rd ← low32(rs1 · rs2)` via shift-add; the sign of the operands does
/// not affect the low word
fn expand_mul(asm: &mut Asm, rd: u8, rs1: u8, rs2: u8) {
    if rd != rs1 && rd != rs2 {
        if rs1 != rs2 {
            mul_register_acc(asm, rd, rs1, rs2);
        } else {
            mul_square_distinct(asm, rd, rs1);
        }
    } else if rd == rs1 && rd == rs2 {
        mul_square_aliased(asm, rd);
    } else {
        // rd aliases exactly one source; multiply commutes, so rd is the
        // multiplier and the other source the multiplicand
        let multiplicand = if rd == rs2 { rs1 } else { rs2 };
        mul_stack_acc(asm, rd, multiplicand, rs1, rs2);
    }
}

/// Shared shift-add step: test the multiplier's low bit, add the
/// multiplicand into a register accumulator on a set bit
fn mul_loop_register(asm: &mut Asm, acc: u8, multiplicand: u8, multiplier: u8) {
    let l_loop = asm.label();
    let l_add = asm.label();
    let l_next = asm.label();
    let l_done = asm.label();

    asm.bind(l_loop);
    asm.alui(AluOp::Cmp, multiplier, 0);
    asm.branch(Cond::Equal, l_done);
    asm.alu(AluOp::Add, SCRATCH, multiplier);
    asm.alui(AluOp::And, SCRATCH, 1);
    asm.alui(AluOp::Cmp, SCRATCH, 1);
    asm.branch(Cond::Equal, l_add);
    asm.clear(SCRATCH);
    asm.jump(l_next);
    asm.bind(l_add);
    asm.clear(SCRATCH);
    asm.alu(AluOp::Add, acc, multiplicand);
    asm.bind(l_next);
    asm.alui(AluOp::Shl, multiplicand, 1);
    asm.alui(AluOp::Shr, multiplier, 1);
    asm.jump(l_loop);
    asm.bind(l_done);
}

/// Shift-add loop with the accumulator in the top-of-stack slot, for the
/// shapes that run out of registers
fn mul_loop_stack(asm: &mut Asm, multiplicand: u8, multiplier: u8) {
    let l_loop = asm.label();
    let l_add = asm.label();
    let l_next = asm.label();
    let l_done = asm.label();

    asm.bind(l_loop);
    asm.alui(AluOp::Cmp, multiplier, 0);
    asm.branch(Cond::Equal, l_done);
    asm.alu(AluOp::Add, SCRATCH, multiplier);
    asm.alui(AluOp::And, SCRATCH, 1);
    asm.alui(AluOp::Cmp, SCRATCH, 1);
    asm.branch(Cond::Equal, l_add);
    asm.clear(SCRATCH);
    asm.jump(l_next);
    asm.bind(l_add);
    asm.clear(SCRATCH);
    asm.emit(BittyInstr::Load { rx: SCRATCH, ry: STACK });
    asm.alu(AluOp::Add, SCRATCH, multiplicand);
    asm.emit(BittyInstr::Store { rx: SCRATCH, ry: STACK });
    asm.clear(SCRATCH);
    asm.bind(l_next);
    asm.alui(AluOp::Shl, multiplicand, 1);
    asm.alui(AluOp::Shr, multiplier, 1);
    asm.jump(l_loop);
    asm.bind(l_done);
}

/// All three registers distinct: accumulate directly into rd, shifting
/// the sources in place and restoring them afterwards
fn mul_register_acc(asm: &mut Asm, rd: u8, rs1: u8, rs2: u8) {
    asm.push(rs1);
    asm.push(rs2);
    asm.clear(rd);
    mul_loop_register(asm, rd, rs1, rs2);
    asm.pop(rs2);
    asm.pop(rs1);
    asm.clear(SCRATCH);
}

/// `rd ← rs · rs` with rd distinct: rd doubles as the multiplicand and
/// the accumulator lives on the stack
fn mul_square_distinct(asm: &mut Asm, rd: u8, rs: u8) {
    asm.push(rs);
    asm.clear(rd);
    asm.alu(AluOp::Add, rd, rs);
    asm.push(SCRATCH); // accumulator slot, starts at zero
    mul_loop_stack(asm, rd, rs);
    asm.pop(rd);
    asm.pop(rs);
    asm.clear(SCRATCH);
}

/// rd aliases one source: rd is consumed as the multiplier while the
/// other source shifts, with the accumulator on the stack
fn mul_stack_acc(asm: &mut Asm, rd: u8, multiplicand: u8, rs1: u8, rs2: u8) {
    asm.push(rs1);
    asm.push(rs2);
    asm.push(SCRATCH); // accumulator slot
    mul_loop_stack(asm, multiplicand, rd);
    asm.pop(rd); // accumulator becomes the product
    if rs2 != rd {
        asm.pop(rs2);
    } else {
        asm.pop_discard();
    }
    if rs1 != rd {
        asm.pop(rs1);
    } else {
        asm.pop_discard();
    }
    asm.clear(SCRATCH);
}

/// `rd ← rd · rd`: a victim register carries the multiplier copy
fn mul_square_aliased(asm: &mut Asm, rd: u8) {
    let victim = (1..16)
        .map(|r| r as u8)
        .find(|&r| r != STACK && r != rd)
        .expect("sixteen registers always leave a victim");

    asm.push(victim);
    asm.clear(victim);
    asm.alu(AluOp::Add, victim, rd);
    asm.push(SCRATCH); // accumulator slot
    mul_loop_stack(asm, rd, victim);
    asm.pop(rd);
    asm.pop(victim);
    asm.clear(SCRATCH);
}

// === DIV / DIVU / REM / REMU ===

/// Repeated-subtraction division
///
/// Layout: operands pushed (v1 deep, v2 top), divisor-zero checked,
/// signed variants test overflow and normalize to magnitudes, then the
/// unsigned core subtracts the divisor out of a working dividend in r0
/// while counting iterations in the quotient register. Signed variants
/// re-read the saved operands to settle the result's sign. On every path
/// the operands are restored from the stack and r0 ends cleared.
fn expand_div(asm: &mut Asm, kind: DivKind, rd: u8, rs1: u8, rs2: u8) {
    if rs1 == rs2 {
        expand_div_equal_operands(asm, kind, rd, rs1);
        return;
    }

    // Quotient counter: rd unless it aliases the divisor, then rs1
    // (saved on the stack and restored afterwards)
    let q = if rd != rs2 { rd } else { rs1 };

    let l_div0 = asm.label();
    let l_restore = asm.label();
    let l_loop = asm.label();
    let l_done = asm.label();

    asm.push(rs1);
    asm.push(rs2);
    asm.alui(AluOp::Cmp, rs2, 0);
    asm.branch(Cond::Equal, l_div0);

    if kind.signed() {
        let l_chk2 = asm.label();
        let l_ovf = asm.label();
        let l_norm = asm.label();

        // Overflow pre-check: dividend INT_MIN and divisor -1
        asm.alui(AluOp::Add, SCRATCH, 1);
        asm.alui(AluOp::Shl, SCRATCH, 31);
        asm.alu(AluOp::Cmp, rs1, SCRATCH);
        asm.branch(Cond::Equal, l_chk2);
        asm.clear(SCRATCH);
        asm.jump(l_norm);
        asm.bind(l_chk2);
        asm.clear(SCRATCH);
        asm.alui(AluOp::Sub, SCRATCH, 1);
        asm.alu(AluOp::Cmp, rs2, SCRATCH);
        asm.branch(Cond::Equal, l_ovf);
        asm.clear(SCRATCH);
        asm.jump(l_norm);
        asm.bind(l_ovf);
        asm.clear(SCRATCH);
        if kind == DivKind::Div {
            asm.peek_second(rd); // quotient saturates to the dividend
        } else {
            asm.clear(rd); // INT_MIN rem -1 is zero
        }
        asm.jump(l_restore);

        asm.bind(l_norm);
        emit_abs(asm, rs1);
        emit_abs(asm, rs2);
    }

    // Unsigned core: subtract the divisor out of r0, counting in q
    asm.alu(AluOp::Add, SCRATCH, rs1);
    asm.clear(q);
    asm.bind(l_loop);
    asm.alu(AluOp::Cmp, SCRATCH, rs2);
    asm.branch(Cond::Less, l_done);
    asm.alu(AluOp::Sub, SCRATCH, rs2);
    asm.alui(AluOp::Add, q, 1);
    asm.jump(l_loop);
    asm.bind(l_done);

    if !kind.wants_quotient() {
        // The residual dividend is the remainder
        asm.clear(q);
        asm.alu(AluOp::Add, q, SCRATCH);
    }

    if kind.signed() {
        let l_negq = asm.label();
        let l_fix = asm.label();

        match kind {
            DivKind::Rem => {
                // Remainder takes the dividend's sign
                asm.peek_second(SCRATCH);
                asm.alui(AluOp::Cmps, SCRATCH, 0);
                asm.branch(Cond::Less, l_negq);
                asm.jump(l_fix);
            }
            DivKind::Div => {
                // Quotient is negative when operand signs differ
                let l_s1neg = asm.label();
                asm.peek_second(SCRATCH);
                asm.alui(AluOp::Cmps, SCRATCH, 0);
                asm.branch(Cond::Less, l_s1neg);
                asm.emit(BittyInstr::Load { rx: SCRATCH, ry: STACK });
                asm.alui(AluOp::Cmps, SCRATCH, 0);
                asm.branch(Cond::Less, l_negq);
                asm.jump(l_fix);
                asm.bind(l_s1neg);
                asm.emit(BittyInstr::Load { rx: SCRATCH, ry: STACK });
                asm.alui(AluOp::Cmps, SCRATCH, 0);
                asm.branch(Cond::Less, l_fix);
            }
            _ => unreachable!(),
        }

        asm.bind(l_negq);
        emit_negate(asm, q);
        asm.bind(l_fix);
    }

    if q != rd {
        asm.clear(rd);
        asm.alu(AluOp::Add, rd, q);
    }
    asm.jump(l_restore);

    asm.bind(l_div0);
    if kind.wants_quotient() {
        // Divide by zero: quotient of all ones
        asm.clear(rd);
        asm.alui(AluOp::Sub, rd, 1);
    } else {
        // Remainder of the zero divide is the dividend
        asm.peek_second(rd);
    }

    asm.bind(l_restore);
    if rs2 != rd {
        asm.pop(rs2);
    } else {
        asm.pop_discard();
    }
    if rs1 != rd {
        asm.pop(rs1);
    } else {
        asm.pop_discard();
    }
    asm.clear(SCRATCH);
}

/// Division with rs1 == rs2: the quotient is 1 (or all ones for a zero
/// operand) and the remainder is always zero
fn expand_div_equal_operands(asm: &mut Asm, kind: DivKind, rd: u8, rs: u8) {
    if !kind.wants_quotient() {
        asm.clear(rd);
        return;
    }

    let l_zero = asm.label();
    let l_end = asm.label();
    asm.alui(AluOp::Cmp, rs, 0);
    asm.branch(Cond::Equal, l_zero);
    asm.clear(rd);
    asm.alui(AluOp::Add, rd, 1);
    asm.jump(l_end);
    asm.bind(l_zero);
    asm.clear(rd);
    asm.alui(AluOp::Sub, rd, 1);
    asm.bind(l_end);
}
