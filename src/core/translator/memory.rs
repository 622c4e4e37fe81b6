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

//! Load/store expansion rules
//!
//! A zero-offset access uses the base register directly as the Bitty
//! address register. A nonzero offset is assembled into r0 first. Sub-word
//! loads append a shift pair that sign- or zero-extends the low 8/16 bits.
//!
//! Sub-word stores truncate through a left/arithmetic-right shift pair, so
//! the Bitty side writes the sign-extended truncation as a full word while
//! the RV32EM side merges into the existing word. This is the documented sub-word
//! store caveat of this word-indexed memory model.
//!
//! Stores that need both an assembled address and a staged value borrow a
//! victim register through the r2 stack. A source of x2 cannot be staged
//! that way (the push itself moves x2), and yields the unsupported
//! sentinel.

use crate::core::bitty::{AluOp, BittyInstr};
use crate::core::error::{Result, SimError};
use crate::core::riscv::decode;

use super::asm::{Asm, SCRATCH, STACK};

/// Extension shift pair appended after a sub-word load
fn emit_load_extension(asm: &mut Asm, rd: u8, funct3: u32) {
    match funct3 {
        0x0 => {
            asm.alui(AluOp::Shl, rd, 24);
            asm.alui(AluOp::Shrs, rd, 24);
        }
        0x1 => {
            asm.alui(AluOp::Shl, rd, 16);
            asm.alui(AluOp::Shrs, rd, 16);
        }
        0x4 => {
            asm.alui(AluOp::Shl, rd, 24);
            asm.alui(AluOp::Shr, rd, 24);
        }
        0x5 => {
            asm.alui(AluOp::Shl, rd, 16);
            asm.alui(AluOp::Shr, rd, 16);
        }
        _ => {} // LW loads the full word
    }
}

/// Expand an I-type load (opcode 0000011)
pub(super) fn expand_load(asm: &mut Asm, word: u32) -> Result<()> {
    let rd = decode::rd(word);
    let rs1 = decode::rs1(word);
    let imm = decode::imm_i(word);
    let funct3 = decode::funct3(word);

    if !matches!(funct3, 0x0 | 0x1 | 0x2 | 0x4 | 0x5) {
        return Err(SimError::UnsupportedTranslation { word });
    }

    // A load into x0 has no architectural effect
    if rd == 0 {
        return Ok(());
    }

    if imm == 0 {
        // Address comes straight from the base register (r0 reads as
        // x0's zero when rs1 is x0)
        asm.emit(BittyInstr::Load { rx: rd, ry: rs1 });
    } else {
        asm.load_const12(SCRATCH, imm);
        if rs1 != 0 {
            asm.alu(AluOp::Add, SCRATCH, rs1);
        }
        asm.emit(BittyInstr::Load { rx: rd, ry: SCRATCH });
        asm.clear(SCRATCH);
    }

    emit_load_extension(asm, rd, funct3);
    Ok(())
}

/// Expand an S-type store (opcode 0100011)
pub(super) fn expand_store(asm: &mut Asm, word: u32) -> Result<()> {
    let rs1 = decode::rs1(word);
    let rs2 = decode::rs2(word);
    let imm = decode::imm_s(word);

    // Truncation width for the sub-word variants
    let shift = match decode::funct3(word) {
        0x0 => Some(24),
        0x1 => Some(16),
        0x2 => None,
        _ => return Err(SimError::UnsupportedTranslation { word }),
    };

    if imm == 0 && rs1 != 0 {
        // Stage the source in r0, truncate, store, re-clear
        asm.alu(AluOp::Add, SCRATCH, rs2);
        if let Some(w) = shift {
            asm.alui(AluOp::Shl, SCRATCH, w);
            asm.alui(AluOp::Shrs, SCRATCH, w);
        }
        asm.emit(BittyInstr::Store { rx: SCRATCH, ry: rs1 });
        asm.clear(SCRATCH);
        return Ok(());
    }

    if shift.is_none() && (imm == 0 || rs2 != 0) {
        // Full-word store with an assembled address: the source register
        // itself carries the data, r0 carries the address. With rs1 = x0
        // and a zero offset, pristine r0 already holds address zero.
        asm.load_const12(SCRATCH, imm);
        if rs1 != 0 {
            asm.alu(AluOp::Add, SCRATCH, rs1);
        }
        asm.emit(BittyInstr::Store { rx: rs2, ry: SCRATCH });
        asm.clear(SCRATCH);
        return Ok(());
    }

    // Remaining shapes (sub-word with offset, or a zero-valued source
    // needing a staged zero) spill a victim register through the stack.
    // The stack push moves x2, so x2 cannot be the staged source.
    if rs2 == STACK {
        return Err(SimError::UnsupportedTranslation { word });
    }
    let victim = (1..16)
        .map(|r| r as u8)
        .find(|&r| r != STACK && r != rs1 && r != rs2)
        .expect("sixteen registers always leave a victim");

    // Address first: rs1 may be x2, whose value the push would move
    asm.load_const12(SCRATCH, imm);
    if rs1 != 0 {
        asm.alu(AluOp::Add, SCRATCH, rs1);
    }
    asm.push(victim);
    asm.clear(victim);
    if rs2 != 0 {
        asm.alu(AluOp::Add, victim, rs2);
    }
    if let Some(w) = shift {
        asm.alui(AluOp::Shl, victim, w);
        asm.alui(AluOp::Shrs, victim, w);
    }
    asm.emit(BittyInstr::Store { rx: victim, ry: SCRATCH });
    asm.pop(victim);
    asm.clear(SCRATCH);
    Ok(())
}
