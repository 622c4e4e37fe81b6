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

//! RV32EM → Bitty translation
//!
//! Each RV32EM instruction at `PC_R` expands into an ordered list of Bitty
//! instructions appended to parallel symbolic and binary buffers. The
//! translator records the map `PC_R ↦ PC_B` (the Bitty index every RV32EM
//! instruction starts at) and a pending-branches table that the fixup pass
//! resolves once the layout of the whole program is known, rewriting each
//! branch immediate to `2·(PC_B(target) − PC_B(branch))`.
//!
//! Expansion conventions:
//! - Bitty r0 is scratch space; every expansion leaves it holding zero, so
//!   reading r0 at the start of an expansion yields x0's value.
//! - Bitty r2 mirrors x2 and addresses the software stack used by the
//!   multiply/divide loops to save and restore operands. Multiply/divide
//!   operands must avoid x2 for that reason.
//! - Destinations of x0 expand to nothing: the RV32EM write is discarded,
//!   and the PC map entry alone keeps the two streams aligned.
//!
//! Dynamic jumps (JALR) cannot be resolved by the static fixup: their
//! target is an RV32EM index computed at run time, while `stpc` consumes a
//! Bitty index. The translator therefore publishes the PC map into data
//! memory at a fixed, even base: cell `base + PC_R` holds the Bitty entry
//! point for instruction `PC_R`. A JALR expansion loads through that table
//! before transferring control. Each published entry points at a landing
//! thunk appended after the program (`sub r0,r0` and an always-taken
//! branch to the instruction's expansion), so the scratch register that
//! carried the target across the `stpc` reads as zero again before guest
//! code resumes.
//!
//! Failure semantics: instructions with no expansion yield a sentinel
//! error; the driver logs it and continues, with the PC map entry still
//! recorded so both program counters stay in step.

mod alu;
mod asm;
mod control;
mod memory;
mod muldiv;

#[cfg(test)]
mod tests;

use asm::{Asm, PendingRef};

use super::bitty::{AluOp, BittyInstr, Cond};
use super::error::{Result, SimError};
use super::memory::SharedMemory;
use super::riscv::decode;

/// Default data-memory base of the published PC map (matches the default
/// simulation configuration)
const DEFAULT_RUNTIME_MAP_BASE: u32 = 512;

/// Instructions per landing thunk: a scratch clear, an always-true
/// compare and the branch into the expansion
const THUNK_LEN: usize = 3;

/// A branch emitted at Bitty index `pc_b` whose final offset depends on
/// the layout of RV32EM instruction `target_pc_r`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBranch {
    /// Index of the branch in the Bitty buffers
    pub pc_b: usize,
    /// The RV32EM instruction index it targets (pre-wrap, may be negative)
    pub target_pc_r: i64,
}

/// Per-instruction RV32EM → Bitty expander
pub struct Translator {
    /// Next RV32EM instruction index
    pc_r: usize,

    /// Next free Bitty instruction index
    pc_b: usize,

    /// Symbolic instruction buffer
    assembly: Vec<BittyInstr>,

    /// Encoded binary buffer, parallel to `assembly`
    binary: Vec<u16>,

    /// `PC_R ↦ PC_B`: the Bitty start index of every translated
    /// instruction
    pc_map: Vec<usize>,

    /// Branches awaiting offset resolution
    pending: Vec<PendingBranch>,

    /// Data-memory base of the published `PC_R ↦ PC_B` table
    map_base: u32,

    /// Set once a translated instruction needs the runtime table
    has_dynamic_jumps: bool,

    /// First Bitty index of the landing-thunk section, once emitted
    thunk_base: Option<usize>,
}

impl Translator {
    pub fn new() -> Self {
        Self {
            pc_r: 0,
            pc_b: 0,
            assembly: Vec::new(),
            binary: Vec::new(),
            pc_map: Vec::new(),
            pending: Vec::new(),
            map_base: DEFAULT_RUNTIME_MAP_BASE,
            has_dynamic_jumps: false,
            thunk_base: None,
        }
    }

    /// Move the published PC map to another data-memory base
    ///
    /// Must be even (the dynamic-jump expansion folds the base into the
    /// target before masking the low bit) and must be set before any
    /// instruction is translated.
    pub fn set_map_base(&mut self, base: u32) {
        assert!(base % 2 == 0, "runtime map base must be even");
        self.map_base = base;
    }

    /// Data-memory base of the published PC map
    pub fn map_base(&self) -> u32 {
        self.map_base
    }

    /// Expand one RV32EM instruction, appending its Bitty sequence
    ///
    /// Always records the PC map entry and advances `PC_R`, even when the
    /// instruction has no expansion; the error is a sentinel for the
    /// driver to log, never a stall.
    ///
    /// Returns the number of Bitty instructions emitted.
    pub fn translate(&mut self, word: u32) -> Result<usize> {
        let pc_b_start = self.pc_b;
        self.pc_map.push(pc_b_start);
        let pc_r = self.pc_r;
        self.pc_r += 1;

        let expansion = self.check_selectors(word).and_then(|()| {
            let mut asm = Asm::new();
            self.expand(&mut asm, word, pc_r, pc_b_start)?;
            Ok(asm.finish())
        });

        let (instrs, refs) = match expansion {
            Ok(parts) => parts,
            Err(e) => return Err(e),
        };

        if decode::opcode(word) == decode::OPCODE_JALR {
            self.has_dynamic_jumps = true;
        }

        for r in &refs {
            self.pending.push(PendingBranch {
                pc_b: pc_b_start + r.offset,
                target_pc_r: r.target_pc_r,
            });
        }
        for instr in instrs {
            self.binary.push(instr.encode());
            self.assembly.push(instr);
        }
        self.pc_b = self.assembly.len();
        Ok(self.pc_b - pc_b_start)
    }

    /// Translate a whole program, logging skipped instructions
    ///
    /// Returns the number of instructions that failed to translate.
    pub fn translate_program(&mut self, program: &[u32]) -> usize {
        let mut skipped = 0;
        for &word in program {
            if let Err(e) = self.translate(word) {
                log::warn!("Translation skipped at PC_R={}: {}", self.pc_r - 1, e);
                skipped += 1;
            }
        }
        skipped
    }

    /// Rewrite every pending branch to its final offset
    /// `2·(PC_B(target) − PC_B(branch))`
    ///
    /// May be run at any point after the targets' layout is known, and is
    /// idempotent: offsets are recomputed from positions, not from the
    /// stored immediates. Targets wrap by the translated program length
    /// the way the RV32EM interpreter wraps its PC. Offsets that do not
    /// fit the signed 12-bit branch field are logged and left carrying
    /// their placeholder.
    ///
    /// Returns the number of branches patched.
    pub fn resolve_branches(&mut self) -> usize {
        if self.has_dynamic_jumps && self.thunk_base.is_none() {
            self.emit_landing_thunks();
        }

        let program_len = self.pc_map.len() as i64;
        let mut patched = 0;

        let pending = self.pending.clone();
        for entry in &pending {
            if program_len == 0 {
                break;
            }
            let wrapped = entry.target_pc_r.rem_euclid(program_len) as usize;
            let target_b = self.pc_map[wrapped] as i64;
            let offset = 2 * (target_b - entry.pc_b as i64);
            if !(-2048..=2047).contains(&offset) {
                log::warn!(
                    "Branch at PC_B={} to PC_R={} needs offset {}, beyond the 12-bit field",
                    entry.pc_b,
                    entry.target_pc_r,
                    offset
                );
                continue;
            }
            if let BittyInstr::Branch { cond, .. } = self.assembly[entry.pc_b] {
                let instr = BittyInstr::Branch {
                    cond,
                    imm: offset as i16,
                };
                self.assembly[entry.pc_b] = instr;
                self.binary[entry.pc_b] = instr.encode();
                patched += 1;
            }
        }

        patched
    }

    /// Append one landing thunk per translated instruction
    ///
    /// A thunk re-clears the scratch register that `stpc` left holding
    /// the jump target, then branches into the instruction's expansion
    /// through the regular fixup table.
    fn emit_landing_thunks(&mut self) {
        self.thunk_base = Some(self.binary.len());
        for target in 0..self.pc_map.len() {
            let thunk = [
                BittyInstr::Alu { op: AluOp::Sub, rx: 0, ry: 0 },
                BittyInstr::Alu { op: AluOp::Cmp, rx: 0, ry: 0 },
                BittyInstr::Branch { cond: Cond::Equal, imm: 0 },
            ];
            self.pending.push(PendingBranch {
                pc_b: self.binary.len() + THUNK_LEN - 1,
                target_pc_r: target as i64,
            });
            for instr in thunk {
                self.binary.push(instr.encode());
                self.assembly.push(instr);
            }
        }
        self.pc_b = self.assembly.len();
    }

    /// The Bitty index the published table carries for `pc_r`: the
    /// landing thunk when dynamic jumps exist, the expansion start
    /// otherwise
    pub fn runtime_map_entry(&self, pc_r: usize) -> usize {
        match self.thunk_base {
            Some(base) => base + THUNK_LEN * pc_r,
            None => self.pc_map[pc_r],
        }
    }

    /// Write the published PC map into a data memory at the configured
    /// base
    ///
    /// Call after [`Self::resolve_branches`], once the thunk section (if
    /// any) has its final layout. The driver installs the same table into
    /// both data memories so they stay identical.
    pub fn install_runtime_map(&self, mem: &mut SharedMemory) -> Result<()> {
        let base = self.map_base as usize;
        if base + self.pc_map.len() > mem.len() {
            return Err(SimError::MemoryOutOfRange {
                index: (base + self.pc_map.len()) as u32,
                size: mem.len(),
            });
        }
        for pc_r in 0..self.pc_map.len() {
            mem.write((base + pc_r) as u32, self.runtime_map_entry(pc_r) as u32)?;
        }
        Ok(())
    }

    /// The translated binary buffer
    pub fn binary(&self) -> &[u16] {
        &self.binary
    }

    /// First Bitty index past the translated program proper
    ///
    /// This is where a completed run parks: the landing-thunk section (if
    /// any) lives beyond it and is only ever entered through `stpc`.
    pub fn program_end(&self) -> usize {
        self.thunk_base.unwrap_or(self.binary.len())
    }

    /// The symbolic instruction buffer
    pub fn assembly(&self) -> &[BittyInstr] {
        &self.assembly
    }

    /// The `PC_R ↦ PC_B` map
    pub fn pc_map(&self) -> &[usize] {
        &self.pc_map
    }

    /// Branches recorded for fixup
    pub fn pending_branches(&self) -> &[PendingBranch] {
        &self.pending
    }

    /// Reject register selectors beyond x15 before expanding
    fn check_selectors(&self, word: u32) -> Result<()> {
        // Unused slots stay zero, which is always in range
        let selectors: [u8; 3] = match decode::opcode(word) {
            decode::OPCODE_OP => [decode::rd(word), decode::rs1(word), decode::rs2(word)],
            decode::OPCODE_OP_IMM | decode::OPCODE_LOAD | decode::OPCODE_JALR => {
                [decode::rd(word), decode::rs1(word), 0]
            }
            decode::OPCODE_STORE | decode::OPCODE_BRANCH => {
                [decode::rs1(word), decode::rs2(word), 0]
            }
            decode::OPCODE_LUI | decode::OPCODE_AUIPC | decode::OPCODE_JAL => {
                [decode::rd(word), 0, 0]
            }
            _ => [0, 0, 0],
        };
        for index in selectors {
            if index > 15 {
                return Err(SimError::RegisterOutOfRange { index });
            }
        }
        Ok(())
    }

    /// Dispatch one instruction to its expansion rule
    fn expand(&self, asm: &mut Asm, word: u32, pc_r: usize, pc_b: usize) -> Result<()> {
        match decode::opcode(word) {
            decode::OPCODE_OP => {
                if decode::funct7(word) == decode::FUNCT7_MULDIV {
                    muldiv::expand_muldiv(asm, word)
                } else {
                    alu::expand_op(asm, word)
                }
            }
            decode::OPCODE_OP_IMM => alu::expand_op_imm(asm, word),
            decode::OPCODE_LOAD => memory::expand_load(asm, word),
            decode::OPCODE_STORE => memory::expand_store(asm, word),
            decode::OPCODE_BRANCH => control::expand_branch(asm, word, pc_r),
            decode::OPCODE_LUI | decode::OPCODE_AUIPC => {
                control::expand_upper(asm, word, pc_r, pc_b)
            }
            decode::OPCODE_JAL => control::expand_jal(asm, word, pc_r, pc_b),
            decode::OPCODE_JALR => {
                control::expand_jalr(asm, word, pc_r, pc_b, self.map_base)
            }
            _ => Err(SimError::UnknownOpcode { word }),
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}
