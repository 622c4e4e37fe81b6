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

//! Bitty interpreter
//!
//! # Specifications
//! - 16-bit instructions, 32-bit datapath, 16 registers
//! - `d_out`: a 32-bit latch written by every ALU operation and read by
//!   conditional branches; compares write {0: equal, 1: greater, 2: less}
//! - Program counter: an instruction index; branches add `imm12 >> 1`
//!
//! Unlike the RV32EM file, r0 is writable here: the translator uses it as
//! an expansion scratch register and restores it to zero before every
//! RV32EM instruction boundary.
//!
//! The run loop is a two-state machine: Running transitions to Halted when
//! the PC leaves the program, when the step budget runs out, or on a
//! decoder error. There are no interrupts and no traps.

pub mod decode;

#[cfg(test)]
mod tests;

pub use decode::{AluOp, BittyInstr, Cond};

use super::config::SimConfig;
use super::error::{Result, SimError};
use super::memory::SharedMemory;

/// Bitty run-loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Executing instructions
    Running,
    /// The PC left the program, the step budget ran out, or decoding failed
    Halted,
}

/// Bitty interpreter state
pub struct BittyCpu {
    /// General purpose registers; r0 is writable but held at zero at
    /// RV32EM instruction boundaries
    regs: [u32; 16],

    /// Program counter, in instruction-index units
    pc: usize,

    /// Comparison latch consumed by conditional branches
    d_out: u32,

    /// The loaded program, read-only during execution
    program: Vec<u16>,

    state: RunState,

    /// Preserve the branch variant that never leaves the fall-through path
    quirk_fallthrough: bool,
}

impl BittyCpu {
    /// Create a new CPU with zeroed registers and an empty program
    pub fn new() -> Self {
        Self {
            regs: [0; 16],
            pc: 0,
            d_out: 0,
            program: Vec::new(),
            state: RunState::Running,
            quirk_fallthrough: false,
        }
    }

    /// Create a CPU configured from `config`
    pub fn with_config(config: &SimConfig) -> Self {
        let mut cpu = Self::new();
        cpu.quirk_fallthrough = config.quirk_unconditional_fallthrough;
        cpu
    }

    /// Seed registers with the comparison pattern `Ri = 10·i` (r0 = 0)
    pub fn seed_registers(&mut self) {
        for (i, reg) in self.regs.iter_mut().enumerate() {
            *reg = (i as u32) * 10;
        }
        self.regs[0] = 0;
    }

    /// Replace the program and reset PC and run state
    pub fn load_program(&mut self, program: Vec<u16>) {
        self.program = program;
        self.pc = 0;
        self.state = RunState::Running;
    }

    /// Read a register
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[(index & 0xF) as usize]
    }

    /// Write a register (masked to 32 bits by the u32 representation)
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        self.regs[(index & 0xF) as usize] = value;
    }

    /// Full register file view for state comparison
    pub fn registers(&self) -> &[u32; 16] {
        &self.regs
    }

    /// Current program counter (instruction index)
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Force the program counter, for test setup
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
        if pc < self.program.len() {
            self.state = RunState::Running;
        }
    }

    /// Last ALU/compare latch value
    pub fn d_out(&self) -> u32 {
        self.d_out
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute one instruction
    ///
    /// Decoder errors and a PC outside the program both move the state to
    /// Halted.
    pub fn step(&mut self, mem: &mut SharedMemory) {
        let word = match self.program.get(self.pc) {
            Some(&word) => word,
            None => {
                self.state = RunState::Halted;
                return;
            }
        };

        let instr = match BittyInstr::decode(word) {
            Ok(instr) => instr,
            Err(e) => {
                log::warn!("Bitty decode failed at PC={}: {}", self.pc, e);
                self.state = RunState::Halted;
                return;
            }
        };

        self.pc = self.evaluate(instr, mem);
        if self.pc >= self.program.len() {
            self.state = RunState::Halted;
        }
    }

    /// Evaluate one decoded instruction, returning the next PC
    fn evaluate(&mut self, instr: BittyInstr, mem: &mut SharedMemory) -> usize {
        let current_pc = self.pc;

        match instr {
            BittyInstr::Alu { op, rx, ry } => {
                self.alu(op, rx, self.reg(ry));
            }
            BittyInstr::AluImm { op, rx, imm } => {
                self.alu(op, rx, imm as i32 as u32);
            }
            BittyInstr::Branch { cond, imm } => {
                let taken = self.d_out == cond as u32;
                if taken && !self.quirk_fallthrough {
                    let offset = (imm as i32) >> 1;
                    let target = current_pc as i64 + offset as i64;
                    // A negative target has left the program; park the PC
                    // past the end so the run loop halts
                    return if target < 0 {
                        self.program.len()
                    } else {
                        target as usize
                    };
                }
                return current_pc + 1;
            }
            BittyInstr::GetPc { rx } => {
                self.set_reg(rx, current_pc as u32 + 1);
            }
            BittyInstr::SetPc { rx } => {
                return self.reg(rx) as usize;
            }
            BittyInstr::Load { rx, ry } => {
                let address = self.reg(ry);
                match mem.read(address) {
                    Ok(value) => self.set_reg(rx, value),
                    Err(e) => log::warn!("Bitty load skipped at PC={}: {}", current_pc, e),
                }
            }
            BittyInstr::Store { rx, ry } => {
                let address = self.reg(ry);
                if let Err(e) = mem.write(address, self.reg(rx)) {
                    log::warn!("Bitty store skipped at PC={}: {}", current_pc, e);
                }
            }
        }

        current_pc + 1
    }

    /// Apply one ALU operation to rx and the second operand
    ///
    /// Compares write only `d_out`; every other operation writes its
    /// result to rx and to `d_out`.
    fn alu(&mut self, op: AluOp, rx: u8, in_b: u32) {
        let a = self.reg(rx);

        let result = match op {
            AluOp::Add => a.wrapping_add(in_b),
            AluOp::Sub => a.wrapping_sub(in_b),
            AluOp::And => a & in_b,
            AluOp::Or => a | in_b,
            AluOp::Xor => a ^ in_b,
            AluOp::Shl => a.wrapping_shl(in_b & 0x1F),
            AluOp::Shr => a.wrapping_shr(in_b & 0x1F),
            AluOp::Shrs => ((a as i32) >> (in_b & 0x1F)) as u32,
            AluOp::Cmp => {
                self.d_out = match a.cmp(&in_b) {
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                    std::cmp::Ordering::Less => 2,
                };
                return;
            }
            AluOp::Cmps => {
                self.d_out = match (a as i32).cmp(&(in_b as i32)) {
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                    std::cmp::Ordering::Less => 2,
                };
                return;
            }
        };

        self.set_reg(rx, result);
        self.d_out = result;
    }

    /// Run until the program ends or `max_instructions` is reached
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, mem: &mut SharedMemory, max_instructions: usize) -> Result<usize> {
        let mut count = 0;
        while self.state == RunState::Running {
            if count >= max_instructions {
                self.state = RunState::Halted;
                return Err(SimError::StepLimitExceeded {
                    limit: max_instructions,
                });
            }
            self.step(mem);
            count += 1;
        }
        Ok(count)
    }

    /// Run until the PC reaches `target_pc`, the program ends, or the step
    /// budget runs out
    ///
    /// This is how the comparison driver advances Bitty to the index that
    /// the PC map assigns to a freshly advanced RV32EM PC.
    pub fn run_to(
        &mut self,
        mem: &mut SharedMemory,
        target_pc: usize,
        max_instructions: usize,
    ) -> Result<usize> {
        let mut count = 0;
        while self.state == RunState::Running && self.pc != target_pc {
            if count >= max_instructions {
                return Err(SimError::StepLimitExceeded {
                    limit: max_instructions,
                });
            }
            self.step(mem);
            count += 1;
        }
        Ok(count)
    }
}

impl Default for BittyCpu {
    fn default() -> Self {
        Self::new()
    }
}
