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

//! RV32EM interpreter
//!
//! # Specifications
//! - Architecture: RV32E integer base + M extension (32-bit)
//! - Registers: 16 general-purpose registers, x0 hardwired to zero
//! - Program counter: an instruction index into the program, not a byte
//!   address; byte offsets carried in branch/jump immediates are converted
//!   by dividing by 4
//!
//! Faults (unknown opcodes, out-of-range register selectors, rejected
//! memory accesses) are logged and the PC advances by one so that bulk
//! comparison runs never stall.
//!
//! # Example
//! ```
//! use rvbitty::core::riscv::RvCpu;
//! use rvbitty::core::memory::SharedMemory;
//!
//! let mut cpu = RvCpu::new();
//! let mut mem = SharedMemory::new(64);
//! cpu.load_program(vec![0x0070_0293]); // ADDI x5, x0, 7
//! cpu.step(&mut mem);
//! assert_eq!(cpu.reg(5), 7);
//! ```

pub mod decode;
mod instructions;

#[cfg(test)]
mod tests;

use super::config::SimConfig;
use super::error::{Result, SimError};
use super::memory::SharedMemory;

/// RV32EM interpreter state
pub struct RvCpu {
    /// General purpose registers (x0-x15)
    ///
    /// x0 is hardwired to always return 0
    regs: [u32; 16],

    /// Program counter, in instruction-index units
    pc: usize,

    /// The loaded program, read-only during execution
    program: Vec<u32>,

    /// Wrap out-of-range branch/jump targets by the program length
    tolerant_pc: bool,
}

impl RvCpu {
    /// Create a new CPU with zeroed registers and an empty program
    pub fn new() -> Self {
        Self {
            regs: [0; 16],
            pc: 0,
            program: Vec::new(),
            tolerant_pc: true,
        }
    }

    /// Create a CPU configured from `config`
    pub fn with_config(config: &SimConfig) -> Self {
        let mut cpu = Self::new();
        cpu.tolerant_pc = config.tolerant_pc;
        cpu
    }

    /// Seed registers with the comparison pattern `Ri = 10·i` (x0 stays 0)
    pub fn seed_registers(&mut self) {
        for (i, reg) in self.regs.iter_mut().enumerate() {
            *reg = (i as u32) * 10;
        }
        self.regs[0] = 0;
    }

    /// Replace the program and reset the PC
    pub fn load_program(&mut self, program: Vec<u32>) {
        self.program = program;
        self.pc = 0;
    }

    /// Read a general purpose register
    ///
    /// x0 always returns 0.
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        if index == 0 {
            0
        } else {
            self.regs[index as usize]
        }
    }

    /// Write a general purpose register
    ///
    /// Writes to x0 are discarded.
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        if index != 0 {
            self.regs[index as usize] = value;
        }
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
    }

    /// Program length in instructions
    pub fn program_len(&self) -> usize {
        self.program.len()
    }

    /// The loaded program
    pub fn program(&self) -> &[u32] {
        &self.program
    }

    /// True once the PC has left the program
    pub fn finished(&self) -> bool {
        self.pc >= self.program.len()
    }

    /// Fetch the instruction at the current PC
    ///
    /// Returns 0 (a NOP encoding) when the PC is out of range.
    pub fn fetch(&self) -> u32 {
        match self.program.get(self.pc) {
            Some(&word) => word,
            None => {
                log::warn!("RV PC {} out of range, fetching NOP", self.pc);
                0
            }
        }
    }

    /// Execute one instruction and advance the PC
    pub fn step(&mut self, mem: &mut SharedMemory) {
        let word = self.fetch();
        self.pc = self.execute_word(word, mem);
    }

    /// Run until the PC leaves the program or `max_instructions` is reached
    ///
    /// Returns the number of instructions executed, or
    /// [`SimError::StepLimitExceeded`] when the budget ran out first.
    pub fn run(&mut self, mem: &mut SharedMemory, max_instructions: usize) -> Result<usize> {
        let mut count = 0;
        while self.pc < self.program.len() {
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

    /// Convert a possibly negative or overlarge instruction-index target
    /// into a valid PC
    ///
    /// Tolerant mode wraps by the program length; strict mode logs and
    /// parks the PC one past the end, which halts the run loop.
    fn clamp_target(&self, target: i64) -> usize {
        let len = self.program.len() as i64;
        if len == 0 {
            return 0;
        }
        if (0..len).contains(&target) {
            return target as usize;
        }
        if self.tolerant_pc {
            let wrapped = target.rem_euclid(len) as usize;
            log::warn!("RV target {} out of range, wrapping to {}", target, wrapped);
            wrapped
        } else {
            log::warn!("RV target {} out of range, halting", target);
            len as usize
        }
    }
}

impl Default for RvCpu {
    fn default() -> Self {
        Self::new()
    }
}
