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

//! RV32EM instruction execution
//!
//! Handlers are grouped by category:
//! - `arithmetic`: R-type ALU and I-type immediate ALU operations
//! - `multiply`: M-extension multiply/divide
//! - `load` / `store`: data memory access
//! - `branch`: conditional branches
//! - `jump`: JAL, JALR, LUI, AUIPC

mod arithmetic;
mod branch;
mod jump;
mod load;
mod multiply;
mod store;

use super::decode;
use super::RvCpu;
use crate::core::error::SimError;
use crate::core::memory::SharedMemory;

impl RvCpu {
    /// Decode and execute one instruction word, returning the next PC
    ///
    /// The opcode in the low 7 bits selects the handler. Unknown opcodes
    /// are logged and skipped; the PC still advances so that execution
    /// never stalls.
    pub(super) fn execute_word(&mut self, word: u32, mem: &mut SharedMemory) -> usize {
        match decode::opcode(word) {
            decode::OPCODE_OP => self.exec_op(word),
            decode::OPCODE_OP_IMM => self.exec_op_imm(word),
            decode::OPCODE_LOAD => self.exec_load(word, mem),
            decode::OPCODE_STORE => self.exec_store(word, mem),
            decode::OPCODE_BRANCH => return self.exec_branch(word),
            decode::OPCODE_LUI | decode::OPCODE_AUIPC => self.exec_upper(word),
            decode::OPCODE_JAL => return self.exec_jal(word),
            decode::OPCODE_JALR => return self.exec_jalr(word),
            _ => {
                log::warn!("{} at PC={}", SimError::UnknownOpcode { word }, self.pc);
            }
        }
        self.pc + 1
    }

    /// Check that every decoded register selector fits RV32E (x0..x15)
    ///
    /// Out-of-range selectors are reported and the instruction is skipped,
    /// with the PC still advancing.
    pub(super) fn check_regs(&self, selectors: &[u8]) -> bool {
        for &index in selectors {
            if index > 15 {
                log::warn!(
                    "{} at PC={}",
                    SimError::RegisterOutOfRange { index },
                    self.pc
                );
                return false;
            }
        }
        true
    }
}
