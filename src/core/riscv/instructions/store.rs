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

use super::super::decode;
use super::super::RvCpu;
use crate::core::error::SimError;
use crate::core::memory::SharedMemory;

impl RvCpu {
    /// Execute an S-type store (opcode 0100011)
    ///
    /// Format: | imm[11:5] | rs2 (5) | rs1 (5) | funct3 (3) | imm[4:0] | 0100011 |
    ///
    /// SB merges the low byte into the low 8 bits of the addressed word
    /// and SH merges the low halfword, leaving the remainder of the cell
    /// untouched. SH requires an even index and SW an index divisible by
    /// 4; misaligned stores are skipped with a diagnostic.
    pub(in super::super) fn exec_store(&mut self, word: u32, mem: &mut SharedMemory) {
        let rs1 = decode::rs1(word);
        let rs2 = decode::rs2(word);
        if !self.check_regs(&[rs1, rs2]) {
            return;
        }

        let address = self.reg(rs1).wrapping_add(decode::imm_s(word) as u32);
        let value = self.reg(rs2);

        // Stores reject out-of-range indices outright rather than wrapping
        if address as usize >= mem.len() {
            log::warn!(
                "{} at PC={}",
                SimError::MemoryOutOfRange {
                    index: address,
                    size: mem.len()
                },
                self.pc
            );
            return;
        }

        let outcome = match decode::funct3(word) {
            // SB
            0x0 => mem.write_byte(address, value),
            // SH: halfword-aligned index required
            0x1 => {
                if address % 2 != 0 {
                    log::warn!(
                        "{} at PC={}",
                        SimError::MisalignedAccess {
                            access: "sh",
                            index: address
                        },
                        self.pc
                    );
                    return;
                }
                mem.write_halfword(address, value)
            }
            // SW: word-aligned index required
            0x2 => {
                if address % 4 != 0 {
                    log::warn!(
                        "{} at PC={}",
                        SimError::MisalignedAccess {
                            access: "sw",
                            index: address
                        },
                        self.pc
                    );
                    return;
                }
                mem.write(address, value)
            }
            f3 => {
                log::warn!("Unknown store funct3 {} at PC={}", f3, self.pc);
                return;
            }
        };

        if let Err(e) = outcome {
            log::warn!("{} at PC={}", e, self.pc);
        }
    }
}
