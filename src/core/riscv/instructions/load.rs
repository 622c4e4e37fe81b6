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
use crate::core::memory::SharedMemory;

impl RvCpu {
    /// Execute an I-type load (opcode 0000011)
    ///
    /// Format: | imm[11:0] (12) | rs1 (5) | funct3 (3) | rd (5) | 0000011 |
    ///
    /// The effective address `rs1 + sign_extend(imm)` is a word index into
    /// the shared data memory; out-of-range indices wrap in tolerant mode.
    /// Halfword loads align the index down to the nearest even value. Byte
    /// and halfword variants read the low 8/16 bits of the addressed word
    /// (this memory is word-indexed, not byte-granular).
    pub(in super::super) fn exec_load(&mut self, word: u32, mem: &mut SharedMemory) {
        let rd = decode::rd(word);
        let rs1 = decode::rs1(word);
        if !self.check_regs(&[rd, rs1]) {
            return;
        }

        let address = self.reg(rs1).wrapping_add(decode::imm_i(word) as u32);

        // x0 discards the loaded value; skip the access entirely
        if rd == 0 {
            return;
        }

        let value = match decode::funct3(word) {
            // LB: sign-extended low byte
            0x0 => match mem.read(address) {
                Ok(cell) => (cell as u8 as i8) as i32 as u32,
                Err(e) => {
                    log::warn!("{} at PC={}", e, self.pc);
                    return;
                }
            },
            // LH: sign-extended low halfword, index aligned down
            0x1 => match mem.read(address & !1) {
                Ok(cell) => (cell as u16 as i16) as i32 as u32,
                Err(e) => {
                    log::warn!("{} at PC={}", e, self.pc);
                    return;
                }
            },
            // LW
            0x2 => match mem.read(address) {
                Ok(cell) => cell,
                Err(e) => {
                    log::warn!("{} at PC={}", e, self.pc);
                    return;
                }
            },
            // LBU: zero-extended low byte
            0x4 => match mem.read(address) {
                Ok(cell) => cell & 0xFF,
                Err(e) => {
                    log::warn!("{} at PC={}", e, self.pc);
                    return;
                }
            },
            // LHU: zero-extended low halfword, index aligned down
            0x5 => match mem.read(address & !1) {
                Ok(cell) => cell & 0xFFFF,
                Err(e) => {
                    log::warn!("{} at PC={}", e, self.pc);
                    return;
                }
            },
            f3 => {
                log::warn!("Unknown load funct3 {} at PC={}", f3, self.pc);
                return;
            }
        };

        self.set_reg(rd, value);
    }
}
