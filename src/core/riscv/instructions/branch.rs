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

impl RvCpu {
    /// Execute a B-type conditional branch (opcode 1100011), returning the
    /// next PC
    ///
    /// Format: | imm[12|10:5] | rs2 (5) | rs1 (5) | funct3 (3) | imm[4:1|11] | 1100011 |
    ///
    /// The reassembled 13-bit immediate is a byte offset; the target in
    /// instruction-index units is `PC + imm/4`. Out-of-range targets wrap
    /// by the program length in tolerant mode.
    pub(in super::super) fn exec_branch(&mut self, word: u32) -> usize {
        let rs1 = decode::rs1(word);
        let rs2 = decode::rs2(word);
        if !self.check_regs(&[rs1, rs2]) {
            return self.pc + 1;
        }

        let a = self.reg(rs1);
        let b = self.reg(rs2);

        let taken = match decode::funct3(word) {
            0x0 => a == b,                         // BEQ
            0x1 => a != b,                         // BNE
            0x4 => (a as i32) < (b as i32),        // BLT
            0x5 => (a as i32) >= (b as i32),       // BGE
            0x6 => a < b,                          // BLTU
            0x7 => a >= b,                         // BGEU
            f3 => {
                log::warn!("Unknown branch funct3 {} at PC={}", f3, self.pc);
                return self.pc + 1;
            }
        };

        if taken {
            let target = self.pc as i64 + (decode::imm_b(word) / 4) as i64;
            self.clamp_target(target)
        } else {
            self.pc + 1
        }
    }
}
