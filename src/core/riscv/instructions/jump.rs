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
    /// Execute a U-type instruction (LUI or AUIPC)
    ///
    /// LUI places `imm[31:12] << 12` into rd. AUIPC adds the same value to
    /// the current PC (an instruction index in this model) and places the
    /// sum into rd.
    pub(in super::super) fn exec_upper(&mut self, word: u32) {
        let rd = decode::rd(word);
        if !self.check_regs(&[rd]) {
            return;
        }

        let imm = decode::imm_u(word);
        let value = if decode::opcode(word) == decode::OPCODE_LUI {
            imm
        } else {
            (self.pc as u32).wrapping_add(imm)
        };
        self.set_reg(rd, value);
    }

    /// Execute JAL (opcode 1101111), returning the next PC
    ///
    /// Format: | imm[20|10:1|11|19:12] (20) | rd (5) | 1101111 |
    ///
    /// Writes the link value `PC + 1` into rd, then jumps to
    /// `PC + imm/4` (the 21-bit immediate is a byte offset; the PC is an
    /// instruction index). Negative targets wrap by the program length in
    /// tolerant mode.
    pub(in super::super) fn exec_jal(&mut self, word: u32) -> usize {
        let rd = decode::rd(word);
        if !self.check_regs(&[rd]) {
            return self.pc + 1;
        }

        self.set_reg(rd, (self.pc as u32).wrapping_add(1));

        let target = self.pc as i64 + (decode::imm_j(word) / 4) as i64;
        self.clamp_target(target)
    }

    /// Execute JALR (opcode 1100111, funct3 0), returning the next PC
    ///
    /// Writes the link value `PC + 1` into rd, then jumps to
    /// `(rs1 + sign_extend(imm)) & ~1`, taken modulo the program length.
    pub(in super::super) fn exec_jalr(&mut self, word: u32) -> usize {
        let rd = decode::rd(word);
        let rs1 = decode::rs1(word);
        if !self.check_regs(&[rd, rs1]) {
            return self.pc + 1;
        }
        if decode::funct3(word) != 0 {
            log::warn!(
                "Unknown JALR funct3 {} at PC={}",
                decode::funct3(word),
                self.pc
            );
            return self.pc + 1;
        }

        let target = self.reg(rs1).wrapping_add(decode::imm_i(word) as u32) & !1;
        self.set_reg(rd, (self.pc as u32).wrapping_add(1));

        self.clamp_target(target as i64)
    }
}
