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
    /// Execute an M-extension operation (opcode 0110011, funct7 0000001)
    ///
    /// Format: | 0000001 | rs2 (5) | rs1 (5) | funct3 (3) | rd (5) | 0110011 |
    ///
    /// Division edge cases follow the RISC-V convention:
    /// - divide by zero: quotient all ones, remainder = dividend
    ///   (signed and unsigned alike)
    /// - signed overflow (`INT_MIN / -1`): quotient = dividend,
    ///   remainder = 0
    ///
    /// Quotients truncate toward zero, so
    /// `(v1 / v2) * v2 + (v1 % v2) == v1` holds whenever defined.
    pub(in super::super) fn exec_muldiv(&mut self, word: u32) {
        let rd = decode::rd(word);
        let rs1 = decode::rs1(word);
        let rs2 = decode::rs2(word);
        if !self.check_regs(&[rd, rs1, rs2]) {
            return;
        }

        let v1 = self.reg(rs1);
        let v2 = self.reg(rs2);
        let s1 = v1 as i32;
        let s2 = v2 as i32;

        let result = match decode::funct3(word) {
            // MUL: low 32 bits of the product (identical for the
            // signed and unsigned readings)
            0x0 => s1.wrapping_mul(s2) as u32,

            // MULH: high 32 bits of signed × signed
            0x1 => (((s1 as i64) * (s2 as i64)) >> 32) as u32,

            // MULHSU: high 32 bits of signed × unsigned
            0x2 => (((s1 as i64) * (v2 as i64)) >> 32) as u32,

            // MULHU: high 32 bits of unsigned × unsigned
            0x3 => (((v1 as u64) * (v2 as u64)) >> 32) as u32,

            // DIV
            0x4 => {
                if s2 == 0 {
                    0xFFFF_FFFF
                } else {
                    s1.wrapping_div(s2) as u32
                }
            }

            // DIVU
            0x5 => {
                if v2 == 0 {
                    0xFFFF_FFFF
                } else {
                    v1 / v2
                }
            }

            // REM
            0x6 => {
                if s2 == 0 {
                    v1
                } else {
                    s1.wrapping_rem(s2) as u32
                }
            }

            // REMU
            0x7 => {
                if v2 == 0 {
                    v1
                } else {
                    v1 % v2
                }
            }

            _ => unreachable!("funct3 is a 3-bit field"),
        };

        self.set_reg(rd, result);
    }
}
