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
    // === R-type ALU instructions (opcode 0110011) ===

    /// Execute an R-type register/register operation
    ///
    /// Format: | funct7 (7) | rs2 (5) | rs1 (5) | funct3 (3) | rd (5) | 0110011 |
    ///
    /// Selection is `(funct7, funct3)`. funct7 = 0000001 routes to the
    /// M extension. All results are masked to 32 bits; signed operations
    /// take the two's-complement view of the operands.
    pub(in super::super) fn exec_op(&mut self, word: u32) {
        if decode::funct7(word) == decode::FUNCT7_MULDIV {
            self.exec_muldiv(word);
            return;
        }

        let rd = decode::rd(word);
        let rs1 = decode::rs1(word);
        let rs2 = decode::rs2(word);
        if !self.check_regs(&[rd, rs1, rs2]) {
            return;
        }

        let a = self.reg(rs1);
        let b = self.reg(rs2);

        let result = match (decode::funct7(word), decode::funct3(word)) {
            (0x00, 0x0) => a.wrapping_add(b),                      // ADD
            (0x20, 0x0) => a.wrapping_sub(b),                      // SUB
            (0x00, 0x1) => a.wrapping_shl(b & 0x1F),               // SLL
            (0x00, 0x2) => ((a as i32) < (b as i32)) as u32,       // SLT
            (0x00, 0x3) => (a < b) as u32,                         // SLTU
            (0x00, 0x4) => a ^ b,                                  // XOR
            (0x00, 0x5) => a.wrapping_shr(b & 0x1F),               // SRL
            (0x20, 0x5) => ((a as i32) >> (b & 0x1F)) as u32,      // SRA
            (0x00, 0x6) => a | b,                                  // OR
            (0x00, 0x7) => a & b,                                  // AND
            (f7, f3) => {
                log::warn!(
                    "Unknown R-type funct7/funct3 {:#04X}/{} at PC={}",
                    f7,
                    f3,
                    self.pc
                );
                return;
            }
        };

        self.set_reg(rd, result);
    }

    // === I-type immediate ALU instructions (opcode 0010011) ===

    /// Execute an I-type register/immediate operation
    ///
    /// Format: | imm[11:0] (12) | rs1 (5) | funct3 (3) | rd (5) | 0010011 |
    ///
    /// The 12-bit immediate is sign-extended. SRLI and SRAI share
    /// funct3 = 101 and are distinguished by bit 30 of the instruction.
    pub(in super::super) fn exec_op_imm(&mut self, word: u32) {
        let rd = decode::rd(word);
        let rs1 = decode::rs1(word);
        if !self.check_regs(&[rd, rs1]) {
            return;
        }

        let a = self.reg(rs1);
        let imm = decode::imm_i(word);

        let result = match decode::funct3(word) {
            0x0 => a.wrapping_add(imm as u32),                     // ADDI
            0x1 => a.wrapping_shl(decode::shamt(word)),            // SLLI
            0x2 => ((a as i32) < imm) as u32,                      // SLTI
            0x3 => (a < imm as u32) as u32,                        // SLTIU
            0x4 => a ^ imm as u32,                                 // XORI
            0x5 => {
                // Bit 30 separates SRLI from SRAI
                let shamt = decode::shamt(word);
                match decode::funct7(word) {
                    0x00 => a.wrapping_shr(shamt),                 // SRLI
                    0x20 => ((a as i32) >> shamt) as u32,          // SRAI
                    f7 => {
                        log::warn!(
                            "Unknown shift funct7 {:#04X} at PC={}",
                            f7,
                            self.pc
                        );
                        return;
                    }
                }
            }
            0x6 => a | imm as u32,                                 // ORI
            0x7 => a & imm as u32,                                 // ANDI
            _ => unreachable!("funct3 is a 3-bit field"),
        };

        self.set_reg(rd, result);
    }
}
