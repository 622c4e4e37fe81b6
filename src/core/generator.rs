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

//! RV32EM test-program generation
//!
//! Field-level encoders for every RV32EM format plus a seeded generator
//! that synthesizes comparison programs. Generated programs keep x0..x2
//! out of destination fields: x0 is hardwired, and x2 is reserved as the
//! software stack pointer by the translator's multiply/divide expansions.
//!
//! The encoders are also the building blocks the test suites use to
//! assemble programs without hand-packing bit fields.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::riscv::decode::{
    OPCODE_AUIPC, OPCODE_BRANCH, OPCODE_JAL, OPCODE_JALR, OPCODE_LOAD, OPCODE_LUI, OPCODE_OP,
    OPCODE_OP_IMM, OPCODE_STORE,
};

/// Encode an R-type instruction: | funct7 | rs2 | rs1 | funct3 | rd | opcode |
pub fn encode_r(funct7: u32, rs2: u8, rs1: u8, funct3: u32, rd: u8) -> u32 {
    (funct7 & 0x7F) << 25
        | ((rs2 as u32) & 0x1F) << 20
        | ((rs1 as u32) & 0x1F) << 15
        | (funct3 & 0x7) << 12
        | ((rd as u32) & 0x1F) << 7
        | OPCODE_OP
}

/// Encode an I-type instruction: | imm[11:0] | rs1 | funct3 | rd | opcode |
pub fn encode_i(opcode: u32, imm: i32, rs1: u8, funct3: u32, rd: u8) -> u32 {
    ((imm as u32) & 0xFFF) << 20
        | ((rs1 as u32) & 0x1F) << 15
        | (funct3 & 0x7) << 12
        | ((rd as u32) & 0x1F) << 7
        | (opcode & 0x7F)
}

/// Encode an S-type instruction: | imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | 0100011 |
pub fn encode_s(imm: i32, rs2: u8, rs1: u8, funct3: u32) -> u32 {
    let imm = (imm as u32) & 0xFFF;
    (imm >> 5) << 25
        | ((rs2 as u32) & 0x1F) << 20
        | ((rs1 as u32) & 0x1F) << 15
        | (funct3 & 0x7) << 12
        | (imm & 0x1F) << 7
        | OPCODE_STORE
}

/// Encode a B-type instruction from a byte offset:
/// | imm[12|10:5] | rs2 | rs1 | funct3 | imm[4:1|11] | 1100011 |
pub fn encode_b(imm: i32, rs2: u8, rs1: u8, funct3: u32) -> u32 {
    let imm = (imm as u32) & 0x1FFF;
    ((imm >> 12) & 0x1) << 31
        | ((imm >> 5) & 0x3F) << 25
        | ((rs2 as u32) & 0x1F) << 20
        | ((rs1 as u32) & 0x1F) << 15
        | (funct3 & 0x7) << 12
        | ((imm >> 1) & 0xF) << 8
        | ((imm >> 11) & 0x1) << 7
        | OPCODE_BRANCH
}

/// Encode a U-type instruction from the 20-bit upper immediate
pub fn encode_u(opcode: u32, imm20: u32, rd: u8) -> u32 {
    (imm20 & 0xF_FFFF) << 12 | ((rd as u32) & 0x1F) << 7 | (opcode & 0x7F)
}

/// Encode JAL from a byte offset: | imm[20|10:1|11|19:12] | rd | 1101111 |
pub fn encode_j(imm: i32, rd: u8) -> u32 {
    let imm = (imm as u32) & 0x1F_FFFF;
    ((imm >> 20) & 0x1) << 31
        | ((imm >> 1) & 0x3FF) << 21
        | ((imm >> 11) & 0x1) << 20
        | ((imm >> 12) & 0xFF) << 12
        | ((rd as u32) & 0x1F) << 7
        | OPCODE_JAL
}

/// The R-type and M-extension operations the generator draws from,
/// as `(funct7, funct3)` selectors
const R_OPERATIONS: &[(u32, u32)] = &[
    (0x00, 0x0), // add
    (0x20, 0x0), // sub
    (0x00, 0x1), // sll
    (0x00, 0x2), // slt
    (0x00, 0x3), // sltu
    (0x00, 0x4), // xor
    (0x00, 0x5), // srl
    (0x20, 0x5), // sra
    (0x00, 0x6), // or
    (0x00, 0x7), // and
];

const M_OPERATIONS: &[u32] = &[0x0, 0x4, 0x5, 0x6, 0x7]; // mul, div, divu, rem, remu

const I_ALU_OPERATIONS: &[u32] = &[0x0, 0x2, 0x3, 0x4, 0x6, 0x7]; // addi..andi

const B_OPERATIONS: &[u32] = &[0x0, 0x1, 0x4, 0x5, 0x6, 0x7]; // beq..bgeu

/// How many words of each category a generated program carries
///
/// The program comes out in this order: R-type, I-type, upper
/// immediates, branches, jumps, memory, and a final `jalr x1, 0(x5)`.
/// Branches and jumps use short forward offsets so every path makes
/// progress toward the end of the program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramMix {
    pub r_type: usize,
    pub i_type: usize,
    pub upper: usize,
    pub branch: usize,
    pub memory: usize,
    pub jump: usize,
}

impl Default for ProgramMix {
    fn default() -> Self {
        Self {
            r_type: 10,
            i_type: 10,
            upper: 2,
            branch: 2,
            memory: 5,
            jump: 2,
        }
    }
}

impl ProgramMix {
    /// Total program length including the trailing jalr
    pub fn len(&self) -> usize {
        self.r_type + self.i_type + self.upper + self.branch + self.memory + self.jump + 1
    }

    /// A mix is never empty: the trailing jalr is always appended
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Seeded RV32EM program generator
///
/// # Example
///
/// ```
/// use rvbitty::core::generator::{ProgramGenerator, ProgramMix};
///
/// let mix = ProgramMix::default();
/// let mut gen = ProgramGenerator::new(42);
/// let program = gen.generate(mix, 64);
/// assert_eq!(program.len(), mix.len());
///
/// let again = ProgramGenerator::new(42).generate(mix, 64);
/// assert_eq!(program, again);
/// ```
pub struct ProgramGenerator {
    rng: StdRng,
}

impl ProgramGenerator {
    /// Create a generator for the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a destination register, avoiding x0 (hardwired), x1 and x2
    /// (link and stack conventions)
    fn pick_rd(&mut self) -> u8 {
        self.rng.gen_range(3..=15)
    }

    fn pick_rs(&mut self) -> u8 {
        self.rng.gen_range(3..=15)
    }

    /// One random base R-type word (no M extension)
    pub fn gen_base_r_type(&mut self) -> u32 {
        let (rd, rs1, rs2) = (self.pick_rd(), self.pick_rs(), self.pick_rs());
        let (funct7, funct3) = R_OPERATIONS[self.rng.gen_range(0..R_OPERATIONS.len())];
        encode_r(funct7, rs2, rs1, funct3, rd)
    }

    /// One random R-type or M-extension word
    ///
    /// Translated divide loops run once per quotient unit, so programs
    /// mixing these against large register values may only finish under
    /// a generous step cap.
    pub fn gen_r_type(&mut self) -> u32 {
        if self.rng.gen_bool(0.3) {
            let (rd, rs1, rs2) = (self.pick_rd(), self.pick_rs(), self.pick_rs());
            let funct3 = M_OPERATIONS[self.rng.gen_range(0..M_OPERATIONS.len())];
            encode_r(0x01, rs2, rs1, funct3, rd)
        } else {
            self.gen_base_r_type()
        }
    }

    /// One random I-type ALU or shift-immediate word
    pub fn gen_i_type(&mut self) -> u32 {
        let (rd, rs1) = (self.pick_rd(), self.pick_rs());
        if self.rng.gen_bool(0.25) {
            // Shift immediate
            let shamt = self.rng.gen_range(0..32);
            let (funct7, funct3) = match self.rng.gen_range(0..3) {
                0 => (0x00, 0x1), // slli
                1 => (0x00, 0x5), // srli
                _ => (0x20, 0x5), // srai
            };
            encode_i(OPCODE_OP_IMM, ((funct7 << 5) | shamt) as i32, rs1, funct3, rd)
        } else {
            let funct3 = I_ALU_OPERATIONS[self.rng.gen_range(0..I_ALU_OPERATIONS.len())];
            let imm = self.rng.gen_range(-2048..=2047);
            encode_i(OPCODE_OP_IMM, imm, rs1, funct3, rd)
        }
    }

    /// One random word-sized load/store pair candidate
    ///
    /// Addresses come from register values, so generated memory
    /// instructions use a zero offset and rely on the seeded register
    /// pattern (`Ri = 10·i`) for in-range, word-aligned indices.
    pub fn gen_mem(&mut self, memory_size: usize) -> u32 {
        let _ = memory_size;
        // Even base registers keep the seeded addresses (Ri = 10·i)
        // word-aligned for sw
        let rs1 = self.rng.gen_range(2..=7) * 2;
        if self.rng.gen_bool(0.5) {
            encode_i(OPCODE_LOAD, 0, rs1, 0x2, self.pick_rd()) // lw
        } else {
            encode_s(0, self.pick_rs(), rs1, 0x2) // sw
        }
    }

    /// One random U-type word (LUI or AUIPC)
    pub fn gen_u_type(&mut self) -> u32 {
        let opcode = if self.rng.gen_bool(0.5) {
            OPCODE_LUI
        } else {
            OPCODE_AUIPC
        };
        encode_u(opcode, self.rng.gen_range(0..=0xF_FFFF), self.pick_rd())
    }

    /// One random conditional branch skipping the next instruction
    ///
    /// The fixed +8 byte offset keeps both outcomes moving forward, so
    /// generated programs always terminate.
    pub fn gen_branch(&mut self) -> u32 {
        let funct3 = B_OPERATIONS[self.rng.gen_range(0..B_OPERATIONS.len())];
        encode_b(8, self.pick_rs(), self.pick_rs(), funct3)
    }

    /// One JAL skipping the next instruction, linking into a free register
    pub fn gen_jal(&mut self) -> u32 {
        encode_j(8, self.pick_rd())
    }

    /// The unconditional trailing jump: `jalr x1, 0(x5)`
    pub fn gen_trailing_jalr(&mut self) -> u32 {
        encode_i(OPCODE_JALR, 0, 5, 0x0, 1)
    }

    /// Generate a full program with the given instruction mix, closed by
    /// the trailing `jalr x1, 0(x5)`
    pub fn generate(&mut self, mix: ProgramMix, memory_size: usize) -> Vec<u32> {
        let mut program = Vec::with_capacity(mix.len());
        program.extend((0..mix.r_type).map(|_| self.gen_r_type()));
        program.extend((0..mix.i_type).map(|_| self.gen_i_type()));
        program.extend((0..mix.upper).map(|_| self.gen_u_type()));
        // Control transfers sit ahead of the memory block so their
        // forward targets stay inside the program
        program.extend((0..mix.branch).map(|_| self.gen_branch()));
        program.extend((0..mix.jump).map(|_| self.gen_jal()));
        program.extend((0..mix.memory).map(|_| self.gen_mem(memory_size)));
        let jalr = self.gen_trailing_jalr();
        program.push(jalr);
        program
    }
}

/// Format a word the way the generator files spell it: grouped binary
/// with underscores between fields
///
/// ```
/// use rvbitty::core::generator::format_binary_literal;
///
/// assert_eq!(
///     format_binary_literal(0x0070_0293),
///     "0b000000000111_00000_000_00101_0010011"
/// );
/// ```
pub fn format_binary_literal(word: u32) -> String {
    format!(
        "0b{:012b}_{:05b}_{:03b}_{:05b}_{:07b}",
        word >> 20,
        (word >> 15) & 0x1F,
        (word >> 12) & 0x7,
        (word >> 7) & 0x1F,
        word & 0x7F
    )
}
