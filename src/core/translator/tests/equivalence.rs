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

use super::harness::{assert_memory_matches, co_run};
use crate::core::generator::{encode_b, encode_i, encode_j, encode_r, encode_s, encode_u};
use crate::core::riscv::decode::{OPCODE_AUIPC, OPCODE_JALR, OPCODE_LOAD, OPCODE_LUI, OPCODE_OP_IMM};

/// The base R-type operations as `(funct7, funct3)` selectors
const R_OPS: &[(u32, u32)] = &[
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

/// Every R-type opcode across the four aliasing shapes of the
/// two-address case analysis
#[test]
fn test_rtype_all_opcodes_all_alias_shapes() {
    for &(funct7, funct3) in R_OPS {
        // rd, rs1, rs2 all distinct
        co_run(&[encode_r(funct7, 6, 5, funct3, 4)], &[]);
        // rd == rs1
        co_run(&[encode_r(funct7, 6, 4, funct3, 4)], &[]);
        // rd == rs2
        co_run(&[encode_r(funct7, 4, 5, funct3, 4)], &[]);
        // rd == rs1 == rs2
        co_run(&[encode_r(funct7, 4, 4, funct3, 4)], &[]);
    }
}

#[test]
fn test_rtype_scenario_add() {
    let run = co_run(
        &[encode_r(0x00, 6, 5, 0x0, 4)],
        &[(5, 50), (6, 60)],
    );
    assert_eq!(run.rv.reg(4), 110);
    assert_eq!(run.bitty.reg(4), 110);
}

#[test]
fn test_rtype_with_negative_operands() {
    for &(funct7, funct3) in R_OPS {
        co_run(
            &[encode_r(funct7, 6, 5, funct3, 4)],
            &[(5, 0xFFFF_FF85), (6, 3)],
        );
        co_run(
            &[encode_r(funct7, 6, 5, funct3, 4)],
            &[(5, 7), (6, 0x8000_0001)],
        );
    }
}

#[test]
fn test_slt_scenario_both_directions() {
    let run = co_run(&[encode_r(0x00, 4, 5, 0x2, 3)], &[(5, 10), (4, 20)]);
    assert_eq!(run.rv.reg(3), 1);

    let run = co_run(&[encode_r(0x00, 5, 4, 0x2, 3)], &[(5, 10), (4, 20)]);
    assert_eq!(run.rv.reg(3), 0);
}

#[test]
fn test_rtype_x0_source_and_destination() {
    // x0 as rs2, as rs1, and as rd
    co_run(&[encode_r(0x00, 0, 5, 0x0, 4)], &[]);
    co_run(&[encode_r(0x20, 5, 0, 0x0, 4)], &[]);
    co_run(&[encode_r(0x00, 6, 5, 0x0, 0)], &[]);
}

#[test]
fn test_itype_alu_immediate_range() {
    for funct3 in [0x0u32, 0x4, 0x6, 0x7] {
        for imm in [-2048, -33, -1, 0, 1, 31, 100, 2047] {
            // rd != rs1 and rd == rs1
            co_run(&[encode_i(OPCODE_OP_IMM, imm, 5, funct3, 4)], &[]);
            co_run(&[encode_i(OPCODE_OP_IMM, imm, 4, funct3, 4)], &[]);
        }
    }
}

#[test]
fn test_itype_addi_scenario() {
    // ADDI x5, x0, 7, the first concrete comparison scenario
    let run = co_run(&[0x0070_0293], &[]);
    assert_eq!(run.rv.reg(5), 7);
    assert_eq!(run.bitty.reg(5), 7);
    for reg in 3..16u8 {
        if reg != 5 {
            assert_eq!(run.rv.reg(reg), (reg as u32) * 10, "x{} disturbed", reg);
        }
    }
}

#[test]
fn test_slti_sltiu_shapes() {
    for funct3 in [0x2u32, 0x3] {
        for imm in [-2048, -1, 0, 45, 2047] {
            co_run(&[encode_i(OPCODE_OP_IMM, imm, 5, funct3, 4)], &[]);
            co_run(&[encode_i(OPCODE_OP_IMM, imm, 4, funct3, 4)], &[]);
            // rs1 = x0
            co_run(&[encode_i(OPCODE_OP_IMM, imm, 0, funct3, 4)], &[]);
        }
    }
}

#[test]
fn test_shift_immediates() {
    for (funct7, funct3) in [(0x00u32, 0x1u32), (0x00, 0x5), (0x20, 0x5)] {
        for shamt in [0, 1, 13, 31] {
            let imm = ((funct7 << 5) | shamt) as i32;
            co_run(
                &[encode_i(OPCODE_OP_IMM, imm, 5, funct3, 4)],
                &[(5, 0xF000_0003)],
            );
            co_run(
                &[encode_i(OPCODE_OP_IMM, imm, 4, funct3, 4)],
                &[(4, 0x8000_0001)],
            );
        }
    }
}

#[test]
fn test_lui_auipc() {
    for imm20 in [0u32, 1, 0x12345, 0x80000, 0xFFFFF] {
        let run = co_run(&[encode_u(OPCODE_LUI, imm20, 5)], &[]);
        assert_eq!(run.rv.reg(5), imm20 << 12);
    }

    // AUIPC at index 2 (after two nops)
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let run = co_run(&[nop, nop, encode_u(OPCODE_AUIPC, 0x00010, 5)], &[]);
    assert_eq!(run.rv.reg(5), 0x0001_0000 + 2);
}

#[test]
fn test_loads_all_widths() {
    // Base register x5 = 50 points into the patterned memory
    for funct3 in [0x0u32, 0x1, 0x2, 0x4, 0x5] {
        let run = co_run(&[encode_i(OPCODE_LOAD, 0, 5, funct3, 4)], &[]);
        assert_memory_matches(&run);
    }
}

#[test]
fn test_load_with_offset() {
    for imm in [1, 4, -2] {
        let run = co_run(&[encode_i(OPCODE_LOAD, imm, 5, 0x2, 4)], &[]);
        assert_memory_matches(&run);
    }
    // Base x0 with an absolute offset
    let run = co_run(&[encode_i(OPCODE_LOAD, 9, 0, 0x2, 4)], &[]);
    assert_memory_matches(&run);
}

#[test]
fn test_load_rd_aliases_base() {
    let run = co_run(&[encode_i(OPCODE_LOAD, 0, 4, 0x2, 4)], &[]);
    assert_memory_matches(&run);
}

#[test]
fn test_sw_equivalence() {
    // sw x6, 0(x4): address 40
    let run = co_run(&[encode_s(0, 6, 4, 0x2)], &[]);
    assert_memory_matches(&run);

    // With offset, with x0 source, with aliased base/source
    let run = co_run(&[encode_s(4, 6, 4, 0x2)], &[]);
    assert_memory_matches(&run);
    let run = co_run(&[encode_s(4, 0, 4, 0x2)], &[]);
    assert_memory_matches(&run);
    let run = co_run(&[encode_s(0, 4, 4, 0x2)], &[]);
    assert_memory_matches(&run);
}

#[test]
fn test_store_then_load_round_trip() {
    // sw x6, 0(x4); lw x7, 0(x4)
    let run = co_run(&[encode_s(0, 6, 4, 0x2), encode_i(OPCODE_LOAD, 0, 4, 0x2, 7)], &[]);
    assert_eq!(run.rv.reg(7), 60);
    assert_memory_matches(&run);
}

#[test]
fn test_branches_taken_and_not() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // Scenario: BEQ x1, x1, +8 skips one instruction
    let run = co_run(&[encode_b(8, 1, 1, 0x0), marker(3), marker(4), nop], &[]);
    assert_eq!(run.rv.reg(3), 30, "skipped marker never runs");
    assert_eq!(run.rv.reg(4), 1);

    // Each branch kind, both outcomes
    let cases: &[(u32, u32, u32, bool)] = &[
        (0x0, 5, 5, true),   // beq equal
        (0x0, 5, 6, false),  // beq unequal
        (0x1, 5, 6, true),   // bne
        (0x1, 5, 5, false),  // bne equal
        (0x4, 5, 50, true),  // blt
        (0x4, 50, 5, false), // blt
        (0x5, 50, 5, true),  // bge
        (0x5, 5, 50, false), // bge
        (0x6, 5, 50, true),  // bltu
        (0x7, 50, 5, true),  // bgeu
    ];
    for &(funct3, a, b, taken) in cases {
        let run = co_run(
            &[encode_b(8, 6, 5, funct3), marker(3), marker(4), nop],
            &[(5, a), (6, b)],
        );
        // A taken branch skips marker(3), leaving the seeded 30
        let expected = if taken { 30 } else { 1 };
        assert_eq!(run.rv.reg(3), expected, "funct3 {:#x} a={} b={}", funct3, a, b);
    }
}

#[test]
fn test_branch_signed_vs_unsigned_comparison() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // -1 vs 1: blt takes it, bltu does not
    let program = |f3: u32| [encode_b(8, 6, 5, f3), marker(3), marker(4), nop];
    let run = co_run(&program(0x4), &[(5, 0xFFFF_FFFF), (6, 1)]);
    assert_eq!(run.rv.reg(3), 30, "blt takes the branch");
    let run = co_run(&program(0x6), &[(5, 0xFFFF_FFFF), (6, 1)]);
    assert_eq!(run.rv.reg(3), 1, "bltu falls through");
}

#[test]
fn test_backward_branch_loop() {
    // x4 counts down from 3: addi x4, x4, -1; bne x4, x0, -4
    let program = [
        encode_i(OPCODE_OP_IMM, -1, 4, 0x0, 4),
        encode_b(-4, 0, 4, 0x1),
    ];
    let run = co_run(&program, &[(4, 3)]);
    assert_eq!(run.rv.reg(4), 0);
}

#[test]
fn test_jal_scenario() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // JAL x1, +16 at index 2 → link 3, lands at index 6
    let program = [
        nop,
        nop,
        encode_j(16, 1),
        marker(3), // skipped
        marker(4), // skipped
        marker(5), // skipped
        marker(6), // landing site
        nop,
    ];
    let run = co_run(&program, &[]);
    assert_eq!(run.rv.reg(1), 3, "link value is PC_R + 1");
    assert_eq!(run.rv.reg(3), 30, "skipped");
    assert_eq!(run.rv.reg(6), 1, "landing site executed");
}

#[test]
fn test_jal_x0_is_plain_jump() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);
    let run = co_run(&[encode_j(8, 0), marker(3), nop], &[]);
    assert_eq!(run.rv.reg(3), 30, "jumped over");
}

#[test]
fn test_jalr_call_and_return() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // A call at index 1 links x1 = 2; the subroutine at 4 returns
    // through the link register
    let program = [
        nop,
        encode_j(12, 1),                     // x1 = 2, pc → 4
        marker(9),                           // return lands here
        encode_j(8, 0),                      // pc → 5, skipping the callee
        encode_i(OPCODE_JALR, 0, 1, 0x0, 0), // jalr x0, x1, 0 → pc = 2
        nop,
    ];
    let run = co_run(&program, &[]);
    assert_eq!(run.rv.reg(1), 2);
    assert_eq!(run.rv.reg(9), 1, "returned to the link index");
    assert_eq!(run.bitty.reg(9), 1);
}

#[test]
fn test_jalr_with_offset_and_link() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // jalr x5, x6, 4 with x6 = 2 jumps to index 6 and links x5 = 1
    let program = [
        encode_i(OPCODE_JALR, 4, 6, 0x0, 5),
        marker(9), // skipped
        nop,
        nop,
        nop,
        nop,
        marker(10), // landing site
        nop,
    ];
    let run = co_run(&program, &[(6, 2)]);
    assert_eq!(run.rv.reg(5), 1, "link value is PC_R + 1");
    assert_eq!(run.rv.reg(9), 90, "skipped marker keeps its seed");
    assert_eq!(run.rv.reg(10), 1);
    assert_eq!(run.bitty.reg(10), 1);
}

#[test]
fn test_jalr_rd_aliases_rs1() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // jalr x5, x5, 0: the target reads rs1 before the link overwrites it
    let program = [
        encode_i(OPCODE_JALR, 0, 5, 0x0, 5),
        nop,
        marker(9),
        nop,
    ];
    let run = co_run(&program, &[(5, 2)]);
    assert_eq!(run.rv.reg(5), 1, "link written after the target computed");
    assert_eq!(run.rv.reg(9), 1);
}

#[test]
fn test_jalr_masks_odd_target() {
    let nop = encode_i(OPCODE_OP_IMM, 0, 0, 0x0, 0);
    let marker = |rd: u8| encode_i(OPCODE_OP_IMM, 1, 0, 0x0, rd);

    // x6 = 3 lands on index 2 once the low bit is cleared
    let program = [
        encode_i(OPCODE_JALR, 0, 6, 0x0, 0),
        nop,
        marker(9),
        nop,
    ];
    let run = co_run(&program, &[(6, 3)]);
    assert_eq!(run.rv.reg(9), 1);
    assert_eq!(run.bitty.reg(9), 1);
}

#[test]
fn test_mixed_program_with_memory() {
    let program = [
        0x0070_0293,                          // addi x5, x0, 7
        encode_r(0x00, 5, 5, 0x0, 6),         // add x6, x5, x5 → 14
        encode_s(0, 6, 4, 0x2),               // sw x6, 0(x4) → mem[40] = 14
        encode_i(OPCODE_LOAD, 0, 4, 0x2, 7),  // lw x7, 0(x4)
        encode_r(0x20, 5, 7, 0x0, 8),         // sub x8, x7, x5 → 7
    ];
    let run = co_run(&program, &[]);
    assert_eq!(run.rv.reg(8), 7);
    assert_eq!(run.rv_mem.read(40).unwrap(), 14);
    assert_memory_matches(&run);
    assert_eq!(run.translator.pc_map().len(), program.len());
}
