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

use super::super::*;
use crate::core::generator::{encode_i, encode_r};
use crate::core::riscv::decode::OPCODE_OP_IMM;

#[test]
fn test_cpu_initialization() {
    let cpu = RvCpu::new();
    assert_eq!(cpu.pc(), 0);
    assert_eq!(cpu.reg(0), 0);
    assert!(cpu.finished());
}

#[test]
fn test_register_x0_is_hardwired() {
    let mut cpu = RvCpu::new();
    cpu.set_reg(0, 0xDEAD_BEEF);
    assert_eq!(cpu.reg(0), 0);
}

#[test]
fn test_register_read_write() {
    let mut cpu = RvCpu::new();
    cpu.set_reg(5, 0x1234_5678);
    assert_eq!(cpu.reg(5), 0x1234_5678);
}

#[test]
fn test_seed_registers_pattern() {
    let mut cpu = RvCpu::new();
    cpu.seed_registers();
    assert_eq!(cpu.reg(0), 0);
    for i in 1..16u8 {
        assert_eq!(cpu.reg(i), (i as u32) * 10);
    }
}

#[test]
fn test_fetch_out_of_range_is_nop() {
    let cpu = RvCpu::new();
    assert_eq!(cpu.fetch(), 0);
}

#[test]
fn test_x0_write_via_instruction_is_discarded() {
    let mut cpu = RvCpu::new();
    let mut mem = SharedMemory::new(16);
    // ADDI x0, x0, 7
    cpu.load_program(vec![encode_i(OPCODE_OP_IMM, 7, 0, 0x0, 0)]);
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.pc(), 1);
}

#[test]
fn test_register_selector_out_of_range_advances_pc() {
    let mut cpu = RvCpu::new();
    let mut mem = SharedMemory::new(16);
    // ADD x4, x20, x6: rs1 exceeds the RV32E file
    cpu.load_program(vec![encode_r(0x00, 6, 20, 0x0, 4)]);
    cpu.seed_registers();
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(4), 40, "skipped instruction must not write rd");
    assert_eq!(cpu.pc(), 1);
}

#[test]
fn test_unknown_opcode_advances_pc() {
    let mut cpu = RvCpu::new();
    let mut mem = SharedMemory::new(16);
    cpu.load_program(vec![0xFFFF_FFFF, encode_i(OPCODE_OP_IMM, 1, 0, 0x0, 3)]);
    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 1);
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(3), 1);
}

#[test]
fn test_run_respects_step_cap() {
    let mut cpu = RvCpu::new();
    let mut mem = SharedMemory::new(16);
    // Two instructions, budget of one
    cpu.load_program(vec![
        encode_i(OPCODE_OP_IMM, 1, 0, 0x0, 3),
        encode_i(OPCODE_OP_IMM, 2, 0, 0x0, 4),
    ]);
    let result = cpu.run(&mut mem, 1);
    assert!(matches!(
        result,
        Err(SimError::StepLimitExceeded { limit: 1 })
    ));
}

#[test]
fn test_run_to_completion() {
    let mut cpu = RvCpu::new();
    let mut mem = SharedMemory::new(16);
    cpu.load_program(vec![
        encode_i(OPCODE_OP_IMM, 5, 0, 0x0, 3),
        encode_i(OPCODE_OP_IMM, 6, 3, 0x0, 4),
    ]);
    let count = cpu.run(&mut mem, 100).unwrap();
    assert_eq!(count, 2);
    assert_eq!(cpu.reg(3), 5);
    assert_eq!(cpu.reg(4), 11);
    assert!(cpu.finished());
}
