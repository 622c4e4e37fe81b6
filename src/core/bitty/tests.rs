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

use super::*;
use crate::core::config::SimConfig;
use crate::core::error::SimError;
use crate::core::memory::SharedMemory;

fn program(instrs: &[BittyInstr]) -> Vec<u16> {
    instrs.iter().map(|i| i.encode()).collect()
}

#[test]
fn test_initialization_and_seed() {
    let mut cpu = BittyCpu::new();
    assert_eq!(cpu.pc(), 0);
    assert_eq!(cpu.d_out(), 0);
    cpu.seed_registers();
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(7), 70);
}

#[test]
fn test_r0_is_writable() {
    // The translator relies on r0 as scratch space
    let mut cpu = BittyCpu::new();
    cpu.set_reg(0, 123);
    assert_eq!(cpu.reg(0), 123);
}

#[test]
fn test_alu_writes_rx_and_d_out() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 30);
    cpu.set_reg(2, 12);
    cpu.load_program(program(&[BittyInstr::Alu { op: AluOp::Add, rx: 1, ry: 2 }]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 42);
    assert_eq!(cpu.d_out(), 42);
    assert_eq!(cpu.pc(), 1);
}

#[test]
fn test_imm_alu_sign_extends() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 10);
    cpu.load_program(program(&[BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: -1 }]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 9);
}

#[test]
fn test_shift_masks_amount() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 1);
    cpu.set_reg(2, 33); // masked to 1
    cpu.load_program(program(&[BittyInstr::Alu { op: AluOp::Shl, rx: 1, ry: 2 }]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 2);
}

#[test]
fn test_shrs_is_arithmetic() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 0x8000_0000);
    cpu.load_program(program(&[BittyInstr::AluImm { op: AluOp::Shrs, rx: 1, imm: 4 }]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 0xF800_0000);
}

#[test]
fn test_compare_writes_only_d_out() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 5);
    cpu.set_reg(2, 9);
    cpu.load_program(program(&[
        BittyInstr::Alu { op: AluOp::Cmp, rx: 1, ry: 2 },
        BittyInstr::Alu { op: AluOp::Cmp, rx: 2, ry: 1 },
    ]));
    cpu.step(&mut mem);
    assert_eq!(cpu.d_out(), 2, "5 < 9");
    assert_eq!(cpu.reg(1), 5, "compare must not write rx");
    cpu.step(&mut mem);
    assert_eq!(cpu.d_out(), 1, "9 > 5");
}

#[test]
fn test_signed_compare() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 0xFFFF_FFFF); // -1 signed
    cpu.set_reg(2, 1);
    cpu.load_program(program(&[
        BittyInstr::Alu { op: AluOp::Cmps, rx: 1, ry: 2 },
        BittyInstr::Alu { op: AluOp::Cmp, rx: 1, ry: 2 },
    ]));
    cpu.step(&mut mem);
    assert_eq!(cpu.d_out(), 2, "-1 < 1 signed");
    cpu.step(&mut mem);
    assert_eq!(cpu.d_out(), 1, "0xFFFFFFFF > 1 unsigned");
}

#[test]
fn test_branch_taken_and_not_taken() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 7);
    cpu.set_reg(2, 7);
    cpu.load_program(program(&[
        BittyInstr::Alu { op: AluOp::Cmp, rx: 1, ry: 2 },     // d_out = 0
        BittyInstr::Branch { cond: Cond::Equal, imm: 4 },     // +2 instructions
        BittyInstr::AluImm { op: AluOp::Add, rx: 3, imm: 1 }, // skipped
        BittyInstr::AluImm { op: AluOp::Add, rx: 4, imm: 1 },
    ]));
    cpu.step(&mut mem);
    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 3, "taken branch lands at branch + imm/2");
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(3), 0);
    assert_eq!(cpu.reg(4), 1);
}

#[test]
fn test_branch_wrong_condition_falls_through() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 9);
    cpu.set_reg(2, 7);
    cpu.load_program(program(&[
        BittyInstr::Alu { op: AluOp::Cmp, rx: 1, ry: 2 },  // d_out = 1
        BittyInstr::Branch { cond: Cond::Equal, imm: 4 },
        BittyInstr::AluImm { op: AluOp::Add, rx: 3, imm: 1 },
    ]));
    cpu.step(&mut mem);
    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 2, "condition 0 does not match d_out 1");
}

#[test]
fn test_backward_branch() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 3);
    cpu.load_program(program(&[
        BittyInstr::AluImm { op: AluOp::Sub, rx: 1, imm: 1 },
        BittyInstr::AluImm { op: AluOp::Cmp, rx: 1, imm: 0 },
        BittyInstr::Branch { cond: Cond::Greater, imm: -4 }, // back to the sub
    ]));
    let count = cpu.run(&mut mem, 100).unwrap();
    assert_eq!(cpu.reg(1), 0);
    // Three decrement passes, final one falls through
    assert_eq!(count, 9);
}

#[test]
fn test_quirk_fallthrough_never_branches() {
    let mut config = SimConfig::default();
    config.quirk_unconditional_fallthrough = true;
    let mut cpu = BittyCpu::with_config(&config);
    let mut mem = SharedMemory::new(8);
    cpu.load_program(program(&[
        BittyInstr::AluImm { op: AluOp::Cmp, rx: 0, imm: 0 }, // d_out = 0
        BittyInstr::Branch { cond: Cond::Equal, imm: 4 },
    ]));
    cpu.step(&mut mem);
    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 2, "quirk variant always falls through");
}

#[test]
fn test_gtpc_stores_pc_plus_one() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.load_program(program(&[
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 0 },
        BittyInstr::GetPc { rx: 5 },
    ]));
    cpu.step(&mut mem);
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(5), 2);
    assert_eq!(cpu.pc(), 2);
}

#[test]
fn test_stpc_jumps_to_register_index() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(3, 3);
    cpu.load_program(program(&[
        BittyInstr::SetPc { rx: 3 },
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 }, // skipped
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 }, // skipped
        BittyInstr::AluImm { op: AluOp::Add, rx: 2, imm: 1 },
    ]));
    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 3);
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 0);
    assert_eq!(cpu.reg(2), 1);
}

#[test]
fn test_load_store() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    mem.write(5, 0xCAFE_F00D).unwrap();
    cpu.set_reg(2, 5);
    cpu.set_reg(3, 0x1111_2222);
    cpu.load_program(program(&[
        BittyInstr::Load { rx: 1, ry: 2 },
        BittyInstr::Store { rx: 3, ry: 2 },
    ]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 0xCAFE_F00D);
    cpu.step(&mut mem);
    assert_eq!(mem.read(5).unwrap(), 0x1111_2222);
}

#[test]
fn test_load_wraps_out_of_range_address() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    mem.write(1, 77).unwrap();
    cpu.set_reg(2, 9); // wraps to 1
    cpu.load_program(program(&[BittyInstr::Load { rx: 1, ry: 2 }]));
    cpu.step(&mut mem);
    assert_eq!(cpu.reg(1), 77);
}

#[test]
fn test_halts_at_end_of_program() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.load_program(program(&[BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 }]));
    assert_eq!(cpu.state(), RunState::Running);
    cpu.step(&mut mem);
    assert_eq!(cpu.state(), RunState::Halted);
}

#[test]
fn test_halts_on_decoder_error() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    // ALU selector 0xF is undefined
    cpu.load_program(vec![0x003C]);
    cpu.step(&mut mem);
    assert_eq!(cpu.state(), RunState::Halted);
}

#[test]
fn test_run_step_cap() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.set_reg(1, 1);
    // Infinite loop: cmpi r1,1 (equal) then branch back to itself
    cpu.load_program(program(&[
        BittyInstr::AluImm { op: AluOp::Cmp, rx: 1, imm: 1 },
        BittyInstr::Branch { cond: Cond::Equal, imm: -2 },
    ]));
    let result = cpu.run(&mut mem, 50);
    assert!(matches!(result, Err(SimError::StepLimitExceeded { limit: 50 })));
}

#[test]
fn test_run_to_target_pc() {
    let mut cpu = BittyCpu::new();
    let mut mem = SharedMemory::new(8);
    cpu.load_program(program(&[
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 },
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 },
        BittyInstr::AluImm { op: AluOp::Add, rx: 1, imm: 1 },
    ]));
    let count = cpu.run_to(&mut mem, 2, 100).unwrap();
    assert_eq!(count, 2);
    assert_eq!(cpu.pc(), 2);
    assert_eq!(cpu.reg(1), 2);
}
