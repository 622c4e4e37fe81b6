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

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use rvbitty::core::bitty::{AluOp, BittyInstr};
use rvbitty::core::memory::SharedMemory;
use rvbitty::core::translator::Translator;
use rvbitty::core::{BittyCpu, RvCpu};

fn rv_step_benchmark(c: &mut Criterion) {
    c.bench_function("rv_step_addi", |b| {
        let mut cpu = RvCpu::new();
        let mut mem = SharedMemory::new(64);
        cpu.load_program(vec![0x0070_0293]); // addi x5, x0, 7

        b.iter(|| {
            cpu.set_pc(0);
            cpu.step(black_box(&mut mem));
        });
    });

    c.bench_function("rv_step_mul", |b| {
        let mut cpu = RvCpu::new();
        let mut mem = SharedMemory::new(64);
        cpu.seed_registers();
        // mul x4, x5, x6
        cpu.load_program(vec![0x0262_8233]);

        b.iter(|| {
            cpu.set_pc(0);
            cpu.step(black_box(&mut mem));
        });
    });
}

fn bitty_step_benchmark(c: &mut Criterion) {
    c.bench_function("bitty_step_alu", |b| {
        let mut cpu = BittyCpu::new();
        let mut mem = SharedMemory::new(64);
        cpu.seed_registers();
        cpu.load_program(vec![
            BittyInstr::Alu { op: AluOp::Add, rx: 3, ry: 4 }.encode(),
        ]);

        b.iter(|| {
            cpu.set_pc(0);
            cpu.step(black_box(&mut mem));
        });
    });
}

fn translate_benchmark(c: &mut Criterion) {
    c.bench_function("translate_addi", |b| {
        b.iter(|| {
            let mut translator = Translator::new();
            translator.translate(black_box(0x0070_0293)).unwrap();
            black_box(translator.binary().len())
        });
    });

    c.bench_function("translate_div", |b| {
        // div x4, x5, x6
        let word = 0x0262_C233;
        b.iter(|| {
            let mut translator = Translator::new();
            translator.translate(black_box(word)).unwrap();
            black_box(translator.binary().len())
        });
    });
}

criterion_group!(
    benches,
    rv_step_benchmark,
    bitty_step_benchmark,
    translate_benchmark
);
criterion_main!(benches);
