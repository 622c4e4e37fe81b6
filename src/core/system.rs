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

//! Coordinated co-simulation of the two interpreters
//!
//! [`CoSim`] owns both CPUs, their identically initialized data memories
//! and the translator. One coordinated step executes a single RV32EM
//! instruction, advances Bitty to the PC-mapped index for the new RV32EM
//! PC, and diffs the architectural state. The shared memory is written by
//! exactly one interpreter at a time: each side owns its copy, and the
//! driver never interleaves writes inside one RV32EM instruction
//! boundary.

use std::io::Write;
use std::path::Path;

use super::bitty::BittyCpu;
use super::config::SimConfig;
use super::error::{Result, SimError};
use super::memory::SharedMemory;
use super::report::{ComparisonReport, RunSummary};
use super::riscv::RvCpu;
use super::translator::Translator;

/// Both interpreters, their memories and the translator under one driver
pub struct CoSim {
    config: SimConfig,
    rv: RvCpu,
    bitty: BittyCpu,
    rv_mem: SharedMemory,
    bitty_mem: SharedMemory,
    initial_mem: Vec<u32>,
    translator: Translator,
}

impl CoSim {
    /// Build a co-simulation: identical patterned memories, pattern-seeded
    /// register files, empty programs
    pub fn new(config: SimConfig) -> Self {
        let mut rv_mem = SharedMemory::with_pattern(config.memory_size, config.memory_seed);
        let mut bitty_mem = SharedMemory::with_pattern(config.memory_size, config.memory_seed);
        rv_mem.set_tolerant(config.tolerant_memory);
        bitty_mem.set_tolerant(config.tolerant_memory);
        let initial_mem = rv_mem.cells().to_vec();

        let mut rv = RvCpu::with_config(&config);
        rv.seed_registers();
        let mut bitty = BittyCpu::with_config(&config);
        bitty.seed_registers();

        let mut translator = Translator::new();
        // The dynamic-jump expansion needs an even table base
        translator.set_map_base((config.pc_map_base as u32) & !1);

        Self {
            config,
            rv,
            bitty,
            rv_mem,
            bitty_mem,
            initial_mem,
            translator,
        }
    }

    /// Load the RV32EM program into the RV side
    pub fn load_program(&mut self, program: &[u32]) {
        self.rv.load_program(program.to_vec());
    }

    /// Translate the loaded program, resolve branch offsets, publish the
    /// runtime PC map into both data memories and hand the binary to the
    /// Bitty side
    ///
    /// Returns the number of instructions that had no expansion.
    pub fn translate_program(&mut self) -> usize {
        let program = self.rv.program().to_vec();
        let skipped = self.translator.translate_program(&program);
        self.translator.resolve_branches();

        // Identical tables on both sides keep the memory diff clean; the
        // snapshot refresh keeps them out of the change statistics
        let installed = self
            .translator
            .install_runtime_map(&mut self.rv_mem)
            .and_then(|()| self.translator.install_runtime_map(&mut self.bitty_mem));
        if let Err(e) = installed {
            log::warn!("Runtime PC map not installed, dynamic jumps will misroute: {}", e);
        }
        self.initial_mem = self.rv_mem.cells().to_vec();

        self.bitty.load_program(self.translator.binary().to_vec());
        skipped
    }

    /// Run the coordinated comparison to completion, appending to the
    /// report after every RV32EM instruction
    pub fn run<W: Write>(&mut self, report: &mut ComparisonReport<W>) -> Result<RunSummary> {
        report.header(&self.config)?;
        report.note("\nCoordinated Execution Trace:")?;
        report.note("---------------------------")?;

        let mut summary = RunSummary::default();
        let mut last_register_matches = (16, 16);

        while summary.rv_steps < self.config.step_cap && !self.rv.finished() {
            let pc_before = self.rv.pc();
            let word = self.rv.fetch();
            report.trace_step(summary.rv_steps, pc_before, word)?;

            self.rv.step(&mut self.rv_mem);
            summary.rv_steps += 1;

            let target = self
                .translator
                .pc_map()
                .get(self.rv.pc())
                .copied()
                .unwrap_or_else(|| self.translator.program_end());

            match self
                .bitty
                .run_to(&mut self.bitty_mem, target, self.config.step_cap)
            {
                Ok(steps) => {
                    summary.bitty_steps += steps;
                    report.trace_bitty_advance(target, steps)?;
                }
                Err(e @ SimError::StepLimitExceeded { .. }) => {
                    log::warn!("Bitty never reached mapped PC {}: {}", target, e);
                    report.note(&format!(
                        "Warning: Bitty stopped before mapped PC {} ({})",
                        target, e
                    ))?;
                }
                Err(e) => return Err(e),
            }

            last_register_matches = report.register_table(&self.rv, &self.bitty)?;
            report.memory_table(&self.rv_mem, &self.bitty_mem, self.config.compare_window)?;
        }

        if summary.rv_steps >= self.config.step_cap {
            log::warn!(
                "{}",
                SimError::StepLimitExceeded {
                    limit: self.config.step_cap
                }
            );
            report.note("\nWarning: step cap reached before the program completed")?;
        }

        summary.register_matches = last_register_matches.0;
        summary.registers_compared = last_register_matches.1;

        summary.cells_changed_rv =
            report.memory_changes(&self.initial_mem, &self.rv_mem, "RISC-V Memory")?;
        summary.cells_changed_bitty =
            report.memory_changes(&self.initial_mem, &self.bitty_mem, "Bitty Memory")?;

        for (addr, &before) in self.initial_mem.iter().enumerate() {
            let rv_changed = self.rv_mem.cells()[addr] != before;
            let bitty_changed = self.bitty_mem.cells()[addr] != before;
            if rv_changed && bitty_changed {
                summary.cells_changed_both += 1;
                if self.rv_mem.cells()[addr] == self.bitty_mem.cells()[addr] {
                    summary.cells_changed_identically += 1;
                }
            }
        }

        report.summary(&summary)?;
        Ok(summary)
    }

    /// Write the PC map, the Bitty binary and both register dumps
    pub fn write_artifacts<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        super::loader::write_pc_map(dir.join("pc_map_output.txt"), self.translator.pc_map())?;
        super::loader::write_bitty_binary(dir.join("bitty_binary.txt"), self.translator.binary())?;
        super::report::write_rv_register_dump(dir.join("riscv_registers_output.txt"), &self.rv)?;
        super::report::write_bitty_register_dump(
            dir.join("bitty_registers_output.txt"),
            &self.bitty,
        )?;
        Ok(())
    }

    pub fn rv(&self) -> &RvCpu {
        &self.rv
    }

    pub fn bitty(&self) -> &BittyCpu {
        &self.bitty
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn rv_memory(&self) -> &SharedMemory {
        &self.rv_mem
    }

    pub fn bitty_memory(&self) -> &SharedMemory {
        &self.bitty_mem
    }

    /// Preload a register on both sides, for scenario setup
    pub fn set_register(&mut self, index: u8, value: u32) {
        self.rv.set_reg(index, value);
        self.bitty.set_reg(index, value);
    }
}
