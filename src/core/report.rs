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

//! Comparison report and register dump writers
//!
//! The comparison report is an append-only text file carrying the
//! execution trace, a per-register match table after every RV32EM
//! instruction, a memory diff with a bounded preview of matching cells,
//! and aggregate statistics. Register dumps render the final state of
//! each interpreter in the formats the standalone runs produce.

use std::io::Write;
use std::path::Path;

use super::bitty::BittyCpu;
use super::config::SimConfig;
use super::error::Result;
use super::memory::SharedMemory;
use super::riscv::RvCpu;

/// Number of matching memory rows shown at each edge of the diff table
const MATCH_PREVIEW_ROWS: u32 = 5;

/// Streaming writer for the comparison report
pub struct ComparisonReport<W: Write> {
    out: W,
}

impl<W: Write> ComparisonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer, e.g. to inspect a buffered report
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Report banner with the generation timestamp and configuration
    pub fn header(&mut self, config: &SimConfig) -> Result<()> {
        writeln!(self.out, "=== Emulator Comparison with PC Mapping ===")?;
        writeln!(self.out, "Generated on: {}", chrono::Local::now())?;
        writeln!(
            self.out,
            "\nShared memory: size={}, seed={}",
            config.memory_size, config.memory_seed
        )?;
        writeln!(
            self.out,
            "Mode: tolerant_memory={}, tolerant_pc={}, step_cap={}",
            config.tolerant_memory, config.tolerant_pc, config.step_cap
        )?;
        Ok(())
    }

    pub fn note(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    /// One line of the coordinated execution trace
    pub fn trace_step(&mut self, step: usize, pc_r: usize, word: u32) -> Result<()> {
        writeln!(
            self.out,
            "\nRISC-V Step {}: PC={}, Instr=0x{:08X}",
            step, pc_r, word
        )?;
        Ok(())
    }

    /// Bitty catching up to the mapped PC
    pub fn trace_bitty_advance(&mut self, target_pc: usize, steps: usize) -> Result<()> {
        writeln!(
            self.out,
            "Bitty advanced {} instructions to mapped PC={}",
            steps, target_pc
        )?;
        Ok(())
    }

    /// Per-register comparison table; returns `(matches, compared)`
    pub fn register_table(&mut self, rv: &RvCpu, bitty: &BittyCpu) -> Result<(usize, usize)> {
        writeln!(
            self.out,
            "\n-- Register Comparison at RV PC={}, Bitty PC={} --",
            rv.pc(),
            bitty.pc()
        )?;
        writeln!(self.out, "{:<6}{:^12}{:^12}{:^8}", "Reg", "RISC-V", "Bitty", "Match")?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        let mut matches = 0;
        for reg in 0..16u8 {
            let rv_val = rv.reg(reg);
            let bt_val = bitty.reg(reg);
            let mark = if rv_val == bt_val { "ok" } else { "XX" };
            if rv_val == bt_val {
                matches += 1;
            }
            writeln!(
                self.out,
                "x{:<5} 0x{:08X}  0x{:08X}   {}",
                reg, rv_val, bt_val, mark
            )?;
        }
        writeln!(
            self.out,
            "\nRegister matches: {}/16 ({:.1}%)",
            matches,
            matches as f64 / 16.0 * 100.0
        )?;
        Ok((matches, 16))
    }

    /// Memory diff over the leading `window` cells: mismatches always
    /// print, matches only near the edges of the window
    ///
    /// Returns `(matches, compared)`.
    pub fn memory_table(
        &mut self,
        rv_mem: &SharedMemory,
        bitty_mem: &SharedMemory,
        window: usize,
    ) -> Result<(usize, usize)> {
        writeln!(self.out, "\n-- Memory Comparison Between Emulators --")?;
        writeln!(self.out, "{:<6}{:^12}{:^12}{:^8}", "Addr", "RISC-V", "Bitty", "Match")?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        let compared = window.min(rv_mem.len()).min(bitty_mem.len()) as u32;
        let mut matches = 0;
        for addr in 0..compared {
            let rv_word = rv_mem.read(addr)?;
            let bt_word = bitty_mem.read(addr)?;
            let matched = rv_word == bt_word;
            if matched {
                matches += 1;
            }
            if !matched
                || addr < MATCH_PREVIEW_ROWS
                || addr >= compared.saturating_sub(MATCH_PREVIEW_ROWS)
            {
                writeln!(
                    self.out,
                    "{:<6} 0x{:08X}  0x{:08X}   {}",
                    addr,
                    rv_word,
                    bt_word,
                    if matched { "ok" } else { "XX" }
                )?;
            }
        }
        writeln!(
            self.out,
            "\nMemory matches between emulators: {}/{} ({:.1}%)",
            matches,
            compared,
            if compared > 0 {
                matches as f64 / compared as f64 * 100.0
            } else {
                100.0
            }
        )?;
        Ok((matches as usize, compared as usize))
    }

    /// Cells that differ from the initial snapshot; returns the count
    pub fn memory_changes(
        &mut self,
        initial: &[u32],
        current: &SharedMemory,
        name: &str,
    ) -> Result<usize> {
        writeln!(self.out, "\n-- {} Changes from Initial State --", name)?;
        let mut changes = 0;
        for (addr, &before) in initial.iter().enumerate() {
            let now = current.cells()[addr];
            if before != now {
                changes += 1;
                writeln!(
                    self.out,
                    "{:<6} 0x{:08X} -> 0x{:08X}",
                    addr, before, now
                )?;
            }
        }
        if changes == 0 {
            writeln!(self.out, "No memory changes detected")?;
        } else {
            writeln!(
                self.out,
                "\nTotal memory changes: {}/{}",
                changes,
                initial.len()
            )?;
        }
        Ok(changes)
    }

    /// Aggregate statistics footer
    pub fn summary(&mut self, stats: &RunSummary) -> Result<()> {
        writeln!(self.out, "\n=== Comparison Summary ===")?;
        writeln!(
            self.out,
            "RISC-V ran {} instructions; Bitty ran {} instructions",
            stats.rv_steps, stats.bitty_steps
        )?;
        writeln!(
            self.out,
            "Final register matches: {}/{} ({:.1}%)",
            stats.register_matches,
            stats.registers_compared,
            stats.register_match_rate() * 100.0
        )?;
        writeln!(
            self.out,
            "RISC-V memory changes: {}   Bitty memory changes: {}",
            stats.cells_changed_rv, stats.cells_changed_bitty
        )?;
        writeln!(
            self.out,
            "Cells modified by both: {}   identically: {}",
            stats.cells_changed_both, stats.cells_changed_identically
        )?;
        Ok(())
    }
}

/// Aggregate outcome of one coordinated run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rv_steps: usize,
    pub bitty_steps: usize,
    pub register_matches: usize,
    pub registers_compared: usize,
    pub cells_changed_rv: usize,
    pub cells_changed_bitty: usize,
    pub cells_changed_both: usize,
    pub cells_changed_identically: usize,
}

impl RunSummary {
    pub fn register_match_rate(&self) -> f64 {
        if self.registers_compared == 0 {
            1.0
        } else {
            self.register_matches as f64 / self.registers_compared as f64
        }
    }
}

/// Write the RV32EM register dump: R0..R15 as 8 hex digits, four per
/// line, then the final PC
pub fn write_rv_register_dump<P: AsRef<Path>>(path: P, cpu: &RvCpu) -> Result<()> {
    let mut out = String::new();
    out.push_str("Register Values:\n");
    for (i, value) in cpu.registers().iter().enumerate() {
        out.push_str(&format!("R{}: {:08X}  ", i, value));
        if (i + 1) % 4 == 0 {
            out.push('\n');
        }
    }
    out.push_str(&format!("PC: {}\n", cpu.pc()));
    std::fs::write(path, out)?;
    Ok(())
}

/// Write the Bitty register dump: R0..R15 in hex and decimal, the PC and
/// the `d_out` latch
pub fn write_bitty_register_dump<P: AsRef<Path>>(path: P, cpu: &BittyCpu) -> Result<()> {
    let mut out = String::new();
    out.push_str("BittyEmulator Register Values:\n");
    for (i, value) in cpu.registers().iter().enumerate() {
        out.push_str(&format!("R{:<2}: 0x{:08X} ({})\n", i, value, value));
    }
    out.push_str(&format!("PC  : {}\n", cpu.pc()));
    out.push_str(&format!("D_OUT: 0x{:08X} ({})\n", cpu.d_out(), cpu.d_out()));
    std::fs::write(path, out)?;
    Ok(())
}
