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

//! Simulation configuration
//!
//! Both interpreters and the driver share one [`SimConfig`]. The tolerant
//! switches select the wrap-instead-of-trap behavior that lets bulk
//! comparisons run to completion; strict mode surfaces the same conditions
//! as logged, skipped operations instead.
//!
//! Configuration can come from a TOML file, from `RVBITTY_*` environment
//! variables, or from CLI flags in the driver binary, in that order of
//! increasing precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Co-simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Wrap out-of-range data memory indices modulo the memory length
    /// instead of rejecting the access
    pub tolerant_memory: bool,

    /// Wrap out-of-range branch/jump targets by the instruction-store
    /// length instead of halting
    pub tolerant_pc: bool,

    /// Per-run instruction ceiling for each interpreter loop
    pub step_cap: usize,

    /// Shared data memory length in 32-bit words
    pub memory_size: usize,

    /// Seed for the deterministic shared-memory pattern
    pub memory_seed: u64,

    /// Number of leading memory words covered by the per-step comparison
    pub compare_window: usize,

    /// Data-memory word index where the translator publishes its
    /// `PC_R ↦ PC_B` table for dynamic jumps; must be even and leave room
    /// for one word per program instruction
    pub pc_map_base: usize,

    /// Preserve the suspicious Bitty branch variant that always falls
    /// through to `PC + 1`
    ///
    /// One source variant of the Bitty interpreter never takes conditional
    /// branches. Kept as an option for trace-for-trace comparison against
    /// that variant; leave off for correct branch behavior.
    pub quirk_unconditional_fallthrough: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tolerant_memory: true,
            tolerant_pc: true,
            step_cap: 10_000,
            memory_size: 1024,
            memory_seed: 42,
            compare_window: 500,
            pc_map_base: 512,
            quirk_unconditional_fallthrough: false,
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rvbitty::core::config::SimConfig;
    ///
    /// let config = SimConfig::from_toml_file("rvbitty.toml").unwrap();
    /// assert!(config.memory_size > 0);
    /// ```
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text))
    }

    /// Parse configuration from TOML text, falling back to defaults on
    /// malformed input (the failure is logged, not fatal)
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str(text) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Malformed config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Apply `RVBITTY_*` environment variable overrides
    ///
    /// Recognized variables: `RVBITTY_TOLERANT_MEMORY`, `RVBITTY_TOLERANT_PC`,
    /// `RVBITTY_STEP_CAP`, `RVBITTY_MEMORY_SIZE`, `RVBITTY_MEMORY_SEED`,
    /// `RVBITTY_COMPARE_WINDOW`. Unparsable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        fn read_env<T: std::str::FromStr>(name: &str, slot: &mut T) {
            if let Ok(raw) = std::env::var(name) {
                match raw.parse() {
                    Ok(value) => *slot = value,
                    Err(_) => log::warn!("Ignoring unparsable {}={}", name, raw),
                }
            }
        }

        read_env("RVBITTY_TOLERANT_MEMORY", &mut self.tolerant_memory);
        read_env("RVBITTY_TOLERANT_PC", &mut self.tolerant_pc);
        read_env("RVBITTY_STEP_CAP", &mut self.step_cap);
        read_env("RVBITTY_MEMORY_SIZE", &mut self.memory_size);
        read_env("RVBITTY_MEMORY_SEED", &mut self.memory_seed);
        read_env("RVBITTY_COMPARE_WINDOW", &mut self.compare_window);
        read_env("RVBITTY_PC_MAP_BASE", &mut self.pc_map_base);
    }
}
