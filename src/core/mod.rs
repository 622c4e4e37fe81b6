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

//! Core co-simulation components
//!
//! This module contains all simulation components:
//! - RV32EM interpreter (decode + execute)
//! - Bitty interpreter (decode + execute, `d_out` latch)
//! - RV32EM → Bitty translator (expansion, PC map, branch fixup)
//! - Shared word-indexed data memory
//! - Instruction file loader and dump writers
//! - Co-simulation driver and comparison reporting
//! - Deterministic test-program generator

pub mod bitty;
pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod memory;
pub mod report;
pub mod riscv;
pub mod system;
pub mod translator;

// Re-export commonly used types
pub use bitty::BittyCpu;
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use memory::SharedMemory;
pub use riscv::RvCpu;
pub use system::CoSim;
pub use translator::Translator;
