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

//! RV32EM to Bitty cross-ISA co-simulation library
//!
//! This library executes the same program on two instruction sets and
//! demonstrates state equivalence at instruction boundaries:
//! - an RV32EM interpreter (RISC-V 32-bit embedded profile, 16 registers,
//!   integer base plus the M multiply/divide extension),
//! - a per-instruction translator from RV32EM to Bitty, a 16-bit
//!   instruction / 32-bit datapath teaching ISA,
//! - a Bitty interpreter executing the translated program against a
//!   shared data memory.
//!
//! # Example
//!
//! ```
//! use rvbitty::core::config::SimConfig;
//! use rvbitty::core::system::CoSim;
//!
//! let mut sim = CoSim::new(SimConfig::default());
//! // ADDI x5, x0, 7
//! sim.load_program(&[0x0070_0293]);
//! sim.translate_program();
//! ```

pub mod core;
