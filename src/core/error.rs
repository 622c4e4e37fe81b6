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

//! Simulation error types
//!
//! No error here is fatal to a co-simulation run: the interpreters degrade
//! to a logged event plus a PC advance, and the driver records diagnostics
//! and keeps going so that large programs run to completion.

use thiserror::Error;

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed instruction literal in a program file (the line is skipped)
    #[error("malformed instruction literal '{literal}' on line {line}: {reason}")]
    InstructionParse {
        /// 1-based line number in the source file
        line: usize,
        /// The offending literal as it appeared
        literal: String,
        /// Parser failure detail
        reason: String,
    },

    /// Register selector outside x0..x15 (RV32E exposes 16 registers)
    #[error("register x{index} out of range for rv32e (x0..x15)")]
    RegisterOutOfRange {
        /// The decoded 5-bit selector
        index: u8,
    },

    /// Data memory index past the end of the shared memory
    #[error("memory index {index} out of range (memory holds {size} words)")]
    MemoryOutOfRange {
        /// The effective word index
        index: u32,
        /// Memory length in words
        size: usize,
    },

    /// Halfword/word store at an index that violates the alignment rule
    #[error("misaligned {access} access at word index {index}")]
    MisalignedAccess {
        /// Access description, e.g. "sh" or "sw"
        access: &'static str,
        /// The effective word index
        index: u32,
    },

    /// Instruction word whose opcode no decoder recognizes
    #[error("unknown opcode in instruction {word:#010X}")]
    UnknownOpcode {
        /// The full instruction word
        word: u32,
    },

    /// The translator has no Bitty expansion for this instruction
    #[error("no bitty expansion for instruction {word:#010X}")]
    UnsupportedTranslation {
        /// The full RV32EM instruction word
        word: u32,
    },

    /// An interpreter hit its bounded step budget
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded {
        /// The configured ceiling
        limit: usize,
    },

    /// I/O error (file operations)
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
