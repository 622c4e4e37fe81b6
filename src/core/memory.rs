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

//! Word-indexed shared data memory
//!
//! Each cell holds one 32-bit word and is addressed by a word index, not a
//! byte address. Sub-word stores merge into the low 8 or 16 bits of the
//! existing word; cross-word sub-word access is undefined in this model.
//!
//! Both interpreters are given identically initialized memories so that the
//! comparison driver can diff them cell by cell after every instruction.
//!
//! # Example
//!
//! ```
//! use rvbitty::core::memory::SharedMemory;
//!
//! let mut mem = SharedMemory::with_pattern(64, 42);
//! let snapshot = SharedMemory::with_pattern(64, 42);
//! assert_eq!(mem.read(0).unwrap(), snapshot.read(0).unwrap());
//!
//! mem.write(3, 0xDEADBEEF).unwrap();
//! assert_eq!(mem.read(3).unwrap(), 0xDEADBEEF);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::{Result, SimError};

/// Word-indexed mutable data memory shared between the two interpreters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedMemory {
    cells: Vec<u32>,

    /// Wrap out-of-range indices modulo the length instead of erroring
    tolerant: bool,
}

impl SharedMemory {
    /// Create a zero-filled memory of `size` words
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![0; size],
            tolerant: true,
        }
    }

    /// Create a memory initialized with the deterministic comparison pattern
    ///
    /// For a given seed the pattern is reproducible, so two memories built
    /// with the same arguments start identical:
    /// - every 16th cell takes `0xA0000000 + i`,
    /// - every other 4th cell takes `0x10000000 + 16·i`,
    /// - the remainder are uniform in `[0, 2^32)`.
    pub fn with_pattern(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = (0..size)
            .map(|i| {
                if i % 16 == 0 {
                    0xA000_0000 + i as u32
                } else if i % 4 == 0 {
                    0x1000_0000 + (i as u32) * 16
                } else {
                    rng.gen::<u32>()
                }
            })
            .collect();
        Self {
            cells,
            tolerant: true,
        }
    }

    /// Select tolerant (wrap) or strict (error) handling of out-of-range
    /// indices
    pub fn set_tolerant(&mut self, tolerant: bool) {
        self.tolerant = tolerant;
    }

    /// Memory length in words
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the memory has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolve an index, wrapping modulo the length in tolerant mode
    fn resolve(&self, index: u32) -> Result<usize> {
        let size = self.cells.len();
        if (index as usize) < size {
            return Ok(index as usize);
        }
        if self.tolerant {
            log::warn!(
                "Memory index {} out of range, wrapping to {}",
                index,
                index as usize % size
            );
            Ok(index as usize % size)
        } else {
            Err(SimError::MemoryOutOfRange { index, size })
        }
    }

    /// Read the word at `index`
    pub fn read(&self, index: u32) -> Result<u32> {
        let i = self.resolve(index)?;
        Ok(self.cells[i])
    }

    /// Overwrite the word at `index`
    pub fn write(&mut self, index: u32, value: u32) -> Result<()> {
        let i = self.resolve(index)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Merge `value`'s low byte into the low 8 bits of the word at `index`
    pub fn write_byte(&mut self, index: u32, value: u32) -> Result<()> {
        let i = self.resolve(index)?;
        self.cells[i] = (self.cells[i] & 0xFFFF_FF00) | (value & 0xFF);
        Ok(())
    }

    /// Merge `value`'s low halfword into the low 16 bits of the word at
    /// `index`
    pub fn write_halfword(&mut self, index: u32, value: u32) -> Result<()> {
        let i = self.resolve(index)?;
        self.cells[i] = (self.cells[i] & 0xFFFF_0000) | (value & 0xFFFF);
        Ok(())
    }

    /// Direct view of the cells, used by the comparison reporting
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Count cells that differ from `other` over the leading `window` words
    pub fn diff_count(&self, other: &SharedMemory, window: usize) -> usize {
        let n = window.min(self.len()).min(other.len());
        (0..n).filter(|&i| self.cells[i] != other.cells[i]).count()
    }
}
