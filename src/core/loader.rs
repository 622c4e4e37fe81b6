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

//! Instruction and PC-map file loading
//!
//! Program files are plain text with one instruction literal per line.
//! Blank lines and lines starting with `#` are skipped, underscores inside
//! a literal are stripped (visual separators), and the base is detected
//! automatically: `0b…` binary, `0x…` hex, decimal otherwise.
//!
//! A malformed line is skipped with a diagnostic rather than aborting the
//! load, so a mostly-good program file still runs.
//!
//! # File formats
//!
//! ```text
//! # RV32EM program, one word per line
//! 0b0000000_00110_00101_000_00100_0110011
//! 0x00700293
//! 1234
//! ```
//!
//! The PC-map file holds one non-negative decimal per line: line `i` gives
//! the Bitty index that RV32EM instruction `i` expands to.

use std::fmt::Write as _;
use std::path::Path;

use super::error::{Result, SimError};

/// Parse one instruction literal with automatic base detection
///
/// Underscores are stripped before parsing. An optional `0b`/`0x` prefix
/// selects binary or hex; anything else parses as decimal.
///
/// # Example
///
/// ```
/// use rvbitty::core::loader::parse_literal;
///
/// assert_eq!(parse_literal("0x00700293").unwrap(), 0x0070_0293);
/// assert_eq!(parse_literal("0b1010_1010").unwrap(), 0xAA);
/// assert_eq!(parse_literal("42").unwrap(), 42);
/// ```
pub fn parse_literal(raw: &str) -> std::result::Result<u64, std::num::ParseIntError> {
    let cleaned: String = raw.chars().filter(|&c| c != '_').collect();
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        cleaned.parse()
    }
}

/// Parse program text into words, masking each to `mask`
///
/// Returns the parsed words plus one [`SimError::InstructionParse`] record
/// per skipped line.
fn parse_words(text: &str, mask: u64) -> (Vec<u64>, Vec<SimError>) {
    let mut words = Vec::new();
    let mut diagnostics = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        match parse_literal(s) {
            Ok(value) => words.push(value & mask),
            Err(e) => {
                log::warn!("Skipping line {}: '{}' ({})", number + 1, s, e);
                diagnostics.push(SimError::InstructionParse {
                    line: number + 1,
                    literal: s.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (words, diagnostics)
}

/// Load a file of RV32EM instruction literals (masked to 32 bits)
///
/// Skipped lines are returned as diagnostics alongside the program.
pub fn load_rv_program<P: AsRef<Path>>(path: P) -> Result<(Vec<u32>, Vec<SimError>)> {
    let text = std::fs::read_to_string(path)?;
    let (words, diagnostics) = parse_words(&text, 0xFFFF_FFFF);
    Ok((words.into_iter().map(|w| w as u32).collect(), diagnostics))
}

/// Load a file of Bitty instruction literals (masked to 16 bits)
pub fn load_bitty_program<P: AsRef<Path>>(path: P) -> Result<(Vec<u16>, Vec<SimError>)> {
    let text = std::fs::read_to_string(path)?;
    let (words, diagnostics) = parse_words(&text, 0xFFFF);
    Ok((words.into_iter().map(|w| w as u16).collect(), diagnostics))
}

/// Load a PC-map file: one non-negative decimal `PC_B` per line
///
/// Line `i` of the file corresponds to `PC_R = i`. Non-numeric lines are
/// skipped.
pub fn load_pc_map<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter_map(|line| line.trim().parse::<usize>().ok())
        .collect())
}

/// Write a PC map, one decimal per line
pub fn write_pc_map<P: AsRef<Path>>(path: P, map: &[usize]) -> Result<()> {
    let mut out = String::new();
    for pc_b in map {
        writeln!(out, "{}", pc_b).expect("string write cannot fail");
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Write a Bitty binary, one 4-digit hex word per line
pub fn write_bitty_binary<P: AsRef<Path>>(path: P, program: &[u16]) -> Result<()> {
    let mut out = String::new();
    for word in program {
        writeln!(out, "0x{:04X}", word).expect("string write cannot fail");
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_literal_bases() {
        assert_eq!(parse_literal("0b101").unwrap(), 5);
        assert_eq!(parse_literal("0xff").unwrap(), 255);
        assert_eq!(parse_literal("0XFF").unwrap(), 255);
        assert_eq!(parse_literal("100").unwrap(), 100);
    }

    #[test]
    fn test_parse_literal_underscores() {
        assert_eq!(
            parse_literal("0b0000000_00001_00000_000_01010_0010011").unwrap(),
            0x0010_0513
        );
        assert_eq!(parse_literal("1_000_000").unwrap(), 1_000_000);
    }

    #[test]
    fn test_parse_literal_rejects_garbage() {
        assert!(parse_literal("0xzz").is_err());
        assert!(parse_literal("banana").is_err());
        assert!(parse_literal("").is_err());
    }

    #[test]
    fn test_parse_words_skips_comments_and_errors() {
        let text = "# header\n\n0x1\nnot-a-number\n0b10\n";
        let (words, diagnostics) = parse_words(text, 0xFFFF_FFFF);
        assert_eq!(words, vec![1, 2]);
        assert_eq!(diagnostics.len(), 1);
        match &diagnostics[0] {
            SimError::InstructionParse { line, literal, .. } => {
                assert_eq!(*line, 4);
                assert_eq!(literal, "not-a-number");
            }
            other => panic!("unexpected diagnostic: {}", other),
        }
    }

    #[test]
    fn test_masking() {
        let (words, _) = parse_words("0x1_0000_FFFF", 0xFFFF_FFFF);
        assert_eq!(words, vec![0xFFFF]);
        let (words, _) = parse_words("0xABCD1234", 0xFFFF);
        assert_eq!(words, vec![0x1234]);
    }

    #[test]
    fn test_program_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# test program").unwrap();
        writeln!(file, "0x00700293").unwrap();
        writeln!(file, "0b110_0110011").unwrap();
        file.flush().unwrap();

        let (program, diagnostics) = load_rv_program(file.path()).unwrap();
        assert_eq!(program, vec![0x0070_0293, 0x333]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_pc_map_round_trip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_pc_map(file.path(), &[0, 3, 10, 10, 25]).unwrap();
        let map = load_pc_map(file.path()).unwrap();
        assert_eq!(map, vec![0, 3, 10, 10, 25]);
    }

    #[test]
    fn test_bitty_binary_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_bitty_binary(file.path(), &[0x1234, 0x0002]).unwrap();
        let (program, diagnostics) = load_bitty_program(file.path()).unwrap();
        assert_eq!(program, vec![0x1234, 0x0002]);
        assert!(diagnostics.is_empty());
    }
}
