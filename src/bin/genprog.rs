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

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use rvbitty::core::error::Result;
use rvbitty::core::generator::{format_binary_literal, ProgramGenerator, ProgramMix};

/// RV32EM test-program generator
#[derive(Parser)]
#[command(name = "genprog")]
#[command(about = "Generate RV32EM comparison programs", long_about = None)]
struct Args {
    /// Output file (one binary literal per line)
    #[arg(short = 'o', long, default_value = "riscv_instructions.txt")]
    output: PathBuf,

    /// Generator seed
    #[arg(short = 's', long, default_value = "42")]
    seed: u64,

    /// Number of R-type/M-extension instructions
    #[arg(short = 'r', long, default_value = "10")]
    r_type: usize,

    /// Number of I-type instructions
    #[arg(short = 'i', long, default_value = "10")]
    i_type: usize,

    /// Number of LUI/AUIPC instructions
    #[arg(short = 'u', long, default_value = "2")]
    upper: usize,

    /// Number of conditional branches
    #[arg(short = 'b', long, default_value = "2")]
    branches: usize,

    /// Number of load/store instructions
    #[arg(short = 'm', long, default_value = "5")]
    memory: usize,

    /// Number of JAL instructions (a trailing jalr is always appended)
    #[arg(short = 'j', long, default_value = "2")]
    jumps: usize,

    /// Data memory size the program will run against
    #[arg(long, default_value = "1024")]
    memory_size: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mix = ProgramMix {
        r_type: args.r_type,
        i_type: args.i_type,
        upper: args.upper,
        branch: args.branches,
        memory: args.memory,
        jump: args.jumps,
    };

    let mut generator = ProgramGenerator::new(args.seed);
    let program = generator.generate(mix, args.memory_size);

    let mut text = String::new();
    writeln!(text, "# generated by genprog, seed {}", args.seed).expect("string write");
    for word in &program {
        writeln!(text, "{}", format_binary_literal(*word)).expect("string write");
    }
    std::fs::write(&args.output, text)?;

    info!(
        "Wrote {} instructions to {}",
        program.len(),
        args.output.display()
    );
    Ok(())
}
