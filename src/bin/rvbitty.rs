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

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};

use rvbitty::core::config::SimConfig;
use rvbitty::core::error::Result;
use rvbitty::core::loader;
use rvbitty::core::report::ComparisonReport;
use rvbitty::core::system::CoSim;

/// RV32EM to Bitty co-simulation driver
#[derive(Parser)]
#[command(name = "rvbitty")]
#[command(about = "Cross-ISA co-simulation and translation driver", long_about = None)]
struct Args {
    /// Path to the RV32EM program file (one literal per line)
    program: PathBuf,

    /// Optional TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Comparison report output path
    #[arg(short = 'o', long, default_value = "comparison_output.txt")]
    output: PathBuf,

    /// Directory for the PC map, Bitty binary and register dumps
    #[arg(short = 'a', long, default_value = ".")]
    artifacts: PathBuf,

    /// Override the step cap
    #[arg(short = 'n', long)]
    max_instructions: Option<usize>,
}

fn main() -> Result<()> {
    // Pick up .env before the logger and config read the environment
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("rvbitty v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_toml_file(path)?,
        None => SimConfig::default(),
    };
    config.apply_env();
    if let Some(cap) = args.max_instructions {
        config.step_cap = cap;
    }

    info!("Loading program from {}", args.program.display());
    let (program, diagnostics) = loader::load_rv_program(&args.program)?;
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    info!(
        "Loaded {} instructions ({} lines skipped)",
        program.len(),
        diagnostics.len()
    );

    let mut sim = CoSim::new(config);
    sim.load_program(&program);

    let skipped = sim.translate_program();
    if skipped > 0 {
        warn!("{} instructions had no Bitty expansion", skipped);
    }
    info!(
        "Translated into {} Bitty instructions",
        sim.translator().binary().len()
    );

    let out = File::create(&args.output)?;
    let mut report = ComparisonReport::new(BufWriter::new(out));

    match sim.run(&mut report) {
        Ok(summary) => {
            info!(
                "RISC-V ran {} instructions, Bitty ran {}",
                summary.rv_steps, summary.bitty_steps
            );
            info!(
                "Final register match rate: {:.1}%",
                summary.register_match_rate() * 100.0
            );
        }
        Err(e) => {
            error!("Comparison run failed: {}", e);
            return Err(e);
        }
    }

    sim.write_artifacts(&args.artifacts)?;
    info!("Report written to {}", args.output.display());

    Ok(())
}
