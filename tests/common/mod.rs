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

//! Shared helpers for the integration suites

use rvbitty::core::config::SimConfig;
use rvbitty::core::report::{ComparisonReport, RunSummary};
use rvbitty::core::system::CoSim;

/// Run a program through the full pipeline with register overrides
/// applied to both sides, discarding the report text
#[allow(dead_code)]
pub fn run_scenario(program: &[u32], overrides: &[(u8, u32)]) -> (CoSim, RunSummary) {
    let mut sim = CoSim::new(SimConfig::default());
    sim.load_program(program);
    let skipped = sim.translate_program();
    assert_eq!(skipped, 0, "scenario programs must translate cleanly");

    for &(reg, value) in overrides {
        sim.set_register(reg, value);
    }

    let mut report = ComparisonReport::new(Vec::new());
    let summary = sim.run(&mut report).expect("comparison run");
    (sim, summary)
}

/// Assert that the final register files agree completely
#[allow(dead_code)]
pub fn assert_full_match(summary: &RunSummary) {
    assert_eq!(
        summary.register_matches, summary.registers_compared,
        "register files diverged"
    );
}
