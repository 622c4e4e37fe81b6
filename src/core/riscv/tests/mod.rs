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

//! RV32EM interpreter test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: initialization, register file, fetch, run loop
//! - `decode`: immediate reassembly for every format
//! - `arithmetic`: R-type and I-type ALU execution
//! - `multiply`: M-extension execution including division edge cases
//! - `memory`: loads and stores against the shared memory
//! - `control`: branches, jumps and upper-immediate instructions

mod basic;
