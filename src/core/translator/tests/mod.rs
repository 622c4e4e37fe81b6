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

//! Translator test modules
//!
//! - `harness`: the lockstep co-execution helpers the other modules use
//! - `equivalence`: RV32EM-vs-Bitty state equality per instruction class
//! - `muldiv`: multiply/divide loop expansions and their edge cases
//! - `fixup`: PC map and pending-branch resolution


mod equivalence;
