// Copyright 2025 opal contributors
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

//! # opal-infra
//!
//! Concrete platform glue for the opal kernel: a `winit`-backed window and
//! the event-loop shell that bootstraps an application around it.
//!
//! The kernel itself (`opal-core`) is platform-free; everything here is
//! simple I/O wrapping. The shell is generic over [`opal_core::GlBackend`],
//! so it runs equally against a real context brought by an embedder or the
//! recording backend from `opal_core::testing`.

#![warn(missing_docs)]

pub mod platform;
pub mod shell;

pub use platform::window::{WinitWindow, WinitWindowBuilder};
pub use shell::{Application, Shell, ShellConfig, ShellContext};
