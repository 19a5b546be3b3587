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

//! # opal-core
//!
//! A typed resource-acquisition kernel over an OpenGL-style backend.
//!
//! The kernel does exactly one thing well: it acquires opaque, numerically
//! named GPU resources (buffers, textures, framebuffers, shaders, programs),
//! guarantees each one is released exactly once, and reports multi-stage
//! construction failures with enough context to diagnose them, without ever
//! leaking partially constructed state.
//!
//! The ambient graphics context is not global: every acquisition takes an
//! explicit [`GlBackend`] trait object, so tests (and headless embedders)
//! can substitute their own backend. See [`testing::RecordingBackend`].
//!
//! This crate defines the 'what' of resource ownership; windowing and
//! event-loop glue live in `opal-infra`.

#![warn(missing_docs)]

pub mod backend;
pub mod buffer;
pub mod error;
pub mod framebuffer;
mod guard;
pub mod handle;
pub mod program;
pub mod shader;
pub mod testing;
pub mod texture;

// Re-export the most important types for easier use.
pub use self::backend::{GlBackend, FRAMEBUFFER_COMPLETE, NO_ERROR};
pub use self::buffer::{acquire_buffer, BufferDescriptor, BufferTarget, BufferUsage};
pub use self::error::{Failure, FailurePoint, KernelResult};
pub use self::framebuffer::{acquire_framebuffer, FramebufferDescriptor};
pub use self::handle::{
    BufferHandle, FramebufferHandle, Handle, ProgramHandle, ResourceKind, ShaderHandle,
    TextureHandle,
};
pub use self::program::{acquire_program, ProgramDescriptor};
pub use self::shader::{acquire_shader, ShaderDescriptor, ShaderStage};
pub use self::texture::{acquire_texture, AddressMode, FilterMode, TextureDescriptor};
