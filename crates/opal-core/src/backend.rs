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

//! Defines the abstract backend contract the kernel acquires resources from.
//!
//! The trait mirrors the slice of an OpenGL ES 2.0-style call surface the
//! acquisition functions need, nothing more. Threading the backend through
//! every call as an explicit object (rather than reaching for global
//! context state) is what lets the test suite substitute a counting fake;
//! see [`crate::testing::RecordingBackend`].
//!
//! All methods take `&self`; implementations are expected to use interior
//! mutability. The kernel is single-threaded by contract, so the shared
//! context type is `Rc<dyn GlBackend>`.

use crate::buffer::{BufferTarget, BufferUsage};
use crate::shader::ShaderStage;
use crate::texture::{AddressMode, FilterMode};
use std::fmt::Debug;

/// The value [`GlBackend::poll_error`] returns when the error flag is clean.
pub const NO_ERROR: u32 = 0;

/// The status [`GlBackend::framebuffer_status`] reports for a framebuffer
/// whose attachments form a usable render target.
pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;

/// The ambient graphics backend: allocates, binds, and releases numerically
/// named resources, and reports errors through a pollable flag plus
/// per-object status queries.
///
/// Resource names are opaque `u32` values; `0` is the reserved "no
/// resource" sentinel. A backend must never issue `0` as a valid name.
pub trait GlBackend: Debug {
    /// Returns the current error code and clears the error flag.
    ///
    /// Returns [`NO_ERROR`] when the state is clean. Successive calls after
    /// a single error return [`NO_ERROR`] again.
    fn poll_error(&self) -> u32;

    // --- Buffers ---

    /// Generates a new buffer name.
    fn gen_buffer(&self) -> u32;

    /// Deletes a buffer name, releasing its backing store.
    fn delete_buffer(&self, name: u32);

    /// Binds `name` to the given buffer binding point. Binding `0` leaves
    /// the point unbound.
    fn bind_buffer(&self, target: BufferTarget, name: u32);

    /// Uploads `data` into the buffer currently bound to `target`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    // --- Textures ---

    /// Generates a new texture name.
    fn gen_texture(&self) -> u32;

    /// Deletes a texture name.
    fn delete_texture(&self, name: u32);

    /// Binds `name` to the 2D texture binding point (`0` unbinds).
    fn bind_texture(&self, name: u32);

    /// Sets sampling parameters on the currently bound texture.
    fn texture_parameters(&self, filter: FilterMode, address: AddressMode);

    /// Defines one mip level of the currently bound texture as packed RGBA8.
    ///
    /// `data` is `None` when storage should be allocated without
    /// initialization (a declared-but-unfilled mip level).
    fn texture_image(&self, level: u32, width: u32, height: u32, data: Option<&[u8]>);

    // --- Framebuffers ---

    /// Generates a new framebuffer name.
    fn gen_framebuffer(&self) -> u32;

    /// Deletes a framebuffer name.
    fn delete_framebuffer(&self, name: u32);

    /// Binds `name` to the framebuffer binding point (`0` unbinds).
    fn bind_framebuffer(&self, name: u32);

    /// Attaches `texture` as color attachment 0 of the bound framebuffer.
    fn attach_color_texture(&self, texture: u32);

    /// Attaches `texture` as the depth attachment of the bound framebuffer.
    fn attach_depth_texture(&self, texture: u32);

    /// Queries the completeness status of the bound framebuffer.
    ///
    /// Returns [`FRAMEBUFFER_COMPLETE`] when the attachment set forms a
    /// usable render target; any other value is a status code describing
    /// why it does not.
    fn framebuffer_status(&self) -> u32;

    // --- Shaders and programs ---

    /// Creates a new shader object for the given stage.
    ///
    /// Returns `0` when the backend refuses to allocate one.
    fn create_shader(&self, stage: ShaderStage) -> u32;

    /// Deletes a shader object.
    fn delete_shader(&self, name: u32);

    /// Replaces the source text of a shader object. The source is consumed
    /// by the call; the backend does not borrow it afterwards.
    fn shader_source(&self, name: u32, source: &str);

    /// Compiles a shader object's current source.
    fn compile_shader(&self, name: u32);

    /// Queries whether the last compilation of `name` succeeded.
    fn compile_succeeded(&self, name: u32) -> bool;

    /// Creates a new program object, or `0` when the backend refuses.
    fn create_program(&self) -> u32;

    /// Deletes a program object.
    fn delete_program(&self, name: u32);

    /// Attaches a compiled shader object to a program object.
    fn attach_shader(&self, program: u32, shader: u32);

    /// Links the shader stages attached to a program object.
    fn link_program(&self, program: u32);

    /// Queries whether the last link of `name` succeeded.
    fn link_succeeded(&self, name: u32) -> bool;
}
