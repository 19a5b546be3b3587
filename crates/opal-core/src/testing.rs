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

//! A counting, failure-injecting backend for tests and headless embedding.
//!
//! [`RecordingBackend`] implements [`GlBackend`] without any GPU: it hands
//! out monotonically increasing names, records every generate/delete and
//! upload, tracks the current binding per binding point, and can be armed
//! to misbehave at a chosen call: raise an error code, refuse an
//! allocation, reject a compilation or link, or report an incomplete
//! framebuffer. The kernel's leak and binding-restoration properties are
//! asserted against its counters.

use crate::backend::{GlBackend, FRAMEBUFFER_COMPLETE, NO_ERROR};
use crate::buffer::{BufferTarget, BufferUsage};
use crate::shader::ShaderStage;
use crate::texture::{AddressMode, FilterMode};
use std::cell::RefCell;
use std::collections::HashMap;

/// One backend entry point, used to address failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BackendCall {
    GenBuffer,
    BindBuffer,
    BufferData,
    GenTexture,
    BindTexture,
    TextureParameters,
    TextureImage,
    GenFramebuffer,
    BindFramebuffer,
    AttachColorTexture,
    AttachDepthTexture,
    CreateShader,
    ShaderSource,
    CompileShader,
    CreateProgram,
    AttachShader,
    LinkProgram,
}

/// Generate/delete counters for one resource kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindCounters {
    /// Names handed out so far.
    pub generated: u32,
    /// Names deleted so far.
    pub deleted: u32,
}

impl KindCounters {
    /// Names currently alive. Zero after a leak-free sequence completes.
    pub fn live(&self) -> u32 {
        self.generated - self.deleted
    }
}

/// A recorded mip level upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpload {
    /// The mip level index.
    pub level: u32,
    /// Level width in texels.
    pub width: u32,
    /// Level height in texels.
    pub height: u32,
    /// Length of the uploaded data, or `None` for uninitialized storage.
    pub data_len: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    pending_error: u32,
    fail_after: Option<(BackendCall, u32)>,
    refuse_shader: bool,
    refuse_program: bool,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    framebuffer_status: u32,

    buffers: KindCounters,
    textures: KindCounters,
    framebuffers: KindCounters,
    shaders: KindCounters,
    programs: KindCounters,

    bound_array_buffer: u32,
    bound_element_buffer: u32,
    bound_texture: u32,
    bound_framebuffer: u32,

    shader_stages: HashMap<u32, ShaderStage>,
    shader_sources: HashMap<u32, String>,
    buffer_uploads: Vec<(BufferTarget, usize, BufferUsage)>,
    level_uploads: Vec<LevelUpload>,
    texture_parameters: Vec<(FilterMode, AddressMode)>,
    color_attachments: Vec<u32>,
    depth_attachments: Vec<u32>,
    attached: Vec<(u32, u32)>,
    linked: Vec<u32>,
}

fn tick(state: &mut State, call: BackendCall) {
    if let Some((armed, code)) = state.fail_after {
        if armed == call {
            state.pending_error = code;
            state.fail_after = None;
        }
    }
}

/// A fake [`GlBackend`] over interior-mutable counters and logs.
#[derive(Debug)]
pub struct RecordingBackend {
    state: RefCell<State>,
}

impl RecordingBackend {
    /// Creates a backend with a clean error flag, no live names, and a
    /// complete framebuffer status.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                framebuffer_status: FRAMEBUFFER_COMPLETE,
                ..State::default()
            }),
        }
    }

    // --- Failure injection ---

    /// Arms the error flag to be raised with `code` right after the next
    /// occurrence of `call`.
    pub fn fail_after(&self, call: BackendCall, code: u32) {
        self.state.borrow_mut().fail_after = Some((call, code));
    }

    /// Sets the error flag directly, as a previous caller would have left it.
    pub fn set_pending_error(&self, code: u32) {
        self.state.borrow_mut().pending_error = code;
    }

    /// Makes `create_shader` return the `0` sentinel.
    pub fn refuse_shader_allocation(&self) {
        self.state.borrow_mut().refuse_shader = true;
    }

    /// Makes `create_program` return the `0` sentinel.
    pub fn refuse_program_allocation(&self) {
        self.state.borrow_mut().refuse_program = true;
    }

    /// Makes compilation of shaders for `stage` report failure.
    pub fn fail_compilation(&self, stage: ShaderStage) {
        self.state.borrow_mut().fail_compile = Some(stage);
    }

    /// Makes every link report failure.
    pub fn fail_linking(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    /// Sets the status reported for completeness queries.
    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().framebuffer_status = status;
    }

    // --- Observations ---

    /// Buffer generate/delete counters.
    pub fn buffers(&self) -> KindCounters {
        self.state.borrow().buffers
    }

    /// Texture generate/delete counters.
    pub fn textures(&self) -> KindCounters {
        self.state.borrow().textures
    }

    /// Framebuffer generate/delete counters.
    pub fn framebuffers(&self) -> KindCounters {
        self.state.borrow().framebuffers
    }

    /// Shader create/delete counters.
    pub fn shaders(&self) -> KindCounters {
        self.state.borrow().shaders
    }

    /// Program create/delete counters.
    pub fn programs(&self) -> KindCounters {
        self.state.borrow().programs
    }

    /// The name currently bound to a buffer binding point (`0` if unbound).
    pub fn bound_buffer(&self, target: BufferTarget) -> u32 {
        let state = self.state.borrow();
        match target {
            BufferTarget::Array => state.bound_array_buffer,
            BufferTarget::ElementArray => state.bound_element_buffer,
        }
    }

    /// The name currently bound to the texture binding point.
    pub fn bound_texture(&self) -> u32 {
        self.state.borrow().bound_texture
    }

    /// The name currently bound to the framebuffer binding point.
    pub fn bound_framebuffer(&self) -> u32 {
        self.state.borrow().bound_framebuffer
    }

    /// Byte lengths of all buffer uploads, in call order.
    pub fn buffer_upload_lens(&self) -> Vec<usize> {
        self.state
            .borrow()
            .buffer_uploads
            .iter()
            .map(|(_, len, _)| *len)
            .collect()
    }

    /// All recorded mip level uploads, in call order.
    pub fn level_uploads(&self) -> Vec<LevelUpload> {
        self.state.borrow().level_uploads.clone()
    }

    /// All recorded sampling parameter calls, in call order.
    pub fn texture_parameters(&self) -> Vec<(FilterMode, AddressMode)> {
        self.state.borrow().texture_parameters.clone()
    }

    /// Names attached as color attachment 0, in call order.
    pub fn color_attachments(&self) -> Vec<u32> {
        self.state.borrow().color_attachments.clone()
    }

    /// Names attached as the depth target, in call order.
    pub fn depth_attachments(&self) -> Vec<u32> {
        self.state.borrow().depth_attachments.clone()
    }

    /// Shader names attached to `program`, in call order.
    pub fn attached_shaders(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .attached
            .iter()
            .filter(|(p, _)| *p == program)
            .map(|(_, s)| *s)
            .collect()
    }

    /// The last source submitted for a shader name, if any.
    pub fn source_of(&self, name: u32) -> Option<String> {
        self.state.borrow().shader_sources.get(&name).cloned()
    }

    /// Program names passed to `link_program`, in call order.
    pub fn link_calls(&self) -> Vec<u32> {
        self.state.borrow().linked.clone()
    }

    fn alloc_name(state: &mut State) -> u32 {
        state.next_name += 1;
        state.next_name
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for RecordingBackend {
    fn poll_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        std::mem::replace(&mut state.pending_error, NO_ERROR)
    }

    fn gen_buffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::GenBuffer);
        state.buffers.generated += 1;
        Self::alloc_name(&mut state)
    }

    fn delete_buffer(&self, _name: u32) {
        self.state.borrow_mut().buffers.deleted += 1;
    }

    fn bind_buffer(&self, target: BufferTarget, name: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::BindBuffer);
        match target {
            BufferTarget::Array => state.bound_array_buffer = name,
            BufferTarget::ElementArray => state.bound_element_buffer = name,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::BufferData);
        state.buffer_uploads.push((target, data.len(), usage));
    }

    fn gen_texture(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::GenTexture);
        state.textures.generated += 1;
        Self::alloc_name(&mut state)
    }

    fn delete_texture(&self, _name: u32) {
        self.state.borrow_mut().textures.deleted += 1;
    }

    fn bind_texture(&self, name: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::BindTexture);
        state.bound_texture = name;
    }

    fn texture_parameters(&self, filter: FilterMode, address: AddressMode) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::TextureParameters);
        state.texture_parameters.push((filter, address));
    }

    fn texture_image(&self, level: u32, width: u32, height: u32, data: Option<&[u8]>) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::TextureImage);
        state.level_uploads.push(LevelUpload {
            level,
            width,
            height,
            data_len: data.map(<[u8]>::len),
        });
    }

    fn gen_framebuffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::GenFramebuffer);
        state.framebuffers.generated += 1;
        Self::alloc_name(&mut state)
    }

    fn delete_framebuffer(&self, _name: u32) {
        self.state.borrow_mut().framebuffers.deleted += 1;
    }

    fn bind_framebuffer(&self, name: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::BindFramebuffer);
        state.bound_framebuffer = name;
    }

    fn attach_color_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::AttachColorTexture);
        state.color_attachments.push(texture);
    }

    fn attach_depth_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::AttachDepthTexture);
        state.depth_attachments.push(texture);
    }

    fn framebuffer_status(&self) -> u32 {
        self.state.borrow().framebuffer_status
    }

    fn create_shader(&self, stage: ShaderStage) -> u32 {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::CreateShader);
        if state.refuse_shader {
            return 0;
        }
        state.shaders.generated += 1;
        let name = Self::alloc_name(&mut state);
        state.shader_stages.insert(name, stage);
        name
    }

    fn delete_shader(&self, _name: u32) {
        self.state.borrow_mut().shaders.deleted += 1;
    }

    fn shader_source(&self, name: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::ShaderSource);
        state.shader_sources.insert(name, source.to_owned());
    }

    fn compile_shader(&self, _name: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::CompileShader);
    }

    fn compile_succeeded(&self, name: u32) -> bool {
        let state = self.state.borrow();
        match (state.fail_compile, state.shader_stages.get(&name)) {
            (Some(failing), Some(stage)) => failing != *stage,
            _ => true,
        }
    }

    fn create_program(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::CreateProgram);
        if state.refuse_program {
            return 0;
        }
        state.programs.generated += 1;
        Self::alloc_name(&mut state)
    }

    fn delete_program(&self, _name: u32) {
        self.state.borrow_mut().programs.deleted += 1;
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::AttachShader);
        state.attached.push((program, shader));
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        tick(&mut state, BackendCall::LinkProgram);
        state.linked.push(program);
    }

    fn link_succeeded(&self, _name: u32) -> bool {
        !self.state.borrow().fail_link
    }
}
