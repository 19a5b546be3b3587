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

//! Scope guard restoring a backend binding point on every exit path.
//!
//! The backend has exactly one mutable shared piece of state the kernel
//! touches: the active binding per binding point. Every acquisition that
//! binds a resource constructs a [`BindGuard`] immediately before binding,
//! so the point reads "unbound" again when the function returns, through
//! success, early validation returns, and backend-error returns alike.

use crate::backend::GlBackend;
use crate::buffer::BufferTarget;

/// The binding point a [`BindGuard`] restores on drop.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BindPoint {
    Buffer(BufferTarget),
    Texture,
    Framebuffer,
}

pub(crate) struct BindGuard<'a> {
    gl: &'a dyn GlBackend,
    point: BindPoint,
}

impl<'a> BindGuard<'a> {
    pub(crate) fn new(gl: &'a dyn GlBackend, point: BindPoint) -> Self {
        Self { gl, point }
    }
}

impl Drop for BindGuard<'_> {
    fn drop(&mut self) {
        match self.point {
            BindPoint::Buffer(target) => self.gl.bind_buffer(target, 0),
            BindPoint::Texture => self.gl.bind_texture(0),
            BindPoint::Framebuffer => self.gl.bind_framebuffer(0),
        }
    }
}
