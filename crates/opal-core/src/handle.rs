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

//! The move-only ownership wrapper shared by every resource kind.
//!
//! A [`Handle`] owns one backend-issued resource name. Exactly one owner
//! exists at any time: the type is neither `Clone` nor `Copy`, so ownership
//! only ever transfers by move. Dropping a handle with a non-zero name
//! issues exactly one release call; overwriting a handle by assignment
//! drops (and thus releases) the previous value first. There is no
//! reference counting; the single-owner discipline is the whole model.
//!
//! Handles are produced only as the success variant of an acquisition
//! result; there is no public constructor.

use crate::backend::GlBackend;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Binds one resource kind's release operation at definition time.
///
/// The kind of a resource is always statically known at its call site, so
/// no runtime dispatch over kinds exists anywhere in the kernel.
pub trait ResourceKind {
    /// Kind name used in `Debug` output and release traces.
    const LABEL: &'static str;

    /// Issues the backend deletion call for one resource name.
    fn release(gl: &dyn GlBackend, name: u32);
}

/// Marker for GPU memory buffers.
pub enum Buffer {}

/// Marker for 2D textures.
pub enum Texture {}

/// Marker for framebuffers.
pub enum Framebuffer {}

/// Marker for shader objects.
pub enum Shader {}

/// Marker for linked program objects.
pub enum Program {}

impl ResourceKind for Buffer {
    const LABEL: &'static str = "buffer";

    fn release(gl: &dyn GlBackend, name: u32) {
        gl.delete_buffer(name);
    }
}

impl ResourceKind for Texture {
    const LABEL: &'static str = "texture";

    fn release(gl: &dyn GlBackend, name: u32) {
        gl.delete_texture(name);
    }
}

impl ResourceKind for Framebuffer {
    const LABEL: &'static str = "framebuffer";

    fn release(gl: &dyn GlBackend, name: u32) {
        gl.delete_framebuffer(name);
    }
}

impl ResourceKind for Shader {
    const LABEL: &'static str = "shader";

    fn release(gl: &dyn GlBackend, name: u32) {
        gl.delete_shader(name);
    }
}

impl ResourceKind for Program {
    const LABEL: &'static str = "program";

    fn release(gl: &dyn GlBackend, name: u32) {
        gl.delete_program(name);
    }
}

/// An exclusive owner of one backend resource name.
///
/// The name `0` is the "no resource" sentinel; a handle holding it releases
/// nothing on drop. Non-sentinel handles issue exactly one `delete` call
/// for their name when dropped, on success and error paths alike.
pub struct Handle<K: ResourceKind> {
    gl: Rc<dyn GlBackend>,
    name: u32,
    _kind: PhantomData<K>,
}

/// An owned GPU memory buffer.
pub type BufferHandle = Handle<Buffer>;

/// An owned 2D texture.
pub type TextureHandle = Handle<Texture>;

/// An owned framebuffer.
pub type FramebufferHandle = Handle<Framebuffer>;

/// An owned shader object.
pub type ShaderHandle = Handle<Shader>;

/// An owned, linked program object.
pub type ProgramHandle = Handle<Program>;

impl<K: ResourceKind> Handle<K> {
    /// Wraps a freshly generated name. Crate-private: handles enter the
    /// world only through acquisition functions.
    pub(crate) fn new(gl: Rc<dyn GlBackend>, name: u32) -> Self {
        Self {
            gl,
            name,
            _kind: PhantomData,
        }
    }

    /// The numeric identifier, for passing to backend calls.
    ///
    /// The identity is immutable for the handle's lifetime.
    pub fn name(&self) -> u32 {
        self.name
    }
}

impl<K: ResourceKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", K::LABEL, self.name)
    }
}

impl<K: ResourceKind> Drop for Handle<K> {
    fn drop(&mut self) {
        if self.name != 0 {
            log::trace!("releasing {} {}", K::LABEL, self.name);
            K::release(self.gl.as_ref(), self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    fn fake() -> (Rc<RecordingBackend>, Rc<dyn GlBackend>) {
        let backend = Rc::new(RecordingBackend::new());
        let gl: Rc<dyn GlBackend> = backend.clone();
        (backend, gl)
    }

    #[test]
    fn drop_releases_exactly_once() {
        let (backend, gl) = fake();
        let name = gl.gen_buffer();
        {
            let handle = BufferHandle::new(gl.clone(), name);
            assert_eq!(handle.name(), name);
            assert_eq!(backend.buffers().deleted, 0);
        }
        assert_eq!(backend.buffers().deleted, 1);
        assert_eq!(backend.buffers().live(), 0);
    }

    #[test]
    fn sentinel_handle_releases_nothing() {
        let (backend, gl) = fake();
        drop(TextureHandle::new(gl, 0));
        assert_eq!(backend.textures().deleted, 0);
    }

    #[test]
    fn move_transfers_ownership_without_release() {
        let (backend, gl) = fake();
        let handle = BufferHandle::new(gl.clone(), gl.gen_buffer());

        // Moving through another binding and back must not trigger a release.
        let moved = handle;
        assert_eq!(backend.buffers().deleted, 0);

        drop(moved);
        assert_eq!(backend.buffers().deleted, 1);
    }

    #[test]
    fn reassignment_releases_the_overwritten_resource() {
        let (backend, gl) = fake();
        let first = gl.gen_buffer();
        let second = gl.gen_buffer();

        let mut slot = BufferHandle::new(gl.clone(), first);
        assert_eq!(slot.name(), first);
        slot = BufferHandle::new(gl.clone(), second);

        // The overwritten handle must have been released, the new one not.
        assert_eq!(backend.buffers().deleted, 1);
        assert_eq!(slot.name(), second);

        drop(slot);
        assert_eq!(backend.buffers().deleted, 2);
    }

    #[test]
    fn each_kind_routes_to_its_own_delete_call() {
        let (backend, gl) = fake();
        drop(BufferHandle::new(gl.clone(), gl.gen_buffer()));
        drop(TextureHandle::new(gl.clone(), gl.gen_texture()));
        drop(FramebufferHandle::new(gl.clone(), gl.gen_framebuffer()));
        drop(ShaderHandle::new(
            gl.clone(),
            gl.create_shader(crate::shader::ShaderStage::Vertex),
        ));
        drop(ProgramHandle::new(gl.clone(), gl.create_program()));

        assert_eq!(backend.buffers().deleted, 1);
        assert_eq!(backend.textures().deleted, 1);
        assert_eq!(backend.framebuffers().deleted, 1);
        assert_eq!(backend.shaders().deleted, 1);
        assert_eq!(backend.programs().deleted, 1);
    }

    #[test]
    fn debug_output_names_the_kind() {
        let (_backend, gl) = fake();
        let handle = BufferHandle::new(gl, 7);
        assert_eq!(format!("{handle:?}"), "Handle<buffer>(7)");
    }
}
