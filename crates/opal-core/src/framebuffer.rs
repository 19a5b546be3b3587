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

//! Acquisition of framebuffers binding color and depth sub-resources.

use crate::backend::{GlBackend, FRAMEBUFFER_COMPLETE, NO_ERROR};
use crate::error::{Failure, FailurePoint, KernelResult};
use crate::guard::{BindGuard, BindPoint};
use crate::handle::FramebufferHandle;
use std::rc::Rc;

/// Describes one framebuffer acquisition.
///
/// Sub-resources are referenced by their numeric names; `0` means absent.
/// Both being absent is legal at this layer; whether such a framebuffer is
/// usable is the backend's completeness check to decide. The framebuffer
/// does not take ownership of its attachments.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramebufferDescriptor {
    /// Texture to attach at color attachment 0, or `0` for none.
    pub color: u32,
    /// Texture to attach as the depth target, or `0` for none.
    pub depth: u32,
}

/// Allocates a framebuffer, attaches the requested sub-resources, and
/// validates completeness.
///
/// An incomplete framebuffer is a reported failure carrying the backend's
/// status value in place of a generic error code.
pub fn acquire_framebuffer(
    gl: &Rc<dyn GlBackend>,
    desc: &FramebufferDescriptor,
) -> KernelResult<FramebufferHandle> {
    gl.poll_error();

    let handle = FramebufferHandle::new(Rc::clone(gl), gl.gen_framebuffer());
    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::FramebufferAllocation, code));
    }

    let _binding = BindGuard::new(gl.as_ref(), BindPoint::Framebuffer);
    gl.bind_framebuffer(handle.name());

    if desc.color != 0 {
        gl.attach_color_texture(desc.color);
    }
    if desc.depth != 0 {
        gl.attach_depth_texture(desc.depth);
    }

    let status = gl.framebuffer_status();
    if status != FRAMEBUFFER_COMPLETE {
        return Err(Failure::backend(FailurePoint::FramebufferIncomplete, status));
    }

    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::FramebufferVerification, code));
    }

    log::trace!(
        "acquired framebuffer {} (color {}, depth {})",
        handle.name(),
        desc.color,
        desc.depth
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BackendCall, RecordingBackend};

    fn fake() -> (Rc<RecordingBackend>, Rc<dyn GlBackend>) {
        let backend = Rc::new(RecordingBackend::new());
        let gl: Rc<dyn GlBackend> = backend.clone();
        (backend, gl)
    }

    #[test]
    fn attaches_color_and_depth() {
        let (backend, gl) = fake();
        let desc = FramebufferDescriptor {
            color: 11,
            depth: 12,
        };

        let handle = acquire_framebuffer(&gl, &desc).unwrap();
        assert_ne!(handle.name(), 0);
        assert_eq!(backend.color_attachments(), vec![11]);
        assert_eq!(backend.depth_attachments(), vec![12]);
        assert_eq!(backend.bound_framebuffer(), 0);
    }

    #[test]
    fn absent_sub_resources_are_not_attached() {
        let (backend, gl) = fake();

        // Both absent is legal at this layer.
        acquire_framebuffer(&gl, &FramebufferDescriptor::default()).unwrap();
        assert!(backend.color_attachments().is_empty());
        assert!(backend.depth_attachments().is_empty());
    }

    #[test]
    fn incomplete_status_becomes_the_failure_code() {
        let (backend, gl) = fake();
        // GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT.
        backend.set_framebuffer_status(0x8CD6);

        let failure =
            acquire_framebuffer(&gl, &FramebufferDescriptor { color: 7, depth: 0 }).unwrap_err();
        assert_eq!(failure.point, FailurePoint::FramebufferIncomplete);
        assert_eq!(failure.code, 0x8CD6);
        assert!(!failure.is_local());

        // The incomplete framebuffer itself must still be released.
        assert_eq!(backend.framebuffers().live(), 0);
        assert_eq!(backend.bound_framebuffer(), 0);
    }

    #[test]
    fn allocation_error_is_reported_and_leaks_nothing() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::GenFramebuffer, 0x0502);

        let failure = acquire_framebuffer(&gl, &FramebufferDescriptor::default()).unwrap_err();
        assert_eq!(failure.point, FailurePoint::FramebufferAllocation);
        assert_eq!(failure.code, 0x0502);
        assert_eq!(backend.framebuffers().live(), 0);
    }

    #[test]
    fn attachment_error_surfaces_after_the_completeness_check() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::AttachColorTexture, 0x0501);

        let failure =
            acquire_framebuffer(&gl, &FramebufferDescriptor { color: 3, depth: 0 }).unwrap_err();
        assert_eq!(failure.point, FailurePoint::FramebufferVerification);
        assert_eq!(failure.code, 0x0501);
        assert_eq!(backend.framebuffers().live(), 0);
        assert_eq!(backend.bound_framebuffer(), 0);
    }
}
