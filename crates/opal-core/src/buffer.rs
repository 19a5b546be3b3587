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

//! Acquisition of GPU memory buffers from byte spans.

use crate::backend::{GlBackend, NO_ERROR};
use crate::error::{Failure, FailurePoint, KernelResult};
use crate::guard::{BindGuard, BindPoint};
use crate::handle::BufferHandle;
use std::rc::Rc;

/// The binding class a buffer is created through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// A usage hint the backend may use for memory placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    StaticDraw,
    /// Re-uploaded occasionally.
    DynamicDraw,
    /// Re-uploaded every use.
    StreamDraw,
}

/// Describes one buffer acquisition. Holds only borrowed data; nothing is
/// retained past the call.
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// The binding class to create the buffer through.
    pub target: BufferTarget,
    /// Memory placement hint.
    pub usage: BufferUsage,
    /// The bytes to upload.
    pub data: &'a [u8],
}

/// `true` when a span of `len` bytes fits the backend's signed size type.
///
/// On 64-bit targets a slice longer than `isize::MAX` cannot exist, but the
/// check is kept in the acquisition path so 32-bit targets get the same
/// precondition.
fn span_len_fits(len: usize) -> bool {
    isize::try_from(len).is_ok()
}

/// Allocates a GPU buffer and uploads `desc.data` into it.
///
/// On success the returned handle exclusively owns the new buffer. On any
/// failure path no resource leaks: either no name was generated yet, or the
/// local handle already owned the name and released it on the way out. The
/// touched binding point reads unbound again when this returns, either way.
pub fn acquire_buffer(
    gl: &Rc<dyn GlBackend>,
    desc: &BufferDescriptor<'_>,
) -> KernelResult<BufferHandle> {
    if !span_len_fits(desc.data.len()) {
        return Err(Failure::local(FailurePoint::BufferSpanTooLarge));
    }

    // Drop any stale error so the checks below see only our own calls.
    gl.poll_error();

    let handle = BufferHandle::new(Rc::clone(gl), gl.gen_buffer());
    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::BufferAllocation, code));
    }

    let _binding = BindGuard::new(gl.as_ref(), BindPoint::Buffer(desc.target));
    gl.bind_buffer(desc.target, handle.name());
    gl.buffer_data(desc.target, desc.data, desc.usage);

    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::BufferUpload, code));
    }

    log::trace!(
        "acquired buffer {} ({} bytes, {:?})",
        handle.name(),
        desc.data.len(),
        desc.usage
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

    fn descriptor(data: &[u8]) -> BufferDescriptor<'_> {
        BufferDescriptor {
            target: BufferTarget::Array,
            usage: BufferUsage::StaticDraw,
            data,
        }
    }

    #[test]
    fn acquires_and_uploads() {
        let (backend, gl) = fake();
        let data = [1u8, 2, 3, 4];

        let handle = acquire_buffer(&gl, &descriptor(&data)).unwrap();
        assert_ne!(handle.name(), 0);
        assert_eq!(backend.buffer_upload_lens(), vec![4]);
        // The binding point must not be left occupied.
        assert_eq!(backend.bound_buffer(BufferTarget::Array), 0);

        drop(handle);
        assert_eq!(backend.buffers().live(), 0);
    }

    #[test]
    fn span_length_validation() {
        assert!(span_len_fits(0));
        assert!(span_len_fits(1 << 20));
        assert!(!span_len_fits(usize::MAX));
    }

    #[test]
    fn allocation_error_is_reported_and_leaks_nothing() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::GenBuffer, 0x0505);

        let failure = acquire_buffer(&gl, &descriptor(&[0u8; 8])).unwrap_err();
        assert_eq!(failure.point, FailurePoint::BufferAllocation);
        assert_eq!(failure.code, 0x0505);
        // The generated name was owned by the local handle and released.
        assert_eq!(backend.buffers().live(), 0);
    }

    #[test]
    fn upload_error_releases_the_buffer_and_restores_the_binding() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::BufferData, 0x0502);

        let failure = acquire_buffer(&gl, &descriptor(&[0u8; 8])).unwrap_err();
        assert_eq!(failure.point, FailurePoint::BufferUpload);
        assert_eq!(failure.code, 0x0502);
        assert_eq!(backend.buffers().live(), 0);
        assert_eq!(backend.bound_buffer(BufferTarget::Array), 0);
    }

    #[test]
    fn bind_error_surfaces_at_the_upload_check() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::BindBuffer, 0x0501);

        let failure = acquire_buffer(&gl, &descriptor(&[0u8; 8])).unwrap_err();
        assert_eq!(failure.point, FailurePoint::BufferUpload);
        assert_eq!(backend.buffers().live(), 0);
        assert_eq!(backend.bound_buffer(BufferTarget::Array), 0);
    }

    #[test]
    fn stale_backend_error_does_not_poison_the_acquisition() {
        let (backend, gl) = fake();
        // Simulate a previous caller leaving the flag set.
        backend.set_pending_error(0x0500);

        let handle = acquire_buffer(&gl, &descriptor(&[0u8; 8]));
        assert!(handle.is_ok());
    }

    #[test]
    fn element_array_target_binds_its_own_point() {
        let (backend, gl) = fake();
        let desc = BufferDescriptor {
            target: BufferTarget::ElementArray,
            usage: BufferUsage::StreamDraw,
            data: &[0u8; 6],
        };

        let _handle = acquire_buffer(&gl, &desc).unwrap();
        assert_eq!(backend.bound_buffer(BufferTarget::ElementArray), 0);
        assert_eq!(backend.bound_buffer(BufferTarget::Array), 0);
    }
}
