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

//! Acquisition of linked shader programs.
//!
//! A program acquisition composes two shader acquisitions and forwards the
//! first sub-failure unchanged, so the caller sees exactly which stage
//! failed. The intermediate shader handles live only for the duration of
//! the link: their scope ends before this function returns, releasing them
//! at the backend whether linking succeeded or not.

use crate::backend::{GlBackend, NO_ERROR};
use crate::error::{Failure, FailurePoint, KernelResult};
use crate::handle::ProgramHandle;
use crate::shader::{acquire_shader, ShaderDescriptor, ShaderStage};
use std::rc::Rc;

/// Describes one program acquisition. Source texts are borrowed for the
/// duration of the call only.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor<'a> {
    /// Source text for the vertex stage.
    pub vertex_source: &'a str,
    /// Source text for the fragment stage.
    pub fragment_source: &'a str,
}

/// Compiles both shader stages and links them into an executable program.
///
/// If vertex compilation fails, fragment compilation is never attempted.
/// No partial-success state is exposed: on any failure the caller gets the
/// failure record and every intermediate resource has already been
/// released.
pub fn acquire_program(
    gl: &Rc<dyn GlBackend>,
    desc: &ProgramDescriptor<'_>,
) -> KernelResult<ProgramHandle> {
    let vertex = acquire_shader(
        gl,
        &ShaderDescriptor {
            stage: ShaderStage::Vertex,
            source: desc.vertex_source,
        },
    )?;
    let fragment = acquire_shader(
        gl,
        &ShaderDescriptor {
            stage: ShaderStage::Fragment,
            source: desc.fragment_source,
        },
    )?;

    gl.poll_error();

    let name = gl.create_program();
    if name == 0 {
        return Err(Failure::local(FailurePoint::ProgramAllocation));
    }
    let handle = ProgramHandle::new(Rc::clone(gl), name);

    gl.attach_shader(name, vertex.name());
    gl.attach_shader(name, fragment.name());
    gl.link_program(name);
    if !gl.link_succeeded(name) {
        return Err(Failure::local(FailurePoint::ProgramLink));
    }

    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::ProgramVerification, code));
    }

    log::trace!("acquired program {}", handle.name());
    Ok(handle)
    // `vertex` and `fragment` drop here: the stages are only needed during
    // linking, never afterwards.
}
