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

//! Acquisition of compiled shader objects.

use crate::backend::{GlBackend, NO_ERROR};
use crate::error::{Failure, FailurePoint, KernelResult};
use crate::handle::ShaderHandle;
use std::fmt;
use std::rc::Rc;

/// The pipeline stage a shader object compiles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex processing.
    Vertex,
    /// Per-fragment processing.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Describes one shader acquisition. The source text is borrowed for the
/// duration of the call only; it is not retained.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// The stage to compile for.
    pub stage: ShaderStage,
    /// The shader source text.
    pub source: &'a str,
}

/// Allocates a shader object for the given stage and compiles its source.
///
/// A compile rejection is a local validation failure; the backend's compile
/// log is not captured at this layer and is left to surrounding
/// diagnostics. No binding point is involved.
pub fn acquire_shader(
    gl: &Rc<dyn GlBackend>,
    desc: &ShaderDescriptor<'_>,
) -> KernelResult<ShaderHandle> {
    gl.poll_error();

    let name = gl.create_shader(desc.stage);
    if name == 0 {
        return Err(Failure::local(FailurePoint::ShaderAllocation(desc.stage)));
    }
    let handle = ShaderHandle::new(Rc::clone(gl), name);

    gl.shader_source(name, desc.source);
    gl.compile_shader(name);
    if !gl.compile_succeeded(name) {
        return Err(Failure::local(FailurePoint::ShaderCompilation(desc.stage)));
    }

    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(
            FailurePoint::ShaderVerification(desc.stage),
            code,
        ));
    }

    log::trace!("acquired {} shader {}", desc.stage, handle.name());
    Ok(handle)
}
