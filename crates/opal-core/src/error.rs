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

//! Defines the diagnostic outcome type shared by all acquisition functions.
//!
//! Every fallible step of every acquisition sequence is identified by a
//! [`FailurePoint`], so a caller can tell *where* a construction failed
//! without a captured call stack. The kernel never swallows a failure; it
//! is always returned to the immediate caller.

use crate::shader::ShaderStage;
use std::fmt;

/// Identifies the checkpoint at which an acquisition sequence failed.
///
/// The set of variants is stable per build; tests match on them directly.
/// Shader-related variants carry the [`ShaderStage`], so a failure that a
/// program acquisition forwards unchanged still names the stage at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// The byte span handed to a buffer upload does not fit the backend's
    /// signed size type.
    BufferSpanTooLarge,
    /// The backend reported an error while generating a buffer name.
    BufferAllocation,
    /// The backend reported an error while binding or uploading buffer data.
    BufferUpload,
    /// A texture extent or mip count lies outside the supported range.
    TextureExtent,
    /// The backend reported an error while generating a texture name.
    TextureAllocation,
    /// The backend reported an error while uploading a mip level.
    TextureUpload,
    /// The backend reported an error while generating a framebuffer name.
    FramebufferAllocation,
    /// The framebuffer's completeness query returned a non-complete status.
    /// The status value is carried as the failure code.
    FramebufferIncomplete,
    /// The backend's error flag was non-clean after attachment.
    FramebufferVerification,
    /// The backend refused to allocate a shader object for the stage.
    ShaderAllocation(ShaderStage),
    /// Compilation of the stage's source was rejected.
    ShaderCompilation(ShaderStage),
    /// The backend's error flag was non-clean after compilation.
    ShaderVerification(ShaderStage),
    /// The backend refused to allocate a program object.
    ProgramAllocation,
    /// Linking the attached shader stages was rejected.
    ProgramLink,
    /// The backend's error flag was non-clean after linking.
    ProgramVerification,
}

impl fmt::Display for FailurePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePoint::BufferSpanTooLarge => {
                write!(f, "buffer data span exceeds the backend's signed size range")
            }
            FailurePoint::BufferAllocation => write!(f, "buffer name allocation failed"),
            FailurePoint::BufferUpload => write!(f, "buffer data upload failed"),
            FailurePoint::TextureExtent => {
                write!(f, "texture extent or mip count out of range")
            }
            FailurePoint::TextureAllocation => write!(f, "texture name allocation failed"),
            FailurePoint::TextureUpload => write!(f, "texture mip level upload failed"),
            FailurePoint::FramebufferAllocation => {
                write!(f, "framebuffer name allocation failed")
            }
            FailurePoint::FramebufferIncomplete => write!(f, "framebuffer is incomplete"),
            FailurePoint::FramebufferVerification => {
                write!(f, "framebuffer attachment left the error flag set")
            }
            FailurePoint::ShaderAllocation(stage) => {
                write!(f, "{stage} shader object allocation failed")
            }
            FailurePoint::ShaderCompilation(stage) => {
                write!(f, "{stage} shader compilation failed")
            }
            FailurePoint::ShaderVerification(stage) => {
                write!(f, "{stage} shader compilation left the error flag set")
            }
            FailurePoint::ProgramAllocation => write!(f, "program object allocation failed"),
            FailurePoint::ProgramLink => write!(f, "program linking failed"),
            FailurePoint::ProgramVerification => {
                write!(f, "program linking left the error flag set")
            }
        }
    }
}

/// A structured record of one failed acquisition.
///
/// `code` is `0` for local validation failures (a precondition check failed
/// before any fallible backend call), and otherwise the backend-reported
/// error code (or, for [`FailurePoint::FramebufferIncomplete`], the
/// completeness status value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    /// The checkpoint at which the failure was detected.
    pub point: FailurePoint,
    /// The backend-reported code, or `0` for local validation failures.
    pub code: u32,
}

impl Failure {
    /// A failure detected by the kernel's own validation, with no backend
    /// call involved.
    pub(crate) fn local(point: FailurePoint) -> Self {
        Self { point, code: 0 }
    }

    /// A failure reported by the backend.
    pub(crate) fn backend(point: FailurePoint, code: u32) -> Self {
        Self { point, code }
    }

    /// Returns `true` when the failure was a local validation failure
    /// rather than a backend-reported error.
    pub fn is_local(&self) -> bool {
        self.code == 0
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            write!(f, "{} (local validation failure)", self.point)
        } else {
            write!(f, "{} (backend code {:#06x})", self.point, self.code)
        }
    }
}

impl std::error::Error for Failure {}

/// The outcome of one acquisition call: a constructed resource handle, or a
/// [`Failure`] record the caller must inspect.
pub type KernelResult<T> = Result<T, Failure>;
