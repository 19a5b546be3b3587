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

//! Acquisition of 2D textures with a mipmap chain.

use crate::backend::{GlBackend, NO_ERROR};
use crate::error::{Failure, FailurePoint, KernelResult};
use crate::guard::{BindGuard, BindPoint};
use crate::handle::TextureHandle;
use std::rc::Rc;

/// Texture extents and mip counts must lie strictly below this bound (and
/// strictly above zero).
const MAX_EXTENT: u32 = 16384;

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation between the nearest texels.
    Linear,
}

/// Defines how coordinates outside `[0, 1]` are handled when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates are clamped to the edge texel.
    ClampToEdge,
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
}

/// Describes one texture acquisition.
///
/// `pixels` covers the base level and, optionally, further mip levels in
/// order, packed RGBA8. Levels past the end of the span are declared with
/// uninitialized storage. That is intentional, so a mip chain can be
/// allocated without full data.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Base level width in texels, in `(0, 16384)` exclusive.
    pub width: u32,
    /// Base level height in texels, in `(0, 16384)` exclusive.
    pub height: u32,
    /// Number of mip levels to define, in `(0, 16384)` exclusive.
    pub mip_count: u32,
    /// Sampling filter applied to the texture.
    pub filter: FilterMode,
    /// Coordinate addressing applied to the texture.
    pub address: AddressMode,
    /// Packed RGBA8 pixel data for the leading mip levels.
    pub pixels: &'a [u8],
}

fn extent_in_range(value: u32) -> bool {
    (1..MAX_EXTENT).contains(&value)
}

/// Allocates a 2D texture and defines `mip_count` levels of its mip chain.
///
/// Level extents follow the halving rule the backend itself uses: each
/// dimension is halved (integer division) per level and floors at 1. The
/// first backend error aborts the walk; the touched binding point reads
/// unbound again when this returns, on every path.
pub fn acquire_texture(
    gl: &Rc<dyn GlBackend>,
    desc: &TextureDescriptor<'_>,
) -> KernelResult<TextureHandle> {
    if !extent_in_range(desc.width)
        || !extent_in_range(desc.height)
        || !extent_in_range(desc.mip_count)
    {
        return Err(Failure::local(FailurePoint::TextureExtent));
    }

    gl.poll_error();

    let handle = TextureHandle::new(Rc::clone(gl), gl.gen_texture());
    let code = gl.poll_error();
    if code != NO_ERROR {
        return Err(Failure::backend(FailurePoint::TextureAllocation, code));
    }

    let _binding = BindGuard::new(gl.as_ref(), BindPoint::Texture);
    gl.bind_texture(handle.name());
    gl.texture_parameters(desc.filter, desc.address);

    let mut width = desc.width;
    let mut height = desc.height;
    let mut rest = desc.pixels;

    for level in 0..desc.mip_count {
        let level_size = (width as usize) * (height as usize) * 4;

        // A short span declares the level without initializing its storage.
        let data = if rest.len() < level_size {
            None
        } else {
            Some(&rest[..level_size])
        };
        gl.texture_image(level, width, height, data);

        let code = gl.poll_error();
        if code != NO_ERROR {
            return Err(Failure::backend(FailurePoint::TextureUpload, code));
        }

        rest = &rest[level_size.min(rest.len())..];
        width = (width / 2).max(1);
        height = (height / 2).max(1);
    }

    log::trace!(
        "acquired texture {} ({}x{}, {} mip levels)",
        handle.name(),
        desc.width,
        desc.height,
        desc.mip_count
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

    fn descriptor(width: u32, height: u32, mip_count: u32, pixels: &[u8]) -> TextureDescriptor<'_> {
        TextureDescriptor {
            width,
            height,
            mip_count,
            filter: FilterMode::Linear,
            address: AddressMode::ClampToEdge,
            pixels,
        }
    }

    #[test]
    fn mip_chain_walks_and_halves_dimensions() {
        let (backend, gl) = fake();
        // Data for level 0 only: 256 * 256 * 4 bytes.
        let pixels = vec![0u8; 256 * 256 * 4];

        let handle = acquire_texture(&gl, &descriptor(256, 256, 4, &pixels)).unwrap();
        assert_ne!(handle.name(), 0);

        let uploads = backend.level_uploads();
        assert_eq!(uploads.len(), 4);

        let extents: Vec<(u32, u32)> = uploads.iter().map(|u| (u.width, u.height)).collect();
        assert_eq!(extents, vec![(256, 256), (128, 128), (64, 64), (32, 32)]);

        // Level 0 carries data; the rest are declared without any.
        assert_eq!(uploads[0].data_len, Some(256 * 256 * 4));
        assert_eq!(uploads[1].data_len, None);
        assert_eq!(uploads[2].data_len, None);
        assert_eq!(uploads[3].data_len, None);

        assert_eq!(backend.bound_texture(), 0);
    }

    #[test]
    fn one_texel_extent_never_halves_below_one() {
        let (backend, gl) = fake();
        let pixels = vec![0u8; 4];

        acquire_texture(&gl, &descriptor(1, 1, 3, &pixels)).unwrap();

        let extents: Vec<(u32, u32)> = backend
            .level_uploads()
            .iter()
            .map(|u| (u.width, u.height))
            .collect();
        assert_eq!(extents, vec![(1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn full_chain_data_is_consumed_per_level() {
        let (backend, gl) = fake();
        // Data for a complete 4x4 -> 2x2 -> 1x1 chain.
        let pixels = vec![0u8; (4 * 4 + 2 * 2 + 1) * 4];

        acquire_texture(&gl, &descriptor(4, 4, 3, &pixels)).unwrap();

        let lens: Vec<Option<usize>> = backend.level_uploads().iter().map(|u| u.data_len).collect();
        assert_eq!(lens, vec![Some(64), Some(16), Some(4)]);
    }

    #[test]
    fn odd_dimensions_floor_when_halving() {
        let (backend, gl) = fake();
        let pixels = vec![0u8; 5 * 3 * 4];

        acquire_texture(&gl, &descriptor(5, 3, 3, &pixels)).unwrap();

        let extents: Vec<(u32, u32)> = backend
            .level_uploads()
            .iter()
            .map(|u| (u.width, u.height))
            .collect();
        assert_eq!(extents, vec![(5, 3), (2, 1), (1, 1)]);
    }

    #[test]
    fn out_of_range_extents_fail_locally_before_any_backend_call() {
        let (backend, gl) = fake();

        for desc in [
            descriptor(0, 16, 1, &[]),
            descriptor(16, 0, 1, &[]),
            descriptor(16384, 16, 1, &[]),
            descriptor(16, 16384, 1, &[]),
            descriptor(16, 16, 0, &[]),
            descriptor(16, 16, 16384, &[]),
        ] {
            let failure = acquire_texture(&gl, &desc).unwrap_err();
            assert_eq!(failure.point, FailurePoint::TextureExtent);
            assert!(failure.is_local());
        }
        assert_eq!(backend.textures().generated, 0);
    }

    #[test]
    fn upload_error_aborts_the_walk_without_leaking() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::TextureImage, 0x0505);
        let pixels = vec![0u8; 8 * 8 * 4];

        let failure = acquire_texture(&gl, &descriptor(8, 8, 4, &pixels)).unwrap_err();
        assert_eq!(failure.point, FailurePoint::TextureUpload);
        assert_eq!(failure.code, 0x0505);

        // First failure aborts: only the poisoned level was attempted.
        assert_eq!(backend.level_uploads().len(), 1);
        assert_eq!(backend.textures().live(), 0);
        assert_eq!(backend.bound_texture(), 0);
    }

    #[test]
    fn allocation_error_is_reported_with_its_code() {
        let (backend, gl) = fake();
        backend.fail_after(BackendCall::GenTexture, 0x0501);

        let failure = acquire_texture(&gl, &descriptor(16, 16, 1, &[0u8; 16 * 16 * 4])).unwrap_err();
        assert_eq!(failure.point, FailurePoint::TextureAllocation);
        assert_eq!(failure.code, 0x0501);
        assert_eq!(backend.textures().live(), 0);
    }

    #[test]
    fn sampling_parameters_are_forwarded() {
        let (backend, gl) = fake();
        let pixels = [0u8; 16];
        let desc = TextureDescriptor {
            filter: FilterMode::Nearest,
            address: AddressMode::Repeat,
            ..descriptor(2, 2, 1, &pixels)
        };

        acquire_texture(&gl, &desc).unwrap();
        assert_eq!(
            backend.texture_parameters(),
            vec![(FilterMode::Nearest, AddressMode::Repeat)]
        );
    }
}
