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

// opal sandbox
// Demo binary: acquires one of each resource kind over the recording
// backend and runs the event-loop shell until the window closes (or `q`).

use anyhow::Result;
use opal_core::testing::RecordingBackend;
use opal_core::{
    acquire_buffer, acquire_framebuffer, acquire_program, acquire_texture, AddressMode,
    BufferDescriptor, BufferHandle, BufferTarget, BufferUsage, FilterMode, FramebufferDescriptor,
    FramebufferHandle, GlBackend, ProgramDescriptor, ProgramHandle, TextureDescriptor,
    TextureHandle,
};
use opal_infra::{Application, Shell, ShellConfig, ShellContext};
use std::rc::Rc;

const TRIANGLE: &[[f32; 2]] = &[[0.0, 0.5], [-0.5, -0.5], [0.5, -0.5]];

const VERTEX_SHADER: &str = "\
attribute vec2 position;
void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

const FRAGMENT_SHADER: &str = "\
precision mediump float;
void main() {
    gl_FragColor = vec4(0.1, 0.1, 0.2, 1.0);
}
";

/// Everything the demo keeps alive for its working lifetime. Dropping this
/// struct releases each resource exactly once.
#[allow(dead_code)]
struct DemoResources {
    vertex_buffer: BufferHandle,
    texture: TextureHandle,
    framebuffer: FramebufferHandle,
    program: ProgramHandle,
}

struct DemoApp {
    backend: Rc<RecordingBackend>,
    resources: Option<DemoResources>,
    frames: u64,
}

impl DemoApp {
    fn new() -> Self {
        Self {
            backend: Rc::new(RecordingBackend::new()),
            resources: None,
            frames: 0,
        }
    }
}

impl Application for DemoApp {
    fn backend(&self) -> Rc<dyn GlBackend> {
        self.backend.clone()
    }

    fn init(&mut self, context: &ShellContext<'_>) {
        log::info!("DemoApp: acquiring GPU resources...");

        let vertex_bytes: Vec<u8> = TRIANGLE
            .iter()
            .flatten()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let vertex_buffer = match acquire_buffer(
            context.gl,
            &BufferDescriptor {
                target: BufferTarget::Array,
                usage: BufferUsage::StaticDraw,
                data: &vertex_bytes,
            },
        ) {
            Ok(handle) => handle,
            Err(failure) => {
                // The shell layer is the one place a failure may be dropped.
                log::error!("DemoApp: {failure}");
                return;
            }
        };
        log::info!(" -> {vertex_buffer:?}");

        let pixels = vec![0x80u8; 64 * 64 * 4];
        let texture = match acquire_texture(
            context.gl,
            &TextureDescriptor {
                width: 64,
                height: 64,
                mip_count: 7,
                filter: FilterMode::Linear,
                address: AddressMode::ClampToEdge,
                pixels: &pixels,
            },
        ) {
            Ok(handle) => handle,
            Err(failure) => {
                log::error!("DemoApp: {failure}");
                return;
            }
        };
        log::info!(" -> {texture:?}");

        let framebuffer = match acquire_framebuffer(
            context.gl,
            &FramebufferDescriptor {
                color: texture.name(),
                depth: 0,
            },
        ) {
            Ok(handle) => handle,
            Err(failure) => {
                log::error!("DemoApp: {failure}");
                return;
            }
        };
        log::info!(" -> {framebuffer:?}");

        let program = match acquire_program(
            context.gl,
            &ProgramDescriptor {
                vertex_source: VERTEX_SHADER,
                fragment_source: FRAGMENT_SHADER,
            },
        ) {
            Ok(handle) => handle,
            Err(failure) => {
                log::error!("DemoApp: {failure}");
                return;
            }
        };
        log::info!(" -> {program:?}");

        let (width, height) = context.window.inner_size();
        log::info!("DemoApp: ready, window is {width}x{height}");

        self.resources = Some(DemoResources {
            vertex_buffer,
            texture,
            framebuffer,
            program,
        });
    }

    fn frame(&mut self) {
        self.frames += 1;
        log::trace!("frame {}", self.frames);
    }
}

impl Drop for DemoApp {
    fn drop(&mut self) {
        // Let the handles go first, then report what the backend saw.
        self.resources = None;

        log::info!(
            "DemoApp: rendered {} frames; live resources at exit: \
             {} buffers, {} textures, {} framebuffers, {} programs",
            self.frames,
            self.backend.buffers().live(),
            self.backend.textures().live(),
            self.backend.framebuffers().live(),
            self.backend.programs().live(),
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    Shell::run(DemoApp::new(), ShellConfig::default())
}
