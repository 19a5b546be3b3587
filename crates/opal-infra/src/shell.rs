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

//! The event-loop shell that bootstraps a window and drives an application.
//!
//! The shell owns the window and the event loop; the application owns the
//! backend and its acquired resources. The shell is the one layer allowed
//! to ignore a kernel [`Failure`](opal_core::Failure); the application's
//! `init` decides what to do with each diagnostic result, typically logging
//! it and continuing.

use crate::platform::window::{WinitWindow, WinitWindowBuilder};
use anyhow::Result;
use opal_core::GlBackend;
use std::rc::Rc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::WindowId;

/// Shell configuration: window parameters and frame pacing.
///
/// A plain record with a [`Default`]; the shell reads no environment
/// variables or CLI flags.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Window title.
    pub title: String,
    /// Initial window width in logical pixels.
    pub width: u32,
    /// Initial window height in logical pixels.
    pub height: u32,
    /// Target interval between frames.
    pub frame_interval: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "opal".to_string(),
            width: 1280,
            height: 720,
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// What the shell hands an application when its window exists.
pub struct ShellContext<'a> {
    /// The backend resources are acquired from.
    pub gl: &'a Rc<dyn GlBackend>,
    /// The window the shell created.
    pub window: &'a WinitWindow,
}

/// The application driven by a [`Shell`].
pub trait Application: 'static {
    /// The backend this application's resources live on.
    fn backend(&self) -> Rc<dyn GlBackend>;

    /// Called once, after the window exists. Resource acquisition belongs
    /// here; the application owns every handle it keeps for its lifetime.
    fn init(&mut self, context: &ShellContext<'_>);

    /// Called once per paced frame.
    fn frame(&mut self);
}

/// The internal state of the running shell, managed by the winit event loop.
struct ShellState<A: Application> {
    app: A,
    config: ShellConfig,
    gl: Rc<dyn GlBackend>,
    window: Option<WinitWindow>,
    last_frame: Instant,
}

impl<A: Application> ApplicationHandler for ShellState<A> {
    /// Called when the event loop is ready; the place to create the window
    /// and let the application acquire its resources.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Avoid re-initializing if the app is resumed multiple times.
        }

        let window = match WinitWindowBuilder::new()
            .with_title(self.config.title.clone())
            .with_dimensions(self.config.width, self.config.height)
            .build(event_loop)
        {
            Ok(window) => window,
            Err(error) => {
                log::error!("Window creation failed: {error}");
                event_loop.exit();
                return;
            }
        };

        self.app.init(&ShellContext {
            gl: &self.gl,
            window: &window,
        });
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && is_quit_key(event.logical_key.as_ref()) {
                    log::info!("Quit key pressed, exiting event loop...");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.app.frame();
            }
            _ => {}
        }
    }

    /// Frame pacing: redraw once per configured interval, sleeping the
    /// event loop until the next deadline in between.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        let now = Instant::now();
        let deadline = self.last_frame + self.config.frame_interval;
        if now >= deadline {
            self.last_frame = now;
            window.request_redraw();
            event_loop.set_control_flow(ControlFlow::WaitUntil(now + self.config.frame_interval));
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }
}

/// `true` for the quit key, regardless of shift state.
fn is_quit_key(key: Key<&str>) -> bool {
    matches!(key, Key::Character(c) if c.eq_ignore_ascii_case("q"))
}

/// The public entry point of the bootstrap.
pub struct Shell;

impl Shell {
    /// Creates the event loop and runs `app` under it, blocking the current
    /// thread until the window is closed or the quit key is pressed.
    pub fn run<A: Application>(app: A, config: ShellConfig) -> Result<()> {
        log::info!("opal shell: starting event loop");
        let event_loop = EventLoop::new()?;

        let gl = app.backend();
        let mut state = ShellState {
            app,
            config,
            gl,
            window: None,
            last_frame: Instant::now(),
        };
        event_loop.run_app(&mut state)?;

        log::info!("opal shell: event loop finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_the_original_bootstrap() {
        let config = ShellConfig::default();
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.frame_interval, Duration::from_millis(16));
    }

    #[test]
    fn quit_key_matches_both_cases() {
        assert!(is_quit_key(Key::Character("q")));
        assert!(is_quit_key(Key::Character("Q")));
        assert!(!is_quit_key(Key::Character("w")));
        assert!(!is_quit_key(Key::Character("qq")));
    }
}
