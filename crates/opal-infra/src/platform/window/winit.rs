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

//! A `winit`-based window for the shell.

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};
use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    error::OsError,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

/// A wrapper around a `winit::window::Window`.
///
/// Uses an `Arc` internally to allow cheap cloning and shared ownership.
/// The raw window/display handles are re-exposed so an embedder can create
/// a real graphics context over this window; the shell itself never does.
#[derive(Debug, Clone)]
pub struct WinitWindow {
    inner: Arc<Window>,
}

impl WinitWindow {
    /// The window's identifier, for matching incoming events.
    pub fn id(&self) -> WindowId {
        self.inner.id()
    }

    /// Asks the windowing system to schedule a redraw.
    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }

    /// The current inner size in physical pixels.
    pub fn inner_size(&self) -> (u32, u32) {
        let size = self.inner.inner_size();
        (size.width, size.height)
    }
}

impl HasWindowHandle for WinitWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        self.inner.window_handle()
    }
}

impl HasDisplayHandle for WinitWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.inner.display_handle()
    }
}

/// A builder for creating [`WinitWindow`] instances.
pub struct WinitWindowBuilder {
    title: String,
    width: u32,
    height: u32,
    decorations: bool,
}

impl WinitWindowBuilder {
    /// Creates a builder with the shell's defaults: a borderless 1280x720
    /// window.
    pub fn new() -> Self {
        Self {
            title: "opal".to_string(),
            width: 1280,
            height: 720,
            decorations: false,
        }
    }

    /// Sets the title of the window to be built.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner dimensions of the window to be built.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enables or disables window decorations.
    pub fn with_decorations(mut self, decorations: bool) -> Self {
        self.decorations = decorations;
        self
    }

    /// Builds the [`WinitWindow`] using the provided `winit` event loop.
    ///
    /// # Errors
    /// Returns an `OsError` if the underlying `winit` window creation fails.
    pub fn build(self, event_loop: &ActiveEventLoop) -> Result<WinitWindow, OsError> {
        log::info!(
            "Building window '{}' at {}x{}",
            self.title,
            self.width,
            self.height
        );

        let attributes = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(LogicalSize::new(self.width, self.height))
            .with_decorations(self.decorations);

        event_loop.create_window(attributes).map(|window| WinitWindow {
            inner: Arc::new(window),
        })
    }
}

impl Default for WinitWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_the_bootstrap() {
        let builder = WinitWindowBuilder::new();
        assert_eq!(builder.title, "opal");
        assert_eq!((builder.width, builder.height), (1280, 720));
        assert!(!builder.decorations);
    }

    #[test]
    fn builder_setters_apply() {
        let builder = WinitWindowBuilder::new()
            .with_title("demo")
            .with_dimensions(640, 480)
            .with_decorations(true);
        assert_eq!(builder.title, "demo");
        assert_eq!((builder.width, builder.height), (640, 480));
        assert!(builder.decorations);
    }
}
