//! Drawing seam.
//!
//! The game never talks to a graphics API directly. Screens and the
//! [`Map`](crate::map::Map) describe what to draw as [`DrawCommand`]s and hand
//! them to a [`RenderTarget`], together with the texture resolved from the
//! texture store, or `None` when the key is not loaded. The headless binary
//! uses [`LogTarget`]; tests use [`RecordingTarget`] to inspect what was drawn.

use glam::Vec2;
use log::debug;

/// One textured, tinted rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub tex_key: String,
    /// Top-left corner in world coordinates.
    pub origin: Vec2,
    pub size: Vec2,
    pub tint: [u8; 4],
}

/// Something that can draw rectangles and text.
pub trait RenderTarget {
    /// Draw one rectangle. `texture` is `None` when the key did not resolve,
    /// in which case the target draws a flat rectangle with the tint.
    fn draw_rect(&mut self, command: &DrawCommand, texture: Option<&[u8]>);

    /// Draw a line of UI text. `highlighted` marks the selected menu entry.
    fn draw_text(&mut self, text: &str, position: Vec2, highlighted: bool);

    /// Start a new frame.
    fn clear(&mut self) {}
}

/// Headless target that logs every call at debug level.
#[derive(Debug, Default)]
pub struct LogTarget {
    pub frames: u64,
}

impl RenderTarget for LogTarget {
    fn draw_rect(&mut self, command: &DrawCommand, texture: Option<&[u8]>) {
        debug!(
            "draw '{}' ({}) at ({:.1}, {:.1}) size {:.1}x{:.1}",
            command.tex_key,
            texture.map_or_else(|| "untextured".to_string(), |bytes| format!("{} bytes", bytes.len())),
            command.origin.x,
            command.origin.y,
            command.size.x,
            command.size.y
        );
    }

    fn draw_text(&mut self, text: &str, position: Vec2, highlighted: bool) {
        let marker = if highlighted { ">" } else { " " };
        debug!("text {}{} at ({:.1}, {:.1})", marker, text, position.x, position.y);
    }

    fn clear(&mut self) {
        self.frames += 1;
    }
}

/// Target that keeps the last frame's calls.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub commands: Vec<DrawCommand>,
    /// Texture keys drawn without a resolved texture.
    pub untextured: Vec<String>,
    pub texts: Vec<(String, bool)>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_keys(&self) -> Vec<&str> {
        self.commands.iter().map(|command| command.tex_key.as_str()).collect()
    }
}

impl RenderTarget for RecordingTarget {
    fn draw_rect(&mut self, command: &DrawCommand, texture: Option<&[u8]>) {
        if texture.is_none() {
            self.untextured.push(command.tex_key.clone());
        }
        self.commands.push(command.clone());
    }

    fn draw_text(&mut self, text: &str, _position: Vec2, highlighted: bool) {
        self.texts.push((text.to_string(), highlighted));
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.untextured.clear();
        self.texts.clear();
    }
}
