//! Immediate-mode render surface contract and a recording implementation for headless hosts.
//!
//! The desktop runtime draws through [`RenderSurface`] only. GPU-backed hosts implement it over
//! their own device; [`RecordingSurface`] captures the command stream instead and tracks every
//! offscreen resource it hands out so leaks and double releases are observable.

use std::collections::BTreeSet;

use crate::geometry::{Color, Vec2, WindowRect};

/// Offscreen color target owned by exactly one window.
///
/// The handle is deliberately neither `Clone` nor `Copy`: releasing it through
/// [`RenderSurface::release_render_target`] consumes it, so a target cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTarget {
    id: u64,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Wraps a surface-allocated target. Only surface implementations should call this.
    pub fn from_raw(id: u64, size: Vec2) -> Self {
        let (width, height) = pixel_extent(size);
        Self { id, width, height }
    }

    /// Surface-specific identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Allocated size in pixels.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Returns `true` when the allocation already matches `size`.
    pub fn matches(&self, size: Vec2) -> bool {
        pixel_extent(size) == (self.width, self.height)
    }

    /// Records a resize performed in place by the owning surface.
    pub fn set_size(&mut self, size: Vec2) {
        let (width, height) = pixel_extent(size);
        self.width = width;
        self.height = height;
    }
}

/// One-shot pixel copy of a render target, used for previews and thumbnails.
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: u64,
    width: u32,
    height: u32,
}

impl Texture {
    /// Wraps a surface-allocated texture. Only surface implementations should call this.
    pub fn from_raw(id: u64, size: Vec2) -> Self {
        let (width, height) = pixel_extent(size);
        Self { id, width, height }
    }

    /// Surface-specific identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Texture size in pixels.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

fn pixel_extent(size: Vec2) -> (u32, u32) {
    let w = if size.x.is_finite() { size.x.ceil().max(1.0) } else { 1.0 };
    let h = if size.y.is_finite() { size.y.ceil().max(1.0) } else { 1.0 };
    (w as u32, h as u32)
}

/// 2D immediate-mode drawing API assumed to be provided by the host.
///
/// Coordinates are absolute desktop units unless an offscreen target is bound, in which case
/// they are translated by the `origin` passed to [`RenderSurface::begin_target`].
pub trait RenderSurface {
    /// Fills a rounded rectangle.
    fn fill_rounded_rect(&mut self, rect: WindowRect, radius: f32, color: Color);

    /// Strokes a rounded rectangle border.
    fn stroke_rounded_rect(&mut self, rect: WindowRect, radius: f32, thickness: f32, color: Color);

    /// Draws a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color);

    /// Measures a single line of text.
    fn measure_text(&self, text: &str, size: f32) -> Vec2;

    /// Allocates an offscreen color target.
    fn create_render_target(&mut self, size: Vec2) -> RenderTarget;

    /// Resizes an existing target in place.
    fn resize_render_target(&mut self, target: &mut RenderTarget, size: Vec2);

    /// Releases a target. Consumes the handle.
    fn release_render_target(&mut self, target: RenderTarget);

    /// Redirects drawing into `target`, clearing it, translating by `-origin`, and clipping to
    /// `clip` (in target-local coordinates).
    fn begin_target(&mut self, target: &RenderTarget, origin: Vec2, clip: WindowRect);

    /// Restores drawing to the framebuffer.
    fn end_target(&mut self);

    /// Blits a target to the framebuffer, modulated by `opacity`.
    fn blit_target(&mut self, target: &RenderTarget, dest: WindowRect, opacity: f32);

    /// Copies the current contents of `target` into a new texture.
    fn capture_snapshot(&mut self, target: &RenderTarget) -> Texture;

    /// Blits a texture scaled into `dest`, modulated by `opacity`.
    fn blit_texture(&mut self, texture: &Texture, dest: WindowRect, opacity: f32);

    /// Releases a texture. Consumes the handle.
    fn release_texture(&mut self, texture: Texture);
}

/// A single recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// See [`RenderSurface::fill_rounded_rect`].
    FillRoundedRect {
        /// Rectangle in the active coordinate frame.
        rect: WindowRect,
        /// Corner radius.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// See [`RenderSurface::stroke_rounded_rect`].
    StrokeRoundedRect {
        /// Rectangle in the active coordinate frame.
        rect: WindowRect,
        /// Corner radius.
        radius: f32,
        /// Border thickness.
        thickness: f32,
        /// Border color.
        color: Color,
    },
    /// See [`RenderSurface::draw_text`].
    Text {
        /// Text content.
        text: String,
        /// Top-left corner in the active coordinate frame.
        origin: Vec2,
        /// Font size.
        size: f32,
        /// Text color.
        color: Color,
    },
    /// See [`RenderSurface::begin_target`].
    BeginTarget {
        /// Target id.
        target: u64,
        /// Translation origin.
        origin: Vec2,
        /// Clip rectangle.
        clip: WindowRect,
    },
    /// See [`RenderSurface::end_target`].
    EndTarget,
    /// See [`RenderSurface::blit_target`].
    BlitTarget {
        /// Target id.
        target: u64,
        /// Destination rectangle.
        dest: WindowRect,
        /// Opacity modulation.
        opacity: f32,
    },
    /// See [`RenderSurface::blit_texture`].
    BlitTexture {
        /// Texture id.
        texture: u64,
        /// Destination rectangle.
        dest: WindowRect,
        /// Opacity modulation.
        opacity: f32,
    },
}

/// Render surface that records commands and tracks live offscreen resources.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    origins: Vec<Vec2>,
    next_id: u64,
    live_targets: BTreeSet<u64>,
    live_textures: BTreeSet<u64>,
    created_targets: usize,
    released_targets: Vec<u64>,
    released_textures: Vec<u64>,
}

impl RecordingSurface {
    /// Creates an empty recording surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last [`RecordingSurface::clear_commands`].
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drops the recorded command stream while keeping resource bookkeeping.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of render targets currently allocated.
    pub fn live_target_count(&self) -> usize {
        self.live_targets.len()
    }

    /// Number of textures currently allocated.
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// Total number of render targets ever created.
    pub fn created_target_count(&self) -> usize {
        self.created_targets
    }

    /// Ids of released render targets, in release order.
    pub fn released_targets(&self) -> &[u64] {
        &self.released_targets
    }

    /// Ids of released textures, in release order.
    pub fn released_textures(&self) -> &[u64] {
        &self.released_textures
    }

    /// Texts drawn in the recorded stream.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn origin(&self) -> Vec2 {
        self.origins.last().copied().unwrap_or(Vec2::ZERO)
    }
}

impl RenderSurface for RecordingSurface {
    fn fill_rounded_rect(&mut self, rect: WindowRect, radius: f32, color: Color) {
        let rect = rect.offset(-self.origin());
        self.commands.push(DrawCommand::FillRoundedRect {
            rect,
            radius,
            color,
        });
    }

    fn stroke_rounded_rect(&mut self, rect: WindowRect, radius: f32, thickness: f32, color: Color) {
        let rect = rect.offset(-self.origin());
        self.commands.push(DrawCommand::StrokeRoundedRect {
            rect,
            radius,
            thickness,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        let origin = origin - self.origin();
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            size,
            color,
        });
    }

    fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * size * 0.5, size)
    }

    fn create_render_target(&mut self, size: Vec2) -> RenderTarget {
        let id = self.alloc_id();
        self.live_targets.insert(id);
        self.created_targets += 1;
        RenderTarget::from_raw(id, size)
    }

    fn resize_render_target(&mut self, target: &mut RenderTarget, size: Vec2) {
        target.set_size(size);
    }

    fn release_render_target(&mut self, target: RenderTarget) {
        self.live_targets.remove(&target.id());
        self.released_targets.push(target.id());
    }

    fn begin_target(&mut self, target: &RenderTarget, origin: Vec2, clip: WindowRect) {
        self.origins.push(origin);
        self.commands.push(DrawCommand::BeginTarget {
            target: target.id(),
            origin,
            clip,
        });
    }

    fn end_target(&mut self) {
        self.origins.pop();
        self.commands.push(DrawCommand::EndTarget);
    }

    fn blit_target(&mut self, target: &RenderTarget, dest: WindowRect, opacity: f32) {
        self.commands.push(DrawCommand::BlitTarget {
            target: target.id(),
            dest,
            opacity,
        });
    }

    fn capture_snapshot(&mut self, target: &RenderTarget) -> Texture {
        let id = self.alloc_id();
        self.live_textures.insert(id);
        Texture::from_raw(id, target.size())
    }

    fn blit_texture(&mut self, texture: &Texture, dest: WindowRect, opacity: f32) {
        self.commands.push(DrawCommand::BlitTexture {
            texture: texture.id(),
            dest,
            opacity,
        });
    }

    fn release_texture(&mut self, texture: Texture) {
        self.live_textures.remove(&texture.id());
        self.released_textures.push(texture.id());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn drawing_inside_a_target_is_translated_to_target_space() {
        let mut surface = RecordingSurface::new();
        let target = surface.create_render_target(Vec2::new(100.0, 80.0));
        surface.begin_target(
            &target,
            Vec2::new(40.0, 30.0),
            WindowRect::new(0.0, 0.0, 100.0, 80.0),
        );
        surface.fill_rounded_rect(WindowRect::new(50.0, 40.0, 10.0, 10.0), 0.0, Color::WHITE);
        surface.end_target();
        surface.fill_rounded_rect(WindowRect::new(50.0, 40.0, 10.0, 10.0), 0.0, Color::WHITE);

        let rects: Vec<WindowRect> = surface
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillRoundedRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(
            rects,
            vec![
                WindowRect::new(10.0, 10.0, 10.0, 10.0),
                WindowRect::new(50.0, 40.0, 10.0, 10.0),
            ]
        );
        surface.release_render_target(target);
    }

    #[test]
    fn resources_are_tracked_until_released() {
        let mut surface = RecordingSurface::new();
        let target = surface.create_render_target(Vec2::new(64.0, 64.0));
        let snapshot = surface.capture_snapshot(&target);
        assert_eq!(surface.live_target_count(), 1);
        assert_eq!(surface.live_texture_count(), 1);
        assert_eq!(snapshot.size(), Vec2::new(64.0, 64.0));

        let target_id = target.id();
        surface.release_texture(snapshot);
        surface.release_render_target(target);
        assert_eq!(surface.live_target_count(), 0);
        assert_eq!(surface.live_texture_count(), 0);
        assert_eq!(surface.released_targets(), &[target_id]);
    }

    #[test]
    fn target_sizes_round_up_to_whole_pixels() {
        let mut surface = RecordingSurface::new();
        let mut target = surface.create_render_target(Vec2::new(10.2, 0.0));
        assert_eq!(target.size(), Vec2::new(11.0, 1.0));
        assert!(!target.matches(Vec2::new(20.0, 20.0)));
        surface.resize_render_target(&mut target, Vec2::new(20.0, 20.0));
        assert!(target.matches(Vec2::new(20.0, 20.0)));
        surface.release_render_target(target);
    }
}
