use crate::{
    assets::image_cache::{ImageCache, ImageLookup},
    foundation::{
        core::{Affine, Canvas},
        error::{ReelError, ReelResult},
    },
    project::model::{MediaKind, Overlay, ProjectState},
    render::{
        FrameRGBA,
        motion::motion_transform,
        surface::{Surface, affine_to_cpu, image_paint, solid},
        text::{TextBrushRgba8, TextRenderer, truncate_chars},
    },
    timing::resolver::{ProjectTimingContext, TimelineWindow},
};

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const PLACARD_FILL: [u8; 4] = [0x31, 0x2e, 0x81, 255];
const PLACEHOLDER_FILL: [u8; 4] = [0x1e, 0x29, 0x3b, 255];
const PLACEHOLDER_TEXT: TextBrushRgba8 = TextBrushRgba8::rgb(0x47, 0x55, 0x69);
/// `rgba(0, 0, 0, 0.7)`.
const SUBTITLE_BAND: [u8; 4] = [0, 0, 0, 179];

const PLACARD_TEXT_PX: f32 = 60.0;
const PLACEHOLDER_TEXT_PX: f32 = 20.0;
const SUBTITLE_TEXT_PX: f32 = 32.0;
const SUBTITLE_BAND_HEIGHT: f64 = 80.0;
/// Distance from the band's bottom edge to the bottom of the canvas.
const SUBTITLE_BAND_MARGIN: f64 = 20.0;

/// Knobs that shape a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositorOptions {
    pub canvas: Canvas,
    /// Motion repeats every `motion_cycle_secs` of scene time.
    pub motion_cycle_secs: f64,
    pub subtitles: bool,
    /// Narration longer than this many characters is cut.
    pub subtitle_char_budget: usize,
    /// Overlay width as a fraction of the canvas width.
    pub overlay_width_fraction: f64,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            motion_cycle_secs: 5.0,
            subtitles: true,
            subtitle_char_budget: 60,
            overlay_width_fraction: 0.12,
        }
    }
}

impl CompositorOptions {
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        if !self.motion_cycle_secs.is_finite() || self.motion_cycle_secs <= 0.0 {
            return Err(ReelError::validation("motion_cycle_secs must be finite and > 0"));
        }
        if !self.overlay_width_fraction.is_finite()
            || self.overlay_width_fraction <= 0.0
            || self.overlay_width_fraction > 1.0
        {
            return Err(ReelError::validation(
                "overlay_width_fraction must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// What fills the frame at a given time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActiveContent<'a> {
    Intro,
    Outro,
    Scene(&'a TimelineWindow),
    /// No intro/outro and no scene window covers the time.
    Empty,
}

/// Pick the content for `time`. Intro wins over scenes; outro wins after its start.
pub fn active_content(time: f64, timing: &ProjectTimingContext) -> ActiveContent<'_> {
    if timing.intro_end.is_some_and(|end| time < end) {
        return ActiveContent::Intro;
    }
    if timing.outro_start.is_some_and(|start| time > start) {
        return ActiveContent::Outro;
    }
    match timing.window_at(time) {
        Some(w) => ActiveContent::Scene(w),
        None => ActiveContent::Empty,
    }
}

/// Draws one frame for a playhead time.
///
/// The same `(time, project, timing, image cache contents)` always yields the same pixels, so
/// preview and export share this path. The project is only read.
pub struct FrameCompositor {
    opts: CompositorOptions,
    surface: Surface,
    text: Option<TextRenderer>,
}

impl FrameCompositor {
    pub fn new(opts: CompositorOptions) -> ReelResult<Self> {
        opts.validate()?;
        Ok(Self {
            surface: Surface::new(opts.canvas)?,
            opts,
            text: None,
        })
    }

    /// Use `text` for placards, the placeholder label and subtitles.
    pub fn with_text(mut self, text: TextRenderer) -> Self {
        self.text = Some(text);
        self
    }

    pub fn options(&self) -> &CompositorOptions {
        &self.opts
    }

    pub fn set_subtitles(&mut self, enabled: bool) {
        self.opts.subtitles = enabled;
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Copy of the last rendered frame.
    pub fn snapshot(&self) -> FrameRGBA {
        self.surface.snapshot()
    }

    /// Render the frame for `time`.
    ///
    /// Never fails: media that is not ready or cannot be drawn degrades to the placeholder (scene
    /// media) or is left out (overlays, text).
    pub fn render_frame(
        &mut self,
        time: f64,
        project: &ProjectState,
        timing: &ProjectTimingContext,
        images: &mut ImageCache,
    ) -> &Surface {
        images.poll();

        let canvas = self.opts.canvas;
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h);
        let mut ctx = self.surface.context();

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(solid(BACKGROUND));
        ctx.fill_rect(&full);

        let content = active_content(time, timing);
        match content {
            ActiveContent::Intro => self.draw_placard(&mut ctx, "INTRO"),
            ActiveContent::Outro => self.draw_placard(&mut ctx, "OUTRO"),
            ActiveContent::Scene(window) => {
                if !self.draw_scene_media(&mut ctx, time, window, images) {
                    self.draw_placeholder(&mut ctx);
                }
            }
            ActiveContent::Empty => self.draw_placeholder(&mut ctx),
        }

        for overlay in project.overlays.iter().filter(|o| o.is_active_at(time)) {
            self.draw_overlay(&mut ctx, overlay, images);
        }

        if self.opts.subtitles
            && let ActiveContent::Scene(window) = content
            && let Some(narration) = project
                .script
                .as_ref()
                .and_then(|s| s.narration(window.scene_index))
        {
            self.draw_subtitle(&mut ctx, narration);
        }

        self.surface.present(&mut ctx);
        &self.surface
    }

    fn draw_placard(&mut self, ctx: &mut vello_cpu::RenderContext, label: &str) {
        self.fill_canvas(ctx, PLACARD_FILL);
        let cy = self.opts.canvas.height_f64() / 2.0;
        self.label(ctx, label, PLACARD_TEXT_PX, TextBrushRgba8::WHITE, cy);
    }

    fn draw_placeholder(&mut self, ctx: &mut vello_cpu::RenderContext) {
        self.fill_canvas(ctx, PLACEHOLDER_FILL);
        let cy = self.opts.canvas.height_f64() / 2.0;
        self.label(ctx, "No Media", PLACEHOLDER_TEXT_PX, PLACEHOLDER_TEXT, cy);
    }

    /// Returns `false` when the placeholder should be drawn instead.
    fn draw_scene_media(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        time: f64,
        window: &TimelineWindow,
        images: &mut ImageCache,
    ) -> bool {
        let asset = &window.asset;
        if asset.media_kind == MediaKind::Video {
            return false;
        }
        let Some(url) = asset.media() else {
            return false;
        };
        let ImageLookup::Ready(image) = images.lookup(url) else {
            return false;
        };
        let paint = match image_paint(&image) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(scene = asset.scene_index, error = %e, "scene image not drawable");
                return false;
            }
        };

        let canvas = self.opts.canvas;
        let motion = motion_transform(
            asset.motion,
            time - window.start,
            self.opts.motion_cycle_secs,
            canvas,
        );
        let stretch = Affine::scale_non_uniform(
            canvas.width_f64() / f64::from(image.width),
            canvas.height_f64() / f64::from(image.height),
        );
        ctx.set_transform(affine_to_cpu(motion * stretch));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        true
    }

    fn draw_overlay(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        overlay: &Overlay,
        images: &mut ImageCache,
    ) {
        let ImageLookup::Ready(image) = images.lookup(&overlay.media_url) else {
            return;
        };
        let paint = match image_paint(&image) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(overlay = %overlay.id, error = %e, "overlay image not drawable");
                return;
            }
        };

        let canvas = self.opts.canvas;
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let draw_w = canvas.width_f64() * self.opts.overlay_width_fraction;
        let scale = draw_w / iw;
        let draw_h = ih * scale;
        let cx = overlay.position.x / 100.0 * canvas.width_f64();
        let cy = overlay.position.y / 100.0 * canvas.height_f64();

        let transform =
            Affine::translate((cx - draw_w / 2.0, cy - draw_h / 2.0)) * Affine::scale(scale);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    }

    fn draw_subtitle(&mut self, ctx: &mut vello_cpu::RenderContext, narration: &str) {
        let canvas = self.opts.canvas;
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let band_top = h - SUBTITLE_BAND_MARGIN - SUBTITLE_BAND_HEIGHT;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(solid(SUBTITLE_BAND));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            band_top,
            w,
            band_top + SUBTITLE_BAND_HEIGHT,
        ));

        let text = truncate_chars(narration, self.opts.subtitle_char_budget);
        let cy = band_top + SUBTITLE_BAND_HEIGHT / 2.0;
        self.label(ctx, text, SUBTITLE_TEXT_PX, TextBrushRgba8::WHITE, cy);
    }

    fn fill_canvas(&self, ctx: &mut vello_cpu::RenderContext, rgba: [u8; 4]) {
        let canvas = self.opts.canvas;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(solid(rgba));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            canvas.width_f64(),
            canvas.height_f64(),
        ));
    }

    /// Text centered horizontally on the canvas and vertically on `cy`. Skipped without a font.
    fn label(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        cy: f64,
    ) {
        let cx = self.opts.canvas.width_f64() / 2.0;
        let Some(renderer) = self.text.as_mut() else {
            return;
        };
        if let Err(e) = renderer.draw_centered(ctx, text, size_px, brush, cx, cy) {
            tracing::warn!(error = %e, "text not drawn");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
