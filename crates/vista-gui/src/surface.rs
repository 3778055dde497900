//! egui implementation of the view's drawing surface.

use kurbo::{Affine, Point, Rect};
use vista_core::config::Color;
use vista_core::overlay::BitMask;
use vista_core::render::{DisplayFrame, FilterMode, Surface};

use crate::convert::{mask_to_color_image, raster_to_color_image, to_color32, to_pos2};

struct CachedTexture {
    revision: u64,
    filter: FilterMode,
    handle: egui::TextureHandle,
}

struct CachedMask {
    revision: u64,
    color: Color,
    used: bool,
    handle: egui::TextureHandle,
}

/// Uploaded textures, reused until their revision changes.
#[derive(Default)]
pub struct TextureCache {
    raster: Option<CachedTexture>,
    masks: Vec<CachedMask>,
}

impl TextureCache {
    fn raster_texture(&mut self, ctx: &egui::Context, frame: &DisplayFrame<'_>) -> egui::TextureId {
        let stale = self
            .raster
            .as_ref()
            .is_none_or(|t| t.revision != frame.revision || t.filter != frame.filter);
        if stale {
            tracing::debug!(revision = frame.revision, "uploading display texture");
            let handle = ctx.load_texture(
                "vista-raster",
                raster_to_color_image(frame.raster),
                texture_options(frame.filter),
            );
            self.raster = Some(CachedTexture {
                revision: frame.revision,
                filter: frame.filter,
                handle,
            });
        }
        match &self.raster {
            Some(t) => t.handle.id(),
            None => egui::TextureId::default(),
        }
    }

    fn mask_texture(
        &mut self,
        ctx: &egui::Context,
        mask: &BitMask,
        revision: u64,
        color: Color,
    ) -> egui::TextureId {
        if let Some(m) = self
            .masks
            .iter_mut()
            .find(|m| m.revision == revision && m.color == color)
        {
            m.used = true;
            return m.handle.id();
        }
        let handle = ctx.load_texture(
            "vista-mask",
            mask_to_color_image(mask, color),
            egui::TextureOptions::NEAREST,
        );
        let id = handle.id();
        self.masks.push(CachedMask {
            revision,
            color,
            used: true,
            handle,
        });
        id
    }

    /// Drop mask textures the previous frame did not draw.
    pub fn begin_frame(&mut self) {
        self.masks.retain(|m| m.used);
        for m in &mut self.masks {
            m.used = false;
        }
    }

    pub fn clear(&mut self) {
        self.raster = None;
        self.masks.clear();
    }
}

fn texture_options(filter: FilterMode) -> egui::TextureOptions {
    match filter {
        FilterMode::Nearest => egui::TextureOptions::NEAREST,
        FilterMode::Linear => egui::TextureOptions::LINEAR,
    }
}

/// Paints into an egui painter; widget coordinates are offset by `origin`.
pub struct EguiSurface<'a> {
    pub painter: &'a egui::Painter,
    pub origin: egui::Vec2,
    pub rect: egui::Rect,
    pub cache: &'a mut TextureCache,
}

impl EguiSurface<'_> {
    fn screen(&self, p: Point) -> egui::Pos2 {
        to_pos2(p) + self.origin
    }

    /// Textured quad covering `size` source pixels, placed by `transform`.
    fn textured_quad(&self, texture: egui::TextureId, width: f64, height: f64, transform: Affine) {
        let corners = [
            (Point::new(0.0, 0.0), egui::pos2(0.0, 0.0)),
            (Point::new(width, 0.0), egui::pos2(1.0, 0.0)),
            (Point::new(width, height), egui::pos2(1.0, 1.0)),
            (Point::new(0.0, height), egui::pos2(0.0, 1.0)),
        ];
        let mut mesh = egui::Mesh::with_texture(texture);
        for (corner, uv) in corners {
            mesh.vertices.push(egui::epaint::Vertex {
                pos: self.screen(transform * corner),
                uv,
                color: egui::Color32::WHITE,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(egui::Shape::mesh(mesh));
    }
}

impl Surface for EguiSurface<'_> {
    fn fill_background(&mut self, color: Color) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(color));
    }

    fn draw_raster(&mut self, frame: &DisplayFrame<'_>) {
        let texture = self.cache.raster_texture(self.painter.ctx(), frame);
        let (w, h) = frame.raster.size();
        self.textured_quad(texture, w as f64, h as f64, frame.transform);
    }

    fn draw_mask(&mut self, mask: &BitMask, revision: u64, transform: Affine, color: Color) {
        let texture = self
            .cache
            .mask_texture(self.painter.ctx(), mask, revision, color);
        let (w, h) = mask.size();
        self.textured_quad(texture, w as f64, h as f64, transform);
    }

    fn draw_polyline(&mut self, points: &[Point], width: f64, color: Color) {
        let screen: Vec<egui::Pos2> = points.iter().map(|&p| self.screen(p)).collect();
        self.painter
            .line(screen, egui::Stroke::new(width as f32, to_color32(color)));
    }

    fn draw_circle(&mut self, center: Point, radius: f64, fill: Option<Color>, stroke: Color) {
        self.painter.circle(
            self.screen(center),
            radius as f32,
            fill.map_or(egui::Color32::TRANSPARENT, to_color32),
            egui::Stroke::new(1.5, to_color32(stroke)),
        );
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Color) {
        let r = egui::Rect::from_two_pos(
            self.screen(Point::new(rect.x0, rect.y0)),
            self.screen(Point::new(rect.x1, rect.y1)),
        );
        if let Some(fill) = fill {
            self.painter.rect_filled(r, 0.0, to_color32(fill));
        }
        self.painter.rect_stroke(
            r,
            0.0,
            egui::Stroke::new(1.0, to_color32(stroke)),
            egui::StrokeKind::Inside,
        );
    }

    fn draw_text(&mut self, pos: Point, text: &str, color: Color) {
        self.painter.text(
            self.screen(pos),
            egui::Align2::LEFT_TOP,
            text,
            egui::FontId::proportional(14.0),
            to_color32(color),
        );
    }
}
