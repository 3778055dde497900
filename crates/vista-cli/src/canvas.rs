//! Software [`Surface`] used to render view frames without a window.

use image::RgbaImage;
use kurbo::{Affine, Point, Rect};
use rayon::prelude::*;
use tracing::debug;
use vista_core::config::Color;
use vista_core::overlay::BitMask;
use vista_core::raster::{PixelFormat, Raster};
use vista_core::render::{DisplayFrame, FilterMode, Surface};

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
        }
    }

    pub fn into_image(self) -> RgbaImage {
        let flat: Vec<u8> = self.pixels.into_iter().flatten().collect();
        RgbaImage::from_raw(self.width, self.height, flat)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    fn blend(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.pixels[i] = over(self.pixels[i], color);
    }

    fn stamp_disc(&mut self, center: Point, radius: f64, color: [u8; 4]) {
        let r = radius.max(0.5);
        let (x0, x1) = ((center.x - r).floor() as i64, (center.x + r).ceil() as i64);
        let (y0, y1) = ((center.y - r).floor() as i64, (center.y + r).ceil() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if c.distance(center) <= r {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn stroke_segment(&mut self, a: Point, b: Point, width: f64, color: [u8; 4]) {
        let steps = a.distance(b).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp_disc(a.lerp(b, t), width / 2.0, color);
        }
    }
}

fn rgba(c: Color) -> [u8; 4] {
    [c.r, c.g, c.b, c.a]
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let a = src[3] as f32 / 255.0;
    let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
    [mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255]
}

fn texel(raster: &Raster, x: u32, y: u32) -> [f32; 4] {
    let Some(px) = raster.pixel(x, y) else {
        return [0.0; 4];
    };
    match raster.format() {
        PixelFormat::Gray => [px[0] as f32, px[0] as f32, px[0] as f32, 255.0],
        PixelFormat::Rgb => [px[0] as f32, px[1] as f32, px[2] as f32, 255.0],
        PixelFormat::Rgba => [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32],
    }
}

/// Sample `raster` at continuous pixel coordinate `p`, `None` outside it.
fn sample(raster: &Raster, p: Point, filter: FilterMode) -> Option<[u8; 4]> {
    let (w, h) = (raster.width() as f64, raster.height() as f64);
    if p.x < 0.0 || p.y < 0.0 || p.x >= w || p.y >= h {
        return None;
    }
    let value = match filter {
        FilterMode::Nearest => texel(raster, p.x as u32, p.y as u32),
        FilterMode::Linear => {
            let fx = (p.x - 0.5).clamp(0.0, w - 1.0);
            let fy = (p.y - 0.5).clamp(0.0, h - 1.0);
            let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
            let x1 = (x0 + 1).min(raster.width() - 1);
            let y1 = (y0 + 1).min(raster.height() - 1);
            let (tx, ty) = ((fx - x0 as f64) as f32, (fy - y0 as f64) as f32);
            let (a, b) = (texel(raster, x0, y0), texel(raster, x1, y0));
            let (c, d) = (texel(raster, x0, y1), texel(raster, x1, y1));
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                let top = a[i] + (b[i] - a[i]) * tx;
                let bottom = c[i] + (d[i] - c[i]) * tx;
                out[i] = top + (bottom - top) * ty;
            }
            out
        }
    };
    Some(value.map(|v| v.round().clamp(0.0, 255.0) as u8))
}

impl Surface for Canvas {
    fn fill_background(&mut self, color: Color) {
        self.pixels.fill([color.r, color.g, color.b, 255]);
    }

    fn draw_raster(&mut self, frame: &DisplayFrame<'_>) {
        let inverse = frame.transform.inverse();
        let width = self.width as usize;
        self.pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, dst) in row.iter_mut().enumerate() {
                    let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    if let Some(src) = sample(frame.raster, p, frame.filter) {
                        *dst = over(*dst, src);
                    }
                }
            });
    }

    fn draw_mask(&mut self, mask: &BitMask, _revision: u64, transform: Affine, color: Color) {
        let inverse = transform.inverse();
        let tint = rgba(color);
        let width = self.width as usize;
        self.pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, dst) in row.iter_mut().enumerate() {
                    let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    if p.x >= 0.0 && p.y >= 0.0 && mask.get(p.x as u32, p.y as u32) {
                        *dst = over(*dst, tint);
                    }
                }
            });
    }

    fn draw_polyline(&mut self, points: &[Point], width: f64, color: Color) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], width, rgba(color));
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f64, fill: Option<Color>, stroke: Color) {
        if let Some(fill) = fill {
            self.stamp_disc(center, radius, rgba(fill));
        }
        let steps = (radius * std::f64::consts::TAU).ceil().max(8.0) as usize;
        for i in 0..steps {
            let angle = i as f64 / steps as f64 * std::f64::consts::TAU;
            let p = center + kurbo::Vec2::from_angle(angle) * radius;
            self.blend(p.x.floor() as i64, p.y.floor() as i64, rgba(stroke));
        }
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Color) {
        let r = rect.abs();
        if let Some(fill) = fill {
            for y in r.y0.floor() as i64..r.y1.ceil() as i64 {
                for x in r.x0.floor() as i64..r.x1.ceil() as i64 {
                    self.blend(x, y, rgba(fill));
                }
            }
        }
        let corners = [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
            Point::new(r.x0, r.y0),
        ];
        self.draw_polyline(&corners, 1.0, stroke);
    }

    fn draw_text(&mut self, _pos: Point, text: &str, _color: Color) {
        debug!(text, "text overlays are not rasterized headless");
    }
}
