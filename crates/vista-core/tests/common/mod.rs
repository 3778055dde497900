#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Size};

use vista_core::config::Color;
use vista_core::notify::ViewEvent;
use vista_core::overlay::BitMask;
use vista_core::raster::{PixelFormat, Raster};
use vista_core::render::{DisplayFrame, Surface};
use vista_core::ImageView;

/// Grayscale raster with a diagonal ramp.
pub fn ramp_raster(width: u32, height: u32) -> Raster {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x * 7 + y * 13) % 256) as u8))
        .collect();
    Raster::from_raw(width, height, 1, data).unwrap()
}

/// RGB raster with a different ramp per channel.
pub fn rgb_raster(width: u32, height: u32) -> Raster {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Raster::from_raw(width, height, 3, data).unwrap()
}

pub fn uniform_raster(width: u32, height: u32, value: u8) -> Raster {
    Raster::filled(width, height, PixelFormat::Gray, value).unwrap()
}

/// View of `widget_w` x `widget_h` showing a ramp image of `img_w` x `img_h`.
pub fn view_with_image(widget_w: f64, widget_h: f64, img_w: u32, img_h: u32) -> ImageView {
    let mut view = ImageView::new(Size::new(widget_w, widget_h));
    view.assign_image(ramp_raster(img_w, img_h));
    view
}

/// Collect every event the view emits.
pub fn record_events(view: &mut ImageView) -> Rc<RefCell<Vec<ViewEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    view.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));
    log
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Background(Color),
    Raster {
        size: (u32, u32),
        revision: u64,
        transform: Affine,
    },
    Mask {
        size: (u32, u32),
        revision: u64,
        color: Color,
    },
    Polyline(Vec<Point>),
    Circle(Point),
    Rect(Rect),
    Text(String),
}

/// Surface that records what it is asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn rasters(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Raster { .. }))
            .collect()
    }

    pub fn masks(&self) -> Vec<(u64, Color)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Mask {
                    revision, color, ..
                } => Some((*revision, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_background(&mut self, color: Color) {
        self.calls.push(DrawCall::Background(color));
    }

    fn draw_raster(&mut self, frame: &DisplayFrame<'_>) {
        self.calls.push(DrawCall::Raster {
            size: frame.raster.size(),
            revision: frame.revision,
            transform: frame.transform,
        });
    }

    fn draw_mask(&mut self, mask: &BitMask, revision: u64, _transform: Affine, color: Color) {
        self.calls.push(DrawCall::Mask {
            size: mask.size(),
            revision,
            color,
        });
    }

    fn draw_polyline(&mut self, points: &[Point], _width: f64, _color: Color) {
        self.calls.push(DrawCall::Polyline(points.to_vec()));
    }

    fn draw_circle(&mut self, center: Point, _radius: f64, _fill: Option<Color>, _stroke: Color) {
        self.calls.push(DrawCall::Circle(center));
    }

    fn draw_rect(&mut self, rect: Rect, _fill: Option<Color>, _stroke: Color) {
        self.calls.push(DrawCall::Rect(rect));
    }

    fn draw_text(&mut self, _pos: Point, text: &str, _color: Color) {
        self.calls.push(DrawCall::Text(text.to_string()));
    }
}
