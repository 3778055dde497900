use kurbo::Point;
use vista_core::config::Color;
use vista_core::interaction::{CursorShape, Modifiers, PointerButton};
use vista_core::overlay::BitMask;
use vista_core::raster::{PixelFormat, Raster};

/// Convert a view raster to an egui ColorImage.
pub fn raster_to_color_image(raster: &Raster) -> egui::ColorImage {
    let size = [raster.width() as usize, raster.height() as usize];
    match raster.format() {
        PixelFormat::Gray => egui::ColorImage::from_gray(size, raster.data()),
        PixelFormat::Rgb => egui::ColorImage::from_rgb(size, raster.data()),
        PixelFormat::Rgba => egui::ColorImage::from_rgba_unmultiplied(size, raster.data()),
    }
}

/// Set bits of `mask` in `color`, everything else transparent.
pub fn mask_to_color_image(mask: &BitMask, color: Color) -> egui::ColorImage {
    let (w, h) = mask.size();
    let on = to_color32(color);
    let mut pixels = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            pixels.push(if mask.get(x, y) {
                on
            } else {
                egui::Color32::TRANSPARENT
            });
        }
    }
    egui::ColorImage {
        size: [w as usize, h as usize],
        pixels,
        source_size: Default::default(),
    }
}

pub fn to_color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

pub fn from_color32(c: egui::Color32) -> Color {
    let [r, g, b, a] = c.to_srgba_unmultiplied();
    Color::rgba(r, g, b, a)
}

pub fn to_pos2(p: Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

pub fn to_point(p: egui::Pos2) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

pub fn to_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

pub fn to_modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl || m.mac_cmd,
        alt: m.alt,
    }
}

pub fn to_cursor_icon(shape: CursorShape) -> egui::CursorIcon {
    match shape {
        CursorShape::Default => egui::CursorIcon::Default,
        CursorShape::OpenHand => egui::CursorIcon::Grab,
        CursorShape::ClosedHand => egui::CursorIcon::Grabbing,
        CursorShape::Crosshair => egui::CursorIcon::Crosshair,
        CursorShape::DeletePending => egui::CursorIcon::NotAllowed,
        CursorShape::Zoom => egui::CursorIcon::ZoomIn,
    }
}
