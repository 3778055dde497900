mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use kurbo::{Point, Size, Vec2};

use vista_core::config::Color;
use vista_core::error::{Result, ViewError};
use vista_core::interaction::InteractionFeature;
use vista_core::notify::{EventKind, ViewEvent};
use vista_core::overlay::BitMask;
use vista_core::raster::Raster;
use vista_core::render::{FilterMode, Surface};
use vista_core::resample::cpu::CpuBackend;
use vista_core::resample::{DevicePreference, PlaneBuffer, Resampler, ResizeBackend};
use vista_core::ImageView;

use common::{ramp_raster, uniform_raster, view_with_image, DrawCall, RecordingSurface};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UploadCounter {
    uploads: AtomicUsize,
}

impl ResizeBackend for UploadCounter {
    fn name(&self) -> &str {
        "upload-counter"
    }

    fn upload(&self, raster: &Raster) -> Result<PlaneBuffer> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        CpuBackend.upload(raster)
    }

    fn area_average(&self, input: &PlaneBuffer, w: usize, h: usize) -> Result<PlaneBuffer> {
        CpuBackend.area_average(input, w, h)
    }

    fn unsharp_mask(&self, input: &PlaneBuffer, strength: f32, radius: f32) -> Result<PlaneBuffer> {
        CpuBackend.unsharp_mask(input, strength, radius)
    }

    fn download(&self, buffer: &PlaneBuffer) -> Result<Raster> {
        CpuBackend.download(buffer)
    }
}

fn counted_view(widget: f64, img: u32) -> (ImageView, Arc<UploadCounter>) {
    let counter = Arc::new(UploadCounter::default());
    let resampler =
        Resampler::new(DevicePreference::Auto).with_accelerated_backend(counter.clone());
    let mut view = ImageView::new(Size::new(widget, widget)).with_resampler(resampler);
    view.assign_image(ramp_raster(img, img));
    (view, counter)
}

fn paint(view: &mut ImageView) -> RecordingSurface {
    let mut surface = RecordingSurface::default();
    view.paint(&mut surface);
    surface
}

fn drawn_raster_size(surface: &RecordingSurface) -> (u32, u32) {
    match surface.rasters().first() {
        Some(DrawCall::Raster { size, .. }) => *size,
        other => panic!("no raster drawn: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Image assignment
// ---------------------------------------------------------------------------

#[test]
fn test_unsupported_layout_keeps_previous_image() {
    let mut view = view_with_image(100.0, 100.0, 40, 30);
    let err = view.assign_raw(10, 10, 2, vec![0; 200]).unwrap_err();
    assert!(matches!(err, ViewError::UnsupportedPixelLayout { channels: 2 }));
    assert!(view.image_assigned());
    assert_eq!(view.image().unwrap().size(), (40, 30));
}

#[test]
fn test_assign_raw_accepts_valid_layouts() {
    let mut view = ImageView::new(Size::new(100.0, 100.0));
    assert!(!view.image_assigned());
    view.assign_raw(2, 2, 4, vec![255; 16]).unwrap();
    assert!(view.image_assigned());
    assert!(view.assign_raw(2, 2, 3, vec![0; 5]).is_err());
    assert_eq!(view.image().unwrap().channels(), 4);
}

#[test]
fn test_reset_image_clears_state() {
    let mut view = view_with_image(100.0, 100.0, 400, 400);
    view.zoom_by(2.0, Point::new(10.0, 10.0));
    view.set_rotation(90.0);
    view.reset_image();
    assert!(!view.image_assigned());
    assert_eq!(view.current_scaling_factor(), None);
    assert_eq!(view.zoom_exponent(), 0.0);
    assert_eq!(view.rotation(), 0.0);
}

#[test]
fn test_new_dimensions_reset_masks_and_hundred_percent() {
    let mut view = view_with_image(100.0, 100.0, 50, 50);
    view.set_painting_active(true);
    view.set_overlay_mask(Some(BitMask::new(50, 50)));
    view.zoom_to_hundred_percent(Point::new(50.0, 50.0));

    // Same dimensions: masks and 100% survive.
    view.assign_image(uniform_raster(50, 50, 9));
    assert!(view.overlay_mask().is_some());
    assert!(view.is_hundred_percent());

    view.assign_image(uniform_raster(60, 50, 9));
    assert!(view.overlay_mask().is_none());
    assert!(!view.is_hundred_percent());
    // Painting is still on, so a fresh mask of the new size exists.
    assert_eq!(view.paint_mask().unwrap().size(), (60, 50));
}

#[test]
fn test_operations_without_image_are_noops() {
    let mut view = ImageView::new(Size::new(100.0, 100.0));
    view.zoom_by(1.0, Point::ZERO);
    view.pan_by(Vec2::new(3.0, 3.0));
    view.rotate_by(90.0);
    view.zoom_to_hundred_percent(Point::ZERO);
    assert_eq!(view.zoom_exponent(), 0.0);
    assert_eq!(view.rotation(), 0.0);
    assert_eq!(view.map_to_image_coordinates(Point::new(5.0, 5.0)), None);
    assert_eq!(view.visible_image_rect(), None);
    assert!(view.display_frame().is_none());
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn test_map_to_image_coordinates_none_outside() {
    let view = view_with_image(200.0, 100.0, 100, 100);
    assert!(view.map_to_image_coordinates(Point::new(20.0, 50.0)).is_none());
    let p = view.map_to_image_coordinates(Point::new(100.0, 50.0)).unwrap();
    assert_abs_diff_eq!(p.x, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.y, 50.0, epsilon = 1e-9);
}

#[test]
fn test_visible_rect_at_fit_and_zoomed() {
    let mut view = view_with_image(100.0, 100.0, 400, 400);
    let r = view.visible_image_rect().unwrap();
    assert_abs_diff_eq!(r.area(), 400.0 * 400.0, epsilon = 1e-6);

    view.set_zoom_base(2.0);
    view.zoom_by(1.0, Point::new(50.0, 50.0));
    let r = view.visible_image_rect().unwrap();
    assert_abs_diff_eq!(r.x0, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.x1, 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.y0, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.y1, 300.0, epsilon = 1e-9);
}

#[test]
fn test_map_roundtrip_through_view() {
    let mut view = view_with_image(300.0, 200.0, 640, 480);
    view.set_rotation(30.0);
    view.zoom_by(2.0, Point::new(120.0, 80.0));
    let p = Point::new(320.0, 200.0);
    let screen = view.map_from_image(p).unwrap();
    let back = view.map_to_image_coordinates(screen).unwrap();
    assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-7);
    assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-7);
}

// ---------------------------------------------------------------------------
// Display raster
// ---------------------------------------------------------------------------

#[test]
fn test_downscaled_display_raster() {
    let mut view = view_with_image(100.0, 100.0, 400, 400);
    let surface = paint(&mut view);
    assert_eq!(drawn_raster_size(&surface), (100, 100));

    let frame = view.display_frame().unwrap();
    let corner = frame.transform * Point::new(100.0, 100.0);
    assert_abs_diff_eq!(corner.x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(corner.y, 100.0, epsilon = 1e-9);
}

#[test]
fn test_full_raster_when_downscaling_disabled() {
    let mut view = view_with_image(100.0, 100.0, 400, 400);
    view.set_high_quality_downscaling(false);
    assert_eq!(drawn_raster_size(&paint(&mut view)), (400, 400));
}

#[test]
fn test_full_raster_at_or_above_unit_scale() {
    let mut view = view_with_image(400.0, 400.0, 100, 100);
    assert_eq!(drawn_raster_size(&paint(&mut view)), (100, 100));
    let frame = view.display_frame().unwrap();
    assert_eq!(frame.filter, FilterMode::Linear);

    view.set_smooth_transform(false);
    assert_eq!(view.display_frame().unwrap().filter, FilterMode::Nearest);
}

#[test]
fn test_resample_not_repeated_on_pan() {
    let (mut view, counter) = counted_view(100.0, 1000);
    view.zoom_by(1.0, Point::new(50.0, 50.0));
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 1);

    view.pan_by(Vec2::new(15.0, -7.0));
    paint(&mut view);
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 1);

    view.zoom_by(1.0, Point::new(50.0, 50.0));
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_resample_triggers() {
    let (mut view, counter) = counted_view(100.0, 1000);
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 1);

    view.set_sharpening(true, 0.6, 1.0);
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 2);

    // Unchanged settings do not invalidate.
    view.set_sharpening(true, 0.6, 1.0);
    view.set_outline_color(Color::rgb(1, 2, 3));
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 2);

    view.set_high_quality_downscaling(false);
    paint(&mut view);
    view.set_high_quality_downscaling(true);
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 3);

    view.assign_image(ramp_raster(1000, 1000));
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 4);

    // Rotation changes the fit scale.
    view.set_rotation(45.0);
    paint(&mut view);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 5);
}

#[test]
fn test_precomputed_downsample_used_while_scale_matches() {
    let counter = Arc::new(UploadCounter::default());
    let resampler =
        Resampler::new(DevicePreference::Auto).with_accelerated_backend(counter.clone());
    let mut view = ImageView::new(Size::new(100.0, 100.0)).with_resampler(resampler);
    view.assign_image_with_downsampled(ramp_raster(400, 400), uniform_raster(100, 100, 7));

    let surface = paint(&mut view);
    assert_eq!(drawn_raster_size(&surface), (100, 100));
    assert_eq!(view.display_frame().unwrap().raster.data()[0], 7);
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 0);

    view.zoom_by(1.0, Point::new(50.0, 50.0));
    let surface = paint(&mut view);
    assert_eq!(drawn_raster_size(&surface), (150, 150));
    assert_eq!(counter.uploads.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Paint order and hooks
// ---------------------------------------------------------------------------

#[test]
fn test_paint_order_and_post_paint_hooks() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_background_color(Color::rgb(5, 5, 5));
    view.set_points(vec![Point::new(10.0, 10.0)]);
    view.add_post_paint(|s: &mut dyn Surface| {
        s.draw_text(Point::ZERO, "first", Color::rgb(0, 0, 0))
    });
    view.add_post_paint(|s: &mut dyn Surface| {
        s.draw_text(Point::ZERO, "second", Color::rgb(0, 0, 0))
    });

    let surface = paint(&mut view);
    let calls = &surface.calls;
    assert_eq!(calls[0], DrawCall::Background(Color::rgb(5, 5, 5)));
    assert!(matches!(calls[1], DrawCall::Raster { .. }));
    assert!(calls.contains(&DrawCall::Circle(Point::new(10.0, 10.0))));
    let n = calls.len();
    assert_eq!(calls[n - 2], DrawCall::Text("first".into()));
    assert_eq!(calls[n - 1], DrawCall::Text("second".into()));
}

#[test]
fn test_masks_are_drawn() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_overlay_mask(Some(BitMask::new(100, 100)));
    view.set_painting_active(true);
    let surface = paint(&mut view);
    let masks = surface
        .calls
        .iter()
        .filter(|c| matches!(c, DrawCall::Mask { .. }))
        .count();
    assert_eq!(masks, 2);
}

#[test]
fn test_painting_leaves_overlay_mask_revision_alone() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_overlay_mask(Some(BitMask::new(100, 100)));
    view.set_painting_active(true);
    let before = paint(&mut view).masks();

    let e = vista_core::interaction::PointerEvent::primary(50.0, 50.0);
    view.pointer_down(&e);
    view.pointer_up(&e);
    let after = paint(&mut view).masks();

    assert_eq!(before.len(), 2);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert!(after[1].0 > before[1].0);
    assert_ne!(after[0].0, after[1].0);
}

// ---------------------------------------------------------------------------
// Overlays and notifications
// ---------------------------------------------------------------------------

#[test]
fn test_programmatic_edits_do_not_notify() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    let events = common::record_events(&mut view);
    let i = view.add_point(Point::new(1.0, 2.0));
    assert_eq!(i, 0);
    assert_eq!(view.delete_point(0), Some(Point::new(1.0, 2.0)));
    assert_eq!(view.delete_point(0), None);
    view.set_polyline(vec![Point::ZERO]);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_filtered_subscription() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_interaction_feature(InteractionFeature::PointEditing);
    let added = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&added);
    view.subscribe(EventKind::PointAdded, move |e| sink.borrow_mut().push(e.clone()));

    let e = vista_core::interaction::PointerEvent::primary(20.0, 20.0);
    view.pointer_down(&e);
    view.pointer_up(&e);

    assert_eq!(*added.borrow(), vec![ViewEvent::PointAdded(0)]);
}

#[test]
fn test_shrinking_polyline_prunes_selection() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_polyline(vec![Point::ZERO, Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
    view.set_polyline_selected(true);
    view.set_interaction_feature(InteractionFeature::PolylineEditing);
    let e = vista_core::interaction::PointerEvent::primary(2.0, 2.0);
    view.pointer_down(&e);
    view.pointer_up(&e);
    assert!(view.polyline_selection().contains(2));
    view.set_polyline(vec![Point::ZERO, Point::new(1.0, 1.0)]);
    assert!(!view.polyline_selection().contains(2));
}

#[test]
fn test_take_and_clear_paint_mask() {
    let mut view = view_with_image(100.0, 100.0, 100, 100);
    view.set_painting_active(true);
    let e = vista_core::interaction::PointerEvent::primary(50.0, 50.0);
    view.pointer_down(&e);
    view.pointer_up(&e);
    assert!(!view.paint_mask().unwrap().is_empty());
    view.clear_paint_mask();
    assert!(view.paint_mask().unwrap().is_empty());
    let taken = view.take_paint_mask();
    assert!(taken.is_some());
    assert!(view.paint_mask().is_none());
}
