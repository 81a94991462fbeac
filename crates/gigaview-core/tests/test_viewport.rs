mod common;

use approx::assert_abs_diff_eq;
use kurbo::{Point, Rect, Vec2};

use common::{assert_close, raster_info, world_info};
use gigaview_core::canvas::{Boundary, CanvasFrame};
use gigaview_core::config::ViewerConfig;
use gigaview_core::error::ViewerError;
use gigaview_core::geometry::PixelRect;
use gigaview_core::viewport::{ImageId, SkipReason, ViewMode, ViewportController, ZoomDirection};

fn controller() -> ViewportController {
    ViewportController::new(&ViewerConfig::default())
}

#[test]
fn test_world_fit_in_800x600() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    c.zoom_fit().unwrap();

    let v = c.view();
    assert_eq!(v.zoom_level, 0);
    assert_eq!(c.mode(), ViewMode::Fitted);
    // Uniform scale: aspect ratio preserved
    assert_close(v.scale_x / v.scale_y, 1.0, 1e-12);
    assert_close(v.scale_x, 800.0 / 360.0, 1e-9);
    // Centred: 800x400 drawn with 100px bands above and below
    assert_close(v.translate_x, 0.0, 1e-9);
    assert_close(v.translate_y, 100.0, 1e-9);

    let centre = c.screen_to_world(Point::new(400.0, 300.0)).unwrap();
    assert_abs_diff_eq!(centre.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(centre.y, 0.0, epsilon = 1e-9);
    let top_left = c.screen_to_world(Point::new(0.0, 100.0)).unwrap();
    assert_abs_diff_eq!(top_left.x, -180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(top_left.y, 90.0, epsilon = 1e-9);
}

#[test]
fn test_zoom_in_clamps_at_max_level() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let pivot = Point::new(400.0, 300.0);
    for _ in 0..8 {
        assert!(c.zoom_at(ZoomDirection::In, pivot));
    }
    assert_eq!(c.zoom_level(), 8);
    let before = c.view();

    assert!(!c.zoom_at(ZoomDirection::In, pivot));
    assert_eq!(c.zoom_level(), 8);
    assert_eq!(c.view(), before);
}

#[test]
fn test_zoom_out_clamps_at_min_level() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    for _ in 0..4 {
        assert!(c.zoom_out());
    }
    assert_eq!(c.zoom_level(), -4);
    assert!(!c.zoom_out());
    assert_eq!(c.zoom_level(), -4);
}

#[test]
fn test_zoom_steps_scale_monotonically() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    while c.zoom_out() {}
    let mut previous = c.view().scale_x;
    while c.zoom_in() {
        let scale = c.view().scale_x;
        assert!(scale > previous);
        assert_close(scale / previous, 1.0 / 0.8, 1e-9);
        previous = scale;
    }
}

#[test]
fn test_zoom_keeps_pivot_fixed() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    let pivot = Point::new(250.0, 170.0);
    let before = c.screen_to_world(pivot).unwrap();
    let pixel_before = c.screen_to_image(id, pivot).unwrap();

    assert!(c.zoom_at(ZoomDirection::In, pivot));
    assert!(c.zoom_at(ZoomDirection::In, pivot));
    let after_in = c.screen_to_world(pivot).unwrap();
    assert_abs_diff_eq!(after_in.x, before.x, epsilon = 1e-9);
    assert_abs_diff_eq!(after_in.y, before.y, epsilon = 1e-9);
    let pixel_in = c.screen_to_image(id, pivot).unwrap();
    assert_abs_diff_eq!(pixel_in.x, pixel_before.x, epsilon = 1e-9);
    assert_abs_diff_eq!(pixel_in.y, pixel_before.y, epsilon = 1e-9);

    assert!(c.zoom_at(ZoomDirection::Out, pivot));
    let after_out = c.screen_to_world(pivot).unwrap();
    assert_abs_diff_eq!(after_out.x, before.x, epsilon = 1e-9);
    assert_abs_diff_eq!(after_out.y, before.y, epsilon = 1e-9);
    let pixel_out = c.screen_to_image(id, pivot).unwrap();
    assert_abs_diff_eq!(pixel_out.x, pixel_before.x, epsilon = 1e-9);
    assert_abs_diff_eq!(pixel_out.y, pixel_before.y, epsilon = 1e-9);
}

#[test]
fn test_zoom_in_then_out_restores_scale() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let pivot = Point::new(610.0, 95.0);
    let before = c.view();

    assert!(c.zoom_at(ZoomDirection::In, pivot));
    assert!(c.zoom_at(ZoomDirection::Out, pivot));
    let after = c.view();
    assert_close(after.scale_x, before.scale_x, 1e-12);
    assert_close(after.scale_y, before.scale_y, 1e-12);
    assert_close(after.translate_x, before.translate_x, 1e-9);
    assert_close(after.translate_y, before.translate_y, 1e-9);
    assert_eq!(after.zoom_level, before.zoom_level);
}

#[test]
fn test_zoom_fit_restores_fitted_state() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let fitted = c.view();
    c.zoom_in();
    c.pan(Vec2::new(-35.0, 12.0));
    assert_eq!(c.mode(), ViewMode::Navigated);

    c.zoom_fit().unwrap();
    assert_eq!(c.mode(), ViewMode::Fitted);
    assert_eq!(c.view(), fitted);
}

#[test]
fn test_empty_controller_ignores_gestures() {
    let mut c = controller();
    assert_eq!(c.mode(), ViewMode::Empty);
    assert!(!c.zoom_in());
    c.pan(Vec2::new(10.0, 10.0));
    assert!(c.zoom_fit().is_ok());
    assert_eq!(c.mode(), ViewMode::Empty);
    assert!(c.screen_to_world(Point::new(1.0, 1.0)).is_none());
    assert!(c.plan_frame().placements.is_empty());
}

#[test]
fn test_pan_out_of_view_yields_empty_rect_and_no_placement() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    c.pan(Vec2::new(10_000.0, 0.0));

    let rect = c.compute_visible_source_rect(id).unwrap();
    assert!(rect.is_empty());

    let plan = c.plan_frame();
    assert!(plan.placements.is_empty());
    assert_eq!(plan.skip_reason(id), Some(SkipReason::OutOfView));
}

#[test]
fn test_pan_moves_translation_without_bounds() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let before = c.view();
    c.pan(Vec2::new(-1e6, 2.5));
    let after = c.view();
    assert_close(after.translate_x, before.translate_x - 1e6, 1e-6);
    assert_close(after.translate_y, before.translate_y + 2.5, 1e-9);
    assert_eq!(after.scale_x, before.scale_x);
}

#[test]
fn test_recenter_keeps_scale_and_centres_canvas() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    c.zoom_at(ZoomDirection::In, Point::new(100.0, 100.0));
    c.pan(Vec2::new(250.0, -40.0));
    let zoomed = c.view();

    c.recenter();
    let v = c.view();
    assert_eq!(v.scale_x, zoomed.scale_x);
    assert_eq!(v.zoom_level, zoomed.zoom_level);
    assert_eq!(c.mode(), ViewMode::Navigated);
    let centre = c.screen_to_world(Point::new(400.0, 300.0)).unwrap();
    assert_abs_diff_eq!(centre.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(centre.y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_visible_source_rect_after_fit_is_whole_image() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    assert_eq!(c.compute_visible_source_rect(id).unwrap(), PixelRect::full(360, 180));
}

#[test]
fn test_visible_source_rect_when_zoomed_in() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    c.zoom_in();
    let rect = c.compute_visible_source_rect(id).unwrap();
    // 1.25x about the centre: the middle 80% of the width stays visible
    assert!(rect.width < 360 && rect.width >= 288);
    assert_eq!(rect.height, 180);
}

#[test]
fn test_two_images_merge_and_lay_out() {
    let mut c = controller();
    let a = c
        .open_image(&raster_info("a", 100, 100, Some([0.0, 0.0, 10.0, 10.0])))
        .unwrap();
    let b = c
        .open_image(&raster_info("b", 150, 150, Some([5.0, 5.0, 20.0, 20.0])))
        .unwrap();

    assert_eq!(c.canvas(), Some(&Boundary::new(0.0, 0.0, 20.0, 20.0).unwrap()));
    assert_eq!(c.canvas_frame(), Some(CanvasFrame::Geographic));

    let v = c.view();
    assert_close(v.scale_x, 30.0, 1e-9);
    assert_close(v.translate_x, 100.0, 1e-9);
    assert_close(v.translate_y, 0.0, 1e-9);

    let ia = c.image(a).unwrap();
    assert_eq!(ia.screen_rect(&v), Rect::new(100.0, 300.0, 400.0, 600.0));
    let ib = c.image(b).unwrap();
    assert_eq!(ib.screen_rect(&v), Rect::new(250.0, 0.0, 700.0, 450.0));
    assert_close(ib.view_width(), 450.0, 1e-9);
}

#[test]
fn test_adding_an_image_refits_and_resets_zoom_level() {
    let mut c = controller();
    c.open_image(&raster_info("a", 100, 100, Some([0.0, 0.0, 10.0, 10.0])))
        .unwrap();
    c.zoom_in();
    c.zoom_in();
    assert_eq!(c.zoom_level(), 2);

    c.open_image(&raster_info("b", 100, 100, Some([10.0, 0.0, 20.0, 10.0])))
        .unwrap();
    assert_eq!(c.zoom_level(), 0);
    assert_eq!(c.mode(), ViewMode::Fitted);
    assert_close(c.view().scale_x, 40.0, 1e-9);
}

#[test]
fn test_unreferenced_image_rejected_after_georeferenced() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let err = c
        .open_image(&raster_info("scan.png", 640, 480, None))
        .unwrap_err();
    assert!(matches!(err, ViewerError::NoSpatialReference { .. }));
    assert_eq!(c.images().len(), 1);
}

#[test]
fn test_pixel_space_canvas() {
    let mut c = controller();
    let id = c.open_image(&raster_info("scan.png", 640, 480, None)).unwrap();
    assert_eq!(c.canvas_frame(), Some(CanvasFrame::PixelSpace));
    assert_close(c.view().scale_x, 1.25, 1e-12);
    assert!(c.screen_to_world(Point::new(400.0, 300.0)).is_none());

    let p = c.screen_to_image(id, Point::new(400.0, 300.0)).unwrap();
    assert_close(p.x, 320.0, 1e-9);
    assert_close(p.y, 240.0, 1e-9);
    assert!(!c.image(id).unwrap().is_georeferenced());
}

#[test]
fn test_screen_to_image_on_world_fit() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    let p = c.screen_to_image(id, Point::new(400.0, 300.0)).unwrap();
    assert_close(p.x, 180.0, 1e-9);
    assert_close(p.y, 90.0, 1e-9);
    let origin = c.screen_to_image(id, Point::new(0.0, 100.0)).unwrap();
    assert_close(origin.x, 0.0, 1e-9);
    assert_close(origin.y, 0.0, 1e-9);
}

#[test]
fn test_unknown_image_is_an_error() {
    let c = controller();
    assert!(matches!(
        c.screen_to_image(ImageId(42), Point::ORIGIN),
        Err(ViewerError::UnknownImage(ImageId(42)))
    ));
}

#[test]
fn test_zero_extent_canvas_cannot_fit() {
    let mut c = controller();
    let err = c
        .open_image(&raster_info("point", 10, 10, Some([5.0, 5.0, 5.0, 5.0])))
        .unwrap_err();
    assert!(matches!(err, ViewerError::SingularTransform { .. }));
    assert_eq!(c.mode(), ViewMode::Empty);
    assert!(c.images().is_empty());
    assert!(c.canvas().is_none());
}

#[test]
fn test_zero_extent_on_one_axis_fits_the_other() {
    let mut c = controller();
    c.open_image(&raster_info("line", 10, 1, Some([0.0, 5.0, 10.0, 5.0])))
        .unwrap();
    assert_close(c.view().scale_x, 80.0, 1e-9);
}

#[test]
fn test_resize_keeps_transform() {
    let mut c = controller();
    c.open_image(&world_info(360, 180)).unwrap();
    let before = c.view();
    c.resize(1024, 768);
    let after = c.view();
    assert_eq!(after.viewport_width, 1024);
    assert_eq!(after.viewport_height, 768);
    assert_eq!(after.scale_x, before.scale_x);
    assert_eq!(after.translate_y, before.translate_y);
}

#[test]
fn test_plan_frame_after_fit() {
    let mut c = controller();
    let id = c.open_image(&world_info(360, 180)).unwrap();
    let plan = c.plan_frame();
    let p = plan.placement(id).unwrap();
    assert_eq!(p.window.level_index, 0);
    assert_eq!(p.window.rect, PixelRect::full(360, 180));
    assert_eq!(p.source_rect, PixelRect::full(360, 180));
    assert_eq!(p.screen_rect, Rect::new(0.0, 100.0, 800.0, 500.0));
    assert_eq!((p.target_width, p.target_height), (800, 400));
}

#[test]
fn test_plan_frame_uses_coarse_level_when_zoomed_out() {
    let mut c = controller();
    let id = c.open_image(&world_info(3600, 1800)).unwrap();
    let plan = c.plan_frame();
    let p = plan.placement(id).unwrap();
    // 800 / 3600 screen pixels per source pixel: factor 4 is the coarsest
    // level that still has one level pixel per screen pixel
    assert_eq!(p.window.factor, 4);
    assert_eq!(p.window.rect, PixelRect::full(900, 450));
    assert_eq!((p.target_width, p.target_height), (800, 400));
}

#[test]
fn test_plan_frame_level_gets_finer_when_zooming_in() {
    let mut c = controller();
    let id = c.open_image(&world_info(3600, 1800)).unwrap();
    let mut previous = c.plan_frame().placement(id).unwrap().window.factor;
    while c.zoom_in() {
        let factor = c.plan_frame().placement(id).unwrap().window.factor;
        assert!(factor <= previous);
        previous = factor;
    }
    assert_eq!(previous, 1);
}
