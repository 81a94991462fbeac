mod common;

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use kurbo::Point;

use common::{geo_dataset, gradient_image, plain_dataset, FlakyDataset};
use gigaview_core::config::ViewerConfig;
use gigaview_core::error::ViewerError;
use gigaview_core::events::ViewerEvent;
use gigaview_core::fetch::{FetchCompletion, FetchRequest, FetchScheduler, RequestId};
use gigaview_core::session::ViewerSession;
use gigaview_core::source::{ImageRasterSource, RasterDataset};
use gigaview_core::viewport::{ViewportController, ZoomDirection};

const WORLD: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

fn session() -> (ViewerSession, Receiver<ViewerEvent>) {
    ViewerSession::new(ViewerConfig::default(), Arc::new(ImageRasterSource::default())).unwrap()
}

fn drain(rx: &Receiver<ViewerEvent>) -> Vec<ViewerEvent> {
    rx.try_iter().collect()
}

#[test]
fn test_open_fetches_first_frame() {
    let (mut s, rx) = session();
    let id = s
        .open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    s.flush();

    let frame = s.displayed_frame(id).unwrap();
    assert_eq!(frame.view, s.view());
    assert_eq!((frame.buffer.width(), frame.buffer.height()), (800, 400));
    assert_eq!(frame.placement.window.level_index, 0);

    let events = drain(&rx);
    assert!(matches!(
        events.first(),
        Some(ViewerEvent::ImageOpened(summary)) if summary.file_name == "world"
    ));
    assert!(events.contains(&ViewerEvent::FrameUpdated { image: id }));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = ViewerConfig::default();
    config.zoom.step_rate = 1.5;
    let result = ViewerSession::new(config, Arc::new(ImageRasterSource::default()));
    assert!(matches!(result, Err(ViewerError::InvalidConfig(_))));
}

#[test]
fn test_failed_fetch_keeps_previous_frame() {
    let (mut s, rx) = session();
    let flaky = FlakyDataset::new(geo_dataset("world", &gradient_image(360, 180), WORLD));
    let id = s.open_dataset(flaky.clone()).unwrap();
    s.flush();
    let good = s.displayed_frame(id).unwrap().clone();
    drain(&rx);

    flaky.set_failing(true);
    s.pan(25.0, -10.0);
    assert_eq!(s.flush(), 0);

    let kept = s.displayed_frame(id).unwrap();
    assert_eq!(kept, &good);
    // The view steps back to what is on screen.
    assert_eq!(kept.view, s.view());
    let events = drain(&rx);
    assert!(events.iter().any(
        |e| matches!(e, ViewerEvent::Notice { message } if message.contains("disk unplugged"))
    ));
    assert!(!events.contains(&ViewerEvent::FrameUpdated { image: id }));

    flaky.set_failing(false);
    s.pan(1.0, 0.0);
    s.flush();
    assert_eq!(s.displayed_frame(id).unwrap().view, s.view());
}

#[test]
fn test_failed_zoom_does_not_advance_zoom_level() {
    let (mut s, _rx) = session();
    let flaky = FlakyDataset::new(geo_dataset("world", &gradient_image(360, 180), WORLD));
    let id = s.open_dataset(flaky.clone()).unwrap();
    s.flush();
    let fitted = s.view();

    flaky.set_failing(true);
    s.zoom_in();
    s.flush();

    let v = s.view();
    assert_eq!(v.zoom_level, 0);
    assert_eq!(v.scale_x, fitted.scale_x);
    assert_eq!(v.translate_x, fitted.translate_x);
    assert_eq!(v.translate_y, fitted.translate_y);
    assert_eq!(s.displayed_frame(id).unwrap().view, v);

    flaky.set_failing(false);
    s.zoom_in();
    s.flush();
    assert_eq!(s.view().zoom_level, 1);
    assert_eq!(s.displayed_frame(id).unwrap().view, s.view());
}

#[test]
fn test_panned_out_image_issues_no_fetch() {
    let (mut s, rx) = session();
    let id = s
        .open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    s.flush();
    drain(&rx);

    s.pan(10_000.0, 0.0);
    assert_eq!(s.flush(), 0);
    assert!(drain(&rx).is_empty());
    assert!(s.controller().compute_visible_source_rect(id).unwrap().is_empty());
}

#[test]
fn test_only_the_latest_request_lands() {
    let (mut s, _rx) = session();
    let id = s
        .open_dataset(geo_dataset("world", &gradient_image(720, 360), WORLD))
        .unwrap();
    let pivot = Point::new(300.0, 200.0);
    for _ in 0..5 {
        s.zoom_at(ZoomDirection::In, pivot);
    }
    s.pan(-40.0, 15.0);
    s.flush();

    let frame = s.displayed_frame(id).unwrap();
    assert_eq!(frame.view, s.view());
    assert_eq!(frame.placement, *s.controller().plan_frame().placement(id).unwrap());
}

#[test]
fn test_scheduler_rejects_superseded_completion() {
    let dataset = geo_dataset("world", &gradient_image(360, 180), WORLD);
    let mut controller = ViewportController::new(&ViewerConfig::default());
    let id = controller.open_image(dataset.info()).unwrap();
    let plan = controller.plan_frame();
    let placement = plan.placement(id).unwrap().clone();
    let request = FetchRequest {
        placement,
        view: plan.view,
    };

    let mut scheduler = FetchScheduler::spawn().unwrap();
    let first = scheduler.submit(dataset.clone(), request.clone());
    let second = scheduler.submit(dataset.clone(), request.clone());
    assert!(first < second);
    assert!(!scheduler.is_current(id, first));
    assert!(scheduler.is_current(id, second));

    let stale = FetchCompletion {
        id: first,
        request: request.clone(),
        outcome: Err(ViewerError::Cancelled),
    };
    assert!(!scheduler.accept(&stale));

    loop {
        let completion = scheduler.recv().unwrap();
        if completion.id == second {
            assert!(scheduler.accept(&completion));
            assert!(completion.outcome.is_ok());
            break;
        }
        assert!(!scheduler.accept(&completion));
    }
    assert_eq!(scheduler.pending(), 0);
    assert!(!scheduler.is_current(id, RequestId(second.0 + 1)));
}

#[test]
fn test_status_line_on_georeferenced_canvas() {
    let (mut s, _rx) = session();
    s.open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    assert_eq!(
        s.status_line(Point::new(200.0, 150.0)).unwrap(),
        "Map(-90.000000, 67.500000), Image(90.0, 22.5), Display(200, 150)"
    );
    let world = s.screen_to_world(Point::new(200.0, 150.0)).unwrap();
    assert!((world.x + 90.0).abs() < 1e-9);
    assert!((world.y - 67.5).abs() < 1e-9);
}

#[test]
fn test_status_line_on_pixel_space_canvas() {
    let (mut s, _rx) = session();
    assert!(s.status_line(Point::new(1.0, 1.0)).is_none());
    s.open_dataset(plain_dataset("scan", &gradient_image(640, 480)))
        .unwrap();
    assert_eq!(
        s.status_line(Point::new(400.0, 300.0)).unwrap(),
        "Map(-, -), Image(320.0, 240.0), Display(400, 300)"
    );
    assert!(s.screen_to_world(Point::new(400.0, 300.0)).is_none());
}

#[test]
fn test_unreferenced_second_image_is_rejected() {
    let (mut s, _rx) = session();
    s.open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    let err = s
        .open_dataset(plain_dataset("scan", &gradient_image(10, 10)))
        .unwrap_err();
    assert!(matches!(err, ViewerError::NoSpatialReference { ref name } if name == "scan"));
    assert_eq!(s.controller().images().len(), 1);
}

#[test]
fn test_zoom_limits_at_session_level() {
    let (mut s, _rx) = session();
    s.open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    let mut steps = 0;
    while s.zoom_in() {
        steps += 1;
    }
    assert_eq!(steps, 8);
    assert!(!s.zoom_in());
    s.zoom_fit().unwrap();
    assert_eq!(s.view().zoom_level, 0);
    assert!(s.zoom_out());
}

#[test]
fn test_resize_refetches_for_new_viewport() {
    let (mut s, _rx) = session();
    let id = s
        .open_dataset(geo_dataset("world", &gradient_image(360, 180), WORLD))
        .unwrap();
    s.flush();
    s.on_resize(400, 300);
    s.flush();
    let frame = s.displayed_frame(id).unwrap();
    assert_eq!(frame.view.viewport_width, 400);
    assert_eq!(frame.view.viewport_height, 300);
    // Transform unchanged, so the image now overflows the viewport.
    assert_eq!(frame.placement.screen_rect.y0, 100.0);
}

#[test]
fn test_open_executed_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("scan.png");
    RgbImage::from_pixel(64, 48, Rgb([200, 10, 10])).save(&png).unwrap();

    let (mut s, rx) = session();
    let id = s.open_executed(&png).unwrap();
    s.flush();

    let events = drain(&rx);
    assert!(events.contains(&ViewerEvent::Progress { percent: 100 }));
    assert!(events.iter().any(|e| matches!(
        e,
        ViewerEvent::ImageOpened(summary) if summary.width == 64 && summary.height == 48
    )));
    let frame = s.displayed_frame(id).unwrap();
    assert_eq!(frame.buffer.rgba(0, 0), [200, 10, 10, 255]);
}

#[test]
fn test_open_executed_missing_file() {
    let (mut s, _rx) = session();
    let err = s.open_executed(std::path::Path::new("/nonexistent/raster.png")).unwrap_err();
    assert!(matches!(err, ViewerError::UnreadableSource { .. }));
    assert!(s.controller().images().is_empty());
}
