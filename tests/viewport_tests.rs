// Host-side tests for viewport sizing and vertical scale.

use biosignal_plot::{FixedContainer, PlotConfig, PlotError, Viewport};
use std::rc::Rc;

fn attached(width: f64, height: f64) -> (Viewport, Rc<FixedContainer>) {
    let container = Rc::new(FixedContainer::new(width, height));
    let mut viewport = Viewport::new(&PlotConfig::default());
    viewport.attach(container.clone());
    (viewport, container)
}

#[test]
fn defaults_to_ten_reference_units() {
    let viewport = Viewport::new(&PlotConfig::default());
    assert_eq!(viewport.height_in_sens_ref_units(), 10.0);
    assert!(!viewport.is_drawable());

    let (viewport, _) = attached(400.0, 300.0);
    assert_eq!(viewport.px_per_sens_ref_unit(), 30.0);
    assert_eq!(viewport.height_in_sens_ref_units(), 10.0);
    assert!(viewport.is_drawable());
}

#[test]
fn scale_setters_round_trip() {
    let (mut viewport, _) = attached(400.0, 300.0);
    viewport.set_height_in_sens_ref_units(5.0).unwrap();
    assert_eq!(viewport.px_per_sens_ref_unit(), 60.0);
    assert_eq!(viewport.height_in_sens_ref_units(), 5.0);

    viewport.set_px_per_sens_ref_unit(15.0).unwrap();
    assert_eq!(viewport.height_in_sens_ref_units(), 20.0);
}

#[test]
fn height_set_before_attach_resolves_on_attach() {
    let mut viewport = Viewport::new(&PlotConfig::default());
    viewport.set_height_in_sens_ref_units(20.0).unwrap();
    assert_eq!(viewport.height_in_sens_ref_units(), 20.0);

    viewport.attach(Rc::new(FixedContainer::new(400.0, 300.0)));
    assert_eq!(viewport.px_per_sens_ref_unit(), 15.0);
    assert_eq!(viewport.height_in_sens_ref_units(), 20.0);
}

#[test]
fn config_px_per_unit_takes_precedence() {
    let config = PlotConfig {
        px_per_sens_ref_unit: Some(50.0),
        height_in_sens_ref_units: Some(3.0),
        ..PlotConfig::default()
    };
    let mut viewport = Viewport::new(&config);
    viewport.attach(Rc::new(FixedContainer::new(400.0, 300.0)));
    assert_eq!(viewport.px_per_sens_ref_unit(), 50.0);
    assert_eq!(viewport.height_in_sens_ref_units(), 6.0);
}

#[test]
fn non_positive_scale_is_rejected() {
    let (mut viewport, _) = attached(400.0, 300.0);
    for bad in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            viewport.set_px_per_sens_ref_unit(bad),
            Err(PlotError::NonPositive { .. })
        ));
        assert!(viewport.set_height_in_sens_ref_units(bad).is_err());
    }
    assert_eq!(viewport.px_per_sens_ref_unit(), 30.0);
}

#[test]
fn width_is_pinned_against_horizontal_reflow() {
    let (mut viewport, container) = attached(400.0, 300.0);
    container.set_size(640.0, 300.0);
    assert!(!viewport.refresh());
    assert_eq!(viewport.width(), 400.0);

    assert!(viewport.reset_width(None));
    assert_eq!(viewport.width(), 640.0);

    viewport.reset_width(Some(100.0));
    assert_eq!(viewport.physical_size(), (100, 300));
}

#[test]
fn height_changes_keep_pixels_per_unit() {
    let (mut viewport, container) = attached(400.0, 300.0);
    container.set_size(400.0, 600.0);
    assert!(viewport.refresh());
    assert_eq!(viewport.physical_size(), (400, 600));
    assert_eq!(viewport.px_per_sens_ref_unit(), 30.0);
    assert_eq!(viewport.height_in_sens_ref_units(), 20.0);
}

#[test]
fn device_pixel_ratio_scales_backing_store_only() {
    let (mut viewport, container) = attached(400.0, 300.0);
    container.set_device_pixel_ratio(2.0);
    viewport.refresh();
    assert_eq!(viewport.physical_size(), (800, 600));
    assert_eq!(viewport.logical_size(), (400.0, 300.0));
    assert_eq!(viewport.height_in_sens_ref_units(), 10.0);

    container.set_device_pixel_ratio(0.0);
    viewport.refresh();
    assert_eq!(viewport.device_pixel_ratio(), 1.0);
}

#[test]
fn zero_height_container_is_not_drawable() {
    let (mut viewport, container) = attached(400.0, 0.0);
    assert!(!viewport.is_drawable());
    assert_eq!(viewport.height_in_sens_ref_units(), 10.0);

    container.set_size(400.0, 200.0);
    viewport.refresh();
    assert!(viewport.is_drawable());
    assert_eq!(viewport.px_per_sens_ref_unit(), 20.0);
}
