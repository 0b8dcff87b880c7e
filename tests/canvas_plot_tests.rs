// Host-side tests for the 2-D plot, drawn into a tiny-skia pixmap.

use biosignal_plot::{
    BiosignalPlot, Canvas2d, CanvasPlot, ChannelConfig, Color, FixedContainer, PixmapCanvas,
    PlotConfig, PlotError, Polarity,
};
use glam::Vec2;
use std::rc::Rc;

const W: f64 = 400.0;
const H: f64 = 300.0;

fn red_channel(length: usize) -> ChannelConfig {
    ChannelConfig {
        color: Color::new(1.0, 0.0, 0.0, 1.0),
        length,
        sensitivity: 1.0,
        sampling_rate: 200.0,
        samples_per_px: 1.0,
        downsample_factor: 1,
        polarity: Polarity::Normal,
        scale: 0,
        offset: 0.5,
    }
}

fn attached_plot(config: PlotConfig) -> (CanvasPlot<PixmapCanvas>, Rc<FixedContainer>) {
    let container = Rc::new(FixedContainer::new(W, H));
    let mut plot = CanvasPlot::<PixmapCanvas>::new(config);
    plot.add_to(container.clone());
    (plot, container)
}

fn pixel(plot: &CanvasPlot<PixmapCanvas>, x: u32, y: u32) -> [u8; 4] {
    plot.surface().unwrap().pixel(x, y).unwrap()
}

fn is_red(p: [u8; 4]) -> bool {
    p[0] > 200 && p[1] < 60 && p[2] < 60
}

/// Rows of column `x` holding a red pixel.
fn red_rows(plot: &CanvasPlot<PixmapCanvas>, x: u32) -> Vec<u32> {
    let (_, h) = plot.surface_size();
    (0..h).filter(|&y| is_red(pixel(plot, x, y))).collect()
}

#[test]
fn flat_trace_is_drawn_at_its_offset() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    assert!(plot.is_ready());
    assert!(!plot.is_accelerated());
    plot.add_channel(red_channel(400)).unwrap();
    plot.update();

    assert_eq!(plot.surface_size(), (400, 300));
    let rows = red_rows(&plot, 200);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| (147..=152).contains(&y)), "rows {rows:?}");
    // Background stays white
    assert_eq!(pixel(&plot, 200, 20), [255, 255, 255, 255]);
}

#[test]
fn amplitude_follows_sensitivity_and_polarity() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let id = plot.add_channel(red_channel(400)).unwrap();
    // One unit at sensitivity 1 is a tenth of the height: 30 px up.
    plot.trace_mut(id).unwrap().set_data(1.0_f32, None).unwrap();
    plot.update();
    let rows = red_rows(&plot, 200);
    assert!(rows.iter().all(|&y| (117..=122).contains(&y)), "rows {rows:?}");

    plot.trace_mut(id).unwrap().set_polarity(Polarity::Inverted);
    plot.update();
    let rows = red_rows(&plot, 200);
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|&y| (177..=182).contains(&y)), "rows {rows:?}");

    plot.trace_mut(id).unwrap().set_sensitivity(2.0).unwrap();
    plot.update();
    let rows = red_rows(&plot, 200);
    assert!(rows.iter().all(|&y| (162..=167).contains(&y)), "rows {rows:?}");
}

#[test]
fn hidden_trace_is_not_drawn() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let id = plot.add_channel(red_channel(400)).unwrap();
    plot.trace_mut(id).unwrap().set_render(false);
    plot.update();
    assert!(red_rows(&plot, 200).is_empty());
}

#[test]
fn single_point_trace_is_skipped() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    plot.add_channel(red_channel(1)).unwrap();
    plot.add_channel(red_channel(0)).unwrap();
    plot.update();
    assert!(red_rows(&plot, 0).is_empty());
}

#[test]
fn overlapping_traces_multiply() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    plot.add_channel(red_channel(400)).unwrap();
    plot.add_channel(ChannelConfig {
        color: Color::new(0.0, 1.0, 0.0, 1.0),
        ..red_channel(400)
    })
    .unwrap();
    plot.update();
    let dark = (140..160)
        .map(|y| pixel(&plot, 200, y))
        .any(|p| p[0] < 30 && p[1] < 30 && p[2] < 30);
    assert!(dark);
}

#[test]
fn update_redraws_from_scratch_unless_preserved() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let id = plot.add_channel(red_channel(400)).unwrap();
    plot.update();
    plot.trace_mut(id).unwrap().set_data(1.0_f32, None).unwrap();
    plot.update();
    assert!(red_rows(&plot, 200).iter().all(|&y| y < 130));

    let config = PlotConfig {
        preserve_drawing_buffer: true,
        ..PlotConfig::default()
    };
    let (mut plot, _) = attached_plot(config);
    let id = plot.add_channel(red_channel(400)).unwrap();
    plot.update();
    plot.trace_mut(id).unwrap().set_data(1.0_f32, None).unwrap();
    plot.update();
    let rows = red_rows(&plot, 200);
    assert!(rows.iter().any(|&y| y < 130));
    assert!(rows.iter().any(|&y| y > 140));
}

#[test]
fn clear_canvas_keeps_traces() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    plot.add_channel(red_channel(400)).unwrap();
    plot.update();
    plot.clear_canvas();
    assert!(red_rows(&plot, 200).is_empty());
    assert_eq!(plot.trace_count(), 1);
    plot.update();
    assert!(!red_rows(&plot, 200).is_empty());
}

#[test]
fn clear_all_drops_traces_and_stale_handles() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let id = plot.add_channel(red_channel(400)).unwrap();
    plot.update();
    plot.clear_all();
    assert_eq!(plot.trace_count(), 0);
    assert!(plot.trace(id).is_none());
    assert!(red_rows(&plot, 200).is_empty());

    plot.clear_all();
    assert_eq!(plot.trace_count(), 0);

    let fresh = plot.add_channel(red_channel(400)).unwrap();
    assert_eq!(fresh.index(), id.index());
    assert!(plot.trace(id).is_none());
    assert!(plot.trace(fresh).is_some());
}

#[test]
fn recreate_keeps_traces_and_applies_config() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let id = plot.add_channel(red_channel(400)).unwrap();
    plot.trace_mut(id).unwrap().set_data(1.0_f32, None).unwrap();

    plot.recreate(PlotConfig {
        background: Color::new(0.0, 0.0, 1.0, 1.0),
        ..PlotConfig::default()
    });
    assert!(plot.is_ready());
    assert_eq!(plot.trace_count(), 1);
    assert_eq!(plot.trace(id).unwrap().get_data(), vec![1.0; 400]);
    assert_eq!(plot.surface_size(), (400, 300));
    assert_eq!(pixel(&plot, 10, 10), [0, 0, 255, 255]);

    let added = plot.add_channel(red_channel(400)).unwrap();
    assert_eq!(plot.trace_count(), 2);
    assert_eq!(plot.trace_id_at(0), Some(id));
    assert_eq!(plot.trace_id_at(1), Some(added));
    assert_eq!(plot.trace_id_at(2), None);
    plot.update();
    // Red over the blue background multiplies to black.
    let dark = (140..=160).map(|y| pixel(&plot, 200, y)).any(|p| p[0] < 30 && p[1] < 30 && p[2] < 30);
    assert!(dark);
}

#[test]
fn invalid_channel_is_rejected_without_side_effects() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    let result = plot.add_channel(ChannelConfig {
        sensitivity: 0.0,
        ..red_channel(400)
    });
    assert!(matches!(result, Err(PlotError::NonPositive { .. })));
    assert_eq!(plot.trace_count(), 0);
}

#[test]
fn resize_follows_container_height_only() {
    let (mut plot, container) = attached_plot(PlotConfig::default());
    container.set_size(800.0, 150.0);
    plot.reset_viewport();
    assert_eq!(plot.surface_size(), (400, 150));
    assert_eq!(plot.width(), 400.0);

    plot.reset_width(None);
    assert_eq!(plot.surface_size(), (800, 150));

    container.set_device_pixel_ratio(2.0);
    plot.reset_viewport();
    assert_eq!(plot.surface_size(), (1600, 300));
    assert_eq!(plot.height_in_sens_ref_units(), 5.0);
}

#[test]
fn plot_scale_setters_validate() {
    let (mut plot, _) = attached_plot(PlotConfig::default());
    assert!(plot.set_px_per_sens_ref_unit(-1.0).is_err());
    plot.set_height_in_sens_ref_units(20.0).unwrap();
    assert_eq!(plot.px_per_sens_ref_unit(), 15.0);
}

#[test]
fn unattached_plot_draws_nothing() {
    let mut plot = CanvasPlot::<PixmapCanvas>::new(PlotConfig::default());
    plot.add_channel(red_channel(10)).unwrap();
    plot.update();
    plot.clear_canvas();
    assert_eq!(plot.surface_size(), (0, 0));
    assert!(plot.surface().unwrap().pixmap().is_none());
}

struct BrokenCanvas;

impl Canvas2d for BrokenCanvas {
    fn create(_config: &PlotConfig) -> Result<Self, PlotError> {
        Err(PlotError::Init("no 2d context".into()))
    }
    fn resize(&mut self, _width: u32, _height: u32) {}
    fn size(&self) -> (u32, u32) {
        (0, 0)
    }
    fn clear(&mut self, _background: Color) {}
    fn stroke_polyline(&mut self, _points: &[Vec2], _color: Color, _line_width: f32) {}
}

#[test]
fn failed_context_leaves_plot_inert() {
    let mut plot = CanvasPlot::<BrokenCanvas>::new(PlotConfig::default());
    assert!(!plot.is_ready());
    assert!(matches!(plot.init_error(), Some(PlotError::Init(_))));
    assert!(matches!(
        plot.add_channel(red_channel(10)),
        Err(PlotError::NotReady)
    ));
    plot.add_to(Rc::new(FixedContainer::new(W, H)));
    plot.update();
    plot.clear_all();
    plot.recreate(PlotConfig::default());
    assert!(!plot.is_ready());
}
