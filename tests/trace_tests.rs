// Host-side tests for trace data handling.

use biosignal_plot::{ChannelConfig, Color, PlotError, Polarity, Trace};

fn channel(length: usize, downsample_factor: usize) -> ChannelConfig {
    ChannelConfig {
        color: Color::BLACK,
        length,
        sensitivity: 100.0,
        sampling_rate: 256.0,
        samples_per_px: 1.0,
        downsample_factor,
        polarity: Polarity::Normal,
        scale: 0,
        offset: 0.5,
    }
}

fn xs(trace: &Trace) -> Vec<f32> {
    trace.xy().chunks_exact(2).map(|p| p[0]).collect()
}

#[test]
fn new_trace_is_evenly_spaced_and_zeroed() {
    let trace = Trace::new(&channel(4, 1)).unwrap();
    assert_eq!(trace.len(), 4);
    assert_eq!(xs(&trace), vec![-1.0, -0.5, 0.0, 0.5]);
    assert_eq!(trace.get_data(), vec![0.0; 4]);
    assert!(trace.render());
}

#[test]
fn set_data_decimates_by_downsample_factor() {
    let mut trace = Trace::new(&channel(4, 2)).unwrap();
    trace
        .set_data(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], None)
        .unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 3.0, 5.0, 7.0]);
}

#[test]
fn set_data_explicit_factor_overrides_trace_factor() {
    let mut trace = Trace::new(&channel(3, 2)).unwrap();
    trace.set_data(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], Some(3)).unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 4.0, 7.0]);
}

#[test]
fn set_data_zero_fills_short_input() {
    let mut trace = Trace::new(&channel(4, 1)).unwrap();
    trace.set_data(&[9.0_f32, 9.0, 9.0, 9.0], None).unwrap();
    trace.set_data(&[1.0_f32, 2.0], None).unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 2.0, 0.0, 0.0]);
}

#[test]
fn set_data_ignores_excess_input() {
    let mut trace = Trace::new(&channel(2, 1)).unwrap();
    trace.set_data(&[1.0_f32, 2.0, 3.0, 4.0], None).unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 2.0]);
    assert_eq!(trace.len(), 2);
}

#[test]
fn set_data_odd_input_rounds_decimation_up() {
    let mut trace = Trace::new(&channel(5, 2)).unwrap();
    trace.set_data(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], None).unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 3.0, 5.0, 7.0, 0.0]);
}

#[test]
fn constant_is_broadcast_to_every_point() {
    let mut trace = Trace::new(&channel(5, 2)).unwrap();
    trace.set_data(0.25_f32, None).unwrap();
    assert_eq!(trace.get_data(), vec![0.25; 5]);
}

#[test]
fn set_data_keeps_x_values() {
    let mut trace = Trace::new(&channel(4, 1)).unwrap();
    let before = xs(&trace);
    trace.set_data(&[1.0_f32, 2.0, 3.0, 4.0], None).unwrap();
    assert_eq!(xs(&trace), before);
}

#[test]
fn zero_downsample_factor_is_rejected() {
    let mut trace = Trace::new(&channel(2, 1)).unwrap();
    trace.set_data(&[1.0_f32, 2.0], None).unwrap();
    let err = trace.set_data(&[5.0_f32, 6.0], Some(0)).unwrap_err();
    assert!(matches!(err, PlotError::InvalidDownsampleFactor));
    assert_eq!(trace.get_data(), vec![1.0, 2.0]);

    assert!(matches!(
        Trace::new(&channel(2, 0)),
        Err(PlotError::InvalidDownsampleFactor)
    ));
}

#[test]
fn init_data_with_step_pins_points_to_right_edge() {
    let mut trace = Trace::new(&channel(4, 1)).unwrap();
    trace.set_data(&[1.0_f32, 1.0, 1.0, 1.0], None).unwrap();
    trace.init_data(4, 2).unwrap();
    assert_eq!(xs(&trace), vec![-1.0, 0.0, 1.0, 1.0]);
    assert_eq!(trace.get_data(), vec![0.0; 4]);
}

#[test]
fn init_data_shorter_length_widens_spacing() {
    let mut trace = Trace::new(&channel(4, 1)).unwrap();
    trace.init_data(2, 1).unwrap();
    assert_eq!(xs(&trace), vec![-1.0, 0.0, 1.0, 1.0]);
}

#[test]
fn init_data_rejects_zero_step() {
    let mut trace = Trace::new(&channel(4, 1)).unwrap();
    assert!(matches!(trace.init_data(4, 0), Err(PlotError::InvalidStep)));
    assert_eq!(xs(&trace), vec![-1.0, -0.5, 0.0, 0.5]);
}

#[test]
fn sensitivity_must_be_positive() {
    let mut trace = Trace::new(&channel(2, 1)).unwrap();
    for bad in [0.0, -5.0, f32::NAN, f32::INFINITY] {
        assert!(trace.set_sensitivity(bad).is_err());
        assert_eq!(trace.sensitivity(), 100.0);
    }
    trace.set_sensitivity(50.0).unwrap();
    assert_eq!(trace.sensitivity(), 50.0);

    let mut config = channel(2, 1);
    config.sensitivity = 0.0;
    assert!(matches!(
        Trace::new(&config),
        Err(PlotError::NonPositive { .. })
    ));
}

#[test]
fn empty_trace_accepts_data() {
    let mut trace = Trace::new(&channel(0, 1)).unwrap();
    assert!(trace.is_empty());
    trace.set_data(&[1.0_f32, 2.0], None).unwrap();
    trace.set_data(3.0_f32, None).unwrap();
    trace.init_data(0, 1).unwrap();
    assert!(trace.get_data().is_empty());
}

#[test]
fn polarity_deserializes_from_sign() {
    assert_eq!(serde_json::from_str::<Polarity>("1").unwrap(), Polarity::Normal);
    assert_eq!(serde_json::from_str::<Polarity>("-1").unwrap(), Polarity::Inverted);
    assert!(serde_json::from_str::<Polarity>("2").is_err());
    assert_eq!(Polarity::Inverted.factor(), -1.0);
}

#[test]
fn decimated_input_exhausted_before_trace_end_is_zero_filled() {
    let mut trace = Trace::new(&channel(8, 2)).unwrap();
    trace.set_data(5.0_f32, None).unwrap();
    trace
        .set_data(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], None)
        .unwrap();
    assert_eq!(trace.get_data(), vec![1.0, 3.0, 5.0, 7.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn init_data_is_idempotent() {
    let mut trace = Trace::new(&channel(6, 1)).unwrap();
    trace.init_data(6, 1).unwrap();
    let first = trace.xy().to_vec();
    trace.init_data(6, 1).unwrap();
    assert_eq!(trace.xy(), first.as_slice());
    assert_eq!(trace.get_data(), vec![0.0; 6]);
}
