use biosignal_plot::{
    BiosignalPlot, CanvasPlot, ChannelConfig, Color, FixedContainer, GpuPlot, PixmapCanvas,
    PlotConfig, Polarity,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::rc::Rc;

const CHANNELS: usize = 8;
const SAMPLING_RATE: f32 = 256.0;
const SECONDS: f32 = 10.0;
const DOWNSAMPLE: usize = 2;
const PLOT_WIDTH: f64 = 1280.0;
const PLOT_HEIGHT: f64 = 720.0;
/// Microvolts per reference division.
const SENSITIVITY: f32 = 50.0;

/// Alpha rhythm, a slow drift and some white noise, in microvolts.
fn synthetic_eeg(rng: &mut StdRng, channel: usize) -> Vec<f32> {
    let n = (SAMPLING_RATE * SECONDS) as usize;
    let alpha_hz = 9.5 + channel as f32 * 0.15;
    let phase = rng.gen_range(0.0..TAU);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLING_RATE;
            let alpha = 30.0 * (TAU * alpha_hz * t + phase).sin();
            let drift = 15.0 * (TAU * 0.3 * t).sin();
            alpha + drift + rng.gen_range(-8.0..8.0)
        })
        .collect()
}

fn channel_config(index: usize) -> ChannelConfig {
    let hue = index as f32 / CHANNELS as f32;
    ChannelConfig {
        color: Color::new(0.6 * hue, 0.1, 0.6 * (1.0 - hue), 1.0),
        length: (SAMPLING_RATE * SECONDS) as usize / DOWNSAMPLE,
        sensitivity: SENSITIVITY,
        sampling_rate: SAMPLING_RATE,
        samples_per_px: SAMPLING_RATE * SECONDS / PLOT_WIDTH as f32,
        downsample_factor: DOWNSAMPLE,
        polarity: Polarity::Inverted,
        scale: 0,
        offset: 1.0 - (index as f32 + 0.5) / CHANNELS as f32,
    }
}

fn populate(plot: &mut dyn BiosignalPlot, signals: &[Vec<f32>]) -> anyhow::Result<()> {
    for (i, samples) in signals.iter().enumerate() {
        let id = plot.add_channel(channel_config(i))?;
        if let Some(trace) = plot.trace_mut(id) {
            trace.set_data(samples, None)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let out = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "biosignal-plot.png".to_string());
    let mut rng = StdRng::seed_from_u64(42);
    let signals: Vec<Vec<f32>> = (0..CHANNELS).map(|c| synthetic_eeg(&mut rng, c)).collect();
    let config = PlotConfig {
        antialias: true,
        transparent: false,
        height_in_sens_ref_units: Some(2.0 * CHANNELS as f64),
        ..PlotConfig::default()
    };
    let container = Rc::new(FixedContainer::new(PLOT_WIDTH, PLOT_HEIGHT));

    let mut canvas_plot = CanvasPlot::<PixmapCanvas>::new(config.clone());
    canvas_plot.add_to(container.clone());
    populate(&mut canvas_plot, &signals)?;
    canvas_plot.update();
    let surface = canvas_plot
        .surface()
        .ok_or_else(|| anyhow::anyhow!("2-D plot is not ready"))?;
    surface.save_png(&out)?;
    log::info!("wrote {} channels to {out}", canvas_plot.trace_count());

    let mut gpu_plot = pollster::block_on(GpuPlot::new(config));
    if !gpu_plot.is_ready() {
        log::warn!("GPU plot unavailable, skipping the accelerated run");
        return Ok(());
    }
    gpu_plot.add_to(container);
    populate(&mut gpu_plot, &signals)?;
    let started = std::time::Instant::now();
    for _ in 0..60 {
        gpu_plot.update();
    }
    log::info!(
        "GPU plot drew 60 frames of {} channels in {:?}",
        gpu_plot.trace_count(),
        started.elapsed()
    );
    Ok(())
}
