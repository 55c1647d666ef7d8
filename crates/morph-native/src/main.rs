use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use winit::event::*;
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use morph_core::{
    latest_value_slot, CaptureError, EngineParams, MorphEngine, Rgb, ShapeKind, SimulatedHands,
    TensionEstimator, TensionStatus, TrackingHandle, TrackingWorker, UnavailableCamera,
};

mod gpu;
mod hud;
mod keys;

#[derive(Parser, Debug)]
#[command(name = "morph-native")]
#[command(about = "Particle cloud that morphs between shapes and reacts to hand tension")]
struct Cli {
    /// Number of particles
    #[arg(long, default_value_t = morph_core::DEFAULT_PARTICLE_COUNT as u32,
          value_parser = clap::value_parser!(u32).range(1..))]
    particles: u32,

    /// Initial shape (heart, flower, saturn, meditating-figure, starburst)
    #[arg(long, default_value = "heart")]
    shape: String,

    /// Initial base color as #rrggbb
    #[arg(long, default_value = "#ff0055")]
    color: String,

    /// Seed for shape sampling and jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulate a camera that fails to open (permission, not-found, in-use, ...)
    #[arg(long)]
    capture_error: Option<String>,

    /// Hand analysis rate in frames per second
    #[arg(long, default_value_t = 30.0)]
    estimate_hz: f32,

    /// Scale interaction smoothing by frame time instead of per tick
    #[arg(long)]
    frame_rate_independent: bool,
}

fn engine_params(cli: &Cli) -> EngineParams {
    let base_color = cli.color.parse::<Rgb>().unwrap_or_else(|e| {
        log::warn!("{e}; using default color");
        Rgb::default()
    });
    EngineParams {
        particle_count: cli.particles as usize,
        initial_shape: ShapeKind::from_name_or_default(&cli.shape),
        base_color,
        frame_rate_independent: cli.frame_rate_independent,
        ..EngineParams::default()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let mut engine = MorphEngine::new(engine_params(&cli), cli.seed);
    let mut palette_index = keys::PALETTE
        .iter()
        .position(|hex| Rgb::from_hex(hex).ok() == Some(engine.base_color()))
        .unwrap_or(0);

    // Estimator thread -> latest-value slot (engine) + status channel (title bar)
    let (signal_tx, signal_rx) = latest_value_slot();
    let (status_tx, status_rx) = mpsc::channel::<TensionStatus>();
    let frame_interval = Duration::from_secs_f32(1.0 / cli.estimate_hz.clamp(1.0, 240.0));
    let estimator = TensionEstimator::default();
    let _tracking: TrackingHandle = match cli.capture_error.as_deref() {
        Some(category) => TrackingWorker::new(
            UnavailableCamera(CaptureError::from_category(category)),
            estimator,
            frame_interval,
        )
        .with_sink(signal_tx)
        .with_sink(status_tx)
        .spawn()?,
        None => TrackingWorker::new(
            SimulatedHands::new(cli.estimate_hz),
            estimator,
            frame_interval,
        )
        .with_sink(signal_tx)
        .with_sink(status_tx)
        .spawn()?,
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Particle Morph (native)")
        .build(&event_loop)?;

    let mut state = pollster::block_on(gpu::GpuState::new(&window, engine.particle_count()))?;
    let mut status = TensionStatus::from_interaction(signal_rx.latest());
    state
        .window
        .set_title(&hud::window_title(engine.shape(), &status));

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::KeyboardInput { event: key, .. },
            ..
        } => {
            if key.state != ElementState::Pressed || key.repeat {
                return;
            }
            let PhysicalKey::Code(code) = key.physical_key else {
                return;
            };
            if code == KeyCode::Escape {
                elwt.exit();
            } else if let Some(command) = keys::command_for_key(code, &mut palette_index) {
                log::info!("[keys] {command:?}");
                engine.apply(command);
                state
                    .window
                    .set_title(&hud::window_title(engine.shape(), &status));
            }
        }
        Event::AboutToWait => {
            if let Some(latest) = status_rx.try_iter().last() {
                if latest != status {
                    state
                        .window
                        .set_title(&hud::window_title(engine.shape(), &latest));
                }
                status = latest;
            }
            let dt = state.frame_dt();
            engine.tick(signal_rx.latest(), dt);
            match state.render(&mut engine) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::debug!("[render] {e}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}
