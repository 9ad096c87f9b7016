use std::env;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::error;
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use boxfield::viewport::SurfaceSize;
use boxfield::{scene_summary, Viewer, ViewerConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = options.to_config();
    config.validate().context("invalid configuration")?;

    if options.summary_only {
        return run_headless(&config);
    }

    match run_interactive(&config) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install \
                     windowing libs to enable rendering)."
                );
                run_headless(&config)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(config: &ViewerConfig) -> Result<()> {
    print!("{}", scene_summary(config)?);
    Ok(())
}

fn run_interactive(config: &ViewerConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| WindowInitError::from_error("event loop", err))?;

    let mut app = App {
        config: config.clone(),
        viewer: None,
        last_error: None,
    };
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.last_error {
        return Err(err);
    }

    if let Some(viewer) = &app.viewer {
        print_final_state(viewer);
    }
    Ok(())
}

struct App {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    last_error: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:?}");
        self.last_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Boxfield")
            .with_inner_size(LogicalSize::new(
                f64::from(self.config.renderer.width),
                f64::from(self.config.renderer.height),
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(
                    event_loop,
                    WindowInitError::from_error("window", err).into(),
                );
                return;
            }
        };

        match block_on(Viewer::new(window, self.config.clone())) {
            Ok(mut viewer) => {
                viewer.render();
                self.viewer = Some(viewer);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if viewer.window_id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                viewer.request_shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.handle_resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => {
                    viewer.request_shutdown();
                    event_loop.exit();
                }
                KeyCode::Space => viewer.toggle_auto_rotate(),
                _ => {}
            },
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => viewer.pointer_pressed(),
                ElementState::Released => viewer.pointer_released(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                viewer.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                };
                viewer.dolly(steps);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = viewer.frame() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

fn print_final_state(viewer: &Viewer) {
    let position = viewer.camera().position();
    let (width, height) = viewer.surface_size_source().surface_size();
    println!(
        "Final state: {} objects, camera at ({:.2}, {:.2}, {:.2}), surface {}x{}",
        viewer.scene().object_count(),
        position.x,
        position.y,
        position.z,
        width,
        height
    );
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

struct CliOptions {
    seed: Option<u64>,
    size: Option<(u32, u32)>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            seed: None,
            size: None,
            summary_only: false,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().ok_or_else(|| anyhow!("--seed needs a value"))?;
                    options.seed = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid seed: {value}"))?,
                    );
                }
                "--size" => {
                    let value = args.next().ok_or_else(|| anyhow!("--size needs a value"))?;
                    options.size = Some(parse_size(&value)?);
                }
                "--summary-only" => options.summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: boxfield [--seed N] [--size WxH] [--summary-only]"
                    ));
                }
            }
        }
        Ok(options)
    }

    fn to_config(&self) -> ViewerConfig {
        let mut config = ViewerConfig::default();
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some((width, height)) = self.size {
            config = config.with_surface_size(width, height);
        }
        config
    }
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| anyhow!("expected WxH, got {value}"))?;
    Ok((
        width
            .parse()
            .with_context(|| format!("invalid width: {width}"))?,
        height
            .parse()
            .with_context(|| format!("invalid height: {height}"))?,
    ))
}
