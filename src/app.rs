use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::driver::{FrameScheduler, RenderLoop};
use crate::orbit::OrbitController;
use crate::render::Renderer;
use crate::scene::Scene;
use crate::viewport::{ViewportBinder, WindowViewport};

/// Frame-scheduling seam backed by the host window's redraw request.
struct RedrawScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for RedrawScheduler {
    fn schedule_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// Placement RNG for one composition: fixed seed when configured,
/// entropy otherwise.
fn placement_rng(config: &ViewerConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Top-level owner of the composed scene, camera, renderer, viewport
/// binding, orbit controller and render loop. Built once; the only
/// public entry afterwards is [`Viewer::render`] plus the event hooks
/// the host loop forwards into.
pub struct Viewer {
    scene: Scene,
    camera: Camera,
    renderer: Renderer,
    viewport: ViewportBinder,
    surface_size: Arc<WindowViewport>,
    controller: OrbitController,
    render_loop: RenderLoop,
    scheduler: RedrawScheduler,
    last_frame: Instant,
}

impl Viewer {
    /// Validates the configuration, composes the scene and brings up
    /// the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        config.validate().context("invalid viewer configuration")?;

        let mut rng = placement_rng(&config);
        let (mut camera, scene) = Scene::compose(&config, &mut rng);

        // The real surface may differ from the configured size; the
        // camera tracks whatever the window actually reports.
        let size = window.inner_size();
        if size.width > 0 && size.height > 0 {
            camera.set_aspect(size.width as f32 / size.height as f32);
            camera.update_projection();
        }

        let renderer = Renderer::new(Arc::clone(&window), &config, &scene)
            .await
            .context("failed to initialize renderer")?;
        let controller = OrbitController::attach(&camera, &config);
        let viewport = ViewportBinder::new(size.width, size.height);
        let surface_size = Arc::new(WindowViewport::new(size.width, size.height));

        info!(
            "viewer ready: {} objects, surface {}x{}",
            scene.object_count(),
            size.width,
            size.height
        );

        Ok(Self {
            scene,
            camera,
            renderer,
            viewport,
            surface_size,
            controller,
            render_loop: RenderLoop::new(),
            scheduler: RedrawScheduler { window },
            last_frame: Instant::now(),
        })
    }

    /// Starts the render loop. The first call schedules the first
    /// frame; any further call is a no-op.
    pub fn render(&mut self) {
        if self.render_loop.start(&mut self.scheduler) {
            self.last_frame = Instant::now();
            info!("render loop started");
        } else {
            debug!("render() called while already running");
        }
    }

    /// One loop iteration, invoked from the host's repaint callback.
    pub fn frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.render_loop.frame(
            &mut self.scheduler,
            &mut self.controller,
            &mut self.camera,
            &mut self.renderer,
            &self.scene,
            dt,
        )
    }

    /// Surface resize: renderer output size, camera aspect, projection
    /// recompute, and the shared size mirror.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.viewport
            .handle_resize(&mut self.renderer, &mut self.camera, width, height);
        self.surface_size.update(width, height);
    }

    /// Stops rescheduling so the host can tear the surface down after
    /// the current iteration.
    pub fn request_shutdown(&mut self) {
        self.render_loop.cancel();
        info!("shutdown requested");
    }

    pub fn window_id(&self) -> WindowId {
        self.renderer.window_id()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Live surface dimensions, readable by anyone holding the handle.
    pub fn surface_size_source(&self) -> Arc<WindowViewport> {
        Arc::clone(&self.surface_size)
    }

    // Interaction forwarding: the orbit controller is the single writer
    // of camera state, so pointer events route through here untouched.

    pub fn pointer_pressed(&mut self) {
        self.controller.begin_drag();
    }

    pub fn pointer_released(&mut self) {
        self.controller.end_drag();
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.controller.pointer_moved(position);
    }

    pub fn dolly(&mut self, steps: f32) {
        self.controller.dolly(steps);
    }

    pub fn toggle_auto_rotate(&mut self) {
        let enabled = !self.controller.is_auto_rotating();
        self.controller.set_auto_rotate(enabled);
        info!("auto-rotate {}", if enabled { "on" } else { "off" });
    }
}

/// Human-readable composition report for the summary mode: what the
/// viewer would draw, without touching the GPU.
pub fn scene_summary(config: &ViewerConfig) -> Result<String> {
    config.validate().context("invalid viewer configuration")?;
    let mut rng = placement_rng(config);
    let (camera, scene) = Scene::compose(config, &mut rng);

    let mut out = String::new();
    writeln!(
        out,
        "Composed scene with {} box instances ({} lights)",
        scene.instances().len(),
        scene.light_count()
    )?;
    writeln!(
        out,
        " - camera fov={:.1} near={:.1} far={:.1} aspect={:.4}",
        camera.fov_degrees(),
        camera.near(),
        camera.far(),
        camera.aspect()
    )?;
    let sun = scene.directional_light();
    writeln!(
        out,
        " - directional light intensity={:.2} from ({:.1}, {:.1}, {:.1})",
        sun.intensity, sun.position.x, sun.position.y, sun.position.z
    )?;
    writeln!(
        out,
        " - ambient light intensity={:.2}",
        scene.ambient_light().intensity
    )?;
    let material = scene.material();
    writeln!(
        out,
        " - material base=({:.2}, {:.2}, {:.2}) metalness={:.2} roughness={:.2}",
        material.base_color.x,
        material.base_color.y,
        material.base_color.z,
        material.metalness,
        material.roughness
    )?;
    for (index, instance) in scene.instances().iter().enumerate() {
        writeln!(
            out,
            " - box{index:03} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
            instance.position.x,
            instance.position.y,
            instance.position.z,
            instance.rotation.x,
            instance.rotation.y,
            instance.rotation.z
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_population_and_lights() {
        let config = ViewerConfig::default().with_seed(7);
        let summary = scene_summary(&config).unwrap();
        assert!(summary.starts_with("Composed scene with 100 box instances (2 lights)"));
        assert!(summary.contains(" - box000 "));
        assert!(summary.contains(" - box099 "));
    }

    #[test]
    fn summary_is_deterministic_for_a_fixed_seed() {
        let config = ViewerConfig::default().with_seed(11);
        assert_eq!(
            scene_summary(&config).unwrap(),
            scene_summary(&config).unwrap()
        );
    }

    #[test]
    fn summary_rejects_invalid_configuration() {
        let mut config = ViewerConfig::default();
        config.camera.near = -1.0;
        assert!(scene_summary(&config).is_err());
    }
}
