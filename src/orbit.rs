use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ViewerConfig;

/// Per-frame camera interaction seam. The render loop drives exactly
/// one `update` before each draw; whoever implements this is the single
/// writer of interactive camera state.
pub trait FrameController {
    fn update(&mut self, camera: &mut Camera, dt: f32);
}

// Pointer sensitivity: one full drag across the window height sweeps
// half a revolution, matching the usual orbit-control feel.
const ROTATE_SENSITIVITY: f32 = 0.005;
const DOLLY_STEP: f32 = 0.95;
const DAMPING: f32 = 0.12;
const MIN_RADIUS: f32 = 1.0;
const MAX_RADIUS: f32 = 200.0;
// Keep the camera off the poles so the up vector stays well defined.
const MAX_ELEVATION: f32 = 1.55;

/// Spherical-orbit camera controller: continuous auto-rotation about
/// the look-at target plus pointer-drag orbiting with velocity damping
/// and scroll dolly.
///
/// Auto-rotation speed uses one-revolution-per-minute units: speed 3.0
/// completes a full orbit in twenty seconds.
#[derive(Debug, Clone)]
pub struct OrbitController {
    target: Vec3,
    radius: f32,
    azimuth: f32,
    elevation: f32,
    auto_rotate: bool,
    auto_rotate_speed: f32,
    velocity: Vec2,
    dragging: bool,
    last_pointer: Option<Vec2>,
}

impl OrbitController {
    /// Derives the orbit state from the camera's current position and
    /// target and takes over as the camera's writer.
    pub fn attach(camera: &Camera, config: &ViewerConfig) -> Self {
        let target = camera.target();
        let offset = camera.position() - target;
        let radius = offset.length().max(MIN_RADIUS);
        Self {
            target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / radius).clamp(-1.0, 1.0).asin(),
            auto_rotate: true,
            auto_rotate_speed: config.auto_rotate_speed,
            velocity: Vec2::ZERO,
            dragging: false,
            last_pointer: None,
        }
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Pointer button pressed over the surface: start a drag.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.last_pointer = None;
    }

    /// Pointer button released: the accumulated velocity coasts out
    /// under damping.
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
    }

    /// Pointer moved to a new surface position. Only consumed while a
    /// drag is active.
    pub fn pointer_moved(&mut self, position: Vec2) {
        if !self.dragging {
            return;
        }
        if let Some(last) = self.last_pointer {
            let delta = position - last;
            self.velocity = delta * ROTATE_SENSITIVITY;
        }
        self.last_pointer = Some(position);
    }

    /// Scroll input dollies the camera towards or away from the target.
    pub fn dolly(&mut self, steps: f32) {
        self.radius = (self.radius * DOLLY_STEP.powf(steps)).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    fn auto_rotation_angle(&self, dt: f32) -> f32 {
        TAU * self.auto_rotate_speed * dt / 60.0
    }

    fn apply(&self, camera: &mut Camera) {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let offset = Vec3::new(
            self.radius * cos_el * sin_az,
            self.radius * sin_el,
            self.radius * cos_el * cos_az,
        );
        camera.set_position(self.target + offset);
        camera.look_at(self.target);
    }
}

impl FrameController for OrbitController {
    fn update(&mut self, camera: &mut Camera, dt: f32) {
        if self.auto_rotate && !self.dragging {
            self.azimuth += self.auto_rotation_angle(dt);
        }

        self.azimuth -= self.velocity.x;
        self.elevation =
            (self.elevation + self.velocity.y).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        if self.dragging {
            // Each pointer delta is applied exactly once; release lets
            // the last delta coast out below.
            self.velocity = Vec2::ZERO;
        } else {
            self.velocity *= 1.0 - DAMPING;
            if self.velocity.length_squared() < 1e-10 {
                self.velocity = Vec2::ZERO;
            }
        }

        self.azimuth %= TAU;
        self.apply(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    fn rig() -> (Camera, OrbitController) {
        let config = ViewerConfig::default();
        let camera = Camera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        let controller = OrbitController::attach(&camera, &config);
        (camera, controller)
    }

    #[test]
    fn attach_recovers_the_orbit_radius() {
        let (camera, controller) = rig();
        let expected = (camera.position() - camera.target()).length();
        assert_relative_eq!(controller.radius(), expected, epsilon = 1e-5);
    }

    #[test]
    fn auto_rotation_preserves_the_orbit_radius() {
        let (mut camera, mut controller) = rig();
        for _ in 0..240 {
            controller.update(&mut camera, 1.0 / 60.0);
        }
        let radius = (camera.position() - camera.target()).length();
        assert_relative_eq!(radius, controller.radius(), epsilon = 1e-3);
    }

    #[test]
    fn speed_three_orbits_in_twenty_seconds() {
        let (mut camera, mut controller) = rig();
        let start = camera.position();
        // 20 seconds at 60 fps brings azimuth back around exactly once.
        for _ in 0..(20 * 60) {
            controller.update(&mut camera, 1.0 / 60.0);
        }
        let end = camera.position();
        // 1200 accumulated additions leave a little float drift.
        assert_relative_eq!(start.x, end.x, epsilon = 5e-2);
        assert_relative_eq!(start.z, end.z, epsilon = 5e-2);
    }

    #[test]
    fn disabling_auto_rotate_freezes_the_camera() {
        let (mut camera, mut controller) = rig();
        controller.set_auto_rotate(false);
        let before = camera.position();
        controller.update(&mut camera, 1.0 / 60.0);
        assert_relative_eq!(before.x, camera.position().x, epsilon = 1e-6);
        assert_relative_eq!(before.z, camera.position().z, epsilon = 1e-6);
    }

    #[test]
    fn drag_velocity_coasts_and_damps_out() {
        let (mut camera, mut controller) = rig();
        controller.set_auto_rotate(false);
        controller.begin_drag();
        controller.pointer_moved(Vec2::new(100.0, 0.0));
        controller.pointer_moved(Vec2::new(140.0, 0.0));
        controller.end_drag();
        let azimuth_before = controller.azimuth();
        controller.update(&mut camera, 1.0 / 60.0);
        assert_ne!(controller.azimuth(), azimuth_before);
        for _ in 0..600 {
            controller.update(&mut camera, 1.0 / 60.0);
        }
        let settled = controller.azimuth();
        controller.update(&mut camera, 1.0 / 60.0);
        assert_relative_eq!(controller.azimuth(), settled, epsilon = 1e-6);
    }

    #[test]
    fn dolly_clamps_to_the_radius_limits() {
        let (_, mut controller) = rig();
        controller.dolly(-1000.0);
        assert!(controller.radius() <= MAX_RADIUS);
        controller.dolly(1000.0);
        assert!(controller.radius() >= MIN_RADIUS);
    }

    #[test]
    fn elevation_never_reaches_the_poles() {
        let (mut camera, mut controller) = rig();
        controller.set_auto_rotate(false);
        controller.begin_drag();
        controller.pointer_moved(Vec2::new(0.0, 0.0));
        for step in 1..200 {
            controller.pointer_moved(Vec2::new(0.0, step as f32 * 50.0));
            controller.update(&mut camera, 1.0 / 60.0);
        }
        let up = (camera.position() - camera.target()).normalize().y;
        assert!(up.abs() < 1.0);
    }
}
