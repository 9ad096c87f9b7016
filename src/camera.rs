use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Perspective camera owning the view and projection state for the
/// viewer. Orientation is derived from the look-at target whenever the
/// position or target moves; the projection matrix is only rebuilt by an
/// explicit [`Camera::update_projection`] call so callers control when
/// the (comparatively rare) recompute happens.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    projection_epoch: u64,
}

impl Camera {
    /// Builds a camera from its configuration and the aspect ratio of
    /// the surface it will render to.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            projection_epoch: 0,
        };
        camera.rebuild_view();
        camera.update_projection();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Moves the camera and re-derives its orientation towards the
    /// current target.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild_view();
    }

    /// Re-aims the camera at a new target point.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.rebuild_view();
    }

    /// Stores a new aspect ratio. The projection matrix keeps its old
    /// value until [`Camera::update_projection`] runs.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(f32::EPSILON);
    }

    /// Rebuilds the projection matrix from fov/aspect/near/far. Must be
    /// called after any of those change or the on-screen proportions go
    /// stale.
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        self.projection_epoch += 1;
    }

    /// Counts completed projection recomputes. Starts at 1 once the
    /// camera is constructed.
    pub fn projection_epoch(&self) -> u64 {
        self.projection_epoch
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    fn rebuild_view(&mut self) {
        let forward = self.target - self.position;
        // A camera sitting exactly on its target has no defined
        // orientation; keep the previous view rather than emit NaNs.
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::from_config(&CameraConfig::default(), 800.0 / 600.0)
    }

    #[test]
    fn construction_derives_orientation_from_target() {
        let camera = camera();
        // Looking from +Z towards the origin: forward maps to -Z in view
        // space, so the target lands in front of the camera.
        let target_in_view = camera.view().transform_point3(camera.target());
        assert!(target_in_view.z < 0.0);
        assert_relative_eq!(target_in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target_in_view.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn aspect_change_requires_explicit_recompute() {
        let mut camera = camera();
        let before = camera.projection();
        let epoch = camera.projection_epoch();
        camera.set_aspect(1024.0 / 768.0);
        assert_eq!(camera.projection(), before);
        camera.update_projection();
        assert_ne!(camera.projection(), before);
        assert_eq!(camera.projection_epoch(), epoch + 1);
    }

    #[test]
    fn moving_the_camera_keeps_it_aimed_at_the_target() {
        let mut camera = camera();
        camera.set_position(Vec3::new(12.0, 5.0, -3.0));
        let target_in_view = camera.view().transform_point3(camera.target());
        assert_relative_eq!(target_in_view.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(target_in_view.y, 0.0, epsilon = 1e-4);
        assert!(target_in_view.z < 0.0);
    }

    #[test]
    fn degenerate_position_keeps_previous_view() {
        let mut camera = camera();
        let view = camera.view();
        camera.set_position(camera.target());
        assert_eq!(camera.view(), view);
    }
}
