use parking_lot::RwLock;

use crate::camera::Camera;

/// Render-side half of the resize seam: anything that owns an output
/// surface whose pixel size must track the window.
pub trait ResizeTarget {
    fn set_output_size(&mut self, width: u32, height: u32);
}

/// Read side of the live surface dimensions.
pub trait SurfaceSize {
    fn surface_size(&self) -> (u32, u32);
}

/// Shared mirror of the window's current size, updated from resize
/// events and readable from anywhere holding the handle.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }
}

impl SurfaceSize for WindowViewport {
    fn surface_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

/// Keeps the renderer output size and the camera projection consistent
/// with the surface. Lives as long as the viewer; there is no unbind.
#[derive(Debug, Clone, Copy)]
pub struct ViewportBinder {
    width: u32,
    height: u32,
}

impl ViewportBinder {
    /// Binds at the surface's construction-time size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Applies a surface resize: renderer output size, camera aspect,
    /// projection recompute, in that order. Zero-area sizes are ignored
    /// (minimized windows report them) and repeats of the current size
    /// are a no-op, so event storms cause no drift.
    pub fn handle_resize(
        &mut self,
        target: &mut dyn ResizeTarget,
        camera: &mut Camera,
        width: u32,
        height: u32,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        target.set_output_size(width, height);
        camera.set_aspect(width as f32 / height as f32);
        camera.update_projection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct RecordingTarget {
        size: Option<(u32, u32)>,
        calls: usize,
    }

    impl ResizeTarget for RecordingTarget {
        fn set_output_size(&mut self, width: u32, height: u32) {
            self.size = Some((width, height));
            self.calls += 1;
        }
    }

    fn rig() -> (ViewportBinder, RecordingTarget, Camera) {
        let binder = ViewportBinder::new(800, 600);
        let camera = Camera::from_config(&CameraConfig::default(), 800.0 / 600.0);
        (binder, RecordingTarget::default(), camera)
    }

    #[test]
    fn construction_size_fixes_the_initial_aspect() {
        let (binder, _, camera) = rig();
        assert_eq!(binder.size(), (800, 600));
        assert_relative_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn resize_updates_target_aspect_and_projection() {
        let (mut binder, mut target, mut camera) = rig();
        let epoch = camera.projection_epoch();
        binder.handle_resize(&mut target, &mut camera, 1024, 768);
        assert_eq!(target.size, Some((1024, 768)));
        assert_relative_eq!(camera.aspect(), 1024.0 / 768.0);
        assert_eq!(camera.projection_epoch(), epoch + 1);
    }

    #[test]
    fn repeated_resize_with_same_dimensions_is_idempotent() {
        let (mut binder, mut target, mut camera) = rig();
        binder.handle_resize(&mut target, &mut camera, 1024, 768);
        let aspect = camera.aspect();
        let epoch = camera.projection_epoch();
        binder.handle_resize(&mut target, &mut camera, 1024, 768);
        assert_eq!(target.calls, 1);
        assert_eq!(camera.aspect(), aspect);
        assert_eq!(camera.projection_epoch(), epoch);
    }

    #[test]
    fn zero_area_resize_is_ignored() {
        let (mut binder, mut target, mut camera) = rig();
        binder.handle_resize(&mut target, &mut camera, 0, 720);
        assert_eq!(target.calls, 0);
        assert_eq!(binder.size(), (800, 600));
        assert_relative_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn window_viewport_mirrors_updates() {
        let viewport = WindowViewport::new(800, 600);
        assert_eq!(viewport.surface_size(), (800, 600));
        viewport.update(1920, 1080);
        assert_eq!(viewport.surface_size(), (1920, 1080));
        viewport.update(0, 0);
        assert_eq!(viewport.surface_size(), (1, 1));
    }
}
