use anyhow::Result;

use crate::camera::Camera;
use crate::orbit::FrameController;
use crate::scene::Scene;

/// Host frame-callback seam: ask the environment to invoke the frame
/// path once before the next repaint. The window's redraw request plays
/// this role in the real viewer.
pub trait FrameScheduler {
    fn schedule_frame(&mut self);
}

/// One draw of the scene through the camera into an output surface.
pub trait DrawTarget {
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
}

/// Per-frame scheduler for the viewer. Idle until the first `start`,
/// then Running for good. Every iteration reschedules itself first,
/// then advances the interaction controller exactly once, then issues
/// exactly one draw; the order never interleaves across iterations.
///
/// Cancellation only stops the rescheduling; it exists for orderly
/// shutdown and is checked once per iteration.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    cancelled: bool,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            cancelled: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Transitions from Idle to Running and schedules the first frame. Calling
    /// `start` on a loop that is already Running is a no-op; the return
    /// value reports whether this call performed the transition.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state == LoopState::Running {
            return false;
        }
        self.state = LoopState::Running;
        scheduler.schedule_frame();
        true
    }

    /// Stops rescheduling after the current iteration. Additive to the
    /// original unbounded loop; the state machine stays Running.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Runs one loop iteration. Spurious frame callbacks that arrive
    /// before `start` are ignored.
    pub fn frame(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        controller: &mut dyn FrameController,
        camera: &mut Camera,
        target: &mut dyn DrawTarget,
        scene: &Scene,
        dt: f32,
    ) -> Result<()> {
        if self.state != LoopState::Running {
            return Ok(());
        }
        if !self.cancelled {
            scheduler.schedule_frame();
        }
        controller.update(camera, dt);
        target.draw(scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, ViewerConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    struct Recorder {
        log: CallLog,
        label: &'static str,
    }

    impl Recorder {
        fn new(log: &CallLog, label: &'static str) -> Self {
            Self {
                log: Rc::clone(log),
                label,
            }
        }
    }

    impl FrameScheduler for Recorder {
        fn schedule_frame(&mut self) {
            self.log.borrow_mut().push(self.label);
        }
    }

    impl FrameController for Recorder {
        fn update(&mut self, _camera: &mut Camera, _dt: f32) {
            self.log.borrow_mut().push(self.label);
        }
    }

    impl DrawTarget for Recorder {
        fn draw(&mut self, _scene: &Scene, _camera: &Camera) -> Result<()> {
            self.log.borrow_mut().push(self.label);
            Ok(())
        }
    }

    fn rig() -> (CallLog, Recorder, Recorder, Recorder, Camera, Scene) {
        let log: CallLog = Rc::default();
        let scheduler = Recorder::new(&log, "schedule");
        let controller = Recorder::new(&log, "update");
        let target = Recorder::new(&log, "draw");
        let camera = Camera::from_config(&CameraConfig::default(), 1.0);
        let mut rng = StdRng::seed_from_u64(0);
        let (_, scene) = Scene::compose(&ViewerConfig::default(), &mut rng);
        (log, scheduler, controller, target, camera, scene)
    }

    #[test]
    fn iteration_schedules_then_updates_then_draws() {
        let (log, mut scheduler, mut controller, mut target, mut camera, scene) = rig();
        let mut render_loop = RenderLoop::new();
        render_loop.start(&mut scheduler);
        log.borrow_mut().clear();
        render_loop
            .frame(
                &mut scheduler,
                &mut controller,
                &mut camera,
                &mut target,
                &scene,
                1.0 / 60.0,
            )
            .unwrap();
        assert_eq!(*log.borrow(), vec!["schedule", "update", "draw"]);
    }

    #[test]
    fn second_start_is_a_no_op() {
        let (log, mut scheduler, ..) = rig();
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.start(&mut scheduler));
        assert!(!render_loop.start(&mut scheduler));
        assert_eq!(log.borrow().len(), 1);
        assert!(render_loop.is_running());
    }

    #[test]
    fn frames_before_start_are_ignored() {
        let (log, mut scheduler, mut controller, mut target, mut camera, scene) = rig();
        let mut render_loop = RenderLoop::new();
        render_loop
            .frame(
                &mut scheduler,
                &mut controller,
                &mut camera,
                &mut target,
                &scene,
                1.0 / 60.0,
            )
            .unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn cancellation_stops_rescheduling_but_finishes_the_frame() {
        let (log, mut scheduler, mut controller, mut target, mut camera, scene) = rig();
        let mut render_loop = RenderLoop::new();
        render_loop.start(&mut scheduler);
        render_loop.cancel();
        log.borrow_mut().clear();
        render_loop
            .frame(
                &mut scheduler,
                &mut controller,
                &mut camera,
                &mut target,
                &scene,
                1.0 / 60.0,
            )
            .unwrap();
        assert_eq!(*log.borrow(), vec!["update", "draw"]);
    }
}
