//! Interactive viewer for a procedurally placed field of lit boxes.
//!
//! The crate exposes the composition and frame-loop building blocks
//! (configuration, camera, scene composer, orbit controller, viewport
//! binding and the render loop driver) behind small trait seams so the
//! logic stays testable without a window or a GPU. The wgpu renderer
//! and winit wiring sit at the edges.

pub mod app;
pub mod camera;
pub mod config;
pub mod driver;
pub mod orbit;
pub mod render;
pub mod scene;
pub mod viewport;

pub use app::{scene_summary, Viewer};
pub use camera::Camera;
pub use config::{
    AmbientLightConfig, CameraConfig, ConfigError, DirectionalLightConfig, MaterialConfig,
    RendererConfig, ViewerConfig, PLACEMENT_SPREAD, POPULATION,
};
pub use driver::{DrawTarget, FrameScheduler, RenderLoop};
pub use orbit::{FrameController, OrbitController};
pub use render::Renderer;
pub use scene::{AmbientLight, BoxGeometry, BoxInstance, DirectionalLight, Material, Scene};
pub use viewport::{ResizeTarget, SurfaceSize, ViewportBinder, WindowViewport};
