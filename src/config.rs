use glam::Vec3;
use thiserror::Error;

/// Number of box instances composed into the scene.
pub const POPULATION: usize = 100;

/// Half-extent of the uniform placement volume on each axis.
pub const PLACEMENT_SPREAD: f32 = 6.0;

/// Construction-time misconfiguration. The viewer refuses to build a
/// degenerate camera or surface instead of rendering garbage.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid clip planes: near {near} must be positive and less than far {far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("surface dimensions must be non-zero, got {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },
    #[error("{light} light intensity must be non-negative, got {value}")]
    NegativeIntensity { light: &'static str, value: f32 },
    #[error("material {field} must lie in [0, 1], got {value}")]
    MaterialOutOfRange { field: &'static str, value: f32 },
}

/// Perspective camera parameters. Aspect ratio is not stored here; it is
/// derived from the surface when the viewer is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 18.0),
            target: Vec3::ZERO,
        }
    }
}

/// Output surface parameters. Width and height seed the initial surface;
/// the renderer tracks the live size afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub clear_color: Vec3,
    pub width: u32,
    pub height: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Vec3::new(0.05, 0.06, 0.09),
            width: 1280,
            height: 720,
        }
    }
}

/// Directional light. The position vector defines the direction the
/// light shines from, towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightConfig {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::new(10.0, 20.0, 10.0),
        }
    }
}

/// Ambient fill light applied uniformly to every surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLightConfig {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.35,
        }
    }
}

/// Physically based surface parameters shared by every box instance.
/// All scalar fields are normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialConfig {
    pub base_color: Vec3,
    pub metalness: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub reflectivity: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            base_color: Vec3::new(0.35, 0.65, 0.9),
            metalness: 0.25,
            roughness: 0.3,
            transmission: 0.0,
            clearcoat: 0.6,
            clearcoat_roughness: 0.1,
            reflectivity: 0.5,
        }
    }
}

/// Complete parameter set for one viewer instance. Read once during
/// construction; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
    pub directional_light: DirectionalLightConfig,
    pub ambient_light: AmbientLightConfig,
    pub material: MaterialConfig,
    pub population: usize,
    pub spread: f32,
    pub auto_rotate_speed: f32,
    /// Fixed seed for the placement RNG; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            renderer: RendererConfig::default(),
            directional_light: DirectionalLightConfig::default(),
            ambient_light: AmbientLightConfig::default(),
            material: MaterialConfig::default(),
            population: POPULATION,
            spread: PLACEMENT_SPREAD,
            auto_rotate_speed: 3.0,
            seed: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.renderer.width = width;
        self.renderer.height = height;
        self
    }

    /// Rejects parameter combinations that would produce a degenerate
    /// projection or surface.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            return Err(ConfigError::InvalidClipPlanes {
                near: self.camera.near,
                far: self.camera.far,
            });
        }
        if self.renderer.width == 0 || self.renderer.height == 0 {
            return Err(ConfigError::InvalidSurfaceSize {
                width: self.renderer.width,
                height: self.renderer.height,
            });
        }
        if self.directional_light.intensity < 0.0 {
            return Err(ConfigError::NegativeIntensity {
                light: "directional",
                value: self.directional_light.intensity,
            });
        }
        if self.ambient_light.intensity < 0.0 {
            return Err(ConfigError::NegativeIntensity {
                light: "ambient",
                value: self.ambient_light.intensity,
            });
        }
        let material = &self.material;
        for (field, value) in [
            ("metalness", material.metalness),
            ("roughness", material.roughness),
            ("transmission", material.transmission),
            ("clearcoat", material.clearcoat),
            ("clearcoat_roughness", material.clearcoat_roughness),
            ("reflectivity", material.reflectivity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::MaterialOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidClipPlanes { .. })
        ));
    }

    #[test]
    fn zero_height_surface_is_rejected() {
        let config = ViewerConfig::default().with_surface_size(800, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSurfaceSize { .. })
        ));
    }

    #[test]
    fn out_of_range_material_scalar_is_rejected() {
        let mut config = ViewerConfig::default();
        config.material.roughness = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("roughness"));
    }
}
