use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::camera::Camera;
use crate::config::{MaterialConfig, ViewerConfig};

/// Unit box mesh (side length 1.0) with interleaved position/normal
/// vertices, six floats per vertex. One buffer feeds every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl BoxGeometry {
    /// Builds the canonical unit box: four vertices per face so each
    /// face carries its own flat normal.
    pub fn unit() -> Self {
        // (normal, face tangent u, face tangent v)
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

        let mut vertices = Vec::with_capacity(6 * 4 * 6);
        let mut indices = Vec::with_capacity(6 * 6);
        for (face, &(normal, u, v)) in FACES.iter().enumerate() {
            let n = Vec3::from_array(normal);
            let u = Vec3::from_array(u);
            let v = Vec3::from_array(v);
            for (du, dv) in CORNERS {
                let position = n * 0.5 + u * du + v * dv;
                vertices.extend_from_slice(&position.to_array());
                vertices.extend_from_slice(&n.to_array());
            }
            let base = (face * 4) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }
}

/// Surface description shared by reference across all box instances.
/// Built once from [`MaterialConfig`]; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: Vec3,
    pub metalness: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub reflectivity: f32,
}

impl Material {
    pub fn from_config(config: &MaterialConfig) -> Self {
        Self {
            base_color: config.base_color,
            metalness: config.metalness,
            roughness: config.roughness,
            transmission: config.transmission,
            clearcoat: config.clearcoat,
            clearcoat_roughness: config.clearcoat_roughness,
            reflectivity: config.reflectivity,
        }
    }
}

/// Directional key light shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

/// Ambient fill light with no direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// One placed occurrence of the shared box geometry and material.
/// Instances differ only by transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxInstance {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl BoxInstance {
    /// World transform: translate, then intrinsic ZYX rotation.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x);
        Mat4::from_translation(self.position) * rotation
    }
}

/// The renderable world: two always-on lights plus the box population,
/// all sharing one geometry buffer and one material. Append-only after
/// composition; nothing is added or removed at runtime.
#[derive(Debug, Clone)]
pub struct Scene {
    directional_light: DirectionalLight,
    ambient_light: AmbientLight,
    geometry: Arc<BoxGeometry>,
    material: Arc<Material>,
    instances: Vec<BoxInstance>,
}

impl Scene {
    /// Composes the camera and scene from declarative configuration.
    ///
    /// The RNG is injected so callers pick the placement distribution
    /// source; a seeded RNG reproduces the exact same field. This is the
    /// only nondeterminism in the whole viewer.
    pub fn compose<R: Rng>(config: &ViewerConfig, rng: &mut R) -> (Camera, Self) {
        let aspect = config.renderer.width as f32 / config.renderer.height as f32;
        let camera = Camera::from_config(&config.camera, aspect);

        let directional_light = DirectionalLight {
            color: config.directional_light.color,
            intensity: config.directional_light.intensity,
            position: config.directional_light.position,
        };
        let ambient_light = AmbientLight {
            color: config.ambient_light.color,
            intensity: config.ambient_light.intensity,
        };

        let geometry = Arc::new(BoxGeometry::unit());
        let material = Arc::new(Material::from_config(&config.material));

        let spread = config.spread;
        let mut instances = Vec::with_capacity(config.population);
        for _ in 0..config.population {
            instances.push(BoxInstance {
                position: Vec3::new(
                    rng.gen_range(-spread..=spread),
                    rng.gen_range(-spread..=spread),
                    rng.gen_range(-spread..=spread),
                ),
                rotation: Vec3::new(
                    rng.gen_range(0.0..TAU),
                    rng.gen_range(0.0..TAU),
                    rng.gen_range(0.0..TAU),
                ),
            });
        }

        let scene = Self {
            directional_light,
            ambient_light,
            geometry,
            material,
            instances,
        };
        (camera, scene)
    }

    pub fn directional_light(&self) -> &DirectionalLight {
        &self.directional_light
    }

    pub fn ambient_light(&self) -> &AmbientLight {
        &self.ambient_light
    }

    /// Handle to the single shared geometry resource.
    pub fn geometry(&self) -> &Arc<BoxGeometry> {
        &self.geometry
    }

    /// Handle to the single shared material resource.
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn instances(&self) -> &[BoxInstance] {
        &self.instances
    }

    pub fn light_count(&self) -> usize {
        2
    }

    /// Total number of addable objects: instances plus lights.
    pub fn object_count(&self) -> usize {
        self.instances.len() + self.light_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PLACEMENT_SPREAD, POPULATION};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn compose(seed: u64) -> (Camera, Scene) {
        let mut rng = StdRng::seed_from_u64(seed);
        Scene::compose(&ViewerConfig::default(), &mut rng)
    }

    #[test]
    fn population_and_lights_match_the_defaults() {
        let (_, scene) = compose(1);
        assert_eq!(scene.instances().len(), POPULATION);
        assert_eq!(scene.light_count(), 2);
        assert_eq!(scene.object_count(), POPULATION + 2);
    }

    #[test]
    fn geometry_and_material_are_single_shared_resources() {
        let (_, scene) = compose(2);
        // Every instance renders through the same two handles; nothing
        // clones the underlying buffers per instance.
        assert_eq!(Arc::strong_count(scene.geometry()), 1);
        assert_eq!(Arc::strong_count(scene.material()), 1);
        let geometry = Arc::clone(scene.geometry());
        assert!(Arc::ptr_eq(&geometry, scene.geometry()));
    }

    #[test]
    fn transforms_stay_within_the_sampling_ranges() {
        let (_, scene) = compose(3);
        for instance in scene.instances() {
            for component in instance.position.to_array() {
                assert!((-PLACEMENT_SPREAD..=PLACEMENT_SPREAD).contains(&component));
            }
            for component in instance.rotation.to_array() {
                assert!((0.0..TAU).contains(&component));
            }
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_fields() {
        let (_, first) = compose(42);
        let (_, second) = compose(42);
        assert_eq!(first.instances(), second.instances());
    }

    #[test]
    fn different_seeds_diverge() {
        let (_, first) = compose(42);
        let (_, second) = compose(43);
        assert_ne!(first.instances(), second.instances());
    }

    #[test]
    fn camera_aspect_comes_from_the_surface() {
        let config = ViewerConfig::default().with_surface_size(800, 600);
        let mut rng = StdRng::seed_from_u64(0);
        let (camera, _) = Scene::compose(&config, &mut rng);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn unit_box_has_24_vertices_and_36_indices() {
        let geometry = BoxGeometry::unit();
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.indices.len(), 36);
        // Side length 1.0: every position component is ±0.5.
        for vertex in geometry.vertices.chunks(6) {
            for component in &vertex[..3] {
                assert!((component.abs() - 0.5).abs() < 1e-6);
            }
        }
    }
}
