//! Synthetic hyperspectral scene
//! Vertical stripes of materials, each with a gaussian-shaped reflectance
//! spectrum, plus per-pixel gaussian noise

use ndarray::{Array2, Array3};
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};

/// Scene parameters
#[derive(Clone, Copy, Debug)]
pub struct SceneContext {
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub materials: usize,
    pub noise: f64,
    pub seed: u64,
}

/// Generated cube in (x, y, v) order plus the material index of every pixel
pub struct Scene {
    pub cube: Array3<f64>,
    pub truth: Array2<usize>,
    pub spectra: Vec<Vec<f64>>,
}

/// Build a random scene
///
/// # Returns
/// * The scene, or a message for an empty scene or an unusable noise level
pub fn build_scene(context: &SceneContext) -> Result<Scene, String> {
    if context.width == 0 || context.height == 0 || context.bands == 0 || context.materials == 0 {
        return Err(format!(
            "scene needs at least one pixel, band and material, got {}x{}x{} with {} materials",
            context.width, context.height, context.bands, context.materials
        ));
    }
    if !context.noise.is_finite() || context.noise < 0.0 {
        return Err(format!("noise level must be finite and >= 0, got {}", context.noise));
    }
    let mut rng = ChaCha20Rng::seed_from_u64(context.seed);
    let noise = Normal::new(0.0, context.noise).map_err(|e| format!("invalid noise level {}: {}", context.noise, e))?;

    let bands = context.bands as f64;
    let spectra: Vec<Vec<f64>> = (0..context.materials)
        .map(|_| {
            let peak = rng.random_range(0.0..bands);
            let width = rng.random_range(bands / 10.0..bands / 3.0 + 1.0);
            let amplitude = rng.random_range(100.0..1000.0);
            (0..context.bands)
                .map(|v| amplitude * (-((v as f64 - peak) / width).powi(2) / 2.0).exp())
                .collect()
        })
        .collect();

    let truth = Array2::from_shape_fn((context.width, context.height), |(x, _)| {
        x * context.materials / context.width
    });
    let mut cube = Array3::zeros((context.width, context.height, context.bands));
    for ((x, y, v), value) in cube.indexed_iter_mut() {
        *value = spectra[truth[[x, y]]][v] + noise.sample(&mut rng);
    }

    Ok(Scene { cube, truth, spectra })
}
