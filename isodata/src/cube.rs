//! Spectral cube helpers
//!
//! Provides functions for:
//! - Flattening an (x, y, v) or (v, x, y) cube into a sample matrix
//! - Folding flat labels back into an (x, y) class map
//! - Running the whole classifier on a cube

use ndarray::{Array2, ArrayView3};
use num_traits::AsPrimitive;

use crate::{
    context::IsodataContext,
    error::{IsodataError, Result},
    isodata::{IsodataResult, fit},
    types::SampleMatrix,
};

/// Axis order of a spectral cube
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CubeLayout {
    /// (x, y, v): pixel axes first, one spectrum per pixel on the last axis
    #[default]
    SpatialFirst,
    /// (v, x, y): spectral axis first
    SpectralFirst,
}

/// Flatten a cube into a (x * y, v) sample matrix
///
/// Pixels are ordered row-major over (x, y), so sample `i` is pixel
/// `(i / y, i % y)`.
///
/// # Returns
/// * Sample matrix and the (x, y) grid shape needed to fold labels back
pub fn flatten_cube<T>(cube: ArrayView3<'_, T>, layout: CubeLayout) -> Result<(SampleMatrix, (usize, usize))>
where
    T: AsPrimitive<f64>,
{
    let cube = match layout {
        CubeLayout::SpatialFirst => cube,
        CubeLayout::SpectralFirst => cube.permuted_axes([1, 2, 0]),
    };
    let (x, y, v) = cube.dim();
    if x * y == 0 || v == 0 {
        return Err(IsodataError::EmptyInput { samples: x * y, features: v });
    }
    let flat: Vec<f64> = cube.iter().map(|value| value.as_()).collect();
    let data = Array2::from_shape_vec((x * y, v), flat)?;
    Ok((SampleMatrix::from_view(data.view())?, (x, y)))
}

/// Fold one label per pixel back into an (x, y) class map
pub fn labels_to_grid(labels: &[usize], shape: (usize, usize)) -> Result<Array2<usize>> {
    if labels.len() != shape.0 * shape.1 {
        return Err(IsodataError::Shape(format!(
            "{} labels cannot fill a {}x{} grid",
            labels.len(),
            shape.0,
            shape.1
        )));
    }
    Ok(Array2::from_shape_vec(shape, labels.to_vec())?)
}

/// Classify every pixel of a spectral cube
///
/// # Arguments
/// * `cube` - Spectral cube in the given layout, any primitive numeric type
/// * `layout` - Axis order of `cube`
/// * `context` - Run parameters
///
/// # Returns
/// * (x, y) map of cluster ids and the full run result
pub fn isodata_cube<T>(
    cube: ArrayView3<'_, T>,
    layout: CubeLayout,
    context: &IsodataContext,
) -> Result<(Array2<usize>, IsodataResult)>
where
    T: AsPrimitive<f64>,
{
    let (samples, shape) = flatten_cube(cube, layout)?;
    let result = fit(&samples, context)?;
    let grid = labels_to_grid(&result.labels, shape)?;
    Ok((grid, result))
}
