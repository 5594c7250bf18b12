//! Core data types for ISODATA clustering
//! Sample matrix, cluster records, assignments and the distance trait
//! shared by every step of the algorithm

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use num_traits::AsPrimitive;

use crate::error::{IsodataError, Result};

/// Trait for calculating Euclidean (L2) distance between feature vectors
pub trait EuclideanDistance<Rhs: ?Sized = Self> {
    /// Sum of squared element-wise differences
    fn squared_distance(&self, right: &Rhs) -> f64;
    /// Calculate sqrt(sum((a[i] - b[i])^2)) for all paired elements
    fn euclidean_distance(&self, right: &Rhs) -> f64 {
        self.squared_distance(right).sqrt()
    }
}

impl EuclideanDistance for [f64] {
    fn squared_distance(&self, right: &Self) -> f64 {
        self.iter()
            .zip(right.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
    }
}

/// Distance from a sample row to a cluster center
impl EuclideanDistance<[f64]> for ArrayView1<'_, f64> {
    fn squared_distance(&self, right: &[f64]) -> f64 {
        self.iter()
            .zip(right.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
    }
}

/// Immutable (N, F) matrix of samples, one feature vector per row
///
/// Built once from caller data and never mutated by the algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleMatrix {
    data: Array2<f64>,
}

impl SampleMatrix {
    /// Create a sample matrix from any numeric 2D view
    ///
    /// # Arguments
    /// * `view` - (samples, features) array, e.g. a flattened spectral cube
    ///
    /// # Returns
    /// * `Err(EmptyInput)` if there are no samples or no features
    /// * `Err(NonFiniteSample)` if any value is NaN or infinite
    pub fn from_view<T>(view: ArrayView2<'_, T>) -> Result<Self>
    where
        T: AsPrimitive<f64>,
    {
        let (samples, features) = view.dim();
        if samples == 0 || features == 0 {
            return Err(IsodataError::EmptyInput { samples, features });
        }
        let data: Array2<f64> = view.mapv(|v| v.as_());
        if let Some(((row, column), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(IsodataError::NonFiniteSample { row, column });
        }
        Ok(Self { data })
    }

    /// Create a sample matrix from row vectors; rows must share one length
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let features = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != features) {
            return Err(IsodataError::Shape(format!(
                "ragged rows: expected {} features, found {}",
                features,
                bad.len()
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((rows.len(), features), flat)?;
        Self::from_view(data.view())
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Per-feature minimum and maximum over all samples
    pub fn feature_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        let minimum = self.data.fold_axis(Axis(0), f64::INFINITY, |a, &b| a.min(b));
        let maximum = self.data.fold_axis(Axis(0), f64::NEG_INFINITY, |a, &b| a.max(b));
        (minimum.to_vec(), maximum.to_vec())
    }
}

/// A cluster: persistent identifier plus its center
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub id: usize,
    pub center: Vec<f64>,
}

/// Ordered set of clusters sharing one feature dimension
///
/// Ids and centers travel together as records, so they can never be
/// indexed out of step. Positions are transient; ids persist.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    n_features: usize,
}

impl ClusterSet {
    /// Build clusters from centers, numbering ids from zero
    pub fn from_centers(centers: Vec<Vec<f64>>) -> Result<Self> {
        let ids = (0..centers.len()).collect();
        Self::from_parts(centers, ids)
    }

    /// Zip parallel center and id arrays into records
    pub fn from_parts(centers: Vec<Vec<f64>>, ids: Vec<usize>) -> Result<Self> {
        if centers.len() != ids.len() {
            return Err(IsodataError::InternalConsistency {
                step: "from_parts",
                reason: format!("{} centers but {} cluster ids", centers.len(), ids.len()),
            });
        }
        let n_features = centers.first().map(|c| c.len()).unwrap_or(0);
        let set = Self {
            clusters: centers
                .into_iter()
                .zip(ids)
                .map(|(center, id)| Cluster { id, center })
                .collect(),
            n_features,
        };
        set.check_consistency("from_parts")?;
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Cluster> {
        self.clusters.get(position)
    }

    pub fn ids(&self) -> Vec<usize> {
        self.clusters.iter().map(|c| c.id).collect()
    }

    pub fn max_id(&self) -> Option<usize> {
        self.clusters.iter().map(|c| c.id).max()
    }

    /// Centers as a (K, F) matrix
    pub fn center_matrix(&self) -> Array2<f64> {
        let flat: Vec<f64> = self.clusters.iter().flat_map(|c| c.center.iter().copied()).collect();
        Array2::from_shape_vec((self.clusters.len(), self.n_features), flat)
            .unwrap_or_else(|_| Array2::zeros((0, self.n_features)))
    }

    /// Append a cluster; its center must have the set's feature count
    pub fn push(&mut self, cluster: Cluster) -> Result<()> {
        if self.clusters.is_empty() && self.n_features == 0 {
            self.n_features = cluster.center.len();
        }
        if cluster.center.len() != self.n_features {
            return Err(IsodataError::InternalConsistency {
                step: "push",
                reason: format!(
                    "cluster {} has {} features, expected {}",
                    cluster.id,
                    cluster.center.len(),
                    self.n_features
                ),
            });
        }
        self.clusters.push(cluster);
        Ok(())
    }

    /// Remove the clusters at the given positions in one pass
    pub fn remove_positions(&mut self, positions: &[usize]) {
        let doomed: HashSet<usize> = positions.iter().copied().collect();
        let mut position = 0;
        self.clusters.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
    }

    /// Stable sort by the first feature of each center
    pub fn sort_by_first(&mut self) {
        if self.n_features == 0 {
            return;
        }
        self.clusters.sort_by(|a, b| a.center[0].total_cmp(&b.center[0]));
    }

    pub(crate) fn clusters_mut(&mut self) -> &mut [Cluster] {
        &mut self.clusters
    }

    /// Verify record shape and id uniqueness after a mutating step
    pub fn check_consistency(&self, step: &'static str) -> Result<()> {
        if let Some(bad) = self.clusters.iter().find(|c| c.center.len() != self.n_features) {
            return Err(IsodataError::InternalConsistency {
                step,
                reason: format!(
                    "cluster {} has {} features, expected {}",
                    bad.id,
                    bad.center.len(),
                    self.n_features
                ),
            });
        }
        let mut seen = HashSet::with_capacity(self.clusters.len());
        if let Some(dup) = self.clusters.iter().find(|c| !seen.insert(c.id)) {
            return Err(IsodataError::InternalConsistency {
                step,
                reason: format!("cluster id {} appears twice", dup.id),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ClusterSet {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Nearest-center assignment of every sample
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Cluster id of the nearest center, one per sample
    pub labels: Vec<usize>,
    /// L2 distance from each sample to that center
    pub distances: Vec<f64>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sample indices grouped by cluster id
    pub fn members(&self) -> HashMap<usize, Vec<usize>> {
        let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
        for (sample, id) in self.labels.iter().enumerate() {
            members.entry(*id).or_default().push(sample);
        }
        members
    }

    /// Number of samples assigned to each cluster id
    pub fn member_counts(&self) -> HashMap<usize, usize> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for id in self.labels.iter() {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    }
}
