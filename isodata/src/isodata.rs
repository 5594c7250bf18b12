use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::{
    assign::assign_samples,
    context::IsodataContext,
    convergence::quit_low_change_in_clusters,
    discard::discard_clusters,
    error::{IsodataError, Result},
    init_centers::initial_clusters,
    merge::merge_clusters,
    split::split_clusters,
    types::{ClusterSet, SampleMatrix},
    update::update_clusters,
};

/// Why the iteration loop stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Centers changed by less than the convergence threshold
    Converged,
    /// The iteration cap was reached first
    MaxIterationsReached,
}

/// Cluster-count adjustment taken in one iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Split,
    /// Number of pairs merged
    Merge(usize),
    None,
}

/// Diagnostics for one iteration of the loop
#[derive(Clone, Debug, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub clusters_before: usize,
    pub clusters_after: usize,
    pub discarded: usize,
    pub adjustment: Adjustment,
    pub elapsed: Duration,
}

/// Outcome of a full ISODATA run
#[derive(Clone, Debug, PartialEq)]
pub struct IsodataResult {
    /// Cluster id per sample, from the last assignment computed
    ///
    /// That assignment is taken before the final iteration discards, splits
    /// or merges clusters, so a label can name an id that `clusters` no
    /// longer holds.
    pub labels: Vec<usize>,
    /// Clusters at termination
    pub clusters: ClusterSet,
    pub iterations: usize,
    pub termination: Termination,
    pub history: Vec<IterationRecord>,
    pub elapsed: Duration,
}

impl IsodataResult {
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Distinct labels, ascending
    pub fn classes(&self) -> Vec<usize> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

/// Classify samples with the ISODATA algorithm
///
/// Each iteration assigns samples to the nearest center, discards
/// under-populated clusters, moves centers to the mean of their members,
/// then splits when there are at most `k / 2` clusters or merges when there
/// are more than `2 * k`. The loop stops when the centers converge or after
/// `max_iteration` iterations; both outcomes carry a usable assignment.
///
/// # Arguments
/// * `samples` - Sample matrix (N, F), e.g. a flattened spectral cube
/// * `context` - Run parameters, validated before anything else
///
/// # Returns
/// * IsodataResult with one label per sample
/// * Any error from a sub-step aborts the whole run
pub fn fit(samples: &SampleMatrix, context: &IsodataContext) -> Result<IsodataResult> {
    context.validate()?;

    let k_ = context.initial_k();
    let mut rng = ChaCha20Rng::seed_from_u64(context.seed);
    info!(
        classes = k_,
        samples = samples.n_samples(),
        features = samples.n_features(),
        method = %context.init_method,
        "Isodata: starting algorithm"
    );

    let mut clusters = initial_clusters(samples, k_, context.init_method, &mut rng)?;
    let target = context.k as f64;

    let fit_timer = Instant::now();
    let mut history: Vec<IterationRecord> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut termination = Termination::MaxIterationsReached;

    for iteration in 0..context.max_iteration {
        let iteration_timer = Instant::now();
        let last_centers = clusters.clone();
        let clusters_before = clusters.len();

        let assignment = assign_samples(samples, &clusters)?;
        let discarded = discard_clusters(&assignment, &mut clusters, context.min_cluster_len)?;
        if clusters.is_empty() {
            return Err(IsodataError::AllClustersDiscarded { iteration });
        }
        update_clusters(samples, &assignment, &mut clusters)?;

        let k = clusters.len() as f64;
        let adjustment = if k <= target / 2.0 {
            // too few clusters
            let split = split_clusters(
                samples,
                &assignment,
                &mut clusters,
                context.max_std_dev,
                context.min_cluster_len,
                context.split_offset,
            )?;
            if split { Adjustment::Split } else { Adjustment::None }
        } else if k > target * 2.0 {
            // too many clusters
            match merge_clusters(&assignment, &mut clusters, context.max_merge_pairs, context.merge_distance)? {
                0 => Adjustment::None,
                pairs => Adjustment::Merge(pairs),
            }
        } else {
            Adjustment::None
        };

        let record = IterationRecord {
            iteration,
            clusters_before,
            clusters_after: clusters.len(),
            discarded,
            adjustment,
            elapsed: iteration_timer.elapsed(),
        };
        debug!(
            iteration,
            before = record.clusters_before,
            after = record.clusters_after,
            discarded,
            adjustment = ?record.adjustment,
            elapsed = ?record.elapsed,
            "Isodata: iteration done"
        );
        history.push(record);
        labels = assignment.labels;

        if quit_low_change_in_clusters(&clusters, &last_centers, context.convergence) {
            termination = Termination::Converged;
            break;
        }
    }

    let elapsed = fit_timer.elapsed();
    info!(
        classes = clusters.len(),
        iterations = history.len(),
        termination = ?termination,
        elapsed = ?elapsed,
        "Isodata: finished"
    );

    Ok(IsodataResult {
        labels,
        clusters,
        iterations: history.len(),
        termination,
        history,
        elapsed,
    })
}

/// Classify samples and return only the label per sample
pub fn classify(samples: &SampleMatrix, context: &IsodataContext) -> Result<Vec<usize>> {
    Ok(fit(samples, context)?.labels)
}
