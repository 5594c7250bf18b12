//! Stopping test on center movement

use crate::types::ClusterSet;

/// Stop the algorithm when the centers barely changed between iterations
///
/// Compares centers position by position. The relative change of every
/// element, `|curr - prev| / (prev + 1)`, must be at most `theta_o`. Sets
/// with different shapes never count as converged.
pub fn quit_low_change_in_clusters(centers: &ClusterSet, last_centers: &ClusterSet, theta_o: f64) -> bool {
    if centers.len() != last_centers.len() || centers.n_features() != last_centers.n_features() {
        return false;
    }
    centers.iter().zip(last_centers.iter()).all(|(curr, prev)| {
        curr.center
            .iter()
            .zip(prev.center.iter())
            .all(|(c, l)| ((c - l) / (l + 1.0)).abs() <= theta_o)
    })
}
