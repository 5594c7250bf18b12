//! ISODATA unsupervised classification
//!
//! Iterative self-organizing clustering for spectral data: the number of
//! clusters is adjusted while iterating, by discarding sparse clusters,
//! splitting wide ones and merging close ones.
//!
//! ```no_run
//! use isodata::{IsodataContext, SampleMatrix, fit};
//!
//! let samples = SampleMatrix::from_rows(&[vec![0.0, 1.0], vec![9.0, 8.0]])?;
//! let result = fit(&samples, &IsodataContext::new(2).with_min_cluster_len(0))?;
//! println!("{:?}", result.labels);
//! # Ok::<(), isodata::IsodataError>(())
//! ```

pub mod assign;
pub mod context;
pub mod convergence;
pub mod cube;
pub mod discard;
pub mod error;
pub mod init_centers;
pub mod isodata;
pub mod merge;
pub mod split;
pub mod statistics;
pub mod types;
pub mod update;

pub use context::{InitMethod, IsodataContext};
pub use cube::{CubeLayout, flatten_cube, isodata_cube, labels_to_grid};
pub use error::{IsodataError, Result};
pub use isodata::{Adjustment, IsodataResult, IterationRecord, Termination, classify, fit};
pub use types::{Assignment, Cluster, ClusterSet, EuclideanDistance, SampleMatrix};
