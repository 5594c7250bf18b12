//! Run parameters for ISODATA classification
//! Defaults follow the classic parameter set; `validate` is called by `fit`

use std::{fmt, str::FromStr};

use crate::error::{IsodataError, Result};

/// How the starting cluster centers are chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InitMethod {
    /// Per feature, evenly spaced values between the feature's min and max
    #[default]
    Linspace,
    /// Rows drawn uniformly at random (with replacement) from the samples
    Random,
}

impl FromStr for InitMethod {
    type Err = IsodataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linspace" => Ok(InitMethod::Linspace),
            "random" => Ok(InitMethod::Random),
            other => Err(IsodataError::configuration(
                "method",
                other,
                "expected \"linspace\" or \"random\"",
            )),
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitMethod::Linspace => write!(f, "linspace"),
            InitMethod::Random => write!(f, "random"),
        }
    }
}

// Parameters of one ISODATA run. Field comments give the classic symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct IsodataContext {
    /// Desired number of clusters (k)
    pub k: usize,
    /// Number of clusters to start with (k_); `None` starts with `k`
    pub k_initial: Option<usize>,
    /// Maximum number of iterations (it)
    pub max_iteration: usize,
    /// Maximum number of cluster pairs merged per iteration (p)
    pub max_merge_pairs: usize,
    /// Clusters with at most this many members are discarded (theta_m)
    pub min_cluster_len: usize,
    /// Standard deviation above which a cluster may split (theta_s)
    pub max_std_dev: f64,
    /// Centers closer than this may merge (theta_c)
    pub merge_distance: f64,
    /// Relative center change under which the run has converged (theta_o)
    pub convergence: f64,
    pub init_method: InitMethod,
    /// Offset added to and subtracted from a split cluster's center
    pub split_offset: f64,
    pub seed: u64,
}

impl Default for IsodataContext {
    fn default() -> Self {
        Self {
            k: 5,
            k_initial: None,
            max_iteration: 100,
            max_merge_pairs: 2,
            min_cluster_len: 10,
            max_std_dev: 0.1,
            merge_distance: 2.0,
            convergence: 0.05,
            init_method: InitMethod::Linspace,
            split_offset: 10.0,
            seed: 0,
        }
    }
}

impl IsodataContext {
    /// Create a context targeting `k` clusters, other parameters at defaults
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_k_initial(mut self, k_initial: usize) -> Self {
        self.k_initial = Some(k_initial);
        self
    }

    pub fn with_max_iteration(mut self, max_iteration: usize) -> Self {
        self.max_iteration = max_iteration;
        self
    }

    pub fn with_max_merge_pairs(mut self, pairs: usize) -> Self {
        self.max_merge_pairs = pairs;
        self
    }

    pub fn with_min_cluster_len(mut self, min_cluster_len: usize) -> Self {
        self.min_cluster_len = min_cluster_len;
        self
    }

    pub fn with_max_std_dev(mut self, max_std_dev: f64) -> Self {
        self.max_std_dev = max_std_dev;
        self
    }

    pub fn with_merge_distance(mut self, merge_distance: f64) -> Self {
        self.merge_distance = merge_distance;
        self
    }

    pub fn with_convergence(mut self, convergence: f64) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn with_init_method(mut self, init_method: InitMethod) -> Self {
        self.init_method = init_method;
        self
    }

    pub fn with_split_offset(mut self, split_offset: f64) -> Self {
        self.split_offset = split_offset;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of clusters the run starts with
    pub fn initial_k(&self) -> usize {
        self.k_initial.unwrap_or(self.k)
    }

    /// Check every parameter against its valid domain
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(IsodataError::configuration("k", self.k, "must be >= 1"));
        }
        if self.k_initial == Some(0) {
            return Err(IsodataError::configuration("k_", 0, "must be >= 1"));
        }
        if self.max_iteration == 0 {
            return Err(IsodataError::configuration("it", self.max_iteration, "must be >= 1"));
        }
        for (name, value) in [
            ("theta_s", self.max_std_dev),
            ("theta_c", self.merge_distance),
            ("theta_o", self.convergence),
            ("split_offset", self.split_offset),
        ] {
            if value.is_nan() || value < 0.0 || value.is_infinite() {
                return Err(IsodataError::configuration(name, value, "must be finite and >= 0"));
            }
        }
        Ok(())
    }
}
