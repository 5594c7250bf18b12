//! ISODATA classification demo
//! Generates a synthetic hyperspectral cube, classifies every pixel and
//! prints the class map with a summary of the clusters found

use clap::Parser;
use isodata::{CubeLayout, InitMethod, IsodataContext, IsodataResult, isodata_cube};
use ndarray::Array2;
use scene::{SceneContext, build_scene};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod scene;

/// Command-line arguments for the demo
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Desired number of clusters (default: 5)
    #[arg(long)]
    pub k: Option<usize>,
    /// Initial number of clusters (default: same as k)
    #[arg(long)]
    pub k_initial: Option<usize>,
    /// Maximum number of iterations (default: 100)
    #[arg(long)]
    pub max_iter: Option<usize>,
    /// Maximum number of pairs merged per iteration (default: 2)
    #[arg(long)]
    pub pairs: Option<usize>,
    /// Discard clusters with at most this many members (default: 10)
    #[arg(long)]
    pub theta_m: Option<usize>,
    /// Standard deviation threshold for splitting (default: 0.1)
    #[arg(long)]
    pub theta_s: Option<f64>,
    /// Distance threshold for merging (default: 2.0)
    #[arg(long)]
    pub theta_c: Option<f64>,
    /// Relative center change threshold for convergence (default: 0.05)
    #[arg(long)]
    pub theta_o: Option<f64>,
    /// Initial centers: "linspace" or "random" (default: linspace)
    #[arg(long)]
    pub init: Option<String>,
    /// Random seed for scene and initial centers (default: 0)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scene width in pixels (default: 48)
    #[arg(long)]
    pub width: Option<usize>,
    /// Scene height in pixels (default: 16)
    #[arg(long)]
    pub height: Option<usize>,
    /// Number of spectral bands (default: 50)
    #[arg(long)]
    pub bands: Option<usize>,
    /// Number of materials painted into the scene (default: 4)
    #[arg(long)]
    pub materials: Option<usize>,
    /// Standard deviation of the per-pixel noise (default: 5.0)
    #[arg(long)]
    pub noise: Option<f64>,
    /// Log every iteration
    #[arg(long)]
    pub verbose: bool,
}

fn main() {
    let args: Args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let init_method: InitMethod = match args.init.as_deref() {
        Some(name) => match name.parse::<InitMethod>() {
            Ok(method) => method,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => InitMethod::Linspace,
    };

    let seed = match args.seed {
        Some(w) => w,
        None => 0,
    };

    let scene_context = SceneContext {
        width: args.width.unwrap_or(48),
        height: args.height.unwrap_or(16),
        bands: args.bands.unwrap_or(50),
        materials: args.materials.unwrap_or(4),
        noise: args.noise.unwrap_or(5.0),
        seed,
    };
    let scene = match build_scene(&scene_context) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Failed to build scene: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        width = scene_context.width,
        height = scene_context.height,
        bands = scene_context.bands,
        materials = scene_context.materials,
        "Scene generated"
    );

    // Configure the classifier
    let context = IsodataContext {
        k: match args.k {
            Some(w) => w,
            None => 5,
        },
        k_initial: args.k_initial,
        max_iteration: match args.max_iter {
            Some(w) => w,
            None => 100,
        },
        max_merge_pairs: match args.pairs {
            Some(w) => w,
            None => 2,
        },
        min_cluster_len: match args.theta_m {
            Some(w) => w,
            None => 10,
        },
        max_std_dev: match args.theta_s {
            Some(w) => w,
            None => 0.1,
        },
        merge_distance: match args.theta_c {
            Some(w) => w,
            None => 2.0,
        },
        convergence: match args.theta_o {
            Some(w) => w,
            None => 0.05,
        },
        init_method,
        seed,
        ..IsodataContext::default()
    };

    let (grid, result) = match isodata_cube(scene.cube.view(), CubeLayout::SpatialFirst, &context) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Classification failed: {}", e);
            std::process::exit(1);
        }
    };

    print_class_map(&grid, &result);
    print_summary(&grid, &scene.truth, &result);
}

// One letter per cluster, in cluster order. Labels naming a cluster that
// was dropped in the last iteration print as '.', clusters past the
// alphabet as '?'.
fn class_symbol(result: &IsodataResult, id: usize) -> char {
    const SYMBOLS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    match result.clusters.iter().position(|c| c.id == id) {
        Some(position) => SYMBOLS.get(position).map(|&b| b as char).unwrap_or('?'),
        None => '.',
    }
}

/// Print the (x, y) map transposed so that x runs left to right
fn print_class_map(grid: &Array2<usize>, result: &IsodataResult) {
    let (width, height) = grid.dim();
    println!();
    for y in 0..height {
        let line: String = (0..width).map(|x| class_symbol(result, grid[[x, y]])).collect();
        println!("{}", line);
    }
    println!();
}

fn print_summary(grid: &Array2<usize>, truth: &Array2<usize>, result: &IsodataResult) {
    println!(
        "{} clusters after {} iterations ({:?}, {:.3?})",
        result.n_clusters(),
        result.iterations,
        result.termination,
        result.elapsed
    );
    let orphaned = grid
        .iter()
        .filter(|&&id| !result.clusters.iter().any(|c| c.id == id))
        .count();
    if orphaned > 0 {
        println!("  . {} pixels labelled with a cluster dropped in the last iteration", orphaned);
    }
    for cluster in result.clusters.iter() {
        let pixels = grid.iter().filter(|&&id| id == cluster.id).count();
        // dominant material under this cluster
        let mut per_material: Vec<usize> = Vec::new();
        for (&id, &material) in grid.iter().zip(truth.iter()) {
            if id == cluster.id {
                if per_material.len() <= material {
                    per_material.resize(material + 1, 0);
                }
                per_material[material] += 1;
            }
        }
        let dominant = per_material
            .iter()
            .enumerate()
            .max_by_key(|&(_, count)| *count)
            .map(|(material, count)| format!("material {} ({} px)", material, count))
            .unwrap_or_else(|| "no pixels".to_string());
        let peak = cluster
            .center
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(band, value)| format!("band {} = {:.1}", band, value))
            .unwrap_or_default();
        println!(
            "  {} id={:<3} pixels={:<5} peak {:<18} {}",
            class_symbol(result, cluster.id),
            cluster.id,
            pixels,
            peak,
            dominant
        );
    }
}

// Example command line usage:
// cargo run --release -p isodata_demo -- --k 4 --materials 4 --theta-m 5 --verbose

#[cfg(test)]
mod tests {
    use super::*;
    use isodata::{ClusterSet, Termination};
    use std::time::Duration;

    fn result_with_ids(ids: Vec<usize>, labels: Vec<usize>) -> IsodataResult {
        let centers = ids.iter().map(|&id| vec![id as f64]).collect();
        IsodataResult {
            labels,
            clusters: ClusterSet::from_parts(centers, ids).unwrap(),
            iterations: 1,
            termination: Termination::MaxIterationsReached,
            history: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn symbols_follow_cluster_order() {
        let result = result_with_ids(vec![4, 9], vec![4, 9]);
        assert_eq!(class_symbol(&result, 4), 'A');
        assert_eq!(class_symbol(&result, 9), 'B');
    }

    #[test]
    fn dropped_cluster_ids_get_their_own_symbol() {
        // label 1 was discarded after the last assignment
        let result = result_with_ids(vec![0, 2], vec![0, 1, 2]);
        assert_eq!(class_symbol(&result, 1), '.');
        assert_eq!(class_symbol(&result, 2), 'B');
    }
}
