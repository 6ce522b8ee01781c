//! Clustering strategies, one per capability tier
//!
//! The tier is fixed when the strategy is built, from the features this
//! crate was compiled with: `density-clustering` enables HDBSCAN over a
//! spherical projection, `hierarchical-clustering` enables average-linkage
//! agglomeration over a linear reduction, and without either every record
//! is its own cluster.

use super::config::MiningConfig;
#[cfg(any(feature = "density-clustering", feature = "hierarchical-clustering"))]
use super::vector::{euclidean, pca};
#[cfg(feature = "hierarchical-clustering")]
use super::vector::distance_matrix;
#[cfg(feature = "density-clustering")]
use super::vector::{l2_normalize, silhouette};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Capability tier, ordered from least to most capable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringTier {
    /// One cluster per record
    Singleton,
    /// Linear reduction plus agglomerative clustering
    Hierarchical,
    /// Density clustering over a nonlinear reduction
    Density,
}

impl ClusteringTier {
    /// Most capable tier compiled into this build
    pub fn available() -> Self {
        if cfg!(feature = "density-clustering") {
            ClusteringTier::Density
        } else if cfg!(feature = "hierarchical-clustering") {
            ClusteringTier::Hierarchical
        } else {
            ClusteringTier::Singleton
        }
    }
}

impl fmt::Display for ClusteringTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusteringTier::Singleton => write!(f, "singleton"),
            ClusteringTier::Hierarchical => write!(f, "hierarchical"),
            ClusteringTier::Density => write!(f, "density"),
        }
    }
}

impl std::str::FromStr for ClusteringTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" | "none" => Ok(ClusteringTier::Singleton),
            "hierarchical" | "agglomerative" => Ok(ClusteringTier::Hierarchical),
            "density" | "hdbscan" => Ok(ClusteringTier::Density),
            _ => Err(format!("Invalid ClusteringTier: {}", s)),
        }
    }
}

/// Cluster labels, dense from 0 in order of first appearance
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub labels: Vec<usize>,
    /// Silhouette over the reduced space, density tier only
    pub separation: Option<f64>,
}

impl Clustering {
    pub fn singletons(n: usize) -> Self {
        Self {
            labels: (0..n).collect(),
            separation: None,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.labels.iter().max().map_or(0, |m| m + 1)
    }
}

/// Relabel arbitrary cluster ids to 0.. in order of first appearance
#[cfg_attr(
    not(any(feature = "density-clustering", feature = "hierarchical-clustering")),
    allow(dead_code)
)]
fn dense_labels(raw: &[usize]) -> Vec<usize> {
    let mut seen: Vec<usize> = Vec::new();
    raw.iter()
        .map(|label| match seen.iter().position(|s| s == label) {
            Some(pos) => pos,
            None => {
                seen.push(*label);
                seen.len() - 1
            }
        })
        .collect()
}

pub trait ClusteringStrategy: Send + Sync {
    fn tier(&self) -> ClusteringTier;

    fn cluster(&self, vectors: &[Vec<f64>]) -> Clustering;
}

pub struct SingletonClustering;

impl ClusteringStrategy for SingletonClustering {
    fn tier(&self) -> ClusteringTier {
        ClusteringTier::Singleton
    }

    fn cluster(&self, vectors: &[Vec<f64>]) -> Clustering {
        Clustering::singletons(vectors.len())
    }
}

/// Average-linkage agglomeration down to `round(n * ratio)` clusters
#[cfg(feature = "hierarchical-clustering")]
pub struct HierarchicalClustering {
    ratio: f64,
    dimensions: usize,
}

#[cfg(feature = "hierarchical-clustering")]
impl HierarchicalClustering {
    pub fn new(ratio: f64, dimensions: usize) -> Self {
        Self { ratio, dimensions }
    }

    fn target_clusters(&self, n: usize) -> usize {
        ((n as f64 * self.ratio).round() as usize).clamp(1, n.max(1))
    }
}

#[cfg(feature = "hierarchical-clustering")]
impl ClusteringStrategy for HierarchicalClustering {
    fn tier(&self) -> ClusteringTier {
        ClusteringTier::Hierarchical
    }

    fn cluster(&self, vectors: &[Vec<f64>]) -> Clustering {
        let n = vectors.len();
        if n < 2 {
            return Clustering::singletons(n);
        }
        let reduced = pca(vectors, self.dimensions);
        let dist = distance_matrix(&reduced, |a, b| euclidean(a, b));
        let target = self.target_clusters(n);

        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        while clusters.len() > target {
            let mut best: Option<(usize, usize, f64)> = None;
            for a in 0..clusters.len() {
                for b in (a + 1)..clusters.len() {
                    let d = average_linkage(&dist, &clusters[a], &clusters[b]);
                    if best.is_none_or(|(_, _, bd)| d < bd) {
                        best = Some((a, b, d));
                    }
                }
            }
            let Some((a, b, _)) = best else { break };
            let merged = clusters.remove(b);
            clusters[a].extend(merged);
        }

        let mut raw = vec![0; n];
        for (id, members) in clusters.iter().enumerate() {
            for &m in members {
                raw[m] = id;
            }
        }
        debug!("Hierarchical clustering: {} points into {} clusters", n, clusters.len());
        Clustering {
            labels: dense_labels(&raw),
            separation: None,
        }
    }
}

#[cfg(feature = "hierarchical-clustering")]
fn average_linkage(dist: &[Vec<f64>], a: &[usize], b: &[usize]) -> f64 {
    let total: f64 = a.iter().flat_map(|&i| b.iter().map(move |&j| dist[i][j])).sum();
    total / (a.len() * b.len()) as f64
}

/// HDBSCAN over L2-normalized, PCA-reduced vectors; noise joins its exact
/// duplicates or becomes a singleton
#[cfg(feature = "density-clustering")]
pub struct DensityClustering {
    min_cluster_size: usize,
    min_samples: usize,
    dimensions: usize,
}

#[cfg(feature = "density-clustering")]
impl DensityClustering {
    pub fn new(min_cluster_size: usize, min_samples: usize, dimensions: usize) -> Self {
        Self {
            min_cluster_size,
            min_samples,
            dimensions,
        }
    }
}

#[cfg(feature = "density-clustering")]
impl ClusteringStrategy for DensityClustering {
    fn tier(&self) -> ClusteringTier {
        ClusteringTier::Density
    }

    fn cluster(&self, vectors: &[Vec<f64>]) -> Clustering {
        use hdbscan::{Hdbscan, HdbscanHyperParams};

        let n = vectors.len();
        if n < 2 {
            return Clustering::singletons(n);
        }

        let spherical: Vec<Vec<f64>> = vectors.iter().map(|v| l2_normalize(v)).collect();
        let reduced = pca(&spherical, self.dimensions);

        let hdbscan_labels = if n <= self.min_cluster_size {
            vec![-1; n]
        } else {
            let hyper_params = HdbscanHyperParams::builder()
                .min_cluster_size(self.min_cluster_size)
                .min_samples(self.min_samples)
                .build();
            match Hdbscan::new(&reduced, hyper_params).cluster() {
                Ok(labels) => labels,
                Err(e) => {
                    debug!("Density clustering failed ({:?}); treating all points as noise", e);
                    vec![-1; n]
                }
            }
        };

        let noise = hdbscan_labels.iter().filter(|&&label| label < 0).count();
        let labels = dense_labels(&resolve_noise(&reduced, &hdbscan_labels));
        let separation = silhouette(&reduced, &labels);

        let clustering = Clustering { labels, separation };
        debug!(
            "Density clustering: {} points ({} noise) into {} clusters",
            n,
            noise,
            clustering.cluster_count()
        );
        clustering
    }
}

/// Give every noise point a cluster id.
///
/// HDBSCAN reports a group of identical vectors as noise (their mutual
/// reachability is zero), so a noise point at zero distance from another
/// point shares that point's cluster. Remaining noise points are singletons,
/// numbered past every real cluster.
#[cfg(feature = "density-clustering")]
fn resolve_noise(points: &[Vec<f64>], labels: &[i32]) -> Vec<usize> {
    const SAME_POINT: f64 = 1e-9;

    let clustered: Vec<Option<usize>> = labels
        .iter()
        .map(|&label| usize::try_from(label).ok())
        .collect();
    let mut next_id = clustered.iter().flatten().max().map_or(0, |m| m + 1);
    let mut resolved = clustered.clone();

    for i in 0..points.len() {
        if resolved[i].is_some() {
            continue;
        }
        let same = |j: &usize| *j != i && euclidean(&points[i], &points[*j]) <= SAME_POINT;
        // a clustered twin wins over an earlier noise twin
        let twin = (0..points.len())
            .filter(same)
            .find_map(|j| clustered[j])
            .or_else(|| (0..points.len()).filter(same).find_map(|j| resolved[j]));
        resolved[i] = Some(twin.unwrap_or_else(|| {
            next_id += 1;
            next_id - 1
        }));
    }

    resolved.into_iter().flatten().collect()
}

/// Strategy for the most capable tier allowed by both the build and `config`
pub fn select_strategy(config: &MiningConfig) -> Box<dyn ClusteringStrategy> {
    let available = ClusteringTier::available();
    let tier = config.max_tier.map_or(available, |cap| cap.min(available));
    debug!("Clustering tier: {} (available: {})", tier, available);

    match tier {
        #[cfg(feature = "density-clustering")]
        ClusteringTier::Density => Box::new(DensityClustering::new(
            config.min_cluster_size,
            config.min_samples,
            config.reduced_dimensions,
        )),
        #[cfg(feature = "hierarchical-clustering")]
        ClusteringTier::Hierarchical => Box::new(HierarchicalClustering::new(
            config.cluster_ratio,
            config.reduced_dimensions,
        )),
        _ => Box::new(SingletonClustering),
    }
}
