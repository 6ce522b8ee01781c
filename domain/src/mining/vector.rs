//! Dense vector helpers for reduction, distances and cluster separation

const POWER_ITERATIONS: usize = 100;
const EPSILON: f64 = 1e-12;

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// 1 - cosine similarity, in [0, 2]. A zero vector is maximally distant
/// from anything but another zero vector.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let (na, nb) = (norm(a), norm(b));
    if na < EPSILON || nb < EPSILON {
        return if na < EPSILON && nb < EPSILON { 0.0 } else { 1.0 };
    }
    (1.0 - dot(a, b) / (na * nb)).clamp(0.0, 2.0)
}

/// Project onto the unit sphere; zero vectors are left as is.
pub fn l2_normalize(v: &[f64]) -> Vec<f64> {
    let n = norm(v);
    if n < EPSILON {
        v.to_vec()
    } else {
        v.iter().map(|x| x / n).collect()
    }
}

/// Symmetric pairwise distance matrix
pub fn distance_matrix<T>(items: &[T], distance: impl Fn(&T, &T) -> f64) -> Vec<Vec<f64>> {
    let n = items.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distance(&items[i], &items[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// Principal component projection by deterministic power iteration.
///
/// Returns at most `components` coordinates per row; stops early when the
/// remaining variance vanishes. Data with no variance projects to a single
/// zero coordinate.
pub fn pca(data: &[Vec<f64>], components: usize) -> Vec<Vec<f64>> {
    let n = data.len();
    let dims = data.first().map_or(0, Vec::len);
    if n == 0 || dims == 0 {
        return vec![vec![0.0]; n];
    }

    let mean: Vec<f64> = (0..dims)
        .map(|j| data.iter().map(|row| row[j]).sum::<f64>() / n as f64)
        .collect();
    let centered: Vec<Vec<f64>> = data
        .iter()
        .map(|row| row.iter().zip(&mean).map(|(x, m)| x - m).collect())
        .collect();

    let mut basis: Vec<Vec<f64>> = Vec::new();
    for k in 0..components.min(dims) {
        // deterministic, non-degenerate start vector
        let mut v: Vec<f64> = (0..dims).map(|j| 1.0 + ((j + k) % 7) as f64 * 0.1).collect();
        let mut found = false;

        for _ in 0..POWER_ITERATIONS {
            let scores: Vec<f64> = centered.iter().map(|row| dot(row, &v)).collect();
            let mut next = vec![0.0; dims];
            for (row, s) in centered.iter().zip(&scores) {
                for (acc, x) in next.iter_mut().zip(row) {
                    *acc += x * s;
                }
            }
            let raw = norm(&next);
            for b in &basis {
                let proj = dot(&next, b);
                for (acc, x) in next.iter_mut().zip(b) {
                    *acc -= proj * x;
                }
            }
            let len = norm(&next);
            // only rounding noise left after deflation
            if len < EPSILON || len < raw * 1e-9 {
                break;
            }
            v = next.iter().map(|x| x / len).collect();
            found = true;
        }

        if !found {
            break;
        }
        basis.push(v);
    }

    if basis.is_empty() {
        return vec![vec![0.0]; n];
    }
    centered
        .iter()
        .map(|row| basis.iter().map(|b| dot(row, b)).collect())
        .collect()
}

/// Mean silhouette coefficient over `points` grouped by `labels`.
///
/// `None` unless there are at least two clusters and fewer clusters than points.
pub fn silhouette(points: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let n = points.len();
    let clusters = labels.iter().max().map_or(0, |m| m + 1);
    if n < 3 || clusters < 2 || clusters >= n {
        return None;
    }

    let dist = distance_matrix(points, |a, b| euclidean(a, b));
    let mut total = 0.0;
    for i in 0..n {
        let mut sums = vec![0.0; clusters];
        let mut counts = vec![0usize; clusters];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += dist[i][j];
                counts[labels[j]] += 1;
            }
        }
        let own = labels[i];
        if counts[own] == 0 {
            // singleton: silhouette is 0 by convention
            continue;
        }
        let a = sums[own] / counts[own] as f64;
        let b = (0..clusters)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| sums[c] / counts[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        if denom > 0.0 && b.is_finite() {
            total += (b - a) / denom;
        }
    }
    Some(total / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_distance() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normalize() {
        let v = l2_normalize(&[3.0, 4.0]);
        assert!((norm(&v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pca_recovers_main_axis() {
        let data: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, 2.0 * i as f64, 0.0])
            .collect();
        let reduced = pca(&data, 2);
        assert_eq!(reduced.len(), 10);
        // all variance lies on one axis
        assert_eq!(reduced[0].len(), 1);
        let spread = reduced[9][0] - reduced[0][0];
        assert!((spread.abs() - (9.0f64 * 9.0 * 5.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_pca_constant_data() {
        let data = vec![vec![1.0, 1.0]; 4];
        assert_eq!(pca(&data, 2), vec![vec![0.0]; 4]);
    }

    #[test]
    fn test_silhouette_separated() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
        ];
        let score = silhouette(&points, &[0, 0, 1, 1]).unwrap();
        assert!(score > 0.9);
        assert!(silhouette(&points, &[0, 0, 0, 0]).is_none());
        assert!(silhouette(&points, &[0, 1, 2, 3]).is_none());
    }
}
