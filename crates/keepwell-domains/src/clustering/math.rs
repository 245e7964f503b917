/// Target cluster count for `n` vectors: `k = max(1, min(floor(sqrt(n)), floor(n/2)))`.
pub fn target_cluster_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let sqrt_n = (n as f64).sqrt().floor() as usize;
    let half_n = n / 2;
    std::cmp::max(1, std::cmp::min(sqrt_n, half_n))
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let cosine_similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    1.0 - cosine_similarity
}

fn distance_matrix(vectors: &[Vec<f32>]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cosine_distance(&vectors[i], &vectors[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// Agglomerative clustering with average linkage over a precomputed cosine
/// distance matrix, producing exactly `k` group labels (or fewer if `k >=
/// n`). Labels are dense indices `0..returned_group_count`; index `i` in
/// the return value is the group of `vectors[i]`.
pub fn agglomerative_cluster(vectors: &[Vec<f32>], k: usize) -> Vec<usize> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }
    if k >= n {
        return (0..n).collect();
    }

    let distances = distance_matrix(vectors);
    // Each group starts as a singleton; `members[g]` holds the original
    // indices currently merged into group `g`.
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    while members.len() > k {
        let mut best = (0usize, 1usize, f64::MAX);
        for a in 0..members.len() {
            for b in (a + 1)..members.len() {
                let avg = average_linkage(&members[a], &members[b], &distances);
                if avg < best.2 {
                    best = (a, b, avg);
                }
            }
        }
        let (a, b, _) = best;
        let merged = {
            let mut m = members[a].clone();
            m.extend(members[b].iter().copied());
            m
        };
        // Remove b first since b > a.
        members.remove(b);
        members[a] = merged;
    }

    let mut labels = vec![0usize; n];
    for (group_idx, group) in members.iter().enumerate() {
        for &original_idx in group {
            labels[original_idx] = group_idx;
        }
    }
    labels
}

fn average_linkage(a: &[usize], b: &[usize], distances: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for &i in a {
        for &j in b {
            total += distances[i][j];
            count += 1;
        }
    }
    if count == 0 {
        f64::MAX
    } else {
        total / count as f64
    }
}

/// Index into `group` (original indices) of the member with minimum
/// average distance to the rest of the group. Ties broken by the smaller
/// original index.
pub fn centroid_representative(group: &[usize], distances: &[Vec<f64>]) -> usize {
    group
        .iter()
        .copied()
        .min_by(|&a, &b| {
            let avg_a = average_distance_to_others(a, group, distances);
            let avg_b = average_distance_to_others(b, group, distances);
            avg_a
                .partial_cmp(&avg_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        })
        .expect("group is non-empty")
}

fn average_distance_to_others(member: usize, group: &[usize], distances: &[Vec<f64>]) -> f64 {
    let others: Vec<usize> = group.iter().copied().filter(|&m| m != member).collect();
    if others.is_empty() {
        return 0.0;
    }
    others.iter().map(|&o| distances[member][o]).sum::<f64>() / others.len() as f64
}

/// Recompute the full distance matrix for a group of original vector
/// indices, for use with `centroid_representative`.
pub fn distances_for(vectors: &[Vec<f32>]) -> Vec<Vec<f64>> {
    distance_matrix(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_formula_matches_spec_examples() {
        assert_eq!(target_cluster_count(3), 1);
        assert_eq!(target_cluster_count(4), 2);
        assert_eq!(target_cluster_count(6), 2);
        assert_eq!(target_cluster_count(9), 3);
        assert_eq!(target_cluster_count(16), 4);
        assert_eq!(target_cluster_count(1), 1);
    }

    #[test]
    fn k_formula_is_always_at_least_one_for_n_at_least_three() {
        for n in 3..50 {
            assert!(target_cluster_count(n) >= 1);
        }
    }

    #[test]
    fn cosine_distance_of_identical_vectors_is_zero() {
        let v = vec![1.0, 2.0, 3.0];
        assert!(cosine_distance(&v, &v) < 1e-9);
    }

    #[test]
    fn cosine_distance_of_opposite_vectors_is_two() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn agglomerative_clustering_separates_two_obvious_groups() {
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.9, 0.0],
        ];
        let labels = agglomerative_cluster(&vectors, 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn agglomerative_clustering_is_deterministic() {
        let vectors = vec![
            vec![1.0, 0.0],
            vec![0.95, 0.05],
            vec![0.0, 1.0],
            vec![0.05, 0.95],
            vec![0.5, 0.5],
            vec![0.45, 0.55],
        ];
        let first = agglomerative_cluster(&vectors, 2);
        let second = agglomerative_cluster(&vectors, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn centroid_representative_picks_most_central_member() {
        // v0 at 0 degrees, v1 bisecting at 45 degrees, v2 at 90 degrees.
        let vectors = vec![
            vec![1.0, 0.0],
            vec![std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2],
            vec![0.0, 1.0],
        ];
        let distances = distances_for(&vectors);
        let group = vec![0, 1, 2];
        assert_eq!(centroid_representative(&group, &distances), 1);
    }
}
