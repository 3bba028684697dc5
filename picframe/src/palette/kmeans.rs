//! Fixed-round k-means over RGB samples

/// Refinement rounds; fixed, with no convergence check
const ROUNDS: usize = 5;

/// A centroid and the number of samples it last absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Cluster {
    pub centroid: [u8; 3],
    pub count: usize,
}

#[inline]
fn distance_squared(a: &[u8; 3], b: &[u8; 3]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Index of the closest centroid, first one wins ties
fn nearest(clusters: &[Cluster], pixel: &[u8; 3]) -> usize {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (i, cluster) in clusters.iter().enumerate() {
        let d = distance_squared(pixel, &cluster.centroid);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// Cluster `pixels` into `k` groups, most populated first.
///
/// Centroids are seeded from evenly strided samples. A cluster that ends a
/// round empty keeps its previous centroid and count.
pub(super) fn quantize(pixels: &[[u8; 3]], k: usize) -> Vec<Cluster> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let step = pixels.len() / k;
    let mut clusters: Vec<Cluster> = (0..k)
        .map(|i| Cluster {
            centroid: pixels[i * step],
            count: 0,
        })
        .collect();

    for round in 0..ROUNDS {
        let mut sums = vec![[0u64; 3]; k];
        let mut counts = vec![0usize; k];

        for pixel in pixels {
            let i = nearest(&clusters, pixel);
            for (sum, &channel) in sums[i].iter_mut().zip(pixel) {
                *sum += channel as u64;
            }
            counts[i] += 1;
        }

        for ((cluster, &sum), &count) in clusters.iter_mut().zip(&sums).zip(&counts) {
            if count == 0 {
                continue;
            }
            let n = count as u64;
            // mean rounded half up
            cluster.centroid = sum.map(|s| ((2 * s + n) / (2 * n)) as u8);
            cluster.count = count;
        }

        log::trace!("k-means round {round}: counts {counts:?}");
    }

    // stable, so equal counts keep seeding order
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}
