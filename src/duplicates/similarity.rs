//! Seed-anchored clustering of perceptual fingerprints.
//!
//! Images are visited in catalog order. The first unused image becomes a
//! seed, and every later unused image within the distance threshold of that
//! seed joins its group. Membership depends only on the distance to the
//! seed, so two members of the same group may be further apart than the
//! threshold, and the result is not a transitive closure.

use crate::scanner::{FileRecord, Fingerprint, HashedFile};

use super::DuplicateGroup;

/// Indices of one cluster, seed first, plus the summed seed distances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Indices into the clustered sequence; `members[0]` is the seed
    pub members: Vec<usize>,
    /// Sum of `distance(seed, m)` over every non-seed member
    pub total_distance: u64,
}

impl Cluster {
    /// Integer mean of the seed-to-member distances, 0 with no members.
    #[must_use]
    pub fn average_distance(&self) -> u64 {
        let comparisons = self.members.len().saturating_sub(1) as u64;
        if comparisons == 0 {
            0
        } else {
            self.total_distance / comparisons
        }
    }
}

/// Greedy single-pass clustering over `len` items.
///
/// `distance(i, j)` returns `None` when the pair cannot be compared, which
/// counts as "not similar". Only clusters with two or more members are
/// returned, ordered by seed index.
pub fn cluster_by_seed<F>(len: usize, threshold: u32, distance: F) -> Vec<Cluster>
where
    F: Fn(usize, usize) -> Option<u32>,
{
    let mut used = vec![false; len];
    let mut clusters = Vec::new();

    for seed in 0..len {
        if used[seed] {
            continue;
        }
        used[seed] = true;

        let mut cluster = Cluster {
            members: vec![seed],
            total_distance: 0,
        };

        for candidate in (seed + 1)..len {
            if used[candidate] {
                continue;
            }
            match distance(seed, candidate) {
                Some(d) if d <= threshold => {
                    used[candidate] = true;
                    cluster.members.push(candidate);
                    cluster.total_distance += u64::from(d);
                }
                Some(_) => {}
                None => {
                    log::trace!("Incomparable fingerprints at {seed} and {candidate}");
                }
            }
        }

        if cluster.members.len() > 1 {
            clusters.push(cluster);
        }
    }

    clusters
}

/// `100 − avg × 100 / max_bits`, integer arithmetic, clamped to 0..=100.
#[must_use]
pub fn similarity_percent(average_distance: u64, max_bits: u32) -> u8 {
    if max_bits == 0 {
        return 100;
    }
    let penalty = average_distance * 100 / u64::from(max_bits);
    100u64.saturating_sub(penalty) as u8
}

/// Cluster fingerprinted images into similar-image groups.
///
/// Files without a fingerprint are ignored. `max_bits` is the fingerprint
/// length of the algorithm in use and scales the similarity percentage.
#[must_use]
pub fn cluster_images(images: &[HashedFile], threshold: u32, max_bits: u32) -> Vec<DuplicateGroup> {
    let entries: Vec<(&FileRecord, &Fingerprint)> = images
        .iter()
        .filter_map(|file| file.fingerprint().map(|fp| (&file.record, fp)))
        .collect();

    let clusters = cluster_by_seed(entries.len(), threshold, |i, j| {
        entries[i].1.distance(entries[j].1)
    });

    let groups: Vec<DuplicateGroup> = clusters
        .into_iter()
        .map(|cluster| {
            let seed_fp = entries[cluster.members[0]].1;
            let similarity = similarity_percent(cluster.average_distance(), max_bits);
            let files = cluster
                .members
                .iter()
                .map(|&idx| entries[idx].0.clone())
                .collect();
            DuplicateGroup::similar(seed_fp, files, similarity)
        })
        .collect();

    log::debug!(
        "Clustered {} images into {} similar groups (threshold {})",
        entries.len(),
        groups.len(),
        threshold
    );

    groups
}
