//! Candidate aggregation and the partition-match admission rule.

use std::collections::BTreeMap;

/// How a candidate was found in a partition probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MatchQuality {
    /// Under the query's exact partition key.
    #[default]
    Exact,
    /// Under a partition key with one window bit flipped.
    Flipped,
}

/// Per-candidate tally of partition matches.
///
/// Only the qualities of the first two observations matter to the
/// admission rule; later ones are merely counted.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Candidate {
    matches: u32,
    first: MatchQuality,
    second: MatchQuality,
}

impl Candidate {
    fn observe(&mut self, quality: MatchQuality) {
        self.matches += 1;
        if self.matches == 1 {
            self.first = quality;
        } else if self.matches == 2 {
            self.second = quality;
        }
    }

    /// Whether the partition matches are consistent with a true hit.
    ///
    /// A stored hash within `max_error` of the query must, by pigeonhole:
    /// for even `max_error`, match at least one partition exactly, since a
    /// lone flipped match cannot come from a true hit; for odd `max_error`,
    /// match at least twice with at most one of the first two matches
    /// flipped, unless it matched three or more times.
    pub(crate) fn is_admissible(&self, odd_max_error: bool) -> bool {
        if odd_max_error {
            if self.matches < 3
                && (self.matches == 1
                    || (self.first == MatchQuality::Flipped && self.second == MatchQuality::Flipped))
            {
                return false;
            }
        } else if self.matches < 2 && self.first == MatchQuality::Flipped {
            return false;
        }
        true
    }
}

/// Accumulates candidates across all partition probes of one lookup.
///
/// Keyed by the full hash, which deduplicates the many partition hits a
/// close hash produces (a distance-0 hash matches every partition).
/// Iteration order is bytewise over hashes and thus deterministic.
pub(crate) struct CandidateSet {
    hash_bytes: usize,
    map: BTreeMap<Vec<u8>, Candidate>,
}

impl CandidateSet {
    pub(crate) fn new(hash_bytes: usize) -> Self {
        Self { hash_bytes, map: BTreeMap::new() }
    }

    /// Tally every hash in a partition record under the given quality.
    pub(crate) fn add_record(&mut self, record: &[u8], quality: MatchQuality) {
        for hash in record.chunks_exact(self.hash_bytes) {
            self.map.entry(hash.to_vec()).or_default().observe(quality);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&[u8], &Candidate)> {
        self.map.iter().map(|(hash, candidate)| (hash.as_slice(), candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(qualities: &[MatchQuality]) -> Candidate {
        let mut c = Candidate::default();
        for &q in qualities {
            c.observe(q);
        }
        c
    }

    use MatchQuality::{Exact, Flipped};

    #[test]
    fn even_rule() {
        // A single exact match is enough; a single flipped match is not.
        assert!(candidate(&[Exact]).is_admissible(false));
        assert!(!candidate(&[Flipped]).is_admissible(false));

        // Two matches always pass, whatever their qualities.
        assert!(candidate(&[Flipped, Flipped]).is_admissible(false));
        assert!(candidate(&[Exact, Flipped]).is_admissible(false));
    }

    #[test]
    fn odd_rule() {
        // One match never passes.
        assert!(!candidate(&[Exact]).is_admissible(true));
        assert!(!candidate(&[Flipped]).is_admissible(true));

        // Two matches pass unless both were flipped.
        assert!(candidate(&[Exact, Exact]).is_admissible(true));
        assert!(candidate(&[Exact, Flipped]).is_admissible(true));
        assert!(candidate(&[Flipped, Exact]).is_admissible(true));
        assert!(!candidate(&[Flipped, Flipped]).is_admissible(true));

        // Three or more pass unconditionally.
        assert!(candidate(&[Flipped, Flipped, Flipped]).is_admissible(true));
    }

    #[test]
    fn records_split_into_hashes() {
        let mut set = CandidateSet::new(2);
        set.add_record(&[1, 2, 3, 4, 1, 2], Exact);
        set.add_record(&[3, 4], Flipped);

        let tallies: Vec<(Vec<u8>, u32)> =
            set.iter().map(|(h, c)| (h.to_vec(), c.matches)).collect();
        assert_eq!(tallies, vec![(vec![1, 2], 2), (vec![3, 4], 2)]);
    }

    #[test]
    fn first_two_qualities_are_kept_in_order() {
        let c = candidate(&[Flipped, Exact, Flipped, Flipped]);
        assert_eq!(c.matches, 4);
        assert_eq!(c.first, Flipped);
        assert_eq!(c.second, Exact);
    }
}
