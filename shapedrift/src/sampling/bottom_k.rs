// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::BinaryHeap;

use serde::Serialize;

use crate::hash::SampleHash;
use crate::hash::sampling_hash;
use crate::record::DegreeRecord;

/// An order-independent sample produced by [`BottomKSampler`].
///
/// Entries are sorted by ascending sampling hash, so two samples built from the same
/// records with the same seed and `k` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    seed: u64,
    k: usize,
    entries: Vec<DegreeRecord>,
}

impl Sample {
    /// Returns the seed used to produce the sample.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configured sample size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of retained records, at most `k`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no record was retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the retained records.
    pub fn entries(&self) -> &[DegreeRecord] {
        &self.entries
    }

    /// Returns the retained degrees as floating point values, in sample order.
    pub fn degrees(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|entry| entry.degree as f64)
            .collect()
    }
}

// Field order defines the total order: hash first, then key and degree so that records
// sharing a hash (duplicate keys) still resolve the same way under any arrival order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    hash: SampleHash,
    key: String,
    degree: u64,
}

/// Bottom-k sampler over seeded key hashes.
///
/// Keeps a max-heap of at most `k` candidates. Once full, a record enters only when it
/// orders strictly before the current maximum, which it then evicts. Duplicate keys are
/// not collapsed; callers deduplicate upstream when needed.
#[derive(Debug, Clone)]
pub struct BottomKSampler {
    k: usize,
    seed: u64,
    heap: BinaryHeap<Candidate>,
}

impl BottomKSampler {
    /// Creates a sampler retaining at most `k` records under `seed`.
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Returns the configured sample size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the sampling seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of candidates currently held, never more than `k`.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no candidate is held.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers one record to the sampler.
    pub fn update(&mut self, key: &str, degree: u64) {
        if self.k == 0 {
            return;
        }
        let hash = sampling_hash(key, self.seed);
        if self.heap.len() < self.k {
            self.heap.push(Candidate {
                hash,
                key: key.to_string(),
                degree,
            });
            return;
        }
        if let Some(mut top) = self.heap.peek_mut() {
            if (hash, key, degree) < (top.hash, top.key.as_str(), top.degree) {
                *top = Candidate {
                    hash,
                    key: key.to_string(),
                    degree,
                };
            }
        }
    }

    /// Returns the current sample without consuming the sampler.
    pub fn sample(&self) -> Sample {
        self.clone().into_sample()
    }

    /// Consumes the sampler and returns its sample.
    pub fn into_sample(self) -> Sample {
        let entries = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| DegreeRecord {
                key: candidate.key,
                degree: candidate.degree,
            })
            .collect();
        Sample {
            seed: self.seed,
            k: self.k,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_k_keeps_nothing() {
        let mut sampler = BottomKSampler::new(0, 1);
        sampler.update("a", 1);
        assert!(sampler.is_empty());
        assert!(sampler.into_sample().is_empty());
    }

    #[test]
    fn test_fewer_than_k_keeps_all() {
        let mut sampler = BottomKSampler::new(10, 1);
        for (key, degree) in [("a", 1), ("b", 2), ("c", 3)] {
            sampler.update(key, degree);
        }
        let sample = sampler.into_sample();
        assert_eq!(sample.len(), 3);
        let mut keys: Vec<_> = sample.entries().iter().map(|e| e.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_keeps_smallest_hashes() {
        let keys: Vec<String> = (0..500).map(|i| format!("node-{i}")).collect();
        let mut sampler = BottomKSampler::new(20, 77);
        for key in &keys {
            sampler.update(key, 1);
        }
        let mut hashes: Vec<_> = keys
            .iter()
            .map(|key| (sampling_hash(key, 77), key))
            .collect();
        hashes.sort();
        let expected: Vec<&str> = hashes[..20].iter().map(|(_, key)| key.as_str()).collect();
        let sample = sampler.sample();
        let actual: Vec<&str> = sample
            .entries()
            .iter()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_duplicate_keys_resolve_by_degree() {
        let mut forward = BottomKSampler::new(1, 3);
        forward.update("dup", 9);
        forward.update("dup", 2);
        let mut backward = BottomKSampler::new(1, 3);
        backward.update("dup", 2);
        backward.update("dup", 9);
        assert_eq!(forward.sample(), backward.sample());
        assert_eq!(forward.sample().entries()[0].degree, 2);
    }
}
