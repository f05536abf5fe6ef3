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

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::record::DegreeRecord;

// Greater means a stronger hub: higher degree, then the smaller key on ties.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Hub {
    degree: u64,
    key: String,
}

impl Ord for Hub {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree
            .cmp(&other.degree)
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for Hub {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded min-heap of the `k` highest-degree records seen.
///
/// Once full, a record evicts the weakest hub only if its degree is strictly greater, or
/// equal with a key that sorts first. Hubs are reported by degree descending, then key
/// ascending.
#[derive(Debug, Clone)]
pub struct TopHubs {
    k: usize,
    heap: BinaryHeap<Reverse<Hub>>,
}

impl TopHubs {
    /// Creates a heap tracking at most `k` hubs.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Returns the configured number of hubs.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of hubs currently held, never more than `k`.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no hub is held.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the smallest degree that is currently a hub, once the heap is full.
    pub fn threshold(&self) -> Option<u64> {
        if self.heap.len() < self.k {
            return None;
        }
        self.heap.peek().map(|weakest| weakest.0.degree)
    }

    /// Offers one record.
    pub fn update(&mut self, key: &str, degree: u64) {
        if self.k == 0 || self.threshold().is_some_and(|weakest| degree < weakest) {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(Hub {
                degree,
                key: key.to_string(),
            }));
            return;
        }
        if let Some(mut weakest) = self.heap.peek_mut() {
            let stronger = degree > weakest.0.degree
                || (degree == weakest.0.degree && key < weakest.0.key.as_str());
            if stronger {
                *weakest = Reverse(Hub {
                    degree,
                    key: key.to_string(),
                });
            }
        }
    }

    /// Returns the hubs, strongest first.
    pub fn hubs(&self) -> Vec<DegreeRecord> {
        self.clone().into_hubs()
    }

    /// Consumes the heap and returns the hubs, strongest first.
    pub fn into_hubs(self) -> Vec<DegreeRecord> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(hub)| DegreeRecord {
                key: hub.key,
                degree: hub.degree,
            })
            .collect()
    }
}
