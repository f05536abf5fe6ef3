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

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Uniform reservoir sampler (Algorithm R).
///
/// Item `i` (1-indexed) past the first `k` replaces a uniformly chosen slot with
/// probability `k / i`. The outcome depends on arrival order and the local generator.
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T> {
    k: usize,
    num_seen: u64,
    reservoir: Vec<T>,
    rng: StdRng,
}

impl<T> ReservoirSampler<T> {
    /// Creates a sampler of size `k` with a generator seeded from `seed`.
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            num_seen: 0,
            reservoir: Vec::with_capacity(k),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the configured sample size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of items offered so far.
    pub fn num_seen(&self) -> u64 {
        self.num_seen
    }

    /// Offers one item.
    pub fn update(&mut self, item: T) {
        self.update_with(|| item);
    }

    /// Offers one item, building it only if it is retained.
    ///
    /// Consumes the generator exactly like [`update`](Self::update), so both calls may be
    /// mixed without changing the outcome for a given seed and arrival order.
    pub fn update_with(&mut self, make: impl FnOnce() -> T) {
        self.num_seen += 1;
        if self.reservoir.len() < self.k {
            self.reservoir.push(make());
            return;
        }
        let slot = self.rng.random_range(0..self.num_seen);
        if slot < self.k as u64 {
            self.reservoir[slot as usize] = make();
        }
    }

    /// Returns the retained items.
    pub fn items(&self) -> &[T] {
        &self.reservoir
    }

    /// Consumes the sampler and returns the retained items.
    pub fn into_items(self) -> Vec<T> {
        self.reservoir
    }
}
