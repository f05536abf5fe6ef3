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

use std::collections::BTreeMap;

/// Default logarithm base for bin edges.
pub const DEFAULT_LOG_BASE: u32 = 2;

/// Log-binned histogram over non-negative integer values.
///
/// See [`crate::histogram`] for an overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBinSketch {
    log_base: u32,
    bins: BTreeMap<u32, u64>,
    n: u64,
}

impl Default for LogBinSketch {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBinSketch {
    /// Creates an empty sketch with base [`DEFAULT_LOG_BASE`].
    pub fn new() -> Self {
        Self::with_log_base(DEFAULT_LOG_BASE)
    }

    /// Creates a new builder for LogBinSketch.
    pub fn builder() -> LogBinSketchBuilder {
        LogBinSketchBuilder::default()
    }

    pub(super) fn with_log_base(log_base: u32) -> Self {
        Self {
            log_base,
            bins: BTreeMap::new(),
            n: 0,
        }
    }

    pub(super) fn from_parts(log_base: u32, bins: BTreeMap<u32, u64>, n: u64) -> Self {
        Self { log_base, bins, n }
    }

    /// Returns the logarithm base used for bin edges.
    pub fn log_base(&self) -> u32 {
        self.log_base
    }

    /// Returns true if no value has been added.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the total number of values added.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns the number of non-empty bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Returns `(bin_index, count)` pairs in ascending bin order.
    pub fn bins(&self) -> impl Iterator<Item = (u32, u64)> + Clone + '_ {
        self.bins.iter().map(|(&bin, &count)| (bin, count))
    }

    /// Adds one observation of `value`.
    ///
    /// Degree zero lands in bin zero.
    pub fn update(&mut self, value: u64) {
        let bin = self.bin_index(value);
        *self.bins.entry(bin).or_insert(0) += 1;
        self.n += 1;
    }

    /// Returns the bin index `floor(log_b(value + 1))` for `value`.
    ///
    /// The computation is exact integer arithmetic, so values on a bin boundary never
    /// round into a neighbouring bin.
    pub fn bin_index(&self, value: u64) -> u32 {
        let mut remaining = value as u128 + 1;
        if self.log_base == 2 {
            return 127 - remaining.leading_zeros();
        }
        let base = self.log_base as u128;
        let mut bin = 0;
        while remaining >= base {
            remaining /= base;
            bin += 1;
        }
        bin
    }

    /// Returns the smallest value that falls into `bin`, i.e. `b^bin - 1`.
    ///
    /// Saturates at `u64::MAX` for bins beyond the representable range.
    pub fn bin_lower_bound(&self, bin: u32) -> u64 {
        (self.log_base as u128)
            .checked_pow(bin)
            .map(|edge| (edge - 1).min(u64::MAX as u128) as u64)
            .unwrap_or(u64::MAX)
    }

    /// Returns the empirical CDF as `(bin_index, cumulative_fraction)` pairs.
    ///
    /// Bins are ascending and the last fraction is exactly `1.0`. An empty sketch returns an
    /// empty vector, which callers must treat as "no data" rather than a distribution.
    pub fn cdf(&self) -> Vec<(u32, f64)> {
        if self.n == 0 {
            return Vec::new();
        }
        let total = self.n as f64;
        let mut cumulative = 0u64;
        self.bins
            .iter()
            .map(|(&bin, &count)| {
                cumulative += count;
                (bin, cumulative as f64 / total)
            })
            .collect()
    }

    /// Evaluates the step CDF at `bin`: the fraction of values whose bin index is at most
    /// `bin`. Returns 0.0 for an empty sketch.
    pub fn cdf_at(&self, bin: u32) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let below: u64 = self.bins.range(..=bin).map(|(_, &count)| count).sum();
        below as f64 / self.n as f64
    }

    /// Resets the sketch to an empty state, keeping its base.
    pub fn reset(&mut self) {
        self.bins.clear();
        self.n = 0;
    }
}

/// Builder for LogBinSketch
#[derive(Debug)]
pub struct LogBinSketchBuilder {
    log_base: u32,
}

impl Default for LogBinSketchBuilder {
    fn default() -> Self {
        Self {
            log_base: DEFAULT_LOG_BASE,
        }
    }
}

impl LogBinSketchBuilder {
    /// Set the logarithm base for bin edges.
    ///
    /// # Panics
    ///
    /// If `log_base` is less than 2.
    pub fn log_base(mut self, log_base: u32) -> Self {
        assert!(log_base >= 2, "log_base must be at least 2, got {log_base}");
        self.log_base = log_base;
        self
    }

    /// Build the LogBinSketch.
    pub fn build(self) -> LogBinSketch {
        LogBinSketch::with_log_base(self.log_base)
    }
}
