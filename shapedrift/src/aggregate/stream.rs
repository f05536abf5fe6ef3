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

use tracing::debug;
use tracing::warn;

use crate::aggregate::TopHubs;
use crate::cancel::CancelToken;
use crate::error::Error;
use crate::hash::DEFAULT_SAMPLING_SEED;
use crate::histogram::DEFAULT_LOG_BASE;
use crate::histogram::LogBinSketch;
use crate::record::DegreeRecord;
use crate::sampling::BottomKSampler;
use crate::sampling::ReservoirSampler;
use crate::sampling::Sample;

const DEFAULT_SAMPLE_SIZE: usize = 1024;
const DEFAULT_HUB_COUNT: usize = 10;
/// Records between two deadline checks. The explicit cancel flag is polled every record.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Configuration of a single aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    sample_size: usize,
    reservoir_size: usize,
    hub_count: usize,
    seed: u64,
    log_base: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfigBuilder::default().build()
    }
}

impl AggregatorConfig {
    /// Create a new builder for AggregatorConfig
    pub fn builder() -> AggregatorConfigBuilder {
        AggregatorConfigBuilder::default()
    }

    /// Returns the bottom-k sample size.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the reservoir sample size, zero when reservoir sampling is off.
    pub fn reservoir_size(&self) -> usize {
        self.reservoir_size
    }

    /// Returns the number of hubs tracked.
    pub fn hub_count(&self) -> usize {
        self.hub_count
    }

    /// Returns the sampling seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the histogram logarithm base.
    pub fn log_base(&self) -> u32 {
        self.log_base
    }
}

/// Builder for AggregatorConfig
#[derive(Debug)]
pub struct AggregatorConfigBuilder {
    sample_size: usize,
    reservoir_size: usize,
    hub_count: usize,
    seed: u64,
    log_base: u32,
}

impl Default for AggregatorConfigBuilder {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            reservoir_size: 0,
            hub_count: DEFAULT_HUB_COUNT,
            seed: DEFAULT_SAMPLING_SEED,
            log_base: DEFAULT_LOG_BASE,
        }
    }
}

impl AggregatorConfigBuilder {
    /// Set the bottom-k sample size. Zero disables sampling.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the size of an additional uniform reservoir sample. Zero, the default, disables it.
    ///
    /// Unlike the bottom-k sample, the reservoir depends on arrival order and is meant for
    /// local diagnostics only.
    pub fn reservoir_size(mut self, reservoir_size: usize) -> Self {
        self.reservoir_size = reservoir_size;
        self
    }

    /// Set the number of hubs tracked. Zero disables hub tracking.
    pub fn hub_count(mut self, hub_count: usize) -> Self {
        self.hub_count = hub_count;
        self
    }

    /// Set the sampling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the histogram logarithm base.
    ///
    /// # Panics
    ///
    /// If `log_base` is less than 2.
    pub fn log_base(mut self, log_base: u32) -> Self {
        assert!(log_base >= 2, "log_base must be at least 2, got {log_base}");
        self.log_base = log_base;
        self
    }

    /// Build the AggregatorConfig.
    pub fn build(self) -> AggregatorConfig {
        AggregatorConfig {
            sample_size: self.sample_size,
            reservoir_size: self.reservoir_size,
            hub_count: self.hub_count,
            seed: self.seed,
            log_base: self.log_base,
        }
    }
}

/// Everything a single pass produces.
#[derive(Debug, Clone)]
pub struct StreamSummary {
    sample: Sample,
    reservoir: Vec<DegreeRecord>,
    top_hubs: Vec<DegreeRecord>,
    total_degree_sum: u128,
    count: u64,
    sketch: LogBinSketch,
}

impl StreamSummary {
    /// Returns the bottom-k sample.
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Returns the reservoir sample, empty unless enabled in the configuration.
    pub fn reservoir(&self) -> &[DegreeRecord] {
        &self.reservoir
    }

    /// Returns the highest-degree records, strongest first.
    pub fn top_hubs(&self) -> &[DegreeRecord] {
        &self.top_hubs
    }

    /// Returns the sum of all degrees.
    pub fn total_degree_sum(&self) -> u128 {
        self.total_degree_sum
    }

    /// Returns the number of records processed.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the degree histogram of the stream.
    pub fn sketch(&self) -> &LogBinSketch {
        &self.sketch
    }

    /// Consumes the summary and returns the degree histogram.
    pub fn into_sketch(self) -> LogBinSketch {
        self.sketch
    }

    /// Returns the mean degree, or zero for an empty stream.
    pub fn mean_degree(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_degree_sum as f64 / self.count as f64
        }
    }
}

/// Incremental state of one aggregation pass.
///
/// Owned exclusively by the pass that created it; [`process_degree_stream`] is the usual
/// entry point.
#[derive(Debug, Clone)]
pub struct StreamAggregator {
    sampler: BottomKSampler,
    reservoir: Option<ReservoirSampler<DegreeRecord>>,
    hubs: TopHubs,
    sketch: LogBinSketch,
    total_degree_sum: u128,
    count: u64,
}

impl StreamAggregator {
    /// Creates an empty aggregator.
    pub fn new(config: &AggregatorConfig) -> Self {
        let reservoir = match config.reservoir_size {
            0 => None,
            size => Some(ReservoirSampler::new(size, config.seed)),
        };
        Self {
            sampler: BottomKSampler::new(config.sample_size, config.seed),
            reservoir,
            hubs: TopHubs::new(config.hub_count),
            sketch: LogBinSketch::builder().log_base(config.log_base).build(),
            total_degree_sum: 0,
            count: 0,
        }
    }

    /// Folds one record into every summary.
    pub fn update(&mut self, record: &DegreeRecord) {
        self.sampler.update(&record.key, record.degree);
        if let Some(reservoir) = &mut self.reservoir {
            reservoir.update_with(|| record.clone());
        }
        self.hubs.update(&record.key, record.degree);
        self.sketch.update(record.degree);
        self.total_degree_sum += record.degree as u128;
        self.count += 1;
    }

    /// Returns the number of records folded so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the current number of sampled records.
    pub fn sample_len(&self) -> usize {
        self.sampler.len()
    }

    /// Returns the current number of hubs.
    pub fn hubs_len(&self) -> usize {
        self.hubs.len()
    }

    /// Finishes the pass.
    pub fn finish(self) -> StreamSummary {
        let reservoir = self.reservoir.map(ReservoirSampler::into_items);
        StreamSummary {
            sample: self.sampler.into_sample(),
            reservoir: reservoir.unwrap_or_default(),
            top_hubs: self.hubs.into_hubs(),
            total_degree_sum: self.total_degree_sum,
            count: self.count,
            sketch: self.sketch,
        }
    }
}

/// Consumes a degree stream once and summarizes it.
///
/// The first `Err` item, typically a malformed record, aborts the pass and is returned
/// unchanged. If `cancel` fires, the pass stops and returns a cancellation error; no
/// partially built summary escapes.
pub fn process_degree_stream<I>(
    records: I,
    config: &AggregatorConfig,
    cancel: &CancelToken,
) -> Result<StreamSummary, Error>
where
    I: IntoIterator<Item = Result<DegreeRecord, Error>>,
{
    let mut aggregator = StreamAggregator::new(config);
    for item in records {
        let processed = aggregator.count();
        if cancel.is_cancelled()
            || (processed % DEADLINE_CHECK_INTERVAL == 0 && cancel.is_expired())
        {
            warn!(processed, "degree stream pass cancelled");
            return Err(Error::cancelled(processed));
        }
        aggregator.update(&item?);
    }
    let summary = aggregator.finish();
    debug!(
        count = summary.count(),
        total_degree_sum = %summary.total_degree_sum(),
        bins = summary.sketch().num_bins(),
        sampled = summary.sample().len(),
        reservoir = summary.reservoir().len(),
        hubs = summary.top_hubs().len(),
        "degree stream aggregated"
    );
    Ok(summary)
}
