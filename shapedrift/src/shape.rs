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

//! Distribution shape statistics: skewness and top-percent mass concentration.

use serde::Serialize;

use crate::histogram::LogBinSketch;
use crate::sampling::Sample;

/// Returns the population skewness `mean(((x - mean) / stddev)^3)`.
///
/// Symmetric data gives about zero, a heavy right tail gives a positive value. Returns
/// `0.0` for fewer than two values or zero variance.
pub fn calculate_skewness(values: &[f64]) -> f64 {
    weighted_skewness(values.iter().map(|&value| (value, 1.0)))
}

/// Returns the share of the total held by the largest `ceil(top_percent * len)` values.
///
/// `top_percent` is clamped to `[0, 1]`. Returns `0.0` for empty input or a zero total.
pub fn calculate_top_k_mass(values: &[f64], top_percent: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let top_percent = top_percent.clamp(0.0, 1.0);
    let take = ((top_percent * values.len() as f64).ceil() as usize).min(values.len());
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let top: f64 = sorted[..take].iter().sum();
    top / total
}

fn weighted_skewness(points: impl Iterator<Item = (f64, f64)> + Clone) -> f64 {
    let mut weight = 0.0;
    let mut sum = 0.0;
    for (value, count) in points.clone() {
        weight += count;
        sum += value * count;
    }
    if weight < 2.0 {
        return 0.0;
    }
    let mean = sum / weight;
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    for (value, count) in points {
        let delta = value - mean;
        m2 += count * delta * delta;
        m3 += count * delta * delta * delta;
    }
    let variance = m2 / weight;
    if variance <= 0.0 {
        return 0.0;
    }
    (m3 / weight) / variance.powf(1.5)
}

/// Summary of a distribution's shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeMetrics {
    /// Mean value.
    pub mean: f64,
    /// Population skewness.
    pub skewness: f64,
    /// Mass share of the top `top_percent` of values.
    pub top_mass: f64,
}

impl ShapeMetrics {
    /// Computes shape metrics from raw values.
    pub fn from_values(values: &[f64], top_percent: f64) -> Self {
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        Self {
            mean,
            skewness: calculate_skewness(values),
            top_mass: calculate_top_k_mass(values, top_percent),
        }
    }

    /// Computes shape metrics from the degrees of a sample.
    pub fn from_sample(sample: &Sample, top_percent: f64) -> Self {
        Self::from_values(&sample.degrees(), top_percent)
    }

    /// Approximates shape metrics from a histogram.
    ///
    /// Every observation is represented by the lower edge of its bin, so the figures are
    /// coarse, but the computation stays bounded by the number of bins.
    pub fn from_sketch(sketch: &LogBinSketch, top_percent: f64) -> Self {
        if sketch.is_empty() {
            return Self {
                mean: 0.0,
                skewness: 0.0,
                top_mass: 0.0,
            };
        }
        let edge = |bin: u32| sketch.bin_lower_bound(bin) as f64;
        let points = sketch.bins().map(|(bin, count)| (edge(bin), count as f64));
        let n = sketch.n() as f64;
        let total: f64 = points.clone().map(|(value, count)| value * count).sum();
        let mean = total / n;
        let skewness = weighted_skewness(points);

        // Walk bins from the top, taking whole bins and then a fraction of the boundary bin.
        let mut remaining = (top_percent.clamp(0.0, 1.0) * n).ceil();
        let mut top = 0.0;
        let mut bins: Vec<(u32, u64)> = sketch.bins().collect();
        bins.reverse();
        for (bin, count) in bins {
            if remaining <= 0.0 {
                break;
            }
            let taken = remaining.min(count as f64);
            top += taken * edge(bin);
            remaining -= taken;
        }
        let top_mass = if total == 0.0 { 0.0 } else { top / total };
        Self {
            mean,
            skewness,
            top_mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skewness_signs() {
        assert!(calculate_skewness(&[1.0, 2.0, 3.0]).abs() < 1e-12);
        assert!(calculate_skewness(&[1.0, 1.0, 1.0, 1.0, 50.0]) > 1.0);
        assert!(calculate_skewness(&[50.0, 50.0, 50.0, 50.0, 1.0]) < -1.0);
    }

    #[test]
    fn test_skewness_degenerate() {
        assert_eq!(calculate_skewness(&[]), 0.0);
        assert_eq!(calculate_skewness(&[4.0]), 0.0);
        assert_eq!(calculate_skewness(&[4.0, 4.0, 4.0]), 0.0);
    }

    #[test]
    fn test_top_k_mass() {
        let equal = vec![1.0; 100];
        assert_eq!(calculate_top_k_mass(&equal, 0.01), 0.01);
        assert_eq!(calculate_top_k_mass(&[], 0.5), 0.0);
        assert_eq!(calculate_top_k_mass(&[0.0, 0.0], 0.5), 0.0);
        assert_eq!(calculate_top_k_mass(&[1.0, 1.0, 8.0], 0.1), 0.8);
        assert_eq!(calculate_top_k_mass(&[1.0, 3.0], 2.0), 1.0);
        assert_eq!(calculate_top_k_mass(&[1.0, 3.0], -1.0), 0.0);
    }

    #[test]
    fn test_from_sketch_matches_values_on_bin_edges() {
        // 0, 1, 3 and 7 are lower bin edges in base 2, so the approximation is exact.
        let values = [0u64, 1, 1, 3, 3, 3, 7];
        let mut sketch = LogBinSketch::new();
        for value in values {
            sketch.update(value);
        }
        let floats: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let exact = ShapeMetrics::from_values(&floats, 0.3);
        let approx = ShapeMetrics::from_sketch(&sketch, 0.3);
        assert!((exact.mean - approx.mean).abs() < 1e-12);
        assert!((exact.skewness - approx.skewness).abs() < 1e-12);
        assert!((exact.top_mass - approx.top_mass).abs() < 1e-12);
    }
}
