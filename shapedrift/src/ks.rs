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

//! Two-sample Kolmogorov-Smirnov comparison of histogram CDFs.
//!
//! `D` is the largest vertical gap between the two step CDFs, evaluated at every bin edge
//! present in either sketch. The p-value uses the asymptotic Kolmogorov distribution
//!
//! ```text
//! p = 2 * sum_{i >= 1} (-1)^(i-1) * exp(-2 i^2 lambda^2),  lambda = sqrt(n1 n2 / (n1 + n2)) * D
//! ```

use serde::Serialize;

use crate::error::Error;
use crate::histogram::LogBinSketch;

const SERIES_EPSILON: f64 = 1e-10;
const SERIES_MAX_TERMS: u32 = 100;

/// Result of a two-sample KS comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsStatistic {
    /// Maximum CDF distance, in `[0, 1]`.
    pub d: f64,
    /// Asymptotic p-value, in `[0, 1]`.
    pub p_value: f64,
}

/// Compares two sketches.
///
/// Fails with [`ErrorKind::InsufficientData`](crate::error::ErrorKind::InsufficientData) if
/// either sketch is empty, and with
/// [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if their bin
/// edges differ.
pub fn compare(baseline: &LogBinSketch, window: &LogBinSketch) -> Result<KsStatistic, Error> {
    if baseline.is_empty() || window.is_empty() {
        return Err(Error::insufficient_data("cannot compare an empty sketch")
            .with_context("baseline_n", baseline.n())
            .with_context("window_n", window.n()));
    }
    if baseline.log_base() != window.log_base() {
        return Err(Error::invalid_argument(format!(
            "sketches use different log bases: {} and {}",
            baseline.log_base(),
            window.log_base()
        )));
    }

    let d = ks_distance(&baseline.cdf(), &window.cdf());
    let n1 = baseline.n() as f64;
    let n2 = window.n() as f64;
    let lambda = (n1 * n2 / (n1 + n2)).sqrt() * d;
    Ok(KsStatistic {
        d,
        p_value: kolmogorov_p_value(lambda),
    })
}

/// Merge-walks two step CDFs and returns the largest absolute gap.
///
/// Both inputs must be sorted by bin. Between edges a step CDF keeps its last value, and
/// before its first edge it is zero.
fn ks_distance(a: &[(u32, f64)], b: &[(u32, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let (mut fa, mut fb) = (0.0_f64, 0.0_f64);
    let mut d = 0.0_f64;
    while i < a.len() || j < b.len() {
        let edge = match (a.get(i), b.get(j)) {
            (Some(&(ea, _)), Some(&(eb, _))) => ea.min(eb),
            (Some(&(ea, _)), None) => ea,
            (None, Some(&(eb, _))) => eb,
            (None, None) => break,
        };
        if let Some(&(ea, value)) = a.get(i) {
            if ea == edge {
                fa = value;
                i += 1;
            }
        }
        if let Some(&(eb, value)) = b.get(j) {
            if eb == edge {
                fb = value;
                j += 1;
            }
        }
        d = d.max((fa - fb).abs());
    }
    d.min(1.0)
}

/// Evaluates the Kolmogorov survival function `Q(lambda)`.
///
/// The alternating series converges slowly for small `lambda`; when it does not settle
/// within the iteration cap the true value is indistinguishable from one.
pub fn kolmogorov_p_value(lambda: f64) -> f64 {
    if lambda.is_nan() || lambda <= 0.0 {
        return 1.0;
    }
    let a = -2.0 * lambda * lambda;
    let mut sum = 0.0;
    let mut sign = 1.0;
    for i in 1..=SERIES_MAX_TERMS {
        let i = i as f64;
        let term = sign * 2.0 * (a * i * i).exp();
        sum += term;
        if term.abs() < SERIES_EPSILON {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
    }
    1.0
}
