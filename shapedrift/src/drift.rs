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

//! Drift verdicts over a baseline and a current window.
//!
//! # Overview
//!
//! [`DriftDetector::check`] runs a KS comparison and turns it into an OK/DRIFT verdict. By
//! default only the distance `D` gates: p-values shrink as `n` grows, so on
//! multi-million-node graphs a p-value gate alone would flag negligible changes. The p-value
//! threshold is still evaluated and reported through `tracing`, and callers can opt into
//! requiring significance as well with [`GateMode::DistanceAndSignificance`].
//!
//! The detector holds no state between calls.
//!
//! # Examples
//!
//! ```
//! # use shapedrift::drift::DriftDetector;
//! # use shapedrift::drift::DriftStatus;
//! # use shapedrift::histogram::LogBinSketch;
//! let mut baseline = LogBinSketch::new();
//! let mut window = LogBinSketch::new();
//! for degree in 0..1000 {
//!     baseline.update(degree % 50);
//!     window.update(degree % 50 + 10_000);
//! }
//! let detector = DriftDetector::builder().threshold_d(0.1).build().unwrap();
//! let result = detector.check(&baseline, &window).unwrap();
//! assert_eq!(result.status, DriftStatus::Drift);
//! ```

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::error::Error;
use crate::histogram::LogBinSketch;
use crate::ks;

/// Default maximum tolerated KS distance.
pub const DEFAULT_THRESHOLD_D: f64 = 0.1;
/// Default significance level for the informational p-value check.
pub const DEFAULT_THRESHOLD_P: f64 = 0.05;

/// Outcome of one drift check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriftStatus {
    /// The window's shape matches the baseline within tolerance.
    #[serde(rename = "OK")]
    Ok,
    /// The window's shape departed from the baseline.
    #[serde(rename = "DRIFT")]
    Drift,
}

impl DriftStatus {
    /// Returns `"OK"` or `"DRIFT"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftStatus::Ok => "OK",
            DriftStatus::Drift => "DRIFT",
        }
    }
}

/// Which conditions must hold for a DRIFT verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateMode {
    /// DRIFT iff `D > threshold_d`.
    #[default]
    DistanceOnly,
    /// DRIFT iff `D > threshold_d` and `p_value < threshold_p`.
    DistanceAndSignificance,
}

/// Verdict of a drift check. Built once per comparison and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriftResult {
    /// KS distance between baseline and window.
    pub d: f64,
    /// Asymptotic KS p-value.
    pub p_value: f64,
    /// Verdict.
    pub status: DriftStatus,
}

/// Stateless OK/DRIFT gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftDetector {
    threshold_d: f64,
    threshold_p: f64,
    gate: GateMode,
}

impl DriftDetector {
    /// Create a new builder for DriftDetector
    pub fn builder() -> DriftDetectorBuilder {
        DriftDetectorBuilder::default()
    }

    /// Returns the distance threshold.
    pub fn threshold_d(&self) -> f64 {
        self.threshold_d
    }

    /// Returns the p-value threshold.
    pub fn threshold_p(&self) -> f64 {
        self.threshold_p
    }

    /// Returns the gate mode.
    pub fn gate(&self) -> GateMode {
        self.gate
    }

    /// Compares `window` against `baseline`.
    ///
    /// An empty sketch yields an
    /// [`ErrorKind::InsufficientData`](crate::error::ErrorKind::InsufficientData) error,
    /// never an OK verdict.
    pub fn check(
        &self,
        baseline: &LogBinSketch,
        window: &LogBinSketch,
    ) -> Result<DriftResult, Error> {
        let ks = ks::compare(baseline, window)?;
        let distance_exceeded = ks.d > self.threshold_d;
        let significant = ks.p_value < self.threshold_p;
        let drifted = match self.gate {
            GateMode::DistanceOnly => distance_exceeded,
            GateMode::DistanceAndSignificance => distance_exceeded && significant,
        };
        if significant && self.gate == GateMode::DistanceOnly && !distance_exceeded {
            warn!(
                d = ks.d,
                p_value = ks.p_value,
                threshold_p = self.threshold_p,
                "p-value below threshold but distance within tolerance"
            );
        }
        let status = if drifted {
            DriftStatus::Drift
        } else {
            DriftStatus::Ok
        };
        debug!(
            d = ks.d,
            p_value = ks.p_value,
            baseline_n = baseline.n(),
            window_n = window.n(),
            status = status.as_str(),
            "drift check"
        );
        Ok(DriftResult {
            d: ks.d,
            p_value: ks.p_value,
            status,
        })
    }
}

/// Builder for DriftDetector
#[derive(Debug)]
pub struct DriftDetectorBuilder {
    threshold_d: f64,
    threshold_p: f64,
    gate: GateMode,
}

impl Default for DriftDetectorBuilder {
    fn default() -> Self {
        Self {
            threshold_d: DEFAULT_THRESHOLD_D,
            threshold_p: DEFAULT_THRESHOLD_P,
            gate: GateMode::default(),
        }
    }
}

impl DriftDetectorBuilder {
    /// Set the maximum tolerated KS distance.
    pub fn threshold_d(mut self, threshold_d: f64) -> Self {
        self.threshold_d = threshold_d;
        self
    }

    /// Set the significance level.
    pub fn threshold_p(mut self, threshold_p: f64) -> Self {
        self.threshold_p = threshold_p;
        self
    }

    /// Set the gate mode.
    pub fn gate(mut self, gate: GateMode) -> Self {
        self.gate = gate;
        self
    }

    /// Build the DriftDetector.
    ///
    /// Fails with [`ErrorKind::InvalidThreshold`](crate::error::ErrorKind::InvalidThreshold)
    /// if either threshold lies outside `(0, 1]`, so bad configuration is caught before any
    /// stream is read.
    pub fn build(self) -> Result<DriftDetector, Error> {
        validate_threshold("threshold_d", self.threshold_d)?;
        validate_threshold("threshold_p", self.threshold_p)?;
        Ok(DriftDetector {
            threshold_d: self.threshold_d,
            threshold_p: self.threshold_p,
            gate: self.gate,
        })
    }
}

fn validate_threshold(name: &'static str, value: f64) -> Result<(), Error> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_threshold(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_threshold_validation() {
        for bad in [0.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            let built = DriftDetector::builder().threshold_d(bad).build();
            assert_eq!(built.unwrap_err().kind(), ErrorKind::InvalidThreshold);
            let built = DriftDetector::builder().threshold_p(bad).build();
            assert_eq!(built.unwrap_err().kind(), ErrorKind::InvalidThreshold);
        }
        assert!(DriftDetector::builder().threshold_d(1.0).build().is_ok());
    }

    #[test]
    fn test_status_names() {
        assert_eq!(DriftStatus::Ok.as_str(), "OK");
        assert_eq!(DriftStatus::Drift.as_str(), "DRIFT");
    }
}
