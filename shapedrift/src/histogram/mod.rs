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

//! Logarithmically binned histograms approximating a degree distribution.
//!
//! # Overview
//!
//! A [`LogBinSketch`] stores one counter per logarithmic bin. Value `v` lands in bin
//! `floor(log_b(v + 1))` for a fixed base `b`, so memory grows with the logarithm of the
//! largest degree observed rather than with the number of observations. A stream of billions
//! of edges with a maximum degree of a few million fits in a couple of dozen counters.
//!
//! The resolution is coarse but sufficient for a two-sample Kolmogorov-Smirnov comparison
//! of the distribution *shape*, which is what the drift guardrail needs.
//!
//! # Examples
//!
//! ```
//! # use shapedrift::histogram::LogBinSketch;
//! let mut sketch = LogBinSketch::new();
//! for degree in [0, 1, 1, 3, 7, 100] {
//!     sketch.update(degree);
//! }
//! let cdf = sketch.cdf();
//! assert_eq!(cdf.last().unwrap().1, 1.0);
//! ```
//!
//! # Serialization
//!
//! ```
//! # use shapedrift::histogram::LogBinSketch;
//! let mut sketch = LogBinSketch::new();
//! sketch.update(42);
//!
//! let bytes = sketch.serialize();
//! let decoded = LogBinSketch::deserialize(&bytes).unwrap();
//! assert_eq!(decoded, sketch);
//! ```

mod serialization;
mod sketch;

pub use self::sketch::DEFAULT_LOG_BASE;
pub use self::sketch::LogBinSketch;
pub use self::sketch::LogBinSketchBuilder;
