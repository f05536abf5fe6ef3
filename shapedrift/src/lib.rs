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

//! # shapedrift
//!
//! Bounded-memory summaries of a graph's degree stream and a drift gate over them.
//!
//! A degree stream of `(key, degree)` records is read once by
//! [`aggregate::process_degree_stream`], which builds a logarithmic histogram
//! ([`histogram::LogBinSketch`]), an order-independent bottom-k sample
//! ([`sampling::BottomKSampler`]), the top hubs and running totals. A stored baseline
//! histogram and the current window are then compared with a two-sample
//! Kolmogorov-Smirnov test ([`ks`]) and turned into an OK/DRIFT verdict
//! ([`drift::DriftDetector`]).
//!
//! All state is owned by the caller; nothing is global.

#![deny(missing_docs)]

pub mod aggregate;
pub mod cancel;
pub(crate) mod codec;
pub mod drift;
pub mod error;
pub mod hash;
pub mod histogram;
pub mod ks;
pub mod record;
pub mod sampling;
pub mod shape;
