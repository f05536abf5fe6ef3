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

//! Fixed-size samples of a degree stream.
//!
//! # Overview
//!
//! Two samplers are provided:
//!
//! * [`BottomKSampler`] keeps the `k` records with the smallest seeded hash of their key.
//!   The result depends only on the seed, `k` and the multiset of records, never on the
//!   order in which records arrive, so serial, sharded and replayed reads agree exactly.
//! * [`ReservoirSampler`] is classic Algorithm R. It is uniform but depends on arrival
//!   order and on a local random generator, so it suits local diagnostics only.
//!
//! # Examples
//!
//! ```
//! # use shapedrift::sampling::BottomKSampler;
//! let mut forward = BottomKSampler::new(2, 42);
//! let mut backward = BottomKSampler::new(2, 42);
//! let records = [("a", 1), ("b", 5), ("c", 2), ("d", 9)];
//! for (key, degree) in records {
//!     forward.update(key, degree);
//! }
//! for (key, degree) in records.iter().rev() {
//!     backward.update(key, *degree);
//! }
//! assert_eq!(forward.sample(), backward.sample());
//! ```

mod bottom_k;
mod reservoir;

pub use self::bottom_k::BottomKSampler;
pub use self::bottom_k::Sample;
pub use self::reservoir::ReservoirSampler;
