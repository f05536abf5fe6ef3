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

//! Single-pass aggregation of a degree stream.
//!
//! # Overview
//!
//! Streams of multi-million-edge graphs are too expensive to read more than once.
//! [`process_degree_stream`] consumes the stream a single time and updates, per record:
//!
//! * a [`BottomKSampler`](crate::sampling::BottomKSampler) for an order-independent sample,
//! * a bounded [`TopHubs`] heap of the highest-degree nodes,
//! * a [`LogBinSketch`](crate::histogram::LogBinSketch) of the degree distribution,
//! * running degree sum and record count.
//!
//! The pass fails closed: the first malformed record aborts it, and a cancelled pass
//! returns [`ErrorKind::Cancelled`](crate::error::ErrorKind::Cancelled) with no partial
//! summary.
//!
//! # Examples
//!
//! ```
//! # use shapedrift::aggregate::AggregatorConfig;
//! # use shapedrift::aggregate::process_degree_stream;
//! # use shapedrift::cancel::CancelToken;
//! # use shapedrift::record::DegreeRecord;
//! let config = AggregatorConfig::builder().sample_size(2).hub_count(1).build();
//! let records = vec![
//!     Ok(DegreeRecord::new("a", 1)),
//!     Ok(DegreeRecord::new("b", 40)),
//!     Ok(DegreeRecord::new("c", 3)),
//! ];
//! let summary = process_degree_stream(records, &config, &CancelToken::new()).unwrap();
//! assert_eq!(summary.count(), 3);
//! assert_eq!(summary.top_hubs()[0].key, "b");
//! assert_eq!(summary.sample().len(), 2);
//! ```

mod hubs;
mod stream;

pub use self::hubs::TopHubs;
pub use self::stream::AggregatorConfig;
pub use self::stream::AggregatorConfigBuilder;
pub use self::stream::StreamAggregator;
pub use self::stream::StreamSummary;
pub use self::stream::process_degree_stream;
