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

#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shapedrift::histogram::LogBinSketch;
use shapedrift::record::DegreeRecord;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Degrees from a symmetric, bell-shaped distribution centred on 100 (sum of four uniforms).
pub fn symmetric_degrees(rng: &mut StdRng, n: usize) -> Vec<u64> {
    (0..n)
        .map(|_| (0..4).map(|_| rng.random_range(0..=50u64)).sum())
        .collect()
}

pub fn sketch_of(values: impl IntoIterator<Item = u64>) -> LogBinSketch {
    let mut sketch = LogBinSketch::new();
    for value in values {
        sketch.update(value);
    }
    sketch
}

pub fn keyed_records(degrees: &[u64]) -> Vec<DegreeRecord> {
    degrees
        .iter()
        .enumerate()
        .map(|(i, &degree)| DegreeRecord::new(format!("node-{i}"), degree))
        .collect()
}
