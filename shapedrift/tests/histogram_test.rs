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

mod common;

use common::rng;
use common::sketch_of;
use common::symmetric_degrees;
use shapedrift::error::ErrorKind;
use shapedrift::histogram::LogBinSketch;

#[test]
fn test_empty_sketch() {
    let sketch = LogBinSketch::new();
    assert!(sketch.is_empty());
    assert_eq!(sketch.n(), 0);
    assert_eq!(sketch.num_bins(), 0);
    assert!(sketch.cdf().is_empty());
}

#[test]
fn test_counts_sum_to_n() {
    let degrees = symmetric_degrees(&mut rng(1), 5000);
    let sketch = sketch_of(degrees.iter().copied().chain([0, 0, 1_000_000]));
    assert_eq!(sketch.n(), 5003);
    assert_eq!(sketch.bins().map(|(_, count)| count).sum::<u64>(), 5003);
    let bins: Vec<u32> = sketch.bins().map(|(bin, _)| bin).collect();
    assert!(bins.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(bins.first(), Some(&0));
    assert_eq!(bins.last(), Some(&19));
}

#[test]
fn test_cdf_terminates_at_one() {
    for seed in 0..20 {
        let mut rng = rng(seed);
        let n = 1 + (seed as usize) * 37;
        let sketch = sketch_of(symmetric_degrees(&mut rng, n));
        let cdf = sketch.cdf();
        assert_eq!(cdf.last().unwrap().1, 1.0);
        assert!(cdf.windows(2).all(|pair| pair[0].1 < pair[1].1));
    }
    let single = sketch_of([7]);
    assert_eq!(single.cdf(), vec![(3, 1.0)]);
}

#[test]
fn test_cdf_fractions() {
    let sketch = sketch_of([0, 1, 2, 3]);
    assert_eq!(sketch.cdf(), vec![(0, 0.25), (1, 0.75), (2, 1.0)]);
}

#[test]
fn test_reset_keeps_base() {
    let mut sketch = LogBinSketch::builder().log_base(4).build();
    sketch.update(100);
    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.log_base(), 4);
}

#[test]
fn test_round_trip() {
    for base in [2, 3, 10] {
        let mut sketch = LogBinSketch::builder().log_base(base).build();
        for degree in symmetric_degrees(&mut rng(base as u64), 10_000) {
            sketch.update(degree * degree);
        }
        sketch.update(u64::MAX);
        let bytes = sketch.serialize();
        assert_eq!(bytes.len(), 24 + sketch.num_bins() * 12);
        let restored = LogBinSketch::deserialize(&bytes).unwrap();
        assert_eq!(restored, sketch);
        assert_eq!(restored.serialize(), bytes);
    }
}

#[test]
fn test_empty_round_trip() {
    let sketch = LogBinSketch::builder().log_base(10).build();
    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 8);
    let restored = LogBinSketch::deserialize(&bytes).unwrap();
    assert_eq!(restored, sketch);
    assert!(restored.is_empty());
}

#[test]
fn test_deserialize_rejects_truncation() {
    let bytes = sketch_of([1, 5, 900]).serialize();
    for len in 0..bytes.len() {
        let err = LogBinSketch::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData, "length {len}");
    }
}

#[test]
fn test_deserialize_rejects_corruption() {
    let bytes = sketch_of([0, 1, 1]).serialize();

    let mut wrong_family = bytes.clone();
    wrong_family[2] = 10;
    let err = LogBinSketch::deserialize(&wrong_family).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains("invalid family"), "{err}");

    let mut wrong_version = bytes.clone();
    wrong_version[1] = 9;
    let err = LogBinSketch::deserialize(&wrong_version).unwrap_err();
    assert!(err.message().contains("serial version"), "{err}");

    let mut bad_base = bytes.clone();
    bad_base[4..8].copy_from_slice(&1u32.to_le_bytes());
    assert!(LogBinSketch::deserialize(&bad_base).is_err());

    let mut bad_count = bytes.clone();
    bad_count[28] = 5;
    let err = LogBinSketch::deserialize(&bad_count).unwrap_err();
    assert!(err.message().contains("sum"), "{err}");

    let mut unordered = bytes.clone();
    unordered[36..40].copy_from_slice(&0u32.to_le_bytes());
    let err = LogBinSketch::deserialize(&unordered).unwrap_err();
    assert!(err.message().contains("strictly increasing"), "{err}");

    let mut zero_count = bytes.clone();
    zero_count[28..36].copy_from_slice(&0u64.to_le_bytes());
    let err = LogBinSketch::deserialize(&zero_count).unwrap_err();
    assert!(err.message().contains("zero count"), "{err}");
}

#[test]
fn test_deserialize_rejects_trailing_bytes() {
    for sketch in [sketch_of([2, 40, 40]), LogBinSketch::new()] {
        let mut padded = sketch.serialize();
        padded.push(0);
        let err = LogBinSketch::deserialize(&padded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.context(), &[("trailing_bytes", "1".to_string())]);

        let mut doubled = sketch.serialize();
        doubled.extend(sketch.serialize());
        assert!(LogBinSketch::deserialize(&doubled).is_err());
    }
}
