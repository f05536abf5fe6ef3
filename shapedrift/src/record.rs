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

//! Typed degree records and the JSON-lines stream boundary.
//!
//! Each input line is an object carrying a non-negative integer `degree` and, when identity
//! matters, a `key` (or `id`) that is either a string or an integer. Anything else is a
//! [`ErrorKind::MalformedRecord`](crate::error::ErrorKind::MalformedRecord): records are
//! never coerced or skipped, since a silently dropped record biases the distribution.

use std::io::BufRead;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

/// One `(key, degree)` observation from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DegreeRecord {
    /// Node identity.
    pub key: String,
    /// Number of incident edges (or cardinality) for the node.
    pub degree: u64,
}

impl DegreeRecord {
    /// Creates a record.
    pub fn new(key: impl Into<String>, degree: u64) -> Self {
        Self {
            key: key.into(),
            degree,
        }
    }
}

/// How a reader treats lines without a `key`/`id` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Missing keys are malformed. Required wherever sampling by identity matters.
    #[default]
    Required,
    /// Missing keys are replaced by `line:<n>`. Suitable for sketch-only passes.
    LineOrdinal,
}

#[derive(Deserialize)]
struct RawRecord {
    key: Option<Value>,
    id: Option<Value>,
    degree: Option<Value>,
}

/// Parses one JSON line into a [`DegreeRecord`].
///
/// `line` is the 1-based line number, attached to errors and used for
/// [`KeyPolicy::LineOrdinal`] keys.
pub fn parse_record(text: &str, line: u64, policy: KeyPolicy) -> Result<DegreeRecord, Error> {
    let raw: RawRecord = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(err) => {
            let message = format!("not a JSON object: {err}");
            return Err(Error::malformed_record(line, message));
        }
    };

    let degree = match raw.degree {
        None => return Err(Error::malformed_record(line, "missing degree")),
        Some(Value::Number(number)) => match number.as_u64() {
            Some(degree) => degree,
            None => {
                return Err(Error::malformed_record(
                    line,
                    format!("degree must be a non-negative integer, got {number}"),
                ));
            }
        },
        Some(other) => {
            return Err(Error::malformed_record(
                line,
                format!("degree must be a non-negative integer, got {other}"),
            ));
        }
    };

    let key = match raw.key.or(raw.id) {
        Some(Value::String(key)) => key,
        Some(Value::Number(number)) if number.is_u64() || number.is_i64() => number.to_string(),
        Some(other) => {
            return Err(Error::malformed_record(
                line,
                format!("key must be a string or an integer, got {other}"),
            ));
        }
        None => match policy {
            KeyPolicy::Required => return Err(Error::malformed_record(line, "missing key")),
            KeyPolicy::LineOrdinal => format!("line:{line}"),
        },
    };

    Ok(DegreeRecord { key, degree })
}

/// Pull-based reader yielding one record per non-blank line.
///
/// I/O buffering is the reader's concern; the aggregator only sees an iterator.
pub struct DegreeRecordReader<R> {
    input: R,
    policy: KeyPolicy,
    line: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> DegreeRecordReader<R> {
    /// Creates a reader requiring keys on every record.
    pub fn new(input: R) -> Self {
        Self::with_policy(input, KeyPolicy::Required)
    }

    /// Creates a reader with the given key policy.
    pub fn with_policy(input: R, policy: KeyPolicy) -> Self {
        Self {
            input,
            policy,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the number of lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for DegreeRecordReader<R> {
    type Item = Result<DegreeRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.input.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    // Undecodable bytes are bad input, not a failing device.
                    let text = match std::str::from_utf8(&self.buf) {
                        Ok(text) => text.trim(),
                        Err(err) => {
                            let message = format!("line is not valid UTF-8: {err}");
                            return Some(Err(Error::malformed_record(self.line, message)));
                        }
                    };
                    if text.is_empty() {
                        continue;
                    }
                    return Some(parse_record(text, self.line, self.policy));
                }
                Err(err) => {
                    let err = Error::io("failed to read degree stream", err);
                    return Some(Err(err.with_context("line", self.line + 1)));
                }
            }
        }
    }
}
