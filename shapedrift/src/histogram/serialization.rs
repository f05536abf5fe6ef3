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

//! Binary format for persisted baseline sketches.
//!
//! ```text
//! byte 0      preamble longs (1 empty, 3 non-empty)
//! byte 1      serial version
//! byte 2      family id
//! byte 3      flags
//! bytes 4-7   log base (u32)
//! bytes 8-11  number of bins (u32)       non-empty only
//! bytes 12-15 unused                     non-empty only
//! bytes 16-23 n (u64)                    non-empty only
//! then        (bin u32, count u64) pairs in ascending bin order
//! ```
//!
//! All multi-byte values are little endian.

use std::collections::BTreeMap;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::assert::ensure_preamble_longs_is;
use crate::codec::assert::ensure_serial_version_is;
use crate::codec::assert::truncated;
use crate::codec::family::Family;
use crate::error::Error;
use crate::histogram::LogBinSketch;

const SERIAL_VERSION: u8 = 1;
const PREAMBLE_LONGS_EMPTY: u8 = 1;
const PREAMBLE_LONGS_NONEMPTY: u8 = 3;
const EMPTY_FLAG_MASK: u8 = 1 << 2;
const BIN_ENTRY_BYTES: usize = 12;

impl LogBinSketch {
    /// Serializes this sketch into a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let preamble_longs = if self.is_empty() {
            PREAMBLE_LONGS_EMPTY
        } else {
            PREAMBLE_LONGS_NONEMPTY
        };
        let capacity = preamble_longs as usize * 8 + self.num_bins() * BIN_ENTRY_BYTES;
        let mut out = SketchBytes::with_capacity(capacity);
        out.write_u8(preamble_longs);
        out.write_u8(SERIAL_VERSION);
        out.write_u8(Family::LOG_BIN.id);
        out.write_u8(if self.is_empty() { EMPTY_FLAG_MASK } else { 0 });
        out.write_u32_le(self.log_base());
        if self.is_empty() {
            return out.into_bytes();
        }
        out.write_u32_le(self.num_bins() as u32);
        out.write_u32_le(0);
        out.write_u64_le(self.n());
        for (bin, count) in self.bins() {
            out.write_u32_le(bin);
            out.write_u64_le(count);
        }
        out.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// The image is validated: bins must be strictly increasing with non-zero counts that
    /// sum to `n`, so a corrupt baseline cannot masquerade as a valid distribution.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let preamble_longs = cursor.read_u8().map_err(truncated("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(truncated("serial_version"))?;
        let family_id = cursor.read_u8().map_err(truncated("family_id"))?;
        Family::LOG_BIN.validate_id(family_id)?;
        ensure_serial_version_is(SERIAL_VERSION, serial_version)?;
        let flags = cursor.read_u8().map_err(truncated("flags"))?;
        let log_base = cursor.read_u32_le().map_err(truncated("log_base"))?;
        if log_base < 2 {
            let message = format!("log_base must be at least 2, got {log_base}");
            return Err(Error::deserial(message));
        }

        if flags & EMPTY_FLAG_MASK != 0 {
            ensure_preamble_longs_is(PREAMBLE_LONGS_EMPTY, preamble_longs)?;
            ensure_fully_consumed(&cursor)?;
            return Ok(LogBinSketch::with_log_base(log_base));
        }
        ensure_preamble_longs_is(PREAMBLE_LONGS_NONEMPTY, preamble_longs)?;

        let num_bins = cursor.read_u32_le().map_err(truncated("num_bins"))? as usize;
        cursor.read_u32_le().map_err(truncated("unused"))?;
        let n = cursor.read_u64_le().map_err(truncated("n"))?;
        let needed = num_bins
            .checked_mul(BIN_ENTRY_BYTES)
            .ok_or_else(|| Error::deserial("bins size overflow"))?;
        if cursor.remaining() < needed {
            return Err(Error::truncated("bins"));
        }

        let mut bins = BTreeMap::new();
        let mut previous: Option<u32> = None;
        let mut total: u64 = 0;
        for _ in 0..num_bins {
            let bin = cursor.read_u32_le().map_err(truncated("bin"))?;
            let count = cursor.read_u64_le().map_err(truncated("count"))?;
            if previous.is_some_and(|prev| bin <= prev) {
                let err = Error::deserial("bins are not strictly increasing");
                return Err(err.with_context("bin", bin));
            }
            if count == 0 {
                let err = Error::deserial("bin has zero count");
                return Err(err.with_context("bin", bin));
            }
            total = total
                .checked_add(count)
                .ok_or_else(|| Error::deserial("bin counts overflow"))?;
            bins.insert(bin, count);
            previous = Some(bin);
        }
        if total != n {
            let message = format!("bin counts sum to {total} but n is {n}");
            return Err(Error::deserial(message));
        }
        if n == 0 {
            return Err(Error::deserial("non-empty sketch has n == 0"));
        }
        ensure_fully_consumed(&cursor)?;
        Ok(LogBinSketch::from_parts(log_base, bins, n))
    }
}

fn ensure_fully_consumed(cursor: &SketchSlice<'_>) -> Result<(), Error> {
    match cursor.remaining() {
        0 => Ok(()),
        extra => {
            let err = Error::deserial("unexpected bytes after sketch image");
            Err(err.with_context("trailing_bytes", extra))
        }
    }
}
