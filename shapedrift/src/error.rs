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

//! Error types for shapedrift.

use std::fmt;

/// The kind of an [`Error`].
///
/// Every kind is terminal for a single guardrail invocation; callers map kinds to
/// distinct outcomes (for example process exit codes) rather than retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An argument passed to a constructor or method is out of range.
    InvalidArgument,
    /// Serialized bytes are truncated, corrupt or of the wrong family.
    InvalidData,
    /// A stream record failed to parse or carried a negative or non-numeric degree.
    MalformedRecord,
    /// A sketch has no observations, so no distance can be computed.
    InsufficientData,
    /// A drift threshold lies outside `(0, 1]`.
    InvalidThreshold,
    /// The pass was aborted by a cancellation signal or deadline.
    Cancelled,
    /// Reading or writing an external resource failed.
    Io,
}

impl ErrorKind {
    /// Returns a short static name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidData => "invalid data",
            ErrorKind::MalformedRecord => "malformed record",
            ErrorKind::InsufficientData => "insufficient data",
            ErrorKind::InvalidThreshold => "invalid threshold",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by shapedrift operations.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Attaches a key/value pair describing where the error happened.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Attaches the underlying cause.
    pub fn set_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the context pairs attached to this error.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) fn deserial(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidData, message)
    }

    pub(crate) fn truncated(tag: &'static str) -> Self {
        Self::new(ErrorKind::InvalidData, format!("truncated input: {tag}"))
    }

    pub(crate) fn invalid_family(expected: u8, actual: u8, name: &'static str) -> Self {
        Self::deserial(format!(
            "invalid family: expected {expected} ({name}), got {actual}"
        ))
    }

    pub(crate) fn unsupported_serial_version(expected: u8, actual: u8) -> Self {
        Self::deserial(format!(
            "unsupported serial version: expected {expected}, got {actual}"
        ))
    }

    pub(crate) fn invalid_preamble_longs(expected: u8, actual: u8) -> Self {
        Self::deserial(format!(
            "invalid preamble longs: expected {expected}, got {actual}"
        ))
    }

    pub(crate) fn malformed_record(line: u64, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRecord, message).with_context("line", line)
    }

    pub(crate) fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub(crate) fn invalid_threshold(name: &'static str, value: f64) -> Self {
        Self::new(
            ErrorKind::InvalidThreshold,
            format!("{name} must be in (0, 1], got {value}"),
        )
    }

    pub(crate) fn cancelled(processed: u64) -> Self {
        let message = "stream pass aborted before completion";
        Self::new(ErrorKind::Cancelled, message).with_context("records_processed", processed)
    }

    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, message).set_source(source)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, ")")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut de = f.debug_struct("Error");
        de.field("kind", &self.kind);
        de.field("message", &self.message);
        if !self.context.is_empty() {
            de.field("context", &self.context);
        }
        if let Some(source) = &self.source {
            de.field("source", source);
        }
        de.finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}
