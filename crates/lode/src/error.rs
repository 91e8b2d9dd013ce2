// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error and result types shared by every lode component.

use std::time::Duration;

/// Errors returned by value access, adapters, the codec and the pipe.
///
/// Every failure carries enough context to be reported without the caller
/// having to know which component raised it: parse errors carry the byte
/// offset, coercion errors name both types, closure errors name the
/// resource that failed first.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ========================================================================
    // Access Errors
    // ========================================================================
    /// The operation is not available on this value or view
    /// (random access on a forward-only cursor, second pass over a
    /// single-pass sequence, write to a read-only property).
    #[error("unsupported operation `{operation}`: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },
    /// List index past the end.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// A textual path expression could not be parsed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// A value cannot be coerced to the requested type.
    #[error("type mismatch: cannot convert {from} to {to}")]
    TypeMismatch { from: String, to: String },
    /// A required property is null or absent.
    #[error("required value `{property}` is not defined")]
    MissingValue { property: String },
    /// Malformed wire text.
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// A pipe push or pull did not complete within the configured timeout.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
    /// The other end of a pipe went away before the terminator was exchanged.
    #[error("pipe closed before end of stream")]
    ChannelClosed,
    /// First failure of a chained release; later releases were still attempted.
    #[error("failed to close {resource}: {source}")]
    ResourceClosure {
        resource: &'static str,
        #[source]
        source: Box<Error>,
    },
    /// A foreign resource reported a failure while being read.
    #[error("resource error: {0}")]
    Resource(String),
    /// Sink or source I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Unsupported`].
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::TypeMismatch`].
    pub fn mismatch(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::TypeMismatch {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Shorthand for [`Error::Parse`].
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// True for [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
