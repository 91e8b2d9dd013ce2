// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! lode configuration.
//!
//! - **Level 1 (Static)**: compile-time defaults (indent unit, decoder depth limit)
//! - **Level 2 (Runtime)**: [`EncoderConfig`], [`DecoderConfig`], [`PipeConfig`]
//!
//! # Example
//!
//! ```
//! use lode::config::{EncoderConfig, PipeConfig};
//! use std::time::Duration;
//!
//! let encoder = EncoderConfig::default().with_compact(true);
//! assert!(encoder.compact);
//!
//! let pipe = PipeConfig::default()
//!     .with_capacity(64)
//!     .with_timeout(Duration::from_millis(250));
//! assert_eq!(pipe.capacity, Some(64));
//! ```

use std::time::Duration;

// =======================================================================
// Static defaults
// =======================================================================

/// Spaces per nesting level in pretty output.
pub const DEFAULT_INDENT: usize = 2;

/// Deepest container nesting the decoder accepts.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Environment variable overriding the pipe capacity.
pub const ENV_PIPE_CAPACITY: &str = "LODE_PIPE_CAPACITY";

/// Environment variable overriding the pipe timeout, in milliseconds.
pub const ENV_PIPE_TIMEOUT_MS: &str = "LODE_PIPE_TIMEOUT_MS";

// =======================================================================
// Encoder
// =======================================================================

/// Output options for [`JsonEncoder`](crate::codec::JsonEncoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Omit all insignificant whitespace.
    pub compact: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub escape_unicode: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            compact: false,
            indent: DEFAULT_INDENT,
            escape_unicode: false,
        }
    }
}

impl EncoderConfig {
    /// Compact output preset.
    pub fn compact() -> Self {
        Self::default().with_compact(true)
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_escape_unicode(mut self, escape: bool) -> Self {
        self.escape_unicode = escape;
        self
    }
}

// =======================================================================
// Decoder
// =======================================================================

/// Limits applied by [`JsonDecoder`](crate::codec::JsonDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum container nesting; deeper input is a parse error.
    pub max_depth: usize,
    /// Sort object keys instead of keeping document order.
    pub sorted: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            sorted: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }
}

// =======================================================================
// Pipe
// =======================================================================

/// Construction parameters for a [`Pipe`](crate::pipe::Pipe).
///
/// `capacity: None` means unbounded; `timeout: None` means block
/// indefinitely on push and pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeConfig {
    pub capacity: Option<usize>,
    pub timeout: Option<Duration>,
}

impl PipeConfig {
    /// Defaults overridden by `LODE_PIPE_CAPACITY` and `LODE_PIPE_TIMEOUT_MS`.
    ///
    /// Unparseable values are ignored. A timeout of `0` means no timeout.
    pub fn from_env() -> Self {
        let capacity = std::env::var(ENV_PIPE_CAPACITY)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok());
        let timeout = std::env::var(ENV_PIPE_TIMEOUT_MS)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Self { capacity, timeout }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_defaults() {
        let config = EncoderConfig::default();
        assert!(!config.compact);
        assert_eq!(config.indent, 2);
        assert!(!config.escape_unicode);
        assert!(EncoderConfig::compact().compact);
    }

    #[test]
    fn test_decoder_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.sorted);
        assert!(config.with_sorted(true).sorted);
    }

    #[test]
    fn test_pipe_defaults_unbounded() {
        let config = PipeConfig::default();
        assert_eq!(config.capacity, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_pipe_from_env() {
        std::env::set_var(ENV_PIPE_CAPACITY, "16");
        std::env::set_var(ENV_PIPE_TIMEOUT_MS, "not-a-number");
        let config = PipeConfig::from_env();
        std::env::remove_var(ENV_PIPE_CAPACITY);
        std::env::remove_var(ENV_PIPE_TIMEOUT_MS);

        assert_eq!(config.capacity, Some(16));
        assert_eq!(config.timeout, None);
    }
}
