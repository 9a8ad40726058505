//! Error types used by the rxflow runtime and stream pipelines.
//!
//! This module defines two main error enums:
//!
//! - [`StreamError`]: errors raised while composing, producing or consuming streams.
//! - [`RuntimeError`]: errors raised by connection lifecycle management.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the connection runtime.
///
/// These represent failures in driving hot streams, such as a shutdown sequence
/// exceeding its grace period or producers outliving a wait bound.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some producers did not stop in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the emitters that did not stop in time.
        stuck: Vec<String>,
    },

    /// Producers were still running when the wait bound elapsed.
    #[error("wait bound {bound:?} elapsed; pending: {pending:?}")]
    WaitExceeded {
        /// The bound that elapsed.
        bound: Duration,
        /// Names of the emitters still producing.
        pending: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rxflow::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::WaitExceeded { .. } => "runtime_wait_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck emitters={stuck:?}")
            }
            RuntimeError::WaitExceeded { bound, pending } => {
                format!("wait exceeded after {bound:?}; pending emitters={pending:?}")
            }
        }
    }
}

/// # Errors produced by stream composition, production and consumption.
///
/// Composition errors (`InvalidBatchSize`, `InvalidStep`) are returned by the call
/// that introduced them. Production errors (`EmitterClosed`, `Produce`) stay inside
/// the producer task and are reported on the event bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A value was emitted after the emitter had completed.
    #[error("emitter '{emitter}' is closed")]
    EmitterClosed {
        /// Name of the closed emitter.
        emitter: String,
    },

    /// Blocking collection was requested on a stream with unbounded sources.
    #[error("blocking collection on a stream with unbounded sources")]
    UnboundedStream,

    /// `buffer` was called with a zero batch size.
    #[error("invalid batch size {size}; must be at least 1")]
    InvalidBatchSize {
        /// The rejected size.
        size: usize,
    },

    /// A counter emitter was configured with a non-positive step.
    #[error("invalid counter step {step}; must be positive")]
    InvalidStep {
        /// The rejected step.
        step: i64,
    },

    /// `connect` was called on an already connected stream.
    #[error("stream already connected")]
    AlreadyConnected,

    /// Production stopped because the connection was cancelled.
    #[error("production cancelled")]
    Canceled,

    /// Producer failed; its input is terminated.
    #[error("production failed: {error}")]
    Produce {
        /// The underlying error message.
        error: String,
    },
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rxflow::StreamError;
    ///
    /// let err = StreamError::InvalidBatchSize { size: 0 };
    /// assert_eq!(err.as_label(), "stream_invalid_batch_size");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::EmitterClosed { .. } => "stream_emitter_closed",
            StreamError::UnboundedStream => "stream_unbounded",
            StreamError::InvalidBatchSize { .. } => "stream_invalid_batch_size",
            StreamError::InvalidStep { .. } => "stream_invalid_step",
            StreamError::AlreadyConnected => "stream_already_connected",
            StreamError::Canceled => "stream_canceled",
            StreamError::Produce { .. } => "stream_produce_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::EmitterClosed { emitter } => format!("closed: {emitter}"),
            StreamError::UnboundedStream => "unbounded stream".to_string(),
            StreamError::InvalidBatchSize { size } => format!("batch size: {size}"),
            StreamError::InvalidStep { step } => format!("counter step: {step}"),
            StreamError::AlreadyConnected => "already connected".to_string(),
            StreamError::Canceled => "cancelled".to_string(),
            StreamError::Produce { error } => format!("error: {error}"),
        }
    }

    /// Indicates whether the error was raised while building a pipeline
    /// (as opposed to while a producer was running).
    pub fn is_composition(&self) -> bool {
        matches!(
            self,
            StreamError::InvalidBatchSize { .. } | StreamError::InvalidStep { .. }
        )
    }
}
