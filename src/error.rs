//! Error types for page decoding.

use thiserror::Error;

/// Result type alias using the crate's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  // Decode errors
  #[error("Truncated page: need {needed} bytes, buffer has {actual}")]
  TruncatedPage { needed: usize, actual: usize },

  #[error("Element index {index} out of range (count {count})")]
  IndexOutOfRange { index: usize, count: usize },

  #[error("Corrupt element {index}: {reason}")]
  CorruptElement { index: usize, reason: String },

  #[error("Unexpected page type on page {page_id}: flags {flags:#06x}")]
  UnexpectedPageType { page_id: u64, flags: u16 },

  // Pager errors
  #[error("Page not found: {page_id}")]
  PageNotFound { page_id: u64 },

  #[error("Lookup from root page {root} exceeded depth {max_depth}")]
  DepthExceeded { root: u64, max_depth: usize },

  // Builder errors
  #[error("Payload too large: {size} bytes (max {max})")]
  PayloadTooLarge { size: usize, max: usize },

  #[error("Page full: need {needed} bytes, capacity {capacity}")]
  PageFull { needed: usize, capacity: usize },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn corrupt(index: usize, reason: impl Into<String>) -> Self {
    Error::CorruptElement {
      index,
      reason: reason.into(),
    }
  }

  /// Whether the error indicates damaged page bytes rather than a bad request.
  pub fn is_corruption(&self) -> bool {
    matches!(
      self,
      Error::TruncatedPage { .. } | Error::CorruptElement { .. } | Error::DepthExceeded { .. }
    )
  }
}
