use crate::error::{Error, Result};
use crate::page_layout::{HEADER_SIZE, MAX_ALLOC_SIZE, PAGE_SIZE};

/// Default bound on branch-to-leaf descent.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// CodecConfig controls the sanity limits applied while decoding elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConfig {
  /// Largest key or value length accepted from an element record
  pub max_payload_size: usize,
}

impl CodecConfig {
  pub fn new() -> CodecConfig {
    CodecConfig {
      max_payload_size: MAX_ALLOC_SIZE,
    }
  }

  pub fn max_payload_size(mut self, max: usize) -> CodecConfig {
    self.max_payload_size = max;
    self
  }
}

impl Default for CodecConfig {
  fn default() -> Self {
    CodecConfig::new()
  }
}

/// PagerConfig describes how a mapped file is carved into pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagerConfig {
  pub page_size: usize,
  /// Deepest branch chain followed before a lookup gives up
  pub max_depth: usize,
  pub codec: CodecConfig,
}

impl PagerConfig {
  pub fn new() -> PagerConfig {
    PagerConfig {
      page_size: PAGE_SIZE,
      max_depth: DEFAULT_MAX_DEPTH,
      codec: CodecConfig::default(),
    }
  }

  pub fn page_size(mut self, page_size: usize) -> PagerConfig {
    self.page_size = page_size;
    self
  }

  pub fn max_depth(mut self, max_depth: usize) -> PagerConfig {
    self.max_depth = max_depth;
    self
  }

  pub fn codec(mut self, codec: CodecConfig) -> PagerConfig {
    self.codec = codec;
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.page_size < HEADER_SIZE {
      return Err(Error::Config(format!(
        "page size {} is smaller than the {} byte header",
        self.page_size, HEADER_SIZE
      )));
    }
    if self.max_depth == 0 {
      return Err(Error::Config("max depth must be at least 1".to_string()));
    }
    Ok(())
  }
}

impl Default for PagerConfig {
  fn default() -> Self {
    PagerConfig::new()
  }
}
