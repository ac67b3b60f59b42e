use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::page::{read_header, Page};
use crate::page_layout::HEADER_SIZE;

use memmap::Mmap;
use std::convert::TryFrom;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

enum Storage {
  Mapped(Mmap),
  Memory(Vec<u8>),
}

impl Storage {
  fn bytes(&self) -> &[u8] {
    match self {
      Storage::Mapped(mmap) => &mmap[..],
      Storage::Memory(buf) => &buf[..],
    }
  }
}

/// Pager hands out read-only page views over a mapped file or an in-memory image.
/// Page `id` starts at byte `id * page_size` and spans `1 + overflow` pages.
pub struct Pager {
  storage: Storage,
  config: PagerConfig,
}

impl Pager {
  pub fn open<P: AsRef<Path>>(path: P, config: PagerConfig) -> Result<Pager> {
    config.validate()?;
    let path = path.as_ref();
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    // Empty files cannot be mapped.
    let storage = if len == 0 {
      Storage::Memory(Vec::new())
    } else {
      // SAFETY: the map is read-only and the bytes are only ever read through
      // bounds-checked slices. Truncating the file underneath us is not supported.
      Storage::Mapped(unsafe { Mmap::map(&file)? })
    };
    debug!(path = %path.display(), len, page_size = config.page_size, "opened page file");
    Ok(Pager { storage, config })
  }

  pub fn from_bytes(buf: Vec<u8>, config: PagerConfig) -> Result<Pager> {
    config.validate()?;
    Ok(Pager {
      storage: Storage::Memory(buf),
      config,
    })
  }

  pub fn config(&self) -> &PagerConfig {
    &self.config
  }

  pub fn len(&self) -> usize {
    self.storage.bytes().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn page_count(&self) -> u64 {
    (self.len() / self.config.page_size) as u64
  }

  pub fn page(&self, id: u64) -> Result<Page<'_>> {
    let data = self.storage.bytes();
    let start = usize::try_from(id)
      .ok()
      .and_then(|id| id.checked_mul(self.config.page_size))
      .filter(|start| *start < data.len())
      .ok_or(Error::PageNotFound { page_id: id })?;

    let header = read_header(&data[start..])?;
    if header.id != id {
      warn!(expected = id, found = header.id, "page id mismatch");
    }
    let span = (header.overflow as usize)
      .checked_add(1)
      .and_then(|pages| pages.checked_mul(self.config.page_size))
      .ok_or(Error::TruncatedPage {
        needed: usize::MAX,
        actual: data.len() - start,
      })?;
    let end = start.saturating_add(span);
    if end > data.len() {
      return Err(Error::TruncatedPage {
        needed: span.max(HEADER_SIZE),
        actual: data.len() - start,
      });
    }
    Page::with_config(&data[start..end], self.config.codec)
  }
}
