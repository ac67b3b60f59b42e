//! Branch and leaf element records.
//!
//! Every record stores `pos` relative to the record's own first byte, so the
//! key of element `i` starts at `HEADER_SIZE + i * stride + pos`. All ranges
//! are computed with checked arithmetic and compared against the real buffer
//! length before any slice is taken.

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::page_layout::{
  element_offset, BRANCH_CHILD_OFFSET, BRANCH_ELEMENT_SIZE, BRANCH_KSIZE_OFFSET,
  BRANCH_POS_OFFSET, BUCKET_LEAF_FLAG, LEAF_ELEMENT_SIZE, LEAF_FLAGS_OFFSET, LEAF_KSIZE_OFFSET,
  LEAF_POS_OFFSET, LEAF_VSIZE_OFFSET,
};
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;
use tracing::warn;

/// One separator key and child pointer of a branch page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchElement<'a> {
  index: usize,
  pos: u32,
  ksize: u32,
  child_page_id: u64,
  key: &'a [u8],
}

impl<'a> BranchElement<'a> {
  pub fn index(&self) -> usize {
    self.index
  }

  pub fn pos(&self) -> u32 {
    self.pos
  }

  pub fn ksize(&self) -> u32 {
    self.ksize
  }

  pub fn child_page_id(&self) -> u64 {
    self.child_page_id
  }

  pub fn key(&self) -> &'a [u8] {
    self.key
  }
}

/// One key/value record of a leaf page. Slices are bounds checked on access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafElement<'a> {
  buf: &'a [u8],
  index: usize,
  offset: usize,
  flags: u32,
  pos: u32,
  ksize: u32,
  vsize: u32,
  max_payload_size: usize,
}

impl<'a> LeafElement<'a> {
  pub fn index(&self) -> usize {
    self.index
  }

  pub fn flags(&self) -> u32 {
    self.flags
  }

  pub fn pos(&self) -> u32 {
    self.pos
  }

  pub fn ksize(&self) -> u32 {
    self.ksize
  }

  pub fn vsize(&self) -> u32 {
    self.vsize
  }

  /// Whether the value holds a nested bucket header instead of user data.
  pub fn is_bucket(&self) -> bool {
    self.flags & BUCKET_LEAF_FLAG != 0
  }

  pub fn key_range(&self) -> Result<Range<usize>> {
    let ksize = self.checked_len(self.ksize, "ksize")?;
    let start = self.payload_start()?;
    self.bounded(start, ksize, "key")
  }

  /// Value bytes start right where the key bytes end.
  pub fn value_range(&self) -> Result<Range<usize>> {
    let ksize = self.checked_len(self.ksize, "ksize")?;
    let vsize = self.checked_len(self.vsize, "vsize")?;
    let start = self
      .payload_start()?
      .checked_add(ksize)
      .ok_or_else(|| self.corrupt("value offset overflows"))?;
    self.bounded(start, vsize, "value")
  }

  pub fn key(&self) -> Result<&'a [u8]> {
    let range = self.key_range()?;
    Ok(&self.buf[range])
  }

  pub fn value(&self) -> Result<&'a [u8]> {
    let range = self.value_range()?;
    Ok(&self.buf[range])
  }

  pub fn key_value(&self) -> Result<(&'a [u8], &'a [u8])> {
    let value = self.value_range()?;
    let key = value.start - self.ksize as usize..value.start;
    Ok((&self.buf[key], &self.buf[value]))
  }

  fn payload_start(&self) -> Result<usize> {
    self
      .offset
      .checked_add(self.pos as usize)
      .ok_or_else(|| self.corrupt("pos overflows"))
  }

  fn checked_len(&self, len: u32, field: &str) -> Result<usize> {
    let len = len as usize;
    if len > self.max_payload_size {
      return Err(self.corrupt(format!(
        "{} {} exceeds max payload size {}",
        field, len, self.max_payload_size
      )));
    }
    Ok(len)
  }

  fn bounded(&self, start: usize, len: usize, what: &str) -> Result<Range<usize>> {
    bounded_range(self.buf.len(), self.index, start, len, what)
  }

  fn corrupt(&self, reason: impl Into<String>) -> Error {
    corruption(self.index, reason)
  }
}

fn corruption(index: usize, reason: impl Into<String>) -> Error {
  let err = Error::corrupt(index, reason);
  warn!(%err, "corrupt page element");
  err
}

fn bounded_range(
  buf_len: usize,
  index: usize,
  start: usize,
  len: usize,
  what: &str,
) -> Result<Range<usize>> {
  match start.checked_add(len) {
    Some(end) if end <= buf_len => Ok(start..end),
    _ => Err(corruption(
      index,
      format!(
        "{} range {}+{} exceeds buffer of {} bytes",
        what, start, len, buf_len
      ),
    )),
  }
}

/// Validates the index and that the whole record lies inside the buffer.
fn record(buf: &[u8], count: usize, index: usize, stride: usize) -> Result<usize> {
  if index >= count {
    return Err(Error::IndexOutOfRange { index, count });
  }
  let offset = element_offset(index, stride).ok_or_else(|| Error::TruncatedPage {
    needed: usize::MAX,
    actual: buf.len(),
  })?;
  let end = offset + stride;
  if end > buf.len() {
    return Err(Error::TruncatedPage {
      needed: end,
      actual: buf.len(),
    });
  }
  Ok(offset)
}

pub(crate) fn decode_branch<'a>(
  buf: &'a [u8],
  count: usize,
  index: usize,
  config: &CodecConfig,
) -> Result<BranchElement<'a>> {
  let offset = record(buf, count, index, BRANCH_ELEMENT_SIZE)?;
  let pos = LittleEndian::read_u32(&buf[offset + BRANCH_POS_OFFSET..]);
  let ksize = LittleEndian::read_u32(&buf[offset + BRANCH_KSIZE_OFFSET..]);
  let child_page_id = LittleEndian::read_u64(&buf[offset + BRANCH_CHILD_OFFSET..]);

  if ksize as usize > config.max_payload_size {
    return Err(corruption(
      index,
      format!(
        "ksize {} exceeds max payload size {}",
        ksize, config.max_payload_size
      ),
    ));
  }
  let start = offset
    .checked_add(pos as usize)
    .ok_or_else(|| corruption(index, "pos overflows"))?;
  let range = bounded_range(buf.len(), index, start, ksize as usize, "key")?;

  Ok(BranchElement {
    index,
    pos,
    ksize,
    child_page_id,
    key: &buf[range],
  })
}

pub(crate) fn decode_leaf<'a>(
  buf: &'a [u8],
  count: usize,
  index: usize,
  config: &CodecConfig,
) -> Result<LeafElement<'a>> {
  let offset = record(buf, count, index, LEAF_ELEMENT_SIZE)?;
  Ok(LeafElement {
    buf,
    index,
    offset,
    flags: LittleEndian::read_u32(&buf[offset + LEAF_FLAGS_OFFSET..]),
    pos: LittleEndian::read_u32(&buf[offset + LEAF_POS_OFFSET..]),
    ksize: LittleEndian::read_u32(&buf[offset + LEAF_KSIZE_OFFSET..]),
    vsize: LittleEndian::read_u32(&buf[offset + LEAF_VSIZE_OFFSET..]),
    max_payload_size: config.max_payload_size,
  })
}
