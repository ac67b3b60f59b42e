//! Page header decoding and the `Page` view over a raw page buffer.
//!
//! ```text
//! +----------------------+
//! | Header (16 bytes)    |  id, flags, count, overflow
//! +----------------------+
//! | Element records      |  count * 16 bytes
//! +----------------------+
//! | Key/value payloads   |  addressed relative to each record
//! +----------------------+
//! ```

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::node_type::{self, BranchElement, LeafElement};
use crate::page_layout::{
  BRANCH_PAGE_FLAG, FREELIST_PAGE_FLAG, HEADER_SIZE, LEAF_PAGE_FLAG, META_PAGE_FLAG,
  PAGE_COUNT_OFFSET, PAGE_FLAGS_OFFSET, PAGE_ID_OFFSET, PAGE_OVERFLOW_OFFSET,
};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageType {
  Branch,
  Leaf,
  Meta,
  FreeList,
  Unknown(u16),
}

impl PageType {
  pub fn from_flags(flags: u16) -> PageType {
    match flags {
      BRANCH_PAGE_FLAG => PageType::Branch,
      LEAF_PAGE_FLAG => PageType::Leaf,
      META_PAGE_FLAG => PageType::Meta,
      FREELIST_PAGE_FLAG => PageType::FreeList,
      other => PageType::Unknown(other),
    }
  }

  pub fn flags(self) -> u16 {
    match self {
      PageType::Branch => BRANCH_PAGE_FLAG,
      PageType::Leaf => LEAF_PAGE_FLAG,
      PageType::Meta => META_PAGE_FLAG,
      PageType::FreeList => FREELIST_PAGE_FLAG,
      PageType::Unknown(flags) => flags,
    }
  }
}

/// Decoded copy of the fixed page header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageHeader {
  pub id: u64,
  pub flags: u16,
  pub count: u16,
  pub overflow: u32,
}

impl PageHeader {
  pub fn page_type(&self) -> PageType {
    PageType::from_flags(self.flags)
  }

  pub fn write_to(&self, buf: &mut [u8]) {
    LittleEndian::write_u64(&mut buf[PAGE_ID_OFFSET..], self.id);
    LittleEndian::write_u16(&mut buf[PAGE_FLAGS_OFFSET..], self.flags);
    LittleEndian::write_u16(&mut buf[PAGE_COUNT_OFFSET..], self.count);
    LittleEndian::write_u32(&mut buf[PAGE_OVERFLOW_OFFSET..], self.overflow);
  }
}

/// Reads the header from the first `HEADER_SIZE` bytes of `buf`.
pub fn read_header(buf: &[u8]) -> Result<PageHeader> {
  if buf.len() < HEADER_SIZE {
    return Err(Error::TruncatedPage {
      needed: HEADER_SIZE,
      actual: buf.len(),
    });
  }
  Ok(PageHeader {
    id: LittleEndian::read_u64(&buf[PAGE_ID_OFFSET..]),
    flags: LittleEndian::read_u16(&buf[PAGE_FLAGS_OFFSET..]),
    count: LittleEndian::read_u16(&buf[PAGE_COUNT_OFFSET..]),
    overflow: LittleEndian::read_u32(&buf[PAGE_OVERFLOW_OFFSET..]),
  })
}

/// Decodes branch element `index` using the default codec limits.
pub fn branch_element_at(buf: &[u8], index: usize) -> Result<BranchElement<'_>> {
  Page::new(buf)?.branch_element(index)
}

/// Decodes leaf element `index` using the default codec limits.
pub fn leaf_element_at(buf: &[u8], index: usize) -> Result<LeafElement<'_>> {
  Page::new(buf)?.leaf_element(index)
}

/// Page is a borrowed view of one page buffer. It never copies or mutates the bytes.
#[derive(Clone, Copy, Debug)]
pub struct Page<'a> {
  buf: &'a [u8],
  header: PageHeader,
  config: CodecConfig,
}

impl<'a> Page<'a> {
  pub fn new(buf: &'a [u8]) -> Result<Page<'a>> {
    Page::with_config(buf, CodecConfig::default())
  }

  pub fn with_config(buf: &'a [u8], config: CodecConfig) -> Result<Page<'a>> {
    let header = read_header(buf)?;
    Ok(Page {
      buf,
      header,
      config,
    })
  }

  pub fn header(&self) -> PageHeader {
    self.header
  }

  pub fn id(&self) -> u64 {
    self.header.id
  }

  pub fn page_type(&self) -> PageType {
    self.header.page_type()
  }

  pub fn count(&self) -> usize {
    self.header.count as usize
  }

  pub fn overflow(&self) -> u32 {
    self.header.overflow
  }

  pub fn as_bytes(&self) -> &'a [u8] {
    self.buf
  }

  pub fn config(&self) -> CodecConfig {
    self.config
  }

  pub fn branch_element(&self, index: usize) -> Result<BranchElement<'a>> {
    node_type::decode_branch(self.buf, self.count(), index, &self.config)
  }

  pub fn leaf_element(&self, index: usize) -> Result<LeafElement<'a>> {
    node_type::decode_leaf(self.buf, self.count(), index, &self.config)
  }
}
