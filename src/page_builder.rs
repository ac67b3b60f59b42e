//! Encodes element lists into page images using the same relative `pos` scheme
//! the decoder reads. Used for fixtures and test images; it does not allocate
//! pages inside a database file.

use crate::error::{Error, Result};
use crate::page::{PageHeader, PageType};
use crate::page_layout::{
  BRANCH_ELEMENT_SIZE, HEADER_SIZE, LEAF_ELEMENT_SIZE, MAX_ALLOC_SIZE, PAGE_SIZE,
};
use byteorder::{ByteOrder, LittleEndian};

enum Entry {
  Branch { child: u64, key: Vec<u8> },
  Leaf { flags: u32, key: Vec<u8>, value: Vec<u8> },
}

pub struct PageBuilder {
  id: u64,
  page_type: PageType,
  overflow: u32,
  page_size: usize,
  entries: Vec<Entry>,
}

impl PageBuilder {
  pub fn new(id: u64, page_type: PageType) -> PageBuilder {
    PageBuilder {
      id,
      page_type,
      overflow: 0,
      page_size: PAGE_SIZE,
      entries: Vec::new(),
    }
  }

  pub fn page_size(mut self, page_size: usize) -> PageBuilder {
    self.page_size = page_size;
    self
  }

  pub fn overflow(mut self, overflow: u32) -> PageBuilder {
    self.overflow = overflow;
    self
  }

  pub fn add_leaf(mut self, flags: u32, key: &[u8], value: &[u8]) -> Result<PageBuilder> {
    self.expect_type(PageType::Leaf)?;
    check_payload(key.len())?;
    check_payload(value.len())?;
    self.entries.push(Entry::Leaf {
      flags,
      key: key.to_vec(),
      value: value.to_vec(),
    });
    Ok(self)
  }

  pub fn add_branch(mut self, child: u64, key: &[u8]) -> Result<PageBuilder> {
    self.expect_type(PageType::Branch)?;
    check_payload(key.len())?;
    self.entries.push(Entry::Branch {
      child,
      key: key.to_vec(),
    });
    Ok(self)
  }

  /// Lays out header, records, then payloads in element order.
  /// The image is zero padded to `page_size * (1 + overflow)` bytes.
  pub fn build(&self) -> Result<Vec<u8>> {
    let count = self.entries.len();
    if count > u16::MAX as usize {
      return Err(Error::PageFull {
        needed: count,
        capacity: u16::MAX as usize,
      });
    }
    let stride = match self.page_type {
      PageType::Branch => BRANCH_ELEMENT_SIZE,
      _ => LEAF_ELEMENT_SIZE,
    };
    let payload: usize = self
      .entries
      .iter()
      .map(|entry| match entry {
        Entry::Branch { key, .. } => key.len(),
        Entry::Leaf { key, value, .. } => key.len() + value.len(),
      })
      .sum();
    let needed = HEADER_SIZE + count * stride + payload;
    let capacity = self.page_size * (1 + self.overflow as usize);
    if needed > capacity {
      return Err(Error::PageFull { needed, capacity });
    }

    let mut buf = vec![0u8; capacity];
    PageHeader {
      id: self.id,
      flags: self.page_type.flags(),
      count: count as u16,
      overflow: self.overflow,
    }
    .write_to(&mut buf);

    let mut data = HEADER_SIZE + count * stride;
    for (index, entry) in self.entries.iter().enumerate() {
      let offset = HEADER_SIZE + index * stride;
      let pos = (data - offset) as u32;
      match entry {
        Entry::Branch { child, key } => {
          LittleEndian::write_u32(&mut buf[offset..], pos);
          LittleEndian::write_u32(&mut buf[offset + 4..], key.len() as u32);
          LittleEndian::write_u64(&mut buf[offset + 8..], *child);
          buf[data..data + key.len()].copy_from_slice(key);
          data += key.len();
        }
        Entry::Leaf { flags, key, value } => {
          LittleEndian::write_u32(&mut buf[offset..], *flags);
          LittleEndian::write_u32(&mut buf[offset + 4..], pos);
          LittleEndian::write_u32(&mut buf[offset + 8..], key.len() as u32);
          LittleEndian::write_u32(&mut buf[offset + 12..], value.len() as u32);
          buf[data..data + key.len()].copy_from_slice(key);
          data += key.len();
          buf[data..data + value.len()].copy_from_slice(value);
          data += value.len();
        }
      }
    }
    Ok(buf)
  }

  fn expect_type(&self, page_type: PageType) -> Result<()> {
    if self.page_type != page_type {
      return Err(Error::UnexpectedPageType {
        page_id: self.id,
        flags: self.page_type.flags(),
      });
    }
    Ok(())
  }
}

fn check_payload(size: usize) -> Result<()> {
  if size > MAX_ALLOC_SIZE {
    return Err(Error::PayloadTooLarge {
      size,
      max: MAX_ALLOC_SIZE,
    });
  }
  Ok(())
}
