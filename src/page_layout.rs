use std::mem::size_of;

/// A Single Page Size.
/// Pages larger than this are stored as a run of `1 + overflow` pages.
pub const PAGE_SIZE: usize = 4096;

/// Ceiling for any single key or value length read off a page.
pub const MAX_ALLOC_SIZE: usize = 0x7FFF_FFFF;

/// Page header layout (sixteen bytes in total)
pub const PAGE_ID_OFFSET: usize = 0;
pub const PAGE_ID_SIZE: usize = size_of::<u64>();
pub const PAGE_FLAGS_OFFSET: usize = PAGE_ID_OFFSET + PAGE_ID_SIZE;
pub const PAGE_FLAGS_SIZE: usize = size_of::<u16>();
pub const PAGE_COUNT_OFFSET: usize = PAGE_FLAGS_OFFSET + PAGE_FLAGS_SIZE;
pub const PAGE_COUNT_SIZE: usize = size_of::<u16>();
pub const PAGE_OVERFLOW_OFFSET: usize = PAGE_COUNT_OFFSET + PAGE_COUNT_SIZE;
pub const PAGE_OVERFLOW_SIZE: usize = size_of::<u32>();
pub const HEADER_SIZE: usize = PAGE_OVERFLOW_OFFSET + PAGE_OVERFLOW_SIZE;

/// Branch element layout (sixteen bytes in total)
pub const BRANCH_POS_OFFSET: usize = 0;
pub const BRANCH_KSIZE_OFFSET: usize = BRANCH_POS_OFFSET + size_of::<u32>();
pub const BRANCH_CHILD_OFFSET: usize = BRANCH_KSIZE_OFFSET + size_of::<u32>();
pub const BRANCH_ELEMENT_SIZE: usize = BRANCH_CHILD_OFFSET + size_of::<u64>();

/// Leaf element layout (sixteen bytes in total)
pub const LEAF_FLAGS_OFFSET: usize = 0;
pub const LEAF_POS_OFFSET: usize = LEAF_FLAGS_OFFSET + size_of::<u32>();
pub const LEAF_KSIZE_OFFSET: usize = LEAF_POS_OFFSET + size_of::<u32>();
pub const LEAF_VSIZE_OFFSET: usize = LEAF_KSIZE_OFFSET + size_of::<u32>();
pub const LEAF_ELEMENT_SIZE: usize = LEAF_VSIZE_OFFSET + size_of::<u32>();

/// Page type flags stored in the header.
pub const BRANCH_PAGE_FLAG: u16 = 0x01;
pub const LEAF_PAGE_FLAG: u16 = 0x02;
pub const META_PAGE_FLAG: u16 = 0x04;
pub const FREELIST_PAGE_FLAG: u16 = 0x10;

/// Leaf element flag marking a nested bucket rather than a plain value.
pub const BUCKET_LEAF_FLAG: u32 = 0x01;

// The layout is a wire format; these must never drift.
const _: () = assert!(HEADER_SIZE == 16);
const _: () = assert!(BRANCH_ELEMENT_SIZE == 16);
const _: () = assert!(LEAF_ELEMENT_SIZE == 16);

/// Byte offset of element `index` in a page whose records are `stride` bytes wide.
/// Returns None on arithmetic overflow.
pub fn element_offset(index: usize, stride: usize) -> Option<usize> {
  index.checked_mul(stride)?.checked_add(HEADER_SIZE)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_fields_are_contiguous() {
    assert_eq!(PAGE_FLAGS_OFFSET, 8);
    assert_eq!(PAGE_COUNT_OFFSET, 10);
    assert_eq!(PAGE_OVERFLOW_OFFSET, 12);
  }

  #[test]
  fn element_offsets_follow_header() {
    assert_eq!(element_offset(0, LEAF_ELEMENT_SIZE), Some(HEADER_SIZE));
    assert_eq!(element_offset(3, BRANCH_ELEMENT_SIZE), Some(HEADER_SIZE + 48));
    assert_eq!(element_offset(usize::MAX, LEAF_ELEMENT_SIZE), None);
  }
}
