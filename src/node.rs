use crate::error::{Error, Result};
use crate::node_type::{BranchElement, LeafElement};
use crate::page::{Page, PageType};

use std::cmp::Ordering;
use std::convert::TryFrom;
use tracing::trace;

/// Node is a typed view of a branch or leaf page.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
  Branch(BranchNode<'a>),
  Leaf(LeafNode<'a>),
}

impl<'a> TryFrom<Page<'a>> for Node<'a> {
  type Error = Error;

  fn try_from(page: Page<'a>) -> Result<Node<'a>> {
    match page.page_type() {
      PageType::Branch => Ok(Node::Branch(BranchNode { page })),
      PageType::Leaf => Ok(Node::Leaf(LeafNode { page })),
      _ => Err(Error::UnexpectedPageType {
        page_id: page.id(),
        flags: page.header().flags,
      }),
    }
  }
}

impl<'a> Node<'a> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Node::Leaf(_))
  }
}

/// Branch page whose separator keys are the largest key of each child.
#[derive(Clone, Copy, Debug)]
pub struct BranchNode<'a> {
  page: Page<'a>,
}

impl<'a> BranchNode<'a> {
  pub fn len(&self) -> usize {
    self.page.count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn element(&self, index: usize) -> Result<BranchElement<'a>> {
    self.page.branch_element(index)
  }

  /// iter yields elements in stored order. Ordering is not checked.
  pub fn iter(&self) -> impl Iterator<Item = Result<BranchElement<'a>>> + 'a {
    let page = self.page;
    (0..page.count()).map(move |i| page.branch_element(i))
  }

  /// search returns the first element whose key is >= `key`,
  /// falling back to the last element when `key` sorts after every separator.
  pub fn search(&self, key: &[u8]) -> Result<usize> {
    let count = self.len();
    if count == 0 {
      return Err(Error::IndexOutOfRange { index: 0, count });
    }
    let (mut lo, mut hi) = (0, count);
    while lo < hi {
      let mid = lo + (hi - lo) / 2;
      match self.element(mid)?.key().cmp(key) {
        Ordering::Less => lo = mid + 1,
        _ => hi = mid,
      }
    }
    Ok(lo.min(count - 1))
  }

  pub fn child_for(&self, key: &[u8]) -> Result<u64> {
    let index = self.search(key)?;
    let child = self.element(index)?.child_page_id();
    trace!(page = self.page.id(), index, child, "branch descent");
    Ok(child)
  }
}

#[derive(Clone, Copy, Debug)]
pub struct LeafNode<'a> {
  page: Page<'a>,
}

impl<'a> LeafNode<'a> {
  pub fn len(&self) -> usize {
    self.page.count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn element(&self, index: usize) -> Result<LeafElement<'a>> {
    self.page.leaf_element(index)
  }

  pub fn iter(&self) -> impl Iterator<Item = Result<LeafElement<'a>>> + 'a {
    let page = self.page;
    (0..page.count()).map(move |i| page.leaf_element(i))
  }

  /// Binary search over the leaf keys, Some(index) on an exact match.
  pub fn search(&self, key: &[u8]) -> Result<Option<usize>> {
    let (mut lo, mut hi) = (0, self.len());
    while lo < hi {
      let mid = lo + (hi - lo) / 2;
      match self.element(mid)?.key()?.cmp(key) {
        Ordering::Less => lo = mid + 1,
        Ordering::Greater => hi = mid,
        Ordering::Equal => return Ok(Some(mid)),
      }
    }
    Ok(None)
  }

  pub fn lookup(&self, key: &[u8]) -> Result<Option<LeafElement<'a>>> {
    match self.search(key)? {
      Some(index) => Ok(Some(self.element(index)?)),
      None => Ok(None),
    }
  }

  pub fn get(&self, key: &[u8]) -> Result<Option<&'a [u8]>> {
    match self.lookup(key)? {
      Some(elem) => Ok(Some(elem.value()?)),
      None => Ok(None),
    }
  }
}
