use crate::error::{Error, Result};
use crate::node::Node;
use crate::node_type::LeafElement;
use crate::pager::Pager;

use std::convert::TryFrom;
use tracing::{debug, trace, warn};

/// BTree is a read-only view of a tree rooted at a page of a Pager.
/// Branch pages are descended by separator key until a leaf is reached.
pub struct BTree<'p> {
  pager: &'p Pager,
  root: u64,
}

impl<'p> BTree<'p> {
  pub fn new(pager: &'p Pager, root: u64) -> BTree<'p> {
    BTree { pager, root }
  }

  pub fn root(&self) -> u64 {
    self.root
  }

  /// get returns the value stored under `key`, or None when it is absent.
  pub fn get(&self, key: &[u8]) -> Result<Option<&'p [u8]>> {
    match self.lookup(key)? {
      Some(elem) => Ok(Some(elem.value()?)),
      None => Ok(None),
    }
  }

  /// lookup returns the whole leaf element so callers can inspect its flags.
  pub fn lookup(&self, key: &[u8]) -> Result<Option<LeafElement<'p>>> {
    let found = self.search_node(self.root, key, 0)?;
    debug!(root = self.root, found = found.is_some(), "lookup");
    Ok(found)
  }

  fn search_node(&self, id: u64, key: &[u8], depth: usize) -> Result<Option<LeafElement<'p>>> {
    let max_depth = self.pager.config().max_depth;
    if depth >= max_depth {
      let err = Error::DepthExceeded {
        root: self.root,
        max_depth,
      };
      warn!(%err, page = id, "branch chain too deep");
      return Err(err);
    }
    let page = self.pager.page(id)?;
    match Node::try_from(page)? {
      Node::Branch(branch) => {
        let child = branch.child_for(key)?;
        self.search_node(child, key, depth + 1)
      }
      Node::Leaf(leaf) => {
        trace!(page = id, depth, "reached leaf");
        leaf.lookup(key)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::PagerConfig;
  use crate::page::PageType;
  use crate::page_builder::PageBuilder;
  use crate::page_layout::BUCKET_LEAF_FLAG;

  const SMALL: usize = 256;

  fn pager(pages: Vec<PageBuilder>) -> Pager {
    let mut image = Vec::new();
    for page in pages {
      image.extend(page.page_size(SMALL).build().unwrap());
    }
    Pager::from_bytes(image, PagerConfig::new().page_size(SMALL)).unwrap()
  }

  fn two_level() -> Pager {
    pager(vec![
      PageBuilder::new(0, PageType::Branch)
        .add_branch(1, b"c")
        .unwrap()
        .add_branch(2, b"z")
        .unwrap(),
      PageBuilder::new(1, PageType::Leaf)
        .add_leaf(0, b"a", b"apple")
        .unwrap()
        .add_leaf(0, b"c", b"cherry")
        .unwrap(),
      PageBuilder::new(2, PageType::Leaf)
        .add_leaf(0, b"hello", b"world")
        .unwrap()
        .add_leaf(BUCKET_LEAF_FLAG, b"user", b"")
        .unwrap(),
    ])
  }

  #[test]
  fn get_descends_to_leaf() {
    let pager = two_level();
    let tree = BTree::new(&pager, 0);
    assert_eq!(tree.get(b"a").unwrap(), Some(&b"apple"[..]));
    assert_eq!(tree.get(b"c").unwrap(), Some(&b"cherry"[..]));
    assert_eq!(tree.get(b"hello").unwrap(), Some(&b"world"[..]));
    assert_eq!(tree.get(b"hello2").unwrap(), None);
    assert_eq!(tree.get(b"b").unwrap(), None);
  }

  #[test]
  fn lookup_exposes_bucket_flag() {
    let pager = two_level();
    let elem = BTree::new(&pager, 0).lookup(b"user").unwrap().unwrap();
    assert!(elem.is_bucket());
  }

  #[test]
  fn cycles_are_reported_as_corruption() {
    let pager = pager(vec![PageBuilder::new(0, PageType::Branch)
      .add_branch(0, b"z")
      .unwrap()]);
    let err = BTree::new(&pager, 0).get(b"a").unwrap_err();
    assert!(err.is_corruption());
    assert!(matches!(
      err,
      Error::DepthExceeded {
        root: 0,
        max_depth: crate::config::DEFAULT_MAX_DEPTH
      }
    ));
  }

  #[test]
  fn missing_child_page() {
    let pager = pager(vec![PageBuilder::new(0, PageType::Branch)
      .add_branch(5, b"z")
      .unwrap()]);
    assert!(matches!(
      BTree::new(&pager, 0).get(b"a"),
      Err(Error::PageNotFound { page_id: 5 })
    ));
  }
}
