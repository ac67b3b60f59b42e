//! End-to-end decoding tests over hand-laid and builder-produced pages.

use boltpage::page_layout::{HEADER_SIZE, LEAF_ELEMENT_SIZE, LEAF_PAGE_FLAG};
use boltpage::{
  branch_element_at, leaf_element_at, read_header, BTree, CodecConfig, Error, Page, PageBuilder,
  PageHeader, PageType, Pager, PagerConfig,
};
use std::io::Write;
use std::thread;

fn sorted_pairs(n: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
  (0..n)
    .map(|i| {
      (
        format!("key-{:04}", i).into_bytes(),
        format!("value-{}", i * 7).into_bytes(),
      )
    })
    .collect()
}

fn leaf_page(pairs: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
  let mut builder = PageBuilder::new(3, PageType::Leaf);
  for (k, v) in pairs {
    builder = builder.add_leaf(0, k, v).unwrap();
  }
  builder.build().unwrap()
}

#[test]
fn round_trip_every_index() {
  let pairs = sorted_pairs(40);
  let buf = leaf_page(&pairs);
  let header = read_header(&buf).unwrap();
  assert_eq!(header.count as usize, pairs.len());

  for (i, (k, v)) in pairs.iter().enumerate() {
    let elem = leaf_element_at(&buf, i).unwrap();
    let key = elem.key_range().unwrap();
    let value = elem.value_range().unwrap();
    assert_eq!(value.start, key.start + elem.ksize() as usize);
    assert_eq!(&buf[key], &k[..]);
    assert_eq!(&buf[value], &v[..]);
  }
  assert!(leaf_element_at(&buf, pairs.len() - 1).is_ok());
  assert!(matches!(
    leaf_element_at(&buf, pairs.len()),
    Err(Error::IndexOutOfRange { .. })
  ));
}

#[test]
fn hand_laid_hello_world() {
  let payload = HEADER_SIZE + LEAF_ELEMENT_SIZE;
  let mut buf = vec![0u8; payload + 10];
  PageHeader {
    id: 1,
    flags: LEAF_PAGE_FLAG,
    count: 1,
    overflow: 0,
  }
  .write_to(&mut buf);
  // flags 0, pos 16 (first byte past the record), ksize 5, vsize 5
  buf[HEADER_SIZE + 4] = LEAF_ELEMENT_SIZE as u8;
  buf[HEADER_SIZE + 8] = 5;
  buf[HEADER_SIZE + 12] = 5;
  buf[payload..payload + 10].copy_from_slice(b"helloworld");

  let elem = leaf_element_at(&buf, 0).unwrap();
  assert_eq!(elem.key().unwrap(), b"hello");
  assert_eq!(elem.value().unwrap(), b"world");
  assert_eq!(elem.key_range().unwrap(), payload..payload + 5);
  assert_eq!(elem.value_range().unwrap(), payload + 5..payload + 10);
}

#[test]
fn corrupt_vsize_never_reads_past_buffer() {
  let pairs = sorted_pairs(2);
  let mut buf = leaf_page(&pairs);
  let len = buf.len() as u32;
  let vsize_at = HEADER_SIZE + LEAF_ELEMENT_SIZE + 12;
  buf[vsize_at..vsize_at + 4].copy_from_slice(&len.to_le_bytes());

  let elem = leaf_element_at(&buf, 1).unwrap();
  assert_eq!(elem.key().unwrap(), &pairs[1].0[..]);
  match elem.value() {
    Err(err @ Error::CorruptElement { .. }) => assert!(err.is_corruption()),
    other => panic!("expected CorruptElement, got {:?}", other),
  }
  // The neighbouring element is untouched.
  assert_eq!(leaf_element_at(&buf, 0).unwrap().value().unwrap(), &pairs[0].1[..]);
}

#[test]
fn payload_ceiling_is_configurable() {
  let pairs = sorted_pairs(1);
  let buf = leaf_page(&pairs);
  let page = Page::with_config(&buf, CodecConfig::new().max_payload_size(4)).unwrap();
  assert!(page.leaf_element(0).unwrap().key().is_err());
}

#[test]
fn branch_scenario_selects_child() {
  let buf = PageBuilder::new(1, PageType::Branch)
    .add_branch(7, b"b")
    .unwrap()
    .add_branch(9, b"m")
    .unwrap()
    .build()
    .unwrap();
  let keys: Vec<&[u8]> = (0..2)
    .map(|i| branch_element_at(&buf, i).unwrap().key())
    .collect();
  assert_eq!(keys, vec![&b"b"[..], &b"m"[..]]);

  let search = b"k";
  let chosen = (0..2)
    .map(|i| branch_element_at(&buf, i).unwrap())
    .find(|e| e.key() >= &search[..])
    .unwrap();
  assert_eq!(chosen.child_page_id(), 9);
}

#[test]
fn parallel_readers_share_one_buffer() {
  let pairs = sorted_pairs(16);
  let buf = leaf_page(&pairs);
  let buf = &buf;
  let pairs = &pairs;
  thread::scope(|s| {
    for _ in 0..4 {
      s.spawn(move || {
        for (i, (k, _)) in pairs.iter().enumerate() {
          assert_eq!(leaf_element_at(buf, i).unwrap().key().unwrap(), &k[..]);
        }
      });
    }
  });
}

#[test]
fn mapped_tree_lookup() {
  let mut image = PageBuilder::new(0, PageType::Branch)
    .add_branch(1, b"b")
    .unwrap()
    .add_branch(2, b"zz")
    .unwrap()
    .build()
    .unwrap();
  image.extend(
    PageBuilder::new(1, PageType::Leaf)
      .add_leaf(0, b"b", b"bee")
      .unwrap()
      .build()
      .unwrap(),
  );
  image.extend(
    PageBuilder::new(2, PageType::Leaf)
      .add_leaf(0, b"hello", b"world")
      .unwrap()
      .add_leaf(0, b"zz", b"sleep")
      .unwrap()
      .build()
      .unwrap(),
  );
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(&image).unwrap();
  file.flush().unwrap();

  let pager = Pager::open(file.path(), PagerConfig::default()).unwrap();
  let tree = BTree::new(&pager, 0);
  assert_eq!(tree.get(b"b").unwrap(), Some(&b"bee"[..]));
  assert_eq!(tree.get(b"hello").unwrap(), Some(&b"world"[..]));
  assert_eq!(tree.get(b"zz").unwrap(), Some(&b"sleep"[..]));
  assert_eq!(tree.get(b"hello2").unwrap(), None);
}
