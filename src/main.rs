use boltpage::page_layout::BUCKET_LEAF_FLAG;
use boltpage::{BTree, PageBuilder, PageType, Pager, PagerConfig, Result};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .init();
}

/// Writes a two page tree: a branch root over a leaf holding a "user" bucket entry
/// and the "hello" => "world" pair.
fn write_demo_file(path: &std::path::Path) -> Result<()> {
  let mut image = PageBuilder::new(0, PageType::Branch)
    .add_branch(1, b"user")?
    .build()?;
  image.extend(
    PageBuilder::new(1, PageType::Leaf)
      .add_leaf(0, b"hello", b"world")?
      .add_leaf(BUCKET_LEAF_FLAG, b"user", b"")?
      .build()?,
  );
  fs::write(path, image)?;
  Ok(())
}

fn main() -> Result<()> {
  init_logging();

  let path = std::env::args()
    .nth(1)
    .map(Into::into)
    .unwrap_or_else(|| std::env::temp_dir().join("boltpage-demo.db"));
  write_demo_file(&path)?;

  let pager = Pager::open(&path, PagerConfig::default())?;
  let tree = BTree::new(&pager, 0);
  for key in [&b"hello"[..], &b"hello2"[..]].iter() {
    match tree.get(key)? {
      Some(val) => info!(
        "the get val for {}: {}",
        String::from_utf8_lossy(key),
        String::from_utf8_lossy(val)
      ),
      None => info!("the get val for {}: <none>", String::from_utf8_lossy(key)),
    }
  }
  Ok(())
}
