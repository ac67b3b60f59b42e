//! Zero-copy decoding of bolt-style B+tree pages.
//!
//! A page is a 16 byte header followed by fixed-size element records and then
//! the key/value payloads those records point at. Decoding borrows the page
//! buffer and never copies payload bytes.

pub mod btree;
pub mod config;
pub mod error;
pub mod node;
pub mod node_type;
pub mod page;
pub mod page_builder;
pub mod page_layout;
pub mod pager;

pub use btree::BTree;
pub use config::{CodecConfig, PagerConfig};
pub use error::{Error, Result};
pub use node::{BranchNode, LeafNode, Node};
pub use node_type::{BranchElement, LeafElement};
pub use page::{branch_element_at, leaf_element_at, read_header, Page, PageHeader, PageType};
pub use page_builder::PageBuilder;
pub use pager::Pager;
