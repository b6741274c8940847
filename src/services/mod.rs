pub mod page_store;

pub use page_store::{FileStore, MemoryStore, PageStore};
