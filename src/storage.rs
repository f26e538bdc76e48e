pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;
pub use traits::{HistoryStore, SharedHistoryStore};
