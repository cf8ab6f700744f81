//! Editor buffers, persistence and page extraction

pub mod editor;
pub mod extract;
pub mod store;

pub use editor::{EditorBuffer, StreamRelay};
pub use store::Store;
