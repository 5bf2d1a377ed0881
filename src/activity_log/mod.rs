pub mod buffer;
pub mod buffer_impl;
pub mod mirror;
pub mod types;
pub mod view;

pub use buffer::*;
pub use buffer_impl::{BoundedActivityLog, DEFAULT_CAPACITY};
pub use types::*;
pub use view::{LogView, NullView, TerminalView};
