mod buffer;
mod memory_tracking;

pub use buffer::*;
pub use memory_tracking::*;

pub(crate) use buffer::handle_reserve_error;
