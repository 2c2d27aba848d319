mod compact;
mod fixed;
mod interface;
mod mutex;
mod state;

pub use compact::*;
pub use fixed::*;
pub use interface::*;
pub(crate) use mutex::*;
pub(crate) use state::*;
