//! Plain data types exchanged between the host application and the core.

pub mod macros;
pub mod roster;
pub mod time;

pub use roster::*;
pub use time::*;
