mod channel;
mod hub;
mod observer;
mod waiting;

pub use channel::*;
pub use hub::*;
pub use observer::*;
pub use waiting::*;
