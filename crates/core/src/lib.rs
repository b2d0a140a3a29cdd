#![forbid(unsafe_code)]

pub mod identity;
pub mod model;
pub mod time;

pub use identity::SessionIdentity;
pub use time::Clock;
