pub mod constants;
pub mod delay;

pub use constants::*;
pub use delay::{DelayRange, sleep_for};
