#![allow(dead_code)]

pub mod builder;
mod datetime;
mod duration;

pub use datetime::DateTime;
pub use duration::Duration;

#[cfg(test)]
pub use datetime::FIXED_NOW;
