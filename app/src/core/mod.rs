pub mod color;
pub mod id;
pub mod reading;
pub mod time;
pub mod timeseries;
pub mod unit;
