use derive_more::derive::AsRef;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, AsRef, Serialize, Deserialize)]
pub struct Lux(pub f64);

impl Display for Lux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} lux", self.0)
    }
}

impl From<&Lux> for f64 {
    fn from(value: &Lux) -> Self {
        value.0
    }
}

impl From<f64> for Lux {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Lux> for f64 {
    fn from(value: Lux) -> Self {
        value.0
    }
}
