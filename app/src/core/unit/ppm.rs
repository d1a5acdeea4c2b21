use std::fmt::Display;

use derive_more::derive::AsRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, AsRef, Serialize, Deserialize)]
pub struct Ppm(pub f64);

impl From<&Ppm> for f64 {
    fn from(value: &Ppm) -> Self {
        value.0
    }
}

impl From<f64> for Ppm {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Ppm> for f64 {
    fn from(value: Ppm) -> Self {
        value.0
    }
}

impl Display for Ppm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ppm", self.0)
    }
}
