use std::fmt::Display;

use derive_more::derive::AsRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, AsRef, Serialize, Deserialize)]
pub struct PersonCount(pub f64);

impl From<&PersonCount> for f64 {
    fn from(value: &PersonCount) -> Self {
        value.0
    }
}

impl From<f64> for PersonCount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<PersonCount> for f64 {
    fn from(value: PersonCount) -> Self {
        value.0
    }
}

impl Display for PersonCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} persons", self.0)
    }
}
