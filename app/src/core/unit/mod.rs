mod degree_celsius;
mod light;
mod percent;
mod person_count;
mod ppm;

pub use degree_celsius::DegreeCelsius;
pub use light::Lux;
pub use percent::Percent;
pub use person_count::PersonCount;
pub use ppm::Ppm;
