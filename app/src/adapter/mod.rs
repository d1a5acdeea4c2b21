pub mod api;
mod content;
mod omi;

pub use content::HttpFloorplanSource;
pub use omi::OmiClient;
