pub mod level;
pub mod metadata;
pub mod patterns;
pub mod script;
pub mod time_serde;
pub mod translit;

pub use level::Level;
pub use metadata::{Metadata, SourceType};
