pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use config::Config;
pub use error::WebcamError;
pub use normalize::clean_title;
pub use types::*;
