pub mod config;
pub mod error;
pub mod frames;


pub use config::*;
pub use error::*;
pub use frames::*;
