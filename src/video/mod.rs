pub mod decoder;
pub mod export;
pub mod ffmpeg;
pub mod preview;

pub use decoder::*;
pub use export::*;
pub use ffmpeg::*;
pub use preview::*;
