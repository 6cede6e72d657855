//! Text cleanup for OCR output.

mod normalize;

pub use normalize::{is_dash, normalize};
