//! Image decoding for the editor.
//!
//! This module provides functionality for:
//! - Decoding uploaded JPEG/PNG images with EXIF orientation applied
//! - Normalising processed output to the frame size
//!
//! All operations are synchronous and single-threaded within WASM. A failed
//! decode never touches editor state; the editor simply stays unloaded.
//!
//! # Examples
//!
//! ```ignore
//! use inkframe_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod resize;
mod source;
mod types;

pub use resize::{normalize_to_frame, resize};
pub use source::{decode_image, decode_image_no_orientation};
pub use types::{DecodeError, DecodedImage, Orientation};
