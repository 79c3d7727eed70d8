//! Image encoding for saved crops.
//!
//! This module provides functionality for:
//! - Encoding the rendered output frame to PNG
//!
//! # Examples
//!
//! ```ignore
//! use inkframe_core::encode::encode_png;
//!
//! let pixels = vec![128u8; 600 * 448 * 3];
//! let png_bytes = encode_png(&pixels, 600, 448).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, encode_png_image, EncodeError, PNG_SIGNATURE};
