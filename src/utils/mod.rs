//! Shared utility functions.
//!
//! - [`content_length`] - `Content-Length`, `Accept-Ranges` and `Content-Range` parsing
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::utils::parse_content_range;
//!
//! let header_value = "bytes 0-1023/2048";
//! if let Some(total_size) = parse_content_range(header_value).and_then(|r| r.total) {
//!     println!("Total file size: {} bytes", total_size);
//! }
//! ```

pub mod content_length;

pub use content_length::{
    accepts_byte_ranges, extract_content_range, parse_content_length, parse_content_range,
    ContentRange,
};
