//! Splitting and merging of concatenated device tree blobs.
//!
//! A boot image carries one compiled device tree per supported chip revision,
//! packed back to back. This crate finds the individual fragments so each can
//! be decompiled and edited on its own, then glues them together again.
//!
//! # Blob Format
//!
//! ```text
//! +------------------------+
//! | Magic: D0 0D FE ED     | 4 bytes - fragment start
//! +------------------------+
//! | Total size             | 4 bytes - u32 big-endian, includes the magic
//! +------------------------+
//! | Rest of FDT header     | 32 bytes
//! +------------------------+
//! | Structure / strings    | Variable
//! +------------------------+
//! | Magic: D0 0D FE ED     | next fragment, no padding in between
//! | ...                    |
//! ```
//!
//! # Example
//!
//! ```
//! use pts_blob::{merge, split};
//!
//! let mut image = Vec::new();
//! for _ in 0..2 {
//!     image.extend_from_slice(&[0xD0, 0x0D, 0xFE, 0xED, 0, 0, 0, 12, 1, 2, 3, 4]);
//! }
//!
//! let fragments = split(&image);
//! assert_eq!(fragments.len(), 2);
//! assert_eq!(merge(&fragments), image);
//! ```

mod error;
mod header;
mod split;

pub use error::{BlobError, Result};
pub use header::{FDT_HEADER_LEN, FdtHeader};
pub use split::{FDT_MAGIC, SIZE_FIELD_OFFSET, fragment_ranges, merge, split};
