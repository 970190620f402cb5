//! # Internal Macros
//!
//! ## zerocopy_getters!
//!
//! Generates read-only accessors for zerocopy struct fields stored as
//! little-endian wrapper types (`I32`, `U32`). The on-disk headers are never
//! written by this crate, so no setters are generated.
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::little_endian::{I32, U32};
//!
//! #[repr(C)]
//! struct Header {
//!     row_count: I32,
//!     bit_count: U32,
//! }
//!
//! impl Header {
//!     zerocopy_getters! {
//!         row_count: i32,
//!         bit_count: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn row_count(&self) -> i32 { self.row_count.get() }
//! // pub fn bit_count(&self) -> u32 { self.bit_count.get() }
//! ```

/// Generates getter methods for zerocopy little-endian fields.
#[macro_export]
macro_rules! zerocopy_getters {
    ($($field:ident : $native_ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $field(&self) -> $native_ty {
                self.$field.get()
            }
        )*
    };
}
