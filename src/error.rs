//! # Decode Failures
//!
//! Every fallible operation in this crate returns `eyre::Result`. The root
//! cause of a decode failure is always a [`GdbError`], so callers that need to
//! distinguish categories can downcast:
//!
//! ```ignore
//! match table.get_row(7) {
//!     Ok(Some(row)) => { /* present */ }
//!     Ok(None) => { /* absent row, not an error */ }
//!     Err(report) => match report.downcast_ref::<GdbError>() {
//!         Some(GdbError::Corruption { .. }) => { /* damaged file */ }
//!         _ => { /* other failure */ }
//!     },
//! }
//! ```
//!
//! ## Categories
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Format` | bad magic, out-of-range header values, truncated or overlong varints |
//! | `Corruption` | internally inconsistent structures (block map, part counts, blob length) |
//! | `Unsupported` | raster fields, curve segments, multipatch shapes |
//! | `NoSuchField` | field lookup by a name the schema does not contain |
//! | `Closed` | any operation on a closed table |
//!
//! An absent row is never an error; lookups return `Ok(None)`.

use std::fmt::Display;

use thiserror::Error;

/// Typed root cause of a failed read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GdbError {
    #[error("format violation at byte {offset}: {message}")]
    Format { offset: u64, message: String },

    #[error("corrupt data at byte {offset}: {message}")]
    Corruption { offset: u64, message: String },

    #[error("unsupported {feature} at byte {offset}")]
    Unsupported { offset: u64, feature: String },

    #[error("no such field: '{name}'")]
    NoSuchField { name: String },

    #[error("table is closed")]
    Closed,
}

impl GdbError {
    pub fn format(offset: impl TryInto<u64>, message: impl Display) -> Self {
        Self::Format {
            offset: offset.try_into().unwrap_or(u64::MAX),
            message: message.to_string(),
        }
    }

    pub fn corruption(offset: impl TryInto<u64>, message: impl Display) -> Self {
        Self::Corruption {
            offset: offset.try_into().unwrap_or(u64::MAX),
            message: message.to_string(),
        }
    }

    pub fn unsupported(offset: impl TryInto<u64>, feature: impl Display) -> Self {
        Self::Unsupported {
            offset: offset.try_into().unwrap_or(u64::MAX),
            feature: feature.to_string(),
        }
    }

    /// Byte position the failure was detected at, when one applies.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Format { offset, .. }
            | Self::Corruption { offset, .. }
            | Self::Unsupported { offset, .. } => Some(*offset),
            Self::NoSuchField { .. } | Self::Closed => None,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Finds the [`GdbError`] at the root of a report, if there is one.
pub fn root_cause(report: &eyre::Report) -> Option<&GdbError> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<GdbError>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_carries_offset() {
        let err = GdbError::format(42usize, "bad magic");

        assert_eq!(err.offset(), Some(42));
        assert!(err.is_format());
        assert_eq!(err.to_string(), "format violation at byte 42: bad magic");
    }

    #[test]
    fn lookup_errors_have_no_offset() {
        assert_eq!(GdbError::Closed.offset(), None);
        assert_eq!(
            GdbError::NoSuchField {
                name: "SHAPE".into()
            }
            .offset(),
            None
        );
    }

    #[test]
    fn root_cause_survives_context() {
        use eyre::WrapErr;

        let result: eyre::Result<()> = Err(eyre::Report::new(GdbError::corruption(
            16u64,
            "block map mismatch",
        )));
        let report = result.wrap_err("while opening index").unwrap_err();

        let cause = root_cause(&report).unwrap();
        assert!(cause.is_corruption());
        assert_eq!(cause.offset(), Some(16));
    }
}
