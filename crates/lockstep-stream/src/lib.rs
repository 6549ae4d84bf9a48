//! Lockstep Stream -- primitive byte stream protocol for simulation snapshots.
//!
//! This crate provides the lowest layer of the snapshot stack: a growable
//! [`StreamWriter`] and a borrowing [`StreamReader`] that push and pop
//! big-endian integers, booleans, raw byte blocks, length-prefixed strings,
//! variable-width sizes, and closed enumerations ([`WireEnum`]).
//!
//! The stream is an in-memory buffer; nothing here blocks or performs I/O.
//! Every pop is bounds-checked and reports a [`StreamError`] instead of
//! panicking, so a truncated or garbled snapshot surfaces as an error to the
//! caller.
//!
//! # Quick Start
//!
//! ```
//! use lockstep_stream::{StreamReader, StreamWriter};
//!
//! let mut out = StreamWriter::new();
//! out.push_u32(7);
//! out.push_bool(true);
//! out.push_var_size(300);
//! out.push_string("Santa Maria");
//!
//! let bytes = out.into_bytes();
//! let mut input = StreamReader::new(&bytes);
//! assert_eq!(input.pop_u32().unwrap(), 7);
//! assert!(input.pop_bool().unwrap());
//! assert_eq!(input.pop_var_size().unwrap(), 300);
//! assert_eq!(input.pop_string().unwrap(), "Santa Maria");
//! assert!(input.is_exhausted());
//! ```

#![deny(unsafe_code)]

pub mod reader;
pub mod writer;

pub use reader::StreamReader;
pub use writer::StreamWriter;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while popping values from a [`StreamReader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The stream ended before the requested value could be read.
    #[error("unexpected end of stream at offset {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        /// Read offset at which the pop was attempted.
        offset: usize,
        /// Number of bytes the pop required.
        needed: usize,
        /// Number of bytes still available.
        remaining: usize,
    },

    /// A decoded value lies outside its permitted range.
    #[error("{value} is out of range. Maximum allowed value: {max}")]
    OutOfRange {
        /// The raw value found in the stream.
        value: u64,
        /// The largest value accepted at this position.
        max: u64,
    },

    /// A variable-width size used more continuation bytes than a `u32` allows.
    #[error("variable-width size at offset {offset} overflows 32 bits")]
    VarSizeOverflow {
        /// Offset of the first byte of the size.
        offset: usize,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the first byte of the string payload.
        offset: usize,
    },
}

// ---------------------------------------------------------------------------
// WireEnum
// ---------------------------------------------------------------------------

/// A closed enumeration with a stable integer encoding on the wire.
///
/// Implementors map each variant to a raw discriminant and back. Decoding a
/// raw value that has no variant yields `None`, which the reader turns into
/// [`StreamError::OutOfRange`].
pub trait WireEnum: Copy {
    /// The largest raw discriminant in use.
    const MAX_RAW: u16;

    /// The raw discriminant of this variant.
    fn to_raw(self) -> u16;

    /// The variant with the given raw discriminant, if any.
    fn from_raw(raw: u16) -> Option<Self>;
}
