//! # bitsyntax — bit-level pack/unpack driven by a format string
//!
//! Encodes an ordered sequence of typed values (integers, byte strings,
//! IEEE-754 floats) into a byte buffer at arbitrary, not necessarily byte
//! aligned bit offsets, and decodes such a buffer back into values, driven
//! by a compact textual format language.
//!
//! ## Format language
//!
//! Fields are separated by any run of space, tab, newline, or comma:
//!
//! ```text
//! field      := size ":" type [":" endianness]
//! size       := digits | "all" | "rest"
//! type       := "int" | "bin" | "float"
//! endianness := "default" | "big" | "little"
//! ```
//!
//! `size` is in bits for `int`/`float` and in bytes for `bin`. `all` packs
//! the whole supplied byte string; `rest` unpacks every remaining whole
//! byte. The default endianness is big; little endian is only allowed for
//! whole-byte integer sizes.
//!
//! ## Usage
//!
//! ```
//! use bitsyntax::{compile, pack, unpack, Value};
//!
//! // Two nibbles share one byte.
//! let bytes = pack("4:int:big, 4:int:big", &[Value::Int(0xA), Value::Int(0xB)])?;
//! assert_eq!(bytes, [0xAB]);
//!
//! // A precompiled spec replays without re-parsing.
//! let spec = compile("9:int:big")?;
//! let bytes = spec.pack(&[Value::Int(0x1FF)])?;
//! assert_eq!(bytes, [0xFF, 0x80]);
//! assert_eq!(spec.unpack(&bytes)?, [Value::Int(0x1FF)]);
//!
//! let values = unpack("8:int, 8:int", &[0x12, 0x34])?;
//! assert_eq!(values, [Value::Int(0x12), Value::Int(0x34)]);
//! # Ok::<(), bitsyntax::Error>(())
//! ```
//!
//! Packing and unpacking are exact inverses: for any spec and in-range
//! values, `unpack(spec, pack(spec, values))` returns the same values, across
//! all types, endiannesses, and bit-unaligned sizes.

pub mod bits;
pub mod error;
pub mod format;
pub mod hex;
pub mod pack;
pub mod unpack;
pub mod value;

pub use bits::WORD_BITS;
pub use error::Error;
pub use format::{
    compile, CompiledSpec, Endianness, FieldDescriptor, FieldKind, SizeSpec,
};
pub use hex::{from_hexstream, hexdump, hexstream};
pub use pack::pack;
pub use unpack::{unpack, unpack_range};
pub use value::Value;
