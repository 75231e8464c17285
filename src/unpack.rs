//! Unpack values from a byte buffer at arbitrary bit offsets.
//!
//! Byte-aligned integer fields copy their span directly; everything else
//! assembles the covering bytes right-aligned by shifting and OR-ing across
//! byte bounds, reinterprets per endianness, then masks off the high bits
//! that belong to fields not read yet. Binary and float extraction reuse the
//! byte-wise integer path, mirroring the packer's unaligned fallback.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::bits::{bits_to_bytes, mask_to, WORD_BITS};
use crate::error::Error;
use crate::format::{
    parse_format, CompiledSpec, Endianness, FieldDescriptor, FieldKind, SizeSpec,
};
use crate::value::Value;

/// Unpack `input` per the format string, parsing and dispatching one field at
/// a time (streaming mode). Decoded values are returned in field order.
pub fn unpack(fmt: &str, input: &[u8]) -> Result<Vec<Value>, Error> {
    let mut state = UnpackState::new(input);
    let mut out = Vec::new();
    parse_format(fmt, |desc, field| {
        let v = unpack_field(desc, field, &mut state)?;
        out.push(v);
        Ok(())
    })?;
    Ok(out)
}

/// Unpack a sub-range of `input`. Bounds are 1-based inclusive; negative
/// values count from the end (`-1` is the last byte).
pub fn unpack_range(
    fmt: &str,
    input: &[u8],
    start: i64,
    end: i64,
) -> Result<Vec<Value>, Error> {
    let (from, to) = resolve_range(input.len(), start, end)?;
    unpack(fmt, &input[from..to])
}

pub(crate) fn unpack_compiled(
    spec: &CompiledSpec,
    input: &[u8],
) -> Result<Vec<Value>, Error> {
    let mut state = UnpackState::new(input);
    let mut out = Vec::with_capacity(spec.len());
    for (i, desc) in spec.fields().iter().enumerate() {
        out.push(unpack_field(*desc, i + 1, &mut state)?);
    }
    Ok(out)
}

pub(crate) fn unpack_compiled_range(
    spec: &CompiledSpec,
    input: &[u8],
    start: i64,
    end: i64,
) -> Result<Vec<Value>, Error> {
    let (from, to) = resolve_range(input.len(), start, end)?;
    unpack_compiled(spec, &input[from..to])
}

/// Resolve 1-based, possibly negative bounds to a byte offset range.
fn resolve_range(len: usize, start: i64, end: i64) -> Result<(usize, usize), Error> {
    let resolve = |pos: i64| if pos < 0 { len as i64 + pos + 1 } else { pos };
    let s = resolve(start);
    let e = resolve(end);
    if s < 1 || e > len as i64 || s >= e {
        return Err(Error::Range { start, end });
    }
    Ok(((s - 1) as usize, e as usize))
}

fn unpack_field(
    desc: FieldDescriptor,
    field: usize,
    state: &mut UnpackState<'_>,
) -> Result<Value, Error> {
    match desc.kind {
        FieldKind::Int => {
            let size = match desc.size {
                SizeSpec::Count(n) => n,
                SizeSpec::All | SizeSpec::Rest => {
                    return Err(Error::format(
                        field,
                        "'all'/'rest' sizes apply to binary fields only",
                    ));
                }
            };
            Ok(Value::Int(state.take_int(size, desc.endian, field)?))
        }
        FieldKind::Bin => unpack_bin(desc, field, state),
        FieldKind::Float => unpack_float(desc, field, state),
    }
}

fn unpack_bin(
    desc: FieldDescriptor,
    field: usize,
    state: &mut UnpackState<'_>,
) -> Result<Value, Error> {
    let len = match desc.size {
        SizeSpec::All => {
            return Err(Error::format(field, "'all' size is only valid when packing"));
        }
        SizeSpec::Rest => {
            if state.bit_pos % 8 != 0 {
                return Err(Error::format(
                    field,
                    "'rest' requires a byte aligned position",
                ));
            }
            state.bits_left / 8
        }
        SizeSpec::Count(0) => {
            return Err(Error::size(field, "size must be greater than 0"));
        }
        SizeSpec::Count(n) => {
            if n > state.bits_left / 8 {
                return Err(Error::size(
                    field,
                    format!(
                        "size {n} bytes exceeds the remaining input ({} bytes)",
                        state.bits_left / 8
                    ),
                ));
            }
            n
        }
    };
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        // 8-bit big endian per byte, mirroring the packer's unaligned path.
        bytes.push(state.take_int(8, Endianness::Big, field)? as u8);
    }
    Ok(Value::Bytes(bytes))
}

fn unpack_float(
    desc: FieldDescriptor,
    field: usize,
    state: &mut UnpackState<'_>,
) -> Result<Value, Error> {
    let size = match desc.size {
        SizeSpec::Count(n) => n,
        SizeSpec::All | SizeSpec::Rest => {
            return Err(Error::format(
                field,
                "'all'/'rest' sizes apply to binary fields only",
            ));
        }
    };
    if desc.endian != Endianness::Default {
        return Err(Error::format(field, "unsupported endianness for float"));
    }
    if size > state.bits_left {
        return Err(Error::size(
            field,
            format!(
                "size {size} bits exceeds the remaining input ({} bits)",
                state.bits_left
            ),
        ));
    }
    match size {
        32 => {
            let mut b = [0u8; 4];
            for slot in &mut b {
                *slot = state.take_int(8, Endianness::Big, field)? as u8;
            }
            Ok(Value::Float(f32::from_ne_bytes(b)))
        }
        64 => {
            let mut b = [0u8; 8];
            for slot in &mut b {
                *slot = state.take_int(8, Endianness::Big, field)? as u8;
            }
            Ok(Value::Double(f64::from_ne_bytes(b)))
        }
        0 => Err(Error::size(field, "size must be greater than 0")),
        _ => Err(Error::size(
            field,
            format!("unsupported float size {size}; must be 32 or 64 bits"),
        )),
    }
}

/// Borrowed input with a running bit cursor and remaining-bit count.
///
/// Invariant: `bit_pos + bits_left == 8 * source.len()`.
struct UnpackState<'a> {
    source: &'a [u8],
    bit_pos: usize,
    bits_left: usize,
}

impl<'a> UnpackState<'a> {
    fn new(source: &'a [u8]) -> Self {
        UnpackState { source, bit_pos: 0, bits_left: source.len() * 8 }
    }

    /// Read `size` bits at the cursor as an integer in the given endianness.
    fn take_int(
        &mut self,
        size: usize,
        endian: Endianness,
        field: usize,
    ) -> Result<u64, Error> {
        if size == 0 {
            return Err(Error::size(field, "size must be greater than 0"));
        }
        if size > WORD_BITS {
            return Err(Error::size(
                field,
                format!("size {size} bits exceeds the integer width ({WORD_BITS} bits)"),
            ));
        }
        if size > self.bits_left {
            return Err(Error::size(
                field,
                format!(
                    "size {size} bits exceeds the remaining input ({} bits)",
                    self.bits_left
                ),
            ));
        }
        if endian == Endianness::Little && size % 8 != 0 {
            return Err(Error::format(
                field,
                "little endian is supported on 8 bit bounds only",
            ));
        }

        let value = if self.bit_pos % 8 == 0 && size % 8 == 0 {
            let start = self.bit_pos / 8;
            read_endian(&self.source[start..start + size / 8], endian)
        } else {
            let count_bytes = bits_to_bytes(size);
            let mut buf = [0u8; 8];
            self.extract(size, &mut buf[..count_bytes]);
            // The top byte may still hold bits from before the cursor; they
            // belong to already-read fields and must not leak.
            mask_to(read_endian(&buf[..count_bytes], endian), size)
        };
        self.bit_pos += size;
        self.bits_left -= size;
        Ok(value)
    }

    /// Assemble the `size` bits at the cursor into `buf`, right-aligned, in
    /// stream byte order, shifting and OR-ing across byte bounds.
    fn extract(&self, size: usize, buf: &mut [u8]) {
        let end_bit = self.bit_pos + size;
        let right = (8 - end_bit % 8) % 8;
        let mut src_idx = (end_bit - 1) / 8;
        for k in (0..buf.len()).rev() {
            let mut b = self.source[src_idx] >> right;
            if right != 0 && src_idx > 0 {
                b |= self.source[src_idx - 1] << (8 - right);
            }
            buf[k] = b;
            if src_idx == 0 {
                break;
            }
            src_idx -= 1;
        }
    }
}

fn read_endian(span: &[u8], endian: Endianness) -> u64 {
    match endian {
        Endianness::Default | Endianness::Big => BigEndian::read_uint(span, span.len()),
        Endianness::Little => LittleEndian::read_uint(span, span.len()),
    }
}
