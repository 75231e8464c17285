//! Pack values into a byte buffer at arbitrary bit offsets.
//!
//! Integers are first rendered to `ceil(size/8)` bytes in the requested
//! endianness, then merged into the output at the current bit offset. The
//! merge splits into four alignment cases keyed on the output bit offset and
//! the value's bit overhang; binary strings take a direct-copy fast path when
//! the cursor is byte aligned and otherwise reuse the integer merge one byte
//! at a time, which keeps unaligned pack and unpack exactly symmetric.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::bits::{bits_to_bytes, mask_to, WORD_BITS};
use crate::error::Error;
use crate::format::{
    parse_format, CompiledSpec, Endianness, FieldDescriptor, FieldKind, SizeSpec,
};
use crate::value::Value;

/// Pack `values` per the format string, parsing and dispatching one field at
/// a time (streaming mode).
pub fn pack(fmt: &str, values: &[Value]) -> Result<Vec<u8>, Error> {
    let mut out = PackBuf::new();
    let mut values = ValueReader::new(values);
    parse_format(fmt, |desc, field| {
        pack_field(desc, field, &mut values, &mut out)
    })?;
    Ok(out.into_bytes())
}

/// Pack `values` by replaying a compiled spec. Byte-identical to [pack] with
/// the format text the spec was compiled from.
pub(crate) fn pack_compiled(
    spec: &CompiledSpec,
    values: &[Value],
) -> Result<Vec<u8>, Error> {
    let mut out = PackBuf::new();
    let mut values = ValueReader::new(values);
    for (i, desc) in spec.fields().iter().enumerate() {
        pack_field(*desc, i + 1, &mut values, &mut out)?;
    }
    Ok(out.into_bytes())
}

/// Pull-style accessor handing out values in strict field order.
struct ValueReader<'a> {
    values: std::slice::Iter<'a, Value>,
}

impl<'a> ValueReader<'a> {
    fn new(values: &'a [Value]) -> Self {
        ValueReader { values: values.iter() }
    }

    fn next(&mut self, field: usize) -> Result<&'a Value, Error> {
        self.values
            .next()
            .ok_or_else(|| Error::argument(field, "missing value"))
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Int(_) => "int",
        Value::Bytes(_) => "bin",
        Value::Float(_) | Value::Double(_) => "float",
    }
}

fn pack_field(
    desc: FieldDescriptor,
    field: usize,
    values: &mut ValueReader<'_>,
    out: &mut PackBuf,
) -> Result<(), Error> {
    if desc.size == SizeSpec::Count(0) {
        return Err(Error::size(field, "size must be greater than 0"));
    }
    match desc.kind {
        FieldKind::Int => pack_int(desc, field, values, out),
        FieldKind::Bin => pack_bin(desc, field, values, out),
        FieldKind::Float => pack_float(desc, field, values, out),
    }
}

fn pack_int(
    desc: FieldDescriptor,
    field: usize,
    values: &mut ValueReader<'_>,
    out: &mut PackBuf,
) -> Result<(), Error> {
    let size = match desc.size {
        SizeSpec::Count(n) => n,
        SizeSpec::All | SizeSpec::Rest => {
            return Err(Error::format(
                field,
                "'all'/'rest' sizes apply to binary fields only",
            ));
        }
    };
    if size > WORD_BITS {
        return Err(Error::size(
            field,
            format!("size {size} bits exceeds the integer width ({WORD_BITS} bits)"),
        ));
    }
    let value = match values.next(field)? {
        Value::Int(x) => *x,
        other => {
            return Err(Error::argument(
                field,
                format!("expected an int value, got {}", value_kind(other)),
            ));
        }
    };
    out.push_int(value, size, desc.endian, field)
}

fn pack_bin(
    desc: FieldDescriptor,
    field: usize,
    values: &mut ValueReader<'_>,
    out: &mut PackBuf,
) -> Result<(), Error> {
    let data = match values.next(field)? {
        Value::Bytes(b) => b.as_slice(),
        other => {
            return Err(Error::argument(
                field,
                format!("expected a bin value, got {}", value_kind(other)),
            ));
        }
    };
    let len = match desc.size {
        SizeSpec::All => data.len(),
        SizeSpec::Rest => {
            return Err(Error::format(field, "'rest' size is only valid when unpacking"));
        }
        SizeSpec::Count(n) => {
            if n > data.len() {
                return Err(Error::size(
                    field,
                    format!(
                        "size {n} bytes exceeds the length of the input string ({} bytes)",
                        data.len()
                    ),
                ));
            }
            n
        }
    };
    out.push_bytes(&data[..len]);
    Ok(())
}

fn pack_float(
    desc: FieldDescriptor,
    field: usize,
    values: &mut ValueReader<'_>,
    out: &mut PackBuf,
) -> Result<(), Error> {
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
    let value = values.next(field)?;
    // Raw IEEE-754 bytes in host order, through the binary path.
    match size {
        32 => {
            let x = match value {
                Value::Float(x) => *x,
                Value::Double(x) => *x as f32,
                other => {
                    return Err(Error::argument(
                        field,
                        format!("expected a float value, got {}", value_kind(other)),
                    ));
                }
            };
            out.push_bytes(&x.to_ne_bytes());
        }
        64 => {
            let x = match value {
                Value::Float(x) => *x as f64,
                Value::Double(x) => *x,
                other => {
                    return Err(Error::argument(
                        field,
                        format!("expected a float value, got {}", value_kind(other)),
                    ));
                }
            };
            out.push_bytes(&x.to_ne_bytes());
        }
        _ => {
            return Err(Error::size(
                field,
                format!("unsupported float size {size}; must be 32 or 64 bits"),
            ));
        }
    }
    Ok(())
}

/// Growable output buffer with a running bit cursor.
///
/// Invariant: `bytes.len() == bits_to_bytes(bit_pos)` after every push, so a
/// trailing bit-unaligned field leaves a zero-padded partial byte in place.
struct PackBuf {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl PackBuf {
    fn new() -> Self {
        PackBuf { bytes: Vec::new(), bit_pos: 0 }
    }

    /// Merge the low `size` bits of `value` at the current cursor. Bits above
    /// `size` are discarded, not an error.
    fn push_int(
        &mut self,
        value: u64,
        size: usize,
        endian: Endianness,
        field: usize,
    ) -> Result<(), Error> {
        // A little endian value of incomplete bytes would change meaning when
        // reread at a different byte width.
        if endian == Endianness::Little && size % 8 != 0 {
            return Err(Error::format(
                field,
                "little endian is supported on 8 bit bounds only",
            ));
        }
        let count_bytes = bits_to_bytes(size);
        let mut val = [0u8; 8];
        let masked = mask_to(value, size);
        match endian {
            Endianness::Default | Endianness::Big => {
                BigEndian::write_uint(&mut val[..count_bytes], masked, count_bytes)
            }
            Endianness::Little => {
                LittleEndian::write_uint(&mut val[..count_bytes], masked, count_bytes)
            }
        }
        self.merge(&val[..count_bytes], size);
        Ok(())
    }

    /// Append a byte string: straight copy when the cursor is byte aligned,
    /// otherwise one 8-bit big endian merge per byte.
    fn push_bytes(&mut self, data: &[u8]) {
        if self.bit_pos % 8 == 0 {
            self.bytes.extend_from_slice(data);
            self.bit_pos += data.len() * 8;
        } else {
            for &b in data {
                self.merge(&[b], 8);
            }
        }
    }

    /// Merge `val` (the value's `ceil(size/8)` bytes, right-aligned within
    /// them) into the buffer at the current bit cursor.
    fn merge(&mut self, val: &[u8], size: usize) {
        let count_bytes = val.len();
        let bit_offset = self.bit_pos % 8;
        let src_offset = size % 8;
        let start = self.bit_pos / 8;
        // Zero-filled growth to exactly the bytes this field touches.
        self.bytes.resize(bits_to_bytes(self.bit_pos + size), 0);
        let out = &mut self.bytes[start..];

        if bit_offset == 0 && src_offset == 0 {
            out[..count_bytes].copy_from_slice(val);
        } else if bit_offset == 0 {
            // Output aligned, value overhangs a byte bound: shift the
            // right-aligned value left so its top bit lands on the bound.
            let up = 8 - src_offset;
            for i in 0..count_bytes - 1 {
                out[i] = (val[i] << up) | (val[i + 1] >> src_offset);
            }
            out[count_bytes - 1] = val[count_bytes - 1] << up;
        } else if src_offset == 0 {
            // Output mid-byte, whole-byte value: shift right, carrying the
            // spill into the following byte.
            let mut carry = 0u8;
            for i in 0..count_bytes {
                out[i] |= (val[i] >> bit_offset) | carry;
                carry = val[i] << (8 - bit_offset);
            }
            out[count_bytes] |= carry;
        } else {
            // Neither aligned. Both offsets are in 1..=7, so the gap between
            // the output offset and the value's top bits is in -6..=6; its
            // sign picks the shift direction.
            let gap = 8i32 - bit_offset as i32 - src_offset as i32;
            if gap < 0 {
                let down = (-gap) as usize;
                let mut carry = 0u8;
                for i in 0..count_bytes {
                    out[i] |= (val[i] >> down) | carry;
                    carry = val[i] << (8 - down);
                }
                out[count_bytes] |= carry;
            } else if gap > 0 {
                let up = gap as usize;
                for i in 0..count_bytes - 1 {
                    out[i] |= (val[i] << up) | (val[i + 1] >> (8 - up));
                }
                out[count_bytes - 1] |= val[count_bytes - 1] << up;
            } else {
                for i in 0..count_bytes {
                    out[i] |= val[i];
                }
            }
        }
        self.bit_pos += size;
    }

    fn into_bytes(self) -> Vec<u8> {
        debug_assert_eq!(self.bytes.len(), bits_to_bytes(self.bit_pos));
        self.bytes
    }
}
