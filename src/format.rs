//! Compile format strings into field descriptors.
//!
//! Grammar per field: `size ":" type [":" endianness]`, with fields separated
//! by any run of space, tab, newline, or comma:
//!
//! ```text
//! size       := digits | "all" | "rest"
//! type       := "int" | "bin" | "float"
//! endianness := "default" | "big" | "little"
//! ```
//!
//! Parsing is a character-driven state machine. In streaming mode each
//! finished field is dispatched to a handler immediately; [compile] collects
//! the fields into a reusable [CompiledSpec] instead.

use crate::error::Error;
use crate::value::Value;

/// Field size as written in the format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// Bits for `int`/`float` fields, bytes for `bin` fields.
    Count(usize),
    /// The entire supplied byte string (`bin`, pack only).
    All,
    /// All remaining whole bytes of the input (`bin`, unpack only).
    Rest,
}

/// Field payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Bin,
    Float,
}

/// Byte order for integer fields. `Default` is big endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Default,
    Big,
    Little,
}

/// One parsed field of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub size: SizeSpec,
    pub kind: FieldKind,
    pub endian: Endianness,
}

/// A compiled format: an immutable field sequence reusable across unlimited
/// pack/unpack calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSpec {
    fields: Vec<FieldDescriptor>,
}

const INITIAL_FIELD_CAPACITY: usize = 32;

/// Compile a format string into a [CompiledSpec].
///
/// Only the grammar is checked here; size/type/endianness combinations are
/// validated when the spec is used, so compiling `"9:int:little"` succeeds
/// and the pack or unpack call fails.
pub fn compile(fmt: &str) -> Result<CompiledSpec, Error> {
    let mut fields = Vec::with_capacity(INITIAL_FIELD_CAPACITY);
    parse_format(fmt, |desc, _| {
        fields.push(desc);
        Ok(())
    })?;
    fields.shrink_to_fit();
    Ok(CompiledSpec { fields })
}

impl CompiledSpec {
    /// The parsed fields, in format-string order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Pack `values` per this spec. Byte-identical to [crate::pack] with the
    /// format text this spec was compiled from.
    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>, Error> {
        crate::pack::pack_compiled(self, values)
    }

    /// Unpack `input` per this spec.
    pub fn unpack(&self, input: &[u8]) -> Result<Vec<Value>, Error> {
        crate::unpack::unpack_compiled(self, input)
    }

    /// Unpack a sub-range of `input`; bounds are 1-based inclusive, negative
    /// values count from the end (`-1` is the last byte).
    pub fn unpack_range(
        &self,
        input: &[u8],
        start: i64,
        end: i64,
    ) -> Result<Vec<Value>, Error> {
        crate::unpack::unpack_compiled_range(self, input, start, end)
    }
}

/// Characters that separate fields.
const DELIMITERS: &[u8] = b", \t\n";

const PART_DELIMITER: u8 = b':';

/// Parser states. `Type` and `Endianess` carry the parts already resolved for
/// the field in progress.
#[derive(Clone, Copy)]
enum State {
    Size,
    Type { size: SizeSpec },
    Endianess { size: SizeSpec, kind: FieldKind },
    Space,
}

/// Parse `fmt`, invoking `handle` once per field with the descriptor and the
/// field's 1-based index. A handler error aborts the parse.
pub(crate) fn parse_format<F>(fmt: &str, mut handle: F) -> Result<(), Error>
where
    F: FnMut(FieldDescriptor, usize) -> Result<(), Error>,
{
    let bytes = fmt.as_bytes();
    // Allow leading delimiters.
    let mut state = State::Space;
    let mut token_start = 0usize;
    let mut field = 1usize;

    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        match state {
            State::Size => {
                if c == PART_DELIMITER && i > token_start {
                    let size = resolve_size(&fmt[token_start..i], field)?;
                    state = State::Type { size };
                    token_start = i + 1;
                } else if !c.is_ascii_alphanumeric() {
                    return Err(Error::format(
                        field,
                        format!(
                            "not a digit ('{}' at {}) where digit is expected",
                            c as char,
                            i + 1
                        ),
                    ));
                }
            }

            State::Type { size } => {
                if c == PART_DELIMITER && i > token_start {
                    let kind = resolve_kind(&fmt[token_start..i], field)?;
                    state = State::Endianess { size, kind };
                    token_start = i + 1;
                } else if DELIMITERS.contains(&c) {
                    let kind = resolve_kind(&fmt[token_start..i], field)?;
                    handle(
                        FieldDescriptor { size, kind, endian: Endianness::Default },
                        field,
                    )?;
                    field += 1;
                    state = State::Space;
                } else if !c.is_ascii_alphabetic() {
                    return Err(Error::format(
                        field,
                        format!(
                            "not a letter ('{}' at {}) where letter is expected",
                            c as char,
                            i + 1
                        ),
                    ));
                }
            }

            State::Endianess { size, kind } => {
                if DELIMITERS.contains(&c) {
                    let endian = resolve_endian(&fmt[token_start..i], field)?;
                    handle(FieldDescriptor { size, kind, endian }, field)?;
                    field += 1;
                    state = State::Space;
                } else if !c.is_ascii_alphabetic() {
                    return Err(Error::format(
                        field,
                        format!(
                            "not a letter ('{}' at {}) where letter is expected",
                            c as char,
                            i + 1
                        ),
                    ));
                }
            }

            State::Space => {
                if !DELIMITERS.contains(&c) {
                    state = State::Size;
                    token_start = i;
                    // Re-enter SIZE without consuming this character.
                    continue;
                }
            }
        }
        i += 1;
    }

    // A field may end with the input; only a dangling size is an error.
    match state {
        State::Size => Err(Error::format(field, "incomplete format string")),
        State::Type { size } => {
            let kind = resolve_kind(&fmt[token_start..], field)?;
            handle(
                FieldDescriptor { size, kind, endian: Endianness::Default },
                field,
            )
        }
        State::Endianess { size, kind } => {
            let endian = resolve_endian(&fmt[token_start..], field)?;
            handle(FieldDescriptor { size, kind, endian }, field)
        }
        State::Space => Ok(()),
    }
}

fn resolve_size(token: &str, field: usize) -> Result<SizeSpec, Error> {
    match token {
        "all" => Ok(SizeSpec::All),
        "rest" => Ok(SizeSpec::Rest),
        _ => token
            .parse::<usize>()
            .map(SizeSpec::Count)
            .map_err(|_| Error::format(field, format!("bad size token '{token}'"))),
    }
}

fn resolve_kind(token: &str, field: usize) -> Result<FieldKind, Error> {
    match token {
        "int" => Ok(FieldKind::Int),
        "bin" => Ok(FieldKind::Bin),
        "float" => Ok(FieldKind::Float),
        _ => Err(Error::format(field, format!("unexpected type token '{token}'"))),
    }
}

fn resolve_endian(token: &str, field: usize) -> Result<Endianness, Error> {
    match token {
        "default" => Ok(Endianness::Default),
        "big" => Ok(Endianness::Big),
        "little" => Ok(Endianness::Little),
        _ => Err(Error::format(
            field,
            format!("unexpected endianness token '{token}'"),
        )),
    }
}
