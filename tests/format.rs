//! Format grammar tests: compile success/failure across the state machine's
//! transitions, token resolution, and end-of-input handling.

use bitsyntax::{compile, Endianness, Error, FieldKind, SizeSpec};

#[test]
fn compile_single_field() {
    let spec = compile("8:int").expect("compile");
    assert_eq!(spec.len(), 1);
    let f = spec.fields()[0];
    assert_eq!(f.size, SizeSpec::Count(8));
    assert_eq!(f.kind, FieldKind::Int);
    assert_eq!(f.endian, Endianness::Default);
}

#[test]
fn compile_explicit_endianness() {
    let spec = compile("16:int:little").expect("compile");
    assert_eq!(spec.fields()[0].endian, Endianness::Little);
    let spec = compile("16:int:big").expect("compile");
    assert_eq!(spec.fields()[0].endian, Endianness::Big);
    let spec = compile("16:int:default").expect("compile");
    assert_eq!(spec.fields()[0].endian, Endianness::Default);
}

#[test]
fn compile_all_kinds() {
    let spec = compile("4:int, 2:bin, 32:float").expect("compile");
    let kinds: Vec<_> = spec.fields().iter().map(|f| f.kind).collect();
    assert_eq!(kinds, [FieldKind::Int, FieldKind::Bin, FieldKind::Float]);
}

#[test]
fn compile_size_sentinels() {
    let spec = compile("all:bin, rest:bin").expect("compile");
    assert_eq!(spec.fields()[0].size, SizeSpec::All);
    assert_eq!(spec.fields()[1].size, SizeSpec::Rest);
}

#[test]
fn compile_mixed_delimiters() {
    // Any run of space/tab/newline/comma separates fields.
    let spec = compile("4:int:big,8:int\t16:int:little\n2:bin  ,, 32:float")
        .expect("compile");
    assert_eq!(spec.len(), 5);
}

#[test]
fn compile_leading_and_trailing_delimiters() {
    let spec = compile("  \n,8:int,\t ").expect("compile");
    assert_eq!(spec.len(), 1);
}

#[test]
fn compile_trailing_field_without_delimiter() {
    // End of input finalizes a field in TYPE or ENDIANESS state.
    let spec = compile("8:int:big, 4:int").expect("compile");
    assert_eq!(spec.len(), 2);
    assert_eq!(spec.fields()[1].size, SizeSpec::Count(4));
    let spec = compile("8:int:little").expect("compile");
    assert_eq!(spec.fields()[0].endian, Endianness::Little);
}

#[test]
fn compile_empty_spec() {
    // A zero-field spec is legal; so is a delimiter-only one.
    assert!(compile("").expect("compile").is_empty());
    assert!(compile(" \t\n,,").expect("compile").is_empty());
}

#[test]
fn compile_reports_incomplete_field() {
    // End of input in SIZE state: a field was started but never typed.
    let err = compile("8").unwrap_err();
    assert!(matches!(err, Error::Format { field: 1, .. }), "{err}");
    let err = compile("8:int, 9").unwrap_err();
    assert_eq!(err.field(), Some(2));
}

#[test]
fn compile_rejects_bad_size_char() {
    let err = compile("-8:int").unwrap_err();
    assert!(err.to_string().contains("not a digit"), "{err}");
    let err = compile(":int").unwrap_err();
    assert!(err.to_string().contains("not a digit"), "{err}");
}

#[test]
fn compile_rejects_bad_size_token() {
    // Alphanumeric but not digits / all / rest.
    let err = compile("8a:int").unwrap_err();
    assert!(err.to_string().contains("bad size token"), "{err}");
    let err = compile("alle:bin").unwrap_err();
    assert!(err.to_string().contains("bad size token"), "{err}");
}

#[test]
fn compile_rejects_unknown_type() {
    let err = compile("8:integer").unwrap_err();
    assert!(err.to_string().contains("unexpected type token"), "{err}");
    // Empty type: "8:" ends the input in TYPE state with nothing parsed.
    let err = compile("8:").unwrap_err();
    assert!(matches!(err, Error::Format { field: 1, .. }), "{err}");
}

#[test]
fn compile_rejects_unknown_endianness() {
    let err = compile("8:int:medium").unwrap_err();
    assert!(
        err.to_string().contains("unexpected endianness token"),
        "{err}"
    );
    let err = compile("8:int:").unwrap_err();
    assert!(matches!(err, Error::Format { field: 1, .. }), "{err}");
}

#[test]
fn compile_rejects_bad_type_char() {
    // ';' is neither ':', a delimiter, nor a letter.
    let err = compile("8:int;9:int").unwrap_err();
    assert!(err.to_string().contains("not a letter"), "{err}");
}

#[test]
fn compile_does_not_validate_combinations() {
    // Size/endianness combinations are checked by pack/unpack, not here.
    assert!(compile("9:int:little").is_ok());
    assert!(compile("0:int").is_ok());
    assert!(compile("32:float:big").is_ok());
    assert!(compile("all:int").is_ok());
}

#[test]
fn compile_field_indexes_count_from_one() {
    let err = compile("8:int, 16:int, 8:wat").unwrap_err();
    assert_eq!(err.field(), Some(3));
}

#[test]
fn compiled_spec_is_reusable_and_comparable() {
    let a = compile("4:int, rest:bin").expect("compile");
    let b = compile("4:int,rest:bin").expect("compile");
    assert_eq!(a, b);
    assert_eq!(a.fields(), b.fields());
}
