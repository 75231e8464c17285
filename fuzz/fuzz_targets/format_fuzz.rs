//! Format compiler fuzz target: feed arbitrary bytes to `compile`.
//! The compiler must not panic; it returns Ok(CompiledSpec) or Err(Error).
//! Build with: cargo fuzz run format_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = bitsyntax::compile(s);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run format_fuzz");
}
