//! Pack, unpack, and dump binary data from the command line.
//!
//! Usage:
//!   bitsyntax pack <format> <value>...        print packed bytes as a hexstream
//!   bitsyntax pack --raw <format> <value>...  write raw bytes to stdout
//!   bitsyntax unpack <format> [hexstream]     unpack the argument, or raw stdin
//!   bitsyntax unpack --start N --end N ...    select a 1-based sub-range first
//!   bitsyntax dump [hexstream]                hexdump of the argument, or raw stdin
//!
//! Int values accept decimal or `0x` hex, bin values are hexstreams, float
//! values are decimal.

use anyhow::{bail, Context, Result};
use bitsyntax::{compile, from_hexstream, hexdump, hexstream, FieldKind, Value};
use std::io::{self, Read, Write};

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: bitsyntax <pack|unpack|dump> ...");
    }
    let command = args.remove(0);
    match command.as_str() {
        "pack" => cmd_pack(args),
        "unpack" => cmd_unpack(args),
        "dump" => cmd_dump(args),
        other => bail!("unknown command '{other}' (expected pack, unpack, or dump)"),
    }
}

fn cmd_pack(mut args: Vec<String>) -> Result<()> {
    let raw = take_flag(&mut args, "--raw");
    if args.is_empty() {
        bail!("usage: bitsyntax pack [--raw] <format> <value>...");
    }
    let format = args.remove(0);
    let spec = compile(&format)?;
    if args.len() != spec.len() {
        bail!(
            "format has {} field(s) but {} value(s) were given",
            spec.len(),
            args.len()
        );
    }
    let values = spec
        .fields()
        .iter()
        .zip(&args)
        .enumerate()
        .map(|(i, (field, arg))| {
            parse_value(field.kind, arg).with_context(|| format!("value {}", i + 1))
        })
        .collect::<Result<Vec<Value>>>()?;
    let bytes = spec.pack(&values)?;
    if raw {
        io::stdout().write_all(&bytes)?;
    } else {
        println!("{}", hexstream(&bytes));
    }
    Ok(())
}

fn cmd_unpack(mut args: Vec<String>) -> Result<()> {
    let start = take_value(&mut args, "--start")?;
    let end = take_value(&mut args, "--end")?;
    if args.is_empty() {
        bail!("usage: bitsyntax unpack [--start N] [--end N] <format> [hexstream]");
    }
    let format = args.remove(0);
    let input = read_input(args.first().map(String::as_str))?;
    let values = if start.is_none() && end.is_none() {
        bitsyntax::unpack(&format, &input)?
    } else {
        bitsyntax::unpack_range(&format, &input, start.unwrap_or(1), end.unwrap_or(-1))?
    };
    for value in &values {
        match value {
            Value::Int(x) => println!("{x} (0x{x:x})"),
            Value::Bytes(b) => println!("{}", hexstream(b)),
            Value::Float(x) => println!("{x}"),
            Value::Double(x) => println!("{x}"),
        }
    }
    Ok(())
}

fn cmd_dump(args: Vec<String>) -> Result<()> {
    let input = read_input(args.first().map(String::as_str))?;
    print!("{}", hexdump(&input));
    Ok(())
}

fn parse_value(kind: FieldKind, arg: &str) -> Result<Value> {
    match kind {
        FieldKind::Int => {
            let parsed = if let Some(hex) =
                arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X"))
            {
                u64::from_str_radix(hex, 16)
            } else {
                arg.parse::<u64>()
            };
            Ok(Value::Int(
                parsed.with_context(|| format!("'{arg}' is not an integer"))?,
            ))
        }
        FieldKind::Bin => Ok(Value::Bytes(from_hexstream(arg)?)),
        FieldKind::Float => Ok(Value::Double(
            arg.parse::<f64>()
                .with_context(|| format!("'{arg}' is not a number"))?,
        )),
    }
}

/// Hexstream argument if given, raw stdin otherwise.
fn read_input(arg: Option<&str>) -> Result<Vec<u8>> {
    match arg {
        Some(s) => Ok(from_hexstream(s.trim())?),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == name) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn take_value(args: &mut Vec<String>, name: &str) -> Result<Option<i64>> {
    if let Some(pos) = args.iter().position(|a| a == name) {
        if pos + 1 >= args.len() {
            bail!("{name} requires a value");
        }
        let raw = args.remove(pos + 1);
        args.remove(pos);
        let value = raw
            .parse::<i64>()
            .with_context(|| format!("{name}: '{raw}' is not an integer"))?;
        Ok(Some(value))
    } else {
        Ok(None)
    }
}
