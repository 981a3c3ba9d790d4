//! Minimal CLI error type, matching the teacher's `cooperative/src/util/cli_args.rs`
//! shape (`CliErr(&'static str)` implementing `std::error::Error`) instead of
//! pulling in `clap`/`thiserror` — absent from the whole teacher dependency tree.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub struct CliErr(pub &'static str);

impl fmt::Display for CliErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for CliErr {}

/// Parse the next positional argument, failing loudly (named, per §7 config
/// errors) if it is missing or doesn't parse as `T`.
pub fn parse_arg_required<T: FromStr>(
    args: &mut impl Iterator<Item = String>,
    field_name: &'static str,
) -> Result<T, Box<dyn Error>> {
    match args.next() {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| -> Box<dyn Error> { Box::new(CliErr("invalid argument value")) }),
        None => {
            eprintln!("missing value for argument `{field_name}`");
            Err(Box::new(CliErr("missing required argument")))
        }
    }
}

/// Parse the next positional argument if present, falling back to `default`
/// (and silently keeping it on a parse failure — matches the teacher's
/// `parse_arg_optional`).
pub fn parse_arg_optional<T: FromStr + Clone>(args: &mut impl Iterator<Item = String>, default: T) -> T {
    args.next().map(|s| T::from_str(&s).unwrap_or_else(|_| default.clone())).unwrap_or(default)
}

/// Parse a `--flag value` pair out of a positional argument stream, matching
/// on the flag name and delegating to `parse_arg_required`/`parse_arg_optional`
/// for the value (§6: "flags positional in the source; specified as named
/// here").
pub fn take_flag_value<T: FromStr>(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<T, Box<dyn Error>> {
    parse_arg_required(args, flag)
}
