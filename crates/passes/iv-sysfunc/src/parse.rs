//! Reader for system function table files
//!
//! One record per line:
//!
//! ```text
//! # comment
//! $random_real    vpiSysFuncReal
//! $countones      vpiSysFuncInt
//! $clog2          vpiSysFuncSized 32 signed
//! $finish_code    vpiSysFuncVoid
//! ```
//!
//! `vpiSysFuncSized` takes a width and an optional comma-separated list of
//! `signed`/`unsigned` flags, the last of which wins.

use crate::error::{MalformedKind, SysFuncTableError};
use crate::{REAL_RETURN, ReturnType, SysFuncSignature, VariableType};
use std::path::Path;

/// Parses a whole table, stopping at the first malformed record
///
/// `integer_width` is the width given to `vpiSysFuncInt` functions.
///
/// # Errors
///
/// Returns `SysFuncTableError::Malformed` naming the first bad line.
pub fn parse_table(
    source: &str,
    origin: &Path,
    integer_width: u32,
) -> Result<Vec<SysFuncSignature>, SysFuncTableError> {
    let mut entries = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let signature =
            parse_record(text, integer_width).map_err(|kind| SysFuncTableError::Malformed {
                path: origin.to_path_buf(),
                line: idx + 1,
                kind,
                text: text.to_owned(),
            })?;
        entries.push(signature);
    }

    Ok(entries)
}

fn parse_record(text: &str, integer_width: u32) -> Result<SysFuncSignature, MalformedKind> {
    let mut words = text.split_whitespace();
    // `text` is non-empty after trimming, so there is always a first word
    let name = words.next().unwrap_or_default();
    if !name.starts_with('$') || name.len() < 2 {
        return Err(MalformedKind::NotASystemName);
    }

    let kind = words.next().ok_or(MalformedKind::MissingType)?;
    let ret = match kind {
        "vpiSysFuncReal" => REAL_RETURN,
        "vpiSysFuncInt" => ReturnType::new(VariableType::Logic, integer_width, true),
        "vpiSysFuncVoid" => ReturnType::new(VariableType::Void, 0, false),
        "vpiSysFuncSized" => {
            let width = words.next().ok_or(MalformedKind::MissingWidth)?;
            let width = match width.parse::<u32>() {
                Ok(width) if width > 0 => width,
                _ => return Err(MalformedKind::InvalidWidth(width.to_owned())),
            };
            let flags = words.by_ref().collect::<Vec<_>>().join("");
            ReturnType::new(VariableType::Logic, width, parse_signed_flags(&flags)?)
        }
        other => return Err(MalformedKind::UnknownType(other.to_owned())),
    };

    if let Some(extra) = words.next() {
        return Err(MalformedKind::UnexpectedArgument(extra.to_owned()));
    }

    Ok(SysFuncSignature::new(name, ret))
}

fn parse_signed_flags(flags: &str) -> Result<bool, MalformedKind> {
    let mut signed = false;
    for flag in flags.split(',').filter(|flag| !flag.is_empty()) {
        signed = match flag {
            "signed" => true,
            "unsigned" => false,
            other => return Err(MalformedKind::UnknownFlag(other.to_owned())),
        };
    }
    Ok(signed)
}
