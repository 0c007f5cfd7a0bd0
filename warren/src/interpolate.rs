// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${key}` / `${key|filter}` string interpolation, per §6 of the build description contract.
//!
//! Interpolation is resolved against a small key/value lookup supplied by the caller -- either a
//! target's `env_local` (for configuration option strings) or its own just-produced outputs (for
//! its `using` delta, which is allowed to reference them).

use crate::errors::Error;

/// Expands every `${key}` or `${key|filter}` expression in `template`.
///
/// `resolve` maps a bare key name to its string form; returns `None` for an unknown key, which
/// is surfaced as a [`DescriptionEvaluationError`](Error::DescriptionEvaluationError).
pub fn interpolate(
    template: &str,
    field: &str,
    resolve: impl Fn(&str) -> Option<String>,
) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| Error::DescriptionEvaluationError {
            file: field.into(),
            diagnostic: format!("unterminated interpolation in {:?}", template),
        })?;
        let expr = &after[..end];
        let (key, filter) = match expr.split_once('|') {
            Some((k, f)) => (k, Some(f)),
            None => (expr, None),
        };
        let value = resolve(key).ok_or_else(|| Error::DescriptionEvaluationError {
            file: field.into(),
            diagnostic: format!("unknown interpolation key {:?} in {:?}", key, template),
        })?;
        out.push_str(&apply_filter(&value, filter, field, template)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Returns true if `text` contains a `${...}` interpolation expression.
pub fn contains_interpolation(text: &str) -> bool {
    text.contains("${")
}

/// Rejects any string meant to stay structural (target names, package paths, key names) that
/// contains an interpolation expression.
pub fn reject_structural(field: &str, text: &str) -> Result<(), Error> {
    if contains_interpolation(text) {
        Err(Error::InterpolationInStructural { field: field.to_string(), text: text.to_string() })
    } else {
        Ok(())
    }
}

fn apply_filter(value: &str, filter: Option<&str>, field: &str, template: &str) -> Result<String, Error> {
    match filter {
        None => Ok(value.to_string()),
        Some("basename") => Ok(value.rsplit('/').next().unwrap_or(value).to_string()),
        Some("dirname") => Ok(match value.rsplit_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => String::new(),
        }),
        Some("upper") => Ok(value.to_uppercase()),
        Some("lower") => Ok(value.to_lowercase()),
        Some(other) => Err(Error::DescriptionEvaluationError {
            file: field.into(),
            diagnostic: format!("unknown interpolation filter {:?} in {:?}", other, template),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_bare_key() {
        let out = interpolate("flag=${opt}", "local.flag", |k| (k == "opt").then(|| "O2".to_string())).unwrap();
        assert_eq!(out, "flag=O2");
    }

    #[test]
    fn applies_known_filter() {
        let out = interpolate("${path|basename}", "x", |_| Some("a/b/c.txt".to_string())).unwrap();
        assert_eq!(out, "c.txt");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = interpolate("${missing}", "x", |_| None).unwrap_err();
        assert!(matches!(err, Error::DescriptionEvaluationError { .. }));
    }

    #[test]
    fn structural_rejection_flags_interpolation() {
        assert!(reject_structural("target name", "plain").is_ok());
        let err = reject_structural("target name", "na${me}").unwrap_err();
        assert!(matches!(err, Error::InterpolationInStructural { .. }));
    }
}
