// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing and canonicalization of target and product references.
//!
//! Three textual forms resolve to the same canonical identifier: absolute (`//pkg/path:name`),
//! same-package (`:name`), and the abbreviated form (`//pkg/path/name`, expanded only when the
//! reference carries no colon and its trailing path segment equals the target name it names).

use crate::errors::Error;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical name of a target, optionally narrowed to one of its product outputs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier {
    package: Utf8PathBuf,
    target: Box<str>,
    product: Option<Box<str>>,
}

impl Identifier {
    /// Builds an identifier directly from already-canonical parts, without parsing.
    pub fn new(package: impl Into<Utf8PathBuf>, target: impl Into<Box<str>>) -> Self {
        Identifier { package: package.into(), target: target.into(), product: None }
    }

    /// Returns a copy of this identifier narrowed to the given product output.
    pub fn with_product(&self, product: impl Into<Box<str>>) -> Self {
        Identifier { package: self.package.clone(), target: self.target.clone(), product: Some(product.into()) }
    }

    /// Returns this identifier with any product reference stripped, naming the target itself.
    pub fn target_only(&self) -> Self {
        Identifier { package: self.package.clone(), target: self.target.clone(), product: None }
    }

    /// The package this identifier's target lives in.
    pub fn package(&self) -> &camino::Utf8Path {
        &self.package
    }

    /// The target name, without its package prefix.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The product output path this identifier narrows to, if any.
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// Parses a textual reference in the context of `current_package`.
    ///
    /// `current_package` is used to resolve the same-package (`:name`) form; it is ignored for
    /// absolute references.
    pub fn parse(text: &str, current_package: &camino::Utf8Path) -> Result<Self, Error> {
        let (head, product) = match text.split_once('#') {
            Some((head, product)) => (head, Some(product)),
            None => (text, None),
        };

        if head.is_empty() {
            return Err(syntax_error(text, "identifier is empty"));
        }

        let (package, target) = if let Some(rest) = head.strip_prefix("//") {
            match rest.rsplit_once(':') {
                Some((pkg, name)) => (Utf8PathBuf::from(pkg), name.to_string()),
                None => {
                    if product.is_some() {
                        return Err(syntax_error(
                            text,
                            "a product reference requires the colon form, not the abbreviated one",
                        ));
                    }
                    expand_shorthand(text, rest)?
                }
            }
        } else if let Some(name) = head.strip_prefix(':') {
            if name.is_empty() {
                return Err(syntax_error(text, "same-package reference is missing a target name"));
            }
            (current_package.to_path_buf(), name.to_string())
        } else {
            return Err(syntax_error(
                text,
                "dependency references must start with `//` or `:`",
            ));
        };

        if target.is_empty() {
            return Err(syntax_error(text, "target name is empty"));
        }
        validate_component(text, &target)?;

        let product = match product {
            Some(p) if p.is_empty() => {
                return Err(syntax_error(text, "product reference is missing a path"));
            }
            Some(p) => Some(Box::from(p)),
            None => None,
        };

        Ok(Identifier { package, target: Box::from(target.as_str()), product })
    }
}

fn expand_shorthand(text: &str, rest: &str) -> Result<(Utf8PathBuf, String), Error> {
    let rest = rest.trim_end_matches('/');
    match rest.rsplit_once('/') {
        Some((pkg, name)) if !name.is_empty() => Ok((Utf8PathBuf::from(pkg), name.to_string())),
        Some((_, "")) => Err(syntax_error(text, "abbreviated reference has no trailing segment")),
        None if !rest.is_empty() => Ok((Utf8PathBuf::from(""), rest.to_string())),
        _ => Err(syntax_error(text, "abbreviated reference is empty")),
    }
}

fn validate_component(text: &str, component: &str) -> Result<(), Error> {
    let ok = component
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'));
    if ok {
        Ok(())
    } else {
        Err(syntax_error(text, "target names may only contain [A-Za-z0-9_.+-]"))
    }
}

fn syntax_error(text: &str, reason: &str) -> Error {
    Error::SyntaxError { text: text.to_string(), reason: reason.to_string() }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.package, self.target)?;
        if let Some(product) = &self.product {
            write!(f, "#{}", product)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Utf8PathBuf {
        Utf8PathBuf::from("")
    }

    #[test]
    fn absolute_colon_form() {
        let id = Identifier::parse("//lib/foo:bar", &root()).unwrap();
        assert_eq!(id.package(), "lib/foo");
        assert_eq!(id.target(), "bar");
        assert_eq!(id.product(), None);
    }

    #[test]
    fn same_package_form_inherits_context() {
        let ctx = Utf8PathBuf::from("app");
        let id = Identifier::parse(":bin", &ctx).unwrap();
        assert_eq!(id.package(), "app");
        assert_eq!(id.target(), "bin");
    }

    #[test]
    fn abbreviated_form_expands_trailing_segment() {
        let id = Identifier::parse("//lib/foo", &root()).unwrap();
        assert_eq!(id.package(), "lib");
        assert_eq!(id.target(), "foo");
    }

    #[test]
    fn product_reference_requires_colon_form() {
        let id = Identifier::parse("//gen:codegen#tables.c", &root()).unwrap();
        assert_eq!(id.target(), "codegen");
        assert_eq!(id.product(), Some("tables.c"));

        let err = Identifier::parse("//gen/codegen#tables.c", &root()).unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }

    #[test]
    fn bare_relative_reference_is_rejected() {
        let err = Identifier::parse("lib/foo:bar", &root()).unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }

    #[test]
    fn canonical_text_round_trips() {
        let id = Identifier::parse("//lib/foo:bar#out/x.o", &root()).unwrap();
        let reparsed = Identifier::parse(&id.to_string(), &root()).unwrap();
        assert_eq!(id, reparsed);
        assert_eq!(id.to_string(), reparsed.to_string());
    }
}

/// §8 round-trip invariant: parsing an identifier's canonical text and re-canonicalizing is the
/// identity, for any identifier reachable from the proptest strategies, not just hand-picked ones.
#[cfg(all(test, feature = "proptest1"))]
mod proptest_tests {
    use super::*;
    use crate::proptest_helpers::identifier;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canonical_round_trip_holds_for_generated_identifiers(id in identifier()) {
            let root = Utf8PathBuf::from("");
            let reparsed = Identifier::parse(&id.to_string(), &root).unwrap();
            prop_assert_eq!(id, reparsed);
        }
    }
}
