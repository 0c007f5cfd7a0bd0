// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use std::fmt;
use warren::Identifier;

/// Everything that can go wrong while validating or writing a manifest.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A product input is neither another product's output nor a resolvable source file (§4.G).
    MissingInput {
        /// The product that lists the dangling input.
        identifier: Identifier,
        /// The path that could not be resolved.
        path: Utf8PathBuf,
    },
    /// Writing the manifest file failed at the filesystem level.
    Io {
        /// The path that failed.
        path: Utf8PathBuf,
        /// The underlying OS error message.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingInput { identifier, path } => {
                write!(f, "{}: input {} is neither produced nor a source file", identifier, path)
            }
            Error::Io { path, message } => write!(f, "{}: {}", path, message),
        }
    }
}

impl std::error::Error for Error {}
