// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::label::Identifier;
use camino::Utf8PathBuf;
use std::fmt;

/// A single frame in a dependency chain attached to an evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainFrame {
    /// The target being evaluated at this point in the chain.
    pub target: Identifier,
    /// The short fingerprint of the environment it was evaluated in, if known.
    pub fingerprint: Option<String>,
}

impl fmt::Display for ChainFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fingerprint {
            Some(fp) => write!(f, "{} @ {}", self.target, fp),
            None => write!(f, "{}", self.target),
        }
    }
}

/// Every way loading or evaluating a project can fail.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An identifier reference could not be parsed.
    SyntaxError {
        /// The text that failed to parse.
        text: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Two targets in the same package share a name.
    DuplicateTarget {
        /// The package the collision occurred in.
        package: Utf8PathBuf,
        /// The repeated target name.
        name: String,
    },
    /// A dependency identifier does not resolve to any loaded target.
    UnknownTarget {
        /// The identifier that failed to resolve.
        identifier: Identifier,
        /// The chain of dependents that reached this failure, outermost first.
        chain: Vec<ChainFrame>,
    },
    /// A product reference names an output its target does not emit.
    UnknownProduct {
        /// The target the reference points at.
        identifier: Identifier,
        /// The requested output path.
        product: String,
        /// The chain of dependents that reached this failure, outermost first.
        chain: Vec<ChainFrame>,
    },
    /// Evaluation re-entered a task that is still in progress.
    DependencyCycle {
        /// The chain of tasks from the outermost entry point to the repeated one.
        chain: Vec<ChainFrame>,
    },
    /// An abstract target was requested as an entry point.
    NotConcrete {
        /// The target that was requested.
        identifier: Identifier,
    },
    /// A product's input path is neither a source file nor another product's output.
    MissingInput {
        /// The product that lists the dangling input.
        identifier: Identifier,
        /// The path that could not be resolved.
        path: Utf8PathBuf,
    },
    /// Loading a description file failed.
    DescriptionEvaluationError {
        /// The file that failed to load.
        file: Utf8PathBuf,
        /// The diagnostic produced by the description source.
        diagnostic: String,
    },
    /// A description referenced a plugin function or key that was never registered.
    UnknownSymbol {
        /// The file the reference occurred in.
        file: Utf8PathBuf,
        /// The unresolved name.
        name: String,
    },
    /// An interpolation expression appeared in a structural string.
    InterpolationInStructural {
        /// The string field it was found in.
        field: String,
        /// The offending text.
        text: String,
    },
    /// Two products share identity but differ in contents.
    DuplicateProduct {
        /// The target identifier they both originate from.
        identifier: Identifier,
        /// The output path they both claim.
        output: Utf8PathBuf,
        /// The chain of dependents that reached this failure, outermost first.
        chain: Vec<ChainFrame>,
    },
    /// An environment-store operation failed.
    Environment {
        /// The identifier of the target being evaluated when the failure occurred, if known.
        identifier: Option<Identifier>,
        /// The underlying environment error.
        source: envkit::Error,
        /// The chain of dependents that reached this failure, outermost first.
        chain: Vec<ChainFrame>,
    },
    /// Reading or writing a description file failed at the filesystem level.
    Io {
        /// The path involved.
        path: Utf8PathBuf,
        /// The underlying OS error message.
        message: String,
    },
    /// A product generator produced zero outputs; product identity requires a primary output.
    NoOutputs {
        /// The target whose generator produced no outputs.
        identifier: Identifier,
    },
}

impl Error {
    /// Attaches the dependency chain active when this error unwound, if the variant carries one
    /// and does not already have it set.
    ///
    /// Called at each level `Evaluator::evaluate_uncached` unwinds through (§7: "errors raised
    /// during evaluation ... are enriched with the current dependency chain as they unwind").
    /// The chain is set only once, at the innermost frame where the error first occurred --
    /// `DependencyCycle` already carries its full chain at the point it is detected, so this is a
    /// no-op for it, and every other variant is enriched exactly once by the first unwind point
    /// that sees it, leaving ancestors' later calls as no-ops too.
    pub fn with_chain(mut self, chain: Vec<ChainFrame>) -> Self {
        if let Some(existing) = self.chain_mut() {
            if existing.is_empty() {
                *existing = chain;
            }
        }
        self
    }

    fn chain_mut(&mut self) -> Option<&mut Vec<ChainFrame>> {
        match self {
            Error::UnknownTarget { chain, .. }
            | Error::UnknownProduct { chain, .. }
            | Error::DependencyCycle { chain }
            | Error::DuplicateProduct { chain, .. }
            | Error::Environment { chain, .. } => Some(chain),
            _ => None,
        }
    }
}

fn fmt_chain(f: &mut fmt::Formatter<'_>, chain: &[ChainFrame]) -> fmt::Result {
    if chain.is_empty() {
        return Ok(());
    }
    write!(f, " (via ")?;
    for (i, frame) in chain.iter().enumerate() {
        if i > 0 {
            write!(f, " -> ")?;
        }
        write!(f, "{}", frame)?;
    }
    write!(f, ")")
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SyntaxError { text, reason } => {
                write!(f, "cannot parse identifier {:?}: {}", text, reason)
            }
            Error::DuplicateTarget { package, name } => {
                write!(f, "duplicate target {:?} in package {}", name, package)
            }
            Error::UnknownTarget { identifier, chain } => {
                write!(f, "unknown target {}", identifier)?;
                fmt_chain(f, chain)
            }
            Error::UnknownProduct { identifier, product, chain } => {
                write!(f, "{} does not emit output {:?}", identifier, product)?;
                fmt_chain(f, chain)
            }
            Error::DependencyCycle { chain } => {
                write!(f, "dependency cycle: ")?;
                for (i, frame) in chain.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                Ok(())
            }
            Error::NotConcrete { identifier } => {
                write!(f, "{} is abstract and cannot be used as an entry point", identifier)
            }
            Error::MissingInput { identifier, path } => {
                write!(f, "{}: input {} is neither a source file nor a known product", identifier, path)
            }
            Error::DescriptionEvaluationError { file, diagnostic } => {
                write!(f, "{}: {}", file, diagnostic)
            }
            Error::UnknownSymbol { file, name } => {
                write!(f, "{}: unknown symbol {:?}", file, name)
            }
            Error::InterpolationInStructural { field, text } => {
                write!(f, "interpolation not allowed in {}: {:?}", field, text)
            }
            Error::DuplicateProduct { identifier, output, chain } => {
                write!(f, "{} produced two differing products for output {}", identifier, output)?;
                fmt_chain(f, chain)
            }
            Error::Environment { identifier, source, chain } => {
                match identifier {
                    Some(id) => write!(f, "{}: {}", id, source)?,
                    None => write!(f, "{}", source)?,
                }
                fmt_chain(f, chain)
            }
            Error::Io { path, message } => write!(f, "{}: {}", path, message),
            Error::NoOutputs { identifier } => {
                write!(f, "{}: generator produced no outputs", identifier)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Environment { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<envkit::Error> for Error {
    fn from(source: envkit::Error) -> Self {
        Error::Environment { identifier: None, source, chain: Vec::new() }
    }
}
