// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The surface syntax description files are written in is out of scope (§1) -- only the
//! interface a description source satisfies is specified here, as [`DescriptionSource`]. This
//! module also provides the one concrete implementation this crate ships, [`JsonSource`], which
//! reads a project root and its packages from a small, data-only JSON schema instead of an
//! embedded language with its own sandboxed evaluator.

use crate::errors::Error;
use crate::interpolate;
use crate::target::CommandTemplate;
use camino::{Utf8Path, Utf8PathBuf};
use envkit::{Delta, EnvSchema, KeySchema, Value, ValueDomain};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The project root description's contribution: plugin-declared schemas, transforms, named base
/// environments, and an optional (deprecated) genroot path.
pub struct ProjectRoot {
    /// Every environment key the root description registered.
    pub schema: EnvSchema,
    /// Deltas applied to the empty environment to build each named base environment.
    pub base_environments: BTreeMap<String, Delta>,
    /// The legacy generated-output root, if declared. See [`crate::project::Project::set_genroot`].
    pub genroot: Option<Utf8PathBuf>,
}

/// One target as declared by a package description, before dependency identifiers have been
/// resolved against the loader's package context.
pub struct TargetDecl {
    /// The target's name within its package.
    pub name: String,
    /// The opaque kind tag the declaring plugin function used.
    pub kind: String,
    /// Unresolved dependency identifier strings, in declared order.
    pub deps: Vec<String>,
    /// Unresolved source entries: project-relative paths or `//pkg:name#file` references.
    pub sources: Vec<String>,
    /// The delta applied to the environment flowing to dependencies.
    pub down: Delta,
    /// The delta applied to the environment folded back to dependents.
    pub using: Delta,
    /// The delta applied to the environment this target's own products are built in.
    pub local: Delta,
    /// Whether this target was declared usable as an entry point.
    pub concrete: bool,
    /// The product generator this target's plugin function built.
    pub generator: Arc<dyn crate::target::ProductGenerator>,
}

/// A package description's contribution: the targets it emitted via plugin-provided callbacks.
pub struct PackageDecl {
    /// Targets declared in this package, in declaration order.
    pub targets: Vec<TargetDecl>,
}

/// The interface a build description source satisfies (§4.E, §6).
///
/// A real implementation would evaluate user-authored code in a sandbox that exposes plugin
/// functions as callbacks; this crate treats that evaluation mechanism as an external
/// collaborator and specifies only its inputs and outputs.
pub trait DescriptionSource {
    /// Loads and evaluates the project root description.
    fn load_project_root(&self, project_root: &Utf8Path) -> Result<ProjectRoot, Error>;

    /// Loads and evaluates one package's description, given its project-relative path.
    fn load_package(&self, project_root: &Utf8Path, package_path: &Utf8Path) -> Result<PackageDecl, Error>;
}

/// A [`DescriptionSource`] backed by plain JSON files: `WARREN.root.json` at the project root,
/// and `<package>/WARREN.json` per package. Each target's `generator` field deserializes
/// directly into a [`CommandTemplate`], so no plugin code runs -- the "plugin function" contract
/// (§6) is satisfied by data alone.
#[derive(Debug, Default)]
pub struct JsonSource;

impl JsonSource {
    /// Creates a new JSON-backed description source.
    pub fn new() -> Self {
        JsonSource
    }
}

#[derive(Deserialize)]
struct RootFile {
    #[serde(default)]
    keys: Vec<KeyDecl>,
    #[serde(default)]
    base_environments: BTreeMap<String, Delta>,
    #[serde(default)]
    genroot: Option<Utf8PathBuf>,
    #[serde(default)]
    transforms: Vec<String>,
}

#[derive(Deserialize)]
struct KeyDecl {
    name: String,
    domain: DomainDecl,
    default: Value,
    #[serde(default)]
    canonicalize: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum DomainDecl {
    List,
    Set,
    Enum(Vec<String>),
    Str,
    Bool,
    Int,
}

impl From<DomainDecl> for ValueDomain {
    fn from(d: DomainDecl) -> Self {
        match d {
            DomainDecl::List => ValueDomain::List,
            DomainDecl::Set => ValueDomain::Set,
            DomainDecl::Enum(choices) => ValueDomain::Enum(Arc::new(choices)),
            DomainDecl::Str => ValueDomain::Str,
            DomainDecl::Bool => ValueDomain::Bool,
            DomainDecl::Int => ValueDomain::Int,
        }
    }
}

#[derive(Deserialize)]
struct PackageFile {
    #[serde(default)]
    targets: Vec<TargetFile>,
}

#[derive(Deserialize)]
struct TargetFile {
    name: String,
    kind: String,
    #[serde(default)]
    deps: Vec<String>,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    down: Delta,
    #[serde(default)]
    using: Delta,
    #[serde(default)]
    local: Delta,
    #[serde(default)]
    concrete: bool,
    generator: CommandTemplate,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::Io { path: path.to_path_buf(), message: e.to_string() })?;
    serde_json::from_str(&text).map_err(|e| Error::DescriptionEvaluationError {
        file: path.to_path_buf(),
        diagnostic: e.to_string(),
    })
}

/// Built-in named transforms a root description may opt into by name, since JSON cannot encode a
/// closure. Kept intentionally small: power users of a real embedded-language source would
/// register arbitrary host functions here instead.
fn builtin_transform(name: &str) -> Option<envkit::TransformFn> {
    match name {
        "dedup_adjacent" => Some(Arc::new(|value: &Value| match value {
            Value::List(items) => {
                let mut out: Vec<String> = Vec::new();
                for item in items {
                    if out.last() != Some(item) {
                        out.push(item.clone());
                    }
                }
                Ok(Value::List(out))
            }
            other => Ok(other.clone()),
        })),
        "sorted" => Some(Arc::new(|value: &Value| match value {
            Value::List(items) => {
                let mut out = items.clone();
                out.sort();
                Ok(Value::List(out))
            }
            other => Ok(other.clone()),
        })),
        _ => None,
    }
}

impl DescriptionSource for JsonSource {
    fn load_project_root(&self, project_root: &Utf8Path) -> Result<ProjectRoot, Error> {
        let path = project_root.join("WARREN.root.json");
        let file: RootFile = read_json(&path)?;

        let mut schema = EnvSchema::new();
        for name in &file.transforms {
            let f = builtin_transform(name).ok_or_else(|| Error::UnknownSymbol {
                file: path.clone(),
                name: name.clone(),
            })?;
            schema.register_transform(name.clone(), f);
        }
        for key in file.keys {
            interpolate::reject_structural("environment key name", &key.name)?;
            let mut ks = KeySchema::new(key.name.clone(), key.domain.into(), key.default);
            if let Some(transform) = key.canonicalize {
                ks = ks.with_canonicalize(transform);
            }
            schema.register_key(ks)?;
        }

        Ok(ProjectRoot { schema, base_environments: file.base_environments, genroot: file.genroot })
    }

    fn load_package(&self, project_root: &Utf8Path, package_path: &Utf8Path) -> Result<PackageDecl, Error> {
        let path = project_root.join(package_path).join("WARREN.json");
        let file: PackageFile = read_json(&path)?;

        let mut seen = std::collections::HashSet::new();
        let mut targets = Vec::with_capacity(file.targets.len());
        for t in file.targets {
            if !seen.insert(t.name.clone()) {
                return Err(Error::DuplicateTarget { package: package_path.to_path_buf(), name: t.name });
            }
            targets.push(TargetDecl {
                name: t.name,
                kind: t.kind,
                deps: t.deps,
                sources: t.sources,
                down: t.down,
                using: t.using,
                local: t.local,
                concrete: t.concrete,
                generator: Arc::new(t.generator),
            });
        }
        Ok(PackageDecl { targets })
    }
}
