// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small, hand-written project trees backing `graph` and `manifest`'s integration-style tests.
//!
//! Each function below materializes one project onto a temporary directory, in the JSON shape
//! `warren::JsonSource` reads, and hands back a [`ProjectFixture`] the test then loads and
//! evaluates. Keeping these out-of-line (rather than inlined per test) means the same canned
//! project can back both a `graph` test and a `manifest` test without duplication.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

/// A temporary, on-disk project tree. Dropping this removes the directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// The project's root directory.
    pub fn path(&self) -> &Utf8Path {
        Utf8Path::from_path(self.dir.path()).expect("tempdir path is valid UTF-8")
    }
}

fn write_project(root_file: Value, packages: &[(&str, Value)]) -> ProjectFixture {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = Utf8Path::from_path(dir.path()).unwrap();
    fs::write(root.join("WARREN.root.json"), root_file.to_string()).unwrap();
    for (package_path, decl) in packages {
        let pkg_dir = root.join(package_path);
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("WARREN.json"), decl.to_string()).unwrap();
    }
    ProjectFixture { dir }
}

fn delta(ops: &[(&str, Value)]) -> Value {
    Value::Array(
        ops.iter()
            .map(|(key, op)| json!({ "key": key, "op": op }))
            .collect(),
    )
}

fn copy_generator(rule: &str, program: &str, outputs: &[&str]) -> Value {
    json!({
        "rule": rule,
        "program": program,
        "args": [],
        "outputs": outputs,
        "subset_keys": [],
    })
}

/// No plugins, no keys, no packages. Requesting any target fails with `UnknownTarget`; nothing
/// is ever written to disk beyond the root description.
pub fn empty_project() -> ProjectFixture {
    write_project(json!({}), &[])
}

/// One package, `//greet`, with a single concrete `copy_file`-shaped target `hello` that copies
/// `a.txt` to `hello/a.txt`. No environment keys are registered, so the target's fingerprint is
/// the fingerprint of the empty environment.
pub fn single_copy_file_project() -> ProjectFixture {
    let package = json!({
        "targets": [{
            "name": "hello",
            "kind": "copy_file",
            "deps": [],
            "sources": ["a.txt"],
            "concrete": true,
            "generator": copy_generator("copy", "cp", &["greet/hello/a.txt"]),
        }],
    });
    let fixture = write_project(json!({}), &[("greet", package)]);
    fs::write(fixture.path().join("greet").join("a.txt"), b"hello\n").unwrap();
    fixture
}

/// `//core:lib` <- `//lib:foo` <- `//app:bin`, with `lib:foo` appending `-O2` to `c_flags` in its
/// `down` delta. `c_flags` must show up in `core`'s `env_local` (it is `core`'s dependency) but
/// not in `lib`'s own `env_local`, and not in `app`'s either, since `lib` carries no `using`
/// delta to surface it back upward.
pub fn delta_propagation_project() -> ProjectFixture {
    let root = json!({
        "keys": [{
            "name": "c_flags",
            "domain": "list",
            "default": {"List": []},
        }],
    });
    let core = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": [],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["core/lib.o"]),
        }],
    });
    let lib = json!({
        "targets": [{
            "name": "foo",
            "kind": "lib",
            "deps": ["//core:lib"],
            "sources": [],
            "down": delta(&[("c_flags", json!({"Append": ["-O2"]}))]),
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["lib/foo.o"]),
        }],
    });
    let app = json!({
        "targets": [{
            "name": "bin",
            "kind": "bin",
            "deps": ["//lib:foo"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("link", "cc", &["app/bin"]),
        }],
    });
    write_project(root, &[("core", core), ("lib", lib), ("app", app)])
}

/// `//gen:codegen` produces `tables.c`; `//lib:foo` lists `//gen:codegen#tables.c` as a source.
/// Loading records a static dependency edge from `foo` to `codegen`; evaluating `foo` resolves
/// the reference to `codegen`'s actual output path in the same `env_down`.
pub fn product_reference_project() -> ProjectFixture {
    let gen = json!({
        "targets": [{
            "name": "codegen",
            "kind": "codegen",
            "deps": [],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("codegen", "gen-tables", &["gen/tables.c"]),
        }],
    });
    let lib = json!({
        "targets": [{
            "name": "foo",
            "kind": "lib",
            "deps": [],
            "sources": ["//gen:codegen#tables.c"],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["lib/foo.o"]),
        }],
    });
    write_project(json!({}), &[("gen", gen), ("lib", lib)])
}

/// `//top:bin` depends on both `//a:lib` and `//b:lib`, which both depend on `//c:lib`. `c`
/// reaches the same `env_down` on both paths, so it must be evaluated exactly once.
pub fn diamond_dependency_project() -> ProjectFixture {
    let c = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": [],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["c/lib.o"]),
        }],
    });
    let a = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": ["//c:lib"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["a/lib.o"]),
        }],
    });
    let b = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": ["//c:lib"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["b/lib.o"]),
        }],
    });
    let top = json!({
        "targets": [{
            "name": "bin",
            "kind": "bin",
            "deps": ["//a:lib", "//b:lib"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("link", "cc", &["top/bin"]),
        }],
    });
    write_project(json!({}), &[("c", c), ("a", a), ("b", b), ("top", top)])
}

/// `//pkga:lib` <-> `//pkgb:lib`, a static cycle with no deltas narrowing the environment on
/// either edge, so evaluating `pkga:lib` actually re-enters itself and must fail with
/// `DependencyCycle`.
pub fn cycle_project() -> ProjectFixture {
    let a = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": ["//pkgb:lib"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("cc", "cc", &["pkga/lib.o"]),
        }],
    });
    let b = json!({
        "targets": [{
            "name": "lib",
            "kind": "lib",
            "deps": ["//pkga:lib"],
            "sources": [],
            "concrete": false,
            "generator": copy_generator("cc", "cc", &["pkgb/lib.o"]),
        }],
    });
    write_project(json!({}), &[("pkga", a), ("pkgb", b)])
}

/// Two *unrelated* diamonds sharing no target: `//x:top` depends on `//x:mid`, which depends on
/// `//x:leaf` with a `down` delta; `//y:top` depends directly on `//x:leaf` with no delta. `leaf`
/// is reached with two different incoming environments (`mid`'s narrowed one and `y:top`'s
/// unmodified one), so it is evaluated twice, not memoized -- the mirror image of the diamond
/// fixture, used to assert that *different* environments at the same target do not collapse.
pub fn non_memoized_divergent_envs_project() -> ProjectFixture {
    let root = json!({
        "keys": [{
            "name": "c_flags",
            "domain": "list",
            "default": {"List": []},
        }],
    });
    let x = json!({
        "targets": [
            {
                "name": "leaf",
                "kind": "lib",
                "deps": [],
                "sources": [],
                "concrete": true,
                "generator": copy_generator("cc", "cc", &["x/leaf.o"]),
            },
            {
                "name": "mid",
                "kind": "lib",
                "deps": ["//x:leaf"],
                "sources": [],
                "down": delta(&[("c_flags", json!({"Append": ["-O2"]}))]),
                "concrete": true,
                "generator": copy_generator("cc", "cc", &["x/mid.o"]),
            },
            {
                "name": "top",
                "kind": "bin",
                "deps": ["//x:mid"],
                "sources": [],
                "concrete": true,
                "generator": copy_generator("link", "cc", &["x/top"]),
            },
        ],
    });
    let y_top = json!({
        "targets": [{
            "name": "top",
            "kind": "bin",
            "deps": ["//x:leaf"],
            "sources": [],
            "concrete": true,
            "generator": copy_generator("link", "cc", &["y/top"]),
        }],
    });
    write_project(root, &[("x", x), ("y", y_top)])
}
