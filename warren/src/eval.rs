// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The evaluation engine (§4.F): drives each concrete entry target through its dependency
//! subtree, threading environments through `down`/`using`/`local` deltas, memoizing on
//! `(target, input-environment fingerprint)`, and accumulating a global, deduplicated product set.

use crate::errors::{ChainFrame, Error};
use crate::label::Identifier;
use crate::project::Project;
use crate::registry::Registry;
use crate::target::{GenerateContext, Source, Target};
use camino::Utf8PathBuf;
use envkit::{Delta, DeltaEntry, Environment, Fingerprint, Op, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{instrument, trace};

type MemoKey = (Identifier, Fingerprint);

/// What evaluating a single target in a single environment produces: its products, and the
/// using-environment it surfaces to whatever depends on it.
#[derive(Clone)]
struct MemoEntry {
    products: Vec<crate::product::Product>,
    using_env: Environment,
}

/// Drives evaluation for a whole project and owns the global, deduplicated product set.
pub struct Evaluator {
    registry: Arc<Registry>,
    memo: HashMap<MemoKey, MemoEntry>,
    in_progress: HashSet<MemoKey>,
    products: BTreeMap<crate::product::ProductId, crate::product::Product>,
}

impl Evaluator {
    /// Creates an evaluator over a frozen registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Evaluator { registry, memo: HashMap::new(), in_progress: HashSet::new(), products: BTreeMap::new() }
    }

    /// Evaluates every entry target against the project's base environment, accumulating
    /// products into the evaluator's global set.
    #[instrument(skip(self, project, entries))]
    pub fn evaluate_entries(&mut self, project: &Project, entries: &[Identifier]) -> Result<(), Error> {
        let base = project.base_environment("default");
        for entry in entries {
            let target = self
                .registry
                .target(entry)
                .ok_or_else(|| Error::UnknownTarget { identifier: entry.clone(), chain: Vec::new() })?;
            if !target.is_concrete() {
                return Err(Error::NotConcrete { identifier: entry.clone() });
            }
            let mut stack = Vec::new();
            self.evaluate(entry, &base, &mut stack)?;
        }
        Ok(())
    }

    /// Returns every unique product accumulated so far, in the manifest's stable emission order
    /// (by target identifier, then environment fingerprint, then primary output path).
    pub fn products(&self) -> impl Iterator<Item = &crate::product::Product> {
        self.products.values()
    }

    fn evaluate(
        &mut self,
        identifier: &Identifier,
        env_in: &Environment,
        stack: &mut Vec<ChainFrame>,
    ) -> Result<MemoEntry, Error> {
        let fingerprint = env_in.fingerprint().map_err(|e| self.env_error(identifier, e))?;
        let key: MemoKey = (identifier.clone(), fingerprint);

        if let Some(cached) = self.memo.get(&key) {
            trace!(target = %identifier, fingerprint = %fingerprint, "memo hit");
            return Ok(cached.clone());
        }

        if !self.in_progress.insert(key.clone()) {
            let mut chain = stack.clone();
            chain.push(ChainFrame { target: identifier.clone(), fingerprint: Some(fingerprint.short()) });
            return Err(Error::DependencyCycle { chain });
        }

        let result = self.evaluate_uncached(identifier, env_in, &fingerprint, stack);
        self.in_progress.remove(&key);

        let entry = result?;
        self.memo.insert(key, entry.clone());
        Ok(entry)
    }

    fn evaluate_uncached(
        &mut self,
        identifier: &Identifier,
        env_in: &Environment,
        fingerprint: &Fingerprint,
        stack: &mut Vec<ChainFrame>,
    ) -> Result<MemoEntry, Error> {
        stack.push(ChainFrame { target: identifier.clone(), fingerprint: Some(fingerprint.short()) });

        let outcome = (|| {
            let target = self
                .registry
                .target(identifier)
                .ok_or_else(|| Error::UnknownTarget { identifier: identifier.clone(), chain: Vec::new() })?
                .clone();

            let env_down = env_in.apply(target.down()).map_err(|e| self.env_error(identifier, e))?;

            let deps = self.registry.deps(identifier).to_vec();
            let mut dep_results: HashMap<Identifier, MemoEntry> = HashMap::new();
            let mut using_envs = Vec::with_capacity(deps.len());
            for dep in &deps {
                let dep_entry = self.evaluate(dep, &env_down, stack)?;
                using_envs.push(dep_entry.using_env.clone());
                dep_results.insert(dep.clone(), dep_entry);
            }

            // `down` flows onward to dependencies only; it must not leak into this target's own
            // `env_local` (scenario: "Delta propagation"), so the fold that produces
            // `env_from_deps` starts from `env_in`, not `env_down`.
            let env_from_deps = fold_using(env_in, &using_envs).map_err(|e| self.env_error(identifier, e))?;
            let env_local = env_from_deps.apply(target.local()).map_err(|e| self.env_error(identifier, e))?;

            let resolved_sources = self.resolve_sources(&target, &dep_results)?;
            let ctx = GenerateContext { identifier, env_local: &env_local, resolved_sources: &resolved_sources };
            let generated = target.generate(&ctx)?;

            for product in &generated.products {
                self.insert_product(product.clone())?;
            }

            let using_delta = substitute_self_outputs(target.using(), &generated.self_outputs);
            let using_env = env_from_deps.apply(&using_delta).map_err(|e| self.env_error(identifier, e))?;

            Ok(MemoEntry { products: generated.products, using_env })
        })();

        let outcome = outcome.map_err(|e| e.with_chain(stack.clone()));
        stack.pop();
        outcome
    }

    fn resolve_sources(
        &self,
        target: &Target,
        dep_results: &HashMap<Identifier, MemoEntry>,
    ) -> Result<Vec<Utf8PathBuf>, Error> {
        let mut resolved = Vec::with_capacity(target.sources().len());
        for source in target.sources() {
            match source {
                Source::Path(_) => {
                    let path = Target::resolve_source_path(source, target.identifier().package())
                        .expect("Source::Path always resolves");
                    resolved.push(path);
                }
                Source::Product(reference) => {
                    let dep_target = reference.target_only();
                    let wanted = reference.product().expect("parsed product references always carry a path");
                    let entry = dep_results.get(&dep_target).ok_or_else(|| Error::UnknownTarget {
                        identifier: dep_target.clone(),
                        chain: Vec::new(),
                    })?;
                    let found = entry
                        .products
                        .iter()
                        .flat_map(|p| p.outputs.iter())
                        .find(|out| out.as_str() == wanted || out.file_name() == Some(wanted))
                        .cloned()
                        .ok_or_else(|| Error::UnknownProduct {
                            identifier: dep_target.clone(),
                            product: wanted.to_string(),
                            chain: Vec::new(),
                        })?;
                    resolved.push(found);
                }
            }
        }
        Ok(resolved)
    }

    fn insert_product(&mut self, product: crate::product::Product) -> Result<(), Error> {
        let id = product.id();
        if let Some(existing) = self.products.get(&id) {
            if existing != &product {
                return Err(Error::DuplicateProduct {
                    identifier: id.target.clone(),
                    output: id.primary_output.clone(),
                    chain: Vec::new(),
                });
            }
            return Ok(());
        }
        self.products.insert(id, product);
        Ok(())
    }

    fn env_error(&self, identifier: &Identifier, source: envkit::Error) -> Error {
        Error::Environment { identifier: Some(identifier.clone()), source, chain: Vec::new() }
    }
}

/// Folds dependency using-environments into `base` (the target's own `env_in`, not `env_down`;
/// see the call site) in declared order.
///
/// Each using-environment is treated as a `set` for every key it explicitly carries that differs
/// from the running environment -- last writer wins, per key, independently. This resolves the
/// open question of whether list-valued keys should concatenate or overwrite during the fold in
/// favor of overwrite (see DESIGN.md). Plugins that want concatenation instead override the fold
/// via a per-target hook, which this crate does not implement (no target in this crate's bundled
/// description source requests one).
fn fold_using(base: &Environment, using_envs: &[Environment]) -> Result<Environment, Error> {
    let mut current = base.clone();
    for using_env in using_envs {
        let mut delta = Delta::empty();
        for key in using_env.explicit_keys() {
            let candidate = using_env.lookup(key)?;
            let existing = current.lookup(key)?;
            if candidate != existing {
                delta = delta.then(Delta::new().set(key.to_string(), candidate).build());
            }
        }
        current = current.apply(&delta)?;
    }
    Ok(current)
}

/// The reserved interpolation key a target's `using` delta may reference to see its own outputs.
const SELF_OUTPUTS_SENTINEL: &str = "${outputs}";

/// Replaces the `${outputs}` sentinel anywhere it appears verbatim as a collection item or a
/// scalar string value within `using`'s operations, with this evaluation's actual output paths.
/// This is how a target's `using` delta is allowed to reference its own just-produced outputs
/// (§4.F step 7), without deltas ceasing to be plain data everywhere else.
fn substitute_self_outputs(using: &Delta, outputs: &[Utf8PathBuf]) -> Delta {
    let joined = outputs.iter().map(|p| p.as_str().to_string()).collect::<Vec<_>>();
    let entries = using
        .entries()
        .iter()
        .map(|entry| DeltaEntry { key: entry.key.clone(), op: substitute_op(&entry.op, &joined) })
        .collect();
    Delta::from_entries(entries)
}

fn substitute_op(op: &Op, outputs: &[String]) -> Op {
    match op {
        Op::Set(Value::Str(s)) if s.as_str() == SELF_OUTPUTS_SENTINEL => {
            Op::Set(Value::Str(outputs.join(" ")))
        }
        Op::Set(Value::List(items)) => Op::Set(Value::List(expand_sentinel(items, outputs))),
        Op::Append(items) => Op::Append(expand_sentinel(items, outputs)),
        Op::Prepend(items) => Op::Prepend(expand_sentinel(items, outputs)),
        other => other.clone(),
    }
}

fn expand_sentinel(items: &[String], outputs: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| {
            if item == SELF_OUTPUTS_SENTINEL {
                outputs.clone()
            } else {
                vec![item.clone()]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use crate::registry::Registry;
    use crate::target::{CommandTemplate, Target};
    use envkit::{EnvSchema, KeySchema, ValueDomain};
    use pretty_assertions::assert_eq;

    fn schema_with_c_flags() -> Arc<EnvSchema> {
        let mut schema = EnvSchema::new();
        schema
            .register_key(KeySchema::new("c_flags", ValueDomain::List, Value::List(vec![])))
            .unwrap();
        Arc::new(schema)
    }

    fn copy_generator(rule: &str) -> Arc<dyn crate::target::ProductGenerator> {
        Arc::new(CommandTemplate {
            rule: rule.to_string(),
            program: "cp".into(),
            args: vec!["${c_flags}".into()],
            outputs: vec![format!("{rule}/out")],
            subset_keys: vec![],
        })
    }

    /// §8 "Delta propagation": `lib`'s `down` flows to `lib`'s own dependency (`core`), not into
    /// `lib`'s own `env_local`, and not back up to `lib`'s dependent (`app`) either, since `lib`
    /// carries no `using` delta to surface it.
    #[test]
    fn down_flows_to_dependencies_not_into_self_or_dependents() {
        let schema = schema_with_c_flags();
        let mut registry = Registry::new();
        let core = Identifier::new("core", "lib");
        let lib = Identifier::new("lib", "foo");
        let app = Identifier::new("app", "bin");

        let core_target = Target::new(
            core.clone(),
            "lib",
            vec![],
            vec![],
            Delta::empty(),
            Delta::empty(),
            Delta::empty(),
            true,
            copy_generator("core"),
        );
        registry.package_mut(&Utf8PathBuf::from("core")).insert(core_target).unwrap();
        registry.record_deps(core.clone(), vec![]);

        let lib_target = Target::new(
            lib.clone(),
            "lib",
            vec!["//core:lib".to_string()],
            vec![],
            Delta::new().append("c_flags", ["-O2"]).build(),
            Delta::empty(),
            Delta::empty(),
            true,
            copy_generator("lib"),
        );
        registry.package_mut(&Utf8PathBuf::from("lib")).insert(lib_target).unwrap();
        registry.record_deps(lib.clone(), vec![core.clone()]);

        let app_target = Target::new(
            app.clone(),
            "bin",
            vec!["//lib:foo".to_string()],
            vec![],
            Delta::empty(),
            Delta::empty(),
            Delta::empty(),
            true,
            copy_generator("app"),
        );
        registry.package_mut(&Utf8PathBuf::from("app")).insert(app_target).unwrap();
        registry.record_deps(app.clone(), vec![lib.clone()]);

        let registry = registry.freeze();
        let mut project = Project::new(Utf8PathBuf::from("/proj"), schema.clone());
        project.add_base_environment("default", Environment::make_empty(schema));

        let mut evaluator = Evaluator::new(registry);
        evaluator.evaluate_entries(&project, &[app.clone()]).unwrap();

        let products: Vec<_> = evaluator.products().collect();
        assert_eq!(products.len(), 3);
        let core_product = products.iter().find(|p| p.target == core).unwrap();
        assert_eq!(core_product.command.args, vec!["-O2"]);
        let lib_product = products.iter().find(|p| p.target == lib).unwrap();
        assert_eq!(lib_product.command.args, vec![""]);
        let app_product = products.iter().find(|p| p.target == app).unwrap();
        assert_eq!(app_product.command.args, vec![""]);
    }

    #[test]
    fn diamond_dependency_evaluates_shared_target_once() {
        let schema = schema_with_c_flags();
        let mut registry = Registry::new();
        let c = Identifier::new("c", "lib");
        let a = Identifier::new("a", "lib");
        let b = Identifier::new("b", "lib");
        let top = Identifier::new("top", "bin");

        for (id, deps) in [(&c, vec![]), (&a, vec!["//c:lib".to_string()]), (&b, vec!["//c:lib".to_string()])] {
            let target = Target::new(
                id.clone(),
                "lib",
                deps.clone(),
                vec![],
                Delta::empty(),
                Delta::empty(),
                Delta::empty(),
                true,
                copy_generator(id.target()),
            );
            registry.package_mut(&id.package().to_path_buf()).insert(target).unwrap();
            let resolved: Vec<Identifier> = deps.iter().map(|d| Identifier::parse(d, id.package()).unwrap()).collect();
            registry.record_deps(id.clone(), resolved);
        }
        let top_target = Target::new(
            top.clone(),
            "bin",
            vec!["//a:lib".to_string(), "//b:lib".to_string()],
            vec![],
            Delta::empty(),
            Delta::empty(),
            Delta::empty(),
            true,
            copy_generator("top"),
        );
        registry.package_mut(&Utf8PathBuf::from("top")).insert(top_target).unwrap();
        registry.record_deps(top.clone(), vec![a.clone(), b.clone()]);

        let registry = registry.freeze();
        let mut project = Project::new(Utf8PathBuf::from("/proj"), schema.clone());
        project.add_base_environment("default", Environment::make_empty(schema));

        let mut evaluator = Evaluator::new(registry);
        evaluator.evaluate_entries(&project, &[top]).unwrap();

        let products: Vec<_> = evaluator.products().filter(|p| p.target == c).collect();
        assert_eq!(products.len(), 1);
    }
}
