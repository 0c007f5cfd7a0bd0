// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Error;
use camino::Utf8Path;
use std::collections::HashSet;
use warren::Product;

/// Checks the §4.G invariant: every input listed by some product is either the output of
/// another product in `products`, or a source file that exists relative to `project_root`.
///
/// Returns the first dangling reference found, in product emission order, rather than
/// collecting every violation -- matching the evaluator's fail-fast policy (§7).
pub fn validate_inputs<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    project_root: &Utf8Path,
) -> Result<(), Error> {
    let products: Vec<&Product> = products.into_iter().collect();
    let known_outputs: HashSet<&str> = products
        .iter()
        .flat_map(|p| p.outputs.iter())
        .map(|p| p.as_str())
        .collect();

    for product in &products {
        for input in &product.inputs {
            if known_outputs.contains(input.as_str()) {
                continue;
            }
            if project_root.join(input).exists() {
                continue;
            }
            return Err(Error::MissingInput { identifier: product.target.clone(), path: input.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use envkit::{EnvSchema, Environment};
    use std::sync::Arc;
    use warren::{Command, Identifier};

    fn product(name: &str, inputs: Vec<&str>, outputs: Vec<&str>) -> Product {
        let schema = Arc::new(EnvSchema::new());
        let fingerprint = Environment::make_empty(schema).fingerprint().unwrap();
        Product {
            target: Identifier::new("pkg", name),
            fingerprint,
            inputs: inputs.into_iter().map(Utf8PathBuf::from).collect(),
            outputs: outputs.into_iter().map(Utf8PathBuf::from).collect(),
            command: Command { rule: "touch".into(), program: "touch".into(), args: vec![], variables: Default::default() },
            environment: vec![],
        }
    }

    #[test]
    fn output_of_another_product_satisfies_input() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let products = vec![product("gen", vec![], vec!["out/tables.c"]), product("lib", vec!["out/tables.c"], vec!["out/lib.o"])];
        assert!(validate_inputs(&products, &root).is_ok());
    }

    #[test]
    fn source_file_on_disk_satisfies_input() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("a.txt"), b"hi").unwrap();
        let products = vec![product("hello", vec!["a.txt"], vec!["out/hello"])];
        assert!(validate_inputs(&products, &root).is_ok());
    }

    #[test]
    fn dangling_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let products = vec![product("hello", vec!["missing.txt"], vec!["out/hello"])];
        let err = validate_inputs(&products, &root).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
