//! Cross-module processing order
//!
//! Orders a batch so that every module comes after the in-batch modules it
//! references. The order is a pure function of input order and the
//! reference graph, so repeated builds weave modules in the same sequence.

use std::collections::HashSet;
use weft_bytecode::Module;

/// A node of the module reference graph
pub trait ModuleNode {
    /// Full identity of this module
    fn identity(&self) -> String;

    /// Full identities of the modules this module references
    fn dependencies(&self) -> Vec<String>;
}

impl ModuleNode for Module {
    fn identity(&self) -> String {
        self.identity.full_name()
    }

    fn dependencies(&self) -> Vec<String> {
        self.references.iter().map(|r| r.full_name()).collect()
    }
}

/// Compute the processing order of `nodes`, as indices into the slice
///
/// Modules with no in-batch references keep their encounter order at the
/// front. The rest are appended by repeated scans once all their in-batch
/// references are placed. When a scan places nothing (a reference cycle),
/// the remaining modules are appended in encounter order.
///
/// # Example
/// ```
/// # use weft_bytecode::{Module, ModuleIdentity};
/// # use weft_weaver::order::processing_order;
/// let core = Module::new("Core", "1.0.0");
/// let mut game = Module::new("Game", "1.0.0");
/// game.references.push(ModuleIdentity::new("Core", "1.0.0"));
///
/// assert_eq!(processing_order(&[game, core]), vec![1, 0]);
/// ```
pub fn processing_order<N: ModuleNode>(nodes: &[N]) -> Vec<usize> {
    let identities: Vec<String> = nodes.iter().map(|n| n.identity()).collect();
    let in_batch: HashSet<&str> = identities.iter().map(String::as_str).collect();

    // In-batch dependencies only; references outside the batch never block
    let dependencies: Vec<Vec<String>> = nodes
        .iter()
        .map(|n| {
            n.dependencies()
                .into_iter()
                .filter(|d| in_batch.contains(d.as_str()))
                .collect()
        })
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    let mut placed: HashSet<&str> = HashSet::new();
    let mut remaining = Vec::new();

    for (index, deps) in dependencies.iter().enumerate() {
        if deps.is_empty() {
            order.push(index);
            placed.insert(identities[index].as_str());
        } else {
            remaining.push(index);
        }
    }

    while !remaining.is_empty() {
        let before = remaining.len();

        remaining.retain(|&index| {
            let ready = dependencies[index]
                .iter()
                .all(|d| placed.contains(d.as_str()));
            if ready {
                order.push(index);
                placed.insert(identities[index].as_str());
            }
            !ready
        });

        if remaining.len() == before {
            log::warn!(
                "Unresolvable module references among: {}; keeping their input order",
                remaining
                    .iter()
                    .map(|&i| identities[i].as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            order.append(&mut remaining);
        }
    }

    order
}
