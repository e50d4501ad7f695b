// src/tasks/graph.rs

//! Static checks over the composition graph.

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{AssetflowError, Result};
use crate::tasks::registry::TaskRegistry;

/// Reject compositions that reference unknown tasks or contain a cycle.
///
/// Edge direction: composite -> member.
pub fn validate_registry(registry: &TaskRegistry) -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in registry.names() {
        graph.add_node(name);
    }

    for (name, node) in registry.iter() {
        for member in node.members() {
            if !registry.contains(member) {
                return Err(AssetflowError::TaskNotFound(format!(
                    "{member} (referenced by '{name}')"
                )));
            }
            graph.add_edge(name, member.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetflowError::TaskCycle(format!(
            "task composition cycle involving '{}'",
            cycle.node_id()
        ))),
    }
}
