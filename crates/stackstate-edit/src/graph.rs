//! Dependency graph over resource instances
//!
//! One node per resource instance, in snapshot order, and one edge from a
//! referenced instance to each instance that references it. Edges are
//! labelled with the [`ReferenceKind`] that produced them, so dependencies,
//! parent containment and provider management fold into one relation.
//!
//! References name URNs, not instances: when two instances share a URN
//! (mid-replacement), a reference to that URN produces an edge from each.

use crate::config::{EditConfig, ProviderMatch};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;
use stackstate_resource::{Reference, ReferenceKind, ResourceIndex, Snapshot, Urn};
use std::collections::HashMap;

/// Reverse-edge index of a snapshot
#[derive(Debug)]
pub struct DependencyGraph<'s> {
    snapshot: &'s Snapshot,
    graph: DiGraph<ResourceIndex, ReferenceKind>,
}

impl<'s> DependencyGraph<'s> {
    /// Build with default configuration
    #[inline]
    #[must_use]
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self::with_config(snapshot, &EditConfig::default())
    }

    /// Build with explicit configuration
    #[must_use]
    pub fn with_config(snapshot: &'s Snapshot, config: &EditConfig) -> Self {
        let mut graph = DiGraph::with_capacity(snapshot.len(), snapshot.len());
        let mut by_urn: HashMap<&Urn, Vec<NodeIndex>> = HashMap::new();

        // Node i is resource i.
        for (index, resource) in snapshot.indexed() {
            let node = graph.add_node(index);
            by_urn.entry(&resource.urn).or_default().push(node);
        }

        for (index, resource) in snapshot.indexed() {
            let dependent = NodeIndex::new(index.position());
            for reference in resource.references() {
                let Some(targets) = by_urn.get(reference.urn) else {
                    continue;
                };
                for target in resolve(&reference, targets, snapshot, config) {
                    graph.add_edge(target, dependent, reference.kind);
                }
            }
        }

        Self { snapshot, graph }
    }

    /// Snapshot the graph was built from
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &'s Snapshot {
        self.snapshot
    }

    /// Number of decoded edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resources referencing `target` directly, with the edge kind
    ///
    /// One entry per edge, so a resource naming the target both as parent
    /// and as dependency appears twice. Sorted by snapshot position.
    #[must_use]
    pub fn direct_dependents(&self, target: ResourceIndex) -> Vec<(ResourceIndex, ReferenceKind)> {
        if self.snapshot.get(target).is_none() {
            return Vec::new();
        }
        let mut direct: Vec<_> = self
            .graph
            .edges_directed(NodeIndex::new(target.position()), Direction::Outgoing)
            .map(|edge| (self.graph[edge.target()], *edge.weight()))
            .collect();
        direct.sort_by_key(|(index, _)| *index);
        direct
    }

    /// Every resource depending on `target`, directly or transitively
    ///
    /// Breadth-first closure over all edge kinds. The result is a set of
    /// instances in snapshot order: no duplicates, and never the target
    /// itself. The other half of a replacement is included only when it
    /// actually depends on the target through some chain.
    /// An out-of-range handle has no dependents.
    #[must_use]
    pub fn dependents_of(&self, target: ResourceIndex) -> Vec<ResourceIndex> {
        if self.snapshot.get(target).is_none() {
            return Vec::new();
        }

        let start = NodeIndex::new(target.position());
        let mut bfs = Bfs::new(&self.graph, start);
        let mut dependents = Vec::new();
        while let Some(node) = bfs.next(&self.graph) {
            if node != start {
                dependents.push(self.graph[node]);
            }
        }
        dependents.sort_unstable();
        dependents
    }
}

/// Instances among `candidates` (all carrying the referenced URN) that a
/// reference resolves to
///
/// Exact ID matching narrows a provider reference to the instances with the
/// recorded ID. When none carries it, the reference still resolves by URN:
/// otherwise deleting the provider would leave the reference dangling.
fn resolve(
    reference: &Reference<'_>,
    candidates: &[NodeIndex],
    snapshot: &Snapshot,
    config: &EditConfig,
) -> Vec<NodeIndex> {
    let exact = reference.kind == ReferenceKind::Provider && config.provider_match == ProviderMatch::UrnAndId;
    if exact {
        let by_id: Vec<NodeIndex> = candidates
            .iter()
            .copied()
            .filter(|node| reference.id == Some(&snapshot.resources()[node.index()].id))
            .collect();
        if !by_id.is_empty() {
            return by_id;
        }
    }
    candidates.to_vec()
}

/// Dependents of `target` under the default configuration
///
/// See [`DependencyGraph::dependents_of`].
#[must_use]
pub fn dependents_of(snapshot: &Snapshot, target: ResourceIndex) -> Vec<ResourceIndex> {
    DependencyGraph::new(snapshot).dependents_of(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stackstate_resource::ResourceId;
    use stackstate_test_utils::{new_provider_resource, new_resource, new_snapshot, test_urn};

    fn ix(position: usize) -> ResourceIndex {
        ResourceIndex::new(position)
    }

    #[test]
    fn mixed_chain_closure() {
        // a <- b (dependency), b <- c (parent), a <- d (provider), e unrelated
        let a = new_provider_resource("a", "a", "0", &[]);
        let b = new_resource("b", None, &[a.urn.clone()]);
        let c = new_resource("c", None, &[]).with_parent(b.urn.clone());
        let d = new_resource("d", Some(&a), &[]);
        let e = new_resource("e", None, &[]);
        let snap = new_snapshot(vec![a, b, c, d, e]);

        assert_eq!(dependents_of(&snap, ix(0)), vec![ix(1), ix(2), ix(3)]);
    }

    #[test]
    fn provider_then_dependency_chain() {
        // p <- a (provider), a <- b (dependency)
        let p = new_provider_resource("a", "p", "0", &[]);
        let a = new_resource("a", Some(&p), &[]);
        let b = new_resource("b", None, &[a.urn.clone()]);
        let snap = new_snapshot(vec![p, a, b]);

        assert_eq!(dependents_of(&snap, ix(0)), vec![ix(1), ix(2)]);
        assert_eq!(dependents_of(&snap, ix(1)), vec![ix(2)]);
        assert!(dependents_of(&snap, ix(2)).is_empty());
    }

    #[test]
    fn diamond_is_deduplicated() {
        let a = new_resource("a", None, &[]);
        let b = new_resource("b", None, &[a.urn.clone()]);
        let c = new_resource("c", None, &[a.urn.clone()]);
        let d = new_resource("d", None, &[b.urn.clone(), c.urn.clone()]).with_parent(a.urn.clone());
        let snap = new_snapshot(vec![a, b, c, d]);

        assert_eq!(dependents_of(&snap, ix(0)), vec![ix(1), ix(2), ix(3)]);
    }

    #[test]
    fn direct_dependents_report_edge_kind() {
        let p = new_provider_resource("a", "p", "0", &[]);
        let a = new_resource("a", Some(&p), &[p.urn.clone()]);
        let b = new_resource("b", None, &[]).with_parent(p.urn.clone());
        let snap = new_snapshot(vec![p, a, b]);

        let mut direct = DependencyGraph::new(&snap).direct_dependents(ix(0));
        direct.sort_by_key(|(i, kind)| (*i, format!("{kind:?}")));
        assert_eq!(
            direct,
            vec![
                (ix(1), ReferenceKind::Dependency),
                (ix(1), ReferenceKind::Provider),
                (ix(2), ReferenceKind::Parent),
            ]
        );
    }

    #[test]
    fn both_halves_of_a_replacement_are_targets() {
        let a = new_resource("a", None, &[]);
        let stale = new_resource("a", None, &[]).with_pending_delete(true);
        let b = new_resource("b", None, &[test_urn("a")]);
        let snap = new_snapshot(vec![a, stale, b]);

        assert_eq!(dependents_of(&snap, ix(0)), vec![ix(2)]);
        assert_eq!(dependents_of(&snap, ix(1)), vec![ix(2)]);
    }

    #[test]
    fn replacement_twin_depending_through_a_chain() {
        // stale a <- b <- live a
        let stale = new_resource("a", None, &[]).with_pending_delete(true);
        let b = new_resource("b", None, &[test_urn("a")]);
        let live = new_resource("a", None, &[test_urn("b")]);
        let snap = new_snapshot(vec![stale, b, live]);

        assert_eq!(dependents_of(&snap, ix(0)), vec![ix(1), ix(2)]);
        assert_eq!(dependents_of(&snap, ix(2)), vec![ix(1)]);
    }

    #[test]
    fn exact_ids_fall_back_to_urn_when_no_instance_matches() {
        // x still records the provider's previous ID.
        let stale = new_provider_resource("a", "p", "0", &[]);
        let x = new_resource("x", Some(&stale), &[]);
        let p = stale.with_id(ResourceId::new("1"));
        let snap = new_snapshot(vec![p, x]);

        let config = EditConfig::new().with_provider_match(ProviderMatch::UrnAndId);
        let exact = DependencyGraph::with_config(&snap, &config);
        assert_eq!(exact.dependents_of(ix(0)), vec![ix(1)]);
    }

    #[test]
    fn replacement_twin_is_not_a_dependent() {
        let a = new_resource("a", None, &[]);
        let stale = new_resource("a", None, &[]).with_pending_delete(true);
        let snap = new_snapshot(vec![a, stale]);

        assert!(dependents_of(&snap, ix(0)).is_empty());
        assert!(dependents_of(&snap, ix(1)).is_empty());
    }

    #[test]
    fn replaced_provider_policies() {
        // Old provider instance (id 0, pending delete) and its replacement (id 1).
        let old = new_provider_resource("a", "p", "0", &[]).with_pending_delete(true);
        let new = new_provider_resource("a", "p", "1", &[]);
        let on_old = new_resource("x", Some(&old), &[]);
        let on_new = new_resource("y", Some(&new), &[]);
        let snap = new_snapshot(vec![old, new, on_old, on_new]);

        let by_urn = DependencyGraph::new(&snap);
        assert_eq!(by_urn.dependents_of(ix(0)), vec![ix(2), ix(3)]);
        assert_eq!(by_urn.dependents_of(ix(1)), vec![ix(2), ix(3)]);

        let config = EditConfig::new().with_provider_match(ProviderMatch::UrnAndId);
        let exact = DependencyGraph::with_config(&snap, &config);
        assert_eq!(exact.dependents_of(ix(0)), vec![ix(2)]);
        assert_eq!(exact.dependents_of(ix(1)), vec![ix(3)]);
    }

    #[test]
    fn dangling_references_are_ignored() {
        let b = new_resource("b", None, &[test_urn("gone")]).with_parent(test_urn("also-gone"));
        let snap = new_snapshot(vec![b]);

        let graph = DependencyGraph::new(&snap);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.dependents_of(ix(0)).is_empty());
    }

    #[test]
    fn out_of_range_target_has_no_dependents() {
        let snap = new_snapshot(vec![new_resource("a", None, &[])]);
        assert!(dependents_of(&snap, ix(5)).is_empty());
        assert!(DependencyGraph::new(&snap).direct_dependents(ix(5)).is_empty());
    }
}
