//! Testing utilities for stackstate workspace
//!
//! Shared fixtures for building resources, providers and snapshots, plus
//! proptest strategies for well-ordered snapshots.

#![allow(missing_docs)]

use proptest::prelude::*;
use stackstate_resource::{
    Manifest, ProviderReference, ResourceId, ResourceState, ResourceType, Snapshot, Urn,
};

pub const TEST_STACK: &str = "test";
pub const TEST_PROJECT: &str = "test";
pub const TEST_TYPE: &str = "a:b:c";

pub fn test_urn(name: &str) -> Urn {
    Urn::new(TEST_STACK, TEST_PROJECT, "", &ResourceType::new(TEST_TYPE), name)
}

pub fn provider_ref(provider: &ResourceState) -> ProviderReference {
    ProviderReference::new(provider.urn.clone(), provider.id.clone())
        .expect("fixture provider must have a provider type")
}

/// Custom resource of type `a:b:c`, optionally managed by `provider`.
pub fn new_resource(name: &str, provider: Option<&ResourceState>, deps: &[Urn]) -> ResourceState {
    let mut state = ResourceState::new(test_urn(name), ResourceType::new(TEST_TYPE))
        .with_dependencies(deps.to_vec());
    if let Some(provider) = provider {
        state = state.with_provider(provider_ref(provider));
    }
    state
}

/// Provider resource for package `pkg` with physical ID `id`.
pub fn new_provider_resource(pkg: &str, name: &str, id: &str, deps: &[Urn]) -> ResourceState {
    let ty = ResourceType::provider(pkg);
    ResourceState::new(Urn::new(TEST_STACK, TEST_PROJECT, "", &ty, name), ty)
        .with_id(ResourceId::new(id))
        .with_dependencies(deps.to_vec())
}

pub fn new_snapshot(resources: Vec<ResourceState>) -> Snapshot {
    Snapshot::new(Manifest::now("test"), resources)
}

/// Provider `p` managing `a`, `b`, `c`, with no other edges.
pub fn provider_fleet() -> Snapshot {
    let p = new_provider_resource("a", "p1", "0", &[]);
    let a = new_resource("a", Some(&p), &[]);
    let b = new_resource("b", Some(&p), &[]);
    let c = new_resource("c", Some(&p), &[]);
    new_snapshot(vec![p, a, b, c])
}

pub fn urns(snapshot: &Snapshot) -> Vec<Urn> {
    snapshot.iter().map(|r| r.urn.clone()).collect()
}

/// Choices for one generated resource instance, as positions into the
/// instances generated before it.
#[derive(Debug, Clone)]
struct SlotPlan {
    deps: Vec<usize>,
    parent: Option<usize>,
    managed: bool,
    /// Reuse the URN of an earlier instance, replacing it
    replaces: Option<usize>,
}

/// Strategy for well-ordered snapshots of up to `max_len` resource instances.
///
/// Instance 0 is always a provider. Every other instance references only
/// instances that precede it. Some instances replace an earlier one: they
/// reuse its URN and the earlier copies become pending deletions, so
/// snapshots include replacement pairs and replaced providers carrying a
/// new physical ID. Managed resources reference the latest provider
/// instance before them.
pub fn arb_snapshot(max_len: usize) -> impl Strategy<Value = Snapshot> {
    let max_len = max_len.max(2);
    (2..=max_len)
        .prop_flat_map(|len| {
            let plans: Vec<BoxedStrategy<SlotPlan>> = (1..len)
                .map(|i| {
                    (
                        proptest::collection::vec(0..i, 0..3),
                        proptest::option::of(0..i),
                        proptest::bool::ANY,
                        proptest::option::weighted(0.25, 0..i),
                    )
                        .prop_map(|(deps, parent, managed, replaces)| SlotPlan {
                            deps,
                            parent,
                            managed,
                            replaces,
                        })
                        .boxed()
                })
                .collect();
            plans
        })
        .prop_map(|plans| build_snapshot(&plans))
}

fn build_snapshot(plans: &[SlotPlan]) -> Snapshot {
    let mut resources = vec![new_provider_resource("a", "p0", "0", &[])];
    let mut latest_provider = 0;

    for (i, plan) in plans.iter().enumerate() {
        let slot = i + 1;
        let mut state = match plan.replaces.map(|j| &resources[j]) {
            Some(old) if old.ty.is_provider() => {
                let id = ResourceId::new(slot.to_string());
                ResourceState::new(old.urn.clone(), old.ty.clone()).with_id(id)
            }
            Some(old) => ResourceState::new(old.urn.clone(), old.ty.clone()),
            None => ResourceState::new(test_urn(&format!("r{slot}")), ResourceType::new(TEST_TYPE)),
        };

        let own = state.urn.clone();
        let mut deps: Vec<Urn> = plan
            .deps
            .iter()
            .map(|&d| resources[d].urn.clone())
            .filter(|urn| *urn != own)
            .collect();
        deps.sort();
        deps.dedup();
        state = state.with_dependencies(deps);
        if let Some(parent) = plan.parent.map(|p| &resources[p].urn).filter(|urn| **urn != own) {
            state = state.with_parent(parent.clone());
        }

        if state.ty.is_provider() {
            latest_provider = slot;
        } else if plan.managed {
            state = state.with_provider(provider_ref(&resources[latest_provider]));
        }
        resources.push(state);
    }

    // Every instance but the last per URN is a pending deletion.
    for i in 0..resources.len() {
        let replaced = resources[i + 1..].iter().any(|r| r.urn == resources[i].urn);
        resources[i].delete = replaced;
    }
    new_snapshot(resources)
}
