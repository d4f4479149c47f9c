//! Property tests for the legacy-format migration.
//!
//! Every node and edge of an arbitrary legacy file must appear in the migrated
//! graph, with no edges duplicated or dropped.

use emgraph_core::formats::{migrate_legacy, LegacyEdgeAttrs, LegacyGraph, LegacyNodeAttrs};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn arb_legacy_graph() -> impl Strategy<Value = LegacyGraph> {
    let nodes = prop::collection::btree_set(0u32..64, 0..24);
    nodes.prop_flat_map(|node_ids| {
        let ids: Vec<u32> = node_ids.iter().copied().collect();
        let edge_pairs = if ids.is_empty() {
            prop::collection::vec((0u32..1, 0u32..1, 0.1f64..10.0), 0..1).boxed()
        } else {
            prop::collection::vec(
                (
                    prop::sample::select(ids.clone()),
                    prop::sample::select(ids.clone()),
                    0.1f64..10.0,
                ),
                0..48,
            )
            .boxed()
        };
        (Just(node_ids), edge_pairs)
    })
    .prop_map(|(node_ids, edge_pairs)| {
        let mut legacy = LegacyGraph::default();
        for id in &node_ids {
            legacy
                .node
                .insert(id.to_string(), LegacyNodeAttrs::default());
        }
        if !node_ids.is_empty() {
            for (source, target, weight) in edge_pairs {
                legacy
                    .edge
                    .entry(source.to_string())
                    .or_insert_with(BTreeMap::new)
                    .insert(
                        target.to_string(),
                        LegacyEdgeAttrs {
                            weight: Some(weight),
                        },
                    );
            }
        }
        legacy
    })
}

proptest! {
    #[test]
    fn migration_preserves_every_node(legacy in arb_legacy_graph()) {
        let graph = migrate_legacy(&legacy).unwrap();
        for key in legacy.node.keys() {
            let id: u32 = key.parse().unwrap();
            prop_assert!(graph.contains_node(id));
        }
    }

    #[test]
    fn migration_preserves_every_edge_exactly_once(legacy in arb_legacy_graph()) {
        let graph = migrate_legacy(&legacy).unwrap();

        let mut expected = HashSet::new();
        for (source, targets) in &legacy.edge {
            for target in targets.keys() {
                expected.insert((source.parse::<u32>().unwrap(), target.parse::<u32>().unwrap()));
            }
        }

        let migrated: Vec<(u32, u32)> = graph
            .edges()
            .into_iter()
            .map(|(s, t, _)| (s, t))
            .collect();
        let migrated_set: HashSet<(u32, u32)> = migrated.iter().copied().collect();

        // No duplicates, nothing dropped, nothing invented.
        prop_assert_eq!(migrated.len(), migrated_set.len());
        prop_assert_eq!(migrated_set, expected);
    }

    #[test]
    fn migration_preserves_weights(legacy in arb_legacy_graph()) {
        let graph = migrate_legacy(&legacy).unwrap();
        for (source, targets) in &legacy.edge {
            let s: u32 = source.parse().unwrap();
            for (target, attrs) in targets {
                let t: u32 = target.parse().unwrap();
                prop_assert_eq!(graph.edge_weight(s, t), attrs.weight);
            }
        }
    }
}
