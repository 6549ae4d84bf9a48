//! Property tests: random object graphs survive a snapshot round trip.

mod support;

use lockstep_snapshot::prelude::*;
use proptest::prelude::*;

use support::{factory, round_trip, TestSim, NODE_TAGS};

/// Per node: tag index, optional `next` target, link targets, and whether
/// it carries an event. Targets are indices into the node list.
type NodeSpec = (usize, Option<usize>, Vec<usize>, bool);

fn graph_strategy() -> impl Strategy<Value = (Vec<NodeSpec>, Vec<usize>)> {
    (1usize..24).prop_flat_map(|n| {
        let node = (
            0..NODE_TAGS.len(),
            proptest::option::of(0..n),
            proptest::collection::vec(0..n, 0..4),
            any::<bool>(),
        );
        (
            proptest::collection::vec(node, n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

fn build(specs: &[NodeSpec], root_order: &[usize]) -> TestSim {
    let mut sim = TestSim::new(1, false);
    let ids: Vec<ObjectId> = specs
        .iter()
        .enumerate()
        .map(|(i, (tag, ..))| sim.spawn(NODE_TAGS[*tag], &format!("n{i}")))
        .collect();
    for (i, (_, next, links, timed)) in specs.iter().enumerate() {
        let event = timed.then(|| sim.schedule(Some(ids[i]), i as u32, 7));
        let node = sim.node_mut(ids[i]);
        node.next = next.map(|j| ids[j]);
        node.links = links.iter().map(|&j| ids[j]).collect();
        node.event = event;
    }
    sim.roots = root_order.iter().map(|&i| Some(ids[i])).collect();
    sim.players = vec![sim.roots.last().copied().flatten()];
    sim
}

proptest! {
    #[test]
    fn random_graphs_round_trip((specs, order) in graph_strategy()) {
        let sim = build(&specs, &order);
        let restored = round_trip(&sim);
        prop_assert_eq!(restored.nodes(), sim.nodes());
        prop_assert_eq!(&restored.events, &sim.events);
        prop_assert_eq!(&restored.roots, &sim.roots);
    }

    #[test]
    fn snapshots_are_deterministic((specs, order) in graph_strategy()) {
        let config = SnapshotConfig::default();
        let sim = build(&specs, &order);
        let first = make_snapshot(&sim, &config).unwrap();
        let again = make_snapshot(&sim, &config).unwrap();
        prop_assert_eq!(first.bytes(), again.bytes());

        let restored = round_trip(&sim);
        let second = make_snapshot(&restored, &config).unwrap();
        prop_assert_eq!(first.state_hash(), second.state_hash());
    }

    #[test]
    fn corrupted_bytes_never_panic((specs, order) in graph_strategy(), flip in any::<prop::sample::Index>()) {
        let config = SnapshotConfig::default();
        let sim = build(&specs, &order);
        let mut bytes = make_snapshot(&sim, &config).unwrap().into_bytes();
        let at = flip.index(bytes.len());
        bytes[at] ^= 0xA5;
        let mut restored = sim.blank_like();
        // Any outcome is fine as long as it is reported rather than panicking.
        let _ = read_snapshot(&bytes, &mut restored, &factory(), &config);
    }
}
