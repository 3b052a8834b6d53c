// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hierarchy formation: span nodes, lineage, and idempotence.

mod common;

use common::{byte_node, payload_node, scratch_brain, train};
use weft_core::NodeId;

#[test]
fn hot_pairs_promote_into_span_nodes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "promote.weft");
    train(&mut brain, "ab", 5);

    let span = payload_node(&brain, b"ab").expect("span node formed");
    let record = brain.graph().node(span).expect("span record");
    assert_eq!(record.level, 1);
    assert_eq!(record.payload.as_ref(), b"ab");

    let a = byte_node(&brain, b'a');
    let b = byte_node(&brain, b'b');
    assert_eq!(record.children, vec![a, b]);
}

#[test]
fn span_payload_is_the_concatenation_of_its_children() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "lineage.weft");
    train(&mut brain, "hello world", 12);
    train(&mut brain, "hello there", 12);

    let graph = brain.graph();
    let mut spans = 0usize;
    for (_, node) in graph.iter_nodes() {
        if node.level == 0 {
            assert!(node.children.is_empty());
            continue;
        }
        spans += 1;
        assert_eq!(node.children.len(), 2, "span with odd lineage");
        let mut expected = Vec::new();
        for &child in &node.children {
            let child_record = graph.node(child).expect("child is live");
            expected.extend_from_slice(&child_record.payload);
        }
        assert_eq!(
            node.payload.as_ref(),
            expected.as_slice(),
            "span payload is not its children's concatenation"
        );
    }
    assert!(spans > 0, "training this hard must form spans");
}

#[test]
fn promotion_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "idempotent.weft");
    train(&mut brain, "ab", 20);

    let graph = brain.graph();
    let spans = graph
        .iter_nodes()
        .filter(|(_, n)| n.payload.as_ref() == b"ab")
        .count();
    assert_eq!(spans, 1, "re-crossing the threshold must not re-promote");
}

#[test]
fn span_inherits_a_stop_edge_from_its_tail_child() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "spanstop.weft");
    train(&mut brain, "ab", 5);

    // `b` ends the sequence while `a` is in context, so the fused span
    // ends it too.
    let span = payload_node(&brain, b"ab").expect("span node");
    let stop = brain.graph().transition(span, NodeId::STOP, true);
    assert!(stop.is_some(), "span should have cloned b's stop edge");
}

#[test]
fn promotion_counters_start_fresh() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "fresh.weft");
    train(&mut brain, "ab", 5);

    let span = payload_node(&brain, b"ab").expect("span node");
    let record = brain.graph().node(span).expect("span record");
    // The span was never selected by ingestion or generation.
    assert_eq!(record.activations, 0);
}
