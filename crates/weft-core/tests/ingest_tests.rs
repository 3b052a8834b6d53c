// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ingestion mechanics: interning, binding, strengthening, the wave.

mod common;

use common::{byte_node, scratch_brain, train};
use weft_core::NodeId;

#[test]
fn repeat_observations_strengthen_instead_of_duplicating() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "strengthen.weft");
    train(&mut brain, "ab", 2);

    // Two passes, below the promotion threshold: exactly a, b, one
    // forward edge, one stop edge.
    let stats = brain.stats();
    assert_eq!(stats.node_count, 2);
    assert_eq!(stats.edge_count, 2);

    let a = byte_node(&brain, b'a');
    let b = byte_node(&brain, b'b');
    let forward = brain
        .graph()
        .transition(a, b, false)
        .expect("forward edge a -> b");
    let edge = brain.graph().edge(forward).expect("edge record");
    // First bind 1.0, second strengthen 1/(1+1).
    assert!((edge.weight - 1.5).abs() < 1e-6);
    assert_eq!(edge.activations, 2);
}

#[test]
fn activations_count_every_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "activations.weft");
    train(&mut brain, "aba", 3);

    let a = byte_node(&brain, b'a');
    let b = byte_node(&brain, b'b');
    let graph = brain.graph();
    assert_eq!(graph.node(a).expect("a").activations, 6);
    assert_eq!(graph.node(b).expect("b").activations, 3);
    assert_eq!(brain.stats().activations_total, 9);
}

#[test]
fn incomplete_ingest_sustains_the_wave() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "wave.weft");

    brain.ingest(b"ab", false).expect("ingest");
    assert_eq!(brain.wave_len(), 2);

    brain.ingest(b"cd", false).expect("ingest");
    assert_eq!(brain.wave_len(), 4);

    // Sustained wave means the junction edge b -> c exists.
    let b = byte_node(&brain, b'b');
    let c = byte_node(&brain, b'c');
    assert!(brain.graph().transition(b, c, false).is_some());

    brain.ingest(b"", true).expect("complete");
    assert_eq!(brain.wave_len(), 0);
}

#[test]
fn completion_trains_a_stop_edge_and_clears_the_wave() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "complete.weft");
    brain.ingest(b"ab", true).expect("ingest");

    assert_eq!(brain.wave_len(), 0);
    let b = byte_node(&brain, b'b');
    assert!(brain.graph().transition(b, NodeId::STOP, true).is_some());
}

#[test]
fn completing_an_empty_wave_trains_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "noopcomplete.weft");
    brain.ingest(b"", true).expect("ingest");
    let stats = brain.stats();
    assert_eq!(stats.node_count, 0);
    assert_eq!(stats.edge_count, 0);
}

#[test]
fn input_buffer_feeds_the_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "buffer.weft");

    // Port-adapter style: queue bytes first, run the pipeline later.
    brain.push_input(b"ab");
    brain.push_input(b"c");
    brain.ingest_buffered(false).expect("ingest");

    assert_eq!(brain.stats().node_count, 3);
    assert_eq!(brain.wave_len(), 3);
    let a = byte_node(&brain, b'a');
    let b = byte_node(&brain, b'b');
    assert!(brain.graph().transition(a, b, false).is_some());
}

#[test]
fn generation_records_land_in_the_output_buffer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "outbuf.weft");
    train(&mut brain, "ab", 2);
    brain.ingest(b"a", false).expect("prime");

    let out = brain.generate(4).expect("generate");
    assert_eq!(out, brain.last_output());
    assert_eq!(out, b"b");
}

#[test]
fn zero_budget_generation_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "zerobudget.weft");
    brain.ingest(b"ab", false).expect("ingest");
    let out = brain.generate(0).expect("generate");
    assert!(out.is_empty());
}
