// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Brain-file persistence: round-trips, determinism, and damage handling.

mod common;

use std::fs;

use common::{brain_path, prime, scratch_brain, train, SEED};
use weft_core::{Brain, BrainError};

#[test]
fn save_load_round_trip_preserves_every_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "roundtrip.weft");
    train(&mut brain, "hello world", 6);
    train(&mut brain, "cat meow", 4);
    prime(&mut brain, "hel");
    brain.save().expect("save");

    let loaded = Brain::load(brain.path()).expect("load");
    assert_eq!(loaded.stats(), brain.stats());
    assert_eq!(loaded.wave_len(), brain.wave_len());

    let (a, b) = (brain.graph(), loaded.graph());
    assert_eq!(a.node_count(), b.node_count());
    assert_eq!(a.edge_count(), b.edge_count());
    for (id, node) in a.iter_nodes() {
        let other = b.node(id).expect("node survives the round-trip");
        assert_eq!(node.payload, other.payload);
        assert_eq!(node.level, other.level);
        assert_eq!(node.activations, other.activations);
        assert_eq!(node.outgoing, other.outgoing);
        assert_eq!(node.incoming, other.incoming);
    }
    for edge in a.iter_edges() {
        let other = b.edge(edge.id).expect("edge survives the round-trip");
        assert_eq!(edge.from, other.from);
        assert_eq!(edge.to, other.to);
        assert_eq!(edge.is_stop, other.is_stop);
        assert_eq!(edge.activations, other.activations);
        assert!((edge.weight - other.weight).abs() < f32::EPSILON);
        let tags: Vec<_> = edge.tags.iter().copied().collect();
        let other_tags: Vec<_> = other.tags.iter().copied().collect();
        assert_eq!(tags, other_tags);
    }
}

#[test]
fn generation_is_identical_across_a_save_close_load() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Left side: ingest, save, close, load, generate.
    let left_path = brain_path(&dir, "left.weft");
    let mut left = Brain::create_seeded(&left_path, SEED).expect("create left");
    left.ingest(b"abcab", false).expect("ingest");
    left.save().expect("save");
    left.close();
    let mut left = Brain::load(&left_path).expect("load");
    let left_out = left.generate(8).expect("generate");

    // Right side: same seed, same bytes, no detour through disk.
    let mut right = Brain::create_seeded(brain_path(&dir, "right.weft"), SEED).expect("create");
    right.ingest(b"abcab", false).expect("ingest");
    let right_out = right.generate(8).expect("generate");

    assert_eq!(left_out, right_out);
}

#[test]
fn saved_brain_generates_like_the_original() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut original = scratch_brain(&dir, "original.weft");
    train(&mut original, "abc", 3);
    original.save().expect("save");

    let mut reloaded = Brain::load(original.path()).expect("load");
    assert_eq!(reloaded.stats(), original.stats());

    prime(&mut original, "a");
    prime(&mut reloaded, "a");
    let from_original = original.generate(8).expect("generate original");
    let from_reloaded = reloaded.generate(8).expect("generate reloaded");
    assert_eq!(from_original, from_reloaded);
}

#[test]
fn create_refuses_an_occupied_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = brain_path(&dir, "occupied.weft");
    let brain = Brain::create(&path).expect("create");
    drop(brain);

    let err = Brain::create(&path).expect_err("second create must fail");
    assert!(matches!(err, BrainError::AlreadyExists(_)));
}

#[test]
fn load_reports_missing_files_as_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Brain::load(brain_path(&dir, "absent.weft")).expect_err("load must fail");
    assert!(matches!(err, BrainError::Io(_)));
}

#[test]
fn load_reports_garbage_as_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = brain_path(&dir, "garbage.weft");
    fs::write(&path, b"not a brain file at all, not even close......").expect("write");
    let err = Brain::load(&path).expect_err("load must fail");
    assert!(matches!(err, BrainError::Corrupt(_)));
}

#[test]
fn load_reports_a_flipped_byte_as_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "flipped.weft");
    train(&mut brain, "abc", 2);
    brain.save().expect("save");

    let mut bytes = fs::read(brain.path()).expect("read");
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;
    fs::write(brain.path(), &bytes).expect("rewrite");

    let err = Brain::load(brain.path()).expect_err("load must fail");
    assert!(matches!(err, BrainError::Corrupt(_)));
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut brain = scratch_brain(&dir, "clean.weft");
    train(&mut brain, "abc", 2);
    brain.save().expect("save");

    let mut tmp = brain.path().as_os_str().to_owned();
    tmp.push(".tmp");
    assert!(!std::path::Path::new(&tmp).exists());
    assert!(brain.path().exists());
}
