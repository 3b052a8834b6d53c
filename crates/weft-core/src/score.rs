// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-edge activation scoring for the generation walk.
//!
//! `score(e) = base(e) · context(e) · hierarchy(target) · stop_modifier(e)`
//!
//! - `base` normalises the edge weight over its stop class: regular edges
//!   compete with regular edges, stop edges with stop edges. A zero class
//!   total degrades to uniform.
//! - `context` rewards tags that are present in the current wave, with a
//!   geometric recency discount: the wave entry nearest the current node
//!   weighs 1.0, each older entry half that. Stale context fades instead
//!   of outvoting what just happened.
//! - `hierarchy` favours targets that emit more bytes per step.
//! - `stop_modifier` scales a stop edge by the source's observed
//!   completion rate, derived entirely from persisted counters.
//!
//! Non-finite weights are clamped out: the edge is excluded from the step
//! entirely rather than poisoning the normalisation.

use crate::constants::{
    CONTEXT_EPSILON, CONTEXT_WEIGHT, HIERARCHY_WEIGHT, WAVE_RECENCY,
};
use crate::graph::GraphStore;
use crate::ident::{EdgeId, NodeId};
use crate::record::EdgeRecord;
use crate::tags::ContextTags;
use crate::wave::Wave;

/// One scored outgoing edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    /// Edge under consideration.
    pub(crate) edge: EdgeId,
    /// Its target (the stop sentinel for stop edges).
    pub(crate) to: NodeId,
    /// Final combined score, finite and nonnegative.
    pub(crate) score: f32,
}

/// Scores for one walk step, split by stop class.
#[derive(Debug, Default)]
pub(crate) struct StepScores {
    pub(crate) regular: Vec<Candidate>,
    pub(crate) stop: Vec<Candidate>,
}

impl StepScores {
    /// Highest-scoring regular candidate; ties resolve to the first seen,
    /// which is the lowest edge id because adjacency is id-ordered.
    pub(crate) fn best_regular(&self) -> Option<&Candidate> {
        best(&self.regular)
    }

    /// Highest-scoring stop candidate, same tie-break.
    pub(crate) fn best_stop(&self) -> Option<&Candidate> {
        best(&self.stop)
    }
}

fn best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut it = candidates.iter();
    let mut winner = it.next()?;
    for c in it {
        if c.score > winner.score {
            winner = c;
        }
    }
    Some(winner)
}

/// Scores every outgoing edge of `source` against the current wave.
pub(crate) fn score_step(store: &GraphStore, wave: &Wave, source: NodeId) -> StepScores {
    let Some(node) = store.node(source) else {
        return StepScores::default();
    };

    // First pass: class totals over finite weights only.
    let mut regular_total = 0.0f32;
    let mut regular_count = 0usize;
    let mut stop_total = 0.0f32;
    let mut stop_count = 0usize;
    for &eid in &node.outgoing {
        let Some(edge) = store.edge(eid) else {
            debug_assert!(false, "adjacency references missing edge: {eid:?}");
            continue;
        };
        if !edge.weight.is_finite() {
            continue;
        }
        let w = edge.weight.max(0.0);
        if edge.is_stop {
            stop_total += w;
            stop_count += 1;
        } else {
            regular_total += w;
            regular_count += 1;
        }
    }

    let mut scores = StepScores::default();
    for &eid in &node.outgoing {
        let Some(edge) = store.edge(eid) else {
            continue;
        };
        if !edge.weight.is_finite() {
            continue;
        }
        let (class_total, class_count) = if edge.is_stop {
            (stop_total, stop_count)
        } else {
            (regular_total, regular_count)
        };
        let base = class_base(edge, class_total, class_count);
        let context = context_factor(&edge.tags, wave);
        let hierarchy = hierarchy_factor(store, edge.to);
        let modifier = if edge.is_stop {
            completion_rate(edge, node.activations)
        } else {
            1.0
        };
        let candidate = Candidate {
            edge: eid,
            to: edge.to,
            score: base * context * hierarchy * modifier,
        };
        if edge.is_stop {
            scores.stop.push(candidate);
        } else {
            scores.regular.push(candidate);
        }
    }
    scores
}

fn class_base(edge: &EdgeRecord, class_total: f32, class_count: usize) -> f32 {
    if class_total > 0.0 {
        edge.weight.max(0.0) / class_total
    } else if class_count > 0 {
        // Degenerate class: all weights zero. Uniform keeps the walk alive.
        1.0 / class_count as f32
    } else {
        0.0
    }
}

/// Recency-discounted overlap between an edge's tags and the wave.
fn context_factor(tags: &ContextTags, wave: &Wave) -> f32 {
    let mut overlap = 0.0f32;
    let mut norm = 0.0f32;
    let mut weight = 1.0f32;
    for node in wave.context() {
        overlap += weight * tags.strength_of(node);
        norm += weight;
        weight *= WAVE_RECENCY;
    }
    1.0 + CONTEXT_WEIGHT * overlap / (norm + CONTEXT_EPSILON)
}

fn hierarchy_factor(store: &GraphStore, to: NodeId) -> f32 {
    store
        .node(to)
        .map_or(1.0, |n| 1.0 + HIERARCHY_WEIGHT * n.level as f32)
}

/// Fraction of traversals through the source that ended a sequence on
/// this stop edge, clamped to `[0, 1]`.
fn completion_rate(edge: &EdgeRecord, source_activations: u64) -> f32 {
    let rate = edge.activations as f32 / source_activations.max(1) as f32;
    rate.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::NodeId;
    use crate::record::{EdgeRecord, NodeRecord};
    use bytes::Bytes;

    fn store_with_fanout(weights: &[f32]) -> (GraphStore, NodeId) {
        let mut store = GraphStore::new();
        let source = NodeId(0);
        store.push_node(NodeRecord::new(Bytes::from_static(b"s"), 0, Vec::new()));
        for (i, &w) in weights.iter().enumerate() {
            let to = NodeId(i as u32 + 1);
            store.push_node(NodeRecord::new(
                Bytes::copy_from_slice(&[b'a' + i as u8]),
                0,
                Vec::new(),
            ));
            let eid = crate::ident::EdgeId(i as u32);
            store.push_edge(EdgeRecord::new(eid, source, to, false, w));
            if let Some(n) = store.node_mut(source) {
                n.outgoing.push(eid);
            }
            if let Some(n) = store.node_mut(to) {
                n.incoming.push(eid);
            }
        }
        (store, source)
    }

    fn primed_wave(node: NodeId) -> Wave {
        let mut wave = Wave::new();
        wave.push(node);
        wave
    }

    #[test]
    fn zero_weights_score_uniform() {
        let (store, source) = store_with_fanout(&[0.0, 0.0]);
        let scores = score_step(&store, &primed_wave(source), source);
        assert_eq!(scores.regular.len(), 2);
        let a = scores.regular[0].score;
        let b = scores.regular[1].score;
        assert!((a - b).abs() < f32::EPSILON);
        assert!(a > 0.0);
    }

    #[test]
    fn nan_weight_excludes_the_edge() {
        let (mut store, source) = store_with_fanout(&[1.0, 2.0]);
        if let Some(e) = store.edge_mut(crate::ident::EdgeId(0)) {
            e.weight = f32::NAN;
        }
        let scores = score_step(&store, &primed_wave(source), source);
        assert_eq!(scores.regular.len(), 1);
        assert_eq!(scores.regular[0].edge, crate::ident::EdgeId(1));
    }

    #[test]
    fn heavier_edge_scores_higher_without_context() {
        let (store, source) = store_with_fanout(&[1.0, 3.0]);
        let scores = score_step(&store, &primed_wave(source), source);
        let best = scores.best_regular().map(|c| c.edge);
        assert_eq!(best, Some(crate::ident::EdgeId(1)));
    }
}
