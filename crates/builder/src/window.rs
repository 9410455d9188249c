//! Windowing strategies that decide which accesses co-occur.
//!
//! A window strategy consumes coarsened node ids in stream order and emits
//! unordered pairs of distinct ids. Within one window a pair is emitted at
//! most once, no matter how many instances of its endpoints the window
//! holds; an arrival whose id is already the id of the previous access
//! emits nothing for that repeat.

use std::collections::VecDeque;

use fxhash::FxHashSet;

use crate::access::NodeId;

/// Selects how temporally adjacent accesses are grouped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WindowKind {
    /// Non-overlapping groups of `window_size` accesses. Every unordered
    /// pair of distinct ids within a group co-occurs once. A partial group
    /// at the end of the stream is flushed like a full one.
    Fixed,
    /// Every arrival co-occurs once with each distinct id among the
    /// previous `window_size - 1` accesses.
    #[default]
    Sliding,
    /// Sliding behaviour with a self-tuning size: a running locality
    /// estimate above 0.75 shrinks the window by one (min 2), below 0.25
    /// grows it by one (max four times the configured size). Adjustments
    /// happen between accesses, never within one.
    Adaptive,
}

pub(crate) enum WindowState {
    Fixed(FixedWindow),
    Sliding(SlidingWindow),
    Adaptive(AdaptiveWindow),
}

impl WindowState {
    pub(crate) fn new(kind: WindowKind, window_size: usize) -> Self {
        match kind {
            WindowKind::Fixed => WindowState::Fixed(FixedWindow::new(window_size)),
            WindowKind::Sliding => WindowState::Sliding(SlidingWindow::new(window_size)),
            WindowKind::Adaptive => WindowState::Adaptive(AdaptiveWindow::new(window_size)),
        }
    }

    pub(crate) fn push<E: FnMut(NodeId, NodeId)>(&mut self, id: NodeId, emit: &mut E) {
        match self {
            WindowState::Fixed(w) => w.push(id, emit),
            WindowState::Sliding(w) => w.push(id, emit),
            WindowState::Adaptive(w) => w.push(id, emit),
        }
    }

    pub(crate) fn flush<E: FnMut(NodeId, NodeId)>(&mut self, emit: &mut E) {
        if let WindowState::Fixed(w) = self {
            w.flush(emit)
        }
    }
}

/// Counter plus a distinct-id set, cleared every `size` accesses.
pub(crate) struct FixedWindow {
    size: usize,
    fill: usize,
    members: Vec<NodeId>,
    seen: FxHashSet<NodeId>,
}

impl FixedWindow {
    fn new(size: usize) -> Self {
        Self {
            size,
            fill: 0,
            members: Vec::with_capacity(size),
            seen: FxHashSet::default(),
        }
    }

    fn push<E: FnMut(NodeId, NodeId)>(&mut self, id: NodeId, emit: &mut E) {
        if self.seen.insert(id) {
            self.members.push(id);
        }
        self.fill += 1;
        if self.fill == self.size {
            self.flush(emit);
        }
    }

    fn flush<E: FnMut(NodeId, NodeId)>(&mut self, emit: &mut E) {
        for i in 0..self.members.len() {
            for j in i + 1..self.members.len() {
                emit(self.members[i], self.members[j]);
            }
        }
        self.fill = 0;
        self.members.clear();
        self.seen.clear();
    }
}

/// Ring buffer over the last `size - 1` positions.
pub(crate) struct SlidingWindow {
    retained: usize,
    buf: VecDeque<NodeId>,
    scratch: FxHashSet<NodeId>,
}

impl SlidingWindow {
    fn new(size: usize) -> Self {
        Self {
            retained: size - 1,
            buf: VecDeque::with_capacity(size),
            scratch: FxHashSet::default(),
        }
    }

    fn push<E: FnMut(NodeId, NodeId)>(&mut self, id: NodeId, emit: &mut E) {
        self.emit_pairs(id, emit);
        self.slide(id);
    }

    fn emit_pairs<E: FnMut(NodeId, NodeId)>(&mut self, id: NodeId, emit: &mut E) {
        self.scratch.clear();
        for &prev in &self.buf {
            if prev != id && self.scratch.insert(prev) {
                emit(id, prev);
            }
        }
    }

    fn slide(&mut self, id: NodeId) {
        self.buf.push_back(id);
        while self.buf.len() > self.retained {
            self.buf.pop_front();
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.buf.iter().any(|&prev| prev == id)
    }
}

/// Sliding window whose size tracks a locality estimate.
///
/// The estimate is an exponential moving average (smoothing 1/8, starting
/// neutral at 0.5) of whether each arrival's id was already buffered.
pub(crate) struct AdaptiveWindow {
    inner: SlidingWindow,
    size: usize,
    min_size: usize,
    max_size: usize,
    locality: f64,
}

const LOCALITY_SMOOTHING: f64 = 1.0 / 8.0;
const SHRINK_ABOVE: f64 = 0.75;
const GROW_BELOW: f64 = 0.25;

impl AdaptiveWindow {
    fn new(size: usize) -> Self {
        Self {
            inner: SlidingWindow::new(size),
            size,
            min_size: 2,
            max_size: size * 4,
            locality: 0.5,
        }
    }

    fn push<E: FnMut(NodeId, NodeId)>(&mut self, id: NodeId, emit: &mut E) {
        let hit = self.inner.contains(id);
        self.inner.emit_pairs(id, emit);
        self.inner.slide(id);

        let observed = if hit { 1.0 } else { 0.0 };
        self.locality += (observed - self.locality) * LOCALITY_SMOOTHING;

        if self.locality > SHRINK_ABOVE && self.size > self.min_size {
            self.size -= 1;
        } else if self.locality < GROW_BELOW && self.size < self.max_size {
            self.size += 1;
        }
        self.inner.retained = self.size - 1;
        while self.inner.buf.len() > self.inner.retained {
            self.inner.buf.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_of(state: &mut WindowState, ids: &[NodeId]) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        let mut emit = |u: NodeId, v: NodeId| {
            pairs.push(if u < v { (u, v) } else { (v, u) });
        };
        for &id in ids {
            state.push(id, &mut emit);
        }
        state.flush(&mut emit);
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn fixed_window_pairs_each_group() {
        let mut w = WindowState::new(WindowKind::Fixed, 3);
        let pairs = pairs_of(&mut w, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3), (4, 5), (4, 6), (5, 6)]);
    }

    #[test]
    fn fixed_window_counts_duplicates_once() {
        let mut w = WindowState::new(WindowKind::Fixed, 4);
        // 1 appears three times in the group; the pair (1, 2) still
        // co-occurs exactly once.
        let pairs = pairs_of(&mut w, &[1, 1, 2, 1]);
        assert_eq!(pairs, vec![(1, 2)]);
    }

    #[test]
    fn fixed_window_flushes_partial_group() {
        let mut w = WindowState::new(WindowKind::Fixed, 4);
        let pairs = pairs_of(&mut w, &[7, 8]);
        assert_eq!(pairs, vec![(7, 8)]);
    }

    #[test]
    fn sliding_window_pairs_with_recent_positions() {
        let mut w = WindowState::new(WindowKind::Sliding, 3);
        // Window retains two positions: 3 pairs with {1, 2}, 4 with {2, 3}.
        let pairs = pairs_of(&mut w, &[1, 2, 3, 4]);
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3), (2, 4), (3, 4)]);
    }

    #[test]
    fn sliding_window_skips_repeated_id() {
        let mut w = WindowState::new(WindowKind::Sliding, 3);
        let pairs = pairs_of(&mut w, &[5, 5, 5, 6]);
        assert_eq!(pairs, vec![(5, 6)]);
    }

    #[test]
    fn sliding_window_dedups_within_window() {
        let mut w = WindowState::new(WindowKind::Sliding, 4);
        // The window before 9 arrives holds [8, 7, 8]; (8, 9) co-occurs
        // once for that arrival, not twice.
        let pairs = pairs_of(&mut w, &[8, 7, 8, 9]);
        assert_eq!(pairs, vec![(7, 8), (7, 8), (7, 9), (8, 9)]);
    }

    #[test]
    fn adaptive_window_grows_on_low_locality() {
        let mut w = AdaptiveWindow::new(4);
        let mut emit = |_: NodeId, _: NodeId| {};
        for id in 0..100u64 {
            w.push(id, &mut emit);
        }
        assert_eq!(w.size, 16);
    }

    #[test]
    fn adaptive_window_shrinks_on_high_locality() {
        let mut w = AdaptiveWindow::new(8);
        let mut emit = |_: NodeId, _: NodeId| {};
        for i in 0..100u64 {
            w.push(i % 2, &mut emit);
        }
        assert_eq!(w.size, 2);
    }
}
