// src/dag/graph.rs

//! Index-based dependency matrices with an incrementally maintained
//! transitive closure.
//!
//! Tasks are identified by their index `0..task_count`. For every ordered
//! pair `(p, s)` the graph keeps:
//! - an [`EdgeState`] marker,
//! - whether `p` transitively reaches `s` ("following" matrix),
//!
//! plus a per-task incoming edge counter.
//!
//! The closure is extended every time an edge is committed, which turns the
//! cycle test for a new edge into a single lookup instead of a graph search.

use crate::types::EdgeState;

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    task_count: usize,
    /// Row-major `task_count * task_count` edge markers.
    edges: Vec<EdgeState>,
    /// Row-major reachability: `following[p][s]` is true if `p` reaches `s`.
    following: Vec<bool>,
    incoming: Vec<usize>,
}

impl DependencyGraph {
    /// Create an edgeless graph over `task_count` tasks.
    pub fn new(task_count: usize) -> Self {
        Self {
            task_count,
            edges: vec![EdgeState::None; task_count * task_count],
            following: vec![false; task_count * task_count],
            incoming: vec![0; task_count],
        }
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    fn cell(&self, predecessor: usize, successor: usize) -> usize {
        debug_assert!(predecessor < self.task_count && successor < self.task_count);
        predecessor * self.task_count + successor
    }

    pub fn edge_state(&self, predecessor: usize, successor: usize) -> EdgeState {
        self.edges[self.cell(predecessor, successor)]
    }

    pub fn is_connected(&self, predecessor: usize, successor: usize) -> bool {
        self.edge_state(predecessor, successor) == EdgeState::Connected
    }

    /// O(1) cycle test for a candidate edge `predecessor -> successor`.
    pub fn would_create_cycle(&self, predecessor: usize, successor: usize) -> bool {
        self.edge_state(predecessor, successor) == EdgeState::WouldCreateCycle
    }

    /// Whether `predecessor` transitively reaches `successor`.
    pub fn reaches(&self, predecessor: usize, successor: usize) -> bool {
        self.following[self.cell(predecessor, successor)]
    }

    pub fn incoming_count(&self, task: usize) -> usize {
        self.incoming[task]
    }

    /// Commit the edge `predecessor -> successor`.
    ///
    /// The caller is responsible for rejecting self edges, duplicates and
    /// cycle-forming edges first (see [`crate::dag::builder`]).
    ///
    /// Every task that reaches `predecessor` (and `predecessor` itself) now
    /// reaches `successor` and everything `successor` reaches. For each such
    /// newly ordered pair `(a, b)`, the reverse cell `(b, a)` is marked
    /// [`EdgeState::WouldCreateCycle`].
    pub fn connect(&mut self, predecessor: usize, successor: usize) {
        let cell = self.cell(predecessor, successor);
        self.edges[cell] = EdgeState::Connected;
        self.incoming[successor] += 1;

        let mut upstream = vec![predecessor];
        upstream.extend((0..self.task_count).filter(|&i| self.reaches(i, predecessor)));

        let mut downstream = vec![successor];
        downstream.extend((0..self.task_count).filter(|&i| self.reaches(successor, i)));

        for &a in &upstream {
            for &b in &downstream {
                let forward = self.cell(a, b);
                self.following[forward] = true;

                let backward = self.cell(b, a);
                if self.edges[backward] != EdgeState::Connected {
                    self.edges[backward] = EdgeState::WouldCreateCycle;
                }
            }
        }
    }

    /// Tasks with no incoming edge, in index order.
    pub fn ready_tasks(&self) -> Vec<usize> {
        (0..self.task_count)
            .filter(|&task| self.incoming[task] == 0)
            .collect()
    }

    /// Remove every outgoing edge of `completed` and return the successors
    /// whose incoming counter just reached zero, in index order.
    pub fn release(&mut self, completed: usize) -> Vec<usize> {
        let mut next = Vec::new();

        for other in 0..self.task_count {
            let cell = self.cell(completed, other);
            if self.edges[cell] != EdgeState::Connected {
                continue;
            }

            self.edges[cell] = EdgeState::None;
            self.incoming[other] -= 1;
            if self.incoming[other] == 0 {
                next.push(other);
            }
        }

        next
    }

    /// Direct successors of `task`.
    pub fn successors_of(&self, task: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.task_count).filter(move |&other| self.is_connected(task, other))
    }

    /// Direct predecessors of `task`.
    pub fn predecessors_of(&self, task: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.task_count).filter(move |&other| self.is_connected(other, task))
    }

    /// All committed edges as `(predecessor, successor)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.task_count).flat_map(move |p| self.successors_of(p).map(move |s| (p, s)))
    }

    pub fn edge_count(&self) -> usize {
        self.incoming.iter().sum()
    }
}
