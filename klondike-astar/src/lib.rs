//! A parallel A* solver for Klondike Solitaire, searching for the
//! fewest-move win of a deal within a bounded move-tree budget.
//!
//! Symmetric worker threads share four structures: an append-only move
//! tree whose branches share prefixes, a priority fringe of branches
//! indexed by minimum completed-game move count, a closed list mapping
//! game-state fingerprints to the fewest moves known to reach them,
//! and the best solution found. There is no scheduler; the fringe is
//! the task queue.

mod block_vec;
mod fringe;
mod memory;
mod solver;
mod storage;

pub use crate::block_vec::BlockVec;
pub use crate::fringe::IndexedPriorityQueue;
pub use crate::memory::{GameState, GameStateCache};
pub use crate::solver::{SolveCode, SolveResult, default_threads, solve};
pub use crate::storage::{Branch, MoveStorage, SharedMoveStorage};
