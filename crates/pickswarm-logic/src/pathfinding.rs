//! A* pathfinding over the walkable floor grid.
//!
//! `PathPlanner` borrows a [`Grid`] and keeps no per-call state: every
//! request is searched from scratch against the blocked set it is given.
//! Moves are 4-connected with unit cost and the heuristic is Manhattan
//! distance. Ties on f-score are broken by cell order (`x`, then `y`), so
//! results are reproducible.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid::{Cell, Grid};

/// Stateless shortest-path search over one warehouse floor.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner<'g> {
    grid: &'g Grid,
}

impl<'g> PathPlanner<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// Find a shortest path from `start` to `goal`, both inclusive.
    ///
    /// Cells in `blocked` are never entered. Returns `[start]` when
    /// `start == goal` and an empty vec when the goal is unreachable.
    pub fn find_path(&self, start: Cell, goal: Cell, blocked: &HashSet<Cell>) -> Vec<Cell> {
        if start == goal {
            return vec![start];
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut g_score: HashMap<Cell, u32> = HashMap::new();
        let mut closed: HashSet<Cell> = HashSet::new();

        g_score.insert(start, 0);
        open.push(Reverse((start.manhattan(goal), start)));

        while let Some(Reverse((_, current))) = open.pop() {
            if current == goal {
                return reconstruct(&came_from, start, goal);
            }
            if !closed.insert(current) {
                continue;
            }

            let g = g_score[&current];
            for next in self.grid.neighbors(current) {
                if blocked.contains(&next) || closed.contains(&next) {
                    continue;
                }
                let tentative = g + 1;
                if g_score.get(&next).map_or(true, |&old| tentative < old) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative);
                    open.push(Reverse((tentative + next.manhattan(goal), next)));
                }
            }
        }

        Vec::new()
    }
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut node = goal;
    while let Some(&prev) = came_from.get(&node) {
        path.push(prev);
        node = prev;
    }
    debug_assert_eq!(node, start);
    path.reverse();
    path
}
