//! Longest dependency chains
//!
//! Shared by depth assignment and critical-path extraction. The traversal is
//! a memoized post-order DFS on an explicit stack with an on-path guard, so
//! it terminates even if handed a graph that still contains a cycle.

/// Per-step longest chain ending at that step
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chains {
    /// Number of steps in the longest chain ending here (roots have 1)
    pub(crate) length: Vec<usize>,
    /// Dependency that produced `length`, first encountered on ties
    pub(crate) predecessor: Vec<Option<usize>>,
}

impl Chains {
    /// Depth of a step: 0 for roots
    #[inline]
    pub(crate) fn depth(&self, node: usize) -> usize {
        self.length[node].saturating_sub(1)
    }

    /// First step with the overall longest chain
    pub(crate) fn terminus(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (node, &length) in self.length.iter().enumerate() {
            if best.map_or(true, |b| length > self.length[b]) {
                best = Some(node);
            }
        }
        best
    }

    /// Walk predecessors from `terminus` back to a root; returned root first
    pub(crate) fn path_to(&self, terminus: usize) -> Vec<usize> {
        let mut path = vec![terminus];
        let mut current = terminus;
        while let Some(previous) = self.predecessor[current] {
            // Predecessors always have strictly shorter chains, so this ends
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

/// Compute longest chains over `adjacency`, where `adjacency[i]` lists the
/// dependencies of step `i`
///
/// A dependency that is still on the current path contributes nothing.
pub(crate) fn longest_chains(adjacency: &[Vec<usize>]) -> Chains {
    let n = adjacency.len();
    // 0 means not yet computed; computed lengths are at least 1
    let mut length = vec![0usize; n];
    let mut predecessor = vec![None; n];
    let mut on_path = vec![false; n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if length[root] != 0 {
            continue;
        }
        on_path[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&dependency) = adjacency[node].get(frame.1) {
                frame.1 += 1;
                if length[dependency] == 0 && !on_path[dependency] {
                    on_path[dependency] = true;
                    stack.push((dependency, 0));
                }
                continue;
            }

            let mut best = 0;
            let mut best_predecessor = None;
            for &dependency in &adjacency[node] {
                if length[dependency] > best {
                    best = length[dependency];
                    best_predecessor = Some(dependency);
                }
            }
            length[node] = best + 1;
            predecessor[node] = best_predecessor;
            on_path[node] = false;
            stack.pop();
        }
    }

    Chains {
        length,
        predecessor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_lengths_and_predecessors() {
        // 0 <- 1 <- 2, and 3 depends on 0 and 2
        let adjacency = vec![vec![], vec![0], vec![1], vec![0, 2]];
        let chains = longest_chains(&adjacency);

        assert_eq!(chains.length, vec![1, 2, 3, 4]);
        assert_eq!(chains.predecessor, vec![None, Some(0), Some(1), Some(2)]);
        assert_eq!(chains.terminus(), Some(3));
        assert_eq!(chains.path_to(3), vec![0, 1, 2, 3]);
    }

    #[test]
    fn ties_keep_first_dependency() {
        let adjacency = vec![vec![], vec![], vec![1, 0]];
        let chains = longest_chains(&adjacency);
        assert_eq!(chains.predecessor[2], Some(1));
    }

    #[test]
    fn terminus_is_first_maximum() {
        let adjacency = vec![vec![], vec![0], vec![], vec![2]];
        let chains = longest_chains(&adjacency);
        assert_eq!(chains.terminus(), Some(1));
    }

    #[test]
    fn cycle_terminates() {
        let adjacency = vec![vec![1], vec![0]];
        let chains = longest_chains(&adjacency);
        assert!(chains.length.iter().all(|&l| l >= 1));
    }

    #[test]
    fn empty_graph() {
        let chains = longest_chains(&[]);
        assert_eq!(chains.terminus(), None);
    }
}
