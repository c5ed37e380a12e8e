//! Layered layout for process graphs
//!
//! Assigns every step a 2-D position, flags the critical path and computes
//! hover-focus dimming for the presentation layer.
//!
//! # Algorithm
//!
//! 1. Depth: longest dependency chain above the step (roots at 0)
//! 2. Rows by depth, then barycenter ordering: one top-down sweep against
//!    parents in the row above, one bottom-up sweep against children in the
//!    row below
//! 3. Spacing: horizontal shrinks with the widest row, vertical grows with
//!    average dependency count
//! 4. Rows centered on `x = 0`, stacked at `depth * vertical`
//! 5. Critical path: longest chain, walked back from the first step that
//!    ends one
//!
//! Layout is a pure function of the steps; an empty step list yields an
//! empty [`GraphLayout`].

use crate::chain::longest_chains;
use flowscope_model::{Step, StepId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Spacing parameters for the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal spacing when the widest row fits `wide_row_limit`
    pub wide_spacing: f64,
    /// Horizontal spacing when the widest row fits `medium_row_limit`
    pub medium_spacing: f64,
    /// Horizontal spacing for anything wider
    pub narrow_spacing: f64,
    /// Widest row still laid out with `wide_spacing`
    pub wide_row_limit: usize,
    /// Widest row still laid out with `medium_spacing`
    pub medium_row_limit: usize,
    /// Vertical spacing for a graph without edges
    pub base_row_spacing: f64,
    /// Extra vertical spacing per average dependency
    pub row_spacing_per_dependency: f64,
    /// Upper bound on vertical spacing
    pub max_row_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            wide_spacing: 280.0,
            medium_spacing: 240.0,
            narrow_spacing: 200.0,
            wide_row_limit: 3,
            medium_row_limit: 6,
            base_row_spacing: 150.0,
            row_spacing_per_dependency: 40.0,
            max_row_spacing: 260.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal spacing for a graph whose widest row has `width` steps
    #[must_use]
    pub fn horizontal_spacing(&self, width: usize) -> f64 {
        if width <= self.wide_row_limit {
            self.wide_spacing
        } else if width <= self.medium_row_limit {
            self.medium_spacing
        } else {
            self.narrow_spacing
        }
    }

    /// Vertical spacing for a graph averaging `dependencies_per_step`
    #[must_use]
    pub fn vertical_spacing(&self, dependencies_per_step: f64) -> f64 {
        (self.base_row_spacing + dependencies_per_step * self.row_spacing_per_dependency)
            .min(self.max_row_spacing)
    }
}

/// A point in layout coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Spacing chosen for one layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spacing {
    /// Distance between neighbours in a row
    pub horizontal: f64,
    /// Distance between rows
    pub vertical: f64,
}

/// Placement of a single step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    /// Step placed
    pub step_id: StepId,
    /// Center of the node
    pub position: Position,
    /// Row index; longest dependency chain above this step
    pub depth: usize,
    /// Index within its row after crossing minimization
    pub order: usize,
    /// Step lies on the critical path
    pub on_critical_path: bool,
    /// Outside the hover focus
    pub dimmed: bool,
}

/// A dependency edge, drawn from prerequisite (`source`) to dependent
/// (`target`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRoute {
    /// Prerequisite step
    pub source: StepId,
    /// Dependent step
    pub target: StepId,
    /// Both ends are consecutive on the critical path
    pub critical: bool,
    /// Outside the hover focus
    pub dimmed: bool,
}

/// Complete layout of a step graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    /// One placement per step, in input order
    pub nodes: Vec<NodePlacement>,
    /// One route per dependency
    pub edges: Vec<EdgeRoute>,
    /// Critical path, root first
    pub critical_path: Vec<StepId>,
    /// Spacing used for this layout
    pub spacing: Spacing,
    /// Step currently in hover focus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovered: Option<StepId>,
}

impl GraphLayout {
    /// True when there was nothing to lay out
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Placement of a step
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodePlacement> {
        self.nodes.iter().find(|node| node.step_id.as_str() == id)
    }

    /// Steps in hover focus: the step itself, its direct dependencies and
    /// its direct dependents. Empty when `hovered` is not in the layout.
    #[must_use]
    pub fn focus_set(&self, hovered: &str) -> HashSet<StepId> {
        if self.node(hovered).is_none() {
            return HashSet::new();
        }
        let mut focus: HashSet<StepId> = HashSet::new();
        focus.insert(StepId::new(hovered));
        for edge in &self.edges {
            if edge.target.as_str() == hovered {
                focus.insert(edge.source.clone());
            } else if edge.source.as_str() == hovered {
                focus.insert(edge.target.clone());
            }
        }
        focus
    }

    /// Recompute dimming for a hover change
    ///
    /// Nodes outside the focus set and edges not touching the hovered step
    /// are dimmed. `None` or an unknown step clears all dimming.
    pub fn focus(&mut self, hovered: Option<&str>) {
        let focus = hovered.map(|id| self.focus_set(id)).unwrap_or_default();

        if focus.is_empty() {
            self.hovered = None;
            self.nodes.iter_mut().for_each(|node| node.dimmed = false);
            self.edges.iter_mut().for_each(|edge| edge.dimmed = false);
            return;
        }

        let hovered = hovered.map(StepId::new);
        for node in &mut self.nodes {
            node.dimmed = !focus.contains(&node.step_id);
        }
        for edge in &mut self.edges {
            let incident = hovered
                .as_ref()
                .is_some_and(|h| &edge.source == h || &edge.target == h);
            edge.dimmed = !incident;
        }
        self.hovered = hovered;
    }
}

/// Layered layout engine
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create engine with spacing configuration
    #[inline]
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Spacing configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out steps
    ///
    /// Dependencies on unknown steps or on the step itself are ignored, so
    /// unrepaired input still produces one placement per step.
    #[must_use]
    pub fn layout(&self, steps: &[Step]) -> GraphLayout {
        if steps.is_empty() {
            return GraphLayout::default();
        }

        let adjacency = dependency_indices(steps);
        let chains = longest_chains(&adjacency);
        let depth: Vec<usize> = (0..steps.len()).map(|i| chains.depth(i)).collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];
        for (node, dependencies) in adjacency.iter().enumerate() {
            for &dependency in dependencies {
                children[dependency].push(node);
            }
        }

        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
        for (node, &d) in depth.iter().enumerate() {
            rows[d].push(node);
        }
        let mut order = vec![0usize; steps.len()];
        for row in &rows {
            assign_order(row, &mut order);
        }

        // Top-down: row 0 stays as the anchor
        for d in 1..rows.len() {
            let keys: Vec<Option<f64>> = rows[d]
                .iter()
                .map(|&node| {
                    let parents = adjacency[node].iter().copied().filter(|&p| depth[p] + 1 == d);
                    barycenter(parents, &order)
                })
                .collect();
            reorder_row(&mut rows[d], &mut order, &keys);
        }
        // Bottom-up, from the second-to-last row
        for d in (0..rows.len().saturating_sub(1)).rev() {
            let keys: Vec<Option<f64>> = rows[d]
                .iter()
                .map(|&node| {
                    let below = children[node].iter().copied().filter(|&c| depth[c] == d + 1);
                    barycenter(below, &order)
                })
                .collect();
            reorder_row(&mut rows[d], &mut order, &keys);
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let dependencies_per_step = adjacency.iter().map(Vec::len).sum::<usize>() as f64
            / steps.len() as f64;
        let spacing = Spacing {
            horizontal: self.config.horizontal_spacing(width),
            vertical: self.config.vertical_spacing(dependencies_per_step),
        };

        let critical: Vec<usize> = chains
            .terminus()
            .map(|terminus| chains.path_to(terminus))
            .unwrap_or_default();
        let on_path: HashSet<usize> = critical.iter().copied().collect();

        let nodes = steps
            .iter()
            .enumerate()
            .map(|(node, step)| NodePlacement {
                step_id: step.id.clone(),
                position: place(order[node], rows[depth[node]].len(), depth[node], spacing),
                depth: depth[node],
                order: order[node],
                on_critical_path: on_path.contains(&node),
                dimmed: false,
            })
            .collect();

        let mut edges = Vec::with_capacity(adjacency.iter().map(Vec::len).sum());
        for (node, dependencies) in adjacency.iter().enumerate() {
            for &dependency in dependencies {
                edges.push(EdgeRoute {
                    source: steps[dependency].id.clone(),
                    target: steps[node].id.clone(),
                    critical: on_path.contains(&node) && on_path.contains(&dependency),
                    dimmed: false,
                });
            }
        }

        tracing::debug!(
            steps = steps.len(),
            rows = rows.len(),
            critical_path = critical.len(),
            "Computed graph layout"
        );

        GraphLayout {
            nodes,
            edges,
            critical_path: critical.iter().map(|&i| steps[i].id.clone()).collect(),
            spacing,
            hovered: None,
        }
    }

    /// Lay out steps with a step already in hover focus
    #[must_use]
    pub fn layout_with_focus(&self, steps: &[Step], hovered: Option<&str>) -> GraphLayout {
        let mut layout = self.layout(steps);
        layout.focus(hovered);
        layout
    }
}

/// Dependency indices per step; first occurrence wins for duplicate IDs
fn dependency_indices(steps: &[Step]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        index.entry(step.id.as_str()).or_insert(i);
    }

    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mut seen = HashSet::new();
            step.dependencies
                .iter()
                .filter_map(|dependency| index.get(dependency.as_str()).copied())
                .filter(|&d| d != i && seen.insert(d))
                .collect()
        })
        .collect()
}

fn assign_order(row: &[usize], order: &mut [usize]) {
    for (position, &node) in row.iter().enumerate() {
        order[node] = position;
    }
}

/// Mean row index of `neighbors`, if there are any
#[allow(clippy::cast_precision_loss)]
fn barycenter(neighbors: impl Iterator<Item = usize>, order: &[usize]) -> Option<f64> {
    let (sum, count) = neighbors.fold((0usize, 0usize), |(sum, count), n| {
        (sum + order[n], count + 1)
    });
    (count > 0).then(|| sum as f64 / count as f64)
}

/// Stable-sort a row by neighbor barycenter; `keys[i]` belongs to `row[i]`
/// and nodes without a key keep their current index
#[allow(clippy::cast_precision_loss)]
fn reorder_row(row: &mut Vec<usize>, order: &mut [usize], keys: &[Option<f64>]) {
    let mut keyed: Vec<(usize, f64)> = row
        .iter()
        .zip(keys)
        .map(|(&node, key)| (node, key.unwrap_or(order[node] as f64)))
        .collect();
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    *row = keyed.into_iter().map(|(node, _)| node).collect();
    assign_order(row, order);
}

#[allow(clippy::cast_precision_loss)]
fn place(order: usize, row_len: usize, depth: usize, spacing: Spacing) -> Position {
    let offset = order as f64 - (row_len.saturating_sub(1)) as f64 / 2.0;
    Position {
        x: offset * spacing.horizontal,
        y: depth as f64 * spacing.vertical,
    }
}
