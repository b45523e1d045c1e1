//! Dependency graph for step execution ordering.
//!
//! Steps are addressed by their index in declaration order. A dependency
//! reference resolves to the step with that id, or failing that to every
//! other step carrying it as a tag.

use std::collections::BTreeSet;

use crate::error::{DeployError, Result};
use crate::steps::Step;

/// Label used in errors for run filter entries that match no step.
pub const FILTER_LABEL: &str = "--tags";

/// Resolved dependency relationships between steps.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    ids: Vec<String>,
    /// Direct dependencies of each step.
    dependencies: Vec<BTreeSet<usize>>,
    /// Steps that directly depend on each step.
    dependents: Vec<BTreeSet<usize>>,
}

/// Indices of the steps a reference names: the step with that id, otherwise
/// every step tagged with it.
pub fn resolve_reference(steps: &[Step], reference: &str) -> Vec<usize> {
    if let Some(index) = steps.iter().position(|s| s.id == reference) {
        return vec![index];
    }
    steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_tag(reference))
        .map(|(i, _)| i)
        .collect()
}

impl DependencyGraph {
    /// Build the graph, resolving every step's dependency references.
    ///
    /// # Errors
    ///
    /// `UnknownDependency` when a reference matches no step.
    pub fn build(steps: &[Step]) -> Result<Self> {
        let mut dependencies = vec![BTreeSet::new(); steps.len()];
        let mut dependents = vec![BTreeSet::new(); steps.len()];

        for (index, step) in steps.iter().enumerate() {
            for reference in &step.dependencies {
                let mut targets = resolve_reference(steps, reference);
                // A tag reference never includes the step itself.
                if steps[index].id != *reference {
                    targets.retain(|&t| t != index);
                }
                if targets.is_empty() {
                    return Err(DeployError::UnknownDependency {
                        step: step.id.clone(),
                        dependency: reference.clone(),
                    });
                }
                for target in targets {
                    dependencies[index].insert(target);
                    dependents[target].insert(index);
                }
            }
        }

        Ok(Self {
            ids: steps.iter().map(|s| s.id.clone()).collect(),
            dependencies,
            dependents,
        })
    }

    pub fn id(&self, step: usize) -> &str {
        &self.ids[step]
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends on the same step.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        let start = path.iter().position(|&s| s == dep).unwrap_or(0);
                        let mut cycle = path[start..].to_vec();
                        cycle.push(dep);
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.len()];
        let mut path = Vec::new();

        for step in 0..self.len() {
            if state[step] == State::Unvisited {
                if let Some(cycle) = dfs(step, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn cycle_error(&self, cycle: &[usize]) -> DeployError {
        let names: Vec<&str> = cycle.iter().map(|&i| self.id(i)).collect();
        DeployError::CircularDependency {
            cycle: names.join(" -> "),
        }
    }

    /// Steps in `selected` in dependency order.
    ///
    /// Among steps whose dependencies are all satisfied, the one declared
    /// first runs first.
    pub fn topological_order(&self, selected: &BTreeSet<usize>) -> Result<Vec<usize>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(self.cycle_error(&cycle));
        }

        let mut in_degree: Vec<usize> = (0..self.len())
            .map(|i| {
                self.dependencies[i]
                    .iter()
                    .filter(|&&d| selected.contains(&d))
                    .count()
            })
            .collect();

        let mut ready: BTreeSet<usize> = selected
            .iter()
            .copied()
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut result = Vec::with_capacity(selected.len());

        while let Some(step) = ready.pop_first() {
            result.push(step);

            for &dependent in &self.dependents[step] {
                if !selected.contains(&dependent) {
                    continue;
                }
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        // Never hand back a partial order.
        if result.len() != selected.len() {
            let remaining: Vec<&str> = selected
                .iter()
                .filter(|i| !result.contains(*i))
                .map(|&i| self.id(i))
                .collect();
            return Err(DeployError::CircularDependency {
                cycle: remaining.join(" -> "),
            });
        }

        Ok(result)
    }

    /// The given steps plus everything they depend on, transitively.
    pub fn with_dependencies(&self, roots: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        let mut to_visit: Vec<usize> = roots.into_iter().collect();

        while let Some(current) = to_visit.pop() {
            if result.insert(current) {
                to_visit.extend(self.dependencies[current].iter().copied());
            }
        }

        result
    }
}

/// Steps a filter selects, plus their transitive dependencies.
///
/// An empty filter selects every step.
pub fn select(steps: &[Step], graph: &DependencyGraph, filter: &[String]) -> Result<BTreeSet<usize>> {
    if filter.is_empty() {
        return Ok((0..steps.len()).collect());
    }

    let mut roots = Vec::new();
    for entry in filter {
        let matched = resolve_reference(steps, entry);
        if matched.is_empty() {
            return Err(DeployError::UnknownDependency {
                step: FILTER_LABEL.to_string(),
                dependency: entry.clone(),
            });
        }
        roots.extend(matched);
    }

    Ok(graph.with_dependencies(roots))
}

/// Execution order for `steps`, restricted to `filter` when non-empty.
///
/// # Errors
///
/// `UnknownDependency` for a reference or filter entry that matches nothing,
/// `CircularDependency` naming a cycle.
pub fn resolve_order(steps: &[Step], filter: &[String]) -> Result<Vec<usize>> {
    let graph = DependencyGraph::build(steps)?;
    let selected = select(steps, &graph, filter)?;
    graph.topological_order(&selected)
}
