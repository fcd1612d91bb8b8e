//! Interference Graph
//!
//! Two SSA names interfere when one is defined while the other is live.
//! Parameters are all live at entry, so they interfere with each other and
//! with anything else live on entry.

use crate::liveness::Liveness;
use llir_common::IrResult;
use llir_core::ir::Function;
use log::debug;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct InterferenceGraph {
    graph: StableUnGraph<String, ()>,
    nodes: BTreeMap<String, NodeIndex>,
}

impl InterferenceGraph {
    pub fn build(function: &Function) -> IrResult<Self> {
        let liveness = Liveness::compute(function)?;
        let mut this = Self::default();

        let params: Vec<String> = function
            .parameters
            .iter()
            .filter_map(|param| param.name.clone())
            .collect();
        for name in &params {
            this.add_node(name);
        }
        for (_, instr) in function.instructions() {
            for name in instr.defines().iter().chain(instr.uses().iter()) {
                this.add_node(name);
            }
        }

        for (at, instr) in function.instructions() {
            let Some(live_out) = liveness.live_out(at) else { continue };
            for def in instr.defines() {
                for live in live_out.iter().filter(|live| **live != def) {
                    this.add_edge(&def, live);
                }
            }
        }

        let entry = liveness.entry_live();
        for (i, param) in params.iter().enumerate() {
            for other in params.iter().skip(i + 1).chain(entry.iter()) {
                if other != param {
                    this.add_edge(param, other);
                }
            }
        }

        debug!(
            "Interference for @{}: {} name(s), {} edge(s)",
            function.name,
            this.graph.node_count(),
            this.graph.edge_count()
        );
        Ok(this)
    }

    fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.nodes.get(name) {
            return node;
        }
        let node = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), node);
        node
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.graph.update_edge(a, b, ());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Names in sorted order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let Some(&node) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut found: Vec<&str> = self
            .graph
            .neighbors(node)
            .map(|n| self.graph[n].as_str())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn degree(&self, name: &str) -> usize {
        self.neighbors(name).len()
    }

    pub fn interferes(&self, a: &str, b: &str) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Drop `name` and its edges; false if it was not present
    pub fn remove(&mut self, name: &str) -> bool {
        match self.nodes.remove(name) {
            Some(node) => {
                self.graph.remove_node(node);
                true
            }
            None => false,
        }
    }

    /// Each edge once, endpoints ordered, sorted
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_references()
            .map(|edge| {
                let a = self.graph[edge.source()].as_str();
                let b = self.graph[edge.target()].as_str();
                if a <= b { (a, b) } else { (b, a) }
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Greedy k-colouring by simplification
    ///
    /// Repeatedly removes the first name (in sorted order) with fewer than
    /// `k` neighbours, then colours in reverse removal order with the lowest
    /// colour no coloured neighbour holds. Returns `None` when every
    /// remaining name has degree `k` or more.
    pub fn color(&self, k: usize) -> Option<BTreeMap<String, usize>> {
        let mut work = self.clone();
        let mut stack = Vec::with_capacity(self.len());
        while !work.is_empty() {
            let next = work
                .nodes()
                .find(|name| work.degree(name) < k)
                .map(str::to_string);
            let Some(name) = next else {
                debug!("Colouring with {k} colour(s) failed, {} name(s) left", work.len());
                return None;
            };
            work.remove(&name);
            stack.push(name);
        }

        let mut colors: BTreeMap<String, usize> = BTreeMap::new();
        while let Some(name) = stack.pop() {
            let taken: BTreeSet<usize> = self
                .neighbors(&name)
                .into_iter()
                .filter_map(|n| colors.get(n).copied())
                .collect();
            let color = (0..).find(|c| !taken.contains(c)).unwrap_or_default();
            colors.insert(name, color);
        }
        Some(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llir_core::parse_module;

    const STRAIGHT: &str =
        "define i32 @f(i32 %a, i32 %b) {\n  %x = add i32 %a, %b\n  %y = mul i32 %x, %a\n  ret i32 %y\n}\n";

    fn graph(source: &str, name: &str) -> InterferenceGraph {
        let module = parse_module(source).unwrap();
        InterferenceGraph::build(module.get_function(name).unwrap()).unwrap()
    }

    #[test]
    fn test_edges() {
        let g = graph(STRAIGHT, "f");
        assert_eq!(g.len(), 4);
        assert_eq!(g.edges(), vec![("a", "b"), ("a", "x")]);
        assert!(g.interferes("x", "a"));
        assert!(!g.interferes("x", "y"));
        assert!(!g.interferes("a", "missing"));
        assert_eq!(g.neighbors("a"), vec!["b", "x"]);
        assert_eq!(g.degree("y"), 0);
        assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["a", "b", "x", "y"]);
    }

    #[test]
    fn test_color() {
        let g = graph(STRAIGHT, "f");
        let colors = g.color(2).unwrap();
        let expected: BTreeMap<String, usize> = [("a", 1), ("b", 0), ("x", 0), ("y", 0)]
            .into_iter()
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        assert_eq!(colors, expected);
        assert_eq!(g.color(1), None);
        assert_eq!(InterferenceGraph::default().color(0), Some(BTreeMap::new()));
    }

    #[test]
    fn test_remove() {
        let mut g = graph(STRAIGHT, "f");
        assert!(g.remove("a"));
        assert!(!g.remove("a"));
        assert!(g.edges().is_empty());
        assert!(!g.contains("a"));
        assert_eq!(g.color(1).map(|c| c.len()), Some(3));
    }
}
