//! Control-Flow Graphs
//!
//! Both graphs are snapshots: they are built from a function and do not
//! follow later edits to it.

use llir_common::IrResult;
use llir_core::ir::{Function, InstrRef};
use log::debug;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Instruction-level control-flow graph
pub struct ControlFlowGraph {
    graph: DiGraph<InstrRef, ()>,
    node_map: HashMap<InstrRef, NodeIndex>,
    entry: Option<InstrRef>,
}

impl ControlFlowGraph {
    /// One node per instruction, one edge per entry of `Function::flow_successors`
    pub fn build(function: &Function) -> IrResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        for (at, _) in function.instructions() {
            node_map.insert(at, graph.add_node(at));
        }
        for (at, _) in function.instructions() {
            for succ in function.flow_successors(at)? {
                if let (Some(&from), Some(&to)) = (node_map.get(&at), node_map.get(&succ)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        debug!(
            "CFG for @{}: {} instruction(s), {} edge(s)",
            function.name,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self { graph, node_map, entry: function.entry_point() })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn successors(&self, at: InstrRef) -> Vec<InstrRef> {
        self.neighbors(at, Direction::Outgoing)
    }

    pub fn predecessors(&self, at: InstrRef) -> Vec<InstrRef> {
        self.neighbors(at, Direction::Incoming)
    }

    /// Instructions reachable from the function's entry point
    pub fn reachable(&self) -> HashSet<InstrRef> {
        let mut seen = HashSet::new();
        if let Some(&entry) = self.entry.and_then(|at| self.node_map.get(&at)) {
            let mut dfs = Dfs::new(&self.graph, entry);
            while let Some(node) = dfs.next(&self.graph) {
                seen.insert(self.graph[node]);
            }
        }
        seen
    }

    fn neighbors(&self, at: InstrRef, dir: Direction) -> Vec<InstrRef> {
        let mut found: Vec<InstrRef> = match self.node_map.get(&at) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, dir)
                .map(|n| self.graph[n])
                .collect(),
            None => Vec::new(),
        };
        found.sort();
        found.dedup();
        found
    }
}

/// How control reaches a successor block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `br label %x`
    Jump,
    /// Taken side of a two-way branch
    True,
    /// Not-taken side of a two-way branch
    False,
    /// Block without a terminator running into the next one
    Fallthrough,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            EdgeKind::Jump => "jump",
            EdgeKind::True => "true",
            EdgeKind::False => "false",
            EdgeKind::Fallthrough => "fallthrough",
        };
        write!(f, "{kind}")
    }
}

/// Block-level control-flow graph, nodes weighted by label
pub struct BlockGraph {
    graph: DiGraph<String, EdgeKind>,
}

impl BlockGraph {
    pub fn build(function: &Function) -> IrResult<Self> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = function
            .blocks
            .iter()
            .map(|block| graph.add_node(block.label.clone()))
            .collect();

        for (idx, block) in function.blocks.iter().enumerate() {
            let kinds: &[EdgeKind] = match block.terminator().map(|term| term.branch_targets().len()) {
                Some(2) => &[EdgeKind::True, EdgeKind::False],
                Some(1) => &[EdgeKind::Jump],
                _ => &[EdgeKind::Fallthrough],
            };
            for (succ, kind) in function.successor_blocks(idx)?.into_iter().zip(kinds) {
                graph.add_edge(nodes[idx], nodes[succ], *kind);
            }
        }
        Ok(Self { graph })
    }

    /// Edges in block order, true side before false side
    pub fn edges(&self) -> Vec<(&str, &str, EdgeKind)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    /// Successor labels of `label`, in edge order
    pub fn successors(&self, label: &str) -> Vec<&str> {
        self.edges()
            .into_iter()
            .filter(|(from, _, _)| *from == label)
            .map(|(_, to, _)| to)
            .collect()
    }

    /// Labels no path from the entry block reaches
    pub fn unreachable_blocks(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        if let Some(entry) = self.graph.node_indices().next() {
            let mut dfs = Dfs::new(&self.graph, entry);
            while let Some(node) = dfs.next(&self.graph) {
                seen.insert(node);
            }
        }
        self.graph
            .node_indices()
            .filter(|node| !seen.contains(node))
            .map(|node| self.graph[node].as_str())
            .collect()
    }

    /// Graphviz rendering
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llir_core::parse_module;

    const DIAMOND: &str = "define void @f(i1 %c) {
entry:
  br i1 %c, label %left, label %right
left:
  br label %join
right:
  store i32 1, i32* @g
join:
  ret void
dead:
  ret void
}
";

    #[test]
    fn test_block_edges() {
        let module = parse_module(DIAMOND).unwrap();
        let graph = BlockGraph::build(module.get_function("f").unwrap()).unwrap();
        assert_eq!(
            graph.edges(),
            vec![
                ("entry", "left", EdgeKind::True),
                ("entry", "right", EdgeKind::False),
                ("left", "join", EdgeKind::Jump),
                ("right", "join", EdgeKind::Fallthrough),
            ]
        );
        assert_eq!(graph.successors("entry"), vec!["left", "right"]);
        assert_eq!(graph.unreachable_blocks(), vec!["dead"]);
        assert!(graph.to_dot().contains("label = \"true\""));
    }

    #[test]
    fn test_instruction_graph() {
        let module = parse_module(DIAMOND).unwrap();
        let cfg = ControlFlowGraph::build(module.get_function("f").unwrap()).unwrap();
        assert_eq!(cfg.len(), 5);
        assert_eq!(cfg.edge_count(), 4);
        assert_eq!(
            cfg.successors(InstrRef::new(0, 0)),
            vec![InstrRef::new(1, 0), InstrRef::new(2, 0)]
        );
        assert_eq!(
            cfg.predecessors(InstrRef::new(3, 0)),
            vec![InstrRef::new(1, 0), InstrRef::new(2, 0)]
        );
        assert!(!cfg.reachable().contains(&InstrRef::new(4, 0)));
    }

    #[test]
    fn test_trailing_copies_run_before_branch() {
        let module = parse_module(
            "define i32 @f(i32 %n) {
entry:
  br label %exit
  %x = mov i32 %n
exit:
  ret i32 %x
}
",
        )
        .unwrap();
        let cfg = ControlFlowGraph::build(module.get_function("f").unwrap()).unwrap();
        assert_eq!(cfg.successors(InstrRef::new(0, 1)), vec![InstrRef::new(0, 0)]);
        assert_eq!(cfg.successors(InstrRef::new(0, 0)), vec![InstrRef::new(1, 0)]);
        assert_eq!(cfg.reachable().len(), 3);
    }
}
