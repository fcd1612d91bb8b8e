use llir_core::ir::{eliminate_phis, InstrRef};
use llir_core::parse_module;
use llir_graph::{BlockGraph, EdgeKind, InterferenceGraph, Liveness};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const SUM: &str = include_str!("../../llir-core/tests/data/sum.ll");

fn block_edges(graph: &BlockGraph) -> Vec<(String, String, EdgeKind)> {
    graph
        .edges()
        .into_iter()
        .map(|(from, to, kind)| (from.to_string(), to.to_string(), kind))
        .collect()
}

#[test]
fn test_sum_block_graph_survives_phi_elimination() {
    let mut module = parse_module(SUM).unwrap();
    let before = BlockGraph::build(module.get_function("sum").unwrap()).unwrap();
    let expected = vec![
        ("entry".to_string(), "for.body".to_string(), EdgeKind::True),
        ("entry".to_string(), "for.end".to_string(), EdgeKind::False),
        ("for.body".to_string(), "for.end".to_string(), EdgeKind::True),
        ("for.body".to_string(), "for.body".to_string(), EdgeKind::False),
    ];
    assert_eq!(block_edges(&before), expected);
    assert!(before.unreachable_blocks().is_empty());

    eliminate_phis(&mut module).unwrap();
    let after = BlockGraph::build(module.get_function("sum").unwrap()).unwrap();
    assert_eq!(block_edges(&after), expected);
}

#[test]
fn test_sum_liveness() {
    let module = parse_module(SUM).unwrap();
    let live = Liveness::compute(module.get_function("sum").unwrap()).unwrap();
    assert!(live.live_out(InstrRef::new(0, 1)).unwrap().contains("n"));
    let ret_in: Vec<&str> = live
        .live_in(InstrRef::new(2, 1))
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(ret_in, vec!["s.0.lcssa"]);
    // Phi incoming values are uses at the phi, so loop-carried names reach entry
    assert!(live.entry_live().contains("add"));
}

fn names(set: Option<&BTreeSet<String>>) -> Vec<&str> {
    set.map(|set| set.iter().map(String::as_str).collect()).unwrap_or_default()
}

#[test]
fn test_sum_liveness_after_phi_elimination() {
    let mut module = parse_module(SUM).unwrap();
    eliminate_phis(&mut module).unwrap();
    let function = module.get_function("sum").unwrap();
    let live = Liveness::compute(function).unwrap();

    // Copies into %for.body and %for.end trail the entry branch
    assert_eq!(function.execution_order(0), vec![0, 2, 3, 4, 1]);
    assert_eq!(live.entry_live().into_iter().collect::<Vec<_>>(), vec!["n".to_string()]);
    assert_eq!(
        names(live.live_out(InstrRef::new(0, 1))),
        vec!["i.06", "n", "s.0.lcssa", "s.05"]
    );
    assert_eq!(names(live.live_in(InstrRef::new(1, 0))), vec!["i.06", "n", "s.05"]);
    assert_eq!(names(live.live_in(InstrRef::new(2, 0))), vec!["s.0.lcssa"]);

    let graph = InterferenceGraph::build(function).unwrap();
    assert_eq!(
        graph.neighbors("n"),
        vec!["add", "cmp4", "exitcond", "i.06", "inc", "s.0.lcssa", "s.05"]
    );
    assert!(!graph.interferes("cmp4", "add"));
}

#[test]
fn test_sum_coloring_is_valid() {
    let mut module = parse_module(SUM).unwrap();
    eliminate_phis(&mut module).unwrap();
    let graph = InterferenceGraph::build(module.get_function("sum").unwrap()).unwrap();
    assert!(graph.contains("n"));
    assert!(graph.contains("s.0.lcssa"));

    let (k, colors) = (1..=graph.len().max(1))
        .find_map(|k| graph.color(k).map(|colors| (k, colors)))
        .unwrap();
    assert_eq!(colors.len(), graph.len());
    for (a, b) in graph.edges() {
        assert_ne!(colors[a], colors[b], "{a} and {b} share a colour");
    }
    assert!(colors.values().all(|&c| c < k));
}
