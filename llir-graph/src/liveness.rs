//! Liveness Analysis
//!
//! Backward data-flow over instructions, iterated to a fixed point:
//!
//! ```text
//! live_out(i) = union of live_in(s) for s in flow_successors(i)
//! live_in(i)  = uses(i) + (live_out(i) - defines(i))
//! ```
//!
//! Phi incoming values count as uses at the phi itself, so in SSA form a
//! value flowing around a loop back edge stays live through the loop
//! header. Run phi elimination first for predecessor-exact ranges; the
//! copies it leaves after a terminator are visited before the branch.

use llir_common::IrResult;
use llir_core::ir::{Function, InstrRef};
use log::debug;
use std::collections::{BTreeSet, HashMap};

/// Live-in and live-out sets for every instruction of one function
#[derive(Debug, Clone)]
pub struct Liveness {
    entry: Option<InstrRef>,
    index: HashMap<InstrRef, usize>,
    live_in: Vec<BTreeSet<String>>,
    live_out: Vec<BTreeSet<String>>,
}

impl Liveness {
    pub fn compute(function: &Function) -> IrResult<Self> {
        let order: Vec<_> = function.instructions().collect();
        let index: HashMap<InstrRef, usize> = order
            .iter()
            .enumerate()
            .map(|(pos, (at, _))| (*at, pos))
            .collect();

        let mut successors = Vec::with_capacity(order.len());
        for (at, _) in &order {
            let succs: Vec<usize> = function
                .flow_successors(*at)?
                .iter()
                .filter_map(|s| index.get(s).copied())
                .collect();
            successors.push(succs);
        }
        let uses: Vec<BTreeSet<String>> = order.iter().map(|(_, instr)| instr.uses()).collect();
        let defs: Vec<BTreeSet<String>> = order.iter().map(|(_, instr)| instr.defines()).collect();

        let mut live_in = vec![BTreeSet::new(); order.len()];
        let mut live_out = vec![BTreeSet::new(); order.len()];
        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for pos in (0..order.len()).rev() {
                let out: BTreeSet<String> = successors[pos]
                    .iter()
                    .flat_map(|&s| live_in[s].iter().cloned())
                    .collect();
                let mut inn = uses[pos].clone();
                inn.extend(out.difference(&defs[pos]).cloned());

                if out != live_out[pos] || inn != live_in[pos] {
                    live_out[pos] = out;
                    live_in[pos] = inn;
                    changed = true;
                }
            }
        }
        debug!("Liveness for @{} converged after {rounds} round(s)", function.name);

        Ok(Self { entry: function.entry_point(), index, live_in, live_out })
    }

    pub fn live_in(&self, at: InstrRef) -> Option<&BTreeSet<String>> {
        self.index.get(&at).map(|&pos| &self.live_in[pos])
    }

    pub fn live_out(&self, at: InstrRef) -> Option<&BTreeSet<String>> {
        self.index.get(&at).map(|&pos| &self.live_out[pos])
    }

    /// Names live on entry to the function
    pub fn entry_live(&self) -> BTreeSet<String> {
        self.entry
            .and_then(|at| self.live_in(at))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llir_core::parse_module;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_straight_line() {
        let module = parse_module(
            "define i32 @f(i32 %a, i32 %b) {\n  %x = add i32 %a, %b\n  %y = mul i32 %x, %a\n  ret i32 %y\n}\n",
        )
        .unwrap();
        let live = Liveness::compute(module.get_function("f").unwrap()).unwrap();
        assert_eq!(live.live_in(InstrRef::new(0, 0)), Some(&set(&["a", "b"])));
        assert_eq!(live.live_out(InstrRef::new(0, 0)), Some(&set(&["a", "x"])));
        assert_eq!(live.live_out(InstrRef::new(0, 1)), Some(&set(&["y"])));
        assert_eq!(live.live_out(InstrRef::new(0, 2)), Some(&set(&[])));
        assert_eq!(live.entry_live(), set(&["a", "b"]));
        assert_eq!(live.live_in(InstrRef::new(7, 0)), None);
    }

    #[test]
    fn test_loop_keeps_value_live() {
        let module = parse_module(
            "define i32 @f(i32 %n) {
entry:
  br label %loop
loop:
  %i = mov i32 %n
  %c = icmp eq i32 %i, 0
  br i1 %c, label %exit, label %loop
exit:
  ret i32 %n
}
",
        )
        .unwrap();
        let live = Liveness::compute(module.get_function("f").unwrap()).unwrap();
        // %n is read after the loop, so it is live around the back edge
        assert!(live.live_out(InstrRef::new(1, 2)).unwrap().contains("n"));
        assert_eq!(live.live_out(InstrRef::new(1, 1)), Some(&set(&["c", "n"])));
    }
}
