/// Decision var selection
use {
    super::{
        heap::{VarHeapIF, VarIdHeap},
        AssignStack,
    },
    crate::types::*,
};

/// API for var selection, depending on an internal heap.
pub trait VarSelectIF {
    /// select a new decision literal; `None` if every var is assigned.
    fn select_decision_literal(&mut self) -> Option<Lit>;
    /// rebuild the internal var_order
    fn rebuild_order(&mut self);
    /// bias the var order and the initial phases toward a cheap objective value.
    /// Each hint is a triple of a var, its preferred polarity and a weight in (0, 1].
    fn set_objective_hints(&mut self, hints: &[(VarId, bool, f64)]);
}

impl VarSelectIF for AssignStack {
    fn select_decision_literal(&mut self) -> Option<Lit> {
        while !self.var_order.is_empty() {
            let vi = self.get_heap_root();
            if self.assign[vi].is_none() {
                return Some(Lit::from((vi, self.flags[vi].contains(FlagVar::PHASE))));
            }
        }
        None
    }
    fn rebuild_order(&mut self) {
        self.var_order = VarIdHeap::new(self.num_vars, 0);
        for vi in 1..=self.num_vars {
            if self.assign[vi].is_none() {
                self.insert_heap(vi);
            }
        }
    }
    fn set_objective_hints(&mut self, hints: &[(VarId, bool, f64)]) {
        for f in self.flags.iter_mut() {
            f.remove(FlagVar::OBJECTIVE);
        }
        let nv = self.num_vars;
        for &(vi, phase, weight) in hints.iter().filter(|h| 0 < h.0 && h.0 <= nv) {
            self.flags[vi].insert(FlagVar::OBJECTIVE);
            self.flags[vi].set(FlagVar::PHASE, phase);
            self.activity[vi] += weight * self.activity_inc;
            self.update_heap(vi);
        }
    }
}
