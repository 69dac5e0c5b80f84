/// Var activity management, aka VSIDS
use {
    super::{heap::VarHeapIF, AssignStack},
    crate::types::*,
};

const ACTIVITY_LIMIT: f64 = 1e100;

impl ActivityIF<VarId> for AssignStack {
    #[inline]
    fn activity(&self, vi: VarId) -> f64 {
        self.activity[vi]
    }
    fn set_activity(&mut self, vi: VarId, val: f64) {
        self.activity[vi] = val;
        self.update_heap(vi);
    }
    fn reward_at_analysis(&mut self, vi: VarId) {
        self.activity[vi] += self.activity_inc;
        if ACTIVITY_LIMIT < self.activity[vi] {
            for a in self.activity.iter_mut() {
                *a /= ACTIVITY_LIMIT;
            }
            self.activity_inc /= ACTIVITY_LIMIT;
        }
        self.update_heap(vi);
    }
    // Note: the heap order is kept since every activity is scaled uniformly.
    fn update_activity_tick(&mut self) {
        self.activity_inc /= self.activity_decay;
    }
}
