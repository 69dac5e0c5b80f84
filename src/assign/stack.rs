/// main struct AssignStack
use {
    super::{
        heap::{VarHeapIF, VarIdHeap},
        propagate::PropagateIF,
        AssignIF,
    },
    crate::{solver::SolverEvent, types::*},
    std::{fmt, slice::Iter},
};

/// A record of assignment. It's called 'trail' in Glucose.
#[derive(Clone, Debug, Default)]
pub struct AssignStack {
    /// assigned value of each var
    pub(super) assign: Vec<Option<bool>>,
    /// decision level of each var
    pub(super) level: Vec<DecisionLevel>,
    /// the reason of each assignment
    pub(super) reason: Vec<AssignReason>,
    /// misc flags on vars
    pub(super) flags: Vec<FlagVar>,
    /// record of assignment
    pub(crate) trail: Vec<Lit>,
    pub(crate) trail_lim: Vec<usize>,
    /// the-number-of-assigned-and-propagated-vars
    pub(crate) q_head: usize,

    //
    //## Var selection
    //
    pub(super) activity: Vec<f64>,
    pub(super) activity_inc: f64,
    pub(super) activity_decay: f64,
    pub(super) var_order: VarIdHeap,

    //
    //## Statistics
    //
    /// the number of vars.
    pub num_vars: usize,
    /// the number of asserted vars.
    pub num_asserted_vars: usize,
    pub(crate) num_decision: usize,
    pub(crate) num_propagation: usize,
    pub num_conflict: usize,
    pub(crate) num_restart: usize,
}

impl Instantiate for AssignStack {
    fn instantiate(config: &Config, desc: &ProblemDescription) -> AssignStack {
        let nv = desc.num_of_variables;
        AssignStack {
            assign: vec![None; nv + 1],
            level: vec![0; nv + 1],
            reason: vec![AssignReason::None; nv + 1],
            flags: vec![FlagVar::default(); nv + 1],
            trail: Vec::with_capacity(nv),
            activity: vec![0.0; nv + 1],
            activity_inc: 1.0,
            activity_decay: config.var_decay,
            var_order: VarIdHeap::new(nv, nv),
            num_vars: nv,
            ..AssignStack::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        match e {
            SolverEvent::Conflict => self.num_conflict += 1,
            SolverEvent::NewVar => {
                self.num_vars += 1;
                self.assign.push(None);
                self.level.push(0);
                self.reason.push(AssignReason::None);
                self.flags.push(FlagVar::default());
                self.activity.push(0.0);
                self.var_order.push_var(self.num_vars);
                self.insert_heap(self.num_vars);
            }
            SolverEvent::Restart => self.num_restart += 1,
            SolverEvent::Reinitialize => self.reset_trail(),
            SolverEvent::Assert(vi) => self.make_var_asserted(vi),
        }
    }
}

impl AssignIF for AssignStack {
    #[inline]
    fn assigned(&self, l: Lit) -> Option<bool> {
        match self.assign[l.vi()] {
            Some(x) if !bool::from(l) => Some(!x),
            x => x,
        }
    }
    #[inline]
    fn assign(&self, vi: VarId) -> Option<bool> {
        self.assign[vi]
    }
    #[inline]
    fn level(&self, vi: VarId) -> DecisionLevel {
        self.level[vi]
    }
    #[inline]
    fn reason(&self, vi: VarId) -> AssignReason {
        self.reason[vi]
    }
    fn decision_level(&self) -> DecisionLevel {
        self.trail_lim.len() as DecisionLevel
    }
    fn stack(&self, i: usize) -> Lit {
        self.trail[i]
    }
    fn stack_len(&self) -> usize {
        self.trail.len()
    }
    fn len_upto(&self, n: DecisionLevel) -> usize {
        self.trail_lim.get(n as usize).map_or(self.trail.len(), |n| *n)
    }
    fn stack_iter(&self) -> Iter<'_, Lit> {
        self.trail.iter()
    }
    fn remains(&self) -> bool {
        self.q_head < self.trail.len()
    }
    fn num_vars(&self) -> usize {
        self.num_vars
    }
}

impl AssignStack {
    /// open a new decision level.
    pub fn level_up(&mut self) {
        self.trail_lim.push(self.trail.len());
    }
    /// return `true` if `vi` occurs in the objective function.
    pub fn is_objective_var(&self, vi: VarId) -> bool {
        self.flags[vi].contains(FlagVar::OBJECTIVE)
    }
    /// return the current assignment as a vector indexed by `VarId`.
    pub fn assign_ref(&self) -> &[Option<bool>] {
        &self.assign
    }
    /// a root level assignment never refers to its constraint,
    /// so that any constraint can be removed safely.
    pub(crate) fn make_var_asserted(&mut self, vi: VarId) {
        debug_assert_eq!(self.level[vi], 0);
        self.reason[vi] = AssignReason::Asserted;
        self.num_asserted_vars += 1;
    }
}

impl fmt::Display for AssignStack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let v = self.trail.iter().map(|l| i32::from(*l)).collect::<Vec<_>>();
        let levels = self.decision_level();
        let c = |i: DecisionLevel| {
            let a = if i == 0 { 0 } else { self.len_upto(i - 1) };
            let b = self.len_upto(i);
            (i, &v[a..b])
        };
        write!(
            f,
            "ASG:: trail({}):{:?}\n      level: {}, asserted: {}",
            self.trail.len(),
            (0..=levels).map(c).collect::<Vec<_>>(),
            levels,
            self.num_asserted_vars,
        )
    }
}
