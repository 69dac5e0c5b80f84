/// Heap struct for selecting decision vars
use {super::AssignStack, crate::types::*, std::fmt};

/// Heap of VarId, based on var activity.
/// # Note
/// - both fields has a fixed length. Don't use push and pop.
/// - `idxs[0]` contains the number of alive elements
///   `indx` is positions. So the unused field 0 can hold the last position as a special case.
#[derive(Clone, Debug, Default)]
pub struct VarIdHeap {
    /// order : usize -> VarId::from, -- Which var is the n-th best?
    heap: Vec<VarId>,
    /// VarId : -> order : usize::from -- How good is the var?
    /// `idxs[0]` holds the number of alive elements
    idxs: Vec<usize>,
}

impl fmt::Display for VarIdHeap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            " - seek pointer - nth -> var: {:?}\n - var -> nth: {:?}",
            self.heap, self.idxs,
        )
    }
}

impl VarIdHeap {
    pub fn new(n: usize, init: usize) -> Self {
        let mut heap = Vec::with_capacity(n + 1);
        let mut idxs = Vec::with_capacity(n + 1);
        heap.push(0);
        idxs.push(n);
        for i in 1..=n {
            heap.push(i);
            idxs.push(i);
        }
        idxs[0] = init;
        VarIdHeap { heap, idxs }
    }
    /// add a slot for a new var `vi` outside of the alive region.
    pub fn push_var(&mut self, vi: VarId) {
        debug_assert_eq!(vi, self.heap.len());
        self.heap.push(vi);
        self.idxs.push(vi);
    }
    pub fn contains(&self, v: VarId) -> bool {
        self.idxs[v] <= self.idxs[0]
    }
    pub fn len(&self) -> usize {
        self.idxs[0]
    }
    pub fn is_empty(&self) -> bool {
        self.idxs[0] == 0
    }
    #[cfg(test)]
    fn is_permutation(&self) -> bool {
        let mut h = self.heap[1..].to_vec();
        h.sort_unstable();
        h.iter().enumerate().all(|(i, v)| *v == i + 1)
            && (1..self.heap.len()).all(|i| self.idxs[self.heap[i]] == i)
    }
}

pub trait VarHeapIF {
    fn update_heap(&mut self, v: VarId);
    fn insert_heap(&mut self, vi: VarId);
    fn get_heap_root(&mut self) -> VarId;
    fn percolate_up(&mut self, start: usize);
    fn percolate_down(&mut self, start: usize);
}

impl VarHeapIF for AssignStack {
    fn update_heap(&mut self, v: VarId) {
        debug_assert!(v != 0, "Invalid VarId");
        let start = self.var_order.idxs[v];
        if self.var_order.contains(v) {
            self.percolate_up(start);
        }
    }
    fn insert_heap(&mut self, vi: VarId) {
        if self.var_order.contains(vi) {
            let i = self.var_order.idxs[vi];
            self.percolate_up(i);
            return;
        }
        let i = self.var_order.idxs[vi];
        let n = self.var_order.idxs[0] + 1;
        let vn = self.var_order.heap[n];
        self.var_order.heap.swap(i, n);
        self.var_order.idxs.swap(vi, vn);
        self.var_order.idxs[0] = n;
        self.percolate_up(n);
    }
    fn get_heap_root(&mut self) -> VarId {
        let s = 1;
        let vs = self.var_order.heap[s];
        let n = self.var_order.idxs[0];
        let vn = self.var_order.heap[n];
        debug_assert!(vn != 0, "Invalid VarId for heap");
        debug_assert!(vs != 0, "Invalid VarId for heap");
        self.var_order.heap.swap(n, s);
        self.var_order.idxs.swap(vn, vs);
        self.var_order.idxs[0] -= 1;
        if 1 < self.var_order.idxs[0] {
            self.percolate_down(1);
        }
        vs
    }
    fn percolate_up(&mut self, start: usize) {
        let mut q = start;
        let vq = self.var_order.heap[q];
        debug_assert!(0 < vq, "size of heap is too small");
        let aq = self.activity[vq];
        loop {
            let p = q / 2;
            if p == 0 {
                self.var_order.heap[q] = vq;
                self.var_order.idxs[vq] = q;
                return;
            }
            let vp = self.var_order.heap[p];
            if self.activity[vp] < aq {
                // move down the current parent, and make it empty
                self.var_order.heap[q] = vp;
                self.var_order.idxs[vp] = q;
                q = p;
            } else {
                self.var_order.heap[q] = vq;
                self.var_order.idxs[vq] = q;
                return;
            }
        }
    }
    fn percolate_down(&mut self, start: usize) {
        let n = self.var_order.len();
        let mut i = start;
        let vi = self.var_order.heap[i];
        let ai = self.activity[vi];
        loop {
            let l = 2 * i; // left
            if l <= n {
                let vl = self.var_order.heap[l];
                let al = self.activity[vl];
                let r = l + 1; // right
                let (target, vc, ac) =
                    if r <= n && al < self.activity[self.var_order.heap[r]] {
                        let vr = self.var_order.heap[r];
                        (r, vr, self.activity[vr])
                    } else {
                        (l, vl, al)
                    };
                if ai < ac {
                    self.var_order.heap[i] = vc;
                    self.var_order.idxs[vc] = i;
                    i = target;
                    continue;
                }
            }
            self.var_order.heap[i] = vi;
            debug_assert!(vi != 0, "invalid index");
            self.var_order.idxs[vi] = i;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::AssignIF;

    #[test]
    fn test_heap_order() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &ProblemDescription::with_vars(5));
        for (vi, a) in [(1, 0.5), (2, 4.0), (3, 1.0), (4, 3.0), (5, 2.0)] {
            asg.activity[vi] = a;
            asg.update_heap(vi);
        }
        let order = (0..5).map(|_| asg.get_heap_root()).collect::<Vec<_>>();
        assert_eq!(order, vec![2, 4, 5, 3, 1]);
        assert!(asg.var_order.is_empty());
        assert!(asg.var_order.is_permutation());
        asg.insert_heap(3);
        asg.insert_heap(1);
        assert_eq!(asg.var_order.len(), 2);
        assert_eq!(asg.get_heap_root(), 3);
        assert_eq!(asg.num_vars(), 5);
    }
}
