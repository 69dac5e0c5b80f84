use std::fmt;

/// The Luby series without its first term: 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...
/// used as a restart schedule.
#[derive(Clone, Debug)]
pub struct LubySeries {
    index: usize,
    seq: isize,
    size: usize,
    max_value: usize,
}

impl Default for LubySeries {
    fn default() -> Self {
        LubySeries {
            index: 0,
            seq: 0,
            size: 1,
            max_value: 1,
        }
    }
}

impl fmt::Display for LubySeries {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Luby[index:{}, max:{}]", self.index, self.max_value)
    }
}

impl Iterator for LubySeries {
    type Item = usize;
    /// Find the finite subsequence that contains the current index, and
    /// return the last element of it.
    fn next(&mut self) -> Option<usize> {
        self.index += 1;
        let mut seq = self.seq;
        let mut size = self.size;
        while size < self.index + 1 {
            self.seq = seq;
            seq += 1;
            self.size = size;
            size = 2 * size + 1;
        }
        let mut index = self.index;
        while size - 1 != index {
            size = (size - 1) >> 1;
            seq -= 1;
            index %= size;
        }
        let val = 1usize << seq;
        self.max_value = self.max_value.max(val);
        Some(val)
    }
}

impl LubySeries {
    pub fn max_value(&self) -> usize {
        self.max_value
    }
    pub fn reset(&mut self) {
        self.index = 0;
        self.seq = 0;
        self.size = 1;
    }
}
