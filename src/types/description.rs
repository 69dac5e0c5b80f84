use std::fmt;

/// Problem locator
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ProblemIndicator {
    /// not specified
    #[default]
    Void,
    /// from a file read by an external reader
    File(String),
    /// embedded directly as a vector of constraints
    LitVec(usize),
}

impl fmt::Display for ProblemIndicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProblemIndicator::Void => write!(f, "No problem specified"),
            ProblemIndicator::File(file) => write!(f, "file({file})"),
            ProblemIndicator::LitVec(n) => write!(f, "a vec({n} constraints)"),
        }
    }
}

/// Data storage about a problem, used to size every module.
#[derive(Clone, Debug, Default)]
pub struct ProblemDescription {
    pub num_of_variables: usize,
    pub num_of_constraints: usize,
    pub pathname: ProblemIndicator,
}

impl fmt::Display for ProblemDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ProblemDescription {
            num_of_variables: nv,
            num_of_constraints: nc,
            pathname: path,
        } = &self;
        write!(f, "Problem({nv}, {nc}, {path})")
    }
}

impl ProblemDescription {
    pub fn with_vars(num_of_variables: usize) -> Self {
        ProblemDescription {
            num_of_variables,
            ..ProblemDescription::default()
        }
    }
}

impl<V: AsRef<[i32]>> From<&[V]> for ProblemDescription {
    fn from(vec: &[V]) -> Self {
        let num_of_variables = vec
            .iter()
            .map(|c| c.as_ref().iter().map(|l| l.unsigned_abs()).max().unwrap_or(0))
            .max()
            .unwrap_or(0) as usize;
        ProblemDescription {
            num_of_variables,
            num_of_constraints: vec.len(),
            pathname: ProblemIndicator::LitVec(vec.len()),
        }
    }
}
