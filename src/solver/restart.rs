//! Crate `restart` provides restart schedules.
use {
    crate::{config::RestartPolicy, primitive::luby::LubySeries, solver::SolverEvent, types::*},
    std::fmt,
};

/// API for [`restart`](`crate::solver::RestartIF::restart`).
pub trait RestartIF: Instantiate + PropertyDereference<property::Tusize, usize> {
    /// count a conflict, and return `true` if the search should restart now.
    fn restart(&mut self) -> bool;
    /// return the number of conflicts allowed until the next restart.
    fn restart_step(&self) -> usize;
}

/// `Restarter` provides restart API and holds data about restart conditions.
#[derive(Clone, Debug)]
pub struct Restarter {
    policy: RestartPolicy,
    luby: LubySeries,
    /// the number of conflicts since the last restart
    after_restart: usize,
    /// the length of the current restart interval
    restart_step: usize,

    //
    //## statistics
    //
    num_restart: usize,
}

impl Default for Restarter {
    fn default() -> Self {
        Restarter {
            policy: RestartPolicy::Luby { unit: 100 },
            luby: LubySeries::default(),
            after_restart: 0,
            restart_step: 100,
            num_restart: 0,
        }
    }
}

impl fmt::Display for Restarter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Restarter[{:?}, {}/{}]",
            self.policy, self.after_restart, self.restart_step
        )
    }
}

impl Instantiate for Restarter {
    fn instantiate(config: &Config, _: &ProblemDescription) -> Self {
        let mut rst = Restarter {
            policy: config.restart,
            ..Restarter::default()
        };
        rst.restart_step = rst.first_step();
        rst
    }
    fn handle(&mut self, e: SolverEvent) {
        match e {
            SolverEvent::Restart => {
                self.after_restart = 0;
                self.num_restart += 1;
            }
            SolverEvent::Reinitialize => {
                self.luby.reset();
                self.after_restart = 0;
                self.restart_step = self.first_step();
            }
            _ => (),
        }
    }
}

impl Restarter {
    fn first_step(&mut self) -> usize {
        match self.policy {
            RestartPolicy::Luby { unit } => unit * self.luby.next().unwrap_or(1),
            RestartPolicy::Geometric { first, .. } => first,
            RestartPolicy::Never => usize::MAX,
        }
    }
    fn next_step(&mut self) -> usize {
        match self.policy {
            RestartPolicy::Luby { unit } => unit * self.luby.next().unwrap_or(1),
            RestartPolicy::Geometric { factor, .. } => {
                (self.restart_step as f64 * factor).ceil() as usize
            }
            RestartPolicy::Never => usize::MAX,
        }
    }
}

impl RestartIF for Restarter {
    fn restart(&mut self) -> bool {
        self.after_restart += 1;
        if self.after_restart < self.restart_step {
            return false;
        }
        self.restart_step = self.next_step();
        true
    }
    fn restart_step(&self) -> usize {
        self.restart_step
    }
}

pub mod property {
    use super::Restarter;
    use crate::types::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum Tusize {
        NumRestart,
    }

    pub const USIZES: [Tusize; 1] = [Tusize::NumRestart];

    impl PropertyDereference<Tusize, usize> for Restarter {
        #[inline]
        fn derefer(&self, k: Tusize) -> usize {
            match k {
                Tusize::NumRestart => self.num_restart,
            }
        }
    }
}
