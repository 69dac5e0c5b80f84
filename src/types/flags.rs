use bitflags::bitflags;

/// API for object properties.
pub trait FlagIF {
    type FlagType;
    /// return true if the flag in on.
    fn is(&self, flag: Self::FlagType) -> bool;
    /// set the flag.
    fn set(&mut self, f: Self::FlagType, b: bool);
    /// toggle the flag off.
    fn turn_off(&mut self, flag: Self::FlagType);
    /// toggle the flag on.
    fn turn_on(&mut self, flag: Self::FlagType);
}

bitflags! {
    /// Misc flags used by [`Constraint`](`crate::cdb::Constraint`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagConstraint: u8 {
        /// a constraint generated by conflict analysis; it is removable.
        const LEARNT       = 0b0000_0001;
        /// a constraint removed from the database; its slot is never reused.
        const DEAD         = 0b0000_0010;
    }
}

bitflags! {
    /// Misc flags used by [`AssignStack`](`crate::assign::AssignStack`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagVar: u8 {
        /// the previous assigned value of a Var.
        const PHASE        = 0b0000_0001;
        /// a var appears in the objective function.
        const OBJECTIVE    = 0b0000_0010;
    }
}
