/// the Luby series used by the restart scheduler
pub mod luby;

pub use self::luby::*;
