pub mod scoreboard;
pub mod selection;
pub mod spin;
