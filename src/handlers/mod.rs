pub mod debug;
pub mod index;
pub mod join;
pub mod servers;
