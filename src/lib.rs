//! Library service application: the `books` module and service bootstrap.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{assemble, run, App};
pub use modules::*;
