//! Library side of the `ead-export` binary: command bodies and logging setup.

pub mod commands;
pub mod logging;
