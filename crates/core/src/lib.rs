#[macro_use]
extern crate tracing;

pub mod error;
pub mod kind;
pub mod io;
pub mod stage;
pub mod ui;
