//! Crate-level unit and behaviour tests.

pub(crate) mod support;

mod behaviour;
mod unit;
