//! Test support shared between modules

pub(crate) mod clock;
