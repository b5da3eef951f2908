//! Command-line front end for the tessera vCard library.

pub mod cli;
pub mod convert;
