//! End-to-end tests of the tessera vCard library.

mod codecs;
mod legacy;
mod policy;
mod registry;
mod round_trip;
