//! Low-level codecs: line folding, escaping, quoted-printable and the
//! temporal and geo value formats.

pub mod escape;
pub mod fold;
pub mod geo;
pub mod iso8601;
pub mod offset;
pub mod partial;
pub mod quoted_printable;
pub mod unfold;

pub use fold::{fold, fold_quoted_printable};
pub use unfold::{LineUnfolder, LogicalLine};
