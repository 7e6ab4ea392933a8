//! tr-deffile: the TiRiFiC-style `.def` key=value file format.
//!
//! A `.def` file is line-oriented text. Lines of interest look like
//! `NAME= v0 v1 v2 ...`; everything else (comments, fitting controls,
//! unrecognized keys) is carried through verbatim so a round-trip touches
//! only the parameter lines the user actually edited. Parsing also records
//! how many fractional digits each parameter used in the source text so
//! values re-serialize at the same precision.

pub mod parse;
pub mod vocab;
pub mod write;

pub use parse::{DefFile, ParsedParameter};
pub use vocab::{STANDARD_PARAMETERS, standard_unit};
pub use write::{prepare_for_run, render_parameter_line, save_lines, splice_parameter};

pub type DefResult<T> = Result<T, DefError>;

#[derive(thiserror::Error, Debug)]
pub enum DefError {
    #[error("Empty/invalid parameter file: {what}")]
    InvalidFile { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
