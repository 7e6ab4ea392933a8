use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("History list is exhausted")]
    HistoryExhausted,

    #[error("Parameter already displayed: {name}")]
    DuplicateParameter { name: String },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Grid {rows}x{cols} cannot hold {displayed} displayed parameters")]
    LayoutMismatch {
        rows: usize,
        cols: usize,
        displayed: usize,
    },

    #[error(transparent)]
    Core(#[from] tr_core::TrError),
}
