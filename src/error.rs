use std::collections::TryReserveError;

use thiserror::Error;

use crate::nfa::Symbol;

/// Recoverable failures of the codec and the converter.
///
/// Misuse of the diagram API (wrong bit vector lengths, out-of-range levels,
/// exporting an incomplete diagram) is a caller bug and panics instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The symbol has no code in the alphabet dictionary
    #[error("symbol {0} is not part of the alphabet")]
    UnknownSymbol(Symbol),

    /// The alphabet lists the same symbol twice
    #[error("symbol {0} occurs twice in the alphabet")]
    DuplicateSymbol(Symbol),

    /// The bit vector is not the code of any symbol
    #[error("bit vector '{0}' does not encode any symbol")]
    UnknownCode(String),

    /// The flat node table could not be allocated
    #[error("could not allocate a node table of {entries} entries")]
    Allocation {
        entries: usize,
        #[source]
        source: TryReserveError,
    },

    /// Formatting a DOT graph failed
    #[error("could not format the diagram")]
    Format(#[from] std::fmt::Error),

    /// Writing a DOT file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check whether this is a dictionary lookup failure.
    ///
    /// Lookup failures are expected while decoding sink paths and are skipped
    /// by the converter.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::UnknownSymbol(_) | Error::UnknownCode(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
