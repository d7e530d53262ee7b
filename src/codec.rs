//! Binary encoding of alphabets and nondeterministic choices.
//!
//! The symbolic engine only reads letters as bit vectors. A letter of the
//! explicit automaton is written as
//!
//! ```text
//! [ symbol bits | choice bits ]
//! ```
//!
//! where the symbol bits hold the big-endian index of the symbol in the
//! alphabet, and the choice bits tell apart the targets of one
//! nondeterministic `(state, symbol)` pair. Both parts use the minimal width
//! from [`bit_width`].
//!
//! ```
//! use mtbdd_bridge::codec::AlphabetCodec;
//!
//! let codec = AlphabetCodec::new([10, 20, 30]);
//! assert_eq!(codec.width(), 2);
//! assert_eq!(codec.encode(20).unwrap(), &[false, true]);
//! assert_eq!(codec.decode(&[true, false]).unwrap(), 30);
//! assert!(codec.decode(&[true, true]).is_err());
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::nfa::Symbol;
use crate::types::{bits_to_string, Bit, BitVector};

/// Number of bits needed to tell `n` things apart.
///
/// `ceil(log2(n))` for `n > 1`, and `0` for `n ∈ {0, 1}`: a single symbol (or
/// a deterministic pair) needs no selector bits.
pub fn bit_width(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Big-endian binary code of `value` on exactly `width` bits.
///
/// # Panics
///
/// Panics if `value` does not fit into `width` bits.
pub fn binary_code(value: usize, width: usize) -> BitVector {
    assert!(
        width >= usize::BITS as usize || value >> width == 0,
        "Value {} does not fit into {} bits",
        value,
        width
    );
    (0..width).rev().map(|k| k < usize::BITS as usize && (value >> k) & 1 == 1).collect()
}

/// Value of a big-endian bit vector.
pub fn binary_value(bits: &[Bit]) -> usize {
    bits.iter().fold(0, |acc, &b| (acc << 1) | b as usize)
}

/// Bidirectional symbol ⇄ code dictionaries of one alphabet.
#[derive(Debug, Clone, Default)]
pub struct AlphabetCodec {
    width: usize,
    symbols: Vec<Symbol>,
    encode: HashMap<Symbol, BitVector>,
    decode: HashMap<BitVector, Symbol>,
}

impl AlphabetCodec {
    /// Build dictionaries using the minimal width for the given alphabet.
    ///
    /// The i-th symbol (in iteration order) gets the code of `i`.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let symbols: Vec<Symbol> = symbols.into_iter().collect();
        let width = bit_width(symbols.len());
        Self::with_width(symbols, width)
    }

    /// Build dictionaries with codes of exactly `width` bits.
    ///
    /// # Panics
    ///
    /// Panics if a symbol occurs twice, or if `width` is too small.
    pub fn with_width(symbols: impl IntoIterator<Item = Symbol>, width: usize) -> Self {
        let symbols: Vec<Symbol> = symbols.into_iter().collect();
        assert!(
            width >= bit_width(symbols.len()),
            "Width {} is too small for {} symbols",
            width,
            symbols.len()
        );

        let mut encode = HashMap::with_capacity(symbols.len());
        let mut decode = HashMap::with_capacity(symbols.len());
        for (i, &symbol) in symbols.iter().enumerate() {
            let code = binary_code(i, width);
            let previous = encode.insert(symbol, code.clone());
            assert!(previous.is_none(), "Symbol {} occurs twice", symbol);
            decode.insert(code, symbol);
        }

        Self {
            width,
            symbols,
            encode,
            decode,
        }
    }

    /// Number of bits per code.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in code order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Code of `symbol`.
    pub fn encode(&self, symbol: Symbol) -> Result<&[Bit]> {
        self.encode
            .get(&symbol)
            .map(Vec::as_slice)
            .ok_or(Error::UnknownSymbol(symbol))
    }

    /// Symbol whose code is `bits`.
    pub fn decode(&self, bits: &[Bit]) -> Result<Symbol> {
        self.decode
            .get(bits)
            .copied()
            .ok_or_else(|| Error::UnknownCode(bits_to_string(bits)))
    }
}
