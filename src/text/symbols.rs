//! Fixed symbol inventory shared with the acoustic model.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Padding marker, always id 0.
pub const PAD_SYMBOL: char = '_';

/// End-of-sequence marker, always id 1.
pub const EOS_SYMBOL: char = '~';

/// Prefix distinguishing phonetic units from plain characters.
pub const PHONE_MARKER: char = '@';

const CHARACTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!'\"(),-.:;? ";

/// ARPAbet phone set, stress-marked vowels included.
const ARPABET: &[&str] = &[
    "AA", "AA0", "AA1", "AA2", "AE", "AE0", "AE1", "AE2", "AH", "AH0", "AH1", "AH2", "AO", "AO0",
    "AO1", "AO2", "AW", "AW0", "AW1", "AW2", "AY", "AY0", "AY1", "AY2", "B", "CH", "D", "DH",
    "EH", "EH0", "EH1", "EH2", "ER", "ER0", "ER1", "ER2", "EY", "EY0", "EY1", "EY2", "F", "G",
    "HH", "IH", "IH0", "IH1", "IH2", "IY", "IY0", "IY1", "IY2", "JH", "K", "L", "M", "N", "NG",
    "OW", "OW0", "OW1", "OW2", "OY", "OY0", "OY1", "OY2", "P", "R", "S", "T", "TH", "UH", "UH0",
    "UH1", "UH2", "UW", "UW0", "UW1", "UW2", "V", "W", "Y", "Z", "ZH",
];

/// Bijective mapping between textual/phonetic symbols and integer ids.
///
/// The layout is part of the checkpoint contract: id 0 is the padding marker,
/// id 1 the end-of-sequence marker, and everything after follows the order
/// the model was trained with.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<String>,
    ids: HashMap<String, u32>,
}

impl SymbolTable {
    /// Build a table from an explicit symbol list.
    ///
    /// The first two entries must be the pad and EOS markers, and every
    /// symbol must be unique.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self> {
        let pad = PAD_SYMBOL.to_string();
        let eos = EOS_SYMBOL.to_string();
        if symbols.first() != Some(&pad) || symbols.get(1) != Some(&eos) {
            return Err(Error::Config(format!(
                "symbol table must start with '{PAD_SYMBOL}' and '{EOS_SYMBOL}'"
            )));
        }
        let mut ids = HashMap::with_capacity(symbols.len());
        for (id, symbol) in symbols.iter().enumerate() {
            if ids.insert(symbol.clone(), id as u32).is_some() {
                return Err(Error::Config(format!(
                    "duplicate symbol '{symbol}' in table"
                )));
            }
        }
        Ok(Self { symbols, ids })
    }

    /// Id for `symbol`, if it is in the table.
    pub fn id(&self, symbol: &str) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    /// Symbol for `id`, if it is in the table.
    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(String::as_str)
    }

    /// Id for symbols allowed inside a token sequence.
    ///
    /// The pad and EOS markers are reserved for batching and termination;
    /// they, like anything not in the table, resolve to `None` so the
    /// tokenizer drops them instead of erroring.
    pub fn sequence_id(&self, symbol: &str) -> Option<u32> {
        self.id(symbol)
            .filter(|&id| id != self.pad_id() && id != self.eos_id())
    }

    /// Id of the padding marker.
    pub fn pad_id(&self) -> u32 {
        0
    }

    /// Id of the end-of-sequence marker.
    pub fn eos_id(&self) -> u32 {
        1
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolTable {
    /// The standard inventory: markers, characters, `@`-prefixed phones.
    fn default() -> Self {
        let mut symbols = vec![PAD_SYMBOL.to_string(), EOS_SYMBOL.to_string()];
        symbols.extend(CHARACTERS.chars().map(|c| c.to_string()));
        symbols.extend(ARPABET.iter().map(|unit| format!("{PHONE_MARKER}{unit}")));
        let ids = symbols
            .iter()
            .enumerate()
            .map(|(id, symbol)| (symbol.clone(), id as u32))
            .collect();
        Self { symbols, ids }
    }
}
