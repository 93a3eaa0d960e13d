//! Text front-end: symbol table, cleaner registry, and tokenizer.
//!
//! Raw text (optionally carrying `{...}` phonetic annotations) is normalized
//! by named cleaner functions and mapped to integer symbol ids the acoustic
//! model was trained on.

mod cleaners;
mod symbols;
mod tokenizer;

pub use cleaners::{Cleaner, CleanerRegistry};
pub use symbols::{SymbolTable, EOS_SYMBOL, PAD_SYMBOL, PHONE_MARKER};
pub use tokenizer::TextTokenizer;
