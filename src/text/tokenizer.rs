//! Conversion from raw text to symbol-id sequences.

use crate::error::Result;
use crate::text::cleaners::{Cleaner, CleanerRegistry};
use crate::text::symbols::{SymbolTable, PHONE_MARKER};

/// Tokenizer owning its symbol table and resolved cleaner chain.
///
/// Cleaner names are resolved against the registry at construction time, so
/// an unknown name fails here rather than in the middle of a synthesis call.
pub struct TextTokenizer {
    symbols: SymbolTable,
    cleaners: Vec<Cleaner>,
}

impl TextTokenizer {
    /// Build a tokenizer from a symbol table and an ordered cleaner list.
    pub fn new(
        symbols: SymbolTable,
        cleaner_names: &[String],
        registry: &CleanerRegistry,
    ) -> Result<Self> {
        let cleaners = registry.resolve(cleaner_names)?;
        Ok(Self { symbols, cleaners })
    }

    /// The symbol table this tokenizer maps through.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Convert `text` to a symbol-id sequence terminated by the EOS id.
    ///
    /// Literal runs pass through the cleaner chain and are mapped one
    /// character at a time; `{...}` spans are split on whitespace and looked
    /// up as `@`-prefixed phonetic units. Symbols the table does not carry
    /// (and the reserved pad/EOS markers) are dropped silently, so the
    /// result always ends with EOS and is never empty.
    pub fn tokenize(&self, text: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match split_braced(rest) {
                Some((literal, phonetic, tail)) => {
                    self.push_literal(literal, &mut ids);
                    self.push_phonetic(phonetic, &mut ids);
                    rest = tail;
                }
                None => {
                    self.push_literal(rest, &mut ids);
                    break;
                }
            }
        }
        ids.push(self.symbols.eos_id());
        ids
    }

    fn push_literal(&self, text: &str, ids: &mut Vec<u32>) {
        if text.is_empty() {
            return;
        }
        let mut cleaned = text.to_owned();
        for cleaner in &self.cleaners {
            cleaned = cleaner(&cleaned);
        }
        let mut buf = [0u8; 4];
        for ch in cleaned.chars() {
            if let Some(id) = self.symbols.sequence_id(ch.encode_utf8(&mut buf)) {
                ids.push(id);
            }
        }
    }

    fn push_phonetic(&self, content: &str, ids: &mut Vec<u32>) {
        for unit in content.split_whitespace() {
            if let Some(id) = self.symbols.sequence_id(&format!("{PHONE_MARKER}{unit}")) {
                ids.push(id);
            }
        }
    }
}

impl std::fmt::Debug for TextTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTokenizer")
            .field("symbols", &self.symbols.len())
            .field("cleaners", &self.cleaners.len())
            .finish()
    }
}

/// Split `text` into (literal, phonetic content, tail) at the first `{...}`
/// annotation.
///
/// The content must be non-empty: it ends at the first closing brace that
/// leaves at least one character inside. Without a usable annotation the
/// whole text is one literal run.
fn split_braced(text: &str) -> Option<(&str, &str, &str)> {
    let open = text.find('{')?;
    let after = &text[open + 1..];
    let close = match after.find('}')? {
        0 => after[1..].find('}')? + 1,
        n => n,
    };
    Some((&text[..open], &after[..close], &after[close + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tokenizer() -> TextTokenizer {
        // No cleaners: ids must match direct table lookup.
        TextTokenizer::new(SymbolTable::default(), &[], &CleanerRegistry::new()).unwrap()
    }

    fn basic_tokenizer() -> TextTokenizer {
        TextTokenizer::new(
            SymbolTable::default(),
            &["basic_cleaners".to_string()],
            &CleanerRegistry::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_plain_text_matches_table_lookup() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        let ids = tokenizer.tokenize("abc");
        let expected = vec![
            table.id("a").unwrap(),
            table.id("b").unwrap(),
            table.id("c").unwrap(),
            table.eos_id(),
        ];
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_eos_always_present() {
        let tokenizer = basic_tokenizer();
        for text in ["", "hello", "{}", "¢¢¢", "{UNKNOWN}"] {
            let ids = tokenizer.tokenize(text);
            assert!(!ids.is_empty(), "no ids for {text:?}");
            assert_eq!(*ids.last().unwrap(), tokenizer.symbols().eos_id());
        }
        assert_eq!(tokenizer.tokenize(""), vec![1]);
    }

    #[test]
    fn test_phonetic_annotation() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        let ids = tokenizer.tokenize("{AY1 B}");
        assert_eq!(
            ids,
            vec![
                table.id("@AY1").unwrap(),
                table.id("@B").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_literal_phonetic_literal() {
        // Custom table mirroring the documented contract for "A {B C} D".
        let table = SymbolTable::from_symbols(
            ["_", "~", "A", "D", " ", "@B", "@C"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();
        let tokenizer = TextTokenizer::new(table, &[], &CleanerRegistry::new()).unwrap();
        let t = tokenizer.symbols();
        let ids = tokenizer.tokenize("A {B C} D");
        let expected = vec![
            t.id("A").unwrap(),
            t.id(" ").unwrap(),
            t.id("@B").unwrap(),
            t.id("@C").unwrap(),
            t.id(" ").unwrap(),
            t.id("D").unwrap(),
            t.eos_id(),
        ];
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_multiple_annotations() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        let ids = tokenizer.tokenize("{AA}a{IY}");
        assert_eq!(
            ids,
            vec![
                table.id("@AA").unwrap(),
                table.id("a").unwrap(),
                table.id("@IY").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_cleaners_applied_to_literals_only() {
        let tokenizer = basic_tokenizer();
        let table = tokenizer.symbols();
        // "HI" lowercases; the annotation is looked up verbatim.
        let ids = tokenizer.tokenize("HI{AA}");
        assert_eq!(
            ids,
            vec![
                table.id("h").unwrap(),
                table.id("i").unwrap(),
                table.id("@AA").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_unknown_symbols_dropped() {
        let tokenizer = basic_tokenizer();
        let table = tokenizer.symbols();
        let ids = tokenizer.tokenize("a¢b");
        assert_eq!(
            ids,
            vec![
                table.id("a").unwrap(),
                table.id("b").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_reserved_markers_dropped() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        let ids = tokenizer.tokenize("a_~b");
        assert_eq!(
            ids,
            vec![
                table.id("a").unwrap(),
                table.id("b").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_unknown_phonetic_units_dropped() {
        let tokenizer = raw_tokenizer();
        let ids = tokenizer.tokenize("{QQ ZZ}");
        assert_eq!(ids, vec![tokenizer.symbols().eos_id()]);
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        // No closing brace: the run is treated as literal and '{' drops out.
        assert_eq!(
            tokenizer.tokenize("ab{"),
            vec![
                table.id("a").unwrap(),
                table.id("b").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_empty_braces_fall_through() {
        let tokenizer = raw_tokenizer();
        let table = tokenizer.symbols();
        assert_eq!(tokenizer.tokenize("{}"), vec![table.eos_id()]);
        // With a later closing brace the span is consumed as (unknown)
        // phonetic content up to it.
        let ids = tokenizer.tokenize("a {} b {AA} c");
        assert_eq!(
            ids,
            vec![
                table.id("a").unwrap(),
                table.id(" ").unwrap(),
                table.id(" ").unwrap(),
                table.id("c").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_unknown_cleaner_fails_construction() {
        let result = TextTokenizer::new(
            SymbolTable::default(),
            &["english_cleaners".to_string()],
            &CleanerRegistry::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_cleaner_runs() {
        let mut registry = CleanerRegistry::new();
        registry.register("strip_digits", |text: &str| {
            text.chars().filter(|c| !c.is_ascii_digit()).collect()
        });
        let tokenizer = TextTokenizer::new(
            SymbolTable::default(),
            &["strip_digits".to_string()],
            &registry,
        )
        .unwrap();
        let table = tokenizer.symbols();
        assert_eq!(
            tokenizer.tokenize("a1b2"),
            vec![
                table.id("a").unwrap(),
                table.id("b").unwrap(),
                table.eos_id()
            ]
        );
    }

    #[test]
    fn test_split_braced() {
        assert_eq!(split_braced("a{b}c"), Some(("a", "b", "c")));
        assert_eq!(split_braced("{b}"), Some(("", "b", "")));
        assert_eq!(split_braced("no braces"), None);
        assert_eq!(split_braced("a{b"), None);
        assert_eq!(split_braced("{}"), None);
        // Empty pair followed by another brace: content runs to the later
        // closing brace.
        assert_eq!(split_braced("{}x}y"), Some(("", "}x", "y")));
    }
}
