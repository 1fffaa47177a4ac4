//! The immutable symbol registry shared by every parse.
//!
//! A [`SymbolTable`] is built once (through [`SymbolTableBuilder`] or the TOML
//! loader), validated as a whole, and then only read. Keys are interned so the
//! rest of the pipeline handles symbols as [`SymbolId`]s and looks their
//! definitions up in constant time.

use std::collections::HashSet;

use log::debug;
use string_interner::DefaultStringInterner;

use crate::{
    error::ConfigError,
    symbol::{Category, SymbolDefinition, SymbolId},
};

/// Validated, read-only mapping from symbol keys to definitions.
///
/// The table is `Send + Sync`; share it between threads behind a reference or
/// an `Arc`.
///
/// # Example
///
/// ```
/// # use kspk_core::{Associativity, GroupMode, SymbolDefinition, SymbolTable};
/// let table = SymbolTable::builder()
///     .symbol(SymbolDefinition::atom("⬢"))
///     .symbol(SymbolDefinition::binary("♦", 4, Associativity::Left))
///     .symbol(SymbolDefinition::group_open("⟨", "⟩", GroupMode::Auto))
///     .symbol(SymbolDefinition::group_close("⟩"))
///     .build()
///     .expect("valid table");
///
/// assert!(table.lookup("♦").is_some());
/// assert!(table.lookup("?").is_none());
/// ```
#[derive(Debug)]
pub struct SymbolTable {
    interner: DefaultStringInterner,
    /// Indexed by `SymbolId::index`; keys are interned in definition order.
    definitions: Vec<SymbolDefinition>,
    /// Closing symbol of each group open, indexed like `definitions`.
    closers: Vec<Option<SymbolId>>,
    max_key_chars: usize,
}

impl SymbolTable {
    /// Start building a table programmatically.
    pub fn builder() -> SymbolTableBuilder {
        SymbolTableBuilder::default()
    }

    /// Definition for `key`, if the key is known.
    pub fn lookup(&self, key: &str) -> Option<&SymbolDefinition> {
        self.id(key).map(|id| self.get(id))
    }

    /// Handle for `key`, if the key is known.
    pub fn id(&self, key: &str) -> Option<SymbolId> {
        self.interner.get(key).map(SymbolId::new)
    }

    /// Definition behind a handle produced by this table.
    pub fn get(&self, id: SymbolId) -> &SymbolDefinition {
        &self.definitions[id.index()]
    }

    /// Key behind a handle produced by this table.
    pub fn key(&self, id: SymbolId) -> &str {
        self.interner
            .resolve(id.symbol())
            .unwrap_or_else(|| self.definitions[id.index()].key())
    }

    /// The closing symbol paired with a group open.
    pub fn closer_of(&self, open: SymbolId) -> Option<SymbolId> {
        self.closers.get(open.index()).copied().flatten()
    }

    /// Longest key that is a prefix of `text`.
    ///
    /// Returns the handle and the matched length in bytes.
    pub fn longest_match(&self, text: &str) -> Option<(SymbolId, usize)> {
        let ends: Vec<usize> = text
            .char_indices()
            .map(|(offset, ch)| offset + ch.len_utf8())
            .take(self.max_key_chars)
            .collect();

        ends.into_iter()
            .rev()
            .find_map(|end| self.id(&text[..end]).map(|id| (id, end)))
    }

    /// All definitions with their handles, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolDefinition)> + '_ {
        self.interner
            .iter()
            .map(|(symbol, _)| SymbolId::new(symbol))
            .map(|id| (id, self.get(id)))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Collects definitions and validates them into a [`SymbolTable`].
#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
    definitions: Vec<SymbolDefinition>,
}

impl SymbolTableBuilder {
    /// Add a definition.
    pub fn symbol(mut self, definition: SymbolDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add several definitions.
    pub fn symbols(mut self, definitions: impl IntoIterator<Item = SymbolDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Validate the definitions and freeze them into a table.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found: bad keys,
    /// duplicates, arity that contradicts the category, unpaired or weighted
    /// delimiters, or non-finite weights.
    pub fn build(self) -> Result<SymbolTable, ConfigError> {
        let mut interner = DefaultStringInterner::new();
        let mut definitions = Vec::with_capacity(self.definitions.len());

        for definition in self.definitions {
            validate_definition(&definition)?;
            if interner.get(definition.key()).is_some() {
                return Err(ConfigError::DuplicateSymbol {
                    key: definition.key().to_string(),
                });
            }
            interner.get_or_intern(definition.key());
            definitions.push(definition);
        }

        let closers = pair_delimiters(&interner, &definitions)?;

        let max_key_chars = definitions
            .iter()
            .map(|definition| definition.key().chars().count())
            .max()
            .unwrap_or(0);

        debug!(symbols = definitions.len(), max_key_chars = max_key_chars; "Symbol table built");

        Ok(SymbolTable {
            interner,
            definitions,
            closers,
            max_key_chars,
        })
    }
}

fn validate_definition(definition: &SymbolDefinition) -> Result<(), ConfigError> {
    let key = definition.key();
    if key.is_empty() {
        return Err(ConfigError::EmptyKey);
    }
    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::WhitespaceInKey {
            key: key.to_string(),
        });
    }

    let category = definition.category();
    if definition.arity() != category.arity() {
        return Err(ConfigError::ArityMismatch {
            key: key.to_string(),
            category,
            declared: definition.arity(),
            expected: category.arity(),
        });
    }

    if category.is_delimiter() && !definition.weights().is_zero() {
        return Err(ConfigError::WeightedDelimiter {
            key: key.to_string(),
        });
    }

    let affect_finite = definition
        .declared_affect()
        .is_none_or(|affect| affect.is_finite());
    if !definition.weights().is_finite() || !affect_finite {
        return Err(ConfigError::NonFiniteWeight {
            key: key.to_string(),
        });
    }

    match (category, definition.closes_with()) {
        (Category::GroupOpen, None) => Err(ConfigError::MissingCloser {
            key: key.to_string(),
        }),
        (Category::GroupOpen, Some(_)) | (_, None) => Ok(()),
        (_, Some(_)) => Err(ConfigError::UnexpectedCloser {
            key: key.to_string(),
        }),
    }
}

/// Resolve every group open to its closer and check every closer is used.
fn pair_delimiters(
    interner: &DefaultStringInterner,
    definitions: &[SymbolDefinition],
) -> Result<Vec<Option<SymbolId>>, ConfigError> {
    let mut closers = vec![None; definitions.len()];
    let mut used_closers = HashSet::new();

    for (index, definition) in definitions.iter().enumerate() {
        let Some(closes_with) = definition.closes_with() else {
            continue;
        };

        let closer = interner
            .get(closes_with)
            .map(SymbolId::new)
            .filter(|id| definitions[id.index()].category() == Category::GroupClose)
            .ok_or_else(|| ConfigError::UnknownCloser {
                key: definition.key().to_string(),
                closes_with: closes_with.to_string(),
            })?;

        closers[index] = Some(closer);
        used_closers.insert(closer);
    }

    for definition in definitions {
        if definition.category() != Category::GroupClose {
            continue;
        }
        let paired = interner
            .get(definition.key())
            .is_some_and(|symbol| used_closers.contains(&SymbolId::new(symbol)));
        if !paired {
            return Err(ConfigError::UnpairedClose {
                key: definition.key().to_string(),
            });
        }
    }

    Ok(closers)
}
