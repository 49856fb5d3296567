use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DeckError;

/// Symbols used when no custom set is configured
pub const DEFAULT_SYMBOLS: [&str; 8] = [
    "anchor",
    "bicycle",
    "bolt",
    "bomb",
    "cube",
    "diamond",
    "leaf",
    "paper-plane",
];

/// Opaque card face identifier. Two cards match when their symbols are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Validated set of distinct symbols; each one becomes a pair in the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, DeckError> {
        if symbols.is_empty() {
            return Err(DeckError::Empty);
        }
        if let Some(dup) = symbols.iter().duplicates().next() {
            return Err(DeckError::DuplicateSymbol(dup.clone()));
        }
        Ok(Self { symbols })
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DeckError> {
        Self::new(names.iter().map(|n| Symbol::new(n.as_ref())).collect())
    }

    pub fn pairs(&self) -> usize {
        self.symbols.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|&s| Symbol::new(s)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub position: usize,
    pub symbol: Symbol,
    pub state: CardState,
}

impl Card {
    pub fn is_hidden(&self) -> bool {
        self.state == CardState::Hidden
    }

    pub fn is_matched(&self) -> bool {
        self.state == CardState::Matched
    }
}

/// Ordered cards of one game, laid out in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut Card> {
        self.cards.get_mut(position)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.cards.iter().map(|c| &c.symbol)
    }

    pub fn count_in(&self, state: CardState) -> usize {
        self.cards.iter().filter(|c| c.state == state).count()
    }
}

/// Duplicate every symbol and shuffle with Fisher–Yates.
///
/// Positions are assigned after shuffling, so `cards()[i].position == i`.
pub fn build_deck<R: Rng + ?Sized>(symbols: &SymbolSet, rng: &mut R) -> Deck {
    let mut faces: Vec<Symbol> = symbols
        .iter()
        .flat_map(|s| [s.clone(), s.clone()])
        .collect();

    for i in (1..faces.len()).rev() {
        let j = rng.gen_range(0..=i);
        faces.swap(i, j);
    }

    let cards = faces
        .into_iter()
        .enumerate()
        .map(|(position, symbol)| Card {
            position,
            symbol,
            state: CardState::Hidden,
        })
        .collect();

    Deck { cards }
}
