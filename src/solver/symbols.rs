//! Symbol containers: the unordered candidate set and the ordered list used
//! for factor-multiset bundles.

use std::fmt;

use im::OrdSet;
use itertools::Itertools;

/// A symbol is any short string; `"*"` is reserved at the parsing boundary
/// to mean "not yet initialized" and never appears inside a [`SymbolSet`].
pub type Symbol = String;

/// An unordered collection of distinct symbols.
///
/// Backed by a persistent ordered set, so clones share structure and
/// iteration order is stable (sorted), which keeps every downstream
/// tie-break deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSet(OrdSet<Symbol>);

impl SymbolSet {
    pub fn new() -> Self {
        Self(OrdSet::new())
    }

    pub fn singleton(symbol: impl Into<Symbol>) -> Self {
        let mut set = OrdSet::new();
        set.insert(symbol.into());
        Self(set)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    pub fn insert(&mut self, symbol: impl Into<Symbol>) {
        self.0.insert(symbol.into());
    }

    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        Self(self.0.clone().union(other.0.clone()))
    }

    pub fn intersection(&self, other: &SymbolSet) -> SymbolSet {
        Self(self.0.iter().filter(|s| other.contains(s)).cloned().collect())
    }

    /// The symbols of `self` that are not in `other`.
    pub fn difference(&self, other: &SymbolSet) -> SymbolSet {
        Self(
            self.0
                .iter()
                .filter(|s| !other.contains(s))
                .cloned()
                .collect(),
        )
    }

    /// An arbitrarily-chosen member, primarily useful when the set is
    /// already known to hold exactly one value.
    pub fn value(&self) -> Option<&Symbol> {
        self.0.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(" "))
    }
}

/// An ordered sequence of symbols that allows repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList(Vec<Symbol>);

impl SymbolList {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    /// The distinct symbols in this list.
    pub fn as_set(&self) -> SymbolSet {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<Symbol> for SymbolList {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SymbolList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().sorted().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(symbols: &[&str]) -> SymbolSet {
        symbols.iter().copied().collect()
    }

    #[test]
    fn set_algebra() {
        let a = set(&["1", "2", "3"]);
        let b = set(&["2", "3", "4"]);
        assert_eq!(a.union(&b), set(&["1", "2", "3", "4"]));
        assert_eq!(a.intersection(&b), set(&["2", "3"]));
        assert_eq!(a.difference(&b), set(&["1"]));
        assert_eq!(b.difference(&a), set(&["4"]));
    }

    #[test]
    fn value_is_defined_for_singletons() {
        assert_eq!(SymbolSet::singleton("7").value(), Some(&"7".to_string()));
        assert_eq!(SymbolSet::new().value(), None);
    }

    #[test]
    fn displays_sorted() {
        assert_eq!(set(&["3", "1", "2"]).to_string(), "(1 2 3)");
    }

    #[test]
    fn lists_keep_repeats() {
        let list: SymbolList = ["2", "2", "5"].iter().map(|s| s.to_string()).collect();
        assert_eq!(list.len(), 3);
        assert_eq!(list.as_set(), set(&["2", "5"]));
        assert_eq!(list.to_string(), "(2 2 5)");
    }
}
