use serde::{Deserialize, Serialize};

/// Whitespace plus the punctuation the tokenizer splits on by default.
pub const CANONICAL_SEPARATORS: &str = " \t\r\n,.;:-/*^&=()[]|_{}+~<>'\"!?";

/// Set of separator characters. ASCII members live in a bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SeparatorSet {
    ascii: u128,
    other: Vec<char>,
}

impl SeparatorSet {
    /// Set containing exactly `chars`.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut set = Self {
            ascii: 0,
            other: Vec::new(),
        };
        for c in chars {
            set.insert(c);
        }
        set
    }

    /// [`CANONICAL_SEPARATORS`].
    pub fn canonical() -> Self {
        Self::new(CANONICAL_SEPARATORS.chars())
    }

    /// Add one separator.
    pub fn insert(&mut self, c: char) {
        if c.is_ascii() {
            self.ascii |= 1u128 << (c as u32);
        } else if !self.other.contains(&c) {
            self.other.push(c);
        }
    }

    /// True if `c` separates tokens.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        if c.is_ascii() {
            self.ascii & (1u128 << (c as u32)) != 0
        } else {
            self.other.contains(&c)
        }
    }

    /// Members in ascending order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        (0u8..128)
            .filter(move |b| self.ascii & (1u128 << b) != 0)
            .map(char::from)
            .chain(self.other.iter().copied())
    }
}

impl Default for SeparatorSet {
    fn default() -> Self {
        Self::canonical()
    }
}

impl From<String> for SeparatorSet {
    fn from(chars: String) -> Self {
        Self::new(chars.chars())
    }
}

impl From<&str> for SeparatorSet {
    fn from(chars: &str) -> Self {
        Self::new(chars.chars())
    }
}

impl From<SeparatorSet> for String {
    fn from(set: SeparatorSet) -> Self {
        set.chars().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_members() {
        let set = SeparatorSet::canonical();
        for c in " ,.;:-/*^&=()[]|_{}+~<>\n'".chars() {
            assert!(set.contains(c), "{c:?} should separate");
        }
        for c in ['a', 'Z', '0', 'é'] {
            assert!(!set.contains(c));
        }
    }

    #[test]
    fn non_ascii_members() {
        let set = SeparatorSet::from("«» ");
        assert!(set.contains('«'));
        assert!(set.contains(' '));
        assert!(!set.contains('x'));
        let s: String = set.into();
        assert_eq!(s, " «»");
    }
}
