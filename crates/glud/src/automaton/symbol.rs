//! Alphabet symbols as seen by the transition relation.

/// Position of a character in the automaton's alphabet. Transitions are keyed
/// by `(StateId, SymbolId)`.
pub type SymbolId = u32;

/// Key used for silent moves. No alphabet is large enough to reach it.
pub const EPSILON: SymbolId = u32::MAX;

/// How ε is written when an automaton is rendered.
pub const EPSILON_GLYPH: char = 'ε';

/// Whether a transition key is a silent move.
#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon_key_is_outside_alphabet_range() {
        assert!(is_epsilon(EPSILON));
        assert!(!is_epsilon(0));
        assert!(!is_epsilon(u16::MAX as SymbolId));
    }
}
