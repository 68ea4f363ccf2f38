use crate::*;
pub use random::*;

mod random;

/// Source of gem kinds for freshly filled cells.
pub trait GemSource {
    /// Picks one kind uniformly from `candidates`, which is never empty.
    fn pick(&mut self, candidates: &[GemKind]) -> GemKind;
}

impl<S: GemSource + ?Sized> GemSource for &mut S {
    fn pick(&mut self, candidates: &[GemKind]) -> GemKind {
        (**self).pick(candidates)
    }
}

/// Checks that a kind set can be used to fill a board.
pub fn validate_kinds(kinds: &[GemKind]) -> Result<()> {
    if kinds.is_empty() {
        return Err(GameError::EmptyKindSet);
    }
    if !kinds.iter().all(|kind| kind.is_ordinary()) {
        return Err(GameError::InvalidKind);
    }
    Ok(())
}
