use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Uniform random selection backed by a small, seedable generator.
#[derive(Clone, Debug)]
pub struct RandomGemSource {
    rng: SmallRng,
}

impl RandomGemSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl GemSource for RandomGemSource {
    fn pick(&mut self, candidates: &[GemKind]) -> GemKind {
        match candidates.choose(&mut self.rng) {
            Some(&kind) => kind,
            None => {
                log::warn!("Asked to pick from an empty kind set, leaving cell empty");
                GemKind::Empty
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let kinds: Vec<_> = GemKind::ordinary_kinds(6).collect();
        let mut a = RandomGemSource::new(42);
        let mut b = RandomGemSource::new(42);

        let first: Vec<_> = (0..32).map(|_| a.pick(&kinds)).collect();
        let second: Vec<_> = (0..32).map(|_| b.pick(&kinds)).collect();

        assert_eq!(first, second);
        assert!(first.iter().all(|kind| kinds.contains(kind)));
    }

    #[test]
    fn covers_every_candidate() {
        let kinds: Vec<_> = GemKind::ordinary_kinds(3).collect();
        let mut source = RandomGemSource::new(1);
        let picked: Vec<_> = (0..300).map(|_| source.pick(&kinds)).collect();

        for kind in &kinds {
            assert!(picked.contains(kind), "{kind:?} never picked");
        }
    }

    #[test]
    fn validates_kind_sets() {
        assert_eq!(validate_kinds(&[]), Err(GameError::EmptyKindSet));
        assert_eq!(
            validate_kinds(&[GemKind::Ordinary(0), GemKind::Wild]),
            Err(GameError::InvalidKind)
        );
        assert_eq!(validate_kinds(&[GemKind::Ordinary(0)]), Ok(()));
    }
}
