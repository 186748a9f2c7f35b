use relval_core::IdentifierSet;

///
/// The ids not yet explained during a reconciliation run.
///
/// Only ever shrinks: each attribution step subtracts what it matched.
///
#[derive(Debug, Clone)]
pub struct ResidualTracker {
    residual: IdentifierSet,
    sizes: Vec<usize>,
}

impl ResidualTracker {
    pub fn new(initial: IdentifierSet) -> Self {
        let sizes = vec![initial.len()];
        ResidualTracker {
            residual: initial,
            sizes,
        }
    }

    pub fn subtract(&mut self, matched: &IdentifierSet) {
        self.residual = self.residual.difference(matched);
        self.sizes.push(self.residual.len());
    }

    pub fn current(&self) -> &IdentifierSet {
        &self.residual
    }

    /// Residual size at creation and after every subtraction.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn into_inner(self) -> IdentifierSet {
        self.residual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_subtractions_shrink_monotonically() {
        let mut tracker = ResidualTracker::new((1..=10u64).collect());

        tracker.subtract(&IdentifierSet::from_unsorted(vec![1, 2, 3]));
        // ids outside the residual are ignored
        tracker.subtract(&IdentifierSet::from_unsorted(vec![3, 42]));
        tracker.subtract(&IdentifierSet::new());
        tracker.subtract(&(4..=10u64).collect());

        assert_eq!(tracker.sizes(), &[10, 7, 7, 7, 0]);
        assert!(tracker.sizes().windows(2).all(|w| w[1] <= w[0]));
        assert!(tracker.current().is_empty());
    }
}
