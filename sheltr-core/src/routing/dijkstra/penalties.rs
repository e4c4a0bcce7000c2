use hashbrown::HashMap;
use petgraph::graph::EdgeIndex;

/// Per-query overlay of weight multipliers.
///
/// Lives only for the duration of one diversified search; the graph itself
/// is never touched, so dropping the overlay restores the canonical weights.
#[derive(Debug, Default)]
pub(crate) struct EdgePenalties {
    multipliers: HashMap<EdgeIndex, f64>,
}

impl EdgePenalties {
    pub(crate) fn multiplier(&self, edge: EdgeIndex) -> f64 {
        self.multipliers.get(&edge).copied().unwrap_or(1.0)
    }

    /// Multiplies the current penalty of each edge by `factor`
    pub(crate) fn penalize(&mut self, edges: &[EdgeIndex], factor: f64) {
        for &edge in edges {
            *self.multipliers.entry(edge).or_insert(1.0) *= factor;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.multipliers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalties_compound() {
        let mut penalties = EdgePenalties::default();
        let edge = EdgeIndex::new(3);
        assert_eq!(penalties.multiplier(edge), 1.0);

        penalties.penalize(&[edge], 2.0);
        penalties.penalize(&[edge, EdgeIndex::new(4)], 2.0);
        assert_eq!(penalties.multiplier(edge), 4.0);
        assert_eq!(penalties.multiplier(EdgeIndex::new(4)), 2.0);
        assert_eq!(penalties.len(), 2);
    }
}
