use crate::attractor::AttractorId;

/// A threshold ergodic set: attractors that are mutually reachable through
/// above-threshold transitions and have no above-threshold transition leaving
/// the set.
///
/// Within one tree level, TES are disjoint and partition the attractors that
/// survived the level's closure filter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tes {
    attractors: Vec<AttractorId>,
}

impl Tes {
    /// Create a set from the given attractors (stored sorted).
    pub(crate) fn new(mut attractors: Vec<AttractorId>) -> Tes {
        attractors.sort();
        Tes { attractors }
    }

    /// The member attractors in ascending id order.
    pub fn attractors(&self) -> &[AttractorId] {
        &self.attractors
    }

    /// The number of member attractors.
    pub fn len(&self) -> usize {
        self.attractors.len()
    }

    /// True if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.attractors.is_empty()
    }

    /// True if the given attractor belongs to this set.
    pub fn contains(&self, id: AttractorId) -> bool {
        self.attractors.binary_search(&id).is_ok()
    }
}
