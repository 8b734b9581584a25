use nalgebra::{Point3, Vector3};

/// Link index marking an unused [`CollisionInfo`] slot.
pub const ABSENT_LINK: i32 = -1;

/// The closest points between two links that are within the activation distance.
///
/// Everything is expressed in the base frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Index of the first link, or [`ABSENT_LINK`].
    pub link1_idx: i32,
    /// Index of the second link, or [`ABSENT_LINK`].
    pub link2_idx: i32,
    /// Closest point on the first link.
    pub p1: Point3<f64>,
    /// Closest point on the second link.
    pub p2: Point3<f64>,
    /// Unit normal at `p1`, pointing towards the second link.
    pub n1: Vector3<f64>,
    /// Unit normal at `p2`, pointing towards the first link.
    pub n2: Vector3<f64>,
    /// Signed distance, negative when penetrating.
    pub dist: f64,
}

impl CollisionInfo {
    #[must_use]
    pub fn absent() -> Self {
        Self {
            link1_idx: ABSENT_LINK,
            link2_idx: ABSENT_LINK,
            p1: Point3::origin(),
            p2: Point3::origin(),
            n1: Vector3::zeros(),
            n2: Vector3::zeros(),
            dist: 0.0,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.link1_idx == ABSENT_LINK
    }
}

impl Default for CollisionInfo {
    fn default() -> Self {
        Self::absent()
    }
}

/// Fixed-capacity list of [`CollisionInfo`].
///
/// Valid entries always precede the absent ones, so a scan can stop at the first absent slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPairs<const NPAIRS: usize>([CollisionInfo; NPAIRS]);

impl<const NPAIRS: usize> CollisionPairs<NPAIRS> {
    /// Resets every slot to absent.
    pub fn clear(&mut self) {
        self.0.fill(CollisionInfo::absent());
    }

    /// The leading valid entries.
    pub fn iter_valid(&self) -> impl Iterator<Item = &CollisionInfo> {
        self.0.iter().take_while(|info| !info.is_absent())
    }

    #[must_use]
    pub fn valid_len(&self) -> usize {
        self.iter_valid().count()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CollisionInfo] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [CollisionInfo] {
        &mut self.0
    }
}

impl<const NPAIRS: usize> Default for CollisionPairs<NPAIRS> {
    fn default() -> Self {
        Self([CollisionInfo::absent(); NPAIRS])
    }
}

impl<const NPAIRS: usize> std::ops::Index<usize> for CollisionPairs<NPAIRS> {
    type Output = CollisionInfo;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const NPAIRS: usize> std::ops::IndexMut<usize> for CollisionPairs<NPAIRS> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(link1_idx: i32, link2_idx: i32) -> CollisionInfo {
        CollisionInfo {
            link1_idx,
            link2_idx,
            ..CollisionInfo::absent()
        }
    }

    #[test]
    fn starts_empty() {
        let pairs = CollisionPairs::<4>::default();
        assert_eq!(pairs.valid_len(), 0);
        assert!(pairs.as_slice().iter().all(CollisionInfo::is_absent));
    }

    #[test]
    fn scan_stops_at_first_absent_slot() {
        let mut pairs = CollisionPairs::<4>::default();
        pairs[0] = contact(0, 1);
        pairs[1] = contact(0, 2);
        // never reached, it sits behind an absent slot
        pairs[3] = contact(1, 2);

        assert_eq!(pairs.valid_len(), 2);
        assert_eq!(pairs[1].link2_idx, 2);

        pairs.clear();
        assert_eq!(pairs.valid_len(), 0);
        assert!(pairs[3].is_absent());
    }
}
