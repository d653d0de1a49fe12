use glam::Vec3;

/// Axis-aligned bounding box in model space.
///
/// Invariant: once at least one point has been inflated into the box,
/// `min.x <= max.x`, `min.y <= max.y` and `min.z <= max.z`. A box that has
/// never seen a point is the degenerate box at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    /// Create a box from two corners. Components are sorted so that
    /// min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A zero-sized box located at `point`.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box so that it contains `point`.
    pub fn inflate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, ordered with x varying fastest, then y, then z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (mn, mx) = (self.min, self.max);
        [
            Vec3::new(mn.x, mn.y, mn.z),
            Vec3::new(mx.x, mn.y, mn.z),
            Vec3::new(mn.x, mx.y, mn.z),
            Vec3::new(mx.x, mx.y, mn.z),
            Vec3::new(mn.x, mn.y, mx.z),
            Vec3::new(mx.x, mn.y, mx.z),
            Vec3::new(mn.x, mx.y, mx.z),
            Vec3::new(mx.x, mx.y, mx.z),
        ]
    }
}

/// Compute the bounds of a set of positions.
///
/// Returns the degenerate origin box for an empty set. Otherwise the box is
/// seeded from the first position, so the origin is not included unless one
/// of the positions is the origin.
pub fn compute_bounds<I>(positions: I) -> Bounds3
where
    I: IntoIterator<Item = Vec3>,
{
    let mut iter = positions.into_iter();
    let Some(first) = iter.next() else {
        return Bounds3::default();
    };
    let mut bounds = Bounds3::from_point(first);
    for p in iter {
        bounds.inflate(p);
    }
    bounds
}
