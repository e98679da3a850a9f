//! Spatial queries shared by steering, collision resolution and colonies.
//!
//! Entity counts stay in the tens, so the primitives are brute-force scans.
//! Range queries go through [`ProximityIndex`], which can be backed by a
//! linear scan or a KD-tree without changing the call sites.

use geo::{Distance, Euclidean, Point};
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::locatable::Locatable;

/// Type alias for 2D spatial KD-tree used for neighbor queries.
pub type Tree2D = KdTree<f32, usize, Vec<f32>>;

/// Euclidean distance between two points.
pub fn point_distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    Euclidean.distance(Point::new(a[0], a[1]), Point::new(b[0], b[1]))
}

/// Euclidean distance between the centers of two entities.
pub fn distance(a: &impl Locatable, b: &impl Locatable) -> f32 {
    point_distance(a.pos(), b.pos())
}

/// `true` iff the two circles overlap.
pub fn collides(a: &impl Locatable, b: &impl Locatable) -> bool {
    distance(a, b) < a.radius() + b.radius()
}

/// Linear scan for the candidate closest to `origin` among those accepted by
/// `predicate`.
///
/// # Returns
///
/// The key of the winner and its distance, or `None` if nothing qualifies.
pub fn find_nearest<'a, K, T, I, P>(
    origin: &Array1<f32>,
    candidates: I,
    mut predicate: P,
) -> Option<(K, f32)>
where
    T: Locatable + 'a,
    I: IntoIterator<Item = (K, &'a T)>,
    P: FnMut(&T) -> bool,
{
    let mut best: Option<(K, f32)> = None;
    for (key, candidate) in candidates {
        if !predicate(candidate) {
            continue;
        }
        let d = point_distance(origin, candidate.pos());
        if best.as_ref().is_none_or(|(_, best_d)| d < *best_d) {
            best = Some((key, d));
        }
    }
    best
}

/// Unit vector pointing from `from` to `to`, or `None` if they coincide.
pub fn direction_to(from: &Array1<f32>, to: &Array1<f32>) -> Option<Array1<f32>> {
    let delta = to - from;
    let len = delta.mapv(|x| x.powi(2)).sum().sqrt();
    if len > f32::EPSILON && len.is_finite() {
        Some(delta / len)
    } else {
        None
    }
}

/// Rescales `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize_mut(v: &mut Array1<f32>) {
    let len = v.mapv(|x| x.powi(2)).sum().sqrt();
    if len > f32::EPSILON && len.is_finite() {
        *v /= len;
    }
}

/// Clamps a circle's center into `[radius, dimension - radius]` on both axes
/// without touching its heading. Used after a circle grows in place.
pub fn clamp_in_box(pos: &mut Array1<f32>, radius: f32, box_width: f32, box_height: f32) {
    for (axis, extent) in [(0, box_width), (1, box_height)] {
        let lo = radius.min(extent / 2.0);
        let hi = (extent - radius).max(extent / 2.0);
        pos[axis] = pos[axis].clamp(lo, hi);
    }
}

/// Keeps a circle inside the dish, flipping the heading on contact.
///
/// Position is clamped to `[radius, dimension - radius]` on both axes and the
/// corresponding component of `dir` is mirrored. Circles wider than the dish
/// are pinned to its center line.
///
/// # Returns
///
/// `true` if a wall was touched.
pub fn reflect_in_box(
    pos: &mut Array1<f32>,
    dir: &mut Array1<f32>,
    radius: f32,
    box_width: f32,
    box_height: f32,
) -> bool {
    let mut touched = false;
    for (axis, extent) in [(0, box_width), (1, box_height)] {
        let lo = radius.min(extent / 2.0);
        let hi = (extent - radius).max(extent / 2.0);
        if pos[axis] < lo {
            pos[axis] = lo;
            dir[axis] = -dir[axis];
            touched = true;
        } else if pos[axis] > hi {
            pos[axis] = hi;
            dir[axis] = -dir[axis];
            touched = true;
        }
    }
    touched
}

/// Backend used by [`ProximityIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpatialBackend {
    /// Brute-force scan, best at a few dozen entities.
    #[default]
    Linear,
    /// KD-tree built once per query batch.
    KdTree,
}

/// Range index over a snapshot of entity positions.
pub enum ProximityIndex<K> {
    /// Positions scanned one by one.
    Linear(Vec<(K, Array1<f32>)>),
    /// Positions stored in a KD-tree; tree payloads index into `keys`.
    KdTree {
        /// The tree.
        tree: Tree2D,
        /// Entity key per tree payload.
        keys: Vec<K>,
    },
}

impl<K: Copy> ProximityIndex<K> {
    /// Builds an index from `(key, entity)` pairs.
    ///
    /// # Returns
    ///
    /// The index, or the KD-tree error if a position could not be inserted.
    pub fn build<'a, T, I>(backend: SpatialBackend, items: I) -> Result<Self, KdTreeError>
    where
        T: Locatable + 'a,
        I: IntoIterator<Item = (K, &'a T)>,
    {
        match backend {
            SpatialBackend::Linear => Ok(Self::Linear(
                items
                    .into_iter()
                    .map(|(key, item)| (key, item.pos().clone()))
                    .collect(),
            )),
            SpatialBackend::KdTree => {
                let mut tree = KdTree::new(2);
                let mut keys = Vec::new();
                for (key, item) in items {
                    tree.add(item.pos().to_vec(), keys.len())?;
                    keys.push(key);
                }
                Ok(Self::KdTree { tree, keys })
            }
        }
    }

    /// Entries whose center lies within `radius` of `pos`, closest first.
    ///
    /// # Returns
    ///
    /// Vector of `(distance, key)` pairs.
    pub fn within(&self, pos: &Array1<f32>, radius: f32) -> Vec<(f32, K)> {
        let mut found: Vec<(f32, K)> = match self {
            Self::Linear(entries) => entries
                .iter()
                .map(|(key, p)| (point_distance(pos, p), *key))
                .filter(|(d, _)| *d <= radius)
                .collect(),
            Self::KdTree { tree, keys } => tree
                .within(&pos.to_vec(), radius.powi(2), &squared_euclidean)
                .unwrap_or_default()
                .into_iter()
                .map(|(d2, &idx)| (d2.sqrt(), keys[idx]))
                .collect(),
        };
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Linear(entries) => entries.len(),
            Self::KdTree { keys, .. } => keys.len(),
        }
    }

    /// `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dot {
        pos: Array1<f32>,
        radius: f32,
    }

    impl Locatable for Dot {
        fn pos(&self) -> &Array1<f32> {
            &self.pos
        }
        fn pos_mut(&mut self) -> &mut Array1<f32> {
            &mut self.pos
        }
        fn radius(&self) -> f32 {
            self.radius
        }
        fn is_alive(&self) -> bool {
            true
        }
        fn deactivate(&mut self) {}
    }

    fn dot(x: f32, y: f32, radius: f32) -> Dot {
        Dot {
            pos: Array1::from_vec(vec![x, y]),
            radius,
        }
    }

    #[test]
    fn collision_uses_strict_radius_sum() {
        let cell = dot(300.0, 200.0, 10.0);
        assert!(collides(&cell, &dot(305.0, 200.0, 3.0)));
        assert!(!collides(&cell, &dot(313.0, 200.0, 3.0)));
        assert!((distance(&cell, &dot(303.0, 204.0, 1.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn find_nearest_respects_predicate() {
        let origin = Array1::from_vec(vec![0.0, 0.0]);
        let dots = [dot(1.0, 0.0, 1.0), dot(5.0, 0.0, 3.0), dot(9.0, 0.0, 3.0)];

        let nearest = find_nearest(&origin, dots.iter().enumerate(), |_| true);
        assert_eq!(nearest.map(|(k, _)| k), Some(0));

        let big = find_nearest(&origin, dots.iter().enumerate(), |d| d.radius > 2.0);
        assert_eq!(big.map(|(k, _)| k), Some(1));

        let none = find_nearest(&origin, dots.iter().enumerate(), |d| d.radius > 5.0);
        assert!(none.is_none());
    }

    #[test]
    fn reflection_clamps_and_flips() {
        let mut pos = Array1::from_vec(vec![-4.0, 50.0]);
        let mut dir = Array1::from_vec(vec![-1.0, 0.0]);
        assert!(reflect_in_box(&mut pos, &mut dir, 5.0, 100.0, 100.0));
        assert_eq!(pos[0], 5.0);
        assert_eq!(dir[0], 1.0);

        let mut pos = Array1::from_vec(vec![50.0, 99.0]);
        let mut dir = Array1::from_vec(vec![0.0, 1.0]);
        assert!(reflect_in_box(&mut pos, &mut dir, 5.0, 100.0, 100.0));
        assert_eq!(pos[1], 95.0);
        assert_eq!(dir[1], -1.0);
    }

    #[test]
    fn backends_agree_on_range_queries() {
        let dots = [
            dot(0.0, 0.0, 1.0),
            dot(30.0, 40.0, 1.0),
            dot(100.0, 0.0, 1.0),
            dot(200.0, 200.0, 1.0),
        ];
        let origin = Array1::from_vec(vec![0.0, 0.0]);

        let linear = ProximityIndex::build(SpatialBackend::Linear, dots.iter().enumerate()).unwrap();
        let kd = ProximityIndex::build(SpatialBackend::KdTree, dots.iter().enumerate()).unwrap();

        let a: Vec<usize> = linear.within(&origin, 60.0).into_iter().map(|(_, k)| k).collect();
        let b: Vec<usize> = kd.within(&origin, 60.0).into_iter().map(|(_, k)| k).collect();
        assert_eq!(a, vec![0, 1]);
        assert_eq!(a, b);
        assert_eq!(kd.len(), 4);
    }
}
