//! R*-tree over place locations for radius queries.

use geo::Coord;
use helgo_core::{Place, haversine_km};
use rstar::{AABB, RTree, RTreeObject};

/// Kilometres per degree of latitude.
const KM_PER_DEGREE: f64 = 111.32;

#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPlace {
    slot: usize,
    location: Coord<f64>,
}

impl RTreeObject for IndexedPlace {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}

/// Spatial index keyed by each place's position in the catalog slice it was
/// built from.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPlace>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl SpatialIndex {
    /// Index `places` by slot.
    #[must_use]
    pub fn build(places: &[Place]) -> Self {
        let entries = places
            .iter()
            .enumerate()
            .map(|(slot, place)| IndexedPlace {
                slot,
                location: place.location,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Slots of places within `radius_km` of `center`, in slot order.
    #[must_use]
    pub fn within_km(&self, center: Coord<f64>, radius_km: f64) -> Vec<usize> {
        let envelope = bounding_box(center, radius_km);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| haversine_km(center, entry.location) <= radius_km)
            .map(|entry| entry.slot)
            .collect();
        // Sort to keep results deterministic for tie-breaking callers.
        slots.sort_unstable();
        slots
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Report whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "degree offsets are derived from kilometres"
)]
fn bounding_box(center: Coord<f64>, radius_km: f64) -> AABB<[f64; 2]> {
    let d_lat = radius_km / KM_PER_DEGREE;
    let d_lon = radius_km / (KM_PER_DEGREE * center.y.to_radians().cos().abs().max(0.01));
    AABB::from_corners(
        [center.x - d_lon, center.y - d_lat],
        [center.x + d_lon, center.y + d_lat],
    )
}
