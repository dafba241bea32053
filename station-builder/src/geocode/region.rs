//! Rectangular lat/lng regions.

/// An axis-aligned lat/lng box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl BoundingBox {
    pub const fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    /// Whether the point lies inside the box or on its edge.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max && self.lng_min <= lng && lng <= self.lng_max
    }
}

/// Boxes lying well inside Germany.
///
/// One large box covers the centre; smaller regional boxes reach towards
/// the borders to cut down on misses. Anything outside goes to the
/// geolocation resolver.
pub const GERMANY_BOXES: [BoundingBox; 6] = [
    BoundingBox::new(48.0, 54.0, 8.5, 12.0),
    BoundingBox::new(51.0, 54.0, 12.0, 14.0),
    BoundingBox::new(49.5, 52.0, 7.0, 8.5),
    BoundingBox::new(50.0, 51.5, 6.5, 7.0),
    BoundingBox::new(48.0, 49.5, 12.0, 12.5),
    BoundingBox::new(54.0, 54.5, 8.5, 11.5),
];

/// Whether the point falls in one of the static German boxes.
pub fn in_germany_boxes(lat: f64, lng: f64) -> bool {
    GERMANY_BOXES.iter().any(|b| b.contains(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let b = BoundingBox::new(48.0, 54.0, 8.5, 12.0);
        assert!(b.contains(48.0, 8.5));
        assert!(b.contains(54.0, 12.0));
        assert!(b.contains(50.1, 8.66));
        assert!(!b.contains(47.99, 9.0));
        assert!(!b.contains(50.0, 12.01));
    }

    #[test]
    fn germany_boxes() {
        // Frankfurt, Berlin, Cologne
        assert!(in_germany_boxes(50.107149, 8.663785));
        assert!(in_germany_boxes(52.525589, 13.369549));
        assert!(in_germany_boxes(50.943029, 6.958730));
        // Vienna, Paris
        assert!(!in_germany_boxes(48.185, 16.376));
        assert!(!in_germany_boxes(48.880, 2.355));
    }
}
