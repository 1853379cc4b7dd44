use std::fmt;

use super::geometry::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneShape {
    /// Center in percent of the viewport, radius in pixels.
    Circle { center_pct: Vec2, radius_px: f32 },
    /// World-space box. `rotation_y` is only drawn, never used for overlap.
    Box {
        center: Vec3,
        half_extents: Vec3,
        rotation_y: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub label: String,
    pub target: String,
    pub shape: ZoneShape,
}

/// Fixed, ordered zone list. Declaration order is the overlap precedence.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn first_overlapping<F>(&self, mut overlaps: F) -> Option<&Zone>
    where
        F: FnMut(&ZoneShape) -> bool,
    {
        self.zones.iter().find(|zone| overlaps(&zone.shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_zone(id: u32, x: f32) -> Zone {
        Zone {
            id: ZoneId(id),
            label: format!("zone {id}"),
            target: format!("https://example.com/{id}"),
            shape: ZoneShape::Circle {
                center_pct: Vec2::new(x, 50.0),
                radius_px: 40.0,
            },
        }
    }

    #[test]
    fn empty_set_never_matches() {
        let zones = ZoneSet::default();
        assert!(zones.first_overlapping(|_| true).is_none());
    }

    #[test]
    fn first_match_follows_declaration_order() {
        let zones = ZoneSet::new(vec![circle_zone(7, 10.0), circle_zone(3, 20.0)]);

        let hit = zones.first_overlapping(|_| true).expect("hit");
        assert_eq!(hit.id, ZoneId(7));

        let hit = zones
            .first_overlapping(|shape| {
                matches!(shape, ZoneShape::Circle { center_pct, .. } if center_pct.x > 15.0)
            })
            .expect("hit");
        assert_eq!(hit.id, ZoneId(3));
    }

    #[test]
    fn lookup_by_id() {
        let zones = ZoneSet::new(vec![circle_zone(1, 10.0), circle_zone(2, 20.0)]);
        assert_eq!(zones.get(ZoneId(2)).map(|zone| zone.label.as_str()), Some("zone 2"));
        assert!(zones.get(ZoneId(9)).is_none());
        assert_eq!(ZoneId(4).to_string(), "zone#4");
    }
}
