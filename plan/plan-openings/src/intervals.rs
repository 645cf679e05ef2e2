//! Solid-interval computation.
//!
//! A wall face with openings decomposes into the intervals of wall that
//! remain solid. The kernel meshes these directly, and skirting boards run
//! along them.

use plan_types::Opening;

/// A solid interval along a segment axis, in meters from the segment start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Near edge.
    pub start: f64,
    /// Far edge. Always > `start`.
    pub end: f64,
}

impl Interval {
    /// Interval length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Compute the solid intervals of a wall once openings are subtracted.
///
/// Only openings whose footprint intersects `0..wall_length` contribute;
/// footprints are clamped to the wall, sorted, and merged (overlapping or
/// abutting holes coalesce) before taking the complement. Orphaned openings
/// are skipped by callers that pass [`WallSegment::active_openings`]
/// output.
///
/// [`WallSegment::active_openings`]: plan_types::WallSegment::active_openings
#[must_use]
pub fn solid_intervals<'a>(
    wall_length: f64,
    openings: impl IntoIterator<Item = &'a Opening>,
) -> Vec<Interval> {
    // Collect and clamp holes.
    let mut holes: Vec<(f64, f64)> = openings
        .into_iter()
        .map(|o| {
            let ext = o.extent();
            (ext.start.max(0.0), ext.end.min(wall_length))
        })
        .filter(|(start, end)| end > start)
        .collect();

    holes.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Merge overlapping or abutting holes.
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(holes.len());
    for hole in holes {
        match merged.last_mut() {
            Some(last) if hole.0 <= last.1 => last.1 = last.1.max(hole.1),
            _ => merged.push(hole),
        }
    }

    // Complement.
    let mut solids = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0.0;
    for (start, end) in merged {
        if start > cursor {
            solids.push(Interval { start: cursor, end: start });
        }
        cursor = cursor.max(end);
    }
    if cursor < wall_length {
        solids.push(Interval {
            start: cursor,
            end: wall_length,
        });
    }
    solids
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::CatalogId;

    fn opening(offset: f64, width: f64) -> Opening {
        Opening::new(CatalogId::new("x"), offset, 0.0, width, 2.0)
    }

    #[test]
    fn no_openings_is_one_solid() {
        let solids = solid_intervals(5.0, []);
        assert_eq!(solids.len(), 1);
        assert!((solids[0].length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn single_opening_splits_in_two() {
        let door = opening(2.0, 1.0);
        let solids = solid_intervals(5.0, [&door]);
        assert_eq!(solids.len(), 2);
        assert!((solids[0].end - 2.0).abs() < 1e-12);
        assert!((solids[1].start - 3.0).abs() < 1e-12);
    }

    #[test]
    fn overlapping_holes_merge() {
        let a = opening(1.0, 1.0);
        let b = opening(1.5, 1.0);
        let solids = solid_intervals(5.0, [&a, &b]);
        assert_eq!(solids.len(), 2);
        assert!((solids[0].end - 1.0).abs() < 1e-12);
        assert!((solids[1].start - 2.5).abs() < 1e-12);
    }

    #[test]
    fn abutting_holes_merge() {
        let a = opening(1.0, 1.0);
        let b = opening(2.0, 1.0);
        let solids = solid_intervals(5.0, [&a, &b]);
        assert_eq!(solids.len(), 2);
        assert!((solids[1].start - 3.0).abs() < 1e-12);
    }

    #[test]
    fn hole_at_wall_start_drops_leading_solid() {
        let door = opening(0.0, 1.0);
        let solids = solid_intervals(5.0, [&door]);
        assert_eq!(solids.len(), 1);
        assert!((solids[0].start - 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_hole_is_clamped() {
        let over = opening(4.5, 2.0);
        let solids = solid_intervals(5.0, [&over]);
        assert_eq!(solids.len(), 1);
        assert!((solids[0].end - 4.5).abs() < 1e-12);
    }

    #[test]
    fn full_width_hole_leaves_nothing() {
        let all = opening(0.0, 5.0);
        assert!(solid_intervals(5.0, [&all]).is_empty());
    }
}
