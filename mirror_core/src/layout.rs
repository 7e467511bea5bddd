//! Hexagon tiling of the mirror.
//!
//! Each sector is a 60 degree wedge of a flat-topped hexagon lattice. The
//! wedge is built column by column ("rings") moving away from the mirror
//! center: ring `i` sits `i + 2` columns out and holds `i + 2` segments, and
//! the last two rings are trimmed to 11 and 6 segments to round off the
//! outer edge. The whole wedge is then rotated into its clock position, which
//! maps the lattice onto itself, so the six prime sectors tile without gaps.

use segment_schema::{Position, Sector, SEGMENTS_PER_SECTOR};

use crate::config::GeometryConfig;

/// Segments per ring, innermost ring first.
pub const RING_SIZES: [u8; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 11, 6];

/// Lattice slots skipped at the start of each ring. Only the trimmed outer
/// rings skip slots, which shifts them by half a step onto the mirror axis.
const RING_LATTICE_SKIP: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 4];

/// Columns between the mirror center and the innermost ring.
const FIRST_RING_COLUMN: u8 = 2;

/// Rotation of a sector about the mirror center, in degrees (SVG convention).
///
/// Each letter after `A` is turned a further 60 degrees; `F` lands on -360.
pub fn sector_angle(letter: char) -> f64 {
    -60.0 * ((letter as i64 - 'A' as i64) + 1) as f64
}

/// Vertices of a regular hexagon centered on the origin, vertex `i` at `i * 60` degrees.
pub fn hexagon_vertices(radius: f64) -> [(f64, f64); 6] {
    let mut vertices = [(0.0, 0.0); 6];
    for (i, vertex) in vertices.iter_mut().enumerate() {
        let angle = (i as f64 * 60.0).to_radians();
        *vertex = (radius * angle.cos(), radius * angle.sin());
    }
    vertices
}

/// Horizontal distance between two rings.
pub fn x_increment(segment_radius: f64) -> f64 {
    1.5 * segment_radius
}

/// Half the vertical distance between two segments of one ring.
pub fn y_increment(segment_radius: f64) -> f64 {
    segment_radius * 60f64.to_radians().sin()
}

/// Label of the first segment in `ring`.
pub fn ring_first_label(ring: usize) -> u8 {
    1 + RING_SIZES[..ring].iter().sum::<u8>()
}

/// Ring and slot-within-ring holding a 1-based sector index.
pub fn ring_and_slot(index: u8) -> Option<(usize, u8)> {
    if index == 0 || index > SEGMENTS_PER_SECTOR {
        return None;
    }
    Some(locate(index))
}

fn locate(index: u8) -> (usize, u8) {
    let mut first = 1u8;
    for (ring, &size) in RING_SIZES.iter().enumerate() {
        if index < first + size {
            return (ring, index - first);
        }
        first += size;
    }
    let last = RING_SIZES.len() - 1;
    (last, index.saturating_sub(ring_first_label(last)))
}

/// A segment placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedSegment {
    pub position: Position,
    pub ring: u8,
    pub x: f64,
    pub y: f64,
    /// Rotation applied to the owning sector, in degrees.
    pub angle: f64,
}

/// Rotates `(x, y)` about `(cx, cy)` by `degrees`, clockwise on a y-down canvas.
pub fn rotate_about(x: f64, y: f64, cx: f64, cy: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

fn place(position: Position, geometry: &GeometryConfig) -> PlacedSegment {
    let (ring, slot) = locate(position.index());
    let column = (ring as u8 + FIRST_RING_COLUMN) as f64;
    let x_inc = x_increment(geometry.segment_radius);
    let y_inc = y_increment(geometry.segment_radius);

    let lattice_slot = (RING_LATTICE_SKIP[ring] + slot) as f64;
    let x = geometry.x_origin + column * x_inc;
    let y = geometry.y_origin - column * y_inc + lattice_slot * 2.0 * y_inc;

    let angle = sector_angle(position.sector().letter());
    let (x, y) = rotate_about(x, y, geometry.x_origin, geometry.y_origin, angle);

    PlacedSegment {
        position,
        ring: ring as u8,
        x,
        y,
        angle,
    }
}

/// All segments of one sector in label order (1..=82).
pub fn sector_positions(sector: Sector, geometry: &GeometryConfig) -> Vec<PlacedSegment> {
    sector
        .positions()
        .map(|position| place(position, geometry))
        .collect()
}

/// Canvas placement of a single position.
pub fn position_location(position: Position, geometry: &GeometryConfig) -> PlacedSegment {
    place(position, geometry)
}

/// Segments drawn for one render: the prime sectors, or only the spare sector.
pub fn mirror_layout(geometry: &GeometryConfig, show_spares: bool) -> Vec<PlacedSegment> {
    let sectors: &[Sector] = if show_spares {
        &[Sector::G]
    } else {
        &Sector::PRIME
    };
    sectors
        .iter()
        .flat_map(|&sector| sector_positions(sector, geometry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn geometry() -> GeometryConfig {
        GeometryConfig::default()
    }

    #[test]
    fn sector_angles_step_by_sixty_degrees() {
        let angles: Vec<f64> = "ABCDEF".chars().map(sector_angle).collect();
        assert_eq!(angles, vec![-60.0, -120.0, -180.0, -240.0, -300.0, -360.0]);
        let distinct: HashSet<i64> = angles.iter().map(|a| *a as i64).collect();
        assert_eq!(distinct.len(), 6);
        assert_eq!(sector_angle('G'), -420.0);
    }

    #[test]
    fn hexagon_vertices_lie_on_the_circle() {
        for radius in [0.5, 1.0, 9.0, 10.0, 123.4] {
            let vertices = hexagon_vertices(radius);
            assert_eq!(vertices.len(), 6);
            for (i, (x, y)) in vertices.iter().enumerate() {
                assert!((x.hypot(*y) - radius).abs() < 1e-9);
                let mut angle = y.atan2(*x).to_degrees();
                if angle < -1e-9 {
                    angle += 360.0;
                }
                assert!((angle - i as f64 * 60.0).abs() < 1e-6, "vertex {i} at {angle}");
            }
        }
    }

    #[test]
    fn ring_sizes_and_first_labels() {
        assert_eq!(RING_SIZES.iter().map(|&s| s as u32).sum::<u32>(), 82);
        for ring in 0..10 {
            let i = ring as u32;
            assert_eq!(ring_first_label(ring) as u32, i * (i + 3) / 2 + 1);
        }
        assert_eq!(ring_first_label(10), 66);
        assert_eq!(ring_first_label(11), 77);
        assert_eq!(ring_and_slot(1), Some((0, 0)));
        assert_eq!(ring_and_slot(2), Some((0, 1)));
        assert_eq!(ring_and_slot(66), Some((10, 0)));
        assert_eq!(ring_and_slot(82), Some((11, 5)));
        assert_eq!(ring_and_slot(0), None);
        assert_eq!(ring_and_slot(83), None);
    }

    #[test]
    fn every_sector_labels_one_to_eighty_two_once() {
        for sector in Sector::ALL {
            let placed = sector_positions(sector, &geometry());
            assert_eq!(placed.len(), 82);
            let labels: Vec<u8> = placed.iter().map(|p| p.position.index()).collect();
            assert_eq!(labels, (1..=82).collect::<Vec<u8>>());
            let mut ring_counts = [0u8; 12];
            for segment in &placed {
                assert_eq!(segment.position.sector(), sector);
                ring_counts[segment.ring as usize] += 1;
            }
            assert_eq!(ring_counts, RING_SIZES);
        }
    }

    #[test]
    fn centers_never_overlap_across_the_mirror() {
        let geometry = geometry();
        let placed = mirror_layout(&geometry, false);
        assert_eq!(placed.len(), 492);
        let min_spacing = 3f64.sqrt() * geometry.segment_radius - 1e-6;
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let distance = (a.x - b.x).hypot(a.y - b.y);
                assert!(
                    distance >= min_spacing,
                    "{} and {} are {distance} apart",
                    a.position,
                    b.position
                );
            }
        }
    }

    #[test]
    fn mirror_fits_inside_the_canvas() {
        let geometry = geometry();
        let limit = geometry.diameter / 2.0;
        for segment in mirror_layout(&geometry, false) {
            let reach = (segment.x - geometry.x_origin).hypot(segment.y - geometry.y_origin)
                + geometry.segment_radius;
            assert!(reach <= limit, "{} reaches {reach}", segment.position);
        }
    }

    #[test]
    fn known_positions_land_where_expected() {
        let geometry = geometry();
        let f1 = position_location("F1".parse().unwrap(), &geometry);
        assert!((f1.x - 245.0).abs() < 1e-9);
        assert!((f1.y - (215.0 - 2.0 * y_increment(10.0))).abs() < 1e-9);

        let f82 = position_location("F82".parse().unwrap(), &geometry);
        assert!((f82.x - 410.0).abs() < 1e-9);
        assert!((f82.y - (215.0 + 5.0 * y_increment(10.0))).abs() < 1e-9);

        let a1 = position_location("A1".parse().unwrap(), &geometry);
        let placed = sector_positions(Sector::A, &geometry);
        assert_eq!(placed[0], a1);
        assert_eq!(a1.angle, -60.0);
    }

    #[test]
    fn spare_view_draws_only_sector_g() {
        let placed = mirror_layout(&geometry(), true);
        assert_eq!(placed.len(), 82);
        assert!(placed.iter().all(|p| p.position.is_spare()));
    }
}
