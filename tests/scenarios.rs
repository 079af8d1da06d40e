//! End-to-end scenarios over the public surface: diagram construction,
//! offsets of open and closed figures, tripoints and extrusion.

use approx::assert_relative_eq;
use geo_types::{coord, line_string, Coord, Line, LineString};
use num_traits::float::Float;
use voronoi_offset::{extrude, offset, offset_many, tripoint};
use voronoi_offset::{Branch, GeometryError, Separator, Site, VoronoiDiagram};

fn magnitude(c: Coord<f64>) -> f64 {
    (c.x * c.x + c.y * c.y).sqrt()
}

fn seg_distance(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    let u = b - a;
    let t = ((p - a).x * u.x + (p - a).y * u.y) / (u.x * u.x + u.y * u.y);
    let t = t.clamp(0.0, 1.0);
    magnitude(p - (a + u * t))
}

fn distance_to_figure(points: &[Coord<f64>], segments: &[[usize; 2]], p: Coord<f64>) -> f64 {
    segments
        .iter()
        .map(|s| seg_distance(points[s[0]], points[s[1]], p))
        .fold(f64::INFINITY, f64::min)
}

fn shoelace(ls: &LineString<f64>) -> f64 {
    ls.0.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

/// Two points, zero segments: two real cells next to the three fake ones,
/// separated by the perpendicular bisector with its perigee at the midpoint,
/// five units from either site.
#[test]
fn two_points_zero_segments() {
    let _ = pretty_env_logger::try_init();
    let points = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }];
    let diagram = VoronoiDiagram::new(&points, &[]).unwrap();
    diagram.check_consistency();
    let (_, _, cells) = diagram.census();
    assert_eq!(cells, 5);

    let sep = Separator::of_points(points[0], points[1]);
    assert_relative_eq!(sep.rmin(), 5.0);
    let mid = sep.evaluate(Branch::Plus, 5.0);
    assert_relative_eq!(mid.x, 5.0);
    assert_relative_eq!(mid.y, 0.0, epsilon = 1e-12);
}

/// An open polyline offset at radius zero returns one open chain whose
/// points are the input points, in order.
#[test]
fn open_polyline_at_zero_radius() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 0.0 },
        coord! { x: 5.0, y: 1.0 },
        coord! { x: 5.0, y: 9.0 },
    ];
    let segments = vec![[0, 1], [1, 2], [2, 3]];
    let chains = offset(&points, &segments, 0.0, 1e-3).unwrap();
    assert_eq!(chains.len(), 1);
    let chain = &chains[0];
    assert!(!chain.is_closed());
    assert_eq!(chain.0.len(), 4);
    let mut got = chain.0.clone();
    if magnitude(got[0] - points[0]) > 1e-9 {
        got.reverse();
    }
    for (g, w) in got.iter().zip(&points) {
        assert_relative_eq!(g.x, w.x, epsilon = 1e-9);
        assert_relative_eq!(g.y, w.y, epsilon = 1e-9);
    }
}

/// The closed unit square at radius one half: one closed chain, every vertex
/// half a unit from the square, corners rounded.
#[test]
fn closed_unit_square() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 1.0, y: 0.0 },
        coord! { x: 1.0, y: 1.0 },
        coord! { x: 0.0, y: 1.0 },
    ];
    let segments = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
    let atol = 1e-2;
    let rings = offset(&points, &segments, 0.5, atol).unwrap();
    assert_eq!(rings.len(), 1);
    let ring = &rings[0];
    assert!(ring.is_closed());
    for p in &ring.0 {
        assert_relative_eq!(
            distance_to_figure(&points, &segments, *p),
            0.5,
            max_relative = 1e-6
        );
    }
    // four rounded corners sampled beyond the bare octagon
    assert!(ring.0.len() >= 12);
    let area = shoelace(ring);
    let expected = 4.0 - (4.0 - std::f64::consts::PI) * 0.25;
    assert_relative_eq!(area, expected, max_relative = 1e-2);
}

/// The tripoint of an equilateral triangle: circumradius `√3⁄3`, all three
/// branches positive.
#[test]
fn tripoint_of_equilateral_triangle() {
    let _ = pretty_env_logger::try_init();
    let tp = tripoint(
        Site::Point(coord! { x: 0.0, y: 0.0 }),
        Site::Point(coord! { x: 1.0, y: 0.0 }),
        Site::Point(coord! { x: 0.5, y: 3f64.sqrt() / 2.0 }),
    );
    assert!(!tp.is_bad());
    assert_relative_eq!(tp.r, 3f64.sqrt() / 3.0, max_relative = 1e-12);
    assert_eq!(tp.branches, [Branch::Plus; 3]);
}

/// Crossing segments are rejected during construction.
#[test]
fn crossing_segments_rejected() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 1.0, y: 1.0 },
        coord! { x: 1.0, y: 0.0 },
        coord! { x: 0.0, y: 1.0 },
    ];
    let err = VoronoiDiagram::new(&points, &[[0, 1], [2, 3]]).unwrap_err();
    assert_eq!(err, GeometryError::CrossingSegments);
}

/// A point site in a segment's interior is rejected by the separator layer.
#[test]
fn point_in_segment_rejected() {
    let _ = pretty_env_logger::try_init();
    let seg = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 });
    let err = Separator::of_segment_point(seg, coord! { x: 4.0, y: 0.0 }).unwrap_err();
    assert_eq!(err, GeometryError::PointInSegment);
}

/// Offsets at several radii share the diagram and grow monotonically.
#[test]
fn offset_area_monotone_in_radius() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 4.0, y: 0.0 },
        coord! { x: 4.0, y: 2.0 },
        coord! { x: 0.0, y: 2.0 },
    ];
    let segments = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
    let radii = [0.1, 0.4, 0.9, 1.7];
    let all = offset_many(&points, &segments, &radii, 1e-2).unwrap();
    let mut prev = 0.0;
    for rings in &all {
        assert_eq!(rings.len(), 1);
        let area = shoelace(&rings[0]);
        assert!(area > prev);
        prev = area;
    }
}

/// Small offsets invert: growing then shrinking by the same radius restores
/// the figure within tolerance.
#[test]
fn offset_round_trip() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 3.0, y: 0.0 },
        coord! { x: 3.0, y: 2.0 },
        coord! { x: 0.0, y: 2.0 },
    ];
    let segments = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
    let grown = offset(&points, &segments, 0.4, 1e-4).unwrap();
    assert_eq!(grown.len(), 1);
    let ring = &grown[0];
    let n = ring.0.len() - 1;
    let gp: Vec<Coord<f64>> = ring.0[..n].to_vec();
    let gs: Vec<[usize; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();
    let back = offset(&gp, &gs, -0.4, 1e-4).unwrap();
    assert_eq!(back.len(), 1);
    for p in &back[0].0 {
        assert!(distance_to_figure(&points, &segments, *p) < 5e-3);
    }
}

/// Extrude a diamond profile along an L-shaped open trajectory: one mesh,
/// at least as many vertices as the chains it lofts, and a surface area in
/// the range the profile perimeter times the trajectory length predicts.
#[test]
fn extrude_profile_along_trajectory() {
    let _ = pretty_env_logger::try_init();
    let points = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 0.0 },
        coord! { x: 10.0, y: 10.0 },
    ];
    let segments = vec![[0, 1], [1, 2]];
    let profile = vec![line_string![
        (x: -0.5, y: -1.0),
        (x: 1.0, y: -0.5),
        (x: 0.5, y: 1.0),
        (x: -1.0, y: 0.5),
    ]];
    let atol = 2e-2;
    let meshes = extrude(&points, &segments, &profile, atol).unwrap();
    assert_eq!(meshes.len(), 1);
    let mesh = &meshes[0];
    assert!(!mesh.triangles.is_empty());
    for p in &mesh.positions {
        assert!(p.iter().all(|c| c.is_finite()));
    }
    for &r in &[0.5, 1.0] {
        let chains = offset(&points, &segments, r, atol).unwrap();
        let chain_len: usize = chains.iter().map(|c| c.0.len()).sum();
        assert!(mesh.positions.len() >= chain_len);
    }
    // perimeter ≈ 6.32, trajectory length 20
    let area = mesh.area();
    assert!(area > 40.0 && area < 350.0, "area {area} out of range");
}
