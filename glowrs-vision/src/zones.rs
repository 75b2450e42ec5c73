use crate::detector::Landmark;

/// One cosmetic application area. Left/right variants are independent zones
/// so a short landmark set can drop one side without losing the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Lips,
    LeftCheek,
    RightCheek,
    LeftBrow,
    RightBrow,
    LeftContour,
    RightContour,
    Foundation,
}

/// Selection granularity: both sides of a paired zone share one shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneGroup {
    Lips,
    Cheeks,
    Brows,
    Contour,
    Foundation,
}

impl Zone {
    /// Back-to-front draw order. Later zones layer on top of earlier ones
    /// with their own alpha; the camera passthrough always precedes all of
    /// them.
    pub const DRAW_ORDER: [Zone; 8] = [
        Zone::Lips,
        Zone::LeftCheek,
        Zone::RightCheek,
        Zone::LeftBrow,
        Zone::RightBrow,
        Zone::LeftContour,
        Zone::RightContour,
        Zone::Foundation,
    ];

    pub fn group(&self) -> ZoneGroup {
        match self {
            Zone::Lips => ZoneGroup::Lips,
            Zone::LeftCheek | Zone::RightCheek => ZoneGroup::Cheeks,
            Zone::LeftBrow | Zone::RightBrow => ZoneGroup::Brows,
            Zone::LeftContour | Zone::RightContour => ZoneGroup::Contour,
            Zone::Foundation => ZoneGroup::Foundation,
        }
    }
}

// Landmark index tables of the face-mesh numbering. The lip boundary is the
// first arc followed by the second arc reversed; walking the second arc
// forward would jump corner-to-corner and fold the polygon into a bow-tie.
pub const UPPER_OUTER_LIP: [usize; 11] = [61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291];
pub const LOWER_OUTER_LIP: [usize; 11] = [61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291];

pub const LEFT_BROW: [usize; 6] = [70, 63, 105, 66, 107, 55];
pub const RIGHT_BROW: [usize; 6] = [336, 296, 334, 293, 300, 285];

pub const LEFT_CHEEK: usize = 205;
pub const RIGHT_CHEEK: usize = 425;

// Jawline anchor pairs the contour ellipse is placed between. The rotation
// offsets are empirically tuned values, asymmetric on purpose.
pub const LEFT_CONTOUR_ANCHORS: (usize, usize) = (234, 132);
pub const RIGHT_CONTOUR_ANCHORS: (usize, usize) = (454, 361);
const LEFT_CONTOUR_TILT: f32 = 0.3;
const RIGHT_CONTOUR_TILT: f32 = -0.3;

// Traces a single non-self-intersecting loop around the face as given.
pub const FACE_OUTLINE: [usize; 36] = [
    10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377, 152,
    148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 109,
];

// Ellipse geometry tuned against a 640x480 surface; other sizes scale
// proportionally per axis.
const NATIVE_WIDTH: f32 = 640.0;
const NATIVE_HEIGHT: f32 = 480.0;
const CHEEK_RADII: (f32, f32) = (30.0, 20.0);
const CHEEK_LIFT: f32 = 10.0;
const CONTOUR_RADII: (f32, f32) = (40.0, 20.0);
const CONTOUR_DROP: f32 = 20.0;

/// A pixel-space point on the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Concrete geometry computed for a zone on one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Closed polygon; the boundary is implicitly closed back to the first
    /// vertex.
    Polygon(Vec<Point>),
    /// Ellipse, optionally rotated about its center.
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        angle: f32,
    },
}

/// Derive the zone's shape from this frame's landmarks, denormalizing to
/// surface pixels. Returns `None` whenever a referenced index is missing from
/// the landmark set; a short or partial detection drops the zone, never the
/// frame.
pub fn build_region(zone: Zone, landmarks: &[Landmark], width: u32, height: u32) -> Option<Shape> {
    let w = width as f32;
    let h = height as f32;
    let sx = w / NATIVE_WIDTH;
    let sy = h / NATIVE_HEIGHT;
    let point = |idx: usize| -> Option<Point> {
        let lm = landmarks.get(idx)?;
        Some(Point {
            x: lm.x * w,
            y: lm.y * h,
        })
    };

    match zone {
        Zone::Lips => {
            let boundary: Option<Vec<Point>> = UPPER_OUTER_LIP
                .iter()
                .chain(LOWER_OUTER_LIP.iter().rev())
                .map(|&idx| point(idx))
                .collect();
            Some(Shape::Polygon(boundary?))
        }
        Zone::LeftCheek | Zone::RightCheek => {
            let idx = if zone == Zone::LeftCheek {
                LEFT_CHEEK
            } else {
                RIGHT_CHEEK
            };
            let center = point(idx)?;
            Some(Shape::Ellipse {
                cx: center.x,
                cy: center.y - CHEEK_LIFT * sy,
                rx: CHEEK_RADII.0 * sx,
                ry: CHEEK_RADII.1 * sy,
                angle: 0.0,
            })
        }
        Zone::LeftBrow | Zone::RightBrow => {
            let indices = if zone == Zone::LeftBrow {
                &LEFT_BROW
            } else {
                &RIGHT_BROW
            };
            let boundary: Option<Vec<Point>> = indices.iter().map(|&idx| point(idx)).collect();
            Some(Shape::Polygon(boundary?))
        }
        Zone::LeftContour | Zone::RightContour => {
            let (anchors, tilt) = if zone == Zone::LeftContour {
                (LEFT_CONTOUR_ANCHORS, LEFT_CONTOUR_TILT)
            } else {
                (RIGHT_CONTOUR_ANCHORS, RIGHT_CONTOUR_TILT)
            };
            let a = point(anchors.0)?;
            let b = point(anchors.1)?;
            Some(Shape::Ellipse {
                cx: (a.x + b.x) / 2.0,
                cy: (a.y + b.y) / 2.0 + CONTOUR_DROP * sy,
                rx: CONTOUR_RADII.0 * sx,
                ry: CONTOUR_RADII.1 * sy,
                angle: (b.y - a.y).atan2(b.x - a.x) - tilt,
            })
        }
        Zone::Foundation => {
            let boundary: Option<Vec<Point>> =
                FACE_OUTLINE.iter().map(|&idx| point(idx)).collect();
            Some(Shape::Polygon(boundary?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with(points: &[(usize, f32, f32)]) -> Vec<Landmark> {
        let max = points.iter().map(|&(i, _, _)| i).max().unwrap_or(0);
        let mut landmarks = vec![Landmark::default(); max + 1];
        for &(i, x, y) in points {
            landmarks[i] = Landmark { x, y, z: 0.0 };
        }
        landmarks
    }

    fn full_mesh() -> Vec<Landmark> {
        vec![
            Landmark {
                x: 0.5,
                y: 0.5,
                z: 0.0,
            };
            crate::detector::MESH_POINTS
        ]
    }

    #[test]
    fn lip_boundary_has_both_arcs() {
        let shape = build_region(Zone::Lips, &full_mesh(), 640, 480).unwrap();
        match shape {
            Shape::Polygon(points) => assert_eq!(points.len(), 2 * UPPER_OUTER_LIP.len()),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn short_landmark_set_drops_the_zone() {
        // 300 points covers the lips but not the right brow (336..).
        let landmarks = vec![Landmark::default(); 300];
        assert!(build_region(Zone::Lips, &landmarks, 640, 480).is_some());
        assert!(build_region(Zone::RightBrow, &landmarks, 640, 480).is_none());
        assert!(build_region(Zone::RightCheek, &landmarks, 640, 480).is_none());
        assert!(build_region(Zone::Foundation, &landmarks, 640, 480).is_none());

        assert!(build_region(Zone::Lips, &[], 640, 480).is_none());
    }

    #[test]
    fn cheek_sits_above_its_landmark() {
        let landmarks = mesh_with(&[(LEFT_CHEEK, 0.5, 0.5)]);
        let shape = build_region(Zone::LeftCheek, &landmarks, 640, 480).unwrap();
        assert_eq!(
            shape,
            Shape::Ellipse {
                cx: 320.0,
                cy: 230.0,
                rx: 30.0,
                ry: 20.0,
                angle: 0.0,
            }
        );
    }

    #[test]
    fn cheek_scales_with_surface_size() {
        let landmarks = mesh_with(&[(LEFT_CHEEK, 0.5, 0.5)]);
        let shape = build_region(Zone::LeftCheek, &landmarks, 1280, 960).unwrap();
        assert_eq!(
            shape,
            Shape::Ellipse {
                cx: 640.0,
                cy: 460.0,
                rx: 60.0,
                ry: 40.0,
                angle: 0.0,
            }
        );
    }

    #[test]
    fn contour_midpoint_and_tilt() {
        let (a, b) = LEFT_CONTOUR_ANCHORS;
        let landmarks = mesh_with(&[(a, 0.25, 0.5), (b, 0.35, 0.6)]);
        let shape = build_region(Zone::LeftContour, &landmarks, 640, 480).unwrap();
        match shape {
            Shape::Ellipse {
                cx,
                cy,
                rx,
                ry,
                angle,
            } => {
                assert!((cx - 192.0).abs() < 1e-3);
                assert!((cy - 284.0).abs() < 1e-3);
                assert_eq!((rx, ry), (40.0, 20.0));
                let expected = (288.0f32 - 240.0).atan2(224.0 - 160.0) - 0.3;
                assert!((angle - expected).abs() < 1e-6);
            }
            other => panic!("expected ellipse, got {other:?}"),
        }
    }

    #[test]
    fn contour_tilt_is_mirrored_on_the_right() {
        let (a, b) = RIGHT_CONTOUR_ANCHORS;
        let landmarks = mesh_with(&[(a, 0.75, 0.5), (b, 0.65, 0.6)]);
        let shape = build_region(Zone::RightContour, &landmarks, 640, 480).unwrap();
        match shape {
            Shape::Ellipse { angle, .. } => {
                let expected = (288.0f32 - 240.0).atan2(416.0 - 480.0) + 0.3;
                assert!((angle - expected).abs() < 1e-6);
            }
            other => panic!("expected ellipse, got {other:?}"),
        }
    }

    #[test]
    fn foundation_uses_the_full_outline() {
        let shape = build_region(Zone::Foundation, &full_mesh(), 640, 480).unwrap();
        match shape {
            Shape::Polygon(points) => assert_eq!(points.len(), FACE_OUTLINE.len()),
            other => panic!("expected polygon, got {other:?}"),
        }
    }
}
