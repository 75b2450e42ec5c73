use image::{Rgb, RgbImage};

use crate::color::Rgba;
use crate::detector::Landmark;
use crate::params::CosmeticSelection;
use crate::zones::{build_region, Point, Shape, Zone};

/// Compose one frame onto the surface: camera passthrough first, then every
/// zone of the selection in the fixed draw order. `face` is this frame's
/// landmark set, if any; without one (or with visibility off) the surface is
/// left as the bare passthrough.
pub fn render_frame(
    surface: &mut RgbImage,
    frame: &RgbImage,
    face: Option<&[Landmark]>,
    selection: &CosmeticSelection,
) {
    draw_passthrough(surface, frame);

    if !selection.visible {
        return;
    }
    let Some(landmarks) = face else {
        return;
    };

    let (width, height) = surface.dimensions();
    for zone in Zone::DRAW_ORDER {
        let params = selection.params_for(zone.group());
        let Some(color) = params.shade.resolve(selection.alpha_for(zone)) else {
            continue;
        };
        let Some(shape) = build_region(zone, landmarks, width, height) else {
            continue;
        };
        fill_shape(surface, &shape, color);
    }
}

/// Replace the surface contents with the camera image, resampling when the
/// source dimensions differ.
fn draw_passthrough(surface: &mut RgbImage, frame: &RgbImage) {
    if frame.dimensions() == surface.dimensions() {
        surface.clone_from(frame);
    } else {
        let (width, height) = surface.dimensions();
        *surface = image::imageops::resize(
            frame,
            width,
            height,
            image::imageops::FilterType::Triangle,
        );
    }
}

/// Source-over fill of a region shape.
pub fn fill_shape(surface: &mut RgbImage, shape: &Shape, color: Rgba) {
    match shape {
        Shape::Polygon(points) => fill_polygon(surface, points, color),
        Shape::Ellipse {
            cx,
            cy,
            rx,
            ry,
            angle,
        } => fill_ellipse(surface, *cx, *cy, *rx, *ry, *angle, color),
    }
}

/// final = src * a + dst * (1 - a), per channel.
fn blend(pixel: &mut Rgb<u8>, color: Rgba) {
    let a = color.a;
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
    pixel[0] = mix(color.r, pixel[0]);
    pixel[1] = mix(color.g, pixel[1]);
    pixel[2] = mix(color.b, pixel[2]);
}

fn blend_px(surface: &mut RgbImage, x: u32, y: u32, color: Rgba) {
    blend(surface.get_pixel_mut(x, y), color);
}

/// Even-odd scanline fill. Pixels are sampled at their centers, so each
/// pixel of the boundary is blended exactly once per shape regardless of how
/// many edges pass nearby.
fn fill_polygon(surface: &mut RgbImage, points: &[Point], color: Rgba) {
    if points.len() < 3 {
        return;
    }
    let (width, height) = surface.dimensions();

    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let y_start = (min_y.floor().max(0.0)) as u32;
    let y_end = (max_y.ceil().min(height as f32)) as u32;

    let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
    for y in y_start..y_end {
        let yc = y as f32 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            // Half-open span per edge so a vertex shared by two edges counts
            // once, not twice.
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let x_start = ((span[0] - 0.5).ceil().max(0.0)) as u32;
            let x_end = ((span[1] - 0.5).ceil().min(width as f32)) as u32;
            for x in x_start..x_end {
                blend_px(surface, x, y, color);
            }
        }
    }
}

fn fill_ellipse(surface: &mut RgbImage, cx: f32, cy: f32, rx: f32, ry: f32, angle: f32, color: Rgba) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let (width, height) = surface.dimensions();
    let (sin, cos) = angle.sin_cos();

    // Tight bounding box of the rotated ellipse.
    let ex = ((rx * cos).powi(2) + (ry * sin).powi(2)).sqrt();
    let ey = ((rx * sin).powi(2) + (ry * cos).powi(2)).sqrt();
    let y_start = ((cy - ey).floor().max(0.0)) as u32;
    let y_end = ((cy + ey).ceil().min(height as f32)) as u32;
    let x_start = ((cx - ex).floor().max(0.0)) as u32;
    let x_end = ((cx + ex).ceil().min(width as f32)) as u32;

    for y in y_start..y_end {
        for x in x_start..x_end {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            // Rotate the sample into the ellipse's own axes.
            let lx = dx * cos + dy * sin;
            let ly = -dx * sin + dy * cos;
            if (lx / rx).powi(2) + (ly / ry).powi(2) <= 1.0 {
                blend_px(surface, x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Shade;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    #[test]
    fn blend_matches_source_over() {
        // #E33638 at 0.25 over #F0D0B8.
        let mut pixel = Rgb([0xF0, 0xD0, 0xB8]);
        blend(
            &mut pixel,
            Rgba {
                r: 0xE3,
                g: 0x36,
                b: 0x38,
                a: 0.25,
            },
        );
        let expect = |src: u8, dst: u8| (src as f32 * 0.25 + dst as f32 * 0.75).round() as u8;
        assert_eq!(pixel, Rgb([expect(0xE3, 0xF0), expect(0x36, 0xD0), expect(0x38, 0xB8)]));
    }

    #[test]
    fn blend_at_full_alpha_is_the_source() {
        let mut pixel = Rgb([1, 2, 3]);
        blend(
            &mut pixel,
            Rgba {
                r: 200,
                g: 100,
                b: 50,
                a: 1.0,
            },
        );
        assert_eq!(pixel, Rgb([200, 100, 50]));
    }

    #[test]
    fn polygon_fill_covers_interior_only() {
        let mut surface = solid(20, 20, [0, 0, 0]);
        let square = vec![
            Point { x: 5.0, y: 5.0 },
            Point { x: 15.0, y: 5.0 },
            Point { x: 15.0, y: 15.0 },
            Point { x: 5.0, y: 15.0 },
        ];
        fill_polygon(
            &mut surface,
            &square,
            Rgba {
                r: 255,
                g: 255,
                b: 255,
                a: 1.0,
            },
        );
        assert_eq!(*surface.get_pixel(10, 10), Rgb([255, 255, 255]));
        assert_eq!(*surface.get_pixel(4, 10), Rgb([0, 0, 0]));
        assert_eq!(*surface.get_pixel(10, 16), Rgb([0, 0, 0]));
        // 10x10 pixel centers fall inside the [5,15) spans.
        let lit = surface.pixels().filter(|p| p[0] > 0).count();
        assert_eq!(lit, 100);
    }

    #[test]
    fn polygon_fill_clips_to_the_surface() {
        let mut surface = solid(10, 10, [0, 0, 0]);
        let oversized = vec![
            Point { x: -20.0, y: -20.0 },
            Point { x: 30.0, y: -20.0 },
            Point { x: 30.0, y: 30.0 },
            Point { x: -20.0, y: 30.0 },
        ];
        fill_polygon(
            &mut surface,
            &oversized,
            Rgba {
                r: 9,
                g: 9,
                b: 9,
                a: 1.0,
            },
        );
        assert!(surface.pixels().all(|p| *p == Rgb([9, 9, 9])));
    }

    #[test]
    fn ellipse_fill_respects_radii() {
        let mut surface = solid(100, 100, [0, 0, 0]);
        fill_ellipse(
            &mut surface,
            50.0,
            50.0,
            20.0,
            10.0,
            0.0,
            Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 1.0,
            },
        );
        assert_eq!(*surface.get_pixel(50, 50), Rgb([255, 0, 0]));
        assert_eq!(*surface.get_pixel(65, 50), Rgb([255, 0, 0]));
        assert_eq!(*surface.get_pixel(50, 45), Rgb([255, 0, 0]));
        // Inside the x radius but outside the y radius.
        assert_eq!(*surface.get_pixel(50, 62), Rgb([0, 0, 0]));
        assert_eq!(*surface.get_pixel(72, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn rotated_ellipse_follows_its_angle() {
        let mut surface = solid(100, 100, [0, 0, 0]);
        fill_ellipse(
            &mut surface,
            50.0,
            50.0,
            20.0,
            5.0,
            std::f32::consts::FRAC_PI_2,
            Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 1.0,
            },
        );
        // Rotated a quarter turn, the long axis is vertical.
        assert_eq!(*surface.get_pixel(50, 65), Rgb([255, 0, 0]));
        assert_eq!(*surface.get_pixel(65, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn passthrough_resizes_to_the_surface() {
        let mut surface = solid(8, 8, [0, 0, 0]);
        let frame = solid(4, 4, [10, 20, 30]);
        render_frame(&mut surface, &frame, None, &CosmeticSelection::default());
        assert_eq!(surface.dimensions(), (8, 8));
        assert!(surface.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn hidden_makeup_renders_the_bare_passthrough() {
        let frame = solid(640, 480, [120, 110, 100]);
        let face = vec![
            crate::detector::Landmark {
                x: 0.5,
                y: 0.5,
                z: 0.0,
            };
            crate::detector::MESH_POINTS
        ];

        let mut hidden = solid(640, 480, [0, 0, 0]);
        let mut selection = CosmeticSelection::default();
        selection.visible = false;
        render_frame(&mut hidden, &frame, Some(&face), &selection);

        let mut passthrough = solid(640, 480, [0, 0, 0]);
        render_frame(
            &mut passthrough,
            &frame,
            None,
            &CosmeticSelection::default(),
        );

        assert_eq!(hidden.as_raw(), passthrough.as_raw());
    }

    #[test]
    fn cleared_zone_contributes_nothing() {
        let frame = solid(640, 480, [120, 110, 100]);
        let face = vec![
            crate::detector::Landmark {
                x: 0.5,
                y: 0.5,
                z: 0.0,
            };
            crate::detector::MESH_POINTS
        ];

        let mut bare = solid(640, 480, [0, 0, 0]);
        render_frame(&mut bare, &frame, Some(&face), &CosmeticSelection::bare());

        let mut reference = solid(640, 480, [0, 0, 0]);
        render_frame(&mut reference, &frame, None, &CosmeticSelection::bare());

        assert_eq!(bare.as_raw(), reference.as_raw());
    }

    #[test]
    fn zone_with_clear_shade_skips_but_others_draw() {
        let frame = solid(640, 480, [120, 110, 100]);
        let mut face = vec![crate::detector::Landmark::default(); crate::detector::MESH_POINTS];
        face[crate::zones::LEFT_CHEEK] = crate::detector::Landmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
        };

        let mut selection = CosmeticSelection::bare();
        selection.cheeks.shade = Shade::Tint { r: 255, g: 0, b: 0 };
        selection.cheeks.intensity = 1.0;

        let mut surface = solid(640, 480, [0, 0, 0]);
        render_frame(&mut surface, &frame, Some(&face), &selection);

        // Cheek ellipse center got tinted, far corner did not.
        assert_ne!(*surface.get_pixel(320, 230), Rgb([120, 110, 100]));
        assert_eq!(*surface.get_pixel(639, 479), Rgb([120, 110, 100]));
    }
}
