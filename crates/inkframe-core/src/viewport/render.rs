//! Rendering of the viewport onto a draw surface.
//!
//! The placement of the image is expressed the way a 2D canvas would draw it:
//!
//! ```text
//! translate(frame_w / 2 + offset_x, frame_h / 2 + offset_y)
//! rotate(rotation)                 // clockwise, y axis points down
//! scale(flip_x, flip_y)
//! draw_image(-draw_w / 2, -draw_h / 2, draw_w, draw_h)
//! ```
//!
//! A surface backed by a real canvas can replay those primitives directly.
//! [`RasterSurface`] is the software implementation used for export: it maps
//! every output pixel back into the source with the inverse transform and
//! samples bilinearly.

use serde::{Deserialize, Serialize};

use super::state::Rotation;
use crate::decode::DecodedImage;

/// RGB color.
pub type Rgb = [u8; 3];

/// Default frame background.
pub const WHITE: Rgb = [255, 255, 255];

/// A 2D affine transform in canvas convention.
///
/// ```text
/// x' = a * x + c * y + e
/// y' = b * x + d * y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Affine {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation on a y-down plane.
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Apply `self` first, then `next`.
    pub fn then(self, next: Affine) -> Affine {
        Affine {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// `None` for a singular transform (zero scale).
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

/// Where and how the image lands on the frame, in canvas primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Translation to the image centre.
    pub center_x: f64,
    pub center_y: f64,
    pub rotation: Rotation,
    /// +1.0 or -1.0.
    pub flip_x: f64,
    /// +1.0 or -1.0.
    pub flip_y: f64,
    /// Drawn size (image size times effective scale).
    pub draw_width: f64,
    pub draw_height: f64,
}

impl Placement {
    /// The rectangle passed to a canvas `drawImage` after the transform.
    pub fn draw_rect(&self) -> (f64, f64, f64, f64) {
        (
            -self.draw_width / 2.0,
            -self.draw_height / 2.0,
            self.draw_width,
            self.draw_height,
        )
    }

    /// Transform from source pixel coordinates to frame coordinates.
    pub fn image_to_frame(&self, image_width: u32, image_height: u32) -> Affine {
        let (x, y, w, h) = self.draw_rect();
        Affine::scale(
            w / f64::from(image_width.max(1)),
            h / f64::from(image_height.max(1)),
        )
        .then(Affine::translate(x, y))
        .then(Affine::scale(self.flip_x, self.flip_y))
        .then(Affine::rotate(self.rotation.radians()))
        .then(Affine::translate(self.center_x, self.center_y))
    }
}

/// A caller-provided 2D drawing target.
pub trait DrawSurface {
    /// Paint the whole surface with one color.
    fn fill(&mut self, color: Rgb);

    /// Draw `image` with the given placement. Pixels outside the surface are
    /// discarded.
    fn draw_image(&mut self, image: &DecodedImage, placement: &Placement);
}

/// Software RGB surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// A black surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// RGBA copy of the pixels, for canvas `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(3) {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        out
    }

    pub fn into_image(self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels,
        }
    }

    /// Frame-space bounding box of the transformed image, clipped to the surface.
    fn covered_rows_cols(&self, forward: &Affine, w: f64, h: f64) -> Option<(u32, u32, u32, u32)> {
        let corners = [
            forward.apply(0.0, 0.0),
            forward.apply(w, 0.0),
            forward.apply(0.0, h),
            forward.apply(w, h),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let x0 = min_x.floor().max(0.0);
        let y0 = min_y.floor().max(0.0);
        let x1 = max_x.ceil().min(f64::from(self.width));
        let y1 = max_y.ceil().min(f64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl DrawSurface for RasterSurface {
    fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&color);
        }
    }

    fn draw_image(&mut self, image: &DecodedImage, placement: &Placement) {
        if image.is_empty() {
            return;
        }
        let forward = placement.image_to_frame(image.width, image.height);
        let Some(inverse) = forward.invert() else {
            return;
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let Some((x0, y0, x1, y1)) = self.covered_rows_cols(&forward, w, h) else {
            return;
        };

        let stride = self.width as usize * 3;
        for dst_y in y0..y1 {
            for dst_x in x0..x1 {
                // Sample at pixel centres
                let (u, v) = inverse.apply(f64::from(dst_x) + 0.5, f64::from(dst_y) + 0.5);
                if u < 0.0 || v < 0.0 || u >= w || v >= h {
                    continue;
                }
                let pixel = sample_bilinear(image, u - 0.5, v - 0.5);
                let idx = dst_y as usize * stride + dst_x as usize * 3;
                self.pixels[idx..idx + 3].copy_from_slice(&pixel);
            }
        }
    }
}

/// Get a pixel as [f64; 3], clamping coordinates to the image edge.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: i64, py: i64) -> [f64; 3] {
    let x = px.clamp(0, i64::from(image.width) - 1) as usize;
    let y = py.clamp(0, i64::from(image.height) - 1) as usize;
    let idx = (y * image.width as usize + x) * 3;
    [
        f64::from(image.pixels[idx]),
        f64::from(image.pixels[idx + 1]),
        f64::from(image.pixels[idx + 2]),
    ]
}

/// Sample a pixel using bilinear interpolation over the 4 nearest pixels.
///
/// `x`/`y` are in pixel-index space (pixel centres at integers); neighbours
/// past the edge repeat the edge pixel.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x0 + 1, y0);
    let p01 = get_pixel_f64(image, x0, y0 + 1);
    let p11 = get_pixel_f64(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
    }

    fn placement(rotation: Rotation, flip_x: f64, flip_y: f64, w: f64, h: f64) -> Placement {
        Placement {
            center_x: 50.0,
            center_y: 40.0,
            rotation,
            flip_x,
            flip_y,
            draw_width: w,
            draw_height: h,
        }
    }

    #[test]
    fn test_affine_then_order() {
        // scale first, then translate
        let m = Affine::scale(2.0, 3.0).then(Affine::translate(10.0, 20.0));
        assert!(close(m.apply(1.0, 1.0), (12.0, 23.0)));
    }

    #[test]
    fn test_affine_rotate_is_clockwise_on_screen() {
        // +x axis rotates to +y (down) for a quarter turn
        let m = Affine::rotate(std::f64::consts::FRAC_PI_2);
        assert!(close(m.apply(1.0, 0.0), (0.0, 1.0)));
    }

    #[test]
    fn test_affine_invert_round_trip() {
        let m = Affine::scale(1.5, -0.5)
            .then(Affine::rotate(0.7))
            .then(Affine::translate(3.0, -4.0));
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(12.0, -7.0);
        assert!(close(inv.apply(x, y), (12.0, -7.0)));
    }

    #[test]
    fn test_affine_singular_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_placement_maps_image_center_to_translation() {
        let p = placement(Rotation::Deg90, -1.0, 1.0, 80.0, 60.0);
        let m = p.image_to_frame(40, 30);
        assert!(close(m.apply(20.0, 15.0), (50.0, 40.0)));
    }

    #[test]
    fn test_placement_quarter_turn_moves_top_left_to_top_right() {
        // Unrotated, the top-left corner sits up-left of the centre; after a
        // clockwise quarter turn it sits up-right.
        let p = placement(Rotation::Deg90, 1.0, 1.0, 40.0, 20.0);
        let corner = p.image_to_frame(40, 20).apply(0.0, 0.0);
        assert!(close(corner, (60.0, 20.0)));
    }

    #[test]
    fn test_placement_flip_mirrors_horizontally() {
        let p = placement(Rotation::Deg0, -1.0, 1.0, 40.0, 20.0);
        let (x, y) = p.image_to_frame(40, 20).apply(0.0, 0.0);
        assert!(close((x, y), (70.0, 30.0)));
    }

    #[test]
    fn test_raster_fill() {
        let mut surface = RasterSurface::new(4, 3);
        surface.fill(WHITE);
        assert!(surface.pixels().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_raster_identity_draw_copies_pixels() {
        let image = DecodedImage::new(2, 1, vec![255, 0, 0, 0, 0, 255]);
        let mut surface = RasterSurface::new(2, 1);
        let p = Placement {
            center_x: 1.0,
            center_y: 0.5,
            rotation: Rotation::Deg0,
            flip_x: 1.0,
            flip_y: 1.0,
            draw_width: 2.0,
            draw_height: 1.0,
        };
        surface.draw_image(&image, &p);

        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 255]));
    }

    #[test]
    fn test_raster_flip_draw_mirrors_pixels() {
        let image = DecodedImage::new(2, 1, vec![255, 0, 0, 0, 0, 255]);
        let mut surface = RasterSurface::new(2, 1);
        let p = Placement {
            center_x: 1.0,
            center_y: 0.5,
            rotation: Rotation::Deg0,
            flip_x: -1.0,
            flip_y: 1.0,
            draw_width: 2.0,
            draw_height: 1.0,
        };
        surface.draw_image(&image, &p);

        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(surface.pixel(1, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_raster_leaves_uncovered_background() {
        let image = DecodedImage::filled(2, 2, [10, 10, 10]);
        let mut surface = RasterSurface::new(6, 6);
        surface.fill(WHITE);
        let p = Placement {
            center_x: 3.0,
            center_y: 3.0,
            rotation: Rotation::Deg0,
            flip_x: 1.0,
            flip_y: 1.0,
            draw_width: 2.0,
            draw_height: 2.0,
        };
        surface.draw_image(&image, &p);

        assert_eq!(surface.pixel(0, 0), Some(WHITE));
        assert_eq!(surface.pixel(2, 2), Some([10, 10, 10]));
        assert_eq!(surface.pixel(3, 3), Some([10, 10, 10]));
        assert_eq!(surface.pixel(5, 5), Some(WHITE));
    }

    #[test]
    fn test_raster_offscreen_draw_is_noop() {
        let image = DecodedImage::filled(2, 2, [10, 10, 10]);
        let mut surface = RasterSurface::new(4, 4);
        surface.fill(WHITE);
        let before = surface.clone();
        let p = Placement {
            center_x: 100.0,
            center_y: 100.0,
            rotation: Rotation::Deg0,
            flip_x: 1.0,
            flip_y: 1.0,
            draw_width: 2.0,
            draw_height: 2.0,
        };
        surface.draw_image(&image, &p);
        assert_eq!(surface, before);
    }

    #[test]
    fn test_to_rgba() {
        let mut surface = RasterSurface::new(1, 1);
        surface.fill([1, 2, 3]);
        assert_eq!(surface.to_rgba(), vec![1, 2, 3, 255]);
    }
}
