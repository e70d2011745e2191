// src/annotation/geometry.rs
use eframe::egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 8.0;

/// An axis-aligned bounding box in original-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from two opposite corners in any order.
    pub fn from_corners(a: Pos2, b: Pos2) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    pub fn contains(&self, p: Pos2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn corner(&self, handle: Handle) -> Pos2 {
        match handle {
            Handle::TopLeft => Pos2::new(self.x, self.y),
            Handle::TopRight => Pos2::new(self.x + self.w, self.y),
            Handle::BottomRight => Pos2::new(self.x + self.w, self.y + self.h),
            Handle::BottomLeft => Pos2::new(self.x, self.y + self.h),
        }
    }

    /// Rebuild the box with `handle` dragged to `p`, its opposite corner
    /// staying anchored. The result is re-normalized, so dragging a corner
    /// past its anchor flips the box instead of producing negative extents.
    pub fn with_corner_at(&self, handle: Handle, p: Pos2) -> Self {
        Self::from_corners(self.corner(handle.opposite()), p)
    }

    /// Clamp the whole box into `width` x `height`, preserving size where
    /// possible (position gives way first).
    pub fn clamped_to(&self, width: f32, height: f32) -> Self {
        let w = self.w.min(width);
        let h = self.h.min(height);
        Self {
            x: self.x.clamp(0.0, (width - w).max(0.0)),
            y: self.y.clamp(0.0, (height - h).max(0.0)),
            w,
            h,
        }
    }

    /// Bit-exact coordinate identity, used by the legacy tombstone match.
    pub fn bits_eq(&self, other: &BBox) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.w.to_bits() == other.w.to_bits()
            && self.h.to_bits() == other.h.to_bits()
    }

    /// Stable key for de-duplicating entries that describe the same region.
    pub fn key(&self) -> String {
        format!(
            "{:.0},{:.0},{:.0},{:.0}",
            self.x, self.y, self.w, self.h
        )
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Resize handle on a bounding box corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomRight,
        Handle::BottomLeft,
    ];

    pub fn opposite(&self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::TopRight => Handle::BottomLeft,
            Handle::BottomRight => Handle::TopLeft,
            Handle::BottomLeft => Handle::TopRight,
        }
    }
}

/// Maps between original-image pixels and the on-screen canvas.
///
/// Geometry is always stored in original space; the per-axis factors
/// (viewport/natural) are recomputed whenever the natural size or the
/// viewport rect changes, and zoom/pan are applied on top. Annotations
/// therefore survive window resizes and image swaps untouched.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    /// Natural pixel size of the loaded image.
    pub natural: Vec2,
    /// Screen rect the unzoomed image is fitted into.
    pub viewport: Rect,
    pub scale: f32,
    pub pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            natural: Vec2::new(1.0, 1.0),
            viewport: Rect::from_min_size(Pos2::ZERO, Vec2::new(1.0, 1.0)),
            scale: MIN_ZOOM,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn set_natural(&mut self, size: Vec2) {
        if size != self.natural {
            self.natural = Vec2::new(size.x.max(1.0), size.y.max(1.0));
            self.reset_view();
        }
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
        self.clamp_pan();
    }

    pub fn reset_view(&mut self) {
        self.scale = MIN_ZOOM;
        self.pan = Vec2::ZERO;
    }

    fn factors(&self) -> Vec2 {
        Vec2::new(
            self.viewport.width() / self.natural.x,
            self.viewport.height() / self.natural.y,
        )
    }

    pub fn to_display(&self, p: Pos2) -> Pos2 {
        let f = self.factors();
        Pos2::new(
            self.viewport.min.x + p.x * f.x * self.scale + self.pan.x,
            self.viewport.min.y + p.y * f.y * self.scale + self.pan.y,
        )
    }

    pub fn to_image(&self, q: Pos2) -> Pos2 {
        let f = self.factors();
        Pos2::new(
            (q.x - self.viewport.min.x - self.pan.x) / (f.x * self.scale),
            (q.y - self.viewport.min.y - self.pan.y) / (f.y * self.scale),
        )
    }

    pub fn rect_to_display(&self, bbox: &BBox) -> Rect {
        Rect::from_two_pos(
            self.to_display(Pos2::new(bbox.x, bbox.y)),
            self.to_display(Pos2::new(bbox.x + bbox.w, bbox.y + bbox.h)),
        )
    }

    /// Zoom so that the image point under `anchor` stays under it.
    pub fn zoom_about(&mut self, anchor: Pos2, new_scale: f32) {
        let pivot = self.to_image(anchor);
        self.scale = new_scale.clamp(MIN_ZOOM, MAX_ZOOM);
        let f = self.factors();
        self.pan = Vec2::new(
            anchor.x - self.viewport.min.x - pivot.x * f.x * self.scale,
            anchor.y - self.viewport.min.y - pivot.y * f.y * self.scale,
        );
        self.clamp_pan();
    }

    pub fn zoom_step(&mut self, factor: f32) {
        self.zoom_about(self.viewport.center(), self.scale * factor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
        self.clamp_pan();
    }

    pub fn zoomed_in(&self) -> bool {
        self.scale > MIN_ZOOM
    }

    /// Keep the scaled image covering the viewport: pan stays within
    /// [size * (1 - scale), 0] per axis.
    fn clamp_pan(&mut self) {
        let size = self.viewport.size();
        let min = Vec2::new(size.x * (1.0 - self.scale), size.y * (1.0 - self.scale));
        self.pan.x = self.pan.x.clamp(min.x.min(0.0), 0.0);
        self.pan.y = self.pan.y.clamp(min.y.min(0.0), 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> ViewTransform {
        let mut v = ViewTransform::default();
        v.set_natural(Vec2::new(640.0, 480.0));
        v.set_viewport(Rect::from_min_size(
            Pos2::new(40.0, 60.0),
            Vec2::new(960.0, 720.0),
        ));
        v
    }

    #[test]
    fn from_corners_normalizes_order() {
        let a = BBox::from_corners(Pos2::new(10.0, 20.0), Pos2::new(50.0, 80.0));
        let b = BBox::from_corners(Pos2::new(50.0, 80.0), Pos2::new(10.0, 20.0));
        assert_eq!(a, b);
        assert_eq!(a, BBox::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn round_trip_is_idempotent_within_tolerance() {
        let mut v = transform();
        v.zoom_about(Pos2::new(300.0, 300.0), 3.0);
        for p in [
            Pos2::new(0.0, 0.0),
            Pos2::new(123.4, 56.7),
            Pos2::new(639.0, 479.0),
        ] {
            let back = v.to_image(v.to_display(p));
            assert!((back.x - p.x).abs() < 1e-3, "{back:?} vs {p:?}");
            assert!((back.y - p.y).abs() < 1e-3, "{back:?} vs {p:?}");
        }
    }

    #[test]
    fn geometry_survives_viewport_resize() {
        let mut v = transform();
        let p = Pos2::new(320.0, 240.0);
        // The image midpoint maps to the viewport midpoint at any size.
        assert_eq!(v.to_display(p), Pos2::new(40.0 + 480.0, 60.0 + 360.0));
        v.set_viewport(Rect::from_min_size(Pos2::ZERO, Vec2::new(320.0, 240.0)));
        assert_eq!(v.to_display(p), Pos2::new(160.0, 120.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut v = transform();
        let anchor = Pos2::new(400.0, 400.0);
        let before = v.to_image(anchor);
        v.zoom_about(anchor, 2.5);
        let after = v.to_image(anchor);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn pan_is_clamped_to_image_bounds() {
        let mut v = transform();
        v.zoom_about(v.viewport.center(), 2.0);
        v.pan_by(Vec2::new(1e6, 1e6));
        assert_eq!(v.pan, Vec2::ZERO);
        v.pan_by(Vec2::new(-1e6, -1e6));
        assert_eq!(v.pan, Vec2::new(-960.0, -720.0));
    }

    #[test]
    fn resize_past_anchor_flips_instead_of_inverting() {
        let b = BBox::new(10.0, 10.0, 20.0, 20.0);
        let flipped = b.with_corner_at(Handle::BottomRight, Pos2::new(0.0, 0.0));
        assert_eq!(flipped, BBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(flipped.w >= 0.0 && flipped.h >= 0.0);
    }

    #[test]
    fn clamped_to_keeps_size_when_it_fits() {
        let b = BBox::new(-5.0, 470.0, 30.0, 30.0).clamped_to(640.0, 480.0);
        assert_eq!(b, BBox::new(0.0, 450.0, 30.0, 30.0));
    }
}
