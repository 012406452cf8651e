//! View and projection matrix builders.
//!
//! Pure functions; `Renderer` wraps them with the current layout rect and
//! framebuffer size. World space is y-up with the origin at the bottom-left of
//! the framebuffer.

use glam::{Mat4, Quat, Vec3};

use crate::coords::Rect;

/// Framebuffer dimensions in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramebufferSize {
    pub width: f32,
    pub height: f32,
}

impl FramebufferSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width as f32, height: height as f32 }
    }
}

/// 2D pixel-space coordinate system.
///
/// World point `(0, 0)` lands at framebuffer pixel `(x, y)`. `sx`/`sy` scale the
/// visible extent relative to the framebuffer (`1.0` = one unit per pixel).
/// Returns `(view, projection)`.
pub fn cartesian_2d(x: f32, y: f32, sx: f32, sy: f32, fb: FramebufferSize) -> (Mat4, Mat4) {
    let width = sx * fb.width;
    let height = sy * fb.height;

    let view = Mat4::from_translation(Vec3::new(x - width / 2.0, y - height / 2.0, 0.0));
    let projection = Mat4::from_scale(Vec3::new(2.0 / width, 2.0 / height, 1.0));

    (view, projection)
}

/// Mirrors the X axis of a projection.
fn mirror_x(projection: Mat4) -> Mat4 {
    projection * Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0))
}

/// Perspective projection whose vanishing point sits at the centre of `layout`.
///
/// The X axis is mirrored.
pub fn perspective(
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    layout: Rect,
    fb: FramebufferSize,
) -> Mat4 {
    let center_x = layout.x0 + layout.width() * 0.5 - fb.width * 0.5;
    let center_y = layout.y0 + layout.height() * 0.5 - fb.height * 0.5;
    perspective_centered(fovy, aspect, near, far, center_x, center_y, layout)
}

/// Perspective projection shifted by `(center_x, center_y)` in layout units.
pub fn perspective_centered(
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    center_x: f32,
    center_y: f32,
    layout: Rect,
) -> Mat4 {
    let projection = Mat4::perspective_rh(fovy, aspect, near, far);
    let shift = Vec3::new(center_x / layout.width(), center_y / layout.height(), 0.0);
    mirror_x(projection * Mat4::from_translation(shift))
}

/// Orthographic projection of a `width` x `height` volume centred on `layout`.
///
/// The X axis is mirrored.
pub fn orthographic(
    width: f32,
    height: f32,
    near: f32,
    far: f32,
    layout: Rect,
    fb: FramebufferSize,
) -> Mat4 {
    let center_x = 2.0 * layout.x0 + layout.width() - fb.width;
    let center_y = 2.0 * layout.y0 + layout.height() - fb.height;
    orthographic_centered(width, height, near, far, center_x, center_y)
}

pub fn orthographic_centered(
    width: f32,
    height: f32,
    near: f32,
    far: f32,
    center_x: f32,
    center_y: f32,
) -> Mat4 {
    let projection = Mat4::orthographic_rh(
        center_x - width * 0.5,
        center_x + width * 0.5,
        center_y - height * 0.5,
        center_y + height * 0.5,
        near,
        far,
    );
    mirror_x(projection)
}

pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(position, target, up)
}

/// Rotation applied after translating by `position`.
pub fn orientation(position: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_quat(rotation) * Mat4::from_translation(position)
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec4};

    use super::*;

    fn ndc(view: Mat4, projection: Mat4, p: Vec2) -> Vec2 {
        let clip = projection * view * Vec4::new(p.x, p.y, 0.0, 1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn cartesian_full_screen_maps_origin_to_bottom_left() {
        let fb = FramebufferSize::new(800, 600);
        let (view, proj) = cartesian_2d(0.0, 0.0, 1.0, 1.0, fb);
        assert!(close(ndc(view, proj, Vec2::ZERO), Vec2::new(-1.0, -1.0)));
        assert!(close(ndc(view, proj, Vec2::new(800.0, 600.0)), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn cartesian_offset_maps_origin_to_offset_pixel() {
        let fb = FramebufferSize::new(800, 600);
        let (view, proj) = cartesian_2d(200.0, 150.0, 1.0, 1.0, fb);
        // Pixel (200, 150) is a quarter of the way across each axis.
        assert!(close(ndc(view, proj, Vec2::ZERO), Vec2::new(-0.5, -0.5)));
    }

    #[test]
    fn orthographic_mirrors_x() {
        let layout = Rect::new(0.0, 0.0, 100.0, 100.0);
        let fb = FramebufferSize::new(100, 100);
        let proj = orthographic(2.0, 2.0, 0.1, 10.0, layout, fb);
        let p = proj * Vec4::new(0.5, 0.5, -1.0, 1.0);
        assert!((p.x + 0.5).abs() < 1e-5, "x = {}", p.x);
        assert!((p.y - 0.5).abs() < 1e-5, "y = {}", p.y);
    }

    #[test]
    fn perspective_centre_is_unshifted_for_full_layout() {
        let layout = Rect::new(0.0, 0.0, 640.0, 480.0);
        let fb = FramebufferSize::new(640, 480);
        let with_layout = perspective(1.0, 4.0 / 3.0, 0.1, 100.0, layout, fb);
        let plain = mirror_x(Mat4::perspective_rh(1.0, 4.0 / 3.0, 0.1, 100.0));
        assert!(with_layout.abs_diff_eq(plain, 1e-6));
    }

    #[test]
    fn orientation_translates_before_rotating() {
        let m = orientation(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let p = m.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }
}
