//! Display scaling and screen/image coordinate mapping.
//!
//! The bitmap is composited at natural resolution and only scaled for
//! presentation, so every pointer interaction has to run through the same
//! mapping that placed the image on screen.

use eframe::egui::{Pos2, Rect, Vec2, pos2};

/// Scale that fits `natural` into `available` without ever magnifying.
pub fn fit_scale(natural: Vec2, available: Vec2) -> f32 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return 1.0;
    }
    (available.x / natural.x).min(available.y / natural.y).min(1.0)
}

/// A placed, scaled image: `origin` is the on-screen top-left of the bitmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Pos2,
    pub scale: f32,
}

impl Viewport {
    /// Centers an image of `natural` pixels inside `area` at the fitted scale.
    pub fn fit(natural: Vec2, area: Rect) -> Self {
        let scale = fit_scale(natural, area.size());
        let display = natural * scale;
        Self {
            origin: area.center() - display / 2.0,
            scale,
        }
    }

    pub fn to_image(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.origin.x) / self.scale,
            (screen.y - self.origin.y) / self.scale,
        )
    }

    pub fn to_screen(&self, image: Pos2) -> Pos2 {
        pos2(
            image.x * self.scale + self.origin.x,
            image.y * self.scale + self.origin.y,
        )
    }

    /// On-screen rectangle covered by the scaled bitmap.
    pub fn screen_rect(&self, natural: Vec2) -> Rect {
        Rect::from_min_size(self.origin, natural * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn scale_is_bounded_by_the_tighter_axis() {
        // Viewport 760x400, natural 1520x800: width-bound at exactly 0.5.
        assert_eq!(fit_scale(vec2(1520.0, 800.0), vec2(760.0, 400.0)), 0.5);
        assert_eq!(fit_scale(vec2(1520.0, 800.0), vec2(10000.0, 400.0)), 0.5);
    }

    #[test]
    fn images_are_never_magnified() {
        assert_eq!(fit_scale(vec2(100.0, 50.0), vec2(4000.0, 4000.0)), 1.0);
        assert_eq!(fit_scale(vec2(0.0, 0.0), vec2(800.0, 600.0)), 1.0);
    }

    #[test]
    fn mapping_round_trips() {
        let vp = Viewport {
            origin: pos2(100.0, 50.0),
            scale: 0.5,
        };
        assert_eq!(vp.to_image(pos2(150.0, 100.0)), pos2(100.0, 100.0));
        assert_eq!(vp.to_screen(pos2(100.0, 100.0)), pos2(150.0, 100.0));
        let p = pos2(123.0, 45.0);
        let back = vp.to_image(vp.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-4 && (back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn fit_centers_the_image() {
        let area = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let vp = Viewport::fit(vec2(400.0, 600.0), area);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.origin, pos2(200.0, 0.0));
        assert_eq!(vp.screen_rect(vec2(400.0, 600.0)).max, pos2(600.0, 600.0));
    }
}
