//! Interaction bounds for text boxes, and hit-testing against them.
//!
//! Bounds are image-space rectangles padded by a fixed margin so thin
//! strokes of text stay easy to grab.

use crate::metrics::MemeFont;
use crate::textbox::TextBox;

/// Padding added on every side of the measured text.
pub const HIT_PADDING: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Bounding rectangle of a text box, centered on its anchor.
///
/// Blank boxes have no bounds: they are invisible to hit-testing. Explicit
/// dimensions from a resize override the measured size (and carry no extra
/// padding); otherwise the rect is `(measured width + 20, font size + 20)`.
pub fn text_bounds(text_box: &TextBox, font: &MemeFont) -> Option<Bounds> {
    if text_box.is_blank() {
        return None;
    }
    let (w, h) = match (text_box.width, text_box.height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let m = font.measure(&text_box.text, text_box.font_size);
            (m.width + 2.0 * HIT_PADDING, m.height + 2.0 * HIT_PADDING)
        }
    };
    Some(Bounds {
        left: text_box.x - w / 2.0,
        top: text_box.y - h / 2.0,
        right: text_box.x + w / 2.0,
        bottom: text_box.y + h / 2.0,
    })
}

/// Topmost box under the point: the list renders in order, so the last-added
/// match wins.
pub fn hit_test<'a>(boxes: &'a [TextBox], font: &MemeFont, x: f32, y: f32) -> Option<&'a TextBox> {
    boxes
        .iter()
        .rev()
        .find(|b| text_bounds(b, font).is_some_and(|bounds| bounds.contains(x, y)))
}
