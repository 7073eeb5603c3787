//! Full-frame composition of the base image and all captions.
//!
//! Output is always at the image's natural pixel size; display scaling is a
//! presentation transform and never touches these pixels. There is no
//! incremental drawing: any change re-runs the whole pass.

use ab_glyph::PxScale;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::metrics::MemeFont;
use crate::textbox::TextBox;

/// Outward reach of the text border, the raster equivalent of a 4px stroke
/// centered on the glyph edge.
const STROKE_PX: i32 = 2;

const STROKE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn opaque(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

/// Draws the base image, then each non-blank caption in list order: border
/// stroke first, fill on top, centered on the box anchor.
pub fn composite(base: &RgbaImage, boxes: &[TextBox], font: &MemeFont) -> RgbaImage {
    let mut out = base.clone();
    for text_box in boxes {
        if text_box.is_blank() {
            continue;
        }
        let metrics = font.measure(&text_box.text, text_box.font_size);
        let left = (text_box.x - metrics.width / 2.0).round() as i32;
        let top = (text_box.y - metrics.height / 2.0).round() as i32;
        let scale = PxScale::from(text_box.font_size as f32);

        let stroke = opaque(text_box.border_color);
        for (dx, dy) in STROKE_OFFSETS {
            draw_text_mut(
                &mut out,
                stroke,
                left + dx * STROKE_PX,
                top + dy * STROKE_PX,
                scale,
                font.raw(),
                &text_box.text,
            );
        }
        draw_text_mut(
            &mut out,
            opaque(text_box.text_color),
            left,
            top,
            scale,
            font.raw(),
            &text_box.text,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> MemeFont {
        MemeFont::embedded().unwrap()
    }

    fn gray_base(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([120, 120, 120, 255]))
    }

    #[test]
    fn no_visible_boxes_is_identity() {
        let base = gray_base(320, 240);
        let mut blank = TextBox::new(1, 160.0, 120.0);
        blank.text = "   ".to_string();
        let out = composite(&base, &[blank], &font());
        assert_eq!(out.dimensions(), (320, 240));
        assert_eq!(out.as_raw(), base.as_raw());
    }

    #[test]
    fn hello_is_composited_at_natural_resolution() {
        let base = gray_base(800, 600);
        let mut caption = TextBox::new(1, 400.0, 150.0);
        caption.text = "HELLO".to_string();
        caption.font_size = 40;

        let out = composite(&base, &[caption], &font());
        assert_eq!(out.dimensions(), (800, 600));

        // White fill and dark stroke pixels appear near the anchor.
        let mut saw_fill = false;
        let mut saw_stroke = false;
        for y in 100..200u32 {
            for x in 300..500u32 {
                let p = out.get_pixel(x, y).0;
                if p == [255, 255, 255, 255] {
                    saw_fill = true;
                }
                if p[0] < 60 && p[1] < 60 && p[2] < 60 {
                    saw_stroke = true;
                }
            }
        }
        assert!(saw_fill, "no white fill pixels near the anchor");
        assert!(saw_stroke, "no dark stroke pixels near the anchor");

        // Pixels far from the caption are untouched.
        assert_eq!(out.get_pixel(10, 10).0, [120, 120, 120, 255]);
        assert_eq!(out.get_pixel(790, 590).0, [120, 120, 120, 255]);
    }

    #[test]
    fn fill_sits_above_the_stroke() {
        // The fill pass runs after all stroke passes, so glyph cores end up
        // in the fill color at full coverage.
        let base = gray_base(400, 200);
        let mut caption = TextBox::new(1, 200.0, 100.0);
        caption.text = "OK".to_string();
        caption.font_size = 60;
        caption.text_color = [255, 255, 255];
        caption.border_color = [0, 0, 0];

        let out = composite(&base, &[caption], &font());
        let core: Vec<_> = out
            .pixels()
            .filter(|p| p.0 == [255, 255, 255, 255])
            .collect();
        assert!(!core.is_empty(), "fill never reached full coverage");
    }

    #[test]
    fn boxes_render_in_list_order() {
        let base = gray_base(400, 200);
        let mut under = TextBox::new(1, 200.0, 100.0);
        under.text = "####".to_string();
        under.font_size = 60;
        under.text_color = [255, 0, 0];
        under.border_color = [255, 0, 0];
        let mut over = under.clone();
        over.id = 2;
        over.text_color = [0, 0, 255];
        over.border_color = [0, 0, 255];

        let out = composite(&base, &[under.clone(), over], &font());
        // The later box drew last, so its color is present and fully covers
        // the earlier identical glyphs.
        assert!(out.pixels().any(|p| p.0 == [0, 0, 255, 255]));
        assert!(!out.pixels().any(|p| p.0 == [255, 0, 0, 255]));
    }
}
