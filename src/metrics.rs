//! Text measurement over the embedded display font.
//!
//! Measurement and drawing must share one font face, or hit bounds would
//! drift from rendered pixels. The compositor borrows the same `FontArc`
//! through [`MemeFont::raw`].

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};

const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    /// Line height of the rendered string; the anchor sits at its middle.
    pub height: f32,
}

#[derive(Clone)]
pub struct MemeFont {
    font: FontArc,
}

impl MemeFont {
    /// Parses the embedded face. Failure is not fatal to the app: callers
    /// skip measurement-dependent work for the frame and try again.
    pub fn embedded() -> anyhow::Result<Self> {
        let font = FontArc::try_from_slice(FONT_BYTES)?;
        Ok(Self { font })
    }

    pub fn raw(&self) -> &FontArc {
        &self.font
    }

    /// Width is the kerned sum of glyph advances at `font_size` pixels;
    /// height is the font size itself (middle-baseline model).
    pub fn measure(&self, text: &str, font_size: u32) -> TextMetrics {
        let scaled = self.font.as_scaled(PxScale::from(font_size as f32));
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            if c.is_control() {
                continue;
            }
            let id = self.font.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        TextMetrics {
            width,
            height: font_size as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_font_parses() {
        assert!(MemeFont::embedded().is_ok());
    }

    #[test]
    fn empty_text_has_zero_width() {
        let font = MemeFont::embedded().unwrap();
        let m = font.measure("", 40);
        assert_eq!(m.width, 0.0);
        assert_eq!(m.height, 40.0);
    }

    #[test]
    fn width_grows_with_text_and_size() {
        let font = MemeFont::embedded().unwrap();
        let hello = font.measure("HELLO", 40);
        assert!(hello.width > 0.0);
        assert!(font.measure("HELLO THERE", 40).width > hello.width);
        assert!(font.measure("HELLO", 80).width > hello.width);
    }

    #[test]
    fn measurement_is_deterministic() {
        let font = MemeFont::embedded().unwrap();
        assert_eq!(font.measure("SAME INPUT", 32), font.measure("SAME INPUT", 32));
    }
}
