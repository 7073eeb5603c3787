//! Text box model and the list that owns it.
//!
//! A `TextBox` is the only persistent entity in the editor: everything else
//! (composited pixels, textures, gesture state) is derived from the current
//! image plus the current list of boxes.

pub const FONT_SIZE_MIN: u32 = 12;
pub const FONT_SIZE_MAX: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 40;

/// Minimum explicit dimensions for the resizable overlay variant, image-space.
pub const MIN_BOX_WIDTH: f32 = 50.0;
pub const MIN_BOX_HEIGHT: f32 = 30.0;

pub const DEFAULT_TEXT_COLOR: [u8; 3] = [0xff, 0xff, 0xff];
pub const DEFAULT_BORDER_COLOR: [u8; 3] = [0x00, 0x00, 0x00];

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub id: u64,
    pub text: String,
    pub font_size: u32,
    /// Image-space anchor; text renders centered on it both axes.
    pub x: f32,
    pub y: f32,
    pub text_color: [u8; 3],
    pub border_color: [u8; 3],
    /// Explicit dimensions set by a resize gesture. `None` means the box
    /// tracks its measured text bounds.
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl TextBox {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            x,
            y,
            text_color: DEFAULT_TEXT_COLOR,
            border_color: DEFAULT_BORDER_COLOR,
            width: None,
            height: None,
        }
    }

    /// Blank boxes are never drawn, hit-tested or exported.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

/// Formats a color as `#rrggbb` for the property panel.
pub fn color_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Parses `#rrggbb`; returns `None` for anything malformed.
pub fn color_from_hex(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Ordered, non-empty list of text boxes plus the current selection.
///
/// Selection is view state only: selecting never mutates box values and never
/// reorders the list. Mutations are id-preserving replacements.
pub struct TextBoxList {
    boxes: Vec<TextBox>,
    selected: Option<u64>,
    next_id: u64,
}

impl TextBoxList {
    pub fn new() -> Self {
        Self {
            boxes: vec![TextBox::new(1, 0.0, 0.0)],
            selected: None,
            next_id: 2,
        }
    }

    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    pub fn get(&self, id: u64) -> Option<&TextBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&TextBox> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: Option<u64>) {
        self.selected = match id {
            Some(id) if self.get(id).is_some() => Some(id),
            _ => None,
        };
    }

    /// Discards all boxes and starts over with a single fresh one anchored at
    /// the horizontal center, upper quarter of the new image.
    pub fn reset_for_image(&mut self, image_w: f32, image_h: f32) {
        let id = self.next_id;
        self.next_id += 1;
        self.boxes = vec![TextBox::new(id, image_w / 2.0, image_h / 4.0)];
        self.selected = None;
    }

    /// Appends a box at the image center and selects it.
    pub fn add(&mut self, image_w: f32, image_h: f32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.boxes.push(TextBox::new(id, image_w / 2.0, image_h / 2.0));
        self.selected = Some(id);
        id
    }

    /// Replaces the box with the same id, clamping the anchor to the image
    /// and the font size to its legal range. Unknown ids are ignored.
    pub fn update(&mut self, mut updated: TextBox, image_w: f32, image_h: f32) {
        updated.x = updated.x.clamp(0.0, image_w);
        updated.y = updated.y.clamp(0.0, image_h);
        updated.font_size = clamp_font_size(updated.font_size);
        if let Some(w) = updated.width {
            updated.width = Some(w.max(MIN_BOX_WIDTH));
        }
        if let Some(h) = updated.height {
            updated.height = Some(h.max(MIN_BOX_HEIGHT));
        }
        if let Some(slot) = self.boxes.iter_mut().find(|b| b.id == updated.id) {
            *slot = updated;
        }
    }

    /// Removes a box by id. Refused (returns false) when it is the last one;
    /// the list is never empty.
    pub fn remove(&mut self, id: u64) -> bool {
        if self.boxes.len() <= 1 {
            return false;
        }
        let before = self.boxes.len();
        self.boxes.retain(|b| b.id != id);
        let removed = self.boxes.len() != before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }
}

impl Default for TextBoxList {
    fn default() -> Self {
        Self::new()
    }
}
