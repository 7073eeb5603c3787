//! Editor state: the loaded image, the caption list, the composited output
//! and the status line. Owns every mutation; the canvas and the side panel
//! both go through [`EditorState::apply`].

use std::path::{Path, PathBuf};

use eframe::egui;
use image::RgbaImage;
use walkdir::WalkDir;

use crate::compositor::composite;
use crate::interaction::CanvasAction;
use crate::loader::{ImageLoader, ImageSource, LoadEvent, LoadSession};
use crate::metrics::MemeFont;
use crate::textbox::TextBoxList;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to decode image: {0}")]
    ImageDecode(String),
    #[error("text measurement unavailable")]
    MeasurementUnavailable,
    #[error("export failed: {0}")]
    Export(String),
}

pub struct EditorState {
    font: Option<MemeFont>,
    base: Option<RgbaImage>,
    rendered: Option<RgbaImage>,
    texture: Option<egui::TextureHandle>,
    pub boxes: TextBoxList,
    session: LoadSession,
    status: Option<String>,
    dirty: bool,
}

impl EditorState {
    pub fn new() -> Self {
        let font = match MemeFont::embedded() {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::warn!("display font failed to parse: {e:#}");
                None
            }
        };
        Self {
            font,
            base: None,
            rendered: None,
            texture: None,
            boxes: TextBoxList::new(),
            session: LoadSession::new(),
            status: None,
            dirty: false,
        }
    }

    /// The shared display font, re-parsed on demand if the first attempt
    /// failed. `None` means "skip measurement-dependent work this frame".
    pub fn font(&mut self) -> Option<&MemeFont> {
        if self.font.is_none() {
            self.font = MemeFont::embedded().ok();
        }
        self.font.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.base.is_some()
    }

    /// Natural pixel size of the current image.
    pub fn image_size(&self) -> Option<egui::Vec2> {
        self.base
            .as_ref()
            .map(|img| egui::vec2(img.width() as f32, img.height() as f32))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Kicks off an asynchronous load; supersedes any outstanding request.
    pub fn request_image(&mut self, loader: &ImageLoader, source: ImageSource) {
        let generation = self.session.begin();
        self.status = Some(format!("Loading {}…", source.describe()));
        tracing::info!(generation, source = %source.describe(), "image requested");
        loader.request(generation, source);
    }

    /// Applies one worker completion. Stale generations are dropped; a
    /// failure reports once and leaves image and captions untouched.
    pub fn handle_event(&mut self, ctx: &egui::Context, event: LoadEvent) {
        match event {
            LoadEvent::Loaded { generation, image } => {
                if !self.session.accepts(generation) {
                    tracing::debug!(generation, "dropping stale decode");
                    return;
                }
                self.install_image(ctx, image);
            }
            LoadEvent::Failed { generation, error } => {
                if !self.session.accepts(generation) {
                    tracing::debug!(generation, error = %error, "dropping stale failure");
                    return;
                }
                let err = EditorError::ImageDecode(error);
                tracing::warn!("{err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Installs a decoded image: the caption list is discarded and replaced
    /// by a single fresh box per the lifecycle rules.
    pub fn install_image(&mut self, ctx: &egui::Context, image: RgbaImage) {
        let (w, h) = image.dimensions();
        self.boxes.reset_for_image(w as f32, h as f32);
        self.base = Some(image);
        self.rendered = None;
        self.texture = None;
        self.dirty = true;
        self.status = Some(format!("Loaded {w}×{h}"));
        self.refresh(ctx);
    }

    /// Applies a canvas or panel action to the caption list.
    pub fn apply(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Select(id) => self.boxes.select(Some(id)),
            CanvasAction::ClearSelection => self.boxes.select(None),
            CanvasAction::Update(updated) => {
                if let Some(size) = self.image_size() {
                    self.boxes.update(updated, size.x, size.y);
                    self.dirty = true;
                }
            }
            CanvasAction::Delete(id) => {
                // Refusal of the last box is silent, not an error.
                if self.boxes.remove(id) {
                    self.dirty = true;
                }
            }
        }
    }

    pub fn add_box(&mut self) {
        if let Some(size) = self.image_size() {
            self.boxes.add(size.x, size.y);
            self.dirty = true;
        }
    }

    /// Recomposites and re-uploads the display texture if anything changed.
    /// A missing font leaves the state dirty so the next frame retries.
    pub fn refresh(&mut self, ctx: &egui::Context) {
        if !self.dirty {
            return;
        }
        match self.composite_now() {
            Ok(()) => {
                if let Some(rendered) = &self.rendered {
                    let size = [rendered.width() as usize, rendered.height() as usize];
                    let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rendered.as_raw());
                    self.texture =
                        Some(ctx.load_texture("composite", pixels, egui::TextureOptions::LINEAR));
                }
                self.dirty = false;
            }
            Err(EditorError::MeasurementUnavailable) => {
                tracing::debug!("font not ready, retrying composite next frame");
            }
            Err(e) => {
                self.status = Some(e.to_string());
                self.dirty = false;
            }
        }
    }

    fn composite_now(&mut self) -> Result<(), EditorError> {
        let Some(base) = &self.base else {
            return Ok(());
        };
        let font = self.font.as_ref().ok_or(EditorError::MeasurementUnavailable)?;
        self.rendered = Some(composite(base, self.boxes.boxes(), font));
        Ok(())
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    /// Last composited frame, exactly what an export writes.
    pub fn rendered(&self) -> Option<&RgbaImage> {
        self.rendered.as_ref()
    }

    /// Writes the composited buffer as a PNG at natural resolution.
    pub fn export_png(&mut self, path: &Path) -> Result<(), EditorError> {
        let rendered = self
            .rendered
            .as_ref()
            .ok_or_else(|| EditorError::Export("no image loaded".into()))?;
        rendered
            .save(path)
            .map_err(|e| EditorError::Export(e.to_string()))?;
        tracing::info!(path = %path.display(), "exported PNG");
        self.status = Some(format!("Exported {}", path.display()));
        Ok(())
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundled template images: a flat scan of the templates directory.
pub fn scan_templates(dir: &Path) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() {
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                if IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                    images.push(path.to_path_buf());
                }
            }
        }
    }
    images.sort();
    images
}
