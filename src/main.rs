use std::collections::HashMap;
use std::path::PathBuf;

use eframe::egui;

mod bounds;
mod canvas;
mod compositor;
mod editor;
mod interaction;
mod loader;
mod metrics;
mod textbox;
mod viewport;

use editor::{EditorState, scan_templates};
use interaction::{CanvasAction, InteractionController};
use loader::{ImageLoader, ImageSource};
use textbox::{TextBox, color_from_hex, color_to_hex};

const TEMPLATE_DIR: &str = "assets/templates";

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("memka=info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("memka")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([720.0, 480.0])
            .with_app_id("memka"),
        ..Default::default()
    };

    eframe::run_native(
        "memka",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

struct App {
    editor: EditorState,
    loader: ImageLoader,
    controller: InteractionController,
    templates: Vec<PathBuf>,
    path_input: String,
    url_input: String,
    export_input: String,
    /// Per-box hex color entry buffers, keyed by box id.
    fill_hex: HashMap<u64, String>,
    border_hex: HashMap<u64, String>,
}

impl App {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self {
            editor: EditorState::new(),
            loader: ImageLoader::spawn(),
            controller: InteractionController::new(),
            templates: scan_templates(std::path::Path::new(TEMPLATE_DIR)),
            path_input: String::new(),
            url_input: String::new(),
            export_input: "meme.png".to_string(),
            fill_hex: HashMap::new(),
            border_hex: HashMap::new(),
        }
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("memka");
        ui.separator();

        ui.label("Image file");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.path_input);
            if ui.button("Load").clicked() && !self.path_input.trim().is_empty() {
                let source = ImageSource::Path(PathBuf::from(self.path_input.trim()));
                self.editor.request_image(&self.loader, source);
            }
        });

        ui.label("Image URL");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.url_input);
            if ui.button("Fetch").clicked() && !self.url_input.trim().is_empty() {
                let source = ImageSource::Url(self.url_input.trim().to_string());
                self.editor.request_image(&self.loader, source);
            }
        });

        if !self.templates.is_empty() {
            ui.separator();
            ui.label("Templates");
            let mut picked = None;
            ui.horizontal_wrapped(|ui| {
                for template in &self.templates {
                    let uri = format!("file://{}", template.display());
                    let thumb = egui::Image::from_uri(uri).max_size(egui::vec2(72.0, 72.0));
                    if ui.add(egui::ImageButton::new(thumb)).clicked() {
                        picked = Some(template.clone());
                    }
                }
            });
            if let Some(path) = picked {
                self.editor.request_image(&self.loader, ImageSource::Path(path));
            }
        }

        if self.editor.has_image() {
            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Text boxes");
                if ui.button("＋ Add").clicked() {
                    self.editor.add_box();
                }
            });
            self.text_box_controls(ui);

            ui.separator();
            ui.label("Export PNG");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.export_input);
                if ui.button("Save").clicked() {
                    let path = PathBuf::from(self.export_input.trim());
                    if let Err(e) = self.editor.export_png(&path) {
                        self.editor.set_status(e.to_string());
                    }
                }
            });
        }

        if let Some(status) = self.editor.status() {
            ui.separator();
            ui.weak(status.to_string());
        }
    }

    fn text_box_controls(&mut self, ui: &mut egui::Ui) {
        let image_size = self.editor.image_size().unwrap_or(egui::Vec2::ZERO);
        let can_delete = self.editor.boxes.boxes().len() > 1;
        let snapshot: Vec<TextBox> = self.editor.boxes.boxes().to_vec();
        self.fill_hex.retain(|id, _| snapshot.iter().any(|b| b.id == *id));
        self.border_hex.retain(|id, _| snapshot.iter().any(|b| b.id == *id));

        for text_box in snapshot {
            let selected = self.editor.boxes.selected_id() == Some(text_box.id);
            let mut edited = text_box.clone();
            let mut changed = false;

            ui.group(|ui| {
                ui.horizontal(|ui| {
                    let title = if selected { "Text box ✓" } else { "Text box" };
                    if ui.selectable_label(selected, title).clicked() {
                        self.editor.apply(CanvasAction::Select(text_box.id));
                    }
                    if ui
                        .add_enabled(can_delete, egui::Button::new("Delete"))
                        .clicked()
                    {
                        self.editor.apply(CanvasAction::Delete(text_box.id));
                    }
                });

                changed |= ui.text_edit_singleline(&mut edited.text).changed();
                changed |= ui
                    .add(
                        egui::Slider::new(
                            &mut edited.font_size,
                            textbox::FONT_SIZE_MIN..=textbox::FONT_SIZE_MAX,
                        )
                        .text("px"),
                    )
                    .changed();

                ui.horizontal(|ui| {
                    ui.label("Fill");
                    changed |= ui.color_edit_button_srgb(&mut edited.text_color).changed();
                    changed |= hex_field(ui, &mut self.fill_hex, text_box.id, &mut edited.text_color);
                });
                ui.horizontal(|ui| {
                    ui.label("Border");
                    changed |= ui.color_edit_button_srgb(&mut edited.border_color).changed();
                    changed |=
                        hex_field(ui, &mut self.border_hex, text_box.id, &mut edited.border_color);
                });

                ui.horizontal(|ui| {
                    ui.label("X");
                    changed |= ui
                        .add(egui::DragValue::new(&mut edited.x).range(0.0..=image_size.x))
                        .changed();
                    ui.label("Y");
                    changed |= ui
                        .add(egui::DragValue::new(&mut edited.y).range(0.0..=image_size.y))
                        .changed();
                });
            });

            if changed {
                self.editor.apply(CanvasAction::Update(edited));
            }
        }
    }
}

/// `#rrggbb` entry next to a color button. The buffer holds whatever the
/// user typed while the field has focus; once focus leaves it snaps back to
/// the canonical form of the current color.
fn hex_field(
    ui: &mut egui::Ui,
    buffers: &mut HashMap<u64, String>,
    id: u64,
    color: &mut [u8; 3],
) -> bool {
    let buf = buffers.entry(id).or_insert_with(|| color_to_hex(*color));
    let response = ui.add(egui::TextEdit::singleline(buf).desired_width(70.0));
    let mut changed = false;
    if response.changed() {
        if let Some(rgb) = color_from_hex(buf.trim()) {
            *color = rgb;
            changed = true;
        }
    }
    if !response.has_focus() {
        *buf = color_to_hex(*color);
    }
    changed
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in self.loader.poll_events() {
            self.editor.handle_event(ctx, event);
        }

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.sidebar(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::show(ui, &mut self.editor, &mut self.controller);
        });
    }
}
