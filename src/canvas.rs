//! The interactive canvas: paints the composited bitmap at the fitted scale,
//! draws the selection overlay, and feeds pointer/keyboard input to the
//! interaction controller.

use eframe::egui::{self, Align2, Color32, FontId, Rect, Stroke, pos2, vec2};

use crate::bounds::text_bounds;
use crate::editor::EditorState;
use crate::interaction::{InteractionController, ResizeGrab};
use crate::metrics::MemeFont;
use crate::viewport::Viewport;

const CANVAS_MARGIN: f32 = 16.0;
const HANDLE_SIZE: f32 = 9.0;
/// Pointer slack around the SE handle.
const HANDLE_GRAB_SIZE: f32 = 14.0;

pub fn show(ui: &mut egui::Ui, editor: &mut EditorState, controller: &mut InteractionController) {
    let Some(font) = editor.font().cloned() else {
        // Font parse failed this frame; it will be retried on the next one.
        ui.centered_and_justified(|ui| ui.spinner());
        return;
    };
    let Some(natural) = editor.image_size() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a template or load an image to get started")
        });
        return;
    };

    let avail = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(avail, egui::Sense::click_and_drag());
    let vp = Viewport::fit(natural, rect.shrink(CANVAS_MARGIN));

    handle_pointer(ui, editor, controller, &font, &vp, rect);
    handle_wheel(ui, editor, controller, &response);
    handle_keys(ui, editor, controller);

    // Compositing happens after input so this frame shows the new state.
    editor.refresh(ui.ctx());

    let painter = ui.painter_at(rect);
    if let Some(texture) = editor.texture() {
        painter.image(
            texture.id(),
            vp.screen_rect(natural),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    if let Some(sel_rect) = selection_rect(editor, &font, &vp) {
        paint_selection(&painter, sel_rect);
        painter.text(
            rect.center_bottom() - vec2(0.0, 6.0),
            Align2::CENTER_BOTTOM,
            "Ctrl + scroll adjusts text size · Delete removes the box",
            FontId::proportional(13.0),
            ui.visuals().weak_text_color(),
        );
    }
}

/// Screen-space rectangle of the selected box's interaction bounds.
fn selection_rect(editor: &EditorState, font: &MemeFont, vp: &Viewport) -> Option<Rect> {
    let selected = editor.boxes.selected()?;
    let bounds = text_bounds(selected, font)?;
    Some(Rect::from_min_max(
        vp.to_screen(pos2(bounds.left, bounds.top)),
        vp.to_screen(pos2(bounds.right, bounds.bottom)),
    ))
}

fn handle_pointer(
    ui: &egui::Ui,
    editor: &mut EditorState,
    controller: &mut InteractionController,
    font: &MemeFont,
    vp: &Viewport,
    rect: Rect,
) {
    let pointer = ui.input(|i| i.pointer.interact_pos());
    let pressed = ui.input(|i| i.pointer.primary_pressed());
    let released = ui.input(|i| i.pointer.primary_released());

    if pressed {
        if let Some(p) = pointer.filter(|p| rect.contains(*p)) {
            let handle = grabbed_handle(editor, font, vp, p);
            let action = controller.pointer_down(vp.to_image(p), p, handle, &editor.boxes, font);
            if let Some(action) = action {
                editor.apply(action);
            }
        }
    } else if controller.is_active() {
        match pointer {
            Some(p) if rect.contains(p) => {
                let action =
                    controller.pointer_move(vp.to_image(p), p, vp.scale, natural_of(editor), &editor.boxes);
                if let Some(action) = action {
                    editor.apply(action);
                }
            }
            // Losing the pointer mid-gesture is a forced release.
            _ => controller.pointer_left(),
        }
    }

    if released {
        controller.pointer_up();
    }
}

fn natural_of(editor: &EditorState) -> egui::Vec2 {
    editor.image_size().unwrap_or(egui::Vec2::ZERO)
}

/// SE corner handle hit, in display space.
fn grabbed_handle(
    editor: &EditorState,
    font: &MemeFont,
    vp: &Viewport,
    pointer: egui::Pos2,
) -> Option<ResizeGrab> {
    let selected = editor.boxes.selected()?;
    let sel_rect = selection_rect(editor, font, vp)?;
    let grab_rect = Rect::from_center_size(sel_rect.max, vec2(HANDLE_GRAB_SIZE, HANDLE_GRAB_SIZE));
    grab_rect.contains(pointer).then(|| ResizeGrab {
        id: selected.id,
        display_w: sel_rect.width(),
        display_h: sel_rect.height(),
    })
}

fn handle_wheel(
    ui: &egui::Ui,
    editor: &mut EditorState,
    controller: &InteractionController,
    response: &egui::Response,
) {
    if !response.hovered() {
        return;
    }
    let (scroll_y, modifier) = ui.input(|i| (i.raw_scroll_delta.y, i.modifiers.command));
    if let Some(action) = controller.wheel(scroll_y, modifier, &editor.boxes) {
        editor.apply(action);
    }
}

fn handle_keys(ui: &egui::Ui, editor: &mut EditorState, controller: &InteractionController) {
    // Ignore Delete/Backspace while a text field has focus.
    let typing = ui.ctx().memory(|m| m.focused().is_some());
    if typing {
        return;
    }
    let delete = ui.input(|i| {
        i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
    });
    if delete {
        if let Some(action) = controller.delete_key(&editor.boxes) {
            editor.apply(action);
        }
    }
}

fn paint_selection(painter: &egui::Painter, sel_rect: Rect) {
    painter.rect_stroke(
        sel_rect,
        egui::Rounding::ZERO,
        Stroke::new(1.5, Color32::from_rgb(0x4d, 0x9f, 0xff)),
    );
    for corner in [
        sel_rect.min,
        pos2(sel_rect.max.x, sel_rect.min.y),
        pos2(sel_rect.min.x, sel_rect.max.y),
        sel_rect.max,
    ] {
        let handle = Rect::from_center_size(corner, vec2(HANDLE_SIZE, HANDLE_SIZE));
        painter.rect_filled(handle, egui::Rounding::ZERO, Color32::WHITE);
        painter.rect_stroke(
            handle,
            egui::Rounding::ZERO,
            Stroke::new(1.0, Color32::from_rgb(0x4d, 0x9f, 0xff)),
        );
    }
}
