//! Pointer/keyboard gesture state machine for the canvas.
//!
//! The controller is pure state: it never touches the text-box list
//! directly, it only emits [`CanvasAction`]s for the list owner to apply.
//! One gesture is live at a time; pointer-up or the pointer leaving the
//! canvas always returns to idle.

use eframe::egui::{Pos2, Vec2, vec2};

use crate::bounds::hit_test;
use crate::metrics::MemeFont;
use crate::textbox::{MIN_BOX_HEIGHT, MIN_BOX_WIDTH, TextBox, TextBoxList, clamp_font_size};

/// Font size change per discrete ctrl-wheel step.
const WHEEL_STEP: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    Select(u64),
    ClearSelection,
    /// Id-preserving replacement of one box.
    Update(TextBox),
    Delete(u64),
}

/// Display-space grab of the selected box's SE resize handle, resolved by
/// the canvas before the pointer-down reaches the controller.
#[derive(Debug, Clone, Copy)]
pub struct ResizeGrab {
    pub id: u64,
    pub display_w: f32,
    pub display_h: f32,
}

#[derive(Clone, Copy)]
enum Gesture {
    Idle,
    Dragging {
        id: u64,
        /// Pointer image-coordinate minus the box anchor at grab time.
        grab: Vec2,
    },
    Resizing {
        id: u64,
        start_screen: Pos2,
        start_w: f32,
        start_h: f32,
    },
}

pub struct InteractionController {
    gesture: Gesture,
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Pointer-down: a handle grab starts a resize; otherwise the topmost box
    /// under the pointer is selected and a drag begins; empty canvas clears
    /// the selection. Selection alone never changes box values.
    pub fn pointer_down(
        &mut self,
        image: Pos2,
        screen: Pos2,
        handle: Option<ResizeGrab>,
        list: &TextBoxList,
        font: &MemeFont,
    ) -> Option<CanvasAction> {
        if let Some(grab) = handle {
            self.gesture = Gesture::Resizing {
                id: grab.id,
                start_screen: screen,
                start_w: grab.display_w,
                start_h: grab.display_h,
            };
            return None;
        }
        match hit_test(list.boxes(), font, image.x, image.y) {
            Some(hit) => {
                self.gesture = Gesture::Dragging {
                    id: hit.id,
                    grab: vec2(image.x - hit.x, image.y - hit.y),
                };
                Some(CanvasAction::Select(hit.id))
            }
            None => {
                self.gesture = Gesture::Idle;
                Some(CanvasAction::ClearSelection)
            }
        }
    }

    /// Pointer-move while a gesture is live. Drags clamp the anchor to the
    /// image; resizes enforce the image-space minimum and nothing else.
    pub fn pointer_move(
        &mut self,
        image: Pos2,
        screen: Pos2,
        scale: f32,
        image_size: Vec2,
        list: &TextBoxList,
    ) -> Option<CanvasAction> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging { id, grab } => {
                let mut updated = list.get(id)?.clone();
                updated.x = (image.x - grab.x).clamp(0.0, image_size.x);
                updated.y = (image.y - grab.y).clamp(0.0, image_size.y);
                Some(CanvasAction::Update(updated))
            }
            Gesture::Resizing {
                id,
                start_screen,
                start_w,
                start_h,
            } => {
                let mut updated = list.get(id)?.clone();
                let dx = screen.x - start_screen.x;
                let dy = screen.y - start_screen.y;
                updated.width = Some(((start_w + dx) / scale).max(MIN_BOX_WIDTH));
                updated.height = Some(((start_h + dy) / scale).max(MIN_BOX_HEIGHT));
                Some(CanvasAction::Update(updated))
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// The pointer leaving the interactive surface is a forced release, so a
    /// drag can never outlive contact.
    pub fn pointer_left(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Ctrl + wheel adjusts the selected box's font size by ±2 per step,
    /// clamped to the legal range. Returns `None` when the gesture does not
    /// apply (no modifier, no selection, zero delta).
    pub fn wheel(&self, scroll_y: f32, ctrl_held: bool, list: &TextBoxList) -> Option<CanvasAction> {
        if !ctrl_held || scroll_y == 0.0 {
            return None;
        }
        let mut updated = list.selected()?.clone();
        let step = if scroll_y > 0.0 { WHEEL_STEP } else { -WHEEL_STEP };
        let next = (updated.font_size as i32 + step).max(0) as u32;
        updated.font_size = clamp_font_size(next);
        Some(CanvasAction::Update(updated))
    }

    /// Delete/Backspace with a selection requests deletion; the list owner
    /// still refuses to drop the last remaining box.
    pub fn delete_key(&self, list: &TextBoxList) -> Option<CanvasAction> {
        list.selected_id().map(CanvasAction::Delete)
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    const IMAGE: Vec2 = vec2(800.0, 600.0);

    fn font() -> MemeFont {
        MemeFont::embedded().unwrap()
    }

    fn list_with(texts: &[(&str, f32, f32)]) -> TextBoxList {
        let mut list = TextBoxList::new();
        // Fill the seed box first, then append the rest.
        for (i, (text, x, y)) in texts.iter().enumerate() {
            let id = if i == 0 {
                list.boxes()[0].id
            } else {
                list.add(IMAGE.x, IMAGE.y)
            };
            let mut b = list.get(id).unwrap().clone();
            b.text = text.to_string();
            b.x = *x;
            b.y = *y;
            list.update(b, IMAGE.x, IMAGE.y);
        }
        list.select(None);
        list
    }

    fn apply(list: &mut TextBoxList, action: CanvasAction) {
        match action {
            CanvasAction::Select(id) => list.select(Some(id)),
            CanvasAction::ClearSelection => list.select(None),
            CanvasAction::Update(b) => list.update(b, IMAGE.x, IMAGE.y),
            CanvasAction::Delete(id) => {
                list.remove(id);
            }
        }
    }

    #[test]
    fn overlapping_boxes_select_the_topmost() {
        let font = font();
        let list = list_with(&[("UNDER", 400.0, 150.0), ("OVER", 400.0, 150.0)]);
        let over = list.boxes()[1].id;
        let mut ctl = InteractionController::new();
        let action = ctl
            .pointer_down(pos2(400.0, 150.0), pos2(0.0, 0.0), None, &list, &font)
            .unwrap();
        assert_eq!(action, CanvasAction::Select(over));
        assert!(ctl.is_active());
    }

    #[test]
    fn empty_canvas_click_clears_selection_only() {
        let font = font();
        let mut list = list_with(&[("HELLO", 400.0, 150.0)]);
        list.select(Some(list.boxes()[0].id));
        let before = list.boxes().to_vec();
        let mut ctl = InteractionController::new();
        let action = ctl
            .pointer_down(pos2(790.0, 590.0), pos2(0.0, 0.0), None, &list, &font)
            .unwrap();
        assert_eq!(action, CanvasAction::ClearSelection);
        assert!(!ctl.is_active());
        apply(&mut list, action);
        assert_eq!(list.boxes(), &before[..]);
    }

    #[test]
    fn drag_preserves_grab_offset_and_clamps() {
        let font = font();
        let mut list = list_with(&[("HELLO", 400.0, 150.0)]);
        let id = list.boxes()[0].id;
        let mut ctl = InteractionController::new();
        // Grab 5px right of the anchor.
        ctl.pointer_down(pos2(405.0, 150.0), pos2(405.0, 150.0), None, &list, &font);

        let action = ctl
            .pointer_move(pos2(505.0, 250.0), pos2(505.0, 250.0), 1.0, IMAGE, &list)
            .unwrap();
        match &action {
            CanvasAction::Update(b) => {
                assert_eq!(b.id, id);
                assert_eq!((b.x, b.y), (500.0, 250.0));
            }
            other => panic!("expected update, got {other:?}"),
        }
        apply(&mut list, action);

        // Dragging far out of bounds pins the anchor to the image edge.
        let action = ctl
            .pointer_move(
                pos2(-5000.0, 9000.0),
                pos2(-5000.0, 9000.0),
                1.0,
                IMAGE,
                &list,
            )
            .unwrap();
        apply(&mut list, action);
        let b = list.get(id).unwrap();
        assert_eq!((b.x, b.y), (0.0, 600.0));
    }

    #[test]
    fn pointer_leave_forcibly_ends_the_drag() {
        let font = font();
        let list = list_with(&[("HELLO", 400.0, 150.0)]);
        let mut ctl = InteractionController::new();
        ctl.pointer_down(pos2(400.0, 150.0), pos2(400.0, 150.0), None, &list, &font);
        assert!(ctl.is_active());
        ctl.pointer_left();
        assert!(!ctl.is_active());
        assert!(
            ctl.pointer_move(pos2(10.0, 10.0), pos2(10.0, 10.0), 1.0, IMAGE, &list)
                .is_none()
        );
    }

    #[test]
    fn resize_divides_by_scale_and_enforces_minimums() {
        let font = font();
        let list = list_with(&[("HELLO", 400.0, 150.0)]);
        let id = list.boxes()[0].id;
        let mut ctl = InteractionController::new();
        let grab = ResizeGrab {
            id,
            display_w: 100.0,
            display_h: 40.0,
        };
        ctl.pointer_down(pos2(400.0, 150.0), pos2(220.0, 95.0), Some(grab), &list, &font);

        let action = ctl
            .pointer_move(pos2(0.0, 0.0), pos2(270.0, 115.0), 0.5, IMAGE, &list)
            .unwrap();
        match action {
            CanvasAction::Update(b) => {
                // (100 + 50) / 0.5 and (40 + 20) / 0.5
                assert_eq!(b.width, Some(300.0));
                assert_eq!(b.height, Some(120.0));
            }
            other => panic!("expected update, got {other:?}"),
        }

        // Shrinking below the minimum pins to 50x30 image-space.
        let action = ctl
            .pointer_move(pos2(0.0, 0.0), pos2(-400.0, -400.0), 0.5, IMAGE, &list)
            .unwrap();
        match action {
            CanvasAction::Update(b) => {
                assert_eq!(b.width, Some(MIN_BOX_WIDTH));
                assert_eq!(b.height, Some(MIN_BOX_HEIGHT));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn wheel_steps_stay_inside_the_font_range() {
        let font = font();
        let mut list = list_with(&[("HELLO", 400.0, 150.0)]);
        let id = list.boxes()[0].id;
        list.select(Some(id));
        let ctl = InteractionController::new();

        for _ in 0..200 {
            if let Some(a) = ctl.wheel(1.0, true, &list) {
                apply(&mut list, a);
            }
        }
        assert_eq!(list.get(id).unwrap().font_size, 100);

        for _ in 0..200 {
            if let Some(a) = ctl.wheel(-1.0, true, &list) {
                apply(&mut list, a);
            }
        }
        assert_eq!(list.get(id).unwrap().font_size, 12);
    }

    #[test]
    fn wheel_requires_modifier_and_selection() {
        let mut list = list_with(&[("HELLO", 400.0, 150.0)]);
        let ctl = InteractionController::new();
        assert!(ctl.wheel(1.0, true, &list).is_none(), "no selection");
        list.select(Some(list.boxes()[0].id));
        assert!(ctl.wheel(1.0, false, &list).is_none(), "no modifier");
        assert!(ctl.wheel(0.0, true, &list).is_none(), "no delta");
    }

    #[test]
    fn delete_key_targets_the_selection() {
        let mut list = list_with(&[("A", 100.0, 100.0), ("B", 200.0, 200.0)]);
        let b = list.boxes()[1].id;
        list.select(Some(b));
        let ctl = InteractionController::new();
        let action = ctl.delete_key(&list).unwrap();
        assert_eq!(action, CanvasAction::Delete(b));
        apply(&mut list, action);
        assert_eq!(list.boxes().len(), 1);

        // With nothing selected the key does nothing.
        assert!(ctl.delete_key(&list).is_none());
    }
}
