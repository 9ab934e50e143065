use egui::{RichText, Ui};

use crate::engine::view::{ScaleMode, ViewState};
use crate::ui::theme;

/// Requests the toolbar cannot satisfy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    AddTask,
}

/// Render the top toolbar: zoom ladder, scale selector, today, add-task.
pub fn show_toolbar(view: &mut ViewState, ui: &mut Ui) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Timeline")
                .strong()
                .size(14.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.separator();

        let zoom_out = ui.add_enabled(
            view.can_zoom_out(),
            egui::Button::new(egui_phosphor::regular::MAGNIFYING_GLASS_MINUS),
        );
        if zoom_out.on_hover_text("Zoom out (-)").clicked() {
            view.zoom_out();
        }
        let zoom_in = ui.add_enabled(
            view.can_zoom_in(),
            egui::Button::new(egui_phosphor::regular::MAGNIFYING_GLASS_PLUS),
        );
        if zoom_in.on_hover_text("Zoom in (+)").clicked() {
            view.zoom_in();
        }

        ui.separator();

        for mode in ScaleMode::ALL {
            let selected = view.mode == mode;
            if ui.selectable_label(selected, mode.label()).clicked() && !selected {
                view.set_mode(mode);
            }
        }

        ui.separator();

        if ui
            .button(format!("{} Today", egui_phosphor::regular::CALENDAR_BLANK))
            .clicked()
        {
            view.scroll_to_today();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(format!("{} Add Task", egui_phosphor::regular::PLUS))
                .clicked()
            {
                action = ToolbarAction::AddTask;
            }
        });
    });

    action
}
