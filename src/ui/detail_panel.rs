use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::engine::validate;
use crate::format;
use crate::model::{Task, TaskId, TaskPatch, TimelineStore};
use crate::ui::theme;

/// Actions the detail panel can request. Nothing is applied in place; the
/// app owns the store and routes these.
pub enum PanelAction {
    None,
    Save(TaskId, TaskPatch),
    AddDependency { from: TaskId, to: TaskId },
    RemoveDependency { from: TaskId, to: TaskId },
    Delete(TaskId),
    Close,
}

/// Editing state for the selected task: a draft copy that only reaches the
/// store when the user saves.
pub struct DetailPanel {
    pub task: TaskId,
    title: String,
    start: NaiveDate,
    end: NaiveDate,
    progress: u8,
    is_milestone: bool,
    color: Color32,
    assignee: String,
    description: String,
    dependency_candidate: Option<TaskId>,
    /// Validation feedback surfaced under the form.
    pub error: Option<String>,
}

impl DetailPanel {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task: task.id.clone(),
            title: task.title.clone(),
            start: task.start,
            end: task.end,
            progress: task.progress,
            is_milestone: task.is_milestone,
            color: task.color,
            assignee: task.assignee.clone().unwrap_or_default(),
            description: task.description.clone().unwrap_or_default(),
            dependency_candidate: None,
            error: None,
        }
    }

    fn patch(&self) -> TaskPatch {
        let assignee = {
            let trimmed = self.assignee.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        let description = {
            let trimmed = self.description.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        TaskPatch {
            title: Some(validate::sanitize_title(&self.title)),
            start: Some(self.start),
            end: Some(self.end),
            progress: Some(self.progress),
            is_milestone: Some(self.is_milestone),
            color: Some(self.color),
            assignee: Some(assignee),
            description: Some(description),
        }
    }
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(10.0)
            .color(theme::TEXT_DIM)
            .strong(),
    );
}

/// Render the detail editor for the selected task.
pub fn show_detail_panel(
    panel: &mut DetailPanel,
    store: &TimelineStore,
    ui: &mut Ui,
) -> PanelAction {
    let mut action = PanelAction::None;

    let Some(task) = store.task(&panel.task) else {
        // Selection went stale (deleted elsewhere).
        return PanelAction::Close;
    };

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Task Details")
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(egui_phosphor::regular::X)
                .on_hover_text("Close (Esc)")
                .clicked()
            {
                action = PanelAction::Close;
            }
        });
    });
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(6.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        field_label(ui, "Title");
        ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut panel.title)
                .font(egui::FontId::proportional(12.0))
                .text_color(theme::TEXT_PRIMARY),
        );

        ui.add_space(2.0);

        field_label(ui, "Dates");
        ui.horizontal(|ui| {
            ui.add(DatePickerButton::new(&mut panel.start).id_salt("detail-start"));
            ui.label(RichText::new("to").color(theme::TEXT_DIM));
            ui.add(DatePickerButton::new(&mut panel.end).id_salt("detail-end"));
        });
        ui.label(
            RichText::new(format::format_duration(panel.start, panel.end))
                .size(10.0)
                .color(theme::TEXT_DIM),
        );

        ui.add_space(2.0);

        field_label(ui, "Progress");
        ui.add(egui::Slider::new(&mut panel.progress, 0..=100).suffix("%"));

        ui.horizontal(|ui| {
            ui.checkbox(&mut panel.is_milestone, "Milestone");
            ui.color_edit_button_srgba(&mut panel.color);
        });

        ui.add_space(2.0);

        field_label(ui, "Assignee");
        ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut panel.assignee),
        );

        field_label(ui, "Description");
        ui.add_sized(
            [ui.available_width(), 60.0],
            egui::TextEdit::multiline(&mut panel.description),
        );

        ui.add_space(4.0);

        show_dependencies(panel, task, store, ui, &mut action);

        if let Some(error) = &panel.error {
            ui.add_space(2.0);
            ui.label(
                RichText::new(error)
                    .size(10.5)
                    .color(theme::TODAY_LINE),
            );
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let save = ui.button(format!(
                "{} Save Changes",
                egui_phosphor::regular::FLOPPY_DISK
            ));
            if save.clicked() {
                if panel.title.trim().is_empty() {
                    panel.error = Some(validate::ValidationError::EmptyTitle.to_string());
                } else if panel.start > panel.end {
                    panel.error = Some(validate::ValidationError::StartAfterEnd.to_string());
                } else {
                    panel.error = None;
                    action = PanelAction::Save(panel.task.clone(), panel.patch());
                }
            }
            if ui
                .button(
                    RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                        .color(theme::TODAY_LINE),
                )
                .clicked()
            {
                action = PanelAction::Delete(panel.task.clone());
            }
        });
    });

    action
}

fn show_dependencies(
    panel: &mut DetailPanel,
    task: &Task,
    store: &TimelineStore,
    ui: &mut Ui,
    action: &mut PanelAction,
) {
    field_label(ui, "Depends on");

    if task.dependencies.is_empty() {
        ui.label(
            RichText::new("No dependencies")
                .size(10.5)
                .color(theme::TEXT_DIM),
        );
    }
    for dep in &task.dependencies {
        let label = store
            .task(dep)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| dep.to_string());
        ui.horizontal(|ui| {
            ui.label(RichText::new(format::truncate(&label, 28)).size(11.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .small_button(egui_phosphor::regular::X)
                    .on_hover_text("Remove dependency")
                    .clicked()
                {
                    *action = PanelAction::RemoveDependency {
                        from: dep.clone(),
                        to: task.id.clone(),
                    };
                }
            });
        });
    }

    // Picker over every other task; full edge validation happens when the
    // app applies the action.
    ui.horizontal(|ui| {
        let selected_label = panel
            .dependency_candidate
            .as_ref()
            .and_then(|id| store.task(id))
            .map(|t| format::truncate(&t.title, 22))
            .unwrap_or_else(|| "Select task...".to_string());
        egui::ComboBox::from_id_salt("dependency-picker")
            .selected_text(RichText::new(selected_label).size(11.0))
            .width(ui.available_width() - 60.0)
            .show_ui(ui, |ui| {
                for candidate in store.tasks() {
                    if candidate.id == task.id {
                        continue;
                    }
                    ui.selectable_value(
                        &mut panel.dependency_candidate,
                        Some(candidate.id.clone()),
                        &candidate.title,
                    );
                }
            });
        if ui.button("Add").clicked() {
            if let Some(from) = panel.dependency_candidate.clone() {
                *action = PanelAction::AddDependency {
                    from,
                    to: task.id.clone(),
                };
            }
        }
    });
}
