use chrono::Duration;

use crate::engine::gesture::{MoveCommit, ResizeCommit};
use crate::engine::{GestureController, ViewState};
use crate::model::{Row, Task, TaskId, TaskPatch, TimelineStore};
use crate::ui;
use crate::ui::detail_panel::{DetailPanel, PanelAction};
use crate::ui::toolbar::ToolbarAction;

/// Main application state: the single owner of the store. All mutation
/// requests from the chart and the detail panel arrive as commit values
/// and are applied here.
pub struct TimelineApp {
    pub store: TimelineStore,
    pub view: ViewState,
    pub gestures: GestureController,
    detail: Option<DetailPanel>,
    status_message: String,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let store = Self::sample_store();
        let today = chrono::Local::now().date_naive();
        let mut view = ViewState::new(today);

        // Widen the window to cover the seeded tasks.
        let start = store.tasks().iter().map(|t| t.start).min();
        let end = store.tasks().iter().map(|t| t.end).max();
        if let (Some(start), Some(end)) = (start, end) {
            view.set_date_range(start - Duration::days(7), end + Duration::days(14));
        }

        Self {
            store,
            view,
            gestures: GestureController::new(),
            detail: None,
            status_message: "Ready".to_string(),
        }
    }

    /// Seed a small demo schedule.
    fn sample_store() -> TimelineStore {
        let today = chrono::Local::now().date_naive();
        let mut store = TimelineStore::new();

        let frontend = Row::new("Frontend Team");
        let backend = Row::new("Backend Team");
        let design = Row::new("Design Team");
        let qa = Row::new("QA Team");
        let (frontend_id, backend_id, design_id, qa_id) = (
            frontend.id.clone(),
            backend.id.clone(),
            design.id.clone(),
            qa.id.clone(),
        );
        store.add_row(frontend);
        store.add_row(backend);
        store.add_row(design);
        store.add_row(qa);

        let mut components = Task::new(
            "UI Component Development",
            today - Duration::days(10),
            today + Duration::days(4),
            frontend_id.clone(),
        );
        components.progress = 60;
        components.color = ui::theme::task_color(0);
        components.assignee = Some("Frontend Team".to_string());
        components.description = Some("Build reusable UI components for the dashboard".to_string());

        let mut api = Task::new(
            "API Development",
            today - Duration::days(10),
            today + Duration::days(3),
            backend_id.clone(),
        );
        api.progress = 80;
        api.color = ui::theme::task_color(1);
        api.assignee = Some("Backend Team".to_string());

        let mut schema = Task::new(
            "Database Schema",
            today + Duration::days(4),
            today + Duration::days(9),
            backend_id,
        );
        schema.color = ui::theme::task_color(1);

        let mut design_system = Task::new(
            "Design System Update",
            today - Duration::days(6),
            today + Duration::days(1),
            design_id,
        );
        design_system.progress = 100;
        design_system.color = ui::theme::task_color(2);

        let mut integration = Task::new(
            "Integration Testing",
            today + Duration::days(5),
            today + Duration::days(14),
            frontend_id,
        );
        integration.color = ui::theme::task_color(0);
        integration.description = Some("Test integration between frontend and backend".to_string());

        let mut release = Task::new(
            "Release Checklist",
            today + Duration::days(10),
            today + Duration::days(18),
            qa_id.clone(),
        );
        release.color = ui::theme::task_color(4);

        let launch = Task::new_milestone("Launch", today + Duration::days(21), qa_id);

        let components_id = components.id.clone();
        let api_id = api.id.clone();
        let integration_id = integration.id.clone();
        let release_id = release.id.clone();
        let launch_id = launch.id.clone();

        store.add_task(components);
        store.add_task(api);
        store.add_task(schema);
        store.add_task(design_system);
        store.add_task(integration);
        store.add_task(release);
        store.add_task(launch);

        // Seed edges are known-good; an error here is a programming bug in
        // the sample itself, so just log it.
        for (from, to) in [
            (&components_id, &integration_id),
            (&api_id, &integration_id),
            (&integration_id, &release_id),
            (&release_id, &launch_id),
        ] {
            if let Err(err) = store.add_dependency(from, to) {
                log::warn!("sample dependency rejected: {err}");
            }
        }

        store
    }

    // --- Commit handlers ---

    /// A completed drag changed a task's row and/or start date.
    fn on_task_move(&mut self, commit: MoveCommit) {
        let task_id = commit.task.clone();
        if self.store.apply_move(&commit) {
            log::debug!("task {} moved to {}", task_id, commit.new_start);
            self.refresh_detail();
            if let Some(task) = self.store.task(&task_id) {
                self.status_message = format!(
                    "Moved '{}' ({} - {})",
                    task.title,
                    task.start.format("%Y-%m-%d"),
                    task.end.format("%Y-%m-%d")
                );
            }
        }
    }

    /// A completed resize changed a task's date range.
    fn on_task_resize(&mut self, commit: ResizeCommit) {
        let task_id = commit.task.clone();
        if self.store.apply_resize(&commit) {
            log::debug!(
                "task {} resized to {} - {}",
                task_id,
                commit.new_start,
                commit.new_end
            );
            self.refresh_detail();
            if let Some(task) = self.store.task(&task_id) {
                self.status_message = format!(
                    "Resized '{}' ({} - {})",
                    task.title,
                    task.start.format("%Y-%m-%d"),
                    task.end.format("%Y-%m-%d")
                );
            }
        }
    }

    /// A detail-panel edit was saved.
    fn on_task_update(&mut self, id: TaskId, patch: TaskPatch) {
        if self.store.apply_patch(&id, &patch) {
            log::debug!("task {id} updated");
            self.refresh_detail();
            self.status_message = "Task updated".to_string();
        } else {
            self.status_message = "Update rejected".to_string();
        }
    }

    fn on_task_click(&mut self, id: TaskId) {
        if let Some(task) = self.store.task(&id) {
            log::debug!("task {id} selected");
            self.status_message = format!("Selected '{}'", task.title);
        }
    }

    fn on_task_delete(&mut self, id: TaskId) {
        let title = self.store.task(&id).map(|t| t.title.clone());
        if self.store.remove_task(&id) {
            if self.view.selected == Some(id) {
                self.view.select(None);
                self.detail = None;
            }
            self.status_message = match title {
                Some(title) => format!("Deleted '{title}'"),
                None => "Task deleted".to_string(),
            };
        }
    }

    fn add_task(&mut self) {
        let Some(row) = self.store.rows().first() else {
            self.status_message = "No rows to add a task to".to_string();
            return;
        };
        let row_id = row.id.clone();
        let today = chrono::Local::now().date_naive();
        let mut task = Task::new("New Task", today, today + Duration::days(7), row_id);
        task.color = ui::theme::task_color(self.store.tasks().len());
        let id = task.id.clone();
        self.store.add_task(task);
        self.view.select(Some(id));
        self.status_message = "Task added".to_string();
    }

    /// Rebuild the open draft from the store after an outside commit.
    fn refresh_detail(&mut self) {
        if let Some(panel) = &self.detail {
            self.detail = self.store.task(&panel.task).map(DetailPanel::for_task);
        }
    }

    /// Keep the panel in lockstep with the current selection.
    fn sync_detail_to_selection(&mut self) {
        match (&self.view.selected, &self.detail) {
            (Some(id), Some(panel)) if &panel.task == id => {}
            (Some(id), _) => {
                self.detail = self.store.task(id).map(DetailPanel::for_task);
            }
            (None, Some(_)) => self.detail = None,
            (None, None) => {}
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Text fields get first claim on the keyboard.
        if ctx.wants_keyboard_input() {
            return;
        }

        let (zoom_in, zoom_out, escape, delete) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals),
                i.key_pressed(egui::Key::Minus),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Delete),
            )
        });

        if zoom_in {
            self.view.zoom_in();
        }
        if zoom_out {
            self.view.zoom_out();
        }
        if escape {
            if !self.gestures.is_idle() {
                self.gestures.cancel();
                self.status_message = "Gesture cancelled".to_string();
            } else if self.view.selected.is_some() {
                self.view.select(None);
                self.detail = None;
            }
        }
        if delete {
            if let Some(id) = self.view.selected.clone() {
                self.on_task_delete(id);
            }
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        self.handle_keys(ctx);

        // Top panel: toolbar
        let mut toolbar_action = ToolbarAction::None;
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar_action = ui::toolbar::show_toolbar(&mut self.view, ui);
        });
        if toolbar_action == ToolbarAction::AddTask {
            self.add_task();
        }

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(10.5)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.store.tasks().len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(" · ")
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(format!("Scale: {}", self.view.mode.label()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Right panel: task details for the selection
        self.sync_detail_to_selection();
        let mut panel_action = PanelAction::None;
        if let Some(panel) = &mut self.detail {
            egui::SidePanel::right("detail_panel")
                .default_width(280.0)
                .min_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panel_action = ui::detail_panel::show_detail_panel(panel, &self.store, ui);
                });
        }
        match panel_action {
            PanelAction::None => {}
            PanelAction::Save(id, patch) => self.on_task_update(id, patch),
            PanelAction::AddDependency { from, to } => {
                match self.store.add_dependency(&from, &to) {
                    Ok(()) => {
                        self.status_message = "Dependency added".to_string();
                        self.refresh_detail();
                    }
                    Err(err) => {
                        self.status_message = err.to_string();
                        if let Some(panel) = &mut self.detail {
                            panel.error = Some(err.to_string());
                        }
                    }
                }
            }
            PanelAction::RemoveDependency { from, to } => {
                if self.store.remove_dependency(&from, &to) {
                    self.status_message = "Dependency removed".to_string();
                }
            }
            PanelAction::Delete(id) => self.on_task_delete(id),
            PanelAction::Close => {
                self.view.select(None);
                self.detail = None;
            }
        }

        // Central panel: the timeline chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let action = ui::timeline_view::show_timeline(
                &self.store,
                &mut self.view,
                &mut self.gestures,
                ui,
            );
            if let Some(commit) = action.moved {
                self.on_task_move(commit);
            }
            if let Some(commit) = action.resized {
                self.on_task_resize(commit);
            }
            if let Some(id) = action.clicked {
                self.on_task_click(id);
            }
        });
    }
}
