use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::engine::geometry::{
    self, TaskPosition, HANDLE_WIDTH, HEADER_HEIGHT, ROW_HEIGHT,
};
use crate::engine::gesture::{GestureController, MoveCommit, ResizeCommit, ResizeEdge};
use crate::engine::graph::{self, DependencyLine, LinePath};
use crate::engine::view::ViewState;
use crate::format;
use crate::model::{Task, TaskId, TimelineStore};
use crate::ui::theme;

/// Result details from interactions in the timeline chart.
///
/// Commits are surfaced here instead of being applied in place; the app
/// routes them into the store.
#[derive(Debug, Clone, Default)]
pub struct ChartAction {
    pub moved: Option<MoveCommit>,
    pub resized: Option<ResizeCommit>,
    pub clicked: Option<TaskId>,
}

/// Render the timeline chart (central panel).
pub fn show_timeline(
    store: &TimelineStore,
    view: &mut ViewState,
    gestures: &mut GestureController,
    ui: &mut Ui,
) -> ChartAction {
    let mut action = ChartAction::default();
    let pixels_per_day = view.pixels_per_day();
    let origin_date = view.start;
    let available = ui.available_size();

    let timeline_px = geometry::timeline_width(view.start, view.end, pixels_per_day);
    let chart_width = (theme::ROW_LABEL_WIDTH + timeline_px).max(available.x);
    let row_count = store.rows().len();
    let chart_height = (HEADER_HEIGHT + row_count as f32 * ROW_HEIGHT + 40.0).max(available.y);

    // Ctrl+scroll steps the zoom ladder.
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            view.zoom_in();
        } else if scroll_delta.y < 0.0 {
            view.zoom_out();
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
            let origin = response.rect.min;
            // Timeline x = 0 sits just right of the row-label gutter.
            let gutter_x = origin.x + theme::ROW_LABEL_WIDTH;
            let rows_top = origin.y + HEADER_HEIGHT;
            let mut consumed_click = false;
            let mut hovered: Option<TaskId> = None;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_time_scale(&painter, origin, gutter_x, view, chart_width, chart_height);

            // Row bands and labels.
            for (i, row) in store.rows().iter().enumerate() {
                let y = rows_top + i as f32 * ROW_HEIGHT;
                if i % 2 == 0 {
                    painter.rect_filled(
                        Rect::from_min_size(
                            Pos2::new(origin.x, y),
                            Vec2::new(chart_width, ROW_HEIGHT),
                        ),
                        0.0,
                        theme::BG_ROW_EVEN,
                    );
                }
                painter.line_segment(
                    [
                        Pos2::new(origin.x, y + ROW_HEIGHT),
                        Pos2::new(origin.x + chart_width, y + ROW_HEIGHT),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );

                painter.text(
                    Pos2::new(origin.x + 12.0, y + ROW_HEIGHT / 2.0 - 8.0),
                    egui::Align2::LEFT_CENTER,
                    &row.label,
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );
                let count = row.tasks.len();
                painter.text(
                    Pos2::new(origin.x + 12.0, y + ROW_HEIGHT / 2.0 + 8.0),
                    egui::Align2::LEFT_CENTER,
                    if count == 1 {
                        "1 task".to_string()
                    } else {
                        format!("{count} tasks")
                    },
                    theme::font_small(),
                    theme::TEXT_DIM,
                );
            }

            // Gutter separator.
            painter.line_segment(
                [
                    Pos2::new(gutter_x, origin.y),
                    Pos2::new(gutter_x, origin.y + chart_height),
                ],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );

            // Everything date-positioned is clipped to the timeline area;
            // off-screen geometry is the caller's problem, so hide it here.
            let timeline_clip =
                Rect::from_min_max(Pos2::new(gutter_x, origin.y), response.rect.max);
            let timeline_painter = painter.with_clip_rect(timeline_clip);

            draw_today_line(
                &timeline_painter,
                gutter_x,
                origin.y,
                chart_height,
                origin_date,
                pixels_per_day,
            );

            // Dependency lines run underneath the bars.
            let positions = store.task_positions(origin_date, pixels_per_day);
            for line in graph::dependency_lines(store, &positions) {
                draw_dependency_line(&timeline_painter, gutter_x, rows_top, &line);
            }

            let pointer = ui.input(|i| i.pointer.latest_pos());

            // Task bars, row by row.
            for (row_index, row) in store.rows().iter().enumerate() {
                for task_id in &row.tasks {
                    let Some(task) = store.task(task_id) else {
                        continue;
                    };
                    let base =
                        geometry::task_position(task, origin_date, pixels_per_day, row_index);

                    // Live gesture preview overrides the committed position.
                    let mut pos = base;
                    if gestures.active_task() == Some(&task.id) {
                        if let Some(p) = pointer {
                            if let Some(preview) = gestures.update_drag(p.x, p.y) {
                                pos.left = preview.left;
                                pos.top = base.top + preview.delta_y;
                            } else if let Some(preview) = gestures.update_resize(p.x) {
                                pos.left = preview.left;
                                pos.width = preview.width;
                            }
                        }
                    }

                    let is_selected = view.selected.as_ref() == Some(&task.id);
                    let bar_rect = if task.is_milestone {
                        draw_milestone(
                            &timeline_painter,
                            gutter_x,
                            rows_top,
                            task,
                            &pos,
                            is_selected,
                        )
                    } else {
                        draw_task_bar(
                            &timeline_painter,
                            gutter_x,
                            rows_top,
                            task,
                            &pos,
                            is_selected,
                        )
                    };

                    let bar_response = ui.interact(
                        bar_rect,
                        ui.make_persistent_id(("task-bar", task.id.as_str())),
                        Sense::click_and_drag(),
                    );

                    if bar_response.clicked() {
                        view.select(Some(task.id.clone()));
                        action.clicked = Some(task.id.clone());
                        consumed_click = true;
                    }

                    if bar_response.drag_started_by(egui::PointerButton::Primary) {
                        let p = bar_response.interact_pointer_pos().unwrap_or_default();
                        gestures.start_drag(
                            task.id.clone(),
                            p.x,
                            p.y,
                            base.left,
                            row.id.clone(),
                        );
                        view.select(Some(task.id.clone()));
                        consumed_click = true;
                    }
                    if bar_response.dragged_by(egui::PointerButton::Primary) {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    }
                    if bar_response.drag_stopped_by(egui::PointerButton::Primary) {
                        let p = bar_response
                            .interact_pointer_pos()
                            .or(pointer)
                            .unwrap_or_default();
                        if let Some(commit) =
                            gestures.end_drag(p.x, p.y, origin_date, pixels_per_day, store.rows())
                        {
                            action.moved = Some(commit);
                        }
                    }

                    if !task.is_milestone {
                        handle_resize_edges(
                            ui,
                            gestures,
                            task,
                            &base,
                            bar_rect,
                            origin_date,
                            pixels_per_day,
                            pointer,
                            &mut action,
                        );
                    }

                    if bar_response.hovered() {
                        hovered = Some(task.id.clone());
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        show_task_tooltip(ui, task);
                    }
                }
            }

            // Empty click on background clears selection.
            if response.clicked() && !consumed_click {
                view.select(None);
            }
            view.hover(hovered);
        });

    action
}

/// Wire the two resize affordances on a task bar.
#[allow(clippy::too_many_arguments)]
fn handle_resize_edges(
    ui: &mut Ui,
    gestures: &mut GestureController,
    task: &Task,
    base: &TaskPosition,
    bar_rect: Rect,
    origin_date: NaiveDate,
    pixels_per_day: f32,
    pointer: Option<Pos2>,
    action: &mut ChartAction,
) {
    let edges = [
        (ResizeEdge::Left, bar_rect.left(), "task-resize-left"),
        (ResizeEdge::Right, bar_rect.right(), "task-resize-right"),
    ];
    for (edge, x, id_salt) in edges {
        let handle_rect = Rect::from_min_max(
            Pos2::new(x - HANDLE_WIDTH * 0.5, bar_rect.top()),
            Pos2::new(x + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
        );
        let response = ui.interact(
            handle_rect.expand2(Vec2::new(4.0, 0.0)),
            ui.make_persistent_id((id_salt, task.id.as_str())),
            Sense::drag(),
        );

        if response.hovered() || response.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        }
        if response.drag_started_by(egui::PointerButton::Primary) {
            let p = response.interact_pointer_pos().unwrap_or_default();
            gestures.start_resize(task.id.clone(), edge, p.x, base.width, base.left);
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            let p = response.interact_pointer_pos().or(pointer).unwrap_or_default();
            if let Some(commit) =
                gestures.end_resize(p.x, task.start, task.end, origin_date, pixels_per_day)
            {
                action.resized = Some(commit);
            }
        }
    }
}

fn draw_time_scale(
    painter: &egui::Painter,
    origin: Pos2,
    gutter_x: f32,
    view: &ViewState,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let scale = match geometry::generate_time_scale(
        view.start,
        view.end,
        view.mode,
        view.mode.pixels_per_unit(),
    ) {
        Ok(scale) => scale,
        Err(err) => {
            log::warn!("time scale generation failed: {err}");
            return;
        }
    };

    for item in &scale {
        let x = gutter_x + item.position;
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + 4.0, origin.y + HEADER_HEIGHT - 14.0),
            egui::Align2::LEFT_CENTER,
            &item.label,
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    gutter_x: f32,
    top: f32,
    height: f32,
    origin_date: NaiveDate,
    pixels_per_day: f32,
) {
    let x = gutter_x + geometry::today_x(origin_date, pixels_per_day);

    painter.line_segment(
        [
            Pos2::new(x, top + HEADER_HEIGHT),
            Pos2::new(x, top + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, top + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_dependency_line(
    painter: &egui::Painter,
    offset_x: f32,
    offset_y: f32,
    line: &DependencyLine,
) {
    let stroke = Stroke::new(1.5, theme::DEPENDENCY_LINE);
    let a = Pos2::new(offset_x + line.x1, offset_y + line.y1);
    let b = Pos2::new(offset_x + line.x2, offset_y + line.y2);

    match graph::line_path(line) {
        LinePath::Stepped { mid_x } => {
            let m1 = Pos2::new(offset_x + mid_x, a.y);
            let m2 = Pos2::new(offset_x + mid_x, b.y);
            painter.line_segment([a, m1], stroke);
            painter.line_segment([m1, m2], stroke);
            painter.line_segment([m2, b], stroke);
        }
        LinePath::Curved { control_offset } => {
            painter.add(egui::epaint::CubicBezierShape::from_points_stroke(
                [
                    a,
                    Pos2::new(a.x + control_offset, a.y),
                    Pos2::new(b.x - control_offset, b.y),
                    b,
                ],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }
    }

    // Arrowhead into the dependent task.
    painter.add(egui::Shape::convex_polygon(
        vec![
            b,
            b + Vec2::new(-6.0, -4.0),
            b + Vec2::new(-6.0, 4.0),
        ],
        theme::DEPENDENCY_LINE,
        Stroke::NONE,
    ));
}

fn draw_task_bar(
    painter: &egui::Painter,
    gutter_x: f32,
    rows_top: f32,
    task: &Task,
    pos: &TaskPosition,
    is_selected: bool,
) -> Rect {
    let bar_rect = Rect::from_min_size(
        Pos2::new(gutter_x + pos.left, rows_top + pos.top),
        Vec2::new(pos.width, pos.height),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow.
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, task.color);

    // Progress fill (darkened overlay) with a divider tick.
    if task.progress > 0 {
        let fraction = f32::from(task.progress.min(100)) / 100.0;
        let progress_width = pos.width * fraction;
        painter.rect_filled(
            Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, pos.height)),
            rounding,
            theme::PROGRESS_OVERLAY,
        );
        if task.progress < 100 {
            let tick_x = bar_rect.left() + progress_width;
            painter.line_segment(
                [
                    Pos2::new(tick_x, bar_rect.top() + 2.0),
                    Pos2::new(tick_x, bar_rect.bottom() - 2.0),
                ],
                Stroke::new(1.0, Color32::from_white_alpha(60)),
            );
        }
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Title, clipped to the bar.
    if pos.width > 30.0 {
        let galley =
            painter.layout_no_wrap(task.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect);
        let text_y = bar_rect.top() + (pos.height - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

fn draw_milestone(
    painter: &egui::Painter,
    gutter_x: f32,
    rows_top: f32,
    task: &Task,
    pos: &TaskPosition,
    is_selected: bool,
) -> Rect {
    let center = Pos2::new(gutter_x + pos.left, rows_top + pos.top + pos.height / 2.0);
    let size = pos.height / 2.0;

    let points = vec![
        Pos2::new(center.x, center.y - size),
        Pos2::new(center.x + size, center.y),
        Pos2::new(center.x, center.y + size),
        Pos2::new(center.x - size, center.y),
    ];
    painter.add(egui::Shape::convex_polygon(
        points.clone(),
        task.color,
        Stroke::NONE,
    ));

    if is_selected {
        painter.add(egui::Shape::convex_polygon(
            points,
            Color32::TRANSPARENT,
            Stroke::new(2.0, theme::BORDER_ACCENT),
        ));
    }

    painter.text(
        Pos2::new(center.x + size + 6.0, center.y),
        egui::Align2::LEFT_CENTER,
        &task.title,
        theme::font_bar(),
        theme::TEXT_SECONDARY,
    );

    Rect::from_center_size(center, Vec2::splat(size * 2.0 + 4.0))
}

fn show_task_tooltip(ui: &Ui, task: &Task) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("task-tip", task.id.as_str())),
        |ui| {
            ui.strong(&task.title);
            ui.label(format::format_date_range(task.start, task.end));
            ui.label(format!(
                "Duration: {}",
                format::format_duration(task.start, task.end)
            ));
            ui.label(format!(
                "Progress: {}",
                format::format_progress(task.progress)
            ));
            if let Some(assignee) = &task.assignee {
                ui.label(format!("Assignee: {assignee}"));
            }
        },
    );
}
