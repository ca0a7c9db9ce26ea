use chrono::{Datelike, NaiveDate};
use egui::{Align2, Color32, CursorIcon, Id, Pos2, Rect, Response, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use tracing::debug;

use taskline::layout::{find_overlapping, group_overlapping, timeline_height};
use taskline::{
    GestureKind, InteractionController, MilestoneList, ResizeHandle, Task, TaskList, TimeScale,
    TimelineViewport, ViewMode,
};

use crate::ui::theme;

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

/// Result details from interactions in the timeline chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// A gesture was committed to the task list.
    pub changed: bool,
    pub edit_task: Option<String>,
    /// Start of the week whose header cell was clicked.
    pub milestone_week: Option<NaiveDate>,
}

/// Chart-local pointer x where the active move began.
fn move_origin_id() -> Id {
    Id::new("timeline-move-origin")
}

/// Render the timeline chart (central panel).
pub fn show_timeline_chart(
    tasks: &mut TaskList,
    milestones: &MilestoneList,
    viewport: &TimelineViewport,
    controller: &mut InteractionController,
    selected_task: &mut Option<String>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let config = viewport.grid().config().clone();
    let snapshot = tasks.tasks();
    let available = ui.available_size();
    let chart_width = viewport.total_width().max(available.x);
    let lanes_height = timeline_height(&snapshot, &config);
    let chart_height = (HEADER_HEIGHT + lanes_height + 40.0).max(available.y);

    if controller.active().is_some() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        controller.cancel();
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
            let origin = response.rect.min;
            let lanes_top = origin.y + HEADER_HEIGHT;
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_lanes(&painter, origin, chart_width, lanes_height, config.lane_height());
            draw_header(&painter, origin, viewport, chart_width, chart_height);
            draw_milestones(&painter, origin, viewport, milestones, chart_height);
            draw_today_line(&painter, origin, viewport, chart_height);
            draw_overlap_bands(&painter, Pos2::new(origin.x, lanes_top), viewport, &snapshot);

            let header_response = ui.interact(
                Rect::from_min_size(origin, Vec2::new(chart_width, HEADER_HEIGHT)),
                ui.make_persistent_id("timeline-header"),
                Sense::click(),
            );
            if header_response.clicked() {
                if let Some(pos) = header_response.interact_pointer_pos() {
                    let date = viewport.x_to_date(pos.x - origin.x);
                    interaction.milestone_week = Some(viewport.grid().week().unit_start(date));
                    consumed_click = true;
                }
            }

            // Feed the latest pointer sample to the active gesture before drawing.
            let pointer_x = ui
                .input(|i| i.pointer.latest_pos())
                .map(|pos| pos.x - origin.x);
            if let (Some(GestureKind::Resize), Some(x)) = (controller.active(), pointer_x) {
                controller.pointer_moved(x);
            }
            let resize_preview = controller.resize_preview(viewport);
            let move_dx = match (controller.active(), pointer_x) {
                (Some(GestureKind::Move), Some(x)) => ui
                    .ctx()
                    .data_mut(|data| data.get_temp::<f32>(move_origin_id()))
                    .map(|start_x| x - start_x),
                _ => None,
            };

            if snapshot.is_empty() {
                painter.text(
                    Pos2::new(origin.x + 16.0, lanes_top + config.lane_height() / 2.0),
                    Align2::LEFT_CENTER,
                    "No tasks yet. Use Task → Add Task to create one.",
                    theme::font_bar(),
                    theme::TEXT_DIM,
                );
            }

            let to_screen = |task: &Task| {
                let rect = viewport
                    .grid()
                    .task_rect(viewport.mode(), viewport.anchor(), task);
                Rect::from_min_size(
                    Pos2::new(origin.x + rect.left, lanes_top + rect.top),
                    Vec2::new(rect.width.max(6.0), rect.height),
                )
            };

            for task in snapshot.iter() {
                let bar_rect = to_screen(task);
                let is_selected = selected_task.as_deref() == Some(task.id.as_str());
                let is_active = controller.active_task_id() == Some(task.id.as_str());

                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("task-bar", &task.id)),
                    Sense::click_and_drag(),
                );
                let left_response = ui.interact(
                    handle_rect(bar_rect, ResizeHandle::Start),
                    ui.make_persistent_id(("task-resize-start", &task.id)),
                    Sense::drag(),
                );
                let right_response = ui.interact(
                    handle_rect(bar_rect, ResizeHandle::End),
                    ui.make_persistent_id(("task-resize-end", &task.id)),
                    Sense::drag(),
                );

                // Preview geometry for the task under the active gesture.
                if is_active {
                    match (controller.active(), &resize_preview, move_dx) {
                        (Some(GestureKind::Resize), Some(preview), _) => {
                            let candidate = task.rescheduled(
                                viewport.grid(),
                                preview.new_start,
                                preview.duration_weeks,
                            );
                            draw_task_bar(&painter, bar_rect, task, false, true);
                            draw_task_bar(&painter, to_screen(&candidate), task, true, false);
                        }
                        (Some(GestureKind::Move), _, Some(dx)) => {
                            if let Some(start) = controller.move_preview(dx, viewport) {
                                let candidate =
                                    task.rescheduled(viewport.grid(), start, task.duration_weeks());
                                painter.rect_stroke(
                                    to_screen(&candidate),
                                    Rounding::same(theme::BAR_ROUNDING),
                                    Stroke::new(1.5, theme::SNAP_OUTLINE),
                                );
                            }
                            draw_task_bar(&painter, bar_rect.translate(Vec2::new(dx, 0.0)), task, true, false);
                        }
                        _ => draw_task_bar(&painter, bar_rect, task, true, false),
                    }
                } else {
                    draw_task_bar(&painter, bar_rect, task, is_selected, false);
                }

                if bar_response.clicked() {
                    *selected_task = Some(task.id.clone());
                    consumed_click = true;
                }
                if bar_response.double_clicked() {
                    interaction.edit_task = Some(task.id.clone());
                }

                if left_response.drag_started() {
                    begin_resize(controller, task, ResizeHandle::Start, &left_response, origin);
                } else if right_response.drag_started() {
                    begin_resize(controller, task, ResizeHandle::End, &right_response, origin);
                } else if bar_response.drag_started() {
                    match controller.begin_move(task) {
                        Ok(()) => {
                            let start_x = local_x(&bar_response, ui, origin).unwrap_or(0.0);
                            ui.ctx()
                                .data_mut(|data| data.insert_temp(move_origin_id(), start_x));
                        }
                        Err(e) => debug!(error = %e, "move ignored"),
                    }
                }
                if bar_response.drag_started()
                    || left_response.drag_started()
                    || right_response.drag_started()
                {
                    *selected_task = Some(task.id.clone());
                    consumed_click = true;
                }

                if left_response.dragged() || right_response.dragged() {
                    ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
                } else if bar_response.dragged() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
                }

                let stopped_handle = [&left_response, &right_response]
                    .into_iter()
                    .find(|r| r.drag_stopped());
                if let Some(handle_response) = stopped_handle {
                    if is_active && controller.active() == Some(GestureKind::Resize) {
                        match local_x(handle_response, ui, origin) {
                            Some(x) => {
                                interaction.changed |= controller.finish_resize(x, viewport, &mut *tasks);
                            }
                            None => controller.cancel(),
                        }
                    }
                }
                if bar_response.drag_stopped() && controller.active() == Some(GestureKind::Move) {
                    let start_x = ui.ctx().data_mut(|data| {
                        let start_x = data.get_temp::<f32>(move_origin_id());
                        data.remove::<f32>(move_origin_id());
                        start_x
                    });
                    match (start_x, local_x(&bar_response, ui, origin)) {
                        (Some(start_x), Some(x)) => {
                            interaction.changed |= controller.finish_move(x - start_x, viewport, &mut *tasks);
                        }
                        _ => controller.cancel(),
                    }
                }

                if left_response.hovered() || right_response.hovered() {
                    ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
                } else if bar_response.hovered() && controller.active().is_none() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grab);
                }

                if (is_selected || left_response.hovered() || right_response.hovered()) && !is_active {
                    draw_handles(&painter, bar_rect);
                }

                if bar_response.hovered() && controller.active().is_none() {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        Id::new(("task-tip", &task.id)),
                        |ui| {
                            ui.strong(&task.title);
                            ui.label(format!(
                                "{} → {}",
                                task.start_date().format("%d/%m/%Y"),
                                task.end_date().format("%d/%m/%Y"),
                            ));
                            let weeks = task.duration_weeks();
                            ui.label(format!("{} week{}", weeks, if weeks == 1 { "" } else { "s" }));
                            let overlapping = find_overlapping(task, &snapshot);
                            if !overlapping.is_empty() {
                                let titles: Vec<&str> =
                                    overlapping.iter().map(|other| other.title.as_str()).collect();
                                ui.label(
                                    egui::RichText::new(format!("Overlaps: {}", titles.join(", ")))
                                        .color(theme::TEXT_SECONDARY),
                                );
                            }
                        },
                    );
                }
            }

            // A released pointer with a gesture still open means its bar never
            // saw the release (deleted or scrolled away); drop the gesture.
            if controller.active().is_some() && !ui.input(|i| i.pointer.any_down()) {
                controller.cancel();
            }

            if response.clicked() && !consumed_click {
                *selected_task = None;
            }
        });

    interaction
}

fn begin_resize(
    controller: &mut InteractionController,
    task: &Task,
    handle: ResizeHandle,
    response: &Response,
    origin: Pos2,
) {
    let x = response
        .interact_pointer_pos()
        .map_or(0.0, |pos| pos.x - origin.x);
    if let Err(e) = controller.begin_resize(task, handle, x) {
        debug!(error = %e, "resize ignored");
    }
}

fn local_x(response: &Response, ui: &Ui, origin: Pos2) -> Option<f32> {
    response
        .interact_pointer_pos()
        .or_else(|| ui.input(|i| i.pointer.latest_pos()))
        .map(|pos| pos.x - origin.x)
}

fn handle_rect(bar_rect: Rect, handle: ResizeHandle) -> Rect {
    let x = match handle {
        ResizeHandle::Start => bar_rect.left(),
        ResizeHandle::End => bar_rect.right(),
    };
    Rect::from_min_max(
        Pos2::new(x - HANDLE_WIDTH * 0.5, bar_rect.top()),
        Pos2::new(x + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
    )
    .expand(4.0)
}

/// Shade the span of each cluster of overlapping tasks across the lanes it uses.
fn draw_overlap_bands(painter: &egui::Painter, lanes_origin: Pos2, viewport: &TimelineViewport, tasks: &[Task]) {
    let lane_height = viewport.grid().config().lane_height();
    for group in group_overlapping(tasks).into_iter().filter(|group| group.len() > 1) {
        let rects = group.iter().map(|task| {
            viewport
                .grid()
                .task_rect(viewport.mode(), viewport.anchor(), task)
        });
        let (left, right, lanes) = rects.fold((f32::MAX, f32::MIN, 0.0f32), |(l, r, h), rect| {
            (l.min(rect.left), r.max(rect.right()), h.max(rect.top + lane_height))
        });
        painter.rect_filled(
            Rect::from_min_max(
                Pos2::new(lanes_origin.x + left, lanes_origin.y),
                Pos2::new(lanes_origin.x + right, lanes_origin.y + lanes),
            ),
            Rounding::same(theme::BAR_ROUNDING),
            theme::OVERLAP_BAND,
        );
    }
}

fn draw_lanes(painter: &egui::Painter, origin: Pos2, width: f32, height: f32, lane_height: f32) {
    let lanes = (height / lane_height).round() as usize;
    for lane in 0..lanes {
        let y = origin.y + HEADER_HEIGHT + lane as f32 * lane_height;
        if lane % 2 == 1 {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, lane_height)),
                0.0,
                theme::BG_LANE_ODD,
            );
        }
        painter.line_segment(
            [
                Pos2::new(origin.x, y + lane_height),
                Pos2::new(origin.x + width, y + lane_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_header(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
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

    let mut previous: Option<NaiveDate> = None;
    for unit in viewport.visible_units() {
        let x = origin.x + viewport.date_to_x(unit);

        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT / 2.0),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );

        let (label, group) = match viewport.mode() {
            ViewMode::Week => (
                unit.format("%d %b").to_string(),
                previous.map_or(true, |p| p.month() != unit.month()),
            ),
            ViewMode::Month => (
                unit.format("%b").to_string(),
                previous.map_or(true, |p| p.year() != unit.year()),
            ),
        };
        painter.text(
            Pos2::new(x + 4.0, origin.y + HEADER_HEIGHT * 0.72),
            Align2::LEFT_CENTER,
            label,
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );
        if group {
            let heading = match viewport.mode() {
                ViewMode::Week => unit.format("%B %Y").to_string(),
                ViewMode::Month => unit.format("%Y").to_string(),
            };
            painter.text(
                Pos2::new(x + 4.0, origin.y + HEADER_HEIGHT * 0.25),
                Align2::LEFT_CENTER,
                heading,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
        previous = Some(unit);
    }
}

fn draw_milestones(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    milestones: &MilestoneList,
    height: f32,
) {
    let range = viewport.range();
    for milestone in milestones.milestones().iter() {
        if milestone.date < range.start || milestone.date > range.end {
            continue;
        }
        let x = origin.x + viewport.date_to_x(milestone.date);
        let center = Pos2::new(x, origin.y + HEADER_HEIGHT - 7.0);
        let size = 5.0;

        painter.extend(Shape::dashed_line(
            &[
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(1.0, theme::MILESTONE.gamma_multiply(0.6)),
            4.0,
            4.0,
        ));
        painter.add(Shape::convex_polygon(
            vec![
                Pos2::new(center.x, center.y - size),
                Pos2::new(center.x + size, center.y),
                Pos2::new(center.x, center.y + size),
                Pos2::new(center.x - size, center.y),
            ],
            theme::MILESTONE,
            Stroke::NONE,
        ));
        painter.text(
            Pos2::new(center.x + size + 4.0, center.y),
            Align2::LEFT_CENTER,
            &milestone.label,
            theme::font_small(),
            theme::MILESTONE,
        );
    }
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, viewport: &TimelineViewport, height: f32) {
    let today = chrono::Local::now().date_naive();
    let range = viewport.range();
    if today < range.start || today > range.end {
        return;
    }
    let x = origin.x + viewport.date_to_x(today);

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_task_bar(
    painter: &egui::Painter,
    bar_rect: Rect,
    task: &Task,
    is_selected: bool,
    faded: bool,
) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let mut color = theme::task_color(&task.color);
    if faded {
        color = color.gamma_multiply(0.35);
    } else {
        painter.rect_filled(
            bar_rect.translate(Vec2::new(1.0, 2.0)),
            rounding,
            Color32::from_black_alpha(35),
        );
    }

    painter.rect_filled(bar_rect, rounding, color);
    painter.rect_filled(
        Rect::from_min_size(
            bar_rect.min,
            Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
        ),
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(if faded { 8 } else { 25 }),
    );

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar_rect.width() > 30.0 && !faded {
        let galley = painter.layout_no_wrap(task.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        painter.with_clip_rect(bar_rect).galley(
            Pos2::new(bar_rect.left() + 8.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }
}

fn draw_handles(painter: &egui::Painter, bar_rect: Rect) {
    let handle_h = bar_rect.height() * 0.55;
    let handle_y = bar_rect.center().y - handle_h / 2.0;
    for x in [bar_rect.left() + 1.5, bar_rect.right() - 5.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }
}
