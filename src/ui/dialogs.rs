use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Sense, Stroke, Vec2, Window};

use taskline::{Milestone, Task};

use crate::ui::theme;

/// What the user chose in a dialog this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Open,
    Save,
    Delete,
    Close,
}

/// Fields of the add/edit task dialog.
#[derive(Debug, Clone)]
pub struct TaskDialog {
    /// `None` when creating a new task.
    pub editing: Option<String>,
    pub title: String,
    pub start: NaiveDate,
    pub duration_weeks: u32,
    pub color: String,
}

impl TaskDialog {
    pub fn create(start: NaiveDate, color: &str) -> Self {
        Self {
            editing: None,
            title: String::new(),
            start,
            duration_weeks: 1,
            color: color.to_string(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.id.clone()),
            title: task.title.clone(),
            start: task.start_date(),
            duration_weeks: task.duration_weeks(),
            color: task.color.clone(),
        }
    }
}

/// Fields of the milestone dialog. Milestones are keyed by week.
#[derive(Debug, Clone)]
pub struct MilestoneDialog {
    pub editing: Option<String>,
    pub week: NaiveDate,
    pub label: String,
}

impl MilestoneDialog {
    pub fn for_week(week: NaiveDate, existing: Option<&Milestone>) -> Self {
        Self {
            editing: existing.map(|m| m.id.clone()),
            week,
            label: existing.map(|m| m.label.clone()).unwrap_or_default(),
        }
    }
}

/// Render the add/edit task dialog.
pub fn show_task_dialog(dialog: &mut TaskDialog, ctx: &Context) -> DialogOutcome {
    let mut outcome = DialogOutcome::Open;
    let heading = if dialog.editing.is_some() { "Edit Task" } else { "Add Task" };

    Window::new(RichText::new(heading).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("task_dialog_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut dialog.title).hint_text("Task title..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut dialog.start).id_salt("task_dlg_start"));
                    ui.end_row();

                    ui.label(RichText::new("Weeks").color(theme::TEXT_SECONDARY));
                    ui.add(egui::DragValue::new(&mut dialog.duration_weeks).range(1..=104));
                    ui.end_row();

                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    ui.horizontal_wrapped(|ui| {
                        for hex in theme::TASK_COLORS {
                            if color_swatch(ui, hex, dialog.color == *hex).clicked() {
                                dialog.color = hex.to_string();
                            }
                        }
                    });
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let label = if dialog.editing.is_some() { "Save" } else { "Create" };
                let save_btn = egui::Button::new(RichText::new(label).color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    outcome = DialogOutcome::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    outcome = DialogOutcome::Close;
                }
                if dialog.editing.is_some() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let delete = RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                            .color(theme::TODAY_LINE);
                        if ui.button(delete).clicked() {
                            outcome = DialogOutcome::Delete;
                        }
                    });
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        outcome = DialogOutcome::Close;
    }
    outcome
}

/// Render the milestone dialog for one week.
pub fn show_milestone_dialog(dialog: &mut MilestoneDialog, ctx: &Context) -> DialogOutcome {
    let mut outcome = DialogOutcome::Open;

    Window::new(RichText::new("Milestone").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!("Week of {}", dialog.week.format("%d %B %Y")))
                    .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(4.0);
            let edit = ui.add_sized(
                [theme::DIALOG_WIDTH - 20.0, 24.0],
                egui::TextEdit::singleline(&mut dialog.label).hint_text("Milestone label..."),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                outcome = DialogOutcome::Save;
            }

            ui.add_space(6.0);
            ui.separator();
            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    outcome = DialogOutcome::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    outcome = DialogOutcome::Close;
                }
                if dialog.editing.is_some() && ui.button("Remove").clicked() {
                    outcome = DialogOutcome::Delete;
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        outcome = DialogOutcome::Close;
    }
    outcome
}

/// Render the "About" dialog.
pub fn show_about_dialog(open: &mut bool, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([280.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Taskline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag bars to move, drag edges to resize.");
                ui.label("Click a week in the header to mark a milestone.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        *open = false;
    }
}

fn color_swatch(ui: &mut egui::Ui, hex: &str, selected: bool) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(18.0), Sense::click());
    let painter = ui.painter();
    painter.rect_filled(rect, egui::Rounding::same(3.0), theme::task_color(hex));
    if selected {
        painter.rect_stroke(rect.expand(2.0), egui::Rounding::same(4.0), Stroke::new(2.0, Color32::WHITE));
    } else if response.hovered() {
        painter.rect_stroke(rect.expand(1.0), egui::Rounding::same(4.0), Stroke::new(1.0, theme::BORDER_ACCENT));
    }
    response
}
