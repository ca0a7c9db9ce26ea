use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use taskline::{
    Grid, InteractionController, MilestoneInput, MilestoneList, Storage, TaskInput, TaskList,
    TaskStore, TimeScale, TimelineViewport, ViewMode,
};

use crate::ui;
use crate::ui::dialogs::{DialogOutcome, MilestoneDialog, TaskDialog};

/// Main application state.
pub struct PlannerApp {
    pub tasks: TaskList,
    pub milestones: MilestoneList,
    pub viewport: TimelineViewport,
    pub controller: InteractionController,
    /// `None` when no data directory could be found; edits then live in memory only.
    pub storage: Option<Storage>,
    pub selected_task: Option<String>,

    // Toolbar range picker, applied on demand
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,

    // Dialog state
    pub task_dialog: Option<TaskDialog>,
    pub milestone_dialog: Option<MilestoneDialog>,
    pub show_about: bool,

    // Status message
    pub status_message: String,
}

impl PlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let storage = match Storage::from_project_dirs() {
            Ok(storage) => Some(storage),
            Err(e) => {
                warn!(error = %e, "no data directory; changes will not be saved");
                None
            }
        };

        let config = storage.as_ref().map(Storage::load_config).unwrap_or_default();
        let grid = Grid::new(config);
        let tasks = TaskList::with_tasks(
            grid.clone(),
            storage.as_ref().map(Storage::load_tasks).unwrap_or_default(),
        );
        let milestones = MilestoneList::with_milestones(
            grid.clone(),
            storage.as_ref().map(Storage::load_milestones).unwrap_or_default(),
        );
        let viewport = match storage.as_ref().and_then(Storage::load_settings) {
            Some(settings) => TimelineViewport::restore(grid, settings),
            None => TimelineViewport::around(grid, today()),
        };
        info!(
            tasks = tasks.len(),
            milestones = milestones.len(),
            mode = ?viewport.mode(),
            "timeline ready"
        );

        let range = viewport.range();
        Self {
            tasks,
            milestones,
            viewport,
            controller: InteractionController::default(),
            storage,
            selected_task: None,
            range_start: range.start,
            range_end: range.end,
            task_dialog: None,
            milestone_dialog: None,
            show_about: false,
            status_message: "Ready".to_string(),
        }
    }

    // --- Persistence ---

    pub fn save_all(&mut self) {
        self.save_tasks();
        self.save_milestones();
        self.save_settings();
        self.status_message = "Saved".to_string();
    }

    fn save_tasks(&mut self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_tasks(&self.tasks.tasks()) {
                error!(error = %e, "saving tasks failed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    fn save_milestones(&mut self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_milestones(&self.milestones.milestones()) {
                error!(error = %e, "saving milestones failed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    fn save_settings(&mut self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_settings(&self.viewport.settings()) {
                error!(error = %e, "saving view settings failed");
            }
        }
    }

    // --- View operations ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.viewport.mode() == mode {
            return;
        }
        self.controller.cancel();
        self.viewport.set_mode(mode);
        self.sync_range_inputs();
        self.save_settings();
        self.status_message = format!("Showing {}", mode.label().to_lowercase());
    }

    /// Shift the window by `units` of the current mode.
    pub fn scroll(&mut self, units: i32) {
        for _ in 0..units.unsigned_abs() {
            if units < 0 {
                self.viewport.scroll_previous();
            } else {
                self.viewport.scroll_next();
            }
        }
        self.sync_range_inputs();
        self.save_settings();
    }

    pub fn scroll_to_today(&mut self) {
        self.viewport.scroll_to_today(today());
        self.sync_range_inputs();
        self.save_settings();
    }

    /// Start the window at the selected task's week.
    pub fn scroll_to_selected(&mut self) {
        let start = self
            .selected_task
            .as_deref()
            .and_then(|id| self.tasks.get_task_by_id(id))
            .map(|task| task.start_date());
        if let Some(start) = start {
            self.viewport.scroll_to_date(start);
            self.sync_range_inputs();
            self.save_settings();
        }
    }

    /// Show the range typed into the toolbar pickers, or report why not.
    pub fn apply_range_inputs(&mut self) {
        match self.viewport.try_set_range(self.range_start, self.range_end) {
            Ok(()) => {
                self.controller.cancel();
                self.sync_range_inputs();
                self.save_settings();
                self.status_message = format!("Showing {} days", self.viewport.range().len_days());
            }
            Err(e) => {
                debug!(start = %self.range_start, end = %self.range_end, error = %e, "range rejected");
                self.status_message = format!("Invalid range: {}", e);
            }
        }
    }

    fn sync_range_inputs(&mut self) {
        let range = self.viewport.range();
        self.range_start = range.start;
        self.range_end = range.end;
    }

    // --- Task operations ---

    pub fn open_new_task_dialog(&mut self) {
        let color = ui::theme::palette_color(self.tasks.len());
        let start = self.viewport.grid().week().unit_start(today());
        self.task_dialog = Some(TaskDialog::create(start, color));
    }

    pub fn open_edit_selected(&mut self) {
        if let Some(id) = self.selected_task.clone() {
            self.open_edit_task(&id);
        }
    }

    fn open_edit_task(&mut self, id: &str) {
        match self.tasks.get_task_by_id(id) {
            Some(task) => self.task_dialog = Some(TaskDialog::edit(&task)),
            None => self.selected_task = None,
        }
    }

    fn apply_task_dialog(&mut self, dialog: TaskDialog) {
        let title = match dialog.title.trim() {
            "" => "New Task".to_string(),
            title => title.to_string(),
        };
        let start = self.tasks.grid().week().unit_start(dialog.start);
        match dialog.editing {
            Some(id) => {
                let Some(task) = self.tasks.get_task_by_id(&id) else {
                    return;
                };
                let mut updated = task.rescheduled(self.tasks.grid(), start, dialog.duration_weeks);
                updated.title = title;
                updated.color = dialog.color;
                if self.tasks.update_task(updated) {
                    self.status_message = "Task updated".to_string();
                }
            }
            None => {
                let id = self.tasks.add_task(TaskInput::new(
                    title,
                    start,
                    dialog.duration_weeks,
                    dialog.color,
                ));
                self.selected_task = Some(id);
                self.status_message = "Task added".to_string();
            }
        }
        self.save_tasks();
    }

    pub fn delete_task(&mut self, id: &str) {
        if self.tasks.delete_task(id) {
            if self.selected_task.as_deref() == Some(id) {
                self.selected_task = None;
            }
            self.status_message = "Task deleted".to_string();
            self.save_tasks();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task.clone() {
            self.delete_task(&id);
        }
    }

    // --- Milestones ---

    /// Open the milestone dialog for the week containing `date`.
    pub fn open_milestone_dialog(&mut self, date: NaiveDate) {
        let week = self.viewport.grid().week().unit_start(date);
        let existing = self.milestones.milestone_for_date(week);
        self.milestone_dialog = Some(MilestoneDialog::for_week(week, existing));
    }

    fn apply_milestone_dialog(&mut self, dialog: MilestoneDialog, outcome: DialogOutcome) {
        let label = dialog.label.trim();
        match (outcome, dialog.editing) {
            (DialogOutcome::Delete, Some(id)) => {
                self.milestones.delete_milestone(&id);
                self.status_message = "Milestone removed".to_string();
            }
            (DialogOutcome::Save, _) if label.is_empty() => return,
            (DialogOutcome::Save, Some(id)) => {
                self.milestones.update_milestone(&id, label);
                self.status_message = "Milestone updated".to_string();
            }
            (DialogOutcome::Save, None) => {
                self.milestones.add_milestone(MilestoneInput::new(dialog.week, label));
                self.status_message = "Milestone added".to_string();
            }
            _ => return,
        }
        self.save_milestones();
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let dialog_open = self.task_dialog.is_some() || self.milestone_dialog.is_some();
        let typing = ctx.memory(|m| m.focused().is_some());
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        let should_add = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::N));
        let should_delete = ctx.input(|i| i.key_pressed(egui::Key::Delete));
        if should_save {
            self.save_all();
        }
        if should_add && !dialog_open {
            self.open_new_task_dialog();
        }
        if should_delete && !dialog_open && !typing {
            self.delete_selected();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Milestones: {} · {}",
                                self.tasks.len(),
                                self.milestones.len(),
                                self.viewport.mode().label()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let chart_interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::timeline_chart::show_timeline_chart(
                    &mut self.tasks,
                    &self.milestones,
                    &self.viewport,
                    &mut self.controller,
                    &mut self.selected_task,
                    ui,
                )
            })
            .inner;

        if chart_interaction.changed {
            self.save_tasks();
            self.status_message = match self
                .selected_task
                .as_deref()
                .and_then(|id| self.tasks.get_task_by_id(id))
            {
                Some(task) => format!(
                    "Updated '{}' ({} → {})",
                    task.title,
                    task.start_date().format("%Y-%m-%d"),
                    task.end_date().format("%Y-%m-%d")
                ),
                None => "Timeline updated".to_string(),
            };
        }
        if let Some(id) = chart_interaction.edit_task {
            self.open_edit_task(&id);
        }
        if let Some(week) = chart_interaction.milestone_week {
            self.open_milestone_dialog(week);
        }

        // Dialogs
        if let Some(dialog) = self.task_dialog.as_mut() {
            match ui::dialogs::show_task_dialog(dialog, ctx) {
                DialogOutcome::Open => {}
                DialogOutcome::Close => self.task_dialog = None,
                DialogOutcome::Save => {
                    if let Some(dialog) = self.task_dialog.take() {
                        self.apply_task_dialog(dialog);
                    }
                }
                DialogOutcome::Delete => {
                    if let Some(id) = self.task_dialog.take().and_then(|d| d.editing) {
                        self.delete_task(&id);
                    }
                }
            }
        }
        if let Some(dialog) = self.milestone_dialog.as_mut() {
            let outcome = ui::dialogs::show_milestone_dialog(dialog, ctx);
            if outcome != DialogOutcome::Open {
                if let Some(dialog) = self.milestone_dialog.take() {
                    self.apply_milestone_dialog(dialog, outcome);
                }
            }
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(&mut self.show_about, ctx);
        }
    }
}
