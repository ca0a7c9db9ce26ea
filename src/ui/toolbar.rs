use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use taskline::ViewMode;

use crate::app::PlannerApp;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_all();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Timeline Scale").small().weak());
            for mode in [ViewMode::Week, ViewMode::Month] {
                if ui.radio(app.viewport.mode() == mode, mode.label()).clicked() {
                    app.set_view_mode(mode);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Previous").clicked() {
                app.scroll(-1);
                ui.close_menu();
            }
            if ui.button("  Next").clicked() {
                app.scroll(1);
                ui.close_menu();
            }
            if ui.button("  Today").clicked() {
                app.scroll_to_today();
                ui.close_menu();
            }
            if ui
                .add_enabled(app.selected_task.is_some(), egui::Button::new("  Go to Selected"))
                .clicked()
            {
                app.scroll_to_selected();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Task  ").font(theme::font_menu()), |ui| {
            if ui.button("  Add Task...    Ctrl+N").clicked() {
                app.open_new_task_dialog();
                ui.close_menu();
            }
            if ui.button("  Add Milestone...").clicked() {
                app.open_milestone_dialog(chrono::Local::now().date_naive());
                ui.close_menu();
            }
            ui.separator();
            let has_selection = app.selected_task.is_some();
            if ui
                .add_enabled(has_selection, egui::Button::new("  Edit Selected..."))
                .clicked()
            {
                app.open_edit_selected();
                ui.close_menu();
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("  Delete Selected    Del"))
                .clicked()
            {
                app.delete_selected();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        if ui
            .button(RichText::new(icons::CARET_LEFT).size(14.0))
            .on_hover_text("Previous")
            .clicked()
        {
            app.scroll(-1);
        }
        if ui
            .button(RichText::new(format!("{} Today", icons::CALENDAR_CHECK)))
            .clicked()
        {
            app.scroll_to_today();
        }
        if ui
            .button(RichText::new(icons::CARET_RIGHT).size(14.0))
            .on_hover_text("Next")
            .clicked()
        {
            app.scroll(1);
        }
        ui.separator();
        for mode in [ViewMode::Week, ViewMode::Month] {
            if ui
                .selectable_label(app.viewport.mode() == mode, mode.label())
                .clicked()
            {
                app.set_view_mode(mode);
            }
        }
        ui.separator();
        if ui
            .button(RichText::new(format!("{} Task", icons::PLUS)))
            .clicked()
        {
            app.open_new_task_dialog();
        }
        if ui
            .button(RichText::new(format!("{} Milestone", icons::FLAG)))
            .clicked()
        {
            app.open_milestone_dialog(chrono::Local::now().date_naive());
        }

        ui.separator();
        ui.label(RichText::new("From").color(theme::TEXT_SECONDARY));
        ui.add(egui_extras::DatePickerButton::new(&mut app.range_start).id_salt("range_start"));
        ui.label(RichText::new("to").color(theme::TEXT_SECONDARY));
        ui.add(egui_extras::DatePickerButton::new(&mut app.range_end).id_salt("range_end"));
        if ui
            .button(RichText::new(format!("{} Apply", icons::CHECK)))
            .on_hover_text("Show this date range")
            .clicked()
        {
            app.apply_range_inputs();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let range = app.viewport.range();
            ui.label(
                RichText::new(format!(
                    "{} – {} ({} days)",
                    range.start.format("%d %b %Y"),
                    range.end.format("%d %b %Y"),
                    range.len_days()
                ))
                .size(11.0)
                .weak(),
            );
        });
    });
}
