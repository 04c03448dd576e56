//! Small building blocks shared by the panels.

use client_core::{turnos::StatusColor, ListView};
use eframe::egui;
use shared::domain::TurnoEstado;

use crate::ui::theme::ThemeConfig;

pub fn page_title(ui: &mut egui::Ui, theme: &ThemeConfig, title: &str) {
    ui.label(
        egui::RichText::new(title)
            .size(24.0)
            .strong()
            .color(theme.strong_text()),
    );
}

/// Colored box with a message and a close button. Returns true when closed.
pub fn alert(ui: &mut egui::Ui, theme: &ThemeConfig, severity: StatusColor, message: &str) -> bool {
    let mut closed = false;
    let color = theme.status_color(severity);
    egui::Frame::NONE
        .fill(color.gamma_multiply(0.18))
        .stroke(egui::Stroke::new(1.0, color))
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(message).color(color));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        closed = true;
                    }
                });
            });
        });
    closed
}

/// Static alert without a close button.
pub fn notice(ui: &mut egui::Ui, theme: &ThemeConfig, severity: StatusColor, message: &str) {
    let color = theme.status_color(severity);
    egui::Frame::NONE
        .fill(color.gamma_multiply(0.18))
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(message).color(color));
        });
}

pub fn status_chip(ui: &mut egui::Ui, theme: &ThemeConfig, estado: TurnoEstado, color: StatusColor) {
    egui::Frame::NONE
        .fill(theme.status_color(color))
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(estado.label())
                    .small()
                    .strong()
                    .color(egui::Color32::BLACK),
            );
        });
}

/// Loading, failure and empty states of a list; `rows` draws the data case.
pub fn list_states<R>(
    ui: &mut egui::Ui,
    theme: &ThemeConfig,
    view: &ListView<R>,
    loading_text: &str,
    rows: impl FnOnce(&mut egui::Ui, &[R]),
) {
    match view {
        ListView::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.spinner();
                ui.label(loading_text);
            });
        }
        ListView::Failed(message) => notice(ui, theme, StatusColor::Error, message),
        ListView::Empty(message) => notice(ui, theme, StatusColor::Info, message),
        ListView::Rows(items) => rows(ui, items),
    }
}

pub fn text_field(ui: &mut egui::Ui, label: &str, hint: &str, value: &mut String) -> egui::Response {
    ui.label(egui::RichText::new(label).strong());
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    )
}

/// Date and time inputs side by side, as `YYYY-MM-DD` and `HH:MM`.
pub fn date_time_fields(ui: &mut egui::Ui, date: &mut String, time: &mut String) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Fecha").strong());
            ui.add(
                egui::TextEdit::singleline(date)
                    .hint_text("AAAA-MM-DD")
                    .desired_width(140.0),
            );
        });
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Hora").strong());
            ui.add(
                egui::TextEdit::singleline(time)
                    .hint_text("HH:MM")
                    .desired_width(90.0),
            );
        });
    });
}

/// Picker over `options`; `None` shows `placeholder`.
pub fn id_picker<Id: Copy + PartialEq>(
    ui: &mut egui::Ui,
    salt: &str,
    placeholder: &str,
    selected: &mut Option<Id>,
    options: impl IntoIterator<Item = (Id, String)>,
) -> bool {
    let options: Vec<(Id, String)> = options.into_iter().collect();
    let current = selected
        .and_then(|id| options.iter().find(|(o, _)| *o == id))
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| placeholder.to_string());

    let before = *selected;
    egui::ComboBox::from_id_salt(salt)
        .selected_text(current)
        .width(220.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(selected, None, placeholder);
            for (id, label) in options {
                ui.selectable_value(selected, Some(id), label);
            }
        });
    *selected != before
}

pub fn metric_card(ui: &mut egui::Ui, theme: &ThemeConfig, title: &str, metric: &str, sub: &str, color: StatusColor) {
    egui::Frame::NONE
        .fill(theme.surface())
        .stroke(egui::Stroke::new(1.0, theme.status_color(color).gamma_multiply(0.6)))
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(16, 12))
        .show(ui, |ui| {
            ui.set_min_width(260.0);
            ui.label(egui::RichText::new(title).small().color(theme.muted_text()));
            ui.label(
                egui::RichText::new(metric)
                    .size(28.0)
                    .strong()
                    .color(theme.status_color(color)),
            );
            ui.label(egui::RichText::new(sub).color(theme.muted_text()));
        });
}
