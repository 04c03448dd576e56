//! Earnings report screen.

use chrono::NaiveDate;
use client_core::{
    report::{ReportController, ReportSummary, ReportView},
    turnos::StatusColor,
    ActionError,
};
use eframe::egui;

use crate::ui::{theme::ThemeConfig, widgets};

pub fn show(
    ui: &mut egui::Ui,
    controller: &mut ReportController,
    theme: &ThemeConfig,
) -> Result<(), ActionError> {
    widgets::page_title(ui, theme, "Reportes por Barbero");
    ui.add_space(8.0);

    if controller.barberos_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Cargando datos iniciales...");
        });
        return Ok(());
    }
    if let Some(err) = controller.barberos_error() {
        widgets::notice(ui, theme, StatusColor::Error, err);
        return Ok(());
    }

    let mut generate = false;
    let barberos: Vec<_> = controller
        .barberos()
        .iter()
        .map(|b| (b.id_barbero, b.full_name()))
        .collect();
    let generating = controller.generating();

    egui::Frame::NONE
        .fill(theme.surface())
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(16, 12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.label("Barbero");
                widgets::id_picker(
                    ui,
                    "report_barbero",
                    "Seleccionar Barbero",
                    &mut controller.form.barbero_id,
                    barberos,
                );
                ui.label("Desde");
                ui.add(
                    egui::TextEdit::singleline(&mut controller.form.desde)
                        .hint_text("AAAA-MM-DD")
                        .desired_width(120.0),
                );
                ui.label("Hasta");
                ui.add(
                    egui::TextEdit::singleline(&mut controller.form.hasta)
                        .hint_text("AAAA-MM-DD")
                        .desired_width(120.0),
                );
                let label = if generating { "Generando..." } else { "Generar Reporte" };
                generate = ui.add_enabled(!generating, egui::Button::new(label)).clicked();
            });
        });

    let generated = if generate {
        controller.generate()
    } else {
        Ok(())
    };
    if let Some(message) = controller.validation() {
        ui.add_space(6.0);
        widgets::notice(ui, theme, StatusColor::Warning, message);
    }
    ui.add_space(10.0);

    let barbero_nombre = controller
        .selected_barbero()
        .map(|b| b.nombre.clone())
        .unwrap_or_else(|| "N/A".to_string());

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match controller.view() {
            ReportView::Idle => {}
            ReportView::Loading => {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Generando reporte...");
                });
            }
            ReportView::Failed(message) => widgets::notice(ui, theme, StatusColor::Error, &message),
            ReportView::Empty(message) => widgets::notice(ui, theme, StatusColor::Info, &message),
            ReportView::Ready(summary) => summary_view(ui, theme, &summary, &barbero_nombre),
        });

    generated
}

fn summary_view(ui: &mut egui::Ui, theme: &ThemeConfig, summary: &ReportSummary, barbero: &str) {
    ui.horizontal_wrapped(|ui| {
        widgets::metric_card(
            ui,
            theme,
            "TOTAL DE TURNOS (Activos)",
            &summary.active.to_string(),
            &format!("Turnos realizados: {}", summary.done),
            StatusColor::Info,
        );
        widgets::metric_card(
            ui,
            theme,
            "VALOR BRUTO DE TURNOS",
            &summary.gross_label(),
            &format!("Barbero: {barbero}"),
            StatusColor::Success,
        );
    });
    ui.add_space(12.0);

    ui.label(egui::RichText::new(format!("Cortes por día · {barbero}")).size(18.0).strong());
    day_chart(ui, theme, &summary.by_day);
    ui.add_space(12.0);

    ui.label(egui::RichText::new("Detalle de Turnos").size(18.0).strong());
    egui::Grid::new("report_detail")
        .num_columns(5)
        .striped(true)
        .spacing([18.0, 6.0])
        .show(ui, |ui| {
            for header in ["Fecha", "Cliente", "Servicio", "Precio", "Estado"] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();
            for row in &summary.rows {
                ui.label(&row.fecha);
                ui.label(&row.cliente);
                ui.label(&row.servicio);
                ui.label(format!("${:.2}", row.precio));
                widgets::status_chip(ui, theme, row.estado, row.color);
                ui.end_row();
            }
        });
}

fn day_chart(ui: &mut egui::Ui, theme: &ThemeConfig, by_day: &[(NaiveDate, usize)]) {
    let height = 160.0;
    let width = ui.available_width().min(720.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height + 20.0), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, egui::CornerRadius::same(theme.overrides.corner_radius), theme.surface());

    let max = by_day.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1) as f32;
    let slot = rect.width() / by_day.len().max(1) as f32;
    let bar = (slot * 0.6).min(48.0);
    let text_color = theme.muted_text();

    for (i, (day, count)) in by_day.iter().enumerate() {
        let center_x = rect.left() + slot * (i as f32 + 0.5);
        let bar_h = (height - 24.0) * (*count as f32 / max);
        let base_y = rect.bottom() - 20.0;
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(center_x - bar / 2.0, base_y - bar_h),
            egui::pos2(center_x + bar / 2.0, base_y),
        );
        painter.rect_filled(bar_rect, egui::CornerRadius::same(2), theme.secondary.color32());
        painter.text(
            egui::pos2(center_x, base_y - bar_h - 2.0),
            egui::Align2::CENTER_BOTTOM,
            count.to_string(),
            egui::FontId::proportional(12.0),
            text_color,
        );
        painter.text(
            egui::pos2(center_x, rect.bottom() - 2.0),
            egui::Align2::CENTER_BOTTOM,
            day.format("%d/%m").to_string(),
            egui::FontId::proportional(11.0),
            text_color,
        );
    }
}
