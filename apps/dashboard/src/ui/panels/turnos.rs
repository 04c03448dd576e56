//! Appointment list with filters, confirmations and the two turno dialogs.

use client_core::{
    display::parse_optional_date,
    turnos::{StatusColor, TurnoAction, TurnoRow, TurnosListController},
    ActionError, FilterKey, FilterValue,
};
use eframe::egui;
use shared::domain::{BarberoId, ClienteId, ServicioId, TurnoEstado, TurnoId};

use crate::ui::{theme::ThemeConfig, widgets};

enum RowClick {
    Cancel(TurnoId),
    Reschedule(TurnoId),
    Delete(TurnoId),
}

#[derive(Default)]
pub struct TurnosPanel {
    fecha_input: String,
    fecha_error: Option<String>,
}

fn number_filter(value: &FilterValue) -> Option<i64> {
    match value {
        FilterValue::Number(n) if *n != 0 => Some(*n),
        _ => None,
    }
}

fn estado_filter(value: &FilterValue) -> Option<TurnoEstado> {
    match value {
        FilterValue::Text(raw) => TurnoEstado::ALL.into_iter().find(|e| e.as_str() == raw),
        _ => None,
    }
}

impl TurnosPanel {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        controller: &mut TurnosListController,
        theme: &ThemeConfig,
    ) -> Result<(), ActionError> {
        ui.horizontal(|ui| {
            widgets::page_title(ui, theme, "Turnos Agendados");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("➕ Agendar Nuevo Turno").clicked() {
                    controller.open_create_form();
                }
                if ui.button("⟳ Actualizar").clicked() {
                    controller.refetch();
                }
                if controller.busy() {
                    ui.spinner();
                }
            });
        });
        ui.add_space(8.0);

        self.filter_bar(ui, controller);
        ui.add_space(8.0);

        if let Some(message) = controller.notice().map(str::to_string) {
            if widgets::alert(ui, theme, StatusColor::Error, &message) {
                controller.dismiss_notice();
            }
            ui.add_space(6.0);
        }

        let mut click = None;
        let view = controller.view();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                widgets::list_states(ui, theme, &view, "Cargando turnos...", |ui, rows| {
                    for row in rows {
                        if let Some(c) = turno_row(ui, theme, row) {
                            click = Some(c);
                        }
                    }
                });
            });

        let ctx = ui.ctx().clone();
        let clicked = match click {
            Some(RowClick::Cancel(id)) => controller.request_cancel(id),
            Some(RowClick::Delete(id)) => controller.request_delete(id),
            Some(RowClick::Reschedule(id)) => controller.open_reschedule(id),
            None => Ok(()),
        };

        confirmation_window(&ctx, controller);
        let rescheduled = reschedule_window(&ctx, controller, theme);
        let created = create_window(&ctx, controller, theme);
        clicked.and(rescheduled).and(created)
    }

    fn filter_bar(&mut self, ui: &mut egui::Ui, controller: &mut TurnosListController) {
        let filters = controller.filters().clone();
        let reference = controller.reference();

        let mut barbero = number_filter(filters.get(FilterKey::Barbero)).map(BarberoId);
        let mut cliente = number_filter(filters.get(FilterKey::Cliente)).map(ClienteId);
        let mut servicio = number_filter(filters.get(FilterKey::Servicio)).map(ServicioId);
        let mut estado = estado_filter(filters.get(FilterKey::Estado));

        let barberos: Vec<_> = reference
            .barberos()
            .iter()
            .map(|b| (b.id_barbero, b.full_name()))
            .collect();
        let clientes: Vec<_> = reference
            .clientes()
            .iter()
            .map(|c| (c.id_cliente, c.full_name()))
            .collect();
        let servicios: Vec<_> = reference
            .servicios()
            .iter()
            .map(|s| (s.id_servicio, s.nombre.clone()))
            .collect();

        let mut apply_fecha = false;
        let mut clear = false;
        let (mut barbero_changed, mut cliente_changed, mut servicio_changed, mut estado_changed) =
            (false, false, false, false);

        ui.horizontal_wrapped(|ui| {
            ui.label("Filtrar:");
            barbero_changed =
                widgets::id_picker(ui, "filter_barbero", "Todos los barberos", &mut barbero, barberos);
            cliente_changed =
                widgets::id_picker(ui, "filter_cliente", "Todos los clientes", &mut cliente, clientes);
            servicio_changed = widgets::id_picker(
                ui,
                "filter_servicio",
                "Todos los servicios",
                &mut servicio,
                servicios,
            );
            estado_changed = widgets::id_picker(
                ui,
                "filter_estado",
                "Todos los estados",
                &mut estado,
                TurnoEstado::ALL.map(|e| (e, e.label())),
            );

            let fecha = ui.add(
                egui::TextEdit::singleline(&mut self.fecha_input)
                    .hint_text("Fecha AAAA-MM-DD")
                    .desired_width(130.0),
            );
            apply_fecha = fecha.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            apply_fecha |= ui.button("Aplicar fecha").clicked();
            clear = ui.button("Limpiar filtros").clicked();
        });

        if let Some(err) = &self.fecha_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }

        if clear {
            self.fecha_input.clear();
            self.fecha_error = None;
            controller.clear_filters();
            return;
        }
        if barbero_changed {
            controller.set_filter(FilterKey::Barbero, barbero);
        }
        if cliente_changed {
            controller.set_filter(FilterKey::Cliente, cliente);
        }
        if servicio_changed {
            controller.set_filter(FilterKey::Servicio, servicio);
        }
        if estado_changed {
            controller.set_filter(FilterKey::Estado, estado);
        }
        if apply_fecha {
            match parse_optional_date(&self.fecha_input) {
                Ok(fecha) => {
                    self.fecha_error = None;
                    controller.set_filter(FilterKey::Fecha, fecha);
                }
                Err(message) => self.fecha_error = Some(message),
            }
        }
    }
}

fn turno_row(ui: &mut egui::Ui, theme: &ThemeConfig, row: &TurnoRow) -> Option<RowClick> {
    let mut click = None;
    egui::Frame::NONE
        .fill(theme.surface())
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(row.title()).strong());
                    ui.label(row.service_line());
                    ui.label(
                        egui::RichText::new(row.date_line()).color(theme.muted_text()),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if row.allows(TurnoAction::Delete) && ui.button("Eliminar").clicked() {
                        click = Some(RowClick::Delete(row.id));
                    }
                    if row.allows(TurnoAction::Cancel) && ui.button("Cancelar").clicked() {
                        click = Some(RowClick::Cancel(row.id));
                    }
                    if row.allows(TurnoAction::Reschedule) && ui.button("Reprogramar").clicked() {
                        click = Some(RowClick::Reschedule(row.id));
                    }
                    widgets::status_chip(ui, theme, row.estado, row.color);
                });
            });
        });
    ui.add_space(4.0);
    click
}

fn confirmation_window(ctx: &egui::Context, controller: &mut TurnosListController) {
    let Some(prompt) = controller.confirmation().map(|c| c.prompt.clone()) else {
        return;
    };

    let mut answer = None;
    egui::Window::new("Confirmar")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(prompt);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Sí").clicked() {
                    answer = Some(true);
                }
                if ui.button("No").clicked() {
                    answer = Some(false);
                }
            });
        });

    if let Some(accepted) = answer {
        controller.resolve_confirmation(accepted);
    }
}

fn reschedule_window(
    ctx: &egui::Context,
    controller: &mut TurnosListController,
    theme: &ThemeConfig,
) -> Result<(), ActionError> {
    let Some(dialog) = controller.reschedule_dialog_mut() else {
        return Ok(());
    };

    let mut open = true;
    let mut submit = false;
    let mut cancel = false;
    egui::Window::new(format!("Reprogramar Turno #{}", dialog.turno_id))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(&dialog.subtitle).color(theme.muted_text()));
            ui.add_space(6.0);
            widgets::date_time_fields(ui, &mut dialog.date, &mut dialog.time);
            if let Some(err) = &dialog.error {
                ui.add_space(6.0);
                widgets::notice(ui, theme, StatusColor::Error, err);
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if dialog.submitting {
                    "Guardando..."
                } else {
                    "Confirmar Reprogramación"
                };
                submit = ui
                    .add_enabled(!dialog.submitting, egui::Button::new(label))
                    .clicked();
                cancel = ui.button("Cancelar").clicked();
            });
        });

    if !open || cancel {
        controller.close_reschedule();
        return Ok(());
    }
    if submit {
        return controller.submit_reschedule();
    }
    Ok(())
}

fn create_window(
    ctx: &egui::Context,
    controller: &mut TurnosListController,
    theme: &ThemeConfig,
) -> Result<(), ActionError> {
    if controller.create_form().is_none() {
        return Ok(());
    }

    let reference = controller.reference();
    let loading = reference.loading();
    let reference_error = reference.error();
    let clientes: Vec<_> = reference
        .clientes()
        .iter()
        .map(|c| (c.id_cliente, c.full_name()))
        .collect();
    let barberos: Vec<_> = reference
        .active_barberos()
        .map(|b| (b.id_barbero, b.full_name()))
        .collect();
    let servicios: Vec<_> = reference
        .servicios()
        .iter()
        .map(|s| {
            (
                s.id_servicio,
                format!("{} ({} min, ${:.2})", s.nombre, s.duracion_minutos, s.precio),
            )
        })
        .collect();

    let mut open = true;
    let mut submit = false;
    let mut cancel = false;
    let mut retry = false;
    let Some(form) = controller.create_form_mut() else {
        return Ok(());
    };
    egui::Window::new("Agendar Nuevo Turno")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(460.0)
        .show(ctx, |ui| {
            if loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Cargando datos...");
                });
                return;
            }
            if let Some(err) = &reference_error {
                widgets::notice(ui, theme, StatusColor::Error, err);
                retry = ui.button("Reintentar").clicked();
                return;
            }

            egui::Grid::new("new_turno_form")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Cliente");
                    widgets::id_picker(ui, "new_turno_cliente", "Seleccione un cliente", &mut form.cliente_id, clientes);
                    ui.end_row();
                    ui.label("Barbero");
                    widgets::id_picker(ui, "new_turno_barbero", "Seleccione un barbero", &mut form.barbero_id, barberos);
                    ui.end_row();
                    ui.label("Servicio");
                    widgets::id_picker(ui, "new_turno_servicio", "Seleccione un servicio", &mut form.servicio_id, servicios);
                    ui.end_row();
                });
            ui.add_space(6.0);
            widgets::date_time_fields(ui, &mut form.date, &mut form.time);

            if let Some(err) = &form.error {
                ui.add_space(6.0);
                widgets::notice(ui, theme, StatusColor::Error, err);
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if form.submitting {
                    "Agendando..."
                } else {
                    "Agendar Turno"
                };
                submit = ui
                    .add_enabled(!form.submitting, egui::Button::new(label))
                    .clicked();
                cancel = ui.button("Cancelar").clicked();
            });
        });

    if retry {
        controller.reference_mut().refetch();
    }
    if !open || cancel {
        controller.close_create_form();
        return Ok(());
    }
    if submit {
        return controller.submit_create();
    }
    Ok(())
}
