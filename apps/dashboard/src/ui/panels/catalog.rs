//! Barberos, clientes and servicios screens, drawn by one generic panel.

use client_core::{
    catalog::{BarberoForm, CatalogController, CatalogResource, ClienteForm, ServicioForm},
    turnos::StatusColor,
    ActionError,
};
use eframe::egui;
use shared::domain::{Barbero, BarberoId, Cliente, Servicio};

use crate::ui::{theme::ThemeConfig, widgets};

/// How a catalog record is presented.
pub trait CatalogView: CatalogResource {
    const TITLE: &'static str;
    const HEADING: &'static str;
    const ADD_LABEL: &'static str;
    const LOADING: &'static str;

    fn secondary(&self) -> String;
    fn form_fields(ui: &mut egui::Ui, form: &mut Self::Form);
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

impl CatalogView for Barbero {
    const TITLE: &'static str = "Administración de Barberos";
    const HEADING: &'static str = "Nuestros Barberos";
    const ADD_LABEL: &'static str = "➕ Agregar Barbero";
    const LOADING: &'static str = "Cargando barberos...";

    fn secondary(&self) -> String {
        format!(
            "Teléfono: {} | Activo: {}",
            or_na(self.telefono.as_deref()),
            if self.activo { "Sí" } else { "No" }
        )
    }

    fn form_fields(ui: &mut egui::Ui, form: &mut BarberoForm) {
        widgets::text_field(ui, "Nombre", "", &mut form.nombre);
        widgets::text_field(ui, "Apellido", "", &mut form.apellido);
        widgets::text_field(ui, "Teléfono", "Opcional", &mut form.telefono);
        ui.checkbox(&mut form.activo, "Activo");
    }
}

impl CatalogView for Cliente {
    const TITLE: &'static str = "Administración de Clientes";
    const HEADING: &'static str = "Clientes Registrados";
    const ADD_LABEL: &'static str = "➕ Agregar Cliente";
    const LOADING: &'static str = "Cargando clientes...";

    fn secondary(&self) -> String {
        format!(
            "Teléfono: {} | Email: {}",
            or_na(self.telefono.as_deref()),
            or_na(self.email.as_deref())
        )
    }

    fn form_fields(ui: &mut egui::Ui, form: &mut ClienteForm) {
        widgets::text_field(ui, "Nombre", "", &mut form.nombre);
        widgets::text_field(ui, "Apellido", "", &mut form.apellido);
        widgets::text_field(ui, "Teléfono", "", &mut form.telefono);
        widgets::text_field(ui, "Email", "Opcional", &mut form.email);
    }
}

impl CatalogView for Servicio {
    const TITLE: &'static str = "Gestión de Servicios";
    const HEADING: &'static str = "Catálogo de Servicios";
    const ADD_LABEL: &'static str = "➕ Agregar Servicio";
    const LOADING: &'static str = "Cargando servicios...";

    fn secondary(&self) -> String {
        let mut line = format!(
            "Precio: ${:.2} | Duración: {} min.",
            self.precio, self.duracion_minutos
        );
        if let Some(descripcion) = self.descripcion.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(" | ");
            line.push_str(descripcion);
        }
        line
    }

    fn form_fields(ui: &mut egui::Ui, form: &mut ServicioForm) {
        widgets::text_field(ui, "Nombre", "", &mut form.nombre);
        widgets::text_field(ui, "Precio", "0.00", &mut form.precio);
        widgets::text_field(ui, "Duración (minutos)", "30", &mut form.duracion_minutos);
        widgets::text_field(ui, "Descripción", "Opcional", &mut form.descripcion);
    }
}

enum RowClick<Id> {
    Edit(Id),
    Delete(Id),
    Toggle(Id),
}

/// Draws the list, the delete confirmation and the add/edit form.
/// `toggle` adds the activo switch used by the barberos screen.
pub fn show<R: CatalogView>(
    ui: &mut egui::Ui,
    controller: &mut CatalogController<R>,
    theme: &ThemeConfig,
    toggle: Option<&dyn Fn(&R) -> bool>,
) -> Result<Option<R::Id>, ActionError> {
    ui.horizontal(|ui| {
        widgets::page_title(ui, theme, R::TITLE);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(R::ADD_LABEL).clicked() {
                controller.open_create();
            }
            if ui.button("⟳ Actualizar").clicked() {
                controller.refetch();
            }
        });
    });
    ui.add_space(8.0);

    if let Some(message) = controller.notice().map(str::to_string) {
        if widgets::alert(ui, theme, StatusColor::Error, &message) {
            controller.dismiss_notice();
        }
        ui.add_space(6.0);
    }

    ui.label(egui::RichText::new(R::HEADING).size(18.0).strong());
    ui.add_space(4.0);

    let mut click = None;
    let view = controller.view();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            widgets::list_states(ui, theme, &view, R::LOADING, |ui, records| {
                for record in records {
                    if let Some(c) = record_row(ui, theme, record, toggle) {
                        click = Some(c);
                    }
                }
            });
        });

    let ctx = ui.ctx().clone();
    let mut toggled = None;
    let clicked = match click {
        Some(RowClick::Edit(id)) => controller.open_edit(id),
        Some(RowClick::Delete(id)) => controller.request_delete(id),
        Some(RowClick::Toggle(id)) => {
            toggled = Some(id);
            Ok(())
        }
        None => Ok(()),
    };

    delete_window(&ctx, controller);
    let saved = form_window(&ctx, controller, theme);
    clicked.and(saved).map(|()| toggled)
}

fn record_row<R: CatalogView>(
    ui: &mut egui::Ui,
    theme: &ThemeConfig,
    record: &R,
    toggle: Option<&dyn Fn(&R) -> bool>,
) -> Option<RowClick<R::Id>> {
    let mut click = None;
    egui::Frame::NONE
        .fill(theme.surface())
        .corner_radius(egui::CornerRadius::same(theme.overrides.corner_radius))
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(record.display_name()).size(16.0).strong());
                    ui.label(
                        egui::RichText::new(record.secondary())
                            .color(theme.muted_text()),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Eliminar").clicked() {
                        click = Some(RowClick::Delete(record.id()));
                    }
                    if ui.button("Editar").clicked() {
                        click = Some(RowClick::Edit(record.id()));
                    }
                    if let Some(is_active) = toggle {
                        let label = if is_active(record) { "Desactivar" } else { "Activar" };
                        if ui.button(label).clicked() {
                            click = Some(RowClick::Toggle(record.id()));
                        }
                    }
                });
            });
        });
    ui.add_space(4.0);
    click
}

fn delete_window<R: CatalogView>(ctx: &egui::Context, controller: &mut CatalogController<R>) {
    let Some(prompt) = controller.pending_delete().map(|p| p.prompt.clone()) else {
        return;
    };

    let mut answer = None;
    egui::Window::new("Confirmar eliminación")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(prompt);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Eliminar").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancelar").clicked() {
                    answer = Some(false);
                }
            });
        });

    if let Some(accepted) = answer {
        controller.resolve_delete(accepted);
    }
}

fn form_window<R: CatalogView>(
    ctx: &egui::Context,
    controller: &mut CatalogController<R>,
    theme: &ThemeConfig,
) -> Result<(), ActionError> {
    let Some(form) = controller.form_mut() else {
        return Ok(());
    };

    let mut open = true;
    let mut submit = false;
    let mut cancel = false;
    egui::Window::new(form.title())
        .id(egui::Id::new(("catalog_form", R::LABEL)))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(380.0)
        .show(ctx, |ui| {
            R::form_fields(ui, &mut form.fields);
            if let Some(err) = &form.error {
                ui.add_space(6.0);
                widgets::notice(ui, theme, StatusColor::Error, err);
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if form.submitting { "Guardando..." } else { "Guardar" };
                submit = ui
                    .add_enabled(!form.submitting, egui::Button::new(label))
                    .clicked();
                cancel = ui.button("Cancelar").clicked();
            });
        });

    if !open || cancel {
        controller.close_form();
        return Ok(());
    }
    if submit {
        return controller.submit_form();
    }
    Ok(())
}

/// Barberos screen: the generic panel plus the activo toggle.
pub fn show_barberos(
    ui: &mut egui::Ui,
    controller: &mut CatalogController<Barbero>,
    theme: &ThemeConfig,
) -> Result<(), ActionError> {
    let is_active = |b: &Barbero| b.activo;
    let toggled: Option<BarberoId> = show(ui, controller, theme, Some(&is_active))?;
    match toggled {
        Some(id) => controller.toggle_active(id),
        None => Ok(()),
    }
}
