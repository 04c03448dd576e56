use std::{sync::Arc, time::Duration};

use client_core::{
    catalog::{BarberosController, ClientesController, ServiciosController},
    display::DisplayZone,
    report::ReportController,
    turnos::{StatusColor, TurnosListController},
    ActionError, BarbershopApi,
};
use eframe::egui;
use tokio::runtime::Handle;

use crate::{
    controller::events::{UiError, UiErrorContext},
    ui::{
        panels::{catalog, report, turnos::TurnosPanel},
        theme::{PaletteMode, ThemeConfig},
        widgets,
    },
};

pub struct StartupConfig {
    pub api: Arc<dyn BarbershopApi>,
    pub api_url: String,
    pub runtime: Handle,
    pub zone: DisplayZone,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Inicio,
    Turnos,
    Barberos,
    Clientes,
    Servicios,
    Reportes,
}

impl Section {
    pub const NAV: [Section; 5] = [
        Section::Turnos,
        Section::Barberos,
        Section::Clientes,
        Section::Servicios,
        Section::Reportes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Inicio => "Inicio",
            Section::Turnos => "Gestión de Turnos",
            Section::Barberos => "Barberos",
            Section::Clientes => "Clientes",
            Section::Servicios => "Servicios",
            Section::Reportes => "Reportes",
        }
    }

    fn error_context(self) -> Option<UiErrorContext> {
        match self {
            Section::Inicio => None,
            Section::Turnos => Some(UiErrorContext::Turnos),
            Section::Barberos => Some(UiErrorContext::Barberos),
            Section::Clientes => Some(UiErrorContext::Clientes),
            Section::Servicios => Some(UiErrorContext::Servicios),
            Section::Reportes => Some(UiErrorContext::Reportes),
        }
    }
}

/// The open screen. Replacing it drops the controller, which aborts its
/// in-flight fetches; mutations already sent still reach the server.
enum ActiveView {
    Inicio,
    Turnos(Box<TurnosListController>, TurnosPanel),
    Barberos(BarberosController),
    Clientes(ClientesController),
    Servicios(ServiciosController),
    Reportes(ReportController),
}

impl ActiveView {
    fn poll(&mut self) -> bool {
        match self {
            ActiveView::Inicio => false,
            ActiveView::Turnos(controller, _) => controller.poll(),
            ActiveView::Barberos(controller) => controller.poll(),
            ActiveView::Clientes(controller) => controller.poll(),
            ActiveView::Servicios(controller) => controller.poll(),
            ActiveView::Reportes(controller) => controller.poll(),
        }
    }
}

pub struct DashboardApp {
    api: Arc<dyn BarbershopApi>,
    api_url: String,
    runtime: Handle,
    zone: DisplayZone,
    theme: ThemeConfig,
    applied_theme: Option<ThemeConfig>,
    section: Section,
    view: ActiveView,
    status_banner: Option<UiError>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup: StartupConfig) -> Self {
        Self {
            api: startup.api,
            api_url: startup.api_url,
            runtime: startup.runtime,
            zone: startup.zone,
            theme: startup.theme,
            applied_theme: None,
            section: Section::Inicio,
            view: ActiveView::Inicio,
            status_banner: None,
        }
    }

    fn navigate(&mut self, section: Section) {
        if self.section == section {
            return;
        }
        tracing::info!(from = self.section.label(), to = section.label(), "navigating");

        let api = self.api.clone();
        let runtime = self.runtime.clone();
        self.view = match section {
            Section::Inicio => ActiveView::Inicio,
            Section::Turnos => ActiveView::Turnos(
                Box::new(TurnosListController::new(api, runtime, self.zone)),
                TurnosPanel::default(),
            ),
            Section::Barberos => ActiveView::Barberos(BarberosController::new(api, runtime)),
            Section::Clientes => ActiveView::Clientes(ClientesController::new(api, runtime)),
            Section::Servicios => ActiveView::Servicios(ServiciosController::new(api, runtime)),
            Section::Reportes => {
                ActiveView::Reportes(ReportController::new(api, runtime, self.zone))
            }
        };
        self.section = section;
        self.status_banner = None;
    }

    fn raise(&mut self, err: &ActionError) {
        let Some(context) = self.section.error_context() else {
            return;
        };
        let err = UiError::from_action(context, err);
        if err.shown_inline() {
            return;
        }
        tracing::warn!(
            context = err.context().label(),
            category = ?err.category(),
            error = err.message(),
            "action refused"
        );
        self.status_banner = Some(err);
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.theme) {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = self.theme.visuals();
        style.visuals.widgets.inactive.bg_stroke =
            egui::Stroke::new(1.0, style.visuals.widgets.noninteractive.bg_stroke.color);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        ctx.set_style(style);

        self.applied_theme = Some(self.theme);
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::NONE
                    .fill(self.theme.chrome(self.theme.overrides.top_bar))
                    .inner_margin(egui::Margin::symmetric(14, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let title = ui.add(
                        egui::Label::new(
                            egui::RichText::new("PeluMaster 💈")
                                .size(20.0)
                                .strong()
                                .color(self.theme.strong_text()),
                        )
                        .sense(egui::Sense::click()),
                    );
                    if title.clicked() {
                        self.navigate(Section::Inicio);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (icon, next) = match self.theme.mode {
                            PaletteMode::Dark => ("☀", PaletteMode::Light),
                            PaletteMode::Light => ("🌙", PaletteMode::Dark),
                        };
                        if ui.button(icon).on_hover_text("Cambiar tema").clicked() {
                            self.theme.mode = next;
                        }
                        ui.label(
                            egui::RichText::new(&self.api_url)
                                .small()
                                .color(self.theme.muted_text()),
                        );
                    });
                });
            });
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("navigation")
            .resizable(false)
            .exact_width(210.0)
            .frame(
                egui::Frame::NONE
                    .fill(self.theme.chrome(self.theme.overrides.sidebar))
                    .inner_margin(egui::Margin::symmetric(8, 12)),
            )
            .show(ctx, |ui| {
                let mut target = None;
                for section in Section::NAV {
                    let selected = self.section == section;
                    let text = egui::RichText::new(section.label()).color(if selected {
                        self.theme.primary.color32()
                    } else {
                        self.theme.muted_text()
                    });
                    let fill = if selected {
                        self.theme.nav_selected_fill()
                    } else {
                        egui::Color32::TRANSPARENT
                    };
                    let button = egui::Button::new(text).fill(fill).frame(selected);
                    if ui
                        .add_sized([ui.available_width(), 34.0], button)
                        .clicked()
                    {
                        target = Some(section);
                    }
                }
                if let Some(section) = target {
                    self.navigate(section);
                }
            });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = &self.status_banner else {
            return;
        };
        if widgets::alert(ui, &self.theme, StatusColor::Warning, &banner.banner_text()) {
            self.status_banner = None;
        }
        ui.add_space(6.0);
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        let mut target = None;
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.label(
                egui::RichText::new("Bienvenido a PeluMaster ✂️")
                    .size(36.0)
                    .strong()
                    .color(self.theme.primary.color32()),
            );
            ui.label(
                egui::RichText::new("Tu sistema integral para la gestión de turnos y barberos.")
                    .size(18.0)
                    .color(self.theme.muted_text()),
            );
            ui.add_space(24.0);
            ui.horizontal(|ui| {
                for section in Section::NAV {
                    if ui.button(section.label()).clicked() {
                        target = Some(section);
                    }
                }
            });
        });
        if let Some(section) = target {
            self.navigate(section);
        }
    }

    fn show_active_view(&mut self, ui: &mut egui::Ui) {
        if matches!(self.view, ActiveView::Inicio) {
            self.show_home(ui);
            return;
        }

        let theme = self.theme;
        let outcome = match &mut self.view {
            ActiveView::Inicio => Ok(()),
            ActiveView::Turnos(controller, panel) => panel.show(ui, controller, &theme),
            ActiveView::Barberos(controller) => catalog::show_barberos(ui, controller, &theme),
            ActiveView::Clientes(controller) => {
                catalog::show(ui, controller, &theme, None).map(|_| ())
            }
            ActiveView::Servicios(controller) => {
                catalog::show(ui, controller, &theme, None).map(|_| ())
            }
            ActiveView::Reportes(controller) => report::show(ui, controller, &theme),
        };
        if let Err(err) = outcome {
            self.raise(&err);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.view.poll() {
            ctx.request_repaint();
        }
        self.apply_theme_if_needed(ctx);

        self.show_top_bar(ctx);
        self.show_navigation(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            self.show_active_view(ui);
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_lists_every_screen_once() {
        let labels: Vec<_> = Section::NAV.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            ["Gestión de Turnos", "Barberos", "Clientes", "Servicios", "Reportes"]
        );
        assert!(!Section::NAV.contains(&Section::Inicio));
    }

    #[test]
    fn home_has_no_error_context() {
        assert_eq!(Section::Inicio.error_context(), None);
        assert_eq!(Section::Reportes.error_context(), Some(UiErrorContext::Reportes));
    }
}
