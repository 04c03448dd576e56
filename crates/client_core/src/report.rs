//! Per-barber earnings report.

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;
use shared::{
    domain::{Barbero, BarberoId, Turno, TurnoEstado, TurnoId},
    protocol::ReporteBarbero,
};
use tokio::runtime::Handle;
use tracing::info;

use crate::{
    display::{parse_optional_date, DisplayZone},
    error::ActionError,
    fetch::{fetcher, FetchBinding},
    turnos::{StatusColor, MISSING_CLIENTE, MISSING_SERVICIO},
    BarbershopApi,
};

const NO_BARBERO: &str = "Debe seleccionar un barbero.";
const REPORT_FAILED: &str = "Error al generar el reporte: ";
const BARBEROS_FAILED: &str = "Error al cargar la lista de barberos.";
const NO_ACTIVE_TURNOS: &str = "No se encontraron turnos activos en el rango seleccionado.";

/// Parameters of `GET /reportes/barbero/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportQuery {
    pub barbero_id: BarberoId,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn new(barbero_id: BarberoId) -> Self {
        Self {
            barbero_id,
            desde: None,
            hasta: None,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        [("desde", self.desde), ("hasta", self.hasta)]
            .into_iter()
            .filter_map(|(name, date)| date.map(|d| (name, d.format("%Y-%m-%d").to_string())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: TurnoId,
    pub fecha: String,
    pub cliente: String,
    pub servicio: String,
    pub precio: f64,
    pub estado: TurnoEstado,
    pub color: StatusColor,
}

/// Client-side totals over the turnos of one report. Cancelled turnos are
/// left out of every figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub active: usize,
    pub done: usize,
    pub gross: f64,
    pub by_day: Vec<(NaiveDate, usize)>,
    pub rows: Vec<ReportRow>,
}

impl ReportSummary {
    pub fn new(turnos: &[Turno], zone: &DisplayZone) -> Self {
        let active: Vec<&Turno> = turnos
            .iter()
            .filter(|t| t.estado != TurnoEstado::Cancelled)
            .collect();

        let gross: f64 = active
            .iter()
            .filter_map(|t| t.servicio.as_ref())
            .map(|s| s.precio)
            .sum();

        let mut by_day = BTreeMap::new();
        for turno in &active {
            *by_day.entry(zone.day(turno.fecha_hora)).or_insert(0) += 1;
        }

        let rows = active
            .iter()
            .map(|t| ReportRow {
                id: t.id_turno,
                fecha: zone.date_label(t.fecha_hora),
                cliente: t
                    .cliente
                    .as_ref()
                    .map(|c| c.full_name())
                    .unwrap_or_else(|| MISSING_CLIENTE.to_string()),
                servicio: t
                    .servicio
                    .as_ref()
                    .map(|s| s.nombre.clone())
                    .unwrap_or_else(|| MISSING_SERVICIO.to_string()),
                precio: t.servicio.as_ref().map_or(0.0, |s| s.precio),
                estado: t.estado,
                color: t.estado.into(),
            })
            .collect();

        Self {
            active: active.len(),
            done: active.iter().filter(|t| t.estado == TurnoEstado::Done).count(),
            gross: (gross * 100.0).round() / 100.0,
            by_day: by_day.into_iter().collect(),
            rows,
        }
    }

    pub fn gross_label(&self) -> String {
        format!("${:.2}", self.gross)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportView {
    /// Nothing generated yet.
    Idle,
    Loading,
    Failed(String),
    Empty(String),
    Ready(ReportSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub barbero_id: Option<BarberoId>,
    pub desde: String,
    pub hasta: String,
}

pub struct ReportController {
    api: Arc<dyn BarbershopApi>,
    zone: DisplayZone,
    barberos: FetchBinding<(), Vec<Barbero>>,
    report: FetchBinding<ReportQuery, ReporteBarbero>,
    pub form: ReportForm,
    validation: Option<String>,
}

impl ReportController {
    pub fn new(api: Arc<dyn BarbershopApi>, runtime: Handle, zone: DisplayZone) -> Self {
        let mut barberos = FetchBinding::new("report-barberos", runtime.clone());
        let source = api.clone();
        barberos.bind(
            (),
            fetcher(move || {
                let api = source.clone();
                async move { api.list_barberos().await }
            }),
        );

        Self {
            api,
            zone,
            barberos,
            report: FetchBinding::new("report", runtime),
            form: ReportForm::default(),
            validation: None,
        }
    }

    pub fn barberos(&self) -> &[Barbero] {
        self.barberos.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn barberos_loading(&self) -> bool {
        self.barberos.loading()
    }

    pub fn barberos_error(&self) -> Option<&'static str> {
        self.barberos.error().map(|_| BARBEROS_FAILED)
    }

    pub fn selected_barbero(&self) -> Option<&Barbero> {
        let id = self.form.barbero_id?;
        self.barberos().iter().find(|b| b.id_barbero == id)
    }

    pub fn validation(&self) -> Option<&str> {
        self.validation.as_deref()
    }

    fn query_from_form(&self) -> Result<ReportQuery, String> {
        let barbero_id = self.form.barbero_id.ok_or_else(|| NO_BARBERO.to_string())?;
        Ok(ReportQuery {
            barbero_id,
            desde: parse_optional_date(&self.form.desde)?,
            hasta: parse_optional_date(&self.form.hasta)?,
        })
    }

    /// Fetch the report for the current form. Generating the same query
    /// again fetches fresh data.
    pub fn generate(&mut self) -> Result<(), ActionError> {
        let query = match self.query_from_form() {
            Ok(query) => query,
            Err(message) => {
                self.validation = Some(message.clone());
                return Err(ActionError::Validation(message));
            }
        };
        self.validation = None;

        info!(barbero = %query.barbero_id, desde = ?query.desde, hasta = ?query.hasta, "generating report");
        let api = self.api.clone();
        let bound = query.clone();
        let started = self.report.bind(
            query,
            fetcher(move || {
                let api = api.clone();
                let query = bound.clone();
                async move { api.reporte_barbero(&query).await }
            }),
        );
        if !started {
            self.report.refetch();
        }
        Ok(())
    }

    pub fn generating(&self) -> bool {
        self.report.loading()
    }

    pub fn view(&self) -> ReportView {
        let state = self.report.state();
        if state.loading {
            return ReportView::Loading;
        }
        if let Some(err) = &state.error {
            return ReportView::Failed(format!("{REPORT_FAILED}{err}"));
        }
        match &state.data {
            None => ReportView::Idle,
            Some(report) => {
                let summary = ReportSummary::new(&report.turnos, &self.zone);
                if summary.active == 0 {
                    ReportView::Empty(NO_ACTIVE_TURNOS.to_string())
                } else {
                    ReportView::Ready(summary)
                }
            }
        }
    }

    pub fn poll(&mut self) -> bool {
        let barberos = self.barberos.poll();
        let report = self.report.poll();
        barberos || report
    }

    pub async fn settle(&mut self) {
        self.barberos.settled().await;
        self.report.settled().await;
    }
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
