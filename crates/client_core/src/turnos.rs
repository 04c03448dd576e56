//! Appointment list with filters, per-row actions and the create form.

use std::sync::Arc;

use shared::{
    domain::{Barbero, BarberoId, Cliente, ClienteId, Servicio, ServicioId, Turno, TurnoEstado, TurnoId},
    protocol::CreateTurnoDto,
};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::{
    display::{parse_input_fields, DisplayZone},
    error::{ActionError, ApiError},
    fetch::{fetcher, FetchBinding, ListView, Mutations, RemoteCollectionState},
    filters::{FilterKey, FilterSet, FilterValue, TurnoQuery},
    BarbershopApi,
};

pub const MISSING_BARBERO: &str = "Barbero Eliminado/No Asignado";
pub const MISSING_CLIENTE: &str = "Cliente Eliminado/No Asignado";
pub const MISSING_SERVICIO: &str = "Servicio Desconocido";

const LOAD_FAILED: &str = "Error al cargar los turnos. Detalles: ";
const EMPTY_UNFILTERED: &str = "No hay turnos agendados. ¡Es hora de crear uno!";
const EMPTY_FILTERED: &str = "No hay turnos que coincidan con los filtros seleccionados.";
const CANCEL_FAILED: &str = "Ocurrió un error al intentar cancelar el turno.";
const DELETE_FAILED: &str = "Ocurrió un error al intentar eliminar el turno.";
const RESCHEDULE_MISSING_FIELDS: &str = "Debe seleccionar una nueva fecha y hora.";
const RESCHEDULE_FAILED: &str =
    "Error al reprogramar el turno. Verifique que el horario esté libre.";
const CREATE_MISSING_FIELDS: &str = "Por favor, complete todos los campos obligatorios.";
const CREATE_FAILED: &str = "Error desconocido al agendar el turno.";
const REFERENCE_FAILED: &str = "Error al cargar datos para el formulario: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Warning,
    Info,
    Success,
    Error,
}

impl From<TurnoEstado> for StatusColor {
    fn from(estado: TurnoEstado) -> Self {
        match estado {
            TurnoEstado::Pending => StatusColor::Warning,
            TurnoEstado::InProgress => StatusColor::Info,
            TurnoEstado::Done => StatusColor::Success,
            TurnoEstado::Cancelled => StatusColor::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnoAction {
    Cancel,
    Reschedule,
    Delete,
}

/// Actions offered for a turno in `estado`. Delete is always available.
pub fn available_actions(estado: TurnoEstado) -> &'static [TurnoAction] {
    if estado.is_open() {
        &[TurnoAction::Cancel, TurnoAction::Reschedule, TurnoAction::Delete]
    } else {
        &[TurnoAction::Delete]
    }
}

fn check_eligible(turno: &Turno, action: TurnoAction) -> Result<(), ActionError> {
    if available_actions(turno.estado).contains(&action) {
        Ok(())
    } else {
        Err(ActionError::NotEligible(turno.estado))
    }
}

fn barbero_name(barbero: Option<&Barbero>) -> String {
    barbero
        .map(Barbero::full_name)
        .unwrap_or_else(|| MISSING_BARBERO.to_string())
}

fn cliente_name(cliente: Option<&Cliente>) -> String {
    cliente
        .map(Cliente::full_name)
        .unwrap_or_else(|| MISSING_CLIENTE.to_string())
}

/// One rendered line of the turno list.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnoRow {
    pub id: TurnoId,
    pub cliente: String,
    pub barbero: String,
    pub servicio: String,
    pub duracion: String,
    pub fecha: String,
    pub hora: String,
    pub estado: TurnoEstado,
    pub color: StatusColor,
    pub actions: &'static [TurnoAction],
}

impl TurnoRow {
    pub fn new(turno: &Turno, zone: &DisplayZone) -> Self {
        Self {
            id: turno.id_turno,
            cliente: cliente_name(turno.cliente.as_ref()),
            barbero: barbero_name(turno.barbero.as_ref()),
            servicio: turno
                .servicio
                .as_ref()
                .map(|s| s.nombre.clone())
                .unwrap_or_else(|| MISSING_SERVICIO.to_string()),
            duracion: turno
                .servicio
                .as_ref()
                .map(|s| s.duracion_minutos.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            fecha: zone.date_label(turno.fecha_hora),
            hora: zone.time_label(turno.fecha_hora),
            estado: turno.estado,
            color: turno.estado.into(),
            actions: available_actions(turno.estado),
        }
    }

    pub fn title(&self) -> String {
        format!("{} con {}", self.cliente, self.barbero)
    }

    pub fn service_line(&self) -> String {
        format!("Servicio: {} ({} min.)", self.servicio, self.duracion)
    }

    pub fn date_line(&self) -> String {
        format!("Día: {} a las {}", self.fecha, self.hora)
    }

    pub fn allows(&self, action: TurnoAction) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Cancel(TurnoId),
    Delete(TurnoId),
}

/// Pending yes/no question shown before a destructive mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub action: ConfirmAction,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleDialog {
    pub turno_id: TurnoId,
    pub subtitle: String,
    pub date: String,
    pub time: String,
    pub error: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTurnoForm {
    pub cliente_id: Option<ClienteId>,
    pub barbero_id: Option<BarberoId>,
    pub servicio_id: Option<ServicioId>,
    pub date: String,
    pub time: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl NewTurnoForm {
    pub fn validate(&self) -> Result<CreateTurnoDto, String> {
        let missing = || CREATE_MISSING_FIELDS.to_string();
        let (Some(cliente_id), Some(barbero_id), Some(servicio_id)) =
            (self.cliente_id, self.barbero_id, self.servicio_id)
        else {
            return Err(missing());
        };
        if self.date.trim().is_empty() || self.time.trim().is_empty() {
            return Err(missing());
        }
        let fecha_hora = parse_input_fields(&self.date, &self.time)
            .ok_or_else(|| format!("Fecha u hora inválida: {} {}", self.date, self.time))?;

        Ok(CreateTurnoDto {
            fecha_hora,
            cliente_id,
            barbero_id,
            servicio_id,
        })
    }
}

/// Barbers, clients and services backing the pickers.
pub struct ReferenceData {
    barberos: FetchBinding<(), Vec<Barbero>>,
    clientes: FetchBinding<(), Vec<Cliente>>,
    servicios: FetchBinding<(), Vec<Servicio>>,
}

impl ReferenceData {
    pub fn new(api: Arc<dyn BarbershopApi>, runtime: Handle) -> Self {
        let mut barberos = FetchBinding::new("barberos", runtime.clone());
        let mut clientes = FetchBinding::new("clientes", runtime.clone());
        let mut servicios = FetchBinding::new("servicios", runtime);

        let source = api.clone();
        barberos.bind(
            (),
            fetcher(move || {
                let api = source.clone();
                async move { api.list_barberos().await }
            }),
        );
        let source = api.clone();
        clientes.bind(
            (),
            fetcher(move || {
                let api = source.clone();
                async move { api.list_clientes().await }
            }),
        );
        servicios.bind(
            (),
            fetcher(move || {
                let api = api.clone();
                async move { api.list_servicios().await }
            }),
        );

        Self {
            barberos,
            clientes,
            servicios,
        }
    }

    pub fn poll(&mut self) -> bool {
        let barberos = self.barberos.poll();
        let clientes = self.clientes.poll();
        let servicios = self.servicios.poll();
        barberos || clientes || servicios
    }

    pub async fn settled(&mut self) {
        self.barberos.settled().await;
        self.clientes.settled().await;
        self.servicios.settled().await;
    }

    pub fn refetch(&mut self) {
        self.barberos.refetch();
        self.clientes.refetch();
        self.servicios.refetch();
    }

    pub fn loading(&self) -> bool {
        self.barberos.loading() || self.clientes.loading() || self.servicios.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.barberos
            .error()
            .or(self.clientes.error())
            .or(self.servicios.error())
            .map(|err| format!("{REFERENCE_FAILED}{err}"))
    }

    pub fn barberos(&self) -> &[Barbero] {
        self.barberos.data().map(Vec::as_slice).unwrap_or_default()
    }

    /// Only active barbers can take new appointments.
    pub fn active_barberos(&self) -> impl Iterator<Item = &Barbero> {
        self.barberos().iter().filter(|b| b.activo)
    }

    pub fn clientes(&self) -> &[Cliente] {
        self.clientes.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn servicios(&self) -> &[Servicio] {
        self.servicios.data().map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnoMutation {
    Cancel(TurnoId),
    Delete(TurnoId),
    Reschedule(TurnoId),
    Create,
}

/// Filtered turno list.
///
/// Owns the filter set and derives the list query from it; the binding
/// re-fetches whenever that query changes. Mutations never touch the list
/// locally: a successful one triggers `refetch()`.
pub struct TurnosListController {
    api: Arc<dyn BarbershopApi>,
    zone: DisplayZone,
    filters: FilterSet,
    binding: FetchBinding<TurnoQuery, Vec<Turno>>,
    reference: ReferenceData,
    mutations: Mutations<TurnoMutation>,
    confirmation: Option<Confirmation>,
    reschedule: Option<RescheduleDialog>,
    create_form: Option<NewTurnoForm>,
    notice: Option<String>,
}

impl TurnosListController {
    pub fn new(api: Arc<dyn BarbershopApi>, runtime: Handle, zone: DisplayZone) -> Self {
        let mut controller = Self {
            reference: ReferenceData::new(api.clone(), runtime.clone()),
            binding: FetchBinding::new("turnos", runtime.clone()),
            mutations: Mutations::new(runtime),
            api,
            zone,
            filters: FilterSet::new(),
            confirmation: None,
            reschedule: None,
            create_form: None,
            notice: None,
        };
        controller.bind_current_query();
        controller
    }

    fn bind_current_query(&mut self) -> bool {
        let query = self.filters.derive_query();
        let api = self.api.clone();
        let bound = query.clone();
        self.binding.bind(
            query,
            fetcher(move || {
                let api = api.clone();
                let query = bound.clone();
                async move { api.list_turnos(&query).await }
            }),
        )
    }

    /// Merge `patch` into the filters. Returns whether a new fetch started.
    pub fn update_filters(&mut self, patch: FilterSet) -> bool {
        self.filters.merge(patch);
        self.bind_current_query()
    }

    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<FilterValue>) -> bool {
        self.update_filters(FilterSet::new().with(key, value))
    }

    pub fn clear_filters(&mut self) -> bool {
        self.filters.clear();
        self.bind_current_query()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn refetch(&mut self) {
        self.binding.refetch();
    }

    pub fn state(&self) -> &RemoteCollectionState<Vec<Turno>> {
        self.binding.state()
    }

    pub fn zone(&self) -> &DisplayZone {
        &self.zone
    }

    pub fn view(&self) -> ListView<TurnoRow> {
        let empty = if self.filters.is_active() {
            EMPTY_FILTERED
        } else {
            EMPTY_UNFILTERED
        };
        self.binding
            .state()
            .list_view(|turno| TurnoRow::new(turno, &self.zone), LOAD_FAILED, empty)
    }

    pub fn find(&self, id: TurnoId) -> Option<&Turno> {
        self.binding
            .data()
            .and_then(|turnos| turnos.iter().find(|t| t.id_turno == id))
    }

    fn known(&self, id: TurnoId) -> Result<&Turno, ActionError> {
        self.find(id)
            .ok_or_else(|| ActionError::UnknownRecord(format!("turno {id}")))
    }

    pub fn request_cancel(&mut self, id: TurnoId) -> Result<(), ActionError> {
        if self.confirmation.is_some() {
            return Err(ActionError::ConfirmationPending);
        }
        check_eligible(self.known(id)?, TurnoAction::Cancel)?;
        self.confirmation = Some(Confirmation {
            action: ConfirmAction::Cancel(id),
            prompt: format!("¿Estás seguro de que quieres cancelar el turno {id}?"),
        });
        Ok(())
    }

    pub fn request_delete(&mut self, id: TurnoId) -> Result<(), ActionError> {
        if self.confirmation.is_some() {
            return Err(ActionError::ConfirmationPending);
        }
        self.known(id)?;
        self.confirmation = Some(Confirmation {
            action: ConfirmAction::Delete(id),
            prompt: format!(
                "¿Estás seguro de que quieres eliminar el turno {id}? Esta acción es irreversible."
            ),
        });
        Ok(())
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Answer the pending confirmation. Returns whether a mutation was sent.
    pub fn resolve_confirmation(&mut self, accepted: bool) -> bool {
        let Some(confirmation) = self.confirmation.take() else {
            return false;
        };
        if !accepted {
            return false;
        }

        let api = self.api.clone();
        match confirmation.action {
            ConfirmAction::Cancel(id) => {
                info!(turno = %id, "cancelling turno");
                self.mutations
                    .spawn(TurnoMutation::Cancel(id), async move { api.cancel_turno(id).await });
            }
            ConfirmAction::Delete(id) => {
                info!(turno = %id, "deleting turno");
                self.mutations
                    .spawn(TurnoMutation::Delete(id), async move { api.delete_turno(id).await });
            }
        }
        true
    }

    pub fn open_reschedule(&mut self, id: TurnoId) -> Result<(), ActionError> {
        let turno = self.known(id)?;
        check_eligible(turno, TurnoAction::Reschedule)?;

        let (date, time) = self.zone.input_fields(turno.fecha_hora);
        let subtitle = format!(
            "Cliente: {} con {}",
            cliente_name(turno.cliente.as_ref()),
            barbero_name(turno.barbero.as_ref())
        );
        self.reschedule = Some(RescheduleDialog {
            turno_id: id,
            subtitle,
            date,
            time,
            error: None,
            submitting: false,
        });
        Ok(())
    }

    pub fn reschedule_dialog(&self) -> Option<&RescheduleDialog> {
        self.reschedule.as_ref()
    }

    pub fn reschedule_dialog_mut(&mut self) -> Option<&mut RescheduleDialog> {
        self.reschedule.as_mut()
    }

    pub fn submit_reschedule(&mut self) -> Result<(), ActionError> {
        let dialog = self.reschedule.as_mut().ok_or(ActionError::NoOpenForm)?;
        if dialog.submitting {
            return Err(ActionError::AlreadySubmitting);
        }
        if dialog.date.trim().is_empty() || dialog.time.trim().is_empty() {
            dialog.error = Some(RESCHEDULE_MISSING_FIELDS.to_string());
            return Err(ActionError::Validation(RESCHEDULE_MISSING_FIELDS.to_string()));
        }
        let Some(fecha_hora) = parse_input_fields(&dialog.date, &dialog.time) else {
            let message = format!("Fecha u hora inválida: {} {}", dialog.date, dialog.time);
            dialog.error = Some(message.clone());
            return Err(ActionError::Validation(message));
        };

        dialog.submitting = true;
        dialog.error = None;
        let id = dialog.turno_id;
        let api = self.api.clone();
        info!(turno = %id, %fecha_hora, "rescheduling turno");
        self.mutations.spawn(TurnoMutation::Reschedule(id), async move {
            api.reschedule_turno(id, fecha_hora).await
        });
        Ok(())
    }

    pub fn close_reschedule(&mut self) {
        self.reschedule = None;
    }

    pub fn open_create_form(&mut self) {
        self.create_form.get_or_insert_with(NewTurnoForm::default);
    }

    pub fn create_form(&self) -> Option<&NewTurnoForm> {
        self.create_form.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut NewTurnoForm> {
        self.create_form.as_mut()
    }

    pub fn submit_create(&mut self) -> Result<(), ActionError> {
        let form = self.create_form.as_mut().ok_or(ActionError::NoOpenForm)?;
        if form.submitting {
            return Err(ActionError::AlreadySubmitting);
        }
        let dto = match form.validate() {
            Ok(dto) => dto,
            Err(message) => {
                form.error = Some(message.clone());
                return Err(ActionError::Validation(message));
            }
        };

        form.submitting = true;
        form.error = None;
        let api = self.api.clone();
        info!(barbero = %dto.barbero_id, cliente = %dto.cliente_id, "creating turno");
        self.mutations
            .spawn(TurnoMutation::Create, async move { api.create_turno(dto).await });
        Ok(())
    }

    pub fn close_create_form(&mut self) {
        self.create_form = None;
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn reference_mut(&mut self) -> &mut ReferenceData {
        &mut self.reference
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn busy(&self) -> bool {
        self.mutations.pending() > 0
    }

    /// Commit settled fetches and react to finished mutations. Call once
    /// per frame.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.binding.poll();
        changed |= self.reference.poll();
        for (mutation, result) in self.mutations.poll() {
            self.apply_mutation(mutation, result);
            changed = true;
        }
        changed
    }

    /// Wait for every in-flight mutation and fetch to settle.
    pub async fn settle(&mut self) {
        while let Some((mutation, result)) = self.mutations.next().await {
            self.apply_mutation(mutation, result);
        }
        self.binding.settled().await;
        self.reference.settled().await;
    }

    fn apply_mutation(&mut self, mutation: TurnoMutation, result: Result<(), ApiError>) {
        match (mutation, result) {
            (TurnoMutation::Cancel(_) | TurnoMutation::Delete(_), Ok(())) => self.refetch(),
            (TurnoMutation::Cancel(id), Err(err)) => {
                warn!(turno = %id, error = %err, "cancel failed");
                self.notice = Some(err.user_message(CANCEL_FAILED));
            }
            (TurnoMutation::Delete(id), Err(err)) => {
                warn!(turno = %id, error = %err, "delete failed");
                self.notice = Some(err.user_message(DELETE_FAILED));
            }
            (TurnoMutation::Reschedule(id), Ok(())) => {
                if self.reschedule.as_ref().map(|d| d.turno_id) == Some(id) {
                    self.reschedule = None;
                }
                self.refetch();
            }
            (TurnoMutation::Reschedule(id), Err(err)) => {
                warn!(turno = %id, error = %err, "reschedule failed");
                let message = err.user_message(RESCHEDULE_FAILED);
                match self.reschedule.as_mut().filter(|d| d.turno_id == id) {
                    Some(dialog) => {
                        dialog.submitting = false;
                        dialog.error = Some(message);
                    }
                    None => self.notice = Some(message),
                }
            }
            (TurnoMutation::Create, Ok(())) => {
                self.create_form = None;
                self.refetch();
            }
            (TurnoMutation::Create, Err(err)) => {
                warn!(error = %err, "create failed");
                let message = err.user_message(CREATE_FAILED);
                match self.create_form.as_mut() {
                    Some(form) => {
                        form.submitting = false;
                        form.error = Some(message);
                    }
                    None => self.notice = Some(message),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/turnos_tests.rs"]
mod tests;
