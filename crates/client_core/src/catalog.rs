//! CRUD screens for barbers, clients and services.
//!
//! The three catalogs behave identically apart from their fields, so one
//! [`CatalogController`] drives all of them through [`CatalogResource`].

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use shared::{
    domain::{Barbero, BarberoId, Cliente, ClienteId, Servicio, ServicioId},
    protocol::{
        CreateBarberoDto, CreateClienteDto, CreateServicioDto, UpdateBarberoDto,
        UpdateClienteDto, UpdateServicioDto,
    },
};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::{
    error::{ActionError, ApiError},
    fetch::{fetcher, FetchBinding, ListView, Mutations, RemoteCollectionState},
    BarbershopApi,
};

/// A record type managed by a catalog screen.
#[async_trait]
pub trait CatalogResource: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static;
    /// Raw form input, as typed by the user.
    type Form: Clone + Default + PartialEq + fmt::Debug;
    /// Validated form contents, ready to send.
    type Draft: Send + 'static;

    /// Singular noun used in messages ("barbero").
    const LABEL: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> Self::Id;
    fn display_name(&self) -> String;
    fn delete_prompt(&self) -> String;
    fn form_from(&self) -> Self::Form;
    fn validate(form: &Self::Form) -> Result<Self::Draft, String>;

    async fn list(api: Arc<dyn BarbershopApi>) -> Result<Vec<Self>, ApiError>;
    async fn save(
        api: Arc<dyn BarbershopApi>,
        id: Option<Self::Id>,
        draft: Self::Draft,
    ) -> Result<(), ApiError>;
    async fn delete(api: Arc<dyn BarbershopApi>, id: Self::Id) -> Result<(), ApiError>;
}

fn required(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn optional(value: &str) -> Option<String> {
    required(value).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarberoForm {
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub activo: bool,
}

impl Default for BarberoForm {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            apellido: String::new(),
            telefono: String::new(),
            activo: true,
        }
    }
}

#[async_trait]
impl CatalogResource for Barbero {
    type Id = BarberoId;
    type Form = BarberoForm;
    type Draft = BarberoForm;

    const LABEL: &'static str = "barbero";
    const PLURAL: &'static str = "barberos";

    fn id(&self) -> BarberoId {
        self.id_barbero
    }

    fn display_name(&self) -> String {
        self.full_name()
    }

    fn delete_prompt(&self) -> String {
        format!("¿Estás seguro de ELIMINAR al barbero {}?", self.full_name())
    }

    fn form_from(&self) -> BarberoForm {
        BarberoForm {
            nombre: self.nombre.clone(),
            apellido: self.apellido.clone(),
            telefono: self.telefono.clone().unwrap_or_default(),
            activo: self.activo,
        }
    }

    fn validate(form: &BarberoForm) -> Result<BarberoForm, String> {
        match (required(&form.nombre), required(&form.apellido)) {
            (Some(nombre), Some(apellido)) => Ok(BarberoForm {
                nombre: nombre.to_string(),
                apellido: apellido.to_string(),
                telefono: form.telefono.trim().to_string(),
                activo: form.activo,
            }),
            _ => Err("Nombre y Apellido son obligatorios.".to_string()),
        }
    }

    async fn list(api: Arc<dyn BarbershopApi>) -> Result<Vec<Self>, ApiError> {
        api.list_barberos().await
    }

    async fn save(
        api: Arc<dyn BarbershopApi>,
        id: Option<BarberoId>,
        draft: BarberoForm,
    ) -> Result<(), ApiError> {
        match id {
            Some(id) => {
                let dto = UpdateBarberoDto {
                    nombre: Some(draft.nombre),
                    apellido: Some(draft.apellido),
                    telefono: Some(draft.telefono),
                    activo: Some(draft.activo),
                };
                api.update_barbero(id, dto).await
            }
            None => {
                let dto = CreateBarberoDto {
                    nombre: draft.nombre,
                    apellido: draft.apellido,
                    telefono: draft.telefono,
                };
                api.create_barbero(dto).await
            }
        }
    }

    async fn delete(api: Arc<dyn BarbershopApi>, id: BarberoId) -> Result<(), ApiError> {
        api.delete_barbero(id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClienteForm {
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub email: String,
}

#[async_trait]
impl CatalogResource for Cliente {
    type Id = ClienteId;
    type Form = ClienteForm;
    type Draft = CreateClienteDto;

    const LABEL: &'static str = "cliente";
    const PLURAL: &'static str = "clientes";

    fn id(&self) -> ClienteId {
        self.id_cliente
    }

    fn display_name(&self) -> String {
        self.full_name()
    }

    fn delete_prompt(&self) -> String {
        format!("¿Estás seguro de ELIMINAR al cliente {}?", self.full_name())
    }

    fn form_from(&self) -> ClienteForm {
        ClienteForm {
            nombre: self.nombre.clone(),
            apellido: self.apellido.clone(),
            telefono: self.telefono.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        }
    }

    fn validate(form: &ClienteForm) -> Result<CreateClienteDto, String> {
        match (
            required(&form.nombre),
            required(&form.apellido),
            required(&form.telefono),
        ) {
            (Some(nombre), Some(apellido), Some(telefono)) => Ok(CreateClienteDto {
                nombre: nombre.to_string(),
                apellido: apellido.to_string(),
                telefono: telefono.to_string(),
                email: optional(&form.email),
            }),
            _ => Err("Nombre, Apellido y Teléfono son obligatorios.".to_string()),
        }
    }

    async fn list(api: Arc<dyn BarbershopApi>) -> Result<Vec<Self>, ApiError> {
        api.list_clientes().await
    }

    async fn save(
        api: Arc<dyn BarbershopApi>,
        id: Option<ClienteId>,
        draft: CreateClienteDto,
    ) -> Result<(), ApiError> {
        match id {
            Some(id) => {
                let dto = UpdateClienteDto {
                    nombre: Some(draft.nombre),
                    apellido: Some(draft.apellido),
                    telefono: Some(draft.telefono),
                    email: draft.email,
                };
                api.update_cliente(id, dto).await
            }
            None => api.create_cliente(draft).await,
        }
    }

    async fn delete(api: Arc<dyn BarbershopApi>, id: ClienteId) -> Result<(), ApiError> {
        api.delete_cliente(id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicioForm {
    pub nombre: String,
    pub precio: String,
    pub duracion_minutos: String,
    pub descripcion: String,
}

#[async_trait]
impl CatalogResource for Servicio {
    type Id = ServicioId;
    type Form = ServicioForm;
    type Draft = CreateServicioDto;

    const LABEL: &'static str = "servicio";
    const PLURAL: &'static str = "servicios";

    fn id(&self) -> ServicioId {
        self.id_servicio
    }

    fn display_name(&self) -> String {
        self.nombre.clone()
    }

    fn delete_prompt(&self) -> String {
        format!(
            "¿Estás seguro de ELIMINAR el servicio \"{}\"? Esta acción es irreversible.",
            self.nombre
        )
    }

    fn form_from(&self) -> ServicioForm {
        ServicioForm {
            nombre: self.nombre.clone(),
            precio: self.precio.to_string(),
            duracion_minutos: self.duracion_minutos.to_string(),
            descripcion: self.descripcion.clone().unwrap_or_default(),
        }
    }

    fn validate(form: &ServicioForm) -> Result<CreateServicioDto, String> {
        let (Some(nombre), Some(precio), Some(duracion)) = (
            required(&form.nombre),
            required(&form.precio),
            required(&form.duracion_minutos),
        ) else {
            return Err("Nombre, Precio y Duración son obligatorios.".to_string());
        };

        let precio = precio.parse::<f64>().ok().filter(|p| p.is_finite() && *p > 0.0);
        let duracion = duracion.parse::<u32>().ok().filter(|d| *d > 0);
        let (Some(precio), Some(duracion_minutos)) = (precio, duracion) else {
            return Err("Precio y Duración deben ser números positivos válidos.".to_string());
        };

        Ok(CreateServicioDto {
            nombre: nombre.to_string(),
            duracion_minutos,
            precio,
            descripcion: optional(&form.descripcion),
        })
    }

    async fn list(api: Arc<dyn BarbershopApi>) -> Result<Vec<Self>, ApiError> {
        api.list_servicios().await
    }

    async fn save(
        api: Arc<dyn BarbershopApi>,
        id: Option<ServicioId>,
        draft: CreateServicioDto,
    ) -> Result<(), ApiError> {
        match id {
            Some(id) => {
                let dto = UpdateServicioDto {
                    nombre: Some(draft.nombre),
                    duracion_minutos: Some(draft.duracion_minutos),
                    precio: Some(draft.precio),
                    descripcion: draft.descripcion,
                };
                api.update_servicio(id, dto).await
            }
            None => api.create_servicio(draft).await,
        }
    }

    async fn delete(api: Arc<dyn BarbershopApi>, id: ServicioId) -> Result<(), ApiError> {
        api.delete_servicio(id).await
    }
}

pub type BarberosController = CatalogController<Barbero>;
pub type ClientesController = CatalogController<Cliente>;
pub type ServiciosController = CatalogController<Servicio>;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogForm<R: CatalogResource> {
    /// `None` while creating.
    pub editing: Option<R::Id>,
    pub fields: R::Form,
    pub error: Option<String>,
    pub submitting: bool,
}

impl<R: CatalogResource> CatalogForm<R> {
    pub fn title(&self) -> String {
        match self.editing {
            Some(_) => format!("Editar {}", capitalized(R::LABEL)),
            None => format!("Agregar Nuevo {}", capitalized(R::LABEL)),
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete<Id> {
    pub id: Id,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogMutation<Id> {
    Save,
    Delete(Id),
    Toggle(Id),
}

pub struct CatalogController<R: CatalogResource> {
    api: Arc<dyn BarbershopApi>,
    binding: FetchBinding<(), Vec<R>>,
    mutations: Mutations<CatalogMutation<R::Id>>,
    form: Option<CatalogForm<R>>,
    pending_delete: Option<PendingDelete<R::Id>>,
    notice: Option<String>,
    toggling: Vec<R::Id>,
}

impl<R: CatalogResource> CatalogController<R> {
    pub fn new(api: Arc<dyn BarbershopApi>, runtime: Handle) -> Self {
        let mut binding = FetchBinding::new(R::PLURAL, runtime.clone());
        let source = api.clone();
        binding.bind((), fetcher(move || R::list(source.clone())));
        Self {
            api,
            binding,
            mutations: Mutations::new(runtime),
            form: None,
            pending_delete: None,
            notice: None,
            toggling: Vec::new(),
        }
    }

    pub fn refetch(&mut self) {
        self.binding.refetch();
    }

    pub fn state(&self) -> &RemoteCollectionState<Vec<R>> {
        self.binding.state()
    }

    pub fn view(&self) -> ListView<R> {
        self.binding.state().list_view(
            R::clone,
            &format!("Error al cargar los {}. Detalles: ", R::PLURAL),
            &format!("No hay {} registrados en el sistema.", R::PLURAL),
        )
    }

    pub fn find(&self, id: R::Id) -> Option<&R> {
        self.binding
            .data()
            .and_then(|records| records.iter().find(|record| record.id() == id))
    }

    fn known(&self, id: R::Id) -> Result<&R, ActionError> {
        self.find(id)
            .ok_or_else(|| ActionError::UnknownRecord(format!("{} {id}", R::LABEL)))
    }

    pub fn request_delete(&mut self, id: R::Id) -> Result<(), ActionError> {
        if self.pending_delete.is_some() {
            return Err(ActionError::ConfirmationPending);
        }
        let prompt = self.known(id)?.delete_prompt();
        self.pending_delete = Some(PendingDelete { id, prompt });
        Ok(())
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete<R::Id>> {
        self.pending_delete.as_ref()
    }

    /// Answer the delete confirmation. Returns whether a request was sent.
    pub fn resolve_delete(&mut self, accepted: bool) -> bool {
        let Some(pending) = self.pending_delete.take() else {
            return false;
        };
        if !accepted {
            return false;
        }
        let api = self.api.clone();
        let id = pending.id;
        info!(resource = R::LABEL, %id, "deleting");
        self.mutations
            .spawn(CatalogMutation::Delete(id), R::delete(api, id));
        true
    }

    pub fn open_create(&mut self) {
        self.form = Some(CatalogForm {
            editing: None,
            fields: R::Form::default(),
            error: None,
            submitting: false,
        });
    }

    pub fn open_edit(&mut self, id: R::Id) -> Result<(), ActionError> {
        let fields = self.known(id)?.form_from();
        self.form = Some(CatalogForm {
            editing: Some(id),
            fields,
            error: None,
            submitting: false,
        });
        Ok(())
    }

    pub fn form(&self) -> Option<&CatalogForm<R>> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut CatalogForm<R>> {
        self.form.as_mut()
    }

    pub fn submit_form(&mut self) -> Result<(), ActionError> {
        let form = self.form.as_mut().ok_or(ActionError::NoOpenForm)?;
        if form.submitting {
            return Err(ActionError::AlreadySubmitting);
        }
        let draft = match R::validate(&form.fields) {
            Ok(draft) => draft,
            Err(message) => {
                form.error = Some(message.clone());
                return Err(ActionError::Validation(message));
            }
        };

        form.submitting = true;
        form.error = None;
        let editing = form.editing;
        info!(resource = R::LABEL, editing = ?editing, "saving");
        self.mutations.spawn(
            CatalogMutation::Save,
            R::save(self.api.clone(), editing, draft),
        );
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn poll(&mut self) -> bool {
        let mut changed = self.binding.poll();
        for (mutation, result) in self.mutations.poll() {
            self.apply_mutation(mutation, result);
            changed = true;
        }
        changed
    }

    pub async fn settle(&mut self) {
        while let Some((mutation, result)) = self.mutations.next().await {
            self.apply_mutation(mutation, result);
        }
        self.binding.settled().await;
    }

    fn apply_mutation(&mut self, mutation: CatalogMutation<R::Id>, result: Result<(), ApiError>) {
        if let CatalogMutation::Toggle(id) = mutation {
            self.toggling.retain(|pending| *pending != id);
        }
        let err = match result {
            Ok(()) => {
                if mutation == CatalogMutation::Save {
                    self.form = None;
                }
                self.refetch();
                return;
            }
            Err(err) => err,
        };

        warn!(resource = R::LABEL, ?mutation, error = %err, "catalog mutation failed");
        match mutation {
            CatalogMutation::Save => {
                let message = err.user_message(&format!("Error al guardar el {}.", R::LABEL));
                match self.form.as_mut() {
                    Some(form) => {
                        form.submitting = false;
                        form.error = Some(message);
                    }
                    None => self.notice = Some(message),
                }
            }
            CatalogMutation::Delete(_) => {
                let message = err.user_message(&format!("Error al eliminar el {}.", R::LABEL));
                self.notice = Some(format!("No se pudo eliminar: {message}"));
            }
            CatalogMutation::Toggle(_) => {
                self.notice = Some(
                    err.user_message(&format!("Error al actualizar el {}.", R::LABEL)),
                );
            }
        }
    }
}

impl CatalogController<Barbero> {
    /// Flip a barber between active and inactive. The new value comes from
    /// the listed record, so a second flip waits until the list is fresh.
    pub fn toggle_active(&mut self, id: BarberoId) -> Result<(), ActionError> {
        if self.toggling.contains(&id) || self.binding.loading() {
            return Err(ActionError::AlreadySubmitting);
        }
        let activo = !self.known(id)?.activo;
        let dto = UpdateBarberoDto {
            activo: Some(activo),
            ..UpdateBarberoDto::default()
        };
        let api = self.api.clone();
        info!(barbero = %id, activo, "toggling barbero");
        self.toggling.push(id);
        self.mutations.spawn(CatalogMutation::Toggle(id), async move {
            api.update_barbero(id, dto).await
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
