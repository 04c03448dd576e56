//! In-memory `BarbershopApi` that records every call.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use shared::{
    domain::{
        Barbero, BarberoId, Cliente, ClienteId, Servicio, ServicioId, Timestamp, Turno, TurnoEstado,
        TurnoId,
    },
    protocol::{
        CreateBarberoDto, CreateClienteDto, CreateServicioDto, CreateTurnoDto, ReporteBarbero,
        UpdateBarberoDto, UpdateClienteDto, UpdateServicioDto,
    },
};
use tokio::sync::Mutex;

use crate::{ApiError, BarbershopApi, ReportQuery, TurnoQuery};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListTurnos(TurnoQuery),
    CreateTurno(CreateTurnoDto),
    DeleteTurno(TurnoId),
    CancelTurno(TurnoId),
    RescheduleTurno(TurnoId, NaiveDateTime),
    ListBarberos,
    CreateBarbero(CreateBarberoDto),
    UpdateBarbero(BarberoId, UpdateBarberoDto),
    DeleteBarbero(BarberoId),
    ListClientes,
    CreateCliente(CreateClienteDto),
    UpdateCliente(ClienteId, UpdateClienteDto),
    DeleteCliente(ClienteId),
    ListServicios,
    CreateServicio(CreateServicioDto),
    UpdateServicio(ServicioId, UpdateServicioDto),
    DeleteServicio(ServicioId),
    Reporte(ReportQuery),
}

#[derive(Default)]
pub(crate) struct MockApi {
    turnos: Vec<Turno>,
    barberos: Vec<Barbero>,
    clientes: Vec<Cliente>,
    servicios: Vec<Servicio>,
    reporte: ReporteBarbero,
    failures: HashMap<&'static str, ApiError>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_turnos(mut self, turnos: Vec<Turno>) -> Self {
        self.turnos = turnos;
        self
    }

    pub(crate) fn with_barberos(mut self, barberos: Vec<Barbero>) -> Self {
        self.barberos = barberos;
        self
    }

    pub(crate) fn with_clientes(mut self, clientes: Vec<Cliente>) -> Self {
        self.clientes = clientes;
        self
    }

    pub(crate) fn with_servicios(mut self, servicios: Vec<Servicio>) -> Self {
        self.servicios = servicios;
        self
    }

    pub(crate) fn with_reporte(mut self, reporte: ReporteBarbero) -> Self {
        self.reporte = reporte;
        self
    }

    /// Make `operation` (the trait method name) fail with `err`.
    pub(crate) fn failing(mut self, operation: &'static str, err: ApiError) -> Self {
        self.failures.insert(operation, err);
        self
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|call| matches(call)).count()
    }

    async fn record<T>(
        &self,
        operation: &'static str,
        call: Call,
        reply: impl FnOnce() -> T,
    ) -> Result<T, ApiError> {
        self.calls.lock().await.push(call);
        match self.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(reply()),
        }
    }
}

pub(crate) fn conflict(message: &str) -> ApiError {
    ApiError::Rejected {
        status: 409,
        message: message.to_string(),
    }
}

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub(crate) fn barbero(id: i64, nombre: &str, activo: bool) -> Barbero {
    Barbero {
        id_barbero: BarberoId(id),
        nombre: nombre.to_string(),
        apellido: "Gómez".to_string(),
        telefono: Some("1155550000".to_string()),
        fecha_ingreso: None,
        activo,
    }
}

pub(crate) fn cliente(id: i64, nombre: &str) -> Cliente {
    Cliente {
        id_cliente: ClienteId(id),
        nombre: nombre.to_string(),
        apellido: "Pérez".to_string(),
        telefono: Some("1144440000".to_string()),
        email: None,
    }
}

pub(crate) fn servicio(id: i64, nombre: &str, precio: f64) -> Servicio {
    Servicio {
        id_servicio: ServicioId(id),
        nombre: nombre.to_string(),
        duracion_minutos: 30,
        precio,
        descripcion: None,
    }
}

pub(crate) fn turno(id: i64, estado: TurnoEstado, fecha_hora: impl Into<Timestamp>) -> Turno {
    Turno {
        id_turno: TurnoId(id),
        cliente: Some(cliente(1, "Juan")),
        barbero: Some(barbero(5, "Luis", true)),
        servicio: Some(servicio(3, "Corte", 1500.0)),
        fecha_hora: fecha_hora.into(),
        estado,
    }
}

#[async_trait]
impl BarbershopApi for MockApi {
    async fn list_turnos(&self, query: &TurnoQuery) -> Result<Vec<Turno>, ApiError> {
        self.record("list_turnos", Call::ListTurnos(query.clone()), || {
            self.turnos.clone()
        })
        .await
    }

    async fn create_turno(&self, dto: CreateTurnoDto) -> Result<(), ApiError> {
        self.record("create_turno", Call::CreateTurno(dto), || ())
            .await
    }

    async fn delete_turno(&self, id: TurnoId) -> Result<(), ApiError> {
        self.record("delete_turno", Call::DeleteTurno(id), || ()).await
    }

    async fn cancel_turno(&self, id: TurnoId) -> Result<(), ApiError> {
        self.record("cancel_turno", Call::CancelTurno(id), || ()).await
    }

    async fn reschedule_turno(
        &self,
        id: TurnoId,
        fecha_hora: NaiveDateTime,
    ) -> Result<(), ApiError> {
        self.record(
            "reschedule_turno",
            Call::RescheduleTurno(id, fecha_hora),
            || (),
        )
        .await
    }

    async fn list_barberos(&self) -> Result<Vec<Barbero>, ApiError> {
        self.record("list_barberos", Call::ListBarberos, || self.barberos.clone())
            .await
    }

    async fn create_barbero(&self, dto: CreateBarberoDto) -> Result<(), ApiError> {
        self.record("create_barbero", Call::CreateBarbero(dto), || ())
            .await
    }

    async fn update_barbero(&self, id: BarberoId, dto: UpdateBarberoDto) -> Result<(), ApiError> {
        self.record("update_barbero", Call::UpdateBarbero(id, dto), || ())
            .await
    }

    async fn delete_barbero(&self, id: BarberoId) -> Result<(), ApiError> {
        self.record("delete_barbero", Call::DeleteBarbero(id), || ())
            .await
    }

    async fn list_clientes(&self) -> Result<Vec<Cliente>, ApiError> {
        self.record("list_clientes", Call::ListClientes, || self.clientes.clone())
            .await
    }

    async fn create_cliente(&self, dto: CreateClienteDto) -> Result<(), ApiError> {
        self.record("create_cliente", Call::CreateCliente(dto), || ())
            .await
    }

    async fn update_cliente(&self, id: ClienteId, dto: UpdateClienteDto) -> Result<(), ApiError> {
        self.record("update_cliente", Call::UpdateCliente(id, dto), || ())
            .await
    }

    async fn delete_cliente(&self, id: ClienteId) -> Result<(), ApiError> {
        self.record("delete_cliente", Call::DeleteCliente(id), || ())
            .await
    }

    async fn list_servicios(&self) -> Result<Vec<Servicio>, ApiError> {
        self.record("list_servicios", Call::ListServicios, || {
            self.servicios.clone()
        })
        .await
    }

    async fn create_servicio(&self, dto: CreateServicioDto) -> Result<(), ApiError> {
        self.record("create_servicio", Call::CreateServicio(dto), || ())
            .await
    }

    async fn update_servicio(
        &self,
        id: ServicioId,
        dto: UpdateServicioDto,
    ) -> Result<(), ApiError> {
        self.record("update_servicio", Call::UpdateServicio(id, dto), || ())
            .await
    }

    async fn delete_servicio(&self, id: ServicioId) -> Result<(), ApiError> {
        self.record("delete_servicio", Call::DeleteServicio(id), || ())
            .await
    }

    async fn reporte_barbero(&self, query: &ReportQuery) -> Result<ReporteBarbero, ApiError> {
        self.record("reporte_barbero", Call::Reporte(query.clone()), || {
            self.reporte.clone()
        })
        .await
    }
}
