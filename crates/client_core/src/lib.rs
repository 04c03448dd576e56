use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Barbero, BarberoId, Cliente, ClienteId, Servicio, ServicioId, Turno, TurnoId},
    protocol::{
        CreateBarberoDto, CreateClienteDto, CreateServicioDto, CreateTurnoDto, ReporteBarbero,
        RescheduleTurnoDto, UpdateBarberoDto, UpdateClienteDto, UpdateServicioDto,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod catalog;
pub mod display;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod report;
pub mod turnos;

pub use error::{ActionError, ApiError};
pub use fetch::{FetchBinding, ListView, RemoteCollectionState};
pub use filters::{FilterKey, FilterSet, FilterValue, TurnoQuery};
pub use report::ReportQuery;

/// REST operations of the barbershop backend.
///
/// Views only talk to the server through this trait, so tests inject an
/// in-memory implementation.
#[async_trait]
pub trait BarbershopApi: Send + Sync {
    async fn list_turnos(&self, query: &TurnoQuery) -> Result<Vec<Turno>, ApiError>;
    async fn create_turno(&self, dto: CreateTurnoDto) -> Result<(), ApiError>;
    async fn delete_turno(&self, id: TurnoId) -> Result<(), ApiError>;
    async fn cancel_turno(&self, id: TurnoId) -> Result<(), ApiError>;
    async fn reschedule_turno(
        &self,
        id: TurnoId,
        fecha_hora: NaiveDateTime,
    ) -> Result<(), ApiError>;

    async fn list_barberos(&self) -> Result<Vec<Barbero>, ApiError>;
    async fn create_barbero(&self, dto: CreateBarberoDto) -> Result<(), ApiError>;
    async fn update_barbero(&self, id: BarberoId, dto: UpdateBarberoDto) -> Result<(), ApiError>;
    async fn delete_barbero(&self, id: BarberoId) -> Result<(), ApiError>;

    async fn list_clientes(&self) -> Result<Vec<Cliente>, ApiError>;
    async fn create_cliente(&self, dto: CreateClienteDto) -> Result<(), ApiError>;
    async fn update_cliente(&self, id: ClienteId, dto: UpdateClienteDto) -> Result<(), ApiError>;
    async fn delete_cliente(&self, id: ClienteId) -> Result<(), ApiError>;

    async fn list_servicios(&self) -> Result<Vec<Servicio>, ApiError>;
    async fn create_servicio(&self, dto: CreateServicioDto) -> Result<(), ApiError>;
    async fn update_servicio(&self, id: ServicioId, dto: UpdateServicioDto)
        -> Result<(), ApiError>;
    async fn delete_servicio(&self, id: ServicioId) -> Result<(), ApiError>;

    async fn reporte_barbero(&self, query: &ReportQuery) -> Result<ReporteBarbero, ApiError>;
}

/// `BarbershopApi` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.bytes().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!(%url, status = status.as_u16(), error = %err, "api request rejected");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl BarbershopApi for RestClient {
    async fn list_turnos(&self, query: &TurnoQuery) -> Result<Vec<Turno>, ApiError> {
        debug!(params = ?query.params(), "listing turnos");
        self.get_json(self.http.get(self.endpoint("turnos")).query(query.params()))
            .await
    }

    async fn create_turno(&self, dto: CreateTurnoDto) -> Result<(), ApiError> {
        self.execute(self.http.post(self.endpoint("turnos")).json(&dto))
            .await
    }

    async fn delete_turno(&self, id: TurnoId) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.endpoint(&format!("turnos/{id}"))))
            .await
    }

    async fn cancel_turno(&self, id: TurnoId) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.endpoint(&format!("turnos/{id}/cancelar"))),
        )
        .await
    }

    async fn reschedule_turno(
        &self,
        id: TurnoId,
        fecha_hora: NaiveDateTime,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.endpoint(&format!("turnos/{id}/reprogramar")))
                .json(&RescheduleTurnoDto { fecha_hora }),
        )
        .await
    }

    async fn list_barberos(&self) -> Result<Vec<Barbero>, ApiError> {
        self.get_json(self.http.get(self.endpoint("barberos"))).await
    }

    async fn create_barbero(&self, dto: CreateBarberoDto) -> Result<(), ApiError> {
        self.execute(self.http.post(self.endpoint("barberos")).json(&dto))
            .await
    }

    async fn update_barbero(&self, id: BarberoId, dto: UpdateBarberoDto) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.endpoint(&format!("barberos/{id}")))
                .json(&dto),
        )
        .await
    }

    async fn delete_barbero(&self, id: BarberoId) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.endpoint(&format!("barberos/{id}"))))
            .await
    }

    async fn list_clientes(&self) -> Result<Vec<Cliente>, ApiError> {
        self.get_json(self.http.get(self.endpoint("clientes"))).await
    }

    async fn create_cliente(&self, dto: CreateClienteDto) -> Result<(), ApiError> {
        self.execute(self.http.post(self.endpoint("clientes")).json(&dto))
            .await
    }

    async fn update_cliente(&self, id: ClienteId, dto: UpdateClienteDto) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.endpoint(&format!("clientes/{id}")))
                .json(&dto),
        )
        .await
    }

    async fn delete_cliente(&self, id: ClienteId) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.endpoint(&format!("clientes/{id}"))))
            .await
    }

    async fn list_servicios(&self) -> Result<Vec<Servicio>, ApiError> {
        self.get_json(self.http.get(self.endpoint("servicios"))).await
    }

    async fn create_servicio(&self, dto: CreateServicioDto) -> Result<(), ApiError> {
        self.execute(self.http.post(self.endpoint("servicios")).json(&dto))
            .await
    }

    async fn update_servicio(
        &self,
        id: ServicioId,
        dto: UpdateServicioDto,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.endpoint(&format!("servicios/{id}")))
                .json(&dto),
        )
        .await
    }

    async fn delete_servicio(&self, id: ServicioId) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.endpoint(&format!("servicios/{id}"))))
            .await
    }

    async fn reporte_barbero(&self, query: &ReportQuery) -> Result<ReporteBarbero, ApiError> {
        self.get_json(
            self.http
                .get(self.endpoint(&format!("reportes/barbero/{}", query.barbero_id)))
                .query(&query.params()),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/mock_api.rs"]
pub(crate) mod mock_api;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
