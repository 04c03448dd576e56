use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidTimestamp;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(TurnoId);
id_newtype!(BarberoId);
id_newtype!(ClienteId);
id_newtype!(ServicioId);

/// Appointment status as stored by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnoEstado {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en proceso", alias = "en_proceso")]
    InProgress,
    #[serde(rename = "realizado")]
    Done,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl TurnoEstado {
    pub const ALL: [TurnoEstado; 4] = [
        TurnoEstado::Pending,
        TurnoEstado::InProgress,
        TurnoEstado::Done,
        TurnoEstado::Cancelled,
    ];

    /// Value used on the wire and in `estado` query filters.
    pub fn as_str(self) -> &'static str {
        match self {
            TurnoEstado::Pending => "pendiente",
            TurnoEstado::InProgress => "en proceso",
            TurnoEstado::Done => "realizado",
            TurnoEstado::Cancelled => "cancelado",
        }
    }

    pub fn label(self) -> String {
        self.as_str().to_uppercase()
    }

    /// Open appointments can still be cancelled or moved.
    pub fn is_open(self) -> bool {
        matches!(self, TurnoEstado::Pending | TurnoEstado::InProgress)
    }
}

impl fmt::Display for TurnoEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barbero {
    pub id_barbero: BarberoId,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub fecha_ingreso: Option<String>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

impl Barbero {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    pub id_cliente: ClienteId,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Cliente {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Servicio {
    pub id_servicio: ServicioId,
    pub nombre: String,
    pub duracion_minutos: u32,
    #[serde(with = "price")]
    pub precio: f64,
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Appointment with its relations loaded. Relations are null when the
/// referenced record was deleted server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turno {
    pub id_turno: TurnoId,
    #[serde(default)]
    pub cliente: Option<Cliente>,
    #[serde(default)]
    pub barbero: Option<Barbero>,
    #[serde(default)]
    pub servicio: Option<Servicio>,
    pub fecha_hora: Timestamp,
    pub estado: TurnoEstado,
}

/// A server timestamp as it came over the wire.
///
/// Values with an offset (or `Z`) are absolute instants. Values without one
/// are wall-clock times in the shop's zone; they are the same form the
/// dashboard sends back when creating or rescheduling a turno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timestamp {
    Instant(DateTime<Utc>),
    Wall(NaiveDateTime),
}

impl Timestamp {
    const NAIVE_FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Result<Self, InvalidTimestamp> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Timestamp::Instant(parsed.with_timezone(&Utc)));
        }

        Self::NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(Timestamp::Wall)
            .ok_or_else(|| InvalidTimestamp(raw.to_string()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Timestamp::Instant(instant)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(wall: NaiveDateTime) -> Self {
        Timestamp::Wall(wall)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = InvalidTimestamp;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Instant(instant) => {
                f.write_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Timestamp::Wall(wall) => write!(f, "{}", wall.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Prices come back as JSON numbers or as decimal strings (`"1500.00"`).
pub mod price {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(value) => Ok(value),
            RawPrice::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid price '{text}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    #[test]
    fn estado_uses_spanish_wire_names() {
        let estado: TurnoEstado = serde_json::from_str(r#""en proceso""#).expect("estado");
        assert_eq!(estado, TurnoEstado::InProgress);
        assert_eq!(
            serde_json::to_string(&TurnoEstado::Cancelled).expect("json"),
            r#""cancelado""#
        );
        assert_eq!(TurnoEstado::Done.label(), "REALIZADO");
    }

    #[test]
    fn only_pending_and_in_progress_are_open() {
        assert!(TurnoEstado::Pending.is_open());
        assert!(TurnoEstado::InProgress.is_open());
        assert!(!TurnoEstado::Done.is_open());
        assert!(!TurnoEstado::Cancelled.is_open());
    }

    #[test]
    fn parses_turno_with_string_price_and_missing_relations() {
        let turno: Turno = serde_json::from_str(
            r#"{
                "id_turno": 7,
                "cliente": null,
                "barbero": {"id_barbero": 2, "nombre": "Ana", "apellido": "Paz", "activo": true},
                "servicio": {"id_servicio": 3, "nombre": "Corte", "duracion_minutos": 30, "precio": "1500.50"},
                "fecha_hora": "2024-05-01T13:00:00.000Z",
                "estado": "pendiente"
            }"#,
        )
        .expect("turno");

        assert_eq!(turno.id_turno, TurnoId(7));
        assert!(turno.cliente.is_none());
        assert_eq!(turno.servicio.as_ref().map(|s| s.precio), Some(1500.5));
        assert_eq!(
            turno.fecha_hora,
            Timestamp::Instant(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn naive_timestamps_stay_wall_clock() {
        let wall = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("datetime");
        assert_eq!(Timestamp::parse("2024-05-01T10:00:00"), Ok(Timestamp::Wall(wall)));
        assert_eq!(Timestamp::parse("2024-05-01T10:00"), Ok(Timestamp::Wall(wall)));
        assert_eq!(
            Timestamp::parse("2024-05-01T07:00:00-03:00"),
            Ok(Timestamp::Instant(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()))
        );
        assert!(Timestamp::parse("mañana").is_err());
    }

    #[test]
    fn timestamps_serialize_in_the_form_they_arrived() {
        let wall: Timestamp = serde_json::from_str(r#""2024-05-01T10:00:00""#).expect("wall");
        assert_eq!(serde_json::to_string(&wall).expect("json"), r#""2024-05-01T10:00:00""#);

        let instant: Timestamp = serde_json::from_str(r#""2024-05-01T13:00:00Z""#).expect("instant");
        assert_eq!(
            serde_json::to_string(&instant).expect("json"),
            r#""2024-05-01T13:00:00.000Z""#
        );
    }
}
