//! Turno list filters and the query derived from them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::domain::{BarberoId, ClienteId, ServicioId, TurnoEstado};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    Barbero,
    Cliente,
    Servicio,
    Estado,
    Fecha,
}

impl FilterKey {
    pub const ALL: [FilterKey; 5] = [
        FilterKey::Barbero,
        FilterKey::Cliente,
        FilterKey::Servicio,
        FilterKey::Estado,
        FilterKey::Fecha,
    ];

    /// Query-string parameter understood by `GET /turnos`.
    pub fn query_name(self) -> &'static str {
        match self {
            FilterKey::Barbero => "barberoId",
            FilterKey::Cliente => "clienteId",
            FilterKey::Servicio => "servicioId",
            FilterKey::Estado => "estado",
            FilterKey::Fecha => "fecha",
        }
    }
}

/// Scalar held by a filter. `Number(0)`, blank text and `Empty` are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterValue {
    #[default]
    Empty,
    Number(i64),
    Text(String),
}

impl FilterValue {
    pub fn is_set(&self) -> bool {
        match self {
            FilterValue::Empty => false,
            FilterValue::Number(value) => *value != 0,
            FilterValue::Text(value) => !value.trim().is_empty(),
        }
    }

    fn query_value(&self) -> Option<String> {
        if !self.is_set() {
            return None;
        }
        match self {
            FilterValue::Empty => None,
            FilterValue::Number(value) => Some(value.to_string()),
            FilterValue::Text(value) => Some(value.clone()),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<BarberoId> for FilterValue {
    fn from(value: BarberoId) -> Self {
        FilterValue::Number(value.0)
    }
}

impl From<ClienteId> for FilterValue {
    fn from(value: ClienteId) -> Self {
        FilterValue::Number(value.0)
    }
}

impl From<ServicioId> for FilterValue {
    fn from(value: ServicioId) -> Self {
        FilterValue::Number(value.0)
    }
}

impl From<TurnoEstado> for FilterValue {
    fn from(value: TurnoEstado) -> Self {
        FilterValue::Text(value.as_str().to_string())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<FilterKey, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<FilterValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: FilterKey) -> &FilterValue {
        const EMPTY: &FilterValue = &FilterValue::Empty;
        self.values.get(&key).unwrap_or(EMPTY)
    }

    /// Overlay `patch` on top of the current values. Unset values in the
    /// patch clear the corresponding filter.
    pub fn merge(&mut self, patch: FilterSet) {
        self.values.extend(patch.values);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_active(&self) -> bool {
        self.values.values().any(FilterValue::is_set)
    }

    pub fn derive_query(&self) -> TurnoQuery {
        let params = FilterKey::ALL
            .iter()
            .filter_map(|key| {
                self.values
                    .get(key)
                    .and_then(FilterValue::query_value)
                    .map(|value| (key.query_name(), value))
            })
            .collect();
        TurnoQuery { params }
    }
}

/// Query parameters for `GET /turnos`, only the constrained fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TurnoQuery {
    params: Vec<(&'static str, String)>,
}

impl TurnoQuery {
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_constrained_fields_reach_the_query() {
        let filters = FilterSet::new().with(FilterKey::Barbero, BarberoId(5));
        assert_eq!(
            filters.derive_query().params(),
            &[("barberoId", "5".to_string())]
        );

        let filters = FilterSet::new()
            .with(FilterKey::Barbero, 0_i64)
            .with(FilterKey::Estado, "pendiente");
        assert_eq!(
            filters.derive_query().params(),
            &[("estado", "pendiente".to_string())]
        );
    }

    #[test]
    fn unsetting_through_merge_drops_the_key() {
        let mut filters = FilterSet::new()
            .with(FilterKey::Barbero, 3_i64)
            .with(FilterKey::Cliente, 8_i64)
            .with(FilterKey::Fecha, "2024-05-01");

        filters.merge(
            FilterSet::new()
                .with(FilterKey::Barbero, 0_i64)
                .with(FilterKey::Cliente, FilterValue::Empty)
                .with(FilterKey::Fecha, ""),
        );

        let query = filters.derive_query();
        assert!(query.is_empty());
        assert!(!filters.is_active());
    }

    #[test]
    fn zero_text_is_a_real_value() {
        let filters = FilterSet::new().with(FilterKey::Estado, "0");
        assert_eq!(filters.derive_query().get("estado"), Some("0"));
        assert!(filters.is_active());
    }

    #[test]
    fn blank_text_is_unset_but_set_text_is_verbatim() {
        let filters = FilterSet::new()
            .with(FilterKey::Estado, "   ")
            .with(FilterKey::Fecha, NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"))
            .with(FilterKey::Servicio, None::<ServicioId>);
        let query = filters.derive_query();
        assert_eq!(query.get("estado"), None);
        assert_eq!(query.get("servicioId"), None);
        assert_eq!(query.get("fecha"), Some("2024-05-01"));
    }

    #[test]
    fn query_follows_key_order_regardless_of_insertion() {
        let filters = FilterSet::new()
            .with(FilterKey::Estado, TurnoEstado::InProgress)
            .with(FilterKey::Barbero, 2_i64);
        assert_eq!(
            filters.derive_query().params(),
            &[
                ("barberoId", "2".to_string()),
                ("estado", "en proceso".to_string())
            ]
        );
    }
}
