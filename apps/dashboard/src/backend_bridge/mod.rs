//! Bridge between the UI thread and the async REST backend.

pub mod runtime;

use std::sync::Arc;

use anyhow::Context;
use client_core::{BarbershopApi, RestClient};

use crate::config::Settings;

pub fn connect_api(settings: &Settings) -> anyhow::Result<Arc<dyn BarbershopApi>> {
    let client = RestClient::with_timeout(&settings.api_url, settings.request_timeout())
        .with_context(|| format!("cannot use API url '{}'", settings.api_url))?;
    tracing::info!(api = client.base_url(), timeout = ?settings.request_timeout(), "REST client ready");
    Ok(Arc::new(client))
}
