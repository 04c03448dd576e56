//! Tokio runtime that drives every request issued by the views.

use anyhow::Context;
use tokio::runtime::{Builder, Handle, Runtime};

pub struct BackendRuntime {
    runtime: Runtime,
}

impl BackendRuntime {
    pub fn start() -> anyhow::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("dashboard-backend")
            .enable_all()
            .build()
            .context("failed to build backend runtime")?;
        Ok(Self { runtime })
    }

    /// Handle given to controllers; tasks spawned through it stop when the
    /// runtime is dropped at shutdown.
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }
}
