//! UI layer: app shell, per-section panels, widgets and theme.

pub mod app;
pub mod panels;
pub mod theme;
pub mod widgets;

pub use app::{DashboardApp, StartupConfig};
