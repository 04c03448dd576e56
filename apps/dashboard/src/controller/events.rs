//! Errors raised by user actions, classified for the status banner.

use client_core::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// The action does not apply to the record in its current state.
    Refused,
    /// Form input problem; the form shows it next to the fields.
    Validation,
    /// Something else is already in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Turnos,
    Barberos,
    Clientes,
    Servicios,
    Reportes,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::Turnos => "Turnos",
            Self::Barberos => "Barberos",
            Self::Clientes => "Clientes",
            Self::Servicios => "Servicios",
            Self::Reportes => "Reportes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_action(context: UiErrorContext, err: &ActionError) -> Self {
        let category = match err {
            ActionError::Validation(_) => UiErrorCategory::Validation,
            ActionError::ConfirmationPending | ActionError::AlreadySubmitting => {
                UiErrorCategory::Busy
            }
            ActionError::UnknownRecord(_)
            | ActionError::NotEligible(_)
            | ActionError::NoOpenForm => UiErrorCategory::Refused,
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Validation failures are already rendered inside their form.
    pub fn shown_inline(&self) -> bool {
        self.category == UiErrorCategory::Validation
    }

    pub fn banner_text(&self) -> String {
        let prefix = match self.category {
            UiErrorCategory::Refused => "Acción no disponible",
            UiErrorCategory::Validation => "Datos inválidos",
            UiErrorCategory::Busy => "Operación en curso",
        };
        format!("{} · {prefix}: {}", self.context.label(), self.message)
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::TurnoEstado;

    use super::*;

    #[test]
    fn refusals_reach_the_banner() {
        let err = UiError::from_action(
            UiErrorContext::Turnos,
            &ActionError::NotEligible(TurnoEstado::Cancelled),
        );
        assert_eq!(err.category(), UiErrorCategory::Refused);
        assert!(!err.shown_inline());
        assert_eq!(
            err.banner_text(),
            "Turnos · Acción no disponible: la acción no está disponible para un turno cancelado"
        );
    }

    #[test]
    fn validation_stays_in_the_form() {
        let err = UiError::from_action(
            UiErrorContext::Barberos,
            &ActionError::Validation("Nombre y Apellido son obligatorios.".into()),
        );
        assert!(err.shown_inline());
        assert_eq!(err.message(), "Nombre y Apellido son obligatorios.");
    }

    #[test]
    fn double_submit_is_busy() {
        let err = UiError::from_action(UiErrorContext::Reportes, &ActionError::AlreadySubmitting);
        assert_eq!(err.category(), UiErrorCategory::Busy);
        assert_eq!(err.context(), UiErrorContext::Reportes);
    }
}
