pub mod catalog;
pub mod report;
pub mod turnos;
