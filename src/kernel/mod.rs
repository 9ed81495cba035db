pub mod anchor;
pub mod event;
pub mod telemetry;
pub mod templates;
pub mod track;
