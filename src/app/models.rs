//! Domain models for the bench report processor

pub mod report;

pub use report::{DataObject, Recipe, ReportDocument, ReportHeader};
