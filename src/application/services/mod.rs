//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ChartStore)
//! but are themselves concrete structs, not traits.

mod chart;
mod export;

pub use chart::ChartService;
pub use export::ExportService;
