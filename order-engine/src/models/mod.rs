//! Domain models for order-engine.

mod catalog;
mod measurement;
mod order;
mod template;

pub use catalog::{GarmentDefinition, MeasurementCatalog, StandardOutfit};
pub use measurement::{MeasurementField, MeasurementSection};
pub use order::{
    AdditionalService, CreateOrder, Order, OrderLineItem, OrderStatus, SpecialRequirement,
    TrialNote, UpdateOrder,
};
pub use template::{CreateTemplate, MessageTemplate, TemplateCatalog, TemplateType};
