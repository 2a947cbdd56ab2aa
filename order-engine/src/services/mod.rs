//! Domain services for order-engine.

pub mod billing;
pub mod lifecycle;
pub mod measurement_codec;
pub mod template_renderer;

pub use billing::{
    AdjustedAmount, Adjustment, BillingCalculator, BillingSummary, PaymentStatus, ProfitSummary,
};
pub use lifecycle::{
    format_amount, order_context, Notification, OrderLifecycle, PaymentDecision,
    TransitionOutcome,
};
pub use measurement_codec::MeasurementCodec;
pub use template_renderer::TemplateRenderer;
