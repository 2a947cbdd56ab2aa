//! Common test utilities for order-engine integration tests.

#![allow(dead_code)]

use order_engine::models::{
    AdditionalService, CreateOrder, CreateTemplate, MessageTemplate, Order, OrderLineItem,
    TemplateType,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,order_engine=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

/// One shirt line (qty 2 at 500) and one 200 service: total 1200.
pub fn sample_order(advance: i64) -> Order {
    init_tracing();

    Order::create(CreateOrder {
        client_id: Uuid::new_v4(),
        order_number: Some("ORD-1001".to_string()),
        items: vec![OrderLineItem::new("Shirt", 2, dec(500)).with_cost(dec(180))],
        services: vec![AdditionalService::new("Hand embroidery", dec(200)).with_cost(dec(60))],
        advance: dec(advance),
        ..Default::default()
    })
    .expect("Failed to create sample order")
}

pub fn template(template_type: TemplateType, content: &str) -> MessageTemplate {
    MessageTemplate::new(CreateTemplate {
        name: format!("{} template", template_type.as_str()),
        template_type,
        content: content.to_string(),
        active: true,
    })
    .expect("Failed to create template")
}

pub fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
