//! Order model for order-engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::EngineError;
use crate::models::MeasurementField;
use crate::services::billing::{Adjustment, BillingCalculator};
use crate::services::measurement_codec::MeasurementCodec;

/// Order status.
///
/// Serialized with the exact variant names; no other spelling is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    InProgress,
    ReadyForTrial,
    ReadyForDelivery,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::ReadyForTrial,
        OrderStatus::ReadyForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "InProgress",
            OrderStatus::ReadyForTrial => "ReadyForTrial",
            OrderStatus::ReadyForDelivery => "ReadyForDelivery",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EngineError::InvalidStatus(s.to_string()))
    }
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Garment line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct OrderLineItem {
    #[validate(length(min = 1, message = "garment type is required"))]
    pub garment_type: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    /// Informational only; feeds profit reporting, never the bill.
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub cost: Decimal,
}

impl OrderLineItem {
    pub fn new(garment_type: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            garment_type: garment_type.into(),
            quantity,
            price,
            cost: Decimal::ZERO,
        }
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }

    pub fn subtotal(&self) -> Result<Decimal, EngineError> {
        Decimal::from(self.quantity)
            .checked_mul(self.price)
            .ok_or_else(|| EngineError::out_of_range("price"))
    }

    pub fn total_cost(&self) -> Result<Decimal, EngineError> {
        Decimal::from(self.quantity)
            .checked_mul(self.cost)
            .ok_or_else(|| EngineError::out_of_range("cost"))
    }
}

/// Extra charge on an order (alterations, express stitching, embroidery).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdditionalService {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub cost: Decimal,
}

impl AdditionalService {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
            cost: Decimal::ZERO,
        }
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SpecialRequirement {
    #[validate(length(min = 1, message = "note is required"))]
    pub note: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Timestamped note taken at a fitting. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialNote {
    pub note: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub recorded_utc: DateTime<Utc>,
}

/// Order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub services: Vec<AdditionalService>,
    /// Derived from items and services; use [`Order::recompute_total`].
    pub total_amount: Decimal,
    /// Manual override after discount or surcharge.
    #[serde(default)]
    pub final_amount: Option<Decimal>,
    #[serde(default)]
    pub advance: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub measurements: String,
    #[serde(default)]
    pub special_requirements: Vec<SpecialRequirement>,
    #[serde(default)]
    pub trial_notes: Vec<TrialNote>,
    #[serde(default)]
    pub trial_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating an order.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateOrder {
    pub client_id: Uuid,
    pub order_number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub services: Vec<AdditionalService>,
    #[validate(custom(function = "non_negative"))]
    pub final_amount: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub advance: Decimal,
    #[serde(default)]
    pub measurements: String,
    #[serde(default)]
    pub special_requirements: Vec<SpecialRequirement>,
    pub trial_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

/// Input for editing an order. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub items: Option<Vec<OrderLineItem>>,
    pub services: Option<Vec<AdditionalService>>,
    pub adjustment: Option<Adjustment>,
    pub clear_adjustment: bool,
    pub trial_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub measurements: Option<String>,
    pub special_requirements: Option<Vec<SpecialRequirement>>,
}

fn validate_lines(
    items: &[OrderLineItem],
    services: &[AdditionalService],
) -> Result<(), EngineError> {
    for item in items {
        item.validate()?;
    }
    for service in services {
        service.validate()?;
    }
    Ok(())
}

impl Order {
    /// Create a new `Pending` order from validated input.
    pub fn create(input: CreateOrder) -> Result<Self, EngineError> {
        input.validate()?;
        validate_lines(&input.items, &input.services)?;
        for requirement in &input.special_requirements {
            requirement.validate()?;
        }

        let now = Utc::now();
        let total_amount = BillingCalculator::compute_total(&input.items, &input.services)?;

        Ok(Self {
            order_id: Uuid::new_v4(),
            client_id: input.client_id,
            order_number: input.order_number,
            items: input.items,
            services: input.services,
            total_amount,
            final_amount: input.final_amount,
            advance: input.advance,
            status: OrderStatus::Pending,
            measurements: input.measurements,
            special_requirements: input.special_requirements,
            trial_notes: Vec::new(),
            trial_date: input.trial_date,
            delivery_date: input.delivery_date,
            created_utc: now,
            updated_utc: now,
        })
    }

    /// Re-derive `total_amount` from the current items and services.
    pub fn recompute_total(&mut self) -> Result<(), EngineError> {
        self.total_amount = BillingCalculator::compute_total(&self.items, &self.services)?;
        Ok(())
    }

    /// `final_amount` if set, otherwise `total_amount`.
    pub fn effective_amount(&self) -> Decimal {
        self.final_amount.unwrap_or(self.total_amount)
    }

    pub fn discount(&self) -> Result<Decimal, EngineError> {
        self.total_amount
            .checked_sub(self.effective_amount())
            .ok_or_else(|| EngineError::out_of_range("discount"))
    }

    pub fn balance(&self) -> Result<Decimal, EngineError> {
        BillingCalculator::compute_balance(self.effective_amount(), self.advance)
    }

    /// Short human reference; falls back to the first block of the id.
    pub fn reference(&self) -> String {
        match &self.order_number {
            Some(number) if !number.is_empty() => number.clone(),
            _ => self
                .order_id
                .to_string()
                .split('-')
                .next()
                .unwrap_or_default()
                .to_uppercase(),
        }
    }

    /// Replace both line lists at once; nothing changes if the new total
    /// cannot be computed.
    fn set_lines(
        &mut self,
        items: Vec<OrderLineItem>,
        services: Vec<AdditionalService>,
    ) -> Result<(), EngineError> {
        self.total_amount = BillingCalculator::compute_total(&items, &services)?;
        self.items = items;
        self.services = services;
        self.touch();
        Ok(())
    }

    pub fn add_item(&mut self, item: OrderLineItem) -> Result<(), EngineError> {
        item.validate()?;
        let mut items = self.items.clone();
        items.push(item);
        self.set_lines(items, self.services.clone())
    }

    pub fn replace_item(&mut self, index: usize, item: OrderLineItem) -> Result<(), EngineError> {
        item.validate()?;
        let mut items = self.items.clone();
        let slot = items.get_mut(index).ok_or(EngineError::ItemNotFound {
            collection: "item",
            index,
        })?;
        *slot = item;
        self.set_lines(items, self.services.clone())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<OrderLineItem, EngineError> {
        if index >= self.items.len() {
            return Err(EngineError::ItemNotFound {
                collection: "item",
                index,
            });
        }
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.set_lines(items, self.services.clone())?;
        Ok(removed)
    }

    pub fn add_service(&mut self, service: AdditionalService) -> Result<(), EngineError> {
        service.validate()?;
        let mut services = self.services.clone();
        services.push(service);
        self.set_lines(self.items.clone(), services)
    }

    pub fn replace_service(
        &mut self,
        index: usize,
        service: AdditionalService,
    ) -> Result<(), EngineError> {
        service.validate()?;
        let mut services = self.services.clone();
        let slot = services.get_mut(index).ok_or(EngineError::ItemNotFound {
            collection: "service",
            index,
        })?;
        *slot = service;
        self.set_lines(self.items.clone(), services)
    }

    pub fn remove_service(&mut self, index: usize) -> Result<AdditionalService, EngineError> {
        if index >= self.services.len() {
            return Err(EngineError::ItemNotFound {
                collection: "service",
                index,
            });
        }
        let mut services = self.services.clone();
        let removed = services.remove(index);
        self.set_lines(self.items.clone(), services)?;
        Ok(removed)
    }

    /// Set a manual discount or final amount against the current total.
    pub fn set_adjustment(&mut self, adjustment: Adjustment) -> Result<(), EngineError> {
        let adjusted = BillingCalculator::apply_adjustment(self.total_amount, adjustment)?;
        non_negative(&adjusted.final_amount)
            .map_err(|_| EngineError::validation("final_amount", "must not be negative"))?;
        self.final_amount = Some(adjusted.final_amount);
        self.touch();
        Ok(())
    }

    pub fn clear_adjustment(&mut self) {
        self.final_amount = None;
        self.touch();
    }

    pub fn add_trial_note(&mut self, note: impl Into<String>, images: Vec<String>) {
        self.trial_notes.push(TrialNote {
            note: note.into(),
            images,
            recorded_utc: Utc::now(),
        });
        self.touch();
    }

    pub fn measurement_fields(&self) -> Vec<MeasurementField> {
        MeasurementCodec::decode(&self.measurements)
    }

    pub fn set_measurement_fields(&mut self, fields: &[MeasurementField]) {
        self.measurements = MeasurementCodec::encode(fields);
        self.touch();
    }

    /// Apply an edit. Everything is validated before anything is written.
    pub fn apply_update(&mut self, update: UpdateOrder) -> Result<(), EngineError> {
        validate_lines(
            update.items.as_deref().unwrap_or_default(),
            update.services.as_deref().unwrap_or_default(),
        )?;
        if let Some(requirements) = &update.special_requirements {
            for requirement in requirements {
                requirement.validate()?;
            }
        }

        let items = update.items.unwrap_or_else(|| self.items.clone());
        let services = update.services.unwrap_or_else(|| self.services.clone());
        let total = BillingCalculator::compute_total(&items, &services)?;

        let final_amount = match (update.adjustment, update.clear_adjustment) {
            (Some(adjustment), _) => {
                let adjusted = BillingCalculator::apply_adjustment(total, adjustment)?;
                non_negative(&adjusted.final_amount)
                    .map_err(|_| EngineError::validation("final_amount", "must not be negative"))?;
                Some(adjusted.final_amount)
            }
            (None, true) => None,
            (None, false) => self.final_amount,
        };

        self.items = items;
        self.services = services;
        self.total_amount = total;
        self.final_amount = final_amount;
        if let Some(date) = update.trial_date {
            self.trial_date = Some(date);
        }
        if let Some(date) = update.delivery_date {
            self.delivery_date = Some(date);
        }
        if let Some(measurements) = update.measurements {
            self.measurements = measurements;
        }
        if let Some(requirements) = update.special_requirements {
            self.special_requirements = requirements;
        }
        self.touch();
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_utc = Utc::now();
    }
}
