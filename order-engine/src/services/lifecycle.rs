//! Order lifecycle.
//!
//! Any status may move to any other; the only rule is the payment gate on
//! the way into `Delivered`. A positive balance holds the transition until
//! the caller either records a payment or explicitly skips collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Order, OrderStatus, TemplateCatalog, TemplateType};
use crate::services::billing::BillingCalculator;
use crate::services::template_renderer::TemplateRenderer;

const DATE_FORMAT: &str = "%d %b %Y";

/// How the caller resolves an outstanding balance at delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "amount", rename_all = "snake_case")]
pub enum PaymentDecision {
    /// Amount received now; added to the order's advance.
    RecordPayment(Decimal),
    /// Deliver anyway and leave the balance outstanding.
    SkipPayment,
}

/// Rendered message ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub client_id: Uuid,
    pub order_id: Uuid,
    pub template_type: TemplateType,
    pub text: String,
    /// True when no active template existed and the built-in text was used.
    pub used_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Committed {
        order: Box<Order>,
        notification: Option<Notification>,
    },
    /// Nothing was changed; re-invoke with a [`PaymentDecision`].
    PaymentRequired { balance: Decimal },
}

impl TransitionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, TransitionOutcome::Committed { .. })
    }
}

/// Format an amount for message text, e.g. `₹1200.00`.
pub fn format_amount(currency_symbol: &str, amount: Decimal) -> String {
    format!("{}{:.2}", currency_symbol, amount.round_dp(2))
}

/// Values every order-related template can reference.
pub fn order_context(
    order: &Order,
    currency_symbol: &str,
) -> Result<HashMap<String, String>, EngineError> {
    let effective = order.effective_amount();
    let balance = BillingCalculator::compute_balance(effective, order.advance)?;
    let discount = order.discount()?;
    let format_date = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };

    Ok(HashMap::from([
        ("orderId".to_string(), order.order_id.to_string()),
        ("orderNumber".to_string(), order.reference()),
        ("status".to_string(), order.status.to_string()),
        (
            "totalAmount".to_string(),
            format_amount(currency_symbol, order.total_amount),
        ),
        (
            "finalAmount".to_string(),
            format_amount(currency_symbol, effective),
        ),
        (
            "discount".to_string(),
            format_amount(currency_symbol, discount),
        ),
        (
            "advance".to_string(),
            format_amount(currency_symbol, order.advance),
        ),
        ("balance".to_string(), format_amount(currency_symbol, balance)),
        ("trialDate".to_string(), format_date(order.trial_date)),
        ("deliveryDate".to_string(), format_date(order.delivery_date)),
    ]))
}

/// Order lifecycle state machine.
///
/// Templates and caller-side values (client name, shop name) are injected
/// so the machine never looks anything up on its own.
#[derive(Debug, Clone)]
pub struct OrderLifecycle<'a> {
    templates: &'a TemplateCatalog,
    currency_symbol: &'a str,
}

impl<'a> OrderLifecycle<'a> {
    pub fn new(templates: &'a TemplateCatalog, currency_symbol: &'a str) -> Self {
        Self {
            templates,
            currency_symbol,
        }
    }

    /// Same as [`OrderLifecycle::transition`] with the target given as text.
    pub fn transition_named(
        &self,
        order: &Order,
        target: &str,
        decision: Option<PaymentDecision>,
        extra: &HashMap<String, String>,
    ) -> Result<TransitionOutcome, EngineError> {
        let target: OrderStatus = target.parse()?;
        self.transition(order, target, decision, extra)
    }

    /// Move `order` to `target`. The input order is never modified; the
    /// updated copy is returned in [`TransitionOutcome::Committed`].
    pub fn transition(
        &self,
        order: &Order,
        target: OrderStatus,
        decision: Option<PaymentDecision>,
        extra: &HashMap<String, String>,
    ) -> Result<TransitionOutcome, EngineError> {
        if let Some(PaymentDecision::RecordPayment(amount)) = decision {
            if amount < Decimal::ZERO {
                return Err(EngineError::validation(
                    "received_amount",
                    "received payment must not be negative",
                ));
            }
        }

        let mut updated = order.clone();
        let entering_delivery = target.is_delivered() && !order.status.is_delivered();

        if !entering_delivery {
            if decision.is_some() {
                tracing::debug!(
                    order_id = %order.order_id,
                    target = %target,
                    "Payment decision ignored outside delivery"
                );
            }
            updated.status = target;
            updated.touch();
            tracing::info!(
                order_id = %order.order_id,
                from = %order.status,
                to = %target,
                "Order status changed"
            );
            return Ok(TransitionOutcome::Committed {
                order: Box::new(updated),
                notification: None,
            });
        }

        updated.recompute_total()?;
        let balance = updated.balance()?;

        match decision {
            Some(PaymentDecision::RecordPayment(amount)) => {
                updated.advance = updated
                    .advance
                    .checked_add(amount)
                    .ok_or_else(|| EngineError::out_of_range("advance"))?;
                tracing::info!(
                    order_id = %order.order_id,
                    received = %amount,
                    advance = %updated.advance,
                    "Payment recorded at delivery"
                );
            }
            Some(PaymentDecision::SkipPayment) => {
                if balance > Decimal::ZERO {
                    tracing::info!(
                        order_id = %order.order_id,
                        balance = %balance,
                        "Delivering with outstanding balance"
                    );
                }
            }
            None if balance > Decimal::ZERO => {
                tracing::info!(
                    order_id = %order.order_id,
                    balance = %balance,
                    "Delivery held for payment decision"
                );
                return Ok(TransitionOutcome::PaymentRequired { balance });
            }
            None => {}
        }

        updated.status = OrderStatus::Delivered;
        updated.touch();

        let notification = self.notification(&updated, TemplateType::PostDelivery, extra)?;
        tracing::info!(
            order_id = %order.order_id,
            from = %order.status,
            used_default_template = notification.used_default,
            "Order delivered"
        );

        Ok(TransitionOutcome::Committed {
            order: Box::new(updated),
            notification: Some(notification),
        })
    }

    /// Render the active template of `template_type` for `order`.
    /// Caller-supplied values take precedence over order-derived ones.
    pub fn notification(
        &self,
        order: &Order,
        template_type: TemplateType,
        extra: &HashMap<String, String>,
    ) -> Result<Notification, EngineError> {
        let (content, used_default) = self.templates.content_for(template_type);
        if used_default {
            tracing::debug!(
                template_type = template_type.as_str(),
                "No active template, using built-in text"
            );
        }

        let mut context = order_context(order, self.currency_symbol)?;
        context.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(Notification {
            client_id: order.client_id,
            order_id: order.order_id,
            template_type,
            text: TemplateRenderer::render(content, &context),
            used_default,
        })
    }
}
