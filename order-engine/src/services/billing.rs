//! Billing calculator.
//!
//! Pure functions over order lines, services, advance and manual adjustment.
//! Inputs are assumed validated (non-negative); nothing is clamped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{AdditionalService, Order, OrderLineItem};

/// Manual adjustment, given either as a discount or as the final amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Adjustment {
    /// Negative discount is a surcharge.
    Discount(Decimal),
    FinalAmount(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjustedAmount {
    pub final_amount: Decimal,
    pub discount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfitSummary {
    pub cost: Decimal,
    pub profit: Decimal,
    /// Fraction of the effective amount; zero when the effective amount is zero.
    pub margin: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Overpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overpaid => "overpaid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    pub total: Decimal,
    pub discount: Decimal,
    pub final_amount: Option<Decimal>,
    pub effective_amount: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
    pub payment_status: PaymentStatus,
    pub profit: ProfitSummary,
}

fn checked_sum(
    amounts: impl IntoIterator<Item = Result<Decimal, EngineError>>,
    field: &'static str,
) -> Result<Decimal, EngineError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount?)
            .ok_or_else(|| EngineError::out_of_range(field))
    })
}

/// Billing calculator.
///
/// Every operation uses checked arithmetic; a result outside the `Decimal`
/// range is reported as a validation error on the offending field.
#[derive(Debug, Clone)]
pub struct BillingCalculator;

impl BillingCalculator {
    /// Sum of item subtotals plus service amounts.
    pub fn compute_total(
        items: &[OrderLineItem],
        services: &[AdditionalService],
    ) -> Result<Decimal, EngineError> {
        let items_total = checked_sum(items.iter().map(OrderLineItem::subtotal), "total_amount")?;
        let services_total = checked_sum(services.iter().map(|s| Ok(s.amount)), "total_amount")?;
        items_total
            .checked_add(services_total)
            .ok_or_else(|| EngineError::out_of_range("total_amount"))
    }

    /// Derive the missing half of a discount / final amount pair.
    pub fn apply_adjustment(
        total: Decimal,
        adjustment: Adjustment,
    ) -> Result<AdjustedAmount, EngineError> {
        let adjusted = match adjustment {
            Adjustment::Discount(discount) => AdjustedAmount {
                final_amount: total
                    .checked_sub(discount)
                    .ok_or_else(|| EngineError::out_of_range("final_amount"))?,
                discount,
            },
            Adjustment::FinalAmount(final_amount) => AdjustedAmount {
                final_amount,
                discount: total
                    .checked_sub(final_amount)
                    .ok_or_else(|| EngineError::out_of_range("discount"))?,
            },
        };

        if adjusted.final_amount > total {
            tracing::debug!(
                total = %total,
                final_amount = %adjusted.final_amount,
                "Final amount exceeds total, treating as surcharge"
            );
        }

        Ok(adjusted)
    }

    /// Positive while money is owed, negative on overpayment.
    pub fn compute_balance(
        effective_amount: Decimal,
        advance: Decimal,
    ) -> Result<Decimal, EngineError> {
        effective_amount
            .checked_sub(advance)
            .ok_or_else(|| EngineError::out_of_range("balance"))
    }

    /// Cost, profit and margin. A margin that does not fit in a `Decimal`
    /// (effective amount vanishingly small next to the profit) is an error.
    pub fn compute_profit(
        items: &[OrderLineItem],
        services: &[AdditionalService],
        effective_amount: Decimal,
    ) -> Result<ProfitSummary, EngineError> {
        let items_cost = checked_sum(items.iter().map(OrderLineItem::total_cost), "cost")?;
        let services_cost = checked_sum(services.iter().map(|s| Ok(s.cost)), "cost")?;
        let cost = items_cost
            .checked_add(services_cost)
            .ok_or_else(|| EngineError::out_of_range("cost"))?;
        let profit = effective_amount
            .checked_sub(cost)
            .ok_or_else(|| EngineError::out_of_range("profit"))?;
        let margin = if effective_amount.is_zero() {
            Decimal::ZERO
        } else {
            profit
                .checked_div(effective_amount)
                .ok_or_else(|| EngineError::out_of_range("margin"))?
        };

        Ok(ProfitSummary {
            cost,
            profit,
            margin,
        })
    }

    pub fn payment_status(balance: Decimal, advance: Decimal) -> PaymentStatus {
        if balance < Decimal::ZERO {
            PaymentStatus::Overpaid
        } else if balance.is_zero() {
            PaymentStatus::Paid
        } else if advance > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Full billing picture of an order, derived from its lines rather than
    /// the stored `total_amount`.
    pub fn summarize(order: &Order) -> Result<BillingSummary, EngineError> {
        let total = Self::compute_total(&order.items, &order.services)?;
        let effective_amount = order.final_amount.unwrap_or(total);
        let balance = Self::compute_balance(effective_amount, order.advance)?;
        let discount = total
            .checked_sub(effective_amount)
            .ok_or_else(|| EngineError::out_of_range("discount"))?;

        Ok(BillingSummary {
            total,
            discount,
            final_amount: order.final_amount,
            effective_amount,
            advance: order.advance,
            balance,
            payment_status: Self::payment_status(balance, order.advance),
            profit: Self::compute_profit(&order.items, &order.services, effective_amount)?,
        })
    }
}
