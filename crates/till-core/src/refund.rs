//! # Refund Planning
//!
//! Turns a receipt and a caller-chosen refund basket into a [`RefundPlan`]:
//! the validated per-item quantities, the stock to restore and the
//! tax-inclusive refund total.
//!
//! ## Refund Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Refund Flow                                     │
//! │                                                                         │
//! │  SaleReceipt (PAID) + basket [(item, qty), ...]                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_refund() ← THIS MODULE (pure)                                    │
//! │       ├── receipt must be PAID                                          │
//! │       ├── merge duplicate lines, qty > 0, qty ≤ refundable             │
//! │       ├── total = Σ unit × (1 + tax) × qty, half-up to cents           │
//! │       └── restocks grouped by product                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  till-ledger RefundProcessor (one store transaction)                   │
//! │       ├── 1. REFUND posting (gates the rest)                           │
//! │       ├── 2. stock increments                                           │
//! │       └── 3. receipt → REFUNDED, change_given = −total                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tax Reconstruction
//! Unit prices are stored tax-exclusive. This is the only place where the
//! tax-inclusive price is rebuilt, using the product's current tax rate.
//! The basket is accumulated exactly and rounded once at the end.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ReceiptStatus, SaleReceipt};
use crate::validation::validate_refund_quantity;

// =============================================================================
// Basket
// =============================================================================

/// One requested refund line: `quantity` units of receipt item `item_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundLine {
    pub item_id: String,
    pub quantity: i64,
}

impl RefundLine {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        RefundLine {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Parses `"<item_id>:<quantity>"`.
impl FromStr for RefundLine {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "refund line".to_string(),
            reason: format!("expected <item_id>:<quantity>, got '{}'", s),
        };

        let (item_id, qty) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        if item_id.is_empty() {
            return Err(invalid());
        }
        let quantity = qty.parse::<i64>().map_err(|_| invalid())?;

        Ok(RefundLine::new(item_id, quantity))
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Units of one receipt item being refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundedItem {
    pub item_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// Units of one product going back into a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Restock {
    pub product_id: String,
    pub quantity: i64,
}

/// A validated refund, ready to be applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundPlan {
    pub receipt_id: String,
    pub receipt_code: String,
    /// Tax-inclusive refund total, rounded half-up to cents.
    pub total: Money,
    /// Merged basket, in first-seen order.
    pub items: Vec<RefundedItem>,
    /// Stock to restore, one entry per product, in first-seen order.
    pub restocks: Vec<Restock>,
}

impl RefundPlan {
    /// Value stored as the receipt's `change_given` after the refund.
    #[inline]
    pub fn change_given(&self) -> Money {
        -self.total
    }

    /// Description of the REFUND ledger posting, tagged with the receipt code.
    pub fn ledger_description(&self) -> String {
        format!("Refund for receipt {}", self.receipt_code)
    }
}

/// Validates `basket` against `receipt` and computes the refund.
///
/// ## Rules
/// - Receipt must be PAID (PENDING was never paid, REFUNDED is terminal)
/// - Basket must not be empty
/// - Every line names an item on the receipt with a positive quantity
/// - Lines for the same item are merged; the merged quantity must not
///   exceed the item's refundable quantity
/// - Every item must carry its product reference (tax rate)
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use till_core::{Money, OperatorId, PaymentMethod, Product, RefundLine, SaleReceipt, TaxRate};
/// use till_core::refund::plan_refund;
///
/// let cashier = OperatorId::new("cashier-1").unwrap();
/// let cola = Product::new("COLA", "Cola", Money::from_cents(1000), TaxRate::from_bps(1000));
///
/// let mut receipt = SaleReceipt::new("R-001", &cashier, PaymentMethod::Cash, Utc::now());
/// let item_id = receipt.add_item(&cola, cola.price(), 3, None).id.clone();
/// receipt.mark_paid(Money::from_cents(3300));
///
/// let plan = plan_refund(&receipt, &[RefundLine::new(item_id, 2)]).unwrap();
/// assert_eq!(plan.total.cents(), 2200);
/// ```
pub fn plan_refund(receipt: &SaleReceipt, basket: &[RefundLine]) -> CoreResult<RefundPlan> {
    if receipt.status != ReceiptStatus::Paid {
        return Err(CoreError::InvalidReceiptStatus {
            code: receipt.code.clone(),
            current_status: receipt.status.as_str().to_string(),
        });
    }

    if basket.is_empty() {
        return Err(CoreError::EmptyRefundBasket);
    }

    // Merge duplicate lines, keeping first-seen order
    let mut merged: Vec<(String, i64)> = Vec::with_capacity(basket.len());
    for line in basket {
        validate_refund_quantity(line.quantity)?;
        match merged.iter_mut().find(|(id, _)| *id == line.item_id) {
            Some((_, qty)) => *qty += line.quantity,
            None => merged.push((line.item_id.clone(), line.quantity)),
        }
    }

    let mut scaled_total: i128 = 0;
    let mut items = Vec::with_capacity(merged.len());
    let mut restocks: Vec<Restock> = Vec::new();

    for (item_id, quantity) in merged {
        let item = receipt
            .item(&item_id)
            .ok_or_else(|| CoreError::ItemNotOnReceipt {
                code: receipt.code.clone(),
                item_id: item_id.clone(),
            })?;

        if quantity > item.refundable_quantity() {
            return Err(CoreError::RefundQuantityExceeded {
                item_id,
                refundable: item.refundable_quantity(),
                requested: quantity,
            });
        }

        let product = item
            .product
            .as_ref()
            .ok_or_else(|| CoreError::MissingProductReference {
                item_id: item_id.clone(),
            })?;

        scaled_total += item.unit_price().gross_scaled(product.tax_rate(), quantity);

        match restocks.iter_mut().find(|r| r.product_id == item.product_id) {
            Some(restock) => restock.quantity += quantity,
            None => restocks.push(Restock {
                product_id: item.product_id.clone(),
                quantity,
            }),
        }

        items.push(RefundedItem {
            item_id,
            product_id: item.product_id.clone(),
            quantity,
        });
    }

    Ok(RefundPlan {
        receipt_id: receipt.id.clone(),
        receipt_code: receipt.code.clone(),
        total: Money::from_bps_scaled_half_up(scaled_total),
        items,
        restocks,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
