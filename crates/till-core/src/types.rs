//! # Domain Types
//!
//! Core domain types of the cash register subsystem.
//!
//! ## Aggregates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   owns    ┌─────────────────┐                     │
//! │  │  CashRegister   │ ────────► │  LedgerRecord   │  (append-only)      │
//! │  │  ─────────────  │   1..*    │  ─────────────  │                     │
//! │  │  status         │           │  record_type    │                     │
//! │  │  total_balance  │           │  amount (> 0)   │                     │
//! │  └─────────────────┘           └─────────────────┘                     │
//! │                                                                         │
//! │  ┌─────────────────┐   owns    ┌─────────────────┐                     │
//! │  │  SaleReceipt    │ ────────► │  ReceiptItem    │  (snapshot prices)  │
//! │  │  ─────────────  │   1..*    │  ─────────────  │                     │
//! │  │  code           │           │  receipt_id     │  ← plain id, not a  │
//! │  │  status         │           │  line_total     │    back-pointer     │
//! │  └─────────────────┘           └─────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machines
//! - Register: `Open → Closed` exactly once; a new register per opening.
//! - Receipt: `Pending → Paid → Refunded`; `Refunded` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Operator
// =============================================================================

/// Identifier of the operator (cashier, manager) performing an operation.
///
/// Passed explicitly into every mutating call instead of being read from a
/// process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperatorId(String);

impl OperatorId {
    /// Creates an operator id, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "operator".to_string(),
            });
        }
        Ok(OperatorId(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// Lifecycle status of a cash register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    /// Register is accepting postings.
    Open,
    /// Register was closed; it is never reopened.
    Closed,
}

impl RegisterStatus {
    /// Returns the lowercase name used in storage and messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
        }
    }
}

/// The physical till for one opening period.
///
/// ## Invariant
/// At most one register has status `Open` at any time. A closed register
/// stays closed; the next opening creates a new register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashRegister {
    pub id: String,
    /// Balance the operator confirmed when opening.
    pub opening_balance_cents: i64,
    /// Running balance, maintained incrementally by every posting.
    pub total_balance_cents: i64,
    pub status: RegisterStatus,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opened_by: String,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
}

impl CashRegister {
    /// Creates a freshly opened register.
    pub fn open(opening_balance: Money, operator: &OperatorId, now: DateTime<Utc>) -> Self {
        CashRegister {
            id: Uuid::new_v4().to_string(),
            opening_balance_cents: opening_balance.cents(),
            total_balance_cents: opening_balance.cents(),
            status: RegisterStatus::Open,
            opened_at: now,
            opened_by: operator.as_str().to_string(),
            closed_at: None,
            closed_by: None,
        }
    }

    /// Marks the register closed. The balance is trusted as-is.
    pub fn close(&mut self, operator: &OperatorId, now: DateTime<Utc>) {
        self.status = RegisterStatus::Closed;
        self.closed_at = Some(now);
        self.closed_by = Some(operator.as_str().to_string());
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    /// Returns the running balance as Money.
    #[inline]
    pub fn total_balance(&self) -> Money {
        Money::from_cents(self.total_balance_cents)
    }

    /// Returns the opening balance as Money.
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Kind of manual financial movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerType {
    /// Cash put into the till (adds to the balance).
    Income,
    /// Cash taken out for an expense (subtracts).
    Expense,
    /// Cash paid back to a customer (subtracts).
    Refund,
}

impl LedgerType {
    /// Applies this type's sign to a positive magnitude.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::{LedgerType, Money};
    ///
    /// let amount = Money::from_cents(3000);
    /// assert_eq!(LedgerType::Income.signed(amount).cents(), 3000);
    /// assert_eq!(LedgerType::Expense.signed(amount).cents(), -3000);
    /// assert_eq!(LedgerType::Refund.signed(amount).cents(), -3000);
    /// ```
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            LedgerType::Income => amount,
            LedgerType::Expense | LedgerType::Refund => -amount,
        }
    }

    /// Uppercase label used as the report category.
    pub const fn label(&self) -> &'static str {
        match self {
            LedgerType::Income => "INCOME",
            LedgerType::Expense => "EXPENSE",
            LedgerType::Refund => "REFUND",
        }
    }
}

impl fmt::Display for LedgerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for LedgerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(LedgerType::Income),
            "expense" => Ok(LedgerType::Expense),
            "refund" => Ok(LedgerType::Refund),
            other => Err(ValidationError::InvalidFormat {
                field: "type".to_string(),
                reason: format!("unknown ledger type '{}'", other),
            }),
        }
    }
}

/// A single immutable posting against a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerRecord {
    pub id: String,
    pub register_id: String,
    #[ts(as = "String")]
    pub date_time: DateTime<Utc>,
    /// Always a positive magnitude; the sign comes from `record_type`.
    pub amount_cents: i64,
    pub record_type: LedgerType,
    pub description: String,
    pub operator_id: String,
}

impl LedgerRecord {
    /// Creates a new posting bound to `register`.
    pub fn new(
        register: &CashRegister,
        operator: &OperatorId,
        amount: Money,
        record_type: LedgerType,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        LedgerRecord {
            id: Uuid::new_v4().to_string(),
            register_id: register.id.clone(),
            date_time: now,
            amount_cents: amount.cents(),
            record_type,
            description: description.into(),
            operator_id: operator.as_str().to_string(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Effect of this posting on the register balance.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        self.record_type.signed(self.amount())
    }
}

// =============================================================================
// Catalog (narrow slice)
// =============================================================================

/// A product as the refund flow needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new active product.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money, tax: TaxRate) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.into(),
            name: name.into(),
            price_cents: price.cents(),
            tax_rate_bps: tax.bps(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the lightweight reference receipt items carry.
    pub fn reference(&self) -> ProductRef {
        ProductRef {
            id: self.id.clone(),
            sku: self.sku.clone(),
            name: self.name.clone(),
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

/// Product reference eagerly loaded alongside a receipt item.
///
/// Carries the *current* catalog tax rate; name and price on the item
/// itself are the frozen sale-time snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub tax_rate_bps: u32,
}

impl ProductRef {
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// A storage location holding stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Quantity of one product in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntry {
    pub id: String,
    pub product_id: String,
    pub warehouse_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Receipts
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
}

/// Status of a point-of-sale receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Created, payment not yet captured.
    Pending,
    /// Payment captured.
    Paid,
    /// Refunded. Terminal.
    Refunded,
}

impl Default for ReceiptStatus {
    fn default() -> Self {
        ReceiptStatus::Pending
    }
}

impl ReceiptStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Paid => "paid",
            ReceiptStatus::Refunded => "refunded",
        }
    }
}

/// A line on a sale receipt.
///
/// ## Snapshot Pattern
/// `product_name` and `unit_price` are copied from the catalog at sale
/// time and never follow later catalog edits.
///
/// ## Line Total
/// `line_total = unit_price × quantity − discount`, recomputed by every
/// setter. Rows written before line totals existed carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReceiptItem {
    pub id: String,
    pub receipt_id: String,
    /// Ordering of the line on the receipt.
    pub position: i64,
    pub product_id: String,
    pub product_name: String,
    pub(crate) unit_price_cents: i64,
    pub(crate) quantity: i64,
    pub(crate) discount_cents: Option<i64>,
    pub(crate) line_total_cents: Option<i64>,
    /// Units already refunded from this line.
    pub refunded_quantity: i64,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub product: Option<ProductRef>,
}

impl ReceiptItem {
    /// Creates a line snapshotting `product`'s current name.
    pub fn new(
        receipt_id: impl Into<String>,
        position: i64,
        product: &Product,
        unit_price: Money,
        quantity: i64,
        discount: Option<Money>,
    ) -> Self {
        let mut item = ReceiptItem {
            id: Uuid::new_v4().to_string(),
            receipt_id: receipt_id.into(),
            position,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price_cents: unit_price.cents(),
            quantity,
            discount_cents: discount.map(|d| d.cents()),
            line_total_cents: None,
            refunded_quantity: 0,
            product: Some(product.reference()),
        };
        item.recompute_line_total();
        item
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn discount(&self) -> Option<Money> {
        self.discount_cents.map(Money::from_cents)
    }

    /// Stored line total, if it was ever computed.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.line_total_cents.map(Money::from_cents)
    }

    /// Line total, falling back to `unit_price × quantity` for rows whose
    /// total was never computed.
    pub fn effective_total(&self) -> Money {
        self.line_total()
            .unwrap_or_else(|| self.unit_price().multiply_quantity(self.quantity))
    }

    /// Units that can still be refunded.
    #[inline]
    pub fn refundable_quantity(&self) -> i64 {
        self.quantity - self.refunded_quantity
    }

    pub fn set_unit_price(&mut self, unit_price: Money) {
        self.unit_price_cents = unit_price.cents();
        self.recompute_line_total();
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.recompute_line_total();
    }

    pub fn set_discount(&mut self, discount: Option<Money>) {
        self.discount_cents = discount.map(|d| d.cents());
        self.recompute_line_total();
    }

    fn recompute_line_total(&mut self) {
        let gross = self.unit_price().multiply_quantity(self.quantity);
        let discount = self.discount().unwrap_or_default();
        self.line_total_cents = Some((gross - discount).cents());
    }
}

/// A point-of-sale transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleReceipt {
    pub id: String,
    /// Unique human-readable code printed on the receipt.
    pub code: String,
    #[ts(as = "String")]
    pub date_time: DateTime<Utc>,
    pub cashier_id: String,
    pub payment_method: PaymentMethod,
    pub paid_amount_cents: i64,
    /// Positive for change handed back on sale, negative for a refund payout.
    pub change_given_cents: i64,
    pub status: ReceiptStatus,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<ReceiptItem>,
}

impl SaleReceipt {
    /// Creates an empty pending receipt.
    pub fn new(
        code: impl Into<String>,
        cashier: &OperatorId,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        SaleReceipt {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            date_time: now,
            cashier_id: cashier.as_str().to_string(),
            payment_method,
            paid_amount_cents: 0,
            change_given_cents: 0,
            status: ReceiptStatus::Pending,
            items: Vec::new(),
        }
    }

    /// Appends a line for `product`, returning a reference to it.
    pub fn add_item(
        &mut self,
        product: &Product,
        unit_price: Money,
        quantity: i64,
        discount: Option<Money>,
    ) -> &ReceiptItem {
        let position = self.items.len() as i64;
        let item = ReceiptItem::new(self.id.clone(), position, product, unit_price, quantity, discount);
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Records payment capture (done by the point-of-sale flow).
    pub fn mark_paid(&mut self, paid: Money) {
        self.paid_amount_cents = paid.cents();
        self.change_given_cents = (paid - self.total_cost()).cents();
        self.status = ReceiptStatus::Paid;
    }

    /// Σ(unit_price × quantity), before discounts.
    pub fn sub_total(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.unit_price().multiply_quantity(i.quantity()))
            .sum()
    }

    /// Σ(line_total), with the `unit_price × quantity` fallback per item.
    pub fn total_cost(&self) -> Money {
        self.items.iter().map(ReceiptItem::effective_total).sum()
    }

    #[inline]
    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    #[inline]
    pub fn change_given(&self) -> Money {
        Money::from_cents(self.change_given_cents)
    }

    /// Finds an item by id.
    pub fn item(&self, item_id: &str) -> Option<&ReceiptItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cashier() -> OperatorId {
        OperatorId::new("cashier-1").unwrap()
    }

    fn product(price: i64, tax_bps: u32) -> Product {
        Product::new("SKU-1", "Cola", Money::from_cents(price), TaxRate::from_bps(tax_bps))
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_operator_id_rejects_blank() {
        assert!(OperatorId::new("").is_err());
        assert!(OperatorId::new("   ").is_err());
        assert_eq!(OperatorId::new(" alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_register_open_and_close() {
        let now = Utc::now();
        let mut register = CashRegister::open(Money::from_cents(10000), &cashier(), now);
        assert!(register.is_open());
        assert_eq!(register.total_balance().cents(), 10000);
        assert_eq!(register.opening_balance().cents(), 10000);

        register.close(&cashier(), now);
        assert_eq!(register.status, RegisterStatus::Closed);
        assert_eq!(register.closed_at, Some(now));
        assert_eq!(register.closed_by.as_deref(), Some("cashier-1"));
    }

    #[test]
    fn test_ledger_record_signed_amount() {
        let register = CashRegister::open(Money::zero(), &cashier(), Utc::now());
        let income = LedgerRecord::new(
            &register,
            &cashier(),
            Money::from_cents(5000),
            LedgerType::Income,
            "float top-up",
            Utc::now(),
        );
        assert_eq!(income.signed_amount().cents(), 5000);
        assert_eq!(income.register_id, register.id);

        let expense = LedgerRecord::new(
            &register,
            &cashier(),
            Money::from_cents(3000),
            LedgerType::Expense,
            "cleaning supplies",
            Utc::now(),
        );
        assert_eq!(expense.signed_amount().cents(), -3000);
    }

    #[test]
    fn test_ledger_type_parse() {
        assert_eq!("income".parse::<LedgerType>().unwrap(), LedgerType::Income);
        assert_eq!("EXPENSE".parse::<LedgerType>().unwrap(), LedgerType::Expense);
        assert!("transfer".parse::<LedgerType>().is_err());
    }

    #[test]
    fn test_line_total_recomputed_on_change() {
        let cola = product(250, 0);
        let mut item = ReceiptItem::new("r-1", 0, &cola, cola.price(), 4, None);
        assert_eq!(item.line_total().unwrap().cents(), 1000);

        item.set_discount(Some(Money::from_cents(150)));
        assert_eq!(item.line_total().unwrap().cents(), 850);

        item.set_quantity(2);
        assert_eq!(item.line_total().unwrap().cents(), 350);

        item.set_unit_price(Money::from_cents(300));
        assert_eq!(item.line_total().unwrap().cents(), 450);

        item.set_discount(None);
        assert_eq!(item.line_total().unwrap().cents(), 600);
    }

    #[test]
    fn test_snapshot_survives_catalog_edit() {
        let mut cola = product(250, 0);
        let item = ReceiptItem::new("r-1", 0, &cola, cola.price(), 1, None);

        cola.name = "Cola Zero".to_string();
        cola.price_cents = 999;

        assert_eq!(item.product_name, "Cola");
        assert_eq!(item.unit_price().cents(), 250);
    }

    #[test]
    fn test_receipt_totals() {
        let cola = product(1000, 1000);
        let chips = product(500, 0);

        let mut receipt = SaleReceipt::new("R-001", &cashier(), PaymentMethod::Cash, Utc::now());
        receipt.add_item(&cola, cola.price(), 2, Some(Money::from_cents(200)));
        receipt.add_item(&chips, chips.price(), 1, None);

        assert_eq!(receipt.sub_total().cents(), 2500);
        assert_eq!(receipt.total_cost().cents(), 2300);
        assert_eq!(receipt.items[1].position, 1);
        assert_eq!(receipt.items[0].receipt_id, receipt.id);
    }

    #[test]
    fn test_total_cost_falls_back_when_line_total_missing() {
        let cola = product(1000, 0);
        let mut receipt = SaleReceipt::new("R-002", &cashier(), PaymentMethod::Card, Utc::now());
        receipt.add_item(&cola, cola.price(), 3, Some(Money::from_cents(500)));
        receipt.items[0].line_total_cents = None;

        assert_eq!(receipt.total_cost().cents(), 3000);
    }

    #[test]
    fn test_mark_paid_sets_change() {
        let cola = product(1000, 0);
        let mut receipt = SaleReceipt::new("R-003", &cashier(), PaymentMethod::Cash, Utc::now());
        receipt.add_item(&cola, cola.price(), 1, None);
        receipt.mark_paid(Money::from_cents(2000));

        assert_eq!(receipt.status, ReceiptStatus::Paid);
        assert_eq!(receipt.change_given().cents(), 1000);
    }

    #[test]
    fn test_receipt_status_default() {
        assert_eq!(ReceiptStatus::default(), ReceiptStatus::Pending);
    }
}
