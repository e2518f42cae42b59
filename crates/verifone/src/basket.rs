//! Basket items for payments and payment links.

use serde::Serialize;

use crate::params::ParameterSet;

/// Convert a major-unit amount to the provider's minor-unit integer form
/// with two-decimal precision: `1.51` becomes `151`.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// One basket line. A payment carries 0-50 of these, emitted as indexed
/// `bi-*` fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BasketItem {
    /// Item name, at most 30 characters.
    pub name: String,
    /// Number of units.
    pub unit_count: u32,
    /// Tax percentage with two-decimal precision, e.g. `24.0`.
    pub vat_percent: f64,
    /// Discount percentage with two-decimal precision.
    pub discount_percent: f64,
    /// Gross amount including tax and discount, major units.
    pub gross_amount: Option<f64>,
    /// Net amount, major units.
    pub net_amount: Option<f64>,
    /// Unit cost including tax and discount, major units. Fill either this
    /// or `unit_cost`, not both.
    pub unit_cost_gross: Option<f64>,
    /// Unit cost without tax and discount, major units.
    pub unit_cost: Option<f64>,
}

impl BasketItem {
    /// Emit this item's fields at basket position `index`.
    pub fn write_to(&self, index: usize, params: &mut ParameterSet) {
        params.insert(format!("s-t-1-30_bi-name-{index}"), self.name.clone());
        params.insert(
            format!("i-t-1-11_bi-unit-count-{index}"),
            self.unit_count.to_string(),
        );
        params.insert(
            format!("i-t-1-4_bi-vat-percentage-{index}"),
            to_minor_units(self.vat_percent).to_string(),
        );
        params.insert(
            format!("i-t-1-4_bi-discount-percentage-{index}"),
            to_minor_units(self.discount_percent).to_string(),
        );
        if let Some(net) = self.net_amount {
            params.insert(
                format!("l-t-1-20_bi-net-amount-{index}"),
                to_minor_units(net).to_string(),
            );
        }
        if let Some(gross) = self.gross_amount {
            params.insert(
                format!("l-t-1-20_bi-gross-amount-{index}"),
                to_minor_units(gross).to_string(),
            );
        }
        if let Some(unit_gross) = self.unit_cost_gross {
            params.insert(
                format!("l-t-1-20_bi-unit-gross-cost-{index}"),
                to_minor_units(unit_gross).to_string(),
            );
        }
        if let Some(unit) = self.unit_cost {
            params.insert(
                format!("l-t-1-20_bi-unit-cost-{index}"),
                to_minor_units(unit).to_string(),
            );
        }
    }
}
