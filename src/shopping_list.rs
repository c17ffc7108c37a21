//! Shopping-list aggregation: every recipe in a user's cart is expanded into
//! its ingredient links and the amounts are summed per ingredient name.
//! Quantities for the same name are added even across different recipes; no
//! unit conversion happens here.

use std::collections::HashMap;

/// One ingredient link pulled from the cart join, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub name: String,
    pub amount: i64,
}

/// Sums amounts keyed by ingredient name, preserving first-seen order.
pub fn aggregate_cart(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<CartLine> = Vec::new();
    for line in lines {
        match index.get(&line.name) {
            Some(&position) => totals[position].amount += line.amount,
            None => {
                index.insert(line.name.clone(), totals.len());
                totals.push(line);
            }
        }
    }
    totals
}

/// Renders the plain-text download body: a header line, a blank line, then
/// one `name: amount` line per aggregated ingredient.
pub fn render_shopping_list(totals: &[CartLine]) -> String {
    let mut body = String::from("Shopping list:\n\n");
    for line in totals {
        body.push_str(&format!("{}: {}\n", line.name, line.amount));
    }
    body
}
