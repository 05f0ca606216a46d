// src/reports/commissions.rs

//! Sales and the commissions they pay, narrowed the same way as the call
//! reports.

use crate::domain::queue::fold_accents;
use crate::domain::scope::Visibility;
use crate::domain::{Client, Development, Sale, SaleStatus};
use chrono::Datelike;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionFilter {
    pub visibility: Visibility,
    /// Matches buyer names (accent insensitive), CPFs, block and lot.
    pub search: String,
    pub development_id: Option<String>,
    pub status: Option<SaleStatus>,
    /// Year of the purchase date.
    pub year: Option<i32>,
}

impl Default for CommissionFilter {
    fn default() -> Self {
        Self {
            visibility: Visibility::Everyone,
            search: String::new(),
            development_id: None,
            status: None,
            year: None,
        }
    }
}

/// A sale joined with its buyers and development for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionRow {
    pub sale: Sale,
    pub buyer: Option<Client>,
    pub second_buyer: Option<Client>,
    pub development: String,
}

impl CommissionRow {
    fn matches(&self, needle: &str, lowered: &str) -> bool {
        let buyer_hit = |c: &Option<Client>| {
            c.as_ref().map_or(false, |c| {
                fold_accents(&c.name).contains(needle) || c.cpf.to_lowercase().contains(lowered)
            })
        };
        buyer_hit(&self.buyer)
            || buyer_hit(&self.second_buyer)
            || self.sale.block_number.to_lowercase().contains(lowered)
            || self.sale.lot_number.to_lowercase().contains(lowered)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommissionTotals {
    pub sales: usize,
    pub total_value: f64,
    pub commission_value: f64,
}

/// Visible sales matching the filter, in the order given.
pub fn commission_rows(
    sales: &[Sale],
    clients: &[Client],
    developments: &[Development],
    filter: &CommissionFilter,
) -> Vec<CommissionRow> {
    let clients: HashMap<&str, &Client> = clients.iter().map(|c| (c.id.as_str(), c)).collect();
    let developments: HashMap<&str, &str> = developments
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();
    let search = filter.search.trim();
    let needle = fold_accents(search);
    let lowered = search.to_lowercase();

    sales
        .iter()
        .filter(|s| filter.visibility.allows(&s.broker_id))
        .filter(|s| {
            filter
                .development_id
                .as_deref()
                .map_or(true, |d| s.development_id == d)
        })
        .filter(|s| filter.status.map_or(true, |st| s.status == st))
        .filter(|s| filter.year.map_or(true, |y| s.purchase_date.year() == y))
        .map(|s| CommissionRow {
            buyer: clients.get(s.client_id.as_str()).map(|c| (*c).clone()),
            second_buyer: s
                .second_buyer_id
                .as_deref()
                .and_then(|id| clients.get(id))
                .map(|c| (*c).clone()),
            development: developments
                .get(s.development_id.as_str())
                .map_or_else(|| s.development_id.clone(), |n| n.to_string()),
            sale: s.clone(),
        })
        .filter(|row| search.is_empty() || row.matches(&needle, &lowered))
        .collect()
}

pub fn commission_totals(rows: &[CommissionRow]) -> CommissionTotals {
    rows.iter().fold(CommissionTotals::default(), |acc, row| CommissionTotals {
        sales: acc.sales + 1,
        total_value: acc.total_value + row.sale.total_value,
        commission_value: acc.commission_value + row.sale.commission_value,
    })
}

/// Purchase years present in `sales`, newest first, for the year picker.
pub fn sale_years(sales: &[Sale]) -> Vec<i32> {
    let mut years: Vec<i32> = sales.iter().map(|s| s.purchase_date.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}
