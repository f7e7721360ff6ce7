use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::core::discounting::DiscountingOutputs;
use crate::models::effects_row::SeriesTable;
use crate::models::rate::DiscountRate;

/// Final-year totals of one series for one policy and discount rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTotals {
    pub final_year: i32,
    pub totals: IndexMap<String, f64>,
}

/// Sums each monetized column over all category rows of the last calendar
/// year, per (session_policy, discount_rate).
pub fn final_year_totals(table: &SeriesTable, monetized: &[&str]) -> BTreeMap<(String, DiscountRate), SeriesTotals> {
    let mut final_years: BTreeMap<(String, DiscountRate), i32> = BTreeMap::new();
    for key in table.keys() {
        let group = (key.session_policy.clone(), key.discount_rate);
        let year = final_years.entry(group).or_insert(key.calendar_year);
        *year = (*year).max(key.calendar_year);
    }

    let mut summary: BTreeMap<(String, DiscountRate), SeriesTotals> = BTreeMap::new();
    for (key, row) in table {
        let group = (key.session_policy.clone(), key.discount_rate);
        let final_year = final_years[&group];
        if key.calendar_year != final_year {
            continue;
        }
        let entry = summary.entry(group).or_insert_with(|| SeriesTotals {
            final_year,
            totals: monetized.iter().map(|c| (c.to_string(), 0.0)).collect(),
        });
        for column in monetized {
            if let (Some(total), Some(value)) = (entry.totals.get_mut(*column), row.get(column)) {
                *total += value;
            }
        }
    }
    summary
}

pub fn print_discounting_summary(outputs: &DiscountingOutputs) {
    let monetized = outputs.catalog.monetized_columns();
    let present = final_year_totals(&outputs.present_values, &monetized);
    let annualized = final_year_totals(&outputs.annualized_values, &monetized);

    println!("\nDiscounting Summary");
    println!("----------------------------------------");
    println!("Annual values: {}", outputs.annual_values.len());
    println!("Present values: {}", outputs.present_values.len());
    println!("Annualized values: {}", outputs.annualized_values.len());
    if !outputs.continuity_gaps.is_empty() {
        println!("Continuity gaps: {}", outputs.continuity_gaps.len());
    }

    for ((policy, rate), pv) in &present {
        println!("\n{} at {} (through {})", policy, rate, pv.final_year);
        let eav = annualized.get(&(policy.clone(), *rate));
        for (column, total) in &pv.totals {
            match eav.and_then(|e| e.totals.get(column)) {
                Some(annual) => println!("  {}: PV ${:.2}, EAV ${:.2}", column, total, annual),
                None => println!("  {}: PV ${:.2}", column, total),
            }
        }
    }
    println!("----------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::effects_row::{RowKey, Series, SeriesRow};

    fn insert(table: &mut SeriesTable, year: i32, fuel: &str, value: f64) {
        let key = RowKey::new("p", year, "car", fuel, "ICE").with_rate(DiscountRate::new(0.03).unwrap());
        let mut values = IndexMap::new();
        values.insert("fuel_cost_dollars".to_string(), value);
        table.insert(
            key.clone(),
            SeriesRow {
                key,
                series: Series::PresentValue,
                values,
            },
        );
    }

    #[test]
    fn totals_only_the_final_year() {
        let mut table = SeriesTable::new();
        insert(&mut table, 2030, "gasoline", 1.0);
        insert(&mut table, 2031, "gasoline", 2.0);
        insert(&mut table, 2031, "electricity", 5.0);

        let summary = final_year_totals(&table, &["fuel_cost_dollars"]);
        let totals = &summary[&("p".to_string(), DiscountRate::new(0.03).unwrap())];
        assert_eq!(totals.final_year, 2031);
        assert_eq!(totals.totals["fuel_cost_dollars"], 7.0);
    }
}
