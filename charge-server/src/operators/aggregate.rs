//! Operator roster aggregation.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::store::{OperatorRow, StationStore, StoreError};

/// Label for stations without an operator.
pub const UNKNOWN_OPERATOR: &str = "Unknown Operator";

/// Label for stations without a country.
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

/// One operator in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSummary {
    pub name: String,
    /// Alphabetically sorted, no duplicates.
    pub countries: Vec<String>,
    pub station_count: usize,
}

struct Accumulator {
    name: String,
    countries: BTreeSet<String>,
    station_count: usize,
}

/// Build the operator roster from station rows.
///
/// Sorted by station count, highest first. Operators with equal counts
/// keep the order in which they first appear in `rows`.
pub fn aggregate(rows: &[OperatorRow]) -> Vec<OperatorSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for row in rows {
        let name = label(row.operator_name.as_deref(), UNKNOWN_OPERATOR);
        let country = label(row.country.as_deref(), UNKNOWN_COUNTRY);

        let slot = *index.entry(name).or_insert_with(|| {
            accumulators.push(Accumulator {
                name: name.to_string(),
                countries: BTreeSet::new(),
                station_count: 0,
            });
            accumulators.len() - 1
        });

        let acc = &mut accumulators[slot];
        acc.countries.insert(country.to_string());
        acc.station_count += 1;
    }

    let mut roster: Vec<OperatorSummary> = accumulators
        .into_iter()
        .map(|acc| OperatorSummary {
            name: acc.name,
            countries: acc.countries.into_iter().collect(),
            station_count: acc.station_count,
        })
        .collect();

    // Stable, so ties stay in first-seen order.
    roster.sort_by(|a, b| b.station_count.cmp(&a.station_count));

    roster
}

/// Fetch rows from the store and aggregate them.
pub async fn aggregate_from_store(
    store: &dyn StationStore,
) -> Result<Vec<OperatorSummary>, StoreError> {
    let rows = store.operator_rows().await?;
    Ok(aggregate(&rows))
}

fn label<'a>(value: Option<&'a str>, fallback: &'static str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback)
}
