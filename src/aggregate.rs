// src/aggregate.rs
//! # Demand Aggregator
//! Pure logic that maps a ledger snapshot + report window to the per-city
//! aggregate a report renders. No I/O; recomputed fully on every query.
//!
//! Per address, demand sums the admitted staffing counts that are either
//! `>= 8` or equal to the address maximum. When several entries tie for a
//! maximum below 8, each tied entry is summed; that is the intended
//! heuristic, not a bug. The two-pass city filter then keeps the addresses
//! worth dispatching to: every address above 8 when any exists, otherwise
//! only the city's maximum.

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::dedup::suppressor_for;
use crate::ledger::Streets;
use crate::window::ReportWindow;

/// Aggregate for one city, iteration order preserved from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityReport {
    /// price → number of addresses whose max admitted price was that price.
    /// Every address contributes exactly one increment; an address with
    /// nothing admitted in the window lands in the 0 bucket.
    pub unique_requests_by_price: IndexMap<u32, u32>,
    /// Surviving addresses with their demand, sorted by demand descending
    /// (stable on first-seen order).
    pub address_with_people: Vec<(String, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub cities: IndexMap<String, CityReport>,
    /// Raw (pre-dedup) posting count inside the window, across all cities.
    pub total_posting_count: u64,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Compute the full aggregate for one source's streets tree.
pub fn aggregate(streets: &Streets, window: &ReportWindow, config: &EngineConfig) -> Report {
    let mut cities = IndexMap::new();
    let mut total_posting_count = 0u64;

    for (city, addresses) in streets {
        let mut unique_requests_by_price: IndexMap<u32, u32> = IndexMap::new();
        // admitted staffing counts per address, in posting order
        let mut bodies_by_address: IndexMap<&str, Vec<u32>> = IndexMap::new();

        for (address, postings) in addresses {
            let mut suppressor = suppressor_for(config);
            let mut max_paid = 0u32;

            for posting in postings {
                if !window.contains(posting.datetime) {
                    continue;
                }
                total_posting_count += 1;
                if !suppressor.admit(posting) {
                    // repost of an already-counted offer
                    continue;
                }
                bodies_by_address
                    .entry(address.as_str())
                    .or_default()
                    .push(posting.body_count);
                max_paid = max_paid.max(posting.paid_amount);
            }

            *unique_requests_by_price.entry(max_paid).or_insert(0) += 1;
        }

        // Demand per address, plus the two filter inputs.
        let mut demand_by_address: Vec<(&str, u32)> = Vec::with_capacity(bodies_by_address.len());
        let mut add_counter = 0usize;
        let mut city_max = 0u32;
        for (&address, bodies) in &bodies_by_address {
            let max_body = bodies.iter().copied().max().unwrap_or(0);
            let demand: u32 = bodies
                .iter()
                .copied()
                .filter(|&b| b >= 8 || b == max_body)
                .sum();
            if demand > 8 {
                add_counter += 1;
            }
            city_max = city_max.max(demand);
            demand_by_address.push((address, demand));
        }

        // Two-pass filter: with any address above 8, drop everything under 8;
        // otherwise keep only the address(es) tied for the city maximum.
        demand_by_address.retain(|&(_, demand)| {
            if add_counter > 0 {
                demand >= 8
            } else {
                demand == city_max
            }
        });
        demand_by_address.sort_by(|a, b| b.1.cmp(&a.1));

        cities.insert(
            city.clone(),
            CityReport {
                unique_requests_by_price,
                address_with_people: demand_by_address
                    .into_iter()
                    .map(|(a, d)| (a.to_string(), d))
                    .collect(),
            },
        );
    }

    Report {
        cities,
        total_posting_count,
    }
}
