use std::collections::HashMap;

use tracing::trace;

use crate::catalog::Catalog;
use crate::error::TradeupError;
use crate::model::{
    InputSkin, OutcomeLine, OutcomeProbability, SimulationResult, Wear, TRADEUP_SIZE,
};

/// Evaluate one trade-up against the catalog.
///
/// Each leg adds every distinct skin of the next tier in its collection to
/// a shared bag; an outcome's probability is its share of the bag. All
/// outcomes take their float from the average input float, re-mapped into
/// the outcome skin's own float window. Outcomes with no catalog row or no
/// price for the resulting wear add nothing to the expected value, but
/// their probability is not redistributed.
pub fn simulate(catalog: &Catalog, inputs: &[InputSkin]) -> Result<SimulationResult, TradeupError> {
    validate(inputs)?;

    let total_cost: f64 = inputs.iter().map(|s| s.price).sum();
    let avg_float = inputs.iter().map(|s| s.wear_float).sum::<f64>() / inputs.len() as f64;

    // bag counts, keyed by base name, in first-encountered order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut bag_size = 0usize;

    for leg in inputs {
        let Some(next) = leg.rarity.next() else {
            continue;
        };
        for base_name in catalog.outcome_pool(&leg.collection, next) {
            let slot = *slots.entry(base_name).or_insert_with(|| {
                counts.push((base_name, 0));
                counts.len() - 1
            });
            counts[slot].1 += 1;
            bag_size += 1;
        }
    }

    if bag_size == 0 {
        trace!(collection = %inputs[0].collection, "empty outcome pool");
        return Ok(SimulationResult::empty(total_cost));
    }

    let mut expected_value = 0.0;
    let mut breakdown = Vec::new();
    let mut distribution = Vec::with_capacity(counts.len());

    for (base_name, count) in counts {
        let probability = count as f64 / bag_size as f64;
        distribution.push(OutcomeProbability {
            base_name: base_name.to_string(),
            probability,
        });

        match resolve(catalog, base_name, avg_float) {
            Some((market_hash_name, wear, float, price)) => {
                expected_value += probability * price;
                breakdown.push(OutcomeLine {
                    market_hash_name,
                    wear,
                    float,
                    probability,
                    price,
                });
            }
            None => trace!(base_name, probability, "unresolved outcome"),
        }
    }

    let roi = if total_cost > 0.0 { expected_value / total_cost } else { 0.0 };

    Ok(SimulationResult {
        expected_value,
        total_cost,
        roi,
        breakdown,
        distribution,
    })
}

fn validate(inputs: &[InputSkin]) -> Result<(), TradeupError> {
    if inputs.len() != TRADEUP_SIZE {
        return Err(TradeupError::WrongInputCount {
            expected: TRADEUP_SIZE,
            got: inputs.len(),
        });
    }

    let first = inputs[0].rarity;
    if let Some(other) = inputs.iter().map(|s| s.rarity).find(|r| *r != first) {
        return Err(TradeupError::MixedRarity { first, other });
    }

    Ok(())
}

/// Output float, wear and price for one outcome skin.
fn resolve(catalog: &Catalog, base_name: &str, avg_float: f64) -> Option<(String, Wear, f64, f64)> {
    let any_row = catalog.variants(base_name).next()?;
    let float = any_row.float_min + (any_row.float_max - any_row.float_min) * avg_float;
    let wear = Wear::from_float(float)?;
    let row = catalog.variant(base_name, wear)?;
    let price = row.min_price?;
    Some((row.market_hash_name.clone(), wear, float, price))
}
