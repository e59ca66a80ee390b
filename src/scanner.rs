//! Brute-force search for profitable uniform trade-ups.
//!
//! A candidate is ten copies of one catalog row, each assumed to sit at the
//! midpoint float of its wear. Candidates are enumerated in a fixed order
//! (rarity, collection, base skin by price, wear) and simulated in
//! parallel; hits are returned best ROI first, ties in enumeration order.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::ScanConfig;
use crate::error::TradeupError;
use crate::model::{InputSkin, Rarity, ScanHit, Wear, TRADEUP_SIZE};
use crate::simulator::simulate;

struct Candidate {
    input: InputSkin,
    wear: Wear,
}

pub fn scan(catalog: &Catalog, config: &ScanConfig) -> Result<Vec<ScanHit>, TradeupError> {
    if let Some(r) = config.rarities.iter().find(|r| r.next().is_none()) {
        return Err(TradeupError::TerminalRarity(*r));
    }

    let candidates: Vec<Candidate> = config
        .rarities
        .iter()
        .flat_map(|&rarity| candidates_at(catalog, rarity))
        .collect();

    info!(
        candidates = candidates.len(),
        threshold = config.threshold,
        "scanning trade-ups"
    );

    let evaluated: Result<Vec<Option<ScanHit>>, TradeupError> = candidates
        .par_iter()
        .map(|c| evaluate(catalog, c, config.threshold))
        .collect();

    let mut hits: Vec<ScanHit> = evaluated?.into_iter().flatten().collect();
    sort_by_roi(&mut hits);

    info!(hits = hits.len(), "scan complete");
    Ok(hits)
}

/// Best ROI first. Stable, so equal ROIs keep their relative order.
pub fn sort_by_roi(hits: &mut [ScanHit]) {
    hits.sort_by(|a, b| b.roi.total_cmp(&a.roi));
}

fn candidates_at(catalog: &Catalog, rarity: Rarity) -> Vec<Candidate> {
    let mut out = Vec::new();

    for collection in catalog.collections_at(rarity) {
        for base_name in catalog.base_skins_by_price(collection, rarity) {
            for wear in Wear::ALL {
                let Some(row) = catalog.variant(base_name, wear) else {
                    continue;
                };

                let mid = wear.midpoint();
                if !row.contains_float(mid) {
                    debug!(skin = %row.market_hash_name, mid, "midpoint outside float range, skipping");
                    continue;
                }

                let Some(price) = row.min_price else {
                    debug!(skin = %row.market_hash_name, "no price, skipping");
                    continue;
                };

                out.push(Candidate {
                    input: InputSkin::from_record(row, mid, price),
                    wear,
                });
            }
        }
    }

    debug!(%rarity, candidates = out.len(), "enumerated candidates");
    out
}

fn evaluate(catalog: &Catalog, candidate: &Candidate, threshold: f64) -> Result<Option<ScanHit>, TradeupError> {
    let inputs = vec![candidate.input.clone(); TRADEUP_SIZE];
    let result = simulate(catalog, &inputs)?;

    if result.roi < threshold {
        return Ok(None);
    }

    debug!(
        skin = %candidate.input.market_hash_name,
        roi = format!("{:.2}%", result.roi * 100.0),
        "profitable trade-up"
    );

    Ok(Some(ScanHit {
        input: candidate.input.clone(),
        wear: candidate.wear,
        expected_value: result.expected_value,
        cost: result.total_cost,
        roi: result.roi,
        breakdown: result.breakdown,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::record;

    const EPS: f64 = 1e-9;

    fn market() -> Catalog {
        Catalog::new(vec![
            // C: 10 x 1.00 in, 20.00 out -> roi 2.0
            record("Cheap", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(1.0)),
            record("Prize", "C", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(20.0)),
            // D: 10 x 2.00 in, 19.00 out -> roi 0.95
            record("Meh", "D", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(2.0)),
            record("Okay", "D", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(19.0)),
            // E: 10 x 4.00 in, 20.00 out -> roi 0.5
            record("Bad", "E", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(4.0)),
            record("Meagre", "E", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(20.0)),
        ])
    }

    fn config(threshold: f64) -> ScanConfig {
        ScanConfig {
            threshold,
            rarities: vec![Rarity::MilSpec],
        }
    }

    #[test]
    fn reports_profitable_setups_best_first() {
        let hits = scan(&market(), &config(0.9)).unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.input.market_hash_name.as_str()).collect();
        assert_eq!(names, vec!["Cheap (Field-Tested)", "Meh (Field-Tested)"]);

        let best = &hits[0];
        assert_eq!(best.wear, Wear::FieldTested);
        assert!((best.input.wear_float - 0.265).abs() < EPS);
        assert!((best.cost - 10.0).abs() < EPS);
        assert!((best.expected_value - 20.0).abs() < EPS);
        assert!((best.roi - 2.0).abs() < EPS);
        assert!((hits[1].roi - 0.95).abs() < EPS);
    }

    #[test]
    fn threshold_is_inclusive() {
        let hits = scan(&market(), &config(0.95)).unwrap();
        assert_eq!(hits.len(), 2);
        let hits = scan(&market(), &config(0.96)).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn skips_wears_whose_midpoint_is_out_of_range() {
        // Skin only exists up to 0.08, so its Field-Tested row is bogus.
        let catalog = Catalog::new(vec![
            record("Low", "C", Rarity::MilSpec, Wear::FactoryNew, (0.0, 0.08), Some(1.0)),
            record("Low", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 0.08), Some(0.5)),
            record("Out", "C", Rarity::Restricted, Wear::FactoryNew, (0.0, 1.0), Some(50.0)),
        ]);
        let hits = scan(&catalog, &config(0.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].wear, Wear::FactoryNew);
        assert!((hits[0].roi - 5.0).abs() < EPS);
    }

    #[test]
    fn skips_unpriced_inputs() {
        let catalog = Catalog::new(vec![
            record("Ghost", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), None),
            record("Prize", "C", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(20.0)),
        ]);
        assert!(scan(&catalog, &config(0.0)).unwrap().is_empty());
    }

    #[test]
    fn collections_without_next_tier_yield_nothing() {
        let catalog = Catalog::new(vec![
            record("Lonely", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(1.0)),
        ]);
        // roi is 0, so even a zero threshold reports it
        let hits = scan(&catalog, &config(0.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].roi, 0.0);
        assert!(scan(&catalog, &config(0.1)).unwrap().is_empty());
    }

    #[test]
    fn covert_target_is_a_caller_error() {
        let cfg = ScanConfig {
            threshold: 0.9,
            rarities: vec![Rarity::MilSpec, Rarity::Covert],
        };
        assert_eq!(
            scan(&market(), &cfg).unwrap_err(),
            TradeupError::TerminalRarity(Rarity::Covert)
        );
    }

    #[test]
    fn equal_roi_keeps_scan_order() {
        let catalog = Catalog::new(vec![
            record("Second", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(2.0)),
            record("First", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(1.0)),
        ]);
        let hits = scan(&catalog, &config(0.0)).unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.input.market_hash_name.as_str()).collect();
        // both roi 0; cheaper skin is scanned first
        assert_eq!(names, vec!["First (Field-Tested)", "Second (Field-Tested)"]);
    }
}
