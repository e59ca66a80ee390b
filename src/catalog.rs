use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::model::{ItemRecord, Rarity, Wear};

/// Read-only set of catalog rows with the lookups the simulator and
/// scanner need. Row order is preserved and drives every "first seen"
/// ordering below.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<ItemRecord>,
    by_base: HashMap<String, Vec<usize>>,
    by_collection: HashMap<(String, Rarity), Vec<usize>>,
}

impl Catalog {
    pub fn new(records: Vec<ItemRecord>) -> Self {
        let mut catalog = Catalog::default();
        let mut rejected = 0usize;

        for record in records {
            let valid = 0.0 <= record.float_min
                && record.float_min < record.float_max
                && record.float_max <= 1.0;
            if !valid {
                rejected += 1;
                continue;
            }

            let idx = catalog.records.len();
            catalog.by_base.entry(record.base_name.clone()).or_default().push(idx);
            catalog
                .by_collection
                .entry((record.collection.clone(), record.rarity))
                .or_default()
                .push(idx);
            catalog.records.push(record);
        }

        if rejected > 0 {
            warn!(rejected, "dropped catalog rows with an invalid float range");
        }

        catalog
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn in_collection<'a>(
        &'a self,
        collection: &str,
        rarity: Rarity,
    ) -> impl Iterator<Item = &'a ItemRecord> + 'a {
        self.by_collection
            .get(&(collection.to_string(), rarity))
            .into_iter()
            .flatten()
            .map(move |&i| &self.records[i])
    }

    pub fn variants<'a>(&'a self, base_name: &str) -> impl Iterator<Item = &'a ItemRecord> + 'a {
        self.by_base
            .get(base_name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.records[i])
    }

    pub fn variant(&self, base_name: &str, wear: Wear) -> Option<&ItemRecord> {
        self.variants(base_name).find(|r| r.wear == wear)
    }

    /// Distinct skins a leg from `collection` can turn into when the
    /// output tier is `rarity`. One entry per base skin, however many wear
    /// rows it has.
    pub fn outcome_pool(&self, collection: &str, rarity: Rarity) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.in_collection(collection, rarity)
            .filter(|r| seen.insert(r.base_name.as_str()))
            .map(|r| r.base_name.as_str())
            .collect()
    }

    pub fn collections_at(&self, rarity: Rarity) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| r.rarity == rarity)
            .filter(|r| seen.insert(r.collection.as_str()))
            .map(|r| r.collection.as_str())
            .collect()
    }

    /// Base skins at (collection, rarity), cheapest first. A skin's price is
    /// its cheapest priced row; skins with no price at all go last.
    pub fn base_skins_by_price(&self, collection: &str, rarity: Rarity) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::new();
        let mut cheapest: HashMap<&str, Option<f64>> = HashMap::new();

        for r in self.in_collection(collection, rarity) {
            let entry = cheapest.entry(r.base_name.as_str()).or_insert_with(|| {
                order.push(r.base_name.as_str());
                None
            });
            if let Some(p) = r.min_price {
                *entry = Some(entry.map_or(p, |cur| cur.min(p)));
            }
        }

        // stable: ties keep catalog order
        order.sort_by(|a, b| match (cheapest[a], cheapest[b]) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        order
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn record(
        base: &str,
        collection: &str,
        rarity: Rarity,
        wear: Wear,
        range: (f64, f64),
        price: Option<f64>,
    ) -> ItemRecord {
        ItemRecord {
            market_hash_name: format!("{base} ({wear})"),
            base_name: base.to_string(),
            collection: collection.to_string(),
            rarity,
            wear,
            float_min: range.0,
            float_max: range.1,
            min_price: price,
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            record("A", "C1", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(4.0)),
            record("A", "C1", Rarity::Restricted, Wear::FactoryNew, (0.0, 1.0), Some(9.0)),
            record("B", "C1", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), Some(1.0)),
            record("N", "C1", Rarity::Restricted, Wear::FieldTested, (0.0, 1.0), None),
            record("D", "C2", Rarity::Restricted, Wear::MinimalWear, (0.0, 0.5), Some(2.0)),
            record("E", "C2", Rarity::MilSpec, Wear::MinimalWear, (0.0, 0.5), Some(0.1)),
        ])
    }

    #[test]
    fn outcome_pool_is_deduplicated_by_base_name() {
        let catalog = sample();
        assert_eq!(catalog.outcome_pool("C1", Rarity::Restricted), vec!["A", "B", "N"]);
        assert_eq!(catalog.outcome_pool("C2", Rarity::Restricted), vec!["D"]);
        assert!(catalog.outcome_pool("C3", Rarity::Restricted).is_empty());
        assert!(catalog.outcome_pool("C1", Rarity::Covert).is_empty());
    }

    #[test]
    fn variant_lookup() {
        let catalog = sample();
        assert_eq!(catalog.variants("A").count(), 2);
        let fn_row = catalog.variant("A", Wear::FactoryNew).unwrap();
        assert_eq!(fn_row.min_price, Some(9.0));
        assert!(catalog.variant("A", Wear::WellWorn).is_none());
        assert!(catalog.variant("missing", Wear::FieldTested).is_none());
    }

    #[test]
    fn collections_in_first_seen_order() {
        let catalog = sample();
        assert_eq!(catalog.collections_at(Rarity::Restricted), vec!["C1", "C2"]);
        assert_eq!(catalog.collections_at(Rarity::MilSpec), vec!["C2"]);
        assert!(catalog.collections_at(Rarity::Covert).is_empty());
    }

    #[test]
    fn base_skins_cheapest_first_unpriced_last() {
        let catalog = sample();
        assert_eq!(
            catalog.base_skins_by_price("C1", Rarity::Restricted),
            vec!["B", "A", "N"]
        );
    }

    #[test]
    fn invalid_float_ranges_are_dropped() {
        let catalog = Catalog::new(vec![
            record("ok", "C", Rarity::MilSpec, Wear::FieldTested, (0.0, 1.0), Some(1.0)),
            record("flat", "C", Rarity::MilSpec, Wear::FieldTested, (0.3, 0.3), Some(1.0)),
            record("wide", "C", Rarity::MilSpec, Wear::FieldTested, (-0.1, 1.0), Some(1.0)),
            record("over", "C", Rarity::MilSpec, Wear::FieldTested, (0.2, 1.5), Some(1.0)),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].base_name, "ok");
        assert!(catalog.variant("flat", Wear::FieldTested).is_none());
    }
}
