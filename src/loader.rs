use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::model::{ItemRecord, Rarity, Wear};

/// Raw joined row, before rarity and wear strings are parsed.
struct CatalogRow {
    market_hash_name: String,
    base_name: String,
    collection: String,
    rarity: String,
    wear: String,
    float_min: Option<f64>,
    float_max: Option<f64>,
    min_price: Option<f64>,
}

pub fn load_catalog(db_path: &str) -> Result<Catalog> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open catalog database: {db_path}"))?;
    load_catalog_from(&conn)
}

/// Join the price feed to skin metadata on `base_name` and build a catalog.
pub fn load_catalog_from(conn: &Connection) -> Result<Catalog> {
    let unmatched = count_unmatched(conn)?;
    if unmatched > 0 {
        warn!(unmatched, "price rows with no skin metadata");
    }

    let mut stmt = conn.prepare(
        "SELECT p.market_hash_name, p.base_name, s.collection, s.rarity,
                p.wear, s.float_min, s.float_max, p.min_price
         FROM prices p
         JOIN skins s ON s.base_name = p.base_name
         ORDER BY p.rowid"
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(CatalogRow {
            market_hash_name: row.get(0)?,
            base_name: row.get(1)?,
            collection: row.get(2)?,
            rarity: row.get(3)?,
            wear: row.get(4)?,
            float_min: row.get(5)?,
            float_max: row.get(6)?,
            min_price: row.get(7)?,
        })
    })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut no_float = 0usize;

    for row in rows {
        let row = row?;
        let (Ok(rarity), Ok(wear)) = (row.rarity.parse::<Rarity>(), row.wear.parse::<Wear>()) else {
            // knives, gloves, contraband and the like
            skipped += 1;
            continue;
        };
        let (Some(float_min), Some(float_max)) = (row.float_min, row.float_max) else {
            no_float += 1;
            continue;
        };
        records.push(ItemRecord {
            market_hash_name: row.market_hash_name,
            base_name: row.base_name,
            collection: row.collection,
            rarity,
            wear,
            float_min,
            float_max,
            min_price: row.min_price,
        });
    }

    if skipped > 0 {
        debug!(skipped, "rows with an unsupported rarity or wear");
    }
    if no_float > 0 {
        warn!(no_float, "rows with no float range");
    }

    let catalog = Catalog::new(records);
    info!(rows = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Price rows whose `base_name` has no entry in `skins`.
pub fn count_unmatched(conn: &Connection) -> Result<i64> {
    let unmatched = conn.query_row(
        "SELECT COUNT(*) FROM prices p
         WHERE NOT EXISTS (SELECT 1 FROM skins s WHERE s.base_name = p.base_name)",
        [],
        |row| row.get(0),
    )?;
    Ok(unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE skins (base_name TEXT, collection TEXT, rarity TEXT,
                                 float_min REAL, float_max REAL);
             CREATE TABLE prices (market_hash_name TEXT, base_name TEXT,
                                  wear TEXT, min_price REAL);

             INSERT INTO skins VALUES
                ('AK-47 | Slate', 'The Snakebite Collection', 'Restricted', 0.0, 1.0),
                ('P250 | Sand Dune', 'The Dust Collection', 'Consumer Grade', 0.06, 0.8),
                ('Karambit | Fade', 'Knives', 'Covert Knife', 0.0, 0.08);

             INSERT INTO prices VALUES
                ('AK-47 | Slate (Field-Tested)', 'AK-47 | Slate', 'Field-Tested', 3.10),
                ('AK-47 | Slate (Factory New)', 'AK-47 | Slate', 'Factory New', NULL),
                ('P250 | Sand Dune (Minimal Wear)', 'P250 | Sand Dune', 'Minimal Wear', 0.03),
                ('Karambit | Fade (Factory New)', 'Karambit | Fade', 'Factory New', 900.0),
                ('Mystery | Skin (Field-Tested)', 'Mystery | Skin', 'Field-Tested', 1.0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn joins_prices_to_metadata() {
        let catalog = load_catalog_from(&seeded()).unwrap();
        assert_eq!(catalog.len(), 3);

        let first = &catalog.records()[0];
        assert_eq!(first.market_hash_name, "AK-47 | Slate (Field-Tested)");
        assert_eq!(first.collection, "The Snakebite Collection");
        assert_eq!(first.rarity, Rarity::Restricted);
        assert_eq!(first.wear, Wear::FieldTested);
        assert_eq!(first.min_price, Some(3.10));

        let fn_row = catalog.variant("AK-47 | Slate", Wear::FactoryNew).unwrap();
        assert_eq!(fn_row.min_price, None);

        let sand = catalog.variant("P250 | Sand Dune", Wear::MinimalWear).unwrap();
        assert_eq!(sand.rarity, Rarity::Consumer);
        assert_eq!((sand.float_min, sand.float_max), (0.06, 0.8));
    }

    #[test]
    fn drops_unsupported_and_unmatched_rows() {
        let catalog = load_catalog_from(&seeded()).unwrap();
        assert_eq!(catalog.variants("Karambit | Fade").count(), 0);
        assert_eq!(catalog.variants("Mystery | Skin").count(), 0);
    }

    #[test]
    fn counts_price_rows_without_metadata() {
        assert_eq!(count_unmatched(&seeded()).unwrap(), 1);
    }

    #[test]
    fn skins_without_float_range_are_skipped() {
        let conn = seeded();
        conn.execute_batch(
            "INSERT INTO skins VALUES ('Glock-18 | Blank', 'The Dust Collection', 'Restricted', NULL, NULL);
             INSERT INTO skins VALUES ('MP9 | Half', 'The Dust Collection', 'Restricted', 0.0, NULL);
             INSERT INTO prices VALUES
                ('Glock-18 | Blank (Field-Tested)', 'Glock-18 | Blank', 'Field-Tested', 2.0),
                ('MP9 | Half (Field-Tested)', 'MP9 | Half', 'Field-Tested', 2.0);",
        )
        .unwrap();

        let catalog = load_catalog_from(&conn).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.variants("Glock-18 | Blank").count(), 0);
        assert_eq!(catalog.variants("MP9 | Half").count(), 0);
        assert!(catalog.variant("AK-47 | Slate", Wear::FieldTested).is_some());
    }

    #[test]
    fn missing_tables_are_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(load_catalog_from(&conn).is_err());
    }
}
