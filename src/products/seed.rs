use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use tracing::warn;

use super::repo_types::TransactionRecord;

/// The fixed sample set loaded when no seed file is configured.
pub fn sample_records() -> Vec<TransactionRecord> {
    vec![
        TransactionRecord {
            id: 1,
            title: "Fjallraven  Foldsack No 1 Backpack Fits 15 Laptops".into(),
            price: 329.85,
            description: "Your perfect pack for everyday use and walks in the forest. Stash your laptop up to 15 inches in the padded sleeve your everyday".into(),
            category: "men's clothing".into(),
            image: "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg".into(),
            sold: false,
            date_of_sale: "2021-11-27T20:29:54+05:30".into(),
        },
        TransactionRecord {
            id: 2,
            title: "Mens Casual Premium Slim Fit TShirts ".into(),
            price: 44.6,
            description: "Slimfitting style contrast raglan long sleeve threebutton henley placket light weight  soft fabric for breathable and comfortable wearing. And Solid stitched shirts with round neck made for durability and a great fit for casual fashion wear and diehard baseball fans. The Henley style round neckline includes a threebutton placket.".into(),
            category: "men's clothing".into(),
            image: "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg".into(),
            sold: false,
            date_of_sale: "2021-10-27T20:29:54+05:30".into(),
        },
        TransactionRecord {
            id: 3,
            title: "Mens Cotton Jacket".into(),
            price: 615.89,
            description: "great outerwear jackets for SpringAutumnWinter suitable for many occasions such as working hiking camping mountainrock climbing cycling traveling or other outdoors. Good gift choice for you or your family member. A warm hearted love to Father husband or son in this thanksgiving or Christmas Day.".into(),
            category: "men's clothing".into(),
            image: "https://fakestoreapi.com/img/71li-ujtlUL._AC_UX679_.jpg".into(),
            sold: true,
            date_of_sale: "2022-07-27T20:29:54+05:30".into(),
        },
    ]
}

/// Reads a JSON array of records from `path`.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read seed file {}", path.display()))?;
    let records: Vec<TransactionRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parse seed file {}", path.display()))?;
    Ok(records)
}

/// Seed set for startup: the configured file if any, else the sample set.
/// Records that break the row invariants, and repeats of an id already
/// seen, are dropped with a warning. The first record for an id wins.
pub fn seed_records(seed_file: Option<&Path>) -> anyhow::Result<Vec<TransactionRecord>> {
    let records = match seed_file {
        Some(path) => load_records(path)?,
        None => sample_records(),
    };
    let mut seen = HashSet::new();
    Ok(records
        .into_iter()
        .filter(|r| match r.validate() {
            Ok(()) if seen.insert(r.id) => true,
            Ok(()) => {
                warn!(id = r.id, "skipping seed record with duplicate id");
                false
            }
            Err(e) => {
                warn!(error = %e, id = r.id, "skipping invalid seed record");
                false
            }
        })
        .collect())
}
