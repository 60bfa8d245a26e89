use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use sqlx::{Pool, Postgres};

use crate::constants::{SHOPLIST_DIVIDER, SHOPLIST_HEADER};
use crate::error::{Error, QueryError};
use crate::schema::{CollectionKind, PurchasedIngredient, ShoppingListItem, Uuid};

/// Every ingredient row behind the user's purchases collection, ordered
/// by membership and ingredient row ids for a repeatable sequence.
pub async fn fetch_purchase_ingredients(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<PurchasedIngredient>, Error> {
    let rows: Vec<PurchasedIngredient> = sqlx::query_as(
        "
        SELECT p.title AS title, p.unit AS unit, ri.amount AS amount
        FROM user_collections c
        INNER JOIN collection_recipes cr ON cr.collection_id = c.id
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = cr.recipe_id
        INNER JOIN products p ON p.id = ri.product_id
        WHERE c.user_id = $1 AND c.kind = $2
        ORDER BY cr.id, ri.id
    ",
    )
    .bind(user_id)
    .bind(CollectionKind::Purchases)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

/// One line per (title, unit) pair, in first-seen order. The key is the
/// display pair, not the catalog id; amounts are summed as-is, without
/// rounding or unit conversion.
pub fn build_shopping_list(rows: &[PurchasedIngredient]) -> Vec<ShoppingListItem> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut items: Vec<ShoppingListItem> = vec![];

    for row in rows {
        match index.get(&(row.title.as_str(), row.unit.as_str())) {
            Some(i) => items[*i].total_amount += row.amount,
            None => {
                index.insert((row.title.as_str(), row.unit.as_str()), items.len());
                items.push(ShoppingListItem {
                    title: row.title.clone(),
                    unit: row.unit.clone(),
                    total_amount: row.amount,
                });
            }
        }
    }

    items
}

/// Two-line header, then one `+ {title} ({unit}) - {amount}` line per
/// item. An empty list still renders the header.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut report = String::new();
    report.push_str(SHOPLIST_HEADER);
    report.push('\n');
    report.push_str(SHOPLIST_DIVIDER);
    report.push('\n');

    for item in items {
        report.push_str(&format!(
            "+ {} ({}) - {}\n",
            item.title, item.unit, item.total_amount
        ));
    }

    report
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Writes the rendered report to `{user_id}_list.txt` under `dir`.
///
/// The report is a derived, disposable artifact. Each write goes to its
/// own temporary file and is renamed into place, so concurrent
/// regenerations for the same user leave whichever rename finished last.
pub fn write_shopping_list(dir: &Path, user_id: Uuid, report: &str) -> Result<PathBuf, Error> {
    let path = dir.join(format!("{user_id}_list.txt"));
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp = dir.join(format!("{user_id}_list.txt.{seq}.tmp"));

    fs::write(&tmp, report)?;
    fs::rename(&tmp, &path)?;

    debug!("wrote shopping list for user {user_id} to {path:?}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, unit: &str, amount: f64) -> PurchasedIngredient {
        PurchasedIngredient {
            title: title.to_string(),
            unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn amounts_for_same_title_and_unit_are_summed() {
        let items = build_shopping_list(&[row("Salt", "g", 10.0), row("Salt", "g", 15.0)]);
        assert_eq!(
            items,
            vec![ShoppingListItem {
                title: String::from("Salt"),
                unit: String::from("g"),
                total_amount: 25.0,
            }]
        );
    }

    #[test]
    fn distinct_units_stay_separate_lines() {
        let items = build_shopping_list(&[row("Sugar", "g", 5.0), row("Sugar", "kg", 1.0)]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit, "g");
        assert_eq!(items[1].unit, "kg");
    }

    #[test]
    fn empty_purchases_yield_empty_list() {
        assert!(build_shopping_list(&[]).is_empty());
    }

    #[test]
    fn output_keeps_first_seen_order() {
        let items = build_shopping_list(&[
            row("Flour", "g", 200.0),
            row("Milk", "ml", 300.0),
            row("Flour", "g", 100.0),
            row("Eggs", "pcs", 2.0),
        ]);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Flour", "Milk", "Eggs"]);
        assert_eq!(items[0].total_amount, 300.0);
    }

    #[test]
    fn fractional_amounts_are_preserved() {
        let items = build_shopping_list(&[row("Vanilla", "tsp", 0.5), row("Vanilla", "tsp", 0.25)]);
        assert_eq!(items[0].total_amount, 0.75);
    }

    #[test]
    fn report_has_header_and_one_line_per_item() {
        let items = build_shopping_list(&[row("Salt", "g", 10.0), row("Salt", "g", 15.0)]);
        let report = render_shopping_list(&items);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SHOPLIST_HEADER);
        assert_eq!(lines[1], SHOPLIST_DIVIDER);
        assert_eq!(lines[2], "+ Salt (g) - 25");
    }

    #[test]
    fn empty_report_still_renders_header() {
        let report = render_shopping_list(&[]);
        assert_eq!(report.lines().count(), 2);
    }

    #[test]
    fn report_file_lands_under_user_scoped_name() {
        let dir = tempfile::tempdir().unwrap();
        let report = render_shopping_list(&build_shopping_list(&[row("Salt", "g", 10.0)]));
        let path = write_shopping_list(dir.path(), 7, &report).unwrap();
        assert!(path.ends_with("7_list.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), report);
    }

    #[test]
    fn rewriting_the_report_leaves_last_writer() {
        let dir = tempfile::tempdir().unwrap();
        write_shopping_list(dir.path(), 7, "first\n").unwrap();
        let path = write_shopping_list(dir.path(), 7, "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second\n");
    }

    #[test]
    fn interleaved_writers_do_not_share_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        write_shopping_list(dir.path(), 7, "first\n").unwrap();
        write_shopping_list(dir.path(), 7, "second\n").unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![String::from("7_list.txt")]);
    }
}
