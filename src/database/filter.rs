use std::collections::HashSet;

use crate::schema::{RecipeWithTags, Uuid};

/// Selects the recipes carrying at least one of the requested tag
/// slugs; an empty slug set selects everything. Deduplicated by recipe
/// id, newest first; ties keep their input order.
pub fn filter_by_tags(recipes: Vec<RecipeWithTags>, slugs: &[String]) -> Vec<RecipeWithTags> {
    let requested: HashSet<&str> = slugs.iter().map(|s| s.as_str()).collect();

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut matched: Vec<RecipeWithTags> = recipes
        .into_iter()
        .filter(|entry| {
            requested.is_empty()
                || entry
                    .tag_slugs
                    .iter()
                    .any(|slug| requested.contains(slug.as_str()))
        })
        .filter(|entry| seen.insert(entry.recipe.id))
        .collect();

    matched.sort_by(|a, b| b.recipe.pub_date.cmp(&a.recipe.pub_date));
    matched
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::schema::Recipe;

    fn recipe(id: Uuid, day: u32, slugs: &[&str]) -> RecipeWithTags {
        RecipeWithTags {
            recipe: Recipe {
                id,
                author_id: 1,
                name: format!("recipe-{id}"),
                description: String::new(),
                image: String::new(),
                cook_time: 30,
                pub_date: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            },
            tag_slugs: slugs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_slug_set_returns_everything() {
        let all = vec![
            recipe(1, 1, &["breakfast"]),
            recipe(2, 2, &["dinner"]),
            recipe(3, 3, &[]),
        ];
        let filtered = filter_by_tags(all, &[]);
        let ids: Vec<Uuid> = filtered.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn selects_recipes_matching_any_slug() {
        let all = vec![
            recipe(1, 1, &["breakfast"]),
            recipe(2, 2, &["dinner", "vegan"]),
            recipe(3, 3, &["lunch"]),
        ];
        let filtered = filter_by_tags(all, &["breakfast".into(), "vegan".into()]);
        let ids: Vec<Uuid> = filtered.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn unknown_slugs_match_nothing() {
        let all = vec![recipe(1, 1, &["breakfast"])];
        let filtered = filter_by_tags(all, &["nonexistent".into()]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn duplicates_are_dropped_and_order_is_newest_first() {
        let all = vec![
            recipe(1, 1, &["dinner"]),
            recipe(2, 5, &["dinner"]),
            recipe(1, 1, &["dinner"]),
        ];
        let filtered = filter_by_tags(all, &["dinner".into()]);
        let ids: Vec<Uuid> = filtered.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn untagged_recipes_drop_out_once_a_slug_is_requested() {
        let all = vec![recipe(1, 1, &[]), recipe(2, 2, &["dinner"])];
        let filtered = filter_by_tags(all, &["dinner".into()]);
        let ids: Vec<Uuid> = filtered.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
