// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read queries for trending recipes and trending ingredients.
//!
//! The tables are populated by offline ranking scripts; the backend treats
//! them as read-only.

use rusqlite::params;
use sura_core::SuraError;

use crate::database::Database;
use crate::models::{TrendingIngredient, TrendingRecipe};

/// Random sample of trending recipes (summary columns only).
pub async fn sample_hot_recipes(
    db: &Database,
    limit: usize,
) -> Result<Vec<TrendingRecipe>, SuraError> {
    let limit = limit as i64;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ranking, recipe_name, image_url, cook_time, description
                 FROM hot_recipes
                 ORDER BY RANDOM()
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(TrendingRecipe {
                    ranking: row.get(0)?,
                    recipe_name: row.get(1)?,
                    image_url: row.get(2)?,
                    cook_time: row.get(3)?,
                    description: row.get(4)?,
                    recipe_detail_ko: None,
                    recipe_detail_en: None,
                })
            })?;
            let mut recipes = Vec::new();
            for row in rows {
                recipes.push(row?);
            }
            Ok(recipes)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full listing of trending recipes including the detail columns.
pub async fn list_hot_recipes(db: &Database) -> Result<Vec<TrendingRecipe>, SuraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ranking, recipe_name, image_url, cook_time, description,
                        recipe_detail_ko, recipe_detail_en
                 FROM hot_recipes
                 ORDER BY ranking ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(TrendingRecipe {
                    ranking: row.get(0)?,
                    recipe_name: row.get(1)?,
                    image_url: row.get(2)?,
                    cook_time: row.get(3)?,
                    description: row.get(4)?,
                    recipe_detail_ko: row.get(5)?,
                    recipe_detail_en: row.get(6)?,
                })
            })?;
            let mut recipes = Vec::new();
            for row in rows {
                recipes.push(row?);
            }
            Ok(recipes)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One trending recipe by ranking, with detail columns.
pub async fn get_hot_recipe(
    db: &Database,
    ranking: i64,
) -> Result<Option<TrendingRecipe>, SuraError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ranking, recipe_name, image_url, cook_time, description,
                        recipe_detail_ko, recipe_detail_en
                 FROM hot_recipes
                 WHERE ranking = ?1",
            )?;
            let result = stmt.query_row(params![ranking], |row| {
                Ok(TrendingRecipe {
                    ranking: row.get(0)?,
                    recipe_name: row.get(1)?,
                    image_url: row.get(2)?,
                    cook_time: row.get(3)?,
                    description: row.get(4)?,
                    recipe_detail_ko: row.get(5)?,
                    recipe_detail_en: row.get(6)?,
                })
            });
            match result {
                Ok(recipe) => Ok(Some(recipe)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Top trending ingredients by sales rank.
pub async fn top_ingredients(
    db: &Database,
    limit: usize,
) -> Result<Vec<TrendingIngredient>, SuraError> {
    let limit = limit as i64;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ingredient_rank, product_name, total_quantity
                 FROM grocery_sales
                 ORDER BY ingredient_rank ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(TrendingIngredient {
                    ranking: row.get(0)?,
                    ingredient_name: row.get(1)?,
                    total_quantity: row.get(2)?,
                })
            })?;
            let mut ingredients = Vec::new();
            for row in rows {
                ingredients.push(row?);
            }
            Ok(ingredients)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("trending.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_recipes(db: &Database, count: i64) {
        db.connection()
            .call(move |conn| {
                for i in 1..=count {
                    conn.execute(
                        "INSERT INTO hot_recipes
                         (ranking, recipe_name, image_url, cook_time, description,
                          recipe_detail_ko, recipe_detail_en)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            i,
                            format!("recipe-{i}"),
                            Some(format!("https://img.example/{i}.jpg")),
                            Some("30 minutes"),
                            Some("spicy and savory"),
                            Some("한국어 상세"),
                            Some("english detail"),
                        ],
                    )?;
                }
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    async fn seed_ingredients(db: &Database, count: i64) {
        db.connection()
            .call(move |conn| {
                for i in 1..=count {
                    conn.execute(
                        "INSERT INTO grocery_sales (ingredient_rank, product_name, total_quantity)
                         VALUES (?1, ?2, ?3)",
                        params![i, format!("ingredient-{i}"), 1000 - i],
                    )?;
                }
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sample_returns_at_most_limit_rows() {
        let (db, _dir) = setup_db().await;
        seed_recipes(&db, 15).await;

        let sample = sample_hot_recipes(&db, 4).await.unwrap();
        assert_eq!(sample.len(), 4);
        // Summary query leaves detail columns unset.
        assert!(sample[0].recipe_detail_ko.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sample_of_empty_table_is_empty() {
        let (db, _dir) = setup_db().await;
        let sample = sample_hot_recipes(&db, 4).await.unwrap();
        assert!(sample.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_returns_all_rows_with_details_in_rank_order() {
        let (db, _dir) = setup_db().await;
        seed_recipes(&db, 3).await;

        let all = list_hot_recipes(&db).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].ranking, 1);
        assert_eq!(all[2].ranking, 3);
        assert_eq!(all[0].recipe_detail_en.as_deref(), Some("english detail"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_by_ranking_round_trips() {
        let (db, _dir) = setup_db().await;
        seed_recipes(&db, 5).await;

        let recipe = get_hot_recipe(&db, 3).await.unwrap().unwrap();
        assert_eq!(recipe.ranking, 3);
        assert_eq!(recipe.recipe_name, "recipe-3");
        assert_eq!(recipe.recipe_detail_ko.as_deref(), Some("한국어 상세"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_ranking_returns_none() {
        let (db, _dir) = setup_db().await;
        seed_recipes(&db, 2).await;
        assert!(get_hot_recipe(&db, 99).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn top_ingredients_respects_rank_order_and_limit() {
        let (db, _dir) = setup_db().await;
        seed_ingredients(&db, 20).await;

        let top = top_ingredients(&db, 10).await.unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].ranking, 1);
        assert_eq!(top[0].ingredient_name, "ingredient-1");
        assert_eq!(top[9].ranking, 10);
        db.close().await.unwrap();
    }
}
