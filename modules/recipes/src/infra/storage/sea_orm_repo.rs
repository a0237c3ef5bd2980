//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over the connection so it can run on a `DatabaseConnection` or
//! inside a caller-owned transaction. Deletes open their own (nested)
//! transaction, hence the `TransactionTrait` bound.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{Comment, NewComment, NewRecipe, Recipe};
use crate::domain::fields::RecipeField;
use crate::domain::query::{FilterRequest, FilterValue, SortDirection, SortKey};
use crate::domain::repo::{RecipesRepository, UniqueViolation};
use crate::infra::storage::entity::comment::{
    ActiveModel as CommentAM, Column as CommentColumn, Entity as CommentEntity,
};
use crate::infra::storage::entity::recipe::{
    ActiveModel as RecipeAM, Column as RecipeColumn, Entity as RecipeEntity,
};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRecipesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRecipesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn column_for(field: RecipeField) -> RecipeColumn {
    match field {
        RecipeField::Name => RecipeColumn::Name,
        RecipeField::Category => RecipeColumn::Category,
        RecipeField::Description => RecipeColumn::Description,
        RecipeField::PrepTime => RecipeColumn::PrepTime,
        RecipeField::Instructions => RecipeColumn::Instructions,
    }
}

/// `name` is the only unique column besides the primary key.
fn write_error(e: DbErr, what: &'static str) -> anyhow::Error {
    if db::errors::is_seaorm_unique_violation(&e) {
        anyhow::Error::new(UniqueViolation { column: "name" })
    } else {
        anyhow::Error::new(e).context(what)
    }
}

fn active_model(recipe: Recipe) -> RecipeAM {
    RecipeAM {
        id: Set(recipe.id),
        name: Set(recipe.name),
        category: Set(recipe.category),
        description: Set(recipe.description),
        prep_time: Set(recipe.prep_time),
        instructions: Set(recipe.instructions),
        image_url: Set(recipe.image_url),
    }
}

#[async_trait::async_trait]
impl<C> RecipesRepository for SeaOrmRecipesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn list(&self, query: &FilterRequest) -> anyhow::Result<Vec<Recipe>> {
        let mut select = RecipeEntity::find();

        for (field, value) in &query.filters {
            let column = column_for(*field);
            select = match value {
                FilterValue::Text(text) => select.filter(column.eq(text.as_str())),
                FilterValue::Int(n) => select.filter(column.eq(*n)),
            };
        }

        if let Some(term) = &query.search {
            // SQLite LIKE is case-insensitive for ASCII.
            select = select.filter(
                Condition::any()
                    .add(RecipeColumn::Name.contains(term.as_str()))
                    .add(RecipeColumn::Category.contains(term.as_str())),
            );
        }

        let order = match query.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select = match query.order_by {
            SortKey::Id => select.order_by(RecipeColumn::Id, order),
            SortKey::Field(field) => select
                .order_by(column_for(field), order)
                .order_by_asc(RecipeColumn::Id),
        };

        let rows = select.all(&self.conn).await.context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Recipe>> {
        let found = RecipeEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> anyhow::Result<bool> {
        let mut select = RecipeEntity::find().filter(RecipeColumn::Name.eq(name));
        if let Some(id) = exclude_id {
            select = select.filter(RecipeColumn::Id.ne(id));
        }
        let count = select
            .count(&self.conn)
            .await
            .context("name_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, r: NewRecipe) -> anyhow::Result<Recipe> {
        let m = RecipeAM {
            id: NotSet,
            name: Set(r.name),
            category: Set(r.category),
            description: Set(r.description),
            prep_time: Set(r.prep_time),
            instructions: Set(r.instructions),
            image_url: Set(r.image_url),
        };
        let saved = m
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert failed"))?;
        Ok(saved.into())
    }

    async fn update(&self, r: Recipe) -> anyhow::Result<()> {
        let _ = active_model(r)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "update failed"))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("delete: begin failed")?;
        CommentEntity::delete_many()
            .filter(CommentColumn::RecipeId.eq(id))
            .exec(&txn)
            .await
            .context("delete: comments failed")?;
        let res = RecipeEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete failed")?;
        txn.commit().await.context("delete: commit failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_comments(&self, recipe_id: i64) -> anyhow::Result<Vec<Comment>> {
        let rows = CommentEntity::find()
            .filter(CommentColumn::RecipeId.eq(recipe_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .order_by_asc(CommentColumn::Id)
            .all(&self.conn)
            .await
            .context("list_comments failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_comment(&self, c: NewComment) -> anyhow::Result<Comment> {
        let m = CommentAM {
            id: NotSet,
            recipe_id: Set(c.recipe_id),
            content: Set(c.content),
            created_at: Set(Utc::now()),
        };
        let saved = m
            .insert(&self.conn)
            .await
            .context("insert_comment failed")?;
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::migrations::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmRecipesRepository<sea_orm::DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRecipesRepository::new(db)
    }

    fn recipe(name: &str, category: &str, prep_time: i32) -> NewRecipe {
        NewRecipe {
            name: name.into(),
            category: category.into(),
            description: "desc".into(),
            prep_time,
            instructions: "cook".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let repo = repo().await;
        let a = repo.insert(recipe("Soup", "Dinner", 20)).await.unwrap();
        let b = repo.insert(recipe("Stew", "Dinner", 40)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(repo.find_by_id(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn duplicate_name_surfaces_as_unique_violation() {
        let repo = repo().await;
        repo.insert(recipe("Soup", "Dinner", 20)).await.unwrap();
        let err = repo.insert(recipe("Soup", "Lunch", 10)).await.unwrap_err();
        assert!(err.downcast_ref::<UniqueViolation>().is_some(), "{err:#}");
    }

    #[tokio::test]
    async fn name_exists_honours_exclusion() {
        let repo = repo().await;
        let soup = repo.insert(recipe("Soup", "Dinner", 20)).await.unwrap();
        assert!(repo.name_exists("Soup", None).await.unwrap());
        assert!(!repo.name_exists("Soup", Some(soup.id)).await.unwrap());
        assert!(!repo.name_exists("Stew", None).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_orders_and_searches() {
        let repo = repo().await;
        repo.insert(recipe("Soup", "Dinner", 20)).await.unwrap();
        repo.insert(recipe("Pancakes", "Breakfast", 15)).await.unwrap();
        repo.insert(recipe("Stew", "Dinner", 40)).await.unwrap();

        let by_prep_desc = FilterRequest {
            order_by: SortKey::Field(RecipeField::PrepTime),
            direction: SortDirection::Desc,
            ..Default::default()
        };
        let names: Vec<_> = repo
            .list(&by_prep_desc)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Stew", "Soup", "Pancakes"]);

        let dinner = FilterRequest {
            filters: vec![(RecipeField::Category, FilterValue::Text("Dinner".into()))],
            ..Default::default()
        };
        assert_eq!(repo.list(&dinner).await.unwrap().len(), 2);

        let search = FilterRequest {
            search: Some("BREAK".into()),
            ..Default::default()
        };
        let found = repo.list(&search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Pancakes");
    }

    #[tokio::test]
    async fn delete_removes_comments_and_reports_absence() {
        let repo = repo().await;
        let soup = repo.insert(recipe("Soup", "Dinner", 20)).await.unwrap();
        repo.insert_comment(NewComment {
            recipe_id: soup.id,
            content: "Tasty".into(),
        })
        .await
        .unwrap();

        assert!(repo.delete(soup.id).await.unwrap());
        assert!(repo.list_comments(soup.id).await.unwrap().is_empty());
        assert!(!repo.delete(soup.id).await.unwrap());
    }
}
