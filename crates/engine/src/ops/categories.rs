//! Category operations: seeded defaults, CRUD, and the kind invariant.

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, Kind, ResultEngine, categories, transactions,
    util::{normalize_name_display, normalize_name_key, normalize_optional_text},
};

use super::{Engine, with_tx};

const MAX_NAME_LEN: usize = 40;
const DEFAULT_COLOR: &str = "#607d8b";
const DEFAULT_ICON: &str = "tag";

/// Seeded on a user's first category listing.
const DEFAULT_CATEGORIES: &[(&str, Kind, &str, &str)] = &[
    ("Salary", Kind::Income, "#43a047", "briefcase"),
    ("Freelance", Kind::Income, "#26a69a", "laptop"),
    ("Investments", Kind::Income, "#7cb342", "trending-up"),
    ("Food", Kind::Expense, "#e53935", "utensils"),
    ("Transport", Kind::Expense, "#fb8c00", "bus"),
    ("Housing", Kind::Expense, "#1e88e5", "home"),
    ("Utilities", Kind::Expense, "#00acc1", "bolt"),
    ("Health", Kind::Expense, "#d81b60", "heart"),
    ("Entertainment", Kind::Expense, "#8e24aa", "film"),
    ("Shopping", Kind::Expense, "#6d4c41", "shopping-bag"),
];

fn validate_name(name: &str) -> ResultEngine<String> {
    let display = normalize_name_display(name, "category name")?;
    if display.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::InvalidField(format!(
            "category name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(display)
}

impl Engine {
    /// Lists the user's categories ordered by name, seeding the default set
    /// on first use.
    pub async fn list_categories(
        &self,
        user_id: &str,
        include_archived: bool,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            self.seed_default_categories(&db_tx, user_id).await?;

            let mut query = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::Name);
            if !include_archived {
                query = query.filter(categories::Column::Archived.eq(false));
            }

            query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect()
        })
    }

    /// Creates a custom category. The kind is fixed at creation.
    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        kind: Kind,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<Category> {
        let display = validate_name(name)?;
        let normalized = normalize_name_key(&display);

        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::Kind.eq(kind.as_str()))
                .filter(categories::Column::NameNorm.eq(normalized.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(display));
            }

            let model = categories::Model {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                name: display,
                name_norm: normalized,
                kind: kind.as_str().to_string(),
                color: normalize_optional_text(color)
                    .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                icon: normalize_optional_text(icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
                is_custom: true,
                archived: false,
            };
            categories::ActiveModel::from(model.clone()).insert(&db_tx).await?;

            Category::try_from(model)
        })
    }

    /// Applies a partial update: rename, recolor, re-icon, archive flag.
    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
        archived: Option<bool>,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            let kind = model.kind.clone();

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                let display = validate_name(name)?;
                let normalized = normalize_name_key(&display);
                let clash = categories::Entity::find()
                    .filter(categories::Column::UserId.eq(user_id.to_string()))
                    .filter(categories::Column::Kind.eq(kind))
                    .filter(categories::Column::NameNorm.eq(normalized.clone()))
                    .filter(categories::Column::Id.ne(category_id))
                    .one(&db_tx)
                    .await?;
                if clash.is_some() {
                    return Err(EngineError::ExistingKey(display));
                }
                active.name = ActiveValue::Set(display);
                active.name_norm = ActiveValue::Set(normalized);
            }
            if let Some(color) = normalize_optional_text(color) {
                active.color = ActiveValue::Set(color);
            }
            if let Some(icon) = normalize_optional_text(icon) {
                active.icon = ActiveValue::Set(icon);
            }
            if let Some(archived) = archived {
                active.archived = ActiveValue::Set(archived);
            }

            Category::try_from(active.update(&db_tx).await?)
        })
    }

    /// Deletes a custom category that no transaction references.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            if !model.is_custom {
                return Err(EngineError::Forbidden(
                    "default categories cannot be deleted".to_string(),
                ));
            }

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::ExistingKey(
                    "category still has transactions".to_string(),
                ));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Loads a category owned by the user, or fails with `KeyNotFound`.
    pub(super) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    async fn seed_default_categories(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        let existing = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .count(db_tx)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        for (name, kind, color, icon) in DEFAULT_CATEGORIES {
            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set((*name).to_string()),
                name_norm: ActiveValue::Set(normalize_name_key(name)),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                color: ActiveValue::Set((*color).to_string()),
                icon: ActiveValue::Set((*icon).to_string()),
                is_custom: ActiveValue::Set(false),
                archived: ActiveValue::Set(false),
            };
            active.insert(db_tx).await?;
        }
        Ok(())
    }
}
