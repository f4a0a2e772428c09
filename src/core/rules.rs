//! Categorization rule management - the rule store behind the categorization engine.
//!
//! Rules are created and edited by the user; the engine only ever reads them.

use crate::{
    core::{categorize::Categorizer, kinds::MatchStrategy},
    entities::{CategorizationRule, categorization_rule},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

/// Input for [`create_rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategorizationRule {
    /// Text or regular expression to look for
    pub pattern: String,
    /// How the pattern is compared
    pub strategy: MatchStrategy,
    /// Category assigned on match
    pub category_id: i64,
    /// Higher is evaluated first
    pub priority: i32,
}

/// Creates an enabled rule.
///
/// The pattern is stored as given. Blank patterns and invalid regexes are accepted here
/// and simply never match during categorization.
#[instrument(skip(db))]
pub async fn create_rule(
    db: &DatabaseConnection,
    new: NewCategorizationRule,
) -> Result<categorization_rule::Model> {
    let rule = categorization_rule::ActiveModel {
        pattern: Set(new.pattern),
        match_type: Set(new.strategy.as_db().to_string()),
        category_id: Set(new.category_id),
        priority: Set(new.priority),
        enabled: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = rule.insert(db).await?;
    debug!("Created categorization rule {}", result.id);
    Ok(result)
}

/// Every rule, enabled or not, in evaluation order.
pub async fn list_rules(db: &DatabaseConnection) -> Result<Vec<categorization_rule::Model>> {
    CategorizationRule::find()
        .order_by_desc(categorization_rule::Column::Priority)
        .order_by_desc(categorization_rule::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Enabled rules only, in evaluation order.
pub async fn list_enabled_rules(
    db: &DatabaseConnection,
) -> Result<Vec<categorization_rule::Model>> {
    CategorizationRule::find()
        .filter(categorization_rule::Column::Enabled.eq(true))
        .order_by_desc(categorization_rule::Column::Priority)
        .order_by_desc(categorization_rule::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Enables or disables a rule.
pub async fn set_rule_enabled(
    db: &DatabaseConnection,
    rule_id: i64,
    enabled: bool,
) -> Result<categorization_rule::Model> {
    let rule = CategorizationRule::find_by_id(rule_id)
        .one(db)
        .await?
        .ok_or(Error::RuleNotFound { id: rule_id })?;

    let mut active_model: categorization_rule::ActiveModel = rule.into();
    active_model.enabled = Set(enabled);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a rule.
pub async fn delete_rule(db: &DatabaseConnection, rule_id: i64) -> Result<()> {
    let result = CategorizationRule::delete_by_id(rule_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::RuleNotFound { id: rule_id });
    }
    Ok(())
}

/// Loads the enabled rules and compiles them into a [`Categorizer`].
pub async fn load_categorizer(db: &DatabaseConnection) -> Result<Categorizer> {
    let rules = list_enabled_rules(db).await?;
    Ok(Categorizer::new(&rules))
}
