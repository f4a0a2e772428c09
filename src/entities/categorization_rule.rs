//! Categorization rule entity - A user-defined text pattern that maps descriptions to a category.
use crate::core::kinds::MatchStrategy;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categorization rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categorization_rules")]
pub struct Model {
    /// Unique identifier; also the tie-breaker between equal priorities
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Text or regular expression to look for in descriptions
    pub pattern: String,
    /// `"CONTAINS"`, `"STARTS_WITH"` or `"REGEX"`; anything else reads as contains
    pub match_type: String,
    /// Category assigned when the rule matches
    pub category_id: i64,
    /// Higher priorities are evaluated first
    pub priority: i32,
    /// Disabled rules are ignored
    pub enabled: bool,
    /// When the rule was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Typed view of the persisted match type text.
    #[must_use]
    pub fn strategy(&self) -> MatchStrategy {
        MatchStrategy::from_db(&self.match_type)
    }
}

/// Rules stand alone; the category reference is owned by the excluded category store
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
