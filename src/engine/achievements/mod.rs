//! Achievement catalog and evaluator

mod checker;
mod definitions;

pub use checker::check_achievements;
pub use definitions::{
    AchievementCatalog, AchievementContext, AchievementDefinition, ConditionError, ConditionFn,
    Rarity, UnlockCondition,
};
