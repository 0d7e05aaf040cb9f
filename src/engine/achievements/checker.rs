//! Achievement checking logic
//!
//! Pure: returns the definitions that became true, in catalog order.
//! Persisting unlocks is the caller's job, so a check can be repeated safely.

use std::collections::HashSet;

use tracing::warn;

use super::definitions::{AchievementCatalog, AchievementContext, AchievementDefinition};

/// Definitions not yet in `unlocked` whose condition holds for `ctx`
///
/// A condition that errors is logged and skipped; the rest are still checked.
pub fn check_achievements<'c>(
    catalog: &'c AchievementCatalog,
    ctx: &AchievementContext<'_>,
    unlocked: &HashSet<String>,
) -> Vec<&'c AchievementDefinition> {
    let mut newly_unlocked = Vec::new();

    for def in catalog.definitions() {
        if unlocked.contains(&def.key) {
            continue;
        }

        match def.condition.evaluate(ctx) {
            Ok(true) => newly_unlocked.push(def),
            Ok(false) => {}
            Err(e) => {
                warn!(
                    "[quest:achievements] Skipping '{}' for user {}: {}",
                    def.key, ctx.progress.user_id, e
                );
            }
        }
    }

    newly_unlocked
}
