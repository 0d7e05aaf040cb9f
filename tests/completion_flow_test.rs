//! End-to-end completion flow against a real database file

mod common;

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use common::{TestEnv, at, event};
use quest::engine::StreakTransition;
use quest::store::{QuestQuery, progress};
use quest::{InboundEvent, NotificationKind, Priority};

#[test]
fn test_streak_and_xp_over_several_days() {
    let env = TestEnv::new();
    let o = &env.orchestrator;

    // 4 March 2024 is a Monday
    let day1 = o.complete(&event("alice", "a", at(4, 9, 0), Priority::Medium)).unwrap();
    let day2 = o.complete(&event("alice", "b", at(5, 9, 0), Priority::Medium)).unwrap();
    let day2_again = o.complete(&event("alice", "c", at(5, 17, 0), Priority::Medium)).unwrap();
    let day3 = o.complete(&event("alice", "d", at(6, 9, 0), Priority::High)).unwrap();

    assert_eq!(day1.xp_awarded, 16); // 15 * 1.1
    assert_eq!(day2.xp_awarded, 18); // 15 * 1.2
    assert_eq!(day2_again.xp_awarded, 18);
    assert_eq!(day2_again.streak_transition, Some(StreakTransition::Unchanged));
    assert_eq!(day3.xp_awarded, 26); // 20 * 1.3
    assert_eq!(day3.current_streak, 3);
    assert_eq!(day3.lifetime_xp, 16 + 18 + 18 + 26);
    assert!(day3.new_achievements.iter().any(|a| a.key == "streak_3"));

    let stored = progress::load_progress(&env.db.conn(), "alice").unwrap().unwrap();
    assert_eq!(stored.lifetime_xp, 78);
    assert_eq!(stored.current_streak, 3);
    assert_eq!(stored.longest_streak, 3);
    assert_eq!(stored.tasks_completed, 4);
    assert_eq!(stored.high_priority_completed, 1);
    assert_eq!(stored.version, 4);

    let history = QuestQuery::new(env.db.clone()).history("alice", 10).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].task_id, "d");
    assert_eq!(history[0].streak_after, 3);
}

#[test]
fn test_grace_window_boundary() {
    let env = TestEnv::new();
    let o = &env.orchestrator;

    o.complete(&event("alice", "a", at(4, 10, 0), Priority::Low)).unwrap();
    // Exactly 48h later still extends
    let kept = o.complete(&event("alice", "b", at(6, 10, 0), Priority::Low)).unwrap();
    assert_eq!(kept.streak_transition, Some(StreakTransition::Extended));
    assert_eq!(kept.current_streak, 2);

    // One minute past the grace window resets
    let reset = o.complete(&event("alice", "c", at(8, 10, 1), Priority::Low)).unwrap();
    assert_eq!(reset.streak_transition, Some(StreakTransition::Reset));
    assert_eq!(reset.current_streak, 1);
    assert_eq!(reset.longest_streak, 2);
}

#[test]
fn test_late_event_does_not_rewind_streak() {
    let env = TestEnv::new();
    let o = &env.orchestrator;

    o.complete(&event("alice", "a", at(4, 10, 0), Priority::Low)).unwrap();
    o.complete(&event("alice", "b", at(5, 10, 0), Priority::Low)).unwrap();
    let late = o.complete(&event("alice", "old", at(2, 10, 0), Priority::Low)).unwrap();

    assert_eq!(late.streak_transition, Some(StreakTransition::Unchanged));
    assert_eq!(late.current_streak, 2);
    assert!(late.xp_awarded > 0);

    let stored = progress::load_progress(&env.db.conn(), "alice").unwrap().unwrap();
    assert_eq!(stored.last_completion_at, Some(at(5, 10, 0)));
}

#[test]
fn test_achievements_unlock_once() {
    let env = TestEnv::new();
    let o = &env.orchestrator;

    let mut unlocked = Vec::new();
    for i in 0..12 {
        let outcome = o
            .complete(&event("alice", &format!("t{i}"), at(4, 8, i), Priority::Low))
            .unwrap();
        unlocked.extend(outcome.new_achievements.into_iter().map(|a| a.key));
    }

    let count = |key: &str| unlocked.iter().filter(|k| k.as_str() == key).count();
    assert_eq!(count("first_task"), 1);
    assert_eq!(count("tasks_10"), 1);
    assert_eq!(count("busy_day"), 1);

    let stored = progress::load_unlocks(&env.db.conn(), "alice").unwrap();
    assert_eq!(stored.len(), unlocked.len());

    let achievement_notes = env
        .notifier
        .kinds()
        .into_iter()
        .filter(|k| *k == NotificationKind::AchievementUnlocked)
        .count();
    assert_eq!(achievement_notes, unlocked.len());
}

#[test]
fn test_concurrent_completions_for_one_user() {
    let env = TestEnv::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = Arc::clone(&env.orchestrator);
            thread::spawn(move || {
                orchestrator
                    .complete(&event("alice", &format!("t{i}"), at(4, 9, i), Priority::High))
                    .unwrap()
                    .xp_awarded
            })
        })
        .collect();

    let awarded: u64 = handles
        .into_iter()
        .map(|h| u64::from(h.join().unwrap()))
        .sum();

    let stored = progress::load_progress(&env.db.conn(), "alice").unwrap().unwrap();
    assert_eq!(stored.tasks_completed, 8);
    assert_eq!(stored.high_priority_completed, 8);
    assert_eq!(stored.lifetime_xp, awarded);
    assert_eq!(stored.version, 8);
}

#[test]
fn test_caldav_event_is_normalized() {
    let env = TestEnv::new();
    let inbound: InboundEvent = serde_json::from_value(serde_json::json!({
        "source": "caldav",
        "uid": "0b5c-4f1e@nextcloud",
        "principal": "principals/users/bob",
        "summary": "File taxes",
        "priority": 1,
        "completed": at(4, 12, 0).timestamp(),
    }))
    .unwrap();

    let outcome = env.orchestrator.handle_inbound(inbound, Utc::now()).unwrap();
    assert_eq!(outcome.user_id, "bob");
    assert_eq!(outcome.xp_awarded, 22); // high at streak 1

    let history = QuestQuery::new(env.db.clone()).history("bob", 1).unwrap();
    assert_eq!(history[0].task_title, "File taxes");
    assert_eq!(history[0].priority, Priority::High);
    assert_eq!(history[0].completed_at, at(4, 12, 0));
}
