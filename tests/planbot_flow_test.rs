//! PlanBot command flow integration tests

mod helpers;

use chrono::{NaiveDate, NaiveTime};

use helpers::*;
use PlanBuddy::database::Store;
use PlanBuddy::models::{Metadata, PollDraft, PollKind};
use PlanBuddy::planbot::Handled;

#[tokio::test]
async fn test_plain_chat_is_not_handled() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    let handled = env
        .interpreter
        .handle_command("see you all tomorrow", &ctx(&group, members[0], "alice"))
        .await;

    assert_eq!(handled, Handled::No);
    assert!(system_messages(&env, group.id).await.is_empty());
}

#[tokio::test]
async fn test_unknown_command_reports_and_consumes() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    let handled = env
        .interpreter
        .handle_command("/frobnicate now", &ctx(&group, members[0], "alice"))
        .await;

    assert_eq!(handled, Handled::Yes);
    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("Unknown command"));
    assert!(message.body.contains("frobnicate"));
}

#[tokio::test]
async fn test_help_lists_commands() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    env.interpreter
        .handle_command("/help", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    for command in ["/plan", "/planmovies", "/select", "/when", "/rsvp", "/lock"] {
        assert!(message.body.contains(command), "help misses {}", command);
    }
}

#[tokio::test]
async fn test_plan_lists_candidates_in_provider_order() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    env.lookup
        .set_places(vec![place("Cafe A", "coffee"), place("Cafe B", "bakery")]);

    let handled = env
        .interpreter
        .handle_command("/plan cafe connaught place", &ctx(&group, members[0], "alice"))
        .await;
    assert_eq!(handled, Handled::Yes);

    let message = last_system_message(&env, group.id).await;
    let first = message.body.find("1. Cafe A").expect("Cafe A not listed");
    let second = message.body.find("2. Cafe B").expect("Cafe B not listed");
    assert!(first < second);
}

#[tokio::test]
async fn test_plan_without_query_shows_usage() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    env.interpreter
        .handle_command("/plan", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("/plan"));
}

#[tokio::test]
async fn test_lookup_failure_becomes_system_message() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    env.lookup.fail_next(true);

    let handled = env
        .interpreter
        .handle_command("/plan cafe", &ctx(&group, members[0], "alice"))
        .await;

    assert_eq!(handled, Handled::Yes);
    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("search service"));
}

#[tokio::test]
async fn test_planmovies_uses_stored_genres() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    env.store
        .set_movie_genres(members[0], &["crime".to_string(), "thriller".to_string()])
        .await
        .unwrap();
    env.lookup.set_movies(vec![movie("Heat"), movie("Ronin")]);

    env.interpreter
        .handle_command("/planmovies", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("1. Heat"));
    assert!(message.body.contains("2. Ronin"));
}

#[tokio::test]
async fn test_select_matches_case_insensitive_substring() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup
        .set_places(vec![place("Cafe A", ""), place("Cafe B", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("Selected Cafe A"));
}

#[tokio::test]
async fn test_select_miss_lists_options_and_stores_nothing() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup
        .set_places(vec![place("Cafe A", ""), place("Cafe B", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select zzz", &user).await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("'zzz'"));
    assert!(message.body.contains("Cafe A"));
    assert!(message.body.contains("Cafe B"));

    // No selection was stored: scheduling should refuse.
    env.interpreter
        .handle_command("/when 2025-10-30 19:30", &user)
        .await;
    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("Nothing is selected"));
    assert!(env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_select_without_search_prompts_for_search() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    env.interpreter
        .handle_command("/select cafe", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("nothing to select"));
}

#[tokio::test]
async fn test_when_schedules_selected_candidate() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup
        .set_places(vec![place("Cafe A", ""), place("Cafe B", "")]);

    // An earlier plan is active and must be displaced by scheduling.
    let earlier = env
        .services
        .poll_service
        .create_poll(
            group.id,
            members[0],
            "alice",
            PollDraft {
                kind: PollKind::Place,
                provider_id: "old".to_string(),
                title: "Old plan".to_string(),
                description: String::new(),
                image_url: None,
                metadata: Metadata::empty(PollKind::Place),
            },
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;
    env.interpreter
        .handle_command("/when 2025-10-30 19:30", &user)
        .await;

    let poll = env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .expect("expected a scheduled poll");
    assert_eq!(poll.title, "Cafe A");
    assert_eq!(poll.metadata.date, NaiveDate::from_ymd_opt(2025, 10, 30));
    assert_eq!(poll.metadata.time, NaiveTime::from_hms_opt(19, 30, 0));
    assert!(!env.store.poll(earlier.id).await.unwrap().active);

    // The announcement chat message carries the poll, and a confirmation
    // system message follows.
    let messages = env
        .services
        .message_service
        .messages(group.id, None)
        .await
        .unwrap();
    let announcement = messages
        .iter()
        .find(|m| m.poll_id == Some(poll.id))
        .expect("no announcement message");
    assert!(!announcement.is_system);
    assert_eq!(announcement.sender_id, Some(members[0]));

    let confirmation = last_system_message(&env, group.id).await;
    assert!(confirmation.body.contains("Scheduled Cafe A"));
}

#[tokio::test]
async fn test_when_accepts_tokens_in_any_order() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup.set_places(vec![place("Cafe A", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;
    env.interpreter
        .handle_command("/when 7:30pm 2025-10-30", &user)
        .await;

    let poll = env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .expect("expected a scheduled poll");
    assert_eq!(poll.metadata.time, NaiveTime::from_hms_opt(19, 30, 0));
}

#[tokio::test]
async fn test_when_without_time_is_usage_error_and_keeps_session() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup.set_places(vec![place("Cafe A", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;
    env.interpreter
        .handle_command("/when 2025-10-30", &user)
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("date and a time"));
    assert!(env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .is_none());

    // The session survived: a complete /when succeeds without re-selecting.
    env.interpreter
        .handle_command("/when 2025-10-30 19:30", &user)
        .await;
    assert!(env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_rsvp_summarizes_tally() {
    let env = test_env();
    let (group, members) = seed_group(&env, 2).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup.set_places(vec![place("Cafe A", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;
    env.interpreter
        .handle_command("/when 2025-10-30 19:30", &user)
        .await;

    let poll = env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .expect("expected a scheduled poll");
    env.services
        .vote_service
        .cast_vote(poll.id, members[0], "join")
        .await
        .unwrap();
    env.services
        .vote_service
        .cast_vote(poll.id, members[1], "maybe")
        .await
        .unwrap();

    env.interpreter.handle_command("/rsvp", &user).await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("Cafe A"));
    assert!(message.body.contains("join: 1"));
    assert!(message.body.contains("maybe: 1"));
    assert!(message.body.contains("no: 0"));
}

#[tokio::test]
async fn test_rsvp_without_active_poll() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    env.interpreter
        .handle_command("/rsvp", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("no active plan"));
}

#[tokio::test]
async fn test_lock_notifies_exactly_the_join_voters() {
    let env = test_env();
    let (group, members) = seed_group(&env, 2).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup.set_places(vec![place("Cafe A", "")]);

    env.interpreter.handle_command("/plan cafe", &user).await;
    env.interpreter.handle_command("/select cafe a", &user).await;
    env.interpreter
        .handle_command("/when 2025-10-30 19:30", &user)
        .await;

    let poll = env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .expect("expected a scheduled poll");

    env.services
        .vote_service
        .cast_vote(poll.id, members[0], "join")
        .await
        .unwrap();
    env.services
        .vote_service
        .cast_vote(poll.id, members[1], "maybe")
        .await
        .unwrap();
    env.services
        .vote_service
        .cast_vote(poll.id, members[2], "no")
        .await
        .unwrap();

    env.interpreter.handle_command("/lock", &user).await;

    // The poll is finalized.
    assert!(!env.store.poll(poll.id).await.unwrap().active);
    assert!(env
        .services
        .poll_service
        .get_active_poll(group.id)
        .await
        .unwrap()
        .is_none());

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("Plan locked"));
    assert!(message.body.contains("1 going"));

    // Exactly one notification for the join voter, none for maybe/no.
    let joiner = env
        .services
        .notification_service
        .notifications_for(members[0])
        .await
        .unwrap();
    assert_eq!(joiner.len(), 1);
    assert!(!joiner[0].read);
    assert_eq!(joiner[0].meta.poll_id, Some(poll.id));
    assert_eq!(joiner[0].meta.attendee_count, Some(1));

    for member in &members[1..] {
        let notifications = env
            .services
            .notification_service
            .notifications_for(*member)
            .await
            .unwrap();
        assert!(notifications.is_empty());
    }
}

#[tokio::test]
async fn test_lock_without_active_poll() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;

    env.interpreter
        .handle_command("/lock", &ctx(&group, members[0], "alice"))
        .await;

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("no active plan"));
}

#[tokio::test]
async fn test_commands_are_case_insensitive_and_accept_bang_prefix() {
    let env = test_env();
    let (group, members) = seed_group(&env, 0).await;
    let user = ctx(&group, members[0], "alice");
    env.lookup.set_places(vec![place("Cafe A", "")]);

    let handled = env.interpreter.handle_command("!PLAN cafe", &user).await;
    assert_eq!(handled, Handled::Yes);

    let message = last_system_message(&env, group.id).await;
    assert!(message.body.contains("1. Cafe A"));
}

#[tokio::test]
async fn test_sessions_are_isolated_per_group() {
    let env = test_env();
    let (group_a, members_a) = seed_group(&env, 0).await;
    let (group_b, members_b) = seed_group(&env, 0).await;
    env.lookup.set_places(vec![place("Cafe A", "")]);

    env.interpreter
        .handle_command("/plan cafe", &ctx(&group_a, members_a[0], "alice"))
        .await;

    // Group B never searched, so selecting there has nothing to work with.
    env.interpreter
        .handle_command("/select cafe a", &ctx(&group_b, members_b[0], "bob"))
        .await;

    let message = last_system_message(&env, group_b.id).await;
    assert!(message.body.contains("nothing to select"));
}
