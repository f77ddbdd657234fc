//! System message copy
//!
//! All user-facing text the interpreter posts into group chats.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{Candidate, Poll, Tally};

pub fn help_text() -> String {
    [
        "🤖 PlanBot commands:",
        "/plan <place or cuisine> - search places to go out",
        "/planmovies - movie suggestions based on your genres",
        "/select <name> - pick one of the search results",
        "/when <YYYY-MM-DD> <H:MM[am|pm]> - schedule the selected plan",
        "/rsvp - show the current vote counts",
        "/lock - finalize the plan and notify everyone going",
        "/help - show this message",
    ]
    .join("\n")
}

pub fn unknown_command(command: &str) -> String {
    if command.is_empty() {
        "Unknown command. Type /help to see what I can do.".to_string()
    } else {
        format!(
            "Unknown command '{}'. Type /help to see what I can do.",
            command
        )
    }
}

pub fn command_failed() -> String {
    "⚠️ Something went wrong handling that command. Please try again.".to_string()
}

pub fn plan_usage() -> String {
    "Tell me what to look for, e.g. /plan cafe connaught place".to_string()
}

pub fn lookup_failed() -> String {
    "⚠️ I couldn't reach the search service right now. Please try again in a bit.".to_string()
}

pub fn no_results(query: &str) -> String {
    format!("I couldn't find anything for '{}'. Try different words?", query)
}

pub fn candidate_list(header: &str, candidates: &[Candidate]) -> String {
    let mut lines = vec![header.to_string()];
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.description.is_empty() {
            lines.push(format!("{}. {}", index + 1, candidate.title));
        } else {
            lines.push(format!(
                "{}. {} - {}",
                index + 1,
                candidate.title,
                candidate.description
            ));
        }
    }
    lines.push("Pick one with /select <name>".to_string());
    lines.join("\n")
}

pub fn place_results_header() -> String {
    "📍 Here's what I found:".to_string()
}

pub fn movie_results_header() -> String {
    "🎬 Movie picks for you:".to_string()
}

pub fn select_usage() -> String {
    "Tell me which one, e.g. /select cafe a".to_string()
}

pub fn select_no_results() -> String {
    "There's nothing to select yet. Search first with /plan or /planmovies.".to_string()
}

pub fn select_no_match(fragment: &str, candidates: &[Candidate]) -> String {
    let mut lines = vec![format!("No result matches '{}'. Available options:", fragment)];
    for (index, candidate) in candidates.iter().enumerate() {
        lines.push(format!("{}. {}", index + 1, candidate.title));
    }
    lines.join("\n")
}

pub fn selected(candidate: &Candidate) -> String {
    format!(
        "✅ Selected {}. Schedule it with /when <YYYY-MM-DD> <H:MM[am|pm]>",
        candidate.title
    )
}

pub fn when_usage() -> String {
    "I need both a date and a time, e.g. /when 2025-10-30 19:30".to_string()
}

pub fn nothing_selected() -> String {
    "Nothing is selected yet. Search with /plan and pick with /select first.".to_string()
}

pub fn schedule_announcement(title: &str, date: NaiveDate, time: NaiveTime) -> String {
    format!(
        "📊 New plan: {} on {} at {}. Vote join / maybe / no!",
        title,
        date.format("%Y-%m-%d"),
        time.format("%H:%M")
    )
}

pub fn scheduled_confirmation(title: &str, date: NaiveDate, time: NaiveTime) -> String {
    format!(
        "Scheduled {} for {} at {}. Voting is open.",
        title,
        date.format("%Y-%m-%d"),
        time.format("%H:%M")
    )
}

pub fn no_active_poll() -> String {
    "There's no active plan right now. Start one with /plan.".to_string()
}

pub fn rsvp_summary(poll: &Poll, tally: &Tally) -> String {
    let mut lines = vec![format!("📋 RSVP for {}:", poll.title)];
    if let (Some(date), Some(time)) = (poll.metadata.date, poll.metadata.time) {
        lines.push(format!(
            "🗓 {} at {}",
            date.format("%Y-%m-%d"),
            time.format("%H:%M")
        ));
    }
    lines.push(format!(
        "✅ join: {} | 🤔 maybe: {} | ❌ no: {}",
        tally.join, tally.maybe, tally.no
    ));
    lines.join("\n")
}

pub fn lock_summary(poll: &Poll, tally: &Tally) -> String {
    format!(
        "🔒 Plan locked: {}. {} going, {} maybe, {} out. See you there!",
        poll.title, tally.join, tally.maybe, tally.no
    )
}

pub fn lock_notification(
    group_name: &str,
    title: &str,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    attendee_count: usize,
) -> String {
    let when = match (date, time) {
        (Some(date), Some(time)) => {
            format!(" on {} at {}", date.format("%Y-%m-%d"), time.format("%H:%M"))
        }
        (Some(date), None) => format!(" on {}", date.format("%Y-%m-%d")),
        _ => String::new(),
    };

    format!(
        "Your plan in {} is locked: {}{}. {} people are going.",
        group_name, title, when, attendee_count
    )
}
