use std::cmp::Reverse;

use pollbot_core::poll::{relative_vote_share, PollView};

use crate::directory::NameResolver;
use crate::message::{Action, ActionContext, Attachment, CommandResponse, Field, Integration};
use crate::urls::PollUrls;

/// Even an option at 0% keeps a visible sliver of bar.
const BAR_MIN_WIDTH: f64 = 2.0;
/// Scale factor mapping 100% to a 450-unit-wide bar.
const BAR_WIDTH_PER_PERCENT: f64 = 4.5;
const BAR_HEIGHT: u32 = 25;

/// Renders the poll into its chat-message payload, dispatching on whether
/// voting is still open.
///
/// Rendering never fails: the only fallible sub-step, username resolution,
/// degrades inside the resolver.
pub async fn format_poll(
    poll: &dyn PollView,
    urls: &PollUrls,
    resolver: &dyn NameResolver,
) -> CommandResponse {
    if poll.is_finished() {
        format_finished_poll(poll, urls, resolver).await
    } else {
        format_running_poll(poll, urls)
    }
}

/// Running view: voter count, the optional public-poll warning and
/// multi-vote hint, and one button per option plus "End Poll".
pub fn format_running_poll(poll: &dyn PollView, urls: &PollUrls) -> CommandResponse {
    let mut fields =
        vec![Field::full_width(format!("*Number of voters: {}*", poll.num_voters()))];

    if poll.is_public() {
        fields.push(Field::full_width(
            ":warning: *This poll is public. When it closes the participants \
             and their answers will be visible.*",
        ));
    }
    if poll.max_votes() > 1 {
        fields.push(Field::full_width(format!("*You have {} votes*", poll.max_votes())));
    }

    CommandResponse::in_channel(
        Attachment::new(poll.message())
            .with_fields(fields)
            .with_actions(format_actions(poll, urls)),
    )
}

async fn format_finished_poll(
    poll: &dyn PollView,
    urls: &PollUrls,
    resolver: &dyn NameResolver,
) -> CommandResponse {
    let mut votes: Vec<(usize, &String)> = poll.vote_options().iter().enumerate().collect();

    if poll.bars() {
        // longest bar first; the stable sort keeps original order among ties
        votes.sort_by_key(|(vote_id, _)| Reverse(poll.count_votes(*vote_id)));
    }

    let mut fields =
        vec![Field::full_width(format!("*Number of voters: {}*", poll.num_voters()))];
    for (vote_id, label) in votes {
        fields.push(Field {
            short: !poll.bars(),
            title: label.clone(),
            value: format_vote_end_text(poll, urls, resolver, vote_id).await,
        });
    }

    CommandResponse::in_channel(Attachment::new(poll.message()).with_fields(fields))
}

async fn format_vote_end_text(
    poll: &dyn PollView,
    urls: &PollUrls,
    resolver: &dyn NameResolver,
    vote_id: usize,
) -> String {
    let vote_count = poll.count_votes(vote_id);
    let rel_vote_count = relative_vote_share(poll, vote_id);

    let mut text = String::new();

    if poll.bars() {
        let bar_width = rel_vote_count * BAR_WIDTH_PER_PERCENT + BAR_MIN_WIDTH;
        text.push_str(&format!("![Bar]({} ={bar_width}x{BAR_HEIGHT}) ", urls.bar_image()));
    }

    let plural = if vote_count != 1 { "s" } else { "" };
    text.push_str(&format!("{vote_count} Vote{plural} ({rel_vote_count:.1}%)"));

    if poll.is_public() {
        let voters = resolver.resolve_usernames(&poll.voters(vote_id)).await;
        if !voters.is_empty() {
            text.push('\n');
            text.push_str(&voters.join(", "));
        }
    }

    text
}

/// One "cast vote" action per option in original order, then the terminal
/// "End Poll" action. Unless the poll is secret, option labels carry the
/// live tally.
pub fn format_actions(poll: &dyn PollView, urls: &PollUrls) -> Vec<Action> {
    let mut actions: Vec<Action> = poll
        .vote_options()
        .iter()
        .enumerate()
        .map(|(vote_id, label)| {
            let name = if poll.is_secret() {
                label.clone()
            } else {
                format!("{label} ({})", poll.count_votes(vote_id))
            };
            Action {
                name,
                integration: Integration {
                    url: urls.vote(),
                    context: ActionContext::vote(poll.id(), vote_id),
                },
            }
        })
        .collect();

    actions.push(Action {
        name: "End Poll".to_owned(),
        integration: Integration { url: urls.end(), context: ActionContext::end_poll(poll.id()) },
    });

    actions
}

/// One-line summary of a single user's ballot, e.g. `Pizza ✓, Burger ✗`.
pub fn format_user_vote(poll: &dyn PollView, user_id: &str) -> String {
    let votes = poll.votes_of(user_id);
    poll.vote_options()
        .iter()
        .enumerate()
        .map(|(vote_id, label)| {
            let mark = if votes.contains(&vote_id) { '✓' } else { '✗' };
            format!("{label} {mark}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}
