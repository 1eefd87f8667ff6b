use std::collections::BTreeSet;

/// Read-only view of a poll's voting state.
///
/// A `vote_id` is the 0-based index of an option in
/// [`vote_options`](PollView::vote_options). It is stable for the poll's
/// lifetime; options are never reordered while the poll runs. Passing an
/// out-of-range `vote_id` is a caller bug, not a recoverable condition.
pub trait PollView: Send + Sync {
    fn id(&self) -> &str;

    fn message(&self) -> &str;

    fn vote_options(&self) -> &[String];

    /// Voter identities are disclosed in the finished view.
    fn is_public(&self) -> bool;

    /// Running-view action labels omit live vote counts.
    fn is_secret(&self) -> bool;

    /// Finished view renders proportional bars and sorts options by count.
    fn bars(&self) -> bool;

    /// Number of options a single voter may select, at least 1.
    fn max_votes(&self) -> usize;

    fn is_finished(&self) -> bool;

    /// Distinct users that have cast at least one vote.
    fn num_voters(&self) -> usize;

    /// Total selections across all options; exceeds [`num_voters`]
    /// when `max_votes > 1`.
    ///
    /// [`num_voters`]: PollView::num_voters
    fn num_votes(&self) -> usize;

    fn count_votes(&self, vote_id: usize) -> usize;

    /// Ids of the users that picked the given option, in ballot order.
    fn voters(&self, vote_id: usize) -> Vec<String>;

    /// The set of options the given user has picked.
    fn votes_of(&self, user_id: &str) -> BTreeSet<usize>;
}

/// Share of the total votes an option holds, as a percentage in `0.0..=100.0`.
///
/// A poll without any votes yields `0.0` for every option.
pub fn relative_vote_share(poll: &dyn PollView, vote_id: usize) -> f64 {
    let total = poll.num_votes();
    if total == 0 {
        return 0.0;
    }
    100.0 * poll.count_votes(vote_id) as f64 / total as f64
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Ballot {
    user_id: String,
    votes: BTreeSet<usize>,
}

/// Concrete in-memory [`PollView`] holder.
///
/// Carries the mutable ballot state the interaction endpoints operate on.
/// Ballots keep insertion order, so `voters` lists users in the order they
/// first pressed a button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollSnapshot {
    id: String,
    message: String,
    vote_options: Vec<String>,
    public: bool,
    secret: bool,
    bars: bool,
    max_votes: usize,
    finished: bool,
    ballots: Vec<Ballot>,
}

impl PollSnapshot {
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        vote_options: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            vote_options,
            public: false,
            secret: false,
            bars: false,
            max_votes: 1,
            finished: false,
            ballots: Vec::new(),
        }
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn with_bars(mut self, bars: bool) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_max_votes(mut self, max_votes: usize) -> Self {
        self.max_votes = max_votes.max(1);
        self
    }

    /// Applies one button press for `user_id` on `vote_id`.
    ///
    /// Re-selecting an option retracts that vote. A new selection is added
    /// while the voter is below `max_votes`; at the cap a single-vote poll
    /// replaces the previous selection and a multi-vote poll drops the press.
    pub fn cast_vote(&mut self, user_id: &str, vote_id: usize) {
        assert!(vote_id < self.vote_options.len(), "vote_id out of range");

        let index = match self.ballots.iter().position(|ballot| ballot.user_id == user_id) {
            Some(index) => index,
            None => {
                self.ballots.push(Ballot { user_id: user_id.to_owned(), votes: BTreeSet::new() });
                self.ballots.len() - 1
            }
        };
        let ballot = &mut self.ballots[index];

        if ballot.votes.contains(&vote_id) {
            ballot.votes.remove(&vote_id);
        } else if ballot.votes.len() < self.max_votes {
            ballot.votes.insert(vote_id);
        } else if self.max_votes == 1 {
            ballot.votes.clear();
            ballot.votes.insert(vote_id);
        }
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }
}

impl PollView for PollSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn vote_options(&self) -> &[String] {
        &self.vote_options
    }

    fn is_public(&self) -> bool {
        self.public
    }

    fn is_secret(&self) -> bool {
        self.secret
    }

    fn bars(&self) -> bool {
        self.bars
    }

    fn max_votes(&self) -> usize {
        self.max_votes
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn num_voters(&self) -> usize {
        self.ballots.iter().filter(|ballot| !ballot.votes.is_empty()).count()
    }

    fn num_votes(&self) -> usize {
        self.ballots.iter().map(|ballot| ballot.votes.len()).sum()
    }

    fn count_votes(&self, vote_id: usize) -> usize {
        debug_assert!(vote_id < self.vote_options.len(), "vote_id out of range");
        self.ballots.iter().filter(|ballot| ballot.votes.contains(&vote_id)).count()
    }

    fn voters(&self, vote_id: usize) -> Vec<String> {
        debug_assert!(vote_id < self.vote_options.len(), "vote_id out of range");
        self.ballots
            .iter()
            .filter(|ballot| ballot.votes.contains(&vote_id))
            .map(|ballot| ballot.user_id.clone())
            .collect()
    }

    fn votes_of(&self, user_id: &str) -> BTreeSet<usize> {
        self.ballots
            .iter()
            .find(|ballot| ballot.user_id == user_id)
            .map(|ballot| ballot.votes.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{relative_vote_share, PollSnapshot, PollView};

    fn pizza_poll() -> PollSnapshot {
        PollSnapshot::new(
            "poll-1",
            "Where should we eat?",
            vec!["Pizza".to_owned(), "Burger".to_owned()],
        )
    }

    #[test]
    fn relative_share_is_zero_for_poll_without_votes() {
        let poll = pizza_poll();

        assert_eq!(relative_vote_share(&poll, 0), 0.0);
        assert_eq!(relative_vote_share(&poll, 1), 0.0);
    }

    #[test]
    fn per_option_counts_sum_to_total_votes() {
        let mut poll = pizza_poll().with_max_votes(2);
        poll.cast_vote("ann", 0);
        poll.cast_vote("ann", 1);
        poll.cast_vote("ben", 0);
        poll.cast_vote("cleo", 1);

        let summed: usize =
            (0..poll.vote_options().len()).map(|vote_id| poll.count_votes(vote_id)).sum();
        assert_eq!(summed, poll.num_votes());
        assert!(poll.num_voters() <= poll.num_votes());
        assert_eq!(poll.num_voters(), 3);
        assert_eq!(poll.num_votes(), 4);
    }

    #[test]
    fn relative_share_reflects_vote_distribution() {
        let mut poll = pizza_poll();
        poll.cast_vote("ann", 0);
        poll.cast_vote("ben", 0);
        poll.cast_vote("cleo", 0);
        poll.cast_vote("dan", 1);

        assert_eq!(relative_vote_share(&poll, 0), 75.0);
        assert_eq!(relative_vote_share(&poll, 1), 25.0);
    }

    #[test]
    fn casting_the_same_option_again_retracts_the_vote() {
        let mut poll = pizza_poll();
        poll.cast_vote("ann", 0);
        poll.cast_vote("ann", 0);

        assert_eq!(poll.count_votes(0), 0);
        assert_eq!(poll.num_voters(), 0);
    }

    #[test]
    fn single_vote_poll_replaces_the_previous_selection() {
        let mut poll = pizza_poll();
        poll.cast_vote("ann", 0);
        poll.cast_vote("ann", 1);

        assert_eq!(poll.count_votes(0), 0);
        assert_eq!(poll.count_votes(1), 1);
        assert_eq!(poll.votes_of("ann").into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn multi_vote_poll_drops_presses_beyond_the_cap() {
        let mut poll = PollSnapshot::new(
            "poll-2",
            "Toppings?",
            vec!["Cheese".to_owned(), "Ham".to_owned(), "Olives".to_owned()],
        )
        .with_max_votes(2);
        poll.cast_vote("ann", 0);
        poll.cast_vote("ann", 1);
        poll.cast_vote("ann", 2);

        assert_eq!(poll.votes_of("ann").len(), 2);
        assert_eq!(poll.count_votes(2), 0);
    }

    #[test]
    fn voters_are_listed_in_ballot_order() {
        let mut poll = pizza_poll();
        poll.cast_vote("zoe", 0);
        poll.cast_vote("ann", 0);

        assert_eq!(poll.voters(0), vec!["zoe".to_owned(), "ann".to_owned()]);
    }

    #[test]
    fn finish_marks_the_poll_finished() {
        let mut poll = pizza_poll();
        assert!(!poll.is_finished());

        poll.finish();
        assert!(poll.is_finished());
    }
}
