/// Fully-qualified callback and asset URLs for poll interactions.
///
/// The chat platform posts button callbacks to absolute URLs, so every
/// generated action embeds the service's public base address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollUrls {
    base: String,
}

impl PollUrls {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let mut base: String = public_base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Callback target for casting a vote.
    pub fn vote(&self) -> String {
        format!("{}/vote", self.base)
    }

    /// Callback target for ending a poll.
    pub fn end(&self) -> String {
        format!("{}/end", self.base)
    }

    /// Location of the proportional bar image.
    pub fn bar_image(&self) -> String {
        format!("{}/img/bar.png", self.base)
    }
}
