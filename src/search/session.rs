/// Generation number tagging one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Tracks which submission is current so late replies from superseded
/// submissions can be dropped. Last submitted wins.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: u64,
    pending: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission; every earlier ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        self.pending = true;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Record that `ticket` resolved. Returns `true` if its reply should be
    /// applied, `false` if it is stale.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.latest, "discarding stale reply");
            return false;
        }
        self.pending = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending
    }
}
