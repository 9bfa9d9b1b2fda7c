/// Handed out for each partial save; remembers which edits the save covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    seq: u64,
    revision: u64,
}

impl SaveTicket {
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Allows at most one partial save in flight.
///
/// A save requested while another is pending is coalesced into a single follow-up
/// that is issued once the pending one resolves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveGate {
    issued: u64,
    in_flight: Option<SaveTicket>,
    queued: bool,
}

impl SaveGate {
    /// Start a save covering edits up to `revision`, or queue one if busy.
    pub fn begin(&mut self, revision: u64) -> Option<SaveTicket> {
        if self.in_flight.is_some() {
            self.queued = true;
            return None;
        }
        self.issued += 1;
        let ticket = SaveTicket {
            seq: self.issued,
            revision,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Resolve the in-flight save. Returns whether a queued save should follow.
    ///
    /// A failed save drops the queued one; the edits stay dirty and the next
    /// transition retries them.
    pub fn finish(&mut self, ticket: SaveTicket, succeeded: bool) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        let queued = std::mem::take(&mut self.queued);
        queued && succeeded
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }
}
