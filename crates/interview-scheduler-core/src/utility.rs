//! Utility scores ("lower is better").
//!
//! Interview utility is the attendee's rank for the company. Coffee-chat
//! utility is dominated by the room's ordinal rank of the attendee, uses the
//! attendee's own rank as tie-break, and is offset so that every coffee-chat
//! score exceeds every interview score. An empty slot scores a sentinel that
//! is larger than any two real scores combined, so filling a slot always
//! pays off in a pairwise exchange.

/// Floor for the empty-slot sentinel.
pub const DEFAULT_EMPTY_UTILITY: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityModel {
    unranked_rank: u32,
    worst_rank: u32,
    empty: u64,
}

impl UtilityModel {
    /// Derive the model from the event's rank range and its largest coffee
    /// chat candidate pool.
    pub fn new(unranked_rank: u32, highest_rank: u32, largest_pool: usize, empty_floor: u64) -> Self {
        let worst_rank = unranked_rank.max(highest_rank);
        let mut model = Self {
            unranked_rank,
            worst_rank,
            empty: 0,
        };
        let worst_real = if largest_pool == 0 {
            u64::from(worst_rank)
        } else {
            model.coffee_chat(largest_pool as u32, Some(worst_rank))
        };
        model.empty = empty_floor.max(2 * worst_real + 1);
        model
    }

    /// Rank assumed for companies an attendee did not rank.
    pub fn unranked_rank(&self) -> u32 {
        self.unranked_rank
    }

    /// Largest rank any attendee can have for any company.
    pub fn worst_rank(&self) -> u32 {
        self.worst_rank
    }

    /// Score of an empty slot.
    pub fn empty(&self) -> u64 {
        self.empty
    }

    pub fn coffee_offset(&self) -> u64 {
        u64::from(self.worst_rank) + 1
    }

    pub fn interview(&self, rank: Option<u32>) -> u64 {
        u64::from(rank.unwrap_or(self.unranked_rank))
    }

    pub fn coffee_chat(&self, room_rank: u32, attendee_rank: Option<u32>) -> u64 {
        let stride = u64::from(self.worst_rank) + 1;
        self.coffee_offset() + u64::from(room_rank) * stride + self.interview(attendee_rank)
    }
}
