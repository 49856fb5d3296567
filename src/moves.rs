use crate::deck::{CardState, Deck};

/// Cards revealed but not yet resolved.
///
/// `Two` only exists while a mismatched pair waits to be hidden again; until
/// then the board is locked against further reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingMove {
    #[default]
    Empty,
    One(usize),
    Two(usize, usize),
}

impl PendingMove {
    pub fn is_locked(&self) -> bool {
        matches!(self, PendingMove::Two(..))
    }
}

/// Result of feeding one reveal into the move tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Rejected: out of range, not hidden, or board locked
    Rejected,
    /// First card of a move is open
    Opened,
    /// Second card completed a move
    Resolved(Resolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Match { first: usize, second: usize },
    Mismatch { first: usize, second: usize },
}

/// Reveal the card at `position`, resolving the move if it is the second card.
pub fn reveal(deck: &mut Deck, pending: &mut PendingMove, position: usize) -> Reveal {
    if pending.is_locked() {
        return Reveal::Rejected;
    }
    match deck.get(position) {
        Some(card) if card.is_hidden() => {}
        _ => return Reveal::Rejected,
    }

    match *pending {
        PendingMove::Empty => {
            set_state(deck, position, CardState::Revealed);
            *pending = PendingMove::One(position);
            Reveal::Opened
        }
        PendingMove::One(first) => {
            set_state(deck, position, CardState::Revealed);
            Reveal::Resolved(resolve(deck, pending, first, position))
        }
        PendingMove::Two(..) => Reveal::Rejected,
    }
}

fn resolve(deck: &mut Deck, pending: &mut PendingMove, first: usize, second: usize) -> Resolution {
    let same = match (deck.get(first), deck.get(second)) {
        (Some(a), Some(b)) => a.symbol == b.symbol,
        _ => false,
    };

    if same {
        set_state(deck, first, CardState::Matched);
        set_state(deck, second, CardState::Matched);
        *pending = PendingMove::Empty;
        Resolution::Match { first, second }
    } else {
        *pending = PendingMove::Two(first, second);
        Resolution::Mismatch { first, second }
    }
}

/// Turn a locked mismatched pair face down again. Returns false when nothing was locked.
pub fn hide_mismatch(deck: &mut Deck, pending: &mut PendingMove) -> bool {
    let PendingMove::Two(first, second) = *pending else {
        return false;
    };
    for pos in [first, second] {
        if deck.get(pos).map(|c| c.state) == Some(CardState::Revealed) {
            set_state(deck, pos, CardState::Hidden);
        }
    }
    *pending = PendingMove::Empty;
    true
}

fn set_state(deck: &mut Deck, position: usize, state: CardState) {
    if let Some(card) = deck.get_mut(position) {
        card.state = state;
    }
}
