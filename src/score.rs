use serde::{Deserialize, Serialize};

pub const MAX_STARS: u8 = 3;

/// How the first star-loss breakpoint is derived from the number of pairs.
/// The second breakpoint is always twice the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingPolicy {
    /// One move per card in the deck (2 × pairs)
    #[default]
    DeckLength,
    /// Half the number of pairs
    HalfPairs,
    Fixed { breakpoint: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    pub first: u32,
    pub second: u32,
}

impl RatingPolicy {
    pub fn breakpoints(&self, pairs: usize) -> Breakpoints {
        let pairs = u32::try_from(pairs).unwrap_or(u32::MAX);
        let first = match *self {
            RatingPolicy::DeckLength => pairs.saturating_mul(2),
            RatingPolicy::HalfPairs => pairs / 2,
            RatingPolicy::Fixed { breakpoint } => breakpoint,
        }
        .max(1);

        Breakpoints {
            first,
            second: first.saturating_mul(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreState {
    pub move_count: u32,
    pub match_count: u32,
    pub elapsed_secs: u32,
    pub star_rating: u8,
    pub breakpoints: Breakpoints,
}

impl ScoreState {
    pub fn new(breakpoints: Breakpoints) -> Self {
        Self {
            move_count: 0,
            match_count: 0,
            elapsed_secs: 0,
            star_rating: MAX_STARS,
            breakpoints,
        }
    }

    /// Count a completed move and drop stars at the breakpoints.
    pub fn on_move_resolved(&mut self) {
        self.move_count += 1;

        let rating = if self.move_count >= self.breakpoints.second {
            1
        } else if self.move_count >= self.breakpoints.first {
            2
        } else {
            MAX_STARS
        };
        self.star_rating = self.star_rating.min(rating);
    }

    pub fn on_match(&mut self) {
        self.match_count += 1;
    }

    pub fn tick(&mut self) {
        self.elapsed_secs += 1;
    }
}
