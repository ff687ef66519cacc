//! Test utilities for the search implementation

use crate::{GameError, GameState};

/// The two players of `GameTest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

/// A simple test game implementation
///
/// Players alternately pick one of the numbers 0 to 3 that has not been picked
/// yet. Once all four are taken, the player with the greater sum wins. The
/// first player wins by picking 3 first, any other opening is at best a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTest {
    picks: Vec<usize>,
}

impl GameTest {
    pub fn new() -> Self {
        GameTest { picks: Vec::new() }
    }

    fn sum(&self, side: Side) -> usize {
        let offset = match side {
            Side::First => 0,
            Side::Second => 1,
        };

        self.picks.iter().skip(offset).step_by(2).sum()
    }
}

impl Default for GameTest {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GameTest {
    type Player = Side;
    type Action = usize;

    fn current_player(&self) -> Side {
        if self.picks.len() % 2 == 0 { Side::First } else { Side::Second }
    }

    fn legal_actions(&self) -> Vec<usize> {
        (0..4).filter(|index| !self.picks.contains(index)).collect()
    }

    fn apply_action(&mut self, action: &usize) -> Result<(), GameError> {
        if *action >= 4 || self.picks.contains(action) {
            return Err(GameError::IllegalAction(format!("{} can not be picked", action)));
        }

        self.picks.push(*action);
        Ok(())
    }

    fn result(&self, player: &Side) -> Result<f64, GameError> {
        if self.picks.len() != 4 {
            return Err(GameError::GameNotOver);
        }

        let opponent = match player {
            Side::First => Side::Second,
            Side::Second => Side::First,
        };

        let (own, other) = (self.sum(*player), self.sum(opponent));

        Ok(if own > other { 1.0 } else if own < other { 0.0 } else { 0.5 })
    }
}
