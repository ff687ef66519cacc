//! Tic-tac-toe on a 3x3 board.
//!
//! Cells are numbered row by row:
//! ```text
//! 0|1|2
//! -----
//! 3|4|5
//! -----
//! 6|7|8
//! ```

use std::fmt;

use crate::{GameError, GameState};

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player, identified by the mark it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// Drawing `player`'s mark in the cell `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeAction {
    position: usize,
    player: Mark,
}

impl TicTacToeAction {
    /// # Errors
    /// `GameError::IllegalAction` if `position` is not between 0 and 8.
    pub fn new(position: usize, player: Mark) -> Result<Self, GameError> {
        if position >= BOARD_SIZE {
            return Err(GameError::IllegalAction(format!(
                "position must be between 0 and 8, got {}",
                position
            )));
        }

        Ok(TicTacToeAction { position, player })
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn player(&self) -> Mark {
        self.player
    }
}

impl fmt::Display for TicTacToeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.player, self.position)
    }
}

/// A tic-tac-toe position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    board: [Option<Mark>; BOARD_SIZE],
    current_player: Mark,
}

impl TicTacToe {
    /// The empty board, X to move.
    pub fn new() -> Self {
        TicTacToe { board: [None; BOARD_SIZE], current_player: Mark::X }
    }

    /// Builds a position from its cells.
    ///
    /// # Errors
    /// `GameError::InvalidPosition` if both players have a line.
    pub fn from_board(board: [Option<Mark>; BOARD_SIZE], current_player: Mark) -> Result<Self, GameError> {
        let game = TicTacToe { board, current_player };

        if game.has_line(Mark::X) && game.has_line(Mark::O) {
            return Err(GameError::InvalidPosition("both players have a line".to_string()));
        }

        Ok(game)
    }

    /// Content of a cell.
    #[inline]
    pub fn cell(&self, position: usize) -> Option<Mark> {
        self.board.get(position).copied().flatten()
    }

    /// The player holding a line, if any.
    pub fn winner(&self) -> Option<Mark> {
        [Mark::X, Mark::O].into_iter().find(|&mark| self.has_line(mark))
    }

    fn has_line(&self, mark: Mark) -> bool {
        LINES.iter().any(|line| line.iter().all(|&position| self.board[position] == Some(mark)))
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for TicTacToe {
    type Player = Mark;
    type Action = TicTacToeAction;

    fn current_player(&self) -> Mark {
        self.current_player
    }

    fn legal_actions(&self) -> Vec<TicTacToeAction> {
        if self.winner().is_some() {
            return Vec::new();
        }

        (0..BOARD_SIZE)
            .filter(|&position| self.board[position].is_none())
            .map(|position| TicTacToeAction { position, player: self.current_player })
            .collect()
    }

    fn apply_action(&mut self, action: &TicTacToeAction) -> Result<(), GameError> {
        if self.winner().is_some() {
            return Err(GameError::IllegalAction(format!("{}: the game is already over", action)));
        }
        if action.player != self.current_player {
            return Err(GameError::IllegalAction(format!(
                "{}: it is {}'s turn",
                action, self.current_player
            )));
        }
        if self.board[action.position].is_some() {
            return Err(GameError::IllegalAction(format!("{}: cell is already taken", action)));
        }

        self.board[action.position] = Some(action.player);
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    fn result(&self, player: &Mark) -> Result<f64, GameError> {
        if !self.legal_actions().is_empty() {
            return Err(GameError::GameNotOver);
        }

        Ok(match self.winner() {
            Some(winner) if winner == *player => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        })
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                write!(f, "\n-----\n")?;
            }
            for col in 0..3 {
                let position = row * 3 + col;
                match self.board[position] {
                    Some(mark) => write!(f, "{}", mark)?,
                    None => write!(f, "{}", position)?,
                }
                if col < 2 {
                    write!(f, "|")?;
                }
            }
        }
        Ok(())
    }
}
