//! Connect four on a 7-column, 6-row board.
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! ...
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```

use std::fmt;

use crate::{GameError, GameState};

pub const NUM_ROWS: usize = 6;
pub const NUM_COLS: usize = 7;
pub const BOARD_SIZE: usize = NUM_ROWS * NUM_COLS;

/// (row, column) steps of the four line directions.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A player, identified by its discs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disc {
    X,
    O,
}

impl Disc {
    #[inline]
    pub fn opponent(self) -> Disc {
        match self {
            Disc::X => Disc::O,
            Disc::O => Disc::X,
        }
    }
}

impl fmt::Display for Disc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disc::X => write!(f, "X"),
            Disc::O => write!(f, "O"),
        }
    }
}

/// Dropping a disc in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectFourAction(usize);

impl ConnectFourAction {
    #[inline]
    pub fn new(column: usize) -> Self {
        ConnectFourAction(column)
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ConnectFourAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connect four position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFour {
    board: [Option<Disc>; BOARD_SIZE],
    /// Number of discs in each column
    heights: [usize; NUM_COLS],
    current_player: Disc,
    winner: Option<Disc>,
}

impl ConnectFour {
    /// The empty board, X to move.
    pub fn new() -> Self {
        ConnectFour {
            board: [None; BOARD_SIZE],
            heights: [0; NUM_COLS],
            current_player: Disc::X,
            winner: None,
        }
    }

    /// Builds a position from its cells, bottom row first.
    ///
    /// # Errors
    /// `GameError::InvalidPosition` if a disc floats above an empty cell or if
    /// both players have four in a row.
    pub fn from_board(board: [Option<Disc>; BOARD_SIZE], current_player: Disc) -> Result<Self, GameError> {
        let mut heights = [0; NUM_COLS];

        for (column, height) in heights.iter_mut().enumerate() {
            *height = (0..NUM_ROWS).take_while(|&row| board[Self::index(row, column)].is_some()).count();

            if (*height..NUM_ROWS).any(|row| board[Self::index(row, column)].is_some()) {
                return Err(GameError::InvalidPosition(format!("floating disc in column {}", column)));
            }
        }

        let mut game = ConnectFour { board, heights, current_player, winner: None };

        let winners: Vec<Disc> = [Disc::X, Disc::O]
            .into_iter()
            .filter(|&disc| (0..BOARD_SIZE).any(|index| game.board[index] == Some(disc) && game.completes_line(index)))
            .collect();

        match winners.as_slice() {
            [] => {}
            [winner] => game.winner = Some(*winner),
            _ => return Err(GameError::InvalidPosition("both players have four in a row".to_string())),
        }

        Ok(game)
    }

    /// Converts a row, column coordinate into a flat index in the board.
    #[inline]
    pub fn index(row: usize, column: usize) -> usize {
        row * NUM_COLS + column
    }

    /// Content of a cell.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> Option<Disc> {
        if row < NUM_ROWS && column < NUM_COLS { self.board[Self::index(row, column)] } else { None }
    }

    /// The player holding four in a row, if any.
    #[inline]
    pub fn winner(&self) -> Option<Disc> {
        self.winner
    }

    /// Whether the disc at `index` is part of four aligned discs of its colour.
    fn completes_line(&self, index: usize) -> bool {
        let Some(disc) = self.board[index] else {
            return false;
        };
        let (row, column) = ((index / NUM_COLS) as isize, (index % NUM_COLS) as isize);

        DIRECTIONS.iter().any(|&(d_row, d_column)| {
            let count_towards = |sign: isize| {
                (1..4)
                    .take_while(|&step| {
                        let (r, c) = (row + sign * step * d_row, column + sign * step * d_column);
                        r >= 0 && c >= 0 && self.cell(r as usize, c as usize) == Some(disc)
                    })
                    .count()
            };

            1 + count_towards(1) + count_towards(-1) >= 4
        })
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for ConnectFour {
    type Player = Disc;
    type Action = ConnectFourAction;

    fn current_player(&self) -> Disc {
        self.current_player
    }

    fn legal_actions(&self) -> Vec<ConnectFourAction> {
        if self.winner.is_some() {
            return Vec::new();
        }

        (0..NUM_COLS)
            .filter(|&column| self.heights[column] < NUM_ROWS)
            .map(ConnectFourAction)
            .collect()
    }

    fn apply_action(&mut self, action: &ConnectFourAction) -> Result<(), GameError> {
        let column = action.column();

        if self.winner.is_some() {
            return Err(GameError::IllegalAction(format!("column {}: the game is already over", column)));
        }
        if column >= NUM_COLS {
            return Err(GameError::IllegalAction(format!("column {} does not exist", column)));
        }
        if self.heights[column] >= NUM_ROWS {
            return Err(GameError::IllegalAction(format!("column {} is already full", column)));
        }

        let index = Self::index(self.heights[column], column);
        self.board[index] = Some(self.current_player);
        self.heights[column] += 1;

        if self.completes_line(index) {
            self.winner = Some(self.current_player);
        }
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    fn result(&self, player: &Disc) -> Result<f64, GameError> {
        if !self.legal_actions().is_empty() {
            return Err(GameError::GameNotOver);
        }

        Ok(match self.winner {
            Some(winner) if winner == *player => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        })
    }
}

impl fmt::Display for ConnectFour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..NUM_ROWS).rev() {
            for column in 0..NUM_COLS {
                match self.cell(row, column) {
                    Some(disc) => write!(f, "{}", disc)?,
                    None => write!(f, " ")?,
                }
            }
            if row > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(columns: &[usize]) -> ConnectFour {
        let mut game = ConnectFour::new();
        for &column in columns {
            game.apply_action(&ConnectFourAction::new(column)).unwrap();
        }
        game
    }

    #[test]
    fn test_initial_state() {
        let game = ConnectFour::new();

        assert_eq!(game.current_player(), Disc::X);
        assert_eq!(game.legal_actions(), (0..NUM_COLS).map(ConnectFourAction::new).collect::<Vec<_>>());
        assert!(game.winner().is_none());
    }

    #[test]
    fn test_discs_stack() {
        let game = play(&[3, 3]);

        assert_eq!(game.cell(0, 3), Some(Disc::X));
        assert_eq!(game.cell(1, 3), Some(Disc::O));
        assert_eq!(game.cell(2, 3), None);
        assert_eq!(game.current_player(), Disc::X);
    }

    #[test]
    fn test_full_column() {
        let mut game = play(&[0, 0, 0, 0, 0, 0]);
        let before = game.clone();

        assert!(!game.legal_actions().contains(&ConnectFourAction::new(0)));
        assert_eq!(
            game.apply_action(&ConnectFourAction::new(0)),
            Err(GameError::IllegalAction("column 0 is already full".to_string()))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_out_of_range_column() {
        let mut game = ConnectFour::new();
        assert!(matches!(game.apply_action(&ConnectFourAction::new(7)), Err(GameError::IllegalAction(_))));
    }

    #[test]
    fn test_bottom_row_win() {
        let game = play(&[0, 0, 1, 1, 2, 2, 3]);

        assert!(game.legal_actions().is_empty());
        assert_eq!(game.result(&Disc::X), Ok(1.0));
        assert_eq!(game.result(&Disc::O), Ok(0.0));
    }

    #[test]
    fn test_column_win() {
        let game = play(&[4, 5, 4, 5, 4, 5, 4]);
        assert_eq!(game.winner(), Some(Disc::X));
    }

    #[test]
    fn test_diagonal_wins() {
        // X climbs from (0,0) to (3,3)
        let rising = play(&[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
        assert_eq!(rising.winner(), Some(Disc::X));

        // X falls from (3,0) to (0,3)
        let falling = play(&[3, 2, 2, 1, 1, 0, 1, 0, 0, 6, 0]);
        assert_eq!(falling.winner(), Some(Disc::X));
    }

    #[test]
    fn test_no_win_across_edge() {
        // X at columns 5, 6 of row 0 and 0, 1 of row 1 is not a line.
        let game = play(&[5, 0, 6, 1, 0, 2, 1]);
        assert!(game.winner().is_none());
    }

    #[test]
    fn test_result_before_end() {
        assert_eq!(ConnectFour::new().result(&Disc::X), Err(GameError::GameNotOver));
    }

    #[test]
    fn test_draw() {
        // Columns filled in pairs shifted so no four ever line up.
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0,
                     2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2,
                     4, 5, 4, 5, 4, 5, 5, 4, 5, 4, 5, 4,
                     6, 6, 6, 6, 6, 6];
        let game = play(&order);

        assert!(game.winner().is_none());
        assert!(game.legal_actions().is_empty());
        assert_eq!(game.result(&Disc::X), Ok(0.5));
        assert_eq!(game.result(&Disc::O), Ok(0.5));
    }

    #[test]
    fn test_from_board() {
        let game = play(&[0, 0, 1, 1, 2, 2, 3]);
        let mut board = [None; BOARD_SIZE];
        for row in 0..NUM_ROWS {
            for column in 0..NUM_COLS {
                board[ConnectFour::index(row, column)] = game.cell(row, column);
            }
        }

        let rebuilt = ConnectFour::from_board(board, Disc::O).unwrap();
        assert_eq!(rebuilt, game);
    }

    #[test]
    fn test_from_board_floating_disc() {
        let mut board = [None; BOARD_SIZE];
        board[ConnectFour::index(2, 4)] = Some(Disc::X);

        assert!(matches!(ConnectFour::from_board(board, Disc::O), Err(GameError::InvalidPosition(_))));
    }

    #[test]
    fn test_display() {
        let game = play(&[3, 3, 0]);
        let expected = ["       "; 4].join("\n") + "\n   O   \nX  X   ";
        assert_eq!(game.to_string(), expected);
    }
}
