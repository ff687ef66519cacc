//! Module defining the state contract a game must satisfy to be searched.

use std::{fmt::Debug, hash::Hash};

use thiserror::Error;

/// Errors reported by a game implementation.
///
/// Both variants are contract violations on the caller's side: the search
/// engine only applies actions taken from `legal_actions` and only scores
/// states it has played out to the end, so seeing one of these from a
/// search means the game implementation is inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// The action is not in the current `legal_actions()` set
    /// (occupied cell, full column, wrong player, game already over...).
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// `result` was queried while legal actions remain.
    #[error("game isn't over yet")]
    GameNotOver,

    /// A position handed to a constructor can not be reached by legal play.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Trait defining the interface for a game state that can be searched with UCT.
///
/// Implementations describe one position of a turn-based, perfect-information
/// game with two or more players. The engine clones states freely, so cloning
/// must produce a fully independent copy: mutating the clone never affects the
/// original.
///
/// Results are expected on a fixed scale shared by every game fed to one
/// engine. The reference scale, used by the bundled games, is `1.0` for a win,
/// `0.0` for a loss and `0.5` for a draw.
pub trait GameState: Clone {
    /// The type identifying a player.
    type Player: Clone + PartialEq + Debug;

    /// The type identifying one move.
    ///
    /// Distinct actions from the same state must compare unequal, identical
    /// actions from identical states must compare equal.
    type Action: Clone + Eq + Hash + Debug;

    /// Returns the player to move in this state.
    ///
    /// # Examples
    /// ```rust
    /// use simple_uct::GameState;
    /// use simple_uct::games::tictactoe::{Mark, TicTacToe};
    /// let game = TicTacToe::new();
    /// assert_eq!(game.current_player(), Mark::X);
    /// ```
    fn current_player(&self) -> Self::Player;

    /// Returns the actions that can be played from this state.
    ///
    /// The list is empty exactly when the game has ended, and repeated calls
    /// without an intervening mutation return the same actions in the same
    /// order.
    ///
    /// # Examples
    /// ```rust
    /// use simple_uct::GameState;
    /// use simple_uct::games::tictactoe::TicTacToe;
    /// let game = TicTacToe::new();
    /// assert_eq!(game.legal_actions().len(), 9);
    /// ```
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Applies an action, transitioning this state in place.
    ///
    /// # Errors
    /// `GameError::IllegalAction` if `action` is not presently legal. The state
    /// is left unchanged in that case.
    ///
    /// # Examples
    /// ```rust
    /// use simple_uct::GameState;
    /// use simple_uct::games::connect_four::{ConnectFour, ConnectFourAction};
    /// let mut game = ConnectFour::new();
    /// for _ in 0..6 {
    ///     game.apply_action(&ConnectFourAction::new(0)).unwrap();
    /// }
    /// assert!(game.apply_action(&ConnectFourAction::new(0)).is_err());
    /// ```
    fn apply_action(&mut self, action: &Self::Action) -> Result<(), GameError>;

    /// Scores a finished game from `player`'s perspective.
    ///
    /// # Errors
    /// `GameError::GameNotOver` if `legal_actions()` is not empty.
    fn result(&self, player: &Self::Player) -> Result<f64, GameError>;

    /// Returns `true` if no action can be played from this state.
    #[inline]
    fn is_terminal(&self) -> bool {
        self.legal_actions().is_empty()
    }
}
