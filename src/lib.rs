//! A Rust library providing a generic UCT (Upper Confidence bound applied
//! to Trees) Monte Carlo Tree Search implementation.
//!
//! The engine ranks the legal actions of any turn-based, perfect-information
//! game with two or more players. A game only has to implement the
//! `GameState` contract: cloning, the player to move, the legal actions,
//! applying an action and scoring a finished game. Each search grows a tree by
//! repeating selection, expansion, random playout and backpropagation until its
//! budget runs out, then returns the actions of the searched state ordered by
//! number of visits.
//!
//! # Modules
//! - `tree`: Implements the core tree data structure used by the search.
//! - `game`: Defines the state contract a game must satisfy.
//! - `mcts`: Provides the UCT search and the ranking entry points.
//! - `games`: Tic-tac-toe and connect four implementations of the contract.
//! - `utils`: Contains random choice and stable maximum helpers.
//! - `test_utils`: Provides a tiny game for testing the search.
//!
//! # Examples
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use simple_uct::{rank_actions_with_rng, GameState, MctsError, SearchBudget};
//! use simple_uct::games::tictactoe::{Mark, TicTacToe};
//!
//! fn main() -> Result<(), MctsError> {
//!     let x = Some(Mark::X);
//!     let o = Some(Mark::O);
//!     // X to move, cell 2 completes the top row.
//!     let game = TicTacToe::from_board([x, x, None, o, o, None, None, None, None], Mark::X)?;
//!
//!     // Seeded for a reproducible ranking; `rank_actions` uses the thread-local generator.
//!     let mut rng = StdRng::seed_from_u64(42);
//!     let ranking = rank_actions_with_rng(&game, SearchBudget::new(Some(2_000), Some(1_000)), &mut rng)?;
//!
//!     for entry in &ranking {
//!         println!("{}\t{}/{} ({:.3})", entry.action, entry.num_wins, entry.num_runs, entry.win_rate());
//!     }
//!     assert_eq!(ranking[0].action.position(), 2);
//!
//!     let mut game = game;
//!     game.apply_action(&ranking[0].action)?;
//!     assert!(game.legal_actions().is_empty());
//!     Ok(())
//! }
//! ```

mod tree;
mod game;
mod mcts;
pub mod games;
pub mod utils;

#[doc(hidden)]
pub mod test_utils;

use tree::*;
pub use game::*;
pub use mcts::*;
