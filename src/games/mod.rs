//! Reference implementations of `GameState`.
//!
//! These are ordinary users of the engine: they only implement the state
//! contract and can serve as templates for new games.

pub mod connect_four;
pub mod tictactoe;
