//! End-to-end rankings on the bundled games.

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use simple_uct::games::connect_four::{ConnectFour, ConnectFourAction, Disc};
use simple_uct::games::tictactoe::{Mark, TicTacToe};
use simple_uct::utils::random_choice;
use simple_uct::{rank_actions, rank_actions_with_rng, GameState, SearchBudget};

const X: Option<Mark> = Some(Mark::X);
const O: Option<Mark> = Some(Mark::O);

fn connect_four(columns: &[usize]) -> ConnectFour {
    let mut game = ConnectFour::new();
    for &column in columns {
        game.apply_action(&ConnectFourAction::new(column)).unwrap();
    }
    game
}

#[test]
fn tictactoe_takes_immediate_win() {
    // X X . / O O . / . . .  with X to move: 2 wins, 5 only delays.
    let game = TicTacToe::from_board([X, X, None, O, O, None, None, None, None], Mark::X).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let ranking = rank_actions_with_rng(&game, SearchBudget::iterations(2_000), &mut rng).unwrap();

    assert_eq!(ranking.len(), 5);
    assert_eq!(ranking[0].action.position(), 2);
    assert_eq!(ranking[0].win_rate(), 1.0);
    assert!(ranking[0].num_runs > ranking[1].num_runs);
}

#[test]
fn tictactoe_blocks_opponent() {
    // O O . / . X . / . . X  with X to move: 2 stops O and forks 5 and 6.
    let game = TicTacToe::from_board([O, O, None, None, X, None, None, None, X], Mark::X).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let ranking = rank_actions_with_rng(&game, SearchBudget::iterations(3_000), &mut rng).unwrap();

    assert_eq!(ranking[0].action.position(), 2);
}

#[test]
fn connect_four_blocks_bottom_row() {
    // O holds columns 0 to 2 of the bottom row, X must take column 3.
    let game = connect_four(&[6, 0, 6, 1, 5, 2]);
    assert_eq!(game.current_player(), Disc::X);

    let mut rng = StdRng::seed_from_u64(42);
    let ranking = rank_actions_with_rng(&game, SearchBudget::iterations(5_000), &mut rng).unwrap();

    assert_eq!(ranking.len(), 7);
    assert_eq!(ranking[0].action.column(), 3);
}

#[test]
fn connect_four_full_run() {
    let game = connect_four(&[0, 0, 1, 1, 2, 2, 3]);

    assert!(game.legal_actions().is_empty());
    assert_eq!(game.result(&Disc::X), Ok(1.0));
    assert_eq!(game.result(&Disc::O), Ok(0.0));
}

#[test]
fn tictactoe_draw_detection() {
    let game = TicTacToe::from_board([X, X, O, O, X, X, X, O, O], Mark::O).unwrap();

    assert!(game.legal_actions().is_empty());
    assert_eq!(game.result(&Mark::X), Ok(0.5));
    assert_eq!(game.result(&Mark::O), Ok(0.5));
}

#[test]
fn finished_game_ranks_nothing() {
    let won = connect_four(&[0, 0, 1, 1, 2, 2, 3]);
    let drawn = TicTacToe::from_board([X, X, O, O, X, X, X, O, O], Mark::O).unwrap();

    assert!(rank_actions(&won, SearchBudget::iterations(1_000)).unwrap().is_empty());
    assert!(rank_actions(&drawn, SearchBudget::new(Some(1_000), Some(1_000))).unwrap().is_empty());
    assert!(rank_actions(&drawn, SearchBudget::new(None, None)).unwrap().is_empty());
}

#[test]
fn ranking_covers_every_action_once() {
    let game = connect_four(&[3]);
    let ranking = rank_actions(&game, SearchBudget::iterations(300)).unwrap();

    let mut columns: Vec<usize> = ranking.iter().map(|entry| entry.action.column()).collect();
    columns.sort_unstable();

    assert_eq!(columns, (0..7).collect::<Vec<_>>());
    assert!(ranking.windows(2).all(|pair| pair[0].num_runs >= pair[1].num_runs));
    assert_eq!(ranking.iter().map(|entry| entry.num_runs).sum::<usize>(), 300);
}

#[test]
fn search_does_not_touch_input_state() {
    let game = connect_four(&[3, 3]);
    let before = game.clone();

    rank_actions(&game, SearchBudget::iterations(200)).unwrap();

    assert_eq!(game, before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_legal_play_never_fails(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut connect_four = ConnectFour::new();
        while let Some(action) = random_choice(&connect_four.legal_actions(), &mut rng).copied() {
            prop_assert!(connect_four.apply_action(&action).is_ok());
        }
        prop_assert!(connect_four.result(&Disc::X).is_ok());

        let mut tictactoe = TicTacToe::new();
        while let Some(action) = random_choice(&tictactoe.legal_actions(), &mut rng).copied() {
            prop_assert!(tictactoe.apply_action(&action).is_ok());
        }
        let total = tictactoe.result(&Mark::X).unwrap() + tictactoe.result(&Mark::O).unwrap();
        prop_assert_eq!(total, 1.0);
    }

    #[test]
    fn wins_stay_within_runs(seed in any::<u64>(), moves in 0usize..8) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = TicTacToe::new();
        for _ in 0..moves {
            let actions = game.legal_actions();
            if actions.is_empty() {
                break;
            }
            let index = rng.random_range(0..actions.len());
            game.apply_action(&actions[index]).unwrap();
        }

        let ranking = rank_actions_with_rng(&game, SearchBudget::iterations(200), &mut rng).unwrap();

        prop_assert_eq!(ranking.len(), game.legal_actions().len());
        for entry in &ranking {
            prop_assert!(entry.num_wins >= 0.0);
            prop_assert!(entry.num_wins <= entry.num_runs as f64);
        }
    }

    #[test]
    fn same_seed_same_ranking(seed in any::<u64>()) {
        let game = TicTacToe::new();
        let budget = SearchBudget::iterations(300);

        let first = rank_actions_with_rng(&game, budget, &mut StdRng::seed_from_u64(seed)).unwrap();
        let second = rank_actions_with_rng(&game, budget, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert_eq!(first, second);
    }
}
