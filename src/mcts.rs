//! Implementation of the UCT flavour of Monte Carlo Tree Search.
//!
//! This module provides the search node statistics, the select / expand /
//! simulate / backpropagate cycle, the budget that bounds it, and the ranking
//! entry points built on top of them. It is generic over any type
//! implementing `GameState`.

use std::{rc::Rc, time::{Duration, Instant}};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{utils::{max_element_by, random_choice}, GameError, GameState, Node, NodeRef};

/// Statistics and game information stored in each node of the search tree.
///
/// # Type Parameters
/// - `S`: The game state type.
struct SearchNodeData<S: GameState>{
    /// The state reached after playing `action`, owned by this node alone.
    state: S,
    /// The action that produced this node from its parent. `None` for the root.
    action: Option<S::Action>,
    /// The player who played `action`, i.e. whose point of view `num_wins` is
    /// counted from. `None` for the root.
    player_just_moved: Option<S::Player>,
    /// Legal actions of `state` that have no child yet, in `legal_actions()` order.
    untried_actions: Vec<S::Action>,
    /// Whether `state` has no legal action at all.
    terminal: bool,
    /// Number of simulations that went through this node.
    num_runs: usize,
    /// Sum of the results of those simulations for `player_just_moved`.
    num_wins: f64
}

impl<S: GameState> SearchNodeData<S>{
    fn new(state: S, action: Option<S::Action>, player_just_moved: Option<S::Player>) -> Self{
        let untried_actions = state.legal_actions();

        SearchNodeData {
            terminal: untried_actions.is_empty(),
            state,
            action,
            player_just_moved,
            untried_actions,
            num_runs: 0,
            num_wins: 0.0
        }
    }

    /// Average result for the player who moved into this node.
    ///
    /// Only meaningful once the node has been visited, selection never looks
    /// at an unvisited child.
    #[inline]
    fn exploitation_value(&self) -> f64{
        self.num_wins / self.num_runs as f64
    }

    #[inline]
    fn is_fully_expanded(&self) -> bool{
        self.untried_actions.is_empty()
    }
}

/// Type alias for a `Node` containing `SearchNodeData`.
type SearchNode<S> = Node<SearchNodeData<S>>;
/// Type alias for a strong reference (`Rc<RefCell<...>>`) to a `SearchNode`.
type SearchNodeRef<S> = NodeRef<SearchNodeData<S>>;
/// An expanded action not yet in the tree: the action, its player and the state it leads to.
type Expansion<S> = (<S as GameState>::Action, <S as GameState>::Player, S);

/// Represents possible errors that can occur during a search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MctsError{
    /// The game implementation rejected an action the engine took from its
    /// own `legal_actions`, or refused to score a state with no legal action.
    /// Either way the game implementation is inconsistent.
    #[error("game contract violated: {0}")]
    Game(#[from] GameError),

    /// The exploration coefficient must be finite and non-negative.
    /// Contains the rejected coefficient.
    #[error("invalid exploration coefficient: {0}")]
    InvalidConfig(f64),

    /// A ranking was requested with neither an iteration nor a time cap.
    #[error("search budget has neither an iteration nor a time cap")]
    UnboundedBudget
}

/// Type alias for a function pointer used to determine a child's selection score.
///
/// This function takes the following parameters:
/// - `value`: The mean result of the child for the player who moved into it.
/// - `n_visits`: The number of times the child has been visited (always > 0).
/// - `parent_n_visits`: The number of times the parent has been visited (always >= 1).
/// - `exploration_coef`: The exploration coefficient from `MctsConfig`.
///
/// It returns an `f64` score; the child with the greatest score is descended into.
pub type SelectionFunction = fn(value: f64, n_visits: f64, parent_n_visits: f64, exploration_coef: f64) -> f64;

/// The standard Upper Confidence Bound 1 (UCB1) selection function.
///
/// With `exploration_coef = sqrt(2)` this is the classic UCT score
/// `value + sqrt(2 * ln(parent_n_visits) / n_visits)`.
///
/// # Examples
/// ```rust
/// use simple_uct::ucb1;
/// let score = ucb1(0.5, 4.0, 16.0, std::f64::consts::SQRT_2);
/// let expected = 0.5 + (2.0 * 16f64.ln() / 4.0).sqrt();
/// assert!((score - expected).abs() < 1e-12);
/// ```
pub fn ucb1(value: f64, n_visits: f64, parent_n_visits: f64, exploration_coef: f64) -> f64{
    value + exploration_coef * (parent_n_visits.ln() / n_visits).sqrt()
}

/// Configuration parameters for a search.
#[derive(Debug, Clone, Copy)]
pub struct MctsConfig{
    /// The exploration coefficient used in the selection phase.
    ///
    /// A higher value encourages more exploration of less-visited children, while a lower value
    /// prioritizes exploitation of known good paths.
    pub exploration_coef: f64,
    /// The function used to calculate the selection score of a child.
    pub selection_function: SelectionFunction
}

impl MctsConfig{
    /// The default configuration.
    ///
    /// - `exploration_coef`: `std::f64::consts::SQRT_2`.
    /// - `selection_function`: `ucb1`.
    pub const DEFAULT: MctsConfig = MctsConfig{
        exploration_coef: std::f64::consts::SQRT_2,
        selection_function: ucb1
    };

    fn validate(&self) -> Result<(), MctsError>{
        if self.exploration_coef.is_finite() && self.exploration_coef >= 0.0{
            Ok(())
        }
        else{
            Err(MctsError::InvalidConfig(self.exploration_coef))
        }
    }
}

impl Default for MctsConfig{
    fn default() -> Self{
        Self::DEFAULT
    }
}

/// Limits on how long a search keeps iterating.
///
/// A cap left to `None` is unbounded in that dimension. The budget is checked
/// before each iteration and never interrupts one, so a time cap can be
/// overrun by at most the cost of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget{
    /// Maximum number of iterations.
    pub max_iterations: Option<usize>,
    /// Maximum wall-clock time.
    pub time_budget: Option<Duration>
}

impl SearchBudget{
    /// Creates a budget from optional caps.
    ///
    /// # Parameters
    /// - `max_iterations`: Iteration cap, `None` for unbounded.
    /// - `time_budget_ms`: Time cap in milliseconds, `None` for unbounded.
    ///
    /// With both caps left to `None` the budget is not bounded, and
    /// `rank_actions` rejects it with `MctsError::UnboundedBudget`.
    #[inline]
    pub fn new(max_iterations: Option<usize>, time_budget_ms: Option<u64>) -> Self{
        SearchBudget { max_iterations, time_budget: time_budget_ms.map(Duration::from_millis) }
    }

    /// Creates a budget bounded only by a number of iterations.
    #[inline]
    pub fn iterations(max_iterations: usize) -> Self{
        Self::new(Some(max_iterations), None)
    }

    /// Creates a budget bounded only by a time in milliseconds.
    #[inline]
    pub fn time(time_budget_ms: u64) -> Self{
        Self::new(None, Some(time_budget_ms))
    }

    /// Whether at least one of the caps is set.
    ///
    /// A budget without any cap would never stop a search, ranking refuses it.
    #[inline]
    pub fn is_bounded(&self) -> bool{
        self.max_iterations.is_some() || self.time_budget.is_some()
    }

    /// Whether another iteration may start.
    ///
    /// # Parameters
    /// - `iterations`: Iterations completed so far.
    /// - `elapsed`: Time spent so far.
    ///
    /// # Examples
    /// ```rust
    /// use std::time::Duration;
    /// use simple_uct::SearchBudget;
    /// let budget = SearchBudget::new(Some(10), Some(1_000));
    /// assert!(budget.should_continue(9, Duration::from_millis(999)));
    /// assert!(!budget.should_continue(10, Duration::ZERO));
    /// assert!(!budget.should_continue(0, Duration::from_millis(1_000)));
    /// ```
    #[inline]
    pub fn should_continue(&self, iterations: usize, elapsed: Duration) -> bool{
        self.max_iterations.map_or(true, |max| iterations < max)
            && self.time_budget.map_or(true, |max| elapsed < max)
    }
}

/// One entry of a ranking: a root action and the statistics of its subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAction<A>{
    /// The action playable from the searched state.
    pub action: A,
    /// Number of simulations that started with this action.
    pub num_runs: usize,
    /// Sum of their results for the player to move in the searched state.
    pub num_wins: f64
}

impl<A> RankedAction<A>{
    /// Mean result of the action, `0.0` if it was never simulated.
    #[inline]
    pub fn win_rate(&self) -> f64{
        if self.num_runs != 0 { self.num_wins / self.num_runs as f64 } else { 0.0 }
    }
}

/// A UCT search tree grown from one game state.
///
/// The tree is owned by this value and dropped with it; nothing is shared
/// with other searches.
///
/// # Type Parameters
/// - `S`: The game state type that implements the `GameState` trait.
pub struct Mcts<S: GameState>{
    root: SearchNodeRef<S>,
    coef: f64,
    selection_function: SelectionFunction
}

impl<S: GameState> Mcts<S>{
    /// Creates a search rooted at `state` with the default configuration.
    #[inline]
    pub fn from_state(state: S) -> Self{
        Mcts {
            root: Node::new_root(SearchNodeData::new(state, None, None)),
            coef: MctsConfig::DEFAULT.exploration_coef,
            selection_function: MctsConfig::DEFAULT.selection_function
        }
    }

    /// Creates a search rooted at `state` with a custom configuration.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` if the exploration coefficient is
    /// negative or not finite.
    #[inline]
    pub fn from_state_with_config(state: S, config: &MctsConfig) -> Result<Self, MctsError>{
        config.validate()?;

        let mut mcts = Self::from_state(state);
        mcts.coef = config.exploration_coef;
        mcts.selection_function = config.selection_function;
        Ok(mcts)
    }

    /// Returns `true` if the root state has no legal action.
    #[inline]
    pub fn is_terminal(&self) -> bool{
        self.root.borrow().get().terminal
    }

    /// Number of simulations run through the root.
    #[inline]
    pub fn num_runs(&self) -> usize{
        self.root.borrow().get().num_runs
    }

    /// Number of nodes in the tree, root included.
    #[inline]
    pub fn node_count(&self) -> usize{
        self.root.borrow().subtree_size()
    }

    /// Returns the child with the greatest selection score.
    ///
    /// Ties go to the child added first, so a search is reproducible given a
    /// seeded random source.
    ///
    /// # Panics
    /// If `node` has no child, or if the selection function returned `NaN`
    /// for every child. The selection loop only calls this on fully
    /// expanded, non-terminal nodes, which always have visited children.
    fn select_child(&self, node: &SearchNode<S>) -> SearchNodeRef<S>{
        let parent_n_visits = node.get().num_runs as f64;

        let best = max_element_by(node.children(), |child| {
            let data = child.borrow();
            let data = data.get();

            (self.selection_function)(data.exploitation_value(), data.num_runs as f64, parent_n_visits, self.coef)
        });

        match best{
            Some(child) => Rc::clone(child),
            None if node.children().is_empty() => panic!("select_child called on a node without children"),
            None => panic!("selection function returned NaN for every child")
        }
    }

    /// Appends a child for one of the node's untried actions.
    ///
    /// # Parameters
    /// - `node`: The node to expand.
    /// - `action`: An action taken from the node's untried actions.
    /// - `player`: The player who plays `action`.
    /// - `state`: The state reached by playing `action`.
    ///
    /// # Panics
    /// If `action` is not one of the node's untried actions.
    fn add_child(node: &SearchNodeRef<S>, action: S::Action, player: S::Player, state: S) -> SearchNodeRef<S>{
        {
            let mut node_mut = node.borrow_mut();
            let untried_actions = &mut node_mut.get_mut().untried_actions;

            match untried_actions.iter().position(|untried| *untried == action){
                Some(index) => { untried_actions.remove(index); },
                None => panic!("add_child called with an action that is not untried: {:?}", action)
            }
        }

        Node::add_child(node, SearchNodeData::new(state, Some(action), Some(player)))
    }

    /// Performs the selection phase
    ///
    /// # Returns
    /// Tuple containing:
    /// - The first node met that has untried actions or is terminal
    /// - The game state at that node
    fn selection(&self) -> Result<(SearchNodeRef<S>, S), MctsError>{
        let mut node = Rc::clone(&self.root);
        let mut state = node.borrow().get().state.clone();

        loop {
            let next = {
                let current = node.borrow();
                if !current.get().is_fully_expanded() || current.get().terminal{
                    break;
                }
                self.select_child(&current)
            };

            if let Some(action) = next.borrow().get().action.as_ref(){
                state.apply_action(action)?;
            }
            node = next;
        }

        Ok((node, state))
    }

    /// Performs the expansion phase
    ///
    /// Plays one untried action of `node`, chosen uniformly at random, on
    /// `state`. The tree is not modified: the matching child is added by
    /// `iterate` once the iteration has been scored.
    ///
    /// # Returns
    /// The action, its player and the state it leads to, or `None` if `node`
    /// has nothing left to try
    fn expansion<R: Rng>(node: &SearchNodeRef<S>, state: &mut S, rng: &mut R) -> Result<Option<Expansion<S>>, MctsError>{
        let action = random_choice(&node.borrow().get().untried_actions, rng).cloned();
        let Some(action) = action else {
            return Ok(None);
        };

        let player = state.current_player();
        state.apply_action(&action)?;

        Ok(Some((action, player, state.clone())))
    }

    /// Performs the simulation phase: random legal actions until the game ends
    fn simulation<R: Rng>(state: &mut S, rng: &mut R) -> Result<(), MctsError>{
        loop {
            let actions = state.legal_actions();

            match random_choice(&actions, rng){
                Some(action) => state.apply_action(action)?,
                None => return Ok(())
            }
        }
    }

    /// Scores `terminal_state` for every node from `node_ref` up to the root
    ///
    /// # Returns
    /// One result per node, starting at `node_ref`, for the player who moved
    /// into it. The root has no such player and gets `0.0`.
    fn path_results(node_ref: &SearchNodeRef<S>, terminal_state: &S) -> Result<Vec<f64>, MctsError>{
        let mut results = Vec::new();
        let mut current_ref_opt = Some(Rc::clone(node_ref));

        while let Some(current_ref) = current_ref_opt {
            let current = current_ref.borrow();

            results.push(match current.get().player_just_moved.as_ref(){
                Some(player) => terminal_state.result(player)?,
                None => 0.0
            });

            current_ref_opt = current.get_parent();
        }

        Ok(results)
    }

    /// Performs the backpropagation phase
    ///
    /// Every node from `node_ref` up to the root counts one more run and is
    /// credited the matching entry of `results`.
    fn backpropagation(node_ref: SearchNodeRef<S>, results: Vec<f64>){
        let mut results = results.into_iter();
        let mut current_ref_opt = Some(node_ref);

        while let Some(current_ref) = current_ref_opt {
            let mut current = current_ref.borrow_mut();
            let data = current.get_mut();

            data.num_runs += 1;
            data.num_wins += results.next().unwrap_or(0.0);

            current_ref_opt = current.get_parent();
        }
    }

    /// Performs one full iteration (selection, expansion, simulation, backpropagation).
    ///
    /// # Parameters
    /// - `rng`: The random source for expansion and playouts.
    ///
    /// # Returns
    /// `Err(MctsError::Game(_))` if the game implementation rejected one of its
    /// own legal actions or refused to score a finished game. Every fallible
    /// step runs before the tree is touched, so a failed iteration adds no
    /// node and changes no statistic.
    pub fn iterate<R: Rng>(&mut self, rng: &mut R) -> Result<(), MctsError>{
        let (node, mut state) = self.selection()?;
        let expansion = Self::expansion(&node, &mut state, rng)?;
        Self::simulation(&mut state, rng)?;

        let mut results = Self::path_results(&node, &state)?;
        let leaf = match expansion{
            Some((action, player, child_state)) => {
                results.insert(0, state.result(&player)?);
                Self::add_child(&node, action, player, child_state)
            }
            None => node
        };

        Self::backpropagation(leaf, results);
        Ok(())
    }

    /// Iterates while `should_continue` holds.
    ///
    /// The predicate is called before every iteration with the number of
    /// completed iterations and the time elapsed since this call started.
    ///
    /// # Returns
    /// The number of iterations performed.
    pub fn build_tree<F, R>(&mut self, mut should_continue: F, rng: &mut R) -> Result<usize, MctsError>
    where
        F: FnMut(usize, Duration) -> bool,
        R: Rng
    {
        let timer = Instant::now();
        let mut iterations = 0;

        while should_continue(iterations, timer.elapsed()) {
            self.iterate(rng)?;
            iterations += 1;
        }

        Ok(iterations)
    }

    /// Returns the root's children ordered by descending number of runs.
    ///
    /// Children with the same number of runs keep their expansion order.
    pub fn ranking(&self) -> Vec<RankedAction<S::Action>>{
        let root = self.root.borrow();

        let mut ranking: Vec<RankedAction<S::Action>> = root.children().iter().filter_map(|child_ref| {
            let child = child_ref.borrow();
            let data = child.get();

            data.action.clone().map(|action| RankedAction {
                action,
                num_runs: data.num_runs,
                num_wins: data.num_wins
            })
        }).collect();

        ranking.sort_by(|a, b| b.num_runs.cmp(&a.num_runs));
        ranking
    }
}

/// Ranks the actions of `state` using the thread-local random generator.
///
/// See `rank_actions_with_config`.
pub fn rank_actions<S: GameState>(state: &S, budget: SearchBudget) -> Result<Vec<RankedAction<S::Action>>, MctsError>{
    rank_actions_with_rng(state, budget, &mut rand::rng())
}

/// Ranks the actions of `state` with the default configuration and an explicit random source.
///
/// See `rank_actions_with_config`.
pub fn rank_actions_with_rng<S: GameState, R: Rng>(state: &S, budget: SearchBudget, rng: &mut R) -> Result<Vec<RankedAction<S::Action>>, MctsError>{
    rank_actions_with_config(state, budget, &MctsConfig::DEFAULT, rng)
}

/// Ranks the legal actions of `state` by growing a UCT tree within `budget`.
///
/// The search runs on a clone of `state`. Actions are returned by descending
/// number of runs (robustness), each with the statistics of its subtree;
/// `num_wins` is counted for the player to move in `state`.
///
/// # Returns
/// An empty ranking if `state` has no legal action, whatever the budget.
/// `Err(MctsError::InvalidConfig(_))` for an invalid configuration,
/// `Err(MctsError::UnboundedBudget)` if `budget` has no cap at all and
/// `Err(MctsError::Game(_))` if the game implementation breaks its contract.
///
/// # Examples
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use simple_uct::{rank_actions_with_config, MctsConfig, SearchBudget};
/// use simple_uct::games::tictactoe::TicTacToe;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let ranking = rank_actions_with_config(&TicTacToe::new(), SearchBudget::iterations(200), &MctsConfig::DEFAULT, &mut rng).unwrap();
///
/// assert_eq!(ranking.len(), 9);
/// assert_eq!(ranking.iter().map(|entry| entry.num_runs).sum::<usize>(), 200);
/// ```
pub fn rank_actions_with_config<S: GameState, R: Rng>(state: &S, budget: SearchBudget, config: &MctsConfig, rng: &mut R) -> Result<Vec<RankedAction<S::Action>>, MctsError>{
    let mut mcts = Mcts::from_state_with_config(state.clone(), config)?;

    if mcts.is_terminal(){
        debug!("state has no legal action, nothing to rank");
        return Ok(Vec::new());
    }
    if !budget.is_bounded(){
        return Err(MctsError::UnboundedBudget);
    }

    let timer = Instant::now();
    let iterations = mcts.build_tree(|iterations, elapsed| budget.should_continue(iterations, elapsed), rng)?;

    debug!(
        iterations,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        nodes = mcts.node_count(),
        "UCT search complete"
    );

    let ranking = mcts.ranking();
    for entry in &ranking{
        trace!(
            action = ?entry.action,
            runs = entry.num_runs,
            wins = entry.num_wins,
            "ranked action"
        );
    }

    Ok(ranking)
}
