//! Alpha-beta game-tree search with iterative deepening and memoization.
//!
//! The Computer maximizes and the Player minimizes [`eval::score`]. Depth is
//! counted in plies, where every single jump of a capture chain is a ply of
//! its own (the same side simply moves again).
//!
//! Results of interior nodes are memoized per (position, remaining depth)
//! together with the alpha-beta bound they represent, so cached values never
//! change what a full-width minimax would compute.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::board::{Move, Side};
use crate::constants::{CACHE_CAPACITY, DEADLINE_CHECK_INTERVAL, DEFAULT_DEPTH, WIN_SCORE};
use crate::eval;
use crate::game::GameState;

/// Bound larger than any reachable score.
const SCORE_INF: i32 = WIN_SCORE + 1_000;

/// Scores beyond this magnitude encode a decided game.
const WIN_THRESHOLD: i32 = WIN_SCORE - 1_000;

/// Runtime search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum depth in plies.
    pub max_depth: u8,
    /// Wall-clock budget for iterative deepening. Depth 1 always completes.
    pub time_budget: Option<Duration>,
    /// Seed for tie-breaking. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Maximum number of memoized positions.
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            time_budget: None,
            seed: None,
            cache_capacity: CACHE_CAPACITY,
        }
    }
}

/// Outcome of one top-level search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Value of `best_move` from the Computer's point of view. A forced move
    /// is scored statically one ply ahead without searching. With no legal
    /// move this is the value of the position itself.
    pub score: i32,
    /// Deepest fully completed depth.
    pub depth: u8,
    pub nodes: u64,
    pub cache_hits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    state: GameState,
    depth: u8,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    score: i32,
    bound: Bound,
}

/// Position cache, flushed wholesale when it reaches capacity.
#[derive(Debug)]
struct TranspositionTable {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    hits: u64,
}

impl TranspositionTable {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
        }
    }

    fn probe(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let hit = self.entries.get(key).copied();
        if hit.is_some() {
            self.hits += 1;
        }
        hit
    }

    fn store(&mut self, key: CacheKey, entry: CacheEntry) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            debug!(entries = self.entries.len(), "flushing position cache");
            self.entries.clear();
        }
        self.entries.insert(key, entry);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}

/// A game-tree searcher owning its memoization cache and tie-break RNG.
///
/// Keep one `Searcher` per game so the cache carries over between moves, and
/// call [`Searcher::clear`] when a new game starts.
pub struct Searcher {
    config: SearchConfig,
    rng: fastrand::Rng,
    table: TranspositionTable,
    nodes: u64,
    deadline: Option<Instant>,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            config,
            rng,
            table: TranspositionTable::new(config.cache_capacity),
            nodes: 0,
            deadline: None,
        }
    }

    /// A searcher with default settings and a fixed tie-break seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SearchConfig {
            seed: Some(seed),
            ..SearchConfig::default()
        })
    }

    /// Drop all memoized positions.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Number of memoized positions.
    pub fn cache_len(&self) -> usize {
        self.table.entries.len()
    }

    /// Best move for the side to move using the configured depth and budget.
    pub fn reply(&mut self, state: &GameState) -> Option<Move> {
        self.best_move(state, self.config.max_depth, self.config.time_budget)
    }

    /// Best move for the side to move, or `None` if it has no legal move.
    pub fn best_move(
        &mut self,
        state: &GameState,
        max_depth: u8,
        time_budget: Option<Duration>,
    ) -> Option<Move> {
        self.search(state, max_depth, time_budget).best_move
    }

    /// Iteratively deepen from depth 1 to `max_depth`.
    ///
    /// A depth interrupted by the time budget is discarded; the result comes
    /// from the deepest completed depth. Among equally scored moves one is
    /// picked at random.
    #[instrument(skip(self, state, time_budget), fields(side = %state.to_move()))]
    pub fn search(
        &mut self,
        state: &GameState,
        max_depth: u8,
        time_budget: Option<Duration>,
    ) -> SearchResult {
        let started = Instant::now();
        let deadline = time_budget.map(|budget| started + budget);
        let hits_before = self.table.hits;
        self.nodes = 0;

        let mut moves = ordered_moves(state);
        let mut result = SearchResult {
            score: leaf_value(state, 0),
            ..SearchResult::default()
        };
        if moves.is_empty() {
            return result;
        }
        if moves.len() == 1 {
            debug!(mv = %moves[0], "forced move");
            result.best_move = Some(moves[0]);
            result.score = leaf_value(&state.advance(&moves[0]), 1);
            return result;
        }

        let mut candidates = Vec::new();
        for depth in 1..=max_depth.max(1) {
            if depth > 1 && deadline.is_some_and(|limit| Instant::now() >= limit) {
                break;
            }
            self.deadline = if depth == 1 { None } else { deadline };

            let Some((best, score)) = self.search_root(state, &moves, depth) else {
                debug!(depth, "time budget exhausted");
                break;
            };
            // Try the best moves first on the next iteration.
            moves.sort_by_key(|mv| !best.contains(mv));

            candidates = best;
            result.score = score;
            result.depth = depth;
            debug!(
                depth,
                score,
                nodes = self.nodes,
                candidates = candidates.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "depth complete"
            );
        }
        self.deadline = None;

        if !candidates.is_empty() {
            result.best_move = Some(candidates[self.rng.usize(..candidates.len())]);
        }
        result.nodes = self.nodes;
        result.cache_hits = self.table.hits - hits_before;
        result
    }

    /// Exact minimax value of `state` searched to `depth` plies.
    pub fn value(&mut self, state: &GameState, depth: u8) -> i32 {
        self.deadline = None;
        match self.alphabeta(state, depth, -SCORE_INF, SCORE_INF, 0) {
            Some(score) => score,
            None => unreachable!("search without a deadline cannot be interrupted"),
        }
    }

    /// Score every root move and collect all moves sharing the best score.
    ///
    /// Each sibling after the first is searched with a window just wide
    /// enough to tell an equal score from a worse one, so ties are exact.
    fn search_root(
        &mut self,
        state: &GameState,
        moves: &[Move],
        depth: u8,
    ) -> Option<(Vec<Move>, i32)> {
        let maximizing = state.to_move() == Side::Computer;
        let mut best: Option<i32> = None;
        let mut best_moves = Vec::new();

        for mv in moves {
            let child = state.advance(mv);
            let (alpha, beta) = match best {
                None => (-SCORE_INF, SCORE_INF),
                Some(b) if maximizing => (b - 1, SCORE_INF),
                Some(b) => (-SCORE_INF, b + 1),
            };
            let value = self.alphabeta(&child, depth - 1, alpha, beta, 1)?;

            match best {
                Some(b) if value == b => best_moves.push(*mv),
                Some(b) if (maximizing && value < b) || (!maximizing && value > b) => {}
                _ => {
                    best = Some(value);
                    best_moves.clear();
                    best_moves.push(*mv);
                }
            }
        }
        best.map(|score| (best_moves, score))
    }

    /// Fail-soft alpha-beta. Returns `None` when the deadline passes.
    fn alphabeta(
        &mut self,
        state: &GameState,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        ply: u8,
    ) -> Option<i32> {
        self.nodes += 1;
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0
            && self.deadline.is_some_and(|limit| Instant::now() >= limit)
        {
            return None;
        }

        if depth == 0 || state.is_game_over() {
            return Some(leaf_value(state, ply));
        }

        let key = CacheKey {
            state: *state,
            depth,
        };
        if let Some(entry) = self.table.probe(&key) {
            let score = from_cache(entry.score, ply);
            match entry.bound {
                Bound::Exact => return Some(score),
                Bound::Lower if score >= beta => return Some(score),
                Bound::Upper if score <= alpha => return Some(score),
                _ => {}
            }
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let maximizing = state.to_move() == Side::Computer;
        let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };

        for mv in ordered_moves(state) {
            let child = state.advance(&mv);
            let value = self.alphabeta(&child, depth - 1, alpha, beta, ply + 1)?;
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }

        let bound = if best <= alpha_orig {
            Bound::Upper
        } else if best >= beta_orig {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.table.store(
            key,
            CacheEntry {
                score: to_cache(best, ply),
                bound,
            },
        );
        Some(best)
    }
}

/// Best move for the side to move with a fresh searcher and cache.
pub fn compute_reply(state: &GameState, depth: u8, time_budget: Option<Duration>) -> Option<Move> {
    Searcher::default().best_move(state, depth, time_budget)
}

/// Static value of a node: a decided game scores as a win, sooner being
/// better, otherwise the evaluator decides.
fn leaf_value(state: &GameState, ply: u8) -> i32 {
    match state.winner() {
        Some(winner) => eval::perspective(winner) * (WIN_SCORE - ply as i32),
        None => eval::score(state.board()),
    }
}

/// Legal moves with captures first, then crowning moves.
fn ordered_moves(state: &GameState) -> Vec<Move> {
    let board = state.board();
    let mut moves = state.legal_moves();
    moves.sort_by_key(|mv| {
        let crowns = board.get(mv.from).is_some_and(|piece| {
            !piece.king && mv.to.row() == piece.side.promotion_row()
        });
        (!mv.is_capture(), !crowns)
    });
    moves
}

/// Win scores are stored relative to the node so they stay valid when the
/// same position is reached at a different ply.
fn to_cache(score: i32, ply: u8) -> i32 {
    if score > WIN_THRESHOLD {
        score + ply as i32
    } else if score < -WIN_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

fn from_cache(score: i32, ply: u8) -> i32 {
    if score > WIN_THRESHOLD {
        score - ply as i32
    } else if score < -WIN_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Piece, Square};

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    /// Plain minimax without pruning or caching.
    fn minimax(state: &GameState, depth: u8, ply: u8) -> i32 {
        if depth == 0 || state.is_game_over() {
            return leaf_value(state, ply);
        }
        let values = state
            .legal_moves()
            .iter()
            .map(|mv| minimax(&state.advance(mv), depth - 1, ply + 1))
            .collect::<Vec<_>>();
        if state.to_move() == Side::Computer {
            values.into_iter().max().unwrap()
        } else {
            values.into_iter().min().unwrap()
        }
    }

    /// A few reachable positions, produced by seeded random play.
    fn sample_positions() -> Vec<GameState> {
        let mut rng = fastrand::Rng::with_seed(42);
        let mut positions = vec![GameState::new()];
        let mut state = GameState::new();
        for ply in 0..30 {
            let moves = state.legal_moves();
            if moves.is_empty() {
                break;
            }
            state = state.submit_move(&moves[rng.usize(..moves.len())]).unwrap();
            if ply % 6 == 5 {
                positions.push(state);
            }
        }
        positions
    }

    #[test]
    fn test_alphabeta_matches_minimax() {
        let mut searcher = Searcher::with_seed(1);
        for state in sample_positions() {
            for depth in 1..=4 {
                assert_eq!(
                    searcher.value(&state, depth),
                    minimax(&state, depth, 0),
                    "depth {depth} on\n{}",
                    state.board()
                );
            }
        }
    }

    #[test]
    fn test_warm_cache_keeps_values() {
        let mut searcher = Searcher::with_seed(1);
        let state = sample_positions()[1];
        let cold = searcher.value(&state, 4);
        searcher.search(&state, 5, None);
        assert!(searcher.cache_len() > 0);
        assert_eq!(searcher.value(&state, 4), cold);
        assert_eq!(cold, minimax(&state, 4, 0));
    }

    #[test]
    fn test_best_move_is_among_top_scores() {
        for seed in 0..4 {
            let state = GameState::new()
                .submit_move(&Move::simple(sq(5, 2), sq(4, 3)))
                .unwrap();
            let mut searcher = Searcher::with_seed(seed);
            let result = searcher.search(&state, 3, None);
            let chosen = result.best_move.unwrap();
            let values: Vec<(Move, i32)> = state
                .legal_moves()
                .into_iter()
                .map(|mv| (mv, minimax(&state.advance(&mv), 2, 1)))
                .collect();
            let top = values.iter().map(|(_, v)| *v).max().unwrap();
            assert_eq!(result.score, top);
            assert!(values.contains(&(chosen, top)), "seed {seed} chose {chosen}");
        }
    }

    #[test]
    fn test_same_seed_same_move() {
        let state = GameState::new();
        let first = Searcher::with_seed(99).best_move(&state, 5, None);
        let second = Searcher::with_seed(99).best_move(&state, 5, None);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_avoids_hanging_piece() {
        // Stepping to (3,2) lets the Player jump the Computer's only man.
        let board = Board::empty()
            .with_cell(sq(2, 1), Some(Piece::man(Side::Computer)))
            .with_cell(sq(4, 3), Some(Piece::man(Side::Player)));
        let state = GameState::from_board(board, Side::Computer);
        for seed in 0..4 {
            let mv = Searcher::with_seed(seed).best_move(&state, 4, None);
            assert_eq!(mv, Some(Move::simple(sq(2, 1), sq(3, 0))));
        }
    }

    #[test]
    fn test_player_side_minimizes() {
        // Mirror of the case above for the Player.
        let board = Board::empty()
            .with_cell(sq(5, 6), Some(Piece::man(Side::Player)))
            .with_cell(sq(3, 4), Some(Piece::man(Side::Computer)));
        let state = GameState::from_board(board, Side::Player);
        let mv = Searcher::with_seed(3).best_move(&state, 4, None);
        assert_eq!(mv, Some(Move::simple(sq(5, 6), sq(4, 7))));
    }

    #[test]
    fn test_no_move_when_game_over() {
        let board = Board::empty().with_cell(sq(2, 1), Some(Piece::man(Side::Computer)));
        let state = GameState::from_board(board, Side::Player);
        assert!(state.is_game_over());
        assert_eq!(compute_reply(&state, 4, None), None);
    }

    #[test]
    fn test_forced_move_returned_immediately() {
        let board = Board::empty()
            .with_cell(sq(3, 4), Some(Piece::man(Side::Player)))
            .with_cell(sq(2, 3), Some(Piece::man(Side::Computer)))
            .with_cell(sq(0, 7), Some(Piece::man(Side::Computer)));
        let state = GameState::from_board(board, Side::Player);
        let result = Searcher::with_seed(0).search(&state, 6, None);
        let jump = Move::jump(sq(3, 4), sq(1, 2), sq(2, 3));
        assert_eq!(result.best_move, Some(jump));
        assert_eq!(result.nodes, 0);
        assert_eq!(result.score, leaf_value(&state.advance(&jump), 1));
    }

    #[test]
    fn test_zero_budget_still_completes_depth_one() {
        let state = GameState::new();
        let result = Searcher::with_seed(5).search(&state, 8, Some(Duration::ZERO));
        assert!(result.best_move.is_some());
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_deadline_discards_unfinished_depth() {
        let state = GameState::new()
            .submit_move(&Move::simple(sq(5, 2), sq(4, 3)))
            .unwrap();
        let mut searcher = Searcher::with_seed(1);
        let result = searcher.search(&state, 40, Some(Duration::from_millis(50)));
        assert!((1..40).contains(&result.depth), "depth {}", result.depth);
        assert!(state.legal_moves().contains(&result.best_move.unwrap()));

        // Entries left by the interrupted depth do not change later values.
        for depth in 1..=4 {
            assert_eq!(searcher.value(&state, depth), minimax(&state, depth, 0));
        }
    }

    #[test]
    fn test_cache_stays_bounded() {
        let mut searcher = Searcher::new(SearchConfig {
            seed: Some(0),
            cache_capacity: 64,
            ..SearchConfig::default()
        });
        searcher.search(&GameState::new(), 5, None);
        assert!(searcher.cache_len() <= 64);
        searcher.clear();
        assert_eq!(searcher.cache_len(), 0);
    }

    #[test]
    fn test_decided_game_scores_as_win() {
        let board = Board::empty().with_cell(sq(3, 3), Some(Piece::king(Side::Computer)));
        let state = GameState::from_board(board, Side::Player);
        assert_eq!(leaf_value(&state, 2), WIN_SCORE - 2);
        assert_eq!(Searcher::with_seed(0).value(&state, 4), WIN_SCORE);
    }

    #[test]
    fn test_cache_score_conversion() {
        assert_eq!(from_cache(to_cache(WIN_SCORE - 5, 3), 3), WIN_SCORE - 5);
        assert_eq!(from_cache(to_cache(-(WIN_SCORE - 5), 3), 1), -(WIN_SCORE - 3));
        assert_eq!(to_cache(250, 7), 250);
    }
}
