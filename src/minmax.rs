//! Minmax search with alpha-beta pruning.

use core::ops::{Deref, DerefMut};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::eval::evaluate;
use crate::game::{Board, Move, Player, Position, build_board};

/// Best achievable evaluation and the position that achieves it.
///
/// `evaluation` is the raw `-1/0/1` evaluation of the final board divided by
/// the number of plies to reach it plus one, so fast wins score higher than
/// slow ones and late losses are "less bad" than early ones. `position` is
/// [`Position::OFF_BOARD`] if the board is already decided or full.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SearchResult {
    pub evaluation: f64,
    pub position: Position,
}

impl SearchResult {
    /// Returns the position to play, if there is one.
    #[must_use]
    pub fn best_move(&self) -> Option<Position> {
        self.position.is_on_board().then_some(self.position)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SearchStats {
    /// Number of visited nodes, root included.
    pub nodes: u64,
}

/// A mark placed on a borrowed board. The cell is cleared again when the
/// placement is dropped, on every exit path.
struct Placement<'a> {
    board: &'a mut Board,
    position: Position,
}

impl<'a> Placement<'a> {
    fn new(board: &'a mut Board, position: Position, player: Player) -> Self {
        let placed = board.set(position, Some(player));
        debug_assert!(placed, "search only places marks on the board");
        Self { board, position }
    }
}

impl Deref for Placement<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        let cleared = self.board.set(self.position, None);
        debug_assert!(cleared);
    }
}

/// Recursive alpha-beta search. `player` is the perspective all evaluations
/// are scored from; `maximize` tells whether `player` moves at this ply.
fn alpha_beta(
    board: &mut Board,
    player: Player,
    maximize: bool,
    depth: u32,
    mut alpha: f64,
    mut beta: f64,
    stats: &mut SearchStats,
) -> SearchResult {
    stats.nodes += 1;

    // recursion tail: decided or full board
    let evaluation = evaluate(board, player);
    if evaluation != 0 || board.is_full() {
        return SearchResult {
            evaluation: f64::from(evaluation) / f64::from(depth + 1),
            position: Position::OFF_BOARD,
        };
    }

    let current_player = if maximize { player } else { player.opponent() };
    let mut best = SearchResult {
        evaluation: if maximize {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        },
        position: Position::OFF_BOARD,
    };

    for position in Position::all() {
        if board.get(position).is_some() {
            continue;
        }

        let candidate = {
            let mut placed = Placement::new(board, position, current_player);
            alpha_beta(&mut placed, player, !maximize, depth + 1, alpha, beta, stats)
        };

        if maximize && candidate.evaluation > best.evaluation {
            best = SearchResult {
                evaluation: candidate.evaluation,
                position,
            };
            alpha = alpha.max(candidate.evaluation);
        } else if !maximize && candidate.evaluation < best.evaluation {
            best = SearchResult {
                evaluation: candidate.evaluation,
                position,
            };
            beta = beta.min(candidate.evaluation);
        }

        if beta <= alpha {
            break;
        }
    }

    best
}

/// Like [`find_best_move`], but also reports how much work the search did.
#[instrument(skip(moves), fields(plies = moves.len()))]
pub fn find_best_move_with_stats(moves: &[Move], player: Player) -> (SearchResult, SearchStats) {
    let mut board = build_board(moves);
    let mut stats = SearchStats::default();
    let result = alpha_beta(
        &mut board,
        player,
        true,
        0,
        f64::NEG_INFINITY,
        f64::INFINITY,
        &mut stats,
    );
    debug_assert_eq!(board, build_board(moves), "search must restore the board");

    tracing::debug!(
        evaluation = result.evaluation,
        position = %result.position,
        nodes = stats.nodes,
        "search finished"
    );
    (result, stats)
}

/// Finds the best position for `player` to play after `moves`.
///
/// The search does not check whose turn it is; callers should verify the
/// returned position with [`crate::is_move_allowed`] before playing it.
#[must_use]
pub fn find_best_move(moves: &[Move], player: Player) -> SearchResult {
    find_best_move_with_stats(moves, player).0
}

/// Same result as [`find_best_move`], but the subtrees below the root are
/// searched in parallel, each on its own board.
#[instrument(skip(moves), fields(plies = moves.len()))]
pub fn find_best_move_parallel(moves: &[Move], player: Player) -> (SearchResult, SearchStats) {
    let board = build_board(moves);

    let evaluation = evaluate(&board, player);
    if evaluation != 0 || board.is_full() {
        let result = SearchResult {
            evaluation: f64::from(evaluation),
            position: Position::OFF_BOARD,
        };
        return (result, SearchStats { nodes: 1 });
    }

    // The full window keeps every child score exact, so picking the first
    // strict maximum in row-major order matches the sequential search.
    let children = board
        .empty_positions()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|position| {
            let mut board = board.clone();
            let mut stats = SearchStats::default();
            let child = {
                let mut placed = Placement::new(&mut board, position, player);
                alpha_beta(
                    &mut placed,
                    player,
                    false,
                    1,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                    &mut stats,
                )
            };
            (position, child.evaluation, stats.nodes)
        })
        .collect::<Vec<_>>();

    let mut best = SearchResult {
        evaluation: f64::NEG_INFINITY,
        position: Position::OFF_BOARD,
    };
    let mut stats = SearchStats { nodes: 1 };
    for (position, evaluation, nodes) in children {
        stats.nodes += nodes;
        if evaluation > best.evaluation {
            best = SearchResult {
                evaluation,
                position,
            };
        }
    }

    tracing::debug!(
        evaluation = best.evaluation,
        position = %best.position,
        nodes = stats.nodes,
        "parallel search finished"
    );
    (best, stats)
}
