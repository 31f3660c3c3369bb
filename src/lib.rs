//! Tic-tac-toe with a computer opponent that finds the best move with a
//! minmax search and alpha-beta pruning.
//!
//! The board is never stored on its own: it is rebuilt from the move history
//! whenever it is needed, see [`build_board`].

#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

mod ai_player;
mod eval;
mod game;
pub mod minmax;

pub use ai_player::AiPlayer;
pub use eval::{evaluate, winner};
pub use game::{
    BOARD_SIZE, Board, CELL_COUNT, Game, GameError, GameStatus, Move, ParsePlayerError, Player,
    Position, build_board, is_move_allowed, next_player,
};
pub use minmax::{
    SearchResult, SearchStats, find_best_move, find_best_move_parallel, find_best_move_with_stats,
};
