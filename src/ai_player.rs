use crate::minmax::{SearchResult, find_best_move, find_best_move_parallel};
use crate::{Game, GameError, GameStatus, Move, Player};

/// Computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiPlayer {
    player: Player,
    parallel: bool,
}

impl AiPlayer {
    #[must_use]
    pub const fn new(player: Player) -> Self {
        Self {
            player,
            parallel: false,
        }
    }

    /// Search the subtrees below the root on the rayon thread pool.
    #[must_use]
    pub const fn with_parallel_search(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn player(&self) -> Player {
        self.player
    }

    #[must_use]
    pub fn search(&self, game: &Game) -> SearchResult {
        if self.parallel {
            find_best_move_parallel(game.moves(), self.player).0
        } else {
            find_best_move(game.moves(), self.player)
        }
    }

    /// Searches and plays the best move. Returns `Ok(None)` if the game is
    /// already decided or the board is full.
    pub fn play(&self, game: &mut Game) -> Result<Option<(Move, GameStatus)>, GameError> {
        if game.status() != GameStatus::InProgress {
            return Ok(None);
        }

        let result = self.search(game);
        let Some(position) = result.best_move() else {
            return Ok(None);
        };

        let mv = Move::new(self.player, position);
        let status = game.play(mv)?;
        tracing::debug!(
            player = %self.player,
            %position,
            evaluation = result.evaluation,
            "computer moved"
        );
        Ok(Some((mv, status)))
    }
}
