//! Game logic and game board.

use core::fmt::{self, Formatter};
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::eval::winner;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 3;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Reasons why a move can not be played in a [`Game`].
#[derive(Debug, PartialEq, Clone, Copy, Eq, Error)]
pub enum GameError {
    #[error("position {0} is not on the board")]
    OffBoard(Position),
    #[error("position {0} is already taken")]
    Occupied(Position),
    /// All cells are taken.
    #[error("the board is full")]
    BoardFull,
    /// The player also made the previous move.
    #[error("it is not {0}'s turn")]
    OutOfTurn(Player),
    #[error("the game is already decided")]
    GameOver,
}

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, PartialEq, Clone, Eq, Error)]
#[error("unknown player '{0}', expected 'x' or 'o'")]
pub struct ParsePlayerError(String);

impl FromStr for Player {
    type Err = ParsePlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Self::X),
            "o" | "O" => Ok(Self::O),
            other => Err(ParsePlayerError(other.to_string())),
        }
    }
}

/// Coordinates of a cell. `x` is the column, `y` the row, both counted from
/// the top left corner.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Sentinel for "no move".
    pub const OFF_BOARD: Self = Self { x: -1, y: -1 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn is_on_board(self) -> bool {
        self.x >= 0
            && self.y >= 0
            && (self.x as usize) < BOARD_SIZE
            && (self.y as usize) < BOARD_SIZE
    }

    /// Returns the row-major cell index, or `None` for positions outside the
    /// board.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        if self.is_on_board() {
            Some(self.y as usize * BOARD_SIZE + self.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Self::index`].
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Self::new(
                (index % BOARD_SIZE) as i32,
                (index / BOARD_SIZE) as i32,
            ))
        } else {
            None
        }
    }

    /// Emits all cells in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE as i32)
            .flat_map(|y| (0..BOARD_SIZE as i32).map(move |x| Self::new(x, y)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One ply.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub position: Position,
}

impl Move {
    #[must_use]
    pub const fn new(player: Player, position: Position) -> Self {
        Self { player, position }
    }
}

/// Gameboard.
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Board(
    /*
     * Board: rows --> col --> field
     * (y=0,x=0) <==> top left of game board
     */
    [[Option<Player>; BOARD_SIZE]; BOARD_SIZE],
);

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self([[None; BOARD_SIZE]; BOARD_SIZE])
    }

    /// Replays `moves` in order onto an empty board. A later move on the same
    /// cell overwrites the earlier one; moves outside the board are skipped.
    #[must_use]
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut board = Self::new();
        for mv in moves {
            if !board.set(mv.position, Some(mv.player)) {
                tracing::trace!(position = %mv.position, "skipping move outside of the board");
            }
        }
        board
    }

    #[must_use]
    pub const fn cells(&self) -> &[[Option<Player>; BOARD_SIZE]; BOARD_SIZE] {
        &self.0
    }

    /// Returns the player occupying `position`. Empty cells and positions
    /// outside the board are both `None`.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<Player> {
        if position.is_on_board() {
            self.0[position.y as usize][position.x as usize]
        } else {
            None
        }
    }

    /// Writes `cell` at `position`. Returns `false` and leaves the board
    /// untouched if `position` is outside the board.
    #[must_use]
    pub fn set(&mut self, position: Position, cell: Option<Player>) -> bool {
        if !position.is_on_board() {
            return false;
        }
        self.0[position.y as usize][position.x as usize] = cell;
        true
    }

    #[must_use]
    pub fn is_empty_at(&self, position: Position) -> bool {
        position.is_on_board() && self.get(position).is_none()
    }

    /// Emits the positions where moves are legal, in row-major order.
    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(|&position| self.get(position).is_none())
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.0.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied_count() == CELL_COUNT
    }
}

impl fmt::Display for Board {
    /// Free cells show their 1-based index so a human can pick them.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (y, row) in self.0.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                match cell {
                    Some(player) => write!(f, "{player}")?,
                    None => write!(f, "{}", y * BOARD_SIZE + x + 1)?,
                }
                if x + 1 < BOARD_SIZE {
                    write!(f, "|")?;
                }
            }
            if y + 1 < BOARD_SIZE {
                writeln!(f)?;
                writeln!(f, "-+-+-")?;
            }
        }
        Ok(())
    }
}

/// Builds the board for a move history.
#[must_use]
pub fn build_board(moves: &[Move]) -> Board {
    Board::from_moves(moves)
}

/// Returns who has to move next, or `None` if nobody has moved yet and either
/// player may open.
#[must_use]
pub fn next_player(moves: &[Move]) -> Option<Player> {
    moves.last().map(|mv| mv.player.opponent())
}

fn check_move(moves: &[Move], position: Position, player: Player) -> Result<(), GameError> {
    let index = position.index().ok_or(GameError::OffBoard(position))?;
    if moves.len() >= CELL_COUNT {
        return Err(GameError::BoardFull);
    }
    if moves.iter().any(|mv| mv.position.index() == Some(index)) {
        return Err(GameError::Occupied(position));
    }
    if moves.last().is_some_and(|mv| mv.player == player) {
        return Err(GameError::OutOfTurn(player));
    }
    Ok(())
}

/// Checks whether `player` may play at `position` after `moves`: the board
/// is not full, the cell is free and `player` did not make the previous
/// move.
#[must_use]
pub fn is_move_allowed(moves: &[Move], position: Position, player: Player) -> bool {
    check_move(moves, position, player).is_ok()
}

/// Outcome of a game so far.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won(Player),
    Draw,
}

/// Game with all its state. The board is derived from the move history.
#[derive(Debug, PartialEq, Clone, Eq, Default)]
pub struct Game {
    moves: Vec<Move>,
}

impl Game {
    #[must_use]
    pub const fn new() -> Self {
        Self { moves: Vec::new() }
    }

    /// Replays a move history, validating every move.
    pub fn from_moves(moves: &[Move]) -> Result<Self, GameError> {
        let mut game = Self::new();
        for &mv in moves {
            game.play(mv)?;
        }
        Ok(game)
    }

    pub fn play(&mut self, mv: Move) -> Result<GameStatus, GameError> {
        if self.status() != GameStatus::InProgress {
            return Err(GameError::GameOver);
        }
        check_move(&self.moves, mv.position, mv.player)?;
        self.moves.push(mv);

        let status = self.status();
        tracing::debug!(player = %mv.player, position = %mv.position, ?status, "move played");
        Ok(status)
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn board(&self) -> Board {
        build_board(&self.moves)
    }

    #[must_use]
    pub fn next_player(&self) -> Option<Player> {
        next_player(&self.moves)
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        let board = self.board();
        match winner(&board) {
            Some(player) => GameStatus::Won(player),
            None if board.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(player: Player, x: i32, y: i32) -> Move {
        Move::new(player, Position::new(x, y))
    }

    /// X wins the top row.
    fn x_wins_top_row() -> Vec<Move> {
        vec![
            mv(Player::X, 0, 0),
            mv(Player::O, 0, 1),
            mv(Player::X, 1, 0),
            mv(Player::O, 1, 1),
            mv(Player::X, 2, 0),
        ]
    }

    fn drawn_game() -> Vec<Move> {
        // X O X
        // X O O
        // O X X
        vec![
            mv(Player::X, 0, 0),
            mv(Player::O, 1, 0),
            mv(Player::X, 2, 0),
            mv(Player::O, 1, 1),
            mv(Player::X, 0, 1),
            mv(Player::O, 2, 1),
            mv(Player::X, 1, 2),
            mv(Player::O, 0, 2),
            mv(Player::X, 2, 2),
        ]
    }

    #[test]
    fn test_position_index() {
        assert_eq!(Position::new(0, 0).index(), Some(0));
        assert_eq!(Position::new(2, 0).index(), Some(2));
        assert_eq!(Position::new(0, 1).index(), Some(3));
        assert_eq!(Position::new(2, 2).index(), Some(8));
        assert_eq!(Position::new(3, 0).index(), None);
        assert_eq!(Position::new(0, -1).index(), None);
        assert_eq!(Position::OFF_BOARD.index(), None);

        for index in 0..CELL_COUNT {
            assert_eq!(Position::from_index(index).unwrap().index(), Some(index));
        }
        assert_eq!(Position::from_index(CELL_COUNT), None);
    }

    #[test]
    fn test_all_positions_row_major() {
        let all = Position::all().collect::<Vec<_>>();
        assert_eq!(all.len(), CELL_COUNT);
        assert_eq!(all[0], Position::new(0, 0));
        assert_eq!(all[1], Position::new(1, 0));
        assert_eq!(all[3], Position::new(0, 1));
        for (index, position) in all.iter().enumerate() {
            assert_eq!(position.index(), Some(index));
        }
    }

    #[test]
    fn test_get_set_off_board() {
        let mut board = Board::new();
        assert!(!board.set(Position::OFF_BOARD, Some(Player::X)));
        assert!(!board.set(Position::new(3, 1), Some(Player::X)));
        assert!(!board.set(Position::new(1, 3), Some(Player::O)));
        assert_eq!(board, Board::new());

        assert_eq!(board.get(Position::OFF_BOARD), None);
        assert_eq!(board.get(Position::new(-1, 0)), None);
        assert!(!board.is_empty_at(Position::new(5, 5)));

        assert!(board.set(Position::new(2, 1), Some(Player::O)));
        assert_eq!(board.get(Position::new(2, 1)), Some(Player::O));
        assert_eq!(board.cells()[1][2], Some(Player::O));
        assert!(board.set(Position::new(2, 1), None));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_build_board() {
        let moves = x_wins_top_row();
        let board = build_board(&moves);
        assert_eq!(board.get(Position::new(0, 0)), Some(Player::X));
        assert_eq!(board.get(Position::new(1, 1)), Some(Player::O));
        assert_eq!(board.get(Position::new(2, 2)), None);
        assert_eq!(board.occupied_count(), moves.len());
        assert!(!board.is_full());

        assert!(build_board(&drawn_game()).is_full());
    }

    #[test]
    fn test_build_board_later_move_overwrites() {
        let board = build_board(&[mv(Player::X, 1, 1), mv(Player::O, 1, 1)]);
        assert_eq!(board.get(Position::new(1, 1)), Some(Player::O));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_build_board_counts_every_move() {
        // All alternating histories without repetitions up to four plies,
        // for both opening players.
        fn walk(moves: &mut Vec<Move>, player: Player, remaining: usize) {
            assert_eq!(build_board(moves).occupied_count(), moves.len());
            if remaining == 0 {
                return;
            }
            for position in Position::all() {
                if is_move_allowed(moves, position, player) {
                    moves.push(Move::new(player, position));
                    walk(moves, player.opponent(), remaining - 1);
                    moves.pop();
                }
            }
        }

        walk(&mut Vec::new(), Player::X, 4);
        walk(&mut Vec::new(), Player::O, 4);
    }

    #[test]
    fn test_empty_positions() {
        let board = build_board(&[mv(Player::X, 0, 0), mv(Player::O, 1, 1)]);
        let empty = board.empty_positions().collect::<Vec<_>>();
        assert_eq!(empty.len(), 7);
        assert!(!empty.contains(&Position::new(0, 0)));
        assert!(!empty.contains(&Position::new(1, 1)));
        assert_eq!(empty[0], Position::new(1, 0));

        assert_eq!(build_board(&drawn_game()).empty_positions().count(), 0);
    }

    #[test]
    fn test_is_move_allowed() {
        let moves = [mv(Player::X, 1, 1)];
        assert!(is_move_allowed(&moves, Position::new(0, 0), Player::O));
        // occupied
        assert!(!is_move_allowed(&moves, Position::new(1, 1), Player::O));
        // same player twice
        assert!(!is_move_allowed(&moves, Position::new(0, 0), Player::X));
        // off board
        assert!(!is_move_allowed(&moves, Position::OFF_BOARD, Player::O));
        assert!(!is_move_allowed(&moves, Position::new(3, 0), Player::O));
    }

    #[test]
    fn test_is_move_allowed_anybody_opens() {
        assert!(is_move_allowed(&[], Position::new(1, 1), Player::X));
        assert!(is_move_allowed(&[], Position::new(1, 1), Player::O));
    }

    #[test]
    fn test_is_move_allowed_full_board() {
        let moves = drawn_game();
        for position in Position::all() {
            assert!(!is_move_allowed(&moves, position, Player::O));
            assert!(!is_move_allowed(&moves, position, Player::X));
        }
        assert_eq!(
            check_move(&moves, Position::new(0, 0), Player::O),
            Err(GameError::BoardFull)
        );
    }

    #[test]
    fn test_next_player() {
        assert_eq!(next_player(&[]), None);
        assert_eq!(next_player(&[mv(Player::O, 0, 0)]), Some(Player::X));
        assert_eq!(next_player(&x_wins_top_row()), Some(Player::O));
    }

    #[test]
    fn test_game_play() {
        let mut game = Game::new();
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.next_player(), None);

        assert_eq!(game.play(mv(Player::X, 1, 1)), Ok(GameStatus::InProgress));
        assert_eq!(
            game.play(mv(Player::O, 1, 1)),
            Err(GameError::Occupied(Position::new(1, 1)))
        );
        assert_eq!(
            game.play(mv(Player::X, 0, 0)),
            Err(GameError::OutOfTurn(Player::X))
        );
        assert_eq!(
            game.play(mv(Player::O, 3, 3)),
            Err(GameError::OffBoard(Position::new(3, 3)))
        );
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.next_player(), Some(Player::O));
    }

    #[test]
    fn test_game_over() {
        let mut game = Game::from_moves(&x_wins_top_row()).unwrap();
        assert_eq!(game.status(), GameStatus::Won(Player::X));
        assert_eq!(game.play(mv(Player::O, 2, 2)), Err(GameError::GameOver));

        let game = Game::from_moves(&drawn_game()).unwrap();
        assert_eq!(game.status(), GameStatus::Draw);
    }

    #[test]
    fn test_game_from_invalid_moves() {
        assert_eq!(
            Game::from_moves(&[mv(Player::X, 0, 0), mv(Player::X, 1, 0)]),
            Err(GameError::OutOfTurn(Player::X))
        );
    }

    #[test]
    fn test_parse_player() {
        assert_eq!("x".parse::<Player>(), Ok(Player::X));
        assert_eq!(" O ".parse::<Player>(), Ok(Player::O));
        assert!("z".parse::<Player>().is_err());
    }

    #[test]
    fn test_display_board() {
        let board = build_board(&[mv(Player::X, 0, 0), mv(Player::O, 2, 2)]);
        assert_eq!(board.to_string(), "X|2|3\n-+-+-\n4|5|6\n-+-+-\n7|8|O");
    }

    #[test]
    fn test_move_json() {
        let moves = [mv(Player::X, 1, 1), mv(Player::O, 0, 2)];
        let json = serde_json::to_string(&moves).unwrap();
        assert_eq!(
            json,
            r#"[{"player":"X","position":{"x":1,"y":1}},{"player":"O","position":{"x":0,"y":2}}]"#
        );
        let parsed: Vec<Move> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, moves);
    }
}
