//! Static evaluation of a board.

use crate::game::{BOARD_SIZE, Board, Player, Position};

const LINE_COUNT: usize = 2 * BOARD_SIZE + 2;

/// All lines that win the game: main diagonal, anti diagonal, rows, columns.
/// Evaluation walks them in exactly this order.
const LINES: [[Position; BOARD_SIZE]; LINE_COUNT] = lines();

const fn lines() -> [[Position; BOARD_SIZE]; LINE_COUNT] {
    let mut lines = [[Position::OFF_BOARD; BOARD_SIZE]; LINE_COUNT];
    let mut i = 0;
    while i < BOARD_SIZE {
        let n = i as i32;
        let last = (BOARD_SIZE - 1 - i) as i32;
        lines[0][i] = Position::new(n, n);
        lines[1][i] = Position::new(last, n);
        let mut j = 0;
        while j < BOARD_SIZE {
            let m = j as i32;
            // row i, column i
            lines[2 + i][j] = Position::new(m, n);
            lines[2 + BOARD_SIZE + i][j] = Position::new(n, m);
            j += 1;
        }
        i += 1;
    }
    lines
}

/// Returns the owner of the first completed line, if any.
#[must_use]
pub fn winner(board: &Board) -> Option<Player> {
    LINES.iter().find_map(|line| {
        let first = board.get(line[0])?;
        line[1..]
            .iter()
            .all(|&position| board.get(position) == Some(first))
            .then_some(first)
    })
}

/// Scores `board` from the perspective of `player`: `1` if `player` has
/// completed a line, `-1` if the opponent has, `0` otherwise.
#[must_use]
pub fn evaluate(board: &Board, player: Player) -> i32 {
    match winner(board) {
        Some(owner) if owner == player => 1,
        Some(_) => -1,
        None => 0,
    }
}
