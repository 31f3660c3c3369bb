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
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tictactoe_rs::{
    AiPlayer, Game, GameStatus, Move, Player, Position, find_best_move, find_best_move_parallel,
};
use tracing_subscriber::EnvFilter;

/// Play tic-tac-toe against the computer.
#[derive(Parser, Debug)]
#[command(name = "tictactoe-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive game against the computer (default)
    Play {
        /// Symbol of the human player
        #[arg(long, default_value = "x")]
        human: Player,

        /// Symbol of the player who opens the game
        #[arg(long, default_value = "x")]
        first: Player,

        /// Search the computer's moves in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Print the best move for a move history as JSON
    BestMove {
        /// Player to find the move for
        #[arg(long)]
        player: Player,

        /// Move history, e.g. '[{"player":"X","position":{"x":1,"y":1}}]'
        #[arg(long, default_value = "[]")]
        moves: String,

        /// Search in parallel
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Play {
        human: Player::X,
        first: Player::X,
        parallel: false,
    }) {
        Command::Play {
            human,
            first,
            parallel,
        } => play(human, first, parallel),
        Command::BestMove {
            player,
            moves,
            parallel,
        } => best_move(player, &moves, parallel),
    }
}

fn best_move(player: Player, moves: &str, parallel: bool) -> Result<()> {
    let moves: Vec<Move> = serde_json::from_str(moves).context("invalid move history")?;
    let result = if parallel {
        find_best_move_parallel(&moves, player).0
    } else {
        find_best_move(&moves, player)
    };
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

/// Reads a cell number (1-9) from stdin until a legal one was entered.
fn read_human_move(game: &Game, human: Player) -> Result<Position> {
    let stdin = io::stdin();
    loop {
        print!("Choose your move (cell): ");
        for position in game.board().empty_positions() {
            if let Some(index) = position.index() {
                print!("{},", index + 1);
            }
        }
        println!();
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("stdin closed");
        }

        let Some(position) = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|cell| cell.checked_sub(1))
            .and_then(Position::from_index)
        else {
            println!("Not a cell: {}", line.trim());
            continue;
        };

        if tictactoe_rs::is_move_allowed(game.moves(), position, human) {
            return Ok(position);
        }
        println!("Cell {} is taken", line.trim());
    }
}

fn play(human: Player, first: Player, parallel: bool) -> Result<()> {
    let computer = AiPlayer::new(human.opponent()).with_parallel_search(parallel);
    let mut game = Game::new();
    let mut current_player = first;

    println!("Let's play tic-tac-toe against the computer. You are {human}.");
    loop {
        println!("----------------");
        println!("{}", game.board());
        println!();

        // Human player
        let status = if current_player == human {
            let position = read_human_move(&game, human)?;
            game.play(Move::new(human, position))?
        }
        // Computer player
        else {
            let (mv, status) = computer
                .play(&mut game)?
                .context("computer found no move")?;
            let cell = mv.position.index().map_or(0, |index| index + 1);
            println!("Computer chose cell {cell}");
            status
        };

        match status {
            GameStatus::InProgress => current_player = current_player.opponent(),
            GameStatus::Won(winner) if winner == human => {
                println!("You won!");
                break;
            }
            GameStatus::Won(_) => {
                println!("Computer won!");
                break;
            }
            GameStatus::Draw => {
                println!("Gameover: draw");
                break;
            }
        }
    }

    println!("----------------");
    println!("{}", game.board());
    Ok(())
}
