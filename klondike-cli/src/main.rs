mod deck;
mod display;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;

use klondike_astar::{SolveCode, solve};
use klondike_game::{CardDeck, FULL_LOOKAHEAD, Game, STOCK, WASTE, expand_moves, move_count,
    numbered_deal};

use crate::deck::{load_deals, parse_deck_arg};
use crate::display::{game_diagram, game_diagram_pysol, move_info, moves_made};

#[derive(Parser)]
#[command(author, version, about = "Solves games of Klondike (Patience) solitaire minimally.")]
struct Cli {
    /// Cards to draw from the stock per move (1-12)
    #[arg(short, long, default_value_t = 1, value_name = "NUM")]
    draw: usize,
    /// Deck to solve: 52 card strings, or the numeric deal format
    #[arg(short = 'k', long, value_name = "DECK")]
    deck: Option<String>,
    /// Seed for a reproducible random deal
    #[arg(short, long, value_name = "SEED")]
    game: Option<u32>,
    /// File of deals to solve, one per line (Pysol blocks allowed)
    file: Option<PathBuf>,
    /// Give up when the move tree holds this many moves
    #[arg(short = 's', long, default_value_t = 12_000_000, value_name = "NUM")]
    move_tree_limit: usize,
    /// Worker threads; 0 means one per hardware thread
    #[arg(short, long, default_value_t = 0, value_name = "NUM")]
    threads: usize,
    /// Talon look-ahead cap, 1-24. Lower is faster but may miss
    /// minimal solutions or even solvable deals
    #[arg(short, long, value_name = "NUM")]
    fast: Option<usize>,
    /// How many times the waste pile may be recycled
    #[arg(long, value_name = "NUM")]
    recycles: Option<u32>,
    /// Output style: 0 plain diagram, 1 Pysol, 2 minimal
    #[arg(short, long, default_value_t = 0, value_name = "STYLE")]
    out: u8,
    /// Replay the solution, diagram by diagram
    #[arg(short, long)]
    replay: bool,
    /// Print the compact list of moves made
    #[arg(short, long)]
    moves: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !(1..=12).contains(&cli.draw) {
        bail!("Please specify a valid draw count from 1 to 12.");
    }
    if cli.out > 2 {
        bail!("You must specify a valid output style: 0, 1, or 2.");
    }
    let lookahead = match cli.fast {
        None => FULL_LOOKAHEAD,
        Some(limit) if (1..=24).contains(&limit) => limit,
        Some(_) => bail!("The fast option takes a look-ahead from 1 to 24."),
    };
    let recycle_limit = cli.recycles.unwrap_or(u32::MAX);

    let decks = gather_decks(&cli)?;
    for deck in decks {
        let game = Game::with_limits(deck, cli.draw, lookahead, recycle_limit);
        run_deal(&cli, game)?;
    }
    Ok(())
}

fn gather_decks(cli: &Cli) -> Result<Vec<CardDeck>> {
    let sources =
        cli.deck.is_some() as usize + cli.game.is_some() as usize + cli.file.is_some() as usize;
    if sources != 1 {
        bail!("Specify exactly one deal source: --deck, --game, or a file.");
    }
    if let Some(deck) = &cli.deck {
        Ok(vec![parse_deck_arg(deck)?])
    } else if let Some(seed) = cli.game {
        Ok(vec![numbered_deal(seed)])
    } else {
        let path = cli.file.as_ref().unwrap();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not open file \"{}\"", path.display()))?;
        let decks = load_deals(&content)?;
        if decks.is_empty() {
            bail!("No deals found in \"{}\"", path.display());
        }
        Ok(decks)
    }
}

fn run_deal(cli: &Cli, game: Game) -> Result<()> {
    match cli.out {
        0 => println!("{}\n", game_diagram(&game)),
        1 => println!("{}\n", game_diagram_pysol(&game)),
        _ => {}
    }

    let start = Instant::now();
    let result = solve(&game, cli.move_tree_limit, cli.threads);
    let n_moves = move_count(&result.solution);
    let solved = match result.code {
        SolveCode::SolvedMinimal => {
            print!("Minimal solution in {n_moves} moves + 21 flips.");
            true
        }
        SolveCode::Solved => {
            print!("Solved in {n_moves} moves + 21 flips.");
            true
        }
        SolveCode::Impossible => {
            print!("Impossible.");
            false
        }
        SolveCode::GaveUp => {
            print!("Unknown.");
            false
        }
        SolveCode::MemoryExceeded => {
            print!("Memory exceeded.");
            false
        }
    };
    let elapsed = start.elapsed();
    println!(
        "\nTook {:.3} sec. {:.4} million unique states, {} advances.",
        elapsed.as_secs_f64(),
        result.state_count as f64 / 1e6,
        result.advances,
    );

    if cli.replay && solved && cli.out < 2 {
        let mut replay = game.clone();
        replay.deal();
        let xmoves = expand_moves(&result.solution, replay.draw_setting());
        println!("----------------------------------------");
        for xmove in &xmoves {
            let is_talon_move = xmove.to == STOCK || xmove.to == WASTE;
            println!("{}", move_info(xmove, &replay));
            replay.make_xmove(xmove);
            if !is_talon_move {
                if cli.out == 0 {
                    println!("\n{}\n", game_diagram(&replay));
                } else {
                    println!("\n{}\n", game_diagram_pysol(&replay));
                }
                println!("----------------------------------------");
            }
        }
    }
    if cli.moves && solved {
        let xmoves = expand_moves(&result.solution, game.draw_setting());
        println!("{}\n", moves_made(&xmoves));
    }
    Ok(())
}
