//! Terminal play loop.

use crate::session::GameSession;
use bonus_tictactoe::{Board, GameView, Outcome, Phase, Position};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument};

const HELP: &str = "Enter a cell 0-8 (or a name like \"center\"), r to restart, q to quit.";

/// Reads commands from `input` until `q` or end of input.
#[instrument(skip_all, fields(chat_id = session.chat_id()))]
pub async fn run<R, W>(session: &GameSession, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", HELP)?;
    render(&session.view(), out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        debug!(command, "Read command");
        match command {
            "" => continue,
            "q" | "quit" => break,
            "r" | "reset" => {
                let view = session.reset();
                writeln!(out, "New game.")?;
                render(&view, out)?;
            }
            other => {
                let Some(position) = Position::from_label_or_number(other) else {
                    writeln!(out, "{}", HELP)?;
                    continue;
                };
                match session.human_move(position.to_index()) {
                    Ok(view) if view.phase == Phase::AwaitingComputerMove => {
                        writeln!(out, "Computer is thinking...")?;
                        render(&session.settle().await, out)?;
                    }
                    Ok(view) => render(&view, out)?,
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
        }
    }
    Ok(())
}

/// Writes the board and a status line.
pub fn render<W: Write>(view: &GameView, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", Board::from_cells(view.cells).display())?;
    writeln!(out, "{}", status_line(view))
}

fn status_line(view: &GameView) -> String {
    match view.phase {
        Phase::AwaitingHumanMove => "Your move (X).".to_string(),
        Phase::AwaitingComputerMove => "Computer to move.".to_string(),
        Phase::Concluded(Outcome::HumanWin) => match &view.reward_code {
            Some(code) => format!("You won! Your promo code: {}. Press r to play again.", code),
            None => "You won! Press r to play again.".to_string(),
        },
        Phase::Concluded(Outcome::ComputerWin) => {
            "Computer wins. Press r to try again.".to_string()
        }
        Phase::Concluded(_) => "Draw. Press r to try again.".to_string(),
    }
}
