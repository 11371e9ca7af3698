//! Line-oriented front end for the notes client.
//!
//! One logical thread reads commands and renders completions. Inserts and
//! searches run concurrently with typing: each submitted operation is pushed
//! into a `FuturesUnordered` and rendered when it settles.

mod command;
mod error_handler;
mod render;

use std::io::Write;

use futures::{FutureExt, StreamExt, future::LocalBoxFuture, stream::FuturesUnordered};
use interaction::{Operation, Session};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use vector_api::{ClientConfig, VectorApiService, VectorBackend};

pub use crate::command::Command;
pub use crate::error_handler::{CommandError, ConsoleError, ConsoleResult};
use crate::render::Completion;

/// Loads config from the environment and runs the console on stdin/stdout.
pub async fn start() -> ConsoleResult<()> {
    let cfg = ClientConfig::from_env()?;
    info!(
        endpoint = %cfg.endpoint,
        timeout_secs = cfg.timeout.as_secs(),
        top_k = cfg.default_top_k.get(),
        "starting notes console"
    );

    let endpoint = cfg.endpoint.clone();
    let top_k = cfg.default_top_k;
    let session = Session::new(VectorApiService::new(cfg)?, top_k);

    let mut stdout = std::io::stdout();
    render::banner(&mut stdout, &endpoint).map_err(ConsoleError::Output)?;

    let stdin = BufReader::new(tokio::io::stdin());
    run(&session, stdin, &mut stdout).await
}

/// Event loop: reads commands from `input` until `quit` or end of input.
///
/// On end of input the loop waits for operations still in flight and renders
/// them before returning. `quit` returns immediately.
pub async fn run<B, R, W>(session: &Session<B>, input: R, out: &mut W) -> ConsoleResult<()>
where
    B: VectorBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, Completion>> = FuturesUnordered::new();
    let mut input_open = true;

    while input_open || !in_flight.is_empty() {
        tokio::select! {
            biased;

            Some(done) = in_flight.next(), if !in_flight.is_empty() => {
                render::completion(out, &session.state(), &done).map_err(ConsoleError::Output)?;
            }

            line = lines.next_line(), if input_open => {
                let Some(line) = line.map_err(ConsoleError::Input)? else {
                    debug!(pending = in_flight.len(), "input closed");
                    input_open = false;
                    continue;
                };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Some(op) = dispatch(session, command, out)? {
                            in_flight.push(op);
                        }
                    }
                    Err(err) => render::command_error(out, &err).map_err(ConsoleError::Output)?,
                }
            }
        }
        out.flush().map_err(ConsoleError::Output)?;
    }

    Ok(())
}

/// Applies a command; returns the operation to await for insert/search.
fn dispatch<'s, B, W>(
    session: &'s Session<B>,
    command: Command,
    out: &mut W,
) -> ConsoleResult<Option<LocalBoxFuture<'s, Completion>>>
where
    B: VectorBackend,
    W: Write,
{
    let op = match command {
        Command::Insert(text) => {
            if let Some(text) = text {
                session.edit_draft_text(text);
            }
            render::pending(out, Operation::Insert).map_err(ConsoleError::Output)?;
            Some(session.submit_insert().map(Completion::Insert).boxed_local())
        }
        Command::Search(query) => {
            if let Some(query) = query {
                session.edit_draft_query(query);
            }
            render::pending(out, Operation::Search).map_err(ConsoleError::Output)?;
            Some(session.submit_search(None).map(Completion::Search).boxed_local())
        }
        Command::TopK(top_k) => {
            session.set_default_top_k(top_k);
            writeln!(out, "  top_k = {top_k}").map_err(ConsoleError::Output)?;
            None
        }
        Command::Results => {
            render::results(out, &session.state()).map_err(ConsoleError::Output)?;
            None
        }
        Command::Status => {
            render::status(out, &session.state()).map_err(ConsoleError::Output)?;
            None
        }
        Command::Help => {
            render::help(out).map_err(ConsoleError::Output)?;
            None
        }
        Command::Quit | Command::Nothing => None,
    };
    Ok(op)
}
