//! Text rendering of the interaction state and of settled operations.

use std::io::Write;

use colored::Colorize;
use interaction::{InteractionState, Operation, SearchOutcome, StateView};
use vector_api::{FailureKind, VectorApiError};

use crate::error_handler::CommandError;

/// What an in-flight operation settled to.
#[derive(Debug)]
pub enum Completion {
    Insert(Result<(), VectorApiError>),
    Search(Result<SearchOutcome, VectorApiError>),
}

pub fn banner<W: Write>(out: &mut W, endpoint: &str) -> std::io::Result<()> {
    writeln!(out, "{} {}", "notes".bold(), format!("→ {endpoint}").dimmed())?;
    writeln!(out, "type `help` for commands")
}

pub fn help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "  insert <text>   store a note (`insert` alone resends the draft)")?;
    writeln!(out, "  search <query>  find similar notes (`search` alone reruns the query)")?;
    writeln!(out, "  top <n>         results per search")?;
    writeln!(out, "  results         show the last results")?;
    writeln!(out, "  status          drafts, pending requests, last errors")?;
    writeln!(out, "  quit")
}

pub fn pending<W: Write>(out: &mut W, operation: Operation) -> std::io::Result<()> {
    let label = match operation {
        Operation::Insert => "inserting...",
        Operation::Search => "searching...",
    };
    writeln!(out, "{}", label.dimmed())
}

pub fn command_error<W: Write>(out: &mut W, err: &CommandError) -> std::io::Result<()> {
    writeln!(out, "{} {err}", "?".yellow())
}

pub fn completion<W: Write>(
    out: &mut W,
    state: &InteractionState,
    done: &Completion,
) -> std::io::Result<()> {
    match done {
        Completion::Insert(Ok(())) => writeln!(out, "{} stored", "✓".green()),
        Completion::Insert(Err(err)) => {
            failure(out, "insert", err)?;
            if err.kind() != FailureKind::Invalid {
                writeln!(out, "  draft kept; type `insert` to retry")?;
            }
            Ok(())
        }
        Completion::Search(Ok(SearchOutcome::Applied { hits, .. })) => {
            let noun = if *hits == 1 { "match" } else { "matches" };
            writeln!(out, "{} {hits} {noun}", "✓".green())?;
            results(out, state)
        }
        Completion::Search(Ok(SearchOutcome::Superseded { seq })) => writeln!(
            out,
            "{}",
            format!("(answer to search #{seq} arrived late and was dropped)").dimmed()
        ),
        Completion::Search(Err(err)) => {
            failure(out, "search", err)?;
            if !state.results().is_empty() {
                writeln!(out, "  previous results kept; type `results` to see them")?;
            }
            Ok(())
        }
    }
}

fn failure<W: Write>(out: &mut W, what: &str, err: &VectorApiError) -> std::io::Result<()> {
    writeln!(out, "{} {what} failed: {}", "✗".red(), err.user_message())
}

pub fn results<W: Write>(out: &mut W, state: &InteractionState) -> std::io::Result<()> {
    if state.results().is_empty() {
        return writeln!(out, "  {}", "no matches".dimmed());
    }
    for (i, record) in state.results().iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {}  {}",
            i + 1,
            record.text,
            format!("#{}", record.id).dimmed()
        )?;
    }
    Ok(())
}

pub fn status<W: Write>(out: &mut W, state: &StateView<'_>) -> std::io::Result<()> {
    writeln!(out, "  draft text : {:?}", state.draft_text())?;
    writeln!(out, "  draft query: {:?}", state.draft_query())?;
    writeln!(
        out,
        "  busy       : insert={} search={}",
        state.insert_busy(),
        state.search_busy()
    )?;
    writeln!(out, "  results    : {}", state.results().len())?;
    for op in [Operation::Insert, Operation::Search] {
        if let Some(notice) = state.notice(op) {
            writeln!(out, "  last {:?} error: {}", op, notice.message.red())?;
        }
    }
    Ok(())
}
