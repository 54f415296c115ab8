//! Line-oriented front end for headless use.
//!
//! Each input line is a scanned payload, `manual <code>` for a typed code,
//! `list` to show the collection, or `quit`. A resolved record is printed
//! as JSON and the next line answers the review prompt (`y` saves, anything
//! else discards).

use std::io::{BufRead, Write};

use crate::core_state::{CoreError, WalletState};
use crate::models::CaptureSource;
use crate::pipeline::{AcquisitionError, CaptureOutcome, DocumentResolver, ScannedPayload};
use crate::storage::DocumentStore;

enum Command<'a> {
    Capture(CaptureSource, &'a str),
    List,
    Quit,
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    match word {
        "list" if rest.is_empty() => Some(Command::List),
        "quit" | "exit" if rest.is_empty() => Some(Command::Quit),
        "manual" => Some(Command::Capture(CaptureSource::Manual, rest)),
        // Scanner output is passed through untouched.
        _ => Some(Command::Capture(
            CaptureSource::Qr,
            line.trim_end_matches(['\r', '\n']),
        )),
    }
}

/// Run the prompt loop until `quit` or end of input.
///
/// Acquisition failures are reported and the loop continues; only I/O and
/// session errors end it.
pub async fn drive<R, S>(
    state: &WalletState<R, S>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<(), CoreError>
where
    R: DocumentResolver,
    S: DocumentStore,
{
    let pipeline = state.pipeline()?;
    writeln!(
        out,
        "Signed in as {}. Scan a code, 'manual <code>', 'list' or 'quit'.",
        pipeline.scope()
    )?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let (source, raw) = match parse_command(&line) {
            None => continue,
            Some(Command::Quit) => break,
            Some(Command::List) => {
                print_collection(state, &mut out)?;
                continue;
            }
            Some(Command::Capture(source, raw)) => (source, raw),
        };

        let payload = match ScannedPayload::new(source, raw) {
            Ok(payload) => payload,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        let record = match pipeline.capture(payload).await {
            Ok(CaptureOutcome::Reviewing(record)) => record,
            Ok(CaptureOutcome::Ignored { phase }) => {
                writeln!(out, "busy ({phase}), capture ignored")?;
                continue;
            }
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        writeln!(out, "{json}")?;
        write!(out, "Save this document? [y/N] ")?;
        out.flush()?;

        line.clear();
        let answered = input.read_line(&mut line)? > 0;
        let accepted = answered && matches!(line.trim(), "y" | "Y" | "yes");

        if accepted {
            match pipeline.confirm() {
                Ok(saved) => writeln!(out, "Saved {}", saved.id)?,
                Err(AcquisitionError::PersistFailure(e)) => {
                    writeln!(out, "error: could not save: {e}")?
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            pipeline.cancel()?;
            writeln!(out, "Discarded")?;
        }

        if !answered {
            break;
        }
    }
    Ok(())
}

fn print_collection<R, S>(state: &WalletState<R, S>, out: &mut impl Write) -> Result<(), CoreError>
where
    R: DocumentResolver,
    S: DocumentStore,
{
    let home = state.home_data()?;
    writeln!(out, "{} document(s)", home.total)?;
    for card in &home.documents {
        writeln!(
            out,
            "  {} | {} | {} | valid: {}",
            card.id, card.holder_name, card.institution, card.validity
        )?;
    }
    Ok(())
}
