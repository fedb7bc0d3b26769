use crate::prelude::{eprintln, *};
use crate::session::{PendingGeneration, Session};
use crate::sinks::{PanelSink, ResultSink};
use codexr_core::interpret::GenerationResult;
use codexr_core::mode::Mode;
use codexr_core::panel::{parse_inbound, Inbound};
use codexr_core::prompt::GenerationRequest;
use codexr_core::sequence::Ticket;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, clap::Parser)]
#[command(name = "panel")]
#[command(about = "Serve the editor panel protocol as JSON lines on stdio")]
pub struct App {}

type Completion = (Ticket, Mode, std::result::Result<GenerationResult, Error>);

pub async fn run(_app: App, global: crate::Global) -> Result<()> {
    let mut session = crate::build_session(&global)?;

    if global.verbose {
        eprintln!("Starting CodeXR panel session on stdio...");
        eprintln!("Model: {}", session.settings().model);
        eprintln!();
    }

    let reader = BufReader::new(tokio::io::stdin());
    serve(&mut session, reader, std::io::stdout(), global.verbose).await?;

    Ok(())
}

/// Process panel messages from `reader` until EOF, writing replies to
/// `writer`.
///
/// Each `generate` runs as its own task. Issuing a new one aborts the one in
/// flight, and any result that arrives for a superseded request is dropped.
/// At EOF the request still in flight is awaited before returning.
pub async fn serve<R, W>(session: &mut Session, reader: R, writer: W, verbose: bool) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut sink = PanelSink::new(writer);
    let mut lines = reader.split(b'\n');
    let mut inflight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            segment = lines.next_segment() => {
                let Some(bytes) = segment? else {
                    if let Some(handle) = inflight.take() {
                        let _ = handle.await;
                    }
                    while let Ok(done) = rx.try_recv() {
                        deliver(session, &mut sink, done)?;
                    }
                    break;
                };

                let line = match String::from_utf8(bytes) {
                    Ok(line) => line,
                    Err(e) => {
                        sink.fail(&f!("Invalid message: {e}"))?;
                        continue;
                    }
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if verbose {
                    eprintln!("Received: {trimmed}");
                }

                match parse_inbound(trimmed) {
                    Err(e) => sink.fail(&f!("Invalid message: {e}"))?,
                    Ok(Inbound::InsertLast) => {
                        session.insert_last(&mut sink)?;
                    }
                    Ok(Inbound::Generate { mode, text, context }) => {
                        let context = context.filter(|c| !c.is_empty());
                        let PendingGeneration { ticket, mode, future } =
                            session.start(GenerationRequest::new(mode, text, context));

                        if let Some(previous) = inflight.take() {
                            previous.abort();
                        }

                        let tx = tx.clone();
                        inflight = Some(tokio::spawn(async move {
                            let outcome = future.await;
                            let _ = tx.send((ticket, mode, outcome));
                        }));
                    }
                }
            }
            Some(done) = rx.recv() => deliver(session, &mut sink, done)?,
        }
    }

    Ok(sink.into_inner())
}

fn deliver<W: Write>(session: &mut Session, sink: &mut PanelSink<W>, done: Completion) -> Result<()> {
    let (ticket, mode, outcome) = done;

    match session.finish(ticket, outcome) {
        None => Ok(()),
        Some(Ok(result)) => sink.show(mode, &result),
        Some(Err(err)) => sink.fail(&err.to_string()),
    }
}
