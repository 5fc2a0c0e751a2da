//! Async driver: feeds input events to a session and runs the commands it
//! hands back.
//!
//! One command runs at a time. While it is pending the driver keeps
//! receiving input, so interrupts still reach the session. A forced exit
//! drops the pending future.

use std::future::{Future, pending};
use std::pin::Pin;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;

use capshell_registry::CommandOutput;
use capshell_term::TerminalBackend;
use capshell_types::error::Result;
use capshell_types::input::{InputEvent, Key};

use crate::session::{ExitKind, ShellSession, Step};

type InFlight = Pin<Box<dyn Future<Output = Result<CommandOutput>>>>;

enum Wake {
    Input(Option<InputEvent>),
    Settled(Result<CommandOutput>),
    WindowClosed,
}

/// Run `session` until it terminates. Closing the channel counts as end of
/// input.
pub async fn run_session<B: TerminalBackend>(
    session: &mut ShellSession<B>,
    events: &mut UnboundedReceiver<InputEvent>,
) -> Result<ExitKind> {
    session.start()?;

    let mut in_flight: Option<InFlight> = None;
    let mut input_open = true;

    loop {
        let deadline = session.interrupt_deadline();
        let wake = tokio::select! {
            event = events.recv(), if input_open => Wake::Input(event),
            result = settle(&mut in_flight) => Wake::Settled(result),
            () = window(deadline) => Wake::WindowClosed,
        };

        let step = match wake {
            Wake::Input(Some(event)) => session.handle_event(event, Instant::now())?,
            Wake::Input(None) => {
                log::debug!("input channel closed");
                input_open = false;
                session.handle_event(InputEvent::Key(Key::EndOfInput), Instant::now())?
            },
            Wake::Settled(result) => {
                in_flight = None;
                session.finish(result)?
            },
            Wake::WindowClosed => {
                session.expire_interrupt(Instant::now())?;
                Step::Continue
            },
        };

        match step {
            Step::Continue => {},
            Step::Execute(command) => in_flight = Some(Box::pin(command.run())),
            Step::Terminate(kind) => {
                if in_flight.is_some() {
                    log::warn!("abandoning running command on {kind:?}");
                }
                return Ok(kind);
            },
        }
    }
}

async fn settle(in_flight: &mut Option<InFlight>) -> Result<CommandOutput> {
    match in_flight {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

async fn window(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => pending().await,
    }
}
