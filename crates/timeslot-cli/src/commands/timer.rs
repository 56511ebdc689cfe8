//! Countdown commands.
//!
//! Every command opens a session on the slot, applies one action and
//! exits. `run` keeps the process alive and drives the countdown until it
//! completes or Ctrl-C is pressed.

use clap::Subcommand;
use timeslot_core::countdown::{driver, SystemClock};
use timeslot_core::storage::CountdownConfig;
use timeslot_core::{CountdownSession, CountdownState, DriverExit, Event, SlotStore};

use crate::common::{confirm, open_service, print_event, print_json, warn_unsaved, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start {
        /// Slot ID
        id: String,
    },
    /// Pause the countdown
    Pause {
        /// Slot ID
        id: String,
    },
    /// Stop the countdown and rewind it to the full duration
    Stop {
        /// Slot ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Rewind to the full duration, paused
    Reset {
        /// Slot ID
        id: String,
    },
    /// Print the countdown state
    Status {
        /// Slot ID
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Run the countdown in the foreground until it completes
    Run {
        /// Slot ID
        id: String,
    },
}

fn unavailable(action: &str, state: CountdownState) -> Box<dyn std::error::Error> {
    let hint = if state.is_terminal() {
        " (reset it first)"
    } else {
        ""
    };
    format!("cannot {action}: timer is {state}{hint}").into()
}

pub fn run(action: TimerAction) -> CmdResult {
    let (config, service) = open_service()?;

    match action {
        TimerAction::Start { id } => {
            let mut session = service.open_session(&id, &config.countdown)?;
            let event = session.resume();
            warn_unsaved(&mut session);
            match event {
                Some(event) => print_event(&event),
                None if session.state() == CountdownState::Running => {
                    println!("already running");
                }
                None => return Err(unavailable("start", session.state())),
            }
        }
        TimerAction::Pause { id } => {
            let mut session = service.open_session(&id, &config.countdown)?;
            let event = session.pause();
            warn_unsaved(&mut session);
            match event {
                Some(event) => print_event(&event),
                None => return Err(unavailable("pause", session.state())),
            }
        }
        TimerAction::Stop { id, yes } => {
            let mut session = service.open_session(&id, &config.countdown)?;
            let Some(request) = session.request_stop() else {
                return Err(unavailable("stop", session.state()));
            };
            if !yes && !confirm("Stop the countdown? Progress will be lost.")? {
                println!("not stopped");
                return Ok(());
            }
            let event = session.confirm_stop(request);
            warn_unsaved(&mut session);
            if let Some(event) = event {
                print_event(&event);
            }
        }
        TimerAction::Reset { id } => {
            let mut session = service.open_session(&id, &config.countdown)?;
            let event = session.reset();
            warn_unsaved(&mut session);
            if let Some(event) = event {
                print_event(&event);
            }
        }
        TimerAction::Status { id, json } => {
            let session = service.open_session(&id, &config.countdown)?;
            let snapshot = session.snapshot();
            if json {
                print_json(&snapshot)?;
            } else {
                println!(
                    "{} [{}] {} left ({:.0}%), tasks {}/{}",
                    snapshot.title,
                    snapshot.state,
                    snapshot.remaining,
                    snapshot.remaining_fraction * 100.0,
                    snapshot.completed_tasks,
                    snapshot.total_tasks
                );
            }
        }
        TimerAction::Run { id } => {
            let mut session = service.open_session(&id, &config.countdown)?;
            if let Some(event) = session.resume() {
                print_event(&event);
            }
            warn_unsaved(&mut session);
            drive(&mut session, &config.countdown)?;
        }
    }
    Ok(())
}

fn drive<S: SlotStore + ?Sized>(
    session: &mut CountdownSession<'_, S>,
    config: &CountdownConfig,
) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    eprintln!(
        "{}: {} left, Ctrl-C to detach",
        session.slot().title,
        session.snapshot().remaining
    );
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let exit = runtime.block_on(async {
        driver::run(session, config, &SystemClock, shutdown, |event: &Event| {
            print_event(event)
        })
        .await
    });
    warn_unsaved(session);

    match exit {
        DriverExit::NotRunning => Err(unavailable("run", session.state())),
        DriverExit::Finished(state) => {
            eprintln!("countdown {state}");
            Ok(())
        }
        DriverExit::Shutdown => {
            eprintln!(
                "detached with {} left; `timeslot timer run {}` picks it up again",
                session.snapshot().remaining,
                session.slot().id
            );
            Ok(())
        }
    }
}
