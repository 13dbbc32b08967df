use anyhow::Result;
use colored::Colorize;
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::cli::SourceArgs;
use crate::config::Config;
use crate::providers::{PlaceSearch, resolve_current_location};
use crate::session::{Notice, Session, SessionEvent};
use crate::submit;

use super::{Collaborators, print_links, print_notice, print_waypoints};

/// Candidates offered after a search.
const MAX_CANDIDATES: usize = 5;

/// How long a submission is waited on before returning to the menu.
const SUBMIT_WAIT: Duration = Duration::from_secs(15);

#[derive(Clone, Copy)]
enum Action {
    AddPlace,
    ShowWaypoints,
    ShowMap,
    Submit,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::AddPlace,
        Action::ShowWaypoints,
        Action::ShowMap,
        Action::Submit,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::AddPlace => "Search and add a place",
            Action::ShowWaypoints => "Show waypoints",
            Action::ShowMap => "Show map view",
            Action::Submit => "Submit addresses",
            Action::Quit => "Quit",
        })
    }
}

/// Run the interactive planning session.
pub fn run(source: &SourceArgs) -> Result<()> {
    let config = Config::load_or_default();
    let Collaborators {
        position,
        geocoder,
        search,
        backend,
        ..
    } = super::collaborators(source, &config)?;
    let search = search.ok_or_else(super::missing_search)?;

    let (events_tx, events) = mpsc::channel();

    // The current location resolves in the background; whenever it lands it
    // goes in front of whatever was selected in the meantime.
    let tx = events_tx.clone();
    thread::spawn(move || {
        let result = resolve_current_location(&*position, &*geocoder);
        let _ = tx.send(SessionEvent::CurrentLocation(result));
    });

    let mut session = Session::new();
    println!(
        "{}",
        "Add places to your route. The most recent one is listed first.".bold()
    );

    loop {
        drain(&mut session, &events);

        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::AddPlace => {
                drain(&mut session, &events);
                if let Some(event) = pick_place(&*search)? {
                    add_selection(&mut session, &events, event);
                }
            }
            Action::ShowWaypoints => {
                print_waypoints(&session);
                if !session.route_links().is_empty() {
                    print_links(session.route_links());
                }
            }
            Action::ShowMap => {
                let map = session.map();
                let marker = match map.marker().position() {
                    Some(at) => format!("marker at {at}"),
                    None => "no marker".to_string(),
                };
                println!("Map {}, {marker}", map.viewport());
                println!("  {}", map.view_link());
            }
            Action::Submit => {
                let snapshot = session.waypoints().snapshot();
                let backend = backend.clone();
                let tx = events_tx.clone();
                println!("Submitting {} address(es)...", snapshot.len());
                thread::spawn(move || {
                    let result = submit::submit(&*backend, &snapshot);
                    let _ = tx.send(SessionEvent::Submitted {
                        sent: snapshot.len(),
                        result,
                    });
                });
                wait_for_submission(&mut session, &events);
                if !session.debug_info().is_empty() {
                    println!("{}", session.debug_info().dimmed());
                }
            }
            Action::Quit => break,
        }
    }

    drain(&mut session, &events);
    println!();
    print_waypoints(&session);
    Ok(())
}

/// Apply every event that has already arrived.
fn drain(session: &mut Session, events: &Receiver<SessionEvent>) {
    for event in events.try_iter() {
        print_notice(&session.apply(event));
    }
}

/// Apply a user selection after anything that arrived while the prompt was open.
fn add_selection(session: &mut Session, events: &Receiver<SessionEvent>, event: SessionEvent) {
    drain(session, events);
    print_notice(&session.apply(event));
}

/// Apply events until a submission result arrives or the wait runs out.
fn wait_for_submission(session: &mut Session, events: &Receiver<SessionEvent>) {
    let deadline = Instant::now() + SUBMIT_WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(event) => {
                let done = matches!(event, SessionEvent::Submitted { .. });
                print_notice(&session.apply(event));
                if done {
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                println!(
                    "{}",
                    "Still waiting for the backend; the links will show up when it answers."
                        .yellow()
                );
                return;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Ask for a query and let the user choose among the candidates.
fn pick_place(search: &dyn PlaceSearch) -> Result<Option<SessionEvent>> {
    let query = match Text::new("Search:")
        .with_placeholder("Enter a location")
        .prompt()
    {
        Ok(query) => query,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }

    let mut candidates = match search.search(query) {
        Ok(candidates) => candidates,
        Err(e) => {
            println!("{}", format!("Search failed: {e}").red());
            return Ok(None);
        }
    };
    candidates.truncate(MAX_CANDIDATES);

    let selection = match candidates.len() {
        0 => {
            println!("{}", format!("No results for '{query}'").yellow());
            return Ok(None);
        }
        1 => candidates.remove(0),
        _ => match Select::new("Pick a place:", candidates).prompt() {
            Ok(selection) => selection,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        },
    };
    Ok(Some(SessionEvent::SearchSelection(selection)))
}
