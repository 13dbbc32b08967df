use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::cli::SourceArgs;
use crate::config::Config;
use crate::place::PlaceRecord;
use crate::providers::resolve_current_location;
use crate::session::{Notice, Session, SessionEvent};
use crate::submit::RouteLink;

use super::{Collaborators, print_links, print_notice, print_waypoints};

#[derive(Serialize)]
struct RouteOutput<'a> {
    waypoints: Vec<PlaceRecord>,
    route_links: &'a [RouteLink],
    map_link: String,
}

/// Run the route command.
pub fn run(queries: &[String], source: &SourceArgs, json: bool, quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let collab = super::collaborators(source, &config)?;
    let mut session = Session::new();
    let report = |notice: &Notice| {
        if !json && !quiet {
            print_notice(notice);
        }
    };

    let here = resolve_current_location(&*collab.position, &*collab.geocoder);
    report(&session.apply(SessionEvent::CurrentLocation(here)));

    for event in selection_events(queries, &collab)? {
        report(&session.apply(event));
    }

    match session.submit(&*collab.backend) {
        Notice::SubmissionFailed(e) => {
            if !json && !quiet {
                print_waypoints(&session);
            }
            Err(e).context("Could not get route links")
        }
        _ if json => {
            let output = RouteOutput {
                waypoints: session.waypoints().snapshot(),
                route_links: session.route_links(),
                map_link: session.map().view_link(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        _ => {
            if !quiet {
                println!();
                print_waypoints(&session);
                println!();
            }
            print_links(session.route_links());
            Ok(())
        }
    }
}

/// Turn the command line into selection events, in the order given.
///
/// Each query takes its best candidate. Without queries, a selections file is
/// replayed in full.
fn selection_events(queries: &[String], collab: &Collaborators) -> Result<Vec<SessionEvent>> {
    if queries.is_empty() {
        return Ok(collab
            .selections
            .iter()
            .flat_map(|file| file.selections().iter().cloned())
            .map(SessionEvent::SearchSelection)
            .collect());
    }

    let search = collab.search()?;
    let mut events = Vec::with_capacity(queries.len());
    for query in queries {
        let candidates = search
            .search(query)
            .with_context(|| format!("Search for '{query}' failed"))?;
        match candidates.into_iter().next() {
            Some(best) => events.push(SessionEvent::SearchSelection(best)),
            None => eprintln!("{}", format!("No results for '{query}'").yellow()),
        }
    }
    Ok(events)
}
