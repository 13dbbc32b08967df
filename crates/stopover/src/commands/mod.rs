pub mod completion;
pub mod config;
pub mod plan;
pub mod route;

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use crate::cli::SourceArgs;
use crate::config::Config;
use crate::links::LocalBackend;
use crate::map_sync::{Marker, SyncUpdate};
use crate::place::SourceKind;
use crate::providers::geolocation::{CoordinateLabel, FixedPosition, NoPosition};
use crate::providers::google::GoogleMaps;
use crate::providers::selections::SelectionFile;
use crate::providers::{GeolocationProvider, PlaceSearch, ReverseGeocoder};
use crate::session::{Notice, Session};
use crate::submit::{HttpBackend, RouteBackend, RouteLink};

/// The external services a session talks to, picked from flags and config.
pub struct Collaborators {
    pub position: Box<dyn GeolocationProvider + Send>,
    pub geocoder: Box<dyn ReverseGeocoder + Send>,
    pub search: Option<Box<dyn PlaceSearch>>,
    pub selections: Option<SelectionFile>,
    pub backend: Arc<dyn RouteBackend + Send + Sync>,
}

impl Collaborators {
    pub fn search(&self) -> Result<&dyn PlaceSearch> {
        self.search.as_deref().ok_or_else(missing_search)
    }
}

pub fn missing_search() -> anyhow::Error {
    anyhow::anyhow!(
        "No place search available.\n\
         \n\
         Set a Google Maps API key:\n\
         \n\
         \x20 stopover config set google.api_key \"your-key\"   # or GOOGLE_MAPS_API_KEY\n\
         \n\
         or pass --selections FILE to search recorded places."
    )
}

pub fn collaborators(args: &SourceArgs, config: &Config) -> Result<Collaborators> {
    let google = if args.offline {
        None
    } else {
        config.google_api_key().map(GoogleMaps::new)
    };

    let position: Box<dyn GeolocationProvider + Send> = match args.at.or(config.home) {
        Some(at) => Box::new(FixedPosition(at)),
        None => Box::new(NoPosition::new(
            "no position given (use --at LAT,LNG or `stopover config set home LAT,LNG`)",
        )),
    };

    let geocoder: Box<dyn ReverseGeocoder + Send> = match &google {
        Some(google) => Box::new(google.clone()),
        None => {
            log::info!("No geocoder configured; labelling the current location by coordinates");
            Box::new(CoordinateLabel)
        }
    };

    let selections = args
        .selections
        .as_deref()
        .map(SelectionFile::load)
        .transpose()?;

    let search: Option<Box<dyn PlaceSearch>> = match (&selections, google) {
        (Some(file), _) => Some(Box::new(file.clone())),
        (None, Some(google)) => Some(Box::new(google)),
        (None, None) => None,
    };

    let backend: Arc<dyn RouteBackend + Send + Sync> = if args.offline {
        Arc::new(LocalBackend)
    } else {
        let url = args
            .backend
            .clone()
            .unwrap_or_else(|| config.backend_url());
        Arc::new(HttpBackend::new(&url))
    };

    Ok(Collaborators {
        position,
        geocoder,
        search,
        selections,
        backend,
    })
}

pub fn print_notice(notice: &Notice) {
    match notice {
        Notice::Seeded(place, update) => {
            println!("{} {}", "Current location:".green(), place.formatted_address);
            print_map_update(update);
        }
        Notice::SeedSkipped(reason) => {
            println!(
                "{}",
                format!("Current location not added: {reason}").dimmed()
            );
        }
        Notice::Added(place, update) => {
            println!("{} {}", "Added".green().bold(), place.formatted_address);
            print_map_update(update);
        }
        Notice::Rejected(e) => println!("{}", e.to_string().yellow()),
        Notice::Routed(links) => print_links(links),
        Notice::SubmissionFailed(e) => println!("{}", format!("Submission failed: {e}").red()),
    }
}

fn print_map_update(update: &SyncUpdate) {
    let marker = match update.marker_steps.last().and_then(Marker::position) {
        Some(at) => format!(", marker at {at}"),
        None => String::new(),
    };
    println!("  {}", format!("map {}{marker}", update.viewport).dimmed());
}

pub fn print_waypoints(session: &Session) {
    let waypoints = session.waypoints();
    if waypoints.is_empty() {
        println!("{}", "No waypoints yet.".yellow());
        return;
    }
    println!(
        "{} {}",
        "Formatted Address".bold(),
        format!("({})", waypoints.len()).dimmed()
    );
    for (i, place) in waypoints.iter().enumerate() {
        let marker = match place.source_kind {
            SourceKind::CurrentLocation => format!(" ({})", place.display_name).dimmed().to_string(),
            SourceKind::SearchResult => String::new(),
        };
        println!("{:>3}. {}{marker}", i + 1, place.formatted_address);
    }
    if !waypoints.is_seeded() {
        println!("  {}", "(current location not added)".dimmed());
    }
}

pub fn print_links(links: &[RouteLink]) {
    if links.is_empty() {
        println!(
            "{}",
            "No route links returned (a route needs at least two distinct places).".yellow()
        );
        return;
    }
    println!("{}", "View route on Google Maps:".green().bold());
    for link in links {
        println!("  {}", link.as_str().underline());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::LatLng;

    #[test]
    fn test_offline_collaborators_need_no_services() {
        let args = SourceArgs {
            at: Some(LatLng::new(40.7, -74.0)),
            offline: true,
            ..Default::default()
        };
        let collab = collaborators(&args, &Config::default()).unwrap();
        assert!(collab.search.is_none());
        assert!(collab.search().is_err());
        assert_eq!(collab.backend.describe(), "local route builder");

        let here = collab.position.current_position().unwrap();
        let raw = collab.geocoder.reverse(here).unwrap();
        assert_eq!(raw.formatted_address.as_deref(), Some("40.70000, -74.00000"));
    }

    #[test]
    fn test_backend_flag_overrides_config() {
        let args = SourceArgs {
            backend: Some("http://127.0.0.1:9000".to_string()),
            ..Default::default()
        };
        let collab = collaborators(&args, &Config::default()).unwrap();
        assert_eq!(collab.backend.describe(), "http://127.0.0.1:9000/places");
    }

    #[test]
    fn test_home_is_used_without_at() {
        let mut config = Config::default();
        config.home = Some(LatLng::new(1.0, 2.0));
        let collab = collaborators(&SourceArgs::default(), &config).unwrap();
        assert_eq!(collab.position.current_position().unwrap(), LatLng::new(1.0, 2.0));
    }
}
