mod jellyfin;
mod plex;

pub use jellyfin::JellyfinNotifier;
pub use plex::PlexNotifier;

use library::Settings;
use playsync_model::notify::{self, Notifier};
use std::sync::Arc;

pub type DynNotifier = Arc<dyn Notifier>;

pub(crate) fn http_error(err: reqwest::Error) -> notify::Error {
    notify::Error::Http(Box::new(err))
}

/// Notifiers for every media server with complete credentials.
pub fn from_settings(settings: &Settings, client: &Arc<reqwest::Client>) -> Vec<DynNotifier> {
    let mut notifiers: Vec<DynNotifier> = Vec::new();
    if settings.has_plex() {
        notifiers.push(Arc::new(PlexNotifier::new(
            Arc::clone(client),
            &settings.plex_address,
            &settings.plex_token,
            &settings.plex_library_name,
        )));
    }
    if settings.has_jellyfin() {
        notifiers.push(Arc::new(JellyfinNotifier::new(
            Arc::clone(client),
            &settings.jellyfin_address,
            &settings.jellyfin_token,
        )));
    }
    notifiers
}

/// Asks every notifier to rescan; failures are logged and do not affect
/// the others. Returns the number of successful refreshes.
pub async fn refresh_all(notifiers: &[DynNotifier]) -> usize {
    let mut refreshed = 0;
    for notifier in notifiers {
        tracing::info!(server = notifier.name(), "attempting library refresh");
        match notifier.refresh().await {
            Ok(()) => {
                tracing::info!(server = notifier.name(), "library scan started");
                refreshed += 1;
            }
            Err(err) => {
                tracing::error!(server = notifier.name(), "library refresh failed: {}", err)
            }
        }
    }
    refreshed
}
