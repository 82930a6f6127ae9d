pub mod matching;
pub mod normalize;
pub mod notify;
pub mod orchestrate;
pub mod resolve;
pub mod scheduler;
pub mod similarity;
pub mod state;
pub mod sync;

pub use matching::{LinkMatcher, MatchPolicy};
pub use orchestrate::DownloadOrchestrator;
pub use resolve::TrackResolver;
pub use scheduler::Scheduler;
pub use state::SyncState;

use futures::future::BoxFuture;
use library::{Config, Settings, SyncList};
use matching::DynSearch;
use notify::DynNotifier;
use orchestrate::DynSink;
use playsync_model::{source, PlaylistEntry};
use resolve::DynSource;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub const SPLASH_LOGO: &str = r"
       _                                   
 _ __ | | __ _ _   _ ___ _   _ _ __   ___ 
| '_ \| |/ _` | | | / __| | | | '_ \ / __|
| |_) | | (_| | |_| \__ \ |_| | | | | (__ 
| .__/|_|\__,_|\__, |___/\__, |_| |_|\___|
|_|            |___/     |___/            
";

/// Capacity of the live-update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no song search configured")]
    MissingSearch,
    #[error("no downloader configured")]
    MissingSink,
    #[error("playlist name `{0}` does not give a usable folder name")]
    InvalidPlaylistName(String),
    #[error("config error: {0}")]
    Config(#[from] library::ConfigError),
    #[error("source error: {0}")]
    Source(#[from] source::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Published to observers after every pass and sync-list edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncListSnapshot {
    pub sync_list: SyncList,
}

pub type NotifierFactory = Arc<dyn Fn(&Settings) -> Vec<DynNotifier> + Send + Sync>;

/// Called with the saved settings after every settings update.
pub type SettingsListener = Arc<dyn Fn(Settings) -> BoxFuture<'static, ()> + Send + Sync>;

/// Owned engine context shared by the scheduler, manual triggers and the
/// command line.
#[derive(Clone)]
pub struct Engine {
    config: Arc<RwLock<Config>>,
    state: Arc<SyncState>,
    resolver: TrackResolver,
    orchestrator: DownloadOrchestrator,
    notifiers: NotifierFactory,
    settings_listeners: Vec<SettingsListener>,
    updates: broadcast::Sender<SyncListSnapshot>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("resolver", &self.resolver)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

pub struct EngineBuilder {
    config: Config,
    sources: Vec<DynSource>,
    search: Option<DynSearch>,
    sink: Option<DynSink>,
    policy: MatchPolicy,
    thread_limit: usize,
    notifiers: Option<NotifierFactory>,
    settings_listeners: Vec<SettingsListener>,
    client: Arc<reqwest::Client>,
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources: Vec::new(),
            search: None,
            sink: None,
            policy: MatchPolicy::default(),
            thread_limit: 1,
            notifiers: None,
            settings_listeners: Vec::new(),
            client: Arc::new(reqwest::Client::new()),
        }
    }

    pub fn source(mut self, source: DynSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds a Spotify source whose credentials follow the settings.
    pub fn spotify(self, client: spotify::Spotify) -> Self {
        let authenticator = Arc::clone(&client.authenticator);
        self.source(Arc::new(client)).on_settings(move |settings| {
            let authenticator = Arc::clone(&authenticator);
            Box::pin(async move {
                let creds = spotify::auth::Credentials::new(
                    &settings.spotify_client_id,
                    &settings.spotify_client_secret,
                );
                authenticator.set_credentials(creds).await;
            })
        })
    }

    pub fn on_settings(
        mut self,
        listener: impl Fn(Settings) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    ) -> Self {
        self.settings_listeners.push(Arc::new(listener));
        self
    }

    pub fn search(mut self, search: DynSearch) -> Self {
        self.search = Some(search);
        self
    }

    pub fn sink(mut self, sink: DynSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Size of both the matching and the fetching worker pool.
    pub fn thread_limit(mut self, thread_limit: usize) -> Self {
        self.thread_limit = thread_limit.max(1);
        self
    }

    pub fn client(mut self, client: Arc<reqwest::Client>) -> Self {
        self.client = client;
        self
    }

    /// Replaces how media-server notifiers are derived from the settings.
    pub fn notifiers(
        mut self,
        factory: impl Fn(&Settings) -> Vec<DynNotifier> + Send + Sync + 'static,
    ) -> Self {
        self.notifiers = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> Result<Engine, Error> {
        let search = self.search.ok_or(Error::MissingSearch)?;
        let sink = self.sink.ok_or(Error::MissingSink)?;
        let state = SyncState::new();
        let orchestrator = DownloadOrchestrator::new(
            LinkMatcher::with_policy(search, self.policy),
            sink,
            Arc::clone(&state),
            self.thread_limit,
        );
        let notifiers: NotifierFactory = match self.notifiers {
            Some(factory) => factory,
            None => {
                let client = self.client;
                Arc::new(move |settings: &Settings| notify::from_settings(settings, &client))
            }
        };
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Ok(Engine {
            config: Arc::new(RwLock::new(self.config)),
            state,
            resolver: TrackResolver::new(self.sources),
            orchestrator,
            notifiers,
            settings_listeners: self.settings_listeners,
            updates,
        })
    }
}

impl Engine {
    pub fn builder(config: Config) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn state(&self) -> &Arc<SyncState> {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncListSnapshot> {
        self.updates.subscribe()
    }

    fn publish(&self, sync_list: SyncList) {
        // no receivers is fine
        let _ = self.updates.send(SyncListSnapshot { sync_list });
    }

    pub async fn settings(&self) -> Settings {
        self.config.read().await.settings.clone()
    }

    pub async fn sync_list(&self) -> SyncList {
        self.config.read().await.sync_list.clone()
    }

    pub async fn scheduled_hours(&self) -> Vec<u32> {
        self.config.read().await.settings.sync_start_times.clone()
    }

    /// Parses and persists new sync start hours, returning the applied hours.
    pub async fn update_schedule(&self, input: &str) -> Result<Vec<u32>, Error> {
        let mut config = self.config.write().await;
        config.settings.update_schedule(input);
        config.save_settings().await?;
        Ok(config.settings.sync_start_times.clone())
    }

    /// Applies, persists and announces a settings change.
    pub async fn update_settings(&self, update: impl FnOnce(&mut Settings)) -> Result<Settings, Error> {
        let settings = {
            let mut config = self.config.write().await;
            update(&mut config.settings);
            config.settings = config.settings.clone().sanitized();
            config.save_settings().await?;
            config.settings.clone()
        };
        for listener in &self.settings_listeners {
            listener(settings.clone()).await;
        }
        Ok(settings)
    }

    async fn edit_sync_list<T>(&self, edit: impl FnOnce(&mut SyncList) -> T) -> Result<T, Error> {
        let (result, snapshot) = {
            let mut config = self.config.write().await;
            let result = edit(&mut config.sync_list);
            config.save_sync_list().await?;
            (result, config.sync_list.clone())
        };
        self.publish(snapshot);
        Ok(result)
    }

    pub async fn add_playlists(&self, entries: Vec<PlaylistEntry>) -> Result<(), Error> {
        self.edit_sync_list(|list| list.add(entries)).await
    }

    pub async fn upsert_playlist(&self, entry: PlaylistEntry) -> Result<(), Error> {
        self.edit_sync_list(|list| list.upsert(entry)).await
    }

    pub async fn remove_playlist(&self, name: &str) -> Result<Option<PlaylistEntry>, Error> {
        self.edit_sync_list(|list| list.remove(name)).await
    }

    pub async fn replace_playlists(&self, entries: Vec<PlaylistEntry>) -> Result<(), Error> {
        self.edit_sync_list(|list| list.replace(entries)).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::matching::fake::FakeSearch;
    use crate::resolve::fake::FakeSource;
    use library::Library;
    use std::path::Path;

    pub async fn config(dir: &Path) -> anyhow::Result<Config> {
        Ok(Config::open(dir.join("config"), Library::new(dir.join("download"))).await?)
    }

    pub async fn engine(dir: &Path, source: FakeSource, search: FakeSearch, sink: DynSink) -> anyhow::Result<Engine> {
        Ok(Engine::builder(config(dir).await?)
            .source(Arc::new(source))
            .search(Arc::new(search))
            .sink(sink)
            .thread_limit(2)
            .notifiers(|_| Vec::new())
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::testing;
    use super::*;
    use crate::matching::fake::FakeSearch;
    use crate::orchestrate::fake::FakeSink;
    use crate::resolve::fake::FakeSource;
    use anyhow::Result;
    use library::Persist;

    #[tokio::test]
    async fn builder_requires_search_and_sink() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = testing::config(dir.path()).await?;
        let res = Engine::builder(config.clone()).build();
        assert!(matches!(res, Err(Error::MissingSearch)));
        let res = Engine::builder(config)
            .search(Arc::new(FakeSearch::default()))
            .build();
        assert!(matches!(res, Err(Error::MissingSink)));
        Ok(())
    }

    #[tokio::test]
    async fn sync_list_edits_are_saved_and_published() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = testing::engine(
            dir.path(),
            FakeSource::default(),
            FakeSearch::default(),
            Arc::new(FakeSink::default()),
        )
        .await?;
        let mut updates = engine.subscribe();

        engine
            .add_playlists(vec![PlaylistEntry::new("Mix", "https://fake.test/mix", 0)])
            .await?;
        let snapshot = updates.recv().await?;
        assert_eq!(snapshot.sync_list.len(), 1);

        engine
            .upsert_playlist(PlaylistEntry::new("Mix", "https://fake.test/other", 5))
            .await?;
        let snapshot = updates.recv().await?;
        assert_eq!(snapshot.sync_list[0].sleep, 5);

        let saved = SyncList::load(dir.path().join("config").join(library::SYNC_LIST_FILE)).await?;
        assert_eq!(saved, snapshot.sync_list);

        assert!(engine.remove_playlist("Mix").await?.is_some());
        assert!(engine.remove_playlist("Mix").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn schedule_updates_are_saved() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = testing::engine(
            dir.path(),
            FakeSource::default(),
            FakeSearch::default(),
            Arc::new(FakeSink::default()),
        )
        .await?;
        assert_eq!(engine.update_schedule("25, -1, 9, 9").await?, vec![0, 9]);
        assert_eq!(engine.scheduled_hours().await, vec![0, 9]);
        let saved = Settings::load(dir.path().join("config").join(library::SETTINGS_FILE)).await?;
        assert_eq!(saved.sync_start_times, vec![0, 9]);
        Ok(())
    }

    #[tokio::test]
    async fn settings_updates_reach_the_spotify_authenticator() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let spotify = spotify::Spotify::new(spotify::auth::Credentials::default());
        let authenticator = Arc::clone(&spotify.authenticator);
        let engine = Engine::builder(testing::config(dir.path()).await?)
            .spotify(spotify)
            .search(Arc::new(FakeSearch::default()))
            .sink(Arc::new(FakeSink::default()))
            .notifiers(|_| Vec::new())
            .build()?;

        let settings = engine
            .update_settings(|settings| {
                settings.spotify_client_id = "client".into();
                settings.spotify_client_secret = "secret".into();
            })
            .await?;
        assert!(settings.has_spotify());
        assert_eq!(
            authenticator.credentials().await,
            spotify::auth::Credentials::new("client", "secret")
        );

        let saved = Settings::load(dir.path().join("config").join(library::SETTINGS_FILE)).await?;
        assert_eq!(saved.spotify_client_id, "client");
        Ok(())
    }
}
