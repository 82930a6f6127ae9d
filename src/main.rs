mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Command, PlaylistCommand, SettingsCommand};
use library::{Config, Library, Settings};
use playsync::{Engine, Scheduler, SPLASH_LOGO};
use playsync_model::PlaylistEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::prelude::*;

fn build_engine(opts: &cli::Opts, config: Config) -> Result<Engine> {
    let client = Arc::new(reqwest::Client::new());
    let settings = &config.settings;
    if !settings.has_spotify() {
        tracing::warn!("spotify client id or secret missing, spotify links will fail");
    }
    let spotify = spotify::Spotify::new(spotify::auth::Credentials::new(
        &settings.spotify_client_id,
        &settings.spotify_client_secret,
    ));
    let youtube = Arc::new(youtube::YoutubeMusic::new(Arc::clone(&client)));

    let mut downloader = download::YtDlp::builder()
        .program(&opts.yt_dlp)
        .on_progress(|uri, progress| {
            tracing::debug!(
                link = uri,
                "downloaded {:.1}% of {} at {}",
                progress.percent,
                progress.total.as_deref().unwrap_or("?"),
                progress.speed.as_deref().unwrap_or("?")
            );
        });
    if let Some(ffmpeg) = &opts.ffmpeg_location {
        downloader = downloader.ffmpeg_location(ffmpeg);
    }
    if let Some(cookies) = &opts.cookies_file {
        downloader = downloader.cookies_file(cookies);
    }

    let engine = Engine::builder(config)
        .spotify(spotify)
        .source(youtube.clone())
        .search(youtube)
        .sink(Arc::new(downloader.build()))
        .thread_limit(opts.thread_limit)
        .client(client)
        .build()?;
    Ok(engine)
}

fn masked(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "*".repeat(8)
    }
}

fn print_settings(settings: &Settings) -> Result<()> {
    let shown = Settings {
        plex_token: masked(&settings.plex_token),
        jellyfin_token: masked(&settings.jellyfin_token),
        spotify_client_secret: masked(&settings.spotify_client_secret),
        ..settings.clone()
    };
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

async fn serve(engine: Engine) -> Result<()> {
    println!("{}", SPLASH_LOGO);
    let (shutdown_tx, _) = broadcast::channel(1);
    let shutdown_tx_signal = shutdown_tx.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown");
            let _ = shutdown_tx_signal.send(true);
        }
    });

    let scheduler = Arc::new(Scheduler::new(engine.clone()));
    let scheduler_task = {
        let scheduler = Arc::clone(&scheduler);
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "sync" => {
                    let _ = scheduler.trigger();
                }
                Some(line) if line.trim().is_empty() => {}
                Some(line) => tracing::warn!("unknown command `{}`", line.trim()),
                // stdin closed, keep running until ctrl-c
                None => {
                    let _ = shutdown_rx.recv().await;
                    break;
                }
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    scheduler_task.await?;
    while engine.state().in_progress() {
        tracing::info!("waiting for the running sync to finish");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = cli::Opts::parse();
    tracing::info!(thread_limit = opts.thread_limit, "starting");
    let config = Config::open(&opts.config_dir, Library::new(&opts.download_dir)).await?;
    let engine = build_engine(&opts, config)?;

    match opts.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(engine).await?,
        Command::Sync => match engine.sync_now().await {
            Some(report) => {
                for playlist in &report.playlists {
                    println!(
                        "{}: {} tracks, {} downloaded, {} failed, {} files",
                        playlist.name,
                        playlist.tracks,
                        playlist.fetch.fetched,
                        playlist.fetch.failed,
                        playlist.song_count
                    );
                }
                for name in &report.failed {
                    println!("{}: failed", name);
                }
            }
            None => println!("a sync is already running"),
        },
        Command::Schedule { hours } => {
            let hours = engine.update_schedule(&hours).await?;
            println!("sync times: {:?}", hours);
        }
        Command::Playlist(PlaylistCommand::Add { name, link, sleep }) => {
            engine
                .upsert_playlist(PlaylistEntry::new(name, link, sleep))
                .await?;
        }
        Command::Playlist(PlaylistCommand::Remove { name }) => {
            if engine.remove_playlist(&name).await?.is_none() {
                println!("no playlist named `{}`", name);
            }
        }
        Command::Playlist(PlaylistCommand::List) => {
            for entry in engine.sync_list().await.iter() {
                let last_synced = entry
                    .last_synced_at
                    .map(|at| at.format(playsync_model::serialization::last_synced::FORMAT).to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{}\t{}\tsleep={}s\tsongs={}\tlast synced {}",
                    entry.name, entry.link, entry.sleep, entry.song_count, last_synced
                );
            }
        }
        Command::Settings(SettingsCommand::Show) => print_settings(&engine.settings().await)?,
        Command::Settings(SettingsCommand::Set(update)) => {
            let settings = engine.update_settings(|settings| update.apply(settings)).await?;
            print_settings(&settings)?;
        }
    }
    Ok(())
}
