//! tacet command-line front end

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tacet_lib::api::{Recording, RecordingApi, RecordingFilter, RecordingUser};
use tacet_lib::audio::{list_input_devices, RecordingProfile};
use tacet_lib::config::{self, Config};
use tacet_lib::{AppContext, Movement};

#[derive(Parser, Debug)]
#[command(name = "tacet")]
#[command(about = "Record the silence, tag what you heard")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.tacet/config.json)
    #[arg(long, env = "TACET_CONFIG")]
    config: Option<PathBuf>,

    /// Recordings API base URL
    #[arg(long, env = "TACET_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the recordings API
    #[arg(long, env = "TACET_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List audio input devices
    Devices,

    /// List the movements and their lengths
    Movements,

    /// Record one movement
    Record {
        /// I, II, III or FULL
        #[arg(short, long, default_value = "I")]
        movement: Movement,

        /// Something you heard; repeat for more tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        title: Option<String>,

        /// Overrides the configured recording profile
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        /// Save the encoded recording here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Listen back before tagging
        #[arg(long)]
        preview: bool,

        /// Upload once tagged
        #[arg(long)]
        upload: bool,
    },

    /// Play files or URLs as a playlist
    Play {
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Browse published recordings (trending by default)
    Browse {
        #[arg(long, conflicts_with = "user")]
        tag: Option<String>,

        #[arg(long)]
        user: Option<String>,

        /// Play the results as a playlist
        #[arg(long)]
        play: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    HighFidelity,
    Compressed,
}

impl From<ProfileArg> for RecordingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::HighFidelity => RecordingProfile::HighFidelity,
            ProfileArg::Compressed => RecordingProfile::Compressed,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tacet_lib::init_logging();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(token) = cli.token {
        config.api.auth_token = Some(token);
    }

    match cli.command {
        Command::Devices => {
            print_devices();
            Ok(())
        }
        Command::Movements => {
            for movement in Movement::ALL {
                println!(
                    "{:<5} {:>4}s  {}",
                    movement.label(),
                    movement.duration_seconds(),
                    movement.description()
                );
            }
            Ok(())
        }
        Command::Record {
            movement,
            tags,
            title,
            profile,
            output,
            preview,
            upload,
        } => {
            let mut context = AppContext::new(config)?;
            if let Some(profile) = profile {
                context.recording.capture_mut().set_profile(profile.into());
            }
            let take = Take {
                movement,
                tags,
                title,
                output,
                preview,
                upload,
            };
            record(&mut context, take).await
        }
        Command::Play { sources } => {
            let mut context = AppContext::new(config)?;
            let mut items = Vec::new();
            for source in &sources {
                items.push(playable_item(&context, source).await?);
            }
            play_all(&mut context, items).await;
            Ok(())
        }
        Command::Browse { tag, user, play } => {
            let mut context = AppContext::new(config)?;
            let filter = match (tag, user) {
                (Some(tag), _) => RecordingFilter::Tag(tag),
                (None, Some(user)) => RecordingFilter::User(user),
                (None, None) => RecordingFilter::Trending,
            };
            let recordings = context
                .api
                .list_recordings(&filter)
                .await
                .context("Failed to list recordings")?;
            print_recordings(&recordings);

            if play && !recordings.is_empty() {
                let mut items = Vec::new();
                for recording in &recordings {
                    // Unreachable audio still plays, simulated
                    let item = match context.prefetch(recording).await {
                        Ok(item) => item,
                        Err(e) => {
                            tracing::warn!("Could not fetch audio for {}: {}", recording.id, e);
                            recording.clone()
                        }
                    };
                    items.push(item);
                }
                play_all(&mut context, items.clone()).await;
                for item in &items {
                    context.release_prefetched(item);
                }
            }
            Ok(())
        }
    }
}

fn print_devices() {
    let devices = list_input_devices();
    if devices.is_empty() {
        println!("No input devices found");
    }
    for device in devices {
        println!(
            "{} {}{}",
            if device.is_default { "*" } else { " " },
            device.name,
            match (device.sample_rate, device.channels) {
                (Some(rate), Some(channels)) => format!(" ({} Hz, {} ch)", rate, channels),
                _ => String::new(),
            }
        );
    }
}

fn print_recordings(recordings: &[Recording]) {
    if recordings.is_empty() {
        println!("No recordings found");
    }
    for recording in recordings {
        println!(
            "{}  {:<5} @{:<16} {:>5} plays  {}  [{}]",
            recording.created_at.format("%Y-%m-%d"),
            recording.movement.as_str(),
            recording.user.username,
            recording.play_count,
            recording.title.as_deref().unwrap_or("untitled"),
            recording.tags.join(", ")
        );
    }
}

/// Options for one `record` run
struct Take {
    movement: Movement,
    tags: Vec<String>,
    title: Option<String>,
    output: Option<PathBuf>,
    preview: bool,
    upload: bool,
}

async fn record(context: &mut AppContext, take: Take) -> Result<()> {
    let recording = &mut context.recording;
    recording.select_movement(take.movement)?;
    recording.start_recording()?;
    println!(
        "Recording movement {} ({}s). Ctrl-C to cancel.",
        take.movement,
        take.movement.duration_seconds()
    );

    let mut interval = tokio::time::interval(context.config.recording.timer_interval());
    while recording.is_timer_running() {
        tokio::select! {
            _ = interval.tick() => {
                recording.on_timer_tick()?;
                eprint!(
                    "\r{:5.1}s remaining  {:3.0}%",
                    recording.remaining(),
                    recording.progress()
                );
            }
            _ = tokio::signal::ctrl_c() => {
                recording.cancel_recording()?;
                eprintln!();
                println!("Cancelled");
                return Ok(());
            }
        }
    }
    eprintln!();

    let Some(audio) = recording.draft().audio.clone() else {
        bail!("Recording finished without audio");
    };
    println!(
        "Recorded {:.1}s ({} bytes, {})",
        audio.duration_seconds(),
        audio.len(),
        audio.mime_type()
    );

    if let Some(path) = &take.output {
        std::fs::write(path, audio.bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved to {}", path.display());
    }

    if take.preview {
        if let Some(url) = recording.draft().preview_url.clone() {
            let item = local_recording(url.as_str(), take.movement, audio.duration_seconds());
            play_all(context, vec![item]).await;
        }
    }

    let recording = &mut context.recording;
    for tag in &take.tags {
        if let Err(e) = recording.add_tag(tag) {
            eprintln!("Skipping tag '{}': {}", tag, e);
        }
    }
    if let Some(title) = &take.title {
        recording.set_title(title)?;
    }

    if !take.upload {
        recording.start_over()?;
        return Ok(());
    }

    recording.go_to_tags()?;
    match recording.upload().await {
        Ok(published) => {
            println!("Uploaded as {}", published.id);
            Ok(())
        }
        Err(e) => {
            // The draft is still in Tagging; keep the audio if it was not saved
            if take.output.is_none() {
                let fallback = config::config_dir()
                    .join(format!("unsent-{}.wav", Utc::now().timestamp()));
                if let Some(audio) = recording.draft().audio.as_ref() {
                    if std::fs::write(&fallback, audio.bytes()).is_ok() {
                        eprintln!("Recording kept at {}", fallback.display());
                    }
                }
            }
            Err(e.into())
        }
    }
}

/// Turn a command-line source into a playable queue item
async fn playable_item(context: &AppContext, source: &str) -> Result<Recording> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let remote = local_recording(source, Movement::Full, Movement::Full.duration_secs_f64());
        return match context.prefetch(&remote).await {
            Ok(item) => Ok(item),
            Err(e) => {
                tracing::warn!("Could not fetch {}: {}", source, e);
                Ok(remote)
            }
        };
    }

    let path = Path::new(source);
    if !path.exists() {
        bail!("No such file: {}", source);
    }
    let duration = wav_duration(path).unwrap_or(Movement::Full.duration_secs_f64());
    Ok(local_recording(source, Movement::Full, duration))
}

fn wav_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    let frames = reader.duration();
    (spec.sample_rate > 0).then(|| f64::from(frames) / f64::from(spec.sample_rate))
}

fn local_recording(source: &str, movement: Movement, duration_seconds: f64) -> Recording {
    Recording {
        id: source.to_string(),
        user: RecordingUser {
            id: "local".to_string(),
            username: "local".to_string(),
        },
        movement,
        duration_seconds,
        audio_url: Some(source.to_string()),
        waveform_data: Vec::new(),
        tags: Vec::new(),
        title: None,
        like_count: 0,
        play_count: 0,
        created_at: Utc::now(),
    }
}

/// Play `items` in order until the queue ends or Ctrl-C
async fn play_all(context: &mut AppContext, items: Vec<Recording>) {
    let Some(first) = items.first().cloned() else {
        return;
    };
    let player = &mut context.playback;
    player.play(first, Some(items));

    let mut interval = tokio::time::interval(player.simulation_tick());
    loop {
        tokio::select! {
            _ = interval.tick() => {
                player.poll_output();
                player.tick_simulation();
                let state = player.state();
                if !state.is_playing {
                    break;
                }
                eprint!(
                    "\r[{}/{}] {:6.1}s / {:6.1}s{}",
                    state.current_index + 1,
                    state.playlist.len(),
                    state.current_time,
                    state.duration,
                    if player.is_simulating() { " (simulated)" } else { "" }
                );
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    eprintln!();
    player.stop();
}
