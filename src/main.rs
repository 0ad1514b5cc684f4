use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use wordwatch::audio::capture::AudioSource;
use wordwatch::audio::wav::WavAudioSource;
use wordwatch::cli::{Cli, Commands};
use wordwatch::config::Config;
use wordwatch::keywords::parser::parse_list;
use wordwatch::session::capture::{CaptureEvent, spawn_capture};
use wordwatch::session::controller::{SessionController, SessionEvent};
use wordwatch::transport::stdio::StdioTransport;
use wordwatch::transport::TranscriptionTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Devices) => list_audio_devices(),
        None => run_session(cli).await,
    }
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = wordwatch::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        for name in devices {
            println!("{}", name);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    bail!("built without the cpal-audio feature; device listing is unavailable")
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path(),
    };
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

fn open_audio_source(cli: &Cli, config: &Config) -> Result<Box<dyn AudioSource>> {
    if let Some(path) = &cli.wav {
        let source = WavAudioSource::from_path(path)
            .with_context(|| format!("reading WAV file {}", path.display()))?;
        return Ok(Box::new(source));
    }
    if cli.stdin_audio {
        return Ok(Box::new(
            WavAudioSource::from_stdin().context("reading WAV data from stdin")?,
        ));
    }

    #[cfg(feature = "cpal-audio")]
    {
        let device = cli.device.clone().or_else(|| config.audio.device.clone());
        Ok(Box::new(wordwatch::audio::capture::CpalAudioSource::new(
            device,
        )))
    }
    #[cfg(not(feature = "cpal-audio"))]
    {
        let _ = config;
        bail!("built without the cpal-audio feature; use --wav or --stdin-audio")
    }
}

async fn run_session(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let keyword_specs = if cli.keywords.is_empty() {
        parse_list(&config.session.keywords.join("\n"))
    } else {
        parse_list(&cli.keywords.join("\n"))
    };
    if keyword_specs.is_empty() {
        bail!("no keywords to monitor; pass --keyword or set session.keywords in the config");
    }

    let source = open_audio_source(&cli, &config)?;
    let inbound_on_stdin = !cli.stdin_audio;

    let transport: Arc<dyn TranscriptionTransport> = Arc::new(StdioTransport::new());
    let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(256);

    let voice_replies = !cli.no_voice_replies && config.session.voice_replies;
    let mut controller = SessionController::new(transport, events_tx.clone(), voice_replies);
    controller.set_keywords(keyword_specs);
    let stop_flag = controller.capture_stop_flag();

    eprintln!(
        "wordwatch {}: monitoring {} keyword(s)",
        wordwatch::version_string(),
        controller.keywords().len()
    );

    // Capture thread → crossbeam channel → session channel
    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<CaptureEvent>(32);
    let capture_handle = spawn_capture(source, frame_tx, stop_flag);
    let bridge_tx = events_tx.clone();
    let bridge_handle = std::thread::spawn(move || {
        for event in frame_rx {
            let session_event = match event {
                CaptureEvent::Frame(frame) => SessionEvent::Frame(frame),
                CaptureEvent::Finished => SessionEvent::Stop,
            };
            let is_stop = matches!(session_event, SessionEvent::Stop);
            if bridge_tx.blocking_send(session_event).is_err() || is_stop {
                break;
            }
        }
    });

    // Inbound server messages: one JSON object per stdin line
    if inbound_on_stdin {
        let inbound_tx = events_tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match wordwatch::transport::parse_inbound_line(line) {
                    Ok(value) => {
                        if inbound_tx.send(SessionEvent::Inbound(value)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => eprintln!("wordwatch: skipping malformed inbound line: {}", e),
                }
            }
            let _ = inbound_tx.send(SessionEvent::Stop).await;
        });
    }

    // Ctrl-C stops the session cleanly
    let signal_tx = events_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_tx.send(SessionEvent::Stop).await;
        }
    });
    drop(events_tx);

    let controller = controller.run(events_rx).await;

    let _ = bridge_handle.join();
    let _ = capture_handle.join();

    report_session(&controller, &cli, &config)?;
    Ok(())
}

fn report_session(controller: &SessionController, cli: &Cli, config: &Config) -> Result<()> {
    let counters = controller.counters();
    eprintln!(
        "wordwatch: session ended after {:.0}s: {} words, {} mentions",
        counters.session_secs, counters.word_count, counters.mention_count
    );

    let report = controller.correlation_report();
    if let Some(dominant) = &report.dominant {
        eprintln!("wordwatch: dominant keyword: {}", dominant);
    }
    for line in &report.tension_lines {
        eprintln!(
            "wordwatch: tension between {} and {}",
            line.keyword_a, line.keyword_b
        );
    }

    if counters.word_count == 0 {
        return Ok(());
    }

    let directory = cli
        .export_dir
        .clone()
        .or_else(|| config.export.directory.clone())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let (filename, document) = controller.export_transcript();
    let path = directory.join(filename);
    std::fs::write(&path, document)
        .with_context(|| format!("writing transcript to {}", path.display()))?;
    eprintln!("wordwatch: transcript exported to {}", path.display());
    Ok(())
}
