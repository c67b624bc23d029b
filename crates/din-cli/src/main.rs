//! din CLI — voice control for relay-switched devices.
//!
//! ```text
//! din run [--device-url http://192.168.1.100] [--text-only] ...
//! din test [--device-url ...]
//! din commands
//! ```

use clap::{Parser, Subcommand};
use tracing::info;

use din_core::narrate;
use din_core::types::{DeviceConfig, ListenConfig, SpeechConfig};
use din_lib::device::DeviceClient;
use din_lib::executor::Executor;
use din_lib::session::{Session, SessionConfig};
use din_lib::speech::{Console, Speaker};
use din_lib::stt::WhisperTranscriber;

/// din — voice control for relay-switched devices
#[derive(Parser)]
#[command(name = "din", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start listening for voice commands
    Run {
        /// Relay device base URL
        #[arg(long, default_value = "http://192.168.1.100")]
        device_url: String,
        /// Whisper-compatible transcription server URL
        #[arg(long, default_value = "http://localhost:2022")]
        whisper_url: String,
        /// Whisper model name
        #[arg(long, default_value = "base")]
        model: String,
        /// Speech synthesis server URL
        #[arg(long, default_value = "http://localhost:8880")]
        tts_url: String,
        /// Synthesis voice
        #[arg(long, default_value = "af_heart")]
        voice: String,
        /// Synthesis speed
        #[arg(long, default_value = "1.0")]
        speed: f32,
        /// Seconds to wait for speech before giving up a cycle
        #[arg(long, default_value = "5")]
        listen_timeout: u64,
        /// Maximum seconds per utterance
        #[arg(long, default_value = "5")]
        phrase_limit: u64,
        /// Print narrations instead of speaking them
        #[arg(long)]
        text_only: bool,
    },
    /// Probe the relay device and exit
    Test {
        /// Relay device base URL
        #[arg(long, default_value = "http://192.168.1.100")]
        device_url: String,
    },
    /// Print the supported command phrases and exit
    Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "din=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            device_url,
            whisper_url,
            model,
            tts_url,
            voice,
            speed,
            listen_timeout,
            phrase_limit,
            text_only,
        } => {
            let device = DeviceClient::new(&DeviceConfig {
                base_url: device_url.clone(),
                ..Default::default()
            });

            if !device.probe().await {
                eprintln!("cannot reach the relay device at {device_url}; check the address");
                std::process::exit(1);
            }
            info!("relay device reachable at {device_url}");

            let mut transcriber = WhisperTranscriber::new(ListenConfig {
                whisper_url,
                model,
                timeout_secs: listen_timeout,
                phrase_limit_secs: phrase_limit,
            });

            println!("Calibrating microphone for ambient noise...");
            match transcriber.calibrate().await {
                Ok(threshold) => info!("silence threshold set to {threshold:.4}"),
                Err(e) => {
                    eprintln!("microphone calibration failed: {e}");
                    std::process::exit(1);
                }
            }

            let config = SessionConfig {
                listen_timeout: std::time::Duration::from_secs(listen_timeout),
                phrase_limit: std::time::Duration::from_secs(phrase_limit),
                ..Default::default()
            };
            let executor = Executor::new(device);

            if text_only {
                let session = Session::new(config, executor, transcriber, Console);
                run_with_interrupt(session).await;
            } else {
                let speaker = Speaker::new(SpeechConfig { tts_url, voice, speed });
                let session = Session::new(config, executor, transcriber, speaker);
                run_with_interrupt(session).await;
            }
        }

        Command::Test { device_url } => {
            let device = DeviceClient::new(&DeviceConfig {
                base_url: device_url.clone(),
                ..Default::default()
            });
            if device.probe().await {
                println!("relay device reachable at {device_url}");
            } else {
                println!("cannot reach the relay device at {device_url}");
                std::process::exit(1);
            }
        }

        Command::Commands => {
            println!("{}", narrate::help_listing());
        }
    }
}

/// Run a session with ctrl-c wired to its cooperative stop flag.
async fn run_with_interrupt<T, F>(session: Session<T, F>)
where
    T: din_lib::stt::Transcriber,
    F: din_lib::speech::Feedback,
{
    let state = session.state();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nStopping voice control...");
            state.stop();
        }
    });

    session.run().await;
}
