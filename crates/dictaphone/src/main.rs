//! Dictaphone: a terminal voice recorder.

mod app;
mod app_command;
mod config;
mod consent;
mod error;
mod prompt;

pub(crate) use {
    app::App,
    app_command::Command,
    consent::acquire_consent,
    error::{AppError, Result as AppResult},
    prompt::{LineSource, Resolved, StdioPrompt},
};

use crate::config::Config;

use std::sync::Arc;

use dictaphone_core::{RateCycle, SessionController, WavPlayer, WavRecorder};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{Mutex, mpsc},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application entry point.
#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout belongs to the status line.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dictaphone=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Stdin forwarding via a single persistent reader task.
    //
    // Lines flow through an mpsc channel so the consent phase and the
    // command loop can take turns consuming them without sharing a
    // buffered reader.
    //
    // Shutdown: when the receiver is dropped (command loop ends),
    // send() fails, breaking the loop.
    let (line_tx, line_rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    if line_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    let lines: LineSource = Arc::new(Mutex::new(line_rx));

    // Nothing that can touch the microphone is constructed until the
    // permission gate has been passed.
    if !acquire_consent(&lines).await {
        info!("Exiting without microphone consent");
        return;
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let clip_dir = match config.clip_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to resolve clip directory: {:?}", e);
            std::process::exit(1);
        }
    };

    let recorder = match WavRecorder::new(config.audio.selected_device.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to open microphone: {:?}", e);
            std::process::exit(1);
        }
    };

    let player = match WavPlayer::new() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to open playback device: {:?}", e);
            std::process::exit(1);
        }
    };

    let app = App {
        controller: SessionController::new(Box::new(recorder), clip_dir),
        player: Box::new(player),
        lines,
        rate: RateCycle::new(),
        loaded_clip: None,
        pending_delete: false,
    };

    if let Err(e) = app.run().await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
