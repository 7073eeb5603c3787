//! Background image loading.
//!
//! Decoding runs on a worker thread that owns a tokio runtime; the UI thread
//! sends commands and polls events once per frame. Every request carries a
//! generation number from [`LoadSession`], and the UI only accepts the
//! completion whose generation matches the most recent request — a slow
//! decode finishing after a newer request started is dropped on the floor,
//! never flickering the display back to a stale image.

use std::path::PathBuf;

use anyhow::Context;
use image::RgbaImage;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Url(u) => u.clone(),
        }
    }
}

#[derive(Debug)]
enum LoadCommand {
    Load { generation: u64, source: ImageSource },
    Shutdown,
}

#[derive(Debug)]
pub enum LoadEvent {
    Loaded { generation: u64, image: RgbaImage },
    Failed { generation: u64, error: String },
}

/// Monotonic request generations. `begin` supersedes every outstanding
/// request; `accepts` is true only for the newest one.
#[derive(Debug, Default)]
pub struct LoadSession {
    current: u64,
}

impl LoadSession {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn accepts(&self, generation: u64) -> bool {
        generation != 0 && generation == self.current
    }
}

pub struct ImageLoader {
    command_tx: mpsc::UnboundedSender<LoadCommand>,
    event_rx: mpsc::UnboundedReceiver<LoadEvent>,
}

impl ImageLoader {
    /// Spawns the worker thread with its own tokio runtime.
    pub fn spawn() -> Self {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<LoadCommand>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<LoadEvent>();

        std::thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = event_tx.send(LoadEvent::Failed {
                        generation: 0,
                        error: format!("failed to create runtime: {e}"),
                    });
                    return;
                }
            };

            rt.block_on(async move {
                while let Some(cmd) = command_rx.recv().await {
                    match cmd {
                        LoadCommand::Load { generation, source } => {
                            tracing::debug!(generation, source = %source.describe(), "decoding image");
                            let event = match decode(source).await {
                                Ok(image) => LoadEvent::Loaded { generation, image },
                                Err(e) => LoadEvent::Failed {
                                    generation,
                                    error: format!("{e:#}"),
                                },
                            };
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                        LoadCommand::Shutdown => break,
                    }
                }
            });
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    pub fn request(&self, generation: u64, source: ImageSource) {
        let _ = self.command_tx.send(LoadCommand::Load { generation, source });
    }

    /// Drains everything the worker produced since the last frame.
    pub fn poll_events(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        let _ = self.command_tx.send(LoadCommand::Shutdown);
    }
}

async fn decode(source: ImageSource) -> anyhow::Result<RgbaImage> {
    let dynamic = match source {
        ImageSource::Path(path) => {
            tokio::task::spawn_blocking(move || {
                image::open(&path).with_context(|| format!("cannot open {}", path.display()))
            })
            .await??
        }
        ImageSource::Url(url) => {
            let bytes = reqwest::get(&url)
                .await
                .with_context(|| format!("request to {url} failed"))?
                .error_for_status()
                .context("server returned an error status")?
                .bytes()
                .await
                .context("failed to read response body")?;
            image::load_from_memory(&bytes).context("response is not a decodable image")?
        }
    };
    Ok(dynamic.to_rgba8())
}
