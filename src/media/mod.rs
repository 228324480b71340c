// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Media probing and image decoding backends
//!
//! Media probes are bound to the thread they were created on. [`MediaBackend`]
//! owns that thread; every probe request is marshalled to it through a
//! [`MediaHandle`] and answered in order.

pub mod audio;
pub mod image;
pub mod video;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::file::FileType;
use crate::{LabelError, Result};

/// Width and height in pixels
pub type Dimensions = (u32, u32);

/// Duration and resolution lookups for audio and video files
pub trait MediaProbe {
    fn duration(&mut self, path: &Path, file_type: FileType) -> Result<Duration>;

    fn video_dimensions(&mut self, path: &Path) -> Result<Dimensions>;
}

/// Pixel size lookups for still images
pub trait ImageDecoder: Send + Sync {
    fn dimensions(&self, path: &Path) -> Result<Dimensions>;
}

/// Default probe: symphonia for audio, ffprobe for video and as audio fallback
#[derive(Default)]
pub struct DefaultProbe;

impl DefaultProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProbe for DefaultProbe {
    fn duration(&mut self, path: &Path, file_type: FileType) -> Result<Duration> {
        if file_type == FileType::Audio {
            match audio::probe_duration(path) {
                Ok(duration) => return Ok(duration),
                Err(e) => debug!("symphonia could not read {:?}: {}, trying ffprobe", path, e),
            }
        }
        video::Ffprobe::metadata(path)?
            .duration
            .ok_or_else(|| LabelError::Media(format!("No duration for {}", path.display())))
    }

    fn video_dimensions(&mut self, path: &Path) -> Result<Dimensions> {
        let meta = video::Ffprobe::metadata(path)?;
        match (meta.width, meta.height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(LabelError::Media(format!("No video stream in {}", path.display()))),
        }
    }
}

enum Request {
    Duration {
        path: PathBuf,
        file_type: FileType,
        reply: Sender<Result<Duration>>,
    },
    Dimensions {
        path: PathBuf,
        reply: Sender<Result<Dimensions>>,
    },
}

/// The thread that owns the media probe
pub struct MediaBackend {
    handle: MediaHandle,
    thread: Option<JoinHandle<()>>,
}

impl MediaBackend {
    /// Start the backend thread, building the probe on it
    pub fn spawn<P, F>(factory: F) -> Result<Self>
    where
        P: MediaProbe,
        F: FnOnce() -> Result<P> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("media-backend".to_string())
            .spawn(move || match factory() {
                Ok(probe) => {
                    let _ = ready_tx.send(Ok(()));
                    serve(probe, rx);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("Media backend started");
                Ok(Self {
                    handle: MediaHandle { tx },
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(LabelError::MediaUnavailable(e.to_string()))
            }
            Err(_) => Err(LabelError::MediaUnavailable("backend thread exited".to_string())),
        }
    }

    /// Start the backend with [`DefaultProbe`]
    pub fn spawn_default() -> Result<Self> {
        Self::spawn(|| {
            if !video::Ffprobe::available() {
                warn!("ffprobe not found, video files cannot be probed");
            }
            Ok(DefaultProbe::new())
        })
    }

    pub fn handle(&self) -> MediaHandle {
        self.handle.clone()
    }

    /// Stop the thread once every outstanding handle is gone
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        // Swap in a dead sender so ours no longer keeps the loop alive
        let (dead_tx, _) = mpsc::channel();
        self.handle.tx = dead_tx;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Media backend thread panicked");
            }
        }
    }
}

impl Drop for MediaBackend {
    fn drop(&mut self) {
        self.join();
    }
}

fn serve<P: MediaProbe>(mut probe: P, rx: Receiver<Request>) {
    for request in rx {
        match request {
            Request::Duration { path, file_type, reply } => {
                let _ = reply.send(probe.duration(&path, file_type));
            }
            Request::Dimensions { path, reply } => {
                let _ = reply.send(probe.video_dimensions(&path));
            }
        }
    }
    debug!("Media backend stopped");
}

/// Cloneable, thread-safe access to the media backend
#[derive(Clone)]
pub struct MediaHandle {
    tx: Sender<Request>,
}

impl MediaHandle {
    /// Media duration, probed on the backend thread
    pub fn duration(&self, path: &Path, file_type: FileType) -> Result<Duration> {
        let (reply, rx) = mpsc::channel();
        self.send(Request::Duration {
            path: path.to_path_buf(),
            file_type,
            reply,
        })?;
        rx.recv().map_err(|_| gone())?
    }

    /// Video resolution, probed on the backend thread
    pub fn video_dimensions(&self, path: &Path) -> Result<Dimensions> {
        let (reply, rx) = mpsc::channel();
        self.send(Request::Dimensions {
            path: path.to_path_buf(),
            reply,
        })?;
        rx.recv().map_err(|_| gone())?
    }

    fn send(&self, request: Request) -> Result<()> {
        self.tx.send(request).map_err(|_| gone())
    }
}

fn gone() -> LabelError {
    LabelError::MediaUnavailable("backend thread is not running".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ThreadProbe {
        thread_name: String,
    }

    impl MediaProbe for ThreadProbe {
        fn duration(&mut self, _path: &Path, _file_type: FileType) -> Result<Duration> {
            assert_eq!(thread::current().name(), Some(self.thread_name.as_str()));
            Ok(Duration::from_secs(42))
        }

        fn video_dimensions(&mut self, path: &Path) -> Result<Dimensions> {
            Err(LabelError::Media(format!("corrupt: {}", path.display())))
        }
    }

    #[test]
    fn test_requests_run_on_backend_thread() {
        let backend = MediaBackend::spawn(|| {
            let thread_name = thread::current().name().unwrap_or_default().to_string();
            Ok(ThreadProbe { thread_name })
        })
        .unwrap();

        let handle = backend.handle();
        let worker = thread::spawn(move || handle.duration(Path::new("/a.mp3"), FileType::Audio));
        assert_eq!(worker.join().unwrap().unwrap(), Duration::from_secs(42));

        let err = backend.handle().video_dimensions(Path::new("/b.mp4")).unwrap_err();
        assert!(err.to_string().contains("corrupt: /b.mp4"));
        backend.shutdown();
    }

    #[test]
    fn test_factory_failure_is_reported() {
        let result = MediaBackend::spawn(|| -> Result<ThreadProbe> {
            Err(LabelError::Media("no codec library".to_string()))
        });
        assert!(matches!(result, Err(LabelError::MediaUnavailable(_))));
    }
}
