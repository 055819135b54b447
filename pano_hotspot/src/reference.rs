//! Loading and sampling of the ID image for the current navigation state.
//!
//! Decoding runs on a short-lived worker thread per request. Each request is
//! tagged with a generation; completions that arrive after a newer request was
//! issued are dropped, so a slow load from a superseded room never replaces
//! the current buffer.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;

use crate::color::Rgb;
use crate::error::LoadError;
use crate::navigation::AssetPaths;

/// Source of decoded ID images.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, path: &str) -> Result<RgbImage, LoadError>;
}

/// Reads images from disk relative to an asset root.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, path: &str) -> Result<RgbImage, LoadError> {
        let full = self.resolve(path);
        let bytes = fs::read(&full).map_err(|source| LoadError::Io {
            path: full.clone(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|source| LoadError::Decode { path: full, source })?;
        Ok(decoded.to_rgb8())
    }
}

/// Serves pre-decoded images keyed by asset path.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    images: Mutex<HashMap<String, RgbImage>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, image: RgbImage) {
        let mut images = self
            .images
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        images.insert(path.into(), image);
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, path: &str) -> Result<RgbImage, LoadError> {
        let images = self
            .images
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        images
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Missing(path.to_string()))
    }
}

/// Decoded ID image owned by the store.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    path: String,
    generation: u64,
    pixels: RgbImage,
}

impl ReferenceImage {
    pub(crate) fn new(path: impl Into<String>, generation: u64, pixels: RgbImage) -> Self {
        Self {
            path: path.into(),
            generation,
            pixels,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn sample(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return None;
        }
        Some(Rgb::from(*self.pixels.get_pixel(x, y)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading { generation: u64, path: String },
    Ready { generation: u64 },
    Failed {
        generation: u64,
        path: String,
        reason: String,
    },
}

/// Settled result for the most recent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready { generation: u64, path: String },
    Failed {
        generation: u64,
        path: String,
        reason: String,
    },
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            LoadOutcome::Ready { generation, .. } | LoadOutcome::Failed { generation, .. } => {
                *generation
            }
        }
    }
}

struct Completion {
    generation: u64,
    path: String,
    result: Result<RgbImage, LoadError>,
}

pub struct ReferenceImageStore {
    fetcher: Arc<dyn ImageFetcher>,
    generation: u64,
    status: LoadStatus,
    image: Option<ReferenceImage>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl ReferenceImageStore {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            generation: 0,
            status: LoadStatus::Idle,
            image: None,
            tx,
            rx,
        }
    }

    /// Starts loading the reference image for `paths`, dropping the current
    /// buffer. Returns the generation tag of the new request.
    pub fn load_for(&mut self, paths: &AssetPaths) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let path = paths.reference.clone();
        self.image = None;
        self.status = LoadStatus::Loading {
            generation,
            path: path.clone(),
        };
        log::info!("loading reference image {path} (generation {generation})");

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name("pano_reference_loader".to_string())
            .spawn(move || {
                let result = fetcher.fetch(&worker_path);
                let _ = tx.send(Completion {
                    generation,
                    path: worker_path,
                    result,
                });
            });
        if let Err(err) = spawned {
            self.settle(Completion {
                generation,
                path,
                result: Err(LoadError::Spawn(err)),
            });
        }
        generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, LoadStatus::Ready { .. }) && self.image.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, LoadStatus::Loading { .. })
    }

    pub fn image(&self) -> Option<&ReferenceImage> {
        if self.is_ready() {
            self.image.as_ref()
        } else {
            None
        }
    }

    /// Color under `(x, y)`, or `None` while loading, after a failure, or
    /// outside the image.
    pub fn sample_color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        self.image()?.sample(x, y)
    }

    /// Applies finished loads without blocking. Returns the outcome of the
    /// current request if it settled during this call.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let mut outcome = None;
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(settled) = self.settle(completion) {
                outcome = Some(settled);
            }
        }
        outcome
    }

    /// Blocks until the current request settles or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadOutcome> {
        let deadline = Instant::now() + timeout;
        while self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => {
                    if let Some(settled) = self.settle(completion) {
                        return Some(settled);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    let generation = self.generation;
                    let path = match &self.status {
                        LoadStatus::Loading { path, .. } => path.clone(),
                        _ => String::new(),
                    };
                    return self.settle(Completion {
                        generation,
                        path,
                        result: Err(LoadError::Disconnected(generation)),
                    });
                }
            }
        }
        None
    }

    fn settle(&mut self, completion: Completion) -> Option<LoadOutcome> {
        let Completion {
            generation,
            path,
            result,
        } = completion;
        if generation != self.generation {
            log::debug!(
                "discarding reference image {path} from generation {generation} (current {})",
                self.generation
            );
            return None;
        }

        let result = result.and_then(|pixels| {
            if pixels.width() == 0 || pixels.height() == 0 {
                Err(LoadError::EmptyImage { path: path.clone() })
            } else {
                Ok(pixels)
            }
        });

        match result {
            Ok(pixels) => {
                log::info!(
                    "reference image {path} ready ({}x{})",
                    pixels.width(),
                    pixels.height()
                );
                self.image = Some(ReferenceImage::new(path.clone(), generation, pixels));
                self.status = LoadStatus::Ready { generation };
                Some(LoadOutcome::Ready { generation, path })
            }
            Err(err) => {
                log::warn!("reference image unavailable, hotspots disabled: {err}");
                let reason = err.to_string();
                self.image = None;
                self.status = LoadStatus::Failed {
                    generation,
                    path: path.clone(),
                    reason: reason.clone(),
                };
                Some(LoadOutcome::Failed {
                    generation,
                    path,
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(5);

    fn paths(reference: &str) -> AssetPaths {
        AssetPaths {
            revision: 0,
            visible: reference.replace("_ID", ""),
            reference: reference.to_string(),
        }
    }

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(8, 4, Pixel(color))
    }

    /// Holds individual paths until the test releases them.
    struct GatedFetcher {
        inner: MemoryFetcher,
        gates: Mutex<HashMap<String, Receiver<()>>>,
    }

    impl GatedFetcher {
        fn new(inner: MemoryFetcher) -> Self {
            Self {
                inner,
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, path: &str) -> Sender<()> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(path.to_string(), rx);
            tx
        }
    }

    impl ImageFetcher for GatedFetcher {
        fn fetch(&self, path: &str) -> Result<RgbImage, LoadError> {
            let gate = self.gates.lock().unwrap().remove(path);
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            self.inner.fetch(path)
        }
    }

    #[test]
    fn sampling_before_ready_yields_nothing() {
        let store = ReferenceImageStore::new(Arc::new(MemoryFetcher::new()));
        assert!(!store.is_ready());
        assert_eq!(store.sample_color_at(0, 0), None);
    }

    #[test]
    fn loads_and_samples_current_image() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("room_ID.png", solid([0, 255, 0]));
        let mut store = ReferenceImageStore::new(Arc::new(fetcher));

        let generation = store.load_for(&paths("room_ID.png"));
        let outcome = store.wait(WAIT).expect("load settles");
        assert_eq!(
            outcome,
            LoadOutcome::Ready {
                generation,
                path: "room_ID.png".to_string()
            }
        );
        assert!(store.is_ready());
        assert_eq!(store.sample_color_at(3, 2), Some(Rgb::new(0, 255, 0)));
        assert_eq!(store.sample_color_at(8, 0), None);
        assert_eq!(store.sample_color_at(0, 4), None);
    }

    #[test]
    fn failure_is_recorded_and_disables_sampling() {
        let mut store = ReferenceImageStore::new(Arc::new(MemoryFetcher::new()));
        store.load_for(&paths("missing_ID.png"));
        let outcome = store.wait(WAIT).expect("load settles");
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        assert!(matches!(
            store.status(),
            LoadStatus::Failed { path, .. } if path == "missing_ID.png"
        ));
        assert!(!store.is_ready());
        assert_eq!(store.sample_color_at(0, 0), None);
    }

    #[test]
    fn new_request_drops_previous_buffer() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("a_ID.png", solid([255, 0, 0]));
        let gated = Arc::new(GatedFetcher::new(fetcher));
        let mut store = ReferenceImageStore::new(gated.clone());

        store.load_for(&paths("a_ID.png"));
        store.wait(WAIT).expect("first load");
        assert!(store.is_ready());

        let release = gated.gate("b_ID.png");
        store.load_for(&paths("b_ID.png"));
        assert!(!store.is_ready());
        assert_eq!(store.sample_color_at(0, 0), None);
        drop(release);
        store.wait(WAIT);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("a_ID.png", solid([255, 0, 0]));
        fetcher.insert("b_ID.png", solid([0, 0, 255]));
        let gated = Arc::new(GatedFetcher::new(fetcher));
        let mut store = ReferenceImageStore::new(gated.clone());

        let release_b = gated.gate("b_ID.png");
        store.load_for(&paths("a_ID.png"));
        let current = store.load_for(&paths("b_ID.png"));

        // Generation 1 finishes first and must not make the store ready.
        assert_eq!(store.wait(Duration::from_millis(50)), None);
        assert!(!store.is_ready());

        release_b.send(()).expect("release b");
        let outcome = store.wait(WAIT).expect("b settles");
        assert_eq!(outcome.generation(), current);
        assert_eq!(store.sample_color_at(0, 0), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn late_completion_from_superseded_request_is_ignored() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("a_ID.png", solid([255, 0, 0]));
        fetcher.insert("b_ID.png", solid([0, 0, 255]));
        let gated = Arc::new(GatedFetcher::new(fetcher));
        let mut store = ReferenceImageStore::new(gated.clone());

        let release_a = gated.gate("a_ID.png");
        store.load_for(&paths("a_ID.png"));
        store.load_for(&paths("b_ID.png"));
        store.wait(WAIT).expect("b settles");

        release_a.send(()).expect("release a");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(store.poll(), None);
        assert_eq!(store.sample_color_at(0, 0), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn fs_fetcher_decodes_png_relative_to_root() {
        let temp = tempdir().expect("temp dir");
        let image = solid([255, 255, 0]);
        image
            .save(temp.path().join("hall_ID.png"))
            .expect("write png");

        let fetcher = FsFetcher::new(temp.path());
        let decoded = fetcher.fetch("hall_ID.png").expect("decode");
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(7, 3).0, [255, 255, 0]);

        let err = fetcher.fetch("absent_ID.png").expect_err("missing file");
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
