//! Background model loading
//!
//! Each request gets its own worker thread that reads the file in chunks,
//! reports progress, decodes it and sends the result back over an unbounded
//! channel. The frame loop drains the channel with [`ModelLoader::poll`].

use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use crate::error::LoadError;

use super::{decode, LoadEvent, LoadEventKind, RequestId};

const READ_CHUNK: usize = 64 * 1024;

pub struct ModelLoader {
    sender: UnboundedSender<LoadEvent>,
    receiver: UnboundedReceiver<LoadEvent>,
    next_request: RequestId,
}

impl ModelLoader {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            next_request: 0,
        }
    }

    /// Starts loading `path` in the background
    ///
    /// Results arrive through [`ModelLoader::poll`] tagged with the returned id.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> RequestId {
        let request = self.next_request;
        self.next_request += 1;

        let path = path.into();
        let sender = self.sender.clone();
        log::debug!("Request {request}: loading {}", path.display());

        let spawned = std::thread::Builder::new()
            .name(format!("model-loader-{request}"))
            .spawn({
                let path = path.clone();
                move || run_request(request, &path, &sender)
            });

        if let Err(source) = spawned {
            log::error!("Failed to spawn loader thread: {source}");
            send(
                &self.sender,
                request,
                LoadEventKind::Failed(LoadError::Io { path, source }),
            );
        }

        request
    }

    /// Drains every event that is ready without blocking
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        // Ok(None) means closed, Err means empty; the loader holds a sender so
        // only the latter happens in practice
        while let Ok(Some(event)) = self.receiver.try_next() {
            events.push(event);
        }
        events
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn send(sender: &UnboundedSender<LoadEvent>, request: RequestId, kind: LoadEventKind) {
    // The receiver is gone once the viewer shuts down; late results are dropped
    let _ = sender.unbounded_send(LoadEvent { request, kind });
}

fn run_request(request: RequestId, path: &Path, sender: &UnboundedSender<LoadEvent>) {
    let result = read_with_progress(path, |loaded, total| {
        send(sender, request, LoadEventKind::Progress { loaded, total });
    })
    .and_then(|bytes| decode(path, &bytes));

    let kind = match result {
        Ok(model) => LoadEventKind::Loaded(model),
        Err(err) => LoadEventKind::Failed(err),
    };
    send(sender, request, kind);
}

/// Reads a whole file, calling `progress` whenever the loaded percentage
/// changes (or after every chunk when the size is unknown)
fn read_with_progress(
    path: &Path,
    mut progress: impl FnMut(u64, Option<u64>),
) -> Result<Vec<u8>, LoadError> {
    let io_error = |source: std::io::Error| {
        if source.kind() == ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let mut file = File::open(path).map_err(io_error)?;
    let total = file.metadata().ok().map(|meta| meta.len());

    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut last_percent = None;

    loop {
        let read = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error(err)),
        };
        bytes.extend_from_slice(&chunk[..read]);

        let loaded = bytes.len() as u64;
        match total {
            Some(total) if total > 0 => {
                let percent = loaded * 100 / total;
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    progress(loaded, Some(total));
                }
            }
            _ => progress(loaded, None),
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Polls until the request finishes or a few seconds pass
    fn wait_for(loader: &mut ModelLoader, request: RequestId) -> Vec<LoadEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            let finished = loader.poll().into_iter().fold(false, |done, event| {
                let last = !matches!(event.kind, LoadEventKind::Progress { .. });
                assert_eq!(event.request, request);
                events.push(event);
                done || last
            });
            if finished {
                return events;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("loader did not finish");
    }

    #[test]
    fn test_load_obj_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut loader = ModelLoader::new();
        let request = loader.load(&path);
        let events = wait_for(&mut loader, request);

        let (last, progress) = events.split_last().unwrap();
        assert!(!progress.is_empty());
        match &progress[progress.len() - 1].kind {
            LoadEventKind::Progress { loaded, total } => {
                assert_eq!(Some(*loaded), *total);
            }
            other => panic!("expected progress, got {other:?}"),
        }
        match &last.kind {
            LoadEventKind::Loaded(model) => {
                assert_eq!(model.name, "tri");
                assert_eq!(model.triangle_count(), 1);
            }
            other => panic!("expected model, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        let request = loader.load(dir.path().join("parthenon.glb"));

        let events = wait_for(&mut loader, request);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].kind,
            LoadEventKind::Failed(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_extension_fails_after_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statue.stl");
        std::fs::write(&path, b"solid statue").unwrap();

        let mut loader = ModelLoader::new();
        let request = loader.load(&path);
        let events = wait_for(&mut loader, request);
        assert!(matches!(
            events.last().unwrap().kind,
            LoadEventKind::Failed(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_request_ids_are_distinct() {
        let mut loader = ModelLoader::new();
        let a = loader.load("/does/not/exist.glb");
        let b = loader.load("/does/not/exist.obj");
        assert_ne!(a, b);
    }

    #[test]
    fn test_progress_reports_each_percent_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; READ_CHUNK * 3 + 10]).unwrap();

        let mut reports = Vec::new();
        let bytes = read_with_progress(&path, |loaded, total| reports.push((loaded, total))).unwrap();
        assert_eq!(bytes.len(), READ_CHUNK * 3 + 10);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports.last(), Some(&(bytes.len() as u64, Some(bytes.len() as u64))));
    }

    #[test]
    fn test_load_glb_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parthenon.glb");
        std::fs::write(&path, crate::assets::gltf_import::triangle_glb()).unwrap();

        let mut loader = ModelLoader::new();
        let request = loader.load(&path);
        let events = wait_for(&mut loader, request);

        match &events.last().unwrap().kind {
            LoadEventKind::Loaded(model) => {
                assert_eq!(model.name, "parthenon");
                assert_eq!(model.triangle_count(), 1);
                let bounds = model.bounds();
                assert_eq!(bounds.min.y, 5.0);
                assert_eq!(bounds.max.y, 6.0);
            }
            other => panic!("expected model, got {other:?}"),
        }
    }

    #[test]
    fn test_gltf_without_geometry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gltf");
        std::fs::write(&path, r#"{ "asset": { "version": "2.0" } }"#).unwrap();

        let mut loader = ModelLoader::new();
        let request = loader.load(&path);
        let events = wait_for(&mut loader, request);
        assert!(matches!(
            events.last().unwrap().kind,
            LoadEventKind::Failed(LoadError::Empty)
        ));
    }
}
