//! Filesystem-backed fetch source with a small pool of reader threads.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::error::AssetError;
use crate::source::{
    AsyncRequest, CancelToken, ErrorReason, FileSource, Resource, Response, ResponseCallback,
};

struct ReadJob {
    path: PathBuf,
    token: CancelToken,
    callback: ResponseCallback,
}

/// Reads resources from disk on worker threads.
///
/// Uris may be plain paths or `file://` urls. Relative paths resolve against
/// the base directory. Callbacks run on the worker threads.
pub struct LocalFileSource {
    base_path: PathBuf,
    job_sender: Option<crossbeam_channel::Sender<ReadJob>>,
    worker_handles: Vec<JoinHandle<()>>,
}

impl LocalFileSource {
    /// Spawn `worker_count` reader threads. Zero picks one per CPU.
    pub fn new(base_path: impl Into<PathBuf>, worker_count: usize) -> Result<Self, AssetError> {
        let base_path = base_path.into();
        let worker_count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<ReadJob>();

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = job_rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("terra-file-{i}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        run_job(job);
                    }
                })
                .map_err(AssetError::WorkerSpawn)?;
            handles.push(handle);
        }

        debug!(
            "LocalFileSource started with {} workers at {}",
            worker_count,
            base_path.display()
        );
        Ok(Self {
            base_path,
            job_sender: Some(job_tx),
            worker_handles: handles,
        })
    }

    /// Map a uri to a filesystem path.
    pub fn resolve(&self, uri: &str) -> PathBuf {
        let path = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Stop accepting work and join the reader threads. Queued jobs finish first.
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_job(job: ReadJob) {
    if job.token.is_cancelled() {
        return;
    }
    let response = match std::fs::read(&job.path) {
        Ok(bytes) => Response::ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Response::error(ErrorReason::NotFound, format!("{}: {e}", job.path.display()))
        }
        Err(e) => Response::error(ErrorReason::Other, format!("{}: {e}", job.path.display())),
    };
    if job.token.is_cancelled() {
        return;
    }
    (job.callback)(response);
}

impl FileSource for LocalFileSource {
    fn request(&self, resource: Resource, callback: ResponseCallback) -> AsyncRequest {
        let (request, token) = AsyncRequest::new();
        let path = self.resolve(&resource.uri);

        let Some(sender) = &self.job_sender else {
            callback(Response::error(ErrorReason::Other, "file source shut down"));
            return request;
        };
        if let Err(crossbeam_channel::SendError(job)) = sender.send(ReadJob {
            path,
            token,
            callback,
        }) {
            warn!("File source queue closed, failing {}", resource.uri);
            (job.callback)(Response::error(ErrorReason::Other, "file source shut down"));
        }
        request
    }
}

impl Drop for LocalFileSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetch(source: &LocalFileSource, uri: &str) -> Response {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _request = source.request(
            Resource::mesh(uri),
            Box::new(move |response: Response| {
                let _ = tx.send(response);
            }),
        );
        rx.recv_timeout(Duration::from_secs(5))
            .expect("timed out waiting for file response")
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), "v 0 0 0\n").unwrap();
        let source = LocalFileSource::new(dir.path(), 1).unwrap();

        let response = fetch(&source, "tri.obj");
        assert!(response.error.is_none());
        assert_eq!(response.data.as_deref(), Some(&b"v 0 0 0\n"[..]));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFileSource::new(dir.path(), 1).unwrap();

        let response = fetch(&source, "nope.obj");
        assert_eq!(response.error.unwrap().reason, ErrorReason::NotFound);
        assert!(response.data.is_none());
    }

    #[test]
    fn test_resolve_relative_and_file_urls() {
        let source = LocalFileSource::new("/srv/assets", 1).unwrap();
        assert_eq!(
            source.resolve("models/box.obj"),
            PathBuf::from("/srv/assets/models/box.obj")
        );
        assert_eq!(
            source.resolve("file:///abs/box.obj"),
            PathBuf::from("/abs/box.obj")
        );
        assert_eq!(
            source.resolve("file://rel/box.obj"),
            PathBuf::from("/srv/assets/rel/box.obj")
        );
    }

    /// A request cancelled while queued behind another never calls back.
    #[test]
    fn test_cancelled_request_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.obj"), "v 0 0 0\n").unwrap();
        let mut source = LocalFileSource::new(dir.path(), 1).unwrap();

        // Park the only worker inside the first callback.
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let _first = source.request(
            Resource::mesh("a.obj"),
            Box::new(move |_: Response| {
                let _ = gate_rx.recv();
            }),
        );

        let (tx, rx) = crossbeam_channel::unbounded();
        let second = source.request(
            Resource::mesh("a.obj"),
            Box::new(move |response: Response| {
                let _ = tx.send(response);
            }),
        );
        second.cancel();
        gate_tx.send(()).unwrap();
        source.shutdown();

        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_request_after_shutdown_fails_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = LocalFileSource::new(dir.path(), 1).unwrap();
        source.shutdown();
        let response = fetch(&source, "a.obj");
        assert_eq!(response.error.unwrap().reason, ErrorReason::Other);
    }
}
