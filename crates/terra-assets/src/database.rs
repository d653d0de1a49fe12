//! Registry of mesh assets and their load state.

use rustc_hash::FxHashMap;
use terra_mesh::{LoadStatus, Mesh};
use tracing::{debug, info, warn};

use crate::descriptor::AssetDescriptor;
use crate::error::AssetError;
use crate::loader::{MeshLoadEvent, MeshLoader, create_obj_loader};
use crate::source::SourceRegistry;

/// How failed loads are retried.
///
/// Time is measured in ticks; one tick passes per
/// [`AssetDatabase::query_ready`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per asset, including the first. At least 1.
    pub max_attempts: u32,
    /// Delay after the first failure. Doubles after every further failure.
    pub backoff_ticks: u64,
    /// Upper bound for the doubled delay.
    pub max_backoff_ticks: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_ticks: 30,
            max_backoff_ticks: 1800,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the attempt following failed attempt number `attempts` (1-based).
    pub fn backoff(&self, attempts: u32) -> u64 {
        let shift = attempts.saturating_sub(1).min(63);
        self.backoff_ticks
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ticks)
    }

    fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts.max(1)
    }
}

/// Load state of a registered asset.
#[derive(Debug)]
pub enum LoadState {
    /// Never requested.
    Unloaded,
    /// A request is in flight. `attempt` is 1 for the first try.
    Loading { attempt: u32 },
    /// Loaded and ready to draw.
    Ready(Mesh),
    /// The loader reported `Ok` without a mesh (the empty uri). Nothing to draw.
    Empty,
    /// The last attempt failed. Retried at tick `retry_at` while attempts remain.
    Failed {
        status: LoadStatus,
        attempts: u32,
        retry_at: u64,
    },
}

/// Descriptor plus mutable load state.
#[derive(Debug)]
pub struct AssetRecord {
    descriptor: AssetDescriptor,
    state: LoadState,
}

impl AssetRecord {
    fn new(descriptor: AssetDescriptor) -> Self {
        Self {
            descriptor,
            state: LoadState::Unloaded,
        }
    }

    pub fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.state {
            LoadState::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }
}

/// Tracks mesh assets by uri and streams them in on demand.
///
/// At most one load per uri is in flight at any time: a load is only started
/// from the `Unloaded` or `Failed` states, and the record moves to `Loading`
/// in the same step.
///
/// Not thread-safe. Fetch sources may complete on other threads, but their
/// results are applied only inside [`query_ready`](Self::query_ready) and
/// [`process_completions`](Self::process_completions) on the owning thread.
pub struct AssetDatabase {
    records: FxHashMap<String, AssetRecord>,
    loader: Box<dyn MeshLoader>,
    sources: SourceRegistry,
    events: crossbeam_channel::Receiver<MeshLoadEvent>,
    retry: RetryPolicy,
    tick: u64,
}

impl AssetDatabase {
    /// Create a database backed by the OBJ loader.
    pub fn new(sources: SourceRegistry, retry: RetryPolicy) -> Self {
        Self::with_loader(create_obj_loader(), sources, retry)
    }

    /// Create a database around a custom loader. Any callback previously
    /// registered on `loader` is replaced.
    pub fn with_loader(
        mut loader: Box<dyn MeshLoader>,
        sources: SourceRegistry,
        retry: RetryPolicy,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        loader.on_loaded(Box::new(move |event: MeshLoadEvent| {
            let _ = tx.send(event);
        }));
        Self {
            records: FxHashMap::default(),
            loader,
            sources,
            events: rx,
            retry,
            tick: 0,
        }
    }

    /// Register a new asset.
    ///
    /// Fails with [`AssetError::AlreadyRegistered`] if the uri is taken; use
    /// [`replace`](Self::replace) to swap a descriptor.
    pub fn register(&mut self, descriptor: AssetDescriptor) -> Result<&mut Self, AssetError> {
        if self.records.contains_key(&descriptor.uri) {
            return Err(AssetError::AlreadyRegistered(descriptor.uri));
        }
        info!("Registered mesh asset {} ({:?})", descriptor.uri, descriptor.source);
        self.records
            .insert(descriptor.uri.clone(), AssetRecord::new(descriptor));
        Ok(self)
    }

    /// Register `descriptor`, replacing any asset with the same uri.
    ///
    /// The replaced asset's in-flight load is cancelled and its mesh dropped;
    /// the new record starts unloaded. Returns the previous descriptor.
    pub fn replace(&mut self, descriptor: AssetDescriptor) -> Option<AssetDescriptor> {
        let previous = self.remove_record(&descriptor.uri);
        info!("Replaced mesh asset {}", descriptor.uri);
        self.records
            .insert(descriptor.uri.clone(), AssetRecord::new(descriptor));
        previous
    }

    /// Remove an asset, cancelling its in-flight load.
    pub fn unregister(&mut self, uri: &str) -> Option<AssetDescriptor> {
        let previous = self.remove_record(uri);
        if previous.is_some() {
            info!("Unregistered mesh asset {}", uri);
        }
        previous
    }

    fn remove_record(&mut self, uri: &str) -> Option<AssetDescriptor> {
        let record = self.records.remove(uri)?;
        if record.is_loading() {
            self.loader.cancel(uri);
        }
        Some(record.descriptor)
    }

    /// The loaded mesh for `uri`, if any. Never starts a load.
    pub fn get_mesh(&self, uri: &str) -> Option<&Mesh> {
        self.records.get(uri).and_then(AssetRecord::mesh)
    }

    pub fn record(&self, uri: &str) -> Option<&AssetRecord> {
        self.records.get(uri)
    }

    /// Load state of `uri`, or `None` if it is not registered.
    pub fn status(&self, uri: &str) -> Option<&LoadState> {
        self.records.get(uri).map(AssetRecord::state)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of assets with a request in flight.
    pub fn loading_count(&self) -> usize {
        self.records.values().filter(|r| r.is_loading()).count()
    }

    /// Ticks elapsed, one per `query_ready` call.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Apply finished loads. Returns the number of records updated.
    pub fn process_completions(&mut self) -> usize {
        self.loader.poll();
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, event: MeshLoadEvent) -> bool {
        let Some(record) = self.records.get_mut(&event.uri) else {
            debug!("Ignoring load result for unregistered asset {}", event.uri);
            return false;
        };
        let LoadState::Loading { attempt } = record.state else {
            debug!("Ignoring stale load result for {}", event.uri);
            return false;
        };

        record.state = match (event.status, event.mesh) {
            (LoadStatus::Ok, Some(mesh)) => {
                info!(
                    "Mesh {} ready: {} vertices, {} triangles",
                    event.uri,
                    mesh.vertices().len(),
                    mesh.triangles().len()
                );
                LoadState::Ready(mesh)
            }
            (LoadStatus::Ok, None) => LoadState::Empty,
            (status, _) => {
                let retry_at = self.tick + self.retry.backoff(attempt);
                if self.retry.allows(attempt) {
                    warn!(
                        "Mesh {} failed ({}), attempt {}/{}, retrying at tick {}",
                        event.uri, status, attempt, self.retry.max_attempts, retry_at
                    );
                } else {
                    warn!(
                        "Mesh {} failed ({}), giving up after {} attempt(s)",
                        event.uri, status, attempt
                    );
                }
                LoadState::Failed {
                    status,
                    attempts: attempt,
                    retry_at,
                }
            }
        };
        true
    }

    /// Collect the descriptors of every ready asset into `out` and start
    /// loads for assets that need one.
    ///
    /// Intended to be called once per frame. Each call advances the retry
    /// clock by one tick, applies finished loads, then walks every record:
    /// ready assets are appended to `out`; unloaded assets, and failed ones
    /// whose backoff has elapsed and that have attempts left, get exactly one
    /// new request.
    pub fn query_ready(&mut self, out: &mut Vec<AssetDescriptor>) {
        self.tick += 1;
        self.process_completions();

        let tick = self.tick;
        for record in self.records.values_mut() {
            let attempt = match record.state {
                LoadState::Ready(_) => {
                    out.push(record.descriptor.clone());
                    continue;
                }
                LoadState::Unloaded => 1,
                LoadState::Failed {
                    attempts, retry_at, ..
                } if tick >= retry_at && self.retry.allows(attempts) => attempts + 1,
                _ => continue,
            };

            let uri = record.descriptor.uri.as_str();
            match self.sources.get(record.descriptor.source) {
                Some(source) => {
                    debug!("Starting load of {} (attempt {})", uri, attempt);
                    self.loader.load_mesh(uri, source.as_ref());
                    record.state = LoadState::Loading { attempt };
                }
                None => {
                    warn!(
                        "No fetch source registered for {:?}, cannot load {}",
                        record.descriptor.source, uri
                    );
                    record.state = LoadState::Failed {
                        status: LoadStatus::UnknownError,
                        attempts: attempt,
                        retry_at: tick + self.retry.backoff(attempt),
                    };
                }
            }
        }
    }
}
