use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use annotation::{
    AcceptanceMode, AnnotationController, AnnotationHandle, ControllerConfig, RecordingSurface,
};
use indexmap::IndexMap;
use overpass::RoadLookup;
use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

struct OpenView {
    mode: AcceptanceMode,
    handle: AnnotationHandle,
    last_used: Instant,
}

/// Open map views. A view lives from its creation until it is deleted or
/// sits idle for too long; its session goes with it.
#[derive(Clone)]
pub struct ViewRegistry {
    lookup: Arc<dyn RoadLookup>,
    snap_radius_m: f64,
    next_id: Arc<AtomicU64>,
    views: Arc<RwLock<IndexMap<u64, OpenView>>>,
}

impl ViewRegistry {
    pub fn new(lookup: Arc<dyn RoadLookup>, snap_radius_m: f64) -> Self {
        Self {
            lookup,
            snap_radius_m,
            next_id: Arc::new(AtomicU64::new(1)),
            views: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    pub async fn open(&self, mode: AcceptanceMode) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let config = ControllerConfig {
            snap_radius_m: self.snap_radius_m,
            ..ControllerConfig::new(mode)
        };
        let handle = annotation::spawn(AnnotationController::new(
            config,
            RecordingSurface::new(),
            self.lookup.clone(),
        ));
        self.views.write().await.insert(
            id,
            OpenView {
                mode,
                handle,
                last_used: Instant::now(),
            },
        );
        log::info!("Opened {} view {}.", mode, id);
        id
    }

    /// Handle of a view. Counts as a use of the view.
    pub async fn get(&self, id: u64) -> Option<AnnotationHandle> {
        let mut views = self.views.write().await;
        let view = views.get_mut(&id)?;
        view.last_used = Instant::now();
        Some(view.handle.clone())
    }

    /// Dropping the last handle ends the view's task.
    pub async fn close(&self, id: u64) -> bool {
        let closed = self.views.write().await.shift_remove(&id).is_some();
        if closed {
            log::info!("Closed view {}.", id);
        }
        closed
    }

    pub async fn list(&self) -> Vec<(u64, AcceptanceMode)> {
        self.views
            .read()
            .await
            .iter()
            .map(|(id, view)| (*id, view.mode))
            .collect()
    }

    /// Closes every view unused for at least `max_idle` and returns their ids.
    pub async fn expire_idle(&self, max_idle: Duration) -> Vec<u64> {
        let now = Instant::now();
        let mut expired = vec![];
        self.views.write().await.retain(|id, view| {
            let idle = now.duration_since(view.last_used) >= max_idle;
            if idle {
                expired.push(*id);
            }
            !idle
        });
        if !expired.is_empty() {
            log::info!("Closed idle views {:?}.", expired);
        }
        expired
    }

    /// Checks for idle views a few times per `max_idle` until aborted.
    pub fn spawn_expiry(&self, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = (max_idle / 4).max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                registry.expire_idle(max_idle).await;
            }
        })
    }
}
