use super::WindowSurface;
use crate::badge::BadgeValue;
use crate::icon::{
    BadgeStyle, CacheKey, Capabilities, CompositionError, Composer, IconSource, RepresentationCache,
    RepresentationSet, SourceImage, SourceLoader,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Upper bound on fetching one icon source, whatever the loader does.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTarget {
    pub source: IconSource,
    pub badge: BadgeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    Composing,
    Applying,
}

struct Pending {
    seq: u64,
    target: IconTarget,
}

/// FIFO of icon targets for one window; targets queued behind a busy worker
/// collapse into the newest one.
struct PendingChain {
    rx: mpsc::UnboundedReceiver<Pending>,
}

impl PendingChain {
    async fn next(&mut self) -> Option<Pending> {
        let mut latest = self.rx.recv().await?;
        while let Ok(newer) = self.rx.try_recv() {
            log::debug!("Icon target {} ({}) superseded", latest.target.source, latest.target.badge);
            latest = newer;
        }
        Some(latest)
    }
}

/// Handle to a window's icon worker. Dropping it lets the worker drain and exit.
pub struct IconScheduler {
    tx: mpsc::UnboundedSender<Pending>,
    submitted: Mutex<u64>,
    processed: watch::Receiver<u64>,
    state: watch::Receiver<ChainState>,
}

impl IconScheduler {
    pub fn spawn<S, L>(surface: Arc<S>, loader: Arc<L>, cache: RepresentationCache) -> Self
    where
        S: WindowSurface,
        L: SourceLoader,
    {
        Self::spawn_with_timeout(surface, loader, cache, DEFAULT_LOAD_TIMEOUT)
    }

    /// Like `spawn`, with loads abandoned as `SourceLoad` failures after `load_timeout`.
    pub fn spawn_with_timeout<S, L>(
        surface: Arc<S>,
        loader: Arc<L>,
        cache: RepresentationCache,
        load_timeout: Duration,
    ) -> Self
    where
        S: WindowSurface,
        L: SourceLoader,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (processed_tx, processed) = watch::channel(0);
        let (state_tx, state) = watch::channel(ChainState::Idle);

        let worker = Worker {
            caps: surface.platform().capabilities(),
            surface,
            loader,
            cache,
            load_timeout,
            applied_icon: None,
            applied_overlay: None,
            state: state_tx,
            processed: processed_tx,
        };
        tokio::spawn(worker.run(PendingChain { rx }));

        Self {
            tx,
            submitted: Mutex::new(0),
            processed,
            state,
        }
    }

    pub fn submit(&self, target: IconTarget) {
        // Numbering and sending under one lock keeps the queue in sequence order.
        let mut submitted = self.submitted.lock().unwrap_or_else(PoisonError::into_inner);
        *submitted += 1;
        if self.tx.send(Pending { seq: *submitted, target }).is_err() {
            log::warn!("Icon worker has stopped; update dropped");
        }
    }

    pub fn state(&self) -> ChainState {
        *self.state.borrow()
    }

    /// Resolves once every target submitted so far has been handled.
    pub async fn settled(&self) {
        let target = *self.submitted.lock().unwrap_or_else(PoisonError::into_inner);
        let mut processed = self.processed.clone();
        let _ = processed.wait_for(|&seq| seq >= target).await;
    }
}

struct Worker<S, L> {
    surface: Arc<S>,
    loader: Arc<L>,
    cache: RepresentationCache,
    load_timeout: Duration,
    caps: Capabilities,
    applied_icon: Option<CacheKey>,
    applied_overlay: Option<BadgeValue>,
    state: watch::Sender<ChainState>,
    processed: watch::Sender<u64>,
}

impl<S, L> Worker<S, L>
where
    S: WindowSurface,
    L: SourceLoader,
{
    async fn run(mut self, mut chain: PendingChain) {
        while let Some(pending) = chain.next().await {
            self.settle(&pending.target).await;
            self.state.send_replace(ChainState::Idle);
            self.processed.send_if_modified(|processed| {
                if pending.seq <= *processed {
                    return false;
                }
                *processed = pending.seq;
                true
            });
        }
        log::debug!("Icon worker stopped");
    }

    async fn settle(&mut self, target: &IconTarget) {
        match self.caps.badge_style {
            BadgeStyle::Composite => {
                let key = CacheKey::composite(&target.source, target.badge);
                self.update_icon(key, &target.source).await;
            }
            BadgeStyle::Overlay => {
                self.update_icon(CacheKey::plain(&target.source), &target.source).await;
                self.update_overlay(target.badge).await;
            }
            BadgeStyle::Native => {
                log::debug!("Platform draws its own badges; no icon update");
            }
        }
    }

    async fn update_icon(&mut self, key: CacheKey, source: &IconSource) {
        if self.applied_icon.as_ref() == Some(&key) {
            return;
        }

        let icon = match self.cache.get(&key) {
            Some(icon) => {
                log::debug!("Window icon cache hit for {} ({})", source, key.badge);
                icon
            }
            None => match self.compose_icon(source, key.badge).await {
                Ok(set) => self.cache.insert(key.clone(), set),
                Err(e) => {
                    log::warn!("Keeping current window icon: {}", e);
                    return;
                }
            },
        };

        self.state.send_replace(ChainState::Applying);
        self.surface.set_icon(icon);
        self.applied_icon = Some(key);
    }

    async fn update_overlay(&mut self, badge: BadgeValue) {
        if self.applied_overlay == Some(badge) {
            return;
        }

        let overlay = if badge.is_none() {
            None
        } else {
            let key = CacheKey::overlay(badge);
            match self.cache.get(&key) {
                Some(overlay) => Some(overlay),
                None => match self.compose_overlay(badge).await {
                    Ok(set) => set.map(|set| self.cache.insert(key, set)),
                    Err(e) => {
                        log::warn!("Keeping current overlay icon: {}", e);
                        return;
                    }
                },
            }
        };

        self.state.send_replace(ChainState::Applying);
        self.surface.set_overlay_icon(overlay, &badge.label());
        self.applied_overlay = Some(badge);
    }

    fn composer(&self) -> Composer {
        Composer::new(self.caps, self.surface.display_scale_factor())
    }

    async fn compose_icon(
        &self,
        source: &IconSource,
        badge: BadgeValue,
    ) -> Result<RepresentationSet, CompositionError> {
        self.state.send_replace(ChainState::Composing);
        let bytes = tokio::time::timeout(self.load_timeout, self.loader.load(source))
            .await
            .map_err(|_| CompositionError::SourceLoad {
                url: source.to_string(),
                reason: format!("no response within {:?}", self.load_timeout),
            })??;
        let composer = self.composer();

        run_blocking(move || {
            let image = SourceImage::decode(&bytes)?;
            composer.icon(&image, badge)
        })
        .await
    }

    async fn compose_overlay(&self, badge: BadgeValue) -> Result<Option<RepresentationSet>, CompositionError> {
        self.state.send_replace(ChainState::Composing);
        let composer = self.composer();

        run_blocking(move || composer.overlay(badge)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CompositionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CompositionError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(CompositionError::Interrupted),
    }
}
