//! Engine bootstrap and teardown.
//!
//! The controller is driven once per frame by [`LifecycleController::tick`]
//! with the current time and container size:
//!
//! 1. Wait for the boundary dataset. A failed load is terminal.
//! 2. Poll the container size on a fixed delay until it has a nonzero area,
//!    giving up after a bounded number of attempts.
//! 3. Initialize the engine and emit [`LifecycleEvent::Ready`] with its handle.
//!
//! Once ready, container size changes go through a [`ResizeDebouncer`] so a
//! burst of layout changes produces a single redraw.

use crate::config::EngineConfig;
use crate::engine::{EngineHandle, RenderEngine};
use crate::error::EngineError;
use crate::geo::{BoundaryFeature, DatasetChannel, DatasetSource, Viewport};
use crate::render::default_markers;
use eframe::egui::{self, Vec2};
use std::time::Duration;
use web_time::Instant;

/// Outcome of one sizing poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingOutcome {
    /// The next attempt is not due yet.
    NotDue,
    /// The container has a usable size.
    Sized(Viewport),
    /// Zero size; another attempt is scheduled.
    Retry { attempt: u32 },
    /// Zero size on the last allowed attempt.
    TimedOut { attempts: u32 },
}

/// Bounded fixed-delay retry for reading the container size.
#[derive(Debug, Clone)]
pub struct SizingRetry {
    delay: Duration,
    max_attempts: u32,
    attempts: u32,
    next_attempt_at: Option<Instant>,
}

impl SizingRetry {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: max_attempts.max(1),
            attempts: 0,
            next_attempt_at: None,
        }
    }

    /// Arms the retry; the first attempt is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.attempts = 0;
        self.next_attempt_at = Some(now);
    }

    /// Makes an attempt with the size the container reports right now.
    pub fn attempt(&mut self, now: Instant, size: Viewport) -> SizingOutcome {
        let Some(due) = self.next_attempt_at else {
            return SizingOutcome::NotDue;
        };
        if now < due {
            return SizingOutcome::NotDue;
        }

        self.attempts += 1;
        if size.is_valid() {
            self.next_attempt_at = None;
            return SizingOutcome::Sized(size);
        }
        if self.attempts >= self.max_attempts {
            self.next_attempt_at = None;
            return SizingOutcome::TimedOut {
                attempts: self.attempts,
            };
        }

        self.next_attempt_at = Some(now + self.delay);
        SizingOutcome::Retry {
            attempt: self.attempts,
        }
    }

    pub fn next_attempt_at(&self) -> Option<Instant> {
        self.next_attempt_at
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn cancel(&mut self) {
        self.next_attempt_at = None;
    }
}

/// Coalesces container size changes into one update per quiet period.
///
/// Each change restarts the window; the latest size is released once no
/// further change has arrived for the full window.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<(Viewport, Instant)>,
    last_applied: Option<Viewport>,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_applied: None,
        }
    }

    /// Records the size the current projection was built for.
    pub fn set_baseline(&mut self, size: Viewport) {
        self.last_applied = Some(size);
        self.pending = None;
    }

    /// Reports the container size observed at `now`.
    pub fn notify(&mut self, size: Viewport, now: Instant) {
        match self.pending {
            Some((pending, _)) if pending == size => {}
            None if self.last_applied == Some(size) => {}
            _ => self.pending = Some((size, now)),
        }
    }

    /// Releases the pending size once the window has elapsed quietly.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (size, since) = self.pending?;
        if now.saturating_duration_since(since) < self.window {
            return None;
        }
        self.pending = None;
        if self.last_applied == Some(size) {
            return None;
        }
        self.last_applied = Some(size);
        Some(size)
    }

    /// When the pending size will be released, if one is waiting.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, since)| since + self.window)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Bootstrap phase.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecyclePhase {
    Idle,
    LoadingData,
    AcquiringContainer,
    Ready,
    Failed(EngineError),
    Disposed,
}

/// Notification for the host application.
#[derive(Debug)]
pub enum LifecycleEvent {
    /// Delivered exactly once, after the first full draw.
    Ready(EngineHandle),
    /// Terminal bootstrap failure; the engine never becomes ready.
    Failed(EngineError),
}

/// Brings a [`RenderEngine`] from mount to ready, and tears it down.
pub struct LifecycleController {
    config: EngineConfig,
    phase: LifecyclePhase,
    dataset: Option<DatasetChannel>,
    boundaries: Option<Vec<BoundaryFeature>>,
    sizing: SizingRetry,
    resize: ResizeDebouncer,
    engine: RenderEngine,
}

impl LifecycleController {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.validated();
        Self {
            sizing: SizingRetry::new(config.sizing_retry_delay(), config.sizing_max_attempts),
            resize: ResizeDebouncer::new(config.resize_debounce()),
            engine: RenderEngine::new(config.initial_mode, config.viewport_padding_px),
            phase: LifecyclePhase::Idle,
            dataset: None,
            boundaries: None,
            config,
        }
    }

    /// Starts the bootstrap by requesting the boundary dataset.
    pub fn mount(&mut self, source: DatasetSource, ctx: Option<egui::Context>) {
        if self.phase != LifecyclePhase::Idle {
            log::warn!("mount called in phase {:?}", self.phase);
            return;
        }

        if let Some(ctx) = &ctx {
            self.engine.set_repaint_context(ctx.clone());
        }
        self.engine.begin_sizing();

        let channel = DatasetChannel::new();
        channel.load(source, ctx);
        self.dataset = Some(channel);
        self.phase = LifecyclePhase::LoadingData;
    }

    /// Advances the bootstrap or, once ready, applies queued work.
    pub fn tick(&mut self, now: Instant, container: Vec2) -> Option<LifecycleEvent> {
        match self.phase {
            LifecyclePhase::LoadingData => {
                let result = self.dataset.as_ref()?.try_recv()?;
                match result {
                    Ok(features) => {
                        log::info!(
                            "Loaded {} boundary features ({} vertices)",
                            features.len(),
                            features.iter().map(BoundaryFeature::vertex_count).sum::<usize>()
                        );
                        self.boundaries = Some(features);
                        self.phase = LifecyclePhase::AcquiringContainer;
                        self.sizing.start(now);
                        self.acquire_container(now, container)
                    }
                    Err(e) => {
                        log::error!("Map initialization aborted: {}", e);
                        Some(self.fail(e))
                    }
                }
            }
            LifecyclePhase::AcquiringContainer => self.acquire_container(now, container),
            LifecyclePhase::Ready => {
                self.engine.process_commands();
                self.resize.notify(Viewport::from(container), now);
                if let Some(viewport) = self.resize.poll(now) {
                    if let Err(e) = self.engine.resize(viewport) {
                        log::warn!("Resize ignored: {}", e);
                    }
                }
                None
            }
            LifecyclePhase::Idle | LifecyclePhase::Failed(_) | LifecyclePhase::Disposed => None,
        }
    }

    fn acquire_container(&mut self, now: Instant, container: Vec2) -> Option<LifecycleEvent> {
        match self.sizing.attempt(now, Viewport::from(container)) {
            SizingOutcome::NotDue => None,
            SizingOutcome::Retry { attempt } => {
                log::debug!(
                    "Container not laid out yet (attempt {}/{})",
                    attempt,
                    self.config.sizing_max_attempts
                );
                None
            }
            SizingOutcome::TimedOut { attempts } => {
                let error = EngineError::SizingTimeout { attempts };
                log::error!("Map initialization aborted: {}", error);
                Some(self.fail(error))
            }
            SizingOutcome::Sized(viewport) => {
                let boundaries = self.boundaries.take().unwrap_or_default();
                match self.engine.initialize(
                    viewport,
                    boundaries,
                    default_markers(),
                    self.config.initial_center,
                ) {
                    Ok(handle) => {
                        log::debug!("Container sized after {} attempt(s)", self.sizing.attempts());
                        if self.engine.basemap().shapes().is_empty() {
                            log::warn!("Boundary dataset has no drawable polygons");
                        }
                        self.resize.set_baseline(viewport);
                        self.dataset = None;
                        self.phase = LifecyclePhase::Ready;
                        Some(LifecycleEvent::Ready(handle))
                    }
                    Err(e) => {
                        log::error!("Map initialization failed: {}", e);
                        Some(self.fail(e))
                    }
                }
            }
        }
    }

    fn fail(&mut self, error: EngineError) -> LifecycleEvent {
        self.sizing.cancel();
        self.dataset = None;
        self.boundaries = None;
        self.phase = LifecyclePhase::Failed(error.clone());
        LifecycleEvent::Failed(error)
    }

    /// How long the frame loop may sleep before the next tick is needed.
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        let at = match self.phase {
            LifecyclePhase::AcquiringContainer => self.sizing.next_attempt_at(),
            LifecyclePhase::Ready => self.resize.deadline(),
            _ => None,
        }?;
        Some(at.saturating_duration_since(now))
    }

    /// Cancels pending work and releases the engine. Irreversible.
    pub fn dispose(&mut self) {
        if self.phase == LifecyclePhase::Disposed {
            return;
        }
        self.sizing.cancel();
        self.resize.clear();
        self.dataset = None;
        self.boundaries = None;
        self.engine.dispose();
        self.phase = LifecyclePhase::Disposed;
        log::info!("Map torn down after {} draws", self.engine.draw_count());
    }

    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RenderEngine {
        &mut self.engine
    }
}
