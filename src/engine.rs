//! Render engine: owns the projection and the three map layers.
//!
//! The engine moves through `Uninitialized -> Sizing -> Ready`, with
//! navigation and resize passing briefly through `Navigating`/`Resizing`
//! before settling back to `Ready`. Every reprojection redraws basemap,
//! rings and markers back-to-back with the same projection, tagged with a
//! fresh revision number.
//!
//! Callers outside the frame loop talk to the engine through an
//! [`EngineHandle`], which queues commands that the engine applies at the
//! start of the next frame.

use crate::error::EngineError;
use crate::geo::{compute_scale, BoundaryFeature, GeoPoint, MapProjection, Viewport};
use crate::render::{
    paint_basemap, paint_markers, paint_rings, paint_tooltip, BasemapLayer, MarkerFeature,
    MarkerLayer, ReconcileStats, RingLayer, RingMode,
};
use eframe::egui::{self, Painter, Pos2, Rect};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Sizing,
    Ready,
    Navigating,
    Resizing,
    Disposed,
}

/// Commands accepted through an [`EngineHandle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    NavigateTo(GeoPoint),
}

/// Caller-facing handle delivered when the engine becomes ready.
///
/// Cloneable and cheap; all mutation happens inside the engine.
#[derive(Clone)]
pub struct EngineHandle {
    sender: Sender<EngineCommand>,
    ctx: Option<egui::Context>,
}

impl EngineHandle {
    /// Re-centers the map on the given coordinate.
    ///
    /// Out-of-range coordinates are ignored with a warning. Once the engine
    /// has been disposed the call is logged and dropped.
    pub fn navigate_to(&self, longitude: f64, latitude: f64) {
        let point = match GeoPoint::new(longitude, latitude) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Ignoring navigation request: {}", e);
                return;
            }
        };

        if self.sender.send(EngineCommand::NavigateTo(point)).is_err() {
            log::warn!("Navigation to {} dropped: {}", point, EngineError::Disposed);
            return;
        }
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").finish_non_exhaustive()
    }
}

/// Orchestrates projection and layers.
pub struct RenderEngine {
    state: EngineState,
    mode: RingMode,
    padding_px: f32,
    projection: Option<MapProjection>,

    boundaries: Vec<BoundaryFeature>,
    markers: Vec<MarkerFeature>,

    basemap: BasemapLayer,
    rings: RingLayer,
    marker_layer: MarkerLayer,

    /// Bumped on every reprojection.
    revision: u64,
    /// Number of full three-layer draws.
    draw_count: u64,

    commands: Option<(Sender<EngineCommand>, Receiver<EngineCommand>)>,
    ctx: Option<egui::Context>,
}

impl RenderEngine {
    pub fn new(mode: RingMode, padding_px: f32) -> Self {
        Self {
            state: EngineState::Uninitialized,
            mode,
            padding_px,
            projection: None,
            boundaries: Vec::new(),
            markers: Vec::new(),
            basemap: BasemapLayer::new(),
            rings: RingLayer::new(),
            marker_layer: MarkerLayer::new(),
            revision: 0,
            draw_count: 0,
            commands: Some(channel()),
            ctx: None,
        }
    }

    /// Context used by handles to wake the frame loop after queueing a command.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.ctx = Some(ctx);
    }

    /// `Uninitialized -> Sizing`.
    pub fn begin_sizing(&mut self) {
        if self.state == EngineState::Uninitialized {
            self.state = EngineState::Sizing;
        } else {
            log::warn!("begin_sizing called in state {:?}", self.state);
        }
    }

    /// `Sizing -> Ready`: builds the projection and performs the first draw.
    pub fn initialize(
        &mut self,
        viewport: Viewport,
        boundaries: Vec<BoundaryFeature>,
        markers: Vec<MarkerFeature>,
        center: GeoPoint,
    ) -> Result<EngineHandle, EngineError> {
        match self.state {
            EngineState::Sizing => {}
            EngineState::Disposed => return Err(EngineError::Disposed),
            _ => {
                return Err(EngineError::InvalidInput(format!(
                    "cannot initialize in state {:?}",
                    self.state
                )))
            }
        }
        if !viewport.is_valid() {
            return Err(EngineError::InvalidInput(format!(
                "viewport {}x{} has no area",
                viewport.width, viewport.height
            )));
        }
        let center = center.validate()?;

        let scale = compute_scale(viewport, self.mode, self.padding_px);
        self.projection = Some(MapProjection::new(center, scale, viewport));
        self.boundaries = boundaries;
        self.markers = markers;

        self.draw_all();
        self.state = EngineState::Ready;
        log::info!(
            "Map engine ready: {}x{} viewport, scale {:.1} px/rad, {} countries",
            viewport.width,
            viewport.height,
            scale,
            self.boundaries.len()
        );

        self.handle()
    }

    /// Creates another handle to this engine. Only a ready engine hands
    /// out handles.
    fn handle(&self) -> Result<EngineHandle, EngineError> {
        self.ensure_ready()?;
        match &self.commands {
            Some((sender, _)) => Ok(EngineHandle {
                sender: sender.clone(),
                ctx: self.ctx.clone(),
            }),
            None => Err(EngineError::Disposed),
        }
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => Ok(()),
            EngineState::Disposed => Err(EngineError::Disposed),
            _ => Err(EngineError::NotReady),
        }
    }

    /// Re-centers on `point` and redraws all layers.
    pub fn navigate_to(&mut self, point: GeoPoint) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let point = point.validate()?;

        self.state = EngineState::Navigating;
        if let Some(projection) = self.projection.as_mut() {
            projection.set_center(point);
            projection.set_scale(compute_scale(projection.viewport(), self.mode, self.padding_px));
        }
        let stats = self.draw_all();
        self.state = EngineState::Ready;

        log::debug!(
            "Navigated to {}: {:?} ({:?})",
            point,
            self.projection.as_ref().map(MapProjection::state),
            stats
        );
        Ok(())
    }

    /// Applies a new container size and redraws all layers.
    ///
    /// Before the engine is ready this is a no-op; the first draw derives
    /// its projection from the size at that moment.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        self.ensure_ready()?;
        if !viewport.is_valid() {
            return Err(EngineError::InvalidInput(format!(
                "viewport {}x{} has no area",
                viewport.width, viewport.height
            )));
        }

        self.state = EngineState::Resizing;
        if let Some(projection) = self.projection.as_mut() {
            projection.set_viewport(viewport);
            projection.set_scale(compute_scale(viewport, self.mode, self.padding_px));
        }
        let stats = self.draw_all();
        self.state = EngineState::Ready;

        log::debug!(
            "Resized to {}x{} ({:?})",
            viewport.width,
            viewport.height,
            stats
        );
        Ok(())
    }

    /// Switches the ring metric, rescaling and redrawing when ready.
    ///
    /// Before the first draw the mode is only recorded.
    pub fn set_metric_mode(&mut self, mode: RingMode) -> Result<(), EngineError> {
        if self.state == EngineState::Disposed {
            return Err(EngineError::Disposed);
        }
        if mode == self.mode {
            return Ok(());
        }
        self.mode = mode;
        if self.state != EngineState::Ready {
            return Ok(());
        }

        if let Some(projection) = self.projection.as_mut() {
            projection.set_scale(compute_scale(projection.viewport(), mode, self.padding_px));
        }
        let stats = self.draw_all();
        log::debug!("Ring mode set to {} ({:?})", mode.label(), stats);
        Ok(())
    }

    /// Routes a container-local pointer position to the hover handlers.
    pub fn pointer_moved(&mut self, pos: Option<Pos2>) {
        if self.state != EngineState::Ready {
            return;
        }
        self.rings.pointer_moved(pos);
        self.marker_layer.pointer_moved(pos);
    }

    /// Applies commands queued through handles. Returns how many ran.
    pub fn process_commands(&mut self) -> usize {
        let pending: Vec<EngineCommand> = match &self.commands {
            Some((_, receiver)) => receiver.try_iter().collect(),
            None => return 0,
        };

        for command in &pending {
            match *command {
                EngineCommand::NavigateTo(point) => {
                    if let Err(e) = self.navigate_to(point) {
                        log::warn!("Navigation to {} ignored: {}", point, e);
                    }
                }
            }
        }
        pending.len()
    }

    /// Releases all layers and the command channel. Irreversible.
    pub fn dispose(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }
        self.basemap.clear();
        self.rings.clear();
        self.marker_layer.clear();
        self.projection = None;
        self.boundaries.clear();
        self.markers.clear();
        self.commands = None;
        self.ctx = None;
        self.state = EngineState::Disposed;
        log::info!("Map engine disposed");
    }

    /// Redraws the three layers with the current projection, in paint order.
    fn draw_all(&mut self) -> ReconcileStats {
        let Some(projection) = self.projection.as_ref() else {
            return ReconcileStats::default();
        };
        self.revision += 1;
        let revision = self.revision;

        let basemap = self.basemap.render(&self.boundaries, projection, revision);
        let rings = self.rings.render(self.mode, projection, revision);
        let markers = self.marker_layer.render(&self.markers, projection, revision);
        self.draw_count += 1;

        ReconcileStats {
            entered: basemap.entered + rings.entered + markers.entered,
            updated: basemap.updated + rings.updated + markers.updated,
            exited: basemap.exited + rings.exited + markers.exited,
        }
    }

    /// Paints the scene into `rect`, whose size should match the viewport.
    pub fn paint(&self, painter: &Painter, rect: Rect) {
        if self.state != EngineState::Ready {
            return;
        }
        let offset = rect.min.to_vec2();
        paint_basemap(painter, offset, &self.basemap);
        paint_rings(painter, offset, &self.rings);
        paint_markers(painter, offset, &self.marker_layer);
        paint_tooltip(painter, offset, self.rings.tooltip());
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mode(&self) -> RingMode {
        self.mode
    }

    pub fn projection(&self) -> Option<&MapProjection> {
        self.projection.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn basemap(&self) -> &BasemapLayer {
        &self.basemap
    }

    pub fn rings(&self) -> &RingLayer {
        &self.rings
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.marker_layer
    }
}
