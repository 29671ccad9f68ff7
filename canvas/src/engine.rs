use tracing::{debug, info, warn};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::consts::{CURSOR_DRAGGING, CURSOR_IDLE};
use crate::error::CanvasError;
use crate::export;
use crate::input::{DragSession, InputState, MouseEvent, PointerEvent, PointerSource, TouchEvent};
use crate::photo::{Frame, Photo};
use crate::render::{Compositor, Surface};
use crate::store::{Transform, TransformStore};
use crate::viewport::{DisplayRect, Point, SurfaceSize};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The surface changed and should be presented.
    RenderNeeded,
    /// The host should switch the surface element's cursor.
    SetCursor(String),
    /// A new photo replaced the previous one; zoom controls reset to 1.
    PhotoLoaded { width: u32, height: u32, transform: Transform },
    /// The uploaded file could not be decoded; the previous photo remains.
    DecodeFailed { message: String },
}

/// Whether an upload is being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Ready,
    Decoding,
}

/// Engine state and logic that does not need the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every mutation that changes the placement redraws synchronously before
/// returning, so the surface always reflects the latest state.
pub struct EngineCore {
    store: TransformStore,
    compositor: Compositor,
    input: InputState,
    display: DisplayRect,
    upload: UploadState,
}

impl EngineCore {
    /// Create an engine on the default 1080px surface.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self::with_surface(frame, SurfaceSize::default())
    }

    #[must_use]
    pub fn with_surface(frame: Frame, size: SurfaceSize) -> Self {
        let mut core = Self {
            store: TransformStore::new(size),
            compositor: Compositor::new(frame, size),
            input: InputState::Idle,
            display: DisplayRect::default(),
            upload: UploadState::Ready,
        };
        core.redraw();
        core
    }

    // --- Geometry ---

    /// Record the surface element's current on-screen bounding box.
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.display = rect;
    }

    /// Change the backing raster size. The photo keeps its transform; the
    /// next zoom picks up the new cover-fit base. Zero-sized surfaces are
    /// ignored.
    pub fn set_surface_size(&mut self, size: SurfaceSize) -> Vec<Action> {
        if !self.store.set_surface(size) {
            warn!(width = size.width, height = size.height, "ignoring zero-sized surface");
            return Vec::new();
        }
        self.compositor.resize(size);
        self.redraw();
        vec![Action::RenderNeeded]
    }

    // --- Upload ---

    /// Enter the loading sub-state before decoding an upload.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UploadInProgress`] if a decode is already pending.
    pub fn begin_upload(&mut self) -> Result<(), CanvasError> {
        if self.upload == UploadState::Decoding {
            return Err(CanvasError::UploadInProgress);
        }
        self.upload = UploadState::Decoding;
        debug!("upload decode started");
        Ok(())
    }

    /// Apply the outcome of a decode and leave the loading sub-state.
    ///
    /// A failure leaves the previous photo and transform untouched.
    pub fn finish_upload(&mut self, result: Result<Photo, CanvasError>) -> Vec<Action> {
        self.upload = UploadState::Ready;
        match result {
            Ok(photo) => self.load_photo(photo),
            Err(e) => {
                warn!(error = %e, "photo decode failed");
                vec![Action::DecodeFailed { message: e.to_string() }]
            }
        }
    }

    /// Replace the photo, reset to cover-fit, and redraw.
    pub fn load_photo(&mut self, photo: Photo) -> Vec<Action> {
        let (width, height) = (photo.width(), photo.height());
        let transform = self.store.load_photo(photo);
        info!(width, height, scale = transform.scale, "photo loaded");

        let mut actions = Vec::new();
        if self.input.is_dragging() {
            self.input = InputState::Idle;
            actions.push(Action::SetCursor(CURSOR_IDLE.to_owned()));
        }
        self.redraw();
        actions.push(Action::PhotoLoaded { width, height, transform });
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Input events ---

    pub fn on_mouse(&mut self, ev: &MouseEvent) -> Vec<Action> {
        self.on_pointer(ev.to_pointer())
    }

    pub fn on_touch(&mut self, ev: &TouchEvent) -> Vec<Action> {
        match ev.to_pointer() {
            Some(pointer) => self.on_pointer(pointer),
            None => Vec::new(),
        }
    }

    /// Drive the drag state machine with one pointer event.
    pub fn on_pointer(&mut self, ev: PointerEvent) -> Vec<Action> {
        match ev {
            PointerEvent::Down { source, pos } => self.pointer_down(source, pos),
            PointerEvent::Move { source, pos } => self.pointer_move(source, pos),
            PointerEvent::Up { source } | PointerEvent::Cancel { source } => self.pointer_up(source),
        }
    }

    /// Set the zoom multiplier relative to the cover-fit scale.
    pub fn on_zoom(&mut self, multiplier: f64) -> Vec<Action> {
        if !self.store.set_scale(multiplier) {
            return Vec::new();
        }
        self.redraw();
        vec![Action::RenderNeeded]
    }

    fn pointer_down(&mut self, source: PointerSource, pos: Point) -> Vec<Action> {
        if let InputState::Dragging(active) = self.input {
            debug!(?source, owner = ?active.source, "pointer-down ignored during active drag");
            return Vec::new();
        }
        if !self.store.has_photo() {
            return Vec::new();
        }
        let Some(p) = self.surface_point(pos) else {
            return Vec::new();
        };

        let t = self.store.transform();
        let anchor = Point::new(p.x - t.offset_x, p.y - t.offset_y);
        self.input = InputState::Dragging(DragSession { source, anchor });
        debug!(?source, x = p.x, y = p.y, "drag started");
        vec![Action::SetCursor(CURSOR_DRAGGING.to_owned())]
    }

    fn pointer_move(&mut self, source: PointerSource, pos: Point) -> Vec<Action> {
        let InputState::Dragging(session) = self.input else {
            return Vec::new();
        };
        if session.source != source {
            return Vec::new();
        }
        let Some(p) = self.surface_point(pos) else {
            return Vec::new();
        };

        self.store.set_offset(p.x - session.anchor.x, p.y - session.anchor.y);
        self.redraw();
        vec![Action::RenderNeeded]
    }

    fn pointer_up(&mut self, source: PointerSource) -> Vec<Action> {
        match self.input {
            InputState::Dragging(session) if session.source == source => {
                self.input = InputState::Idle;
                let t = self.store.transform();
                debug!(?source, offset_x = t.offset_x, offset_y = t.offset_y, "drag ended");
                vec![Action::SetCursor(CURSOR_IDLE.to_owned())]
            }
            _ => Vec::new(),
        }
    }

    fn surface_point(&self, client: Point) -> Option<Point> {
        self.display.to_surface(client, self.store.surface())
    }

    // --- Render ---

    /// Repaint the surface from the current state.
    pub fn redraw(&mut self) {
        self.compositor.redraw(&self.store);
    }

    // --- Export ---

    /// PNG of the full surface, or `None` while no photo is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Encode`] if encoding fails.
    pub fn export_png(&self) -> Result<Option<Vec<u8>>, CanvasError> {
        if !self.store.has_photo() {
            return Ok(None);
        }
        export::encode_png(self.compositor.surface()).map(Some)
    }

    /// PNG data URL of the full surface, or `None` while no photo is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Encode`] if encoding fails.
    pub fn export_data_url(&self) -> Result<Option<String>, CanvasError> {
        Ok(self.export_png()?.map(|png| export::png_data_url(&png)))
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.store.transform()
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.store.zoom()
    }

    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.store.has_photo()
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn upload_state(&self) -> UploadState {
        self.upload
    }

    /// Whether an upload is being decoded.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.upload == UploadState::Decoding
    }

    #[must_use]
    pub fn display_rect(&self) -> DisplayRect {
        self.display
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        self.compositor.surface()
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
///
/// The element's backing store is fixed at the surface size; its CSS size is
/// free. The bounding rect is re-read before each pointer event so layout
/// changes never skew the coordinate mapping.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Bind a new engine to `canvas` and paint the frame.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if the 2D context is unavailable.
    pub fn new(canvas: HtmlCanvasElement, frame: Frame) -> Result<Self, CanvasError> {
        let size = SurfaceSize::default();
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        let ctx = canvas
            .get_context("2d")
            .map_err(host_error)?
            .ok_or_else(|| CanvasError::Host("2d context unavailable".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(host_error)?;

        let mut engine = Self { canvas, ctx, core: EngineCore::with_surface(frame, size) };
        engine.sync_display_rect();
        engine.present()?;
        Ok(engine)
    }

    /// Re-read the element's bounding client rect.
    pub fn sync_display_rect(&mut self) {
        let rect = self.canvas.get_bounding_client_rect();
        self.core
            .set_display_rect(DisplayRect::new(rect.left(), rect.top(), rect.width(), rect.height()));
    }

    // --- Delegated inputs ---

    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if presenting the surface fails.
    pub fn on_mouse(&mut self, ev: &MouseEvent) -> Result<Vec<Action>, CanvasError> {
        self.sync_display_rect();
        let actions = self.core.on_mouse(ev);
        self.apply(actions)
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if presenting the surface fails.
    pub fn on_touch(&mut self, ev: &TouchEvent) -> Result<Vec<Action>, CanvasError> {
        self.sync_display_rect();
        let actions = self.core.on_touch(ev);
        self.apply(actions)
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if presenting the surface fails.
    pub fn on_zoom(&mut self, multiplier: f64) -> Result<Vec<Action>, CanvasError> {
        let actions = self.core.on_zoom(multiplier);
        self.apply(actions)
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::UploadInProgress`] while a decode is pending.
    pub fn begin_upload(&mut self) -> Result<(), CanvasError> {
        self.core.begin_upload()
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if presenting the surface fails.
    pub fn finish_upload(&mut self, result: Result<Photo, CanvasError>) -> Result<Vec<Action>, CanvasError> {
        let actions = self.core.finish_upload(result);
        self.apply(actions)
    }

    // --- Render ---

    /// Copy the surface into the canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Host`] if the browser rejects the image data.
    pub fn present(&self) -> Result<(), CanvasError> {
        let surface = self.core.surface();
        let size = surface.size();
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(surface.as_bytes()), size.width, size.height)
            .map_err(host_error)?;
        self.ctx.put_image_data(&data, 0.0, 0.0).map_err(host_error)
    }

    fn apply(&self, actions: Vec<Action>) -> Result<Vec<Action>, CanvasError> {
        if actions.contains(&Action::RenderNeeded) {
            self.present()?;
        }
        Ok(actions)
    }
}

fn host_error<T: Into<JsValue>>(value: T) -> CanvasError {
    CanvasError::Host(format!("{:?}", value.into()))
}
