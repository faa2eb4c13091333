use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use ab_glyph::FontArc;
use rand::Rng;
use softbuffer::{Context as SoftContext, Surface};
use tracing::{debug, error, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::error::Error;
use crate::image_source::{DecodedImage, ImageSource};
use crate::presenter::{Action, Frontend, Presenter, Tone, Widget};
use crate::session::Mode;
use crate::ui::draw::{Canvas, Color, Rect};

const ROW_HEIGHT: f32 = 32.0;
const ROW_GAP: f32 = 6.0;
const CONTROLS_PAD: f32 = 10.0;
const MIN_WIDTH: u32 = 420;
const BUTTON_WIDTH: f32 = 300.0;
const TEXT_SIZE: f32 = 18.0;
const LABEL_TEXT_SIZE: f32 = 22.0;

type WindowHandle = Arc<Window>;

#[derive(Debug, Clone, Default)]
struct WidgetState {
    text: String,
    tone: Tone,
    enabled: bool,
}

/// Widget state mirrored from the presenter, plus the photo as drawn.
struct DrillView {
    mode: Mode,
    title: String,
    photo: Option<DecodedImage>,
    widgets: HashMap<Widget, WidgetState>,
    hovered: Option<Widget>,
}

impl DrillView {
    fn new(mode: Mode) -> Self {
        let widgets = Widget::layout(mode)
            .into_iter()
            .map(|w| (w, WidgetState::default()))
            .collect();
        Self {
            mode,
            title: String::new(),
            photo: None,
            widgets,
            hovered: None,
        }
    }

    fn controls_height(&self) -> u32 {
        let rows = Widget::layout(self.mode).len() as f32;
        (CONTROLS_PAD * 2.0 + rows * ROW_HEIGHT + (rows - 1.0) * ROW_GAP).ceil() as u32
    }

    fn preferred_size(&self) -> PhysicalSize<u32> {
        let (w, h) = self
            .photo
            .as_ref()
            .map_or((0, 0), DecodedImage::native_size);
        PhysicalSize::new(w.max(MIN_WIDTH), h + self.controls_height())
    }

    // Photo is centered at the top; controls stack below the space it reserves.
    fn row_rects(&self, width: u32) -> Vec<(Widget, Rect)> {
        let photo_height = self.photo.as_ref().map_or(0, |p| p.height) as f32;
        let button_width = BUTTON_WIDTH.min(width as f32 - 2.0 * CONTROLS_PAD);
        let left = (width as f32 - button_width) * 0.5;
        let mut top = photo_height + CONTROLS_PAD;
        Widget::layout(self.mode)
            .into_iter()
            .map(|widget| {
                let rect = if widget.is_button() {
                    Rect::new(left, top, button_width, ROW_HEIGHT)
                } else {
                    Rect::new(CONTROLS_PAD, top, width as f32 - 2.0 * CONTROLS_PAD, ROW_HEIGHT)
                };
                top += ROW_HEIGHT + ROW_GAP;
                (widget, rect)
            })
            .collect()
    }

    fn hit_test(&self, width: u32, x: f32, y: f32) -> Option<Widget> {
        self.row_rects(width)
            .into_iter()
            .find(|(widget, rect)| widget.is_button() && rect.contains(x, y))
            .map(|(widget, _)| widget)
    }

    fn render(&self, font: &FontArc, buffer: &mut [u32], width: u32, height: u32) {
        let mut canvas = Canvas::new(buffer, width, height);
        canvas.clear(Color::from_rgb(0xf0f0f0));

        if let Some(photo) = &self.photo {
            let left = (i64::from(width) - i64::from(photo.width)) / 2;
            canvas.blit(photo, left, 0);
        }

        for (widget, rect) in self.row_rects(width) {
            let Some(state) = self.widgets.get(&widget) else {
                continue;
            };
            if widget.is_button() {
                let (face, border) = if !state.enabled {
                    (Color::from_rgb(0xe2e2e2), Color::from_rgb(0xc4c4c4))
                } else if self.hovered == Some(widget) {
                    (Color::from_rgb(0xdde8f7), Color::from_rgb(0x2458bc))
                } else {
                    (Color::from_rgb(0xfafafa), Color::from_rgb(0x9a9a9a))
                };
                canvas.rounded_rect(rect, 6.0, border);
                canvas.rounded_rect(
                    Rect::new(rect.left + 1.0, rect.top + 1.0, rect.width() - 2.0, rect.height() - 2.0),
                    5.0,
                    face,
                );
            }
            let size = if widget.is_button() {
                TEXT_SIZE
            } else {
                LABEL_TEXT_SIZE
            };
            let color = text_color(state.tone, state.enabled || !widget.is_button(), widget);
            canvas.text_centered(font, &state.text, size, color, rect);
        }
    }
}

fn text_color(tone: Tone, enabled: bool, widget: Widget) -> Color {
    match tone {
        Tone::Success => Color::from_rgb(0x1f8f3a),
        Tone::Failure => Color::from_rgb(0xc62828),
        Tone::Muted => Color::from_rgb(0x9a9a9a),
        Tone::Plain if !enabled => Color::from_rgb(0x8a8a8a),
        Tone::Plain if widget == Widget::Message => Color::from_rgb(0x1f4fbf),
        Tone::Plain => Color::from_rgb(0x111111),
    }
}

impl Frontend for DrillView {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn display(&mut self, image: &DecodedImage, width: u32, height: u32) {
        match image.resized(width.max(1), height.max(1)) {
            Ok(scaled) => self.photo = Some(scaled),
            Err(err) => {
                warn!(error = ?err, "failed to scale photo for display");
                self.photo = None;
            }
        }
    }

    fn clear_image(&mut self) {
        self.photo = None;
    }

    fn set_text(&mut self, widget: Widget, text: &str, tone: Tone) {
        let state = self.widgets.entry(widget).or_default();
        state.text = text.to_string();
        state.tone = tone;
    }

    fn set_enabled(&mut self, widget: Widget, enabled: bool) {
        self.widgets.entry(widget).or_default().enabled = enabled;
    }
}

struct DrillApp<R, S> {
    presenter: Presenter<R, S>,
    view: DrillView,
    font: FontArc,
    fallback_screen: (u32, u32),
    window: Option<WindowHandle>,
    context: Option<SoftContext<WindowHandle>>,
    surface: Option<Surface<WindowHandle, WindowHandle>>,
    cursor: PhysicalPosition<f64>,
    needs_redraw: bool,
    failure: Option<Error>,
}

impl<R: Rng, S: ImageSource> DrillApp<R, S> {
    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Error> {
        if self.window.is_some() {
            return Ok(());
        }

        let screen = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .map(|monitor| monitor.size())
            .filter(|size| size.width > 0 && size.height > 0)
            .map_or(self.fallback_screen, |size| (size.width, size.height));
        self.presenter.start(&mut self.view, screen);

        let attrs = Window::default_attributes()
            .with_title(self.view.title.clone())
            .with_inner_size(self.view.preferred_size())
            .with_resizable(false);
        let window = event_loop
            .create_window(attrs)
            .map_err(|err| Error::Display(format!("failed to create window: {err}")))?;
        let window = WindowHandle::new(window);

        let context = SoftContext::new(window.clone())
            .map_err(|err| Error::Display(format!("failed to create softbuffer context: {err}")))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| Error::Display(format!("failed to create softbuffer surface: {err}")))?;

        self.context = Some(context);
        self.surface = Some(surface);
        self.handle_resize(window.inner_size());
        self.window = Some(window);
        self.needs_redraw = true;
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(surface) = self.surface.as_mut()
            && let (Some(width), Some(height)) = (
                NonZeroU32::new(size.width.max(1)),
                NonZeroU32::new(size.height.max(1)),
            )
        {
            let _ = surface.resize(width, height);
            self.needs_redraw = true;
        }
    }

    fn dispatch(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.presenter.handle(action, &mut self.view) {
            error!(error = %err, "session cannot continue");
            self.failure = Some(err);
            event_loop.exit();
            return;
        }
        if let Some(window) = self.window.as_ref() {
            let preferred = self.view.preferred_size();
            if window.inner_size() != preferred {
                debug!(width = preferred.width, height = preferred.height, "resizing window");
                if let Some(size) = window.request_inner_size(preferred) {
                    self.handle_resize(size);
                }
            }
        }
        self.needs_redraw = true;
    }

    fn handle_click(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let width = window.inner_size().width;
        let hit = self
            .view
            .hit_test(width, self.cursor.x as f32, self.cursor.y as f32);
        if let Some(widget) = hit
            && self.view.widgets.get(&widget).is_some_and(|w| w.enabled)
            && let Some(action) = widget.action()
        {
            self.dispatch(action, event_loop);
        }
    }

    fn handle_key(&mut self, key: &Key, event_loop: &ActiveEventLoop) {
        let action = match key {
            Key::Named(NamedKey::Escape) => {
                event_loop.exit();
                return;
            }
            Key::Named(NamedKey::Space | NamedKey::Enter) => Some(self.presenter.default_action()),
            Key::Character(text) => match text.as_str() {
                "1" | "2" | "3" | "4" if self.view.mode == Mode::Quiz => text
                    .parse::<usize>()
                    .ok()
                    .map(|n| Action::Choose(n - 1)),
                _ => None,
            },
            _ => None,
        };
        if let Some(action) = action {
            self.dispatch(action, event_loop);
        }
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                if buffer.len() != (width as usize) * (height as usize) {
                    // surface has not caught up with a resize yet
                    return;
                }
                self.view.render(&self.font, &mut buffer, width, height);
                if let Err(err) = buffer.present() {
                    warn!(error = %err, "failed to present frame");
                }
            }
            Err(err) => warn!(error = %err, "failed to acquire frame buffer"),
        }
    }
}

impl<R: Rng, S: ImageSource> ApplicationHandler for DrillApp<R, S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.ensure_window(event_loop) {
            error!(error = %err, "window setup failed");
            self.failure = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => event_loop.exit(),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::RedrawRequested => self.render(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                let width = window.inner_size().width;
                let hovered = self
                    .view
                    .hit_test(width, position.x as f32, position.y as f32);
                if hovered != self.view.hovered {
                    self.view.hovered = hovered;
                    self.needs_redraw = true;
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(event_loop),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(&event.logical_key, event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.needs_redraw {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
            self.needs_redraw = false;
        }
    }
}

/// Open the drill window and run until it is closed.
///
/// # Errors
/// Returns [`Error::Display`] if the event loop or window cannot be created,
/// or the error that stopped the session.
pub fn run<R: Rng, S: ImageSource>(
    presenter: Presenter<R, S>,
    font: FontArc,
    fallback_screen: (u32, u32),
) -> Result<(), Error> {
    let mode = presenter.session().mode();
    let event_loop =
        EventLoop::new().map_err(|err| Error::Display(format!("failed to start event loop: {err}")))?;
    let mut app = DrillApp {
        presenter,
        view: DrillView::new(mode),
        font,
        fallback_screen,
        window: None,
        context: None,
        surface: None,
        cursor: PhysicalPosition::new(0.0, 0.0),
        needs_redraw: true,
        failure: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|err| Error::Display(format!("event loop failed: {err}")))?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
