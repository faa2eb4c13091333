//! Binds a [`Session`] to a UI through the [`Frontend`] capability trait.
//!
//! Widgets are addressed by identity and user input arrives as [`Action`]s,
//! so the presenter never holds UI callbacks.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::image_source::{DecodedImage, ImageSource};
use crate::session::{AnswerOutcome, Mode, OptionStatus, QUIZ_OPTION_COUNT, Session};
use crate::sizing::SizingPolicy;

pub const TITLE: &str = "Student Name Learning App";
pub const QUIZ_TITLE: &str = "Student Name Learning App - Quiz Mode";
pub const REVEAL_LABEL: &str = "Show Name";
pub const NEXT_LABEL: &str = "Next Photo";
pub const CORRECT_MESSAGE: &str = "Well done!";
pub const WRONG_MESSAGE: &str = "Try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    /// Flashcard name label.
    Name,
    /// Quiz feedback label.
    Message,
    Reveal,
    Next,
    Option(usize),
}

impl Widget {
    /// Widgets shown below the photo, top to bottom.
    pub fn layout(mode: Mode) -> Vec<Widget> {
        match mode {
            Mode::Flashcard => vec![Widget::Name, Widget::Reveal, Widget::Next],
            Mode::Quiz => (0..QUIZ_OPTION_COUNT)
                .map(Widget::Option)
                .chain([Widget::Message, Widget::Next])
                .collect(),
        }
    }

    pub fn is_button(self) -> bool {
        !matches!(self, Widget::Name | Widget::Message)
    }

    /// The action a click on this widget stands for.
    pub fn action(self) -> Option<Action> {
        match self {
            Widget::Reveal => Some(Action::Reveal),
            Widget::Next => Some(Action::Next),
            Widget::Option(slot) => Some(Action::Choose(slot)),
            Widget::Name | Widget::Message => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal,
    Next,
    Choose(usize),
}

/// Visual emphasis for a widget's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Success,
    Failure,
    Muted,
}

/// What the engine needs from a UI toolkit.
pub trait Frontend {
    fn set_title(&mut self, title: &str);
    /// Show `image` drawn at `width` x `height`.
    fn display(&mut self, image: &DecodedImage, width: u32, height: u32);
    fn clear_image(&mut self);
    fn set_text(&mut self, widget: Widget, text: &str, tone: Tone);
    fn set_enabled(&mut self, widget: Widget, enabled: bool);
}

#[derive(Debug, Clone, Copy)]
pub struct PresenterOptions {
    pub scale_factor: f64,
    pub sizing: SizingPolicy,
    pub decode_attempts: usize,
}

pub struct Presenter<R, S> {
    session: Session<R>,
    images: S,
    options: PresenterOptions,
    screen: (u32, u32),
    load_failed: bool,
}

impl<R: Rng, S: ImageSource> Presenter<R, S> {
    pub fn new(session: Session<R>, images: S, options: PresenterOptions) -> Self {
        Self {
            session,
            images,
            options,
            screen: (0, 0),
            load_failed: false,
        }
    }

    /// Set up static widgets and show the session's first photo.
    pub fn start(&mut self, ui: &mut dyn Frontend, screen: (u32, u32)) {
        self.screen = screen;
        let mode = self.session.mode();
        ui.set_title(match mode {
            Mode::Flashcard => TITLE,
            Mode::Quiz => QUIZ_TITLE,
        });
        if mode == Mode::Flashcard {
            ui.set_text(Widget::Reveal, REVEAL_LABEL, Tone::Plain);
        }
        ui.set_text(Widget::Next, NEXT_LABEL, Tone::Plain);
        info!(%mode, screen_width = screen.0, screen_height = screen.1, "session started");
        self.show_round(ui);
    }

    /// Apply one user action.
    ///
    /// # Errors
    /// Fails only if a new round cannot be drawn from the catalog.
    pub fn handle(&mut self, action: Action, ui: &mut dyn Frontend) -> Result<(), Error> {
        debug!(?action, "action");
        match action {
            // Nothing is on screen to answer about until Next succeeds.
            Action::Reveal | Action::Choose(_) if self.load_failed => {}
            Action::Reveal => {
                if self.session.reveal() {
                    let name = self.session.correct_name().display_name();
                    ui.set_text(Widget::Name, &name, Tone::Plain);
                    ui.set_enabled(Widget::Reveal, false);
                    ui.set_enabled(Widget::Next, true);
                }
            }
            Action::Next => {
                if self.load_failed {
                    self.session.select_next_photo()?;
                } else if self.session.advance()?.is_none() {
                    return Ok(());
                }
                self.show_round(ui);
            }
            Action::Choose(slot) => match self.session.submit_answer(slot) {
                AnswerOutcome::Correct => {
                    ui.set_text(Widget::Message, CORRECT_MESSAGE, Tone::Success);
                    self.sync_options(ui);
                    ui.set_enabled(Widget::Next, true);
                }
                AnswerOutcome::Wrong => {
                    ui.set_text(Widget::Message, WRONG_MESSAGE, Tone::Failure);
                    self.sync_options(ui);
                }
                AnswerOutcome::Ignored => {}
            },
        }
        Ok(())
    }

    /// Action for the keyboard's confirm key in the current state.
    pub fn default_action(&self) -> Action {
        if self.session.mode() == Mode::Flashcard && !self.session.can_advance() && !self.load_failed
        {
            Action::Reveal
        } else {
            Action::Next
        }
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    // Decode the current photo, drawing replacements on failure, then reset widgets.
    fn show_round(&mut self, ui: &mut dyn Frontend) {
        let attempts = self.options.decode_attempts.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            let path = self.session.current_photo().path.clone();
            match self.images.open(&path) {
                Ok(image) => {
                    let (width, height) = self.options.sizing.target_size(
                        image.native_size(),
                        self.options.scale_factor,
                        self.screen,
                    );
                    debug!(
                        path = %path.display(),
                        native_width = image.width,
                        native_height = image.height,
                        width,
                        height,
                        "displaying photo"
                    );
                    ui.display(&image, width, height);
                    last_error = None;
                    break;
                }
                Err(err) => {
                    warn!(attempt, "{err}");
                    last_error = Some(err);
                    if attempt < attempts
                        && let Err(err) = self.session.select_next_photo()
                    {
                        last_error = Some(err);
                        break;
                    }
                }
            }
        }

        self.load_failed = last_error.is_some();
        match self.session.mode() {
            Mode::Flashcard => {
                ui.set_text(Widget::Name, "", Tone::Plain);
                ui.set_enabled(Widget::Reveal, !self.load_failed);
            }
            Mode::Quiz => {
                ui.set_text(Widget::Message, "", Tone::Plain);
                self.sync_options(ui);
            }
        }
        ui.set_enabled(Widget::Next, self.load_failed);

        if let Some(err) = last_error {
            ui.clear_image();
            let message = format!("Could not load a photo: {err}");
            let widget = match self.session.mode() {
                Mode::Flashcard => Widget::Name,
                Mode::Quiz => Widget::Message,
            };
            ui.set_text(widget, &message, Tone::Failure);
        }
    }

    fn sync_options(&self, ui: &mut dyn Frontend) {
        for option in self.session.options() {
            let widget = Widget::Option(option.slot);
            let name = option.name.display_name();
            let (tone, enabled) = match option.status {
                OptionStatus::Neutral => (Tone::Plain, !self.load_failed),
                OptionStatus::Correct => (Tone::Success, false),
                OptionStatus::Rejected => (Tone::Muted, false),
                OptionStatus::Disabled => (Tone::Plain, false),
            };
            ui.set_text(widget, &name, tone);
            ui.set_enabled(widget, enabled);
        }
    }
}
