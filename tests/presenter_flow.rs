use name_drill::catalog::{Catalog, PhotoEntry};
use name_drill::error::Error;
use name_drill::image_source::{DecodedImage, ImageSource};
use name_drill::presenter::{
    Action, CORRECT_MESSAGE, Frontend, NEXT_LABEL, Presenter, PresenterOptions, QUIZ_TITLE,
    REVEAL_LABEL, TITLE, Tone, WRONG_MESSAGE, Widget,
};
use name_drill::session::{Mode, RoundState, Session};
use name_drill::sizing::SizingPolicy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Default)]
struct RecordingUi {
    title: String,
    shown: Option<(u32, u32)>,
    displays: usize,
    texts: HashMap<Widget, (String, Tone)>,
    enabled: HashMap<Widget, bool>,
}

impl RecordingUi {
    fn text(&self, widget: Widget) -> &str {
        self.texts.get(&widget).map_or("", |(t, _)| t.as_str())
    }

    fn tone(&self, widget: Widget) -> Tone {
        self.texts.get(&widget).map_or(Tone::Plain, |(_, tone)| *tone)
    }

    fn is_enabled(&self, widget: Widget) -> bool {
        self.enabled.get(&widget).copied().unwrap_or(true)
    }
}

impl Frontend for RecordingUi {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn display(&mut self, _image: &DecodedImage, width: u32, height: u32) {
        self.shown = Some((width, height));
        self.displays += 1;
    }

    fn clear_image(&mut self) {
        self.shown = None;
    }

    fn set_text(&mut self, widget: Widget, text: &str, tone: Tone) {
        self.texts.insert(widget, (text.to_string(), tone));
    }

    fn set_enabled(&mut self, widget: Widget, enabled: bool) {
        self.enabled.insert(widget, enabled);
    }
}

/// Serves a fixed-size image for every path except the broken ones.
struct FakeImages {
    size: (u32, u32),
    broken: HashSet<PathBuf>,
}

impl FakeImages {
    fn solid(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            broken: HashSet::new(),
        }
    }
}

impl ImageSource for FakeImages {
    fn open(&self, path: &Path) -> Result<DecodedImage, Error> {
        if self.broken.contains(path) {
            return Err(Error::ImageDecode {
                path: path.to_path_buf(),
                source: anyhow::anyhow!("corrupt data"),
            });
        }
        let (width, height) = self.size;
        Ok(DecodedImage {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        })
    }
}

fn catalog(files: &[&str]) -> Catalog {
    Catalog::from_entries(
        files
            .iter()
            .map(|f| PhotoEntry::from_path(PathBuf::from("/photos").join(f)).unwrap())
            .collect(),
    )
}

fn options() -> PresenterOptions {
    PresenterOptions {
        scale_factor: 1.0,
        sizing: SizingPolicy::default(),
        decode_attempts: 3,
    }
}

fn presenter(
    files: &[&str],
    mode: Mode,
    images: FakeImages,
) -> Presenter<StdRng, FakeImages> {
    let session = Session::new(catalog(files), mode, StdRng::seed_from_u64(11)).unwrap();
    Presenter::new(session, images, options())
}

const QUIZ_FILES: &[&str] = &[
    "Smith,Anna.png",
    "Lee,Bo.jpg",
    "Ng,Chi.jpeg",
    "Diaz,Dana.png",
];

#[test]
fn flashcard_start_hides_name_and_disables_next() {
    let mut ui = RecordingUi::default();
    let mut p = presenter(&["Smith,Anna.png"], Mode::Flashcard, FakeImages::solid(400, 300));
    p.start(&mut ui, (1920, 1080));

    assert_eq!(ui.title, TITLE);
    assert_eq!(ui.text(Widget::Reveal), REVEAL_LABEL);
    assert_eq!(ui.text(Widget::Next), NEXT_LABEL);
    assert_eq!(ui.text(Widget::Name), "");
    assert!(ui.is_enabled(Widget::Reveal));
    assert!(!ui.is_enabled(Widget::Next));
    assert_eq!(ui.shown, Some((400, 300)));
}

#[test]
fn reveal_then_next_cycles_the_round() {
    let mut ui = RecordingUi::default();
    let mut p = presenter(&["Smith,Anna.png"], Mode::Flashcard, FakeImages::solid(400, 300));
    p.start(&mut ui, (1920, 1080));

    // Next is ignored until the name has been revealed.
    p.handle(Action::Next, &mut ui).unwrap();
    assert_eq!(ui.displays, 1);

    assert_eq!(p.default_action(), Action::Reveal);
    p.handle(Action::Reveal, &mut ui).unwrap();
    assert_eq!(ui.text(Widget::Name), "Anna Smith");
    assert!(!ui.is_enabled(Widget::Reveal));
    assert!(ui.is_enabled(Widget::Next));
    assert_eq!(p.session().state(), RoundState::Resolved);

    assert_eq!(p.default_action(), Action::Next);
    p.handle(Action::Next, &mut ui).unwrap();
    assert_eq!(ui.displays, 2);
    assert_eq!(ui.text(Widget::Name), "");
    assert!(ui.is_enabled(Widget::Reveal));
    assert!(!ui.is_enabled(Widget::Next));
}

#[test]
fn oversized_photo_is_shrunk_to_the_screen() {
    let mut ui = RecordingUi::default();
    let mut p = presenter(&["Smith,Anna.png"], Mode::Flashcard, FakeImages::solid(1000, 800));
    p.start(&mut ui, (1024, 900));
    assert_eq!(ui.shown, Some((812, 650)));
}

#[test]
fn quiz_start_offers_four_names_including_the_answer() {
    let mut ui = RecordingUi::default();
    let mut p = presenter(QUIZ_FILES, Mode::Quiz, FakeImages::solid(200, 200));
    p.start(&mut ui, (1920, 1080));

    assert_eq!(ui.title, QUIZ_TITLE);
    let labels: HashSet<String> = (0..4)
        .map(|slot| ui.text(Widget::Option(slot)).to_string())
        .collect();
    assert_eq!(labels.len(), 4);
    assert!(labels.contains(&p.session().correct_name().display_name()));
    assert!((0..4).all(|slot| ui.is_enabled(Widget::Option(slot))));
    assert!(!ui.is_enabled(Widget::Next));
    assert_eq!(ui.text(Widget::Message), "");
}

#[test]
fn wrong_then_right_answer_in_quiz() {
    let mut ui = RecordingUi::default();
    let mut p = presenter(QUIZ_FILES, Mode::Quiz, FakeImages::solid(200, 200));
    p.start(&mut ui, (1920, 1080));

    let correct = p.session().correct_name().display_name();
    let right = (0..4)
        .find(|&slot| ui.text(Widget::Option(slot)) == correct)
        .unwrap();
    let wrong = (0..4).find(|&slot| slot != right).unwrap();

    p.handle(Action::Choose(wrong), &mut ui).unwrap();
    assert_eq!(ui.text(Widget::Message), WRONG_MESSAGE);
    assert_eq!(ui.tone(Widget::Message), Tone::Failure);
    assert!(!ui.is_enabled(Widget::Option(wrong)));
    assert!(ui.is_enabled(Widget::Option(right)));
    assert!(!ui.is_enabled(Widget::Next));

    // Choosing a rejected option again changes nothing.
    p.handle(Action::Choose(wrong), &mut ui).unwrap();
    assert_eq!(p.session().state(), RoundState::Showing);

    p.handle(Action::Choose(right), &mut ui).unwrap();
    assert_eq!(ui.text(Widget::Message), CORRECT_MESSAGE);
    assert_eq!(ui.tone(Widget::Message), Tone::Success);
    assert_eq!(ui.tone(Widget::Option(right)), Tone::Success);
    assert!((0..4).all(|slot| !ui.is_enabled(Widget::Option(slot))));
    assert!(ui.is_enabled(Widget::Next));

    p.handle(Action::Next, &mut ui).unwrap();
    assert_eq!(ui.displays, 2);
    assert_eq!(ui.text(Widget::Message), "");
    assert!((0..4).all(|slot| ui.is_enabled(Widget::Option(slot))));
    assert!(!ui.is_enabled(Widget::Next));
}

#[test]
fn undecodable_photo_is_replaced_by_another() {
    let mut images = FakeImages::solid(100, 100);
    images.broken.insert(PathBuf::from("/photos/Lee,Bo.jpg"));
    let files = ["Smith,Anna.png", "Lee,Bo.jpg"];

    // Every start must end up showing a decodable photo, whichever one the
    // seed lands on first, unless all three attempts hit the broken file.
    for seed in 0..16 {
        let session =
            Session::new(catalog(&files), Mode::Flashcard, StdRng::seed_from_u64(seed)).unwrap();
        let mut p = Presenter::new(
            session,
            FakeImages {
                size: images.size,
                broken: images.broken.clone(),
            },
            options(),
        );
        let mut ui = RecordingUi::default();
        p.start(&mut ui, (1920, 1080));
        if p.load_failed() {
            assert_eq!(ui.shown, None);
        } else {
            assert_eq!(ui.shown, Some((100, 100)));
            assert_eq!(p.session().current_photo().raw_filename, "Smith,Anna.png");
        }
    }
}

#[test]
fn total_decode_failure_shows_message_and_allows_next() {
    let mut images = FakeImages::solid(100, 100);
    images.broken.insert(PathBuf::from("/photos/Smith,Anna.png"));
    let mut ui = RecordingUi::default();
    let mut p = presenter(&["Smith,Anna.png"], Mode::Flashcard, images);
    p.start(&mut ui, (1920, 1080));

    assert!(p.load_failed());
    assert_eq!(ui.shown, None);
    assert!(ui.text(Widget::Name).starts_with("Could not load a photo"));
    assert_eq!(ui.tone(Widget::Name), Tone::Failure);
    assert!(!ui.is_enabled(Widget::Reveal));
    assert!(ui.is_enabled(Widget::Next));
    assert_eq!(p.default_action(), Action::Next);

    // Reveal has nothing to act on while no photo is shown.
    p.handle(Action::Reveal, &mut ui).unwrap();
    assert_eq!(p.session().state(), RoundState::Showing);

    p.handle(Action::Next, &mut ui).unwrap();
    assert!(p.load_failed());
    assert!(ui.is_enabled(Widget::Next));
}
