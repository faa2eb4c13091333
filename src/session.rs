//! Round-by-round drill state.
//!
//! A [`Session`] owns the catalog, the random source, and the current round.
//! Every round starts in [`RoundState::Showing`] and moves to
//! [`RoundState::Resolved`] once the name is revealed (flashcard) or the
//! correct option is picked (quiz). Only a resolved round may be advanced.

use std::fmt;

use rand::Rng;
use tracing::debug;

use crate::catalog::{Catalog, PhotoEntry};
use crate::distractors;
use crate::error::Error;
use crate::name::PersonName;

/// Options shown per quiz round, the correct one included.
pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Reveal the name on demand.
    #[default]
    Flashcard,
    /// Pick the right name among four.
    Quiz,
}

impl Mode {
    /// Smallest catalog this mode can run with.
    pub fn min_entries(self) -> usize {
        match self {
            Self::Flashcard => 1,
            Self::Quiz => QUIZ_OPTION_COUNT,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flashcard => "flashcard",
            Self::Quiz => "quiz",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Showing,
    Resolved,
}

/// Per-option state within a quiz round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStatus {
    /// Enabled and not yet chosen.
    Neutral,
    /// Chosen and wrong; disabled for the rest of the round.
    Rejected,
    /// Chosen and right.
    Correct,
    /// Disabled because the round was resolved by another option.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub slot: usize,
    pub name: PersonName,
    pub status: OptionStatus,
}

impl QuizOption {
    pub fn is_selectable(&self) -> bool {
        self.status == OptionStatus::Neutral
    }
}

/// Result of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    /// Not accepted: wrong mode, round already resolved, unknown or disabled slot.
    Ignored,
}

#[derive(Debug, Clone)]
struct Round {
    photo: usize,
    state: RoundState,
    correct_name: PersonName,
    options: Vec<QuizOption>,
}

/// Explicit session context: catalog, random source, and current round.
pub struct Session<R> {
    catalog: Catalog,
    mode: Mode,
    rng: R,
    round: Round,
}

impl<R: Rng> Session<R> {
    /// Start a session with a randomly chosen first photo.
    ///
    /// # Errors
    /// Fails if `catalog` is too small for `mode` (see [`Catalog::check_minimum`]).
    pub fn new(catalog: Catalog, mode: Mode, mut rng: R) -> Result<Self, Error> {
        catalog.check_minimum(mode)?;
        let round = Self::draw_round(&catalog, mode, &mut rng)?;
        Ok(Self {
            catalog,
            mode,
            rng,
            round,
        })
    }

    /// Pick a new photo uniformly at random (repeats allowed) and start a new round.
    ///
    /// # Errors
    /// Fails only if quiz options cannot be built from the catalog.
    pub fn select_next_photo(&mut self) -> Result<&PhotoEntry, Error> {
        self.round = Self::draw_round(&self.catalog, self.mode, &mut self.rng)?;
        Ok(self.current_photo())
    }

    /// Move to the next photo if the current round is resolved.
    ///
    /// Returns `Ok(None)` and leaves the round untouched while it is still showing.
    ///
    /// # Errors
    /// See [`Session::select_next_photo`].
    pub fn advance(&mut self) -> Result<Option<&PhotoEntry>, Error> {
        if !self.can_advance() {
            debug!("advance requested before the round was resolved");
            return Ok(None);
        }
        self.select_next_photo().map(Some)
    }

    fn draw_round(catalog: &Catalog, mode: Mode, rng: &mut R) -> Result<Round, Error> {
        if catalog.is_empty() {
            return Err(Error::InsufficientEntries {
                mode,
                found: 0,
                required: mode.min_entries(),
            });
        }
        let photo = rng.random_range(0..catalog.len());
        let correct_name = catalog.entries()[photo].name.clone();
        let options = match mode {
            Mode::Flashcard => Vec::new(),
            Mode::Quiz => distractors::options_for(catalog, &correct_name, rng)?
                .into_iter()
                .enumerate()
                .map(|(slot, name)| QuizOption {
                    slot,
                    name,
                    status: OptionStatus::Neutral,
                })
                .collect(),
        };
        debug!(photo = %catalog.entries()[photo].path.display(), %mode, "new round");
        Ok(Round {
            photo,
            state: RoundState::Showing,
            correct_name,
            options,
        })
    }
}

impl<R> Session<R> {
    /// Flashcard reveal. Returns `true` if this call resolved the round.
    pub fn reveal(&mut self) -> bool {
        if self.mode != Mode::Flashcard || self.round.state == RoundState::Resolved {
            return false;
        }
        self.round.state = RoundState::Resolved;
        true
    }

    /// Quiz answer for the option in `slot`.
    ///
    /// A wrong choice disables that option for the rest of the round; the
    /// others stay selectable. A right choice resolves the round and disables
    /// every other option.
    pub fn submit_answer(&mut self, slot: usize) -> AnswerOutcome {
        if self.mode != Mode::Quiz || self.round.state == RoundState::Resolved {
            return AnswerOutcome::Ignored;
        }
        let correct = self.round.correct_name.display_name();
        let Some(option) = self.round.options.get_mut(slot) else {
            return AnswerOutcome::Ignored;
        };
        if !option.is_selectable() {
            return AnswerOutcome::Ignored;
        }
        if option.name.display_name() != correct {
            option.status = OptionStatus::Rejected;
            return AnswerOutcome::Wrong;
        }
        option.status = OptionStatus::Correct;
        for other in &mut self.round.options {
            if other.status == OptionStatus::Neutral {
                other.status = OptionStatus::Disabled;
            }
        }
        self.round.state = RoundState::Resolved;
        AnswerOutcome::Correct
    }

    /// Quiz answer by name; names not on offer are ignored.
    pub fn submit_name(&mut self, choice: &PersonName) -> AnswerOutcome {
        match self.round.options.iter().position(|o| o.name == *choice) {
            Some(slot) => self.submit_answer(slot),
            None => AnswerOutcome::Ignored,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_photo(&self) -> &PhotoEntry {
        &self.catalog.entries()[self.round.photo]
    }

    pub fn correct_name(&self) -> &PersonName {
        &self.round.correct_name
    }

    pub fn state(&self) -> RoundState {
        self.round.state
    }

    /// Quiz options in presentation order; empty in flashcard mode.
    pub fn options(&self) -> &[QuizOption] {
        &self.round.options
    }

    pub fn can_advance(&self) -> bool {
        self.round.state == RoundState::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn catalog(files: &[&str]) -> Catalog {
        Catalog::from_entries(
            files
                .iter()
                .map(|f| PhotoEntry::from_path(PathBuf::from(f)).unwrap())
                .collect(),
        )
    }

    fn quiz_catalog() -> Catalog {
        catalog(&[
            "Smith,Anna.png",
            "Jones,Bob.png",
            "Lee,Cara.png",
            "Diaz,Dan.png",
        ])
    }

    fn wrong_slot<R>(session: &Session<R>) -> usize {
        session
            .options()
            .iter()
            .find(|o| o.name != *session.correct_name() && o.is_selectable())
            .map(|o| o.slot)
            .unwrap()
    }

    fn right_slot<R>(session: &Session<R>) -> usize {
        session
            .options()
            .iter()
            .find(|o| o.name == *session.correct_name())
            .map(|o| o.slot)
            .unwrap()
    }

    #[test]
    fn starts_showing_with_decoded_name() {
        let session = Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(session.state(), RoundState::Showing);
        assert_eq!(session.correct_name(), &session.current_photo().name);
        assert!(!session.can_advance());
    }

    #[test]
    fn quiz_options_cover_the_whole_four_name_catalog() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(11)).unwrap();
        for _ in 0..50 {
            let names: HashSet<String> =
                session.options().iter().map(|o| o.name.to_string()).collect();
            let expected: HashSet<String> = ["Anna Smith", "Bob Jones", "Cara Lee", "Dan Diaz"]
                .into_iter()
                .map(String::from)
                .collect();
            assert_eq!(names, expected);
            assert!(session.options().iter().all(QuizOption::is_selectable));
            session.select_next_photo().unwrap();
        }
    }

    #[test]
    fn wrong_answer_disables_only_that_option() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(5)).unwrap();
        let wrong = wrong_slot(&session);
        assert_eq!(session.submit_answer(wrong), AnswerOutcome::Wrong);
        assert_eq!(session.state(), RoundState::Showing);
        assert_eq!(session.options()[wrong].status, OptionStatus::Rejected);
        assert_eq!(session.options().iter().filter(|o| o.is_selectable()).count(), 3);
        // re-selecting a rejected option is not possible
        assert_eq!(session.submit_answer(wrong), AnswerOutcome::Ignored);
        assert!(!session.can_advance());
    }

    #[test]
    fn all_wrong_options_leave_the_right_one_selectable() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(9)).unwrap();
        for _ in 0..3 {
            let wrong = wrong_slot(&session);
            assert_eq!(session.submit_answer(wrong), AnswerOutcome::Wrong);
        }
        let right = right_slot(&session);
        assert!(session.options()[right].is_selectable());
        assert_eq!(session.submit_answer(right), AnswerOutcome::Correct);
        assert!(session.can_advance());
    }

    #[test]
    fn correct_answer_resolves_once() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(21)).unwrap();
        let wrong = wrong_slot(&session);
        session.submit_answer(wrong);
        let right = right_slot(&session);
        assert_eq!(session.submit_answer(right), AnswerOutcome::Correct);
        assert_eq!(session.state(), RoundState::Resolved);
        for option in session.options() {
            let expected = if option.slot == right {
                OptionStatus::Correct
            } else if option.slot == wrong {
                OptionStatus::Rejected
            } else {
                OptionStatus::Disabled
            };
            assert_eq!(option.status, expected);
        }
        assert_eq!(session.submit_answer(right), AnswerOutcome::Ignored);
        assert_eq!(session.submit_answer(7), AnswerOutcome::Ignored);
    }

    #[test]
    fn submit_by_name() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(2)).unwrap();
        let stranger = PersonName::new("Zed", "Nobody");
        assert_eq!(session.submit_name(&stranger), AnswerOutcome::Ignored);
        let correct = session.correct_name().clone();
        assert_eq!(session.submit_name(&correct), AnswerOutcome::Correct);
    }

    #[test]
    fn advance_requires_resolution() {
        let mut session = Session::new(
            catalog(&["Smith,Anna.png"]),
            Mode::Flashcard,
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert!(session.advance().unwrap().is_none());
        assert!(session.reveal());
        assert!(!session.reveal(), "second reveal is a no-op");
        assert!(session.can_advance());
        let next = session.advance().unwrap().unwrap();
        assert_eq!(next.raw_filename, "Smith,Anna.png");
        assert_eq!(session.state(), RoundState::Showing);
    }

    #[test]
    fn mode_specific_actions_are_ignored_in_the_other_mode() {
        let mut flash = Session::new(quiz_catalog(), Mode::Flashcard, StdRng::seed_from_u64(4)).unwrap();
        assert!(flash.options().is_empty());
        assert_eq!(flash.submit_answer(0), AnswerOutcome::Ignored);

        let mut quiz = Session::new(quiz_catalog(), Mode::Quiz, StdRng::seed_from_u64(4)).unwrap();
        assert!(!quiz.reveal());
        assert_eq!(quiz.state(), RoundState::Showing);
    }

    #[test]
    fn photo_selection_draws_from_whole_catalog() {
        let mut session =
            Session::new(quiz_catalog(), Mode::Flashcard, StdRng::seed_from_u64(13)).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(session.current_photo().raw_filename.clone());
            session.select_next_photo().unwrap();
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn too_small_catalog_is_rejected() {
        let err = Session::new(
            catalog(&["Smith,Anna.png", "Jones,Bob.png"]),
            Mode::Quiz,
            StdRng::seed_from_u64(0),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::InsufficientEntries { found: 2, required: 4, .. }));
    }
}
