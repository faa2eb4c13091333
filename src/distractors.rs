//! Multiple-choice option generation for quiz rounds.
//!
//! Distractors are drawn from the catalog's distinct-name set rather than by
//! repeatedly drawing photos, so sampling is bounded even when many photos
//! share a name.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::name::PersonName;

/// Number of wrong names shown next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// Draw `count` distinct names from `catalog`, none equal to `exclude`.
///
/// Names are compared by display form. Each candidate name is equally likely
/// regardless of how many photos carry it.
///
/// # Errors
/// Returns [`Error::InsufficientNames`] when the catalog holds fewer than
/// `count` names besides `exclude`.
pub fn sample<R: Rng + ?Sized>(
    catalog: &Catalog,
    exclude: &PersonName,
    count: usize,
    rng: &mut R,
) -> Result<Vec<PersonName>, Error> {
    let excluded = exclude.display_name();
    let candidates: Vec<&PersonName> = catalog
        .distinct_names()
        .iter()
        .filter(|name| name.display_name() != excluded)
        .collect();
    if candidates.len() < count {
        return Err(Error::InsufficientNames {
            found: candidates.len() + 1,
            required: count + 1,
        });
    }
    Ok(candidates
        .choose_multiple(rng, count)
        .map(|name| (*name).clone())
        .collect())
}

/// Build the full, shuffled option list for a round: the distractors plus `correct`.
///
/// # Errors
/// Propagates [`sample`] errors.
pub fn options_for<R: Rng + ?Sized>(
    catalog: &Catalog,
    correct: &PersonName,
    rng: &mut R,
) -> Result<Vec<PersonName>, Error> {
    let mut options = sample(catalog, correct, DISTRACTOR_COUNT, rng)?;
    options.push(correct.clone());
    options.shuffle(rng);
    Ok(options)
}
