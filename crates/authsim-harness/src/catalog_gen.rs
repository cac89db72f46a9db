//! Seeded catalog generation.

use std::time::Duration;

use authsim_core::{CatalogError, Participant, StepCatalog, StepDefinition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PARTICIPANTS: [Participant; 3] =
    [Participant::Device, Participant::Collector, Participant::System];

/// Generate a valid catalog of `len` steps from `seed`.
///
/// Durations fall in 1..=500 ms. Ids start at 1 and increase with random
/// gaps. The same seed always yields the same catalog.
///
/// # Errors
///
/// Returns [`CatalogError::Empty`] when `len` is zero.
pub fn random_catalog(seed: u64, len: usize) -> Result<StepCatalog, CatalogError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut id = 0u32;

    let steps = (0..len)
        .map(|index| {
            id += rng.gen_range(1..=3);
            let sender = PARTICIPANTS[rng.gen_range(0..PARTICIPANTS.len())];
            let receiver = PARTICIPANTS[rng.gen_range(0..PARTICIPANTS.len())];
            let step = StepDefinition::new(
                id,
                format!("Generated step {}", index + 1),
                format!("Step {} of a seeded catalog", index + 1),
                sender,
                receiver,
                Duration::from_millis(rng.gen_range(1..=500)),
            )
            .with_operations((0..rng.gen_range(0..4)).map(|op| format!("Operation {op}")));

            if sender != receiver && rng.gen_bool(0.3) {
                step.with_message(format!("MSG{}", index + 1))
            } else {
                step
            }
        })
        .collect();

    StepCatalog::new(steps)
}
