use crate::animal::AnimalType;
use crate::features::FeatureVector;

/// Maps a feature vector to a species.
pub trait AnimalClassifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> AnimalType;
}

/// Frequency-band rules with zero-crossing and loudness adjustments.
///
/// Rough call ranges the bands were tuned for: pigeon coos 200-800 Hz, dog
/// barks 400-2000 Hz, cat meows 300-1500 Hz, chicken clucks 1-3 kHz, lovebird
/// chirps 2-6 kHz.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicAnimalClassifier;

/// Evaluation order. Ties keep the earliest entry.
const EVALUATION_ORDER: [AnimalType; 5] = [
    AnimalType::Pigeon,
    AnimalType::Dog,
    AnimalType::Cat,
    AnimalType::Chicken,
    AnimalType::Lovebirds,
];

#[derive(Default)]
struct Tally([f64; EVALUATION_ORDER.len()]);

impl Tally {
    fn add(&mut self, animal: AnimalType, weight: f64) {
        if let Some(slot) = EVALUATION_ORDER.iter().position(|a| *a == animal) {
            self.0[slot] += weight;
        }
    }

    /// Highest score with a strict comparison, so the first of equal scores wins.
    fn winner(&self) -> AnimalType {
        let mut best = AnimalType::Dog;
        let mut best_score = 0.0;
        for (animal, &score) in EVALUATION_ORDER.iter().zip(&self.0) {
            if score > best_score {
                best_score = score;
                best = *animal;
            }
        }
        best
    }
}

impl HeuristicAnimalClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl AnimalClassifier for HeuristicAnimalClassifier {
    fn classify(&self, features: &FeatureVector) -> AnimalType {
        use AnimalType::*;

        let mut tally = Tally::default();

        // Frequency band: the strongest cue.
        let f = features.frequency;
        if f < 600.0 {
            tally.add(Pigeon, 0.4);
        } else if f < 1000.0 {
            tally.add(Dog, 0.3);
            tally.add(Cat, 0.2);
        } else if f < 1800.0 {
            tally.add(Dog, 0.3);
            tally.add(Chicken, 0.2);
        } else if f < 3000.0 {
            tally.add(Chicken, 0.35);
            tally.add(Lovebirds, 0.15);
        } else {
            tally.add(Lovebirds, 0.4);
        }

        // Birds oscillate more than mammals.
        if features.zcr_rate > 6.0 {
            tally.add(Lovebirds, 0.2);
            tally.add(Chicken, 0.15);
        } else if features.zcr_rate < 3.0 {
            tally.add(Pigeon, 0.2);
            tally.add(Dog, 0.15);
        }

        // Sharp attacks.
        if features.amplitude > 0.7 {
            tally.add(Dog, 0.1);
            tally.add(Chicken, 0.05);
        }

        // Smooth, quiet contours.
        if features.amplitude < 0.5 && features.rms_energy < 0.3 {
            tally.add(Cat, 0.15);
        }

        // Sustained notes.
        if features.rms_energy > 0.4 {
            tally.add(Pigeon, 0.1);
            tally.add(Lovebirds, 0.1);
        }

        let animal = tally.winner();
        tracing::debug!(%animal, frequency = f, zcr = features.zcr_rate, "classified animal");
        animal
    }
}
