mod classifier;

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub use classifier::{AnimalClassifier, HeuristicAnimalClassifier};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AnimalType {
    Dog,
    Cat,
    Lovebirds,
    Chicken,
    Pigeon,
}

impl AnimalType {
    pub const ALL: [AnimalType; 5] = [
        AnimalType::Dog,
        AnimalType::Cat,
        AnimalType::Lovebirds,
        AnimalType::Chicken,
        AnimalType::Pigeon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnimalType::Dog => "dog",
            AnimalType::Cat => "cat",
            AnimalType::Lovebirds => "lovebirds",
            AnimalType::Chicken => "chicken",
            AnimalType::Pigeon => "pigeon",
        }
    }
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown animal {0:?}, expected one of dog, cat, lovebirds, chicken, pigeon")]
pub struct UnknownAnimal(pub String);

impl FromStr for AnimalType {
    type Err = UnknownAnimal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AnimalType::ALL
            .into_iter()
            .find(|animal| animal.as_str() == wanted)
            .ok_or_else(|| UnknownAnimal(s.to_owned()))
    }
}
