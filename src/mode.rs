use std::fmt;
use std::str::FromStr;

use crate::error::ExpertError;

const HEALTH_INSTRUCTION: &str = "You are an expert in health and medicine. \
Answer the user's health questions politely, drawing on professional knowledge. \
For serious symptoms, however, recommend that the user see a medical professional.";

const ANIMAL_INSTRUCTION: &str = "You are an expert on animals. \
Answer questions about animal ecology, behavior, and care politely, \
drawing on professional knowledge.";

/// Persona selected for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    HealthExpert,
    AnimalExpert,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::HealthExpert, Mode::AnimalExpert];

    /// System prompt sent ahead of the user's message.
    pub fn instruction(self) -> &'static str {
        match self {
            Mode::HealthExpert => HEALTH_INSTRUCTION,
            Mode::AnimalExpert => ANIMAL_INSTRUCTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::HealthExpert => "Chat with a health expert",
            Mode::AnimalExpert => "Chat with an animal expert",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::HealthExpert => {
                "An LLM with medical knowledge answers questions about health and medicine."
            }
            Mode::AnimalExpert => {
                "An LLM with zoological knowledge answers questions about animal ecology and care."
            }
        }
    }

    /// Short name accepted by `FromStr` and the `/health` `/animal` commands.
    pub fn keyword(self) -> &'static str {
        match self {
            Mode::HealthExpert => "health",
            Mode::AnimalExpert => "animal",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Mode {
    type Err = ExpertError;

    fn from_str(s: &str) -> Result<Self, ExpertError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" | "health-expert" => Ok(Mode::HealthExpert),
            "animal" | "animal-expert" => Ok(Mode::AnimalExpert),
            other => Err(ExpertError::Validation(format!(
                "unknown mode '{other}' (expected 'health' or 'animal')"
            ))),
        }
    }
}
