// src/services/tone.rs
use std::fmt;

pub const WITTY_PROMPT: &str = "You are a helpful chatbot, but sometimes you respond in a funny or witty way. \
Make the reply humorous and lighthearted.";
pub const PLAIN_PROMPT: &str = "You are a helpful chatbot.";

/// Chance that a request gets the witty system prompt.
pub const WITTY_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Witty,
    Plain,
}

impl Tone {
    pub fn system_prompt(self) -> &'static str {
        match self {
            Tone::Witty => WITTY_PROMPT,
            Tone::Plain => PLAIN_PROMPT,
        }
    }

    /// Maps a uniform sample in `[0, 1)` to a tone.
    pub fn from_sample(sample: f64) -> Self {
        if sample < WITTY_PROBABILITY {
            Tone::Witty
        } else {
            Tone::Plain
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Witty => write!(f, "witty"),
            Tone::Plain => write!(f, "plain"),
        }
    }
}

/// Decides the tone of a single request.
pub trait ToneSelector: Send + Sync {
    fn pick(&self) -> Tone;
}

/// Coin flip per request, no seeding.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTone;

impl ToneSelector for RandomTone {
    fn pick(&self) -> Tone {
        Tone::from_sample(rand::random::<f64>())
    }
}

/// Always the same tone.
#[derive(Debug, Clone, Copy)]
pub struct FixedTone(pub Tone);

impl ToneSelector for FixedTone {
    fn pick(&self) -> Tone {
        self.0
    }
}
