use chrono::NaiveDate;
use std::fmt;

/// Missions needed to leave the first tier.
pub const DEFENDER_THRESHOLD: u32 = 5;
/// Missions needed to reach the top tier.
pub const AMBASSADOR_THRESHOLD: u32 = 15;

/// Progress tier, derived purely from the completed-mission count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Observer,
    Defender,
    Ambassador,
}

impl Level {
    pub fn for_missions(completed: u32) -> Self {
        if completed < DEFENDER_THRESHOLD {
            Level::Observer
        } else if completed < AMBASSADOR_THRESHOLD {
            Level::Defender
        } else {
            Level::Ambassador
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Observer => "Спостерігач",
            Level::Defender => "Захисник",
            Level::Ambassador => "Амбасадор",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A quiz answer as echoed back by the inline button.
///
/// The correct index travels inside the payload, so nothing about the asked
/// question is kept server-side between sending it and receiving the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAnswer {
    pub chosen: i64,
    pub correct: i64,
}

impl QuizAnswer {
    pub fn encode(chosen: usize, correct: usize) -> String {
        format!("{chosen}:{correct}")
    }

    /// Parses `"<chosen>:<correct>"` where both sides are plain integers.
    /// Anything else yields `None`.
    pub fn parse(payload: &str) -> Option<Self> {
        let (chosen, correct) = payload.split_once(':')?;
        if correct.contains(':') {
            return None;
        }
        Some(Self {
            chosen: chosen.parse().ok()?,
            correct: correct.parse().ok()?,
        })
    }

    pub fn is_correct(&self) -> bool {
        self.chosen == self.correct
    }
}

/// Whether a new mission may be handed out on `today`.
pub fn mission_available(last_mission_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_mission_date != Some(today)
}
