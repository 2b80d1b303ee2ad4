use serde::{Deserialize, Serialize};

/// Tone injected into the prompt when no mood is selected
pub const DEFAULT_TONE: &str = "general";

/// The fixed set of comment moods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    ChillVibes,
    MegaProps,
    BrainyTakes,
    CuriousCat,
    Heartfelt,
    AgreeToSlay,
    LaserFocus,
    BlastOff,
}

impl Mood {
    /// All moods in display order
    pub const ALL: [Mood; 8] = [
        Mood::ChillVibes,
        Mood::MegaProps,
        Mood::BrainyTakes,
        Mood::CuriousCat,
        Mood::Heartfelt,
        Mood::AgreeToSlay,
        Mood::LaserFocus,
        Mood::BlastOff,
    ];

    /// Glyph on the mood button
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::ChillVibes => "👍",
            Mood::MegaProps => "👏",
            Mood::BrainyTakes => "💡",
            Mood::CuriousCat => "🤔",
            Mood::Heartfelt => "❤️",
            Mood::AgreeToSlay => "✅",
            Mood::LaserFocus => "🎯",
            Mood::BlastOff => "🚀",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mood::ChillVibes => "Chill Vibes",
            Mood::MegaProps => "Mega Props",
            Mood::BrainyTakes => "Brainy Takes",
            Mood::CuriousCat => "Curious Cat",
            Mood::Heartfelt => "Heartfelt",
            Mood::AgreeToSlay => "Agree-to-Slay",
            Mood::LaserFocus => "Laser Focus",
            Mood::BlastOff => "Blast Off",
        }
    }

    /// Tone phrase handed to the model
    pub fn tone(self) -> &'static str {
        match self {
            Mood::ChillVibes => "cool and casual, like your favorite hoodie",
            Mood::MegaProps => "applause loud enough to echo across LinkedIn",
            Mood::BrainyTakes => "sharper than your resume bullet points",
            Mood::CuriousCat => "genuinely intrigued (not fake deep)",
            Mood::Heartfelt => "warm, real, and maybe a little adorable",
            Mood::AgreeToSlay => "confident agreement with extra flair",
            Mood::LaserFocus => "surgical precision and leadership energy",
            Mood::BlastOff => "big ideas. big energy. big everything.",
        }
    }

    /// Tooltip text: `"<name> - <tone>"`
    pub fn title(self) -> String {
        format!("{} - {}", self.name(), self.tone())
    }

    /// Look a mood up by emoji, display name or kebab-case id
    pub fn parse(value: &str) -> Option<Mood> {
        let value = value.trim();
        Mood::ALL.into_iter().find(|mood| {
            mood.emoji() == value
                || mood.name().eq_ignore_ascii_case(value)
                || mood.id() == value.to_ascii_lowercase()
        })
    }

    /// Kebab-case identifier, as used on the command line
    pub fn id(self) -> &'static str {
        match self {
            Mood::ChillVibes => "chill-vibes",
            Mood::MegaProps => "mega-props",
            Mood::BrainyTakes => "brainy-takes",
            Mood::CuriousCat => "curious-cat",
            Mood::Heartfelt => "heartfelt",
            Mood::AgreeToSlay => "agree-to-slay",
            Mood::LaserFocus => "laser-focus",
            Mood::BlastOff => "blast-off",
        }
    }
}

/// Exclusive mood selection for one page session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodSelector {
    selected: Option<Mood>,
}

impl MoodSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `mood`, or clear the selection if it is already selected.
    /// Returns the selection after the toggle.
    pub fn toggle(&mut self, mood: Mood) -> Option<Mood> {
        self.selected = if self.selected == Some(mood) {
            None
        } else {
            Some(mood)
        };
        self.selected
    }

    pub fn selected(&self) -> Option<Mood> {
        self.selected
    }

    /// Tone for the prompt: the selected mood's phrase or [`DEFAULT_TONE`]
    pub fn tone(&self) -> &'static str {
        self.selected.map_or(DEFAULT_TONE, Mood::tone)
    }
}
