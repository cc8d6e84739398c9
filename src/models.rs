// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the analysis backend can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ko,
    Zh,
    Ja,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ko, Language::Zh, Language::Ja];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
            Language::Zh => "zh",
            Language::Ja => "ja",
        }
    }

    pub fn name(self) -> &'static str {
        language_name(self)
    }

    pub fn flag(self) -> &'static str {
        language_flag(self)
    }
}

pub fn language_name(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Ko => "한국어",
        Language::Zh => "中文",
        Language::Ja => "日本語",
    }
}

pub fn language_flag(language: Language) -> &'static str {
    match language {
        Language::En => "🇺🇸",
        Language::Ko => "🇰🇷",
        Language::Zh => "🇨🇳",
        Language::Ja => "🇯🇵",
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ko" => Ok(Language::Ko),
            "zh" => Ok(Language::Zh),
            "ja" => Ok(Language::Ja),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

/// The simulated commentators that sit on the analysis boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Kostolany,
    Buffett,
    Munger,
    Dalio,
    Soros,
    Spy,
    Burry,
}

impl Persona {
    pub fn name(self) -> &'static str {
        match self {
            Persona::Kostolany => "The Speculator Sage",
            Persona::Buffett => "The Value Oracle",
            Persona::Munger => "The Rational Critic",
            Persona::Dalio => "The Machine Thinker",
            Persona::Soros => "The Macro Predator",
            Persona::Spy => "The Spy",
            Persona::Burry => "The Big Short",
        }
    }

    pub fn style(self) -> &'static str {
        match self {
            Persona::Kostolany => "André Kostolany",
            Persona::Buffett => "Warren Buffett",
            Persona::Munger => "Charlie Munger",
            Persona::Dalio => "Ray Dalio",
            Persona::Soros => "George Soros",
            Persona::Spy => "Insider Intelligence",
            Persona::Burry => "Michael Burry",
        }
    }

    pub fn avatar(self) -> &'static str {
        match self {
            Persona::Kostolany => "🥚",
            Persona::Buffett => "🏦",
            Persona::Munger => "📚",
            Persona::Dalio => "⚙️",
            Persona::Soros => "🦁",
            Persona::Spy => "🕵️",
            Persona::Burry => "🔮",
        }
    }
}

/// The four investors on every market board.
pub const LEGENDS: &[Persona] = &[
    Persona::Kostolany,
    Persona::Buffett,
    Persona::Munger,
    Persona::Dalio,
];
const INSTITUTIONAL_BOARD: &[Persona] = &[Persona::Soros, Persona::Dalio];
const WHALE_BOARD: &[Persona] = &[Persona::Spy, Persona::Soros, Persona::Buffett, Persona::Burry];

/// Dashboard domains that support on-demand analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisDomain {
    Bonds,
    Fx,
    Stocks,
    Policy,
    Economy,
    Institutional,
    Whale,
}

impl AnalysisDomain {
    pub const ALL: [AnalysisDomain; 7] = [
        AnalysisDomain::Bonds,
        AnalysisDomain::Fx,
        AnalysisDomain::Stocks,
        AnalysisDomain::Policy,
        AnalysisDomain::Economy,
        AnalysisDomain::Institutional,
        AnalysisDomain::Whale,
    ];

    /// Path segment under `/api/analyze/`.
    pub fn path(self) -> &'static str {
        match self {
            AnalysisDomain::Bonds => "bonds",
            AnalysisDomain::Fx => "fx",
            AnalysisDomain::Stocks => "stocks",
            AnalysisDomain::Policy => "policy",
            AnalysisDomain::Economy => "economy",
            AnalysisDomain::Institutional => "institutional",
            AnalysisDomain::Whale => "whale",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisDomain::Bonds => "bond market",
            AnalysisDomain::Fx => "FX market",
            AnalysisDomain::Stocks => "stock market",
            AnalysisDomain::Policy => "central bank policy",
            AnalysisDomain::Economy => "real economy",
            AnalysisDomain::Institutional => "institutional",
            AnalysisDomain::Whale => "whale activity",
        }
    }

    /// Personas in the order the board speaks.
    pub fn board(self) -> &'static [Persona] {
        match self {
            AnalysisDomain::Institutional => INSTITUTIONAL_BOARD,
            AnalysisDomain::Whale => WHALE_BOARD,
            _ => LEGENDS,
        }
    }
}

impl fmt::Display for AnalysisDomain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Persona commentary returned by the analysis backend. Each domain fills
/// only the fields of its own board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kostolany_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffett_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub munger_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dalio_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soros_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spy_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burry_response: Option<String>,
    #[serde(default)]
    pub synthesis: String,
}

impl AnalysisResult {
    pub fn response(&self, persona: Persona) -> Option<&str> {
        let field = match persona {
            Persona::Kostolany => &self.kostolany_response,
            Persona::Buffett => &self.buffett_response,
            Persona::Munger => &self.munger_response,
            Persona::Dalio => &self.dalio_response,
            Persona::Soros => &self.soros_response,
            Persona::Spy => &self.spy_response,
            Persona::Burry => &self.burry_response,
        };
        field.as_deref()
    }
}

/// Body of `GET /api/analyze/<domain>/cached`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub cached: bool,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DebateRequest<'a> {
    pub scenario: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebateResponse {
    pub scenario: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}
