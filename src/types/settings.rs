use serde::{Deserialize, Serialize};

/// Top-level engine settings container.
///
/// Every matching threshold the search layers use lives here rather than as
/// a hardcoded literal, so each one is independently testable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub capture: CaptureSettings,
    pub locator: LocatorSettings,
    pub highlight: HighlightSettings,
    pub pins: PinSettings,
    pub notifications: NotificationSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            capture: CaptureSettings::default(),
            locator: LocatorSettings::default(),
            highlight: HighlightSettings::default(),
            pins: PinSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

/// Fingerprint-capture policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSettings {
    /// Selections shorter than this (in chars, after trimming) are rejected.
    pub min_selection_len: usize,
    /// Display text is truncated to this many chars; the full text is kept.
    pub display_text_cap: usize,
    /// Surrounding-context text is truncated to this many chars.
    pub context_char_cap: usize,
    /// How many ancestor levels to walk when collecting context.
    pub context_ancestor_levels: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_selection_len: 5,
            display_text_cap: 200,
            context_char_cap: 150,
            context_ancestor_levels: 3,
        }
    }
}

/// Relocation thresholds for the layered search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocatorSettings {
    /// Context words must be strictly longer than this to count.
    pub min_word_len: usize,
    /// Platform-scoped fuzzy layer accepts at >= this fraction of words.
    pub fuzzy_accept_fraction: f64,
    /// Document-wide last-resort fuzzy layer accepts at >= this fraction.
    pub fallback_accept_fraction: f64,
    /// Inline elements qualify as "specific" when their text is shorter
    /// than this multiple of the search text.
    pub inline_max_len_factor: usize,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            min_word_len: 3,
            fuzzy_accept_fraction: 0.5,
            fallback_accept_fraction: 0.3,
            inline_max_len_factor: 3,
        }
    }
}

/// Scroll-then-highlight timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighlightSettings {
    /// Delay between issuing the scroll and applying the highlight.
    pub scroll_settle_ms: u64,
    /// How long a highlight stays before the DOM is restored.
    pub highlight_duration_ms: u64,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 300,
            highlight_duration_ms: 5000,
        }
    }
}

/// Pin-list policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PinSettings {
    /// Maximum number of stored pins; further captures are rejected.
    pub max_pins: usize,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self { max_pins: 100 }
    }
}

/// Toast notification behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationSettings {
    /// Oldest toasts are evicted beyond this count.
    pub max_visible: usize,
    pub default_duration_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            max_visible: 5,
            default_duration_ms: 4000,
        }
    }
}
