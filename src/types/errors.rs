use std::fmt;

// === CaptureError ===

/// Errors raised while turning a live selection into a bookmark fingerprint.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// The selection is shorter than the configured minimum.
    SelectionTooShort { len: usize, min: usize },
    /// The selection is empty after trimming.
    EmptySelection,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SelectionTooShort { len, min } => {
                write!(f, "Selection too short: {} chars (minimum {})", len, min)
            }
            CaptureError::EmptySelection => write!(f, "Selection is empty"),
        }
    }
}

impl std::error::Error for CaptureError {}

// === PinError ===

/// Errors related to the pinned-bookmark list.
#[derive(Debug, PartialEq, Eq)]
pub enum PinError {
    /// The record has neither display text nor full text.
    EmptyText,
    /// A pin with identical text already exists.
    AlreadyPinned,
    /// The pin list is at its configured capacity.
    LimitReached(usize),
    /// No pin with the given ID exists.
    NotFound(String),
    /// The given list index is out of range.
    IndexOutOfRange(usize),
    /// The selection was rejected at capture time.
    Capture(String),
    /// The storage gateway failed.
    Storage(String),
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::EmptyText => write!(f, "Bookmark has no text"),
            PinError::AlreadyPinned => write!(f, "Already pinned"),
            PinError::LimitReached(max) => write!(f, "Pin limit reached ({} max)", max),
            PinError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            PinError::IndexOutOfRange(index) => write!(f, "Pin index out of range: {}", index),
            PinError::Capture(msg) => write!(f, "Capture rejected: {}", msg),
            PinError::Storage(msg) => write!(f, "Bookmark storage error: {}", msg),
        }
    }
}

impl std::error::Error for PinError {}

// === StorageError ===

/// Errors from the key-value storage gateway.
#[derive(Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store failed (I/O, SQLite, quota).
    Backend(String),
    /// A stored value could not be serialized or deserialized.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Backend(msg) => write!(f, "Storage backend error: {}", msg),
            StorageError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === DomError ===

/// Errors from structural locator evaluation.
///
/// These are always recoverable: the locator treats any `DomError` from one
/// search layer as "this layer found nothing" and falls through to the next.
#[derive(Debug, PartialEq, Eq)]
pub enum DomError {
    /// The CSS selector could not be parsed.
    Selector(String),
    /// The XPath expression could not be parsed or is unsupported.
    XPath(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::Selector(sel) => write!(f, "Invalid selector: {}", sel),
            DomError::XPath(expr) => write!(f, "Invalid xpath: {}", expr),
        }
    }
}

impl std::error::Error for DomError {}

// === SettingsError ===

/// Errors related to settings persistence.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing the settings file.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
