//! App core: central struct holding the engine's services for one page.
//!
//! Built once per page load; the platform profile is detected from the
//! page URL at construction and passed explicitly to the capture and
//! relocation services from then on.

use tracing::{info, warn};

use crate::dom::Document;
use crate::managers::pin_store::PinStore;
use crate::platform::PlatformProfile;
use crate::services::fingerprint::FingerprintBuilder;
use crate::services::highlight::{HighlightController, ScrollCommand};
use crate::services::locator::Locator;
use crate::services::notifications::NotificationCenter;
use crate::services::watcher::{MutationWatcher, DEFAULT_DEBOUNCE_MS};
use crate::storage::StorageGateway;
use crate::types::bookmark::{Bookmark, PageInfo};
use crate::types::errors::{CaptureError, PinError};
use crate::types::settings::EngineSettings;

pub struct App {
    pub settings: EngineSettings,
    pub page: PageInfo,
    pub profile: PlatformProfile,
    pub pins: PinStore,
    pub fingerprints: FingerprintBuilder,
    pub locator: Locator,
    pub highlights: HighlightController,
    pub notifications: NotificationCenter,
    pub watcher: MutationWatcher,
}

impl App {
    /// Creates an app for one page, detecting the platform from its URL.
    pub fn new(gateway: Box<dyn StorageGateway>, page: PageInfo, settings: EngineSettings) -> Self {
        let profile = PlatformProfile::detect(&page.url);
        info!(platform = %profile.platform, url = %page.url, "initializing engine for page");
        Self {
            pins: PinStore::new(gateway, &settings.pins),
            fingerprints: FingerprintBuilder::new(settings.capture.clone()),
            locator: Locator::new(settings.locator.clone()),
            highlights: HighlightController::new(settings.highlight.clone()),
            notifications: NotificationCenter::new(settings.notifications.clone()),
            watcher: MutationWatcher::new(DEFAULT_DEBOUNCE_MS),
            profile,
            page,
            settings,
        }
    }

    /// Startup sequence: seed storage on first run and read the capture
    /// toggle so the host can decide whether to inject its selection UI.
    pub fn startup(&mut self) -> bool {
        use crate::managers::pin_store::PinStoreTrait;
        if let Err(e) = self.pins.initialize() {
            warn!(error = %e, "storage initialization failed; continuing with in-memory state");
        }
        let enabled = self.pins.enabled().unwrap_or(true);
        info!(enabled, "selection capture state loaded");
        enabled
    }

    /// Captures a selection and persists it as a pin in one step (the
    /// content-script pin-button path).
    pub fn capture_selection(
        &mut self,
        doc: &Document,
        selection: &str,
        anchor: crate::dom::NodeId,
        now_ms: i64,
    ) -> Result<Bookmark, PinError> {
        use crate::managers::pin_store::PinStoreTrait;
        let draft = self
            .fingerprints
            .capture(doc, selection, anchor, &self.profile, &self.page, now_ms)
            .map_err(capture_to_pin)?;
        self.pins.pin(draft, now_ms)
    }

    /// Relocates a bookmark and starts the scroll-then-highlight sequence.
    /// A miss surfaces the not-found toast and returns `None`.
    pub fn jump_to_bookmark(
        &mut self,
        doc: &mut Document,
        bookmark: &Bookmark,
        now_ms: u64,
    ) -> Option<ScrollCommand> {
        match self.locator.locate(doc, bookmark, &self.profile) {
            Some(target) => Some(self.highlights.jump_to(doc, &target, now_ms)),
            None => {
                self.notifications.error(
                    "Bookmark location not found. The conversation may have changed.",
                    now_ms,
                );
                None
            }
        }
    }

    /// Advances host time: pending/expiring highlights and toast expiry.
    pub fn tick(&mut self, doc: &mut Document, now_ms: u64) {
        self.highlights.tick(doc, now_ms);
        self.notifications.active(now_ms);
    }
}

/// Capture rejections surface through the pin-list error channel so callers
/// deal with a single failure type on the capture-and-pin path.
fn capture_to_pin(e: CaptureError) -> PinError {
    match e {
        CaptureError::EmptySelection => PinError::EmptyText,
        CaptureError::SelectionTooShort { .. } => PinError::Capture(e.to_string()),
    }
}
