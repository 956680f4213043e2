use std::collections::HashSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Danger,
    Warning,
    Info,
}

impl AlertKind {
    pub fn icon(self) -> &'static str {
        match self {
            AlertKind::Danger => "🚨",
            AlertKind::Warning => "⚠️",
            AlertKind::Info => "ℹ️",
        }
    }
}

/// Dismissable notification strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertBanner {
    pub kind: AlertKind,
    pub message: String,
    pub detail: Option<String>,
    pub dismissed: bool,
}

impl AlertBanner {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            dismissed: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn is_visible(&self) -> bool {
        !self.dismissed
    }
}

/// Remembers which banners a screen's user has dismissed, keyed by message.
#[derive(Debug, Clone, Default)]
pub struct BannerShelf {
    dismissed: HashSet<String>,
}

impl BannerShelf {
    /// Marks previously dismissed banners and drops them from the result.
    pub fn visible(&self, banners: Vec<AlertBanner>) -> Vec<AlertBanner> {
        banners
            .into_iter()
            .map(|mut banner| {
                if self.dismissed.contains(&banner.message) {
                    banner.dismiss();
                }
                banner
            })
            .filter(AlertBanner::is_visible)
            .collect()
    }

    pub fn dismiss_all(&mut self, banners: &[AlertBanner]) {
        self.dismissed
            .extend(banners.iter().map(|banner| banner.message.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismissed_banners_stay_hidden() {
        let mut shelf = BannerShelf::default();
        let banners = vec![
            AlertBanner::new(AlertKind::Danger, "1 active incident detected")
                .with_detail("CAM-01 — Collision"),
            AlertBanner::new(AlertKind::Warning, "Could not load dashboard data"),
        ];
        assert_eq!(shelf.visible(banners.clone()).len(), 2);

        shelf.dismiss_all(&banners[..1]);
        let visible = shelf.visible(banners);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, AlertKind::Warning);
    }
}
