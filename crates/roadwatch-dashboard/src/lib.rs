//! Page-level screens hosting the polling controllers and incident table.
//!
//! Screens hold state only; rendering lives in the CLI.

pub mod alerts;
pub mod incidents;
pub mod live_feed;
pub mod overview;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use alerts::{AlertBanner, AlertKind, BannerShelf};
pub use incidents::IncidentsScreen;
pub use live_feed::{CameraTile, LiveFeedScreen, PollIntervalOption};
pub use overview::{Overview, StatCard, StatVariant};
pub use settings::SettingsScreen;
