// -
// Configuration defaults

/// Waiting-list length at which enrollment starts logging warnings.
pub(crate) const DEFAULT_PENDING_WARN_THRESHOLD: usize = 64;

/// Pre-allocated capacity for a channel store created on first access.
pub(crate) const DEFAULT_CHANNEL_CAPACITY_HINT: usize = 16;

/// Prefix for environment variable overrides, e.g.
/// `REFHUB__PENDING_WARN_THRESHOLD`.
pub(crate) const ENV_PREFIX: &str = "REFHUB";
