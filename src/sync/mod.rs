//! # Sync Module
//!
//! Reconciles batches of records with named worksheets, either by appending
//! rows or by merging them into the existing content.
mod syncer;

pub use syncer::TableSyncer;

/// Sheet whose merges keep only the latest observation per channel.
pub const CHANNELS_DAILY: &str = "channels_daily";

/// Grouping column of the [`CHANNELS_DAILY`] sheet.
pub const CHANNEL_ID_COLUMN: &str = "channel_id";

/// Ordering column of the [`CHANNELS_DAILY`] sheet.
pub const PROCESSED_AT_COLUMN: &str = "processed_at";

/// How a merge combines a batch with a sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// Existing rows and the batch are concatenated and deduplicated by the
    /// configured key columns; the last occurrence of a key wins.
    DeduplicateByKey,

    /// Existing content is discarded. The batch is reduced to one row per
    /// `group` value, the one with the greatest `order` value.
    LatestPerGroup {
        group: &'static str,
        order: &'static str,
    },
}

impl MergePolicy {
    /// Chooses the policy for a sheet.
    ///
    /// Only [`CHANNELS_DAILY`] uses [`MergePolicy::LatestPerGroup`], grouped by
    /// `channel_id` and ordered by `processed_at`; its merge configuration is
    /// ignored. Every other sheet deduplicates by key.
    pub fn for_table(name: &str) -> Self {
        if name == CHANNELS_DAILY {
            MergePolicy::LatestPerGroup {
                group: CHANNEL_ID_COLUMN,
                order: PROCESSED_AT_COLUMN,
            }
        } else {
            MergePolicy::DeduplicateByKey
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_for_channels_daily() {
        assert_eq!(
            MergePolicy::for_table("channels_daily"),
            MergePolicy::LatestPerGroup {
                group: "channel_id",
                order: "processed_at",
            }
        );
    }

    #[test]
    fn policy_for_other_sheets() {
        assert_eq!(MergePolicy::for_table("videos"), MergePolicy::DeduplicateByKey);
        assert_eq!(MergePolicy::for_table("Channels_Daily"), MergePolicy::DeduplicateByKey);
    }
}
