//! Rotation decision

use crate::active::ActiveFile;
use crate::config::{RotationModel, WriterConfig};

use chrono::NaiveDate;

/// Whether the active file must be replaced before the next write.
///
/// Date model: the day has moved past the file's day. Size model: the file has reached
/// `max_size` bytes. Each model ignores the other's trigger.
pub fn must_rotate(active: &ActiveFile, config: &WriterConfig, today: NaiveDate) -> bool {
    should_rotate(active.date(), active.size(), config, today)
}

pub(crate) fn should_rotate(
    file_date: NaiveDate,
    file_size: u64,
    config: &WriterConfig,
    today: NaiveDate,
) -> bool {
    match config.model {
        RotationModel::Date => today > file_date,
        RotationModel::Size => file_size >= config.max_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn config(model: RotationModel) -> WriterConfig {
        WriterConfig::builder("/tmp", "t")
            .model(model)
            .max_size(1024)
            .max_file_count(3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_date_model_rotates_on_new_day_only() {
        let config = config(RotationModel::Date);

        assert!(!should_rotate(day(2), 0, &config, day(2)));
        assert!(!should_rotate(day(2), u64::MAX, &config, day(2)));
        assert!(should_rotate(day(2), 0, &config, day(3)));
        // clock moved backwards
        assert!(!should_rotate(day(2), 0, &config, day(1)));
    }

    #[test]
    fn test_size_model_rotates_at_threshold() {
        let config = config(RotationModel::Size);

        assert!(!should_rotate(day(2), 1023, &config, day(2)));
        assert!(should_rotate(day(2), 1024, &config, day(2)));
        assert!(should_rotate(day(2), 4096, &config, day(2)));
        assert!(!should_rotate(day(2), 0, &config, day(9)));
    }
}
