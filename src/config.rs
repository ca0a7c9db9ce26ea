use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Pixel geometry and scheduling rules shared by the grid, the stacking engine
/// and the gesture state machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Width of one week column in week view.
    pub week_width: f32,
    /// Width of one day in month view; a month column is `days × base_day_width`.
    pub base_day_width: f32,
    /// Height of a task bar.
    pub task_height: f32,
    /// Vertical gap between stacked lanes.
    pub task_gap: f32,
    /// First day of a week column.
    #[serde(with = "weekday_serde")]
    pub week_start: Weekday,
    /// Shortest task a resize may commit.
    pub min_duration_weeks: u32,
    /// Length of the visible range on first launch.
    pub default_range_weeks: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            week_width: 100.0,
            base_day_width: 4.0,
            task_height: 40.0,
            task_gap: 4.0,
            week_start: Weekday::Mon,
            min_duration_weeks: 1,
            default_range_weeks: 12,
        }
    }
}

impl TimelineConfig {
    /// Height of one stacking lane including its gap.
    pub fn lane_height(&self) -> f32 {
        self.task_height + self.task_gap
    }

    /// Clamp values a hand-edited config file could get wrong.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.week_width > 0.0) {
            self.week_width = defaults.week_width;
        }
        if !(self.base_day_width > 0.0) {
            self.base_day_width = defaults.base_day_width;
        }
        if !(self.task_height > 0.0) {
            self.task_height = defaults.task_height;
        }
        if !(self.task_gap >= 0.0) {
            self.task_gap = defaults.task_gap;
        }
        self.min_duration_weeks = self.min_duration_weeks.max(1);
        self.default_range_weeks = self.default_range_weeks.max(1);
        self
    }
}

/// Serde helper storing a `Weekday` as its English name ("Mon", "Sunday", ...).
mod weekday_serde {
    use chrono::Weekday;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&day.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse::<Weekday>()
            .map_err(|_| D::Error::custom(format!("unknown weekday '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{ "week_width": 120.0, "week_start": "Sunday" }"#).unwrap();
        assert_eq!(config.week_width, 120.0);
        assert_eq!(config.week_start, Weekday::Sun);
        assert_eq!(config.base_day_width, 4.0);
        assert_eq!(config.min_duration_weeks, 1);
    }

    #[test]
    fn sanitized_restores_nonsense_values() {
        let config = TimelineConfig {
            week_width: 0.0,
            base_day_width: -3.0,
            min_duration_weeks: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.week_width, 100.0);
        assert_eq!(config.base_day_width, 4.0);
        assert_eq!(config.min_duration_weeks, 1);
    }

    #[test]
    fn lane_height_includes_gap() {
        assert_eq!(TimelineConfig::default().lane_height(), 44.0);
    }
}
