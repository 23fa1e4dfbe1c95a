/// Application configuration containing all hardcoded values
///
/// There is no configuration file; every operation receives its own config
/// value built from these defaults and the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_train_ratio: f64,
    pub default_valid_ratio: f64,
    /// Extensions picked up when rotating a whole folder.
    pub image_extensions: Vec<&'static str>,
    pub merged_dir_prefix: &'static str,
    pub rotated_dir_name: &'static str,
    pub default_from_class: u32,
    pub default_to_class: u32,
    pub log_file_prefix: &'static str,
    pub max_log_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_train_ratio: 0.7,
            default_valid_ratio: 0.2,
            image_extensions: vec!["jpg", "jpeg", "png"],
            merged_dir_prefix: "merged_",
            rotated_dir_name: "rotated",
            default_from_class: 1,
            default_to_class: 0,
            log_file_prefix: "yolo_dataset_tools",
            max_log_files: 10,
        }
    }
}

impl AppConfig {
    /// Name of the merge destination for a given day, e.g. `merged_2024-05-01`.
    pub fn merged_dir_name(&self, date: chrono::NaiveDate) -> String {
        format!("{}{}", self.merged_dir_prefix, date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratios() {
        let config = AppConfig::default();
        assert_eq!(config.default_train_ratio, 0.7);
        assert_eq!(config.default_valid_ratio, 0.2);
    }

    #[test]
    fn test_merged_dir_name() {
        let config = AppConfig::default();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(config.merged_dir_name(date), "merged_2024-03-09");
    }
}
