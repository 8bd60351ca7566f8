use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认的 Sparkdock 可执行文件位置
pub const DEFAULT_EXECUTABLE_PATH: &str = "/opt/sparkdock/bin/sparkdock.macos";

/// 子进程使用的 PATH，保证 brew / wc 等二级工具可以稳定解析
pub const DEFAULT_SEARCH_PATH: &str = "/usr/local/bin:/opt/homebrew/bin:/usr/bin:/bin:/usr/sbin:/sbin";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executable_path: PathBuf,
    pub check_argument: String,
    pub update_command: String,
    pub brew_paths: Vec<PathBuf>,
    pub brew_enabled: bool,
    pub brew_upgrade_command: String,
    pub search_path: String,
    pub check_interval_secs: u64,
    pub process_timeout_secs: u64,
    pub resume_threshold_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_EXECUTABLE_PATH),
            check_argument: "check-updates".to_string(),
            update_command: "sparkdock".to_string(),
            brew_paths: vec![
                PathBuf::from("/opt/homebrew/bin/brew"),
                PathBuf::from("/usr/local/bin/brew"),
            ],
            brew_enabled: true,
            brew_upgrade_command: "brew upgrade && brew upgrade --cask".to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            check_interval_secs: 4 * 60 * 60,
            process_timeout_secs: 30,
            resume_threshold_secs: 60,
        }
    }
}

impl Config {
    /// 默认配置文件路径: ~/.config/sparkdock-manager/config.toml
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/sparkdock-manager/config.toml")
    }

    /// 读取配置；文件不存在时使用默认值
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            log::debug!("loaded configuration from {}", config_path.display());
            config
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.process_timeout_secs == 0 {
            bail!("process_timeout_secs must be greater than zero");
        }
        if self.check_interval_secs == 0 {
            bail!("check_interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn resume_threshold(&self) -> Duration {
        Duration::from_secs(self.resume_threshold_secs)
    }

    /// 参与查找的 brew 路径；禁用时为空
    pub fn brew_candidates(&self) -> &[PathBuf] {
        if self.brew_enabled {
            &self.brew_paths
        } else {
            &[]
        }
    }

    /// 第一个存在的 brew 路径
    pub fn locate_brew(&self) -> Option<PathBuf> {
        first_existing(self.brew_candidates())
    }
}

/// 按顺序返回第一个存在的路径（每次调用都重新检查文件系统）
pub fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.exists()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.executable_path, PathBuf::from(DEFAULT_EXECUTABLE_PATH));
        assert_eq!(config.check_interval(), Duration::from_secs(14400));
        assert_eq!(config.process_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "process_timeout_secs = 5\nbrew_enabled = false\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.process_timeout_secs, 5);
        assert!(!config.brew_enabled);
        assert_eq!(config.check_argument, "check-updates");
        assert_eq!(config.search_path, DEFAULT_SEARCH_PATH);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "process_timeout_secs = 0\n").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "check_interval_secs = \"soon\"\n").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn locate_brew_picks_first_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("brew");
        fs::write(&second, "").unwrap();

        let config = Config {
            brew_paths: vec![dir.path().join("missing"), second.clone()],
            ..Config::default()
        };
        assert_eq!(config.locate_brew(), Some(second));

        let disabled = Config {
            brew_enabled: false,
            ..config
        };
        assert_eq!(disabled.locate_brew(), None);
    }
}
