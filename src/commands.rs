//! 一次性子命令：check / status / upgrade

use crate::checker::{CheckReport, UpdateChecker};
use crate::config::Config;
use crate::runner::ProcessRunner;
use crate::status::StatusView;
use crate::terminal::{self, UpgradeKind};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

fn checker(config: &Config) -> UpdateChecker {
    UpdateChecker::new(config, Arc::new(ProcessRunner::new()))
}

pub async fn check(config: &Config, json: bool) -> Result<()> {
    let report = checker(config).check().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut view = StatusView::new();
        view.apply(&report);
        println!("{}", view.render());
    }
    Ok(())
}

pub fn status(config: &Config, config_path: &Path) -> Result<()> {
    let found = |exists: bool| if exists { "✅ Found" } else { "❌ Not found" };

    println!("Sparkdock Manager - Status: OK");
    println!("Executable path: {}", config.executable_path.display());
    println!(
        "Sparkdock executable: {}",
        found(config.executable_path.exists())
    );
    match config.locate_brew() {
        Some(brew) => println!("Homebrew: {}", brew.display()),
        None if !config.brew_enabled => println!("Homebrew: disabled"),
        None => println!("Homebrew: ❌ Not found"),
    }
    let config_state = if config_path.exists() {
        "loaded"
    } else {
        "not present, using defaults"
    };
    println!("Config file: {} ({})", config_path.display(), config_state);
    println!("Check interval: {}s", config.check_interval_secs);
    println!("Process timeout: {}s", config.process_timeout_secs);
    Ok(())
}

/// 对应检查确认有可升级内容时才执行，`force` 跳过确认
pub fn nothing_to_upgrade(kind: UpgradeKind, report: &CheckReport) -> bool {
    match kind {
        UpgradeKind::Sparkdock => !report.result.update_available,
        UpgradeKind::Brew => report.result.total_outdated() == 0,
    }
}

pub async fn upgrade(config: &Config, kind: UpgradeKind, force: bool) -> Result<i32> {
    if !force {
        let report = checker(config).check().await;
        if nothing_to_upgrade(kind, &report) {
            println!("Nothing to upgrade ({}).", report.state);
            return Ok(1);
        }
    }

    let command = terminal::upgrade_command(kind, config);
    terminal::run_interactive(command, &config.search_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::PrimaryStatus;

    #[test]
    fn upgrade_guard_follows_matching_check() {
        let sparkdock_only = CheckReport::new(PrimaryStatus::UpdatesAvailable, 0, 0);
        assert!(!nothing_to_upgrade(UpgradeKind::Sparkdock, &sparkdock_only));
        assert!(nothing_to_upgrade(UpgradeKind::Brew, &sparkdock_only));

        let brew_only = CheckReport::new(PrimaryStatus::Missing, 1, 0);
        assert!(nothing_to_upgrade(UpgradeKind::Sparkdock, &brew_only));
        assert!(!nothing_to_upgrade(UpgradeKind::Brew, &brew_only));
    }

    #[tokio::test]
    async fn forced_upgrade_runs_configured_command() {
        let config = Config {
            brew_upgrade_command: "exit 4".to_string(),
            ..Config::default()
        };
        assert_eq!(upgrade(&config, UpgradeKind::Brew, true).await.unwrap(), 4);
    }
}
