//! 更新检查 — 调用 Sparkdock 主检查与 Homebrew 二级检查，汇总为 `CheckReport`

pub mod brew;
pub mod types;

pub use types::{CheckReport, CheckState, PrimaryStatus, Trigger, UpdateResult};

use crate::config::{self, Config};
use crate::runner::{CommandSpec, Runner};
use brew::BrewPackageType;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 更新检查器
///
/// 每次检查都是独立的只读操作，可以并发调用，后到的结果覆盖先到的结果。
#[derive(Clone)]
pub struct UpdateChecker {
    runner: Arc<dyn Runner>,
    executable_path: PathBuf,
    check_argument: String,
    search_path: String,
    brew_paths: Vec<PathBuf>,
    timeout: Duration,
}

impl UpdateChecker {
    pub fn new(config: &Config, runner: Arc<dyn Runner>) -> Self {
        Self {
            runner,
            executable_path: config.executable_path.clone(),
            check_argument: config.check_argument.clone(),
            search_path: config.search_path.clone(),
            brew_paths: config.brew_candidates().to_vec(),
            timeout: config.process_timeout(),
        }
    }

    fn primary_command(&self) -> CommandSpec {
        CommandSpec::new(&self.executable_path)
            .arg(&self.check_argument)
            .env("PATH", &self.search_path)
    }

    /// 主检查：退出码 0 表示无更新，非 0 表示有更新
    pub fn check_primary(&self) -> PrimaryStatus {
        if !self.executable_path.exists() {
            log::warn!(
                "Sparkdock executable not found at {}",
                self.executable_path.display()
            );
            return PrimaryStatus::Missing;
        }

        match self.runner.run(&self.primary_command(), self.timeout) {
            Ok(outcome) if outcome.timed_out => {
                log::error!(
                    "Sparkdock {} timed out after {:?}",
                    self.check_argument,
                    self.timeout
                );
                PrimaryStatus::Failed(format!("timed out after {}s", self.timeout.as_secs()))
            }
            Ok(outcome) => match outcome.exit_code {
                Some(0) => PrimaryStatus::UpToDate,
                Some(code) => {
                    log::info!("Sparkdock reports updates (exit code {})", code);
                    PrimaryStatus::UpdatesAvailable
                }
                None => {
                    log::error!("Sparkdock {} was terminated by a signal", self.check_argument);
                    PrimaryStatus::Failed("terminated by signal".to_string())
                }
            },
            Err(e) if e.is_not_found() => {
                log::warn!("{}", e);
                PrimaryStatus::Missing
            }
            Err(e) => {
                log::error!("failed to run Sparkdock check: {}", e);
                PrimaryStatus::Failed(e.to_string())
            }
        }
    }

    /// 二级检查：返回 (formulae, casks)；brew 不存在时静默返回 (0, 0)
    ///
    /// brew 在每次检查时重新定位，运行期间安装的 brew 也能被发现。
    pub fn check_brew(&self) -> (u32, u32) {
        let Some(brew) = config::first_existing(&self.brew_paths) else {
            log::info!("Homebrew not found at expected locations");
            return (0, 0);
        };

        let formulae = brew::outdated_count(
            self.runner.as_ref(),
            &brew,
            BrewPackageType::Formulae,
            &self.search_path,
            self.timeout,
        );
        let casks = brew::outdated_count(
            self.runner.as_ref(),
            &brew,
            BrewPackageType::Casks,
            &self.search_path,
            self.timeout,
        );
        log::info!(
            "found {} outdated formulae and {} outdated casks (total: {})",
            formulae,
            casks,
            formulae.saturating_add(casks)
        );
        (formulae, casks)
    }

    /// 同步执行完整检查（阻塞当前线程）
    pub fn check_blocking(&self) -> CheckReport {
        let primary = self.check_primary();
        let (formulae, casks) = self.check_brew();
        CheckReport::new(primary, formulae, casks)
    }

    /// 在阻塞线程池中并发执行主检查和二级检查
    pub async fn check(&self) -> CheckReport {
        let primary_checker = self.clone();
        let brew_checker = self.clone();

        let (primary, counts) = tokio::join!(
            tokio::task::spawn_blocking(move || primary_checker.check_primary()),
            tokio::task::spawn_blocking(move || brew_checker.check_brew()),
        );

        let primary = primary.unwrap_or_else(|e| {
            log::error!("Sparkdock check task failed: {}", e);
            PrimaryStatus::Failed("check task failed".to_string())
        });
        let (formulae, casks) = counts.unwrap_or_else(|e| {
            log::error!("brew check task failed: {}", e);
            (0, 0)
        });

        let report = CheckReport::new(primary, formulae, casks);
        log::info!("update check finished: {}", report.state);
        report
    }
}
