//! 更新检查相关数据类型定义

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// 检查状态机
///
/// `Idle → Checking → {UpToDate, UpdatesAvailable, CheckFailed}`，结果交付后回到 `Idle`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Idle,
    Checking,
    UpToDate,
    UpdatesAvailable,
    CheckFailed,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CheckState::Idle => "idle",
            CheckState::Checking => "checking",
            CheckState::UpToDate => "up to date",
            CheckState::UpdatesAvailable => "updates available",
            CheckState::CheckFailed => "check failed",
        };
        f.write_str(text)
    }
}

/// 一次检查的结果记录，每次检查重新计算，不做持久化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UpdateResult {
    pub update_available: bool,
    pub outdated_formula_count: u32,
    pub outdated_cask_count: u32,
}

impl UpdateResult {
    pub fn total_outdated(&self) -> u32 {
        self.outdated_formula_count
            .saturating_add(self.outdated_cask_count)
    }

    pub fn has_any_updates(&self) -> bool {
        self.update_available || self.total_outdated() > 0
    }
}

/// 主检查（Sparkdock 可执行文件）的结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PrimaryStatus {
    /// 可执行文件不存在，按"无更新"处理
    Missing,
    UpToDate,
    UpdatesAvailable,
    /// 启动失败或超时
    Failed(String),
}

/// 触发一次检查的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Launch,
    Timer,
    User,
    UserSparkdock,
    UserBrew,
    Resume,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Trigger::Launch => "launch",
            Trigger::Timer => "timer",
            Trigger::User => "user",
            Trigger::UserSparkdock => "user (sparkdock)",
            Trigger::UserBrew => "user (brew)",
            Trigger::Resume => "system resume",
        };
        f.write_str(text)
    }
}

/// 交付给界面层的完整检查报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub state: CheckState,
    pub result: UpdateResult,
    pub primary: PrimaryStatus,
    pub checked_at: DateTime<Local>,
}

impl CheckReport {
    pub fn new(primary: PrimaryStatus, formulae: u32, casks: u32) -> Self {
        let result = UpdateResult {
            update_available: primary == PrimaryStatus::UpdatesAvailable,
            outdated_formula_count: formulae,
            outdated_cask_count: casks,
        };
        Self {
            state: derive_state(&primary, &result),
            result,
            primary,
            checked_at: Local::now(),
        }
    }
}

/// 主检查失败优先；否则任一来源有更新即为 UpdatesAvailable
pub fn derive_state(primary: &PrimaryStatus, result: &UpdateResult) -> CheckState {
    match primary {
        PrimaryStatus::Failed(_) => CheckState::CheckFailed,
        _ if result.has_any_updates() => CheckState::UpdatesAvailable,
        _ => CheckState::UpToDate,
    }
}
