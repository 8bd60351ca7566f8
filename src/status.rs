//! 界面状态 — 只通过检查报告更新，渲染为终端文本

use crate::checker::{CheckReport, CheckState, PrimaryStatus, Trigger, UpdateResult};
use chrono::{DateTime, Local};

const CHECKING_SPARKDOCK: &str = "Checking for updates (Sparkdock)...";
const CHECKING_BREW: &str = "Checking for updates (Brew)...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Normal,
    Attention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pending,
    Ok,
    Attention,
    Error,
}

impl Tone {
    fn marker(&self) -> &'static str {
        match self {
            Tone::Pending => "⏳",
            Tone::Ok => "✅",
            Tone::Attention => "🔄",
            Tone::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusView {
    pub outcome: Option<CheckState>,
    pub result: UpdateResult,
    pub icon: Icon,
    pub tooltip: String,
    pub sparkdock_line: StatusLine,
    pub brew_line: StatusLine,
    /// 仅在有 Sparkdock 更新时可见
    pub upgrade_sparkdock: Option<String>,
    /// 仅在有过期 brew 包时可见
    pub upgrade_brew: Option<String>,
    pub last_checked: Option<DateTime<Local>>,
}

impl Default for StatusView {
    fn default() -> Self {
        Self {
            outcome: None,
            result: UpdateResult::default(),
            icon: Icon::Normal,
            tooltip: "Sparkdock - Up to date".to_string(),
            sparkdock_line: StatusLine::new(CHECKING_SPARKDOCK, Tone::Pending),
            brew_line: StatusLine::new(CHECKING_BREW, Tone::Pending),
            upgrade_sparkdock: None,
            upgrade_brew: None,
            last_checked: None,
        }
    }
}

impl StatusView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查开始时把对应的状态行切换为"检查中"
    pub fn mark_checking(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::UserSparkdock => {
                self.sparkdock_line = StatusLine::new(CHECKING_SPARKDOCK, Tone::Pending);
            }
            Trigger::UserBrew => {
                self.brew_line = StatusLine::new(CHECKING_BREW, Tone::Pending);
            }
            _ => {
                self.sparkdock_line = StatusLine::new(CHECKING_SPARKDOCK, Tone::Pending);
                self.brew_line = StatusLine::new(CHECKING_BREW, Tone::Pending);
            }
        }
    }

    pub fn apply(&mut self, report: &CheckReport) {
        let result = report.result;
        let formulae = result.outdated_formula_count;
        let casks = result.outdated_cask_count;
        let total = result.total_outdated();

        self.outcome = Some(report.state);
        self.result = result;
        self.last_checked = Some(report.checked_at);
        self.icon = if result.has_any_updates() {
            Icon::Attention
        } else {
            Icon::Normal
        };
        self.tooltip = tooltip(&result);

        self.sparkdock_line = match &report.primary {
            PrimaryStatus::UpdatesAvailable => {
                StatusLine::new("Sparkdock updates available", Tone::Attention)
            }
            PrimaryStatus::Failed(reason) => {
                StatusLine::new(format!("Sparkdock check failed: {}", reason), Tone::Error)
            }
            PrimaryStatus::UpToDate | PrimaryStatus::Missing => {
                StatusLine::new("Sparkdock is up to date", Tone::Ok)
            }
        };

        self.brew_line = if total == 0 {
            StatusLine::new("Brew packages: up to date", Tone::Ok)
        } else if formulae > 0 && casks > 0 {
            StatusLine::new(
                format!(
                    "Brew packages: {} to be updated ({} formulae, {} casks)",
                    total, formulae, casks
                ),
                Tone::Attention,
            )
        } else {
            StatusLine::new(format!("Brew packages: {} to be updated", total), Tone::Attention)
        };

        self.upgrade_sparkdock = result
            .update_available
            .then(|| "Upgrade Sparkdock".to_string());
        self.upgrade_brew = if total == 0 {
            None
        } else if formulae > 0 && casks > 0 {
            Some(format!(
                "Upgrade Brew Packages ({} formulae, {} casks)",
                formulae, casks
            ))
        } else {
            Some(format!("Upgrade Brew Packages ({})", total))
        };
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let badge = match self.icon {
            Icon::Normal => "",
            Icon::Attention => " (!)",
        };
        lines.push(format!("Sparkdock Manager{}", badge));
        lines.push(format!("  {}", self.tooltip));
        lines.push(format!(
            "  {} {}",
            self.sparkdock_line.tone.marker(),
            self.sparkdock_line.text
        ));
        lines.push(format!("  {} {}", self.brew_line.tone.marker(), self.brew_line.text));

        if let Some(title) = &self.upgrade_sparkdock {
            lines.push(format!("  [u] {}", title));
        }
        if let Some(title) = &self.upgrade_brew {
            lines.push(format!("  [g] {}", title));
        }
        if let (Some(outcome), Some(at)) = (self.outcome, self.last_checked) {
            lines.push(format!(
                "  Last checked: {} ({})",
                at.format("%Y-%m-%d %H:%M:%S"),
                outcome
            ));
        }
        lines.join("\n")
    }
}

fn tooltip(result: &UpdateResult) -> String {
    let formulae = result.outdated_formula_count;
    let casks = result.outdated_cask_count;

    let mut parts = Vec::new();
    if result.update_available {
        parts.push("Sparkdock updates available".to_string());
    }
    if formulae > 0 && casks > 0 {
        parts.push(format!("{} formulae, {} casks outdated", formulae, casks));
    } else if formulae > 0 {
        parts.push(format!("{} brew formulae outdated", formulae));
    } else if casks > 0 {
        parts.push(format!("{} brew casks outdated", casks));
    }

    if parts.is_empty() {
        "Sparkdock - Up to date".to_string()
    } else {
        format!("Sparkdock - {}", parts.join(", "))
    }
}
