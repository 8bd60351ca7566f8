use crate::checker::{CheckReport, CheckState, Trigger};
use crate::status::StatusView;
use crate::terminal::UpgradeKind;
use std::time::Duration;

// ========== 事件 ==========

#[derive(Debug)]
pub enum AppEvent {
    Trigger(Trigger),
    CheckFinished(CheckReport),
    UpgradeHint(UpgradeKind),
    Redraw,
    Quit,
}

/// 解析标准输入中的一行按键
pub fn parse_key(line: &str) -> Option<AppEvent> {
    match line.trim() {
        "" | "r" => Some(AppEvent::Trigger(Trigger::User)),
        "s" => Some(AppEvent::Trigger(Trigger::UserSparkdock)),
        "b" => Some(AppEvent::Trigger(Trigger::UserBrew)),
        "u" => Some(AppEvent::UpgradeHint(UpgradeKind::Sparkdock)),
        "g" => Some(AppEvent::UpgradeHint(UpgradeKind::Brew)),
        "p" => Some(AppEvent::Redraw),
        "q" => Some(AppEvent::Quit),
        _ => None,
    }
}

/// 墙上时钟比单调时钟多走出阈值以上，说明系统刚从睡眠中恢复
pub fn is_resume(wall_elapsed: Duration, monotonic_elapsed: Duration, threshold: Duration) -> bool {
    wall_elapsed > monotonic_elapsed + threshold
}

// ========== 应用状态 ==========

pub struct App {
    pub view: StatusView,
    pub phase: CheckState,
    /// 尚未交付结果的检查数量；并发检查互不等待，结果按到达顺序覆盖
    pub in_flight: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: StatusView::new(),
            phase: CheckState::Idle,
            in_flight: 0,
            should_quit: false,
        }
    }

    pub fn begin_check(&mut self, trigger: Trigger) {
        self.in_flight += 1;
        self.phase = CheckState::Checking;
        self.view.mark_checking(trigger);
    }

    pub fn finish_check(&mut self, report: &CheckReport) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.view.apply(report);
        self.phase = if self.in_flight == 0 {
            CheckState::Idle
        } else {
            CheckState::Checking
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::PrimaryStatus;

    #[test]
    fn returns_to_idle_after_delivery() {
        let mut app = App::new();
        app.begin_check(Trigger::Launch);
        assert_eq!(app.phase, CheckState::Checking);

        app.finish_check(&CheckReport::new(PrimaryStatus::UpdatesAvailable, 0, 0));
        assert_eq!(app.phase, CheckState::Idle);
        assert_eq!(app.view.outcome, Some(CheckState::UpdatesAvailable));
    }

    #[test]
    fn overlapping_checks_overwrite_in_arrival_order() {
        let mut app = App::new();
        app.begin_check(Trigger::User);
        app.begin_check(Trigger::User);

        app.finish_check(&CheckReport::new(PrimaryStatus::UpdatesAvailable, 0, 0));
        assert_eq!(app.phase, CheckState::Checking);

        app.finish_check(&CheckReport::new(PrimaryStatus::UpToDate, 0, 0));
        assert_eq!(app.phase, CheckState::Idle);
        assert_eq!(app.view.outcome, Some(CheckState::UpToDate));
        assert!(app.view.upgrade_sparkdock.is_none());
    }

    #[test]
    fn keys_map_to_events() {
        assert!(matches!(parse_key("\n"), Some(AppEvent::Trigger(Trigger::User))));
        assert!(matches!(parse_key("b"), Some(AppEvent::Trigger(Trigger::UserBrew))));
        assert!(matches!(
            parse_key("u"),
            Some(AppEvent::UpgradeHint(UpgradeKind::Sparkdock))
        ));
        assert!(matches!(parse_key(" q "), Some(AppEvent::Quit)));
        assert!(parse_key("x").is_none());
    }

    #[test]
    fn rendered_action_keys_trigger_their_upgrade() {
        let mut app = App::new();
        app.finish_check(&CheckReport::new(PrimaryStatus::UpdatesAvailable, 2, 1));
        let text = app.view.render();

        let actions: Vec<(&str, &str)> = text
            .lines()
            .filter_map(|line| line.trim().strip_prefix('['))
            .filter_map(|rest| rest.split_once("] "))
            .collect();
        assert_eq!(actions.len(), 2);

        for (key, title) in actions {
            let expected = if title.starts_with("Upgrade Sparkdock") {
                UpgradeKind::Sparkdock
            } else {
                UpgradeKind::Brew
            };
            match parse_key(key) {
                Some(AppEvent::UpgradeHint(kind)) => assert_eq!(kind, expected, "key [{}]", key),
                other => panic!("key [{}] maps to {:?}", key, other),
            }
        }
    }

    #[test]
    fn resume_needs_drift_beyond_threshold() {
        let threshold = Duration::from_secs(60);
        let tick = Duration::from_secs(30);
        assert!(!is_resume(tick, tick, threshold));
        assert!(!is_resume(Duration::from_secs(80), tick, threshold));
        assert!(is_resume(Duration::from_secs(3600), tick, threshold));
    }
}
