pub mod state;

use crate::checker::{Trigger, UpdateChecker};
use crate::config::Config;
use crate::runner::ProcessRunner;
use crate::terminal::{self, UpgradeKind};
use anyhow::Result;
use state::{App, AppEvent};
use std::io::BufRead;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// 睡眠恢复检测的节拍
const RESUME_TICK: Duration = Duration::from_secs(30);

pub async fn run(config: Config) -> Result<()> {
    if !config.executable_path.exists() {
        log::warn!(
            "Sparkdock executable not found at {}",
            config.executable_path.display()
        );
    }

    let checker = UpdateChecker::new(&config, Arc::new(ProcessRunner::new()));
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(32);

    spawn_timer(config.check_interval(), tx.clone());
    spawn_resume_detector(config.resume_threshold(), tx.clone());
    spawn_stdin_reader(tx.clone());
    spawn_signal_listener(tx.clone())?;

    println!("Keys: Enter/r check, s Sparkdock, b brew, u/g upgrade hint, p print, q quit");
    if tx.send(AppEvent::Trigger(Trigger::Launch)).await.is_err() {
        log::debug!("event loop stopped before the launch check");
    }

    // 主循环：所有界面状态只在这里修改
    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = tokio::signal::ctrl_c() => Some(AppEvent::Quit),
        };
        let Some(event) = event else {
            break;
        };

        match event {
            AppEvent::Trigger(trigger) => {
                log::info!("update check triggered by {}", trigger);
                app.begin_check(trigger);
                draw(&app);

                let checker = checker.clone();
                let tx_clone = tx.clone();
                tokio::spawn(async move {
                    let report = checker.check().await;
                    if tx_clone.send(AppEvent::CheckFinished(report)).await.is_err() {
                        log::debug!("event loop already stopped, dropping check report");
                    }
                });
            }
            AppEvent::CheckFinished(report) => {
                app.finish_check(&report);
                draw(&app);
            }
            AppEvent::UpgradeHint(kind) => print_upgrade_hint(&app, kind, &config),
            AppEvent::Redraw => draw(&app),
            AppEvent::Quit => app.should_quit = true,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(app: &App) {
    println!("[{}]\n{}\n", app.phase, app.view.render());
}

fn print_upgrade_hint(app: &App, kind: UpgradeKind, config: &Config) {
    let available = match kind {
        UpgradeKind::Sparkdock => app.view.upgrade_sparkdock.is_some(),
        UpgradeKind::Brew => app.view.upgrade_brew.is_some(),
    };
    if !available {
        println!("Nothing to upgrade.\n");
        return;
    }
    let command = terminal::upgrade_command(kind, config);
    println!(
        "Run in a terminal:\n  sh -c \"{}\"\n",
        terminal::escape_for_quoted(command)
    );
}

fn spawn_timer(interval: Duration, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 第一次 tick 立即返回，启动检查由 Trigger::Launch 负责
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::Trigger(Trigger::Timer)).await.is_err() {
                break;
            }
        }
    });
}

fn spawn_resume_detector(threshold: Duration, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut last_wall = SystemTime::now();
        let mut last_mono = Instant::now();
        loop {
            tokio::time::sleep(RESUME_TICK).await;
            let wall = SystemTime::now()
                .duration_since(last_wall)
                .unwrap_or_default();
            let mono = last_mono.elapsed();
            last_wall = SystemTime::now();
            last_mono = Instant::now();

            if state::is_resume(wall, mono, threshold) {
                log::info!("system resumed after {:?} - checking for updates", wall.saturating_sub(mono));
                if tx.send(AppEvent::Trigger(Trigger::Resume)).await.is_err() {
                    break;
                }
            }
        }
    });
}

/// 标准输入的读取无法取消，放在独立线程中，避免退出时阻塞运行时
fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("stdin closed: {}", e);
                    break;
                }
            };
            let Some(event) = state::parse_key(&line) else {
                continue;
            };
            if tx.blocking_send(event).is_err() {
                break;
            }
        }
        // 没有交互终端（例如作为登录项启动）时只依赖定时器
    });
}

/// SIGUSR1 等同于用户手动触发检查
fn spawn_signal_listener(tx: mpsc::Sender<AppEvent>) -> Result<()> {
    let mut usr1 = signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            if tx.send(AppEvent::Trigger(Trigger::User)).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}
