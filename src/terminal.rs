//! 升级命令交接 — 只负责给出纯文本命令，并在当前终端中交互执行

use crate::config::Config;
use anyhow::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpgradeKind {
    Sparkdock,
    Brew,
}

pub fn upgrade_command(kind: UpgradeKind, config: &Config) -> &str {
    match kind {
        UpgradeKind::Sparkdock => &config.update_command,
        UpgradeKind::Brew => &config.brew_upgrade_command,
    }
}

/// 转义 `\` 和 `"`，用于嵌入双引号脚本字符串
pub fn escape_for_quoted(command: &str) -> String {
    command.replace('\\', "\\\\").replace('"', "\\\"")
}

/// 通过 `sh -c` 在当前终端执行命令，继承标准输入输出，返回退出码
pub fn run_interactive(command: &str, search_path: &str) -> Result<i32> {
    log::info!("running `{}`", command);
    let output = duct::cmd!("/bin/sh", "-c", command)
        .env("PATH", search_path)
        .unchecked()
        .run()?;
    Ok(output.status.code().unwrap_or(-1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_matches_quoted_script_rules() {
        let cases = [
            ("sparkdock", "sparkdock"),
            ("sparkdock \"test\"", "sparkdock \\\"test\\\""),
            ("sparkdock\\test", "sparkdock\\\\test"),
            ("sparkdock\\\"test\\\"", "sparkdock\\\\\\\"test\\\\\\\""),
        ];
        for (input, expected) in cases {
            assert_eq!(escape_for_quoted(input), expected);
        }
    }

    #[test]
    fn upgrade_commands_come_from_config() {
        let config = Config::default();
        assert_eq!(upgrade_command(UpgradeKind::Sparkdock, &config), "sparkdock");
        assert_eq!(
            upgrade_command(UpgradeKind::Brew, &config),
            "brew upgrade && brew upgrade --cask"
        );
    }

    #[test]
    fn interactive_run_reports_exit_code() {
        assert_eq!(run_interactive("exit 7", "/usr/bin:/bin").unwrap(), 7);
        assert_eq!(run_interactive("true", "/usr/bin:/bin").unwrap(), 0);
    }
}
