//! Homebrew 过期包统计（二级检查，失败时一律降级为 0）

use crate::runner::{CommandSpec, Runner};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewPackageType {
    Formulae,
    Casks,
}

impl BrewPackageType {
    pub fn command_suffix(&self) -> &'static str {
        match self {
            BrewPackageType::Formulae => "--formula",
            BrewPackageType::Casks => "--cask",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BrewPackageType::Formulae => "formulae",
            BrewPackageType::Casks => "casks",
        }
    }
}

/// 单引号包裹，供 `sh -c` 使用
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// `<brew> outdated --formula --quiet | wc -l`
pub fn outdated_command(brew: &Path, kind: BrewPackageType, search_path: &str) -> CommandSpec {
    let pipeline = format!(
        "{} outdated {} --quiet | wc -l",
        shell_quote(&brew.to_string_lossy()),
        kind.command_suffix()
    );
    CommandSpec::new("/bin/sh")
        .args(["-c", pipeline.as_str()])
        .env("PATH", search_path)
}

/// 解析 `wc -l` 的输出；无法解析时视为 0
pub fn parse_count(output: &str) -> u32 {
    output.trim().parse().unwrap_or(0)
}

/// 统计某一类过期包数量
pub fn outdated_count(
    runner: &dyn Runner,
    brew: &Path,
    kind: BrewPackageType,
    search_path: &str,
    timeout: Duration,
) -> u32 {
    let spec = outdated_command(brew, kind, search_path);
    match runner.run(&spec, timeout) {
        Ok(outcome) if outcome.timed_out => {
            log::error!(
                "brew outdated check ({}) timed out after {:?}",
                kind.description(),
                timeout
            );
            0
        }
        Ok(outcome) if outcome.success() => {
            let count = parse_count(&outcome.stdout_text());
            log::info!("found {} outdated {}", count, kind.description());
            count
        }
        Ok(outcome) => {
            log::warn!(
                "brew outdated check ({}) failed with exit code {:?}",
                kind.description(),
                outcome.exit_code
            );
            0
        }
        Err(e) => {
            log::error!("failed to run brew outdated check ({}): {}", kind.description(), e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_count_handles_wc_padding() {
        assert_eq!(parse_count("       3\n"), 3);
        assert_eq!(parse_count("0"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("Error: no such command"), 0);
        assert_eq!(parse_count("-2"), 0);
    }

    #[test]
    fn command_pipes_quiet_listing_into_wc() {
        let spec = outdated_command(
            &PathBuf::from("/opt/homebrew/bin/brew"),
            BrewPackageType::Casks,
            "/usr/bin:/bin",
        );
        assert_eq!(spec.program, PathBuf::from("/bin/sh"));
        assert_eq!(spec.args[0], "-c");
        assert_eq!(
            spec.args[1],
            "'/opt/homebrew/bin/brew' outdated --cask --quiet | wc -l"
        );
        assert_eq!(spec.env[0].1, "/usr/bin:/bin");
    }

    #[test]
    fn quoting_survives_single_quotes_in_path() {
        assert_eq!(shell_quote("/tmp/it's/brew"), r"'/tmp/it'\''s/brew'");
    }
}
