//! 进程执行相关数据类型定义

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 一次外部命令调用的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// 覆盖到子进程环境中的变量，其余变量继承自当前进程
    pub env: Vec<(OsString, OsString)>,
}

impl CommandSpec {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// 用于日志的单行展示
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// 子进程执行结果
///
/// 超时时 `timed_out` 为 true，`exit_code` 为 `None`，`stdout` 为空。
/// 被信号终止的进程同样没有退出码。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout: Vec<u8>,
}

impl ProcessOutcome {
    pub fn timed_out() -> Self {
        Self {
            exit_code: None,
            timed_out: true,
            stdout: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_args_and_env() {
        let spec = CommandSpec::new("/bin/sh")
            .arg("-c")
            .args(["echo", "hi"])
            .env("PATH", "/bin");
        assert_eq!(spec.args.len(), 3);
        assert_eq!(spec.env, vec![(OsString::from("PATH"), OsString::from("/bin"))]);
        assert_eq!(spec.display(), "/bin/sh -c echo hi");
    }

    #[test]
    fn timed_out_outcome_is_not_success() {
        let outcome = ProcessOutcome::timed_out();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, None);

        let ok = ProcessOutcome {
            exit_code: Some(0),
            timed_out: false,
            stdout: b"  3\n".to_vec(),
        };
        assert!(ok.success());
        assert_eq!(ok.stdout_text(), "3");
    }
}
