//! 有界外部命令执行 — 启动一个子进程，在限定时间内等待其退出，超时则整组杀死

pub mod error;
pub mod types;

pub use error::RunError;
pub use types::{CommandSpec, ProcessOutcome};

use std::io;
use std::time::{Duration, Instant};

/// 轮询子进程状态的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 外部命令执行器
///
/// 每次调用最多创建一个进程，不做任何重试。
pub trait Runner: Send + Sync {
    fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<ProcessOutcome, RunError>;
}

/// 基于 duct 的真实执行器（阻塞调用，应放在后台线程中使用）
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Runner for ProcessRunner {
    fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<ProcessOutcome, RunError> {
        if !spec.program.exists() {
            return Err(RunError::NotFound {
                path: spec.program.clone(),
            });
        }

        let mut expression = duct::cmd(spec.program.as_path(), &spec.args)
            .stdin_null()
            .stdout_capture()
            .stderr_null()
            .unchecked()
            .before_spawn(|cmd| {
                use std::os::unix::process::CommandExt;
                unsafe {
                    cmd.pre_exec(|| {
                        // 独立进程组，超时时可以连同 shell 管道里的子进程一起杀死
                        libc::setpgid(0, 0);
                        #[cfg(target_os = "linux")]
                        libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                        Ok(())
                    });
                }
                Ok(())
            });
        for (key, value) in &spec.env {
            expression = expression.env(key, value);
        }

        let handle = expression.start().map_err(|source| RunError::Launch {
            path: spec.program.clone(),
            source,
        })?;
        let wait_error = |source| RunError::Wait {
            path: spec.program.clone(),
            source,
        };
        let pid = handle
            .pids()
            .first()
            .copied()
            .ok_or_else(|| wait_error(io::Error::new(io::ErrorKind::Other, "no child pid")))?;
        log::debug!("spawned `{}` (pid {})", spec.display(), pid);

        // 只观察直接子进程是否退出，不等待输出管道关闭：
        // 后台孙进程可能一直持有 stdout
        let deadline = Instant::now() + timeout;
        loop {
            if child_exited(pid).map_err(wait_error)? {
                kill_group(pid);
                let output = handle.wait().map_err(wait_error)?;
                return Ok(ProcessOutcome {
                    exit_code: output.status.code(),
                    timed_out: false,
                    stdout: output.stdout.clone(),
                });
            }
            if Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        log::warn!(
            "`{}` did not finish within {:?}, terminating",
            spec.display(),
            timeout
        );
        kill_group(pid);
        // kill 之后会回收子进程，避免留下僵尸
        if let Err(e) = handle.kill() {
            log::debug!("reaping timed-out process failed: {}", e);
        }

        Ok(ProcessOutcome::timed_out())
    }
}

/// 直接子进程是否已经退出（不回收，留给 duct 的 wait）
fn child_exited(pid: u32) -> io::Result<bool> {
    // macOS 在子进程未退出时不会写 siginfo，必须预先清零
    let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
    let ret = unsafe {
        libc::waitid(
            libc::P_PID,
            pid as libc::id_t,
            &mut info,
            libc::WEXITED | libc::WNOWAIT | libc::WNOHANG,
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(info.si_signo == libc::SIGCHLD)
}

/// 向整个进程组发送 SIGKILL，清理残留的后台进程
fn kill_group(pid: u32) {
    unsafe {
        libc::kill(-(pid as i32), libc::SIGKILL);
    }
}
