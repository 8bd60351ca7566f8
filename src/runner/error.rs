use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 启动阶段的失败；超时与非零退出码不属于错误，见 `ProcessOutcome`
#[derive(Debug, Error)]
pub enum RunError {
    /// 可执行文件不存在，未创建任何进程
    #[error("executable not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for {}: {source}", path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// 工具缺失（静默降级）与工具故障（需要展示错误状态）的区分
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunError::NotFound { .. })
    }
}
