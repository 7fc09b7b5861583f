//! 统一错误处理模块
//!
//! 模拟过程中的业务异常（缺货、空购物车、支付失败等）都以事件的形式输出，
//! 不属于错误。这里只定义真正的故障：配置错误、I/O 错误以及状态机不变量被破坏。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum SimError {
    // ==================== 配置错误 ====================
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("无效的配置: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    // ==================== 状态机错误 ====================
    #[error("未知的用户状态: {0}")]
    UnknownState(i32),

    #[error("商品下标越界: index={index}, len={len}")]
    ProductOutOfRange { index: usize, len: usize },

    #[error("不变量被破坏: {0}")]
    InvariantViolation(String),

    // ==================== 输出错误 ====================
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::UnknownState(_) => "UNKNOWN_STATE",
            Self::ProductOutOfRange { .. } => "PRODUCT_OUT_OF_RANGE",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// 是否为状态机故障
    ///
    /// 这类错误只终止当前步骤，调度器会记录并重置该用户会话。
    pub fn is_step_fault(&self) -> bool {
        matches!(
            self,
            Self::UnknownState(_) | Self::ProductOutOfRange { .. } | Self::InvariantViolation(_)
        )
    }

    /// 快速构造配置校验错误
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
