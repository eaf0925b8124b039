//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    ComponentNotFound { type_name: String },

    #[error("组件重复注册: {type_name}")]
    DuplicateComponent { type_name: String },

    #[error("组件无效: {type_name}, 原因: {source}")]
    InvalidComponent {
        type_name: String,
        source: ValidationError,
    },

    #[error("循环依赖检测到: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("依赖图深度超过上限: {type_name}, 上限: {max_depth}")]
    ResolutionDepthExceeded { type_name: String, max_depth: usize },

    #[error("组件类型转换失败: {type_name}")]
    TypeMismatch { type_name: String },
}

impl DependencyError {
    /// 创建组件未注册错误
    pub fn not_found<T: ?Sized>() -> Self {
        Self::ComponentNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// 是否为组件未注册错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ComponentNotFound { .. })
    }
}

/// proceed 误用原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceedMisuse {
    /// 严格模式下 around 通知体正常返回但没有调用 proceed
    NotCalled,
}

impl std::fmt::Display for ProceedMisuse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCalled => f.write_str("around 通知体未调用 proceed"),
        }
    }
}

/// 通知链错误类型
#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("proceed 使用错误: {callee}, 原因: {reason}")]
    ProceedMisuse {
        callee: String,
        reason: ProceedMisuse,
    },

    #[error("目标调用失败: {callee}, 原因: {source}")]
    TargetFailed {
        callee: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("通知执行失败: {callee}, 原因: {message}")]
    AdviceFailed { callee: String, message: String },

    #[error("切面返回值类型不匹配: {callee}, 期望: {expected}")]
    ResultTypeMismatch { callee: String, expected: &'static str },

    #[error("切面替换参数类型不匹配: {callee}, 期望: {expected}")]
    ArgumentTypeMismatch { callee: String, expected: &'static str },

    #[error("依赖注入错误: {0}")]
    Dependency(#[from] DependencyError),
}

impl AdviceError {
    /// 创建通知执行失败错误
    pub fn advice_failed(callee: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AdviceFailed {
            callee: callee.into(),
            message: message.into(),
        }
    }

    /// 是否为 proceed 误用
    pub fn is_proceed_misuse(&self) -> bool {
        matches!(self, Self::ProceedMisuse { .. })
    }
}

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("验证失败: {message}")]
    ValidationFailed { message: String },

    #[error("必需字段缺失: {field_name}")]
    RequiredFieldMissing { field_name: String },

    #[error("字段值无效: {field_name}, 值: {value}, 原因: {reason}")]
    InvalidFieldValue {
        field_name: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    /// 创建新的验证错误
    pub fn new(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// 创建必需字段缺失错误
    pub fn required_field_missing(field_name: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field_name: field_name.into(),
        }
    }

    /// 创建字段值无效错误
    pub fn invalid_field_value(
        field_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field_name: field_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("通知链错误: {source}")]
    AdviceError {
        #[from]
        source: AdviceError,
    },

    #[error("验证错误: {source}")]
    ValidationError {
        #[from]
        source: ValidationError,
    },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type AdviceResult<T> = Result<T, AdviceError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
