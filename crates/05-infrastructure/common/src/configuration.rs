//! 容器配置
//!
//! 使用 config crate 从可选配置文件和环境变量加载

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "LORN_DI";

/// 默认配置文件（不含扩展名，文件可以不存在）
pub const DEFAULT_CONFIG_FILE: &str = "config/container";

/// around 通知体没有调用 proceed 时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProceedPolicy {
    /// 返回 `ProceedMisuse` 错误
    #[default]
    Strict,
    /// 通知体结束后自动调用一次目标，返回目标的结果
    Permissive,
    /// 允许短路，直接返回通知体的结果
    Optional,
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 循环依赖检测的最大遍历深度
    ///
    /// 只在启用循环依赖检测时生效。无环但已注册依赖链长于该值的组件同样会以
    /// `ResolutionDepthExceeded` 被拒绝，需要更深的依赖链时调大该值。
    pub max_resolution_depth: usize,
    /// 批量应用切面时使用的 proceed 策略
    pub proceed_policy: ProceedPolicy,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            proceed_policy: ProceedPolicy::Strict,
        }
    }
}

impl ContainerConfig {
    /// 从默认配置文件和 `LORN_DI__*` 环境变量加载
    pub fn load() -> ConfigResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));
        Self::build(builder)
    }

    /// 从 TOML 文本加载
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ConfigResult<Self> {
        let settings = builder.build().map_err(|e| {
            error!("容器配置构建失败: {}", e);
            ConfigError::from(e)
        })?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        debug!("容器配置加载完成: {:?}", config);
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 设置 proceed 策略
    pub fn with_proceed_policy(mut self, policy: ProceedPolicy) -> Self {
        self.proceed_policy = policy;
        self
    }

    /// 设置最大遍历深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置是否启用循环依赖检测
    pub fn with_circular_dependency_detection(mut self, enabled: bool) -> Self {
        self.enable_circular_dependency_detection = enabled;
        self
    }
}
