//! # 演示应用
//!
//! 演示组件注册、解析、循环依赖检测和切面编织

use anyhow::Context;
use aop::{Advised, AnyValue, Aspect, DynJoinPoint};
use clap::Parser;
use component_macros::Component;
use di_abstractions::{AspectRegistry, ComponentRegistry};
use di_impl::DiContainerImpl;
use infrastructure_common::{AdviceResult, ContainerConfig, InfrastructureResult, Scope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "demo-package")]
#[command(about = "Lorn IoC 演示应用")]
struct Args {
    /// 容器配置文件（TOML），不指定时从默认位置和环境变量加载
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Component)]
#[component(name = "Config")]
struct DatabaseConfig {
    host: String,
}

/// 数据库
#[derive(Debug, Component)]
#[component(name = "DB")]
struct Database {
    #[component(dependency)]
    config: Arc<DatabaseConfig>,
}

/// 请求上下文，每次解析都是新实例
#[derive(Debug, Clone, Default, Component)]
struct RequestContext {
    handled: usize,
}

/// 互相引用的服务
#[derive(Debug, Default, Component)]
struct Scheduler {
    #[component(dependency)]
    worker: OnceLock<Arc<Worker>>,
}

#[derive(Debug, Default, Component)]
struct Worker {
    #[component(dependency)]
    scheduler: OnceLock<Arc<Scheduler>>,
}

/// 记录调用的日志切面
#[derive(Debug, Default)]
struct LoggingAspect {
    calls: AtomicUsize,
}

impl Aspect for LoggingAspect {
    fn name(&self) -> &str {
        "logging"
    }

    fn around(&self, jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        info!("调用 {} (第 {} 次), 参数: {:?}", jp.callee(), call, jp.args_as::<i32>());
        let value = jp.proceed()?;
        info!("{} 返回: {:?}", jp.callee(), value.downcast_ref::<i32>());
        Ok(value)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    info!("启动 Lorn IoC 演示应用");

    let config = load_config(&args)?;
    let container = DiContainerImpl::with_config(config);

    demonstrate_components(&container)?;
    demonstrate_cycle_detection(&container)?;
    demonstrate_aspects(&container)?;

    let descriptors = container.descriptors();
    for descriptor in &descriptors {
        info!(
            "组件 {} -> {} ({})",
            descriptor.name,
            descriptor.type_info.short_name(),
            descriptor.scope
        );
    }
    info!("已注册组件:\n{}", serde_json::to_string_pretty(&descriptors)?);

    container.reset();
    info!("演示结束");
    Ok(())
}

/// 加载容器配置
fn load_config(args: &Args) -> anyhow::Result<ContainerConfig> {
    let config = match &args.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败: {path}"))?;
            ContainerConfig::from_toml_str(&source)?
        }
        None => ContainerConfig::load()?,
    };
    info!("容器配置: {:?}", config);
    Ok(config)
}

/// 演示组件注册和解析
fn demonstrate_components(container: &DiContainerImpl) -> InfrastructureResult<()> {
    info!("演示组件注册和解析");

    let config = container.register(DatabaseConfig {
        host: "localhost".to_string(),
    })?;
    container.register(Database { config })?;

    let db = container.lookup::<Database>()?;
    info!("DB 连接到: {}", db.config.host);

    container.register_scoped(RequestContext::default(), Scope::Prototype)?;
    let mut first = container.lookup::<RequestContext>()?;
    if let Some(context) = Arc::get_mut(&mut first) {
        context.handled += 1;
    }
    let second = container.lookup::<RequestContext>()?;
    info!(
        "原型组件互不影响: first.handled = {}, second.handled = {}",
        first.handled, second.handled
    );

    Ok(())
}

/// 演示循环依赖检测
fn demonstrate_cycle_detection(container: &DiContainerImpl) -> anyhow::Result<()> {
    info!("演示循环依赖检测");

    let scheduler = Arc::new(Scheduler::default());
    let worker = Arc::new(Worker::default());
    scheduler
        .worker
        .set(worker.clone())
        .map_err(|_| anyhow::anyhow!("Scheduler.worker 已被设置"))?;
    worker
        .scheduler
        .set(scheduler.clone())
        .map_err(|_| anyhow::anyhow!("Worker.scheduler 已被设置"))?;

    container.register_shared(worker)?;
    match container.register_shared(scheduler) {
        Ok(_) => warn!("循环依赖未被检测到"),
        Err(e) => info!("注册被拒绝: {}", e),
    }

    Ok(())
}

/// 演示切面
fn demonstrate_aspects(container: &DiContainerImpl) -> InfrastructureResult<()> {
    info!("演示切面编织");

    let logging = container.register_aspect(LoggingAspect::default());
    let double = container.apply_aspects(&Advised::new("double", |x: i32| x * 2));

    for x in [5, 3] {
        let result = double.call(x)?;
        info!("double({}) = {}", x, result);
    }
    info!("日志切面共记录 {} 次调用", logging.calls.load(Ordering::SeqCst));

    Ok(())
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
