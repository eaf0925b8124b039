//! 切面
//!
//! 切面是带状态的横切逻辑，通过类型擦除的连接点作用于任意签名的调用。

use crate::advice::around_with;
use crate::advised::Advised;
use crate::join_point::{AnyValue, DynJoinPoint};
use infrastructure_common::{AdviceError, AdviceResult, ProceedPolicy};
use std::any::type_name;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// 切面 trait
///
/// 切面实例可以持有自己的可变状态（计数器、日志、缓存），需要自行保证线程安全。
pub trait Aspect: Send + Sync + Debug + 'static {
    /// 切面名称
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// 是否作用于指定调用
    fn applies_to(&self, _callee: &str) -> bool {
        true
    }

    /// 环绕逻辑
    ///
    /// 返回值必须是目标的返回类型（通常就是 `jp.proceed()` 的结果）
    fn around(&self, jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue>;
}

/// 用单个切面包装调用
pub fn apply_aspect<A, R>(
    target: &Advised<A, R>,
    aspect: Arc<dyn Aspect>,
    policy: ProceedPolicy,
) -> Advised<A, R>
where
    A: Clone + Send + 'static,
    R: Send + 'static,
{
    around_with(target, policy, move |jp| {
        let value = aspect.around(&mut *jp)?;
        value
            .downcast::<R>()
            .map(|value| *value)
            .map_err(|_| AdviceError::ResultTypeMismatch {
                callee: jp.callee().to_string(),
                expected: type_name::<R>(),
            })
    })
}

/// 按注册顺序编织切面
///
/// `aspects` 按注册顺序给出，后注册的切面位于外层：它的前置逻辑最先运行，后置逻辑最后运行。
/// `applies_to` 返回 false 的切面被跳过。
pub fn weave<A, R>(
    target: &Advised<A, R>,
    aspects: &[Arc<dyn Aspect>],
    policy: ProceedPolicy,
) -> Advised<A, R>
where
    A: Clone + Send + 'static,
    R: Send + 'static,
{
    let mut woven = target.clone();
    for aspect in aspects {
        if !aspect.applies_to(target.callee()) {
            continue;
        }
        debug!("应用切面: {} -> {}", aspect.name(), target.callee());
        woven = apply_aspect(&woven, Arc::clone(aspect), policy);
    }
    woven
}
