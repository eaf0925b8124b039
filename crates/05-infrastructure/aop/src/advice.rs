//! before / after / around 通知构建
//!
//! 每个构建函数接收一个 [`Advised`] 并返回包装后的新 [`Advised`]。显式嵌套时
//! `outer(middle(inner(base)))` 严格按嵌套顺序执行：最外层的前置逻辑最先运行，
//! 后置逻辑按由内到外的顺序运行。目标或通知体的错误原样向外传播，除非外层
//! around 通知体主动处理。

use crate::advised::Advised;
use crate::join_point::JoinPoint;
use infrastructure_common::{AdviceError, AdviceResult, ProceedMisuse, ProceedPolicy};
use tracing::{trace, warn};

/// 前置通知：先执行 `action`，再调用目标
///
/// `action` 无法阻止或修改调用
pub fn before<A, R, F>(target: &Advised<A, R>, action: F) -> Advised<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn() + Send + Sync + 'static,
{
    let inner = target.target();
    target.layer(move |args| {
        action();
        inner(args)
    })
}

/// 后置通知：调用目标后执行 `action`，返回目标的结果
///
/// 目标失败时错误直接传播，`action` 不执行
pub fn after<A, R, F>(target: &Advised<A, R>, action: F) -> Advised<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn() + Send + Sync + 'static,
{
    let inner = target.target();
    target.layer(move |args| {
        let result = inner(args)?;
        action();
        Ok(result)
    })
}

/// 后置通知：`action` 可以观察目标结果，但不能修改
pub fn after_returning<A, R, F>(target: &Advised<A, R>, action: F) -> Advised<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn(&R) + Send + Sync + 'static,
{
    let inner = target.target();
    target.layer(move |args| {
        let result = inner(args)?;
        action(&result);
        Ok(result)
    })
}

/// 环绕通知，使用默认的 [`ProceedPolicy::Strict`]
pub fn around<A, R, F>(target: &Advised<A, R>, body: F) -> Advised<A, R>
where
    A: Clone + 'static,
    R: 'static,
    F: Fn(&mut JoinPoint<'_, A, R>) -> AdviceResult<R> + Send + Sync + 'static,
{
    around_with(target, ProceedPolicy::default(), body)
}

/// 环绕通知
///
/// 每次调用创建新的连接点并交给 `body`。`body` 的返回值即调用结果；
/// `body` 正常返回但未调用 proceed 时按 `policy` 处理。
pub fn around_with<A, R, F>(target: &Advised<A, R>, policy: ProceedPolicy, body: F) -> Advised<A, R>
where
    A: Clone + 'static,
    R: 'static,
    F: Fn(&mut JoinPoint<'_, A, R>) -> AdviceResult<R> + Send + Sync + 'static,
{
    let inner = target.target();
    let callee = target.callee_arc();
    target.layer(move |args| {
        let mut jp = JoinPoint::new(&callee, args, inner.as_ref());
        trace!(callee = %callee, "advice running");
        let outcome = body(&mut jp)?;

        if jp.proceed_count() > 0 {
            trace!(callee = %callee, proceeded = jp.proceed_count(), "returning");
            return Ok(outcome);
        }

        match policy {
            ProceedPolicy::Strict => Err(AdviceError::ProceedMisuse {
                callee: callee.to_string(),
                reason: ProceedMisuse::NotCalled,
            }),
            ProceedPolicy::Permissive => {
                warn!("around 通知未调用 proceed，自动调用目标: {}", callee);
                jp.proceed()
            }
            ProceedPolicy::Optional => {
                trace!(callee = %callee, "short-circuit");
                Ok(outcome)
            }
        }
    })
}

impl<A: 'static, R: 'static> Advised<A, R> {
    /// 见 [`before`]
    pub fn before<F>(&self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        before(self, action)
    }

    /// 见 [`after`]
    pub fn after<F>(&self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        after(self, action)
    }

    /// 见 [`after_returning`]
    pub fn after_returning<F>(&self, action: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        after_returning(self, action)
    }
}

impl<A: Clone + 'static, R: 'static> Advised<A, R> {
    /// 见 [`around`]
    pub fn around<F>(&self, body: F) -> Self
    where
        F: Fn(&mut JoinPoint<'_, A, R>) -> AdviceResult<R> + Send + Sync + 'static,
    {
        around(self, body)
    }

    /// 见 [`around_with`]
    pub fn around_with<F>(&self, policy: ProceedPolicy, body: F) -> Self
    where
        F: Fn(&mut JoinPoint<'_, A, R>) -> AdviceResult<R> + Send + Sync + 'static,
    {
        around_with(self, policy, body)
    }
}
