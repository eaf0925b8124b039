//! 连接点
//!
//! around 通知体通过连接点访问调用名称、参数，并决定何时调用内层目标。
//! 连接点随每次调用在调用方栈上创建，只借给当前通知体使用，不存在跨调用共享的 proceed 槽位。

use crate::advised::TargetFn;
use infrastructure_common::{AdviceError, AdviceResult};
use std::any::{type_name, Any};
use tracing::trace;

/// 类型擦除后的值
pub type AnyValue = Box<dyn Any + Send>;

/// 单次调用的连接点
pub struct JoinPoint<'a, A, R> {
    callee: &'a str,
    args: A,
    target: &'a TargetFn<A, R>,
    proceeded: usize,
}

impl<'a, A, R> JoinPoint<'a, A, R>
where
    A: Clone,
{
    pub(crate) fn new(callee: &'a str, args: A, target: &'a TargetFn<A, R>) -> Self {
        Self {
            callee,
            args,
            target,
            proceeded: 0,
        }
    }

    /// 调用名称
    pub fn callee(&self) -> &str {
        self.callee
    }

    /// 当前参数
    pub fn args(&self) -> &A {
        &self.args
    }

    /// 可修改的当前参数
    pub fn args_mut(&mut self) -> &mut A {
        &mut self.args
    }

    /// 替换参数，之后的 proceed 使用新参数
    pub fn set_args(&mut self, args: A) {
        self.args = args;
    }

    /// 以当前参数调用内层目标
    ///
    /// 可以调用零次、一次或多次
    pub fn proceed(&mut self) -> AdviceResult<R> {
        self.proceeded += 1;
        trace!(callee = self.callee, attempt = self.proceeded, "proceed");
        (self.target)(self.args.clone())
    }

    /// 替换参数后调用内层目标
    pub fn proceed_with(&mut self, args: A) -> AdviceResult<R> {
        self.set_args(args);
        self.proceed()
    }

    /// 已调用 proceed 的次数
    pub fn proceed_count(&self) -> usize {
        self.proceeded
    }
}

/// 类型擦除的连接点
///
/// 供 [`Aspect`](crate::Aspect) 在不知道具体参数和返回类型的情况下使用
pub trait DynJoinPoint {
    /// 调用名称
    fn callee(&self) -> &str;

    /// 当前参数
    fn args(&self) -> &dyn Any;

    /// 替换参数，类型必须与原参数一致
    fn set_args(&mut self, args: AnyValue) -> AdviceResult<()>;

    /// 调用内层目标，返回类型擦除后的结果
    fn proceed(&mut self) -> AdviceResult<AnyValue>;

    /// 已调用 proceed 的次数
    fn proceed_count(&self) -> usize;
}

impl dyn DynJoinPoint + '_ {
    /// 按具体类型读取参数
    pub fn args_as<T: Any>(&self) -> Option<&T> {
        self.args().downcast_ref::<T>()
    }
}

impl<A, R> DynJoinPoint for JoinPoint<'_, A, R>
where
    A: Clone + Send + 'static,
    R: Send + 'static,
{
    fn callee(&self) -> &str {
        self.callee
    }

    fn args(&self) -> &dyn Any {
        &self.args
    }

    fn set_args(&mut self, args: AnyValue) -> AdviceResult<()> {
        let args = args
            .downcast::<A>()
            .map_err(|_| AdviceError::ArgumentTypeMismatch {
                callee: self.callee.to_string(),
                expected: type_name::<A>(),
            })?;
        self.args = *args;
        Ok(())
    }

    fn proceed(&mut self) -> AdviceResult<AnyValue> {
        JoinPoint::proceed(self).map(|value| Box::new(value) as AnyValue)
    }

    fn proceed_count(&self) -> usize {
        self.proceeded
    }
}
