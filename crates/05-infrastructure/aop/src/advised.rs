//! 可被通知包装的调用目标

use infrastructure_common::{AdviceError, AdviceResult};
use std::fmt;
use std::sync::Arc;

/// 调用目标函数类型
///
/// `A` 是按顺序排列的参数元组，零参数时为 `()`
pub type TargetFn<A, R> = dyn Fn(A) -> AdviceResult<R> + Send + Sync;

/// 被通知包装的调用
///
/// 每一层持有内层的共享引用，包装总是返回新的 `Advised`，不会修改已有的调用链。
pub struct Advised<A, R> {
    callee: Arc<str>,
    target: Arc<TargetFn<A, R>>,
}

impl<A, R> Clone for Advised<A, R> {
    fn clone(&self) -> Self {
        Self {
            callee: Arc::clone(&self.callee),
            target: Arc::clone(&self.target),
        }
    }
}

impl<A, R> fmt::Debug for Advised<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advised")
            .field("callee", &self.callee)
            .field("target", &"<function>")
            .finish()
    }
}

impl<A: 'static, R: 'static> Advised<A, R> {
    /// 包装不会失败的函数
    pub fn new<F>(callee: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_fn(callee, move |args| Ok(f(args)))
    }

    /// 包装返回 `Result` 的函数，错误转换为 [`AdviceError::TargetFailed`]
    pub fn fallible<F, E>(callee: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let callee: Arc<str> = callee.into();
        let name = Arc::clone(&callee);
        Self::from_fn(callee, move |args| {
            f(args).map_err(|e| AdviceError::TargetFailed {
                callee: name.to_string(),
                source: Box::new(e),
            })
        })
    }

    /// 直接使用返回 [`AdviceResult`] 的函数
    pub fn from_fn<F>(callee: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(A) -> AdviceResult<R> + Send + Sync + 'static,
    {
        Self {
            callee: callee.into(),
            target: Arc::new(f),
        }
    }

    pub(crate) fn layer<F>(&self, f: F) -> Self
    where
        F: Fn(A) -> AdviceResult<R> + Send + Sync + 'static,
    {
        Self {
            callee: Arc::clone(&self.callee),
            target: Arc::new(f),
        }
    }
}

impl<A, R> Advised<A, R> {
    /// 调用名称
    pub fn callee(&self) -> &str {
        &self.callee
    }

    /// 调用整条通知链
    pub fn call(&self, args: A) -> AdviceResult<R> {
        (self.target)(args)
    }

    pub(crate) fn callee_arc(&self) -> Arc<str> {
        Arc::clone(&self.callee)
    }

    pub(crate) fn target(&self) -> Arc<TargetFn<A, R>> {
        Arc::clone(&self.target)
    }
}
