//! 循环依赖检测

use infrastructure_common::{
    component_identity, ComponentRef, DependencyError, DependencyResult,
};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// 默认最大遍历深度
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测从 `component` 出发的组件图中是否存在回边
    ///
    /// `is_registered` 判断某个类型当前是否已在注册表中，只有已注册的邻居才会被继续遍历
    fn detect_cycle(
        &self,
        component: &ComponentRef,
        is_registered: &dyn Fn(TypeId) -> bool,
    ) -> DependencyResult<()>;
}

/// 默认循环依赖检测器
///
/// 深度优先遍历组件字段引用。已访问集合按身份（指针）记录当前路径上的祖先，
/// 每个分支拿到的是副本，所以菱形共享不会被误报，只有指向祖先的回边才会失败。
/// 已完整遍历且无回边的节点记录子图高度，再次到达时不重复遍历。
#[derive(Debug, Clone)]
pub struct DefaultCircularDependencyDetector {
    max_depth: usize,
}

impl DefaultCircularDependencyDetector {
    /// 创建指定最大深度的检测器
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// 最大遍历深度
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for DefaultCircularDependencyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// 当前路径上的祖先
#[derive(Debug, Clone, Default)]
struct Visited {
    identities: HashSet<usize>,
    chain: Vec<&'static str>,
}

impl Visited {
    fn with(&self, component: &ComponentRef) -> Self {
        let mut next = self.clone();
        next.identities.insert(component_identity(component));
        next.chain.push(component.name());
        next
    }

    fn contains(&self, component: &ComponentRef) -> bool {
        self.identities.contains(&component_identity(component))
    }
}

/// 单次检测共享的遍历状态
struct Walk<'a> {
    is_registered: &'a dyn Fn(TypeId) -> bool,
    /// 已确认无回边的节点 -> 子图最长路径上的节点数
    cleared: HashMap<usize, usize>,
}

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_cycle(
        &self,
        component: &ComponentRef,
        is_registered: &dyn Fn(TypeId) -> bool,
    ) -> DependencyResult<()> {
        let mut walk = Walk {
            is_registered,
            cleared: HashMap::new(),
        };
        self.dfs_check(component, &Visited::default(), &mut walk)?;
        Ok(())
    }
}

impl DefaultCircularDependencyDetector {
    fn depth_exceeded(&self, component: &ComponentRef) -> DependencyError {
        DependencyError::ResolutionDepthExceeded {
            type_name: component.name().to_string(),
            max_depth: self.max_depth,
        }
    }

    /// 返回以 `current` 为根、已遍历子图的高度
    fn dfs_check(
        &self,
        current: &ComponentRef,
        visited: &Visited,
        walk: &mut Walk<'_>,
    ) -> DependencyResult<usize> {
        let depth = visited.chain.len();
        if depth >= self.max_depth {
            return Err(self.depth_exceeded(current));
        }

        let visited = visited.with(current);
        let mut height = 0;

        for neighbor in current.dependencies() {
            if visited.contains(&neighbor) {
                let mut chain: Vec<String> =
                    visited.chain.iter().map(|name| (*name).to_string()).collect();
                chain.push(neighbor.name().to_string());
                return Err(DependencyError::CircularDependency { chain });
            }

            if !(walk.is_registered)(neighbor.component_type_id()) {
                continue;
            }

            let below = match walk.cleared.get(&component_identity(&neighbor)) {
                Some(&below) => {
                    if depth + below >= self.max_depth {
                        return Err(self.depth_exceeded(&neighbor));
                    }
                    below
                }
                None => {
                    trace!("遍历已注册依赖: {} -> {}", current.name(), neighbor.name());
                    self.dfs_check(&neighbor, &visited, walk)?
                }
            };
            height = height.max(below);
        }

        let height = height + 1;
        walk.cleared.insert(component_identity(current), height);
        Ok(height)
    }
}
