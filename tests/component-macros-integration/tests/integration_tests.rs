//! 组件宏集成测试

use component_macros::Component;
use di_abstractions::ComponentRegistry;
use di_impl::DiContainerImpl;
use infrastructure_common::{
    Component, ComponentRef, DependencyError, ValidationError, ValidationResult,
};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// 测试配置
#[derive(Debug, Component)]
pub struct TestConfig {
    pub host: String,
}

/// 测试数据库
#[derive(Debug, Component)]
#[component(name = "DB", validate = "check")]
pub struct TestDatabase {
    #[component(dependency)]
    config: Arc<TestConfig>,
    pool_size: usize,
}

impl TestDatabase {
    fn check(&self) -> ValidationResult<()> {
        if self.pool_size == 0 {
            return Err(ValidationError::invalid_field_value(
                "pool_size",
                "0",
                "连接池大小必须大于 0",
            ));
        }
        Ok(())
    }
}

/// 可在注册后设置依赖的服务
#[derive(Debug, Default, Component)]
pub struct LateService {
    #[component(dependency)]
    peer: OnceLock<Arc<PeerService>>,
}

#[derive(Debug, Default, Component)]
pub struct PeerService {
    #[component(dependency)]
    peers: RwLock<Vec<Arc<LateService>>>,
}

#[test]
fn test_derived_name_and_dependencies() {
    let config = Arc::new(TestConfig {
        host: "localhost".into(),
    });
    let db = TestDatabase {
        config: config.clone(),
        pool_size: 8,
    };

    assert_eq!(config.name(), "TestConfig");
    assert_eq!(db.name(), "DB");

    let deps = db.dependencies();
    assert_eq!(deps.len(), 1);
    let expected: ComponentRef = config;
    assert!(Arc::ptr_eq(&deps[0], &expected));
}

#[test]
fn test_derived_components_in_container() {
    let container = DiContainerImpl::new();
    let config = container
        .register(TestConfig {
            host: "localhost".into(),
        })
        .unwrap();
    container
        .register(TestDatabase {
            config,
            pool_size: 8,
        })
        .unwrap();

    let db = container.lookup::<TestDatabase>().unwrap();
    assert_eq!(db.config.host, "localhost");

    let names: Vec<_> = container.descriptors().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["TestConfig", "DB"]);
}

#[test]
fn test_derived_validation_rejects_component() {
    let container = DiContainerImpl::new();
    let config = Arc::new(TestConfig { host: "h".into() });

    let err = container
        .register(TestDatabase {
            config,
            pool_size: 0,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        DependencyError::InvalidComponent {
            source: ValidationError::InvalidFieldValue { .. },
            ..
        }
    ));
    assert_eq!(container.count(), 0);
}

#[test]
fn test_derived_edges_feed_cycle_detection() {
    let container = DiContainerImpl::new();
    let late = Arc::new(LateService::default());
    let peer = Arc::new(PeerService::default());

    assert!(late.dependencies().is_empty());
    assert!(peer.dependencies().is_empty());

    peer.peers.write().push(late.clone());
    container.register_shared(peer.clone()).unwrap();

    late.peer.set(peer).unwrap();
    let err = container.register_shared(late).unwrap_err();
    assert!(matches!(err, DependencyError::CircularDependency { .. }));
}
