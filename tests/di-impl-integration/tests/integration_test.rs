//! 容器与通知链的集中集成测试

use aop::{Advised, AnyValue, Aspect, DynJoinPoint};
use di_abstractions::{AspectRegistry, ComponentRegistry};
use di_impl::DiContainerImpl;
use infrastructure_common::{
    AdviceError, AdviceResult, Component, ComponentAdapter, ComponentRef, ContainerConfig,
    DependencyError, DependencyField, InfrastructureError, InfrastructureResult, ProceedPolicy,
    Scope,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once, OnceLock, Weak};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn edges(fields: &[&dyn DependencyField]) -> Vec<ComponentRef> {
    let mut out = Vec::new();
    for field in fields {
        field.collect_into(&mut out);
    }
    out
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
}

impl Component for Config {
    fn name(&self) -> &'static str {
        "Config"
    }
}

#[derive(Debug)]
struct Db {
    config: Arc<Config>,
}

impl Component for Db {
    fn name(&self) -> &'static str {
        "DB"
    }

    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.config])
    }
}

#[test]
fn test_config_db_scenario() {
    init_test_logger();
    let container = DiContainerImpl::new();

    let config = container
        .register(Config {
            host: "localhost".to_string(),
        })
        .unwrap();
    container.register(Db { config }).unwrap();

    let db = container.lookup::<Db>().unwrap();
    assert_eq!(db.config.host, "localhost");
    assert!(Arc::ptr_eq(&db.config, &container.lookup::<Config>().unwrap()));
}

#[test]
fn test_singleton_and_prototype_scopes() {
    init_test_logger();
    let container = DiContainerImpl::new();

    let registered = container
        .register_scoped(Config { host: "a".into() }, Scope::Singleton)
        .unwrap();
    for _ in 0..3 {
        assert!(Arc::ptr_eq(&registered, &container.lookup::<Config>().unwrap()));
    }

    let config = container.lookup::<Config>().unwrap();
    container
        .register_scoped(Session::new(config), Scope::Prototype)
        .unwrap();

    let first = container.lookup::<Session>().unwrap();
    let second = container.lookup::<Session>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.user, "anonymous");
    assert_eq!(second.user, "anonymous");

    first.visits.fetch_add(5, Ordering::SeqCst);
    assert_eq!(second.visits.load(Ordering::SeqCst), 0);
    // 其他组件的共享引用是边，不属于原型自身的状态
    assert!(Arc::ptr_eq(&first.config, &second.config));
}

#[derive(Debug)]
struct Session {
    user: String,
    visits: AtomicUsize,
    config: Arc<Config>,
}

impl Session {
    fn new(config: Arc<Config>) -> Self {
        Self {
            user: "anonymous".into(),
            visits: AtomicUsize::new(0),
            config,
        }
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            user: self.user.clone(),
            visits: AtomicUsize::new(self.visits.load(Ordering::SeqCst)),
            config: Arc::clone(&self.config),
        }
    }
}

impl Component for Session {
    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.config])
    }
}

#[test]
fn test_duplicate_registration_leaves_state_unchanged() {
    init_test_logger();
    let container = DiContainerImpl::new();
    container.register(Config { host: "first".into() }).unwrap();
    container
        .register_scoped(ComponentAdapter::new(7_u32), Scope::Prototype)
        .unwrap();

    let before: Vec<_> = container
        .descriptors()
        .into_iter()
        .map(|d| (d.name, d.scope, d.type_info.id))
        .collect();

    let err = container.register(Config { host: "second".into() }).unwrap_err();
    assert!(matches!(err, DependencyError::DuplicateComponent { .. }));

    let after: Vec<_> = container
        .descriptors()
        .into_iter()
        .map(|d| (d.name, d.scope, d.type_info.id))
        .collect();
    assert_eq!(before, after);
    assert_eq!(container.lookup::<Config>().unwrap().host, "first");
    assert_eq!(**container.lookup::<ComponentAdapter<u32>>().unwrap(), 7);
}

#[derive(Debug)]
struct SelfRef {
    me: Weak<SelfRef>,
}

impl Component for SelfRef {
    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.me])
    }
}

#[derive(Debug, Default)]
struct ServiceA {
    b: OnceLock<Arc<ServiceB>>,
}

impl Component for ServiceA {
    fn name(&self) -> &'static str {
        "ServiceA"
    }

    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.b])
    }
}

#[derive(Debug, Default)]
struct ServiceB {
    c: OnceLock<Arc<ServiceC>>,
}

impl Component for ServiceB {
    fn name(&self) -> &'static str {
        "ServiceB"
    }

    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.c])
    }
}

#[derive(Debug, Default)]
struct ServiceC {
    a: OnceLock<Arc<ServiceA>>,
}

impl Component for ServiceC {
    fn name(&self) -> &'static str {
        "ServiceC"
    }

    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.a])
    }
}

#[test]
fn test_direct_self_reference_is_rejected() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let node = Arc::new_cyclic(|me| SelfRef { me: me.clone() });

    let err = container.register_shared(node).unwrap_err();
    assert!(matches!(err, DependencyError::CircularDependency { .. }));
    assert_eq!(container.count(), 0);
}

#[test]
fn test_transitive_cycle_is_rejected() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let a = Arc::new(ServiceA::default());
    let b = Arc::new(ServiceB::default());
    let c = Arc::new(ServiceC::default());
    b.c.set(c.clone()).unwrap();
    c.a.set(a.clone()).unwrap();

    container.register_shared(c).unwrap();
    container.register_shared(b.clone()).unwrap();

    // A -> B 闭合了 A -> B -> C -> A
    a.b.set(b).unwrap();
    let err = container.register_shared(a).unwrap_err();
    match err {
        DependencyError::CircularDependency { chain } => {
            assert_eq!(chain, vec!["ServiceA", "ServiceB", "ServiceC", "ServiceA"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(container.count(), 2);
    assert!(!container.contains::<ServiceA>());
}

#[derive(Debug)]
struct Shared;

impl Component for Shared {}

#[derive(Debug)]
struct LeftBranch {
    shared: Arc<Shared>,
}

impl Component for LeftBranch {
    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.shared])
    }
}

#[derive(Debug)]
struct RightBranch {
    shared: Arc<Shared>,
}

impl Component for RightBranch {
    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.shared])
    }
}

#[derive(Debug)]
struct Top {
    left: Arc<LeftBranch>,
    right: Option<Arc<RightBranch>>,
}

impl Component for Top {
    fn dependencies(&self) -> Vec<ComponentRef> {
        edges(&[&self.left, &self.right])
    }
}

#[test]
fn test_diamond_graph_is_accepted() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let shared = container.register(Shared).unwrap();
    let left = container
        .register(LeftBranch {
            shared: shared.clone(),
        })
        .unwrap();
    let right = container.register(RightBranch { shared }).unwrap();

    container
        .register(Top {
            left,
            right: Some(right),
        })
        .unwrap();
    assert_eq!(container.count(), 4);
}

#[test]
fn test_reset_then_lookup_fails() {
    init_test_logger();
    let container = DiContainerImpl::new();
    container.register(Config { host: "h".into() }).unwrap();
    container.register(Shared).unwrap();

    container.reset();

    assert!(matches!(
        container.lookup::<Config>().unwrap_err(),
        DependencyError::ComponentNotFound { .. }
    ));
    assert!(container.lookup::<Shared>().unwrap_err().is_not_found());
    assert!(container.descriptors().is_empty());
}

#[test]
fn test_configured_depth_limit() {
    init_test_logger();
    let config = ContainerConfig::from_toml_str("max_resolution_depth = 2").unwrap();
    let container = DiContainerImpl::with_config(config);

    let shared = container.register(Shared).unwrap();
    let left = container.register(LeftBranch { shared }).unwrap();
    let err = container
        .register(Top { left, right: None })
        .unwrap_err();
    assert!(matches!(
        err,
        DependencyError::ResolutionDepthExceeded { max_depth: 2, .. }
    ));
}

#[test]
fn test_depth_limit_is_part_of_cycle_detection() {
    init_test_logger();
    let config = ContainerConfig::from_toml_str(
        "enable_circular_dependency_detection = false\nmax_resolution_depth = 2",
    )
    .unwrap();
    let container = DiContainerImpl::with_config(config);

    let shared = container.register(Shared).unwrap();
    let left = container.register(LeftBranch { shared }).unwrap();
    container.register(Top { left, right: None }).unwrap();
    assert_eq!(container.count(), 3);
}

/// 记录参数和结果的切面
#[derive(Debug, Default)]
struct Recording {
    calls: AtomicUsize,
    args: Mutex<Vec<i32>>,
    results: Mutex<Vec<i32>>,
}

impl Aspect for Recording {
    fn applies_to(&self, callee: &str) -> bool {
        callee == "double"
    }

    fn around(&self, jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(&x) = jp.args_as::<i32>() {
            self.args.lock().push(x);
        }
        let value = jp.proceed()?;
        if let Some(&result) = value.downcast_ref::<i32>() {
            self.results.lock().push(result);
        }
        Ok(value)
    }
}

#[derive(Debug)]
struct Tagging {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Aspect for Tagging {
    fn name(&self) -> &str {
        self.label
    }

    fn around(&self, jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue> {
        self.log.lock().push(format!("{}-before", self.label));
        let value = jp.proceed()?;
        self.log.lock().push(format!("{}-after", self.label));
        Ok(value)
    }
}

#[test]
fn test_aspects_through_container() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let recording = container.register_aspect(Recording::default());

    let double = container.apply_aspects(&Advised::new("double", |x: i32| x * 2));
    let triple = container.apply_aspects(&Advised::new("triple", |x: i32| x * 3));

    assert_eq!(double.call(5).unwrap(), 10);
    assert_eq!(double.call(3).unwrap(), 6);
    assert_eq!(triple.call(2).unwrap(), 6);

    assert_eq!(recording.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*recording.args.lock(), vec![5, 3]);
    assert_eq!(*recording.results.lock(), vec![10, 6]);
}

#[test]
fn test_aspect_nesting_follows_registration_order() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for label in ["inner", "middle", "outer"] {
        container.register_aspect(Tagging {
            label,
            log: Arc::clone(&log),
        });
    }

    let base_log = Arc::clone(&log);
    let base = Advised::new("base", move |()| base_log.lock().push("base".to_string()));
    container.apply_aspects(&base).call(()).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "outer-before",
            "middle-before",
            "inner-before",
            "base",
            "inner-after",
            "middle-after",
            "outer-after",
        ]
    );
}

#[test]
fn test_advice_body_can_lookup_components() {
    init_test_logger();
    let container = Arc::new(DiContainerImpl::new());
    container.register(Config { host: "db.local".into() }).unwrap();

    let registry = Arc::clone(&container);
    let connect = Advised::new("connect", |host: String| format!("connected to {host}"))
        .around(move |jp| {
            let config = registry.lookup::<Config>()?;
            jp.proceed_with(config.host.clone())
        });
    assert_eq!(connect.call(String::new()).unwrap(), "connected to db.local");

    container.reset();
    let err = connect.call(String::new()).unwrap_err();
    assert!(matches!(err, AdviceError::Dependency(ref e) if e.is_not_found()));
}

#[test]
fn test_permissive_policy_from_config() {
    init_test_logger();
    let config = ContainerConfig::default().with_proceed_policy(ProceedPolicy::Permissive);
    let container = DiContainerImpl::with_config(config);

    #[derive(Debug)]
    struct Forgetful;

    impl Aspect for Forgetful {
        fn around(&self, _jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue> {
            Ok(Box::new(0_i32))
        }
    }

    container.register_aspect(Forgetful);
    let square = container.apply_aspects(&Advised::new("square", |x: i32| x * x));
    assert_eq!(square.call(4).unwrap(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_and_lookup() {
    init_test_logger();
    let container = Arc::new(DiContainerImpl::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let container = Arc::clone(&container);
        handles.push(tokio::task::spawn_blocking(move || {
            container
                .register(Config {
                    host: format!("host-{i}"),
                })
                .is_ok()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(container.count(), 1);

    let expected = container.lookup::<Config>().unwrap();
    let mut lookups = Vec::new();
    for _ in 0..16 {
        let container = Arc::clone(&container);
        lookups.push(tokio::task::spawn_blocking(move || {
            container.lookup::<Config>().unwrap()
        }));
    }
    for lookup in lookups {
        assert!(Arc::ptr_eq(&expected, &lookup.await.unwrap()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_interleaved_with_register_and_lookup() {
    init_test_logger();
    let container = Arc::new(DiContainerImpl::new());
    const ROUNDS: usize = 200;

    let registrar = {
        let container = Arc::clone(&container);
        tokio::task::spawn_blocking(move || {
            for _ in 0..ROUNDS {
                let config = match container.register(Config {
                    host: "localhost".into(),
                }) {
                    Ok(config) => config,
                    Err(DependencyError::DuplicateComponent { .. }) => {
                        match container.lookup::<Config>() {
                            Ok(config) => config,
                            Err(e) => {
                                assert!(e.is_not_found(), "unexpected error: {e}");
                                continue;
                            }
                        }
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                };
                match container.register(Db { config }) {
                    Ok(_) | Err(DependencyError::DuplicateComponent { .. }) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        })
    };

    let reader = {
        let container = Arc::clone(&container);
        tokio::task::spawn_blocking(move || {
            for _ in 0..ROUNDS {
                match container.lookup::<Config>() {
                    Ok(config) => assert_eq!(config.host, "localhost"),
                    Err(e) => assert!(e.is_not_found(), "unexpected error: {e}"),
                }
                match container.lookup::<Db>() {
                    Ok(db) => assert_eq!(db.config.host, "localhost"),
                    Err(e) => assert!(e.is_not_found(), "unexpected error: {e}"),
                }

                let names: Vec<String> =
                    container.descriptors().into_iter().map(|d| d.name).collect();
                assert!(names.len() <= 2);
                assert!(names.iter().all(|name| name == "Config" || name == "DB"));
                assert!(names.len() < 2 || names[0] != names[1], "重复注册: {names:?}");
            }
        })
    };

    let resetter = {
        let container = Arc::clone(&container);
        tokio::task::spawn_blocking(move || {
            for _ in 0..ROUNDS {
                container.reset();
                std::thread::yield_now();
            }
        })
    };

    registrar.await.unwrap();
    reader.await.unwrap();
    resetter.await.unwrap();

    let registered =
        usize::from(container.contains::<Config>()) + usize::from(container.contains::<Db>());
    assert_eq!(container.count(), registered);
    assert_eq!(container.descriptors().len(), registered);

    container.reset();
    assert_eq!(container.count(), 0);
    assert!(container.lookup::<Config>().unwrap_err().is_not_found());
    assert!(container.lookup::<Db>().unwrap_err().is_not_found());
}

/// 依次注册 Config、DB 并调用一次被通知的函数
fn wire_and_call(container: &DiContainerImpl) -> InfrastructureResult<i32> {
    let config = container.register(Config {
        host: "localhost".into(),
    })?;
    container.register(Db { config })?;
    let triple = container.apply_aspects(&Advised::new("triple", |x: i32| x * 3));
    Ok(triple.call(7)?)
}

#[test]
fn test_container_and_advice_errors_share_one_result_type() {
    init_test_logger();
    let container = DiContainerImpl::new();
    assert_eq!(wire_and_call(&container).unwrap(), 21);

    assert!(matches!(
        wire_and_call(&container).unwrap_err(),
        InfrastructureError::DependencyError {
            source: DependencyError::DuplicateComponent { .. }
        }
    ));

    #[derive(Debug)]
    struct Silent;

    impl Aspect for Silent {
        fn around(&self, _jp: &mut dyn DynJoinPoint) -> AdviceResult<AnyValue> {
            Ok(Box::new(0_i32))
        }
    }

    container.reset();
    container.register_aspect(Silent);
    assert!(matches!(
        wire_and_call(&container).unwrap_err(),
        InfrastructureError::AdviceError { .. }
    ));
}
