//! End-to-end wiring: a small application graph built entirely from
//! configuration.

use std::sync::{Arc, OnceLock};

use rivet_di::{
    BoxedError, Container, ContainerAware, DiError, Resolved, ServiceFactory, ServiceInstance,
};
use serde_json::json;

struct Logger {
    level: String,
}

struct ConnectionFactory;

struct Connection {
    dsn: String,
    pool_max: i64,
}

impl ServiceFactory for ConnectionFactory {
    fn invoke(&self, method: &str, args: &[Resolved]) -> Result<ServiceInstance, BoxedError> {
        match method {
            "connect" => {
                let dsn = args
                    .first()
                    .and_then(Resolved::as_str)
                    .ok_or("connect needs a dsn")?
                    .to_string();
                let pool_max = args.get(1).and_then(Resolved::as_i64).unwrap_or(1);
                Ok(ServiceInstance::new(Arc::new(Connection { dsn, pool_max })))
            }
            other => Err(Box::new(DiError::unknown_method::<Self>(other))),
        }
    }
}

struct Repository {
    connection: Arc<Connection>,
    logger: Arc<Logger>,
    container: OnceLock<Container>,
}

impl ContainerAware for Repository {
    fn set_container(&self, container: Container) {
        let _ = self.container.set(container);
    }
}

struct Request {
    repository: Arc<Repository>,
    trace_tag: String,
}

fn app_container() -> Container {
    Container::builder()
        .config(json!({
            "parameters": {
                "log": { "level": "debug" },
                "db": {
                    "dsn": "pg://db.internal/app",
                    "pool": { "max": 8 }
                }
            },
            "shared": {
                "logger": ["app.logger", "%log.level%"],
                "db.factory": ["app.db_factory"],
                "db": ["@db.factory:connect", "%db.dsn%", "%db.pool.max%"],
                "repo": ["app.repository", "@db", "@logger"]
            },
            "multiple": {
                "request": ["app.request", "@repo", "trace-%log.level%"]
            }
        }))
        .expect("valid configuration")
        .constructor::<Logger, _>("app.logger", |args| {
            Ok(Logger {
                level: args
                    .first()
                    .and_then(Resolved::as_str)
                    .unwrap_or("info")
                    .to_string(),
            })
        })
        .factory_constructor::<ConnectionFactory, _>("app.db_factory", |_| Ok(ConnectionFactory))
        .aware_constructor::<Repository, _>("app.repository", |args| {
            let connection = args
                .first()
                .and_then(Resolved::service_as::<Connection>)
                .ok_or("repository needs a connection")?;
            let logger = args
                .get(1)
                .and_then(Resolved::service_as::<Logger>)
                .ok_or("repository needs a logger")?;
            Ok(Repository {
                connection,
                logger,
                container: OnceLock::new(),
            })
        })
        .constructor::<Request, _>("app.request", |args| {
            let repository = args
                .first()
                .and_then(Resolved::service_as::<Repository>)
                .ok_or("request needs a repository")?;
            let trace_tag = args
                .get(1)
                .and_then(Resolved::as_str)
                .unwrap_or("trace")
                .to_string();
            Ok(Request {
                repository,
                trace_tag,
            })
        })
        .build()
}

#[test]
fn test_whole_graph_builds_lazily_from_one_request() {
    let container = app_container();
    assert_eq!(container.cached_count(), 0);

    let request = container.get_as::<Request>("request").unwrap();

    assert_eq!(request.trace_tag, "trace-debug");
    assert_eq!(request.repository.connection.dsn, "pg://db.internal/app");
    assert_eq!(request.repository.connection.pool_max, 8);
    assert_eq!(request.repository.logger.level, "debug");

    // Everything shared along the way is now cached; the request is not.
    assert!(container.has_cached("logger"));
    assert!(container.has_cached("db.factory"));
    assert!(container.has_cached("db"));
    assert!(container.has_cached("repo"));
    assert!(!container.has_cached("request"));
}

#[test]
fn test_shared_dependencies_are_the_same_instances_everywhere() {
    let container = app_container();

    let request = container.get_as::<Request>("request").unwrap();
    let logger = container.get_as::<Logger>("logger").unwrap();
    let connection = container.get_as::<Connection>("db").unwrap();
    let repository = container.get_as::<Repository>("repo").unwrap();

    assert!(Arc::ptr_eq(&request.repository, &repository));
    assert!(Arc::ptr_eq(&repository.logger, &logger));
    assert!(Arc::ptr_eq(&repository.connection, &connection));
}

#[test]
fn test_requests_are_fresh_but_share_their_backend() {
    let container = app_container();

    let first = container.get_as::<Request>("request").unwrap();
    let second = container.get_as::<Request>("request").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.repository, &second.repository));
}

#[test]
fn test_aware_repository_can_reach_back_into_the_container() {
    let container = app_container();
    let repository = container.get_as::<Repository>("repo").unwrap();

    let held = repository.container.get().expect("container injected");
    let logger = held.get_as::<Logger>("logger").unwrap();
    assert!(Arc::ptr_eq(&logger, &repository.logger));
}

#[test]
fn test_environment_overlay_changes_unbuilt_services_only() {
    let container = app_container();

    // Simulate an environment overlay arriving before anything was built.
    container
        .merge_config(json!({
            "parameters": { "log": { "level": "warn" } }
        }))
        .unwrap();

    let request = container.get_as::<Request>("request").unwrap();
    assert_eq!(request.trace_tag, "trace-warn");
    assert_eq!(request.repository.logger.level, "warn");
}

#[test]
fn test_overlay_after_first_build_does_not_rebuild_shared_services() {
    let container = app_container();
    let logger = container.get_as::<Logger>("logger").unwrap();
    assert_eq!(logger.level, "debug");

    container
        .merge_config(json!({
            "parameters": { "log": { "level": "warn" } }
        }))
        .unwrap();

    // The cached logger keeps its built state, but fresh multiple
    // services see the new parameter.
    let again = container.get_as::<Logger>("logger").unwrap();
    assert!(Arc::ptr_eq(&logger, &again));
    assert_eq!(again.level, "debug");

    let request = container.get_as::<Request>("request").unwrap();
    assert_eq!(request.trace_tag, "trace-warn");
}

#[test]
fn test_resolve_renders_a_config_shaped_report() {
    let container = app_container();

    let resolved = container
        .resolve(&json!({
            "dsn": "%db.dsn%",
            "banner": "level=%log.level% pool=%db.pool.max%",
            "services": ["@logger", "@db"]
        }))
        .unwrap();

    let entries = resolved.as_map().unwrap();
    let dsn = entries.iter().find(|(key, _)| key == "dsn").unwrap();
    assert_eq!(dsn.1.as_str(), Some("pg://db.internal/app"));

    let banner = entries.iter().find(|(key, _)| key == "banner").unwrap();
    assert_eq!(banner.1.as_str(), Some("level=debug pool=8"));

    let services = entries.iter().find(|(key, _)| key == "services").unwrap();
    let services = services.1.as_list().unwrap();
    assert!(services.iter().all(|entry| entry.as_service().is_some()));
}

#[test]
fn test_injected_test_double_propagates_through_the_graph() {
    let container = app_container();

    // Swap the connection for a double before anything is built.
    container.set_instance(
        "db",
        Arc::new(Connection {
            dsn: "sqlite::memory:".to_string(),
            pool_max: 1,
        }),
    );

    let repository = container.get_as::<Repository>("repo").unwrap();
    assert_eq!(repository.connection.dsn, "sqlite::memory:");
}
