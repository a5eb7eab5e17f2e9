//! End-to-end resolution through scopes, stacks and resolvers.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gate_container::prelude::*;
use gate_container::reference::resolver_service_name;
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct DbClient {
    host: String,
}

fn db_client(args: Arguments) -> Result<Instance, ContainerError> {
    Ok(Instance::new(DbClient {
        host: args.str("host")?.to_owned(),
    }))
}

#[derive(Debug)]
struct Logger;

fn logger(_: Arguments) -> Result<Instance, ContainerError> {
    Ok(Instance::new(Logger))
}

/// Resolves every reference to the next value of a shared counter.
struct Sequence {
    next: Arc<AtomicU64>,
    persist: bool,
}

impl ReferenceResolver for Sequence {
    fn resolve(
        &self,
        _reference: &str,
        _scope: &ContextContainer,
    ) -> Result<ParameterResponse, ContainerError> {
        let value = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ParameterResponse {
            value: Value::from(value),
            persist: self.persist,
        })
    }
}

/// Echoes the reference it was given.
struct Echo;

impl ReferenceResolver for Echo {
    fn resolve(
        &self,
        reference: &str,
        _scope: &ContextContainer,
    ) -> Result<ParameterResponse, ContainerError> {
        Ok(ParameterResponse::new(format!("echo({reference})")))
    }
}

fn scope_over(container: Container) -> Arc<ContextContainer> {
    ContextContainer::new(Arc::new(container))
}

fn params(pairs: &[(&str, ParamValue)]) -> Vec<(String, ParamValue)> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Caching
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn services_are_identical_within_a_scope() {
    let scope = scope_over(Container::new([], [(
        "logger".to_owned(),
        ServiceDeclaration::factory(logger),
    )]));

    let first = scope.get_service("logger").unwrap();
    let second = scope.get_service("logger").unwrap();
    assert!(first.ptr_eq(&second));
    assert!(scope.is_instantiated("logger"));
}

#[test]
fn persisted_parameters_are_resolved_once() {
    let next = Arc::new(AtomicU64::new(0));
    let scope = scope_over(Container::new(
        params(&[("token", json!("seq::token"))]),
        [],
    ));
    scope.insert_service(
        resolver_service_name("seq"),
        Instance::resolver(Sequence {
            next: Arc::clone(&next),
            persist: true,
        }),
    );

    assert_eq!(scope.get_parameter("token").unwrap(), Value::from(1_u64));
    assert_eq!(scope.get_parameter("token").unwrap(), Value::from(1_u64));
    assert_eq!(next.load(Ordering::SeqCst), 1);
}

#[test]
fn unpersisted_parameters_are_resolved_every_time() {
    let next = Arc::new(AtomicU64::new(0));
    let scope = scope_over(Container::new(
        params(&[("token", json!("seq::token"))]),
        [],
    ));
    scope.insert_service(
        resolver_service_name("seq"),
        Instance::resolver(Sequence {
            next: Arc::clone(&next),
            persist: false,
        }),
    );

    assert_eq!(scope.get_parameter("token").unwrap(), Value::from(1_u64));
    assert_eq!(scope.get_parameter("token").unwrap(), Value::from(2_u64));
}

#[test]
fn persistence_only_applies_to_the_whole_value() {
    let next = Arc::new(AtomicU64::new(0));
    let scope = scope_over(Container::new(
        params(&[("tokens", json!(["seq::a", "seq::b"]))]),
        [],
    ));
    scope.insert_service(
        resolver_service_name("seq"),
        Instance::resolver(Sequence {
            next: Arc::clone(&next),
            persist: true,
        }),
    );

    assert_eq!(
        scope.get_parameter("tokens").unwrap(),
        Value::from(vec![1_u64, 2])
    );
    assert_eq!(
        scope.get_parameter("tokens").unwrap(),
        Value::from(vec![3_u64, 4])
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Stacks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn earlier_stores_take_precedence() {
    let stack = ContainerStack::new()
        .with(Arc::new(Container::new(params(&[("x", json!("local"))]), [])))
        .with(Arc::new(Container::new(
            params(&[("x", json!("base")), ("y", json!("base"))]),
            [],
        )));
    let scope = ContextContainer::new(Arc::new(stack));

    assert_eq!(scope.get_parameter("x").unwrap(), Value::from("local"));
    assert_eq!(scope.get_parameter("y").unwrap(), Value::from("base"));
}

#[test]
fn references_see_the_whole_stack() {
    let stack = ContainerStack::new()
        .with(Arc::new(Container::new(
            params(&[("url", json!({"host": "parameter::host", "port": 5432}))]),
            [],
        )))
        .with(Arc::new(Container::new(params(&[("host", json!("db.internal"))]), [])));
    let scope = ContextContainer::new(Arc::new(stack));

    let url = scope.get_parameter("url").unwrap();
    assert_eq!(url.get("host"), Some(&Value::from("db.internal")));
    assert_eq!(url.get("port").and_then(Value::as_i64), Some(5432));
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parameter_references_resolve_to_the_parameter() {
    let scope = scope_over(Container::new(
        params(&[("a", json!(5)), ("b", json!("parameter::a"))]),
        [],
    ));

    assert_eq!(scope.get_parameter("parameter::a").unwrap(), Value::from(5));
    assert_eq!(scope.get_parameter("b").unwrap(), Value::from(5));
}

#[test]
fn declared_names_may_contain_separators() {
    let scope = scope_over(Container::new(
        params(&[("app::port", json!(8080)), ("port", json!("parameter::app::port"))]),
        [],
    ));

    assert_eq!(scope.get_parameter("app::port").unwrap(), Value::from(8080));
    assert_eq!(scope.get_parameter("port").unwrap(), Value::from(8080));
    assert_eq!(scope.get_parameter("parameter::app::port").unwrap(), Value::from(8080));
}

#[test]
fn service_references_resolve_to_the_cached_instance() {
    let scope = scope_over(Container::new(
        params(&[("log", json!("service::logger"))]),
        [("logger".to_owned(), ServiceDeclaration::factory(logger))],
    ));

    let via_reference = scope.get_parameter("log").unwrap();
    let direct = scope.get_service("logger").unwrap();
    assert_eq!(via_reference, Value::Instance(direct));
}

#[test]
fn nested_values_are_resolved_in_place() {
    let scope = scope_over(Container::new(
        params(&[
            ("host", json!("localhost")),
            ("port", json!(5432)),
            (
                "database",
                json!({"host": "parameter::host", "ports": ["parameter::port", 5433], "tls": false}),
            ),
        ]),
        [],
    ));

    let database = scope.get_parameter("database").unwrap();
    let mapping = database.as_mapping().unwrap();
    assert_eq!(mapping.keys().collect::<Vec<_>>(), ["host", "ports", "tls"]);
    assert_eq!(mapping["host"], Value::from("localhost"));
    assert_eq!(mapping["ports"], Value::from(vec![5432_i64, 5433]));
    assert_eq!(mapping["tls"], Value::Bool(false));
}

#[test]
fn plain_strings_are_not_references() {
    let scope = scope_over(Container::new(
        params(&[("greeting", json!("hello: world")), ("path", json!("C:\\tmp"))]),
        [],
    ));

    assert_eq!(scope.get_parameter("greeting").unwrap(), Value::from("hello: world"));
    assert_eq!(scope.get_parameter("path").unwrap(), Value::from("C:\\tmp"));
}

#[test]
fn unknown_prefix_without_a_resolver_is_undefined() {
    let scope = scope_over(Container::new(params(&[("x", json!("custom::x"))]), []));

    assert!(matches!(
        scope.get_parameter("custom::x"),
        Err(ContainerError::ParameterNotDefined(name)) if name == "custom::x"
    ));
    assert!(matches!(
        scope.get_parameter("x"),
        Err(ContainerError::ParameterNotDefined(name)) if name == "custom::x"
    ));
}

#[test]
fn unknown_prefix_delegates_to_its_resolver_service() {
    let scope = scope_over(Container::new(
        params(&[("x", json!("custom::x"))]),
        [(
            "container.custom_resolver".to_owned(),
            ServiceDeclaration::factory(|_: Arguments| Ok(Instance::resolver(Echo))),
        )],
    ));

    assert_eq!(
        scope.get_parameter("custom::x").unwrap(),
        Value::from("echo(custom::x)")
    );
    assert_eq!(scope.get_parameter("x").unwrap(), Value::from("echo(custom::x)"));
}

#[test]
fn resolver_service_must_be_a_resolver() {
    let scope = scope_over(Container::new(
        [],
        [(
            "container.custom_resolver".to_owned(),
            ServiceDeclaration::factory(logger),
        )],
    ));

    assert!(matches!(
        scope.get_parameter("custom::x"),
        Err(ContainerError::ServiceConfiguration(name)) if name == "container.custom_resolver"
    ));
}

#[test]
fn resolvers_can_use_the_scope() {
    struct Env;

    impl ReferenceResolver for Env {
        fn resolve(
            &self,
            reference: &str,
            scope: &ContextContainer,
        ) -> Result<ParameterResponse, ContainerError> {
            let key = reference.trim_start_matches("env::");
            let prefix = scope.get_parameter("env_prefix")?;
            let prefix = prefix.as_str().unwrap_or_default();
            Ok(ParameterResponse::persistent(format!("{prefix}{key}")))
        }
    }

    let scope = scope_over(Container::new(
        params(&[("env_prefix", json!("APP_")), ("home", json!("env::HOME"))]),
        [],
    ));
    scope.insert_service(resolver_service_name("env"), Instance::resolver(Env));

    assert_eq!(scope.get_parameter("home").unwrap(), Value::from("APP_HOME"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookup failures and self reference
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn scope_is_its_own_container_service() {
    let scope = scope_over(Container::empty());

    let this = scope.get_service("container").unwrap();
    let recovered = this.downcast::<ContextContainer>().unwrap();
    assert!(Arc::ptr_eq(&recovered, &scope));

    let via_reference = scope.get_parameter("service::container").unwrap();
    assert_eq!(via_reference, Value::Instance(this));
}

#[test]
fn missing_names_fail_with_the_name() {
    let scope = scope_over(Container::empty());

    let err = scope.get_service("nope").unwrap_err();
    assert!(matches!(&err, ContainerError::ServiceNotFound(name) if name == "nope"));
    assert_eq!(err.to_string(), "the service \"nope\" not found");

    let err = scope.get_parameter("nope").unwrap_err();
    assert!(matches!(&err, ContainerError::ParameterNotDefined(name) if name == "nope"));
    assert!(err.is_not_found());
}

#[test]
fn missing_dependencies_surface_through_the_dependent() {
    let scope = scope_over(Container::new(
        [],
        [(
            "db".to_owned(),
            ServiceDeclaration::factory(db_client).with_parameter("host", "service::nope"),
        )],
    ));

    assert!(matches!(
        scope.get_service("db"),
        Err(ContainerError::ServiceNotFound(name)) if name == "nope"
    ));
}

#[test]
fn long_acyclic_chains_resolve_under_the_default_depth() {
    let services = (0..100).map(|i| {
        let declaration = ServiceDeclaration::factory(|_: Arguments| Ok(Instance::new(())));
        let declaration = if i < 99 {
            declaration.with_parameter("next", format!("service::s{}", i + 1))
        } else {
            declaration
        };
        (format!("s{i}"), declaration)
    });
    let scope = scope_over(Container::new([], services.collect::<Vec<_>>()));

    scope.get_service("s0").unwrap();
    assert!(scope.is_instantiated("s99"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Instantiation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn db_client_is_built_from_its_parameters() {
    let scope = scope_over(Container::new(
        params(&[("db_host", json!("localhost"))]),
        [(
            "db".to_owned(),
            ServiceDeclaration::factory(db_client).with_parameter("host", "parameter::db_host"),
        )],
    ));

    let db = scope.get_service("db").unwrap();
    assert_eq!(db.downcast_ref::<DbClient>().unwrap().host, "localhost");
    assert!(db.ptr_eq(&scope.get_service("db").unwrap()));
}

#[test]
fn declarations_deserialize_from_records() {
    let declaration: ServiceDeclaration = serde_json::from_value(json!({
        "class": "app.db:DbClient",
        "parameters": {"host": "parameter::db_host"}
    }))
    .unwrap();
    let symbols = SymbolTable::new().with("app.db:DbClient", db_client);

    let scope = ContextContainer::with_symbols(
        Arc::new(Container::new(
            params(&[("db_host", json!("db.internal"))]),
            [("db".to_owned(), declaration)],
        )),
        Arc::new(symbols),
    );

    let db = scope.get_service("db").unwrap();
    assert_eq!(db.downcast_ref::<DbClient>().unwrap().host, "db.internal");
}

#[test]
fn factory_services_build_other_services() {
    let scope = scope_over(Container::new(
        params(&[("db_host", json!("replica"))]),
        [
            (
                "db_factory".to_owned(),
                ServiceDeclaration::factory(|_: Arguments| Ok(Instance::factory(db_client))),
            ),
            (
                "db".to_owned(),
                ServiceDeclaration::factory_service("db_factory")
                    .with_parameter("host", "parameter::db_host"),
            ),
        ],
    ));

    let db = scope.get_service("db").unwrap();
    assert_eq!(db.downcast_ref::<DbClient>().unwrap().host, "replica");
    assert!(scope.is_instantiated("db_factory"));
}

#[test]
fn factory_service_must_be_a_factory() {
    let scope = scope_over(Container::new(
        [],
        [
            ("logger".to_owned(), ServiceDeclaration::factory(logger)),
            ("db".to_owned(), ServiceDeclaration::factory_service("logger")),
        ],
    ));

    assert!(matches!(
        scope.get_service("db"),
        Err(ContainerError::ServiceConfiguration(name)) if name == "db"
    ));
}

#[test]
fn class_paths_are_checked() {
    let scope = ContextContainer::with_symbols(
        Arc::new(Container::new(
            [],
            [
                ("malformed".to_owned(), ServiceDeclaration::class("DbClient")),
                ("unknown".to_owned(), ServiceDeclaration::class("app.db:Missing")),
                ("none".to_owned(), ServiceDeclaration::default()),
            ],
        )),
        Arc::new(SymbolTable::new().with("app.db:DbClient", db_client)),
    );

    assert!(matches!(
        scope.get_service("malformed"),
        Err(ContainerError::ServiceConfiguration(name)) if name == "malformed"
    ));
    assert!(matches!(
        scope.get_service("unknown"),
        Err(ContainerError::SymbolNotFound(path)) if path == "app.db:Missing"
    ));
    assert!(matches!(
        scope.get_service("none"),
        Err(ContainerError::ServiceConfiguration(name)) if name == "none"
    ));
}

#[test]
fn constructor_values_are_passed_literally_unless_references() {
    let scope = scope_over(Container::new(
        params(&[("host", json!("localhost"))]),
        [(
            "probe".to_owned(),
            ServiceDeclaration::factory(|args: Arguments| Ok(Instance::new(args.into_inner())))
                .with_parameter("host", "parameter::host")
                .with_parameter("retries", 3)
                .with_parameter("options", json!({"host": "parameter::host"})),
        )],
    ));

    let probe = scope.get_service("probe").unwrap();
    let args = probe.downcast_ref::<indexmap::IndexMap<String, Value>>().unwrap();
    assert_eq!(args["host"], Value::from("localhost"));
    assert_eq!(args["retries"], Value::from(3));
    assert_eq!(args["options"].get("host"), Some(&Value::from("parameter::host")));
}

#[test]
fn factory_failures_carry_the_service_name() {
    let scope = scope_over(Container::new(
        [],
        [(
            "flaky".to_owned(),
            ServiceDeclaration::factory(|args: Arguments| Err(args.error("connection refused"))),
        )],
    ));

    let err = scope.get_service("flaky").unwrap_err();
    assert!(matches!(&err, ContainerError::Factory { service, .. } if service == "flaky"));
    assert!(!scope.is_instantiated("flaky"));
}
