use super::{common_methods, compile, join_route_paths};
use crate::controller::{
    handler_fn, ControllerDescriptor, HandlerDescriptor, HandlerFn, ParameterSpec, Reply,
    RequestMapping,
};
use crate::router::RouteIndex;
use http::Method;
use std::sync::Arc;

fn noop() -> HandlerFn {
    handler_fn(|_| async { Ok(Reply::Empty) })
}

fn users_controller() -> Arc<ControllerDescriptor> {
    Arc::new(
        ControllerDescriptor::builder("users")
            .root(RequestMapping::any("/users"))
            .handler(
                "list",
                HandlerDescriptor::new(noop()).mapping(RequestMapping::get("/")),
            )
            .handler(
                "get",
                HandlerDescriptor::new(noop())
                    .mapping(RequestMapping::get("/{id}"))
                    .param(ParameterSpec::path_variable("id")),
            )
            .handler(
                "create",
                HandlerDescriptor::new(noop())
                    .mapping(RequestMapping::post("/"))
                    .body_required(),
            )
            .build()
            .unwrap(),
    )
}

#[test]
fn test_join_route_paths() {
    assert_eq!(join_route_paths("/a", "/b"), "/a/b");
    assert_eq!(join_route_paths("/a/", "/b"), "/a/b");
    assert_eq!(join_route_paths("/a//", "//b/"), "/a/b");
    assert_eq!(join_route_paths("/a", "/"), "/a");
    assert_eq!(join_route_paths("", ""), "/");
    assert_eq!(join_route_paths("", "/b"), "/b");
    assert_eq!(join_route_paths(" /a ", " b "), "/a/b");
}

#[test]
fn test_common_methods_empty_means_any() {
    assert_eq!(common_methods(&[], &[Method::GET]), Some(vec![Method::GET]));
    assert_eq!(common_methods(&[Method::POST], &[]), Some(vec![Method::POST]));
    assert_eq!(common_methods(&[], &[]), Some(vec![]));
}

#[test]
fn test_common_methods_intersection() {
    assert_eq!(
        common_methods(&[Method::GET, Method::POST], &[Method::POST, Method::PUT]),
        Some(vec![Method::POST])
    );
    assert_eq!(common_methods(&[Method::GET], &[Method::DELETE]), None);
}

#[test]
fn test_compile_joins_root_and_handler_paths() {
    let compiled = compile(&[users_controller()]);
    let paths: Vec<&str> = compiled.table.iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/users", "/users/{id}"]);
    assert_eq!(compiled.table.len(), 3);

    let on_root = compiled.table.get("/users").unwrap();
    let names: Vec<&str> = on_root.iter().map(|e| e.handler_name.as_ref()).collect();
    assert_eq!(names, vec!["list", "create"]);
    assert!(on_root[1].body_required);
}

#[test]
fn test_compile_skips_disjoint_method_sets() {
    let controller = Arc::new(
        ControllerDescriptor::builder("admin")
            .root(RequestMapping::get("/admin"))
            .handler(
                "read",
                HandlerDescriptor::new(noop()).mapping(RequestMapping::get("/settings")),
            )
            .handler(
                "write",
                HandlerDescriptor::new(noop()).mapping(RequestMapping::put("/settings")),
            )
            .build()
            .unwrap(),
    );
    let compiled = compile(&[controller]);
    let entries = compiled.table.get("/admin/settings").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].handler_name.as_ref(), "read");
}

#[test]
fn test_compile_global_routes_without_root() {
    let controller = Arc::new(
        ControllerDescriptor::builder("health")
            .handler(
                "ping",
                HandlerDescriptor::new(noop())
                    .mapping(RequestMapping::get("ping").path("/healthz")),
            )
            .build()
            .unwrap(),
    );
    let compiled = compile(&[controller]);
    assert!(compiled.table.get("/ping").is_some());
    assert!(compiled.table.get("/healthz").is_some());
}

#[test]
fn test_compile_every_root_mapping() {
    let controller = Arc::new(
        ControllerDescriptor::builder("multi")
            .root(RequestMapping::any("/v1").path("/v2"))
            .handler(
                "items",
                HandlerDescriptor::new(noop()).mapping(RequestMapping::get("/items")),
            )
            .build()
            .unwrap(),
    );
    let compiled = compile(&[controller]);
    assert!(compiled.table.get("/v1/items").is_some());
    assert!(compiled.table.get("/v2/items").is_some());
}

#[test]
fn test_first_attribute_producer_wins() {
    let controller = Arc::new(
        ControllerDescriptor::builder("session")
            .root(RequestMapping::any("/me"))
            .handler(
                "load_user",
                HandlerDescriptor::new(noop()).produces("user"),
            )
            .handler(
                "load_user_again",
                HandlerDescriptor::new(noop()).produces("user"),
            )
            .handler(
                "load_prefs",
                HandlerDescriptor::new(noop()).produces("prefs"),
            )
            .build()
            .unwrap(),
    );
    let compiled = compile(&[controller]);
    let producers = compiled.producers_for(0);
    assert_eq!(producers.len(), 2);
    assert_eq!(producers[0].attribute, "user");
    assert_eq!(producers[0].handler_name.as_ref(), "load_user");
    assert_eq!(producers[1].attribute, "prefs");
    assert!(compiled.producers_for(7).is_empty());
}

#[test]
fn test_compiled_index_matches_table() {
    let compiled = compile(&[users_controller()]);
    let lookup = compiled.index.get_route("/users/42").unwrap();
    assert_eq!(lookup.entries.len(), 1);
    assert_eq!(lookup.path_variables.get("id"), Some("42"));
    assert!(!compiled.index.has_route("/orders"));
}

#[test]
fn test_compile_nothing_is_empty() {
    let compiled = compile(&[]);
    assert!(compiled.table.is_empty());
    assert!(compiled.index.is_empty());
}
