use crate::controller::{handler_fn, Arg, HandlerFn, Reply};
use serde_json::{json, Value};

/// Handler that echoes its bound arguments back.
///
/// Used for routes declared without code (manifests) and in tests. The
/// reply is an object fragment, so several echo handlers matched on one
/// path merge their fields; the last one's `handler` and `args` win.
#[must_use]
pub fn echo_handler(controller: &str, handler: &str) -> HandlerFn {
    let controller = controller.to_string();
    let handler = handler.to_string();
    handler_fn(move |args| {
        let body = json!({
            "controller": controller,
            "handler": handler,
            "args": args.iter().map(Arg::to_json).collect::<Vec<Value>>(),
        });
        async move { Ok(Reply::from(body)) }
    })
}
