#![allow(dead_code)]

pub mod fixtures {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqrouter::controller::{handler_fn, HandlerFn, Reply};
    use reqrouter::server::{BodyParser, Headers};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Handler that always returns a clone of `reply`
    pub fn returning(reply: Reply) -> HandlerFn {
        handler_fn(move |_| {
            let reply = reply.clone();
            async move { Ok(reply) }
        })
    }

    /// Handler that returns the JSON view of all bound arguments
    pub fn args_echo() -> HandlerFn {
        handler_fn(|args| async move {
            Ok(Reply::from(Value::Array(
                args.iter().map(|a| a.to_json()).collect(),
            )))
        })
    }

    /// Handler that appends `name` to a shared call log before replying
    pub fn logging(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, reply: Reply) -> HandlerFn {
        let log = Arc::clone(log);
        handler_fn(move |_| {
            log.lock().push(name);
            let reply = reply.clone();
            async move { Ok(reply) }
        })
    }

    /// Body parser that counts its invocations
    pub struct CountingParser {
        pub value: Option<Value>,
        pub calls: AtomicUsize,
    }

    impl CountingParser {
        pub fn new(value: Option<Value>) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BodyParser for CountingParser {
        async fn parse(&self, _headers: &Headers) -> anyhow::Result<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.clone())
        }
    }
}
