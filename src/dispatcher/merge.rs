use crate::controller::Reply;
use crate::ids::RequestId;
use crate::server::response::ResponseEntity;
use serde_json::Value;
use tracing::warn;

/// Fold one handler's reply into the response accumulated so far.
///
/// - `Status`: status-only entity, replaces the accumulator
/// - `Error`: the error's own status and representation, replaces the accumulator
/// - `Entity`: replaces the accumulator verbatim (warns if one existed)
/// - `Array`: appended to an existing array body
/// - `Object`: keys shallow-merged onto an existing object body, new keys win
/// - `Scalar`: replaces the body only (warns)
/// - `Empty`: 200 without body when first, otherwise drops the body (warns)
///
/// Fragments merged onto an existing accumulator keep its status and headers.
#[must_use]
pub fn merge_reply(
    accumulated: Option<ResponseEntity>,
    reply: Reply,
    request_id: RequestId,
    handler: &str,
) -> ResponseEntity {
    let Some(mut acc) = accumulated else {
        return match reply {
            Reply::Status(status) => ResponseEntity::new(status.as_u16()),
            Reply::Error(err) => err.to_entity(),
            Reply::Entity(entity) => entity,
            Reply::Array(items) => ResponseEntity::ok(Value::Array(items)),
            Reply::Object(map) => ResponseEntity::ok(Value::Object(map)),
            Reply::Scalar(value) => ResponseEntity::ok(value),
            Reply::Empty => ResponseEntity::new(200),
        };
    };

    match reply {
        Reply::Status(status) => ResponseEntity::new(status.as_u16()),
        Reply::Error(err) => err.to_entity(),
        Reply::Entity(entity) => {
            // M1: Accumulated response discarded
            warn!(
                request_id = %request_id,
                handler = %handler,
                discarded_status = acc.status(),
                discarded_body = acc.has_body(),
                "Handler returned a full response; previous response discarded"
            );
            entity
        }
        Reply::Array(items) => {
            let body = match acc.take_body() {
                Some(Value::Array(mut existing)) => {
                    existing.extend(items);
                    existing
                }
                Some(other) => {
                    let mut combined = Vec::with_capacity(items.len() + 1);
                    combined.push(other);
                    combined.extend(items);
                    combined
                }
                None => items,
            };
            acc.set_body(Some(Value::Array(body)));
            acc
        }
        Reply::Object(map) => {
            match acc.take_body() {
                Some(Value::Object(mut existing)) => {
                    existing.extend(map);
                    acc.set_body(Some(Value::Object(existing)));
                }
                Some(_) => {
                    // M2: Non-object body replaced
                    warn!(
                        request_id = %request_id,
                        handler = %handler,
                        "Object reply replaces a non-object response body"
                    );
                    acc.set_body(Some(Value::Object(map)));
                }
                None => acc.set_body(Some(Value::Object(map))),
            }
            acc
        }
        Reply::Scalar(value) => {
            // M3: Body replaced by scalar
            warn!(
                request_id = %request_id,
                handler = %handler,
                had_body = acc.has_body(),
                "Scalar reply replaces the response body"
            );
            acc.set_body(Some(value));
            acc
        }
        Reply::Empty => {
            if acc.take_body().is_some() {
                // M4: Body cleared
                warn!(
                    request_id = %request_id,
                    handler = %handler,
                    "Empty reply clears the response body"
                );
            }
            acc
        }
    }
}
