use crate::config::DeliveryConfig;
use crate::dispatch::{dispatch, Dispatched, Transport};
use crate::environment::Environment;
use crate::message::Message;
use crate::{payload, template, Error};

/// Render, build and dispatch one message.
///
/// `config` must already be verified. Ignored overrides are logged as
/// warnings and never abort the run.
pub fn send(
    message: &Message,
    env: &Environment,
    config: &DeliveryConfig,
    transport: &dyn Transport,
) -> Result<Dispatched, Error> {
    let rendered = template::render(message.text(), env)?;
    let payload = payload::build(&rendered, &config.overrides)?;
    for ignored in payload.ignored_overrides() {
        tracing::warn!(field = ignored.field.key(), "{ignored}");
    }
    tracing::debug!(payload = payload.as_json(), "payload built");
    Ok(dispatch(config, &payload, transport)?)
}
