//! 接入链路装配
//!
//! 将接入源（MQTT 或空源）收到的消息交给分发器处理。
//! 分发错误在这里记录后吞掉，不回传给接入源，避免毒消息反复投递。

use domain::Message;
use std::sync::Arc;
use tracing::{info, warn};
use udmi_config::AppConfig;
use udmi_ingest::{IngestError, MessageHandler, MqttSource, MqttSourceConfig, NoopSource, Source};
use udmi_pipeline::{Dispatcher, HandlerError};

/// 分发处理器。
pub struct DispatchHandler {
    dispatcher: Dispatcher,
}

impl DispatchHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait::async_trait]
impl MessageHandler for DispatchHandler {
    async fn handle(&self, message: Message) -> Result<(), IngestError> {
        match self.dispatcher.handle(&message).await {
            Ok(outcome) => {
                tracing::debug!(target: "udmi.ingest", outcome = ?outcome, "message_handled");
            }
            // 已在分发器内以 message_invalid 记录
            Err(HandlerError::Invalid(_)) => {}
            Err(err) => {
                warn!(
                    target: "udmi.ingest",
                    device_id = %message.attributes.device_id,
                    registry_id = %message.attributes.device_registry_id,
                    sub_folder = ?message.attributes.sub_folder,
                    error = %err,
                    "dispatch_failed"
                );
            }
        }
        Ok(())
    }
}

/// 启动接入任务。
pub fn spawn_ingest(config: &AppConfig, dispatcher: Dispatcher) -> tokio::task::JoinHandle<()> {
    let handler: Arc<dyn MessageHandler> = Arc::new(DispatchHandler::new(dispatcher));

    let source: Arc<dyn Source> = if config.ingest_enabled {
        let mqtt_config = MqttSourceConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic: config.mqtt_topic.clone(),
        };
        info!(
            target: "udmi.ingest",
            host = %mqtt_config.host,
            port = mqtt_config.port,
            topic = %mqtt_config.topic,
            "ingest_source_mqtt"
        );
        Arc::new(MqttSource::new(mqtt_config))
    } else {
        info!(target: "udmi.ingest", "ingest_source_noop");
        Arc::new(NoopSource)
    };

    tokio::spawn(async move {
        if let Err(err) = source.run(handler).await {
            warn!(target: "udmi.ingest", error = %err, "ingest_stopped");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::Stores;
    use domain::MessageAttributes;
    use serde_json::json;

    fn dispatcher(stores: &Stores) -> Dispatcher {
        Dispatcher::new(stores.devices.clone(), stores.sites.clone(), stores.history.clone())
    }

    #[tokio::test]
    async fn handler_swallows_invalid_messages() {
        let stores = Stores::in_memory();
        let handler = DispatchHandler::new(dispatcher(&stores));
        let message = Message::new(
            MessageAttributes {
                sub_folder: Some("system".to_string()),
                ..MessageAttributes::default()
            },
            json!({}),
        );
        handler.handle(message).await.expect("swallowed");
    }

    #[tokio::test]
    async fn handler_writes_device() {
        let stores = Stores::in_memory();
        let handler = DispatchHandler::new(dispatcher(&stores));
        let message = Message::new(
            MessageAttributes {
                device_id: "AHU-1".to_string(),
                device_registry_id: "reg-1".to_string(),
                sub_folder: Some("system".to_string()),
                sub_type: Some("model".to_string()),
                ..MessageAttributes::default()
            },
            json!({ "hardware": { "make": "Acme" } }),
        );
        handler.handle(message).await.expect("handled");
        let key = domain::DeviceKey::new("AHU-1", "reg-1").expect("key");
        let stored = stores
            .devices
            .get_device(&key)
            .await
            .expect("get")
            .expect("device");
        assert_eq!(stored.record.make.as_deref(), Some("Acme"));
    }
}
