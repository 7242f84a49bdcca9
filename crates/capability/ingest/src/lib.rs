//! UDMI 消息接入：信封解码、消息处理器与接入源。

pub mod envelope;

pub use envelope::decode_envelope;

use async_trait::async_trait;
use domain::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid envelope: {0}")]
    Envelope(String),
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// 入站消息处理器。
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message) -> Result<(), IngestError>;
}

/// 接入源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn MessageHandler>) -> Result<(), IngestError>;
}

/// 空接入源（接入关闭时使用）。
#[derive(Debug, Default)]
pub struct NoopSource;

#[async_trait]
impl Source for NoopSource {
    async fn run(&self, _handler: Arc<dyn MessageHandler>) -> Result<(), IngestError> {
        Ok(())
    }
}

/// MQTT 接入源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 订阅主题，可含通配符。
    pub topic: String,
}

/// MQTT 接入源：每条 publish 的负载是一个 pub/sub 信封。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(&self, handler: Arc<dyn MessageHandler>) -> Result<(), IngestError> {
        let client_id = format!("udmi-event-handler-{}", uuid::Uuid::new_v4());
        let mut options =
            rumqttc::MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = rumqttc::AsyncClient::new(options, 10);
        client
            .subscribe(self.config.topic.clone(), rumqttc::QoS::AtLeastOnce)
            .await
            .map_err(|err| IngestError::Source(err.to_string()))?;
        info!(target: "udmi.ingest", topic = %self.config.topic, "mqtt_subscribed");

        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    let message = match decode_envelope(&publish.payload) {
                        Ok(message) => message,
                        Err(err) => {
                            warn!(
                                target: "udmi.ingest",
                                topic = %publish.topic,
                                error = %err,
                                "envelope_invalid"
                            );
                            continue;
                        }
                    };
                    debug!(
                        target: "udmi.ingest",
                        topic = %publish.topic,
                        payload_size = publish.payload.len(),
                        "envelope_decoded"
                    );
                    if let Err(err) = handler.handle(message).await {
                        warn!(target: "udmi.ingest", error = %err, "message_handler_failed");
                    }
                }
                Ok(_) => {}
                Err(err) => return Err(IngestError::Source(err.to_string())),
            }
        }
    }
}
