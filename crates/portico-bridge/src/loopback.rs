//! In-process wiring of a host bridge and a content client.
//!
//! Stands in for the embedded browser surface: two unbounded channels, one
//! task answering on the host side and one feeding responses to the client.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::BridgeClient;
use crate::config::BridgeConfig;
use crate::facade::{Capabilities, FacadeSlot};
use crate::host::HostBridge;
use crate::session::SessionBootstrap;

/// A connected host/content pair.
pub struct Loopback {
    /// Facade installed for the content.
    pub capabilities: Arc<Capabilities>,
    /// Content-side client behind the facade.
    pub client: BridgeClient,
    /// Writes into the content's inbound channel, as page scripts can.
    pub page: mpsc::UnboundedSender<String>,
    host_task: JoinHandle<()>,
    content_task: JoinHandle<()>,
}

impl Loopback {
    /// Connects `host` to a new client and installs its facade in `slot`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(
        host: HostBridge,
        bootstrap: &SessionBootstrap,
        config: &BridgeConfig,
        slot: &FacadeSlot,
    ) -> Self {
        let (to_host, host_inbound) = mpsc::unbounded_channel();
        let (to_content, content_inbound) = mpsc::unbounded_channel();

        let client = BridgeClient::new(bootstrap, config, to_host);
        let capabilities = slot.install(|| {
            Capabilities::new(client.clone(), bootstrap.environment.clone())
        });

        let host_task = tokio::spawn(host.run(host_inbound, to_content.clone()));
        let content_task = tokio::spawn(client.clone().run_inbound(content_inbound));

        Self {
            capabilities,
            client,
            page: to_content,
            host_task,
            content_task,
        }
    }

    /// Stops both tasks.
    pub fn shutdown(self) {
        self.host_task.abort();
        self.content_task.abort();
    }
}
