//! Node-side assembly of the rate table and its administrative path.

use std::sync::Arc;

use anyfee_rates::{
    ChannelRecompute, LoadSource, RateEngine, RateTable, RatesUpdated, SharedRateTable,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::config::NodeConfig;
use crate::handlers::RatesHandler;

/// The exchange-rate parts of a running node.
pub struct FeeRateNode {
    table: SharedRateTable,
    engine: Arc<RateEngine>,
    recompute_rx: Option<UnboundedReceiver<RatesUpdated>>,
}

impl FeeRateNode {
    /// Build the table, registry and engine described by `config`.
    pub fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        config.validate().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

        let native = config.native_asset()?;
        let registry = Arc::new(config.asset_directory()?);
        let table = Arc::new(RateTable::new(native));
        let (recompute, recompute_rx) = ChannelRecompute::new();

        let engine = Arc::new(RateEngine::new(
            Arc::clone(&table),
            registry,
            Arc::new(recompute),
            config.engine_config(),
        ));

        Ok(Self {
            table,
            engine,
            recompute_rx: Some(recompute_rx),
        })
    }

    /// Load rates from disk. A failed load keeps the seeded table.
    pub fn start(&self) -> Option<LoadSource> {
        match self.engine.load() {
            Ok(source) => {
                info!(?source, "Exchange rates ready");
                Some(source)
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Failed to load exchange rates");
                None
            }
        }
    }

    /// Table for the fee-valuation path.
    pub fn table(&self) -> &SharedRateTable {
        &self.table
    }

    pub fn engine(&self) -> &Arc<RateEngine> {
        &self.engine
    }

    /// Operator request handlers.
    pub fn handler(&self) -> RatesHandler {
        RatesHandler::new(Arc::clone(&self.engine))
    }

    /// Receiver the mempool drains to learn that fees must be re-valued.
    /// Can be taken once.
    pub fn take_recompute_receiver(&mut self) -> Option<UnboundedReceiver<RatesUpdated>> {
        self.recompute_rx.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyfee_common::AssetId;
    use anyfee_rates::Valuation;
    use serde_json::json;
    use std::fs;

    fn config(dir: &std::path::Path) -> NodeConfig {
        NodeConfig {
            data_dir: dir.to_path_buf(),
            native_asset_label: "gasset".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_node_update_signals_recompute() {
        let dir = tempfile::tempdir().unwrap();
        let mut node = FeeRateNode::new(&config(dir.path())).unwrap();
        let mut rx = node.take_recompute_receiver().unwrap();
        assert!(node.take_recompute_receiver().is_none());

        assert_eq!(node.start(), Some(LoadSource::Default));

        let issued = "5c".repeat(32);
        node.handler()
            .set_fee_exchange_rates(&json!({ "gasset": 100000000, issued.clone(): 200000000 }))
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entries, 2);
        assert_eq!(node.engine().get_rates().len(), 2);
        assert!(event.persisted);

        let asset = AssetId::from_hex(&issued).unwrap();
        assert_eq!(
            node.table().amount_to_value(10, &asset).unwrap().map(|v| v.get()),
            Valuation::Exact(20)
        );
    }

    #[test]
    fn test_node_restart_reloads_rates() {
        let dir = tempfile::tempdir().unwrap();
        let issued = "5c".repeat(32);
        {
            let node = FeeRateNode::new(&config(dir.path())).unwrap();
            node.handler()
                .set_fee_exchange_rates(&json!({ issued.clone(): 50000000 }))
                .unwrap();
        }

        let node = FeeRateNode::new(&config(dir.path())).unwrap();
        assert_eq!(node.start(), Some(LoadSource::Persisted { entries: 1 }));
        assert_eq!(
            node.handler().get_fee_exchange_rates(),
            json!({ issued: 50000000 })
        );
    }

    #[test]
    fn test_node_survives_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("exchangerates.json"), "{\"gasset\": \"x\"}").unwrap();

        let node = FeeRateNode::new(&config(dir.path())).unwrap();
        assert_eq!(node.start(), None);
        assert_eq!(
            node.handler().get_fee_exchange_rates(),
            json!({ "gasset": 100000000 })
        );
    }

    #[test]
    fn test_node_rejects_bad_config() {
        let mut config = NodeConfig::default();
        config.native_asset = "zz".to_string();
        assert!(FeeRateNode::new(&config).is_err());
    }
}
