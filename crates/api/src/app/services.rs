//! Service wiring: which catalog backs the inventory endpoints and whether a
//! model is available for `/chatFlow`.

use std::sync::Arc;

use anyhow::Context;

use brujula_ai::{ChatFlow, GeminiClient, LanguageModel};
use brujula_core::{Product, ProductType};
use brujula_inventory::{InMemoryCatalog, InventoryTool, SharedCatalog, TieredSearch};
use brujula_odoo::{OdooClient, OdooSession};

use crate::config::AppConfig;

/// Where product data comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatalogBackend {
    Odoo,
    Demo,
}

impl CatalogBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogBackend::Odoo => "odoo",
            CatalogBackend::Demo => "demo",
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    backend: CatalogBackend,
    search: Arc<TieredSearch<SharedCatalog>>,
    tool: InventoryTool<SharedCatalog>,
    chat: Option<Arc<ChatFlow>>,
}

impl AppServices {
    /// Wire services around an arbitrary catalog and optional model.
    pub fn new(
        backend: CatalogBackend,
        catalog: SharedCatalog,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        let search = Arc::new(TieredSearch::new(catalog));
        let tool = InventoryTool::new(search.clone());
        let chat = model.map(|model| Arc::new(ChatFlow::new(model).with_tool(Arc::new(tool.clone()))));

        Self {
            backend,
            search,
            tool,
            chat,
        }
    }

    pub fn backend(&self) -> CatalogBackend {
        self.backend
    }

    pub fn search(&self) -> &TieredSearch<SharedCatalog> {
        &self.search
    }

    pub fn inventory_tool(&self) -> &InventoryTool<SharedCatalog> {
        &self.tool
    }

    /// `None` when no model is configured.
    pub fn chat(&self) -> Option<&ChatFlow> {
        self.chat.as_deref()
    }
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let (backend, catalog): (CatalogBackend, SharedCatalog) = match &config.odoo {
        Some(odoo) => {
            let client = OdooClient::new(odoo).context("failed to build ERP client")?;
            tracing::info!(
                url = %odoo.url,
                db = %odoo.db,
                timeout_ms = odoo.timeout.as_millis() as u64,
                "using ERP catalog"
            );
            let catalog: SharedCatalog = Arc::new(OdooSession::new(client));
            (CatalogBackend::Odoo, catalog)
        }
        None => {
            tracing::warn!("ODOO_URL not set; serving the in-memory demo catalog");
            let catalog: SharedCatalog = Arc::new(demo_catalog());
            (CatalogBackend::Demo, catalog)
        }
    };

    let model: Option<Arc<dyn LanguageModel>> = match &config.gemini {
        Some(gemini) => {
            let client = GeminiClient::new(gemini.clone()).context("failed to build model client")?;
            tracing::info!(model = client.model(), "chat flow enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; /chatFlow is disabled");
            None
        }
    };

    Ok(AppServices::new(backend, catalog, model))
}

/// Small spare-parts catalog used when no ERP is configured.
pub fn demo_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Product::new(1, "Pastillas de Freno Corsa", 24.0, 15000.0, ProductType::Product),
        Product::new(2, "Filtro de Aceite", 50.0, 8000.0, ProductType::Product),
        Product::new(3, "Bujía Premium", 12.0, 4500.0, ProductType::Product),
        Product::new(4, "Radiador Corsa 1.4", 3.0, 89000.0, ProductType::Product),
        Product::new(5, "Amortiguador Delantero Gol", 8.0, 32000.0, ProductType::Product),
        Product::new(6, "Correa de Distribución", 0.0, 21000.0, ProductType::Product),
        Product::new(7, "Líquido de Frenos DOT4", 40.0, 3500.0, ProductType::Consu),
        Product::new(8, "Instalación de Radiador", 0.0, 20000.0, ProductType::Service),
    ])
}
