//! Immuta client: the governance registry whose data sources get linked.

use catalink_config::{PageSettings, RegistryConfig};
use reqwest::header::AUTHORIZATION;

use crate::error::ClientError;
use crate::http::{self, ApiClient};
use crate::model::{id_string, CatalogRecord, ExternalResource, LinkOutcome};
use crate::paging::{Page, PageRequest, Pager};

const SERVICE: &str = "Immuta";

pub struct ImmutaClient {
    api: ApiClient,
    api_key: String,
    paging: PageSettings,
    token: Option<String>,
}

impl ImmutaClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(SERVICE, &config.url, &config.tls)?,
            api_key: config.api_key.clone(),
            paging: config.paging,
            token: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchange the API key for a session token used by every later call.
    pub fn authenticate(&mut self) -> Result<(), ClientError> {
        let url = self.api.url("/bim/apikey/authenticate");
        let request = self
            .api
            .http()
            .post(&url)
            .json(&serde_json::json!({ "apikey": self.api_key }));

        let resp = self.api.send(request)?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(ClientError::Auth {
                service: SERVICE,
                status,
                message: http::error_message(resp),
            });
        }

        let body = self.api.read_json(resp)?;
        let token = body["token"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Auth {
                service: SERVICE,
                status,
                message: "response missing 'token'".into(),
            })?;

        self.token = Some(token.to_string());
        tracing::info!(service = SERVICE, "authenticated");
        Ok(())
    }

    /// Pages of data sources with no catalog link yet.
    pub fn search_unlinked(&self) -> Pager<'_, CatalogRecord> {
        Pager::new(SERVICE, self.paging, move |req| self.fetch_page(req))
    }

    /// Attach `resource` to `record` as its catalog link. A non-2xx answer is
    /// returned as [`LinkOutcome::Rejected`]; only transport failures error.
    pub fn link(
        &self,
        provider_id: &str,
        record: &CatalogRecord,
        resource: &ExternalResource,
    ) -> Result<LinkOutcome, ClientError> {
        let token = self.token()?;
        let url = self.api.url(&format!("/dataSource/{}", record.id));
        let request = self
            .api
            .http()
            .put(&url)
            .header(AUTHORIZATION, token)
            .json(&serde_json::json!({
                "catalogMetadata": {
                    "id": resource.id,
                    "provider": provider_id,
                }
            }));

        let resp = self.api.send(request)?;
        if resp.status().is_success() {
            return Ok(LinkOutcome::Linked);
        }

        let status = resp.status().as_u16();
        Ok(LinkOutcome::Rejected {
            status,
            message: http::error_message(resp),
        })
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or_else(|| ClientError::Auth {
            service: SERVICE,
            status: 0,
            message: "not authenticated".into(),
        })
    }

    fn fetch_page(&self, req: PageRequest) -> Result<Page<CatalogRecord>, ClientError> {
        let token = self.token()?;
        let url = self.api.url("/dataSource");

        let mut params = vec![("offset", req.offset.to_string())];
        if let Some(limit) = req.limit {
            params.push(("size", limit.to_string()));
        }

        let body = self.api.send_json(
            self.api
                .http()
                .get(&url)
                .header(AUTHORIZATION, token)
                .query(&params),
        )?;

        parse_page(&body)
    }
}

/// Parse a `/dataSource` listing, keeping only unlinked records.
fn parse_page(body: &serde_json::Value) -> Result<Page<CatalogRecord>, ClientError> {
    let hits = body["hits"]
        .as_array()
        .ok_or_else(|| ClientError::parse(SERVICE, "response missing 'hits' array"))?;

    let mut items = Vec::new();
    for hit in hits {
        let linked = hit
            .get("catalogMetadata")
            .is_some_and(|m| !m.is_null());
        if linked {
            continue;
        }

        let id = id_string(&hit["id"])
            .ok_or_else(|| ClientError::parse(SERVICE, "data source missing 'id'"))?;
        let name = hit["name"]
            .as_str()
            .ok_or_else(|| ClientError::parse(SERVICE, format!("data source {} missing 'name'", id)))?
            .to_string();

        items.push(CatalogRecord {
            id,
            name,
            linked: false,
        });
    }

    Ok(Page {
        items,
        returned: hits.len(),
        total: body["count"].as_u64(),
    })
}
