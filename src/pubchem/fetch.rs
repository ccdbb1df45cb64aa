use std::future::Future;

use reqwest::StatusCode;
use serde::Deserialize;

/// Name → SMILES lookup. Implementations return every match in the order the
/// service ranks them; an empty list means "not found".
pub trait StructureLookup {
    fn lookup(&self, name: &str) -> impl Future<Output = eyre::Result<Vec<String>>>;
}

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<CompoundProperties>,
}

#[derive(Debug, Deserialize)]
struct CompoundProperties {
    #[serde(rename = "CID")]
    cid: Option<u64>,
    #[serde(rename = "ConnectivitySMILES", alias = "CanonicalSMILES")]
    connectivity_smiles: Option<String>,
}

/// Thin client over PubChem's PUG REST property endpoint.
#[derive(Debug, Clone)]
pub struct PubChemClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl PubChemClient {
    pub fn new(base_url: &str) -> eyre::Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| eyre::eyre!("invalid PubChem url {:?}: {e}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(eyre::eyre!("{} cannot be used as a base url", base_url));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn property_url(&self, name: &str) -> eyre::Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| eyre::eyre!("{} cannot be used as a base url", self.base_url))?
            .pop_if_empty()
            .extend([
                "compound",
                "name",
                name,
                "property",
                "ConnectivitySMILES",
                "JSON",
            ]);
        Ok(url)
    }

    pub async fn connectivity_smiles(&self, name: &str) -> eyre::Result<Vec<String>> {
        let url = self.property_url(name)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            // PubChem answers unknown names with a 404 fault document
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            status if !status.is_success() => {
                return Err(eyre::eyre!("PubChem returned {} for {:?}", status, name));
            }
            _ => {}
        }

        let body = response.json::<PropertyResponse>().await?;
        let smiles = body
            .property_table
            .properties
            .into_iter()
            .filter_map(|p| {
                if p.connectivity_smiles.is_none() {
                    log::debug!("CID {:?} for {:?} carries no SMILES", p.cid, name);
                }
                p.connectivity_smiles
            })
            .collect();

        Ok(smiles)
    }
}

impl StructureLookup for PubChemClient {
    fn lookup(&self, name: &str) -> impl Future<Output = eyre::Result<Vec<String>>> {
        self.connectivity_smiles(name)
    }
}
