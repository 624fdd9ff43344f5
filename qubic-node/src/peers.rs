use serde::{Deserialize, Serialize};

/// Peer-list document returned by a discovery endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerList {
    pub peers: Vec<String>,
    pub length: u32,
    pub last_updated: i64,
}

/// Source of reachable peer addresses, refreshed per pool factory call.
///
/// The transport behind it is opaque; the bundled [`HttpPeerSource`] reads a
/// JSON endpoint, and any fixed list works through [`StaticPeers`].
#[async_trait::async_trait]
pub trait PeerSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<PeerList>;
}

/// A fixed peer list, mainly for tests and single-node deployments.
#[derive(Debug, Clone)]
pub struct StaticPeers(pub Vec<String>);

#[async_trait::async_trait]
impl PeerSource for StaticPeers {
    async fn fetch(&self) -> anyhow::Result<PeerList> {
        Ok(PeerList {
            length: self.0.len() as u32,
            peers: self.0.clone(),
            last_updated: 0,
        })
    }
}

/// Peer discovery over an HTTP JSON endpoint.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpPeerSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpPeerSource {
    pub fn new(url: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait::async_trait]
impl PeerSource for HttpPeerSource {
    async fn fetch(&self) -> anyhow::Result<PeerList> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_list_document() {
        let document = r#"{
            "peers": ["5.9.16.14", "136.243.41.86"],
            "length": 2,
            "last_updated": 1700000000
        }"#;

        let list: PeerList = serde_json::from_str(document).unwrap();
        assert_eq!(list.peers.len(), 2);
        assert_eq!(list.length, 2);
        assert_eq!(list.last_updated, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_static_peers() {
        let source = StaticPeers(vec!["1.2.3.4".to_string()]);
        let list = source.fetch().await.unwrap();

        assert_eq!(list.peers, vec!["1.2.3.4"]);
        assert_eq!(list.length, 1);
    }
}
