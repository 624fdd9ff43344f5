use std::time::Duration;

use log::debug;
use qubic_base::{traits::ToBytes, QubicId, QubicTxHash};
use qubic_proto::{
    prelude::*,
    types::{Packet, RequestComputors, RequestEntity, RespondedEntity},
    utils::QubicRequest,
    Header, MessageType, HEADER_SIZE,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

use crate::{
    dispatch::{dispatch, dispatch_no_response, ContractOutput, List, Single, SingleOrEmpty},
    error::{Error, Result},
    transport::{Connection, DEFAULT_TIMEOUT},
};

/// A client bound to one node connection.
///
/// Request methods take `&mut self`: a connection carries at most one
/// in-flight request, and the borrow makes that explicit. Dropping a request
/// future mid-flight leaves the stream position indeterminate, so the next
/// call fails with [`Error::Cancelled`] and the client must be discarded.
#[derive(Debug)]
pub struct Client<S = TcpStream> {
    conn: Connection<S>,
}

impl Client<TcpStream> {
    pub async fn connect(ip: &str, port: &str) -> Result<Self> {
        Ok(Self {
            conn: Connection::connect(ip, port, DEFAULT_TIMEOUT).await?,
        })
    }

    pub async fn connect_with_timeout(ip: &str, port: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            conn: Connection::connect(ip, port, timeout).await?,
        })
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Client<S> {
    /// Wraps an already established connection.
    pub fn from_connection(conn: Connection<S>) -> Self {
        Self { conn }
    }

    pub fn peer(&self) -> &str {
        self.conn.peer()
    }

    pub fn is_healthy(&self) -> bool {
        self.conn.is_healthy()
    }

    /// Overrides the default 5 second read/write deadline.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.conn.set_timeout(timeout);
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.conn
    }

    /// Balance record of `id`, authenticated by its spectrum siblings.
    pub async fn get_balance(&mut self, id: QubicId) -> Result<RespondedEntity> {
        let packet = Packet::new(RequestEntity { public_key: id }, true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            Single::<RespondedEntity>::new(MessageType::RespondEntity),
        )
        .await
    }

    pub async fn get_current_tick_info(&mut self) -> Result<CurrentTickInfo> {
        let packet = Packet::new(GetCurrentTickInfo, true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            Single::<CurrentTickInfo>::new(MessageType::RespondCurrentTickInfo),
        )
        .await
    }

    /// Tick record for `tick`. `None` when the node has no data for it yet.
    /// Ticks ahead of the node's current tick are rejected.
    pub async fn get_tick_data(&mut self, tick: u32) -> Result<Option<Box<TickData>>> {
        let tick_info = self.get_current_tick_info().await?;
        if tick > tick_info.tick {
            return Err(Error::FutureTick {
                requested: tick,
                current: tick_info.tick,
            });
        }

        let packet = Packet::new(RequestTickData { tick }, true);

        let data = dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            SingleOrEmpty::<TickData>::new(MessageType::BroadcastFutureTickData),
        )
        .await?;

        Ok(data.map(Box::new))
    }

    /// All transactions of `tick`, in wire order.
    ///
    /// The tick record is fetched first to learn how many digests the tick
    /// holds; the request then asks for exactly that many.
    pub async fn get_tick_transactions(&mut self, tick: u32) -> Result<Vec<Transaction>> {
        let tick_data = match self.get_tick_data(tick).await? {
            Some(tick_data) => tick_data,
            None => return Ok(Vec::new()),
        };

        let count = tick_data.transaction_count();
        if count == 0 {
            return Ok(Vec::new());
        }

        let packet = Packet::new(
            RequestedTickTransactions {
                tick,
                flags: TransactionFlags::first(count),
            },
            true,
        );

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            List::<Transaction>::new(MessageType::BroadcastTransaction),
        )
        .await
    }

    /// Broadcasts a signed transaction and returns its id digest.
    pub async fn broadcast_transaction(&mut self, tx: &Transaction) -> Result<QubicTxHash> {
        if tx.signature.is_zeroed() {
            return Err(Error::InvalidArgument(
                "cannot broadcast an unsigned transaction",
            ));
        }

        let packet = Packet::new(tx.clone(), false);
        dispatch_no_response(&mut self.conn, &packet.to_bytes()).await?;

        let hash = tx.digest();
        debug!("broadcast transaction {hash} to {}", self.conn.peer());
        Ok(hash)
    }

    /// Broadcasts pre-encoded transaction bytes verbatim.
    pub async fn broadcast_raw_transaction(&mut self, raw_tx: &[u8]) -> Result<()> {
        let mut frame = Header::new(
            HEADER_SIZE + raw_tx.len(),
            MessageType::BroadcastTransaction,
            false,
        )
        .to_bytes()
        .to_vec();
        frame.extend_from_slice(raw_tx);

        dispatch_no_response(&mut self.conn, &frame).await
    }

    /// Status report for the transactions of `tick`.
    pub async fn get_tx_status(&mut self, tick: u32) -> Result<TransactionStatus> {
        let packet = Packet::new(RequestTxStatus { tick }, true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            Single::<TransactionStatus>::new(MessageType::RespondTxStatus),
        )
        .await
    }

    /// Every computor's vote for `tick`; short (pre body-digest) vote records
    /// are accepted alongside current ones.
    pub async fn get_quorum_votes(&mut self, tick: u32) -> Result<Vec<QuorumTickVote>> {
        let packet = Packet::new(QuorumTickData::all_votes(tick), true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            List::<QuorumTickVote>::new(MessageType::QuorumTickResponse),
        )
        .await
    }

    /// The epoch's computor list.
    pub async fn get_computors(&mut self) -> Result<Computors> {
        let packet = Packet::new(RequestComputors, true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            Single::<Computors>::new(MessageType::BroadcastComputors),
        )
        .await
    }

    /// Calls a read-only contract function and returns its raw output.
    pub async fn query_contract(
        &mut self,
        call: ContractFunctionCall,
    ) -> Result<ContractFunctionData> {
        let packet = Packet::new(call, true);

        dispatch(&mut self.conn, &packet.to_bytes(), ContractOutput).await
    }

    async fn get_assets<R: QubicRequest + ToBytes>(&mut self, request: R) -> Result<Vec<AssetRecord>> {
        let packet = Packet::new(request, true);

        dispatch(
            &mut self.conn,
            &packet.to_bytes(),
            List::<AssetRecord>::new(MessageType::RespondAssets),
        )
        .await
    }

    /// The single universe record at `universe_index`, regardless of kind.
    pub async fn get_assets_by_universe_index(
        &mut self,
        universe_index: u32,
    ) -> Result<Vec<AssetRecord>> {
        self.get_assets(RequestAssetsByUniverseIndex::new(universe_index))
            .await
    }

    pub async fn get_asset_issuances_by_universe_index(
        &mut self,
        universe_index: u32,
    ) -> Result<Vec<AssetIssuance>> {
        let records = self.get_assets_by_universe_index(universe_index).await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Issuance(issuance) => Ok(issuance),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }

    pub async fn get_asset_ownerships_by_universe_index(
        &mut self,
        universe_index: u32,
    ) -> Result<Vec<AssetOwnership>> {
        let records = self.get_assets_by_universe_index(universe_index).await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Ownership(ownership) => Ok(ownership),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }

    pub async fn get_asset_possessions_by_universe_index(
        &mut self,
        universe_index: u32,
    ) -> Result<Vec<AssetPossession>> {
        let records = self.get_assets_by_universe_index(universe_index).await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Possession(possession) => Ok(possession),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }

    /// Issuance records matching the filter; absent issuer or name match any.
    pub async fn get_asset_issuances_by_filter(
        &mut self,
        issuer: Option<QubicId>,
        asset_name: Option<AssetName>,
    ) -> Result<Vec<AssetIssuance>> {
        let records = self
            .get_assets(RequestAssetsByFilter::issuances(issuer, asset_name))
            .await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Issuance(issuance) => Ok(issuance),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }

    /// Ownership records of the asset issued by `issuer` under `asset_name`.
    pub async fn get_asset_ownerships_by_filter(
        &mut self,
        issuer: QubicId,
        asset_name: AssetName,
        owner: Option<QubicId>,
        ownership_managing_contract: u16,
    ) -> Result<Vec<AssetOwnership>> {
        let records = self
            .get_assets(RequestAssetsByFilter::ownerships(
                issuer,
                asset_name,
                owner,
                ownership_managing_contract,
            ))
            .await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Ownership(ownership) => Ok(ownership),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }

    /// Possession records of the asset issued by `issuer` under `asset_name`.
    pub async fn get_asset_possessions_by_filter(
        &mut self,
        issuer: QubicId,
        asset_name: AssetName,
        owner: Option<QubicId>,
        possessor: Option<QubicId>,
        ownership_managing_contract: u16,
        possession_managing_contract: u16,
    ) -> Result<Vec<AssetPossession>> {
        let records = self
            .get_assets(RequestAssetsByFilter::possessions(
                issuer,
                asset_name,
                owner,
                possessor,
                ownership_managing_contract,
                possession_managing_contract,
            ))
            .await?;
        records
            .into_iter()
            .map(|record| match record {
                AssetRecord::Possession(possession) => Ok(possession),
                _ => Err(Error::UnexpectedAssetRecord),
            })
            .collect()
    }
}
