mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{frame, serve_stream, RequestLog};
use qubic_base::{
    traits::AsByteEncoded, QubicId, QubicTxHash, QubicWallet, Signature, Signer,
};
use qubic_node::{Client, Connection, Error};
use qubic_proto::prelude::*;
use tokio::io::DuplexStream;

const SEED: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn stub_client<F>(handler: F) -> (Client<DuplexStream>, RequestLog)
where
    F: FnMut(u8, &[u8]) -> Vec<u8> + Send + 'static,
{
    let (client_end, server_end) = tokio::io::duplex(1 << 21);
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));

    tokio::spawn(serve_stream(server_end, log.clone(), handler));

    let conn = Connection::with_stream(client_end, "stub".to_string(), Duration::from_secs(1));
    (Client::from_connection(conn), log)
}

fn sample_entity() -> RespondedEntity {
    RespondedEntity {
        entity: Entity {
            public_key: QubicId([3; 32]),
            incoming_amount: 1500,
            outgoing_amount: 500,
            number_of_incoming_transfers: 7,
            number_of_outgoing_transfers: 2,
            latest_incoming_transfer_tick: 99,
            latest_outgoing_transfer_tick: 98,
        },
        tick: 100,
        spectrum_index: 12,
        siblings: [QubicId::default(); SPECTRUM_DEPTH],
    }
}

fn sample_tick_data(tick: u32, transactions: usize) -> Box<TickData> {
    let mut digests = [QubicTxHash::default(); NUMBER_OF_TRANSACTIONS_PER_TICK];
    for (i, digest) in digests.iter_mut().take(transactions).enumerate() {
        *digest = QubicTxHash([i as u8 + 1; 32]);
    }

    Box::new(TickData {
        computor_index: 4,
        epoch: 150,
        tick,
        time: TickTime::default(),
        union_data: [0; 256],
        timelock: [0; 32],
        transaction_digests: digests,
        contract_fees: [0; MAX_NUMBER_OF_CONTRACTS],
        signature: Signature::default(),
    })
}

fn tick_info_frame(tick: u32) -> Vec<u8> {
    let info = CurrentTickInfo {
        tick_duration: 2000,
        epoch: 150,
        tick,
        number_of_aligned_votes: 500,
        number_of_misaligned_votes: 1,
        initial_tick: tick.saturating_sub(1000),
    };

    frame(MessageType::RespondCurrentTickInfo as u8, info.encode_as_bytes())
}

// unrelated broadcasts in front of the response must not change the outcome
#[tokio::test]
async fn test_balance_skips_unrelated_frames() {
    let entity = sample_entity();

    let (mut client, _log) = stub_client(move |packet_type, _| {
        assert_eq!(packet_type, MessageType::RequestEntity as u8);

        let mut response = frame(0, &[9; 16]);
        response.extend_from_slice(&frame(
            MessageType::RespondEntity as u8,
            entity.encode_as_bytes(),
        ));
        response
    });

    let got = client.get_balance(QubicId([3; 32])).await.unwrap();
    assert_eq!(got, entity);
    assert_eq!(got.entity.balance(), 1000);

    // the stream is clean afterwards, a second call works as well
    let got = client.get_balance(QubicId([3; 32])).await.unwrap();
    assert_eq!(got, entity);
    assert!(client.is_healthy());
}

#[tokio::test]
async fn test_tick_info() {
    let (mut client, _log) = stub_client(|_, _| {
        let mut response = frame(0, &[0; 16]);
        response.extend_from_slice(&tick_info_frame(20_000_000));
        response
    });

    let info = client.get_current_tick_info().await.unwrap();
    assert_eq!(info.tick, 20_000_000);
    assert_eq!(info.initial_tick, 19_999_000);
    assert!(client.is_healthy());
}

#[tokio::test]
async fn test_tick_data_empty_and_future() {
    let (mut client, _log) = stub_client(|packet_type, _| {
        if packet_type == MessageType::RequestCurrentTickInfo as u8 {
            tick_info_frame(100)
        } else {
            frame(MessageType::EndResponse as u8, &[])
        }
    });

    // the node has no record for the tick: empty, not an error
    assert!(client.get_tick_data(90).await.unwrap().is_none());

    // ticks ahead of the node are rejected before any request is sent
    match client.get_tick_data(101).await {
        Err(Error::FutureTick { requested, current }) => {
            assert_eq!(requested, 101);
            assert_eq!(current, 100);
        }
        other => panic!("expected FutureTick, got {other:?}"),
    }
}

#[tokio::test]
async fn test_tick_data() {
    let tick_data = sample_tick_data(95, 3);

    let (mut client, _log) = stub_client(move |packet_type, _| {
        if packet_type == MessageType::RequestCurrentTickInfo as u8 {
            tick_info_frame(100)
        } else {
            frame(
                MessageType::BroadcastFutureTickData as u8,
                tick_data.encode_as_bytes(),
            )
        }
    });

    let got = client.get_tick_data(95).await.unwrap().unwrap();
    assert_eq!(got.tick, 95);
    assert_eq!(got.transaction_count(), 3);
}

#[tokio::test]
async fn test_tick_transactions() {
    let wallet = QubicWallet::from_seed(SEED).unwrap();
    let signer = Signer::from_wallet(&wallet);

    let mut tx_a = Transaction::transfer(wallet.public_key, QubicId([9; 32]), 10, 95);
    tx_a.sign(&signer).unwrap();
    let mut tx_b = Transaction::transfer(wallet.public_key, QubicId([8; 32]), 20, 95);
    tx_b.sign(&signer).unwrap();

    let tick_data = sample_tick_data(95, 2);
    let (tx_a_bytes, tx_b_bytes) = {
        use qubic_base::traits::ToBytes;
        (tx_a.to_bytes(), tx_b.to_bytes())
    };

    let (mut client, log) = stub_client(move |packet_type, _| {
        if packet_type == MessageType::RequestCurrentTickInfo as u8 {
            tick_info_frame(100)
        } else if packet_type == MessageType::RequestTickData as u8 {
            frame(
                MessageType::BroadcastFutureTickData as u8,
                tick_data.encode_as_bytes(),
            )
        } else {
            let mut response = frame(MessageType::BroadcastTransaction as u8, &tx_a_bytes);
            response.extend_from_slice(&frame(0, &[1; 16]));
            response.extend_from_slice(&frame(MessageType::BroadcastTransaction as u8, &tx_b_bytes));
            response.extend_from_slice(&frame(MessageType::EndResponse as u8, &[]));
            response
        }
    });

    let transactions = client.get_tick_transactions(95).await.unwrap();
    assert_eq!(transactions, vec![tx_a, tx_b]);
    assert!(transactions.iter().all(Transaction::verify));

    // the request asked for exactly the first two digests, skip-bit encoded
    let requests = log.lock().unwrap();
    let (_, payload) = requests
        .iter()
        .find(|(packet_type, _)| *packet_type == MessageType::RequestTickTransactions as u8)
        .unwrap();
    let flags = &payload[8..];
    assert_eq!(flags.len(), NUMBER_OF_TRANSACTIONS_PER_TICK / 8);
    assert_eq!(flags[0], 0x00);
    assert!(flags[1..].iter().all(|&flag| flag == 0xFF));
}

#[tokio::test]
async fn test_quorum_votes_mixed_forms() {
    let mut vote = QuorumTickVote {
        computor_index: 1,
        epoch: 150,
        tick: 95,
        time: TickTime::default(),
        prev_resource_testing_digest: 0,
        salted_resource_testing_digest: 0,
        prev_spectrum_digest: qubic_base::H256::repeat_byte(1),
        prev_universe_digest: qubic_base::H256::repeat_byte(2),
        prev_computer_digest: qubic_base::H256::repeat_byte(3),
        salted_spectrum_digest: qubic_base::H256::repeat_byte(4),
        salted_universe_digest: qubic_base::H256::repeat_byte(5),
        salted_computer_digest: qubic_base::H256::repeat_byte(6),
        tx_digest: qubic_base::H256::repeat_byte(7),
        expected_next_tick_tx_digest: qubic_base::H256::repeat_byte(8),
        prev_transaction_body_digest: qubic_base::H256::repeat_byte(9),
        salted_transaction_body_digest: qubic_base::H256::repeat_byte(10),
        signature: Signature([1; 64]),
    };

    let long_vote = vote.encode_as_bytes().to_vec();

    vote.computor_index = 2;
    let full = vote.encode_as_bytes().to_vec();
    let mut short_vote = full[..288].to_vec();
    short_vote.extend_from_slice(&full[352..]);

    let (mut client, _log) = stub_client(move |_, _| {
        let mut response = frame(0, &[0; 16]);
        response.extend_from_slice(&frame(MessageType::QuorumTickResponse as u8, &long_vote));
        response.extend_from_slice(&frame(8, &[0xAB; 40]));
        response.extend_from_slice(&frame(MessageType::QuorumTickResponse as u8, &short_vote));
        response.extend_from_slice(&frame(MessageType::EndResponse as u8, &[]));
        response
    });

    let votes = client.get_quorum_votes(95).await.unwrap();
    assert_eq!(votes.len(), 2);
    assert_eq!(votes[0].computor_index, 1);
    assert_eq!(votes[1].computor_index, 2);
    // short form leaves the body digest pair zeroed
    assert_eq!(
        votes[1].prev_transaction_body_digest,
        qubic_base::H256::zero()
    );
    assert_eq!(votes[1].signature, Signature([1; 64]));
}

#[tokio::test]
async fn test_computors() {
    let computors = Computors {
        epoch: 150,
        public_key: [QubicId([5; 32]); NUMBER_OF_COMPUTORS],
        signature: Signature([7; 64]),
    };

    let (mut client, _log) = stub_client(move |_, _| {
        let mut response = frame(0, &[0; 16]);
        response.extend_from_slice(&frame(
            MessageType::BroadcastComputors as u8,
            computors.encode_as_bytes(),
        ));
        response
    });

    let got = client.get_computors().await.unwrap();
    assert_eq!(got.epoch, 150);
    assert_eq!(got.public_key[675], QubicId([5; 32]));
}

#[tokio::test]
async fn test_broadcast_transaction() {
    let wallet = QubicWallet::from_seed(SEED).unwrap();
    let signer = Signer::from_wallet(&wallet);

    let mut tx = Transaction::transfer(wallet.public_key, QubicId([1; 32]), 50, 200);

    let (mut client, log) = stub_client(|packet_type, _| {
        if packet_type == MessageType::RequestCurrentTickInfo as u8 {
            tick_info_frame(100)
        } else {
            Vec::new()
        }
    });

    // unsigned transactions are rejected before hitting the wire
    assert!(matches!(
        client.broadcast_transaction(&tx).await,
        Err(Error::InvalidArgument(_))
    ));

    tx.sign(&signer).unwrap();
    let hash = client.broadcast_transaction(&tx).await.unwrap();
    assert_eq!(hash, tx.digest());

    // sequence another request so the stub has surely consumed the broadcast
    client.get_current_tick_info().await.unwrap();

    let requests = log.lock().unwrap();
    let (packet_type, payload) = &requests[0];
    assert_eq!(*packet_type, MessageType::BroadcastTransaction as u8);
    // broadcasts carry a zero dedup token
    assert_eq!(&payload[..4], &[0, 0, 0, 0]);
    let decoded = {
        use qubic_base::traits::FromBytes;
        Transaction::from_bytes(&payload[4..]).unwrap()
    };
    assert_eq!(decoded, tx);

    // every non-broadcast request carries a nonzero token
    let (_, info_payload) = &requests[1];
    assert_ne!(&info_payload[..4], &[0, 0, 0, 0]);
}

#[tokio::test]
async fn test_tx_status() {
    let digest = [0x5A; 32];
    let mut payload = Vec::new();
    payload.extend_from_slice(&100u32.to_le_bytes());
    payload.extend_from_slice(&95u32.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    let mut bitfield = [0u8; 128];
    bitfield[0] = 1;
    payload.extend_from_slice(&bitfield);
    payload.extend_from_slice(&digest);

    let (mut client, _log) = stub_client(move |packet_type, request| {
        assert_eq!(packet_type, MessageType::RequestTxStatus as u8);
        assert_eq!(request, &95u32.to_le_bytes()[..]);
        frame(MessageType::RespondTxStatus as u8, &payload)
    });

    let status = client.get_tx_status(95).await.unwrap();
    assert_eq!(status.current_tick_of_node, 100);
    assert_eq!(status.tick, 95);
    assert_eq!(status.money_flew, vec![true]);
    assert_eq!(status.digests, vec![QubicTxHash(digest)]);
}

#[tokio::test]
async fn test_query_contract() {
    let (mut client, log) = stub_client(|_, _| {
        frame(
            MessageType::RespondContractFunction as u8,
            &1000u32.to_le_bytes(),
        )
    });

    let output = client
        .query_contract(ContractFunctionCall::new(4, 1, Vec::new()))
        .await
        .unwrap();
    assert_eq!(output.data, 1000u32.to_le_bytes());

    let requests = log.lock().unwrap();
    let (_, payload) = &requests[0];
    // contract index, input type, empty input
    assert_eq!(&payload[4..8], &4u32.to_le_bytes());
    assert_eq!(&payload[8..10], &1u16.to_le_bytes());
    assert_eq!(&payload[10..12], &0u16.to_le_bytes());
}

#[tokio::test]
async fn test_query_contract_empty() {
    let (mut client, _log) = stub_client(|_, _| frame(MessageType::EndResponse as u8, &[]));

    let output = client
        .query_contract(ContractFunctionCall::new(4, 1, Vec::new()))
        .await
        .unwrap();
    assert!(output.data.is_empty());
}

#[tokio::test]
async fn test_assets_by_universe_index() {
    let issuance = AssetIssuance {
        asset: AssetIssuanceData {
            public_key: QubicId::default(),
            asset_type: ASSET_TYPE_ISSUANCE,
            name: *b"RANDOM\0",
            number_of_decimal_places: 0,
            unit_of_measurement: [0; 7],
        },
        tick: 20_200_000,
        universe_index: 7,
    };

    let (mut client, _log) = stub_client(move |packet_type, request| {
        assert_eq!(packet_type, MessageType::RequestAssets as u8);
        assert_eq!(request.len(), 112);
        assert_eq!(&request[..4], &[3, 0, 0, 0]);

        let mut response = frame(MessageType::RespondAssets as u8, issuance.encode_as_bytes());
        response.extend_from_slice(&frame(MessageType::EndResponse as u8, &[]));
        response
    });

    let issuances = client
        .get_asset_issuances_by_universe_index(7)
        .await
        .unwrap();
    assert_eq!(issuances.len(), 1);
    assert_eq!(issuances[0].asset.name_string(), "RANDOM");
    assert_eq!(issuances[0].universe_index, 7);

    // same record through the ownership-typed accessor is a kind mismatch
    assert!(matches!(
        client.get_asset_ownerships_by_universe_index(7).await,
        Err(Error::UnexpectedAssetRecord)
    ));
}

#[tokio::test]
async fn test_timeout_marks_unhealthy() {
    // a stub that never answers
    let (mut client, _log) = stub_client(|_, _| Vec::new());
    client.set_timeout(Duration::from_millis(50));

    assert!(matches!(
        client.get_current_tick_info().await,
        Err(Error::Timeout)
    ));
    assert!(!client.is_healthy());
}

#[tokio::test]
async fn test_cancelled_request_poisons_connection() {
    let (mut client, _log) = stub_client(|_, _| Vec::new());

    {
        let future = client.get_current_tick_info();
        let mut future = std::pin::pin!(future);

        // poll the request once so it is genuinely in flight, then drop it
        std::future::poll_fn(|cx| {
            assert!(future.as_mut().poll(cx).is_pending());
            std::task::Poll::Ready(())
        })
        .await;
    }

    assert!(matches!(
        client.get_current_tick_info().await,
        Err(Error::Cancelled)
    ));
    assert!(!client.is_healthy());
}
