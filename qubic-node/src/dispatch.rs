use core::marker::PhantomData;

use log::trace;
use qubic_base::traits::FromBytes;
use qubic_proto::{types::contracts::ContractFunctionData, Header, MessageType};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    error::{Error, Result},
    transport::Connection,
};

/// Outcome of feeding one frame to a decoder.
pub enum Step<T> {
    /// Not finished; keep reading frames.
    Continue,
    Done(T),
}

/// Walks the self-describing response stream of one request.
///
/// [`decode_frame`](FrameDecoder::decode_frame) sees every frame except the
/// end marker and returns [`Step::Continue`] for frames it does not care
/// about; the dispatcher then skips them by their declared size. An
/// `EndResponse` frame finishes the walk through
/// [`finish`](FrameDecoder::finish).
pub trait FrameDecoder {
    type Output;

    fn decode_frame(&mut self, header: &Header, payload: &[u8]) -> Result<Step<Self::Output>>;

    fn finish(self) -> Result<Self::Output>;
}

/// One response frame of a fixed type; anything else is an unsolicited
/// broadcast and gets skipped.
pub struct Single<T: FromBytes> {
    expected: MessageType,
    _pd: PhantomData<T>,
}

impl<T: FromBytes> Single<T> {
    pub fn new(expected: MessageType) -> Self {
        Self {
            expected,
            _pd: PhantomData,
        }
    }
}

impl<T: FromBytes> FrameDecoder for Single<T> {
    type Output = T;

    fn decode_frame(&mut self, header: &Header, payload: &[u8]) -> Result<Step<T>> {
        if !header.is_type(self.expected) {
            return Ok(Step::Continue);
        }

        Ok(Step::Done(T::from_bytes(payload)?))
    }

    fn finish(self) -> Result<T> {
        Err(Error::MissingResponse {
            expected: self.expected as u8,
        })
    }
}

/// Like [`Single`], but an early end marker is a valid empty answer.
pub struct SingleOrEmpty<T: FromBytes> {
    expected: MessageType,
    _pd: PhantomData<T>,
}

impl<T: FromBytes> SingleOrEmpty<T> {
    pub fn new(expected: MessageType) -> Self {
        Self {
            expected,
            _pd: PhantomData,
        }
    }
}

impl<T: FromBytes> FrameDecoder for SingleOrEmpty<T> {
    type Output = Option<T>;

    fn decode_frame(&mut self, header: &Header, payload: &[u8]) -> Result<Step<Option<T>>> {
        if !header.is_type(self.expected) {
            return Ok(Step::Continue);
        }

        Ok(Step::Done(Some(T::from_bytes(payload)?)))
    }

    fn finish(self) -> Result<Option<T>> {
        Ok(None)
    }
}

/// Accumulates matching frames in wire order until the end marker.
pub struct List<T: FromBytes> {
    expected: MessageType,
    items: Vec<T>,
}

impl<T: FromBytes> List<T> {
    pub fn new(expected: MessageType) -> Self {
        Self {
            expected,
            items: Vec::new(),
        }
    }
}

impl<T: FromBytes> FrameDecoder for List<T> {
    type Output = Vec<T>;

    fn decode_frame(&mut self, header: &Header, payload: &[u8]) -> Result<Step<Vec<T>>> {
        if header.is_type(self.expected) {
            self.items.push(T::from_bytes(payload)?);
        }

        Ok(Step::Continue)
    }

    fn finish(self) -> Result<Vec<T>> {
        Ok(self.items)
    }
}

/// Contract function output: the whole payload of the response frame, empty
/// when the contract returned nothing.
pub struct ContractOutput;

impl FrameDecoder for ContractOutput {
    type Output = ContractFunctionData;

    fn decode_frame(
        &mut self,
        header: &Header,
        payload: &[u8],
    ) -> Result<Step<ContractFunctionData>> {
        if !header.is_type(MessageType::RespondContractFunction) {
            return Ok(Step::Continue);
        }

        Ok(Step::Done(ContractFunctionData {
            data: payload.to_vec(),
        }))
    }

    fn finish(self) -> Result<ContractFunctionData> {
        Ok(ContractFunctionData::default())
    }
}

/// Writes one request frame and walks the response stream with `decoder`.
///
/// Unsolicited broadcast frames between request and response are tolerated:
/// every frame the decoder does not consume is dropped by its declared size,
/// so `k` interleaved frames never change the decoded output.
pub async fn dispatch<S, D>(conn: &mut Connection<S>, frame: &[u8], decoder: D) -> Result<D::Output>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: FrameDecoder,
{
    conn.begin_request()?;
    let result = run_exchange(conn, frame, decoder).await;
    conn.end_request();

    result
}

/// Fire-and-forget write, used for broadcasts which get no response.
pub async fn dispatch_no_response<S>(conn: &mut Connection<S>, frame: &[u8]) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    conn.begin_request()?;
    let result = conn.write_all(frame).await;
    conn.end_request();

    result
}

async fn run_exchange<S, D>(conn: &mut Connection<S>, frame: &[u8], mut decoder: D) -> Result<D::Output>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: FrameDecoder,
{
    conn.write_all(frame).await?;

    loop {
        let (header, payload) = conn.read_frame().await?;

        if header.is_type(MessageType::EndResponse) {
            return decoder.finish();
        }

        match decoder.decode_frame(&header, &payload)? {
            Step::Done(output) => return Ok(output),
            Step::Continue => {
                trace!(
                    "skipping frame type {} ({} bytes) from {}",
                    header.packet_type,
                    payload.len(),
                    conn.peer()
                );
            }
        }
    }
}
