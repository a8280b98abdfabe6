//! The wire contract §6 describes: length-prefixed integers, opaque
//! byte strings, and curve points, sent and received over whatever
//! transport a caller plugs in. `TcpChannel` is the real-network
//! implementation; `DuplexChannel` is an in-memory pair used by tests
//! and by the single-process end-to-end scenarios in §8. Persistence
//! across process restarts (resuming a run) is explicitly out of
//! scope for this channel layer.

use {
    crate::{
        block::Block,
        curve::CurvePoint,
        error::{Error, Result},
    },
    std::{
        io::{Read, Write},
        net::TcpStream,
        sync::mpsc::{Receiver, Sender},
    },
};

/// Everything a PSU run needs to move between the two parties.
pub trait Channel {
    fn send_bytes(&mut self, data: &[u8]) -> Result<()>;
    fn receive_bytes(&mut self) -> Result<Vec<u8>>;

    fn send_integer(&mut self, value: u64) -> Result<()> {
        self.send_bytes(&value.to_le_bytes())
    }

    fn receive_integer(&mut self) -> Result<u64> {
        let bytes = self.receive_bytes()?;
        let bytes: [u8; 8] =
            bytes.try_into().map_err(|_| Error::protocol_abort("Channel::receive_integer", "expected 8 bytes"))?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn send_point(&mut self, point: &CurvePoint) -> Result<()> {
        self.send_bytes(&point.to_bytes())
    }

    fn receive_point(&mut self) -> Result<CurvePoint> {
        let bytes = self.receive_bytes()?;
        let bytes: [u8; crate::curve::POINT_BYTE_LEN] = bytes
            .try_into()
            .map_err(|_| Error::protocol_abort("Channel::receive_point", "expected a curve-point-sized message"))?;
        CurvePoint::from_bytes(&bytes).ok_or_else(|| Error::curve_error("Channel::receive_point", "malformed point encoding"))
    }

    fn send_points(&mut self, points: &[CurvePoint]) -> Result<()> {
        self.send_integer(points.len() as u64)?;
        for point in points {
            self.send_point(point)?;
        }
        Ok(())
    }

    fn receive_points(&mut self) -> Result<Vec<CurvePoint>> {
        let count = self.receive_integer()? as usize;
        (0..count).map(|_| self.receive_point()).collect()
    }

    /// Blocks used by the OT sub-protocol's own wire format (§6: "per
    /// its own wire format"), length-prefixed the same way as points.
    fn send_blocks(&mut self, blocks: &[Block]) -> Result<()> {
        self.send_integer(blocks.len() as u64)?;
        let mut buf = Vec::with_capacity(blocks.len() * 16);
        for block in blocks {
            buf.extend_from_slice(block.as_bytes());
        }
        self.send_bytes(&buf)
    }

    fn receive_blocks(&mut self) -> Result<Vec<Block>> {
        let count = self.receive_integer()? as usize;
        let buf = self.receive_bytes()?;
        if buf.len() != count * 16 {
            return Err(Error::protocol_abort("Channel::receive_blocks", "byte count does not match declared block count"));
        }
        Ok(buf.chunks_exact(16).map(|c| Block(c.try_into().unwrap())).collect())
    }

    fn send_block_pairs(&mut self, pairs: &[(Block, Block)]) -> Result<()> {
        self.send_integer(pairs.len() as u64)?;
        let mut buf = Vec::with_capacity(pairs.len() * 32);
        for (a, b) in pairs {
            buf.extend_from_slice(a.as_bytes());
            buf.extend_from_slice(b.as_bytes());
        }
        self.send_bytes(&buf)
    }

    fn receive_block_pairs(&mut self) -> Result<Vec<(Block, Block)>> {
        let count = self.receive_integer()? as usize;
        let buf = self.receive_bytes()?;
        if buf.len() != count * 32 {
            return Err(Error::protocol_abort("Channel::receive_block_pairs", "byte count does not match declared pair count"));
        }
        Ok(buf
            .chunks_exact(32)
            .map(|c| (Block(c[..16].try_into().unwrap()), Block(c[16..].try_into().unwrap())))
            .collect())
    }

    /// The IKNP correction matrix: `CSP` columns, each a variable-length
    /// block vector.
    fn send_block_matrix(&mut self, columns: &[Vec<Block>]) -> Result<()> {
        self.send_integer(columns.len() as u64)?;
        for column in columns {
            self.send_blocks(column)?;
        }
        Ok(())
    }

    fn receive_block_matrix(&mut self) -> Result<Vec<Vec<Block>>> {
        let count = self.receive_integer()? as usize;
        (0..count).map(|_| self.receive_blocks()).collect()
    }
}

/// A real TCP connection. Every message is a 4-byte little-endian
/// length prefix followed by that many opaque bytes.
pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Channel for TcpChannel {
    fn send_bytes(&mut self, data: &[u8]) -> Result<()> {
        let len = data.len() as u32;
        self.stream
            .write_all(&len.to_le_bytes())
            .and_then(|_| self.stream.write_all(data))
            .map_err(|e| Error::protocol_abort("TcpChannel::send_bytes", e.to_string()))
    }

    fn receive_bytes(&mut self) -> Result<Vec<u8>> {
        let mut len_bytes = [0u8; 4];
        self.stream
            .read_exact(&mut len_bytes)
            .map_err(|e| Error::protocol_abort("TcpChannel::receive_bytes", e.to_string()))?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .map_err(|e| Error::protocol_abort("TcpChannel::receive_bytes", e.to_string()))?;
        Ok(buf)
    }
}

/// An in-memory channel half, backed by a pair of MPSC queues. Useful
/// for tests and for running both parties of a PSU scenario in one
/// process.
pub struct DuplexChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl DuplexChannel {
    /// Build a connected pair: whatever the first half sends, the
    /// second half receives, and vice versa.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = std::sync::mpsc::channel();
        let (tx_b, rx_b) = std::sync::mpsc::channel();
        (Self { tx: tx_a, rx: rx_b }, Self { tx: tx_b, rx: rx_a })
    }
}

impl Channel for DuplexChannel {
    fn send_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.tx.send(data.to_vec()).map_err(|_| Error::protocol_abort("DuplexChannel::send_bytes", "peer half was dropped"))
    }

    fn receive_bytes(&mut self) -> Result<Vec<u8>> {
        self.rx.recv().map_err(|_| Error::protocol_abort("DuplexChannel::receive_bytes", "peer half was dropped"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::curve::{CurvePoint, Scalar};

    #[test]
    fn duplex_channel_round_trips_points() {
        let (mut a, mut b) = DuplexChannel::pair();
        let mut rng = rand::thread_rng();
        let points: Vec<CurvePoint> = (0..5).map(|_| CurvePoint::generator().mul(&Scalar::random(&mut rng))).collect();

        a.send_points(&points).unwrap();
        let received = b.receive_points().unwrap();
        assert_eq!(received, points);
    }

    #[test]
    fn duplex_channel_round_trips_integers() {
        let (mut a, mut b) = DuplexChannel::pair();
        a.send_integer(424_242).unwrap();
        assert_eq!(b.receive_integer().unwrap(), 424_242);
    }
}
