//! Base OT: a handful of 1-out-of-2 OTs run directly (no extension),
//! used only to bootstrap the IKNP matrix in [`super::iknp`]. Chou–
//! Orlandi "Simplest OT", run over Ristretto25519 — a separate DH group
//! from the protocol's own p256 group, since nothing ties the two
//! together.

use {
    crate::{
        block::Block,
        error::{Error, Result},
    },
    curve25519_dalek::{constants::RISTRETTO_BASEPOINT_TABLE, ristretto::RistrettoPoint, scalar::Scalar},
    rand_core::{CryptoRng, RngCore},
    zeroize::Zeroize,
};

/// The sender's half of one base-OT instance: holds `x` and its public
/// key `A = g^x` across the two message round trips.
pub struct BaseOtSender {
    private_key: Scalar,
    pub_key: RistrettoPoint,
    pub_key_squared: RistrettoPoint,
}

/// The receiver's half, carrying its choice bit through to [`BaseOtReceiver::derive`].
pub struct BaseOtReceiver {
    private_key: Scalar,
    upstream_pub_key: RistrettoPoint,
    choice: bool,
}

impl BaseOtSender {
    pub fn new(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let private_key = Scalar::random(rng);
        let pub_key = &private_key * RISTRETTO_BASEPOINT_TABLE;
        let pub_key_squared = pub_key * private_key;
        Self { private_key, pub_key, pub_key_squared }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.pub_key.compress().to_bytes()
    }

    /// Blind both candidate messages against the receiver's reply point,
    /// so only the chosen one decrypts on the other side.
    pub fn send(&self, receiver_point: &[u8; 32], messages: [Block; 2]) -> Result<[Block; 2]> {
        let upstream = decompress(receiver_point)?;
        let my_pub_key_bytes = self.public_key();

        let key0 = blind_key(&my_pub_key_bytes, &(upstream * self.private_key).compress().to_bytes());
        let key1 = blind_key(&my_pub_key_bytes, &((upstream * self.private_key) - self.pub_key_squared).compress().to_bytes());

        Ok([messages[0].xor(key0), messages[1].xor(key1)])
    }
}

impl Drop for BaseOtSender {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl BaseOtReceiver {
    /// Build the receiver's reply point for `choice`, and the state
    /// needed to finish the exchange once the sender answers.
    pub fn new(rng: &mut (impl RngCore + CryptoRng), sender_point: &[u8; 32], choice: bool) -> Result<(Self, [u8; 32])> {
        let upstream_pub_key = decompress(sender_point)?;
        let private_key = Scalar::random(rng);
        let my_pub_key = &private_key * RISTRETTO_BASEPOINT_TABLE;

        let chosen_pub_key = if choice { upstream_pub_key + my_pub_key } else { my_pub_key };
        let reply = chosen_pub_key.compress().to_bytes();
        Ok((Self { private_key, upstream_pub_key, choice }, reply))
    }

    pub fn derive(&self, blinded: [Block; 2]) -> Block {
        let key = blind_key(
            &self.upstream_pub_key.compress().to_bytes(),
            &(self.upstream_pub_key * self.private_key).compress().to_bytes(),
        );
        blinded[self.choice as usize].xor(key)
    }
}

impl Drop for BaseOtReceiver {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

fn decompress(bytes: &[u8; 32]) -> Result<RistrettoPoint> {
    curve25519_dalek::ristretto::CompressedRistretto(*bytes)
        .decompress()
        .ok_or_else(|| Error::curve_error("BaseOt", "received point does not decompress to a Ristretto element"))
}

fn blind_key(a: &[u8; 32], b: &[u8; 32]) -> Block {
    let mut hasher = blake3::Hasher::new();
    hasher.update(a);
    hasher.update(b);
    let hash = hasher.finalize();
    Block(hash.as_bytes()[..16].try_into().unwrap())
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn recovers_only_the_chosen_message() {
        let mut rng = thread_rng();
        for choice in [false, true] {
            let messages = [Block::from_counter(10), Block::from_counter(20)];

            let sender = BaseOtSender::new(&mut rng);
            let (receiver, reply) = BaseOtReceiver::new(&mut rng, &sender.public_key(), choice).unwrap();
            let blinded = sender.send(&reply, messages).unwrap();
            let recovered = receiver.derive(blinded);

            assert_eq!(recovered, messages[choice as usize]);
            assert_ne!(recovered, messages[!choice as usize]);
        }
    }

    #[test]
    fn rejects_garbage_point() {
        let mut rng = thread_rng();
        let sender = BaseOtSender::new(&mut rng);
        assert!(sender.send(&[0xffu8; 32], [Block::ZERO, Block::ZERO]).is_err());
    }
}
