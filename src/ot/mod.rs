//! Component D: oblivious transfer. [`base`] is a handful of OTs run
//! directly; [`iknp`] extends those into as many OTs as the protocol
//! needs via the classic IKNP construction, in both its plain and
//! one-sided forms (§4.D). Malicious security is out of scope (§1):
//! both parties are assumed semi-honest.
//!
//! The functions below drive the extension's "own wire format" (§6)
//! over a [`crate::net::Channel`]: the receiver sends its correction
//! matrix, the sender answers with ciphertexts.

pub mod base;
pub mod iknp;

pub use iknp::{setup, ExtendMessage, ReceiverKeys, ReceiverSetup, SenderKeys, SenderSetup, CSP};

use crate::{block::Block, error::Result, net::Channel};

/// `Send`: the OT-extension sender's half of a plain two-message
/// transfer. Blocks on receiving the correction matrix first.
pub fn sender_transfer(channel: &mut impl Channel, setup: &SenderSetup, messages: &[(Block, Block)]) -> Result<()> {
    let extend_msg = ExtendMessage { u: channel.receive_block_matrix()? };
    let keys = setup.extend(&extend_msg, messages.len());
    channel.send_block_pairs(&keys.send(messages))
}

/// `Receive`: the OT-extension receiver's half of a plain two-message
/// transfer.
pub fn receiver_transfer(channel: &mut impl Channel, setup: &ReceiverSetup, choices: &[bool]) -> Result<Vec<Block>> {
    let (keys, extend_msg) = setup.extend(choices);
    channel.send_block_matrix(&extend_msg.u)?;
    let ciphertexts = channel.receive_block_pairs()?;
    Ok(keys.receive(&ciphertexts))
}

/// `OnesidedSend`: only the choice-`1` ciphertext crosses the wire.
pub fn onesided_sender_transfer(channel: &mut impl Channel, setup: &SenderSetup, messages_for_one: &[Block]) -> Result<()> {
    let extend_msg = ExtendMessage { u: channel.receive_block_matrix()? };
    let keys = setup.extend(&extend_msg, messages_for_one.len());
    channel.send_blocks(&keys.onesided_send(messages_for_one))
}

/// `OnesidedReceive`: recovers `m[i]` where `choices[i]`, else `Block::ZERO`.
pub fn onesided_receiver_transfer(channel: &mut impl Channel, setup: &ReceiverSetup, choices: &[bool]) -> Result<Vec<Block>> {
    let (keys, extend_msg) = setup.extend(choices);
    channel.send_block_matrix(&extend_msg.u)?;
    let ciphertexts = channel.receive_blocks()?;
    Ok(keys.onesided_receive(&ciphertexts))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::net::DuplexChannel;
    use rand::thread_rng;
    use std::thread;

    #[test]
    fn onesided_transfer_over_duplex_channel_matches_choices() {
        let mut rng = thread_rng();
        let (sender_setup, receiver_setup) = setup(&mut rng).unwrap();
        let (mut sender_channel, mut receiver_channel) = DuplexChannel::pair();

        let count = 200;
        let choices: Vec<bool> = (0..count).map(|i| i % 3 == 0).collect();
        let messages: Vec<Block> = (0..count).map(|i| Block::from_counter(i as u64)).collect();

        let sender_messages = messages.clone();
        let sender_thread =
            thread::spawn(move || onesided_sender_transfer(&mut sender_channel, &sender_setup, &sender_messages));
        let recovered = onesided_receiver_transfer(&mut receiver_channel, &receiver_setup, &choices).unwrap();
        sender_thread.join().unwrap().unwrap();

        for i in 0..count {
            let expected = if choices[i] { messages[i] } else { Block::ZERO };
            assert_eq!(recovered[i], expected);
        }
    }
}
