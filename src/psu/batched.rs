//! Batched mode (§4.E.2): every message kind crosses the wire exactly
//! once, as a vector. Mirrors `dh-psu.hpp`'s batched `Sender`/`Receiver`,
//! which calls `IKNPOTE::Send` directly rather than the one-sided entry
//! point — message `0` of every pair is still [`Block::ZERO`], so the
//! result is identical to the one-sided variant pipelined/parallel-
//! pipelined mode uses, but the OT call itself differs (§4.D).

use crate::{
    block::Block,
    curve::Scalar,
    error::Result,
    hash_to_curve::HashContext,
    net::Channel,
    ot,
    psu::{common, Pp},
    rng::DeterministicRng,
};
use std::collections::HashSet;

/// The Sender's role: §4.E.3's schedule (draw k1, receive `Fk2_Y`, send
/// `Fk1_X`, send the membership structure, answer the OT).
#[tracing::instrument(skip_all, fields(mode = "batched", x_len = x.len()))]
pub fn sender(
    channel: &mut impl Channel,
    pp: &Pp,
    hctx: &HashContext,
    rng: &mut DeterministicRng,
    x: &[Block],
    ot_setup: &ot::SenderSetup,
) -> Result<()> {
    let k1 = Scalar::random(rng);

    let fk2_y = channel.receive_points()?;
    tracing::debug!(y_len = fk2_y.len(), "received Fk2_Y");

    let fk1_x = common::hash_and_scale(hctx, x, &k1);
    channel.send_points(&fk1_x)?;

    let mut fk1k2_y = common::scale(&fk2_y, &k1);
    drop(k1);
    common::send_membership_structure(channel, pp, rng, &mut fk1k2_y)?;

    let messages: Vec<(Block, Block)> = x.iter().map(|&xi| (Block::ZERO, xi)).collect();
    let result = ot::sender_transfer(channel, ot_setup, &messages);
    tracing::info!("batched sender run complete");
    result
}

/// The Receiver's role: draw k2, send `Fk2_Y`, receive `Fk1_X` and the
/// membership structure, test membership, run OT, assemble `U`.
#[tracing::instrument(skip_all, fields(mode = "batched", y_len = y.len()))]
pub fn receiver(
    channel: &mut impl Channel,
    pp: &Pp,
    hctx: &HashContext,
    rng: &mut DeterministicRng,
    y: &[Block],
    ot_setup: &ot::ReceiverSetup,
) -> Result<HashSet<String>> {
    let k2 = Scalar::random(rng);

    let fk2_y = common::hash_and_scale(hctx, y, &k2);
    channel.send_points(&fk2_y)?;

    let fk1_x = channel.receive_points()?;
    let membership = common::receive_membership_structure(channel, pp)?;

    let fk2k1_x = common::scale(&fk1_x, &k2);
    let choices = common::choice_bits(&fk2k1_x, |p| membership.contains(p));
    let needed: usize = choices.iter().filter(|&&c| c).count();
    tracing::debug!(needed, "choice bits computed, entering OT");
    drop(k2);

    let recovered = ot::receiver_transfer(channel, ot_setup, &choices)?;

    let union = common::union(y, &recovered);
    tracing::info!(union_len = union.len(), "batched receiver run complete");
    Ok(union)
}
