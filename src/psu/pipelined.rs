//! Pipelined mode (§4.E.2): the `Fk2_Y`/`Fk1_X` exchange interleaves
//! compute and I/O element-at-a-time instead of collecting a full
//! vector before the first byte goes out. `|X|` and `|Y|` need not
//! agree, so each stream carries its own length prefix. The membership
//! structure and the OT sub-protocol are inherently batch operations
//! (a filter needs every element before it can be built; the OT
//! extension's correction matrix is sized once) and stay that way here,
//! exactly as in `dh-psu.hpp`'s `PipelineSender`/`PipelineReceiver`.
//! Unlike batched mode, both parties call the one-sided OT entry point.

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

#[tracing::instrument(skip_all, fields(mode = "pipelined", x_len = x.len()))]
pub fn sender(
    channel: &mut impl Channel,
    pp: &Pp,
    hctx: &HashContext,
    rng: &mut DeterministicRng,
    x: &[Block],
    ot_setup: &ot::SenderSetup,
) -> Result<()> {
    let k1 = Scalar::random(rng);

    let n_y = channel.receive_integer()? as usize;
    let mut fk1k2_y = Vec::with_capacity(n_y);
    for _ in 0..n_y {
        let fk2_y_i = channel.receive_point()?;
        fk1k2_y.push(fk2_y_i.mul(&k1));
    }

    channel.send_integer(x.len() as u64)?;
    for &xi in x {
        channel.send_point(&hctx.block_to_ec_point(xi).mul(&k1))?;
    }

    common::send_membership_structure(channel, pp, rng, &mut fk1k2_y)?;
    drop(k1);

    ot::onesided_sender_transfer(channel, ot_setup, x)
}

#[tracing::instrument(skip_all, fields(mode = "pipelined", y_len = y.len()))]
pub fn receiver(
    channel: &mut impl Channel,
    pp: &Pp,
    hctx: &HashContext,
    rng: &mut DeterministicRng,
    y: &[Block],
    ot_setup: &ot::ReceiverSetup,
) -> Result<HashSet<String>> {
    let k2 = Scalar::random(rng);

    channel.send_integer(y.len() as u64)?;
    for &yi in y {
        channel.send_point(&hctx.block_to_ec_point(yi).mul(&k2))?;
    }

    let n_x = channel.receive_integer()? as usize;
    let mut fk2k1_x = Vec::with_capacity(n_x);
    for _ in 0..n_x {
        let fk1_x_i = channel.receive_point()?;
        fk2k1_x.push(fk1_x_i.mul(&k2));
    }

    let membership = common::receive_membership_structure(channel, pp)?;
    let choices = common::choice_bits(&fk2k1_x, |p| membership.contains(p));
    drop(k2);

    let recovered = ot::onesided_receiver_transfer(channel, ot_setup, &choices)?;

    Ok(common::union(y, &recovered))
}
