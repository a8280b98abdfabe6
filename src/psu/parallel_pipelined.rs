//! Parallel-pipelined mode (§4.E.2): the same vector-at-once data flow
//! as [`super::batched`], but every hash-then-scale and scale step runs
//! bulk-parallel across threads (§5: "all curve calls on that path must
//! be the thread-safe variants"), and — like [`super::pipelined`] — the
//! OT sub-protocol is entered through its one-sided form, matching
//! `dh-psu.hpp`'s `ParallelPipelineSender`/`ParallelPipelineReceiver`.

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

#[tracing::instrument(skip_all, fields(mode = "parallel_pipelined", x_len = x.len()))]
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

    let fk1_x = common::hash_and_scale_parallel(hctx, x, &k1);
    channel.send_points(&fk1_x)?;

    let mut fk1k2_y = common::scale_parallel(&fk2_y, &k1);
    drop(k1);
    common::send_membership_structure(channel, pp, rng, &mut fk1k2_y)?;

    ot::onesided_sender_transfer(channel, ot_setup, x)
}

#[tracing::instrument(skip_all, fields(mode = "parallel_pipelined", y_len = y.len()))]
pub fn receiver(
    channel: &mut impl Channel,
    pp: &Pp,
    hctx: &HashContext,
    rng: &mut DeterministicRng,
    y: &[Block],
    ot_setup: &ot::ReceiverSetup,
) -> Result<HashSet<String>> {
    let k2 = Scalar::random(rng);

    let fk2_y = common::hash_and_scale_parallel(hctx, y, &k2);
    channel.send_points(&fk2_y)?;

    let fk1_x = channel.receive_points()?;
    let membership = common::receive_membership_structure(channel, pp)?;

    let fk2k1_x = common::scale_parallel(&fk1_x, &k2);
    let choices = common::choice_bits(&fk2k1_x, |p| membership.contains(p));
    drop(k2);

    let recovered = ot::onesided_receiver_transfer(channel, ot_setup, &choices)?;

    Ok(common::union(y, &recovered))
}
