//! Sampling kernel: the propose / evaluate / accept loop.

use std::collections::BTreeMap;

use mpp_core::{ErrorNode, MppError, RngHandle};
use mpp_image::ChannelStack;
use mpp_model::{Configuration, SceneExtent};
use serde::{Deserialize, Serialize};

use crate::cache::FeatureCache;
use crate::config::RunConfig;
use crate::determinism;
use crate::energy::EnergyScheme;
use crate::metrics::{EnergySummary, MetricSample, MetricsRecorder};
use crate::moves::{ensure_sound, MoveKind, MoveProposal};
use crate::moves_spatial;
use crate::moves_structural;

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Acceptance rates per move kind.
    pub acceptance_rates: BTreeMap<String, f64>,
    /// Lowest energy observed across all chains.
    pub best_energy: f64,
    /// Configuration attaining the lowest energy.
    pub best_configuration: Configuration,
    /// Final energy of each chain.
    pub chain_energies: Vec<f64>,
    /// Counts of ordinary rejections, keyed by `kind:reason`.
    pub rejection_counts: BTreeMap<String, usize>,
    /// Aggregate statistics over the recorded samples.
    pub energy_summary: EnergySummary,
    /// Samples collected after burn-in (useful for tests and diagnostics).
    pub samples: Vec<MetricSample>,
    /// Flattened per-chain diagnostic trees, when requested.
    pub diagnostics: Option<String>,
}

/// Internal state tracked per chain.
struct ChainState {
    configuration: Configuration,
    energy: f64,
    accepted: BTreeMap<MoveKind, usize>,
    proposed: BTreeMap<MoveKind, usize>,
    trace: ErrorNode,
}

impl ChainState {
    fn new(chain_index: usize, configuration: Configuration, energy: f64) -> Self {
        Self {
            configuration,
            energy,
            accepted: BTreeMap::new(),
            proposed: BTreeMap::new(),
            trace: ErrorNode::root(format!("chain {chain_index}")),
        }
    }

    fn record(&mut self, kind: MoveKind, accepted: bool) {
        *self.proposed.entry(kind).or_insert(0) += 1;
        if accepted {
            *self.accepted.entry(kind).or_insert(0) += 1;
        }
    }
}

/// Runs the sampler over independent chains seeded from one master seed.
///
/// The seed is an explicit parameter rather than read from
/// `config.seed_policy` so callers can launch replicates without editing the
/// configuration; pass `config.seed_policy.master_seed` for the canonical
/// run. Ordinary rejections and recoverable feature errors never abort the
/// run; an abnormal proposal failure does, leaving no partial summary
/// behind.
pub fn run(
    config: &RunConfig,
    seed: u64,
    scheme: &EnergyScheme,
    stack: &ChannelStack,
    initial: &Configuration,
) -> Result<RunSummary, MppError> {
    ensure_sound(initial)?;
    let dims = stack.dimensions();
    let scene = SceneExtent::from_voxel_dims(dims.width, dims.height, dims.depth);
    let cache = FeatureCache::new();

    let mut chains = Vec::new();
    for chain_index in 0..config.chains.max(1) {
        let configuration = initial.duplicate();
        let energy = scheme.total_energy(&configuration, stack, &cache)?;
        chains.push(ChainState::new(chain_index, configuration, energy));
    }

    let mut best_energy = chains[0].energy;
    let mut best_configuration = chains[0].configuration.duplicate();
    let mut rejection_counts = BTreeMap::new();
    let mut recorder = MetricsRecorder::new();

    for sweep in 0..config.sweeps {
        for (chain_index, chain) in chains.iter_mut().enumerate() {
            let chain_root = determinism::chain_seed(seed, chain_index);
            perform_sweep(
                config,
                chain_root,
                sweep,
                chain,
                scheme,
                stack,
                &scene,
                &cache,
                &mut rejection_counts,
            )?;
            if chain.energy < best_energy {
                best_energy = chain.energy;
                best_configuration = chain.configuration.duplicate();
            }
        }
        record_samples(config, sweep, &chains, &mut recorder);
    }

    let diagnostics = config.diagnostics.then(|| {
        chains
            .iter()
            .map(|chain| chain.trace.flatten())
            .collect::<Vec<_>>()
            .join("")
    });

    Ok(RunSummary {
        acceptance_rates: aggregate_acceptance(&chains),
        best_energy,
        best_configuration,
        chain_energies: chains.iter().map(|chain| chain.energy).collect(),
        rejection_counts,
        energy_summary: recorder.summary(),
        samples: recorder.samples().to_vec(),
        diagnostics,
    })
}

/// Executes every configured proposal of one sweep for one chain.
#[allow(clippy::too_many_arguments)]
fn perform_sweep(
    config: &RunConfig,
    chain_root: u64,
    sweep: usize,
    chain: &mut ChainState,
    scheme: &EnergyScheme,
    stack: &ChannelStack,
    scene: &SceneExtent,
    cache: &FeatureCache,
    rejection_counts: &mut BTreeMap<String, usize>,
) -> Result<(), MppError> {
    let counts = &config.move_counts;
    let mut slot = 0usize;
    for _ in 0..counts.births {
        attempt_move(config, chain_root, sweep, slot, MoveKind::Birth, chain, scheme, stack, scene, cache, rejection_counts)?;
        slot += 1;
    }
    for _ in 0..counts.deaths {
        attempt_move(config, chain_root, sweep, slot, MoveKind::Death, chain, scheme, stack, scene, cache, rejection_counts)?;
        slot += 1;
    }
    for _ in 0..counts.shifts {
        attempt_move(config, chain_root, sweep, slot, MoveKind::Shift, chain, scheme, stack, scene, cache, rejection_counts)?;
        slot += 1;
    }
    for _ in 0..counts.reshapes {
        attempt_move(config, chain_root, sweep, slot, MoveKind::Reshape, chain, scheme, stack, scene, cache, rejection_counts)?;
        slot += 1;
    }
    Ok(())
}

/// One proposal attempt: propose, evaluate the energy delta through the
/// cache, and apply the Metropolis acceptance rule.
#[allow(clippy::too_many_arguments)]
fn attempt_move(
    config: &RunConfig,
    chain_root: u64,
    sweep: usize,
    slot: usize,
    kind: MoveKind,
    chain: &mut ChainState,
    scheme: &EnergyScheme,
    stack: &ChannelStack,
    scene: &SceneExtent,
    cache: &FeatureCache,
    rejection_counts: &mut BTreeMap<String, usize>,
) -> Result<(), MppError> {
    let mut rng = RngHandle::from_seed(determinism::move_seed(chain_root, sweep, slot));
    let outcome = propose(kind, &chain.configuration, scene, config, &mut rng, &mut chain.trace)?;

    let proposal = match outcome {
        Some(proposal) => proposal,
        None => {
            chain.record(kind, false);
            count_rejection(rejection_counts, kind, "geometry");
            return Ok(());
        }
    };

    let delta = match scheme.energy_delta(
        &chain.configuration,
        &proposal.candidate,
        proposal.touched,
        stack,
        cache,
    ) {
        Ok(delta) => delta,
        Err(err) if err.is_recoverable() => {
            chain
                .trace
                .push_for_mark("energy evaluation failed", proposal.touched)
                .push_cause(&err);
            chain.record(kind, false);
            count_rejection(rejection_counts, kind, "feature-error");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let acceptance = (-delta / config.temperature.max(1e-9)).exp().min(1.0);
    let accepted = rng.uniform_f64() < acceptance;
    chain.record(kind, accepted);
    if accepted {
        chain.configuration = proposal.candidate;
        chain.energy += delta;
    } else {
        count_rejection(rejection_counts, kind, "metropolis");
    }
    Ok(())
}

fn propose(
    kind: MoveKind,
    configuration: &Configuration,
    scene: &SceneExtent,
    config: &RunConfig,
    rng: &mut RngHandle,
    trace: &mut ErrorNode,
) -> Result<Option<MoveProposal>, MppError> {
    match kind {
        MoveKind::Birth => {
            moves_structural::propose_birth(configuration, scene, &config.proposal, rng, trace)
        }
        MoveKind::Death => moves_structural::propose_death(configuration, rng, trace),
        MoveKind::Shift => moves_spatial::propose_shift(configuration, scene, rng, trace),
        MoveKind::Reshape => {
            moves_spatial::propose_reshape(configuration, scene, &config.proposal, rng, trace)
        }
    }
}

fn count_rejection(counts: &mut BTreeMap<String, usize>, kind: MoveKind, reason: &str) {
    *counts.entry(format!("{}:{reason}", kind.as_str())).or_insert(0) += 1;
}

fn record_samples(
    config: &RunConfig,
    sweep: usize,
    chains: &[ChainState],
    recorder: &mut MetricsRecorder,
) {
    if sweep < config.burn_in {
        return;
    }
    if ((sweep - config.burn_in) % config.thinning.max(1)) != 0 {
        return;
    }
    for (chain_index, chain) in chains.iter().enumerate() {
        recorder.push_sample(
            MetricSample {
                sweep,
                chain: chain_index,
                energy: chain.energy,
                mark_count: chain.configuration.len(),
            },
            &chain.configuration,
        );
    }
}

fn aggregate_acceptance(chains: &[ChainState]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::<MoveKind, (usize, usize)>::new();
    for chain in chains {
        for (kind, proposed) in &chain.proposed {
            let entry = totals.entry(*kind).or_insert((0, 0));
            entry.0 += *proposed;
        }
        for (kind, accepted) in &chain.accepted {
            let entry = totals.entry(*kind).or_insert((0, 0));
            entry.1 += *accepted;
        }
    }
    totals
        .into_iter()
        .map(|(kind, (proposed, accepted))| {
            let rate = if proposed == 0 {
                0.0
            } else {
                accepted as f64 / proposed as f64
            };
            (kind.as_str().to_string(), rate)
        })
        .collect()
}
