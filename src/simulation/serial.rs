//! Serial (single-thread) simulation.
use super::{EpisodeConfig, EpisodeEnd, EpisodeResult, SimulationError};
use crate::controllers::Actor;
use crate::envs::{Environment, Indexed, Successor};
use crate::logging::{Event, Loggable, Logger};
use std::thread;

/// Run one episode of an actor in an environment.
///
/// Resets the environment and the actor then steps until the environment ends the episode
/// or `config.max_steps` steps have been taken.
///
/// # Args
/// * `environment` - The environment to simulate.
/// * `actor` - Chooses the action on each step.
/// * `config` - Step budget and pacing.
/// * `logger` - Logs step actions and rewards and the episode outcome.
///
/// # Errors
/// Fails on an invalid `config` or on the first environment error.
/// Environment errors are returned unchanged and end the episode.
pub fn run_episode<E, A, L>(
    environment: &mut E,
    actor: &mut A,
    config: &EpisodeConfig,
    logger: &mut L,
) -> Result<EpisodeResult, SimulationError<E::Error>>
where
    E: Environment + ?Sized,
    E::Action: Indexed,
    A: Actor<E::Observation, E::Action> + ?Sized,
    L: Logger + ?Sized,
{
    config.validate()?;

    actor.reset();
    let mut observation = environment
        .reset()
        .map_err(SimulationError::Environment)?;
    let mut total_reward = 0.0;
    let mut steps = 0;

    let end = loop {
        if steps >= config.max_steps {
            break EpisodeEnd::StepBudget;
        }
        if let Some(period) = config.pacing {
            thread::sleep(period);
        }

        let action = actor.act(&observation);
        let (successor, reward) = environment
            .step(&action)
            .map_err(SimulationError::Environment)?;
        steps += 1;
        total_reward += reward;

        logger.log_or_skip(
            Event::Step,
            "action",
            Loggable::IndexSample {
                value: action.as_index(),
                size: <E::Action as Indexed>::SIZE,
            },
        );
        logger.log_or_skip(Event::Step, "reward", reward.into());
        logger.done(Event::Step);

        match successor {
            Successor::Continue(next_observation) => observation = next_observation,
            Successor::Terminate => break EpisodeEnd::Terminated,
            Successor::Interrupt(_) => break EpisodeEnd::Truncated,
        }
    };

    #[allow(clippy::cast_precision_loss)]
    let steps_value = steps as f64;
    logger.log_or_skip(Event::Episode, "reward", total_reward.into());
    logger.log_or_skip(Event::Episode, "steps", steps_value.into());
    logger.done(Event::Episode);

    Ok(EpisodeResult {
        total_reward,
        steps,
        end,
    })
}

/// Run several episodes in sequence then close the environment.
///
/// The actor is reset at the start of every episode so no per-episode state
/// (such as a PID integral) carries over.
/// The environment is closed even if an episode fails.
pub fn run_episodes<E, A, L>(
    environment: &mut E,
    actor: &mut A,
    config: &EpisodeConfig,
    num_episodes: usize,
    logger: &mut L,
) -> Result<Vec<EpisodeResult>, SimulationError<E::Error>>
where
    E: Environment + ?Sized,
    E::Action: Indexed,
    A: Actor<E::Observation, E::Action> + ?Sized,
    L: Logger + ?Sized,
{
    let mut results = Vec::with_capacity(num_episodes);
    let mut outcome = Ok(());
    for _ in 0..num_episodes {
        match run_episode(environment, actor, config, logger) {
            Ok(result) => results.push(result),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }
    environment.close();
    outcome.map(|()| results)
}
