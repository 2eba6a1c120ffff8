use super::EpisodeResult;
use std::fmt;
use std::iter::FromIterator;

/// Basic summary statistics of simulated episodes.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct EpisodesSummary {
    pub num_episodes: u64,
    pub num_steps: u64,
    pub total_reward: f64,
}

impl EpisodesSummary {
    pub fn update(&mut self, episode: &EpisodeResult) {
        self.num_episodes += 1;
        self.num_steps += episode.steps;
        self.total_reward += episode.total_reward;
    }

    /// Mean total reward per episode. `None` if there are no episodes.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self) -> Option<f64> {
        if self.num_episodes == 0 {
            None
        } else {
            Some(self.total_reward / self.num_episodes as f64)
        }
    }

    /// Mean number of steps per episode. `None` if there are no episodes.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_steps(&self) -> Option<f64> {
        if self.num_episodes == 0 {
            None
        } else {
            Some(self.num_steps as f64 / self.num_episodes as f64)
        }
    }
}

impl fmt::Display for EpisodesSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "num_episodes:   {}", self.num_episodes)?;
        writeln!(f, "num_steps:      {}", self.num_steps)?;
        match (self.mean_reward(), self.mean_steps()) {
            (Some(reward), Some(steps)) => {
                writeln!(
                    f,
                    "average reward over {} episodes = {:.2}",
                    self.num_episodes, reward
                )?;
                writeln!(f, "ep_reward_mean: {:.2}", reward)?;
                writeln!(f, "ep_length_mean: {:.2}", steps)?;
            }
            _ => writeln!(f, "no episodes")?,
        }
        Ok(())
    }
}

impl<'a> Extend<&'a EpisodeResult> for EpisodesSummary {
    fn extend<I: IntoIterator<Item = &'a EpisodeResult>>(&mut self, episodes: I) {
        for episode in episodes {
            self.update(episode)
        }
    }
}

impl FromIterator<EpisodeResult> for EpisodesSummary {
    fn from_iter<I>(episodes: I) -> Self
    where
        I: IntoIterator<Item = EpisodeResult>,
    {
        episodes.into_iter().fold(Self::default(), |mut s, episode| {
            s.update(&episode);
            s
        })
    }
}

impl<'a> FromIterator<&'a EpisodeResult> for EpisodesSummary {
    fn from_iter<I>(episodes: I) -> Self
    where
        I: IntoIterator<Item = &'a EpisodeResult>,
    {
        let mut summary = Self::default();
        summary.extend(episodes);
        summary
    }
}
