mod config;
use crate::{CatchAct, CatchObs, FRAME_SIZE};
use a2c_core::{record::Record, Env, Step};
use anyhow::{bail, ensure, Result};
pub use config::CatchEnvConfig;
use log::trace;

/// Catch environment.
///
/// Steps after the end of an episode fail until the environment is reset, as do steps
/// with [`CatchAct::Invalid`].
pub struct CatchEnv {
    n_rows: usize,
    n_cols: usize,
    rng: fastrand::Rng,
    seed: u64,
    ball: (usize, usize),
    paddle: usize,
    is_done: bool,
}

impl CatchEnv {
    fn render(&self) -> CatchObs {
        let (h, w) = (FRAME_SIZE / self.n_rows, FRAME_SIZE / self.n_cols);
        let mut frame = vec![0u8; FRAME_SIZE * FRAME_SIZE];
        let mut fill = |row: usize, col: usize| {
            for y in row * h..(row + 1) * h {
                frame[y * FRAME_SIZE + col * w..y * FRAME_SIZE + (col + 1) * w].fill(255);
            }
        };

        fill(self.ball.0, self.ball.1);
        fill(self.n_rows - 1, self.paddle);

        CatchObs::new(frame)
    }

    fn init(&mut self) -> CatchObs {
        self.ball = (0, self.rng.usize(..self.n_cols));
        self.paddle = self.n_cols / 2;
        self.is_done = false;
        self.render()
    }

    /// Returns the position of the ball as `(row, column)`.
    pub fn ball(&self) -> (usize, usize) {
        self.ball
    }

    /// Returns the column of the paddle.
    pub fn paddle(&self) -> usize {
        self.paddle
    }
}

impl Env for CatchEnv {
    type Config = CatchEnvConfig;
    type Obs = CatchObs;
    type Act = CatchAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let (n_rows, n_cols) = (config.n_rows, config.n_cols);
        ensure!(
            n_rows >= 2 && n_cols >= 1,
            "The grid must have at least 2 rows and 1 column"
        );
        ensure!(
            FRAME_SIZE % n_rows == 0 && FRAME_SIZE % n_cols == 0,
            "The grid {}x{} does not divide the frame size {}",
            n_rows,
            n_cols,
            FRAME_SIZE
        );

        let seed = seed as u64;
        Ok(Self {
            n_rows,
            n_cols,
            rng: fastrand::Rng::with_seed(seed),
            seed,
            ball: (0, 0),
            paddle: n_cols / 2,
            is_done: true,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if self.is_done {
            bail!("Step after the end of an episode");
        }
        let dx = match a.dx() {
            Some(dx) => dx,
            None => bail!("Invalid action {:?}", a),
        };

        self.paddle = (self.paddle as isize + dx).clamp(0, self.n_cols as isize - 1) as usize;
        self.ball.0 += 1;

        let is_terminated = self.ball.0 == self.n_rows - 1;
        let reward = match is_terminated {
            false => 0.0,
            true if self.ball.1 == self.paddle => 1.0,
            true => -1.0,
        };
        self.is_done = is_terminated;
        trace!("ball = {:?}, paddle = {}", self.ball, self.paddle);

        let step = Step::new(self.render(), *a, reward, is_terminated, false, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        Ok(self.init())
    }

    /// Resets the environment with the ball column determined by `ix` and the seed.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.rng = fastrand::Rng::with_seed(self.seed.wrapping_add(ix as u64));
        Ok(self.init())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Result<CatchEnv> {
        let _ = env_logger::builder().is_test(true).try_init();
        CatchEnv::build(&CatchEnvConfig::default(), 0)
    }

    #[test]
    fn test_render() -> Result<()> {
        let mut env = env()?;
        let obs = env.reset()?;
        let (row, col) = env.ball();
        assert_eq!(row, 0);

        // 7x7 pixels per cell
        assert_eq!(obs.pixel(0, col * 7), 255);
        assert_eq!(obs.pixel(6, col * 7 + 6), 255);
        assert_eq!(obs.pixel(83, env.paddle() * 7 + 3), 255);
        assert_eq!(obs.frame().iter().filter(|&&p| p == 255).count(), 2 * 49);
        Ok(())
    }

    #[test]
    fn test_episode_length_and_reward() -> Result<()> {
        let mut env = env()?;
        for _ in 0..10 {
            env.reset()?;
            let mut n_steps = 0;
            loop {
                // Follow the ball
                let a = match env.ball().1.cmp(&env.paddle()) {
                    std::cmp::Ordering::Less => CatchAct::Left,
                    std::cmp::Ordering::Equal => CatchAct::Stay,
                    std::cmp::Ordering::Greater => CatchAct::Right,
                };
                let (step, _) = env.step(&a)?;
                n_steps += 1;
                if step.is_done() {
                    assert_eq!(step.reward, 1.0);
                    break;
                }
                assert_eq!(step.reward, 0.0);
            }
            assert_eq!(n_steps, 11);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_steps() -> Result<()> {
        let mut env = env()?;
        assert!(env.step(&CatchAct::Stay).is_err());

        env.reset()?;
        assert!(env.step(&CatchAct::from(3)).is_err());
        assert!(env.step(&CatchAct::Stay).is_ok());
        Ok(())
    }

    #[test]
    fn test_reset_with_index() -> Result<()> {
        let mut env1 = env()?;
        let mut env2 = env()?;
        for ix in 0..5 {
            assert_eq!(env1.reset_with_index(ix)?, env2.reset_with_index(ix)?);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_grid() {
        let config = CatchEnvConfig::default().n_rows(10);
        assert!(CatchEnv::build(&config, 0).is_err());
    }
}
