//! Captcha solving capabilities.
//!
//! The workflow never decides how a captcha gets solved; it asks whatever
//! [`CaptchaSolver`] it was configured with.

use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::captcha::CaptchaChallenge;
use crate::config::SolverConfig;
use crate::types::{PortalError, PortalResult};

/// Turns a challenge image into the text to submit.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    async fn solve(&self, challenge: &CaptchaChallenge) -> PortalResult<String>;
}

/// Solver backed by a caller-supplied function.
pub struct FnSolver<F> {
    func: F,
}

impl<F> FnSolver<F>
where
    F: Fn(&DynamicImage) -> String + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> CaptchaSolver for FnSolver<F>
where
    F: Fn(&DynamicImage) -> String + Send + Sync,
{
    async fn solve(&self, challenge: &CaptchaChallenge) -> PortalResult<String> {
        Ok((self.func)(challenge.image()))
    }
}

/// Solver that always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedSolver {
    answer: String,
}

impl FixedSolver {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

#[async_trait]
impl CaptchaSolver for FixedSolver {
    async fn solve(&self, _challenge: &CaptchaChallenge) -> PortalResult<String> {
        Ok(self.answer.clone())
    }
}

/// Saves the image to disk and waits for someone to type the answer.
///
/// Blocks until a line is entered; there is no timeout.
#[derive(Debug, Clone)]
pub struct ConsoleSolver {
    image_path: PathBuf,
}

impl ConsoleSolver {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }
}

#[async_trait]
impl CaptchaSolver for ConsoleSolver {
    async fn solve(&self, challenge: &CaptchaChallenge) -> PortalResult<String> {
        challenge.save(&self.image_path)?;
        eprintln!("Captcha image saved as '{}'", self.image_path.display());

        let answer = tokio::task::spawn_blocking(prompt_solution)
            .await
            .map_err(|e| PortalError::Solver(format!("prompt task failed: {e}")))??;

        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(PortalError::Solver("empty captcha solution".to_string()));
        }
        Ok(answer)
    }
}

fn prompt_solution() -> PortalResult<String> {
    let mut rl = DefaultEditor::new().map_err(|e| PortalError::Solver(e.to_string()))?;
    match rl.readline("Please enter the captcha solution: ") {
        Ok(line) => Ok(line),
        Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
            Err(PortalError::Solver("captcha prompt closed".to_string()))
        }
        Err(e) => Err(PortalError::Solver(e.to_string())),
    }
}

/// Build the solver selected by configuration.
pub fn build_solver(config: &SolverConfig, image_path: impl Into<PathBuf>) -> Box<dyn CaptchaSolver> {
    match config {
        SolverConfig::Console => Box::new(ConsoleSolver::new(image_path)),
        SolverConfig::Fixed(answer) => Box::new(FixedSolver::new(answer.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::GenericImageView;

    fn challenge() -> CaptchaChallenge {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(60, 20)
            .write_with_encoder(PngEncoder::new(&mut buf))
            .unwrap();
        CaptchaChallenge::decode(1, 1, buf, Some("tok".into())).unwrap()
    }

    #[tokio::test]
    async fn test_fixed_solver() {
        let solver = FixedSolver::new("AB12");
        assert_eq!(solver.solve(&challenge()).await.unwrap(), "AB12");
    }

    #[tokio::test]
    async fn test_fn_solver_sees_image() {
        let solver = FnSolver::new(|img: &DynamicImage| {
            let (w, h) = img.dimensions();
            format!("{w}x{h}")
        });
        assert_eq!(solver.solve(&challenge()).await.unwrap(), "60x20");
    }

    #[tokio::test]
    async fn test_build_fixed_solver() {
        let solver = build_solver(&SolverConfig::Fixed("XY99".into()), "unused.png");
        assert_eq!(solver.solve(&challenge()).await.unwrap(), "XY99");
    }
}
