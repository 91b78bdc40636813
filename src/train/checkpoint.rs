pub use super::*;
pub use burn::record::CompactRecorder;

use std::{fs, path::Path};

impl<AB, G, D> ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    /// Persists both networks under the model directory as
    /// `{iteration}-G` and `{iteration}-D` artifacts.
    pub fn checkpoint(
        &self,
        iteration: u64,
    ) -> Result<&Self, Error> {
        fs::create_dir_all(&self.config.model_dir)?;
        let directory = Path::new(&self.config.model_dir);
        let recorder = CompactRecorder::new();

        self.generator
            .to_owned()
            .save_file(directory.join(format!("{iteration}-G")), &recorder)?;
        self.discriminator
            .to_owned()
            .save_file(directory.join(format!("{iteration}-D")), &recorder)?;

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "exprgan::trainer::checkpoint",
            "checkpoint ({iteration})",
        );

        Ok(self)
    }

    /// Restores both networks from the artifacts of `iteration`.
    pub fn restore(
        &mut self,
        iteration: u64,
    ) -> Result<&mut Self, Error> {
        let directory = Path::new(&self.config.model_dir);
        let recorder = CompactRecorder::new();

        self.generator = self.generator.to_owned().load_file(
            directory.join(format!("{iteration}-G")),
            &recorder,
            &self.device,
        )?;
        self.discriminator = self.discriminator.to_owned().load_file(
            directory.join(format!("{iteration}-D")),
            &recorder,
            &self.device,
        )?;

        log::info!(
            target: "exprgan::trainer::checkpoint",
            "Restored networks from iteration {iteration}",
        );

        Ok(self)
    }
}
