use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use snakevo_training::{genetic::PopulationSnapshot, params::TrainingConfig};

use crate::model::controller_model::ControllerModel;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub(crate) fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub(crate) fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub(crate) fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a training configuration, or returns the canonical one when no path is given.
///
/// The returned configuration is validated.
pub fn read_training_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    let config = match path {
        Some(path) => read_json_file("training config", path)?,
        None => TrainingConfig::canonical(),
    };
    config
        .validate()
        .context("Invalid training configuration")?;
    Ok(config)
}

/// Reads a controller model; the network shape is validated while parsing.
pub fn read_model_file<P>(path: P) -> anyhow::Result<ControllerModel>
where
    P: AsRef<Path>,
{
    read_json_file("controller model", path)
}

pub fn read_population_file<P>(path: P) -> anyhow::Result<PopulationSnapshot>
where
    P: AsRef<Path>,
{
    read_json_file("population", path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_save_and_read_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = TrainingConfig::canonical();
        Output::save_json(&config, Some(path.clone())).unwrap();

        let restored = read_training_config(Some(path.as_path())).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_missing_config_defaults_to_canonical() {
        assert_eq!(
            read_training_config(None).unwrap(),
            TrainingConfig::canonical()
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = TrainingConfig::canonical();
        config.genetic.population_size = 0;
        Output::save_json(&config, Some(path.clone())).unwrap();

        let err = read_training_config(Some(path.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("population size must be positive"));
    }

    #[test]
    fn test_malformed_json_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.json");
        fs::write(&path, "{ \"generation\": 3, ").unwrap();

        let err = read_population_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse population JSON file"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_model_file(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open controller model file"));
    }
}
