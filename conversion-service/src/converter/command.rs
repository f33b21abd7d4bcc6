use crate::converter::Converter;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;

/// Runs a headless office suite (`soffice --headless --convert-to pdf`) as a
/// child process.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    leading_args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before the conversion flags, e.g. a script for an interpreter.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Converter for CommandConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let out_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Concurrent instances sharing a user profile hand work to each other, so
        // every run gets its own. Removed when this call returns.
        let profile = tempfile::Builder::new()
            .prefix("soffice-profile-")
            .tempdir()
            .map_err(|e| ConversionError::new(e.to_string()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg(profile_arg(profile.path()))
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %self.program,
            input = %input.display(),
            out_dir = %out_dir.display(),
            "Executing converter"
        );

        let result = cmd
            .output()
            .await
            .map_err(|e| ConversionError::new(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();

        if !result.status.success() {
            tracing::error!(
                program = %self.program,
                status = %result.status,
                stderr = %stderr,
                "Converter failed"
            );
            let message = if stderr.is_empty() {
                let stdout = String::from_utf8_lossy(&result.stdout).trim().to_string();
                if stdout.is_empty() {
                    format!("{} exited with {}", self.program, result.status)
                } else {
                    stdout
                }
            } else {
                stderr
            };
            return Err(ConversionError::new(message));
        }

        // The tool names its output after the input's stem inside `out_dir`.
        let produced = produced_path(input, out_dir);
        if !fs::try_exists(&produced).await.unwrap_or(false) {
            let message = if stderr.is_empty() {
                format!("{} did not produce {}", self.program, produced.display())
            } else {
                stderr
            };
            return Err(ConversionError::new(message));
        }

        if produced != output {
            fs::rename(&produced, output)
                .await
                .map_err(|e| ConversionError::new(e.to_string()))?;
        }

        tracing::debug!(output = %output.display(), "Converter succeeded");

        Ok(())
    }
}

fn profile_arg(profile_dir: &Path) -> String {
    format!("-env:UserInstallation=file://{}", profile_dir.display())
}

fn produced_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    out_dir.join(name)
}
