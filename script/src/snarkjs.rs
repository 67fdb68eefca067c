//! Groth16 verification through the snarkjs command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ark_bn254::Fr;
use async_trait::async_trait;
use passport_disclose_lib::crypto::field_to_decimal;
use passport_disclose_lib::{CapabilityError, Groth16Proof, ProofVerifier, VerificationKey};
use rand::Rng;
use tokio::process::Command;
use tracing::debug;

/// Default limit on a single `snarkjs` run.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Proof verifier that shells out to `snarkjs groth16 verify`.
///
/// A run that outlives the timeout is killed and reported as a backend error.
#[derive(Debug, Clone)]
pub struct SnarkjsVerifier {
    bin: String,
    scratch_root: PathBuf,
    timeout: Duration,
}

impl SnarkjsVerifier {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            scratch_root: std::env::temp_dir(),
            timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write scratch files under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = dir.into();
        self
    }

    fn scratch_dir(&self) -> PathBuf {
        let tag: u64 = rand::thread_rng().gen();
        self.scratch_root.join(format!("disclose-verify-{tag:016x}"))
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CapabilityError> {
        let contents =
            serde_json::to_vec(value).map_err(|e| CapabilityError::Malformed(e.to_string()))?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| CapabilityError::Backend(format!("writing {}: {e}", path.display())))
    }

    async fn run(
        &self,
        dir: &Path,
        key: &VerificationKey,
        signals: &[Fr],
        proof: &Groth16Proof,
    ) -> Result<bool, CapabilityError> {
        let vkey_path = dir.join("vkey.json");
        let public_path = dir.join("public.json");
        let proof_path = dir.join("proof.json");

        let public: Vec<String> = signals.iter().map(field_to_decimal).collect();
        Self::write_json(&vkey_path, key).await?;
        Self::write_json(&public_path, &public).await?;
        Self::write_json(&proof_path, proof).await?;

        let mut command = Command::new(&self.bin);
        command
            .arg("groth16")
            .arg("verify")
            .arg(&vkey_path)
            .arg(&public_path)
            .arg(&proof_path)
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                CapabilityError::Backend(format!(
                    "{} timed out after {}s",
                    self.bin,
                    self.timeout.as_secs_f64()
                ))
            })?
            .map_err(|e| CapabilityError::Backend(format!("running {}: {e}", self.bin)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(status = %output.status, "snarkjs finished");
        parse_verdict(&stdout).ok_or_else(|| {
            CapabilityError::Backend(format!(
                "unexpected snarkjs output: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        })
    }
}

/// Read the verdict snarkjs prints, `None` if it printed neither.
fn parse_verdict(stdout: &str) -> Option<bool> {
    if stdout.contains("OK!") {
        Some(true)
    } else if stdout.contains("Invalid proof") {
        Some(false)
    } else {
        None
    }
}

#[async_trait]
impl ProofVerifier for SnarkjsVerifier {
    async fn verify(
        &self,
        key: &VerificationKey,
        public_signals: &[Fr],
        proof: &Groth16Proof,
    ) -> Result<bool, CapabilityError> {
        let dir = self.scratch_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CapabilityError::Backend(format!("creating {}: {e}", dir.display())))?;

        let verdict = self.run(&dir, key, public_signals, proof).await;
        let _ = tokio::fs::remove_dir_all(&dir).await;
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("[INFO]  snarkJS: OK!\n"), Some(true));
        assert_eq!(parse_verdict("[ERROR] snarkJS: Invalid proof\n"), Some(false));
        assert_eq!(parse_verdict(""), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_backend_error() {
        let verifier = SnarkjsVerifier::new("snarkjs-does-not-exist-on-this-host");
        let proof = Groth16Proof {
            pi_a: vec![],
            pi_b: vec![],
            pi_c: vec![],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        };
        let key = VerificationKey::new(serde_json::json!({}));
        let err = verifier.verify(&key, &[], &proof).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Backend(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_backend_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let tag: u64 = rand::random();
        let dir = std::env::temp_dir().join(format!("disclose-snarkjs-{tag:016x}"));
        std::fs::create_dir_all(&dir).unwrap();
        let bin = dir.join("snarkjs");
        std::fs::write(&bin, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let verifier = SnarkjsVerifier::new(bin.to_string_lossy())
            .with_scratch_dir(&dir)
            .with_timeout(Duration::from_millis(300));
        let proof = Groth16Proof {
            pi_a: vec![],
            pi_b: vec![],
            pi_c: vec![],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        };
        let key = VerificationKey::new(serde_json::json!({}));

        let started = std::time::Instant::now();
        let err = verifier.verify(&key, &[], &proof).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(&err, CapabilityError::Backend(msg) if msg.contains("timed out")));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
