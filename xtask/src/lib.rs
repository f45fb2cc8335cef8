use anyhow::{bail, Context, Result};
use std::env;
use std::process::Command;

/// Options derived from the host machine used to configure cargo commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub features: Vec<String>,
    pub rustflags: Option<String>,
}

impl BuildConfig {
    /// Join features into a single string suitable for passing to cargo.
    pub fn features_arg(&self) -> Option<String> {
        if self.features.is_empty() {
            None
        } else {
            Some(self.features.join(" "))
        }
    }
}

/// Feature sets every change has to build and test under.
pub const FEATURE_MATRIX: &[&[&str]] = &[
    &[],
    &["--no-default-features"],
    &["--no-default-features", "--features", "std"],
    &["--features", "verbose-logging"],
];

/// Detect build configuration from the current machine.
pub fn detect_config() -> BuildConfig {
    let arch = detect_arch();
    let cpu_flags = detect_cpu_flags();
    let extra = env::var("OLAFFT_FEATURES").unwrap_or_default();
    compute_config(&arch, &cpu_flags, &extra)
}

fn detect_arch() -> String {
    if let Ok(arch) = env::var("ARCH") {
        if !arch.trim().is_empty() {
            return arch;
        }
    }
    Command::new("uname")
        .arg("-m")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}

fn detect_cpu_flags() -> String {
    if let Ok(out) = Command::new("lscpu").output() {
        let s = String::from_utf8_lossy(&out.stdout);
        for line in s.lines() {
            if line.to_lowercase().contains("flags") {
                return line.to_string();
            }
        }
    }
    if let Ok(out) = Command::new("sysctl")
        .args(["-n", "machdep.cpu.features"])
        .output()
    {
        return String::from_utf8_lossy(&out.stdout).to_string();
    }
    String::new()
}

/// Compute a [`BuildConfig`] from supplied inputs. This is separated for testing.
///
/// Only benchmarks pick up the target flags.
pub fn compute_config(arch: &str, cpu_flags: &str, extra: &str) -> BuildConfig {
    let mut rustflags = None;
    if arch.contains("x86_64") {
        if cpu_flags.contains("avx512f") {
            rustflags = Some("-C target-feature=+avx512f,+fma".into());
        } else if cpu_flags.contains("avx2") {
            rustflags = Some("-C target-feature=+avx2,+fma".into());
        }
    }
    let features = extra.split_whitespace().map(str::to_string).collect();
    BuildConfig {
        features,
        rustflags,
    }
}

pub fn build_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");
    if let Some(f) = cfg.features_arg() {
        cmd.arg("--features").arg(f);
    }
    cmd
}

pub fn test_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg("test");
    if let Some(f) = cfg.features_arg() {
        cmd.arg("--features").arg(f);
    }
    cmd
}

/// One `cargo test -p olafft` per entry of [`FEATURE_MATRIX`].
pub fn feature_matrix_commands() -> Vec<Command> {
    FEATURE_MATRIX
        .iter()
        .map(|flags| {
            let mut cmd = Command::new("cargo");
            cmd.args(["test", "-p", "olafft"]).args(*flags);
            cmd
        })
        .collect()
}

pub fn clippy_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["clippy", "--all-targets", "--all-features"]);
    cmd
}

pub fn fmt_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["fmt", "--all"]);
    cmd
}

pub fn bench_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    if let Some(rf) = &cfg.rustflags {
        cmd.env("RUSTFLAGS", rf);
    }
    cmd.args(["bench", "-p", "olafft-bench"]);
    let features: Vec<String> = cfg.features.iter().map(|f| bench_feature(f)).collect();
    if !features.is_empty() {
        cmd.arg("--features").arg(features.join(" "));
    }
    cmd
}

/// olafft-bench has no features of its own, so plain names go to `olafft`.
fn bench_feature(feature: &str) -> String {
    if feature.contains('/') {
        feature.to_string()
    } else {
        format!("olafft/{}", feature)
    }
}

pub fn demo_command(cfg: &BuildConfig, name: &str, args: &[String]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--release", "--example", name]);
    let mut features = cfg.features.clone();
    match name {
        "verbose_logging" => features.push("verbose-logging".into()),
        "lowpass_wav" => features.push("spectral".into()),
        _ => {}
    }
    if !features.is_empty() {
        cmd.arg("--features").arg(features.join(" "));
    }
    if !args.is_empty() {
        cmd.arg("--").args(args);
    }
    cmd
}

/// Run commands in order, stopping at the first failure.
pub fn run_all(commands: impl IntoIterator<Item = Command>) -> Result<()> {
    for mut cmd in commands {
        let shown = format!("{:?}", cmd);
        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn {}", shown))?;
        if !status.success() {
            bail!("{} exited with {}", shown, status);
        }
    }
    Ok(())
}
