//! Invocation builder and captured output for command tests.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::OnceLock;

use jsonasset_testkit::{fixture_path, target_dir};

static BINARY: OnceLock<PathBuf> = OnceLock::new();

/// One `jsonasset` invocation under construction.
pub(crate) struct Cli {
	args: Vec<String>,
}

impl Cli {
	pub(crate) fn new(subcommand: &str) -> Self {
		Self {
			args: vec![subcommand.to_owned()],
		}
	}

	/// Append a fixture file path as a positional argument.
	pub(crate) fn fixture(mut self, name: &str) -> Self {
		self.args.push(fixture_string(name));
		self
	}

	/// Point `--schema` at the shared schema fixture.
	pub(crate) fn with_schema(self) -> Self {
		self.fixture_option("--schema", "schema.json")
	}

	pub(crate) fn fixture_option(self, flag: &str, name: &str) -> Self {
		let path = fixture_string(name);
		self.option(flag, &path)
	}

	pub(crate) fn option(mut self, flag: &str, value: &str) -> Self {
		self.args.extend([flag.to_owned(), value.to_owned()]);
		self
	}

	pub(crate) fn flag(mut self, flag: &str) -> Self {
		self.args.push(flag.to_owned());
		self
	}

	/// Run with logging silenced so stderr only carries the error line.
	pub(crate) fn run(&self) -> CliRun {
		let output = Command::new(binary())
			.args(&self.args)
			.env("JSONASSET_LOG", "off")
			.output()
			.expect("jsonasset command executes");
		CliRun {
			status: output.status,
			stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
			stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
		}
	}

	/// Run with `--json` and parse stdout, failing the test on a non-zero exit.
	pub(crate) fn json(self) -> serde_json::Value {
		let run = self.flag("--json").run();
		assert!(run.status.success(), "{} exited with {}: {}", binary().display(), run.status, run.stderr);
		serde_json::from_str(&run.stdout).expect("stdout is json")
	}
}

/// Captured result of a finished invocation.
pub(crate) struct CliRun {
	pub(crate) status: ExitStatus,
	pub(crate) stdout: String,
	pub(crate) stderr: String,
}

fn fixture_string(name: &str) -> String {
	fixture_path(name).to_string_lossy().into_owned()
}

fn binary() -> &'static Path {
	BINARY.get_or_init(locate_binary)
}

// Test executables live in `target/<profile>/deps`; the binary sits one level up.
fn locate_binary() -> PathBuf {
	let name = format!("jsonasset{}", std::env::consts::EXE_SUFFIX);
	let sibling = std::env::current_exe()
		.ok()
		.and_then(|exe| exe.parent().and_then(Path::parent).map(|dir| dir.join(&name)));
	if let Some(path) = sibling.filter(|path| path.is_file()) {
		return path;
	}

	let status = Command::new("cargo")
		.current_dir(env!("CARGO_MANIFEST_DIR"))
		.args(["build", "--quiet", "--bin", "jsonasset"])
		.status()
		.expect("cargo build executes");
	let built = target_dir().join("debug").join(&name);
	assert!(status.success() && built.is_file(), "jsonasset binary missing at {}", built.display());
	built
}
