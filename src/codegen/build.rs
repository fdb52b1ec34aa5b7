//! Build System Integration
//!
//! Hands the generated translation unit to a native C compiler, linking the
//! graphics library and libm by default, and optionally runs the result.

use super::{CodegenError, CodegenResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

/// C compiler types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CCompiler {
    Gcc,
    Clang,
}

impl CCompiler {
    /// Executable name on `PATH`
    pub fn command(self) -> &'static str {
        match self {
            CCompiler::Gcc => "gcc",
            CCompiler::Clang => "clang",
        }
    }
}

impl fmt::Display for CCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for CCompiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gcc" => Ok(CCompiler::Gcc),
            "clang" => Ok(CCompiler::Clang),
            other => Err(format!("unknown C compiler '{}' (expected gcc or clang)", other)),
        }
    }
}

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub compiler: CCompiler,
    /// Optimization level (0-3)
    pub optimization_level: u8,
    pub debug_info: bool,
    /// Additional compiler flags
    pub extra_flags: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    /// Libraries to link, in order
    pub libraries: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: CCompiler::Gcc,
            optimization_level: 0,
            debug_info: false,
            extra_flags: Vec::new(),
            include_dirs: Vec::new(),
            library_dirs: Vec::new(),
            libraries: vec!["raylib".to_string(), "m".to_string()],
        }
    }
}

/// Build system for generated C code
#[derive(Debug, Clone, Default)]
pub struct BuildSystem {
    config: BuildConfig,
}

impl BuildSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Check if a command exists in PATH
    fn command_exists(command: &str) -> bool {
        Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn require_command(command: &str) -> CodegenResult<()> {
        if Self::command_exists(command) {
            Ok(())
        } else {
            Err(CodegenError::Toolchain(format!("{} not found in PATH", command)))
        }
    }

    /// Compile `source` into the executable `output`
    pub fn build_executable(&self, source: &Path, output: &Path) -> CodegenResult<PathBuf> {
        Self::require_command(self.config.compiler.command())?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let cmd = self.compile_command(source, output);
        self.execute_command(cmd, &format!("{} compilation failed", self.config.compiler))?;

        log::info!("built {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Compiler invocation for one translation unit
    pub fn compile_command(&self, source: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(self.config.compiler.command());
        cmd.arg(source).arg("-o").arg(output);

        if self.config.optimization_level > 0 {
            cmd.arg(format!("-O{}", self.config.optimization_level));
        }
        if self.config.debug_info {
            cmd.arg("-g");
        }

        for include_dir in &self.config.include_dirs {
            cmd.arg("-I").arg(include_dir);
        }
        for lib_dir in &self.config.library_dirs {
            cmd.arg("-L").arg(lib_dir);
        }

        cmd.args(&self.config.extra_flags);

        // libraries last so the linker sees them after the object
        for lib in &self.config.libraries {
            cmd.arg(format!("-l{}", lib));
        }

        cmd
    }

    /// Run a built program with the terminal attached
    pub fn run(&self, binary: &Path) -> CodegenResult<()> {
        log::info!("running {}", binary.display());

        let status = Command::new(binary).status().map_err(|e| {
            CodegenError::Toolchain(format!("failed to start {}: {}", binary.display(), e))
        })?;

        if !status.success() {
            return Err(CodegenError::Toolchain(format!(
                "{} exited with {}",
                binary.display(),
                status
            )));
        }
        Ok(())
    }

    /// Execute a command and handle errors
    fn execute_command(&self, mut cmd: Command, error_message: &str) -> CodegenResult<()> {
        log::debug!("executing: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| CodegenError::Toolchain(format!("failed to execute compiler: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            return Err(CodegenError::Toolchain(format!(
                "{}\nStdout: {}\nStderr: {}",
                error_message, stdout, stderr
            )));
        }

        Ok(())
    }
}

/// Builder for BuildConfig
#[derive(Debug, Default)]
pub struct BuildConfigBuilder {
    config: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compiler(mut self, compiler: CCompiler) -> Self {
        self.config.compiler = compiler;
        self
    }

    pub fn optimization_level(mut self, level: u8) -> Self {
        self.config.optimization_level = level.min(3);
        self
    }

    pub fn debug_info(mut self, enable: bool) -> Self {
        self.config.debug_info = enable;
        self
    }

    pub fn extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.extra_flags.push(flag.into());
        self
    }

    pub fn include_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.include_dirs.push(path.into());
        self
    }

    pub fn library_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.library_dirs.push(path.into());
        self
    }

    /// Replace the default library list
    pub fn libraries(mut self, libs: Vec<String>) -> Self {
        self.config.libraries = libs;
        self
    }

    pub fn build(self) -> BuildConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_links_graphics_and_math() {
        let build = BuildSystem::new();
        let cmd = build.compile_command(Path::new("c/main.c"), Path::new("c/main.out"));

        assert_eq!(cmd.get_program(), OsStr::new("gcc"));
        assert_eq!(args(&cmd), vec!["c/main.c", "-o", "c/main.out", "-lraylib", "-lm"]);
    }

    #[test]
    fn test_build_config_builder() {
        let config = BuildConfigBuilder::new()
            .compiler(CCompiler::Clang)
            .optimization_level(7)
            .debug_info(true)
            .include_dir("vendor/include")
            .library_dir("vendor/lib")
            .extra_flag("-ffast-math")
            .libraries(vec!["m".to_string()])
            .build();

        assert_eq!(config.optimization_level, 3);

        let cmd = BuildSystem::with_config(config)
            .compile_command(Path::new("a.c"), Path::new("a.out"));
        assert_eq!(cmd.get_program(), OsStr::new("clang"));
        assert_eq!(
            args(&cmd),
            vec![
                "a.c",
                "-o",
                "a.out",
                "-O3",
                "-g",
                "-I",
                "vendor/include",
                "-L",
                "vendor/lib",
                "-ffast-math",
                "-lm"
            ]
        );
    }

    #[test]
    fn test_compiler_from_str() {
        assert_eq!("gcc".parse::<CCompiler>(), Ok(CCompiler::Gcc));
        assert_eq!("clang".parse::<CCompiler>(), Ok(CCompiler::Clang));
        assert!("msvc".parse::<CCompiler>().is_err());
        assert_eq!(CCompiler::Clang.to_string(), "clang");
    }

    #[test]
    fn test_missing_compiler_is_a_toolchain_error() {
        assert!(!BuildSystem::command_exists("nonexistent_command_12345"));

        let err = BuildSystem::require_command("nonexistent_command_12345").unwrap_err();
        assert_eq!(
            err.to_string(),
            "toolchain error: nonexistent_command_12345 not found in PATH"
        );
    }

    #[test]
    fn test_missing_binary_is_a_toolchain_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildSystem::new().run(&dir.path().join("missing.out")).unwrap_err();
        assert!(matches!(err, CodegenError::Toolchain(_)));
    }

    #[test]
    fn test_failed_command_reports_output() {
        let build = BuildSystem::new();
        let err = build
            .execute_command(Command::new("nonexistent_command_12345"), "compilation failed")
            .unwrap_err();
        assert!(err.to_string().starts_with("toolchain error: failed to execute compiler"));
    }
}
