//! lowc command line driver
//!
//! Bound program (JSON) → C source → optional native build and run.

use clap::Parser;
use lowc::{
    codegen::build::{BuildConfig, BuildConfigBuilder, BuildSystem, CCompiler},
    CCodeGenerator, CodegenOptions, CodegenResult, Program,
};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "lowc", version, about = "Lower a bound program to C")]
struct Cli {
    /// Bound program written by the frontend
    input: PathBuf,

    /// Where to write the generated C source
    #[arg(short, long, default_value = "c/main.c")]
    output: PathBuf,

    /// JSON file overriding code generation options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compile the generated source
    #[arg(long)]
    build: bool,

    /// Compile, then run the program (implies --build)
    #[arg(long)]
    run: bool,

    /// C compiler used by --build
    #[arg(long, default_value = "gcc")]
    compiler: CCompiler,

    /// Library to link; replaces the default raylib and m when given
    #[arg(short = 'l', long = "lib")]
    libs: Vec<String>,

    /// Header search directory passed to the compiler
    #[arg(short = 'I', long = "include")]
    include_dirs: Vec<PathBuf>,

    /// Library search directory passed to the linker
    #[arg(short = 'L', long = "lib-dir")]
    library_dirs: Vec<PathBuf>,

    /// Optimization level (0-3)
    #[arg(short = 'O', long = "opt-level", default_value_t = 0)]
    opt_level: u8,

    /// Emit debug information
    #[arg(short = 'g', long = "debug")]
    debug_info: bool,

    /// Extra flag handed to the compiler verbatim
    #[arg(long = "cflag", allow_hyphen_values = true)]
    cflags: Vec<String>,

    /// Log progress and print generation statistics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "lowc=debug" } else { "lowc=warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> CodegenResult<()> {
    let options = match &cli.config {
        Some(path) => CodegenOptions::from_file(path)?,
        None => CodegenOptions::default(),
    };

    let text = fs::read_to_string(&cli.input)?;
    let program = Program::from_json(&text)?;
    log::info!(
        "{}: {} types, {} methods",
        cli.input.display(),
        program.types.len(),
        program.methods.len()
    );

    let mut generator = CCodeGenerator::new(&program, options)?;
    let code = generator.generate()?;

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&cli.output, &code)?;

    if cli.verbose {
        let metrics = generator.metrics();
        println!(
            "wrote {} ({} lines, {} declarations, {:?}, {:.0} lines/s)",
            cli.output.display(),
            metrics.lines_generated,
            metrics.declarations_processed,
            metrics.elapsed,
            metrics.lines_per_second()
        );
    }

    if cli.build || cli.run {
        let build = BuildSystem::with_config(build_config(cli));

        let binary = build.build_executable(&cli.output, &cli.output.with_extension("out"))?;
        if cli.run {
            build.run(&binary)?;
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> BuildConfig {
    let mut config = BuildConfigBuilder::new()
        .compiler(cli.compiler)
        .optimization_level(cli.opt_level)
        .debug_info(cli.debug_info);

    for dir in &cli.include_dirs {
        config = config.include_dir(dir);
    }
    for dir in &cli.library_dirs {
        config = config.library_dir(dir);
    }
    for flag in &cli.cflags {
        config = config.extra_flag(flag);
    }
    if !cli.libs.is_empty() {
        config = config.libraries(cli.libs.clone());
    }

    config.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_config() {
        let cli = Cli::try_parse_from(["lowc", "program.json"]).unwrap();
        let config = build_config(&cli);

        assert_eq!(cli.output, PathBuf::from("c/main.c"));
        assert_eq!(config.compiler, CCompiler::Gcc);
        assert_eq!(config.optimization_level, 0);
        assert!(!config.debug_info);
        assert_eq!(config.libraries, vec!["raylib", "m"]);
    }

    #[test]
    fn test_toolchain_flags_reach_build_config() {
        let cli = Cli::try_parse_from([
            "lowc",
            "program.json",
            "--build",
            "--compiler",
            "clang",
            "-O2",
            "-g",
            "-I",
            "/opt/raylib/include",
            "-L",
            "/opt/raylib/lib",
            "--cflag=-ffast-math",
            "-l",
            "raylib",
        ])
        .unwrap();
        let config = build_config(&cli);

        assert_eq!(config.compiler, CCompiler::Clang);
        assert_eq!(config.optimization_level, 2);
        assert!(config.debug_info);
        assert_eq!(config.include_dirs, vec![PathBuf::from("/opt/raylib/include")]);
        assert_eq!(config.library_dirs, vec![PathBuf::from("/opt/raylib/lib")]);
        assert_eq!(config.extra_flags, vec!["-ffast-math"]);
        assert_eq!(config.libraries, vec!["raylib"]);
    }

    #[test]
    fn test_unknown_compiler_is_rejected() {
        assert!(Cli::try_parse_from(["lowc", "program.json", "--compiler", "msvc"]).is_err());
    }
}
