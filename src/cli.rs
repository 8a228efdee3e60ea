// Command-line front end for oxipuff.
//
// Subcommands operate on the first block of a DEFLATE stream: `puff` turns
// its dynamic Huffman header into a puff buffer, `huff` turns a puff buffer
// back into header bits, `verify` checks that the two agree bit for bit, and
// `fixed` describes the fixed tables.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::deflate::Container;
use crate::engine::{self, MAX_HEADER_BITS, MAX_PUFF_HEADER_SIZE};
use crate::huffman::{HeaderCounts, HuffmanTable};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// DEFLATE dynamic Huffman header transcoder.
#[derive(Parser, Debug)]
#[command(
    name = "oxipuff",
    version,
    about = "DEFLATE dynamic Huffman header transcoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert the first block's dynamic Huffman header to a puff buffer.
    Puff(PuffArgs),
    /// Convert a puff buffer back to dynamic block header bits.
    Huff(HuffArgs),
    /// Check that the first block's header survives puff and huff unchanged.
    Verify(VerifyArgs),
    /// Print the fixed Huffman tables.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Raw,
    Zlib,
    Gzip,
}

impl From<FormatArg> for Container {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Raw => Container::Raw,
            FormatArg::Zlib => Container::Zlib,
            FormatArg::Gzip => Container::Gzip,
        }
    }
}

#[derive(Args, Debug)]
struct PuffArgs {
    /// Container around the DEFLATE data.
    #[arg(long, value_enum, default_value_t = FormatArg::Raw)]
    format: FormatArg,

    /// Compressed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Puff output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HuffArgs {
    /// Puff buffer input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Header bits output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Set BFINAL in the written block header.
    #[arg(long = "final")]
    is_final: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Container around the DEFLATE data.
    #[arg(long, value_enum, default_value_t = FormatArg::Raw)]
    format: FormatArg,

    /// Compressed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Puff,
    Huff,
    Verify,
    Fixed,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    container: Container,
    is_final: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Fixed,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        container: Container::Raw,
        is_final: false,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Puff(args) => {
            opts.command = Command::Puff;
            opts.container = args.format.into();
            opts.input_file = Some(args.input);
            opts.output_file = args.output;
        }
        Cmd::Huff(args) => {
            opts.command = Command::Huff;
            opts.is_final = args.is_final;
            opts.input_file = Some(args.input);
            opts.output_file = args.output;
        }
        Cmd::Verify(args) => {
            opts.command = Command::Verify;
            opts.container = args.format.into();
            opts.input_file = Some(args.input);
        }
        Cmd::Fixed => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxipuff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared I/O helpers
// ---------------------------------------------------------------------------

fn read_input(opts: &Options) -> Option<Vec<u8>> {
    let Some(path) = &opts.input_file else {
        eprintln!("oxipuff: an input file is required");
        return None;
    };
    match std::fs::read(path) {
        Ok(data) => Some(data),
        Err(e) => {
            eprintln!("oxipuff: input file: {}: {e}", path.display());
            None
        }
    }
}

fn open_output(path: Option<&Path>, force: bool) -> Option<Box<dyn Write>> {
    let Some(path) = path else {
        return Some(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if path.exists() && !force {
        eprintln!(
            "oxipuff: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return None;
    }
    match File::create(path) {
        Ok(f) => Some(Box::new(BufWriter::new(f))),
        Err(e) => {
            eprintln!("oxipuff: output file: {}: {e}", path.display());
            None
        }
    }
}

fn write_output(opts: &Options, data: &[u8]) -> bool {
    let Some(mut writer) = open_output(opts.output_file.as_deref(), opts.force) else {
        return false;
    };
    if let Err(e) = writer.write_all(data).and_then(|()| writer.flush()) {
        eprintln!("oxipuff: write error: {e}");
        return false;
    }
    true
}

fn print_json(json: &serde_json::Value) {
    match serde_json::to_string_pretty(json) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("oxipuff: json error: {e}"),
    }
}

fn header_counts(puff: &[u8]) -> Option<HeaderCounts> {
    match *puff {
        [hlit, hdist, hclen, ..] => HeaderCounts::from_fields(hlit, hdist, hclen).ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Puff command
// ---------------------------------------------------------------------------

fn cmd_puff(opts: &Options) -> i32 {
    let Some(data) = read_input(opts) else {
        return 1;
    };

    let mut table = HuffmanTable::new();
    let header = match engine::puff_header(&mut table, &data, opts.container) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxipuff: puff error: {e}");
            return 1;
        }
    };

    if !write_output(opts, &header.puff) {
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxipuff: puff: input size: {}, header bits: {}, puff size: {}",
            data.len(),
            header.bits,
            header.puff.len()
        );
        if let Some(counts) = header_counts(&header.puff).filter(|_| opts.verbose > 1) {
            eprintln!(
                "oxipuff: puff: {} lit/len, {} distance, {} code-length codes, final: {}",
                counts.num_lit_len, counts.num_distance, counts.num_codes, header.block.is_final
            );
        }
    }

    if opts.json_output {
        let counts = header_counts(&header.puff);
        print_json(&serde_json::json!({
            "command": "puff",
            "input_size": data.len(),
            "container_size": header.container_len,
            "is_final": header.block.is_final,
            "header_bits": header.bits,
            "puff_size": header.puff.len(),
            "num_lit_len": counts.map(|c| c.num_lit_len),
            "num_distance": counts.map(|c| c.num_distance),
            "num_codes": counts.map(|c| c.num_codes),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Huff command
// ---------------------------------------------------------------------------

fn cmd_huff(opts: &Options) -> i32 {
    let Some(puff) = read_input(opts) else {
        return 1;
    };
    if puff.len() > MAX_PUFF_HEADER_SIZE {
        eprintln!(
            "oxipuff: puff buffer of {} bytes exceeds max {MAX_PUFF_HEADER_SIZE}",
            puff.len()
        );
        return 1;
    }

    let mut table = HuffmanTable::new();
    let huffed = match engine::huff_header(&mut table, &puff, opts.is_final) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxipuff: huff error: {e}");
            return 1;
        }
    };

    if !write_output(opts, &huffed.bytes) {
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxipuff: huff: puff size: {}, header bits: {}, output size: {}",
            puff.len(),
            huffed.bits,
            huffed.bytes.len()
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "huff",
            "puff_size": puff.len(),
            "is_final": opts.is_final,
            "header_bits": huffed.bits,
            "output_size": huffed.bytes.len(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Verify command
// ---------------------------------------------------------------------------

fn cmd_verify(opts: &Options) -> i32 {
    let Some(data) = read_input(opts) else {
        return 1;
    };

    let mut table = HuffmanTable::new();
    let verification = match engine::verify_header(&mut table, &data, opts.container) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("oxipuff: verify error: {e}");
            return 1;
        }
    };
    let header = &verification.header;

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "verify",
            "input_size": data.len(),
            "header_bits": header.bits,
            "puff_size": header.puff.len(),
            "matches": verification.matches,
        }));
    }

    if !verification.matches {
        eprintln!("oxipuff: verify: re-encoded header differs from input");
        return 1;
    }
    if !opts.quiet {
        eprintln!(
            "oxipuff: verify: {} header bits round-trip through {} puff bytes",
            header.bits,
            header.puff.len()
        );
    }

    0
}

// ---------------------------------------------------------------------------
// Fixed command
// ---------------------------------------------------------------------------

fn cmd_fixed(opts: &Options) -> i32 {
    let mut table = HuffmanTable::new();
    if let Err(e) = table.build_fixed_table() {
        eprintln!("oxipuff: fixed table error: {e}");
        return 1;
    }

    let lit_len = table.lit_len_lengths();
    let distance = table.distance_lengths();
    if !opts.quiet {
        println!("Literal/length symbols:       {}", lit_len.len());
        println!("Literal/length max bits:      {}", table.lit_len_max_bits());
        println!("Distance symbols:             {}", distance.len());
        println!("Distance max bits:            {}", table.distance_max_bits());
        println!("Max puff header size:         {MAX_PUFF_HEADER_SIZE}");
        println!("Max encoded header bits:      {MAX_HEADER_BITS}");
    }

    if opts.verbose > 0 && !opts.quiet {
        println!();
        println!("  SYMBOL  LEN  CODE");
        for symbol in 0..lit_len.len() {
            if let Ok((code, len)) = table.lit_len_huffman(symbol) {
                // Codes are stored in stream order; print them MSB first.
                let msb_first = crate::huffman::bit_reverse(code, len);
                println!(
                    "  {symbol:6}  {len:3}  {msb_first:0width$b}",
                    width = len as usize
                );
            }
        }
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "fixed",
            "lit_len_symbols": lit_len.len(),
            "lit_len_max_bits": table.lit_len_max_bits(),
            "distance_symbols": distance.len(),
            "distance_max_bits": table.distance_max_bits(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Puff => cmd_puff(&opts),
        Command::Huff => cmd_huff(&opts),
        Command::Verify => cmd_verify(&opts),
        Command::Fixed => cmd_fixed(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("oxipuff".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn puff_subcommand_maps_correctly() {
        let opts = parse_opts(&["puff", "--format", "gzip", "in.gz", "out.puff"]);
        assert_eq!(opts.command, Command::Puff);
        assert_eq!(opts.container, Container::Gzip);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.gz")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.puff")));
    }

    #[test]
    fn puff_defaults_to_raw_and_stdout() {
        let opts = parse_opts(&["puff", "in.deflate"]);
        assert_eq!(opts.container, Container::Raw);
        assert!(opts.output_file.is_none());
    }

    #[test]
    fn huff_subcommand_maps_correctly() {
        let opts = parse_opts(&["huff", "--final", "in.puff", "out.bin"]);
        assert_eq!(opts.command, Command::Huff);
        assert!(opts.is_final);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.puff")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.bin")));

        assert!(!parse_opts(&["huff", "in.puff"]).is_final);
    }

    #[test]
    fn verify_and_fixed_map() {
        let opts = parse_opts(&["verify", "--format", "zlib", "in.z"]);
        assert_eq!(opts.command, Command::Verify);
        assert_eq!(opts.container, Container::Zlib);
        assert_eq!(parse_opts(&["fixed"]).command, Command::Fixed);
    }

    #[test]
    fn global_flags() {
        let opts = parse_opts(&["--force", "--json", "puff", "in", "out"]);
        assert!(opts.force);
        assert!(opts.json_output);

        let opts = parse_opts(&["fixed", "-q"]);
        assert!(opts.quiet);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-v", "-v", "-v", "fixed"]);
        assert_eq!(opts.verbose, 2);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["oxipuff", "-q", "-v", "fixed"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let argv = ["oxipuff", "puff", "--format", "bzip2", "in"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn header_counts_from_puff_prefix() {
        let counts = header_counts(&[29, 0, 15, 0xFF]).unwrap();
        assert_eq!(counts.num_lit_len, 286);
        assert_eq!(counts.num_codes, 19);
        assert!(header_counts(&[1, 2]).is_none());
        assert!(header_counts(&[31, 0, 0]).is_none());
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        fuzz_try_parse_args(&["--bogus".to_string()]);
        fuzz_try_parse_args(&["puff".to_string()]);
    }
}
