use mmu_arch::Arch;
use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Target MMU
    #[arg(short, long, global = true, default_value_t)]
    pub(crate) arch: Arch,

    /// Memory snapshot region, as the virtual address it was dumped from and
    /// a raw file (repeatable)
    #[arg(short, long = "region", value_name = "ADDR=FILE", global = true, value_parser = parse_region)]
    pub(crate) regions: Vec<RegionArg>,

    /// Increase message verbosity
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every mapping below a PGD
    Walk {
        #[command(flatten)]
        root: RootArg,

        /// Stop after reading this many tables
        #[arg(long)]
        max_tables: Option<usize>,
    },
    /// Translate one virtual address
    VirtToPhys {
        /// Virtual address to translate
        #[arg(value_parser = clap_num::maybe_hex::<u64>)]
        address: u64,

        #[command(flatten)]
        root: RootArg,
    },
    /// Decode a raw page-table entry
    DecodePte {
        #[arg(value_parser = clap_num::maybe_hex::<u64>)]
        raw: u64,
    },
    /// Decode a TLB entry from its $tel and $teh values
    DecodeTlb {
        #[arg(long, value_parser = clap_num::maybe_hex::<u64>)]
        tel: u64,

        #[arg(long, value_parser = clap_num::maybe_hex::<u64>)]
        teh: u64,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct RootArg {
    /// Address of the PGD (the process's root table)
    #[arg(long, env = "MMU_INSPECT_PGD", value_parser = clap_num::maybe_hex::<u64>)]
    pub(crate) pgd: u64,
}

/// A `--region` argument before its file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionArg {
    pub(crate) address: u64,
    pub(crate) path: PathBuf,
}

fn parse_region(s: &str) -> Result<RegionArg, String> {
    let (address, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=FILE, got `{s}`"))?;
    if path.is_empty() {
        return Err(format!("missing file name in `{s}`"));
    }
    Ok(RegionArg {
        address: clap_num::maybe_hex::<u64>(address)?,
        path: PathBuf::from(path),
    })
}

impl Args {
    /// `stderrlog` verbosity: warnings by default, one level more per `-v`.
    pub(crate) fn log_verbosity(&self) -> usize {
        usize::from(self.verbose) + 1
    }
}
