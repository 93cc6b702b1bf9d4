//! # mmu-inspect
//!
//! Inspect page tables and TLB entries of a stopped KVX or K1C target from
//! raw memory snapshots.
//!
//! ```text
//! mmu-inspect --region 0xffffff0000100000=pgd.bin --region ... walk --pgd 0xffffff0000100000
//! MMU_INSPECT_PGD=0xffffff0000100000 mmu-inspect --region ... virt-to-phys 0x40001234
//! mmu-inspect decode-pte 0x4091a0001a3
//! mmu-inspect --arch k1c decode-tlb --tel 0x80000091 --teh 0x40000205
//! ```

mod args;
mod report;
mod snapshot;

use crate::args::{Args, Command};
use crate::report::Reporter;
use crate::snapshot::{Snapshot, SnapshotError};
use clap::Parser;
use mmu_addresses::VirtualAddress;
use mmu_arch::Arch;
use mmu_bits::LayoutError;
use mmu_walk::{GeometryError, ResolveError, TableWalker};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("No page table entry for address {0}")]
    NoEntry(VirtualAddress),
    #[error(transparent)]
    Resolve(ResolveError),
    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::TranslationFault { address, .. } => Self::NoEntry(address),
            other => Self::Resolve(other),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = io::stdout().flush();
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    stderrlog::new()
        .modules([module_path!(), "mmu_walk", "mmu_arch"])
        .quiet(args.quiet)
        .verbosity(args.log_verbosity())
        .init()?;
    let mut out = io::stdout().lock();

    match args.command {
        Command::Walk { root, max_tables } => {
            let snapshot = Snapshot::load(&args.regions)?;
            walk(&mut out, args.arch, &snapshot, root.pgd, max_tables)
        }
        Command::VirtToPhys { address, root } => {
            let snapshot = Snapshot::load(&args.regions)?;
            virt_to_phys(&mut out, args.arch, &snapshot, address, root.pgd)
        }
        Command::DecodePte { raw } => {
            let geometry = args.arch.geometry()?;
            Reporter::new(&geometry, args.arch.hidden_leaf_fields()).write_leaf(&mut out, raw)?;
            Ok(())
        }
        Command::DecodeTlb { tel, teh } => {
            let tlb = args.arch.tlb()?;
            report::write_tlb(&mut out, &tlb, &tlb.decode(tel, teh))?;
            Ok(())
        }
    }
}

fn walk<W: Write>(
    out: &mut W,
    arch: Arch,
    snapshot: &Snapshot,
    pgd: u64,
    max_tables: Option<usize>,
) -> Result<(), Error> {
    let geometry = arch.geometry()?;
    let walker = TableWalker::new(geometry, snapshot);
    let root = VirtualAddress::new(pgd);

    let mut tables = 0_usize;
    let dump = walker.dump_with(root, |level, base| {
        if max_tables.is_some_and(|max| tables >= max) {
            log::info!("table limit reached before the {level} table at {base}");
            return ControlFlow::Break(());
        }
        tables += 1;
        ControlFlow::Continue(())
    });

    Reporter::new(&geometry, arch.hidden_leaf_fields()).write_dump(out, &dump)?;
    Ok(())
}

fn virt_to_phys<W: Write>(
    out: &mut W,
    arch: Arch,
    snapshot: &Snapshot,
    address: u64,
    pgd: u64,
) -> Result<(), Error> {
    let geometry = arch.geometry()?;
    let walker = TableWalker::new(geometry, snapshot);
    let address = VirtualAddress::new(address);

    writeln!(out, "Trying to find phys_address for {address}")?;
    let result = walker.resolve(address, VirtualAddress::new(pgd))?;
    Reporter::new(&geometry, arch.hidden_leaf_fields()).write_translation(out, &result)?;
    Ok(())
}
