use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mmu_addresses::{PageSizeClass, PhysicalAddress};
use mmu_arch::kvx::{self, Pte};

const PGD: u64 = 0x0010_0000;
const PMD: u64 = 0x0010_2000;
const PTE: u64 = 0x0010_3000;

/// Virtual address of the snapshot, which starts at the PGD.
const BASE: u64 = kvx::PA_TO_VA_OFFSET + PGD;

fn huge_leaf() -> u64 {
    Pte::leaf(PhysicalAddress::new(0x8060_0000), PageSizeClass::Size2M)
        .with_huge(true)
        .with_read(true)
        .with_write(true)
        .into_bits()
}

fn small_leaf() -> u64 {
    Pte::leaf(PhysicalAddress::new(0x8123_4000), PageSizeClass::Size4K)
        .with_read(true)
        .with_exec(true)
        .with_global(true)
        .into_bits()
}

/// Write the tables (two-page PGD, one PMD, one PTE table) to a file named
/// after the calling test.
fn snapshot(name: &str) -> PathBuf {
    let mut bytes = vec![0_u8; 0x4000];
    let mut set = |table: u64, index: u64, raw: u64| {
        let at = usize::try_from(table - PGD + index * 8).expect("in snapshot");
        bytes[at..at + 8].copy_from_slice(&raw.to_le_bytes());
    };
    set(PGD, 1, PMD);
    set(PMD, 2, PTE);
    set(PMD, 3, huge_leaf());
    set(PTE, 4, small_leaf());

    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(format!("{name}.bin"));
    std::fs::write(&path, bytes).expect("write snapshot");
    path
}

fn region(path: &Path) -> String {
    format!("{BASE:#x}={}", path.display())
}

fn inspect(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mmu-inspect"))
        .args(args)
        .env_remove("MMU_INSPECT_PGD")
        .output()
        .expect("run mmu-inspect")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn walk_prints_the_tree() {
    let path = snapshot("walk_prints_the_tree");
    let output = inspect(&["-q", "--region", &region(&path), "walk", "--pgd", &format!("{BASE:#x}")]);
    assert!(output.status.success(), "{}", stderr(&output));

    let expected = format!(
        "> Looking for PGD base 0xffffff0000100000\n\
         [1] -> Entry[0x0000000000102000]\n\
         \t> Looking for PMD base 0x0000000000102000\n\
         \t[2] -> Entry[0x0000000000103000]\n\
         \t\t> Looking for PTE base 0x0000000000103000\n\
         \t\t[4] -> PTE [0x{small:016x}]\n\
         \t\tPFN: 0x0000000081234000, PS: 4 Ko, bits: G X R A P\n\
         \t[3] -> Entry[0x{huge:016x}]\n\
         \t\t> Huge PTE: PFN: 0x0000000080600000, PS: 2 Mo, bits: H W R A P\n",
        small = small_leaf(),
        huge = huge_leaf(),
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn walk_stops_at_the_table_limit() {
    let path = snapshot("walk_stops_at_the_table_limit");
    let output = inspect(&[
        "--region",
        &region(&path),
        "walk",
        "--pgd",
        &format!("{BASE:#x}"),
        "--max-tables",
        "2",
    ]);
    assert!(output.status.success());

    // The PGD and the PMD table are read; the PTE table is not.
    assert_eq!(
        stdout(&output),
        "> Looking for PGD base 0xffffff0000100000\n\
         [1] -> Entry[0x0000000000102000]\n\
         \t> Looking for PMD base 0x0000000000102000\n\
         ! walk cancelled\n"
    );
}

#[test]
fn virt_to_phys_reads_the_root_from_the_environment() {
    let path = snapshot("virt_to_phys_reads_the_root_from_the_environment");
    let output = Command::new(env!("CARGO_BIN_EXE_mmu-inspect"))
        .args(["--region", &region(&path), "virt-to-phys", "0xffffff0040404567"])
        .env("MMU_INSPECT_PGD", format!("{BASE:#x}"))
        .output()
        .expect("run mmu-inspect");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Trying to find phys_address for 0xffffff0040404567\n\
         PFN: 0x0000000081234000, PS: 4 Ko, bits: G X R A P\n\
         Physical address: 0x0000000081234567\n"
    );
}

#[test]
fn virt_to_phys_through_a_huge_page() {
    let path = snapshot("virt_to_phys_through_a_huge_page");
    let output = inspect(&[
        "--region",
        &region(&path),
        "virt-to-phys",
        "0xffffff00407abcde",
        "--pgd",
        &format!("{BASE:#x}"),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Trying to find phys_address for 0xffffff00407abcde\n\
         PFN: 0x0000000080600000, PS: 2 Mo, bits: H W R A P\n\
         Physical address: 0x00000000807abcde\n"
    );
}

#[test]
fn unmapped_address_is_an_error() {
    let path = snapshot("unmapped_address_is_an_error");
    let output = inspect(&[
        "--region",
        &region(&path),
        "virt-to-phys",
        "0xffffff0000000000",
        "--pgd",
        &format!("{BASE:#x}"),
    ]);
    assert!(!output.status.success());
    assert_eq!(
        stdout(&output),
        "Trying to find phys_address for 0xffffff0000000000\n"
    );
    assert!(
        stderr(&output).contains("error: No page table entry for address 0xffffff0000000000")
    );
}

#[test]
fn missing_memory_is_reported() {
    let output = inspect(&["virt-to-phys", "0xffffff0040404567", "--pgd", &format!("{BASE:#x}")]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: cannot read memory at 0xffffff0000100008"));
}

#[test]
fn decode_pte() {
    let raw = format!("{:#x}", small_leaf());
    let output = inspect(&["decode-pte", &raw]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "PFN: 0x0000000081234000, PS: 4 Ko, bits: G X R A P\n"
    );
}

#[test]
fn decode_tlb_kvx() {
    let output = inspect(&["decode-tlb", "--tel", "0x80000091", "--teh", "0x40000205"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "tel:\n\
         \tes:\tPresent\n\
         \tcp:\tDevice/Uncached\n\
         \tpa:\tRW_RW\n\
         \tps:\t4K\n\
         \tfn:\t0x0000000000080000\n\
         teh:\n\
         \tasn:\t5\n\
         \tg:\tGlobal\n\
         \tvs:\t0\n\
         \tpn:\t0x0000000000040000\n"
    );
}

#[test]
fn unknown_arch_is_rejected() {
    let output = inspect(&["--arch", "x86", "decode-pte", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown architecture"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let path = snapshot("verbose_logs_go_to_stderr");
    let output = inspect(&["-vv", "--region", &region(&path), "walk", "--pgd", &format!("{BASE:#x}")]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("INFO"));
    assert!(stderr(&output).contains("DEBUG"));
    assert!(!stdout(&output).contains("INFO"));
}
