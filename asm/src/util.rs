use color_print::cformat;

use crate::assembler::{Assembly, Entry};
use crate::parser::StmtKind;

fn hex(bin: &[u8]) -> String {
    bin.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn row(entry: &Entry) -> String {
    let stmt = &entry.stmt;
    let line = format!("{:>4}", stmt.pos.line);
    match &stmt.kind {
        StmtKind::Code(..) => format!(
            "[{:04X}] {:<17} | {}: {}",
            entry.addr,
            hex(&entry.bin),
            line,
            cformat!("<r>{}</>", stmt.text)
        ),
        StmtKind::Label(_) => format!(
            "{:25}| {}: {}",
            "",
            line,
            cformat!("<g>{}</>", stmt.text)
        ),
        StmtKind::Define(..) => format!(
            "{:25}| {}: {}",
            "",
            line,
            cformat!("<y>{}</>", stmt.text)
        ),
    }
}

/// Listing of the vector table and every statement with its address and bytes.
pub fn print_dump(assembly: &Assembly) {
    let table_len = assembly.listing.first().map_or(0, |e| e.addr as usize);
    for (idx, slot) in assembly.program.image.get(..table_len).unwrap_or(&[]).chunks(3).enumerate() {
        let name = match idx {
            0 => "entry".to_string(),
            n => format!("irq {}", n - 1),
        };
        println!(
            "[{:04X}] {:<17} | {}",
            idx * 3,
            hex(slot),
            cformat!("<c>{}</>", name)
        );
    }

    let mut file = None;
    for entry in &assembly.listing {
        let path = &entry.stmt.pos.file;
        if file != Some(path) {
            println!(
                "{}+------[{}]{}",
                "-".repeat(25),
                path,
                "-".repeat(45usize.saturating_sub(path.len()))
            );
            file = Some(path);
        }
        println!("{}", row(entry));
    }
    println!("-------------------------+-----------------------------------------------------");
}
