use arch::op::Opcode;
use arch::program::{Program, ENTRY_LABEL, INTERRUPT_VECTORS, VECTOR_SLOT_SIZE, VECTOR_TABLE_SIZE};
use indexmap::IndexMap;
use std::rc::Rc;

use crate::encode;
use crate::error::{AssembleError, AssembleErrorKind, Error};
use crate::ident::{DefineTable, LabelTable, Symbols};
use crate::include::{FileLoader, Resolver};
use crate::label::{defines_of, labels_of};
use crate::parser::{self, Stmt, StmtKind};
use crate::token::{Pos, Token};

#[derive(Debug, Clone)]
pub struct Config {
    /// Prepend the entry/interrupt vector table.
    pub vectors: bool,
    /// Emit the `PENPAL` header in [`Assembly::to_bytes`].
    pub header: bool,
    /// Handler label per interrupt vector. Missing labels leave a zero slot.
    pub interrupts: [Option<String>; INTERRUPT_VECTORS],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vectors: true,
            header: false,
            interrupts: Default::default(),
        }
    }
}

/// One encoded statement, as shown by the listing.
#[derive(Debug, Clone)]
pub struct Entry {
    pub addr: u16,
    pub bin: Vec<u8>,
    pub stmt: Stmt,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub program: Program,
    pub header: bool,
    pub labels: LabelTable,
    pub defines: DefineTable,
    pub listing: Vec<Entry>,
}

impl Assembly {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.program.to_bytes(self.header)
    }
}

/// Pass 2: encode every statement, resolving names against the tables.
pub fn encode(
    tokens: &[Token],
    labels: &LabelTable,
    defines: &DefineTable,
) -> Result<Vec<u8>, AssembleError> {
    let stmts = parser::parse(tokens)?;
    let entries = encode_stmts(&stmts, 0, labels, defines)?;
    Ok(entries.into_iter().flat_map(|e| e.bin).collect())
}

fn encode_stmts(
    stmts: &[Stmt],
    origin: u16,
    labels: &LabelTable,
    defines: &DefineTable,
) -> Result<Vec<Entry>, AssembleError> {
    tracing::debug!("pass 2: encoding from {:#06x}", origin);
    let symbols = Symbols { labels, defines };
    let mut addr = origin;
    let mut entries = vec![];
    for stmt in stmts {
        let bin = match &stmt.kind {
            StmtKind::Code(mnemonic, args) => encode::encode(*mnemonic, args, &symbols)
                .map_err(|kind| AssembleError::new(stmt.pos.clone(), &stmt.text, kind))?,
            _ => vec![],
        };
        entries.push(Entry {
            addr,
            bin: bin.clone(),
            stmt: stmt.clone(),
        });
        addr = addr.wrapping_add(bin.len() as u16);
    }
    Ok(entries)
}

/// `jump __start` followed by one `jump` or zero slot per interrupt.
fn vector_table(
    config: &Config,
    labels: &LabelTable,
    first: &Pos,
) -> Result<Vec<u8>, AssembleError> {
    let start = entry_point(labels, first)?;
    let jump = |addr: u16| {
        let [hi, lo] = addr.to_be_bytes();
        [Opcode::Jump.into(), hi, lo]
    };
    let mut table = Vec::with_capacity(VECTOR_TABLE_SIZE);
    table.extend(jump(start));
    for label in &config.interrupts {
        match label.as_ref().and_then(|l| labels.get(l)) {
            Some(addr) => table.extend(jump(*addr)),
            None => table.extend([0; VECTOR_SLOT_SIZE]),
        }
    }
    Ok(table)
}

fn entry_point(labels: &LabelTable, first: &Pos) -> Result<u16, AssembleError> {
    labels.get(ENTRY_LABEL).copied().ok_or_else(|| {
        AssembleError::new(
            first.clone(),
            "",
            AssembleErrorKind::MissingEntryPoint(ENTRY_LABEL),
        )
    })
}

/// Assemble an include-resolved token stream.
pub fn assemble_tokens(tokens: &[Token], config: &Config) -> Result<Assembly, AssembleError> {
    let stmts = parser::parse(tokens)?;
    let origin = if config.vectors { VECTOR_TABLE_SIZE as u16 } else { 0 };

    let defines = defines_of(&stmts)?;
    let labels = labels_of(&stmts, origin)?;
    let listing = encode_stmts(&stmts, origin, &labels, &defines)?;

    let first = match tokens.first() {
        Some(token) => token.pos.clone(),
        None => Pos::new(&Rc::from(""), 1, 1),
    };
    let mut image = vec![];
    let entry = if config.vectors {
        image.extend(vector_table(config, &labels, &first)?);
        0
    } else if config.header {
        entry_point(&labels, &first)?
    } else {
        labels.get(ENTRY_LABEL).copied().unwrap_or(0)
    };
    image.extend(listing.iter().flat_map(|e| e.bin.iter().copied()));
    tracing::debug!("assembled {} bytes, entry {:#06x}", image.len(), entry);

    Ok(Assembly {
        program: Program::new(entry, image),
        header: config.header,
        labels,
        defines,
        listing,
    })
}

/// Assemble `source` (named `entry`) and everything it includes into a
/// program image.
pub fn assemble(
    entry: &str,
    source: &str,
    loader: &dyn FileLoader,
    system: &IndexMap<String, String>,
    interrupts: [Option<&str>; INTERRUPT_VECTORS],
) -> Result<Vec<u8>, Error> {
    let mut resolver = Resolver::new(loader, system);
    let tokens = resolver.resolve_source(entry, source)?;
    let config = Config {
        interrupts: interrupts.map(|l| l.map(str::to_string)),
        ..Config::default()
    };
    Ok(assemble_tokens(&tokens, &config)?.to_bytes())
}
