use indexmap::IndexMap;
use std::io;
use std::path::PathBuf;

use crate::error::{Error, IncludeError, IncludeErrorKind};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Source of `#include "path"` texts.
pub trait FileLoader {
    fn load(&self, path: &str) -> io::Result<String>;
}

impl<F> FileLoader for F
where
    F: Fn(&str) -> io::Result<String>,
{
    fn load(&self, path: &str) -> io::Result<String> {
        self(path)
    }
}

/// Looks a path up in each search directory in turn.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    dirs: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        FsLoader { dirs }
    }
}

impl FileLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        let mut last = io::Error::new(io::ErrorKind::NotFound, path.to_string());
        for dir in self.dirs.iter().chain(std::iter::once(&PathBuf::new())) {
            match std::fs::read_to_string(dir.join(path)) {
                Ok(code) => return Ok(code),
                Err(err) => last = err,
            }
        }
        Err(last)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    File(String),
    System(String),
}

impl Key {
    fn name(&self) -> String {
        match self {
            Key::File(path) => format!("\"{path}\""),
            Key::System(name) => format!("<{name}>"),
        }
    }
}

/// Expands `#include` tokens depth-first into one flat stream.
///
/// Every distinct include is read and lexed once. Texts read so far are kept
/// in [`Resolver::sources`] for diagnostics.
pub struct Resolver<'a> {
    loader: &'a dyn FileLoader,
    system: &'a IndexMap<String, String>,
    cache: IndexMap<Key, Vec<Token>>,
    stack: Vec<Key>,
    sources: IndexMap<String, String>,
}

impl<'a> Resolver<'a> {
    pub fn new(loader: &'a dyn FileLoader, system: &'a IndexMap<String, String>) -> Self {
        Resolver {
            loader,
            system,
            cache: IndexMap::new(),
            stack: vec![],
            sources: IndexMap::new(),
        }
    }

    pub fn sources(&self) -> &IndexMap<String, String> {
        &self.sources
    }

    pub fn into_sources(self) -> IndexMap<String, String> {
        self.sources
    }

    /// Lex `code` as `entry` and expand its includes. The result has exactly
    /// one `Eof`, at the end.
    pub fn resolve_source(&mut self, entry: &str, code: &str) -> Result<Vec<Token>, Error> {
        self.sources.insert(entry.to_string(), code.to_string());
        let tokens = tokenize(entry, code)?;
        self.resolve(entry, tokens)
    }

    pub fn resolve(&mut self, entry: &str, tokens: Vec<Token>) -> Result<Vec<Token>, Error> {
        tracing::debug!("resolving includes of {entry}");
        self.stack = vec![Key::File(entry.to_string())];
        let mut out = Vec::with_capacity(tokens.len());
        self.expand(&tokens, &mut out)?;
        let eof = tokens.last().cloned().filter(|t| t.kind == TokenKind::Eof);
        out.extend(eof);
        Ok(out)
    }

    fn expand(&mut self, tokens: &[Token], out: &mut Vec<Token>) -> Result<(), Error> {
        for token in tokens {
            let key = match &token.kind {
                TokenKind::FileInclude(path) => Key::File(path.clone()),
                TokenKind::SystemInclude(name) => Key::System(name.clone()),
                TokenKind::Eof => continue,
                _ => {
                    out.push(token.clone());
                    continue;
                }
            };

            if self.stack.contains(&key) {
                let chain = self
                    .stack
                    .iter()
                    .chain(std::iter::once(&key))
                    .map(Key::name)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(IncludeError::new(token.pos.clone(), IncludeErrorKind::Cycle(chain)).into());
            }

            let included = self.fetch(&key, token)?;
            tracing::debug!("including {}", key.name());
            self.stack.push(key);
            self.expand(&included, out)?;
            self.stack.pop();
        }
        Ok(())
    }

    fn fetch(&mut self, key: &Key, site: &Token) -> Result<Vec<Token>, Error> {
        if let Some(tokens) = self.cache.get(key) {
            return Ok(tokens.clone());
        }
        let (name, code) = match key {
            Key::File(path) => match self.loader.load(path) {
                Ok(code) => (path.clone(), code),
                Err(err) => {
                    let kind = IncludeErrorKind::FileNotFound(path.clone(), err);
                    return Err(IncludeError::new(site.pos.clone(), kind).into());
                }
            },
            Key::System(name) => match self.system.get(name) {
                Some(code) => (format!("<{name}>"), code.clone()),
                None => {
                    let kind = IncludeErrorKind::SystemNotFound(name.clone());
                    return Err(IncludeError::new(site.pos.clone(), kind).into());
                }
            },
        };
        let tokens = tokenize(&name, &code);
        self.sources.insert(name, code);
        let tokens = tokens?;
        self.cache.insert(key.clone(), tokens.clone());
        Ok(tokens)
    }
}
