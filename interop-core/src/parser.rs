//! Line-oriented parser for annotated shader buffer blocks.
//!
//! The parser recognizes exactly three things: `#define NAME <int>` constant
//! definitions at file scope, block-open lines of the shape
//! `layout(binding = X, std140) uniform block_name`, and member declarations
//! `type name[len];` inside an open block. Everything else is ignored, which
//! is what lets it scan whole shader source files without understanding GLSL.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::layout::{layout_of, place};
use crate::types::{type_entry, ArrayLen, Block, Field, LayoutStandard};

/// Per-file mapping from `#define`d constant name to its value. Built
/// incrementally in document order; forward references are unsupported.
type SymbolTable = HashMap<String, usize>;

/// Parses every file in the given order and returns the sealed blocks in
/// file order, then declaration order. Each file gets a fresh symbol table.
pub fn parse_files(paths: &[impl AsRef<Path>]) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader source {}", path.display()))?;
        let parsed = parse_source(&source, &path.display().to_string())
            .with_context(|| format!("failed to parse {}", path.display()))?;
        blocks.extend(parsed);
    }
    Ok(blocks)
}

/// Parses one source text. `origin` only labels diagnostics.
pub fn parse_source(source: &str, origin: &str) -> Result<Vec<Block>> {
    let mut symbols = SymbolTable::new();
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;
    let mut running_offset = 0usize;
    let mut depth = 0usize;

    for (index, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if depth == 0 {
            if let Some(open) = parse_block_open(line) {
                seal(&mut blocks, current.take());
                current = Some(Block {
                    name: open.name.to_owned(),
                    binding: open.binding.to_owned(),
                    standard: open.standard,
                    fields: Vec::new(),
                });
                running_offset = 0;
                if open.has_brace {
                    depth = 1;
                }
                continue;
            }
            if let Some((name, value)) = parse_define(line) {
                symbols.insert(name.to_owned(), value);
                continue;
            }
        }

        if let Some(pos) = line.find('{') {
            depth += 1;
            // A close brace on the same line leaves the scope open: this is
            // the degenerate single-line form, not a nested scope.
            if line[pos + 1..].contains('}') {
                depth = 1;
            }
            continue;
        }
        if line.contains('}') {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                seal(&mut blocks, current.take());
            }
            continue;
        }

        if depth == 1 {
            if let Some(block) = current.as_mut() {
                match parse_member(line) {
                    Some(decl) => {
                        running_offset = append_field(block, decl, &symbols, running_offset)
                            .with_context(|| {
                                format!("{}:{}: in block `{}`", origin, index + 1, block.name)
                            })?;
                    }
                    None => {
                        log::warn!(
                            "{}:{}: skipping unrecognized line in block `{}`: {}",
                            origin,
                            index + 1,
                            block.name,
                            line
                        );
                    }
                }
            }
        }
    }

    // A block still open at end of file is sealed as long as it has fields.
    seal(&mut blocks, current.take());

    Ok(blocks)
}

fn seal(blocks: &mut Vec<Block>, current: Option<Block>) {
    if let Some(block) = current {
        if block.fields.is_empty() {
            log::debug!("discarding empty block `{}`", block.name);
        } else {
            log::debug!(
                "sealed block `{}` ({}, {} fields, {} bytes)",
                block.name,
                block.standard.keyword(),
                block.fields.len(),
                block.byte_end()
            );
            blocks.push(block);
        }
    }
}

fn append_field(
    block: &mut Block,
    decl: MemberDecl<'_>,
    symbols: &SymbolTable,
    running_offset: usize,
) -> Result<usize> {
    if block.fields.iter().any(|field| field.name == decl.name) {
        bail!("duplicate field name `{}`", decl.name);
    }

    let entry = type_entry(decl.ty)
        .ok_or_else(|| anyhow!("unknown type name `{}`", decl.ty))?;

    let array = match decl.array {
        ArraySuffix::None => ArrayLen::None,
        ArraySuffix::Dynamic => ArrayLen::Dynamic,
        ArraySuffix::Literal(text) => ArrayLen::Fixed(
            text.parse()
                .with_context(|| format!("bad array length `{text}`"))?,
        ),
        ArraySuffix::Symbol(name) => ArrayLen::Fixed(
            *symbols
                .get(name)
                .ok_or_else(|| anyhow!("undefined constant `{name}` used as array length"))?,
        ),
    };

    let (alignment, size) = layout_of(entry.prim, array, block.standard)
        .with_context(|| format!("field `{}`", decl.name))?;
    let (offset, new_running) = place(alignment, size, running_offset);

    block.fields.push(Field {
        name: decl.name.to_owned(),
        entry,
        array,
        alignment,
        size,
        offset,
    });

    Ok(new_running)
}

struct BlockOpen<'a> {
    standard: LayoutStandard,
    binding: &'a str,
    name: &'a str,
    has_brace: bool,
}

enum ArraySuffix<'a> {
    None,
    Dynamic,
    Literal(&'a str),
    Symbol(&'a str),
}

struct MemberDecl<'a> {
    ty: &'a str,
    name: &'a str,
    array: ArraySuffix<'a>,
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `#define NAME <int>`, anything after the value is ignored.
fn parse_define(line: &str) -> Option<(&str, usize)> {
    let mut tokens = line.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("#define") {
        return None;
    }
    let name = tokens.next().filter(|name| is_ident(name))?;
    let value = tokens.next()?.parse().ok()?;
    Some((name, value))
}

/// `qualifier(binding = X, std140|std430) <kind> <name>` with an optional
/// trailing `{`.
fn parse_block_open(line: &str) -> Option<BlockOpen<'_>> {
    let open = line.find('(')?;
    let close = line.find(')')?;
    if close < open || !is_ident(line[..open].trim()) {
        return None;
    }

    let (binding_clause, standard) = line[open + 1..close].split_once(',')?;
    let (key, binding) = binding_clause.split_once('=')?;
    let binding = binding.trim();
    if !is_ident(key.trim()) || !(is_ident(binding) || binding.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let standard = LayoutStandard::from_keyword(standard.trim())?;

    let mut rest = line[close + 1..].trim();
    let has_brace = rest.ends_with('{');
    if has_brace {
        rest = rest[..rest.len() - 1].trim_end();
    }
    let mut tokens = rest.split_whitespace();
    let kind = tokens.next()?;
    let name = tokens.next()?;
    if tokens.next().is_some() || !is_ident(kind) || !is_ident(name) {
        return None;
    }

    Some(BlockOpen { standard, binding, name, has_brace })
}

/// `<type> <name>;`, `<type> <name>[<literal>];`, `<type> <name>[<ident>];`
/// or `<type> <name>[];`. Trailing text after the semicolon is ignored.
fn parse_member(line: &str) -> Option<MemberDecl<'_>> {
    let body = line[..line.find(';')?].trim();
    let (ty, rest) = body.split_once(char::is_whitespace)?;
    if !is_ident(ty) {
        return None;
    }

    let rest = rest.trim();
    let (name, array) = match rest.find('[') {
        Some(bracket) => {
            let close = rest.rfind(']')?;
            if close < bracket || !rest[close + 1..].trim().is_empty() {
                return None;
            }
            let token = rest[bracket + 1..close].trim();
            let array = if token.is_empty() {
                ArraySuffix::Dynamic
            } else if token.chars().all(|c| c.is_ascii_digit()) {
                ArraySuffix::Literal(token)
            } else if is_ident(token) {
                ArraySuffix::Symbol(token)
            } else {
                return None;
            };
            (rest[..bracket].trim_end(), array)
        }
        None => (rest, ArraySuffix::None),
    };
    if !is_ident(name) {
        return None;
    }

    Some(MemberDecl { ty, name, array })
}
